// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Topological operations on a [`Complex`](crate::Complex).
//!
//! Every operation keeps the star and boundary relations mutual inverses and
//! records what it changed in the complex's diff. None of them rolls back
//! on error: inputs are validated before the first mutation.

pub mod boundary;
pub mod create;
pub mod cut;
pub mod delete;
pub mod glue;
pub mod policy;

pub use cut::{CutEdgeResult, CutFaceResult};
pub use policy::{OneCycleCutPolicy, TwoCycleCutPolicy};
