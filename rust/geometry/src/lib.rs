// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! VAC-Lite Geometry
//!
//! 2D geometry used by the vector animation complex: variable-width strokes,
//! polyline sampling, winding numbers and segment intersection tests.
//! Built on nalgebra points and vectors.

pub mod error;
pub mod intersect;
pub mod polyline;
pub mod rect;
pub mod stroke;
pub mod winding;

// Re-export nalgebra types for convenience
pub use nalgebra::{Affine2, Point2, Vector2};

pub use error::{Error, Result};
pub use intersect::{
    classify_segment_intersection, count_polyline_crossings, CrossingCount, SegmentIntersection,
};
pub use polyline::{
    polyline_bounds, polyline_length, remove_near_duplicates, resample_uniform, trim_shared_ends,
};
pub use rect::Rect2;
pub use stroke::{CurveParameter, Stroke2d};
pub use winding::{orient, signed_area, winding_number, WindingRule};
