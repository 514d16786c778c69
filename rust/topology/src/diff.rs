// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Change accumulator.
//!
//! Every mutation of a [`Complex`](crate::Complex) records the ids of the
//! nodes it touched. Document and rendering layers drain the accumulated
//! [`ComplexDiff`] after each high-level action to mirror the changes.

use rustc_hash::FxHashSet;

use crate::keys::NodeId;

/// Ids of the nodes changed since the diff was last drained.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComplexDiff {
    created: FxHashSet<NodeId>,
    destroyed: FxHashSet<NodeId>,
    reparented: FxHashSet<NodeId>,
    transformed: FxHashSet<NodeId>,
    geometry_changed: FxHashSet<NodeId>,
    boundary_changed: FxHashSet<NodeId>,
}

impl ComplexDiff {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
            && self.destroyed.is_empty()
            && self.reparented.is_empty()
            && self.transformed.is_empty()
            && self.geometry_changed.is_empty()
            && self.boundary_changed.is_empty()
    }

    /// Nodes created (and still alive).
    pub fn created(&self) -> &FxHashSet<NodeId> {
        &self.created
    }

    /// Nodes that existed before and were destroyed.
    pub fn destroyed(&self) -> &FxHashSet<NodeId> {
        &self.destroyed
    }

    pub fn reparented(&self) -> &FxHashSet<NodeId> {
        &self.reparented
    }

    pub fn transformed(&self) -> &FxHashSet<NodeId> {
        &self.transformed
    }

    pub fn geometry_changed(&self) -> &FxHashSet<NodeId> {
        &self.geometry_changed
    }

    pub fn boundary_changed(&self) -> &FxHashSet<NodeId> {
        &self.boundary_changed
    }

    pub(crate) fn on_created(&mut self, id: NodeId) {
        self.created.insert(id);
    }

    /// A node created and destroyed within the same diff leaves no trace.
    pub(crate) fn on_destroyed(&mut self, id: NodeId) {
        self.reparented.remove(&id);
        self.transformed.remove(&id);
        self.geometry_changed.remove(&id);
        self.boundary_changed.remove(&id);
        if !self.created.remove(&id) {
            self.destroyed.insert(id);
        }
    }

    pub(crate) fn on_reparented(&mut self, id: NodeId) {
        if !self.created.contains(&id) {
            self.reparented.insert(id);
        }
    }

    pub(crate) fn on_transformed(&mut self, id: NodeId) {
        if !self.created.contains(&id) {
            self.transformed.insert(id);
        }
    }

    pub(crate) fn on_geometry_changed(&mut self, id: NodeId) {
        if !self.created.contains(&id) {
            self.geometry_changed.insert(id);
        }
    }

    pub(crate) fn on_boundary_changed(&mut self, id: NodeId) {
        if !self.created.contains(&id) {
            self.boundary_changed.insert(id);
        }
    }
}
