// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Key cycles: the closed boundary components of a key face.

use crate::cast::KeyVertexKey;
use crate::complex::Complex;
use crate::halfedge::KeyHalfedge;
use crate::path::KeyPath;

/// A closed boundary component of a face.
///
/// Either a single Steiner vertex, or a closed walk of halfedges. A walk is
/// closed when each halfedge ends where the next one starts (cyclically), or
/// when it repeats one closed edge in a constant direction.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyCycle {
    steiner_vertex: Option<KeyVertexKey>,
    halfedges: Vec<KeyHalfedge>,
}

/// One occurrence of a vertex in a face's cycles.
///
/// Component `i` of a halfedge cycle is the start vertex of its `i`-th
/// halfedge; component 0 of a Steiner cycle is its vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyFaceVertexUsageIndex {
    pub cycle_index: usize,
    pub component_index: usize,
}

impl KeyFaceVertexUsageIndex {
    pub fn new(cycle_index: usize, component_index: usize) -> Self {
        Self {
            cycle_index,
            component_index,
        }
    }
}

impl KeyCycle {
    pub fn from_steiner_vertex(v: KeyVertexKey) -> Self {
        Self {
            steiner_vertex: Some(v),
            halfedges: Vec::new(),
        }
    }

    /// Creates a halfedge cycle. Validity is checked by [`KeyCycle::is_valid`].
    pub fn from_halfedges(halfedges: Vec<KeyHalfedge>) -> Self {
        Self {
            steiner_vertex: None,
            halfedges,
        }
    }

    /// A closed path becomes a halfedge cycle, a single-vertex path a Steiner
    /// cycle.
    pub fn from_path(path: KeyPath) -> Self {
        match path.single_vertex() {
            Some(v) if path.halfedges().is_empty() => Self::from_steiner_vertex(v),
            _ => Self::from_halfedges(path.into_halfedges()),
        }
    }

    pub fn steiner_vertex(&self) -> Option<KeyVertexKey> {
        self.steiner_vertex
    }

    pub fn halfedges(&self) -> &[KeyHalfedge] {
        &self.halfedges
    }

    pub(crate) fn halfedges_mut(&mut self) -> &mut Vec<KeyHalfedge> {
        &mut self.halfedges
    }

    pub(crate) fn set_steiner_vertex(&mut self, v: KeyVertexKey) {
        debug_assert!(self.steiner_vertex.is_some());
        self.steiner_vertex = Some(v);
    }

    pub fn is_steiner(&self) -> bool {
        self.steiner_vertex.is_some()
    }

    pub fn is_valid(&self, complex: &Complex) -> bool {
        if let Some(v) = self.steiner_vertex {
            return self.halfedges.is_empty() && complex.key_vertex(v).is_ok();
        }
        let Some(first) = self.halfedges.first() else {
            return false;
        };
        if complex.key_edge(first.edge()).is_err() {
            return false;
        }
        if first.is_closed(complex) {
            return self.halfedges.iter().all(|h| h == first);
        }
        let n = self.halfedges.len();
        (0..n).all(|i| {
            let end = self.halfedges[i].end_vertex(complex);
            end.is_some() && end == self.halfedges[(i + 1) % n].start_vertex(complex)
        })
    }

    /// The same cycle traversed in the opposite direction.
    pub fn reversed(&self) -> KeyCycle {
        Self {
            steiner_vertex: self.steiner_vertex,
            halfedges: self.halfedges.iter().rev().map(KeyHalfedge::opposite).collect(),
        }
    }

    /// The same cycle starting at halfedge `n`.
    pub fn rotated(&self, n: usize) -> KeyCycle {
        let mut halfedges = self.halfedges.clone();
        if !halfedges.is_empty() {
            let n = n % halfedges.len();
            halfedges.rotate_left(n);
        }
        Self {
            steiner_vertex: self.steiner_vertex,
            halfedges,
        }
    }

    /// Vertex at component `component_index`, if any.
    pub fn vertex_at(&self, component_index: usize, complex: &Complex) -> Option<KeyVertexKey> {
        match self.steiner_vertex {
            Some(v) => (component_index == 0).then_some(v),
            None => self.halfedges.get(component_index)?.start_vertex(complex),
        }
    }

    /// The walk from component `first` to component `last` following the
    /// cycle. When `first == last` this is the empty walk at that vertex; use
    /// [`KeyCycle::to_path`] for the full loop.
    pub fn sub_path(&self, first: usize, last: usize, complex: &Complex) -> KeyPath {
        if let Some(v) = self.steiner_vertex {
            return KeyPath::from_vertex(v);
        }
        let n = self.halfedges.len();
        if n == 0 {
            return KeyPath::default();
        }
        let first = first % n;
        let last = last % n;
        if first == last {
            return match self.halfedges[first].start_vertex(complex) {
                Some(v) => KeyPath::from_vertex(v),
                None => KeyPath::default(),
            };
        }
        let count = (last + n - first) % n;
        KeyPath::from_halfedges((0..count).map(|k| self.halfedges[(first + k) % n]).collect())
    }

    /// The full loop as a walk starting and ending at component `start`.
    pub fn to_path(&self, start: usize) -> KeyPath {
        match self.steiner_vertex {
            Some(v) => KeyPath::from_vertex(v),
            None => KeyPath::from_halfedges(self.rotated(start).halfedges),
        }
    }
}
