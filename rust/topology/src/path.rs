// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Key paths: walks along key halfedges.

use crate::cast::KeyVertexKey;
use crate::complex::Complex;
use crate::halfedge::KeyHalfedge;

/// A walk made of consecutive open halfedges, or a single vertex (the empty
/// walk at that vertex).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KeyPath {
    single_vertex: Option<KeyVertexKey>,
    halfedges: Vec<KeyHalfedge>,
}

impl KeyPath {
    /// The empty walk staying at `v`.
    pub fn from_vertex(v: KeyVertexKey) -> Self {
        Self {
            single_vertex: Some(v),
            halfedges: Vec::new(),
        }
    }

    pub fn from_halfedges(halfedges: Vec<KeyHalfedge>) -> Self {
        Self {
            single_vertex: None,
            halfedges,
        }
    }

    pub fn single_vertex(&self) -> Option<KeyVertexKey> {
        self.single_vertex
    }

    pub fn halfedges(&self) -> &[KeyHalfedge] {
        &self.halfedges
    }

    pub fn into_halfedges(self) -> Vec<KeyHalfedge> {
        self.halfedges
    }

    /// Number of halfedges.
    pub fn len(&self) -> usize {
        self.halfedges.len()
    }

    /// No halfedges and no vertex.
    pub fn is_empty(&self) -> bool {
        self.single_vertex.is_none() && self.halfedges.is_empty()
    }

    pub fn start_vertex(&self, complex: &Complex) -> Option<KeyVertexKey> {
        match self.halfedges.first() {
            Some(h) => h.start_vertex(complex),
            None => self.single_vertex,
        }
    }

    pub fn end_vertex(&self, complex: &Complex) -> Option<KeyVertexKey> {
        match self.halfedges.last() {
            Some(h) => h.end_vertex(complex),
            None => self.single_vertex,
        }
    }

    /// The same walk in the opposite order and directions.
    pub fn reversed(&self) -> KeyPath {
        Self {
            single_vertex: self.single_vertex,
            halfedges: self.halfedges.iter().rev().map(KeyHalfedge::opposite).collect(),
        }
    }

    /// Rotates the halfedges left by `n`. Only meaningful for closed walks.
    pub fn rotated(&self, n: usize) -> KeyPath {
        let mut halfedges = self.halfedges.clone();
        if !halfedges.is_empty() {
            let n = n % halfedges.len();
            halfedges.rotate_left(n);
        }
        Self {
            single_vertex: self.single_vertex,
            halfedges,
        }
    }

    /// Appends one halfedge at the end of the walk.
    pub fn extend(&mut self, halfedge: KeyHalfedge) {
        self.single_vertex = None;
        self.halfedges.push(halfedge);
    }

    /// Appends another walk. Appending a single-vertex walk is a no-op.
    pub fn append(&mut self, other: &KeyPath) {
        if other.halfedges.is_empty() {
            return;
        }
        self.single_vertex = None;
        self.halfedges.extend_from_slice(&other.halfedges);
    }

    /// Whether the halfedges are open and chained end to start.
    pub fn is_valid(&self, complex: &Complex) -> bool {
        if self.halfedges.is_empty() {
            return self
                .single_vertex
                .is_some_and(|v| complex.key_vertex(v).is_ok());
        }
        // Closed or missing edges have no start vertex.
        if self.halfedges.iter().any(|h| h.start_vertex(complex).is_none()) {
            return false;
        }
        self.halfedges.windows(2).all(|w| {
            let end = w[0].end_vertex(complex);
            end.is_some() && end == w[1].start_vertex(complex)
        })
    }
}
