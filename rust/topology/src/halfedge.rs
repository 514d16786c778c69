// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Key halfedges: a key edge plus a traversal direction.

use crate::cast::{KeyEdgeKey, KeyVertexKey};
use crate::complex::Complex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyHalfedge {
    edge: KeyEdgeKey,
    /// `true` when traversed from the start vertex to the end vertex.
    direction: bool,
}

impl KeyHalfedge {
    pub fn new(edge: KeyEdgeKey, direction: bool) -> Self {
        Self { edge, direction }
    }

    pub fn edge(&self) -> KeyEdgeKey {
        self.edge
    }

    pub fn direction(&self) -> bool {
        self.direction
    }

    /// The same edge traversed the other way.
    pub fn opposite(&self) -> KeyHalfedge {
        Self {
            edge: self.edge,
            direction: !self.direction,
        }
    }

    /// Vertex this halfedge leaves from. `None` for closed edges.
    pub fn start_vertex(&self, complex: &Complex) -> Option<KeyVertexKey> {
        let e = complex.key_edge(self.edge).ok()?;
        if self.direction {
            e.start_vertex()
        } else {
            e.end_vertex()
        }
    }

    /// Vertex this halfedge arrives at. `None` for closed edges.
    pub fn end_vertex(&self, complex: &Complex) -> Option<KeyVertexKey> {
        let e = complex.key_edge(self.edge).ok()?;
        if self.direction {
            e.end_vertex()
        } else {
            e.start_vertex()
        }
    }

    pub fn is_closed(&self, complex: &Complex) -> bool {
        complex
            .key_edge(self.edge)
            .map(|e| e.start_vertex().is_none())
            .unwrap_or(false)
    }
}
