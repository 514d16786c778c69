// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cells and their per-type data.
//!
//! Every cell stores its star (cells that have it in their boundary) and its
//! boundary (cells it depends on). The two relations are kept mutual
//! inverses by every operation of the complex.
//!
//! The spatial and temporal capabilities of a cell are expressed as two
//! independent sets of traits: [`KeyCell`] / [`InbetweenCell`] on the
//! temporal axis, [`VertexCell`] / [`EdgeCell`] on the spatial axis. Each of
//! the six concrete cell types implements one trait of each axis (faces have
//! no spatial capability trait).

use nalgebra::Point2;
use smallvec::SmallVec;

use crate::cast::{CellKey, InbetweenVertexKey, KeyFaceKey, KeyVertexKey, VertexCellKey};
use crate::cell_type::CellType;
use crate::complex::Complex;
use crate::cycle::KeyCycle;
use crate::edge_data::KeyEdgeData;
use crate::halfedge::KeyHalfedge;
use crate::properties::Properties;
use crate::time::{AnimTime, AnimTimeRange};

/// A cell: adjacency plus type-specific data.
#[derive(Debug, Clone)]
pub struct Cell {
    pub(crate) star: SmallVec<[CellKey; 4]>,
    pub(crate) boundary: SmallVec<[CellKey; 4]>,
    pub(crate) data: CellData,
}

impl Cell {
    pub(crate) fn new(data: CellData) -> Self {
        Self {
            star: SmallVec::new(),
            boundary: SmallVec::new(),
            data,
        }
    }

    /// Cells that have this cell in their boundary.
    pub fn star(&self) -> &[CellKey] {
        &self.star
    }

    /// Cells this cell depends on.
    pub fn boundary(&self) -> &[CellKey] {
        &self.boundary
    }

    pub fn data(&self) -> &CellData {
        &self.data
    }

    pub fn cell_type(&self) -> CellType {
        self.data.cell_type()
    }
}

/// Type-specific cell data.
#[derive(Debug, Clone)]
pub enum CellData {
    KeyVertex(KeyVertex),
    KeyEdge(KeyEdge),
    KeyFace(KeyFace),
    InbetweenVertex(InbetweenVertex),
    InbetweenEdge(InbetweenEdge),
    InbetweenFace(InbetweenFace),
}

impl CellData {
    pub fn cell_type(&self) -> CellType {
        match self {
            CellData::KeyVertex(_) => CellType::KeyVertex,
            CellData::KeyEdge(_) => CellType::KeyEdge,
            CellData::KeyFace(_) => CellType::KeyFace,
            CellData::InbetweenVertex(_) => CellType::InbetweenVertex,
            CellData::InbetweenEdge(_) => CellType::InbetweenEdge,
            CellData::InbetweenFace(_) => CellType::InbetweenFace,
        }
    }

    /// Whether the cell exists at time `t`.
    pub fn exists_at(&self, t: AnimTime) -> bool {
        match self {
            CellData::KeyVertex(c) => c.time() == t,
            CellData::KeyEdge(c) => c.time() == t,
            CellData::KeyFace(c) => c.time() == t,
            CellData::InbetweenVertex(c) => c.time_range().contains(t),
            CellData::InbetweenEdge(c) => c.time_range().contains(t),
            CellData::InbetweenFace(c) => c.time_range().contains(t),
        }
    }
}

/// A cell that exists at exactly one time.
pub trait KeyCell {
    fn time(&self) -> AnimTime;
}

/// A cell that exists over an open time interval.
pub trait InbetweenCell {
    fn time_range(&self) -> AnimTimeRange;
}

/// A cell with a position.
pub trait VertexCell {
    /// Position at time `t`, or `None` if the cell does not exist at `t`.
    fn position_at(&self, complex: &Complex, t: AnimTime) -> Option<Point2<f64>>;
}

/// A cell with a curve geometry and (unless closed) two end vertices.
pub trait EdgeCell {
    /// Closed edges have no end vertices.
    fn is_closed(&self) -> bool;
    fn is_start_vertex(&self, v: VertexCellKey) -> bool;
    fn is_end_vertex(&self, v: VertexCellKey) -> bool;
}

#[derive(Debug, Clone)]
pub struct KeyVertex {
    pub(crate) time: AnimTime,
    pub(crate) position: Point2<f64>,
}

impl KeyVertex {
    pub fn position(&self) -> Point2<f64> {
        self.position
    }
}

impl KeyCell for KeyVertex {
    fn time(&self) -> AnimTime {
        self.time
    }
}

impl VertexCell for KeyVertex {
    fn position_at(&self, _complex: &Complex, t: AnimTime) -> Option<Point2<f64>> {
        (t == self.time).then_some(self.position)
    }
}

/// An edge at a single time. Open edges have both end vertices, closed
/// edges have none.
#[derive(Debug, Clone)]
pub struct KeyEdge {
    pub(crate) time: AnimTime,
    pub(crate) start_vertex: Option<KeyVertexKey>,
    pub(crate) end_vertex: Option<KeyVertexKey>,
    pub(crate) data: KeyEdgeData,
}

impl KeyEdge {
    pub fn start_vertex(&self) -> Option<KeyVertexKey> {
        self.start_vertex
    }

    pub fn end_vertex(&self) -> Option<KeyVertexKey> {
        self.end_vertex
    }

    pub fn data(&self) -> &KeyEdgeData {
        &self.data
    }
}

impl KeyCell for KeyEdge {
    fn time(&self) -> AnimTime {
        self.time
    }
}

impl EdgeCell for KeyEdge {
    fn is_closed(&self) -> bool {
        self.start_vertex.is_none()
    }

    fn is_start_vertex(&self, v: VertexCellKey) -> bool {
        self.start_vertex.is_some_and(|s| s == v)
    }

    fn is_end_vertex(&self, v: VertexCellKey) -> bool {
        self.end_vertex.is_some_and(|e| e == v)
    }
}

/// A face at a single time, described by its boundary cycles.
#[derive(Debug, Clone)]
pub struct KeyFace {
    pub(crate) time: AnimTime,
    pub(crate) cycles: Vec<KeyCycle>,
    pub(crate) properties: Properties,
}

impl KeyFace {
    pub fn cycles(&self) -> &[KeyCycle] {
        &self.cycles
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }
}

impl KeyCell for KeyFace {
    fn time(&self) -> AnimTime {
        self.time
    }
}

/// A vertex moving linearly between two key vertices.
#[derive(Debug, Clone)]
pub struct InbetweenVertex {
    pub(crate) before: KeyVertexKey,
    pub(crate) after: KeyVertexKey,
    pub(crate) range: AnimTimeRange,
}

impl InbetweenVertex {
    pub fn before_vertex(&self) -> KeyVertexKey {
        self.before
    }

    pub fn after_vertex(&self) -> KeyVertexKey {
        self.after
    }
}

impl InbetweenCell for InbetweenVertex {
    fn time_range(&self) -> AnimTimeRange {
        self.range
    }
}

impl VertexCell for InbetweenVertex {
    fn position_at(&self, complex: &Complex, t: AnimTime) -> Option<Point2<f64>> {
        if !self.range.contains(t) {
            return None;
        }
        let p0 = complex.key_vertex(self.before).ok()?.position();
        let p1 = complex.key_vertex(self.after).ok()?.position();
        let u = self.range.factor(t);
        Some(p0 + (p1 - p0) * u)
    }
}

/// An edge interpolated between a key halfedge before and one after.
#[derive(Debug, Clone)]
pub struct InbetweenEdge {
    pub(crate) before: KeyHalfedge,
    pub(crate) after: KeyHalfedge,
    pub(crate) start_vertex: Option<InbetweenVertexKey>,
    pub(crate) end_vertex: Option<InbetweenVertexKey>,
    pub(crate) range: AnimTimeRange,
}

impl InbetweenEdge {
    pub fn before_halfedge(&self) -> KeyHalfedge {
        self.before
    }

    pub fn after_halfedge(&self) -> KeyHalfedge {
        self.after
    }

    pub fn start_vertex(&self) -> Option<InbetweenVertexKey> {
        self.start_vertex
    }

    pub fn end_vertex(&self) -> Option<InbetweenVertexKey> {
        self.end_vertex
    }
}

impl InbetweenCell for InbetweenEdge {
    fn time_range(&self) -> AnimTimeRange {
        self.range
    }
}

impl EdgeCell for InbetweenEdge {
    fn is_closed(&self) -> bool {
        self.start_vertex.is_none()
    }

    fn is_start_vertex(&self, v: VertexCellKey) -> bool {
        self.start_vertex.is_some_and(|s| s == v)
    }

    fn is_end_vertex(&self, v: VertexCellKey) -> bool {
        self.end_vertex.is_some_and(|e| e == v)
    }
}

/// A face interpolated between key faces before and after.
#[derive(Debug, Clone)]
pub struct InbetweenFace {
    pub(crate) before: Vec<KeyFaceKey>,
    pub(crate) after: Vec<KeyFaceKey>,
    pub(crate) range: AnimTimeRange,
}

impl InbetweenFace {
    pub fn before_faces(&self) -> &[KeyFaceKey] {
        &self.before
    }

    pub fn after_faces(&self) -> &[KeyFaceKey] {
        &self.after
    }
}

impl InbetweenCell for InbetweenFace {
    fn time_range(&self) -> AnimTimeRange {
        self.range
    }
}
