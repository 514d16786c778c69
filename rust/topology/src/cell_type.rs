// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cell type tags.
//!
//! A cell has two independent axes: its spatial type (vertex, edge or face)
//! and its temporal type (key or inbetween). Both are packed into a single
//! 3-bit [`CellType`]: the spatial type in bits 0-1, the temporal type in
//! bit 2.

/// Spatial dimension of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum CellSpatialType {
    Vertex = 0,
    Edge = 1,
    Face = 2,
}

impl CellSpatialType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CellSpatialType::Vertex => "Vertex",
            CellSpatialType::Edge => "Edge",
            CellSpatialType::Face => "Face",
        }
    }
}

/// Whether a cell exists at one instant or over a time interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum CellTemporalType {
    Key = 0,
    Inbetween = 1,
}

impl CellTemporalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CellTemporalType::Key => "Key",
            CellTemporalType::Inbetween => "Inbetween",
        }
    }
}

/// Fully resolved cell type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum CellType {
    KeyVertex = 0,
    KeyEdge = 1,
    KeyFace = 2,
    InbetweenVertex = 4,
    InbetweenEdge = 5,
    InbetweenFace = 6,
}

impl CellType {
    /// All cell types, in tag order.
    pub const ALL: [CellType; 6] = [
        CellType::KeyVertex,
        CellType::KeyEdge,
        CellType::KeyFace,
        CellType::InbetweenVertex,
        CellType::InbetweenEdge,
        CellType::InbetweenFace,
    ];

    /// Composes a cell type from its two axes.
    pub const fn new(spatial: CellSpatialType, temporal: CellTemporalType) -> Self {
        match (temporal, spatial) {
            (CellTemporalType::Key, CellSpatialType::Vertex) => CellType::KeyVertex,
            (CellTemporalType::Key, CellSpatialType::Edge) => CellType::KeyEdge,
            (CellTemporalType::Key, CellSpatialType::Face) => CellType::KeyFace,
            (CellTemporalType::Inbetween, CellSpatialType::Vertex) => CellType::InbetweenVertex,
            (CellTemporalType::Inbetween, CellSpatialType::Edge) => CellType::InbetweenEdge,
            (CellTemporalType::Inbetween, CellSpatialType::Face) => CellType::InbetweenFace,
        }
    }

    /// The packed 3-bit tag.
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Unpacks a 3-bit tag. Returns `None` for the unused spatial value 3.
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(CellType::KeyVertex),
            1 => Some(CellType::KeyEdge),
            2 => Some(CellType::KeyFace),
            4 => Some(CellType::InbetweenVertex),
            5 => Some(CellType::InbetweenEdge),
            6 => Some(CellType::InbetweenFace),
            _ => None,
        }
    }

    pub const fn spatial_type(self) -> CellSpatialType {
        match self.bits() & 0b011 {
            0 => CellSpatialType::Vertex,
            1 => CellSpatialType::Edge,
            _ => CellSpatialType::Face,
        }
    }

    pub const fn temporal_type(self) -> CellTemporalType {
        if self.bits() & 0b100 == 0 {
            CellTemporalType::Key
        } else {
            CellTemporalType::Inbetween
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CellType::KeyVertex => "KeyVertex",
            CellType::KeyEdge => "KeyEdge",
            CellType::KeyFace => "KeyFace",
            CellType::InbetweenVertex => "InbetweenVertex",
            CellType::InbetweenEdge => "InbetweenEdge",
            CellType::InbetweenFace => "InbetweenFace",
        }
    }
}

impl std::fmt::Display for CellType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Display for CellSpatialType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Display for CellTemporalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
