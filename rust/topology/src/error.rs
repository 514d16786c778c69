// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for complex operations.

use vac_lite_geometry::WindingRule;

use crate::cell_type::CellType;
use crate::keys::{GroupKey, NodeKey};
use crate::time::AnimTime;

/// Result type alias for complex operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during complex operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A referenced node was not found in the complex.
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeKey),

    /// A group was expected but the node is a cell.
    #[error("node is not a group: {0:?}")]
    NotAGroup(NodeKey),

    /// A cell was expected but the node is a group.
    #[error("node is not a cell: {0:?}")]
    NotACell(NodeKey),

    /// The cell exists but does not have the requested type.
    #[error("cell {key:?} is a {found}, expected a {expected}")]
    UnexpectedCellType {
        key: NodeKey,
        expected: CellType,
        found: CellType,
    },

    /// Moving `child` under `parent` would make a node its own ancestor.
    #[error("cannot move {child:?} under its own descendant {parent:?}")]
    CyclicReparent { child: NodeKey, parent: GroupKey },

    /// The given sibling is not a child of the given group.
    #[error("{sibling:?} is not a child of {parent:?}")]
    NotAChild { sibling: NodeKey, parent: GroupKey },

    /// The root group cannot be moved or deleted.
    #[error("the root group cannot be {0}")]
    RootModification(&'static str),

    /// An operation received no input cells.
    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    /// Cells that must live at the same time do not.
    #[error("time mismatch: expected {expected}, found {found}")]
    TimeMismatch { expected: AnimTime, found: AnimTime },

    /// A vertex usage index does not designate a vertex of the face, or
    /// designates a vertex other than the expected one.
    #[error("invalid vertex usage (cycle {cycle_index}, component {component_index})")]
    InvalidVertexUsage {
        cycle_index: usize,
        component_index: usize,
    },

    /// A cycle is not a closed walk.
    #[error("invalid cycle: {0}")]
    InvalidCycle(String),

    /// An inbetween cell would span an empty or reversed time interval.
    #[error("invalid time range: [{0}, {1}]")]
    InvalidTimeRange(AnimTime, AnimTime),

    /// Arguments that are well-typed but make no sense for the operation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Two-cycle cut policy resolution only supports the odd winding rule.
    #[error("two-cycle cut policy resolution is not implemented for the {0} winding rule")]
    UnsupportedWindingRule(WindingRule),

    /// The edge to cut is used by inbetween edges.
    #[error("cannot cut edge {0:?}: it has inbetween edges in its star")]
    UnsupportedInbetweenStar(NodeKey),

    /// Configuration could not be parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Error from the geometry layer.
    #[error(transparent)]
    Geometry(#[from] vac_lite_geometry::Error),
}
