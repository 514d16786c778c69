// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # VAC-Lite Topology
//!
//! Vector animation complex (VAC): a cellular structure of vertices, edges
//! and faces with explicit star/boundary relationships, where key cells exist
//! at a single time and inbetween cells interpolate between key cells over a
//! time interval.
//!
//! Every cell and group lives in one slot-map arena owned by [`Complex`].
//! Groups form a tree whose sibling order is the drawing order. Cells are
//! addressed through [`TypedCellKey`], which encodes the spatial and temporal
//! type of a cell so that, for instance, a face cannot be passed where an
//! edge is expected.
//!
//! Topology is edited by cutting (splitting an edge at parameters, splitting
//! or re-gluing a face along an edge) and gluing (merging vertices or
//! congruent edges). Each operation keeps stars and boundaries as exact
//! inverses of each other.
//!
//! ```
//! use nalgebra::Point2;
//! use vac_lite_geometry::{CurveParameter, Stroke2d};
//! use vac_lite_topology::{AnimTime, Complex, KeyEdgeData};
//!
//! let mut complex = Complex::new();
//! let root = complex.root();
//! let t = AnimTime::default();
//! let a = complex.create_key_vertex(Point2::new(0.0, 0.0), root, None, t).unwrap();
//! let b = complex.create_key_vertex(Point2::new(2.0, 0.0), root, None, t).unwrap();
//! let stroke = Stroke2d::segment(Point2::new(0.0, 0.0), Point2::new(2.0, 0.0));
//! let e = complex.create_key_open_edge(a, b, KeyEdgeData::new(stroke), root, None).unwrap();
//!
//! let cut = complex.cut_edge(e, &[CurveParameter::new(0, 0.5)]).unwrap();
//! assert_eq!(cut.new_vertices.len(), 1);
//! assert_eq!(cut.new_edges.len(), 2);
//! assert!(complex.is_star_boundary_consistent());
//! ```

pub mod cast;
pub mod cell;
pub mod cell_type;
pub mod complex;
pub mod config;
pub mod cycle;
pub mod diff;
pub mod edge_data;
pub mod error;
pub mod geometry;
pub mod halfedge;
pub mod keys;
pub mod node;
pub mod operations;
pub mod path;
pub mod properties;
pub mod time;
pub mod transform;
pub mod tree;

pub use cast::{
    dynamic_cell_cast, spatial, static_cell_cast, temporal, CellKey, CellView, EdgeCellKey,
    FaceCellKey, InbetweenCellKey, InbetweenEdgeKey, InbetweenFaceKey, InbetweenVertexKey,
    KeyCellKey, KeyEdgeKey, KeyFaceKey, KeyVertexKey, SpatialTag, TemporalTag, TypedCellKey,
    VertexCellKey,
};
pub use cell::{
    Cell, CellData, EdgeCell, InbetweenCell, InbetweenEdge, InbetweenFace, InbetweenVertex,
    KeyCell, KeyEdge, KeyFace, KeyVertex, VertexCell,
};
pub use cell_type::{CellSpatialType, CellTemporalType, CellType};
pub use complex::Complex;
pub use config::VacConfig;
pub use cycle::{KeyCycle, KeyFaceVertexUsageIndex};
pub use diff::ComplexDiff;
pub use edge_data::KeyEdgeData;
pub use error::{Error, Result};
pub use geometry::interior_contained_ratio;
pub use halfedge::KeyHalfedge;
pub use keys::{GroupKey, NodeId, NodeKey};
pub use node::{Group, Node, NodeKind};
pub use operations::policy::one_cycle_policy_from_polylines;
pub use operations::{CutEdgeResult, CutFaceResult, OneCycleCutPolicy, TwoCycleCutPolicy};
pub use path::KeyPath;
pub use properties::{PropValue, Properties};
pub use time::{AnimTime, AnimTimeRange};
pub use tree::TreeChildrenIter;
