// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The complex: owner of every group and cell.
//!
//! All nodes live in one slot map with generational keys. Tree links
//! (parent, siblings, children) and star/boundary links are stored as keys,
//! so a deleted node can never be reached through a stale link: lookups with
//! a stale key fail with [`Error::NodeNotFound`].
//!
//! Operations on the complex are spread over several modules, each adding an
//! `impl Complex` block: [`tree`](crate::tree) and
//! [`transform`](crate::transform) for the group tree, `operations` for
//! creation, deletion, cut and glue, [`geometry`](crate::geometry) for
//! sampling.

use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::cast::{
    CellKey, InbetweenEdgeKey, InbetweenFaceKey, InbetweenVertexKey, KeyEdgeKey, KeyFaceKey,
    KeyVertexKey, SpatialTag, TemporalTag, TypedCellKey,
};
use crate::cell::{
    Cell, CellData, InbetweenEdge, InbetweenFace, InbetweenVertex, KeyEdge, KeyFace, KeyVertex,
};
use crate::cell_type::CellType;
use crate::config::VacConfig;
use crate::diff::ComplexDiff;
use crate::error::{Error, Result};
use crate::keys::{GroupKey, NodeId, NodeKey};
use crate::node::{Group, Node, NodeKind};
use crate::time::AnimTime;

/// A vector animation complex.
///
/// # Example
///
/// ```
/// use vac_lite_topology::{AnimTime, Complex};
/// use nalgebra::Point2;
///
/// let mut complex = Complex::new();
/// let root = complex.root();
/// let t = AnimTime::default();
/// let v = complex.create_key_vertex(Point2::new(1.0, 2.0), root, None, t).unwrap();
///
/// assert_eq!(complex.cell_count(), 1);
/// assert_eq!(complex.key_vertex(v).unwrap().position(), Point2::new(1.0, 2.0));
/// ```
#[derive(Debug, Clone)]
pub struct Complex {
    pub(crate) nodes: SlotMap<NodeKey, Node>,
    pub(crate) ids: FxHashMap<NodeId, NodeKey>,
    pub(crate) root: GroupKey,
    pub(crate) config: VacConfig,
    pub(crate) diff: ComplexDiff,
}

impl Default for Complex {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! typed_cell_access {
    ($($get:ident, $get_mut:ident: $key:ty => $variant:ident($data:ty);)*) => {
        impl Complex {
            $(
                pub fn $get(&self, cell: $key) -> Result<&$data> {
                    match &self.try_cell(cell.key())?.data {
                        CellData::$variant(d) => Ok(d),
                        other => Err(Error::UnexpectedCellType {
                            key: cell.key(),
                            expected: CellType::$variant,
                            found: other.cell_type(),
                        }),
                    }
                }

                #[allow(dead_code)]
                pub(crate) fn $get_mut(&mut self, cell: $key) -> Result<&mut $data> {
                    let key = cell.key();
                    match &mut self.try_cell_mut(key)?.data {
                        CellData::$variant(d) => Ok(d),
                        other => Err(Error::UnexpectedCellType {
                            key,
                            expected: CellType::$variant,
                            found: other.cell_type(),
                        }),
                    }
                }
            )*
        }
    };
}

typed_cell_access! {
    key_vertex, key_vertex_mut: KeyVertexKey => KeyVertex(KeyVertex);
    key_edge, key_edge_mut: KeyEdgeKey => KeyEdge(KeyEdge);
    key_face, key_face_mut: KeyFaceKey => KeyFace(KeyFace);
    inbetween_vertex, inbetween_vertex_mut: InbetweenVertexKey => InbetweenVertex(InbetweenVertex);
    inbetween_edge, inbetween_edge_mut: InbetweenEdgeKey => InbetweenEdge(InbetweenEdge);
    inbetween_face, inbetween_face_mut: InbetweenFaceKey => InbetweenFace(InbetweenFace);
}

impl Complex {
    /// Creates an empty complex with the default configuration.
    pub fn new() -> Self {
        Self::with_config(VacConfig::default())
    }

    /// Creates an empty complex (just a root group).
    pub fn with_config(config: VacConfig) -> Self {
        let mut nodes = SlotMap::with_key();
        let root_node = Node::new(NodeKind::Group(Group::new()));
        let root_id = root_node.id;
        let root = GroupKey(nodes.insert(root_node));
        let mut ids = FxHashMap::default();
        ids.insert(root_id, root.0);
        Self {
            nodes,
            ids,
            root,
            config,
            diff: ComplexDiff::default(),
        }
    }

    pub fn config(&self) -> &VacConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: VacConfig) {
        self.config = config;
    }

    pub fn root(&self) -> GroupKey {
        self.root
    }

    /// Number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn cell_count(&self) -> usize {
        self.nodes.values().filter(|n| n.is_cell()).count()
    }

    pub fn contains(&self, key: impl Into<NodeKey>) -> bool {
        self.nodes.contains_key(key.into())
    }

    pub fn node(&self, key: impl Into<NodeKey>) -> Option<&Node> {
        self.nodes.get(key.into())
    }

    pub fn node_id(&self, key: impl Into<NodeKey>) -> Option<NodeId> {
        self.node(key).map(Node::id)
    }

    /// Resolves a stable id to the current key of its node.
    pub fn find_node(&self, id: NodeId) -> Option<NodeKey> {
        self.ids.get(&id).copied()
    }

    pub fn group_key(&self, key: NodeKey) -> Option<GroupKey> {
        self.nodes.get(key)?.is_group().then_some(GroupKey(key))
    }

    /// Typed handle for a cell node.
    pub fn cell_key(&self, key: NodeKey) -> Option<CellKey> {
        let cell = self.nodes.get(key)?.as_cell()?;
        Some(CellKey::new_unchecked(key, cell.cell_type()))
    }

    pub fn cell_type(&self, key: NodeKey) -> Option<CellType> {
        Some(self.nodes.get(key)?.as_cell()?.cell_type())
    }

    /// All cells, in arena order.
    pub fn cells(&self) -> impl Iterator<Item = CellKey> + '_ {
        self.nodes.iter().filter_map(|(key, node)| {
            node.as_cell()
                .map(|c| CellKey::new_unchecked(key, c.cell_type()))
        })
    }

    /// All cells that can be viewed as `TypedCellKey<S, T>`, in arena order.
    pub fn cells_of<S: SpatialTag, T: TemporalTag>(&self) -> Vec<TypedCellKey<S, T>> {
        self.nodes
            .iter()
            .filter_map(|(key, node)| TypedCellKey::try_new(key, node.as_cell()?.cell_type()))
            .collect()
    }

    /// Cells existing at time `t`.
    pub fn cells_at(&self, t: AnimTime) -> Vec<CellKey> {
        self.nodes
            .iter()
            .filter_map(|(key, node)| {
                let cell = node.as_cell()?;
                cell.data
                    .exists_at(t)
                    .then(|| CellKey::new_unchecked(key, cell.cell_type()))
            })
            .collect()
    }

    /// Cells having `cell` in their boundary. Empty for stale keys.
    pub fn star<S: SpatialTag, T: TemporalTag>(&self, cell: TypedCellKey<S, T>) -> &[CellKey] {
        self.try_cell(cell.key()).map(Cell::star).unwrap_or(&[])
    }

    /// Cells `cell` depends on. Empty for stale keys.
    pub fn boundary<S: SpatialTag, T: TemporalTag>(&self, cell: TypedCellKey<S, T>) -> &[CellKey] {
        self.try_cell(cell.key()).map(Cell::boundary).unwrap_or(&[])
    }

    pub fn cell_data<S: SpatialTag, T: TemporalTag>(&self, cell: TypedCellKey<S, T>) -> Result<&CellData> {
        Ok(&self.try_cell(cell.key())?.data)
    }

    /// Ids of the nodes changed since the last [`Complex::take_diff`].
    pub fn diff(&self) -> &ComplexDiff {
        &self.diff
    }

    /// Drains the accumulated changes.
    pub fn take_diff(&mut self) -> ComplexDiff {
        std::mem::take(&mut self.diff)
    }

    pub(crate) fn try_node(&self, key: NodeKey) -> Result<&Node> {
        self.nodes.get(key).ok_or(Error::NodeNotFound(key))
    }

    pub(crate) fn try_node_mut(&mut self, key: NodeKey) -> Result<&mut Node> {
        self.nodes.get_mut(key).ok_or(Error::NodeNotFound(key))
    }

    pub(crate) fn try_cell(&self, key: NodeKey) -> Result<&Cell> {
        self.try_node(key)?.as_cell().ok_or(Error::NotACell(key))
    }

    pub(crate) fn try_cell_mut(&mut self, key: NodeKey) -> Result<&mut Cell> {
        self.try_node_mut(key)?
            .as_cell_mut()
            .ok_or(Error::NotACell(key))
    }

    pub(crate) fn try_group(&self, key: GroupKey) -> Result<&Group> {
        self.try_node(key.0)?.as_group().ok_or(Error::NotAGroup(key.0))
    }

    pub(crate) fn try_group_mut(&mut self, key: GroupKey) -> Result<&mut Group> {
        self.try_node_mut(key.0)?
            .as_group_mut()
            .ok_or(Error::NotAGroup(key.0))
    }

    /// Id of a node known to exist.
    pub(crate) fn id_of(&self, key: NodeKey) -> NodeId {
        self.nodes[key].id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point2;

    #[test]
    fn new_complex_has_only_root() {
        let complex = Complex::new();
        assert_eq!(complex.node_count(), 1);
        assert_eq!(complex.cell_count(), 0);
        assert!(complex.contains(complex.root()));
        let id = complex.node_id(complex.root()).unwrap();
        assert_eq!(complex.find_node(id), Some(complex.root().node()));
    }

    #[test]
    fn typed_lookup_checks_type() {
        let mut complex = Complex::new();
        let root = complex.root();
        let v = complex
            .create_key_vertex(Point2::new(0.0, 0.0), root, None, AnimTime::default())
            .unwrap();
        let as_cell = v.as_cell();
        assert_eq!(complex.cell_type(v.key()), Some(CellType::KeyVertex));
        assert_eq!(complex.cell_key(v.key()), Some(as_cell));
        assert!(complex.key_vertex(v).is_ok());
        assert_eq!(complex.cells_of::<crate::cast::spatial::Vertex, crate::cast::temporal::Any>().len(), 1);
        assert!(complex.cells_of::<crate::cast::spatial::Edge, crate::cast::temporal::Any>().is_empty());
    }

    #[test]
    fn cells_at_filters_by_time() {
        let mut complex = Complex::new();
        let root = complex.root();
        complex
            .create_key_vertex(Point2::origin(), root, None, AnimTime::new(0.0))
            .unwrap();
        complex
            .create_key_vertex(Point2::origin(), root, None, AnimTime::new(1.0))
            .unwrap();
        assert_eq!(complex.cells_at(AnimTime::new(1.0)).len(), 1);
        assert!(complex.cells_at(AnimTime::new(0.5)).is_empty());
    }

    #[test]
    fn stale_keys_are_detected() {
        let mut complex = Complex::new();
        let root = complex.root();
        let v = complex
            .create_key_vertex(Point2::origin(), root, None, AnimTime::default())
            .unwrap();
        complex.hard_delete(v.key(), false).unwrap();
        assert!(matches!(complex.key_vertex(v), Err(Error::NodeNotFound(_))));
        assert!(complex.star(v).is_empty());
        assert!(!complex.contains(v));
    }
}
