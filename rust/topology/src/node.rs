// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tree nodes: groups and cells.

use nalgebra::Affine2;

use crate::cell::Cell;
use crate::keys::{GroupKey, NodeId, NodeKey};

/// A member of the complex's group tree.
///
/// A node is either a [`Group`], which may have children, or a [`Cell`],
/// which never has tree children but takes part in the star/boundary graph.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) parent: Option<GroupKey>,
    pub(crate) previous_sibling: Option<NodeKey>,
    pub(crate) next_sibling: Option<NodeKey>,
    pub(crate) is_being_deleted: bool,
    pub(crate) kind: NodeKind,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Group(Group),
    Cell(Cell),
}

impl Node {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            id: NodeId::next(),
            parent: None,
            previous_sibling: None,
            next_sibling: None,
            is_being_deleted: false,
            kind,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn parent(&self) -> Option<GroupKey> {
        self.parent
    }

    pub fn previous_sibling(&self) -> Option<NodeKey> {
        self.previous_sibling
    }

    pub fn next_sibling(&self) -> Option<NodeKey> {
        self.next_sibling
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, NodeKind::Group(_))
    }

    pub fn is_cell(&self) -> bool {
        matches!(self.kind, NodeKind::Cell(_))
    }

    pub fn as_group(&self) -> Option<&Group> {
        match &self.kind {
            NodeKind::Group(g) => Some(g),
            NodeKind::Cell(_) => None,
        }
    }

    pub fn as_cell(&self) -> Option<&Cell> {
        match &self.kind {
            NodeKind::Cell(c) => Some(c),
            NodeKind::Group(_) => None,
        }
    }

    pub(crate) fn as_group_mut(&mut self) -> Option<&mut Group> {
        match &mut self.kind {
            NodeKind::Group(g) => Some(g),
            NodeKind::Cell(_) => None,
        }
    }

    pub(crate) fn as_cell_mut(&mut self) -> Option<&mut Cell> {
        match &mut self.kind {
            NodeKind::Cell(c) => Some(c),
            NodeKind::Group(_) => None,
        }
    }
}

/// A node that owns an ordered list of children and a local transform.
#[derive(Debug, Clone)]
pub struct Group {
    pub(crate) first_child: Option<NodeKey>,
    pub(crate) last_child: Option<NodeKey>,
    pub(crate) transform: Affine2<f64>,
    /// `parent.transform_from_root * transform`, kept up to date eagerly.
    pub(crate) transform_from_root: Affine2<f64>,
}

impl Group {
    pub(crate) fn new() -> Self {
        Self {
            first_child: None,
            last_child: None,
            transform: Affine2::identity(),
            transform_from_root: Affine2::identity(),
        }
    }

    pub fn first_child(&self) -> Option<NodeKey> {
        self.first_child
    }

    pub fn last_child(&self) -> Option<NodeKey> {
        self.last_child
    }

    pub fn transform(&self) -> &Affine2<f64> {
        &self.transform
    }

    pub fn transform_from_root(&self) -> &Affine2<f64> {
        &self.transform_from_root
    }
}
