// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Group tree navigation and relinking.
//!
//! Children of a group are a doubly linked list of siblings. The list order
//! is the draw order: a child is drawn after (on top of) its previous
//! siblings. [`Complex::depth_order`] flattens the whole tree in draw order.

use rustc_hash::FxHashMap;

use crate::complex::Complex;
use crate::error::{Error, Result};
use crate::keys::{GroupKey, NodeKey};
use crate::node::Node;

/// Forward iterator over the children of a group.
#[derive(Debug, Clone)]
pub struct TreeChildrenIter<'a> {
    complex: &'a Complex,
    next: Option<NodeKey>,
}

impl Iterator for TreeChildrenIter<'_> {
    type Item = NodeKey;

    fn next(&mut self) -> Option<NodeKey> {
        let current = self.next?;
        self.next = self.complex.nodes.get(current).and_then(|n| n.next_sibling);
        Some(current)
    }
}

impl Complex {
    pub fn children(&self, group: GroupKey) -> TreeChildrenIter<'_> {
        TreeChildrenIter {
            complex: self,
            next: self.first_child(group),
        }
    }

    pub fn first_child(&self, group: GroupKey) -> Option<NodeKey> {
        self.try_group(group).ok()?.first_child
    }

    pub fn last_child(&self, group: GroupKey) -> Option<NodeKey> {
        self.try_group(group).ok()?.last_child
    }

    pub fn parent_group(&self, key: impl Into<NodeKey>) -> Option<GroupKey> {
        self.nodes.get(key.into())?.parent
    }

    pub fn next_sibling(&self, key: impl Into<NodeKey>) -> Option<NodeKey> {
        self.nodes.get(key.into())?.next_sibling
    }

    pub fn previous_sibling(&self, key: impl Into<NodeKey>) -> Option<NodeKey> {
        self.nodes.get(key.into())?.previous_sibling
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    pub fn is_ancestor_or_self(&self, ancestor: NodeKey, node: NodeKey) -> bool {
        let mut current = Some(node);
        while let Some(k) = current {
            if k == ancestor {
                return true;
            }
            current = self.nodes.get(k).and_then(|n| n.parent).map(GroupKey::node);
        }
        false
    }

    /// Moves `child` to the end of `parent`'s children.
    pub fn append_child(&mut self, parent: GroupKey, child: impl Into<NodeKey>) -> Result<()> {
        self.insert_child(parent, None, child.into())
    }

    /// Moves `child` under `parent`, just before `next_sibling` (or last when
    /// `None`).
    ///
    /// Fails if `next_sibling` is not a child of `parent`, if `child` is the
    /// root, or if `parent` is `child` or one of its descendants.
    pub fn insert_child(
        &mut self,
        parent: GroupKey,
        next_sibling: Option<NodeKey>,
        child: NodeKey,
    ) -> Result<()> {
        self.check_location(parent, next_sibling)?;
        self.try_node(child)?;
        if child == self.root.node() {
            return Err(Error::RootModification("moved"));
        }
        if self.is_ancestor_or_self(child, parent.node()) {
            return Err(Error::CyclicReparent { child, parent });
        }
        self.insert_child_unchecked(parent, next_sibling, child);
        Ok(())
    }

    /// Moves `child` under `parent`, just before `next_sibling`, as a single
    /// relink.
    ///
    /// The caller guarantees the arguments satisfy the conditions checked by
    /// [`Complex::insert_child`].
    pub fn insert_child_unchecked(
        &mut self,
        parent: GroupKey,
        next_sibling: Option<NodeKey>,
        child: NodeKey,
    ) {
        if next_sibling == Some(child) {
            return;
        }
        let Some(node) = self.nodes.get(child) else {
            return;
        };
        if node.parent == Some(parent) && node.next_sibling == next_sibling {
            return;
        }
        let old_parent = node.parent;
        let is_group = node.is_group();

        self.detach(child);
        self.attach(parent, next_sibling, child);

        let id = self.id_of(child);
        self.diff.on_reparented(id);
        if is_group && old_parent != Some(parent) {
            self.update_transforms_from_root(GroupKey(child));
        }
    }

    /// Detaches `child` from its parent and siblings.
    pub fn unparent(&mut self, child: NodeKey) -> Result<()> {
        if child == self.root.node() {
            return Err(Error::RootModification("unparented"));
        }
        let node = self.try_node(child)?;
        if node.parent.is_none() {
            return Ok(());
        }
        let is_group = node.is_group();
        self.detach(child);
        let id = self.id_of(child);
        self.diff.on_reparented(id);
        if is_group {
            self.update_transforms_from_root(GroupKey(child));
        }
        Ok(())
    }

    /// Every node reachable from the root except the root itself, in draw
    /// order (pre-order: a group comes before its children, children in
    /// sibling order).
    pub fn depth_order(&self) -> Vec<NodeKey> {
        let mut order = Vec::new();
        let mut stack: Vec<NodeKey> = self.first_child(self.root).into_iter().collect();
        while let Some(k) = stack.pop() {
            order.push(k);
            let Some(node) = self.nodes.get(k) else {
                continue;
            };
            if let Some(next) = node.next_sibling {
                stack.push(next);
            }
            if let Some(first) = node.as_group().and_then(|g| g.first_child) {
                stack.push(first);
            }
        }
        order
    }

    /// The input node drawn last, i.e. the most foreground one.
    ///
    /// Nodes outside the tree rank below every node inside it; ties keep the
    /// earliest input.
    pub fn find_top_most(&self, nodes: &[NodeKey]) -> Option<NodeKey> {
        let first = *nodes.first()?;
        if nodes.len() == 1 {
            return Some(first);
        }
        let rank: FxHashMap<NodeKey, usize> = self
            .depth_order()
            .into_iter()
            .enumerate()
            .map(|(i, k)| (k, i))
            .collect();
        let mut best = first;
        let mut best_rank = rank.get(&first);
        for k in &nodes[1..] {
            let r = rank.get(k);
            if r > best_rank {
                best = *k;
                best_rank = r;
            }
        }
        Some(best)
    }

    /// Insertion point just below `key` in draw order.
    pub(crate) fn location_below(&self, key: NodeKey) -> (GroupKey, Option<NodeKey>) {
        match self.nodes.get(key).and_then(|n| n.parent) {
            Some(parent) => (parent, Some(key)),
            None => (self.root, None),
        }
    }

    /// Insertion point just above `key` in draw order.
    pub(crate) fn location_above(&self, key: NodeKey) -> (GroupKey, Option<NodeKey>) {
        match self.nodes.get(key) {
            Some(Node {
                parent: Some(parent),
                next_sibling,
                ..
            }) => (*parent, *next_sibling),
            _ => (self.root, None),
        }
    }

    pub(crate) fn check_location(&self, parent: GroupKey, next_sibling: Option<NodeKey>) -> Result<()> {
        self.try_group(parent)?;
        if let Some(sibling) = next_sibling {
            if self.try_node(sibling)?.parent != Some(parent) {
                return Err(Error::NotAChild { sibling, parent });
            }
        }
        Ok(())
    }

    /// Unlinks `child` from the tree without recording a change.
    pub(crate) fn detach(&mut self, child: NodeKey) {
        let Some(node) = self.nodes.get_mut(child) else {
            return;
        };
        let Some(parent) = node.parent.take() else {
            return;
        };
        let previous = node.previous_sibling.take();
        let next = node.next_sibling.take();

        match previous {
            Some(p) => {
                if let Some(n) = self.nodes.get_mut(p) {
                    n.next_sibling = next;
                }
            }
            None => {
                if let Ok(g) = self.try_group_mut(parent) {
                    g.first_child = next;
                }
            }
        }
        match next {
            Some(n) => {
                if let Some(node) = self.nodes.get_mut(n) {
                    node.previous_sibling = previous;
                }
            }
            None => {
                if let Ok(g) = self.try_group_mut(parent) {
                    g.last_child = previous;
                }
            }
        }
    }

    /// Links a detached `child` under `parent` before `next_sibling`.
    pub(crate) fn attach(&mut self, parent: GroupKey, next_sibling: Option<NodeKey>, child: NodeKey) {
        let previous = match next_sibling {
            Some(n) => self.nodes.get(n).and_then(|node| node.previous_sibling),
            None => self.last_child(parent),
        };

        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
            node.previous_sibling = previous;
            node.next_sibling = next_sibling;
        }

        match previous {
            Some(p) => {
                if let Some(node) = self.nodes.get_mut(p) {
                    node.next_sibling = Some(child);
                }
            }
            None => {
                if let Ok(g) = self.try_group_mut(parent) {
                    g.first_child = Some(child);
                }
            }
        }
        match next_sibling {
            Some(n) => {
                if let Some(node) = self.nodes.get_mut(n) {
                    node.previous_sibling = Some(child);
                }
            }
            None => {
                if let Ok(g) = self.try_group_mut(parent) {
                    g.last_child = Some(child);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AnimTime;
    use nalgebra::Point2;

    fn vertex(complex: &mut Complex, parent: GroupKey) -> NodeKey {
        complex
            .create_key_vertex(Point2::origin(), parent, None, AnimTime::default())
            .unwrap()
            .key()
    }

    #[test]
    fn append_and_iterate_children() {
        let mut complex = Complex::new();
        let root = complex.root();
        let a = vertex(&mut complex, root);
        let b = vertex(&mut complex, root);
        let c = vertex(&mut complex, root);
        assert_eq!(complex.children(root).collect::<Vec<_>>(), vec![a, b, c]);
        assert_eq!(complex.first_child(root), Some(a));
        assert_eq!(complex.last_child(root), Some(c));
        assert_eq!(complex.previous_sibling(b), Some(a));
        assert_eq!(complex.next_sibling(b), Some(c));
    }

    #[test]
    fn insert_child_moves_between_parents() {
        let mut complex = Complex::new();
        let root = complex.root();
        let g = complex.create_group(root, None).unwrap();
        let a = vertex(&mut complex, root);
        let b = vertex(&mut complex, g);

        complex.insert_child(g, Some(b), a).unwrap();
        assert_eq!(complex.children(g).collect::<Vec<_>>(), vec![a, b]);
        assert_eq!(complex.children(root).collect::<Vec<_>>(), vec![g.node()]);
        assert_eq!(complex.parent_group(a), Some(g));
    }

    #[test]
    fn insert_child_rejects_cycles() {
        let mut complex = Complex::new();
        let root = complex.root();
        let outer = complex.create_group(root, None).unwrap();
        let inner = complex.create_group(outer, None).unwrap();
        assert!(matches!(
            complex.insert_child(inner, None, outer.node()),
            Err(Error::CyclicReparent { .. })
        ));
        assert!(complex.insert_child(outer, None, outer.node()).is_err());
        assert!(complex.insert_child(inner, None, root.node()).is_err());
    }

    #[test]
    fn insert_child_rejects_foreign_sibling() {
        let mut complex = Complex::new();
        let root = complex.root();
        let g = complex.create_group(root, None).unwrap();
        let a = vertex(&mut complex, root);
        let b = vertex(&mut complex, root);
        assert!(matches!(
            complex.insert_child(g, Some(a), b),
            Err(Error::NotAChild { .. })
        ));
    }

    #[test]
    fn unparent_detaches() {
        let mut complex = Complex::new();
        let root = complex.root();
        let a = vertex(&mut complex, root);
        let b = vertex(&mut complex, root);
        complex.unparent(a).unwrap();
        assert_eq!(complex.children(root).collect::<Vec<_>>(), vec![b]);
        assert_eq!(complex.parent_group(a), None);
        assert_eq!(complex.previous_sibling(b), None);
        assert!(complex.unparent(root.node()).is_err());
    }

    #[test]
    fn depth_order_is_preorder() {
        let mut complex = Complex::new();
        let root = complex.root();
        let a = vertex(&mut complex, root);
        let g = complex.create_group(root, None).unwrap();
        let b = vertex(&mut complex, g);
        let c = vertex(&mut complex, root);
        assert_eq!(complex.depth_order(), vec![a, g.node(), b, c]);
    }

    #[test]
    fn find_top_most_prefers_foreground() {
        let mut complex = Complex::new();
        let root = complex.root();
        let a = vertex(&mut complex, root);
        let g = complex.create_group(root, None).unwrap();
        let b = vertex(&mut complex, g);
        let c = vertex(&mut complex, root);
        assert_eq!(complex.find_top_most(&[a, b]), Some(b));
        assert_eq!(complex.find_top_most(&[c, b, a]), Some(c));
        assert_eq!(complex.find_top_most(&[]), None);

        complex.unparent(c).unwrap();
        assert_eq!(complex.find_top_most(&[c, a]), Some(a));
    }
}
