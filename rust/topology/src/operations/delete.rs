// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hard deletion.

use crate::cell_type::CellType;
use crate::complex::Complex;
use crate::error::{Error, Result};
use crate::keys::{GroupKey, NodeKey};
use crate::node::NodeKind;

impl Complex {
    /// Deletes a node and everything that depends on it.
    ///
    /// Deleting a group deletes its descendants. Deleting a cell deletes, transitively, every
    /// cell in its star. With `delete_isolated_vertices`, key vertices in the boundary of a
    /// deleted cell that are left with an empty star are deleted too.
    pub fn hard_delete(&mut self, key: NodeKey, delete_isolated_vertices: bool) -> Result<()> {
        if key == self.root.node() {
            return Err(Error::RootModification("deleted"));
        }
        self.try_node(key)?;

        let mut doomed = Vec::new();
        let mut stack = vec![key];
        while let Some(k) = stack.pop() {
            if !self.mark_for_deletion(k) {
                continue;
            }
            doomed.push(k);
            match &self.nodes[k].kind {
                NodeKind::Group(_) => stack.extend(self.children(GroupKey(k))),
                NodeKind::Cell(cell) => stack.extend(cell.star.iter().map(|s| s.key())),
            }
        }

        if delete_isolated_vertices {
            let candidates: Vec<NodeKey> = doomed
                .iter()
                .filter_map(|&k| self.nodes[k].as_cell())
                .flat_map(|c| c.boundary.iter())
                .filter(|b| b.cell_type() == CellType::KeyVertex)
                .map(|b| b.key())
                .collect();
            for v in candidates {
                let isolated = self.nodes.get(v).and_then(|n| n.as_cell()).is_some_and(|c| {
                    c.star
                        .iter()
                        .all(|s| self.nodes.get(s.key()).map_or(true, |n| n.is_being_deleted))
                });
                if isolated && self.mark_for_deletion(v) {
                    doomed.push(v);
                }
            }
        }

        // Surviving cells only lose star entries: a cell having a doomed cell in its boundary is
        // in that cell's star, hence doomed as well.
        for &k in &doomed {
            let boundary: Vec<NodeKey> = match self.nodes[k].as_cell() {
                Some(c) => c.boundary.iter().map(|b| b.key()).collect(),
                None => Vec::new(),
            };
            for b in boundary {
                if let Some(cell) = self
                    .nodes
                    .get_mut(b)
                    .filter(|n| !n.is_being_deleted)
                    .and_then(|n| n.as_cell_mut())
                {
                    cell.star.retain(|s| s.key() != k);
                }
            }
            self.detach(k);
        }

        for &k in &doomed {
            if let Some(node) = self.nodes.remove(k) {
                self.ids.remove(&node.id);
                self.diff.on_destroyed(node.id);
            }
        }

        tracing::debug!(count = doomed.len(), "hard delete");
        Ok(())
    }

    /// Flags a node as being deleted. Returns `false` if it already was (or
    /// does not exist).
    fn mark_for_deletion(&mut self, key: NodeKey) -> bool {
        match self.nodes.get_mut(key) {
            Some(node) if !node.is_being_deleted => {
                node.is_being_deleted = true;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycle::KeyCycle;
    use crate::edge_data::KeyEdgeData;
    use crate::halfedge::KeyHalfedge;
    use crate::time::AnimTime;
    use nalgebra::Point2;
    use vac_lite_geometry::Stroke2d;

    struct Fixture {
        complex: Complex,
        a: crate::KeyVertexKey,
        b: crate::KeyVertexKey,
        e: crate::KeyEdgeKey,
        f: crate::KeyFaceKey,
    }

    fn fixture() -> Fixture {
        let mut complex = Complex::new();
        let root = complex.root();
        let t = AnimTime::default();
        let a = complex.create_key_vertex(Point2::new(0.0, 0.0), root, None, t).unwrap();
        let b = complex.create_key_vertex(Point2::new(1.0, 0.0), root, None, t).unwrap();
        let e = complex
            .create_key_open_edge(
                a,
                b,
                KeyEdgeData::new(Stroke2d::segment(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0))),
                root,
                None,
            )
            .unwrap();
        let f = complex
            .create_key_face(
                vec![KeyCycle::from_halfedges(vec![
                    KeyHalfedge::new(e, true),
                    KeyHalfedge::new(e, false),
                ])],
                root,
                None,
                t,
            )
            .unwrap();
        Fixture { complex, a, b, e, f }
    }

    #[test]
    fn deleting_a_vertex_cascades_to_star() {
        let Fixture { mut complex, a, b, e, f } = fixture();
        complex.hard_delete(a.key(), false).unwrap();
        assert!(!complex.contains(a));
        assert!(!complex.contains(e));
        assert!(!complex.contains(f));
        assert!(complex.contains(b));
        assert!(complex.star(b).is_empty());
        assert!(complex.is_star_boundary_consistent());
        assert_eq!(complex.children(complex.root()).count(), 1);
    }

    #[test]
    fn isolated_vertices_are_optionally_deleted() {
        let Fixture { mut complex, a, b, e, f } = fixture();
        complex.hard_delete(e.key(), true).unwrap();
        assert!(!complex.contains(f));
        assert!(!complex.contains(a));
        assert!(!complex.contains(b));
        assert_eq!(complex.cell_count(), 0);
    }

    #[test]
    fn deleting_a_group_deletes_descendants() {
        let mut complex = Complex::new();
        let root = complex.root();
        let g = complex.create_group(root, None).unwrap();
        let v = complex
            .create_key_vertex(Point2::origin(), g, None, AnimTime::default())
            .unwrap();
        let outside = complex
            .create_key_vertex(Point2::origin(), root, None, AnimTime::default())
            .unwrap();
        complex.take_diff();

        complex.hard_delete(g.node(), false).unwrap();
        assert!(!complex.contains(v));
        assert!(complex.contains(outside));
        assert_eq!(complex.node_count(), 2);
        assert_eq!(complex.take_diff().destroyed().len(), 2);
        assert!(complex.hard_delete(root.node(), false).is_err());
    }
}
