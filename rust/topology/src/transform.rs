// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Group transforms and rigid moves of key cells.
//!
//! Each group stores its local transform and the composed transform from
//! the root. The composed one is recomputed eagerly for the whole subtree
//! whenever a local transform changes or a group is moved to another parent.

use nalgebra::{Affine2, Vector2};
use rustc_hash::FxHashSet;

use crate::cast::{CellKey, KeyEdgeKey, KeyVertexKey};
use crate::cell::CellData;
use crate::complex::Complex;
use crate::error::Result;
use crate::keys::{GroupKey, NodeKey};

impl Complex {
    pub fn group_transform(&self, group: GroupKey) -> Result<Affine2<f64>> {
        Ok(self.try_group(group)?.transform)
    }

    pub fn group_transform_from_root(&self, group: GroupKey) -> Result<Affine2<f64>> {
        Ok(self.try_group(group)?.transform_from_root)
    }

    /// Sets the local transform of a group and updates its subtree.
    pub fn set_group_transform(&mut self, group: GroupKey, transform: Affine2<f64>) -> Result<()> {
        self.try_group_mut(group)?.transform = transform;
        self.update_transforms_from_root(group);
        Ok(())
    }

    /// Transform from the local coordinates of a node to root coordinates.
    ///
    /// For a group this includes its own transform; for a cell it is the
    /// transform of its parent group.
    pub fn node_transform_from_root(&self, key: impl Into<NodeKey>) -> Result<Affine2<f64>> {
        let key = key.into();
        let node = self.try_node(key)?;
        if let Some(group) = node.as_group() {
            return Ok(group.transform_from_root);
        }
        match node.parent {
            Some(parent) => self.group_transform_from_root(parent),
            None => Ok(Affine2::identity()),
        }
    }

    /// Recomputes the composed transforms of `group` and its descendants.
    pub(crate) fn update_transforms_from_root(&mut self, group: GroupKey) {
        let parent_transform = self
            .nodes
            .get(group.node())
            .and_then(|n| n.parent)
            .and_then(|p| self.try_group(p).ok())
            .map(|g| g.transform_from_root)
            .unwrap_or_else(Affine2::identity);

        let mut stack = vec![(group, parent_transform)];
        while let Some((g, parent_transform)) = stack.pop() {
            let Ok(data) = self.try_group_mut(g) else {
                continue;
            };
            data.transform_from_root = parent_transform * data.transform;
            let composed = data.transform_from_root;

            let id = self.id_of(g.node());
            self.diff.on_transformed(id);

            let children: Vec<NodeKey> = self.children(g).collect();
            for child in children {
                match self.group_key(child) {
                    Some(child_group) => stack.push((child_group, composed)),
                    None => {
                        let id = self.id_of(child);
                        self.diff.on_transformed(id);
                    }
                }
            }
        }
    }

    /// Translates key cells by `delta`.
    ///
    /// Vertices of the given edges and faces move along with them. Edges that
    /// are not moved but share a moved vertex are re-snapped to it.
    pub fn translate_key_cells(&mut self, cells: &[CellKey], delta: Vector2<f64>) -> Result<()> {
        let mut vertices: FxHashSet<KeyVertexKey> = FxHashSet::default();
        let mut edges: FxHashSet<KeyEdgeKey> = FxHashSet::default();

        for &cell in cells {
            match self.cell_data(cell)? {
                CellData::KeyVertex(_) => {
                    vertices.extend(cell.to_key_vertex());
                }
                CellData::KeyEdge(e) => {
                    edges.extend(cell.to_key_edge());
                    vertices.extend(e.start_vertex);
                    vertices.extend(e.end_vertex);
                }
                CellData::KeyFace(_) => {
                    for &b in self.boundary(cell) {
                        vertices.extend(b.to_key_vertex());
                        edges.extend(b.to_key_edge());
                    }
                }
                _ => {}
            }
        }

        for &e in &edges {
            self.key_edge_mut(e)?.data.translate(delta);
            let id = self.id_of(e.key());
            self.diff.on_geometry_changed(id);
        }
        for &v in &vertices {
            self.key_vertex_mut(v)?.position += delta;
            let id = self.id_of(v.key());
            self.diff.on_geometry_changed(id);
        }
        for &v in &vertices {
            let incident: Vec<KeyEdgeKey> = self
                .star(v)
                .iter()
                .filter_map(|c| c.to_key_edge())
                .filter(|e| !edges.contains(e))
                .collect();
            for e in incident {
                self.snap_key_edge(e)?;
            }
        }

        tracing::debug!(
            vertices = vertices.len(),
            edges = edges.len(),
            "translated key cells"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge_data::KeyEdgeData;
    use crate::time::AnimTime;
    use approx::assert_relative_eq;
    use nalgebra::{Point2, Translation2};
    use vac_lite_geometry::Stroke2d;

    #[test]
    fn nested_transforms_compose() {
        let mut complex = Complex::new();
        let root = complex.root();
        let outer = complex.create_group(root, None).unwrap();
        let inner = complex.create_group(outer, None).unwrap();

        complex
            .set_group_transform(outer, nalgebra::convert(Translation2::new(1.0, 0.0)))
            .unwrap();
        complex
            .set_group_transform(inner, nalgebra::convert(Translation2::new(0.0, 2.0)))
            .unwrap();

        let p = complex.group_transform_from_root(inner).unwrap() * Point2::origin();
        assert_relative_eq!(p, Point2::new(1.0, 2.0));

        complex.insert_child(root, None, inner.node()).unwrap();
        let p = complex.group_transform_from_root(inner).unwrap() * Point2::origin();
        assert_relative_eq!(p, Point2::new(0.0, 2.0));
    }

    #[test]
    fn cell_uses_parent_transform() {
        let mut complex = Complex::new();
        let root = complex.root();
        let g = complex.create_group(root, None).unwrap();
        complex
            .set_group_transform(g, nalgebra::convert(Translation2::new(3.0, 0.0)))
            .unwrap();
        let v = complex
            .create_key_vertex(Point2::origin(), g, None, AnimTime::default())
            .unwrap();
        let p = complex.node_transform_from_root(v).unwrap() * Point2::origin();
        assert_relative_eq!(p, Point2::new(3.0, 0.0));
    }

    #[test]
    fn translating_a_vertex_resnaps_edges() {
        let mut complex = Complex::new();
        let root = complex.root();
        let t = AnimTime::default();
        let a = complex.create_key_vertex(Point2::new(0.0, 0.0), root, None, t).unwrap();
        let b = complex.create_key_vertex(Point2::new(4.0, 0.0), root, None, t).unwrap();
        let stroke = Stroke2d::with_constant_width(
            vec![Point2::new(0.0, 0.0), Point2::new(2.0, 0.0), Point2::new(4.0, 0.0)],
            1.0,
            false,
        )
        .unwrap();
        let e = complex
            .create_key_open_edge(a, b, KeyEdgeData::new(stroke), root, None)
            .unwrap();

        complex
            .translate_key_cells(&[b.as_cell()], Vector2::new(0.0, 2.0))
            .unwrap();
        let end = complex.key_edge(e).unwrap().data().stroke().end_point();
        assert_relative_eq!(end, Point2::new(4.0, 2.0));
        let start = complex.key_edge(e).unwrap().data().stroke().start_point();
        assert_relative_eq!(start, Point2::new(0.0, 0.0));
    }
}
