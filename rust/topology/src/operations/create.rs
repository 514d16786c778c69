// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Creation of groups and cells.
//!
//! Each factory checks that every referenced cell exists with the right type
//! and time, inserts the new node in the tree (under `parent`, just before
//! `next_sibling`, or last) and links it into the star of its boundary.

use nalgebra::Point2;

use crate::cast::{
    CellKey, InbetweenEdgeKey, InbetweenFaceKey, InbetweenVertexKey, KeyEdgeKey, KeyFaceKey,
    KeyVertexKey,
};
use crate::cell::{
    Cell, CellData, InbetweenEdge, InbetweenFace, InbetweenVertex, KeyCell, KeyEdge, KeyFace,
    KeyVertex,
};
use crate::cell_type::CellType;
use crate::complex::Complex;
use crate::cycle::KeyCycle;
use crate::edge_data::KeyEdgeData;
use crate::error::{Error, Result};
use crate::halfedge::KeyHalfedge;
use crate::keys::{GroupKey, NodeKey};
use crate::node::{Group, Node, NodeKind};
use crate::properties::Properties;
use crate::time::{AnimTime, AnimTimeRange};

impl Complex {
    pub fn create_group(&mut self, parent: GroupKey, next_sibling: Option<NodeKey>) -> Result<GroupKey> {
        self.check_location(parent, next_sibling)?;
        let key = self.insert_node(Node::new(NodeKind::Group(Group::new())), parent, next_sibling);
        let group = GroupKey(key);
        self.update_transforms_from_root(group);
        Ok(group)
    }

    pub fn create_key_vertex(
        &mut self,
        position: Point2<f64>,
        parent: GroupKey,
        next_sibling: Option<NodeKey>,
        time: AnimTime,
    ) -> Result<KeyVertexKey> {
        if !position.x.is_finite() || !position.y.is_finite() {
            return Err(Error::InvalidInput(format!("non-finite vertex position {position}")));
        }
        let key = self.insert_cell(
            CellData::KeyVertex(KeyVertex { time, position }),
            parent,
            next_sibling,
        )?;
        Ok(KeyVertexKey::new_unchecked(key, CellType::KeyVertex))
    }

    /// Creates an open edge from `start` to `end`. The stroke is snapped to
    /// the vertex positions.
    pub fn create_key_open_edge(
        &mut self,
        start: KeyVertexKey,
        end: KeyVertexKey,
        mut data: KeyEdgeData,
        parent: GroupKey,
        next_sibling: Option<NodeKey>,
    ) -> Result<KeyEdgeKey> {
        if data.is_closed() {
            return Err(Error::InvalidInput("an open edge needs an open stroke".to_string()));
        }
        let (time, p0) = {
            let v = self.key_vertex(start)?;
            (v.time(), v.position())
        };
        let (end_time, p1) = {
            let v = self.key_vertex(end)?;
            (v.time(), v.position())
        };
        if end_time != time {
            return Err(Error::TimeMismatch {
                expected: time,
                found: end_time,
            });
        }
        data.snap(p0, p1);
        let key = self.insert_cell(
            CellData::KeyEdge(KeyEdge {
                time,
                start_vertex: Some(start),
                end_vertex: Some(end),
                data,
            }),
            parent,
            next_sibling,
        )?;
        Ok(KeyEdgeKey::new_unchecked(key, CellType::KeyEdge))
    }

    pub fn create_key_closed_edge(
        &mut self,
        data: KeyEdgeData,
        parent: GroupKey,
        next_sibling: Option<NodeKey>,
        time: AnimTime,
    ) -> Result<KeyEdgeKey> {
        if !data.is_closed() {
            return Err(Error::InvalidInput("a closed edge needs a closed stroke".to_string()));
        }
        let key = self.insert_cell(
            CellData::KeyEdge(KeyEdge {
                time,
                start_vertex: None,
                end_vertex: None,
                data,
            }),
            parent,
            next_sibling,
        )?;
        Ok(KeyEdgeKey::new_unchecked(key, CellType::KeyEdge))
    }

    /// Creates a face bounded by `cycles`, each of which must be valid and
    /// made of cells living at `time`.
    pub fn create_key_face(
        &mut self,
        cycles: Vec<KeyCycle>,
        parent: GroupKey,
        next_sibling: Option<NodeKey>,
        time: AnimTime,
    ) -> Result<KeyFaceKey> {
        self.insert_key_face(cycles, Properties::default(), parent, next_sibling, time)
    }

    pub(crate) fn insert_key_face(
        &mut self,
        cycles: Vec<KeyCycle>,
        properties: Properties,
        parent: GroupKey,
        next_sibling: Option<NodeKey>,
        time: AnimTime,
    ) -> Result<KeyFaceKey> {
        for (i, cycle) in cycles.iter().enumerate() {
            self.check_cycle(cycle, time)
                .map_err(|e| match e {
                    Error::InvalidCycle(msg) => Error::InvalidCycle(format!("cycle {i}: {msg}")),
                    other => other,
                })?;
        }
        let key = self.insert_cell(
            CellData::KeyFace(KeyFace {
                time,
                cycles,
                properties,
            }),
            parent,
            next_sibling,
        )?;
        Ok(KeyFaceKey::new_unchecked(key, CellType::KeyFace))
    }

    fn check_cycle(&self, cycle: &KeyCycle, time: AnimTime) -> Result<()> {
        let mut times = Vec::new();
        if let Some(v) = cycle.steiner_vertex() {
            times.push(self.key_vertex(v)?.time());
        }
        for h in cycle.halfedges() {
            times.push(self.key_edge(h.edge())?.time());
        }
        if let Some(&found) = times.iter().find(|&&t| t != time) {
            return Err(Error::TimeMismatch {
                expected: time,
                found,
            });
        }
        if !cycle.is_valid(self) {
            return Err(Error::InvalidCycle("not a closed walk".to_string()));
        }
        Ok(())
    }

    pub fn create_inbetween_vertex(
        &mut self,
        before: KeyVertexKey,
        after: KeyVertexKey,
        parent: GroupKey,
        next_sibling: Option<NodeKey>,
    ) -> Result<InbetweenVertexKey> {
        let range = AnimTimeRange::new(self.key_vertex(before)?.time(), self.key_vertex(after)?.time())?;
        let key = self.insert_cell(
            CellData::InbetweenVertex(InbetweenVertex {
                before,
                after,
                range,
            }),
            parent,
            next_sibling,
        )?;
        Ok(InbetweenVertexKey::new_unchecked(key, CellType::InbetweenVertex))
    }

    /// Creates an edge interpolating `before` into `after`.
    ///
    /// Both halfedges must be closed, or both open. Open ones need the
    /// inbetween vertices interpolating their start and end vertices.
    pub fn create_inbetween_edge(
        &mut self,
        before: KeyHalfedge,
        after: KeyHalfedge,
        start_vertex: Option<InbetweenVertexKey>,
        end_vertex: Option<InbetweenVertexKey>,
        parent: GroupKey,
        next_sibling: Option<NodeKey>,
    ) -> Result<InbetweenEdgeKey> {
        let range = AnimTimeRange::new(
            self.key_edge(before.edge())?.time(),
            self.key_edge(after.edge())?.time(),
        )?;
        let closed = before.is_closed(self);
        if closed != after.is_closed(self) {
            return Err(Error::InvalidInput(
                "cannot interpolate between an open and a closed edge".to_string(),
            ));
        }
        if closed {
            if start_vertex.is_some() || end_vertex.is_some() {
                return Err(Error::InvalidInput(
                    "a closed inbetween edge has no end vertices".to_string(),
                ));
            }
        } else {
            let (Some(start), Some(end)) = (start_vertex, end_vertex) else {
                return Err(Error::InvalidInput(
                    "an open inbetween edge needs two end vertices".to_string(),
                ));
            };
            let matches = |iv: InbetweenVertexKey, b: Option<KeyVertexKey>, a: Option<KeyVertexKey>| -> Result<bool> {
                let iv = self.inbetween_vertex(iv)?;
                Ok(Some(iv.before_vertex()) == b && Some(iv.after_vertex()) == a)
            };
            if !matches(start, before.start_vertex(self), after.start_vertex(self))?
                || !matches(end, before.end_vertex(self), after.end_vertex(self))?
            {
                return Err(Error::InvalidInput(
                    "inbetween vertices do not interpolate the halfedge end vertices".to_string(),
                ));
            }
        }
        let key = self.insert_cell(
            CellData::InbetweenEdge(InbetweenEdge {
                before,
                after,
                start_vertex,
                end_vertex,
                range,
            }),
            parent,
            next_sibling,
        )?;
        Ok(InbetweenEdgeKey::new_unchecked(key, CellType::InbetweenEdge))
    }

    /// Creates a face interpolating the key faces `before` into `after`.
    pub fn create_inbetween_face(
        &mut self,
        before: Vec<KeyFaceKey>,
        after: Vec<KeyFaceKey>,
        parent: GroupKey,
        next_sibling: Option<NodeKey>,
    ) -> Result<InbetweenFaceKey> {
        let start = self.common_face_time(&before)?;
        let end = self.common_face_time(&after)?;
        let range = AnimTimeRange::new(start, end)?;
        let key = self.insert_cell(
            CellData::InbetweenFace(InbetweenFace {
                before,
                after,
                range,
            }),
            parent,
            next_sibling,
        )?;
        Ok(InbetweenFaceKey::new_unchecked(key, CellType::InbetweenFace))
    }

    fn common_face_time(&self, faces: &[KeyFaceKey]) -> Result<AnimTime> {
        let (&first, rest) = faces
            .split_first()
            .ok_or(Error::EmptyInput("an inbetween face needs key faces on both sides"))?;
        let time = self.key_face(first)?.time();
        for &f in rest {
            let found = self.key_face(f)?.time();
            if found != time {
                return Err(Error::TimeMismatch {
                    expected: time,
                    found,
                });
            }
        }
        Ok(time)
    }

    /// Moves a key vertex and re-snaps its incident edges.
    pub fn set_key_vertex_position(&mut self, vertex: KeyVertexKey, position: Point2<f64>) -> Result<()> {
        self.key_vertex_mut(vertex)?.position = position;
        let id = self.id_of(vertex.key());
        self.diff.on_geometry_changed(id);
        let incident: Vec<KeyEdgeKey> = self.star(vertex).iter().filter_map(|c| c.to_key_edge()).collect();
        for e in incident {
            self.snap_key_edge(e)?;
        }
        Ok(())
    }

    /// Replaces the geometry of a key edge. Open edges keep their vertices
    /// and the new stroke is snapped to them.
    pub fn set_key_edge_data(&mut self, edge: KeyEdgeKey, data: KeyEdgeData) -> Result<()> {
        let e = self.key_edge_mut(edge)?;
        if data.is_closed() != (e.start_vertex.is_none()) {
            return Err(Error::InvalidInput(
                "new edge data must keep the edge open or closed".to_string(),
            ));
        }
        e.data = data;
        let id = self.id_of(edge.key());
        self.diff.on_geometry_changed(id);
        self.snap_key_edge(edge)
    }

    /// Snaps the stroke of an open edge to its vertices.
    pub(crate) fn snap_key_edge(&mut self, edge: KeyEdgeKey) -> Result<()> {
        let (start, end) = {
            let e = self.key_edge(edge)?;
            match (e.start_vertex, e.end_vertex) {
                (Some(s), Some(t)) => (s, t),
                _ => return Ok(()),
            }
        };
        let p0 = self.key_vertex(start)?.position();
        let p1 = self.key_vertex(end)?.position();
        self.key_edge_mut(edge)?.data.snap(p0, p1);
        let id = self.id_of(edge.key());
        self.diff.on_geometry_changed(id);
        Ok(())
    }

    /// Inserts a new cell in the tree and links its boundary.
    pub(crate) fn insert_cell(
        &mut self,
        data: CellData,
        parent: GroupKey,
        next_sibling: Option<NodeKey>,
    ) -> Result<NodeKey> {
        self.check_location(parent, next_sibling)?;
        let cell_type = data.cell_type();
        let key = self.insert_node(Node::new(NodeKind::Cell(Cell::new(data))), parent, next_sibling);
        let cell = CellKey::new_unchecked(key, cell_type);
        for b in self.expected_boundary(key)? {
            self.add_to_boundary(cell, b);
        }
        tracing::trace!(cell = ?cell, "created cell");
        Ok(key)
    }

    fn insert_node(&mut self, node: Node, parent: GroupKey, next_sibling: Option<NodeKey>) -> NodeKey {
        let id = node.id;
        let key = self.nodes.insert(node);
        self.ids.insert(id, key);
        self.attach(parent, next_sibling, key);
        self.diff.on_created(id);
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vac_lite_geometry::Stroke2d;

    fn segment(a: (f64, f64), b: (f64, f64)) -> KeyEdgeData {
        KeyEdgeData::new(Stroke2d::segment(Point2::new(a.0, a.1), Point2::new(b.0, b.1)))
    }

    #[test]
    fn open_edge_links_vertices() {
        let mut complex = Complex::new();
        let root = complex.root();
        let t = AnimTime::default();
        let a = complex.create_key_vertex(Point2::new(0.0, 0.0), root, None, t).unwrap();
        let b = complex.create_key_vertex(Point2::new(1.0, 0.0), root, None, t).unwrap();
        let e = complex
            .create_key_open_edge(a, b, segment((0.0, 0.0), (1.0, 1.0)), root, None)
            .unwrap();

        assert_eq!(complex.star(a), &[e.as_cell()]);
        assert_eq!(complex.star(b), &[e.as_cell()]);
        assert_eq!(complex.boundary(e).len(), 2);
        // Snapped to the end vertex.
        assert_eq!(
            complex.key_edge(e).unwrap().data().stroke().end_point(),
            Point2::new(1.0, 0.0)
        );
        assert!(complex.is_star_boundary_consistent());
    }

    #[test]
    fn open_edge_rejects_time_mismatch() {
        let mut complex = Complex::new();
        let root = complex.root();
        let a = complex
            .create_key_vertex(Point2::new(0.0, 0.0), root, None, AnimTime::new(0.0))
            .unwrap();
        let b = complex
            .create_key_vertex(Point2::new(1.0, 0.0), root, None, AnimTime::new(1.0))
            .unwrap();
        assert!(matches!(
            complex.create_key_open_edge(a, b, segment((0.0, 0.0), (1.0, 0.0)), root, None),
            Err(Error::TimeMismatch { .. })
        ));
        assert_eq!(complex.cell_count(), 2);
    }

    #[test]
    fn face_rejects_open_walk() {
        let mut complex = Complex::new();
        let root = complex.root();
        let t = AnimTime::default();
        let a = complex.create_key_vertex(Point2::new(0.0, 0.0), root, None, t).unwrap();
        let b = complex.create_key_vertex(Point2::new(1.0, 0.0), root, None, t).unwrap();
        let e = complex
            .create_key_open_edge(a, b, segment((0.0, 0.0), (1.0, 0.0)), root, None)
            .unwrap();
        let cycle = KeyCycle::from_halfedges(vec![KeyHalfedge::new(e, true)]);
        assert!(matches!(
            complex.create_key_face(vec![cycle], root, None, t),
            Err(Error::InvalidCycle(_))
        ));

        let there_and_back = KeyCycle::from_halfedges(vec![KeyHalfedge::new(e, true), KeyHalfedge::new(e, false)]);
        let f = complex.create_key_face(vec![there_and_back], root, None, t).unwrap();
        assert!(complex.star(e).contains(&f.as_cell()));
        assert!(complex.star(a).contains(&f.as_cell()));
    }

    #[test]
    fn inbetween_edge_checks_vertices() {
        let mut complex = Complex::new();
        let root = complex.root();
        let (t0, t1) = (AnimTime::new(0.0), AnimTime::new(1.0));
        let a0 = complex.create_key_vertex(Point2::new(0.0, 0.0), root, None, t0).unwrap();
        let b0 = complex.create_key_vertex(Point2::new(1.0, 0.0), root, None, t0).unwrap();
        let a1 = complex.create_key_vertex(Point2::new(0.0, 1.0), root, None, t1).unwrap();
        let b1 = complex.create_key_vertex(Point2::new(1.0, 1.0), root, None, t1).unwrap();
        let e0 = complex
            .create_key_open_edge(a0, b0, segment((0.0, 0.0), (1.0, 0.0)), root, None)
            .unwrap();
        let e1 = complex
            .create_key_open_edge(a1, b1, segment((0.0, 1.0), (1.0, 1.0)), root, None)
            .unwrap();
        let ia = complex.create_inbetween_vertex(a0, a1, root, None).unwrap();
        let ib = complex.create_inbetween_vertex(b0, b1, root, None).unwrap();

        assert!(complex
            .create_inbetween_edge(
                KeyHalfedge::new(e0, true),
                KeyHalfedge::new(e1, true),
                Some(ib),
                Some(ia),
                root,
                None
            )
            .is_err());
        let ie = complex
            .create_inbetween_edge(
                KeyHalfedge::new(e0, true),
                KeyHalfedge::new(e1, true),
                Some(ia),
                Some(ib),
                root,
                None,
            )
            .unwrap();
        assert!(complex.star(e0).contains(&ie.as_cell()));
        assert!(complex.star(ia).contains(&ie.as_cell()));
        assert!(complex.cells_at(AnimTime::new(0.5)).contains(&ie.as_cell()));
        assert!(complex.is_star_boundary_consistent());
    }

    #[test]
    fn moving_a_vertex_resnaps_edges() {
        let mut complex = Complex::new();
        let root = complex.root();
        let t = AnimTime::default();
        let a = complex.create_key_vertex(Point2::new(0.0, 0.0), root, None, t).unwrap();
        let b = complex.create_key_vertex(Point2::new(1.0, 0.0), root, None, t).unwrap();
        let e = complex
            .create_key_open_edge(a, b, segment((0.0, 0.0), (1.0, 0.0)), root, None)
            .unwrap();
        complex.take_diff();

        complex.set_key_vertex_position(b, Point2::new(3.0, 0.0)).unwrap();
        let stroke = complex.key_edge(e).unwrap().data().stroke();
        assert_eq!(stroke.end_point(), Point2::new(3.0, 0.0));
        let diff = complex.take_diff();
        assert!(diff.geometry_changed().contains(&complex.node_id(e).unwrap()));
    }
}
