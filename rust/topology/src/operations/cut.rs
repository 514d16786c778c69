// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cutting edges and faces.
//!
//! An edge is cut at curve parameters into new vertices and edges whose
//! strokes are slices of the original one; every face using the edge then
//! walks the new edges instead. A face is cut by an edge added to its
//! boundary: either a closed edge lying inside it, or an open edge joining
//! two vertex usages of its cycles. Cut faces are replaced by new faces at
//! the same place in the tree.

use rustc_hash::FxHashSet;
use vac_lite_geometry::{signed_area, CurveParameter};

use crate::cast::{CellKey, KeyEdgeKey, KeyFaceKey, KeyVertexKey};
use crate::cell::{CellData, KeyCell};
use crate::cell_type::CellType;
use crate::complex::Complex;
use crate::cycle::{KeyCycle, KeyFaceVertexUsageIndex};
use crate::edge_data::KeyEdgeData;
use crate::error::{Error, Result};
use crate::geometry::interior_contained_ratio;
use crate::halfedge::KeyHalfedge;
use crate::operations::policy::{OneCycleCutPolicy, TwoCycleCutPolicy};
use crate::path::KeyPath;
use crate::time::AnimTime;

/// Cells created by [`Complex::cut_edge`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CutEdgeResult {
    /// One vertex per input parameter, in input order. Equal parameters of a
    /// closed edge cut all at once map to the same vertex.
    pub new_vertices: Vec<KeyVertexKey>,
    /// New edges in curve order.
    pub new_edges: Vec<KeyEdgeKey>,
}

/// Faces created by a face cut.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutFaceResult {
    pub face1: KeyFaceKey,
    /// The second face of a disk cut.
    pub face2: Option<KeyFaceKey>,
}

impl Complex {
    /// Cuts an edge at the given parameters.
    ///
    /// Parameters may come in any order and may repeat. A closed edge cut at
    /// `N` distinct places becomes a ring of `N` vertices and `N` edges; cut
    /// at a single place (all parameters equal) it becomes one vertex and one
    /// loop edge. An open edge becomes `N` vertices and `N + 1` edges from its
    /// start vertex to its end vertex.
    pub fn cut_edge(&mut self, edge: KeyEdgeKey, parameters: &[CurveParameter]) -> Result<CutEdgeResult> {
        let e = self.key_edge(edge)?;
        if parameters.is_empty() {
            return Ok(CutEdgeResult::default());
        }
        let data = e.data().clone();
        let time = e.time();
        let ends = (e.start_vertex(), e.end_vertex());

        if self.star(edge).iter().any(|c| c.cell_type() == CellType::InbetweenEdge) {
            return Err(Error::UnsupportedInbetweenStar(edge.key()));
        }

        let stroke = data.stroke();
        let parameters = parameters
            .iter()
            .map(|&p| stroke.normalize_parameter(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let mut order: Vec<usize> = (0..parameters.len()).collect();
        order.sort_by(|&i, &j| parameters[i].total_cmp(&parameters[j]));
        let sorted: Vec<CurveParameter> = order.iter().map(|&i| parameters[i]).collect();

        let (parent, next_sibling) = self.location_below(edge.key());

        let (sorted_vertices, new_edges) = match ends {
            (Some(start), Some(end)) => {
                let mut vertices = Vec::with_capacity(sorted.len());
                for p in &sorted {
                    vertices.push(self.create_key_vertex(stroke.eval(*p)?, parent, next_sibling, time)?);
                }
                let first = CurveParameter::new(0, 0.0);
                let last = CurveParameter::new(stroke.segment_count() - 1, 1.0);
                let mut bounds = vec![first];
                bounds.extend(sorted.iter().copied());
                bounds.push(last);
                let mut chain = vec![start];
                chain.extend(vertices.iter().copied());
                chain.push(end);

                let mut edges = Vec::with_capacity(sorted.len() + 1);
                for i in 0..=sorted.len() {
                    let piece = data.from_slice(bounds[i], bounds[i + 1], 0)?;
                    edges.push(self.create_key_open_edge(chain[i], chain[i + 1], piece, parent, next_sibling)?);
                }
                (vertices, edges)
            }
            _ if sorted.iter().all(|p| *p == sorted[0]) => {
                let v = self.create_key_vertex(stroke.eval(sorted[0])?, parent, next_sibling, time)?;
                let piece = data.from_slice(sorted[0], sorted[0], 1)?;
                let e = self.create_key_open_edge(v, v, piece, parent, next_sibling)?;
                (vec![v; sorted.len()], vec![e])
            }
            _ => {
                let n = sorted.len();
                let mut vertices = Vec::with_capacity(n);
                for p in &sorted {
                    vertices.push(self.create_key_vertex(stroke.eval(*p)?, parent, next_sibling, time)?);
                }
                let mut edges = Vec::with_capacity(n);
                for i in 0..n {
                    let j = (i + 1) % n;
                    let piece = data.from_slice(sorted[i], sorted[j], 0)?;
                    edges.push(self.create_key_open_edge(vertices[i], vertices[j], piece, parent, next_sibling)?);
                }
                (vertices, edges)
            }
        };

        let forward: Vec<KeyHalfedge> = new_edges.iter().map(|&e| KeyHalfedge::new(e, true)).collect();
        let backward: Vec<KeyHalfedge> = forward.iter().rev().map(KeyHalfedge::opposite).collect();
        let faces: Vec<CellKey> = self
            .star(edge)
            .iter()
            .copied()
            .filter(|c| c.to_key_face().is_some())
            .collect();
        for face in &faces {
            if let CellData::KeyFace(f) = &mut self.try_cell_mut(face.key())?.data {
                for cycle in &mut f.cycles {
                    let halfedges = cycle.halfedges_mut();
                    let mut replaced = Vec::with_capacity(halfedges.len() + forward.len());
                    for h in halfedges.iter() {
                        if h.edge() != edge {
                            replaced.push(*h);
                        } else if h.direction() {
                            replaced.extend_from_slice(&forward);
                        } else {
                            replaced.extend_from_slice(&backward);
                        }
                    }
                    *halfedges = replaced;
                }
            }
            self.sync_boundary(*face)?;
            debug_assert!(self
                .cell_data(*face)
                .ok()
                .and_then(|d| match d {
                    CellData::KeyFace(f) => Some(f.cycles.iter().all(|c| c.is_valid(self))),
                    _ => None,
                })
                .unwrap_or(false));
        }

        self.hard_delete(edge.key(), false)?;

        let mut new_vertices = sorted_vertices.clone();
        for (k, &i) in order.iter().enumerate() {
            new_vertices[i] = sorted_vertices[k];
        }
        tracing::debug!(
            parameters = parameters.len(),
            vertices = new_vertices.len(),
            edges = new_edges.len(),
            faces = faces.len(),
            "cut edge"
        );
        Ok(CutEdgeResult {
            new_vertices,
            new_edges,
        })
    }

    /// Adds a Steiner vertex at `position` to a face.
    pub fn cut_face_with_vertex(
        &mut self,
        face: KeyFaceKey,
        position: nalgebra::Point2<f64>,
    ) -> Result<KeyVertexKey> {
        let time = self.key_face(face)?.time();
        let (parent, next_sibling) = self.location_above(face.key());
        let v = self.create_key_vertex(position, parent, next_sibling, time)?;
        self.cut_glue_face_with_vertex(face, v)?;
        Ok(v)
    }

    /// Adds an existing vertex to a face as a new Steiner cycle. Existing
    /// cycle indices are unchanged.
    pub fn cut_glue_face_with_vertex(&mut self, face: KeyFaceKey, vertex: KeyVertexKey) -> Result<()> {
        let time = self.key_face(face)?.time();
        let vertex_time = self.key_vertex(vertex)?.time();
        if vertex_time != time {
            return Err(Error::TimeMismatch {
                expected: time,
                found: vertex_time,
            });
        }
        self.key_face_mut(face)?
            .cycles
            .push(KeyCycle::from_steiner_vertex(vertex));
        self.sync_boundary(face.as_cell())?;
        let id = self.id_of(face.key());
        self.diff.on_geometry_changed(id);
        tracing::debug!("cut face with vertex");
        Ok(())
    }

    /// Creates a closed edge above `face` and cuts the face with it.
    pub fn cut_face_with_closed_edge(
        &mut self,
        face: KeyFaceKey,
        data: KeyEdgeData,
        policy: OneCycleCutPolicy,
    ) -> Result<(KeyEdgeKey, CutFaceResult)> {
        let time = self.key_face(face)?.time();
        let (parent, next_sibling) = self.location_above(face.key());
        let edge = self.create_key_closed_edge(data, parent, next_sibling, time)?;
        match self.cut_glue_face_with_closed_edge(face, edge, policy) {
            Ok(result) => Ok((edge, result)),
            Err(e) => {
                self.hard_delete(edge.key(), false)?;
                Err(e)
            }
        }
    }

    /// Creates an open edge between two vertex usages of `face`, above it,
    /// and cuts the face with it.
    pub fn cut_face_with_open_edge(
        &mut self,
        face: KeyFaceKey,
        data: KeyEdgeData,
        start: KeyFaceVertexUsageIndex,
        end: KeyFaceVertexUsageIndex,
        one_cycle_policy: OneCycleCutPolicy,
        two_cycle_policy: TwoCycleCutPolicy,
    ) -> Result<(KeyEdgeKey, CutFaceResult)> {
        let start_vertex = self.usage_vertex(face, start)?;
        let end_vertex = self.usage_vertex(face, end)?;
        let (parent, next_sibling) = self.location_above(face.key());
        let edge = self.create_key_open_edge(start_vertex, end_vertex, data, parent, next_sibling)?;
        let result = self.cut_glue_face(
            face,
            KeyHalfedge::new(edge, true),
            start,
            end,
            one_cycle_policy,
            two_cycle_policy,
        );
        match result {
            Ok(result) => Ok((edge, result)),
            Err(e) => {
                self.hard_delete(edge.key(), false)?;
                Err(e)
            }
        }
    }

    /// Cuts `face` with a closed edge lying inside it.
    ///
    /// With `Disk` (and `Auto`) the face is split into the part inside the
    /// edge (`face1`) and the part outside (`face2`); existing cycles go to
    /// the inside face when most of them lies inside the edge. With `Mobius`
    /// the edge is added as one cycle using it twice, with `Torus` as two
    /// opposite cycles.
    pub fn cut_glue_face_with_closed_edge(
        &mut self,
        face: KeyFaceKey,
        edge: KeyEdgeKey,
        policy: OneCycleCutPolicy,
    ) -> Result<CutFaceResult> {
        let (time, cycles) = {
            let f = self.key_face(face)?;
            (f.time(), f.cycles().to_vec())
        };
        self.check_cut_edge(face, edge, time, true)?;

        let khe = KeyHalfedge::new(edge, true);
        let policy = match policy {
            OneCycleCutPolicy::Auto => OneCycleCutPolicy::Disk,
            other => other,
        };

        let new_faces = match policy {
            OneCycleCutPolicy::Disk => {
                let polygon = self.cycle_polygon(&KeyCycle::from_halfedges(vec![khe]))?;
                let inside_khe = KeyHalfedge::new(edge, signed_area(&polygon) >= 0.0);
                let mut inside = vec![KeyCycle::from_halfedges(vec![inside_khe])];
                let mut outside = vec![KeyCycle::from_halfedges(vec![inside_khe.opposite()])];
                for cycle in cycles {
                    let ratio = interior_contained_ratio(
                        &self.cycle_polygon(&cycle)?,
                        &polygon,
                        self.config.interior_ratio_samples,
                        self.config.winding_rule,
                    );
                    if ratio > self.config.interior_ratio_threshold {
                        inside.push(cycle);
                    } else {
                        outside.push(cycle);
                    }
                }
                vec![inside, outside]
            }
            OneCycleCutPolicy::Mobius => {
                let mut cycles = cycles;
                cycles.push(KeyCycle::from_halfedges(vec![khe, khe]));
                vec![cycles]
            }
            OneCycleCutPolicy::Torus | OneCycleCutPolicy::Auto => {
                let mut cycles = cycles;
                cycles.push(KeyCycle::from_halfedges(vec![khe]));
                cycles.push(KeyCycle::from_halfedges(vec![khe.opposite()]));
                vec![cycles]
            }
        };

        let result = self.replace_face(face, new_faces)?;
        tracing::debug!(?policy, faces = if result.face2.is_some() { 2 } else { 1 }, "cut face with closed edge");
        Ok(result)
    }

    /// Cuts `face` with the open halfedge `halfedge`, going from the vertex
    /// at usage `start` to the vertex at usage `end`.
    ///
    /// When both usages are on the same cycle, `one_cycle_policy` decides
    /// between splitting the face (`Disk`), re-gluing the cycle through the
    /// edge in a twisted way (`Mobius`) or splitting the cycle in two
    /// (`Torus`). When they are on different cycles, the two cycles are
    /// merged through the edge and `two_cycle_policy` decides their
    /// orientations.
    pub fn cut_glue_face(
        &mut self,
        face: KeyFaceKey,
        halfedge: KeyHalfedge,
        start: KeyFaceVertexUsageIndex,
        end: KeyFaceVertexUsageIndex,
        one_cycle_policy: OneCycleCutPolicy,
        two_cycle_policy: TwoCycleCutPolicy,
    ) -> Result<CutFaceResult> {
        let time = self.key_face(face)?.time();
        self.check_cut_edge(face, halfedge.edge(), time, false)?;
        let start_vertex = self.usage_vertex(face, start)?;
        let end_vertex = self.usage_vertex(face, end)?;
        if halfedge.start_vertex(self) != Some(start_vertex) {
            return Err(Error::InvalidVertexUsage {
                cycle_index: start.cycle_index,
                component_index: start.component_index,
            });
        }
        if halfedge.end_vertex(self) != Some(end_vertex) {
            return Err(Error::InvalidVertexUsage {
                cycle_index: end.cycle_index,
                component_index: end.component_index,
            });
        }

        if start.cycle_index == end.cycle_index {
            self.cut_glue_face_one_cycle(face, halfedge, start, end, one_cycle_policy)
        } else {
            self.cut_glue_face_two_cycles(face, halfedge, start, end, two_cycle_policy)
        }
    }

    fn cut_glue_face_one_cycle(
        &mut self,
        face: KeyFaceKey,
        khe: KeyHalfedge,
        start: KeyFaceVertexUsageIndex,
        end: KeyFaceVertexUsageIndex,
        policy: OneCycleCutPolicy,
    ) -> Result<CutFaceResult> {
        let same_usage = start.component_index == end.component_index;
        let policy = match policy {
            OneCycleCutPolicy::Auto if same_usage => OneCycleCutPolicy::Disk,
            OneCycleCutPolicy::Auto => self.compute_one_cycle_cut_policy(face, start, end)?,
            other => other,
        };
        let cycles = self.key_face(face)?.cycles().to_vec();
        let cycle = &cycles[start.cycle_index];
        let others: Vec<KeyCycle> = cycles
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != start.cycle_index)
            .map(|(_, c)| c.clone())
            .collect();

        // p1 runs from the start vertex to the end vertex, p2 back.
        let p1 = cycle.sub_path(start.component_index, end.component_index, self);
        // A loop edge at a single usage leaves the whole cycle on one side.
        let p2 = if same_usage {
            cycle.to_path(start.component_index)
        } else {
            cycle.sub_path(end.component_index, start.component_index, self)
        };
        let closed_through = |path: &KeyPath, h: KeyHalfedge| {
            let mut walk = path.clone();
            walk.extend(h);
            KeyCycle::from_path(walk)
        };
        let c1 = closed_through(&p1, khe.opposite());
        let c2 = closed_through(&p2, khe);

        let new_faces = match policy {
            OneCycleCutPolicy::Disk | OneCycleCutPolicy::Auto => {
                let poly1 = self.cycle_polygon(&c1)?;
                let poly2 = self.cycle_polygon(&c2)?;
                let mut cycles1 = vec![c1];
                let mut cycles2 = vec![c2];
                let (samples, threshold, rule) = (
                    self.config.interior_ratio_samples,
                    self.config.interior_ratio_threshold,
                    self.config.winding_rule,
                );
                for other in others {
                    let polygon = self.cycle_polygon(&other)?;
                    if interior_contained_ratio(&polygon, &poly1, samples, rule) > threshold {
                        cycles1.push(other);
                    } else if interior_contained_ratio(&polygon, &poly2, samples, rule) > threshold {
                        cycles2.push(other);
                    } else if signed_area(&poly1).abs() >= signed_area(&poly2).abs() {
                        cycles1.push(other);
                    } else {
                        cycles2.push(other);
                    }
                }
                vec![cycles1, cycles2]
            }
            OneCycleCutPolicy::Mobius => {
                let mut walk = p1.clone();
                walk.extend(khe.opposite());
                walk.append(&p2.reversed());
                walk.extend(khe.opposite());
                let mut cycles = others;
                cycles.insert(start.cycle_index, KeyCycle::from_path(walk));
                vec![cycles]
            }
            OneCycleCutPolicy::Torus => {
                let mut cycles = others;
                cycles.insert(start.cycle_index, c2);
                cycles.insert(start.cycle_index, c1);
                vec![cycles]
            }
        };

        let result = self.replace_face(face, new_faces)?;
        tracing::debug!(?policy, "cut face along one cycle");
        Ok(result)
    }

    fn cut_glue_face_two_cycles(
        &mut self,
        face: KeyFaceKey,
        khe: KeyHalfedge,
        start: KeyFaceVertexUsageIndex,
        end: KeyFaceVertexUsageIndex,
        policy: TwoCycleCutPolicy,
    ) -> Result<CutFaceResult> {
        let policy = match policy {
            TwoCycleCutPolicy::Auto => self.compute_two_cycle_cut_policy(face, khe, start, end)?,
            other => other,
        };
        let cycles = self.key_face(face)?.cycles().to_vec();

        let mut p1 = cycles[start.cycle_index].to_path(start.component_index);
        if policy.reverses_start() {
            p1 = p1.reversed();
        }
        let mut p2 = cycles[end.cycle_index].to_path(end.component_index);
        if policy.reverses_end() {
            p2 = p2.reversed();
        }
        let mut walk = p1;
        walk.extend(khe);
        walk.append(&p2);
        walk.extend(khe.opposite());

        let first = start.cycle_index.min(end.cycle_index);
        let mut new_cycles = Vec::with_capacity(cycles.len() - 1);
        for (i, cycle) in cycles.into_iter().enumerate() {
            if i == first {
                new_cycles.push(KeyCycle::from_path(walk.clone()));
            } else if i != start.cycle_index && i != end.cycle_index {
                new_cycles.push(cycle);
            }
        }

        let result = self.replace_face(face, vec![new_cycles])?;
        tracing::debug!(?policy, "cut face across two cycles");
        Ok(result)
    }

    /// Checks that `edge` can cut `face`: same time, expected closedness,
    /// and not already on the face boundary.
    fn check_cut_edge(&self, face: KeyFaceKey, edge: KeyEdgeKey, time: AnimTime, closed: bool) -> Result<()> {
        let e = self.key_edge(edge)?;
        if e.time() != time {
            return Err(Error::TimeMismatch {
                expected: time,
                found: e.time(),
            });
        }
        if (e.start_vertex().is_none()) != closed {
            return Err(Error::InvalidInput(if closed {
                "expected a closed edge".to_string()
            } else {
                "expected an open edge".to_string()
            }));
        }
        if self.boundary(face).contains(&edge.as_cell()) {
            return Err(Error::InvalidInput("the edge already bounds the face".to_string()));
        }
        Ok(())
    }

    /// Replaces `old` by one new face per entry of `cycles`, created just
    /// below it in the tree with its properties. Inbetween faces using `old`
    /// use all the new faces instead.
    fn replace_face(&mut self, old: KeyFaceKey, cycles: Vec<Vec<KeyCycle>>) -> Result<CutFaceResult> {
        let (time, properties) = {
            let f = self.key_face(old)?;
            (f.time(), f.properties().clone())
        };
        let (parent, next_sibling) = self.location_below(old.key());

        let mut faces = Vec::with_capacity(cycles.len());
        for face_cycles in cycles {
            faces.push(self.insert_key_face(face_cycles, properties.clone(), parent, next_sibling, time)?);
        }

        let inbetween: Vec<CellKey> = self
            .star(old)
            .iter()
            .copied()
            .filter(|c| c.to_inbetween_face().is_some())
            .collect();
        for cell in inbetween {
            if let CellData::InbetweenFace(f) = &mut self.try_cell_mut(cell.key())?.data {
                for side in [&mut f.before, &mut f.after] {
                    if side.contains(&old) {
                        let mut seen = FxHashSet::default();
                        let replaced: Vec<KeyFaceKey> = side
                            .iter()
                            .flat_map(|&k| if k == old { faces.clone() } else { vec![k] })
                            .filter(|k| seen.insert(*k))
                            .collect();
                        *side = replaced;
                    }
                }
            }
            self.sync_boundary(cell)?;
        }

        self.hard_delete(old.key(), false)?;
        Ok(CutFaceResult {
            face1: faces[0],
            face2: faces.get(1).copied(),
        })
    }
}
