// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Gluing cells together.
//!
//! Gluing replaces several cells of the same kind by a single new one and
//! redirects every use of the old cells to it. Edges are glued along with
//! their end vertices. When the caller does not say in which direction (and,
//! for closed edges, from which point) each edge should be traversed, these
//! are inferred by comparing uniformly spaced samples of the edge curves.

use nalgebra::Point2;
use rustc_hash::FxHashSet;

use crate::cast::{KeyEdgeKey, KeyVertexKey};
use crate::cell::KeyCell;
use crate::complex::Complex;
use crate::edge_data::KeyEdgeData;
use crate::error::{Error, Result};
use crate::halfedge::KeyHalfedge;
use crate::keys::{GroupKey, NodeKey};
use crate::time::AnimTime;

impl Complex {
    /// Merges vertices into one vertex at `position`.
    ///
    /// Duplicates are ignored. A single distinct vertex is simply moved;
    /// otherwise a new vertex replaces all of them at the tree location of
    /// the top-most one.
    pub fn glue_key_vertices(&mut self, vertices: &[KeyVertexKey], position: Point2<f64>) -> Result<KeyVertexKey> {
        let vertices = dedup(vertices);
        let Some(&first) = vertices.first() else {
            return Err(Error::EmptyInput("no vertices to glue"));
        };
        let time = self.key_vertex(first)?.time();
        for &v in &vertices[1..] {
            check_time(time, self.key_vertex(v)?.time())?;
        }

        if vertices.len() == 1 {
            self.set_key_vertex_position(first, position)?;
            return Ok(first);
        }

        let (parent, next_sibling) = self.glue_location(vertices.iter().map(|v| v.key()))?;
        let glued = self.create_key_vertex(position, parent, next_sibling, time)?;
        for &old in &vertices {
            self.substitute_vertex(old, glued)?;
            self.hard_delete(old.key(), false)?;
        }
        tracing::debug!(count = vertices.len(), "glued key vertices");
        Ok(glued)
    }

    /// Merges open edges, each traversed in the given direction.
    ///
    /// Start vertices are glued first. If that already merged the end
    /// vertices into the new start vertex, the result is a loop whose vertex
    /// sits halfway between the glued start and end points.
    pub fn glue_key_open_halfedges(&mut self, halfedges: &[KeyHalfedge]) -> Result<KeyEdgeKey> {
        let halfedges = self.check_glued_halfedges(halfedges, false)?;
        if let [single] = halfedges.as_slice() {
            return Ok(single.edge());
        }

        let datas = self.halfedge_datas(&halfedges)?;
        let parts: Vec<(&KeyEdgeData, bool)> = datas.iter().zip(&halfedges).map(|(d, h)| (d, h.direction())).collect();
        let mut data = KeyEdgeData::from_glue_open(&parts)?;
        let (start_point, end_point) = (data.stroke().start_point(), data.stroke().end_point());
        let location = self.glue_location(halfedges.iter().map(|h| h.edge().key()))?;

        let starts = self.halfedge_vertices(&halfedges, KeyHalfedge::start_vertex)?;
        let start = self.glue_key_vertices(&starts, start_point)?;
        // Gluing the starts may have merged some ends already.
        let ends = self.halfedge_vertices(&halfedges, KeyHalfedge::end_vertex)?;
        let (start, end) = if ends.contains(&start) {
            let mid = nalgebra::center(&start_point, &end_point);
            let mut all = ends;
            all.push(start);
            let v = self.glue_key_vertices(&all, mid)?;
            data.snap(mid, mid);
            (v, v)
        } else {
            (start, self.glue_key_vertices(&ends, end_point)?)
        };

        // The top-most edge still exists: vertex gluing only rewires edges.
        let (parent, next_sibling) = location;
        let glued = self.create_key_open_edge(start, end, data, parent, next_sibling)?;
        self.replace_edges(&halfedges, glued)?;
        tracing::debug!(count = halfedges.len(), "glued open edges");
        Ok(glued)
    }

    /// Merges open edges, inferring their directions.
    ///
    /// Two edges sharing a vertex are oriented from their shared vertices.
    /// Otherwise each edge in turn is taken as reference
    /// and every other edge is oriented to be closest to it; the reference
    /// with the smallest total distance wins.
    pub fn glue_key_open_edges(&mut self, edges: &[KeyEdgeKey]) -> Result<KeyEdgeKey> {
        let edges = dedup(edges);
        if edges.is_empty() {
            return Err(Error::EmptyInput("no edges to glue"));
        }
        let directions = match self.shared_vertex_directions(&edges)? {
            Some(directions) => directions,
            None => self.infer_open_directions(&edges)?,
        };
        let halfedges: Vec<KeyHalfedge> = edges
            .iter()
            .zip(directions)
            .map(|(&e, d)| KeyHalfedge::new(e, d))
            .collect();
        self.glue_key_open_halfedges(&halfedges)
    }

    /// Merges closed edges, each traversed in the given direction. The
    /// start point of each edge is shifted to best match the first one.
    pub fn glue_key_closed_halfedges(&mut self, halfedges: &[KeyHalfedge]) -> Result<KeyEdgeKey> {
        let halfedges = self.check_glued_halfedges(halfedges, true)?;
        if let [single] = halfedges.as_slice() {
            return Ok(single.edge());
        }
        let samples = self.closed_samples(&halfedges)?;
        let reference = directed_samples(&samples[0], halfedges[0].direction());
        let mut offsets = vec![0.0];
        for (h, s) in halfedges.iter().zip(&samples).skip(1) {
            let (shift, _) = self.best_shift(&reference, &directed_samples(s, h.direction()));
            offsets.push(shift as f64 / reference.len() as f64);
        }
        self.glue_closed_with_offsets(&halfedges, &offsets)
    }

    /// Merges closed edges, inferring their directions and start points.
    pub fn glue_key_closed_edges(&mut self, edges: &[KeyEdgeKey]) -> Result<KeyEdgeKey> {
        let edges = dedup(edges);
        if edges.is_empty() {
            return Err(Error::EmptyInput("no edges to glue"));
        }
        let forward: Vec<KeyHalfedge> = edges.iter().map(|&e| KeyHalfedge::new(e, true)).collect();
        let forward = self.check_glued_halfedges(&forward, true)?;
        if forward.len() == 1 {
            return Ok(forward[0].edge());
        }

        let samples = self.closed_samples(&forward)?;
        let m = samples[0].len();
        let mut best: Option<(f64, Vec<(bool, f64)>)> = None;
        for i in 0..samples.len() {
            let reference = &samples[i];
            let mut total = 0.0;
            let mut alignment = Vec::with_capacity(samples.len());
            for (j, s) in samples.iter().enumerate() {
                if j == i {
                    alignment.push((true, 0.0));
                    continue;
                }
                let (fwd_shift, fwd_cost) = self.best_shift(reference, s);
                let (rev_shift, rev_cost) = self.best_shift(reference, &directed_samples(s, false));
                if fwd_cost <= rev_cost {
                    total += fwd_cost;
                    alignment.push((true, fwd_shift as f64 / m as f64));
                } else {
                    total += rev_cost;
                    alignment.push((false, rev_shift as f64 / m as f64));
                }
            }
            if best.as_ref().map_or(true, |(t, _)| total < *t) {
                best = Some((total, alignment));
            }
        }

        let alignment = best.map(|(_, a)| a).unwrap_or_default();
        let halfedges: Vec<KeyHalfedge> = forward
            .iter()
            .zip(&alignment)
            .map(|(h, (d, _))| KeyHalfedge::new(h.edge(), *d))
            .collect();
        let offsets: Vec<f64> = alignment.iter().map(|(_, u)| *u).collect();
        self.glue_closed_with_offsets(&halfedges, &offsets)
    }

    fn glue_closed_with_offsets(&mut self, halfedges: &[KeyHalfedge], offsets: &[f64]) -> Result<KeyEdgeKey> {
        let datas = self.halfedge_datas(halfedges)?;
        let parts: Vec<(&KeyEdgeData, bool, f64)> = datas
            .iter()
            .zip(halfedges)
            .zip(offsets)
            .map(|((d, h), u)| (d, h.direction(), *u))
            .collect();
        let data = KeyEdgeData::from_glue_closed(&parts)?;
        let time = self.key_edge(halfedges[0].edge())?.time();
        let (parent, next_sibling) = self.glue_location(halfedges.iter().map(|h| h.edge().key()))?;
        let glued = self.create_key_closed_edge(data, parent, next_sibling, time)?;
        self.replace_edges(halfedges, glued)?;
        tracing::debug!(count = halfedges.len(), "glued closed edges");
        Ok(glued)
    }

    /// Redirects every use of the glued halfedges to `glued` and deletes the
    /// old edges.
    fn replace_edges(&mut self, halfedges: &[KeyHalfedge], glued: KeyEdgeKey) -> Result<()> {
        let target = KeyHalfedge::new(glued, true);
        for &h in halfedges {
            self.substitute_edge(h, target)?;
            self.hard_delete(h.edge().key(), false)?;
        }
        Ok(())
    }

    /// Deduplicates halfedges and checks that they can be glued: same
    /// closedness, same time, and no edge given in both directions.
    fn check_glued_halfedges(&self, halfedges: &[KeyHalfedge], closed: bool) -> Result<Vec<KeyHalfedge>> {
        let halfedges = dedup(halfedges);
        let Some(first) = halfedges.first() else {
            return Err(Error::EmptyInput("no edges to glue"));
        };
        let time = self.key_edge(first.edge())?.time();
        let mut edges = FxHashSet::default();
        for h in &halfedges {
            let e = self.key_edge(h.edge())?;
            check_time(time, e.time())?;
            if e.data().is_closed() != closed {
                return Err(Error::InvalidInput(format!(
                    "cannot glue {} edge {:?} with {} edges",
                    if closed { "an open" } else { "a closed" },
                    h.edge(),
                    if closed { "closed" } else { "open" },
                )));
            }
            if !edges.insert(h.edge()) {
                return Err(Error::InvalidInput(format!(
                    "edge {:?} is given in both directions",
                    h.edge()
                )));
            }
        }
        Ok(halfedges)
    }

    fn halfedge_datas(&self, halfedges: &[KeyHalfedge]) -> Result<Vec<KeyEdgeData>> {
        halfedges
            .iter()
            .map(|h| Ok(self.key_edge(h.edge())?.data().clone()))
            .collect()
    }

    fn halfedge_vertices(
        &self,
        halfedges: &[KeyHalfedge],
        vertex: fn(&KeyHalfedge, &Complex) -> Option<KeyVertexKey>,
    ) -> Result<Vec<KeyVertexKey>> {
        halfedges
            .iter()
            .map(|h| {
                vertex(h, self).ok_or_else(|| Error::InvalidInput(format!("edge {:?} is closed", h.edge())))
            })
            .collect()
    }

    /// Where a cell replacing `nodes` goes: just below the top-most of them.
    fn glue_location(&self, nodes: impl Iterator<Item = NodeKey>) -> Result<(GroupKey, Option<NodeKey>)> {
        let nodes: Vec<NodeKey> = nodes.collect();
        let top = self
            .find_top_most(&nodes)
            .ok_or(Error::EmptyInput("no cells to glue"))?;
        Ok(self.location_below(top))
    }

    /// Directions of two open edges that share a vertex, or `None` when the
    /// geometric heuristic must decide.
    ///
    /// Edges running between the same two vertices in opposite directions
    /// are aligned by reversing the second one. Any other shared vertex keeps
    /// both directions; a chain (`a -> b`, `b -> c`) thus collapses into a
    /// loop.
    fn shared_vertex_directions(&self, edges: &[KeyEdgeKey]) -> Result<Option<Vec<bool>>> {
        match edges {
            [_] => Ok(Some(vec![true])),
            [a, b] => {
                let a = self.key_edge(*a)?;
                let b = self.key_edge(*b)?;
                let (a_start, a_end) = (a.start_vertex(), a.end_vertex());
                let (b_start, b_end) = (b.start_vertex(), b.end_vertex());
                if a_start.is_none() || b_start.is_none() {
                    return Ok(None);
                }
                let opposite = a_start == b_end && a_end == b_start;
                let same = a_start == b_start && a_end == b_end;
                if opposite && !same {
                    Ok(Some(vec![true, false]))
                } else if same || a_start == b_start || a_end == b_end || a_end == b_start || a_start == b_end {
                    Ok(Some(vec![true, true]))
                } else {
                    Ok(None)
                }
            }
            _ => Ok(None),
        }
    }

    fn infer_open_directions(&self, edges: &[KeyEdgeKey]) -> Result<Vec<bool>> {
        let n = self.config.glue_open_samples.max(2);
        let samples = edges
            .iter()
            .map(|&e| Ok(self.key_edge(e)?.data().stroke().sample_uniform(n)))
            .collect::<Result<Vec<_>>>()?;

        let mut best: Option<(f64, Vec<bool>)> = None;
        for reference in &samples {
            let mut total = 0.0;
            let mut directions = Vec::with_capacity(samples.len());
            for s in &samples {
                let fwd = squared_distance_sum(reference.iter(), s.iter());
                let rev = squared_distance_sum(reference.iter(), s.iter().rev());
                directions.push(fwd <= rev);
                total += fwd.min(rev);
            }
            if best.as_ref().map_or(true, |(t, _)| total < *t) {
                best = Some((total, directions));
            }
        }
        Ok(best.map(|(_, d)| d).unwrap_or_default())
    }

    /// Uniform samples of each closed edge, in the edge direction.
    fn closed_samples(&self, halfedges: &[KeyHalfedge]) -> Result<Vec<Vec<Point2<f64>>>> {
        let m = self.config.glue_closed_samples.max(1);
        halfedges
            .iter()
            .map(|h| Ok(self.key_edge(h.edge())?.data().stroke().sample_uniform(m)))
            .collect()
    }

    /// Shift of `other` that best matches `reference`, and the matching cost
    /// over all samples at that shift.
    ///
    /// Shifts are compared on a subset of the samples.
    fn best_shift(&self, reference: &[Point2<f64>], other: &[Point2<f64>]) -> (usize, f64) {
        let m = reference.len().min(other.len());
        if m == 0 {
            return (0, 0.0);
        }
        let k = self.config.glue_closed_cost_samples.clamp(1, m);
        let coarse: Vec<usize> = (0..k).map(|i| i * m / k).collect();
        let cost_at = |shift: usize, indices: &[usize]| -> f64 {
            indices
                .iter()
                .map(|&i| (reference[i] - other[(i + shift) % m]).norm_squared())
                .sum()
        };

        let mut best = (0, f64::INFINITY);
        for shift in 0..m {
            let cost = cost_at(shift, &coarse);
            if cost < best.1 {
                best = (shift, cost);
            }
        }
        let all: Vec<usize> = (0..m).collect();
        (best.0, cost_at(best.0, &all))
    }
}

/// The samples of a closed curve traversed backwards from the same start
/// point.
fn directed_samples(samples: &[Point2<f64>], direction: bool) -> Vec<Point2<f64>> {
    let m = samples.len();
    if direction {
        samples.to_vec()
    } else {
        (0..m).map(|k| samples[(m - k) % m]).collect()
    }
}

fn squared_distance_sum<'a>(
    a: impl Iterator<Item = &'a Point2<f64>>,
    b: impl Iterator<Item = &'a Point2<f64>>,
) -> f64 {
    a.zip(b).map(|(p, q)| (p - q).norm_squared()).sum()
}

fn check_time(expected: AnimTime, found: AnimTime) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(Error::TimeMismatch { expected, found })
    }
}

/// Removes repeated items, keeping the first occurrence of each.
fn dedup<T: Copy + Eq + std::hash::Hash>(items: &[T]) -> Vec<T> {
    let mut seen = FxHashSet::default();
    items.iter().copied().filter(|x| seen.insert(*x)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycle::KeyCycle;
    use approx::assert_relative_eq;
    use vac_lite_geometry::{signed_area, Stroke2d};

    fn p(x: f64, y: f64) -> Point2<f64> {
        Point2::new(x, y)
    }

    fn vertex(complex: &mut Complex, at: Point2<f64>) -> KeyVertexKey {
        let root = complex.root();
        complex.create_key_vertex(at, root, None, AnimTime::default()).unwrap()
    }

    fn segment(complex: &mut Complex, a: KeyVertexKey, b: KeyVertexKey) -> KeyEdgeKey {
        let pa = complex.key_vertex(a).unwrap().position();
        let pb = complex.key_vertex(b).unwrap().position();
        let root = complex.root();
        complex
            .create_key_open_edge(a, b, KeyEdgeData::new(Stroke2d::segment(pa, pb)), root, None)
            .unwrap()
    }

    fn square(complex: &mut Complex, positions: Vec<Point2<f64>>) -> KeyEdgeKey {
        let root = complex.root();
        let stroke = Stroke2d::new(positions, vec![], true).unwrap();
        complex
            .create_key_closed_edge(KeyEdgeData::new(stroke), root, None, AnimTime::default())
            .unwrap()
    }

    #[test]
    fn glue_duplicate_vertex_only_moves_it() {
        let mut complex = Complex::new();
        let v = vertex(&mut complex, p(0.0, 0.0));
        let before = complex.node_count();
        let glued = complex.glue_key_vertices(&[v, v, v], p(3.0, 4.0)).unwrap();
        assert_eq!(glued, v);
        assert_eq!(complex.node_count(), before);
        assert_eq!(complex.key_vertex(v).unwrap().position(), p(3.0, 4.0));
    }

    #[test]
    fn glue_vertices_redirects_edges() {
        let mut complex = Complex::new();
        let a = vertex(&mut complex, p(0.0, 0.0));
        let b = vertex(&mut complex, p(1.0, 0.0));
        let c = vertex(&mut complex, p(1.0, 0.1));
        let d = vertex(&mut complex, p(2.0, 0.0));
        let e1 = segment(&mut complex, a, b);
        let e2 = segment(&mut complex, c, d);

        let glued = complex.glue_key_vertices(&[b, c], p(1.0, 0.05)).unwrap();
        assert!(!complex.contains(b));
        assert!(!complex.contains(c));
        assert_eq!(complex.key_edge(e1).unwrap().end_vertex(), Some(glued));
        assert_eq!(complex.key_edge(e2).unwrap().start_vertex(), Some(glued));
        assert_eq!(complex.star(glued).len(), 2);
        assert!(complex.is_star_boundary_consistent());
    }

    #[test]
    fn glue_vertices_rejects_empty_input() {
        let mut complex = Complex::new();
        assert!(matches!(
            complex.glue_key_vertices(&[], Point2::origin()),
            Err(Error::EmptyInput(_))
        ));
    }

    #[test]
    fn glue_antiparallel_open_edges_reverses_one() {
        let mut complex = Complex::new();
        let a = vertex(&mut complex, p(0.0, 0.0));
        let b = vertex(&mut complex, p(4.0, 0.0));
        let c = vertex(&mut complex, p(4.0, 1.0));
        let d = vertex(&mut complex, p(0.0, 1.0));
        let e1 = segment(&mut complex, a, b);
        let e2 = segment(&mut complex, c, d);

        let glued = complex.glue_key_open_edges(&[e1, e2]).unwrap();
        let edge = complex.key_edge(glued).unwrap();
        let start = complex.key_vertex(edge.start_vertex().unwrap()).unwrap().position();
        let end = complex.key_vertex(edge.end_vertex().unwrap()).unwrap().position();
        assert_relative_eq!(start, p(0.0, 0.5), epsilon = 1e-9);
        assert_relative_eq!(end, p(4.0, 0.5), epsilon = 1e-9);
        assert_eq!(complex.cells().count(), 3);
        assert!(complex.is_star_boundary_consistent());
    }

    #[test]
    fn glue_open_halfedges_rejects_both_directions() {
        let mut complex = Complex::new();
        let a = vertex(&mut complex, p(0.0, 0.0));
        let b = vertex(&mut complex, p(1.0, 0.0));
        let e = segment(&mut complex, a, b);
        let result = complex.glue_key_open_halfedges(&[KeyHalfedge::new(e, true), KeyHalfedge::new(e, false)]);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert!(complex.contains(e));
    }

    #[test]
    fn glue_closed_edges_aligns_start_points() {
        let mut complex = Complex::new();
        let e1 = square(&mut complex, vec![p(0.0, 0.0), p(2.0, 0.0), p(2.0, 2.0), p(0.0, 2.0)]);
        // Same square, clockwise and starting at another corner.
        let e2 = square(&mut complex, vec![p(2.0, 2.0), p(2.0, 0.0), p(0.0, 0.0), p(0.0, 2.0)]);
        let root = complex.root();
        let f = complex
            .create_key_face(
                vec![KeyCycle::from_halfedges(vec![KeyHalfedge::new(e2, true)])],
                root,
                None,
                AnimTime::default(),
            )
            .unwrap();

        let glued = complex.glue_key_closed_edges(&[e1, e2]).unwrap();
        let stroke = complex.key_edge(glued).unwrap().data().stroke().clone();
        assert_relative_eq!(stroke.length(), 8.0, epsilon = 1e-6);
        assert_eq!(complex.cells().count(), 2);

        // The face keeps its clockwise orientation through the new edge.
        let cycle = complex.key_face(f).unwrap().cycles()[0].clone();
        assert_eq!(cycle.halfedges()[0].edge(), glued);
        let area = signed_area(&complex.cycle_polygon(&cycle).unwrap());
        assert_relative_eq!(area, -4.0, epsilon = 1e-6);
        assert!(complex.is_star_boundary_consistent());
    }
}
