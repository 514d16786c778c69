// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sampling cells as polylines and polygons.
//!
//! The cut heuristics reason on centerlines only: a halfedge is its stroke's
//! centerline in traversal direction, a cycle is the concatenation of its
//! halfedges (a single point for a Steiner cycle), a face is the set of its
//! cycle polygons filled with the complex's winding rule.

use nalgebra::Point2;
use vac_lite_geometry::{resample_uniform, winding_number, Rect2, Stroke2d, WindingRule};

use crate::cast::{CellKey, KeyFaceKey, SpatialTag, TemporalTag, TypedCellKey, VertexCellKey};
use crate::cell::{CellData, InbetweenEdge, KeyCell, VertexCell};
use crate::complex::Complex;
use crate::cycle::KeyCycle;
use crate::error::Result;
use crate::halfedge::KeyHalfedge;
use crate::path::KeyPath;
use crate::time::AnimTime;

/// Fraction of the points sampled along the closed polygon `inner` that are
/// inside `outer` under `rule`.
///
/// A single-point `inner` (a Steiner cycle) gives 0 or 1.
pub fn interior_contained_ratio(
    inner: &[Point2<f64>],
    outer: &[Point2<f64>],
    samples: usize,
    rule: WindingRule,
) -> f64 {
    if inner.is_empty() {
        return 0.0;
    }
    let points = if inner.len() == 1 {
        inner.to_vec()
    } else {
        resample_uniform(inner, samples.max(1), true)
    };
    let inside = points
        .iter()
        .filter(|p| rule.is_filled(winding_number(outer, p)))
        .count();
    inside as f64 / points.len() as f64
}

impl Complex {
    /// Centerline of a halfedge in traversal direction. For a closed edge the
    /// start point is repeated at the end.
    pub fn halfedge_polyline(&self, halfedge: KeyHalfedge) -> Result<Vec<Point2<f64>>> {
        let stroke = self.key_edge(halfedge.edge())?.data().stroke();
        let mut points = stroke.positions().to_vec();
        if stroke.is_closed() {
            points.push(points[0]);
        }
        if !halfedge.direction() {
            points.reverse();
        }
        Ok(points)
    }

    /// Centerline of a path; a single-vertex path is its vertex position.
    pub fn path_polyline(&self, path: &KeyPath) -> Result<Vec<Point2<f64>>> {
        if path.halfedges().is_empty() {
            return match path.single_vertex() {
                Some(v) => Ok(vec![self.key_vertex(v)?.position()]),
                None => Ok(Vec::new()),
            };
        }
        let mut points = Vec::new();
        for &h in path.halfedges() {
            let mut part = self.halfedge_polyline(h)?;
            if !points.is_empty() {
                part.remove(0);
            }
            points.append(&mut part);
        }
        Ok(points)
    }

    /// Implicitly closed polygon of a cycle (the closing point is not
    /// repeated).
    pub fn cycle_polygon(&self, cycle: &KeyCycle) -> Result<Vec<Point2<f64>>> {
        if let Some(v) = cycle.steiner_vertex() {
            return Ok(vec![self.key_vertex(v)?.position()]);
        }
        let mut points = self.path_polyline(&KeyPath::from_halfedges(cycle.halfedges().to_vec()))?;
        if points.len() > 1 {
            points.pop();
        }
        Ok(points)
    }

    pub fn face_polygons(&self, face: KeyFaceKey) -> Result<Vec<Vec<Point2<f64>>>> {
        self.key_face(face)?
            .cycles()
            .iter()
            .map(|c| self.cycle_polygon(c))
            .collect()
    }

    /// Sum of the winding numbers of the face's cycles around `point`.
    pub fn face_winding_number(&self, face: KeyFaceKey, point: &Point2<f64>) -> Result<i32> {
        Ok(self
            .face_polygons(face)?
            .iter()
            .map(|polygon| winding_number(polygon, point))
            .sum())
    }

    /// Whether `point` is inside the face under the configured winding rule.
    pub fn face_contains(&self, face: KeyFaceKey, point: &Point2<f64>) -> Result<bool> {
        let w = self.face_winding_number(face, point)?;
        Ok(self.config.winding_rule.is_filled(w))
    }

    /// Position of a vertex cell at `t`, `None` if it does not exist then.
    pub fn vertex_position_at(&self, vertex: VertexCellKey, t: AnimTime) -> Result<Option<Point2<f64>>> {
        Ok(match self.cell_data(vertex)? {
            CellData::KeyVertex(v) => v.position_at(self, t),
            CellData::InbetweenVertex(v) => v.position_at(self, t),
            _ => None,
        })
    }

    /// Geometry of an inbetween edge at `t`: its two key strokes, directed
    /// and resampled to a common size, interpolated linearly.
    pub fn inbetween_edge_stroke_at(&self, edge: &InbetweenEdge, t: AnimTime) -> Result<Option<Stroke2d>> {
        if !edge.range.contains(t) {
            return Ok(None);
        }
        let directed = |h: KeyHalfedge| -> Result<Stroke2d> {
            let stroke = self.key_edge(h.edge())?.data().stroke();
            Ok(if h.direction() {
                stroke.clone()
            } else {
                stroke.reversed()
            })
        };
        let before = directed(edge.before)?;
        let after = directed(edge.after)?;
        let n = before.positions().len().max(after.positions().len()).max(2);
        let before = before.resample_uniform(n);
        let after = after.resample_uniform(n);
        let u = edge.range.factor(t);

        let positions = before
            .positions()
            .iter()
            .zip(after.positions())
            .map(|(a, b)| a + (b - a) * u)
            .collect();
        let widths = before
            .widths()
            .iter()
            .zip(after.widths())
            .map(|(a, b)| a + (b - a) * u)
            .collect();
        Ok(Some(Stroke2d::new(positions, widths, before.is_closed())?))
    }

    /// Bounding box of a cell at `t`. Empty when the cell does not exist at
    /// `t`.
    ///
    /// The box of an inbetween face interpolates the boxes of its key faces.
    pub fn bounding_box_at<S: SpatialTag, T: TemporalTag>(
        &self,
        cell: TypedCellKey<S, T>,
        t: AnimTime,
    ) -> Result<Rect2> {
        let data = self.cell_data(cell)?;
        if !data.exists_at(t) {
            return Ok(Rect2::EMPTY);
        }
        Ok(match data {
            CellData::KeyVertex(v) => Rect2::from_point(v.position()),
            CellData::KeyEdge(e) => e.data().bounding_box(),
            CellData::KeyFace(f) => self.key_face_bounding_box(f.cycles(), f.time())?,
            CellData::InbetweenVertex(v) => match v.position_at(self, t) {
                Some(p) => Rect2::from_point(p),
                None => Rect2::EMPTY,
            },
            CellData::InbetweenEdge(e) => match self.inbetween_edge_stroke_at(e, t)? {
                Some(stroke) => stroke.bounding_box(),
                None => Rect2::EMPTY,
            },
            CellData::InbetweenFace(f) => {
                let side_box = |faces: &[KeyFaceKey], time: AnimTime| -> Result<Rect2> {
                    let mut rect = Rect2::EMPTY;
                    for &face in faces {
                        rect = rect.unite(&self.bounding_box_at(face, time)?);
                    }
                    Ok(rect)
                };
                let before = side_box(f.before_faces(), f.range.start())?;
                let after = side_box(f.after_faces(), f.range.end())?;
                lerp_rect(&before, &after, f.range.factor(t))
            }
        })
    }

    fn key_face_bounding_box(&self, cycles: &[KeyCycle], t: AnimTime) -> Result<Rect2> {
        let mut rect = Rect2::EMPTY;
        for cycle in cycles {
            if let Some(v) = cycle.steiner_vertex() {
                rect = rect.unite(&self.bounding_box_at(v, t)?);
            }
            for h in cycle.halfedges() {
                rect = rect.unite(&self.bounding_box_at(h.edge(), t)?);
            }
        }
        Ok(rect)
    }

    /// Union of the boxes of several cells at `t`.
    pub fn cells_bounding_box_at(&self, cells: &[CellKey], t: AnimTime) -> Result<Rect2> {
        let mut rect = Rect2::EMPTY;
        for &cell in cells {
            rect = rect.unite(&self.bounding_box_at(cell, t)?);
        }
        Ok(rect)
    }
}

fn lerp_rect(a: &Rect2, b: &Rect2, u: f64) -> Rect2 {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => Rect2::EMPTY,
        (true, false) => *b,
        (false, true) => *a,
        (false, false) => Rect2::from_corners(a.min + (b.min - a.min) * u, a.max + (b.max - a.max) * u),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge_data::KeyEdgeData;
    use approx::assert_relative_eq;

    fn square(size: f64) -> Vec<Point2<f64>> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(size, 0.0),
            Point2::new(size, size),
            Point2::new(0.0, size),
        ]
    }

    #[test]
    fn contained_ratio_of_nested_squares() {
        let outer = square(10.0);
        let inner: Vec<_> = square(2.0).iter().map(|p| p + nalgebra::Vector2::new(4.0, 4.0)).collect();
        assert_relative_eq!(interior_contained_ratio(&inner, &outer, 20, WindingRule::Odd), 1.0);
        assert_relative_eq!(interior_contained_ratio(&outer, &inner, 20, WindingRule::Odd), 0.0);
        assert_relative_eq!(
            interior_contained_ratio(&[Point2::new(5.0, 5.0)], &outer, 20, WindingRule::Odd),
            1.0
        );
    }

    #[test]
    fn closed_edge_face_contains_center() {
        let mut complex = Complex::new();
        let root = complex.root();
        let t = AnimTime::default();
        let stroke = Stroke2d::new(square(4.0), vec![], true).unwrap();
        let e = complex
            .create_key_closed_edge(KeyEdgeData::new(stroke), root, None, t)
            .unwrap();
        let f = complex
            .create_key_face(
                vec![KeyCycle::from_halfedges(vec![KeyHalfedge::new(e, true)])],
                root,
                None,
                t,
            )
            .unwrap();

        assert_eq!(complex.face_polygons(f).unwrap()[0].len(), 4);
        assert!(complex.face_contains(f, &Point2::new(2.0, 2.0)).unwrap());
        assert!(!complex.face_contains(f, &Point2::new(5.0, 2.0)).unwrap());

        let rect = complex.bounding_box_at(f, t).unwrap();
        assert_relative_eq!(rect.width(), 5.0);
        assert!(complex.bounding_box_at(f, AnimTime::new(1.0)).unwrap().is_empty());
    }

    #[test]
    fn reversed_halfedge_polyline() {
        let mut complex = Complex::new();
        let root = complex.root();
        let t = AnimTime::default();
        let a = complex.create_key_vertex(Point2::new(0.0, 0.0), root, None, t).unwrap();
        let b = complex.create_key_vertex(Point2::new(2.0, 0.0), root, None, t).unwrap();
        let e = complex
            .create_key_open_edge(
                a,
                b,
                KeyEdgeData::new(Stroke2d::segment(Point2::new(0.0, 0.0), Point2::new(2.0, 0.0))),
                root,
                None,
            )
            .unwrap();
        let points = complex.halfedge_polyline(KeyHalfedge::new(e, false)).unwrap();
        assert_eq!(points, vec![Point2::new(2.0, 0.0), Point2::new(0.0, 0.0)]);
    }

    #[test]
    fn inbetween_vertex_moves_linearly() {
        let mut complex = Complex::new();
        let root = complex.root();
        let a = complex
            .create_key_vertex(Point2::new(0.0, 0.0), root, None, AnimTime::new(0.0))
            .unwrap();
        let b = complex
            .create_key_vertex(Point2::new(4.0, 0.0), root, None, AnimTime::new(2.0))
            .unwrap();
        let iv = complex.create_inbetween_vertex(a, b, root, None).unwrap();
        let p = complex
            .vertex_position_at(iv.upcast(), AnimTime::new(0.5))
            .unwrap()
            .unwrap();
        assert_relative_eq!(p, Point2::new(1.0, 0.0));
        assert_eq!(complex.vertex_position_at(iv.upcast(), AnimTime::new(2.0)).unwrap(), None);
    }
}
