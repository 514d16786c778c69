// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Variable-width polyline strokes.
//!
//! A [`Stroke2d`] is the centerline geometry of an edge: a polyline with a
//! width at each point, either open (distinct endpoints) or closed (the last
//! point connects back to the first). Locations along the stroke are given
//! either as a [`CurveParameter`] (segment index + local parameter) or as an
//! arc length.

use std::cmp::Ordering;

use nalgebra::{Point2, Vector2};

use crate::error::{Error, Result};
use crate::polyline::{polyline_length, resample_uniform};
use crate::rect::Rect2;

/// Width assigned to points created without an explicit width.
pub const DEFAULT_WIDTH: f64 = 1.0;

/// A location on a stroke: segment `segment_index`, at local parameter `u`
/// in `[0, 1]`.
///
/// Parameters order lexicographically, which matches their order along the
/// stroke.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct CurveParameter {
    pub segment_index: usize,
    pub u: f64,
}

impl CurveParameter {
    pub fn new(segment_index: usize, u: f64) -> Self {
        Self { segment_index, u }
    }

    /// Total order usable for sorting (`u` compared with `f64::total_cmp`).
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.segment_index
            .cmp(&other.segment_index)
            .then_with(|| self.u.total_cmp(&other.u))
    }
}

/// Centerline polyline with per-point widths.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke2d {
    positions: Vec<Point2<f64>>,
    widths: Vec<f64>,
    closed: bool,
}

impl Stroke2d {
    /// Creates a stroke from positions and widths.
    ///
    /// `widths` may be empty (every point gets [`DEFAULT_WIDTH`]) or must
    /// have one entry per position. At least two positions are required.
    pub fn new(positions: Vec<Point2<f64>>, widths: Vec<f64>, closed: bool) -> Result<Self> {
        if positions.len() < 2 {
            return Err(Error::InvalidStroke(format!(
                "stroke needs at least 2 positions, got {}",
                positions.len()
            )));
        }
        if positions.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(Error::InvalidStroke("non-finite position".to_string()));
        }
        let widths = if widths.is_empty() {
            vec![DEFAULT_WIDTH; positions.len()]
        } else if widths.len() != positions.len() {
            return Err(Error::InvalidStroke(format!(
                "{} widths given for {} positions",
                widths.len(),
                positions.len()
            )));
        } else {
            widths
        };
        Ok(Self {
            positions,
            widths,
            closed,
        })
    }

    /// Creates a stroke with the same width at every point.
    pub fn with_constant_width(positions: Vec<Point2<f64>>, width: f64, closed: bool) -> Result<Self> {
        let widths = vec![width; positions.len()];
        Self::new(positions, widths, closed)
    }

    /// Straight open stroke between two points.
    pub fn segment(start: Point2<f64>, end: Point2<f64>) -> Self {
        Self {
            positions: vec![start, end],
            widths: vec![DEFAULT_WIDTH; 2],
            closed: false,
        }
    }

    pub fn positions(&self) -> &[Point2<f64>] {
        &self.positions
    }

    pub fn widths(&self) -> &[f64] {
        &self.widths
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Number of segments (the closing segment counts for closed strokes).
    pub fn segment_count(&self) -> usize {
        if self.closed {
            self.positions.len()
        } else {
            self.positions.len() - 1
        }
    }

    pub fn start_point(&self) -> Point2<f64> {
        self.positions[0]
    }

    /// Last point of an open stroke, or the start point of a closed one.
    pub fn end_point(&self) -> Point2<f64> {
        if self.closed {
            self.positions[0]
        } else {
            self.positions[self.positions.len() - 1]
        }
    }

    fn segment_ends(&self, i: usize) -> (usize, usize) {
        (i, (i + 1) % self.positions.len())
    }

    fn segment_length(&self, i: usize) -> f64 {
        let (a, b) = self.segment_ends(i);
        (self.positions[b] - self.positions[a]).norm()
    }

    /// Arc length at the start of each segment, plus the total length.
    fn cumulative_lengths(&self) -> Vec<f64> {
        let n = self.segment_count();
        let mut cumulative = Vec::with_capacity(n + 1);
        let mut acc = 0.0;
        cumulative.push(acc);
        for i in 0..n {
            acc += self.segment_length(i);
            cumulative.push(acc);
        }
        cumulative
    }

    /// Total arc length.
    pub fn length(&self) -> f64 {
        polyline_length(&self.positions, self.closed)
    }

    /// Validates a parameter and brings it to canonical form.
    ///
    /// `u == 1` on a segment that has a successor becomes `u == 0` on the
    /// successor; for closed strokes the end of the last segment becomes the
    /// start of the first one.
    pub fn normalize_parameter(&self, p: CurveParameter) -> Result<CurveParameter> {
        let segment_count = self.segment_count();
        let invalid = || Error::InvalidCurveParameter {
            segment_index: p.segment_index,
            u: p.u,
            segment_count,
        };
        if !p.u.is_finite() || p.u < 0.0 || p.u > 1.0 {
            return Err(invalid());
        }
        if p.segment_index >= segment_count {
            // The end of an open stroke may be written (segment_count, 0).
            if p.segment_index == segment_count && p.u == 0.0 && !self.closed {
                return Ok(CurveParameter::new(segment_count - 1, 1.0));
            }
            return Err(invalid());
        }
        if p.u == 1.0 {
            if p.segment_index + 1 < segment_count {
                return Ok(CurveParameter::new(p.segment_index + 1, 0.0));
            }
            if self.closed {
                return Ok(CurveParameter::new(0, 0.0));
            }
        }
        Ok(p)
    }

    /// Arc length from the start of the stroke to `p`.
    pub fn arc_length_at(&self, p: CurveParameter) -> Result<f64> {
        let p = self.normalize_parameter(p)?;
        let cumulative = self.cumulative_lengths();
        Ok(cumulative[p.segment_index] + p.u * self.segment_length(p.segment_index))
    }

    /// Parameter at arc length `s`, clamped (open) or wrapped (closed).
    pub fn parameter_at_arc_length(&self, s: f64) -> CurveParameter {
        let cumulative = self.cumulative_lengths();
        let total = cumulative[cumulative.len() - 1];
        if total <= 0.0 {
            return CurveParameter::new(0, 0.0);
        }
        let s = if self.closed {
            s.rem_euclid(total)
        } else {
            s.clamp(0.0, total)
        };
        let segment_count = self.segment_count();
        let mut i = 0;
        while i + 1 < segment_count && cumulative[i + 1] <= s {
            i += 1;
        }
        let len = cumulative[i + 1] - cumulative[i];
        let u = if len > 0.0 {
            ((s - cumulative[i]) / len).clamp(0.0, 1.0)
        } else {
            0.0
        };
        CurveParameter::new(i, u)
    }

    /// Position at parameter `p`.
    pub fn eval(&self, p: CurveParameter) -> Result<Point2<f64>> {
        let p = self.normalize_parameter(p)?;
        let (a, b) = self.segment_ends(p.segment_index);
        Ok(self.positions[a] + (self.positions[b] - self.positions[a]) * p.u)
    }

    /// Width at parameter `p`.
    pub fn width_at(&self, p: CurveParameter) -> Result<f64> {
        let p = self.normalize_parameter(p)?;
        let (a, b) = self.segment_ends(p.segment_index);
        Ok(self.widths[a] + (self.widths[b] - self.widths[a]) * p.u)
    }

    fn sample_at_arc_length(&self, cumulative: &[f64], s: f64) -> (Point2<f64>, f64) {
        let total = cumulative[cumulative.len() - 1];
        let segment_count = self.segment_count();
        let s = if self.closed && total > 0.0 {
            s.rem_euclid(total)
        } else {
            s.clamp(0.0, total.max(0.0))
        };
        let mut i = 0;
        while i + 1 < segment_count && cumulative[i + 1] <= s {
            i += 1;
        }
        let len = cumulative[i + 1] - cumulative[i];
        let u = if len > 0.0 {
            ((s - cumulative[i]) / len).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let (a, b) = self.segment_ends(i);
        (
            self.positions[a] + (self.positions[b] - self.positions[a]) * u,
            self.widths[a] + (self.widths[b] - self.widths[a]) * u,
        )
    }

    /// Returns the open sub-stroke from `start` to `end`.
    ///
    /// For closed strokes the slice runs forward from `start`, goes around
    /// the loop `num_wraps` additional times, and wraps implicitly when
    /// `end` precedes `start`. With `start == end` and `num_wraps == 1` the
    /// whole loop is returned as an open stroke whose endpoints coincide.
    /// Open strokes ignore `num_wraps` and clamp `end` to be after `start`.
    pub fn slice(&self, start: CurveParameter, end: CurveParameter, num_wraps: usize) -> Result<Stroke2d> {
        let cumulative = self.cumulative_lengths();
        let total = cumulative[cumulative.len() - 1];
        let s0 = self.arc_length_at(start)?;
        let s1 = self.arc_length_at(end)?;

        let span = if self.closed {
            let mut span = s1 - s0 + num_wraps as f64 * total;
            if span < 0.0 {
                span += total;
            }
            span
        } else {
            (s1 - s0).max(0.0)
        };
        let stop = s0 + span;
        let tolerance = 1e-12 * total.max(1.0);

        let (first, first_width) = self.sample_at_arc_length(&cumulative, s0);
        let mut positions = vec![first];
        let mut widths = vec![first_width];

        let n = self.positions.len();
        if total > 0.0 {
            let mut lap = 0usize;
            'outer: loop {
                let offset = lap as f64 * total;
                for k in 0..n {
                    let a = cumulative[k] + offset;
                    if a >= stop - tolerance {
                        break 'outer;
                    }
                    if a > s0 + tolerance {
                        positions.push(self.positions[k]);
                        widths.push(self.widths[k]);
                    }
                }
                if !self.closed {
                    break;
                }
                lap += 1;
            }
        }

        let (last, last_width) = if !self.closed && s1 >= total {
            (self.positions[n - 1], self.widths[n - 1])
        } else {
            self.sample_at_arc_length(&cumulative, stop)
        };
        positions.push(last);
        widths.push(last_width);

        Ok(Stroke2d {
            positions,
            widths,
            closed: false,
        })
    }

    /// `n` positions uniformly spaced by arc length.
    ///
    /// Open strokes include both endpoints; closed strokes start at the
    /// start point and do not repeat it.
    pub fn sample_uniform(&self, n: usize) -> Vec<Point2<f64>> {
        resample_uniform(&self.positions, n, self.closed)
    }

    /// Copy of this stroke resampled to `n` points uniformly spaced by arc
    /// length, widths interpolated.
    pub fn resample_uniform(&self, n: usize) -> Stroke2d {
        let n = n.max(2);
        let cumulative = self.cumulative_lengths();
        let total = cumulative[cumulative.len() - 1];
        let mut positions = Vec::with_capacity(n);
        let mut widths = Vec::with_capacity(n);
        for k in 0..n {
            let s = if self.closed {
                total * k as f64 / n as f64
            } else {
                total * k as f64 / (n - 1) as f64
            };
            let (p, w) = self.sample_at_arc_length(&cumulative, s);
            positions.push(p);
            widths.push(w);
        }
        Stroke2d {
            positions,
            widths,
            closed: self.closed,
        }
    }

    /// The same curve traversed backwards.
    ///
    /// A closed stroke keeps its start point: `[p0, p1, .., pn]` becomes
    /// `[p0, pn, .., p1]`.
    pub fn reversed(&self) -> Stroke2d {
        let mut positions = self.positions.clone();
        let mut widths = self.widths.clone();
        if self.closed {
            positions[1..].reverse();
            widths[1..].reverse();
        } else {
            positions.reverse();
            widths.reverse();
        }
        Stroke2d {
            positions,
            widths,
            closed: self.closed,
        }
    }

    /// A closed stroke whose start point is moved forward by the fraction
    /// `u` of its length. Open strokes are returned unchanged.
    pub fn rotated(&self, u: f64) -> Stroke2d {
        if !self.closed {
            return self.clone();
        }
        let total = self.length();
        let u = u.rem_euclid(1.0);
        if total <= 0.0 || u == 0.0 {
            return self.clone();
        }
        let p = self.parameter_at_arc_length(u * total);
        match self.slice(p, p, 1) {
            Ok(mut loop_stroke) => {
                loop_stroke.positions.pop();
                loop_stroke.widths.pop();
                if loop_stroke.positions.len() < 2 {
                    return self.clone();
                }
                loop_stroke.closed = true;
                loop_stroke
            }
            Err(_) => self.clone(),
        }
    }

    /// Deforms an open stroke so that it starts at `start` and ends at `end`.
    ///
    /// The endpoint displacements are blended linearly along the arc length.
    /// Closed strokes are left unchanged.
    pub fn snap_endpoints(&mut self, start: Point2<f64>, end: Point2<f64>) {
        if self.closed {
            return;
        }
        let n = self.positions.len();
        let ds = start - self.positions[0];
        let de = end - self.positions[n - 1];
        if ds == Vector2::zeros() && de == Vector2::zeros() {
            return;
        }

        let cumulative = self.cumulative_lengths();
        let total = cumulative[n - 1];
        for (i, p) in self.positions.iter_mut().enumerate() {
            let t = if total > 0.0 {
                cumulative[i] / total
            } else {
                i as f64 / (n - 1) as f64
            };
            *p += ds * (1.0 - t) + de * t;
        }
        self.positions[0] = start;
        self.positions[n - 1] = end;
    }

    pub fn translate(&mut self, delta: Vector2<f64>) {
        for p in &mut self.positions {
            *p += delta;
        }
    }

    /// Bounding box of the stroke outline (centerline grown by half widths).
    pub fn bounding_box(&self) -> Rect2 {
        self.positions
            .iter()
            .zip(&self.widths)
            .fold(Rect2::EMPTY, |rect, (p, w)| {
                rect.unite(&Rect2::from_point(*p).inflated(w.abs() / 2.0))
            })
    }

    /// Pointwise average of several strokes, each resampled to `n` points.
    ///
    /// All strokes must already be traversed in a consistent direction (and,
    /// for closed strokes, start at corresponding points).
    pub fn average(strokes: &[Stroke2d], n: usize, closed: bool) -> Result<Stroke2d> {
        if strokes.is_empty() {
            return Err(Error::EmptyInput("no strokes to average"));
        }
        let n = n.max(2);
        let resampled: Vec<Stroke2d> = strokes.iter().map(|s| s.resample_uniform(n)).collect();
        let count = resampled.len() as f64;

        let mut positions = Vec::with_capacity(n);
        let mut widths = Vec::with_capacity(n);
        for k in 0..n {
            let mut sum = Vector2::zeros();
            let mut width = 0.0;
            for s in &resampled {
                sum += s.positions[k].coords;
                width += s.widths[k];
            }
            positions.push(Point2::from(sum / count));
            widths.push(width / count);
        }

        Ok(Stroke2d {
            positions,
            widths,
            closed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64) -> Point2<f64> {
        Point2::new(x, y)
    }

    fn square_loop() -> Stroke2d {
        Stroke2d::new(
            vec![p(0.0, 0.0), p(4.0, 0.0), p(4.0, 4.0), p(0.0, 4.0)],
            vec![],
            true,
        )
        .unwrap()
    }

    #[test]
    fn test_new_rejects_single_point() {
        assert!(Stroke2d::new(vec![p(0.0, 0.0)], vec![], false).is_err());
        assert!(Stroke2d::new(vec![p(0.0, 0.0), p(1.0, 0.0)], vec![1.0], false).is_err());
    }

    #[test]
    fn test_normalize_parameter() {
        let s = Stroke2d::new(vec![p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0)], vec![], false).unwrap();
        assert_eq!(s.normalize_parameter(CurveParameter::new(0, 1.0)).unwrap(), CurveParameter::new(1, 0.0));
        assert_eq!(s.normalize_parameter(CurveParameter::new(1, 1.0)).unwrap(), CurveParameter::new(1, 1.0));
        assert!(s.normalize_parameter(CurveParameter::new(2, 0.5)).is_err());
        assert!(s.normalize_parameter(CurveParameter::new(0, 1.5)).is_err());

        let c = square_loop();
        assert_eq!(c.normalize_parameter(CurveParameter::new(3, 1.0)).unwrap(), CurveParameter::new(0, 0.0));
    }

    #[test]
    fn test_open_slice_keeps_interior_points() {
        let s = Stroke2d::new(vec![p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0), p(3.0, 0.0)], vec![], false).unwrap();
        let sub = s.slice(CurveParameter::new(0, 0.5), CurveParameter::new(2, 0.5), 0).unwrap();
        assert_eq!(sub.positions(), &[p(0.5, 0.0), p(1.0, 0.0), p(2.0, 0.0), p(2.5, 0.0)]);
        assert!(!sub.is_closed());
    }

    #[test]
    fn test_closed_slice_wraps() {
        let c = square_loop();
        // From the middle of the left side to the middle of the bottom side.
        let sub = c.slice(CurveParameter::new(3, 0.5), CurveParameter::new(0, 0.5), 0).unwrap();
        assert_eq!(sub.positions(), &[p(0.0, 2.0), p(0.0, 0.0), p(2.0, 0.0)]);
    }

    #[test]
    fn test_closed_full_wrap_slice() {
        let c = square_loop();
        let t = CurveParameter::new(1, 0.5);
        let sub = c.slice(t, t, 1).unwrap();
        assert_relative_eq!(sub.length(), 16.0);
        assert_eq!(sub.start_point(), p(4.0, 2.0));
        assert_eq!(sub.end_point(), p(4.0, 2.0));
        assert_eq!(sub.positions().len(), 6);
    }

    #[test]
    fn test_reversed_closed_keeps_start() {
        let r = square_loop().reversed();
        assert_eq!(r.positions()[0], p(0.0, 0.0));
        assert_eq!(r.positions()[1], p(0.0, 4.0));
    }

    #[test]
    fn test_rotated_closed() {
        let r = square_loop().rotated(0.25);
        assert!(r.is_closed());
        assert_relative_eq!(r.start_point(), p(4.0, 0.0));
        assert_relative_eq!(r.length(), 16.0);
        assert_eq!(r.positions().len(), 4);
    }

    #[test]
    fn test_snap_endpoints() {
        let mut s = Stroke2d::new(vec![p(0.0, 0.0), p(1.0, 1.0), p(2.0, 0.0)], vec![], false).unwrap();
        s.snap_endpoints(p(0.0, 1.0), p(2.0, 1.0));
        assert_eq!(s.start_point(), p(0.0, 1.0));
        assert_eq!(s.end_point(), p(2.0, 1.0));
        assert_relative_eq!(s.positions()[1], p(1.0, 2.0));
    }

    #[test]
    fn test_average_of_mirrored_strokes() {
        let a = Stroke2d::new(vec![p(0.0, 1.0), p(4.0, 1.0)], vec![2.0, 2.0], false).unwrap();
        let b = Stroke2d::new(vec![p(0.0, -1.0), p(4.0, -1.0)], vec![4.0, 4.0], false).unwrap();
        let avg = Stroke2d::average(&[a, b], 3, false).unwrap();
        assert_relative_eq!(avg.positions()[1], p(2.0, 0.0));
        assert_relative_eq!(avg.widths()[0], 3.0);
    }

    #[test]
    fn test_bounding_box_includes_half_width() {
        let s = Stroke2d::with_constant_width(vec![p(0.0, 0.0), p(10.0, 0.0)], 2.0, false).unwrap();
        let bbox = s.bounding_box();
        assert_relative_eq!(bbox.min.y, -1.0);
        assert_relative_eq!(bbox.max.x, 11.0);
    }

    #[test]
    fn test_parameter_arc_length_round_trip() {
        let c = square_loop();
        let t = c.parameter_at_arc_length(6.0);
        assert_eq!(t, CurveParameter::new(1, 0.5));
        assert_relative_eq!(c.arc_length_at(t).unwrap(), 6.0);
        // Wraps around for closed strokes.
        assert_eq!(c.parameter_at_arc_length(22.0), CurveParameter::new(1, 0.5));
    }
}
