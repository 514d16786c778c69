// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Segment and polyline intersection tests.
//!
//! The classification is exact on the input coordinates: any touching or
//! colinear contact is reported as [`SegmentIntersection::Degenerate`] so
//! that callers can perturb their input and retry.

use nalgebra::Point2;

use crate::rect::Rect2;
use crate::winding::orient;

/// How two closed segments meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentIntersection {
    /// The segments do not touch.
    None,
    /// The segments cross at a single interior point of both.
    Proper,
    /// The segments touch at an endpoint or overlap colinearly.
    Degenerate,
}

fn sign(x: f64) -> i8 {
    if x > 0.0 {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    }
}

/// Whether `p`, known to be colinear with `a -> b`, lies within its bounds.
fn on_segment(a: &Point2<f64>, b: &Point2<f64>, p: &Point2<f64>) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Classifies the intersection of segments `a0 -> a1` and `b0 -> b1`.
pub fn classify_segment_intersection(
    a0: &Point2<f64>,
    a1: &Point2<f64>,
    b0: &Point2<f64>,
    b1: &Point2<f64>,
) -> SegmentIntersection {
    let o1 = sign(orient(a0, a1, b0));
    let o2 = sign(orient(a0, a1, b1));
    let o3 = sign(orient(b0, b1, a0));
    let o4 = sign(orient(b0, b1, a1));

    if o1 * o2 < 0 && o3 * o4 < 0 {
        return SegmentIntersection::Proper;
    }

    let touches = (o1 == 0 && on_segment(a0, a1, b0))
        || (o2 == 0 && on_segment(a0, a1, b1))
        || (o3 == 0 && on_segment(b0, b1, a0))
        || (o4 == 0 && on_segment(b0, b1, a1));

    if touches {
        SegmentIntersection::Degenerate
    } else {
        SegmentIntersection::None
    }
}

/// Result of counting the crossings between two polylines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CrossingCount {
    /// Number of proper crossings found.
    pub count: usize,
    /// Whether a degenerate contact made the count unreliable.
    pub degenerate: bool,
}

/// Counts proper crossings between polylines `a` and `b`.
///
/// If `shared_start` is set, `a[0]` and `b[0]` are known to be the same
/// point and the contact of the first segments at that point is ignored
/// (unless the segments overlap colinearly). Likewise `shared_end` for the
/// last points.
pub fn count_polyline_crossings(
    a: &[Point2<f64>],
    b: &[Point2<f64>],
    shared_start: bool,
    shared_end: bool,
) -> CrossingCount {
    let mut result = CrossingCount::default();
    if a.len() < 2 || b.len() < 2 {
        return result;
    }

    let last_a = a.len() - 2;
    let last_b = b.len() - 2;

    for i in 0..=last_a {
        let (a0, a1) = (&a[i], &a[i + 1]);
        let bbox_a = Rect2::from_corners(*a0, *a1);
        for j in 0..=last_b {
            let (b0, b1) = (&b[j], &b[j + 1]);
            if !bbox_a.intersects(&Rect2::from_corners(*b0, *b1)) {
                continue;
            }
            match classify_segment_intersection(a0, a1, b0, b1) {
                SegmentIntersection::None => {}
                SegmentIntersection::Proper => result.count += 1,
                SegmentIntersection::Degenerate => {
                    let at_start = shared_start && i == 0 && j == 0 && a0 == b0;
                    let at_end = shared_end && i == last_a && j == last_b && a1 == b1;
                    let colinear = orient(a0, a1, b0) == 0.0 && orient(a0, a1, b1) == 0.0;
                    if (at_start || at_end) && !colinear && !extra_contact(a0, a1, b0, b1, at_start) {
                        continue;
                    }
                    result.degenerate = true;
                }
            }
        }
    }

    result
}

/// Whether two segments sharing an endpoint also touch somewhere else.
fn extra_contact(a0: &Point2<f64>, a1: &Point2<f64>, b0: &Point2<f64>, b1: &Point2<f64>, shared_first: bool) -> bool {
    let (a_free, b_free) = if shared_first { (a1, b1) } else { (a0, b0) };
    (orient(b0, b1, a_free) == 0.0 && on_segment(b0, b1, a_free))
        || (orient(a0, a1, b_free) == 0.0 && on_segment(a0, a1, b_free))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point2<f64> {
        Point2::new(x, y)
    }

    #[test]
    fn test_proper_crossing() {
        let r = classify_segment_intersection(&p(0.0, 0.0), &p(2.0, 2.0), &p(0.0, 2.0), &p(2.0, 0.0));
        assert_eq!(r, SegmentIntersection::Proper);
    }

    #[test]
    fn test_touching_is_degenerate() {
        let r = classify_segment_intersection(&p(0.0, 0.0), &p(2.0, 0.0), &p(1.0, 0.0), &p(1.0, 3.0));
        assert_eq!(r, SegmentIntersection::Degenerate);
        let r = classify_segment_intersection(&p(0.0, 0.0), &p(2.0, 0.0), &p(1.0, 0.0), &p(3.0, 0.0));
        assert_eq!(r, SegmentIntersection::Degenerate);
    }

    #[test]
    fn test_disjoint() {
        let r = classify_segment_intersection(&p(0.0, 0.0), &p(1.0, 0.0), &p(0.0, 1.0), &p(1.0, 1.0));
        assert_eq!(r, SegmentIntersection::None);
    }

    #[test]
    fn test_shared_endpoints_are_ignored() {
        // Two arcs from (0,0) to (4,0), one above and one below.
        let a = vec![p(0.0, 0.0), p(2.0, 2.0), p(4.0, 0.0)];
        let b = vec![p(0.0, 0.0), p(2.0, -2.0), p(4.0, 0.0)];
        let c = count_polyline_crossings(&a, &b, true, true);
        assert_eq!(c.count, 0);
        assert!(!c.degenerate);
    }

    #[test]
    fn test_single_crossing_between_shared_endpoints() {
        // S-shaped paths that swap sides once.
        let a = vec![p(0.0, 0.0), p(1.0, 1.0), p(3.0, -1.0), p(4.0, 0.0)];
        let b = vec![p(0.0, 0.0), p(1.0, -1.0), p(3.0, 1.0), p(4.0, 0.0)];
        let c = count_polyline_crossings(&a, &b, true, true);
        assert_eq!(c.count, 1);
        assert!(!c.degenerate);
    }
}
