// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polyline utilities: length, arc-length resampling and cleanup.

use nalgebra::Point2;

use crate::rect::Rect2;

/// Total length of a polyline (closing segment included when `closed`).
pub fn polyline_length(points: &[Point2<f64>], closed: bool) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let mut length: f64 = points.windows(2).map(|w| (w[1] - w[0]).norm()).sum();
    if closed {
        length += (points[0] - points[points.len() - 1]).norm();
    }
    length
}

/// Bounding box of a set of points.
pub fn polyline_bounds(points: &[Point2<f64>]) -> Rect2 {
    Rect2::from_points(points.iter())
}

/// Samples `n` points uniformly spaced by arc length.
///
/// For open polylines the first and last samples are the endpoints. For
/// closed polylines sample `k` is at arc length `k * L / n`, so the start
/// point is not repeated.
pub fn resample_uniform(points: &[Point2<f64>], n: usize, closed: bool) -> Vec<Point2<f64>> {
    if points.is_empty() || n == 0 {
        return Vec::new();
    }
    if points.len() == 1 {
        return vec![points[0]; n];
    }

    let mut cumulative = Vec::with_capacity(points.len() + 1);
    cumulative.push(0.0);
    let segment_count = if closed { points.len() } else { points.len() - 1 };
    for i in 0..segment_count {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        let prev = cumulative[cumulative.len() - 1];
        cumulative.push(prev + (b - a).norm());
    }
    let total = cumulative[segment_count];

    let mut samples = Vec::with_capacity(n);
    let mut segment = 0;
    for k in 0..n {
        let s = if closed {
            total * k as f64 / n as f64
        } else if n == 1 {
            0.0
        } else {
            total * k as f64 / (n - 1) as f64
        };
        while segment + 1 < segment_count && cumulative[segment + 1] < s {
            segment += 1;
        }
        let a = points[segment];
        let b = points[(segment + 1) % points.len()];
        let len = cumulative[segment + 1] - cumulative[segment];
        let u = if len > 0.0 {
            ((s - cumulative[segment]) / len).clamp(0.0, 1.0)
        } else {
            0.0
        };
        samples.push(a + (b - a) * u);
    }
    samples
}

/// Removes consecutive points closer than `epsilon` to the previously kept
/// point. The last point of the input is always kept.
pub fn remove_near_duplicates(points: &[Point2<f64>], epsilon: f64) -> Vec<Point2<f64>> {
    let mut result: Vec<Point2<f64>> = Vec::with_capacity(points.len());
    for (i, p) in points.iter().enumerate() {
        let kept = result.len();
        match result.last_mut() {
            Some(last) if (p - *last).norm() <= epsilon => {
                if i == points.len() - 1 && kept > 1 {
                    *last = *p;
                }
            }
            _ => result.push(*p),
        }
    }
    result
}

/// Trims the common leading and trailing sub-polylines of `a` and `b`.
///
/// Both polylines are expected to start at the same point and end at the
/// same point. Points closer than `epsilon` are considered equal. At least
/// one point is kept at each end of the shared portion, so the returned
/// polylines still start (resp. end) at a common point.
pub fn trim_shared_ends(
    a: &[Point2<f64>],
    b: &[Point2<f64>],
    epsilon: f64,
) -> (Vec<Point2<f64>>, Vec<Point2<f64>>) {
    if a.is_empty() || b.is_empty() {
        return (a.to_vec(), b.to_vec());
    }

    let close = |p: &Point2<f64>, q: &Point2<f64>| (p - q).norm() <= epsilon;

    let mut head = 0;
    while head + 1 < a.len() && head + 1 < b.len() && close(&a[head + 1], &b[head + 1]) {
        head += 1;
    }

    let mut tail = 0;
    while tail + 1 < a.len() - head
        && tail + 1 < b.len() - head
        && close(&a[a.len() - 2 - tail], &b[b.len() - 2 - tail])
    {
        tail += 1;
    }

    (
        a[head..a.len() - tail].to_vec(),
        b[head..b.len() - tail].to_vec(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64) -> Point2<f64> {
        Point2::new(x, y)
    }

    #[test]
    fn test_polyline_length() {
        let pts = vec![p(0.0, 0.0), p(3.0, 0.0), p(3.0, 4.0)];
        assert_relative_eq!(polyline_length(&pts, false), 7.0);
        assert_relative_eq!(polyline_length(&pts, true), 12.0);
    }

    #[test]
    fn test_resample_uniform_open() {
        let pts = vec![p(0.0, 0.0), p(10.0, 0.0)];
        let s = resample_uniform(&pts, 5, false);
        assert_eq!(s.len(), 5);
        assert_relative_eq!(s[0].x, 0.0);
        assert_relative_eq!(s[1].x, 2.5);
        assert_relative_eq!(s[4].x, 10.0);
    }

    #[test]
    fn test_resample_uniform_closed() {
        let square = vec![p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)];
        let s = resample_uniform(&square, 8, true);
        assert_eq!(s.len(), 8);
        assert_relative_eq!(s[0], p(0.0, 0.0));
        assert_relative_eq!(s[1], p(0.5, 0.0));
        assert_relative_eq!(s[2], p(1.0, 0.0));
        assert_relative_eq!(s[6], p(0.0, 1.0));
        assert_relative_eq!(s[7], p(0.0, 0.5));
    }

    #[test]
    fn test_remove_near_duplicates_keeps_last() {
        let pts = vec![p(0.0, 0.0), p(0.0, 1e-12), p(1.0, 0.0), p(1.0, 1e-12)];
        let cleaned = remove_near_duplicates(&pts, 1e-9);
        assert_eq!(cleaned, vec![p(0.0, 0.0), p(1.0, 1e-12)]);
    }

    #[test]
    fn test_remove_near_duplicates_single_point() {
        let pts = vec![p(2.0, 3.0), p(2.0, 3.0 + 1e-12), p(2.0, 3.0)];
        assert_eq!(remove_near_duplicates(&pts, 1e-9), vec![p(2.0, 3.0)]);
        assert!(remove_near_duplicates(&[], 1e-9).is_empty());
    }

    #[test]
    fn test_trim_shared_ends() {
        let a = vec![p(0.0, 0.0), p(1.0, 0.0), p(2.0, 1.0), p(3.0, 0.0), p(4.0, 0.0)];
        let b = vec![p(0.0, 0.0), p(1.0, 0.0), p(2.0, -1.0), p(3.0, 0.0), p(4.0, 0.0)];
        let (ta, tb) = trim_shared_ends(&a, &b, 1e-9);
        assert_eq!(ta, vec![p(1.0, 0.0), p(2.0, 1.0), p(3.0, 0.0)]);
        assert_eq!(tb, vec![p(1.0, 0.0), p(2.0, -1.0), p(3.0, 0.0)]);
    }
}
