// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Axis-aligned bounding boxes.

use nalgebra::Point2;

/// Axis-aligned 2D rectangle used for bounding boxes.
///
/// The empty rectangle has `min > max` and is the identity of [`Rect2::unite`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect2 {
    pub min: Point2<f64>,
    pub max: Point2<f64>,
}

impl Rect2 {
    /// The empty rectangle.
    pub const EMPTY: Rect2 = Rect2 {
        min: Point2::new(f64::INFINITY, f64::INFINITY),
        max: Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
    };

    /// Creates a rectangle from two corners, in any order.
    pub fn from_corners(a: Point2<f64>, b: Point2<f64>) -> Self {
        Self {
            min: Point2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Degenerate rectangle containing a single point.
    pub fn from_point(p: Point2<f64>) -> Self {
        Self { min: p, max: p }
    }

    /// Smallest rectangle containing all the given points.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point2<f64>>) -> Self {
        let mut rect = Self::EMPTY;
        for p in points {
            rect.unite_point(p);
        }
        rect
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    pub fn width(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.max.x - self.min.x
        }
    }

    pub fn height(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.max.y - self.min.y
        }
    }

    /// Grows this rectangle to contain `p`.
    pub fn unite_point(&mut self, p: &Point2<f64>) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    /// Returns the smallest rectangle containing both `self` and `other`.
    pub fn unite(&self, other: &Rect2) -> Rect2 {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Rect2 {
            min: Point2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// Returns this rectangle grown by `margin` on every side.
    pub fn inflated(&self, margin: f64) -> Rect2 {
        if self.is_empty() {
            return *self;
        }
        Rect2 {
            min: Point2::new(self.min.x - margin, self.min.y - margin),
            max: Point2::new(self.max.x + margin, self.max.y + margin),
        }
    }

    pub fn contains(&self, p: &Point2<f64>) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Check if two rectangles overlap
    pub fn intersects(&self, other: &Rect2) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
}

impl Default for Rect2 {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_unite_identity() {
        let r = Rect2::from_corners(Point2::new(1.0, 2.0), Point2::new(-1.0, 0.0));
        assert!(Rect2::EMPTY.is_empty());
        assert_eq!(Rect2::EMPTY.unite(&r), r);
        assert_eq!(r.unite(&Rect2::EMPTY), r);
        assert_eq!(r.width(), 2.0);
        assert_eq!(r.height(), 2.0);
    }

    #[test]
    fn test_from_points_and_overlap() {
        let pts = [Point2::new(0.0, 0.0), Point2::new(3.0, 1.0), Point2::new(1.0, -2.0)];
        let r = Rect2::from_points(pts.iter());
        assert_eq!(r.min, Point2::new(0.0, -2.0));
        assert_eq!(r.max, Point2::new(3.0, 1.0));
        assert!(r.contains(&Point2::new(2.0, 0.0)));

        let far = Rect2::from_point(Point2::new(10.0, 10.0));
        assert!(!r.intersects(&far));
        assert!(r.intersects(&r.inflated(1.0)));
    }
}
