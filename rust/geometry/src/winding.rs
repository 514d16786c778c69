// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Winding numbers and fill rules for closed polygons.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Fill rule deciding whether a winding number is inside a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindingRule {
    /// Inside when the winding number is odd.
    #[default]
    Odd,
    /// Inside when the winding number is not zero.
    NonZero,
    /// Inside when the winding number is strictly positive.
    Positive,
    /// Inside when the winding number is strictly negative.
    Negative,
}

impl WindingRule {
    /// Returns whether a point with winding number `w` is filled.
    pub fn is_filled(self, w: i32) -> bool {
        match self {
            WindingRule::Odd => w % 2 != 0,
            WindingRule::NonZero => w != 0,
            WindingRule::Positive => w > 0,
            WindingRule::Negative => w < 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WindingRule::Odd => "odd",
            WindingRule::NonZero => "nonzero",
            WindingRule::Positive => "positive",
            WindingRule::Negative => "negative",
        }
    }

    /// Parses the lowercase name returned by [`WindingRule::as_str`].
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "odd" => Some(WindingRule::Odd),
            "nonzero" => Some(WindingRule::NonZero),
            "positive" => Some(WindingRule::Positive),
            "negative" => Some(WindingRule::Negative),
            _ => None,
        }
    }
}

impl std::fmt::Display for WindingRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Twice the signed area of triangle `(a, b, p)`: positive when `p` is left of `a -> b`.
#[inline]
pub fn orient(a: &Point2<f64>, b: &Point2<f64>, p: &Point2<f64>) -> f64 {
    (b.x - a.x) * (p.y - a.y) - (p.x - a.x) * (b.y - a.y)
}

/// Signed winding number of the closed polygon `polygon` around `point`.
///
/// The polygon is implicitly closed (last point connects to the first).
/// Counter-clockwise polygons give `+1` inside.
pub fn winding_number(polygon: &[Point2<f64>], point: &Point2<f64>) -> i32 {
    let n = polygon.len();
    if n < 2 {
        return 0;
    }

    let mut w = 0;
    for i in 0..n {
        let a = &polygon[i];
        let b = &polygon[(i + 1) % n];
        if a.y <= point.y {
            if b.y > point.y && orient(a, b, point) > 0.0 {
                w += 1;
            }
        } else if b.y <= point.y && orient(a, b, point) < 0.0 {
            w -= 1;
        }
    }
    w
}

/// Signed area of a closed polygon (positive for counter-clockwise).
pub fn signed_area(polygon: &[Point2<f64>]) -> f64 {
    let n = polygon.len();
    if n < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    for i in 0..n {
        let a = &polygon[i];
        let b = &polygon[(i + 1) % n];
        area += a.x * b.y - b.x * a.y;
    }
    area / 2.0
}
