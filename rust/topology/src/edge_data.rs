// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry and properties of a key edge.

use nalgebra::{Point2, Vector2};
use vac_lite_geometry::{CurveParameter, Rect2, Stroke2d};

use crate::error::{Error, Result};
use crate::properties::Properties;

/// Stroke geometry plus properties owned by a key edge.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyEdgeData {
    stroke: Stroke2d,
    properties: Properties,
}

impl KeyEdgeData {
    pub fn new(stroke: Stroke2d) -> Self {
        Self {
            stroke,
            properties: Properties::default(),
        }
    }

    pub fn with_properties(stroke: Stroke2d, properties: Properties) -> Self {
        Self { stroke, properties }
    }

    pub fn stroke(&self) -> &Stroke2d {
        &self.stroke
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }

    pub fn is_closed(&self) -> bool {
        self.stroke.is_closed()
    }

    /// The open piece of this edge between two parameters, carrying the same
    /// properties. See [`Stroke2d::slice`] for the meaning of `num_wraps`.
    pub fn from_slice(
        &self,
        start: CurveParameter,
        end: CurveParameter,
        num_wraps: usize,
    ) -> Result<KeyEdgeData> {
        Ok(Self {
            stroke: self.stroke.slice(start, end, num_wraps)?,
            properties: self.properties.clone(),
        })
    }

    /// Merges open edges, each given with the direction it is traversed in.
    ///
    /// The directed strokes are resampled to a common point count and
    /// averaged pointwise.
    pub fn from_glue_open(parts: &[(&KeyEdgeData, bool)]) -> Result<KeyEdgeData> {
        if parts.is_empty() {
            return Err(Error::EmptyInput("no edge data to glue"));
        }
        let strokes: Vec<Stroke2d> = parts
            .iter()
            .map(|(d, direction)| {
                if *direction {
                    d.stroke.clone()
                } else {
                    d.stroke.reversed()
                }
            })
            .collect();
        let n = strokes
            .iter()
            .map(|s| s.positions().len())
            .max()
            .unwrap_or(2)
            .max(2);
        Ok(Self {
            stroke: Stroke2d::average(&strokes, n, false)?,
            properties: Properties::merged(parts.iter().map(|(d, _)| &d.properties)),
        })
    }

    /// Merges closed edges, each given with its direction and the fraction
    /// of its (directed) length by which its start point must be moved to
    /// line up with the others.
    pub fn from_glue_closed(parts: &[(&KeyEdgeData, bool, f64)]) -> Result<KeyEdgeData> {
        if parts.is_empty() {
            return Err(Error::EmptyInput("no edge data to glue"));
        }
        let strokes: Vec<Stroke2d> = parts
            .iter()
            .map(|(d, direction, u_offset)| {
                let directed = if *direction {
                    d.stroke.clone()
                } else {
                    d.stroke.reversed()
                };
                directed.rotated(*u_offset)
            })
            .collect();
        let n = strokes
            .iter()
            .map(|s| s.positions().len())
            .max()
            .unwrap_or(3)
            .max(3);
        Ok(Self {
            stroke: Stroke2d::average(&strokes, n, true)?,
            properties: Properties::merged(parts.iter().map(|(d, _, _)| &d.properties)),
        })
    }

    /// Moves the endpoints of an open stroke, deforming it smoothly.
    pub fn snap(&mut self, start: Point2<f64>, end: Point2<f64>) {
        self.stroke.snap_endpoints(start, end);
    }

    pub fn translate(&mut self, delta: Vector2<f64>) {
        self.stroke.translate(delta);
    }

    pub fn bounding_box(&self) -> Rect2 {
        self.stroke.bounding_box()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::PropValue;
    use approx::assert_relative_eq;

    fn open(points: &[(f64, f64)]) -> KeyEdgeData {
        KeyEdgeData::new(
            Stroke2d::new(points.iter().map(|&(x, y)| Point2::new(x, y)).collect(), vec![], false)
                .unwrap(),
        )
    }

    #[test]
    fn slice_copies_properties() {
        let mut d = open(&[(0.0, 0.0), (4.0, 0.0)]);
        d.properties_mut().insert("layer", PropValue::Int(3));
        let piece = d
            .from_slice(CurveParameter::new(0, 0.25), CurveParameter::new(0, 0.75), 0)
            .unwrap();
        assert_relative_eq!(piece.stroke().length(), 2.0);
        assert_eq!(piece.properties().get("layer"), Some(&PropValue::Int(3)));
    }

    #[test]
    fn glue_open_respects_directions() {
        let a = open(&[(0.0, 1.0), (4.0, 1.0)]);
        let b = open(&[(4.0, -1.0), (0.0, -1.0)]);
        let glued = KeyEdgeData::from_glue_open(&[(&a, true), (&b, false)]).unwrap();
        assert_relative_eq!(glued.stroke().start_point(), Point2::new(0.0, 0.0));
        assert_relative_eq!(glued.stroke().end_point(), Point2::new(4.0, 0.0));
    }

    #[test]
    fn glue_closed_applies_offsets() {
        let square = |s: f64| {
            KeyEdgeData::new(
                Stroke2d::new(
                    vec![
                        Point2::new(0.0, 0.0),
                        Point2::new(s, 0.0),
                        Point2::new(s, s),
                        Point2::new(0.0, s),
                    ],
                    vec![],
                    true,
                )
                .unwrap(),
            )
        };
        let a = square(2.0);
        let b = square(2.0);
        // Same square traversed from its second corner: offset 3/4 brings
        // the start back to the origin.
        let b_rotated = KeyEdgeData::new(b.stroke().rotated(0.25));
        let glued = KeyEdgeData::from_glue_closed(&[(&a, true, 0.0), (&b_rotated, true, 0.75)]).unwrap();
        assert!(glued.is_closed());
        assert_relative_eq!(glued.stroke().start_point(), Point2::new(0.0, 0.0), epsilon = 1e-9);
        assert_relative_eq!(glued.stroke().length(), 8.0, epsilon = 1e-9);
    }

    #[test]
    fn glue_requires_input() {
        assert!(KeyEdgeData::from_glue_open(&[]).is_err());
        assert!(KeyEdgeData::from_glue_closed(&[]).is_err());
    }
}
