// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Choosing how a face is cut.
//!
//! Cutting a face with an edge whose ends lie on the face boundary can be
//! interpreted several ways. When the caller asks for `Auto`, the policy is
//! inferred from the geometry:
//!
//! - **One cycle** (both ends on the same cycle): the two halves of the cycle
//!   between the ends are compared. If they cross an odd number of times the
//!   cut is a Möbius identification, otherwise it splits the face in two.
//! - **Two cycles**: the two cycles are merged into one; the orientation of
//!   each is chosen to keep the winding numbers around the cut ends as close
//!   as possible to what they were.

use std::f64::consts::PI;

use nalgebra::{Point2, Vector2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use vac_lite_geometry::{
    count_polyline_crossings, polyline_bounds, remove_near_duplicates, trim_shared_ends,
    winding_number, WindingRule,
};

use crate::cast::{KeyFaceKey, KeyVertexKey};
use crate::complex::Complex;
use crate::config::VacConfig;
use crate::cycle::{KeyCycle, KeyFaceVertexUsageIndex};
use crate::error::{Error, Result};
use crate::halfedge::KeyHalfedge;

/// How to cut a face with an edge joining a cycle to itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OneCycleCutPolicy {
    /// Infer from the geometry.
    #[default]
    Auto,
    /// Split into two faces.
    Disk,
    /// Keep one face whose new cycle uses the edge twice in the same
    /// direction.
    Mobius,
    /// Keep one face and split the cycle in two, one on each side of the
    /// edge.
    Torus,
}

/// How to orient the two cycles merged by an edge joining them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TwoCycleCutPolicy {
    /// Infer from the geometry.
    #[default]
    Auto,
    ReverseNone,
    /// Reverse the cycle holding the start vertex of the edge.
    ReverseStart,
    /// Reverse the cycle holding the end vertex of the edge.
    ReverseEnd,
    ReverseBoth,
}

impl TwoCycleCutPolicy {
    pub(crate) const CONCRETE: [TwoCycleCutPolicy; 4] = [
        TwoCycleCutPolicy::ReverseNone,
        TwoCycleCutPolicy::ReverseStart,
        TwoCycleCutPolicy::ReverseEnd,
        TwoCycleCutPolicy::ReverseBoth,
    ];

    pub(crate) fn reverses_start(self) -> bool {
        matches!(self, TwoCycleCutPolicy::ReverseStart | TwoCycleCutPolicy::ReverseBoth)
    }

    pub(crate) fn reverses_end(self) -> bool {
        matches!(self, TwoCycleCutPolicy::ReverseEnd | TwoCycleCutPolicy::ReverseBoth)
    }
}

/// Policy for two polylines running between the same two points: Möbius
/// when they cross an odd number of times, disk otherwise.
///
/// Degenerate contacts (overlaps, touching vertices) make the count
/// unreliable; the interior points are then jittered with a deterministic
/// generator and the count retried, up to `cut_policy_max_attempts` in
/// total. When every attempt is degenerate the result is `Disk`.
pub fn one_cycle_policy_from_polylines(
    a: &[Point2<f64>],
    b: &[Point2<f64>],
    config: &VacConfig,
) -> OneCycleCutPolicy {
    let bounds = polyline_bounds(a).unite(&polyline_bounds(b));
    let size = bounds.width().max(bounds.height());
    if size <= 0.0 || a.len() < 2 || b.len() < 2 {
        return OneCycleCutPolicy::Disk;
    }
    let epsilon = 1e-6 * size;

    let a = remove_near_duplicates(a, epsilon);
    let b = remove_near_duplicates(b, epsilon);
    let (a, mut b) = trim_shared_ends(&a, &b, epsilon);
    if a.len() < 2 || b.len() < 2 {
        return OneCycleCutPolicy::Disk;
    }

    let shared_start = (a[0] - b[0]).norm() <= epsilon;
    if shared_start {
        b[0] = a[0];
    }
    let (last_a, last_b) = (a.len() - 1, b.len() - 1);
    let shared_end = (a[last_a] - b[last_b]).norm() <= epsilon;
    if shared_end {
        b[last_b] = a[last_a];
    }

    let mut rng = StdRng::seed_from_u64(config.cut_policy_seed);
    let amplitude = 1e-4 * size;
    let attempts = config.cut_policy_max_attempts.max(1);
    for attempt in 0..attempts {
        let crossings = if attempt == 0 {
            count_polyline_crossings(&a, &b, shared_start, shared_end)
        } else {
            let pa = perturb_interior(&a, amplitude, &mut rng);
            let pb = perturb_interior(&b, amplitude, &mut rng);
            count_polyline_crossings(&pa, &pb, shared_start, shared_end)
        };
        tracing::trace!(
            attempt,
            count = crossings.count,
            degenerate = crossings.degenerate,
            "one-cycle cut crossings"
        );
        if !crossings.degenerate {
            return if crossings.count % 2 == 1 {
                OneCycleCutPolicy::Mobius
            } else {
                OneCycleCutPolicy::Disk
            };
        }
    }

    tracing::warn!(attempts, "degenerate one-cycle cut geometry, falling back to disk");
    OneCycleCutPolicy::Disk
}

fn perturb_interior(points: &[Point2<f64>], amplitude: f64, rng: &mut StdRng) -> Vec<Point2<f64>> {
    let last = points.len().saturating_sub(1);
    points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            if i == 0 || i == last {
                *p
            } else {
                p + Vector2::new(
                    rng.gen_range(-amplitude..=amplitude),
                    rng.gen_range(-amplitude..=amplitude),
                )
            }
        })
        .collect()
}

/// Winding scores of a candidate orientation: fewer odd windings first, then
/// a smaller total, then fewer sign flips from the untouched cycles.
type WindingScore = (usize, i64, usize);

fn winding_score(samples: &[SectorSample], policy: TwoCycleCutPolicy) -> WindingScore {
    let s1 = if policy.reverses_start() { -1 } else { 1 };
    let s2 = if policy.reverses_end() { -1 } else { 1 };
    let mut score = (0, 0, 0);
    for s in samples {
        let w = s.untouched + s1 * s.cycle1 + s2 * s.cycle2;
        if w.abs() % 2 == 1 {
            score.0 += 1;
        }
        score.1 += i64::from(w.abs());
        if w != 0 && s.untouched != 0 && w.signum() != s.untouched.signum() {
            score.2 += 1;
        }
    }
    score
}

/// Winding numbers at a point near a cut end.
#[derive(Debug, Clone, Copy)]
struct SectorSample {
    untouched: i32,
    cycle1: i32,
    cycle2: i32,
}

impl Complex {
    /// Infers the one-cycle policy for cutting `face` between two usages of
    /// the same cycle.
    pub fn compute_one_cycle_cut_policy(
        &self,
        face: KeyFaceKey,
        start: KeyFaceVertexUsageIndex,
        end: KeyFaceVertexUsageIndex,
    ) -> Result<OneCycleCutPolicy> {
        if start.cycle_index != end.cycle_index {
            return Err(Error::InvalidInput(
                "one-cycle cut policy needs two usages of the same cycle".to_string(),
            ));
        }
        let cycle = self.face_cycle(face, start)?;
        self.usage_vertex(face, start)?;
        self.usage_vertex(face, end)?;

        let p1 = cycle.sub_path(start.component_index, end.component_index, self);
        let p2 = cycle.sub_path(end.component_index, start.component_index, self);
        let a = self.path_polyline(&p1)?;
        let b = self.path_polyline(&p2.reversed())?;
        let policy = one_cycle_policy_from_polylines(&a, &b, &self.config);
        tracing::debug!(?policy, "computed one-cycle cut policy");
        Ok(policy)
    }

    /// Infers the orientation policy for merging two cycles of `face` with
    /// the open halfedge `halfedge`, which goes from the vertex at `start` to
    /// the vertex at `end`.
    ///
    /// Only the odd winding rule is supported.
    pub fn compute_two_cycle_cut_policy(
        &self,
        face: KeyFaceKey,
        halfedge: KeyHalfedge,
        start: KeyFaceVertexUsageIndex,
        end: KeyFaceVertexUsageIndex,
    ) -> Result<TwoCycleCutPolicy> {
        if self.config.winding_rule != WindingRule::Odd {
            return Err(Error::UnsupportedWindingRule(self.config.winding_rule));
        }
        if start.cycle_index == end.cycle_index {
            return Err(Error::InvalidInput(
                "two-cycle cut policy needs usages of two different cycles".to_string(),
            ));
        }
        let start_vertex = self.usage_vertex(face, start)?;
        let end_vertex = self.usage_vertex(face, end)?;
        self.key_edge(halfedge.edge())?;

        let cycles = self.key_face(face)?.cycles();
        let mut untouched = Vec::new();
        for (i, cycle) in cycles.iter().enumerate() {
            if i != start.cycle_index && i != end.cycle_index {
                untouched.push(self.cycle_polygon(cycle)?);
            }
        }
        let polygon1 = self.cycle_polygon(&cycles[start.cycle_index])?;
        let polygon2 = self.cycle_polygon(&cycles[end.cycle_index])?;

        let mut samples = Vec::new();
        for v in [start_vertex, end_vertex] {
            for point in self.sector_sample_points(v)? {
                samples.push(SectorSample {
                    untouched: untouched.iter().map(|p| winding_number(p, &point)).sum(),
                    cycle1: winding_number(&polygon1, &point),
                    cycle2: winding_number(&polygon2, &point),
                });
            }
        }

        let mut best = TwoCycleCutPolicy::ReverseNone;
        let mut best_score = winding_score(&samples, best);
        for policy in &TwoCycleCutPolicy::CONCRETE[1..] {
            let score = winding_score(&samples, *policy);
            tracing::trace!(?policy, ?score, "two-cycle cut candidate");
            if score < best_score {
                best = *policy;
                best_score = score;
            }
        }
        tracing::debug!(policy = ?best, samples = samples.len(), "computed two-cycle cut policy");
        Ok(best)
    }

    /// One point inside each angular sector between the key edges incident
    /// to `v`, close to `v`.
    fn sector_sample_points(&self, v: KeyVertexKey) -> Result<Vec<Point2<f64>>> {
        let center = self.key_vertex(v)?.position();
        let mut angles = Vec::new();
        let mut radius = f64::INFINITY;
        for cell in self.star(v) {
            let Some(edge) = cell.to_key_edge() else {
                continue;
            };
            let e = self.key_edge(edge)?;
            let positions = e.data().stroke().positions();
            if e.start_vertex() == Some(v) {
                if let Some((angle, distance)) = leaving_direction(center, positions.iter()) {
                    angles.push(angle);
                    radius = radius.min(distance);
                }
            }
            if e.end_vertex() == Some(v) {
                if let Some((angle, distance)) = leaving_direction(center, positions.iter().rev()) {
                    angles.push(angle);
                    radius = radius.min(distance);
                }
            }
        }
        if angles.is_empty() || !radius.is_finite() {
            return Ok(Vec::new());
        }
        angles.sort_by(f64::total_cmp);
        let r = 0.25 * radius;

        let n = angles.len();
        let bisectors: Vec<f64> = if n == 1 {
            vec![angles[0] + PI]
        } else {
            (0..n)
                .map(|i| {
                    let a0 = angles[i];
                    let mut a1 = angles[(i + 1) % n];
                    if a1 <= a0 {
                        a1 += 2.0 * PI;
                    }
                    0.5 * (a0 + a1)
                })
                .collect()
        };
        Ok(bisectors
            .into_iter()
            .map(|a| center + Vector2::new(a.cos(), a.sin()) * r)
            .collect())
    }

    pub(crate) fn face_cycle(&self, face: KeyFaceKey, usage: KeyFaceVertexUsageIndex) -> Result<&KeyCycle> {
        self.key_face(face)?
            .cycles()
            .get(usage.cycle_index)
            .ok_or(Error::InvalidVertexUsage {
                cycle_index: usage.cycle_index,
                component_index: usage.component_index,
            })
    }

    /// Vertex designated by a usage of a face.
    pub fn usage_vertex(&self, face: KeyFaceKey, usage: KeyFaceVertexUsageIndex) -> Result<KeyVertexKey> {
        self.face_cycle(face, usage)?
            .vertex_at(usage.component_index, self)
            .ok_or(Error::InvalidVertexUsage {
                cycle_index: usage.cycle_index,
                component_index: usage.component_index,
            })
    }
}

/// Angle of the first point of `points` distinct from `center`, and its
/// distance.
fn leaving_direction<'a>(
    center: Point2<f64>,
    points: impl Iterator<Item = &'a Point2<f64>>,
) -> Option<(f64, f64)> {
    points.map(|p| p - center).find_map(|d| {
        let distance = d.norm();
        (distance > 0.0).then(|| (d.y.atan2(d.x), distance))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point2<f64> {
        Point2::new(x, y)
    }

    #[test]
    fn separated_halves_give_disk() {
        // Two halves of a square between (0,0) and (2,2).
        let a = vec![p(0.0, 0.0), p(2.0, 0.0), p(2.0, 2.0)];
        let b = vec![p(0.0, 0.0), p(0.0, 2.0), p(2.0, 2.0)];
        assert_eq!(
            one_cycle_policy_from_polylines(&a, &b, &VacConfig::default()),
            OneCycleCutPolicy::Disk
        );
    }

    #[test]
    fn crossing_halves_give_mobius() {
        // A figure eight: the halves swap sides once.
        let a = vec![p(0.0, 0.0), p(1.0, 1.0), p(2.0, 0.0)];
        let b = vec![p(0.0, 0.0), p(0.5, 1.0), p(1.5, -1.0), p(2.0, 0.0)];
        assert_eq!(
            one_cycle_policy_from_polylines(&a, &b, &VacConfig::default()),
            OneCycleCutPolicy::Mobius
        );
    }

    #[test]
    fn shared_prefix_is_ignored() {
        // Both halves retrace (0,0)-(1,0) before separating.
        let a = vec![p(0.0, 0.0), p(1.0, 0.0), p(2.0, 1.0), p(3.0, 0.0)];
        let b = vec![p(0.0, 0.0), p(1.0, 0.0), p(2.0, -1.0), p(3.0, 0.0)];
        assert_eq!(
            one_cycle_policy_from_polylines(&a, &b, &VacConfig::default()),
            OneCycleCutPolicy::Disk
        );
    }

    #[test]
    fn policy_is_deterministic() {
        let a = vec![p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0), p(3.0, 0.0)];
        let b = vec![p(0.0, 0.0), p(2.0, 0.0), p(1.0, 0.0), p(3.0, 0.0)];
        let config = VacConfig::default();
        let first = one_cycle_policy_from_polylines(&a, &b, &config);
        assert_eq!(first, one_cycle_policy_from_polylines(&a, &b, &config));
    }

    #[test]
    fn winding_score_prefers_unchanged_orientation() {
        // A hole (cycle 2, clockwise) inside an outer boundary (cycle 1).
        let samples = [
            SectorSample {
                untouched: 0,
                cycle1: 1,
                cycle2: 0,
            },
            SectorSample {
                untouched: 0,
                cycle1: 1,
                cycle2: -1,
            },
        ];
        let none = winding_score(&samples, TwoCycleCutPolicy::ReverseNone);
        let end = winding_score(&samples, TwoCycleCutPolicy::ReverseEnd);
        assert!(none < end);
    }
}
