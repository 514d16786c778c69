// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use approx::assert_relative_eq;
use nalgebra::Point2;
use vac_lite_geometry::Stroke2d;
use vac_lite_topology::{
    AnimTime, Complex, Error, KeyCycle, KeyEdgeData, KeyEdgeKey, KeyHalfedge, KeyVertexKey,
    PropValue,
};

const T0: AnimTime = AnimTime::new(0.0);

fn p(x: f64, y: f64) -> Point2<f64> {
    Point2::new(x, y)
}

fn vertex(complex: &mut Complex, at: Point2<f64>) -> KeyVertexKey {
    let root = complex.root();
    complex.create_key_vertex(at, root, None, T0).unwrap()
}

fn edge_through(complex: &mut Complex, a: KeyVertexKey, b: KeyVertexKey, points: Vec<Point2<f64>>) -> KeyEdgeKey {
    let root = complex.root();
    let stroke = Stroke2d::new(points, vec![], false).unwrap();
    complex
        .create_key_open_edge(a, b, KeyEdgeData::new(stroke), root, None)
        .unwrap()
}

fn straight(complex: &mut Complex, a: KeyVertexKey, b: KeyVertexKey) -> KeyEdgeKey {
    let pa = complex.key_vertex(a).unwrap().position();
    let pb = complex.key_vertex(b).unwrap().position();
    edge_through(complex, a, b, vec![pa, pb])
}

fn circle(complex: &mut Complex, center: Point2<f64>, radius: f64, start_angle: f64, ccw: bool) -> KeyEdgeKey {
    let n = 32;
    let positions = (0..n)
        .map(|i| {
            let sign = if ccw { 1.0 } else { -1.0 };
            let a = start_angle + sign * std::f64::consts::TAU * i as f64 / n as f64;
            center + nalgebra::Vector2::new(a.cos(), a.sin()) * radius
        })
        .collect();
    let root = complex.root();
    complex
        .create_key_closed_edge(
            KeyEdgeData::new(Stroke2d::new(positions, vec![], true).unwrap()),
            root,
            None,
            T0,
        )
        .unwrap()
}

#[test]
fn glue_single_vertex_reuses_it() {
    let mut complex = Complex::new();
    let v = vertex(&mut complex, p(0.0, 0.0));
    let other = vertex(&mut complex, p(5.0, 0.0));
    let e = straight(&mut complex, v, other);
    complex.take_diff();

    let glued = complex.glue_key_vertices(&[v], p(1.0, 1.0)).unwrap();
    assert_eq!(glued, v);
    let diff = complex.take_diff();
    assert!(diff.created().is_empty());
    assert!(diff.destroyed().is_empty());
    assert_eq!(
        complex.key_edge(e).unwrap().data().stroke().start_point(),
        p(1.0, 1.0)
    );
}

#[test]
fn glue_repeated_vertex_matches_single_glue() {
    let mut once = Complex::new();
    let v1 = vertex(&mut once, p(0.0, 0.0));
    let mut thrice = Complex::new();
    let v3 = vertex(&mut thrice, p(0.0, 0.0));

    let g1 = once.glue_key_vertices(&[v1], p(2.0, 3.0)).unwrap();
    let g3 = thrice.glue_key_vertices(&[v3, v3, v3], p(2.0, 3.0)).unwrap();
    assert_eq!(g3, v3);
    assert_eq!(once.node_count(), thrice.node_count());
    assert_eq!(
        once.key_vertex(g1).unwrap().position(),
        thrice.key_vertex(g3).unwrap().position()
    );
}

#[test]
fn glued_vertex_takes_top_most_location() {
    let mut complex = Complex::new();
    let root = complex.root();
    let a = vertex(&mut complex, p(0.0, 0.0));
    let b = vertex(&mut complex, p(1.0, 0.0));
    let c = vertex(&mut complex, p(2.0, 0.0));

    let glued = complex.glue_key_vertices(&[b, a], p(0.5, 0.0)).unwrap();
    let order: Vec<_> = complex.children(root).collect();
    assert_eq!(order, vec![glued.key(), c.key()]);
}

#[test]
fn glue_vertices_at_different_times_fails() {
    let mut complex = Complex::new();
    let root = complex.root();
    let a = vertex(&mut complex, p(0.0, 0.0));
    let b = complex
        .create_key_vertex(p(0.0, 0.0), root, None, AnimTime::new(1.0))
        .unwrap();
    let result = complex.glue_key_vertices(&[a, b], p(0.0, 0.0));
    assert!(matches!(result, Err(Error::TimeMismatch { .. })));
    assert!(complex.contains(a) && complex.contains(b));
}

#[test]
fn chained_edges_keep_their_directions() {
    let mut complex = Complex::new();
    let a = vertex(&mut complex, p(0.0, 0.0));
    let b = vertex(&mut complex, p(1.0, 0.0));
    let c = vertex(&mut complex, p(0.5, 1.0));
    let ab = straight(&mut complex, a, b);
    let bc = straight(&mut complex, b, c);
    let ca = straight(&mut complex, c, a);
    let root = complex.root();
    let f = complex
        .create_key_face(
            vec![KeyCycle::from_halfedges(vec![
                KeyHalfedge::new(ab, true),
                KeyHalfedge::new(bc, true),
                KeyHalfedge::new(ca, true),
            ])],
            root,
            None,
            T0,
        )
        .unwrap();

    let glued = complex.glue_key_open_edges(&[ab, bc]).unwrap();

    // Gluing the start vertices also glued the ends: the result is a loop.
    let edge = complex.key_edge(glued).unwrap();
    assert_eq!(edge.start_vertex(), edge.end_vertex());
    let cycle = &complex.key_face(f).unwrap().cycles()[0];
    assert_eq!(
        cycle.halfedges(),
        &[
            KeyHalfedge::new(glued, true),
            KeyHalfedge::new(glued, true),
            KeyHalfedge::new(ca, true),
        ]
    );
    assert!(cycle.is_valid(&complex));
    assert_eq!(complex.cells().count(), 4);
    assert!(complex.is_star_boundary_consistent());
}

#[test]
fn edges_between_same_vertices_merge_into_one() {
    let mut complex = Complex::new();
    let a = vertex(&mut complex, p(0.0, 0.0));
    let b = vertex(&mut complex, p(4.0, 0.0));
    let low = edge_through(&mut complex, a, b, vec![p(0.0, 0.0), p(2.0, -1.0), p(4.0, 0.0)]);
    let high = edge_through(&mut complex, b, a, vec![p(4.0, 0.0), p(2.0, 1.0), p(0.0, 0.0)]);

    let glued = complex.glue_key_open_edges(&[low, high]).unwrap();
    let edge = complex.key_edge(glued).unwrap();
    let start = edge.start_vertex().unwrap();
    let end = edge.end_vertex().unwrap();
    assert_ne!(start, end);
    assert_relative_eq!(complex.key_vertex(start).unwrap().position(), p(0.0, 0.0), epsilon = 1e-9);
    assert_relative_eq!(complex.key_vertex(end).unwrap().position(), p(4.0, 0.0), epsilon = 1e-9);
    // The bumps cancel out.
    for q in edge.data().stroke().positions() {
        assert_relative_eq!(q.y, 0.0, epsilon = 1e-9);
    }
    assert_eq!(complex.cells().count(), 3);
}

#[test]
fn open_glue_infers_directions_geometrically() {
    let mut complex = Complex::new();
    let a = vertex(&mut complex, p(0.0, 0.0));
    let b = vertex(&mut complex, p(10.0, 0.0));
    let c = vertex(&mut complex, p(10.0, 1.0));
    let d = vertex(&mut complex, p(0.0, 1.0));
    let e = vertex(&mut complex, p(0.0, 2.0));
    let f = vertex(&mut complex, p(10.0, 2.0));
    let e1 = straight(&mut complex, a, b);
    let e2 = straight(&mut complex, c, d);
    let e3 = straight(&mut complex, e, f);

    let glued = complex.glue_key_open_edges(&[e1, e2, e3]).unwrap();
    let edge = complex.key_edge(glued).unwrap();
    let start = complex.key_vertex(edge.start_vertex().unwrap()).unwrap().position();
    let end = complex.key_vertex(edge.end_vertex().unwrap()).unwrap().position();
    // The middle edge is the best reference: the outer ones are reversed
    // onto it rather than onto each other.
    assert_relative_eq!(start, p(10.0, 1.0), epsilon = 1e-9);
    assert_relative_eq!(end, p(0.0, 1.0), epsilon = 1e-9);
    assert!(complex.is_star_boundary_consistent());
}

#[test]
fn glued_edge_merges_properties_first_wins() {
    let mut complex = Complex::new();
    let a = vertex(&mut complex, p(0.0, 0.0));
    let b = vertex(&mut complex, p(1.0, 0.0));
    let c = vertex(&mut complex, p(0.0, 0.5));
    let d = vertex(&mut complex, p(1.0, 0.5));
    let root = complex.root();
    let mut first = KeyEdgeData::new(Stroke2d::segment(p(0.0, 0.0), p(1.0, 0.0)));
    first.properties_mut().insert("style", PropValue::String("red".into()));
    let mut second = KeyEdgeData::new(Stroke2d::segment(p(0.0, 0.5), p(1.0, 0.5)));
    second.properties_mut().insert("style", PropValue::String("blue".into()));
    second.properties_mut().insert("weight", PropValue::Double(2.0));
    let e1 = complex.create_key_open_edge(a, b, first, root, None).unwrap();
    let e2 = complex.create_key_open_edge(c, d, second, root, None).unwrap();

    let glued = complex
        .glue_key_open_halfedges(&[KeyHalfedge::new(e1, true), KeyHalfedge::new(e2, true)])
        .unwrap();
    let properties = complex.key_edge(glued).unwrap().data().properties();
    assert_eq!(properties.get("style"), Some(&PropValue::String("red".into())));
    assert_eq!(properties.get("weight"), Some(&PropValue::Double(2.0)));
}

#[test]
fn glue_single_halfedge_is_a_noop() {
    let mut complex = Complex::new();
    let a = vertex(&mut complex, p(0.0, 0.0));
    let b = vertex(&mut complex, p(1.0, 0.0));
    let e = straight(&mut complex, a, b);
    let nodes = complex.node_count();
    assert_eq!(complex.glue_key_open_halfedges(&[KeyHalfedge::new(e, false)]).unwrap(), e);
    assert_eq!(complex.glue_key_open_edges(&[e, e]).unwrap(), e);
    assert_eq!(complex.node_count(), nodes);
}

#[test]
fn open_and_closed_edges_cannot_be_glued() {
    let mut complex = Complex::new();
    let a = vertex(&mut complex, p(0.0, 0.0));
    let b = vertex(&mut complex, p(1.0, 0.0));
    let open = straight(&mut complex, a, b);
    let closed = circle(&mut complex, p(0.0, 0.0), 1.0, 0.0, true);
    assert!(matches!(
        complex.glue_key_open_edges(&[open, closed]),
        Err(Error::InvalidInput(_))
    ));
    assert!(matches!(
        complex.glue_key_closed_edges(&[closed, open]),
        Err(Error::InvalidInput(_))
    ));
    assert!(matches!(complex.glue_key_closed_edges(&[]), Err(Error::EmptyInput(_))));
}

#[test]
fn closed_glue_aligns_rotated_circles() {
    let mut complex = Complex::new();
    let a = circle(&mut complex, p(0.0, 0.0), 2.0, 0.0, true);
    let b = circle(&mut complex, p(0.0, 0.0), 2.0, 1.3, false);

    let glued = complex.glue_key_closed_edges(&[a, b]).unwrap();
    let stroke = complex.key_edge(glued).unwrap().data().stroke().clone();
    // A phase or direction mismatch would shrink the averaged curve.
    for q in stroke.positions() {
        assert_relative_eq!(q.coords.norm(), 2.0, epsilon = 0.05);
    }
    assert!(!complex.contains(a));
    assert!(!complex.contains(b));
    assert_eq!(complex.cells().count(), 1);
}

#[test]
fn closed_halfedges_keep_given_directions() {
    let mut complex = Complex::new();
    let a = circle(&mut complex, p(0.0, 0.0), 1.0, 0.0, true);
    let b = circle(&mut complex, p(0.0, 0.0), 1.0, 0.5, true);
    let root = complex.root();
    let f = complex
        .create_key_face(
            vec![KeyCycle::from_halfedges(vec![KeyHalfedge::new(b, true)])],
            root,
            None,
            T0,
        )
        .unwrap();

    let glued = complex
        .glue_key_closed_halfedges(&[KeyHalfedge::new(a, true), KeyHalfedge::new(b, true)])
        .unwrap();
    let cycle = &complex.key_face(f).unwrap().cycles()[0];
    assert_eq!(cycle.halfedges(), &[KeyHalfedge::new(glued, true)]);
    assert!(complex.is_star_boundary_consistent());
}
