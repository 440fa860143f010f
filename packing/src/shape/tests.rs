use super::*;
use approx::assert_relative_eq;
use itertools::Itertools;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

fn edge_lengths(shape: &Shape) -> Vec<f64> {
    shape
        .vertices()
        .iter()
        .tuple_combinations()
        .map(|(a, b)| (a - b).norm())
        .collect()
}

fn random_tetrahedron(rng: &mut StdRng, spread: f64) -> Shape {
    let origin = Vector3::new(
        rng.gen_range(-spread..spread),
        rng.gen_range(-spread..spread),
        rng.gen_range(-spread..spread),
    );
    ShapeKind::Tetrahedron.build(
        origin,
        rng.gen_range(0.0..2.0 * PI),
        rng.gen_range(0.0..2.0 * PI),
        rng.gen_range(0.0..2.0 * PI),
    )
}

#[test]
fn test_reference_tetrahedron_is_regular() {
    let t = Shape::Tetrahedron(Tetrahedron::reference());
    for l in edge_lengths(&t) {
        assert_relative_eq!(l, 1.0, epsilon = 1e-12);
    }
    assert_relative_eq!(t.com(), Vector3::zeros(), epsilon = 1e-15);
    assert_relative_eq!(t.volume(), 1.0 / (6.0 * 2f64.sqrt()), epsilon = 1e-15);
}

#[test]
fn test_volumes_per_kind() {
    assert_relative_eq!(ShapeKind::Sphere.volume(), PI / 6.0, epsilon = 1e-15);
    assert_relative_eq!(ShapeKind::Tetrahedron.volume(), 0.117_851_130_197_757_92, epsilon = 1e-15);
}

#[test]
fn test_rotation_matrix_composition() {
    let r = rotation_matrix(0.3, -0.7, 1.1);
    assert_relative_eq!(r * r.transpose(), Matrix3::identity(), epsilon = 1e-12);
    assert_relative_eq!(r.determinant(), 1.0, epsilon = 1e-12);

    // roll alone is a rotation about z
    let rz = rotation_matrix(PI / 2.0, 0.0, 0.0);
    assert_relative_eq!(rz * Vector3::x(), Vector3::y(), epsilon = 1e-12);
    // pitch alone is a rotation about x
    let rx = rotation_matrix(0.0, PI / 2.0, 0.0);
    assert_relative_eq!(rx * Vector3::y(), Vector3::z(), epsilon = 1e-12);
    // yaw alone is a rotation about y
    let ry = rotation_matrix(0.0, 0.0, PI / 2.0);
    assert_relative_eq!(ry * Vector3::z(), Vector3::x(), epsilon = 1e-12);
}

#[test]
fn test_rotation_keeps_com_and_edges() {
    let mut t = ShapeKind::Tetrahedron.build(Vector3::new(3.0, -1.0, 2.0), 0.0, 0.0, 0.0);
    let com = t.com();
    let r = t.rotate(0.4, 1.3, -2.2);
    assert_relative_eq!(t.com(), com, epsilon = 1e-12);
    for l in edge_lengths(&t) {
        assert_relative_eq!(l, 1.0, epsilon = 1e-12);
    }
    // the inverse rotation restores the vertices
    let before = ShapeKind::Tetrahedron.build(Vector3::new(3.0, -1.0, 2.0), 0.0, 0.0, 0.0);
    t.rotate_by(&r.transpose());
    for (a, b) in t.vertices().iter().zip(before.vertices()) {
        assert_relative_eq!(a, b, epsilon = 1e-12);
    }
}

#[test]
fn test_translate_moves_every_vertex() {
    let mut t = Shape::Tetrahedron(Tetrahedron::reference());
    let before = t;
    let dr = Vector3::new(0.25, -4.0, 1.5);
    t.translate(&dr);
    for (a, b) in t.vertices().iter().zip(before.vertices()) {
        assert_relative_eq!(a - b, dr, epsilon = 1e-12);
    }
    if let (Shape::Tetrahedron(a), Shape::Tetrahedron(b)) = (&t, &before) {
        for (fa, fb) in a.faces().iter().zip(b.faces()) {
            assert_relative_eq!(fa.origin - fb.origin, dr, epsilon = 1e-12);
            assert_relative_eq!(fa.e1, fb.e1, epsilon = 1e-12);
        }
    }
}

#[test]
fn test_sphere_overlap_threshold() {
    let a = Shape::Sphere(Sphere::new(Vector3::zeros()));
    let far = Shape::Sphere(Sphere::new(Vector3::new(1.5, 0.0, 0.0)));
    let near = Shape::Sphere(Sphere::new(Vector3::new(0.0, 0.5, 0.0)));
    assert!(!a.intersects(&far));
    assert!(a.intersects(&near));
    assert!(near.intersects(&a));
}

#[test]
fn test_identical_tetrahedra_overlap() {
    let a = ShapeKind::Tetrahedron.build(Vector3::new(1.0, 2.0, 3.0), 0.2, 0.4, 0.6);
    let b = a;
    assert!(a.intersects(&b));

    // same centre, different orientation
    let c = ShapeKind::Tetrahedron.build(Vector3::new(1.0, 2.0, 3.0), 1.2, 0.1, 2.6);
    assert!(a.intersects(&c));
}

#[test]
fn test_tetrahedra_exact_contact_region() {
    let a = Shape::Tetrahedron(Tetrahedron::reference());

    // half an edge along x: the lower halves interpenetrate
    let mut b = a;
    b.translate(&Vector3::new(0.5, 0.0, 0.0));
    assert!(a.intersects(&b));

    // x extents [-0.5, 0.5] and [0.55, 1.55] are disjoint
    let mut c = a;
    c.translate(&Vector3::new(1.05, 0.0, 0.0));
    assert!(!a.intersects(&c));

    // z extents [-0.354, 0.354] and [0.446, 1.154] are disjoint
    let mut d = a;
    d.translate(&Vector3::new(0.0, 0.0, 0.8));
    assert!(!a.intersects(&d));

    // beyond the circumscribed sphere
    let mut e = a;
    e.translate(&Vector3::new(2.0, 0.0, 0.0));
    assert!(!a.intersects(&e));
}

#[test]
fn test_point_reflection_separates_along_the_edge() {
    // b is a mirrored through the point (0, 0, -h - gap/2), sharing no volume
    let h = 0.5 / 2f64.sqrt();
    let a = Shape::Tetrahedron(Tetrahedron::reference());
    for &(gap, overlap) in &[(0.05, false), (-0.05, true)] {
        let mirror = Vector3::new(0.0, 0.0, -h - gap / 2.0);
        let vs: Vec<Vector3<f64>> = a.vertices().iter().map(|v| 2.0 * mirror - v).collect();
        let b = Shape::Tetrahedron(Tetrahedron::from_vertices([vs[0], vs[1], vs[2], vs[3]]));
        assert_eq!(a.intersects(&b), overlap, "gap = {gap}");
    }
}

#[test]
fn test_intersects_is_symmetric() {
    let mut rng = StdRng::seed_from_u64(2024);
    let mut hits = 0;
    for _ in 0..2000 {
        let a = random_tetrahedron(&mut rng, 0.7);
        let b = random_tetrahedron(&mut rng, 0.7);
        let ab = a.intersects(&b);
        assert_eq!(ab, b.intersects(&a));
        hits += ab as usize;
    }
    // the sample should contain both outcomes
    assert!(hits > 0 && hits < 2000);
}

#[test]
fn test_sphere_tetrahedron_overlap() {
    let h = 0.5 / 2f64.sqrt();
    let t = Shape::Tetrahedron(Tetrahedron::reference());
    let inside = Shape::Sphere(Sphere::new(Vector3::zeros()));
    assert!(t.intersects(&inside));
    assert!(inside.intersects(&t));

    // below the lower edge, whose midpoint is (0, 0, -h)
    let touching = Shape::Sphere(Sphere::new(Vector3::new(0.0, 0.0, -h - 0.4)));
    assert!(t.intersects(&touching));
    let clear = Shape::Sphere(Sphere::new(Vector3::new(0.0, 0.0, -h - 0.6)));
    assert!(!t.intersects(&clear));
    assert!(!clear.intersects(&t));
}

#[test]
fn test_mixed_overlap_is_symmetric() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..500 {
        let t = random_tetrahedron(&mut rng, 0.9);
        let s = Shape::Sphere(Sphere::new(Vector3::new(
            rng.gen_range(-0.9..0.9),
            rng.gen_range(-0.9..0.9),
            rng.gen_range(-0.9..0.9),
        )));
        assert_eq!(t.intersects(&s), s.intersects(&t));
    }
}

#[test]
fn test_contains() {
    let t = Tetrahedron::reference();
    assert!(t.contains(&Vector3::zeros()));
    assert!(t.contains(&t.vertices()[0]));
    assert!(!t.contains(&Vector3::new(0.0, 0.0, 0.5)));
}

#[test]
fn test_display_lists_all_components() {
    let t = Shape::Tetrahedron(Tetrahedron::reference());
    assert_eq!(t.to_string().split_whitespace().count(), 12);
    let s = Shape::Sphere(Sphere::new(Vector3::new(1.0, 2.0, 3.0)));
    assert_eq!(s.to_string(), "1.0000000000 2.0000000000 3.0000000000");
}
