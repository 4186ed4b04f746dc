use super::*;
use crate::types::Aabb;
use proptest::prelude::*;

fn tri(a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> Triangle {
    Triangle::new(Point::from(a), Point::from(b), Point::from(c))
}

fn scaled(t: &Triangle, k: f64) -> Triangle {
    Triangle::new(t.a * k, t.b * k, t.c * k)
}

fn hit(a: &Triangle, b: &Triangle) -> bool {
    intersects(a, b, Tolerance::default())
}

/// (name, first, second, expected)
fn cases() -> Vec<(&'static str, Triangle, Triangle, bool)> {
    let base = tri([0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 2.0, 0.0]);
    vec![
        (
            "coplanar overlap",
            base,
            tri([1.0, 1.0, 0.0], [3.0, 1.0, 0.0], [1.0, 3.0, 0.0]),
            true,
        ),
        (
            "separate in space",
            tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            tri([3.0, 3.0, 3.0], [4.0, 3.0, 3.0], [3.0, 4.0, 3.0]),
            false,
        ),
        (
            "shared edge, coplanar",
            base,
            tri([0.0, 0.0, 0.0], [0.0, 2.0, 0.0], [-2.0, 0.0, 0.0]),
            true,
        ),
        (
            "vertical triangle touching at one point",
            base,
            tri([1.0, 1.0, 1.0], [1.0, 1.0, -1.0], [1.0, 2.0, 0.0]),
            true,
        ),
        (
            "point outside",
            tri([1.5, 1.5, 0.0], [1.5, 1.5, 0.0], [1.5, 1.5, 0.0]),
            base,
            false,
        ),
        (
            "point inside",
            tri([0.5, 0.5, 0.0], [0.5, 0.5, 0.0], [0.5, 0.5, 0.0]),
            base,
            true,
        ),
        (
            "degenerate segment touching hypotenuse",
            base,
            tri([1.0, 1.0, 0.0], [1.0, 1.0, 0.0], [3.0, 3.0, 0.0]),
            true,
        ),
        (
            "segment endpoint on an edge",
            tri([1.0, 1.0, 0.0], [-1.0, 1.0, 0.0], [0.0, -1.0, 0.0]),
            tri([0.0, 1.0, 0.0], [-1.0, -1.0, 0.0], [-1.0, -1.0, 0.0]),
            true,
        ),
        (
            "far point",
            tri([5.0, 5.0, 5.0], [5.0, 5.0, 5.0], [5.0, 5.0, 5.0]),
            tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            false,
        ),
        (
            "coplanar apart",
            tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            tri([2.0, 0.0, 0.0], [3.0, 0.0, 0.0], [2.0, 1.0, 0.0]),
            false,
        ),
        (
            "coplanar edges crossing",
            base,
            tri([1.0, 0.0, 0.0], [1.0, 2.0, 0.0], [3.0, 0.0, 0.0]),
            true,
        ),
        (
            "coplanar containment",
            tri([0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [0.0, 10.0, 0.0]),
            tri([1.0, 1.0, 0.0], [2.0, 1.0, 0.0], [1.0, 2.0, 0.0]),
            true,
        ),
        (
            "single shared vertex, not coplanar",
            tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            tri([0.0, 0.0, 0.0], [-1.0, 0.0, 1.0], [0.0, -1.0, 1.0]),
            true,
        ),
        (
            "same shape lifted off the plane",
            tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            tri([0.0, 0.0, 1e-4], [-1.0, 0.0, 1.0], [0.0, -1.0, 1.0]),
            false,
        ),
        (
            "shared edge, perpendicular planes",
            base,
            tri([0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [1.0, 0.0, 2.0]),
            true,
        ),
        (
            "piercing through the interior",
            base,
            tri([0.5, 0.5, -1.0], [0.6, 0.5, 1.0], [0.5, 0.6, 1.0]),
            true,
        ),
        (
            "hovering above",
            base,
            tri([0.5, 0.5, 0.1], [0.6, 0.5, 1.0], [0.5, 0.6, 1.0]),
            false,
        ),
        (
            "planes cross but triangles miss",
            base,
            tri([3.0, 3.0, -1.0], [3.0, 4.0, 1.0], [4.0, 3.0, 1.0]),
            false,
        ),
        (
            "collinear segment piercing",
            base,
            tri([0.5, 0.5, -1.0], [0.5, 0.5, 1.0], [0.5, 0.5, 0.0]),
            true,
        ),
        (
            "collinear segment beside",
            base,
            tri([2.5, 2.5, -1.0], [2.5, 2.5, 1.0], [2.5, 2.5, 0.0]),
            false,
        ),
        (
            "skew segments",
            tri([0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [1.0, 0.0, 0.0]),
            tri([1.0, -1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 0.0, 1.0]),
            false,
        ),
        (
            "crossing segments",
            tri([0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [1.0, 0.0, 0.0]),
            tri([1.0, -1.0, 0.0], [1.0, 1.0, 0.0], [1.0, 0.5, 0.0]),
            true,
        ),
        (
            "point on segment",
            tri([1.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 0.0]),
            tri([0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [1.5, 0.0, 0.0]),
            true,
        ),
        (
            "coincident points",
            tri([1.0, 2.0, 3.0], [1.0, 2.0, 3.0], [1.0, 2.0, 3.0]),
            tri([1.0, 2.0, 3.0], [1.0, 2.0, 3.0], [1.0, 2.0, 3.0]),
            true,
        ),
        (
            "distinct points",
            tri([1.0, 2.0, 3.0], [1.0, 2.0, 3.0], [1.0, 2.0, 3.0]),
            tri([1.0, 2.0, 3.5], [1.0, 2.0, 3.5], [1.0, 2.0, 3.5]),
            false,
        ),
    ]
}

#[test]
fn reference_cases_in_both_orders() {
    for (name, a, b, expected) in cases() {
        assert_eq!(hit(&a, &b), expected, "{name}");
        assert_eq!(hit(&b, &a), expected, "{name} (swapped)");
    }
}

#[test]
fn reference_cases_are_scale_invariant() {
    for k in [1e-3, 0.37, 1e3] {
        for (name, a, b, expected) in cases() {
            assert_eq!(
                hit(&scaled(&a, k), &scaled(&b, k)),
                expected,
                "{name} at scale {k}"
            );
        }
    }
}

#[test]
fn identical_triangles_intersect() {
    let t = tri([0.1, 0.2, 0.3], [1.0, -2.0, 0.5], [3.0, 1.0, -1.0]);
    assert!(hit(&t, &t));
}

#[test]
fn equilateral_fan_members_share_the_centre() {
    let r = 123.4;
    let third = 2.0 * std::f64::consts::PI / 3.0;
    let eq = |phi: f64| {
        let p = |a: f64| [r * a.cos(), r * a.sin(), 0.0];
        tri(p(phi), p(phi + third), p(phi + 2.0 * third))
    };
    let ts: Vec<Triangle> = [0.0, 0.3, 1.1, 2.9, 5.5].into_iter().map(eq).collect();
    for a in &ts {
        for b in &ts {
            assert!(hit(a, b));
        }
    }
}

#[test]
fn classification_of_degenerate_inputs() {
    let ctx = Ctx::new(Tolerance::default(), 1.0);
    let p = tri([1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, 1.0]);
    assert!(matches!(Shape::classify(&p, &ctx), Shape::Pt(_)));
    let s = tri([0.0, 0.0, 0.0], [2.0, 2.0, 2.0], [1.0, 1.0, 1.0]);
    match Shape::classify(&s, &ctx) {
        Shape::Seg(a, b) => {
            assert_eq!((a - b).norm(), (12.0f64).sqrt());
        }
        _ => panic!("expected a segment"),
    }
    let t = tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
    assert!(matches!(Shape::classify(&t, &ctx), Shape::Tri(_)));
}

fn coord(scale: f64) -> impl Strategy<Value = f64> {
    (-3i32..=3).prop_map(move |k| k as f64 * scale)
}

fn point(scale: f64) -> impl Strategy<Value = Point> {
    (coord(scale), coord(scale), coord(scale)).prop_map(|(x, y, z)| Point::new(x, y, z))
}

fn triangle_on_grid() -> impl Strategy<Value = (Triangle, Triangle)> {
    prop_oneof![Just(1e-3), Just(1.0), Just(1e3)].prop_flat_map(|s| {
        (point(s), point(s), point(s), point(s), point(s), point(s))
            .prop_map(|(a, b, c, d, e, f)| (Triangle::new(a, b, c), Triangle::new(d, e, f)))
    })
}

proptest! {
    #[test]
    fn predicate_is_symmetric((a, b) in triangle_on_grid()) {
        prop_assert_eq!(hit(&a, &b), hit(&b, &a));
    }

    #[test]
    fn accepted_pairs_have_overlapping_padded_boxes((a, b) in triangle_on_grid()) {
        let tol = Tolerance::default();
        if intersects(&a, &b, tol) {
            prop_assert!(Aabb::padded(&a, tol).overlaps(&Aabb::padded(&b, tol)));
        }
    }

    #[test]
    fn every_triangle_meets_itself((a, _b) in triangle_on_grid()) {
        prop_assert!(hit(&a, &a));
    }
}
