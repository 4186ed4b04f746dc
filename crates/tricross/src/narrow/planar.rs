//! 2D helpers for the coplanar branch.
//!
//! Points are projected by dropping the axis of the largest normal component,
//! which keeps a non-degenerate planar triangle non-degenerate. All sign tests
//! use `eps × |operand| × |operand|` slack, so a reported contact is never more
//! than `eps × length` away from the exact geometry.

use nalgebra::{Vector2, Vector3};

use super::Ctx;
use crate::types::Point;

pub(super) type P2 = Vector2<f64>;

/// Projection onto the coordinate plane most aligned with `n`, relative to `origin`.
#[derive(Clone, Copy, Debug)]
pub(super) struct Projector {
    keep: (usize, usize),
    origin: Point,
}

impl Projector {
    pub(super) fn along(n: &Vector3<f64>, origin: Point) -> Self {
        let a = n.abs();
        let keep = if a.x >= a.y && a.x >= a.z {
            (1, 2)
        } else if a.y >= a.z {
            (2, 0)
        } else {
            (0, 1)
        };
        Self { keep, origin }
    }

    #[inline]
    pub(super) fn project(&self, p: &Point) -> P2 {
        let d = p - self.origin;
        P2::new(d[self.keep.0], d[self.keep.1])
    }

    pub(super) fn project3(&self, pts: &[Point; 3]) -> [P2; 3] {
        [
            self.project(&pts[0]),
            self.project(&pts[1]),
            self.project(&pts[2]),
        ]
    }
}

#[inline]
fn cross2(u: &P2, v: &P2) -> f64 {
    u.x * v.y - u.y * v.x
}

/// Sign of the turn p→q→r (+1 counterclockwise, -1 clockwise, 0 collinear).
#[inline]
pub(super) fn orient(p: &P2, q: &P2, r: &P2, ctx: &Ctx) -> i8 {
    let u = q - p;
    let v = r - p;
    ctx.sign(cross2(&u, &v), u.norm() * v.norm())
}

/// `r` (already known collinear with `p q`) lies on the closed segment.
fn on_segment(p: &P2, q: &P2, r: &P2, ctx: &Ctx) -> bool {
    let d = q - p;
    let w = r - p;
    let len2 = d.norm_squared();
    if len2 == 0.0 {
        return w.norm() <= ctx.slack(0.0);
    }
    let slack = ctx.slack(d.norm() * w.norm());
    let t = d.dot(&w);
    t >= -slack && t <= len2 + slack
}

/// Closed 2D segment intersection, including touching and collinear overlap.
pub(super) fn segments_meet(p1: &P2, p2: &P2, q1: &P2, q2: &P2, ctx: &Ctx) -> bool {
    let o1 = orient(p1, p2, q1, ctx);
    let o2 = orient(p1, p2, q2, ctx);
    let o3 = orient(q1, q2, p1, ctx);
    let o4 = orient(q1, q2, p2, ctx);
    if o1 * o2 < 0 && o3 * o4 < 0 {
        return true;
    }
    (o1 == 0 && on_segment(p1, p2, q1, ctx))
        || (o2 == 0 && on_segment(p1, p2, q2, ctx))
        || (o3 == 0 && on_segment(q1, q2, p1, ctx))
        || (o4 == 0 && on_segment(q1, q2, p2, ctx))
}

/// Closed point-in-triangle test for a non-degenerate projected triangle.
pub(super) fn point_in_triangle(r: &P2, t: &[P2; 3], ctx: &Ctx) -> bool {
    let s = [
        orient(&t[0], &t[1], r, ctx),
        orient(&t[1], &t[2], r, ctx),
        orient(&t[2], &t[0], r, ctx),
    ];
    let has_pos = s.iter().any(|&x| x > 0);
    let has_neg = s.iter().any(|&x| x < 0);
    !(has_pos && has_neg)
}

/// Closed overlap of two coplanar triangles: some pair of edges meets, or one
/// triangle holds a vertex of the other (covers full containment).
pub(super) fn triangles_overlap(a: &[P2; 3], b: &[P2; 3], ctx: &Ctx) -> bool {
    for i in 0..3 {
        let (a0, a1) = (&a[i], &a[(i + 1) % 3]);
        for j in 0..3 {
            if segments_meet(a0, a1, &b[j], &b[(j + 1) % 3], ctx) {
                return true;
            }
        }
    }
    point_in_triangle(&a[0], b, ctx) || point_in_triangle(&b[0], a, ctx)
}

/// Closed segment vs triangle overlap in the plane.
pub(super) fn segment_overlaps_triangle(s0: &P2, s1: &P2, t: &[P2; 3], ctx: &Ctx) -> bool {
    if point_in_triangle(s0, t, ctx) || point_in_triangle(s1, t, ctx) {
        return true;
    }
    (0..3).any(|i| segments_meet(s0, s1, &t[i], &t[(i + 1) % 3], ctx))
}
