//! Narrow phase: closed triangle–triangle intersection.
//!
//! Algorithm
//! - Each input is classified as a proper triangle, a segment (zero area) or a
//!   point (all vertices coincide); degenerate shapes go through dedicated
//!   segment/point routines instead of being skipped.
//! - Proper pairs: signed distances of each triangle's vertices to the other's
//!   plane. All strictly one side ⇒ disjoint. All (numerically) zero ⇒ 2D
//!   overlap test in the shared plane. Otherwise both triangles are cut by the
//!   other's plane and the two resulting intervals on the planes' common line
//!   are compared.
//!
//! Numerical policy
//! - A value is zero when `|v| <= eps_rel × magnitude`, where the magnitude is
//!   the product of the operand lengths it was computed from and the length
//!   scale is the larger bounding extent of the two triangles.
//! - Arguments are put in a fixed order (lexicographic on coordinates) before any
//!   arithmetic, so `intersects(a, b)` and `intersects(b, a)` run bit-identical
//!   computations.

mod planar;

use nalgebra::Vector3;

use crate::cfg::{Tolerance, PAD_ULPS};
use crate::types::{Point, Triangle};
use planar::Projector;

/// Shared-point test for two closed triangles. Pure and symmetric.
pub fn intersects(p: &Triangle, q: &Triangle, tol: Tolerance) -> bool {
    let (p, q) = if p.total_cmp(q).is_gt() { (q, p) } else { (p, q) };
    let ctx = Ctx::new(tol, p.extent().max(q.extent()));
    match (Shape::classify(p, &ctx), Shape::classify(q, &ctx)) {
        (Shape::Tri(a), Shape::Tri(b)) => tri_tri(&a, &b, &ctx),
        (Shape::Tri(t), Shape::Seg(s0, s1)) | (Shape::Seg(s0, s1), Shape::Tri(t)) => {
            seg_tri(&s0, &s1, &t, &ctx)
        }
        (Shape::Tri(t), Shape::Pt(x)) | (Shape::Pt(x), Shape::Tri(t)) => point_tri(&x, &t, &ctx),
        (Shape::Seg(p0, p1), Shape::Seg(q0, q1)) => seg_seg(&p0, &p1, &q0, &q1, &ctx),
        (Shape::Seg(s0, s1), Shape::Pt(x)) | (Shape::Pt(x), Shape::Seg(s0, s1)) => {
            point_seg(&x, &s0, &s1, &ctx)
        }
        (Shape::Pt(x), Shape::Pt(y)) => (x - y).norm() <= ctx.slack(0.0),
    }
}

/// Evaluation context for one pair: tolerance plus the pair's length scale.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Ctx {
    eps: f64,
    scale: f64,
}

impl Ctx {
    pub(crate) fn new(tol: Tolerance, scale: f64) -> Self {
        Self {
            eps: tol.eps_rel,
            scale,
        }
    }

    /// Slack for a quantity of magnitude `mag × scale`; `slack(0.0)` is exact.
    #[inline]
    fn slack(&self, mag: f64) -> f64 {
        self.eps * mag
    }

    /// -1, 0 or +1 with `value` treated as zero inside `eps × magnitude`.
    #[inline]
    fn sign(&self, value: f64, magnitude: f64) -> i8 {
        let s = self.slack(magnitude);
        if value > s {
            1
        } else if value < -s {
            -1
        } else {
            0
        }
    }
}

/// Non-degenerate triangle with its cached normal.
#[derive(Clone, Copy, Debug)]
struct Tri {
    v: [Point; 3],
    n: Vector3<f64>,
    n_len: f64,
}

enum Shape {
    Tri(Tri),
    Seg(Point, Point),
    Pt(Point),
}

impl Shape {
    fn classify(t: &Triangle, ctx: &Ctx) -> Shape {
        let v = t.vertices();
        let edges = [(0, 1), (1, 2), (2, 0)];
        let (i, j) = edges
            .into_iter()
            .max_by(|&(a, b), &(c, d)| {
                (v[b] - v[a])
                    .norm_squared()
                    .total_cmp(&(v[d] - v[c]).norm_squared())
            })
            .unwrap_or((0, 1));
        let longest = (v[j] - v[i]).norm();
        if longest <= PAD_ULPS * f64::EPSILON * t.max_abs_coord() {
            return Shape::Pt(t.a);
        }
        let n = t.normal();
        let n_len = n.norm();
        if n_len <= ctx.slack(longest * longest) {
            return Shape::Seg(v[i], v[j]);
        }
        Shape::Tri(Tri { v, n, n_len })
    }
}

/// Signs of `pts` relative to the plane of `t`, plus the raw distances (scaled by |n|).
fn plane_side(t: &Tri, pts: &[Point; 3], ctx: &Ctx) -> ([i8; 3], [f64; 3]) {
    let mut d = [0.0; 3];
    let mut s = [0i8; 3];
    for k in 0..3 {
        d[k] = t.n.dot(&(pts[k] - t.v[0]));
        s[k] = ctx.sign(d[k], t.n_len * ctx.scale);
    }
    (s, d)
}

#[inline]
fn strictly_one_side(s: &[i8; 3]) -> bool {
    s[0] != 0 && s[0] == s[1] && s[1] == s[2]
}

fn tri_tri(a: &Tri, b: &Tri, ctx: &Ctx) -> bool {
    let (sb, db) = plane_side(a, &b.v, ctx);
    if strictly_one_side(&sb) {
        return false;
    }
    let (sa, da) = plane_side(b, &a.v, ctx);
    if strictly_one_side(&sa) {
        return false;
    }
    if sb == [0; 3] || sa == [0; 3] {
        return coplanar_tri_tri(a, b, ctx);
    }

    let dir = a.n.cross(&b.n);
    let dir_len = dir.norm();
    if dir_len <= ctx.slack(a.n_len * b.n_len) {
        // Planes parallel within tolerance but not flagged coplanar: treat as coplanar.
        return coplanar_tri_tri(a, b, ctx);
    }
    let origin = a.v[0];
    let (a_lo, a_hi) = plane_cut_interval(&a.v, &da, &sa, &dir, &origin);
    let (b_lo, b_hi) = plane_cut_interval(&b.v, &db, &sb, &dir, &origin);
    let slack = ctx.slack(dir_len * ctx.scale);
    a_lo <= b_hi + slack && b_lo <= a_hi + slack
}

/// Interval covered on the line direction `dir` by the part of a triangle lying
/// in the other triangle's plane (vertices on the plane plus edge crossings).
fn plane_cut_interval(
    v: &[Point; 3],
    d: &[f64; 3],
    s: &[i8; 3],
    dir: &Vector3<f64>,
    origin: &Point,
) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    let mut take = |p: Point| {
        let t = dir.dot(&(p - origin));
        lo = lo.min(t);
        hi = hi.max(t);
    };
    for k in 0..3 {
        if s[k] == 0 {
            take(v[k]);
        }
    }
    for (i, j) in [(0, 1), (1, 2), (2, 0)] {
        if s[i] * s[j] < 0 {
            let w = d[i] / (d[i] - d[j]);
            take(v[i] + (v[j] - v[i]) * w);
        }
    }
    (lo, hi)
}

fn coplanar_tri_tri(a: &Tri, b: &Tri, ctx: &Ctx) -> bool {
    let proj = Projector::along(&a.n, a.v[0]);
    planar::triangles_overlap(&proj.project3(&a.v), &proj.project3(&b.v), ctx)
}

/// Point already known to lie in the plane of `t`: closed containment.
fn in_plane_point_in_tri(x: &Point, t: &Tri, ctx: &Ctx) -> bool {
    let proj = Projector::along(&t.n, t.v[0]);
    planar::point_in_triangle(&proj.project(x), &proj.project3(&t.v), ctx)
}

fn point_tri(x: &Point, t: &Tri, ctx: &Ctx) -> bool {
    let d = t.n.dot(&(x - t.v[0]));
    if ctx.sign(d, t.n_len * ctx.scale) != 0 {
        return false;
    }
    in_plane_point_in_tri(x, t, ctx)
}

fn seg_tri(s0: &Point, s1: &Point, t: &Tri, ctx: &Ctx) -> bool {
    let mag = t.n_len * ctx.scale;
    let d0 = t.n.dot(&(s0 - t.v[0]));
    let d1 = t.n.dot(&(s1 - t.v[0]));
    let (z0, z1) = (ctx.sign(d0, mag), ctx.sign(d1, mag));
    if z0 != 0 && z0 == z1 {
        return false;
    }
    if z0 == 0 && z1 == 0 {
        let proj = Projector::along(&t.n, t.v[0]);
        return planar::segment_overlaps_triangle(
            &proj.project(s0),
            &proj.project(s1),
            &proj.project3(&t.v),
            ctx,
        );
    }
    if z0 == 0 {
        return in_plane_point_in_tri(s0, t, ctx);
    }
    if z1 == 0 {
        return in_plane_point_in_tri(s1, t, ctx);
    }
    let hit = s0 + (s1 - s0) * (d0 / (d0 - d1));
    in_plane_point_in_tri(&hit, t, ctx)
}

fn point_seg(x: &Point, s0: &Point, s1: &Point, ctx: &Ctx) -> bool {
    let d = s1 - s0;
    let t = ((x - s0).dot(&d) / d.norm_squared()).clamp(0.0, 1.0);
    (x - (s0 + d * t)).norm() <= ctx.slack(ctx.scale)
}

/// Closest distance between two non-degenerate segments within slack.
fn seg_seg(p0: &Point, p1: &Point, q0: &Point, q1: &Point, ctx: &Ctx) -> bool {
    let d1 = p1 - p0;
    let d2 = q1 - q0;
    let r = p0 - q0;
    let a = d1.norm_squared();
    let e = d2.norm_squared();
    let f = d2.dot(&r);
    let c = d1.dot(&r);
    let b = d1.dot(&d2);
    let denom = a * e - b * b;
    let mut s = if denom > ctx.slack(a * e) {
        ((b * f - c * e) / denom).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let mut t = (b * s + f) / e;
    if t < 0.0 {
        t = 0.0;
        s = (-c / a).clamp(0.0, 1.0);
    } else if t > 1.0 {
        t = 1.0;
        s = ((b - c) / a).clamp(0.0, 1.0);
    }
    let gap = (p0 + d1 * s) - (q0 + d2 * t);
    gap.norm() <= ctx.slack(ctx.scale)
}

#[cfg(test)]
mod tests;
