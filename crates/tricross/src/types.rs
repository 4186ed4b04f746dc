//! Core value types: points, triangles, ids and axis-aligned boxes.

use nalgebra::Vector3;
use std::fmt;

use crate::cfg::{Tolerance, PAD_ULPS};

/// A point (or vector) in R³.
pub type Point = Vector3<f64>;

/// Stable triangle identifier: the 0-based position in the input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TriId(pub u32);

impl TriId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TriId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered vertex triple. Degenerate (zero-area) triangles are legal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub a: Point,
    pub b: Point,
    pub c: Point,
}

impl Triangle {
    #[inline]
    pub fn new(a: Point, b: Point, c: Point) -> Self {
        Self { a, b, c }
    }

    #[inline]
    pub fn vertices(&self) -> [Point; 3] {
        [self.a, self.b, self.c]
    }

    /// Unnormalized normal `(b - a) × (c - a)`; zero for degenerate triangles.
    #[inline]
    pub fn normal(&self) -> Vector3<f64> {
        (self.b - self.a).cross(&(self.c - self.a))
    }

    #[inline]
    pub fn centroid(&self) -> Point {
        (self.a + self.b + self.c) / 3.0
    }

    /// Largest side of the unpadded bounding box.
    pub fn extent(&self) -> f64 {
        let lo = self.a.inf(&self.b).inf(&self.c);
        let hi = self.a.sup(&self.b).sup(&self.c);
        (hi - lo).max()
    }

    /// Largest absolute coordinate over all vertices.
    pub(crate) fn max_abs_coord(&self) -> f64 {
        self.a.amax().max(self.b.amax()).max(self.c.amax())
    }

    /// Lexicographic total order on the raw coordinates, used to make the
    /// predicate evaluate every pair in one fixed argument order.
    pub(crate) fn total_cmp(&self, other: &Triangle) -> std::cmp::Ordering {
        self.vertices()
            .iter()
            .flat_map(|p| p.iter())
            .zip(other.vertices().iter().flat_map(|p| p.iter()))
            .map(|(x, y)| x.total_cmp(y))
            .find(|o| o.is_ne())
            .unwrap_or(std::cmp::Ordering::Equal)
    }
}

/// Axis-aligned bounding box. Invariant: `min <= max` component-wise (except for
/// `Aabb::empty`, which is the identity of `union`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Point,
    pub max: Point,
}

impl Aabb {
    #[inline]
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Inverted box; `empty().union(b) == b`.
    #[inline]
    pub fn empty() -> Self {
        Self {
            min: Point::repeat(f64::INFINITY),
            max: Point::repeat(f64::NEG_INFINITY),
        }
    }

    /// Tight box around the three vertices.
    pub fn from_triangle(tri: &Triangle) -> Self {
        Self {
            min: tri.a.inf(&tri.b).inf(&tri.c),
            max: tri.a.sup(&tri.b).sup(&tri.c),
        }
    }

    /// Box padded so that any pair the narrow phase may accept has overlapping boxes.
    ///
    /// Padding = `aabb_pad × eps_rel × extent` plus a few ulps of the largest
    /// coordinate. Zero-volume triangles still get the ulp padding.
    pub fn padded(tri: &Triangle, tol: Tolerance) -> Self {
        let tight = Self::from_triangle(tri);
        let pad = tol.aabb_pad * tol.slack(tri.extent())
            + PAD_ULPS * f64::EPSILON * tri.max_abs_coord();
        tight.inflated(pad)
    }

    #[inline]
    pub fn inflated(&self, pad: f64) -> Self {
        Self {
            min: self.min.add_scalar(-pad),
            max: self.max.add_scalar(pad),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        (0..3).any(|i| self.min[i] > self.max[i])
    }

    #[inline]
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Inclusive overlap: boxes touching on a face overlap.
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        (0..3).all(|i| self.min[i] <= other.max[i] && other.min[i] <= self.max[i])
    }

    #[inline]
    pub fn contains(&self, other: &Aabb) -> bool {
        (0..3).all(|i| self.min[i] <= other.min[i] && other.max[i] <= self.max[i])
    }

    #[inline]
    pub fn extents(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Axis (0=x, 1=y, 2=z) with the largest extent; ties go to the lower axis.
    pub fn longest_axis(&self) -> usize {
        let e = self.extents();
        if e.x >= e.y && e.x >= e.z {
            0
        } else if e.y >= e.z {
            1
        } else {
            2
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;

    fn tri(a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> Triangle {
        Triangle::new(Point::from(a), Point::from(b), Point::from(c))
    }

    #[test]
    fn padded_box_contains_degenerate_triangle() {
        let t = tri([1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, 1.0]);
        let bb = Aabb::padded(&t, Tolerance::default());
        assert!(bb.contains(&Aabb::from_triangle(&t)));
        assert!(bb.min.x < 1.0 && bb.max.x > 1.0);
    }

    #[test]
    fn touching_boxes_overlap() {
        let a = Aabb::new(vector![0.0, 0.0, 0.0], vector![1.0, 1.0, 1.0]);
        let b = Aabb::new(vector![1.0, 0.0, 0.0], vector![2.0, 1.0, 1.0]);
        let c = Aabb::new(vector![1.5, 0.0, 0.0], vector![2.0, 1.0, 1.0]);
        assert!(a.overlaps(&b) && b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn empty_is_union_identity() {
        let a = Aabb::new(vector![0.0, -1.0, 2.0], vector![1.0, 1.0, 3.0]);
        assert!(Aabb::empty().is_empty());
        assert_eq!(Aabb::empty().union(&a), a);
    }

    #[test]
    fn longest_axis_prefers_lower_index_on_ties() {
        let a = Aabb::new(vector![0.0, 0.0, 0.0], vector![2.0, 2.0, 1.0]);
        assert_eq!(a.longest_axis(), 0);
        let b = Aabb::new(vector![0.0, 0.0, 0.0], vector![1.0, 1.0, 3.0]);
        assert_eq!(b.longest_axis(), 2);
    }

    #[test]
    fn total_cmp_is_antisymmetric() {
        let t = tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let u = tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 1e-9]);
        assert_eq!(t.total_cmp(&u), std::cmp::Ordering::Less);
        assert_eq!(u.total_cmp(&t), std::cmp::Ordering::Greater);
        assert_eq!(t.total_cmp(&t), std::cmp::Ordering::Equal);
    }
}
