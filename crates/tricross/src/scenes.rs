//! Seeded synthetic inputs for tests, benches and the `gen` command.
//!
//! Categories
//! - `Grid`: an `side × side` grid of square cells in the z = 0 plane, one
//!   triangle per cell, kept `GRID_MARGIN` away from the cell border. No two
//!   triangles touch; the naive oracle pays its full O(n²) here.
//! - `Fan`: equilateral triangles inscribed in one circle at the origin, each
//!   rotated by its own angle. All centroids coincide and every pair overlaps.
//! - `RandomBox`: vertices uniform in a square `[-h, h]²` at z = 0. Dense
//!   overlap, the adversarial case for any spatial hierarchy.
//! - `Soup`: small triangles with random orientation in a cube, to exercise
//!   the genuinely 3-D branch of the predicate.
//!
//! Coordinates are rounded to `COORD_DECIMALS` places, the precision of the
//! reference data sets. Fan vertices are computed from a rounded angle and
//! radius and left unrounded.

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::{Point, Triangle};

/// Decimal places kept on generated coordinates.
pub const COORD_DECIMALS: i32 = 4;

/// Distance between a grid triangle and its cell border.
pub const GRID_MARGIN: f64 = 1e-3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SceneCfg {
    /// `side × side` cells of width `cell`.
    Grid { side: usize, cell: f64 },
    /// `count` triangles on a circle of `radius`.
    Fan { count: usize, radius: f64 },
    /// `count` triangles in `[-half_side, half_side]²`.
    RandomBox { count: usize, half_side: f64 },
    /// `count` triangles of edge length up to `size` in a cube of side `extent`.
    Soup { count: usize, extent: f64, size: f64 },
}

impl SceneCfg {
    /// Category sized for roughly `count` triangles at length scale `scale`.
    pub fn grid_for(count: usize, scale: f64) -> Self {
        let side = ((count as f64).sqrt().ceil() as usize).max(1);
        SceneCfg::Grid { side, cell: scale }
    }

    pub fn triangle_count(&self) -> usize {
        match *self {
            SceneCfg::Grid { side, .. } => side * side,
            SceneCfg::Fan { count, .. }
            | SceneCfg::RandomBox { count, .. }
            | SceneCfg::Soup { count, .. } => count,
        }
    }
}

/// Generate the scene for `cfg` from `seed`. Same inputs, same triangles.
pub fn generate(cfg: SceneCfg, seed: u64) -> Vec<Triangle> {
    let mut rng = StdRng::seed_from_u64(seed);
    match cfg {
        SceneCfg::Grid { side, cell } => grid(&mut rng, side, cell),
        SceneCfg::Fan { count, radius } => equilateral_fan(&mut rng, count, radius),
        SceneCfg::RandomBox { count, half_side } => random_box(&mut rng, count, half_side),
        SceneCfg::Soup {
            count,
            extent,
            size,
        } => soup(&mut rng, count, extent, size),
    }
}

#[inline]
pub fn round_coord(x: f64) -> f64 {
    let k = 10f64.powi(COORD_DECIMALS);
    (x * k).round() / k
}

/// Uniform in `[lo, hi]`, rounded, and clamped back into the range.
fn sample<R: Rng>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    if hi <= lo {
        return lo;
    }
    round_coord(rng.gen_range(lo..=hi)).clamp(lo, hi)
}

pub fn grid<R: Rng>(rng: &mut R, side: usize, cell: f64) -> Vec<Triangle> {
    // Narrow cells get a proportional margin so neighbours stay apart.
    let margin = GRID_MARGIN.min(cell / 4.0);
    let mut out = Vec::with_capacity(side * side);
    for i in 0..side {
        for j in 0..side {
            let (x_l, x_r) = (j as f64 * cell + margin, (j + 1) as f64 * cell - margin);
            let (y_b, y_t) = (i as f64 * cell + margin, (i + 1) as f64 * cell - margin);
            let mut p = || Point::new(sample(rng, x_l, x_r), sample(rng, y_b, y_t), 0.0);
            out.push(Triangle::new(p(), p(), p()));
        }
    }
    out
}

pub fn equilateral_fan<R: Rng>(rng: &mut R, count: usize, radius: f64) -> Vec<Triangle> {
    let r = round_coord(radius);
    let third = 2.0 * PI / 3.0;
    let polar = |phi: f64| Point::new(phi.cos() * r, phi.sin() * r, 0.0);
    (0..count)
        .map(|_| {
            let phi = round_coord(rng.gen_range(0.0..2.0 * PI));
            Triangle::new(polar(phi), polar(phi + third), polar(phi + 2.0 * third))
        })
        .collect()
}

pub fn random_box<R: Rng>(rng: &mut R, count: usize, half_side: f64) -> Vec<Triangle> {
    let h = half_side.abs();
    let mut p = || Point::new(sample(rng, -h, h), sample(rng, -h, h), 0.0);
    (0..count).map(|_| Triangle::new(p(), p(), p())).collect()
}

pub fn soup<R: Rng>(rng: &mut R, count: usize, extent: f64, size: f64) -> Vec<Triangle> {
    let e = extent.abs();
    let s = size.abs();
    (0..count)
        .map(|_| {
            let base = Point::new(
                sample(rng, 0.0, e),
                sample(rng, 0.0, e),
                sample(rng, 0.0, e),
            );
            let mut near = || {
                Point::new(
                    round_coord(base.x + rng.gen_range(-s..=s)),
                    round_coord(base.y + rng.gen_range(-s..=s)),
                    round_coord(base.z + rng.gen_range(-s..=s)),
                )
            };
            Triangle::new(base, near(), near())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decimals_ok(x: f64) -> bool {
        (x * 1e4 - (x * 1e4).round()).abs() < 1e-6
    }

    #[test]
    fn same_seed_same_scene() {
        let cfg = SceneCfg::RandomBox {
            count: 50,
            half_side: 3.0,
        };
        assert_eq!(generate(cfg, 7), generate(cfg, 7));
        assert_ne!(generate(cfg, 7), generate(cfg, 8));
    }

    #[test]
    fn grid_triangles_stay_inside_their_cells() {
        let cell = 2.5;
        let side = 6;
        let tris = generate(SceneCfg::Grid { side, cell }, 1);
        assert_eq!(tris.len(), side * side);
        for (k, t) in tris.iter().enumerate() {
            let (i, j) = ((k / side) as f64, (k % side) as f64);
            for p in t.vertices() {
                assert!(p.x >= j * cell + GRID_MARGIN - 1e-12);
                assert!(p.x <= (j + 1.0) * cell - GRID_MARGIN + 1e-12);
                assert!(p.y >= i * cell + GRID_MARGIN - 1e-12);
                assert!(p.y <= (i + 1.0) * cell - GRID_MARGIN + 1e-12);
                assert_eq!(p.z, 0.0);
                assert!(decimals_ok(p.x) && decimals_ok(p.y));
            }
        }
    }

    #[test]
    fn fan_triangles_share_the_origin_as_centroid() {
        let tris = generate(
            SceneCfg::Fan {
                count: 20,
                radius: 12.5,
            },
            3,
        );
        for t in &tris {
            assert!(t.centroid().norm() < 1e-9);
            assert!((t.a.norm() - 12.5).abs() < 1e-9);
        }
    }

    #[test]
    fn random_box_respects_bounds() {
        let h = 0.25;
        let tris = generate(
            SceneCfg::RandomBox {
                count: 100,
                half_side: h,
            },
            11,
        );
        assert_eq!(tris.len(), 100);
        for p in tris.iter().flat_map(|t| t.vertices()) {
            assert!(p.x.abs() <= h && p.y.abs() <= h && p.z == 0.0);
        }
    }

    #[test]
    fn grid_for_covers_the_request() {
        let cfg = SceneCfg::grid_for(10, 1.0);
        assert_eq!(cfg, SceneCfg::Grid { side: 4, cell: 1.0 });
        assert!(cfg.triangle_count() >= 10);
    }
}
