use super::*;
use crate::cfg::{BuildCfg, Tolerance};
use crate::naive;
use crate::scenes::{generate, SceneCfg};
use crate::types::{Point, Triangle};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn engine(store: &TriangleStore, leaf: usize, q: QueryCfg) -> Intersections {
    let cfg = BuildCfg {
        leaf_size: leaf,
        ..BuildCfg::default()
    };
    Bvh::build(store, cfg)
        .unwrap()
        .intersections(store, q)
        .unwrap()
}

fn scenes() -> Vec<(&'static str, SceneCfg)> {
    vec![
        ("grid", SceneCfg::Grid { side: 12, cell: 0.05 }),
        (
            "fan",
            SceneCfg::Fan {
                count: 120,
                radius: 250.0,
            },
        ),
        (
            "random box",
            SceneCfg::RandomBox {
                count: 200,
                half_side: 0.004,
            },
        ),
        (
            "soup",
            SceneCfg::Soup {
                count: 300,
                extent: 10.0,
                size: 1.0,
            },
        ),
    ]
}

#[test]
fn matches_oracle_on_every_scene() {
    for (name, cfg) in scenes() {
        for seed in [1u64, 2, 3] {
            let s = TriangleStore::new(generate(cfg, seed)).unwrap();
            let expected = naive::intersections(&s).unwrap();
            for leaf in [1usize, 4, 8] {
                assert_eq!(
                    engine(&s, leaf, QueryCfg::default()),
                    expected,
                    "{name} seed={seed} leaf={leaf}"
                );
            }
            let bvh = Bvh::build(&s, BuildCfg::default()).unwrap();
            assert_eq!(
                bvh.members(&s, QueryCfg::default()),
                naive::members(&s),
                "{name} seed={seed} members"
            );
        }
    }
}

#[test]
fn grid_has_no_intersections_and_prunes() {
    let s = TriangleStore::new(generate(SceneCfg::Grid { side: 30, cell: 1.0 }, 4)).unwrap();
    let bvh = Bvh::build(&s, BuildCfg::default()).unwrap();
    assert!(bvh.intersections(&s, QueryCfg::default()).unwrap().is_empty());
    assert!(bvh.members(&s, QueryCfg::default()).is_empty());
    let st = stats(&bvh, &s);
    let all_pairs = s.len() * (s.len() - 1) / 2;
    assert!(st.candidates < all_pairs / 100, "{st:?}");
}

#[test]
fn fan_is_one_big_clique() {
    let n = 60;
    let s = TriangleStore::new(generate(
        SceneCfg::Fan {
            count: n,
            radius: 0.002,
        },
        8,
    ))
    .unwrap();
    let r = engine(&s, 4, QueryCfg::default());
    assert_eq!(r.len(), n * (n - 1) / 2);
    let bvh = Bvh::build(&s, BuildCfg::default()).unwrap();
    assert_eq!(bvh.members(&s, QueryCfg::default()).len(), n);
}

#[test]
fn candidates_are_exactly_the_overlapping_boxes() {
    let s = TriangleStore::new(generate(
        SceneCfg::Soup {
            count: 400,
            extent: 5.0,
            size: 0.8,
        },
        21,
    ))
    .unwrap();
    let mut expected = Vec::new();
    for i in s.ids() {
        for j in s.ids().filter(|&j| j > i) {
            if s.aabb(i).overlaps(s.aabb(j)) {
                expected.push((i, j));
            }
        }
    }
    let bvh = Bvh::build(&s, BuildCfg::default()).unwrap();
    for q in [QueryCfg::sequential(), QueryCfg::default()] {
        let got = candidates(&bvh, &s, q).unwrap();
        assert_eq!(got.pairs(), expected.as_slice());
    }
    assert_eq!(stats(&bvh, &s).candidates, expected.len());
}

#[test]
fn task_count_does_not_change_the_answer() {
    let s = TriangleStore::new(generate(
        SceneCfg::RandomBox {
            count: 300,
            half_side: 50.0,
        },
        6,
    ))
    .unwrap();
    let reference = engine(&s, 4, QueryCfg::sequential());
    for min_tasks in [2usize, 3, 17, 1000, 100_000] {
        let q = QueryCfg {
            parallel: true,
            min_tasks,
        };
        assert_eq!(engine(&s, 4, q), reference, "min_tasks={min_tasks}");
    }
}

#[test]
fn repeated_runs_are_identical() {
    let s = TriangleStore::new(generate(
        SceneCfg::Soup {
            count: 500,
            extent: 8.0,
            size: 1.5,
        },
        13,
    ))
    .unwrap();
    let first = engine(&s, 4, QueryCfg::default());
    for _ in 0..5 {
        assert_eq!(engine(&s, 4, QueryCfg::default()), first);
    }
}

#[test]
fn never_reports_self_pairs_or_mirrors() {
    let s = TriangleStore::new(generate(
        SceneCfg::Fan {
            count: 40,
            radius: 1.0,
        },
        1,
    ))
    .unwrap();
    let r = engine(&s, 2, QueryCfg::default());
    assert!(r.iter().all(|(i, j)| i < j));
}

#[test]
fn empty_and_singleton_inputs() {
    let empty = TriangleStore::new(Vec::new()).unwrap();
    assert!(engine(&empty, 4, QueryCfg::default()).is_empty());
    let t = Triangle::new(Point::zeros(), Point::x(), Point::y());
    let one = TriangleStore::new(vec![t]).unwrap();
    assert!(engine(&one, 4, QueryCfg::default()).is_empty());
    let bvh = Bvh::build(&one, BuildCfg::default()).unwrap();
    assert!(bvh.members(&one, QueryCfg::default()).is_empty());
}

/// Shared vertices and shared edges across leaves, at mixed magnitudes.
#[test]
fn touching_mesh_matches_oracle() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for scale in [1e-3, 1.0, 1e3] {
        let side = 9;
        let mut tris = Vec::new();
        let p = |i: usize, j: usize| Point::new(i as f64 * scale, j as f64 * scale, 0.0);
        for i in 0..side {
            for j in 0..side {
                // Two triangles per quad, sharing the diagonal and the quad edges.
                tris.push(Triangle::new(p(i, j), p(i + 1, j), p(i + 1, j + 1)));
                tris.push(Triangle::new(p(i, j), p(i + 1, j + 1), p(i, j + 1)));
            }
        }
        // A few degenerate pieces lying on mesh edges.
        for _ in 0..20 {
            let (i, j) = (rng.gen_range(0..side), rng.gen_range(0..side));
            tris.push(Triangle::new(p(i, j), p(i, j), p(i, j)));
            tris.push(Triangle::new(p(i, j), p(i + 1, j), p(i, j)));
        }
        let s = TriangleStore::with_tolerance(tris, Tolerance::default()).unwrap();
        let expected = naive::intersections(&s).unwrap();
        assert_eq!(engine(&s, 4, QueryCfg::default()), expected, "scale={scale}");
        assert!(!expected.is_empty());
    }
}
