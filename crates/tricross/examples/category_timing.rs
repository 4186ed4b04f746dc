//! Timing probe: BVH engine vs naive oracle on one input of each category.
//!
//! Purpose
//! - Give a quick, reproducible data point for how much the hierarchy buys on
//!   sparse inputs (grid) and how little it buys on dense ones (fan, random box).
//! - Double-check on every run that both sides report the same members.
//!
//! Usage: `cargo run --release -p tricross --example category_timing -- 20000`

use std::time::Instant;

use tricross::naive;
use tricross::scenes::{generate, SceneCfg};
use tricross::{BuildCfg, Bvh, QueryCfg, TriangleStore};

fn main() {
    let n: usize = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(5000);
    let categories = [
        ("grid", SceneCfg::grid_for(n, 7.5)),
        (
            "fan",
            SceneCfg::Fan {
                count: n,
                radius: 250.0,
            },
        ),
        (
            "random",
            SceneCfg::RandomBox {
                count: n,
                half_side: 250.0,
            },
        ),
    ];
    for (name, cfg) in categories {
        let store = TriangleStore::new(generate(cfg, 228)).expect("generated scene is finite");

        let t0 = Instant::now();
        let bvh = Bvh::build(&store, BuildCfg::default()).expect("build succeeds");
        let build_ms = t0.elapsed().as_secs_f64() * 1e3;
        let t1 = Instant::now();
        let members = bvh.members(&store, QueryCfg::default());
        let query_ms = t1.elapsed().as_secs_f64() * 1e3;

        let t2 = Instant::now();
        let oracle = naive::members(&store);
        let naive_ms = t2.elapsed().as_secs_f64() * 1e3;

        assert_eq!(members, oracle, "{name}: engine and oracle disagree");
        println!(
            "category={name} triangles={} members={} depth={} leaves={}",
            store.len(),
            members.len(),
            bvh.depth(),
            bvh.leaf_count()
        );
        println!("build_ms={build_ms:.3} query_ms={query_ms:.3} naive_ms={naive_ms:.3}");
    }
}
