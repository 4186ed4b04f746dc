//! Triangle–triangle intersection engine backed by a bounding volume hierarchy.
//!
//! Pipeline
//! - `store`: parse the input once, assign ids in input order, precompute padded AABBs.
//! - `bvh`: arena-backed binary tree over the store (median split, id tie-break).
//! - `narrow`: exact closed-region triangle–triangle predicate with a relative epsilon.
//! - `broad`: BVH self-traversal over node pairs; confirmed pairs go to `result`.
//! - `naive`: the O(n²) oracle used to validate the engine.
//! - `scenes`: seeded generators for the grid, fan, random-box and soup inputs.
//!
//! Conventions
//! - Points are `nalgebra::Vector3<f64>`; triangle ids are `u32` input positions.
//! - Every result is canonical: pairs `(i, j)` with `i < j`, sorted ascending.
//! - Tolerances live in `cfg::Tolerance`; the store carries one, so engine and
//!   oracle always evaluate the predicate with the same value.

pub mod broad;
pub mod bvh;
pub mod cfg;
pub mod error;
pub mod naive;
pub mod narrow;
pub mod result;
pub mod scenes;
pub mod store;
pub mod types;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use bvh::Bvh;
pub use cfg::{BuildCfg, QueryCfg, Tolerance};
pub use error::EngineError;
pub use narrow::intersects;
pub use result::{Intersections, Members};
pub use store::TriangleStore;
pub use types::{Aabb, Point, TriId, Triangle};

/// Common exports for callers that just want an answer.
pub mod prelude {
    pub use crate::bvh::Bvh;
    pub use crate::cfg::{BuildCfg, QueryCfg, Tolerance};
    pub use crate::error::EngineError;
    pub use crate::result::{Intersections, Members};
    pub use crate::store::TriangleStore;
    pub use crate::types::{Aabb, Point, TriId, Triangle};
    pub use nalgebra::Vector3;
}

/// Build the hierarchy and run one full pair query with default settings.
pub fn find_intersections(store: &TriangleStore) -> Result<Intersections, EngineError> {
    let bvh = Bvh::build(store, BuildCfg::default())?;
    bvh.intersections(store, QueryCfg::default())
}

/// Same as [`find_intersections`] but only reports which triangles touch something.
pub fn find_members(store: &TriangleStore) -> Result<Members, EngineError> {
    let bvh = Bvh::build(store, BuildCfg::default())?;
    Ok(bvh.members(store, QueryCfg::default()))
}
