//! Tolerances and tuning knobs.
//!
//! Policy
//! - One relative epsilon (`Tolerance::eps_rel`) drives every zero test in the
//!   narrow phase. It is scaled by the magnitude of the operands, never used as an
//!   absolute distance, because inputs span roughly 1e-3 to 1e3.
//! - The same `Tolerance` pads the triangle boxes, so the broad phase can only
//!   drop pairs the predicate would reject anyway.
//! - Engine and oracle read the tolerance from the `TriangleStore`, so they can
//!   never be run with different values on the same input.

/// Default relative epsilon for the narrow phase.
///
/// Inputs carry 4 decimal digits on coordinates up to ~1e3, so true contacts
/// produce residuals around 1e-13 relative; genuine gaps in the test categories
/// are at least ~1e-7 relative. 1e-9 sits well between both.
pub(crate) const DEFAULT_EPS_REL: f64 = 1e-9;

/// Box padding in units of `eps_rel × extent`.
///
/// The predicate accepts gaps up to a small multiple of `eps_rel × scale`
/// (plane distance plus in-plane slack, and up to √3 distortion from the 2D
/// projection in the coplanar branch). 8 covers the sum with margin.
pub(crate) const DEFAULT_AABB_PAD: f64 = 8.0;

/// Extra absolute padding, in ulps of the largest coordinate magnitude.
pub(crate) const PAD_ULPS: f64 = 4.0;

/// Triangles per leaf unless the depth bound forces an earlier stop.
pub(crate) const DEFAULT_LEAF_SIZE: usize = 4;

/// Hard bound on tree depth. Median splits give ~log2(n), so hitting this is a bug.
pub(crate) const DEFAULT_MAX_DEPTH: usize = 64;

/// Subtrees smaller than this are built on the calling thread.
pub(crate) const DEFAULT_PARALLEL_THRESHOLD: usize = 4096;

/// Number of node-pair tasks to seed per worker thread for the parallel query.
pub(crate) const TASKS_PER_THREAD: usize = 8;

/// Numeric policy shared by the predicate, the box padding and the oracle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerance {
    /// Relative epsilon for sign classification.
    pub eps_rel: f64,
    /// AABB padding factor (multiplies `eps_rel × extent`).
    pub aabb_pad: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            eps_rel: DEFAULT_EPS_REL,
            aabb_pad: DEFAULT_AABB_PAD,
        }
    }
}

impl Tolerance {
    /// Tolerance with a custom relative epsilon and the default padding factor.
    #[inline]
    pub fn with_eps(eps_rel: f64) -> Self {
        Self {
            eps_rel,
            ..Self::default()
        }
    }

    /// Absolute slack for a quantity built from operands of magnitude `scale`.
    #[inline]
    pub(crate) fn slack(&self, scale: f64) -> f64 {
        self.eps_rel * scale
    }
}

/// BVH construction parameters.
#[derive(Clone, Copy, Debug)]
pub struct BuildCfg {
    pub leaf_size: usize,
    pub max_depth: usize,
    /// Minimum triangle count for a subtree to be split across worker threads.
    pub parallel_threshold: usize,
}

impl Default for BuildCfg {
    fn default() -> Self {
        Self {
            leaf_size: DEFAULT_LEAF_SIZE,
            max_depth: DEFAULT_MAX_DEPTH,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl BuildCfg {
    /// Single-threaded build (useful for reproducing timings).
    pub fn sequential() -> Self {
        Self {
            parallel_threshold: usize::MAX,
            ..Self::default()
        }
    }
}

/// Broad-phase query parameters.
#[derive(Clone, Copy, Debug)]
pub struct QueryCfg {
    pub parallel: bool,
    /// Target number of independent node-pair tasks; 0 derives it from the pool size.
    pub min_tasks: usize,
}

impl Default for QueryCfg {
    fn default() -> Self {
        Self {
            parallel: true,
            min_tasks: 0,
        }
    }
}

impl QueryCfg {
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            min_tasks: 1,
        }
    }

    pub(crate) fn task_target(&self) -> usize {
        if !self.parallel {
            return 1;
        }
        if self.min_tasks > 0 {
            return self.min_tasks;
        }
        rayon::current_num_threads().max(1) * TASKS_PER_THREAD
    }
}
