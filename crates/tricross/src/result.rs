//! Result Aggregator: canonical, traversal-order-independent answers.
//!
//! Canonical forms
//! - `Intersections`: unordered pairs stored as `(i, j)` with `i < j`, sorted
//!   by `(i, j)`, no duplicates.
//! - `Members`: triangle ids that intersect at least one other triangle,
//!   sorted ascending, no duplicates.
//!
//! Both the engine and the oracle funnel their raw output through the
//! constructors here, so two runs agree byte-for-byte whenever they agree as sets.

use std::io::{self, Write};

use crate::error::EngineError;
use crate::types::TriId;

/// One confirmed intersection, `0 < 1` after canonicalization.
pub type Pair = (TriId, TriId);

/// Canonical set of intersecting triangle pairs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Intersections {
    pairs: Vec<Pair>,
}

impl Intersections {
    /// Canonicalize raw pairs in any order and orientation.
    ///
    /// A pair `(i, i)` or an id outside `0..n` means the producer is broken and
    /// is reported as `InternalConsistency`.
    pub fn from_pairs(mut pairs: Vec<Pair>, n: usize) -> Result<Self, EngineError> {
        for p in pairs.iter_mut() {
            if p.0 == p.1 {
                return Err(EngineError::internal(format!(
                    "self pair ({}, {}) reached the aggregator",
                    p.0, p.1
                )));
            }
            if p.0.index() >= n || p.1.index() >= n {
                return Err(EngineError::internal(format!(
                    "pair ({}, {}) references a triangle outside 0..{n}",
                    p.0, p.1
                )));
            }
            if p.0 > p.1 {
                *p = (p.1, p.0);
            }
        }
        pairs.sort_unstable();
        pairs.dedup();
        Ok(Self { pairs })
    }

    #[inline]
    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pair> + '_ {
        self.pairs.iter()
    }

    /// Order-insensitive membership test.
    pub fn contains(&self, i: TriId, j: TriId) -> bool {
        let key = if i <= j { (i, j) } else { (j, i) };
        self.pairs.binary_search(&key).is_ok()
    }

    /// Ids appearing in at least one pair.
    pub fn members(&self) -> Members {
        let ids = self.pairs.iter().flat_map(|&(i, j)| [i, j]).collect();
        Members::from_ids(ids)
    }

    /// `i j` per line, in canonical order.
    pub fn write_pairs<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for (i, j) in &self.pairs {
            writeln!(out, "{i} {j}")?;
        }
        Ok(())
    }

    /// Single line holding the pair count.
    pub fn write_count<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{}", self.pairs.len())
    }
}

/// Canonical set of triangles that touch at least one other triangle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Members {
    ids: Vec<TriId>,
}

impl Members {
    pub fn from_ids(mut ids: Vec<TriId>) -> Self {
        ids.sort_unstable();
        ids.dedup();
        Self { ids }
    }

    #[inline]
    pub fn ids(&self) -> &[TriId] {
        &self.ids
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: TriId) -> bool {
        self.ids.binary_search(&id).is_ok()
    }

    /// One id per line, ascending.
    pub fn write_indices<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for id in &self.ids {
            writeln!(out, "{id}")?;
        }
        Ok(())
    }
}
