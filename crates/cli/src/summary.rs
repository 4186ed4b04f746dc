use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Wall-clock timings of one run, in milliseconds.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct Timings {
    pub parse_ms: f64,
    pub build_ms: f64,
    pub query_ms: f64,
}

/// Run summary written next to the result by `--summary`.
#[derive(Debug, Serialize)]
pub struct Summary {
    pub version: &'static str,
    pub engine: String,
    pub format: String,
    pub input: Option<PathBuf>,
    pub triangles: usize,
    /// Pairs, or members for `--format indices`.
    pub results: usize,
    pub eps_rel: f64,
    pub leaf_size: usize,
    pub timings: Timings,
}

/// Write `summary` as pretty JSON to `path`, creating the parent directory.
pub fn write_summary(path: &Path, summary: &Summary) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating summary dir {}", parent.display()))?;
        }
    }
    fs::write(path, serde_json::to_vec_pretty(summary)?)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
