//! Triangle Store: parsed primitives plus their eagerly computed padded boxes.
//!
//! Input format
//! - First non-blank token: the triangle count `N` (non-negative integer).
//! - Then exactly `9 × N` finite floats, three per vertex, three vertices per
//!   triangle. The canonical layout is one vertex per line with a blank line
//!   between triangles, but any whitespace layout is accepted.
//! - Fewer or more values than declared, a bad count, a non-numeric token or a
//!   non-finite value fail with `EngineError::MalformedInput`. Nothing is
//!   truncated or padded.

use std::io::{self, Read, Write};

use crate::cfg::Tolerance;
use crate::error::EngineError;
use crate::types::{Aabb, Point, TriId, Triangle};

/// Immutable set of triangles with stable ids and padded boxes.
#[derive(Clone, Debug)]
pub struct TriangleStore {
    triangles: Vec<Triangle>,
    boxes: Vec<Aabb>,
    tol: Tolerance,
}

impl TriangleStore {
    /// Store with the default tolerance.
    pub fn new(triangles: Vec<Triangle>) -> Result<Self, EngineError> {
        Self::with_tolerance(triangles, Tolerance::default())
    }

    /// Store whose boxes (and later every predicate call) use `tol`.
    pub fn with_tolerance(triangles: Vec<Triangle>, tol: Tolerance) -> Result<Self, EngineError> {
        if triangles.len() > u32::MAX as usize {
            return Err(EngineError::malformed(
                0,
                format!("{} triangles exceed the id range", triangles.len()),
            ));
        }
        for (k, tri) in triangles.iter().enumerate() {
            if !tri.vertices().iter().all(|p| p.iter().all(|x| x.is_finite())) {
                return Err(EngineError::malformed(
                    0,
                    format!("triangle {k} has a non-finite coordinate"),
                ));
            }
        }
        let boxes = triangles.iter().map(|t| Aabb::padded(t, tol)).collect();
        Ok(Self {
            triangles,
            boxes,
            tol,
        })
    }

    /// Parse the textual input format with the default tolerance.
    pub fn parse(text: &str) -> Result<Self, EngineError> {
        Self::parse_with(text, Tolerance::default())
    }

    pub fn parse_with(text: &str, tol: Tolerance) -> Result<Self, EngineError> {
        let triangles = parse_triangles(text)?;
        Self::with_tolerance(triangles, tol)
    }

    /// Read the whole stream, then parse. The read is the only blocking step.
    pub fn from_reader<R: Read>(
        mut reader: R,
        tol: Tolerance,
    ) -> io::Result<Result<Self, EngineError>> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Ok(Self::parse_with(&text, tol))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    #[inline]
    pub fn tolerance(&self) -> Tolerance {
        self.tol
    }

    #[inline]
    pub fn triangle(&self, id: TriId) -> &Triangle {
        &self.triangles[id.index()]
    }

    #[inline]
    pub fn aabb(&self, id: TriId) -> &Aabb {
        &self.boxes[id.index()]
    }

    #[inline]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    #[inline]
    pub fn boxes(&self) -> &[Aabb] {
        &self.boxes
    }

    pub fn ids(&self) -> impl Iterator<Item = TriId> + '_ {
        (0..self.triangles.len() as u32).map(TriId)
    }

    /// Narrow-phase test between two stored triangles.
    #[inline]
    pub fn intersects(&self, i: TriId, j: TriId) -> bool {
        crate::narrow::intersects(self.triangle(i), self.triangle(j), self.tol)
    }
}

/// Token with its 1-based source line.
struct Token<'a> {
    text: &'a str,
    line: usize,
}

fn tokens(text: &str) -> impl Iterator<Item = Token<'_>> {
    text.lines().enumerate().flat_map(|(k, line)| {
        line.split_whitespace().map(move |t| Token { text: t, line: k + 1 })
    })
}

fn parse_triangles(text: &str) -> Result<Vec<Triangle>, EngineError> {
    let mut toks = tokens(text);
    let Some(first) = toks.next() else {
        return Err(EngineError::malformed(0, "missing triangle count"));
    };
    let count: usize = first.text.parse().map_err(|_| {
        EngineError::malformed(
            first.line,
            format!("expected a non-negative triangle count, found `{}`", first.text),
        )
    })?;

    let mut coords: Vec<f64> = Vec::with_capacity(count.saturating_mul(9).min(1 << 24));
    for tok in toks {
        let v: f64 = tok.text.parse().map_err(|_| {
            EngineError::malformed(tok.line, format!("expected a number, found `{}`", tok.text))
        })?;
        if !v.is_finite() {
            return Err(EngineError::malformed(
                tok.line,
                format!("coordinate `{}` is not finite", tok.text),
            ));
        }
        if coords.len() == count.saturating_mul(9) {
            return Err(EngineError::malformed(
                tok.line,
                format!("declared {count} triangles but found extra data `{}`", tok.text),
            ));
        }
        coords.push(v);
    }
    if coords.len() != count.saturating_mul(9) {
        return Err(EngineError::malformed(
            0,
            format!(
                "declared {count} triangles but found {} complete ({} values left over)",
                coords.len() / 9,
                coords.len() % 9
            ),
        ));
    }

    Ok(coords
        .chunks_exact(9)
        .map(|c| {
            Triangle::new(
                Point::new(c[0], c[1], c[2]),
                Point::new(c[3], c[4], c[5]),
                Point::new(c[6], c[7], c[8]),
            )
        })
        .collect())
}

/// Render triangles in the canonical input layout (count, then one vertex per
/// line with a blank line after each triangle).
pub fn write_input<W: Write>(out: &mut W, triangles: &[Triangle]) -> io::Result<()> {
    writeln!(out, "{}", triangles.len())?;
    for t in triangles {
        for p in t.vertices() {
            writeln!(out, "{} {} {}", p.x, p.y, p.z)?;
        }
        writeln!(out)?;
    }
    Ok(())
}
