//! Canonical stdout encodings of an answer.

use std::io::{self, Write};

use clap::ValueEnum;
use serde::Serialize;
use tricross::{Intersections, Members};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// `i j` per intersecting pair, `i < j`, sorted
    Pairs,
    /// Ids of triangles intersecting anything, one per line, ascending
    Indices,
    /// Number of intersecting pairs
    Count,
    /// `{"triangles": N, "pairs": [[i, j], ...]}`
    Json,
}

impl Format {
    /// `indices` only needs membership, which has its own cheaper query.
    pub fn wants_members(self) -> bool {
        matches!(self, Format::Indices)
    }
}

/// Result of one engine run in the shape the format asked for.
#[derive(Clone, Debug, PartialEq)]
pub enum Answer {
    Pairs(Intersections),
    Members(Members),
}

impl Answer {
    pub fn len(&self) -> usize {
        match self {
            Answer::Pairs(p) => p.len(),
            Answer::Members(m) => m.len(),
        }
    }

    /// Human-readable description of the first point where two answers differ.
    pub fn first_difference(&self, other: &Answer) -> Option<String> {
        match (self, other) {
            (Answer::Pairs(a), Answer::Pairs(b)) => {
                let (a, b) = (a.pairs(), b.pairs());
                let k = a
                    .iter()
                    .zip(b)
                    .position(|(x, y)| x != y)
                    .unwrap_or(a.len().min(b.len()));
                if a.len() == b.len() && k == a.len() {
                    return None;
                }
                let show = |p: Option<&(tricross::TriId, tricross::TriId)>| {
                    p.map_or("<end>".to_string(), |(i, j)| format!("({i}, {j})"))
                };
                Some(format!(
                    "pair #{k}: {} vs {} ({} vs {} pairs)",
                    show(a.get(k)),
                    show(b.get(k)),
                    a.len(),
                    b.len()
                ))
            }
            (Answer::Members(a), Answer::Members(b)) => {
                let (a, b) = (a.ids(), b.ids());
                let k = a
                    .iter()
                    .zip(b)
                    .position(|(x, y)| x != y)
                    .unwrap_or(a.len().min(b.len()));
                if a.len() == b.len() && k == a.len() {
                    return None;
                }
                let show =
                    |p: Option<&tricross::TriId>| p.map_or("<end>".to_string(), |i| i.to_string());
                Some(format!(
                    "member #{k}: {} vs {} ({} vs {} members)",
                    show(a.get(k)),
                    show(b.get(k)),
                    a.len(),
                    b.len()
                ))
            }
            _ => Some("answers of different kinds".to_string()),
        }
    }
}

#[derive(Serialize)]
struct JsonAnswer {
    triangles: usize,
    pairs: Vec<[u32; 2]>,
}

pub fn render<W: Write>(
    out: &mut W,
    answer: &Answer,
    format: Format,
    triangles: usize,
) -> io::Result<()> {
    match (answer, format) {
        (Answer::Members(m), _) => m.write_indices(out),
        (Answer::Pairs(p), Format::Indices) => p.members().write_indices(out),
        (Answer::Pairs(p), Format::Pairs) => p.write_pairs(out),
        (Answer::Pairs(p), Format::Count) => p.write_count(out),
        (Answer::Pairs(p), Format::Json) => {
            let doc = JsonAnswer {
                triangles,
                pairs: p.iter().map(|&(i, j)| [i.0, j.0]).collect(),
            };
            serde_json::to_writer(&mut *out, &doc)?;
            writeln!(out)
        }
    }
}
