//! Engine error type.
//!
//! Two families only: bad input (caller's fault, detected at parse time before
//! any tree work) and internal consistency violations (always a bug). Geometric
//! degeneracy is valid input and never produces an error.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Input does not describe exactly the declared number of finite triangles.
    /// `line` is 1-based; 0 means the problem was detected at end of input.
    MalformedInput { line: usize, reason: String },
    /// An invariant of the hierarchy or the traversal does not hold.
    InternalConsistency { reason: String },
}

impl EngineError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            line,
            reason: reason.into(),
        }
    }

    pub(crate) fn internal(reason: impl Into<String>) -> Self {
        Self::InternalConsistency {
            reason: reason.into(),
        }
    }

    pub fn is_malformed_input(&self) -> bool {
        matches!(self, Self::MalformedInput { .. })
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedInput { line: 0, reason } => {
                write!(f, "malformed input at end of input: {reason}")
            }
            Self::MalformedInput { line, reason } => {
                write!(f, "malformed input at line {line}: {reason}")
            }
            Self::InternalConsistency { reason } => {
                write!(f, "internal consistency error: {reason}")
            }
        }
    }
}

impl std::error::Error for EngineError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_line() {
        let e = EngineError::malformed(7, "expected a number, found `x`");
        assert_eq!(
            e.to_string(),
            "malformed input at line 7: expected a number, found `x`"
        );
        let eof = EngineError::malformed(0, "declared 2 triangles, found 1");
        assert!(eof.to_string().contains("end of input"));
        assert!(eof.is_malformed_input());
        assert!(!EngineError::internal("x").is_malformed_input());
    }
}
