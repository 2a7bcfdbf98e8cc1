//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `std::fs`, or `std::process`, and opens no sockets.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Target expression errors ──────────────────────────────────────────────────

/// A malformed target expression.
///
/// Always reported to the caller as-is: a typo in a target must never look
/// like a valid target that matched nobody. Offsets are byte offsets into the
/// expression string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty target expression")]
    Empty,

    #[error("expected a target at offset {offset}, found '{found}'")]
    MissingOperand { offset: usize, found: String },

    #[error("expression ends after operator '{operator}' at offset {offset}")]
    DanglingOperator { operator: String, offset: usize },

    #[error("expected an operator at offset {offset}, found '{found}'")]
    MissingOperator { offset: usize, found: String },

    #[error("unmatched '(' at offset {offset}")]
    UnmatchedOpen { offset: usize },

    #[error("unexpected ')' at offset {offset}")]
    UnmatchedClose { offset: usize },

    #[error("unknown target engine '{sigil}@' at offset {offset}")]
    UnknownMatcher { sigil: char, offset: usize },

    #[error("target engine '{sigil}@' at offset {offset} has an empty pattern")]
    EmptyPattern { sigil: char, offset: usize },

    #[error("invalid {matcher} pattern '{pattern}' at offset {offset}: {reason}")]
    InvalidPattern {
        matcher: &'static str,
        pattern: String,
        offset: usize,
        reason: String,
    },

    #[error("unknown nodegroup '{0}'")]
    UnknownNodegroup(String),

    #[error("nodegroup '{0}' is defined in terms of itself")]
    NodegroupCycle(String),

    #[error("nodegroup '{0}' has an empty definition")]
    EmptyNodegroup(String),

    #[error("nodegroup '{name}' at offset {offset} was not expanded before parsing")]
    UnexpandedNodegroup { name: String, offset: usize },
}

// ── Evaluation errors ─────────────────────────────────────────────────────────

/// Failures while evaluating a parsed target.
///
/// Missing or stale metadata is never an error; it only excludes the minion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("range matcher unavailable: no range service configured for 'R@{expr}'")]
    RangeUnavailable { expr: String },

    #[error("range expansion of '{expr}' failed: {reason}")]
    Range { expr: String, reason: String },
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration key/value validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {value}\n\nValid values: {valid}")]
    InvalidValue {
        key: String,
        value: String,
        valid: String,
    },
}
