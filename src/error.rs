//! Error types for the pushdown pass.
//!
//! All planning failures are represented by [`PushdownError`]. Errors are
//! propagated via `Result<T, PushdownError>` through every pass and surfaced
//! to the plan builder, which rejects the query before any shard I/O happens.
//!
//! # Error Classification
//!
//! - **InvalidArgument** — the query breaks a planner rule (e.g. grouping by
//!   an aggregate output). The issuer must rewrite the query.
//! - **Unimplemented** — valid SQL whose shape cannot be pushed into a sharded
//!   plan (cross-shard join/subquery/concatenate, complex `GROUP BY`
//!   expressions, grouping columns missing from the select list).
//! - **Internal** — an unreachable plan shape. Always a planner defect and
//!   reported separately for alerting.
//!
//! Nothing here is retried: a failed planning attempt discards the tree.

use std::fmt;

/// Primary error type for the pushdown pass.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PushdownError {
    // ── User errors — the query itself is malformed ──────────────────────
    /// The query violates a planner rule.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    // ── Unsupported shapes — valid SQL, not plannable across shards ──────
    /// The query shape cannot be pushed into a sharded execution plan.
    #[error("unimplemented: {0}")]
    Unimplemented(String),

    // ── Internal errors — should not happen ──────────────────────────────
    /// A plan invariant was violated. Indicates a bug.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PushdownError {
    /// Whether the planner could succeed by retrying the same query.
    ///
    /// Planning is deterministic, so this is always `false`.
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// Whether the issuer can get past this error by rewriting the query.
    pub fn requires_query_rewrite(&self) -> bool {
        matches!(
            self,
            PushdownError::InvalidArgument(_) | PushdownError::Unimplemented(_)
        )
    }

    /// Whether this error signals a planner defect rather than bad input.
    pub fn is_internal(&self) -> bool {
        matches!(self, PushdownError::Internal(_))
    }

    /// The human-readable detail without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            PushdownError::InvalidArgument(msg)
            | PushdownError::Unimplemented(msg)
            | PushdownError::Internal(msg) => msg,
        }
    }
}

/// Classification of an error for callers and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PushdownErrorKind {
    InvalidArgument,
    Unimplemented,
    Internal,
}

impl fmt::Display for PushdownErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushdownErrorKind::InvalidArgument => write!(f, "INVALID_ARGUMENT"),
            PushdownErrorKind::Unimplemented => write!(f, "UNIMPLEMENTED"),
            PushdownErrorKind::Internal => write!(f, "INTERNAL"),
        }
    }
}

impl PushdownError {
    /// Classify the error.
    pub fn kind(&self) -> PushdownErrorKind {
        match self {
            PushdownError::InvalidArgument(_) => PushdownErrorKind::InvalidArgument,
            PushdownError::Unimplemented(_) => PushdownErrorKind::Unimplemented,
            PushdownError::Internal(_) => PushdownErrorKind::Internal,
        }
    }
}

// ── Configuration errors ───────────────────────────────────────────────────

/// Errors raised while loading [`crate::config::Config`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The configuration text is not valid TOML for the expected schema.
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A setting is outside its allowed range.
    #[error("setting {name} = {value} is out of range [{min}, {max}]")]
    OutOfRange {
        name: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// A setting has a value that is not one of the accepted choices.
    #[error("setting {name} has unsupported value '{value}'")]
    InvalidChoice { name: &'static str, value: String },
}
