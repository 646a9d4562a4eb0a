//! Cross-shard operators neither clause can be pushed through.

use crate::error::PushdownError;
use crate::plan::{Concatenate, Join, Subquery};

pub fn group_by_join(join: &Join) -> PushdownError {
    tracing::debug!(node = %join.id, "rejected GROUP BY over cross-shard join");
    PushdownError::Unimplemented("unsupported: group by on cross-shard join".into())
}

pub fn distinct_join(join: &Join) -> PushdownError {
    tracing::debug!(node = %join.id, "rejected DISTINCT over cross-shard join");
    PushdownError::Unimplemented("unsupported: distinct on cross-shard join".into())
}

pub fn distinct_subquery(subquery: &Subquery) -> PushdownError {
    tracing::debug!(node = %subquery.id, alias = %subquery.alias, "rejected DISTINCT over cross-shard subquery");
    PushdownError::Unimplemented("unsupported: distinct on cross-shard subquery".into())
}

/// Distinct over a concatenation is never pushed; union-all shapes are
/// expected to be gone before this pass runs.
pub fn distinct_concatenate(concat: &Concatenate) -> PushdownError {
    tracing::debug!(node = %concat.id, sources = concat.sources.len(), "rejected DISTINCT over concatenate");
    PushdownError::Unimplemented("only union-all is supported for this operator".into())
}
