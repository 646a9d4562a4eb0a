//! Merge sorts and pulled-out subqueries.
//!
//! Neither makes a decision of its own: the clause is pushed into the
//! rewritable child and the node is returned with that child replaced.
//! A pullout's subquery side is never touched.

use crate::error::PushdownError;
use crate::plan::{Expr, SingleInput};
use crate::pushdown::PushdownContext;

pub fn group_by_passthrough<N: SingleInput>(
    ctx: &mut PushdownContext<'_>,
    node: N,
    group_by: &[Expr],
) -> Result<N, PushdownError> {
    node.rewrite_input(|input| ctx.plan_group_by(input, group_by))
}

pub fn distinct_passthrough<N: SingleInput>(
    ctx: &mut PushdownContext<'_>,
    node: N,
) -> Result<N, PushdownError> {
    node.rewrite_input(|input| ctx.plan_distinct(input))
}
