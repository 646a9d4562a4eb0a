//! Ordered aggregates.
//!
//! An ordered aggregate merges per-shard partial results that arrive sorted
//! on its grouping key. Planning a clause here therefore means two things:
//! record which of its own result columns form the key (`keys`, in merge
//! order), then push the same grouping into its input so the shards emit
//! rows grouped and sorted on those columns.
//!
//! Result columns come in two flavours, told apart by their origin:
//! - origin is an input node: a raw value passed through from the shards;
//! - origin is this aggregate: the output of an aggregate function.
//!
//! Grouping by the second kind is meaningless, and deduplicating over it
//! cannot be expressed as shard-side grouping, so the distinct pass falls
//! back to an explicit [`Distinct`] above the aggregate instead.

use crate::error::PushdownError;
use crate::plan::{Distinct, Expr, GroupBy, OrderedAggregate, PlanNode, SingleInput};
use crate::pushdown::PushdownContext;
use crate::pushdown::ordinal::result_from_number;

/// Plan `group_by` on an ordered aggregate.
///
/// The key list is resolved completely before `keys` is touched, so a
/// failing expression leaves the node as it was. When the aggregate carries
/// an extra distinct expression it is appended after the user keys, folded
/// into `keys` once and pushed down together with them.
pub fn group_by_ordered_aggregate(
    ctx: &mut PushdownContext<'_>,
    mut oa: OrderedAggregate,
    group_by: &[Expr],
) -> Result<OrderedAggregate, PushdownError> {
    let mut working: GroupBy = group_by.to_vec();
    let mut keys = resolve_group_by_keys(ctx, &oa, group_by)?;

    if let Some(extra) = &oa.extra_distinct {
        let pos = resolve_key(ctx, &oa, extra)?;
        if !keys.contains(&pos) {
            keys.push(pos);
            working.push(extra.clone());
        }
    }

    ctx.stats.aggregate_keys_assigned += keys.len();
    tracing::debug!(node = %oa.id, keys = ?keys, "assigned ordered aggregate keys");
    oa.keys.extend(keys);

    oa.rewrite_input(|input| ctx.plan_group_by(input, &working))
}

/// Resolve every `GROUP BY` expression to a position among `oa`'s result
/// columns, in the order given.
pub fn resolve_group_by_keys(
    ctx: &PushdownContext<'_>,
    oa: &OrderedAggregate,
    group_by: &[Expr],
) -> Result<Vec<usize>, PushdownError> {
    group_by
        .iter()
        .map(|expr| resolve_key(ctx, oa, expr))
        .collect()
}

fn resolve_key(
    ctx: &PushdownContext<'_>,
    oa: &OrderedAggregate,
    expr: &Expr,
) -> Result<usize, PushdownError> {
    match expr {
        Expr::Column(col) => {
            let column = ctx.column(col)?;
            if column.originates_at(oa.id) {
                return Err(PushdownError::InvalidArgument(format!(
                    "group by expression cannot reference an aggregate function: {}",
                    expr.to_sql()
                )));
            }
            oa.result_columns
                .iter()
                .position(|rc| rc.column == column.id)
                .ok_or_else(|| {
                    PushdownError::Unimplemented(
                        "unsupported: in scatter query: group by column must reference column in SELECT list"
                            .into(),
                    )
                })
        }
        Expr::Literal(lit) => result_from_number(&oa.result_columns, lit),
        _ => Err(PushdownError::Unimplemented(
            "unsupported: in scatter query: only simple references allowed".into(),
        )),
    }
}

/// Make an ordered aggregate's output distinct.
///
/// Columns are appended to `keys` in order until one turns out to be an
/// aggregate output; at that point the aggregate (with the keys appended so
/// far) is wrapped in a new [`Distinct`] and returned. If no column is an
/// aggregate output, distinctness is grouping on every column and is pushed
/// into the input.
pub fn distinct_ordered_aggregate(
    ctx: &mut PushdownContext<'_>,
    mut oa: OrderedAggregate,
) -> Result<PlanNode, PushdownError> {
    for i in 0..oa.result_columns.len() {
        let origin_is_self = ctx
            .column_by_id(oa.result_columns[i].column)?
            .originates_at(oa.id);
        if origin_is_self {
            let id = ctx.next_node_id();
            ctx.stats.distinct_wrappers_inserted += 1;
            tracing::debug!(
                node = %oa.id,
                wrapper = %id,
                column = %oa.result_columns[i].alias,
                "aggregate output blocks DISTINCT pushdown; inserted distinct"
            );
            return Ok(PlanNode::Distinct(Distinct {
                id,
                input: Box::new(PlanNode::OrderedAggregate(oa)),
            }));
        }
        oa.keys.push(i);
        ctx.stats.aggregate_keys_assigned += 1;
    }

    tracing::debug!(node = %oa.id, keys = ?oa.keys, "DISTINCT folded into ordered aggregate keys");
    let oa = oa.rewrite_input(|input| ctx.plan_distinct(input))?;
    Ok(PlanNode::OrderedAggregate(oa))
}
