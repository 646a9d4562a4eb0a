//! GROUP BY / DISTINCT pushdown.
//!
//! After the plan builder has produced a tree for a query, the grouping and
//! deduplication clauses are pushed as far toward the shards as they can go:
//! - into every route, as shard-local `GROUP BY` / `SELECT DISTINCT`;
//! - into ordered aggregates, as the positional grouping key they merge on;
//! - never through cross-shard joins or derived tables, which fail with an
//!   unimplemented error asking the user to rewrite the query.
//!
//! The tree is taken by value and returned rewritten. On error the caller
//! discards it; no pass promises to leave a partly rewritten tree intact.
//!
//! # Submodules
//! - `context` — per-query state and the two dispatch passes
//! - `operators` — per-node-kind rules
//! - `ordinal` — positional column references
//!
//! # Usage
//! ```ignore
//! let mut ctx = PushdownContext::new(&mut symtab);
//! let plan = plan_grouping(&mut ctx, plan, &group_by, select.distinct)?;
//! tracing::info!(?ctx.stats, "grouping planned");
//! ```

pub mod context;
pub mod operators;
pub mod ordinal;

pub use context::{PushdownContext, PushdownStats};

use crate::error::PushdownError;
use crate::plan::{Expr, PlanNode};

/// Plan a `SELECT`'s `GROUP BY` list, then its `DISTINCT` flag, over `root`.
pub fn plan_grouping(
    ctx: &mut PushdownContext<'_>,
    root: PlanNode,
    group_by: &[Expr],
    distinct: bool,
) -> Result<PlanNode, PushdownError> {
    let root = ctx.plan_group_by(root, group_by)?;
    let root = if distinct {
        ctx.plan_distinct(root)?
    } else {
        root
    };

    let stats = ctx.stats;
    tracing::debug!(
        root = %root.id(),
        routes_grouped = stats.routes_grouped,
        routes_made_distinct = stats.routes_made_distinct,
        aggregate_keys_assigned = stats.aggregate_keys_assigned,
        distinct_wrappers_inserted = stats.distinct_wrappers_inserted,
        "grouping pushdown complete"
    );
    Ok(root)
}
