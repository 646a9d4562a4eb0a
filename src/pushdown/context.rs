//! Pass dispatch.
//!
//! [`PushdownContext`] walks the plan tree top-down. Each pass is a single
//! `match` over [`PlanNode`] that hands the concrete node to its operator
//! module and maps every kind the pass does not expect to an internal error.

use crate::config::PlannerConfig;
use crate::error::PushdownError;
use crate::plan::{ColName, Column, ColumnId, Expr, NodeId, PlanNode, SymbolTable};
use crate::pushdown::operators;

/// Counters describing what a run of the passes rewrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushdownStats {
    /// Routes whose shard query received a `GROUP BY`.
    pub routes_grouped: usize,
    /// Routes whose shard query was made distinct.
    pub routes_made_distinct: usize,
    /// Positions appended to ordered-aggregate keys.
    pub aggregate_keys_assigned: usize,
    /// Distinct nodes inserted above an ordered aggregate.
    pub distinct_wrappers_inserted: usize,
}

/// State shared by both passes for one query.
pub struct PushdownContext<'a> {
    symtab: &'a mut dyn SymbolTable,
    pub config: PlannerConfig,
    /// Current recursion depth.
    depth: usize,
    pub stats: PushdownStats,
}

impl<'a> PushdownContext<'a> {
    /// Create a context with the default [`PlannerConfig`].
    pub fn new(symtab: &'a mut dyn SymbolTable) -> Self {
        PushdownContext {
            symtab,
            config: PlannerConfig::default(),
            depth: 0,
            stats: PushdownStats::default(),
        }
    }

    pub fn with_config(mut self, config: PlannerConfig) -> Self {
        self.config = config;
        self
    }

    /// Resolve the metadata attached to a column reference.
    pub fn column(&self, col: &ColName) -> Result<&Column, PushdownError> {
        let Some(id) = col.metadata else {
            return Err(PushdownError::Internal(format!(
                "column reference {} has no metadata",
                col.to_sql()
            )));
        };
        self.column_by_id(id)
    }

    /// Look up a column by identity.
    pub fn column_by_id(&self, id: ColumnId) -> Result<&Column, PushdownError> {
        self.symtab.column(id).ok_or_else(|| {
            PushdownError::Internal(format!("column {} is not in the symbol table", id.0))
        })
    }

    /// Allocate an id for a node created by a pass.
    pub fn next_node_id(&mut self) -> NodeId {
        self.symtab.next_node_id()
    }

    fn enter(&mut self, node: &PlanNode) -> Result<(), PushdownError> {
        if self.depth >= self.config.max_plan_depth {
            return Err(PushdownError::Internal(format!(
                "plan tree exceeds maximum depth {} at {} {}",
                self.config.max_plan_depth,
                node.node_kind(),
                node.id()
            )));
        }
        self.depth += 1;
        Ok(())
    }

    /// Push `group_by` as far down `node` as it can go.
    ///
    /// An empty list leaves everything but an ordered aggregate untouched:
    /// the aggregate still has to be visited so its keys are assigned
    /// explicitly.
    pub fn plan_group_by(
        &mut self,
        node: PlanNode,
        group_by: &[Expr],
    ) -> Result<PlanNode, PushdownError> {
        if group_by.is_empty() && !matches!(node, PlanNode::OrderedAggregate(_)) {
            return Ok(node);
        }

        self.enter(&node)?;
        tracing::trace!(node = %node.id(), kind = node.node_kind(), "group_by visit");
        let result = match node {
            PlanNode::MergeSort(n) => {
                operators::passthrough::group_by_passthrough(self, n, group_by)
                    .map(PlanNode::MergeSort)
            }
            PlanNode::PulloutSubquery(n) => {
                operators::passthrough::group_by_passthrough(self, n, group_by)
                    .map(PlanNode::PulloutSubquery)
            }
            PlanNode::Route(n) => {
                operators::route::group_by_route(self, n, group_by).map(PlanNode::Route)
            }
            PlanNode::OrderedAggregate(n) => {
                operators::ordered_aggregate::group_by_ordered_aggregate(self, n, group_by)
                    .map(PlanNode::OrderedAggregate)
            }
            PlanNode::Join(n) => Err(operators::cross_shard::group_by_join(&n)),
            other => Err(PushdownError::Internal(format!(
                "{}.group_by: unreachable",
                other.node_kind()
            ))),
        };
        self.depth -= 1;
        result
    }

    /// Make the output of `node` distinct.
    pub fn plan_distinct(&mut self, node: PlanNode) -> Result<PlanNode, PushdownError> {
        self.enter(&node)?;
        tracing::trace!(node = %node.id(), kind = node.node_kind(), "distinct visit");
        let result = match node {
            PlanNode::MergeSort(n) => {
                operators::passthrough::distinct_passthrough(self, n).map(PlanNode::MergeSort)
            }
            PlanNode::PulloutSubquery(n) => {
                operators::passthrough::distinct_passthrough(self, n)
                    .map(PlanNode::PulloutSubquery)
            }
            PlanNode::Route(n) => operators::route::distinct_route(self, n).map(PlanNode::Route),
            PlanNode::OrderedAggregate(n) => {
                operators::ordered_aggregate::distinct_ordered_aggregate(self, n)
            }
            PlanNode::Subquery(n) => Err(operators::cross_shard::distinct_subquery(&n)),
            PlanNode::Concatenate(n) => Err(operators::cross_shard::distinct_concatenate(&n)),
            PlanNode::Join(n) => Err(operators::cross_shard::distinct_join(&n)),
            PlanNode::Distinct(n) => Ok(PlanNode::Distinct(n)),
            other => Err(PushdownError::Internal(format!(
                "{}.distinct: unreachable",
                other.node_kind()
            ))),
        };
        self.depth -= 1;
        result
    }
}
