//! Plan tree representation consumed by the pushdown pass.
//!
//! The plan builder produces a [`PlanNode`] tree for one query. Every node
//! owns its children; the only references that point back up the tree are the
//! [`NodeId`] origins stored in the symbol table.
//!
//! Node kinds fall into a few groups:
//! - **passthrough** — [`MergeSort`], [`PulloutSubquery`]: one rewritable
//!   child, the clause is pushed further down before any local decision.
//! - **shard-local** — [`Route`]: owns the query text sent to the shards.
//! - **cross-shard operators** — [`OrderedAggregate`], [`Join`],
//!   [`Subquery`], [`Concatenate`], [`Distinct`].
//! - **late operators** — [`Limit`], [`MemorySort`]: added by the builder
//!   after grouping has been planned.

pub mod expr;
pub mod query;
pub mod symtab;

pub use expr::{ColName, Expr, GroupBy, Literal, LiteralKind};
pub use query::{Select, SelectExpr, ShardQuery, Union};
pub use symtab::{Column, ColumnId, NodeId, SymbolTable, Symtab};

use serde::{Deserialize, Serialize};

/// An output column of a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultColumn {
    pub alias: String,
    /// Identity in the symbol table; the symbol table also knows its origin.
    pub column: ColumnId,
}

/// How a route picks its shards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteOpcode {
    Unsharded,
    EqualUnique,
    Equal,
    In,
    Scatter,
}

impl RouteOpcode {
    pub fn name(&self) -> &'static str {
        match self {
            RouteOpcode::Unsharded => "unsharded",
            RouteOpcode::EqualUnique => "equal_unique",
            RouteOpcode::Equal => "equal",
            RouteOpcode::In => "in",
            RouteOpcode::Scatter => "scatter",
        }
    }
}

/// A query sent verbatim to a keyspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub id: NodeId,
    pub keyspace: String,
    pub opcode: RouteOpcode,
    pub query: ShardQuery,
    pub result_columns: Vec<ResultColumn>,
}

/// One ordering key of a merge or in-memory sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    /// Position among the input's result columns.
    pub col: usize,
    #[serde(default)]
    pub desc: bool,
}

/// Merges already-sorted shard streams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeSort {
    pub id: NodeId,
    pub order_by: Vec<OrderBy>,
    pub input: Box<PlanNode>,
}

/// How a pulled-out subquery result is fed to the outer query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PulloutOpcode {
    Value,
    In,
    NotIn,
    Exists,
}

/// Runs `subquery` first, then the `underlying` plan with its result bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PulloutSubquery {
    pub id: NodeId,
    pub opcode: PulloutOpcode,
    /// Bind variable name carrying the subquery result.
    pub sq_name: String,
    pub subquery: Box<PlanNode>,
    pub underlying: Box<PlanNode>,
}

/// Aggregate function evaluated by an [`OrderedAggregate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateOpcode {
    Count,
    Sum,
    Min,
    Max,
    CountDistinct,
    SumDistinct,
}

impl AggregateOpcode {
    pub fn name(&self) -> &'static str {
        match self {
            AggregateOpcode::Count => "count",
            AggregateOpcode::Sum => "sum",
            AggregateOpcode::Min => "min",
            AggregateOpcode::Max => "max",
            AggregateOpcode::CountDistinct => "count_distinct",
            AggregateOpcode::SumDistinct => "sum_distinct",
        }
    }
}

/// One aggregate computed over position `col` of the result columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregate {
    pub opcode: AggregateOpcode,
    pub col: usize,
    pub alias: String,
}

/// Streaming cross-shard aggregation over input sorted on `keys`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedAggregate {
    pub id: NodeId,
    pub result_columns: Vec<ResultColumn>,
    #[serde(default)]
    pub aggregates: Vec<Aggregate>,
    /// Positions among `result_columns` forming the grouping key, in merge order.
    #[serde(default)]
    pub keys: Vec<usize>,
    /// Argument of a single distinct aggregate, which must also be grouped on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_distinct: Option<Expr>,
    pub input: Box<PlanNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinOpcode {
    Inner,
    Left,
}

/// A join evaluated across shards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Join {
    pub id: NodeId,
    pub opcode: JoinOpcode,
    pub left: Box<PlanNode>,
    pub right: Box<PlanNode>,
}

/// A derived table whose body could not be merged into one route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subquery {
    pub id: NodeId,
    pub alias: String,
    pub input: Box<PlanNode>,
}

/// Appends the rows of every source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concatenate {
    pub id: NodeId,
    pub sources: Vec<PlanNode>,
}

/// Explicit cross-shard deduplication of its input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distinct {
    pub id: NodeId,
    pub input: Box<PlanNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limit {
    pub id: NodeId,
    pub count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    pub input: Box<PlanNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySort {
    pub id: NodeId,
    pub order_by: Vec<OrderBy>,
    pub input: Box<PlanNode>,
}

/// The plan tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanNode {
    MergeSort(MergeSort),
    PulloutSubquery(PulloutSubquery),
    Route(Route),
    OrderedAggregate(OrderedAggregate),
    Join(Join),
    Subquery(Subquery),
    Concatenate(Concatenate),
    Distinct(Distinct),
    Limit(Limit),
    MemorySort(MemorySort),
}

/// A node with exactly one child slot the pushdown pass may replace.
///
/// Other children (e.g. the subquery side of a pullout) stay untouched.
pub trait SingleInput: Sized {
    fn input(&self) -> &PlanNode;

    /// Replace the rewritable child with `f(child)`.
    fn rewrite_input<E, F>(self, f: F) -> Result<Self, E>
    where
        F: FnOnce(PlanNode) -> Result<PlanNode, E>;
}

macro_rules! single_input {
    ($ty:ty, $field:ident) => {
        impl SingleInput for $ty {
            fn input(&self) -> &PlanNode {
                &self.$field
            }

            fn rewrite_input<E, F>(mut self, f: F) -> Result<Self, E>
            where
                F: FnOnce(PlanNode) -> Result<PlanNode, E>,
            {
                self.$field = Box::new(f(*self.$field)?);
                Ok(self)
            }
        }
    };
}

single_input!(MergeSort, input);
single_input!(PulloutSubquery, underlying);
single_input!(OrderedAggregate, input);
single_input!(Subquery, input);
single_input!(Distinct, input);
single_input!(Limit, input);
single_input!(MemorySort, input);

impl PlanNode {
    pub fn id(&self) -> NodeId {
        match self {
            PlanNode::MergeSort(n) => n.id,
            PlanNode::PulloutSubquery(n) => n.id,
            PlanNode::Route(n) => n.id,
            PlanNode::OrderedAggregate(n) => n.id,
            PlanNode::Join(n) => n.id,
            PlanNode::Subquery(n) => n.id,
            PlanNode::Concatenate(n) => n.id,
            PlanNode::Distinct(n) => n.id,
            PlanNode::Limit(n) => n.id,
            PlanNode::MemorySort(n) => n.id,
        }
    }

    /// Return a human-readable name for this node kind (used in error messages).
    pub fn node_kind(&self) -> &'static str {
        match self {
            PlanNode::MergeSort(_) => "merge_sort",
            PlanNode::PulloutSubquery(_) => "pullout_subquery",
            PlanNode::Route(_) => "route",
            PlanNode::OrderedAggregate(_) => "ordered_aggregate",
            PlanNode::Join(_) => "join",
            PlanNode::Subquery(_) => "subquery",
            PlanNode::Concatenate(_) => "concatenate",
            PlanNode::Distinct(_) => "distinct",
            PlanNode::Limit(_) => "limit",
            PlanNode::MemorySort(_) => "memory_sort",
        }
    }

    /// Direct children, left to right.
    pub fn children(&self) -> Vec<&PlanNode> {
        match self {
            PlanNode::Route(_) => Vec::new(),
            PlanNode::MergeSort(n) => vec![n.input()],
            PlanNode::OrderedAggregate(n) => vec![n.input()],
            PlanNode::Subquery(n) => vec![n.input()],
            PlanNode::Distinct(n) => vec![n.input()],
            PlanNode::Limit(n) => vec![n.input()],
            PlanNode::MemorySort(n) => vec![n.input()],
            PlanNode::PulloutSubquery(n) => vec![&*n.underlying, &*n.subquery],
            PlanNode::Join(n) => vec![&*n.left, &*n.right],
            PlanNode::Concatenate(n) => n.sources.iter().collect(),
        }
    }

    /// Output columns, for kinds that track them.
    pub fn result_columns(&self) -> Option<&[ResultColumn]> {
        match self {
            PlanNode::Route(n) => Some(&n.result_columns),
            PlanNode::OrderedAggregate(n) => Some(&n.result_columns),
            _ => None,
        }
    }

    /// Number of nodes in the tree rooted here.
    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .into_iter()
            .map(PlanNode::node_count)
            .sum::<usize>()
    }

    /// Find a node by id anywhere in the tree.
    pub fn find(&self, id: NodeId) -> Option<&PlanNode> {
        if self.id() == id {
            return Some(self);
        }
        self.children().into_iter().find_map(|c| c.find(id))
    }

    /// Render the tree, one node per line, children indented.
    pub fn explain(&self) -> String {
        let mut out = String::new();
        self.explain_into(0, &mut out);
        out
    }

    fn explain_into(&self, depth: usize, out: &mut String) {
        out.push_str(&"  ".repeat(depth));
        out.push_str(&format!("{} {}", self.node_kind(), self.id()));
        match self {
            PlanNode::Route(r) => {
                out.push_str(&format!(
                    " {}:{} \"{}\"",
                    r.keyspace,
                    r.opcode.name(),
                    r.query.to_sql()
                ));
            }
            PlanNode::OrderedAggregate(oa) => {
                out.push_str(&format!(" keys={:?}", oa.keys));
                if !oa.aggregates.is_empty() {
                    let aggs: Vec<String> = oa
                        .aggregates
                        .iter()
                        .map(|a| format!("{}({})", a.opcode.name(), a.col))
                        .collect();
                    out.push_str(&format!(" aggregates=[{}]", aggs.join(", ")));
                }
            }
            PlanNode::Join(j) => out.push_str(&format!(" {:?}", j.opcode).to_lowercase()),
            PlanNode::Subquery(s) => out.push_str(&format!(" {}", s.alias)),
            PlanNode::Limit(l) => out.push_str(&format!(" count={}", l.count)),
            _ => {}
        }
        out.push('\n');
        for child in self.children() {
            child.explain_into(depth + 1, out);
        }
    }
}
