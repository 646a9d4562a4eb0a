//! Plan-tree builders shared by the integration tests.
//!
//! Mirrors what a plan builder does: every node takes the next id from the
//! symbol table, route columns originate at the route and aggregate outputs
//! originate at their ordered aggregate.

#![allow(dead_code)]

use shard_pushdown::plan::{
    Aggregate, AggregateOpcode, ColName, Concatenate, Distinct, Expr, Join, JoinOpcode, Limit,
    Literal, MergeSort, OrderBy, OrderedAggregate, PlanNode, PulloutOpcode, PulloutSubquery,
    ResultColumn, Route, RouteOpcode, Select, SelectExpr, ShardQuery, Subquery, Symtab,
};

#[derive(Default)]
pub struct PlanBuilder {
    pub st: Symtab,
}

pub fn bound(rc: &ResultColumn) -> Expr {
    Expr::Column(ColName {
        qualifier: None,
        name: rc.alias.clone(),
        metadata: Some(rc.column),
    })
}

pub fn ordinal(n: &str) -> Expr {
    Expr::Literal(Literal::int(n))
}

/// Bound reference to the first result column named `alias` at or below `node`.
pub fn col(node: &PlanNode, alias: &str) -> Expr {
    let rc = find(node, alias).unwrap_or_else(|| panic!("no column {alias}"));
    bound(&rc)
}

fn find(node: &PlanNode, alias: &str) -> Option<ResultColumn> {
    if let Some(rc) = node
        .result_columns()
        .and_then(|rcs| rcs.iter().find(|rc| rc.alias == alias))
    {
        return Some(rc.clone());
    }
    node.children().into_iter().find_map(|c| find(c, alias))
}

/// Every route in the tree, in depth-first order.
pub fn routes(node: &PlanNode) -> Vec<&Route> {
    let mut out = Vec::new();
    collect_routes(node, &mut out);
    out
}

fn collect_routes<'a>(node: &'a PlanNode, out: &mut Vec<&'a Route>) {
    if let PlanNode::Route(r) = node {
        out.push(r);
    }
    for child in node.children() {
        collect_routes(child, out);
    }
}

impl PlanBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(&mut self, keyspace: &str, table: &str, cols: &[&str]) -> PlanNode {
        let id = self.st.add_node();
        let result_columns: Vec<ResultColumn> = cols
            .iter()
            .map(|c| ResultColumn {
                alias: c.to_string(),
                column: self.st.add_column(c, id),
            })
            .collect();
        let select = Select {
            distinct: false,
            select_exprs: result_columns
                .iter()
                .map(|rc| SelectExpr {
                    expr: bound(rc),
                    alias: None,
                })
                .collect(),
            from: table.to_string(),
            filter: None,
            group_by: Vec::new(),
        };
        PlanNode::Route(Route {
            id,
            keyspace: keyspace.to_string(),
            opcode: RouteOpcode::Scatter,
            query: ShardQuery::Select(select),
            result_columns,
        })
    }

    pub fn merge_sort(&mut self, input: PlanNode) -> PlanNode {
        PlanNode::MergeSort(MergeSort {
            id: self.st.add_node(),
            order_by: vec![OrderBy { col: 0, desc: false }],
            input: Box::new(input),
        })
    }

    pub fn pullout(&mut self, subquery: PlanNode, underlying: PlanNode) -> PlanNode {
        PlanNode::PulloutSubquery(PulloutSubquery {
            id: self.st.add_node(),
            opcode: PulloutOpcode::Value,
            sq_name: "__sq1".to_string(),
            subquery: Box::new(subquery),
            underlying: Box::new(underlying),
        })
    }

    pub fn join(&mut self, left: PlanNode, right: PlanNode) -> PlanNode {
        PlanNode::Join(Join {
            id: self.st.add_node(),
            opcode: JoinOpcode::Left,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn subquery(&mut self, alias: &str, input: PlanNode) -> PlanNode {
        PlanNode::Subquery(Subquery {
            id: self.st.add_node(),
            alias: alias.to_string(),
            input: Box::new(input),
        })
    }

    pub fn concatenate(&mut self, sources: Vec<PlanNode>) -> PlanNode {
        PlanNode::Concatenate(Concatenate {
            id: self.st.add_node(),
            sources,
        })
    }

    pub fn distinct(&mut self, input: PlanNode) -> PlanNode {
        PlanNode::Distinct(Distinct {
            id: self.st.add_node(),
            input: Box::new(input),
        })
    }

    pub fn limit(&mut self, count: u64, input: PlanNode) -> PlanNode {
        PlanNode::Limit(Limit {
            id: self.st.add_node(),
            count,
            offset: None,
            input: Box::new(input),
        })
    }

    /// Ordered aggregate whose result columns are `columns` in order: names
    /// found below `input` are passed through, any other name is a new
    /// `count` output originating at the aggregate.
    pub fn aggregate(&mut self, input: PlanNode, columns: &[&str]) -> PlanNode {
        let id = self.st.add_node();
        let mut result_columns = Vec::new();
        let mut aggregates = Vec::new();
        for name in columns {
            match find(&input, name) {
                Some(rc) => result_columns.push(rc),
                None => {
                    aggregates.push(Aggregate {
                        opcode: AggregateOpcode::Count,
                        col: result_columns.len(),
                        alias: name.to_string(),
                    });
                    result_columns.push(ResultColumn {
                        alias: name.to_string(),
                        column: self.st.add_column(name, id),
                    });
                }
            }
        }
        PlanNode::OrderedAggregate(OrderedAggregate {
            id,
            result_columns,
            aggregates,
            keys: Vec::new(),
            extra_distinct: None,
            input: Box::new(input),
        })
    }
}
