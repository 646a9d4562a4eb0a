//! Shared test helpers for pushdown unit tests.
//!
//! Builders allocate node ids from the [`Symtab`] in construction order, so
//! a child built first always has the smaller id. Route columns originate at
//! the route; aggregate outputs originate at their ordered aggregate.

use crate::plan::{
    Aggregate, AggregateOpcode, ColName, Concatenate, Distinct, Expr, Join, JoinOpcode, Limit,
    Literal, MemorySort, MergeSort, OrderBy, OrderedAggregate, PlanNode, PulloutOpcode,
    PulloutSubquery, ResultColumn, Route, RouteOpcode, Select, SelectExpr, ShardQuery, Subquery,
    Symtab, Union,
};

// ── Expression builders ─────────────────────────────────────────────────

/// A column reference with no symbol-table binding.
pub fn unbound_col(name: &str) -> Expr {
    Expr::Column(ColName {
        qualifier: None,
        name: name.to_string(),
        metadata: None,
    })
}

/// An integer literal.
pub fn lit(val: &str) -> Expr {
    Expr::Literal(Literal::int(val))
}

pub fn func(name: &str, args: Vec<Expr>) -> Expr {
    Expr::FuncCall {
        name: name.to_string(),
        args,
    }
}

/// A bound reference to the result column `alias` of `node` or one of its
/// descendants.
pub fn col_of(node: &PlanNode, alias: &str) -> Expr {
    let rc = find_result_column(node, alias)
        .unwrap_or_else(|| panic!("no result column {alias} under {}", node.node_kind()));
    Expr::Column(ColName {
        qualifier: None,
        name: rc.alias.clone(),
        metadata: Some(rc.column),
    })
}

fn find_result_column<'a>(node: &'a PlanNode, alias: &str) -> Option<&'a ResultColumn> {
    if let Some(rc) = node
        .result_columns()
        .and_then(|rcs| rcs.iter().find(|rc| rc.alias == alias))
    {
        return Some(rc);
    }
    node.children()
        .into_iter()
        .find_map(|c| find_result_column(c, alias))
}

// ── Plan node builders ──────────────────────────────────────────────────

fn select(table: &str, cols: &[&str], st_cols: &[ResultColumn]) -> Select {
    Select {
        distinct: false,
        select_exprs: cols
            .iter()
            .zip(st_cols)
            .map(|(name, rc)| SelectExpr {
                expr: Expr::Column(ColName {
                    qualifier: None,
                    name: name.to_string(),
                    metadata: Some(rc.column),
                }),
                alias: None,
            })
            .collect(),
        from: table.to_string(),
        filter: None,
        group_by: Vec::new(),
    }
}

fn route_columns(st: &mut Symtab, route: crate::plan::NodeId, cols: &[&str]) -> Vec<ResultColumn> {
    cols.iter()
        .map(|name| ResultColumn {
            alias: name.to_string(),
            column: st.add_column(name, route),
        })
        .collect()
}

/// Scatter route in keyspace `ks` running `SELECT cols FROM table`.
pub fn route(st: &mut Symtab, table: &str, cols: &[&str]) -> PlanNode {
    let id = st.add_node();
    let result_columns = route_columns(st, id, cols);
    PlanNode::Route(Route {
        id,
        keyspace: "ks".to_string(),
        opcode: RouteOpcode::Scatter,
        query: ShardQuery::Select(select(table, cols, &result_columns)),
        result_columns,
    })
}

/// Scatter route running `SELECT cols FROM t1 UNION ALL SELECT cols FROM t2 ...`.
pub fn union_route(st: &mut Symtab, tables: &[&str], cols: &[&str]) -> PlanNode {
    let id = st.add_node();
    let result_columns = route_columns(st, id, cols);
    let selects = tables
        .iter()
        .map(|t| select(t, cols, &result_columns))
        .collect();
    PlanNode::Route(Route {
        id,
        keyspace: "ks".to_string(),
        opcode: RouteOpcode::Scatter,
        query: ShardQuery::Union(Union {
            selects,
            distinct: false,
        }),
        result_columns,
    })
}

pub fn merge_sort(st: &mut Symtab, input: PlanNode) -> PlanNode {
    PlanNode::MergeSort(MergeSort {
        id: st.add_node(),
        order_by: vec![OrderBy { col: 0, desc: false }],
        input: Box::new(input),
    })
}

pub fn pullout(st: &mut Symtab, subquery: PlanNode, underlying: PlanNode) -> PlanNode {
    PlanNode::PulloutSubquery(PulloutSubquery {
        id: st.add_node(),
        opcode: PulloutOpcode::In,
        sq_name: "__sq1".to_string(),
        subquery: Box::new(subquery),
        underlying: Box::new(underlying),
    })
}

pub fn join(st: &mut Symtab, left: PlanNode, right: PlanNode) -> PlanNode {
    PlanNode::Join(Join {
        id: st.add_node(),
        opcode: JoinOpcode::Inner,
        left: Box::new(left),
        right: Box::new(right),
    })
}

pub fn subquery_node(st: &mut Symtab, alias: &str, input: PlanNode) -> PlanNode {
    PlanNode::Subquery(Subquery {
        id: st.add_node(),
        alias: alias.to_string(),
        input: Box::new(input),
    })
}

pub fn concatenate(st: &mut Symtab, sources: Vec<PlanNode>) -> PlanNode {
    PlanNode::Concatenate(Concatenate {
        id: st.add_node(),
        sources,
    })
}

pub fn distinct_node(st: &mut Symtab, input: PlanNode) -> PlanNode {
    PlanNode::Distinct(Distinct {
        id: st.add_node(),
        input: Box::new(input),
    })
}

pub fn limit(st: &mut Symtab, count: u64, input: PlanNode) -> PlanNode {
    PlanNode::Limit(Limit {
        id: st.add_node(),
        count,
        offset: None,
        input: Box::new(input),
    })
}

pub fn memory_sort(st: &mut Symtab, input: PlanNode) -> PlanNode {
    PlanNode::MemorySort(MemorySort {
        id: st.add_node(),
        order_by: vec![OrderBy { col: 0, desc: true }],
        input: Box::new(input),
    })
}

/// Ordered aggregate over `input`.
///
/// `passthrough` names input columns (looked up anywhere below `input`) that
/// are re-exposed unchanged; `aggs` names new aggregate outputs, registered
/// with this node as origin. Returns the node and a bound reference to each
/// result column, passthrough first.
pub fn ordered_aggregate(
    st: &mut Symtab,
    input: PlanNode,
    passthrough: &[&str],
    aggs: &[&str],
) -> (PlanNode, Vec<Expr>) {
    let id = st.add_node();
    let mut result_columns: Vec<ResultColumn> = passthrough
        .iter()
        .map(|name| {
            find_result_column(&input, name)
                .unwrap_or_else(|| panic!("no input column {name}"))
                .clone()
        })
        .collect();

    let mut aggregates = Vec::new();
    for name in aggs {
        let opcode = if name.starts_with("sum") {
            AggregateOpcode::Sum
        } else {
            AggregateOpcode::Count
        };
        aggregates.push(Aggregate {
            opcode,
            col: result_columns.len(),
            alias: name.to_string(),
        });
        result_columns.push(ResultColumn {
            alias: name.to_string(),
            column: st.add_column(name, id),
        });
    }

    let refs = result_columns
        .iter()
        .map(|rc| {
            Expr::Column(ColName {
                qualifier: None,
                name: rc.alias.clone(),
                metadata: Some(rc.column),
            })
        })
        .collect();

    let node = PlanNode::OrderedAggregate(OrderedAggregate {
        id,
        result_columns,
        aggregates,
        keys: Vec::new(),
        extra_distinct: None,
        input: Box::new(input),
    });
    (node, refs)
}

/// SQL of the first route reached by following first children.
pub fn route_sql(node: &PlanNode) -> String {
    match node {
        PlanNode::Route(r) => r.query.to_sql(),
        other => {
            let child = other
                .children()
                .into_iter()
                .next()
                .unwrap_or_else(|| panic!("{} has no children", other.node_kind()));
            route_sql(child)
        }
    }
}
