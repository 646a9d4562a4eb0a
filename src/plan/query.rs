//! The shard-local query a route sends verbatim to its shards.

use crate::plan::expr::{Expr, GroupBy, group_by_to_sql};
use serde::{Deserialize, Serialize};

/// One projected expression of a shard-local `SELECT`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectExpr {
    pub expr: Expr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl SelectExpr {
    pub fn to_sql(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{} AS {alias}", self.expr.to_sql()),
            None => self.expr.to_sql(),
        }
    }
}

/// A shard-local `SELECT`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Select {
    #[serde(default)]
    pub distinct: bool,
    pub select_exprs: Vec<SelectExpr>,
    pub from: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Expr>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group_by: GroupBy,
}

impl Select {
    pub fn to_sql(&self) -> String {
        let mut sql = String::from("SELECT ");
        if self.distinct {
            sql.push_str("DISTINCT ");
        }
        let exprs: Vec<String> = self.select_exprs.iter().map(SelectExpr::to_sql).collect();
        sql.push_str(&exprs.join(", "));
        sql.push_str(" FROM ");
        sql.push_str(&self.from);
        if let Some(filter) = &self.filter {
            sql.push_str(" WHERE ");
            sql.push_str(&filter.to_sql());
        }
        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&group_by_to_sql(&self.group_by));
        }
        sql
    }
}

/// A `UNION` of shard-local selects that can be merged on one shard set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Union {
    pub selects: Vec<Select>,
    /// `UNION` when true, `UNION ALL` otherwise.
    #[serde(default)]
    pub distinct: bool,
}

impl Union {
    pub fn to_sql(&self) -> String {
        let sep = if self.distinct { " UNION " } else { " UNION ALL " };
        self.selects
            .iter()
            .map(Select::to_sql)
            .collect::<Vec<_>>()
            .join(sep)
    }
}

/// The statement owned by a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShardQuery {
    Select(Select),
    Union(Union),
}

impl ShardQuery {
    /// Make the statement's output distinct.
    pub fn make_distinct(&mut self) {
        match self {
            ShardQuery::Select(select) => select.distinct = true,
            ShardQuery::Union(union) => union.distinct = true,
        }
    }

    pub fn is_distinct(&self) -> bool {
        match self {
            ShardQuery::Select(select) => select.distinct,
            ShardQuery::Union(union) => union.distinct,
        }
    }

    /// The statement as a plain `SELECT`, if it is one.
    pub fn as_select_mut(&mut self) -> Option<&mut Select> {
        match self {
            ShardQuery::Select(select) => Some(select),
            ShardQuery::Union(_) => None,
        }
    }

    pub fn as_select(&self) -> Option<&Select> {
        match self {
            ShardQuery::Select(select) => Some(select),
            ShardQuery::Union(_) => None,
        }
    }

    pub fn to_sql(&self) -> String {
        match self {
            ShardQuery::Select(select) => select.to_sql(),
            ShardQuery::Union(union) => union.to_sql(),
        }
    }
}
