//! Already-parsed SQL expressions as the pushdown pass sees them.

use crate::plan::symtab::ColumnId;
use serde::{Deserialize, Serialize};

/// A column reference, optionally bound to symbol-table metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColName {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<String>,
    pub name: String,
    /// Set by the plan builder once the reference is resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ColumnId>,
}

impl ColName {
    pub fn to_sql(&self) -> String {
        match &self.qualifier {
            Some(q) => format!("{q}.{}", self.name),
            None => self.name.clone(),
        }
    }
}

/// Lexical type of a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiteralKind {
    Int,
    Float,
    Str,
}

/// A literal value kept in its source spelling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Literal {
    pub kind: LiteralKind,
    pub val: String,
}

impl Literal {
    pub fn int(val: impl Into<String>) -> Self {
        Self {
            kind: LiteralKind::Int,
            val: val.into(),
        }
    }

    pub fn to_sql(&self) -> String {
        match self.kind {
            LiteralKind::Str => format!("'{}'", self.val.replace('\'', "''")),
            LiteralKind::Int | LiteralKind::Float => self.val.clone(),
        }
    }
}

/// A SQL expression (simplified representation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    /// `table.column` or `column`.
    Column(ColName),
    /// A literal value.
    Literal(Literal),
    /// `left op right`.
    BinaryOp {
        op: String,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `func(args...)`, including aggregate calls.
    FuncCall { name: String, args: Vec<Expr> },
    /// `*`.
    Star,
}

impl Expr {
    /// Convert expression back to SQL text.
    pub fn to_sql(&self) -> String {
        match self {
            Expr::Column(col) => col.to_sql(),
            Expr::Literal(lit) => lit.to_sql(),
            Expr::BinaryOp { op, left, right } => {
                format!("{} {op} {}", left.to_sql(), right.to_sql())
            }
            Expr::FuncCall { name, args } => {
                let args: Vec<String> = args.iter().map(Expr::to_sql).collect();
                format!("{name}({})", args.join(", "))
            }
            Expr::Star => "*".to_string(),
        }
    }
}

/// A `GROUP BY` list in source order.
pub type GroupBy = Vec<Expr>;

/// Render a `GROUP BY` list as comma-separated SQL.
pub fn group_by_to_sql(group_by: &[Expr]) -> String {
    group_by
        .iter()
        .map(Expr::to_sql)
        .collect::<Vec<_>>()
        .join(", ")
}
