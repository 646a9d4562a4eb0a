//! shard_pushdown — GROUP BY / DISTINCT pushdown for a sharded SQL planner.
//!
//! A query over a sharded keyspace is planned into a tree of [`plan::PlanNode`]s:
//! routes send SQL to the shards, and cross-shard operators merge, join or
//! aggregate what comes back. This crate rewrites such a tree so that the
//! query's grouping and deduplication run on the shards wherever the tree
//! shape allows it, and rejects the shapes where it cannot be done correctly.
//!
//! # Modules
//! - [`plan`] — the plan tree, expressions and the symbol table
//! - [`pushdown`] — the two passes and their entry point [`pushdown::plan_grouping`]
//! - [`config`] — TOML configuration with bounds checking
//! - [`error`] — error types
//! - [`logging`] — subscriber setup for binaries

pub mod config;
pub mod error;
pub mod logging;
pub mod plan;
pub mod pushdown;

pub use error::{PushdownError, PushdownErrorKind};
pub use plan::{PlanNode, SymbolTable, Symtab};
pub use pushdown::{PushdownContext, PushdownStats, plan_grouping};
