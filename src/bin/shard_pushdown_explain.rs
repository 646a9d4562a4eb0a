//! Run grouping pushdown over a serialized plan and print the result.
//!
//! Input is a JSON document:
//! `{ "symtab": ..., "plan": ..., "group_by": [...], "distinct": bool }`.
//!
//! Exit status: 0 on success, 1 when the query is rejected (invalid argument
//! or unsupported shape), 2 on an internal error, 3 when the input or
//! configuration cannot be read.

use clap::Parser;
use serde::Deserialize;
use shard_pushdown::config::{Config, ENV_MAX_PLAN_DEPTH};
use shard_pushdown::error::ConfigError;
use shard_pushdown::plan::Expr;
use shard_pushdown::{PlanNode, PushdownContext, PushdownError, Symtab, logging, plan_grouping};
use std::path::PathBuf;
use std::process;

#[derive(Debug, Parser)]
#[command(name = "shard_pushdown_explain", version, about)]
struct Args {
    /// Plan document to read (`-` for stdin).
    input: PathBuf,

    /// TOML configuration file.
    #[arg(short, long, env = "SHARD_PUSHDOWN_CONFIG")]
    config: Option<PathBuf>,

    /// Print the rewritten plan as JSON instead of the explain text.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ExplainRequest {
    symtab: Symtab,
    plan: PlanNode,
    #[serde(default)]
    group_by: Vec<Expr>,
    #[serde(default)]
    distinct: bool,
}

#[derive(Debug, thiserror::Error)]
enum ExplainError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("malformed plan document: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{}: {}", .0.kind(), .0.message())]
    Plan(#[from] PushdownError),
}

impl ExplainError {
    fn exit_code(&self) -> i32 {
        match self {
            ExplainError::Plan(e) if e.is_internal() => 2,
            ExplainError::Plan(_) => 1,
            _ => 3,
        }
    }
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("{e}");
        process::exit(e.exit_code());
    }
}

fn load_config(args: &Args) -> Result<Config, ExplainError> {
    match &args.config {
        Some(path) => Ok(Config::load(path)?),
        None => {
            let mut config = Config::default();
            config.apply_env_overrides(|key| std::env::var(key).ok())?;
            Ok(config)
        }
    }
}

fn read_input(args: &Args) -> Result<String, ExplainError> {
    let io_err = |source: std::io::Error| ExplainError::Io {
        path: args.input.display().to_string(),
        source,
    };
    if args.input.as_os_str() == "-" {
        std::io::read_to_string(std::io::stdin()).map_err(io_err)
    } else {
        std::fs::read_to_string(&args.input).map_err(io_err)
    }
}

fn run(args: &Args) -> Result<(), ExplainError> {
    let config = load_config(args)?;
    logging::init(&config.logging);
    tracing::debug!(
        max_plan_depth = config.planner.max_plan_depth,
        env = ENV_MAX_PLAN_DEPTH,
        "configuration loaded"
    );

    let request: ExplainRequest = serde_json::from_str(&read_input(args)?)?;
    let mut symtab = request.symtab;
    let mut ctx = PushdownContext::new(&mut symtab).with_config(config.planner);
    let plan = plan_grouping(&mut ctx, request.plan, &request.group_by, request.distinct)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        print!("{}", plan.explain());
    }
    Ok(())
}
