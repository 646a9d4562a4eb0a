//! Per-operator pushdown rules.
//!
//! Each node kind that can take part in a pass has its own module; the
//! dispatch in [`super::context`] decides which rule runs.

pub mod cross_shard;
pub mod ordered_aggregate;
pub mod passthrough;
pub mod route;
#[cfg(test)]
pub(crate) mod test_helpers;
