//! Routes: the only place clause state reaches the shards.
//!
//! A `GROUP BY` is installed verbatim on the shard-local `SELECT`; every shard
//! then groups its own rows and the merged stream is already grouped.
//! `DISTINCT` likewise becomes `SELECT DISTINCT` (or `UNION` for a union).

use crate::error::PushdownError;
use crate::plan::expr::group_by_to_sql;
use crate::plan::{Expr, Route};
use crate::pushdown::PushdownContext;

/// Install `group_by` as the route's shard-local `GROUP BY`.
pub fn group_by_route(
    ctx: &mut PushdownContext<'_>,
    mut route: Route,
    group_by: &[Expr],
) -> Result<Route, PushdownError> {
    let Some(select) = route.query.as_select_mut() else {
        return Err(PushdownError::Internal(format!(
            "route {} carries a union and cannot take a GROUP BY",
            route.id
        )));
    };
    select.group_by = group_by.to_vec();

    ctx.stats.routes_grouped += 1;
    tracing::debug!(
        node = %route.id,
        keyspace = %route.keyspace,
        group_by = %group_by_to_sql(group_by),
        "pushed GROUP BY into route"
    );
    Ok(route)
}

/// Mark the route's shard-local query distinct.
pub fn distinct_route(
    ctx: &mut PushdownContext<'_>,
    mut route: Route,
) -> Result<Route, PushdownError> {
    route.query.make_distinct();

    ctx.stats.routes_made_distinct += 1;
    tracing::debug!(node = %route.id, keyspace = %route.keyspace, "pushed DISTINCT into route");
    Ok(route)
}
