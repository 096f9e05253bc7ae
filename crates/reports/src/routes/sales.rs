//! Sales report route handler.

use axum::{
    Json,
    extract::{Query, State},
};
use clementine_core::BrandId;

use crate::error::AppError;
use crate::report::{self, ReportQuery, SalesReport};
use crate::state::AppState;

/// GET /reports/sales
///
/// Query parameters: `period` (or `granularity`), `start`, `end`, `brand`.
/// Unparseable dates are a 400; an unknown brand or an empty window is a
/// normal 200 with an empty series.
pub async fn sales_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<SalesReport>, AppError> {
    let tz = state.config().report_timezone;
    let window = query
        .normalize(tz, chrono::Utc::now())
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let scope = query.brand.map(BrandId::new);

    tracing::debug!(
        period = %window.unit,
        start = %window.start,
        end = %window.end,
        scoped = scope.is_some(),
        "Running sales report"
    );

    let report = tokio::time::timeout(
        state.config().query_timeout,
        report::run(state.orders(), state.catalog(), &window, scope, tz),
    )
    .await
    .map_err(|_| AppError::Timeout)??;

    Ok(Json(report))
}
