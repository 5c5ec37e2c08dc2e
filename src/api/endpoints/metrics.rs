//! Health metric endpoints.
//!
//! - `POST /api/metrics`: record a reading
//! - `GET /api/metrics`: readings, newest first
//! - `GET /api/metrics/latest`: latest reading per kind
//! - `DELETE /api/metrics/:id`

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::metrics::{self, HealthMetric, NewMetric};
use crate::models::enums::MetricKind;

const DEFAULT_LIMIT: u32 = 100;
const MAX_LIMIT: u32 = 1000;

#[derive(Serialize)]
pub struct RecordResponse {
    pub id: String,
}

/// `POST /api/metrics`
pub async fn record(
    State(ctx): State<ApiContext>,
    Json(metric): Json<NewMetric>,
) -> Result<(StatusCode, Json<RecordResponse>), ApiError> {
    metrics::validate(&metric).map_err(ApiError::BadRequest)?;
    let id = ctx
        .with_db(move |conn| Ok(metrics::record_metric(conn, &metric)?))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(RecordResponse { id: id.to_string() }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub kind: Option<MetricKind>,
    pub limit: Option<u32>,
}

/// `GET /api/metrics`
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<HealthMetric>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let readings = ctx
        .with_db(move |conn| Ok(metrics::fetch_metrics(conn, query.kind, limit)?))
        .await?;
    Ok(Json(readings))
}

/// `GET /api/metrics/latest`
pub async fn latest(State(ctx): State<ApiContext>) -> Result<Json<Vec<HealthMetric>>, ApiError> {
    let readings = ctx
        .with_db(|conn| Ok(metrics::latest_per_kind(conn)?))
        .await?;
    Ok(Json(readings))
}

/// `DELETE /api/metrics/:id`
pub async fn delete(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    ctx.with_db(move |conn| Ok(metrics::delete_metric(conn, &id)?))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
