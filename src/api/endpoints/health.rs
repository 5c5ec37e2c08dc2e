//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub db_ok: bool,
    pub model: String,
}

/// `GET /api/health`: liveness plus database reachability.
pub async fn check(State(ctx): State<ApiContext>) -> Result<Json<HealthResponse>, ApiError> {
    let db_ok = ctx
        .with_db(|conn| Ok(crate::db::ping(conn).is_ok()))
        .await?;

    Ok(Json(HealthResponse {
        status: if db_ok { "ok" } else { "degraded" },
        version: crate::config::APP_VERSION,
        db_ok,
        model: ctx.generator().model_name().to_string(),
    }))
}
