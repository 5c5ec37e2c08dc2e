//! Symptom endpoints.
//!
//! - `GET /api/symptoms/catalog`: symptom chips by category
//! - `POST /api/symptoms/classify`: severity only, nothing stored
//! - `POST /api/symptoms/check`: classify, explain, store
//! - `GET /api/symptoms/history`: stored checks
//! - `GET /api/symptoms/summary`: counts per level
//! - `DELETE /api/symptoms/:id`

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::checker::{self, SymptomCheckRequest};
use crate::journal::{self, CategoryInfo, CheckFilter, LevelSummary, SymptomCheck};
use crate::triage::{self, SeverityLevel};

const DEFAULT_HISTORY_LIMIT: u32 = 50;
const MAX_HISTORY_LIMIT: u32 = 500;

/// `GET /api/symptoms/catalog`
pub async fn catalog() -> Json<Vec<CategoryInfo>> {
    Json(journal::symptom_catalog())
}

#[derive(Serialize)]
pub struct ClassifyResponse {
    pub level: SeverityLevel,
    pub symptom_count: usize,
    pub red_flag: Option<&'static str>,
}

/// `POST /api/symptoms/classify`: pure classification.
pub async fn classify(
    Json(request): Json<SymptomCheckRequest>,
) -> Result<Json<ClassifyResponse>, ApiError> {
    let report = request.validate()?;
    Ok(Json(ClassifyResponse {
        level: triage::classify(&report),
        symptom_count: report.symptom_count(),
        red_flag: triage::find_red_flag(&report),
    }))
}

/// `POST /api/symptoms/check`: full check, stored.
pub async fn check(
    State(ctx): State<ApiContext>,
    Json(request): Json<SymptomCheckRequest>,
) -> Result<(StatusCode, Json<SymptomCheck>), ApiError> {
    let report = request.validate()?;
    let assessment = ctx
        .with_generator(move |generator| Ok(checker::assess(generator, report)))
        .await?;
    let stored = ctx
        .with_db(move |conn| Ok(checker::record(conn, &assessment)?))
        .await?;

    tracing::info!(check_id = %stored.id, level = %stored.level, "Symptom check stored");
    Ok((StatusCode::CREATED, Json(stored)))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub level: Option<SeverityLevel>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub limit: Option<u32>,
}

fn check_date(field: &str, value: &Option<String>) -> Result<(), ApiError> {
    if let Some(ref date) = value {
        if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
            return Err(ApiError::BadRequest(format!(
                "Invalid {field} date (expected YYYY-MM-DD)"
            )));
        }
    }
    Ok(())
}

/// `GET /api/symptoms/history`
pub async fn history(
    State(ctx): State<ApiContext>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<SymptomCheck>>, ApiError> {
    check_date("from", &query.from)?;
    check_date("to", &query.to)?;

    let filter = CheckFilter {
        level: query.level,
        date_from: query.from,
        date_to: query.to,
        limit: Some(
            query
                .limit
                .unwrap_or(DEFAULT_HISTORY_LIMIT)
                .clamp(1, MAX_HISTORY_LIMIT),
        ),
    };
    let checks = ctx
        .with_db(move |conn| Ok(journal::fetch_checks(conn, &filter)?))
        .await?;
    Ok(Json(checks))
}

/// `GET /api/symptoms/summary`
pub async fn summary(State(ctx): State<ApiContext>) -> Result<Json<LevelSummary>, ApiError> {
    let summary = ctx
        .with_db(|conn| Ok(journal::level_summary(conn)?))
        .await?;
    Ok(Json(summary))
}

/// `DELETE /api/symptoms/:id`
pub async fn delete(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    ctx.with_db(move |conn| Ok(journal::delete_check(conn, &id)?))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
