//! Medicine reminder endpoints.
//!
//! - `POST /api/reminders`: create
//! - `GET /api/reminders`: list with next due time
//! - `GET /api/reminders/due`: doses due within a window
//! - `PUT /api/reminders/:id/active`: pause / resume
//! - `DELETE /api/reminders/:id`

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::reminders::{self, DueReminder, MedicineReminder, NewReminder};

const DEFAULT_WINDOW_MINUTES: u32 = 60;
const MAX_WINDOW_MINUTES: u32 = 24 * 60;

#[derive(Serialize)]
pub struct ReminderView {
    #[serde(flatten)]
    pub reminder: MedicineReminder,
    pub next_due: Option<String>,
}

/// `POST /api/reminders`
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(body): Json<NewReminder>,
) -> Result<(StatusCode, Json<MedicineReminder>), ApiError> {
    let reminder = ctx
        .with_db(move |conn| {
            let id = reminders::create_reminder(conn, &body)?;
            Ok(reminders::get_reminder(conn, &id.to_string())?)
        })
        .await?;
    Ok((StatusCode::CREATED, Json(reminder)))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub active_only: bool,
}

/// `GET /api/reminders`
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ReminderView>>, ApiError> {
    let now = Local::now().naive_local();
    let stored = ctx
        .with_db(move |conn| Ok(reminders::list_reminders(conn, query.active_only)?))
        .await?;

    let views = stored
        .into_iter()
        .map(|reminder| {
            let next_due = if reminder.active {
                reminders::parse_times(&reminder.times)
                    .ok()
                    .and_then(|times| reminders::next_due(&times, now))
                    .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            } else {
                None
            };
            ReminderView { reminder, next_due }
        })
        .collect();
    Ok(Json(views))
}

#[derive(Debug, Deserialize)]
pub struct DueQuery {
    pub window_minutes: Option<u32>,
}

/// `GET /api/reminders/due`
pub async fn due(
    State(ctx): State<ApiContext>,
    Query(query): Query<DueQuery>,
) -> Result<Json<Vec<DueReminder>>, ApiError> {
    let window = query
        .window_minutes
        .unwrap_or(DEFAULT_WINDOW_MINUTES)
        .min(MAX_WINDOW_MINUTES);
    let now = Local::now().naive_local();
    let due = ctx
        .with_db(move |conn| Ok(reminders::due_within(conn, now, window)?))
        .await?;
    Ok(Json(due))
}

#[derive(Debug, Deserialize)]
pub struct ActiveBody {
    pub active: bool,
}

/// `PUT /api/reminders/:id/active`
pub async fn set_active(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    Json(body): Json<ActiveBody>,
) -> Result<StatusCode, ApiError> {
    ctx.with_db(move |conn| Ok(reminders::set_active(conn, &id, body.active)?))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/reminders/:id`
pub async fn delete(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    ctx.with_db(move |conn| Ok(reminders::delete_reminder(conn, &id)?))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
