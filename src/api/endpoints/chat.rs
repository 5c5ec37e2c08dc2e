//! Assistant endpoint.
//!
//! - `POST /api/chat/ask`: one non-diagnostic health question

use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::chat::{self, Answer, Question};

/// `POST /api/chat/ask`
pub async fn ask(
    State(ctx): State<ApiContext>,
    Json(body): Json<Question>,
) -> Result<Json<Answer>, ApiError> {
    let answer = ctx
        .with_generator(move |generator| Ok(chat::ask(generator, &body.question)?))
        .await?;
    Ok(Json(answer))
}
