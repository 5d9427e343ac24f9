//! Router for the feedback and deletion API

use std::sync::{Arc, RwLock};

use axum::{Json, Router, extract::State, routing::post};

use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::chat::{apply_feedback, delete_pair};

type SharedState = Arc<RwLock<AppState>>;

/// Like or dislike the latest bot message with the given text
async fn feedback(
    State(state): State<SharedState>,
    Json(payload): Json<public::FeedbackRequest>,
) -> Result<Json<public::SuccessResponse>, ApiError> {
    let db = state.read().expect("Unable to read share state").db.clone();
    apply_feedback(
        &db,
        payload.message.as_deref(),
        payload.feedback.as_deref(),
    )
    .await?;

    Ok(Json(public::SuccessResponse::ok()))
}

/// Delete the latest bot message with the given text and the user
/// message that prompted it
async fn delete_message_pair(
    State(state): State<SharedState>,
    Json(payload): Json<public::DeletePairRequest>,
) -> Result<Json<public::SuccessResponse>, ApiError> {
    let db = state.read().expect("Unable to read share state").db.clone();
    let deleted = delete_pair(&db, payload.bot_text.as_deref()).await?;
    tracing::info!(
        "Deleted message pair bot={} user={:?}",
        deleted.bot_id,
        deleted.user_id
    );

    Ok(Json(public::SuccessResponse::ok()))
}

/// Create the feedback and deletion router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/feedback", post(feedback))
        .route("/delete_message_pair", post(delete_message_pair))
}
