//! Router for the chat API

use std::sync::{Arc, RwLock};

use axum::{
    Form, Json, Router,
    extract::{FromRequest, Multipart, Request, State},
    routing::{get, post},
};
use http::header;

use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::api::utils::read_chat_form;
use crate::chat::{ChatInput, clear_turns, exchange, list_turns};

type SharedState = Arc<RwLock<AppState>>;

/// Accept the chat message as multipart (with an optional file), a
/// url encoded form, or JSON.
async fn read_chat_input(request: Request) -> Result<ChatInput, ApiError> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        read_chat_form(multipart).await
    } else if content_type.starts_with("application/json") {
        let Json(payload) = Json::<public::ChatRequest>::from_request(request, &())
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        Ok(ChatInput {
            message: payload.message,
            file: None,
        })
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(payload) = Form::<public::ChatRequest>::from_request(request, &())
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        Ok(ChatInput {
            message: payload.message,
            file: None,
        })
    } else {
        Ok(ChatInput::default())
    }
}

/// Send a message and get the bot's reply. Upstream failures still
/// produce a reply so this only errors on bad input or storage
/// failures.
async fn chat_handler(
    State(state): State<SharedState>,
    request: Request,
) -> Result<Json<public::ChatResponse>, ApiError> {
    let input = read_chat_input(request).await?;

    let (db, completer, uploads_path) = {
        let shared_state = state.read().expect("Unable to read share state");
        (
            shared_state.db.clone(),
            Arc::clone(&shared_state.completer),
            shared_state.config.uploads_path.clone(),
        )
    };

    let result = exchange(&db, completer.as_ref(), &uploads_path, input).await?;

    Ok(Json(public::ChatResponse::new(result.reply())))
}

/// Get every stored message in the order it was sent
async fn history(
    State(state): State<SharedState>,
) -> Result<Json<Vec<public::HistoryMessage>>, ApiError> {
    let db = state.read().expect("Unable to read share state").db.clone();
    let turns = list_turns(&db).await?;

    Ok(Json(
        turns
            .into_iter()
            .map(public::HistoryMessage::from)
            .collect(),
    ))
}

/// Delete all messages
async fn clear(State(state): State<SharedState>) -> Result<Json<public::ClearResponse>, ApiError> {
    let db = state.read().expect("Unable to read share state").db.clone();
    let count = clear_turns(&db).await?;
    tracing::info!("Cleared {} messages", count);

    Ok(Json(public::ClearResponse {
        message: String::from("Chat history cleared."),
    }))
}

/// Create the chat router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/chat", post(chat_handler))
        .route("/history", get(history))
        .route("/clear", post(clear))
}
