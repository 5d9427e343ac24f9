//! Router for the uploads API

use std::sync::{Arc, RwLock};

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    response::IntoResponse,
    routing::{get, post},
};
use http::header;

use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::api::utils::read_chat_form;
use crate::uploads::{UploadError, read_upload, store_upload};

type SharedState = Arc<RwLock<AppState>>;

/// Store a file sent as the `file` field of a multipart form
async fn upload(
    State(state): State<SharedState>,
    multipart: Multipart,
) -> Result<Json<public::UploadResponse>, ApiError> {
    let file = read_chat_form(multipart)
        .await?
        .file
        .ok_or(UploadError::MissingFile)?;

    let (db, uploads_path) = {
        let shared_state = state.read().expect("Unable to read share state");
        (
            shared_state.db.clone(),
            shared_state.config.uploads_path.clone(),
        )
    };
    let stored = store_upload(&db, &uploads_path, &file.file_name, &file.bytes).await?;

    Ok(Json(public::UploadResponse::new(&stored.file_name)))
}

/// Serve the bytes of the latest upload with the given name
async fn view_upload(
    State(state): State<SharedState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let (db, uploads_path) = {
        let shared_state = state.read().expect("Unable to read share state");
        (
            shared_state.db.clone(),
            shared_state.config.uploads_path.clone(),
        )
    };
    let (upload, bytes) = read_upload(&db, &uploads_path, &filename).await?;

    let headers = [
        (
            header::CONTENT_TYPE,
            String::from("application/octet-stream"),
        ),
        (
            header::CONTENT_DISPOSITION,
            format!(
                "inline; filename*=UTF-8''{}",
                urlencoding::encode(&upload.file_name)
            ),
        ),
    ];

    Ok((headers, bytes))
}

/// Create the uploads router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/upload", post(upload))
        .route("/uploads/{filename}", get(view_upload))
}
