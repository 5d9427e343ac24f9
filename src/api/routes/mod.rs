//! API routes module

pub mod chat;
pub mod moderation;
pub mod uploads;

use std::sync::{Arc, RwLock};

use crate::api::state::AppState;
use axum::Router;

type SharedState = Arc<RwLock<AppState>>;

/// Create the combined API router. Routes are mounted at the root
/// because the chat UI calls them directly.
pub fn router() -> Router<SharedState> {
    Router::new()
        // Chat and history routes
        .merge(chat::router())
        // Feedback and deletion routes
        .merge(moderation::router())
        // File upload routes
        .merge(uploads::router())
}
