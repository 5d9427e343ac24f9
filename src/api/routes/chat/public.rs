//! Public types for the chat API
use serde::{Deserialize, Serialize};

use crate::chat::{Feedback, Role, Turn};

#[derive(Deserialize, Default)]
pub struct ChatRequest {
    pub message: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

impl ChatResponse {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

/// A turn as rendered by the chat UI. `type` duplicates `sender`
/// because the UI uses it as a CSS class.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct HistoryMessage {
    pub id: i64,
    pub sender: Role,
    pub text: String,
    pub r#type: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<Feedback>,
}

impl From<Turn> for HistoryMessage {
    fn from(turn: Turn) -> Self {
        Self {
            id: turn.id,
            sender: turn.role,
            text: turn.text,
            r#type: turn.role,
            feedback: turn.feedback,
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct ClearResponse {
    pub message: String,
}
