//! Runs a single chat exchange: persist the user's turn, ask the
//! completion endpoint for a reply, persist the bot's turn.
//!
//! There is no rollback. If the bot turn can't be written the user
//! turn stays in the history without a reply.
use thiserror::Error;
use tokio_rusqlite::Connection;

use super::db::insert_turn;
use super::models::{Role, Turn};
use crate::openai::{Completer, Completion, UpstreamError};
use crate::uploads::{UploadError, store_upload};

pub const NO_INPUT_REPLY: &str = "No input received.";
pub const ERROR_REPLY: &str = "⚠ Error during processing.";
pub const EMPTY_REPLY: &str = "⚠️ No valid response from the model.";

/// A file attached to a chat message.
#[derive(Clone, Debug)]
pub struct FileUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug, Default)]
pub struct ChatInput {
    pub message: Option<String>,
    pub file: Option<FileUpload>,
}

impl ChatInput {
    pub fn from_message(message: &str) -> Self {
        Self {
            message: Some(message.to_string()),
            file: None,
        }
    }

    // Blank messages are treated the same as no message at all
    fn text(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.trim().is_empty())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Exchange {
    NoInput,
    Replied { user: Turn, bot: Turn },
}

impl Exchange {
    pub fn reply(&self) -> &str {
        match self {
            Exchange::NoInput => NO_INPUT_REPLY,
            Exchange::Replied { bot, .. } => &bot.text,
        }
    }
}

#[derive(Error, Debug)]
pub enum ChatError {
    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// The text shown to the user when the completion endpoint didn't
/// produce a reply.
pub fn fallback_reply(err: &UpstreamError) -> &'static str {
    match err {
        UpstreamError::Malformed(_) => EMPTY_REPLY,
        UpstreamError::Timeout | UpstreamError::Network(_) | UpstreamError::Status(_) => {
            ERROR_REPLY
        }
    }
}

pub async fn exchange(
    db: &Connection,
    completer: &dyn Completer,
    uploads_dir: &str,
    input: ChatInput,
) -> Result<Exchange, ChatError> {
    let text = input.text().map(String::from);

    let (turn_text, prompt) = match (text, &input.file) {
        (None, None) => return Ok(Exchange::NoInput),
        (Some(text), _) => (text.clone(), text),
        (None, Some(file)) => (
            format!("[File uploaded: {}]", file.file_name),
            format!("The user uploaded a file named {}.", file.file_name),
        ),
    };

    // Store the attachment first so a rejected file leaves no turns
    // behind
    if let Some(file) = &input.file {
        store_upload(db, uploads_dir, &file.file_name, &file.bytes).await?;
    }

    let user = insert_turn(db, Role::User, &turn_text, None).await?;

    let reply = match completer.complete(&prompt).await {
        Completion::Reply(reply) => reply,
        Completion::UpstreamError(e) => {
            tracing::error!("No reply for turn {}: {}", user.id, e);
            fallback_reply(&e).to_string()
        }
    };

    let bot = insert_turn(db, Role::Bot, &reply, Some(user.id)).await?;

    Ok(Exchange::Replied { user, bot })
}
