//! Feedback and deletion for stored replies.
//!
//! The UI only knows the text of the reply a user acted on, so both
//! operations target the latest bot turn with that exact text.
use serde::Serialize;
use thiserror::Error;
use tokio_rusqlite::Connection;

use super::db::{
    delete_turn, find_latest_bot_turn_by_text, find_latest_user_turn_before, find_turn_by_id,
    set_feedback,
};
use super::models::{Feedback, Role, Turn};

#[derive(Error, Debug)]
pub enum ModerationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid feedback value: {0:?}. Expected \"like\" or \"dislike\"")]
    InvalidFeedback(String),

    #[error("Message not found: {0:?}")]
    TurnNotFound(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct DeletedPair {
    pub bot_id: i64,
    pub user_id: Option<i64>,
}

fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, ModerationError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(ModerationError::MissingField(field))
}

/// Set like/dislike on the latest bot turn with exactly `text`.
/// Input is validated before anything is looked up.
pub async fn apply_feedback(
    db: &Connection,
    text: Option<&str>,
    value: Option<&str>,
) -> Result<Turn, ModerationError> {
    let text = required(text, "message")?;
    let value = value.unwrap_or_default();
    let feedback = value
        .parse::<Feedback>()
        .map_err(|_| ModerationError::InvalidFeedback(value.to_string()))?;

    let turn = find_latest_bot_turn_by_text(db, text)
        .await?
        .ok_or_else(|| ModerationError::TurnNotFound(text.to_string()))?;

    if !set_feedback(db, turn.id, feedback).await? {
        // Deleted between the lookup and the update
        return Err(ModerationError::TurnNotFound(text.to_string()));
    }
    tracing::debug!("Set feedback {} on turn {}", feedback.as_str(), turn.id);

    Ok(Turn {
        feedback: Some(feedback),
        ..turn
    })
}

/// Delete the latest bot turn with exactly `bot_text` along with the
/// user turn it replied to. A bot turn without a user turn is deleted
/// on its own.
pub async fn delete_pair(
    db: &Connection,
    bot_text: Option<&str>,
) -> Result<DeletedPair, ModerationError> {
    let bot_text = required(bot_text, "bot_text")?;

    let bot = find_latest_bot_turn_by_text(db, bot_text)
        .await?
        .ok_or_else(|| ModerationError::TurnNotFound(bot_text.to_string()))?;

    // Prefer the recorded link. Turns written before links were
    // stored fall back to the closest earlier user turn.
    let user = match bot.parent_id {
        Some(parent_id) => find_turn_by_id(db, parent_id)
            .await?
            .filter(|t| t.role == Role::User),
        None => find_latest_user_turn_before(db, bot.id).await?,
    };

    delete_turn(db, bot.id).await?;
    let user_id = match user {
        Some(user) => delete_turn(db, user.id).await?.then_some(user.id),
        None => None,
    };
    tracing::debug!("Deleted bot turn {} and user turn {:?}", bot.id, user_id);

    Ok(DeletedPair {
        bot_id: bot.id,
        user_id,
    })
}
