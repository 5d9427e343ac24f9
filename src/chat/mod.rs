pub mod core;
pub mod db;
pub mod models;
pub mod moderation;

pub use self::core::{ChatError, ChatInput, Exchange, FileUpload, exchange};
pub use db::{
    clear_turns, delete_turn, find_latest_bot_turn_by_text, find_latest_user_turn_before,
    find_turn_by_id, insert_turn, list_turns, set_feedback,
};
pub use models::{Feedback, Role, Turn};
pub use moderation::{DeletedPair, ModerationError, apply_feedback, delete_pair};
