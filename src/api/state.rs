use std::sync::Arc;

use tokio_rusqlite::Connection;

use crate::core::AppConfig;
use crate::openai::{OpenAiCompleter, SharedCompleter};

pub struct AppState {
    pub db: Connection,
    pub config: AppConfig,
    pub completer: SharedCompleter,
}

impl AppState {
    pub fn new(db: Connection, config: AppConfig) -> Self {
        let completer = Arc::new(OpenAiCompleter::new(&config));
        Self::with_completer(db, config, completer)
    }

    /// Use a different completion backend than the configured OpenAI
    /// compatible endpoint.
    pub fn with_completer(db: Connection, config: AppConfig, completer: SharedCompleter) -> Self {
        Self {
            db,
            config,
            completer,
        }
    }
}
