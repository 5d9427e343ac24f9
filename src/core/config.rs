use std::env;
use std::time::Duration;

// Axum's default body limit is 2MB which is too small for most
// attachments
const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub storage_path: String,
    pub db_path: String,
    pub uploads_path: String,
    pub static_path: String,
    pub openai_model: String,
    pub openai_api_hostname: String,
    pub openai_api_key: String,
    pub system_message: String,
    pub completion_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    /// Build a config rooted at `storage_path` with every other
    /// setting at its default value.
    pub fn with_storage_path(storage_path: &str) -> Self {
        let storage_path = storage_path.trim_end_matches('/').to_string();
        let db_path = format!("{}/db", storage_path);
        let uploads_path = format!("{}/uploads", storage_path);

        Self {
            storage_path,
            db_path,
            uploads_path,
            static_path: String::from("./static"),
            openai_model: String::from("mistralai/mistral-7b-instruct"),
            openai_api_hostname: String::from("https://openrouter.ai/api"),
            openai_api_key: String::new(),
            system_message: String::from("You are a helpful assistant."),
            completion_timeout: Duration::from_secs(30),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.openai_api_key.trim().is_empty()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let storage_path = env::var("PARLOR_STORAGE_PATH").unwrap_or("./".to_string());
        let defaults = Self::with_storage_path(&storage_path);

        let static_path = env::var("PARLOR_STATIC_DIR").unwrap_or(defaults.static_path);
        let openai_api_hostname =
            env::var("PARLOR_LLM_HOST").unwrap_or(defaults.openai_api_hostname);
        // A missing key is reported when the server starts. Requests
        // will fail upstream and fall back to an error reply.
        let openai_api_key = env::var("OPENROUTER_API_KEY").unwrap_or_default();
        let openai_model = env::var("PARLOR_LLM_MODEL").unwrap_or(defaults.openai_model);
        let system_message =
            env::var("PARLOR_SYSTEM_MESSAGE").unwrap_or(defaults.system_message);
        let completion_timeout = env::var("PARLOR_COMPLETION_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.completion_timeout);
        let max_upload_bytes = env::var("PARLOR_MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(defaults.max_upload_bytes);

        Self {
            static_path,
            openai_api_hostname,
            openai_api_key,
            openai_model,
            system_message,
            completion_timeout,
            max_upload_bytes,
            ..defaults
        }
    }
}
