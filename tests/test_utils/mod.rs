//! Test utilities for integration tests
#![allow(dead_code)]

use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use axum::{Router, body::Body};
use tempfile::TempDir;
use tokio_rusqlite::Connection;

use parlor::api::AppState;
use parlor::api::app;
use parlor::core::AppConfig;
use parlor::core::db::{async_db, initialize_db};
use parlor::openai::{Completer, Completion};

/// A completion backend that returns the same outcome for every
/// prompt and records what it was asked.
pub struct StubCompleter {
    outcome: Completion,
    pub prompts: Mutex<Vec<String>>,
}

impl StubCompleter {
    pub fn new(outcome: Completion) -> Self {
        Self {
            outcome,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(reply: &str) -> Self {
        Self::new(Completion::Reply(reply.to_string()))
    }
}

#[async_trait]
impl Completer for StubCompleter {
    async fn complete(&self, user_text: &str) -> Completion {
        self.prompts.lock().unwrap().push(user_text.to_string());
        self.outcome.clone()
    }
}

pub struct TestApp {
    pub app: Router,
    pub db: Connection,
    pub config: AppConfig,
    pub completer: Arc<StubCompleter>,
    // Dropping this removes the storage directory
    _dir: TempDir,
}

/// Creates a test application router backed by a fresh storage
/// directory and a stub completion backend.
pub async fn test_app_with(completer: StubCompleter) -> TestApp {
    let dir = tempfile::Builder::new()
        .prefix("parlor-test")
        .tempdir()
        .expect("Failed to create temp directory");

    let mut config = AppConfig::with_storage_path(dir.path().to_str().unwrap());
    config.static_path = dir.path().join("static").display().to_string();
    std::fs::create_dir_all(&config.static_path).unwrap();
    std::fs::write(
        format!("{}/index.html", config.static_path),
        "<html><body>Chat</body></html>",
    )
    .unwrap();

    let db = async_db(&config.db_path)
        .await
        .expect("Failed to connect to async db");
    db.call(|conn| {
        initialize_db(conn).expect("Failed to initialize db");
        Ok(())
    })
    .await
    .unwrap();

    let completer = Arc::new(completer);
    let app_state = AppState::with_completer(db.clone(), config.clone(), completer.clone());

    TestApp {
        app: app(Arc::new(RwLock::new(app_state))),
        db,
        config,
        completer,
        _dir: dir,
    }
}

pub async fn test_app() -> TestApp {
    test_app_with(StubCompleter::replying("hi there")).await
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_to_json(body: Body) -> serde_json::Value {
    serde_json::from_str(&body_to_string(body).await).unwrap()
}

pub const BOUNDARY: &str = "parlor-test-boundary";

/// Build a multipart body with an optional text `message` and an
/// optional `file` part.
pub fn multipart_body(message: Option<&str>, file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(message) = message {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"message\"\r\n\r\n{message}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}
