//! A single-turn completion client that never fails the caller.
//!
//! Every outcome of the upstream call, including transport errors,
//! is returned as a [`Completion`] so the caller decides what to tell
//! the user.
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;

use super::core::{Message, Role, completion};
use crate::core::AppConfig;

#[derive(Clone, Debug, PartialEq)]
pub enum UpstreamError {
    /// The request didn't finish before the timeout
    Timeout,
    /// Connection or protocol failure before a response was received
    Network(String),
    /// The endpoint responded with a non-2xx status
    Status(u16),
    /// The response didn't contain a reply where one was expected
    Malformed(String),
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamError::Timeout => write!(f, "request timed out"),
            UpstreamError::Network(e) => write!(f, "network error: {}", e),
            UpstreamError::Status(code) => write!(f, "upstream returned status {}", code),
            UpstreamError::Malformed(e) => write!(f, "malformed response: {}", e),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Completion {
    Reply(String),
    UpstreamError(UpstreamError),
}

#[async_trait]
pub trait Completer: Send + Sync {
    async fn complete(&self, user_text: &str) -> Completion;
}

pub type SharedCompleter = Arc<dyn Completer + 'static>;

/// Completes against an OpenAI compatible chat completions endpoint
/// using a fixed system message.
#[derive(Clone, Debug)]
pub struct OpenAiCompleter {
    pub api_hostname: String,
    pub api_key: String,
    pub model: String,
    pub system_message: String,
    pub timeout: Duration,
}

impl OpenAiCompleter {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            api_hostname: config.openai_api_hostname.clone(),
            api_key: config.openai_api_key.clone(),
            model: config.openai_model.clone(),
            system_message: config.system_message.clone(),
            timeout: config.completion_timeout,
        }
    }
}

/// Pull the reply text out of a chat completion response.
pub fn parse_reply(resp: &Value) -> Result<String, UpstreamError> {
    let choices = resp["choices"]
        .as_array()
        .ok_or_else(|| UpstreamError::Malformed(String::from("missing choices")))?;
    let choice = choices
        .first()
        .ok_or_else(|| UpstreamError::Malformed(String::from("empty choices")))?;
    choice["message"]["content"]
        .as_str()
        .map(String::from)
        .ok_or_else(|| UpstreamError::Malformed(String::from("missing message content")))
}

fn classify_error(err: &anyhow::Error) -> UpstreamError {
    match err.downcast_ref::<reqwest::Error>() {
        Some(e) if e.is_timeout() => UpstreamError::Timeout,
        Some(e) if e.is_status() => {
            UpstreamError::Status(e.status().map(|s| s.as_u16()).unwrap_or_default())
        }
        Some(e) if e.is_decode() => UpstreamError::Malformed(e.to_string()),
        Some(e) => UpstreamError::Network(e.to_string()),
        None => UpstreamError::Network(err.to_string()),
    }
}

#[async_trait]
impl Completer for OpenAiCompleter {
    async fn complete(&self, user_text: &str) -> Completion {
        let messages = vec![
            Message::new(Role::System, &self.system_message),
            Message::new(Role::User, user_text),
        ];

        let start = Instant::now();
        let result = completion(
            &messages,
            &self.api_hostname,
            &self.api_key,
            &self.model,
            self.timeout,
        )
        .await;
        tracing::debug!(
            "Completion request to {} took {:.2}s",
            self.model,
            start.elapsed().as_secs_f64()
        );

        let outcome = match result {
            Ok(resp) => {
                tracing::trace!("Completion response: {}", resp);
                parse_reply(&resp)
            }
            Err(e) => Err(classify_error(&e)),
        };

        match outcome {
            Ok(reply) => Completion::Reply(reply),
            Err(e) => {
                tracing::warn!("Completion failed: {}", e);
                Completion::UpstreamError(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_completer(api_hostname: &str, timeout: Duration) -> OpenAiCompleter {
        OpenAiCompleter {
            api_hostname: api_hostname.to_string(),
            api_key: String::from("test-key"),
            model: String::from("mistralai/mistral-7b-instruct"),
            system_message: String::from("You are a helpful assistant."),
            timeout,
        }
    }

    #[test]
    fn test_parse_reply() {
        let resp = json!({"choices": [{"message": {"content": "hi there"}}]});
        assert_eq!(parse_reply(&resp), Ok(String::from("hi there")));

        let resp = json!({"error": {"message": "rate limited"}});
        assert!(matches!(parse_reply(&resp), Err(UpstreamError::Malformed(_))));

        let resp = json!({"choices": []});
        assert!(matches!(parse_reply(&resp), Err(UpstreamError::Malformed(_))));

        let resp = json!({"choices": [{"message": {"content": null}}]});
        assert!(matches!(parse_reply(&resp), Err(UpstreamError::Malformed(_))));
    }

    #[tokio::test]
    async fn it_sends_system_and_user_messages() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_body(mockito::Matcher::PartialJson(json!({
                "messages": [
                    {"role": "system", "content": "You are a helpful assistant."},
                    {"role": "user", "content": "hello"}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices": [{"message": {"role": "assistant", "content": "hi there"}}]}"#)
            .create_async()
            .await;

        let completer = test_completer(&server.url(), Duration::from_secs(5));
        let result = completer.complete("hello").await;

        mock.assert_async().await;
        assert_eq!(result, Completion::Reply(String::from("hi there")));
    }

    #[tokio::test]
    async fn it_reports_error_statuses() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(502)
            .create_async()
            .await;

        let completer = test_completer(&server.url(), Duration::from_secs(5));
        let result = completer.complete("hello").await;

        assert_eq!(result, Completion::UpstreamError(UpstreamError::Status(502)));
    }

    #[tokio::test]
    async fn it_reports_malformed_bodies() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("not json")
            .create_async()
            .await;

        let completer = test_completer(&server.url(), Duration::from_secs(5));
        let result = completer.complete("hello").await;

        assert!(matches!(
            result,
            Completion::UpstreamError(UpstreamError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn it_reports_timeouts() {
        // Accept connections but never respond
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _server = tokio::spawn(async move {
            let mut sockets = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                sockets.push(socket);
            }
        });

        let completer = test_completer(&format!("http://{}", addr), Duration::from_millis(200));
        let result = completer.complete("hello").await;

        assert_eq!(result, Completion::UpstreamError(UpstreamError::Timeout));
    }

    #[tokio::test]
    async fn it_reports_network_errors() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let completer = test_completer(&format!("http://{}", addr), Duration::from_secs(5));
        let result = completer.complete("hello").await;

        assert!(matches!(
            result,
            Completion::UpstreamError(UpstreamError::Network(_))
        ));
    }
}
