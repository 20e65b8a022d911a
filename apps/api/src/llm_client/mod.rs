//! LLM Client: the single point of entry for all completion-provider calls.
//!
//! ARCHITECTURAL RULE: No other module may call the provider API directly.
//! Callers depend on the `CompletionClient` capability; `LlmClient` is the
//! production implementation speaking the OpenAI-compatible chat protocol.
//!
//! Exactly one HTTP attempt per call. No retries, no streaming.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ProviderConfig;

pub mod prompts;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Missing API key: DEEPSEEK_API_KEY is not set")]
    MissingApiKey,

    #[error("Authentication failed (status {status}): {message}")]
    Auth { status: u16, message: String },

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Provider-agnostic chat request. Model and streaming are fixed by the client.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// Sends an ordered list of chat messages and returns the first choice's text.
///
/// Carried behind `Arc<dyn CompletionClient>` so generators can be tested
/// against scripted fakes.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatCompletionResponse {
    /// Extracts the text of the first choice. A null `content` is a malformed
    /// response, not an empty one.
    pub fn into_text(self) -> Result<String, LlmError> {
        let choice = self.choices.into_iter().next().ok_or_else(|| {
            LlmError::MalformedResponse("response contained no choices".to_string())
        })?;

        choice.message.content.ok_or_else(|| {
            LlmError::MalformedResponse("first choice has null content".to_string())
        })
    }
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// HTTP client for an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl LlmClient {
    /// Fails with `LlmError::MissingApiKey` before any I/O when no credential is configured.
    pub fn new(config: &ProviderConfig) -> Result<Self, LlmError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(LlmError::MissingApiKey)?
            .to_string();

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            api_key,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Makes a single non-streaming call, returning the full response object.
    pub async fn call(&self, request: &ChatRequest) -> Result<ChatCompletionResponse, LlmError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: false,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            // Try to parse error message
            let message = serde_json::from_str::<ProviderError>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            warn!("LLM API returned {}: {}", status, message);

            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::Auth {
                    status: status.as_u16(),
                    message,
                },
                _ => LlmError::Api {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        let completion: ChatCompletionResponse = serde_json::from_str(&text)?;

        if let Some(usage) = &completion.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(completion)
    }
}

#[async_trait]
impl CompletionClient for LlmClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        self.call(request).await?.into_text()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{http::HeaderMap, http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    use super::*;

    async fn spawn_provider(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn provider_config(base_url: String) -> ProviderConfig {
        ProviderConfig {
            api_key: Some("sk-test".to_string()),
            base_url,
            model: "deepseek-chat".to_string(),
            timeout_secs: Some(5),
        }
    }

    fn two_message_request() -> ChatRequest {
        ChatRequest {
            messages: vec![
                ChatMessage::system("You write study guides."),
                ChatMessage::user("Biology, please."),
            ],
            temperature: Some(0.7),
            max_tokens: Some(4000),
        }
    }

    fn completion_body(content: Value) -> Value {
        json!({
            "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 34, "total_tokens": 46}
        })
    }

    #[test]
    fn test_new_without_api_key_is_configuration_error() {
        let mut config = provider_config("http://127.0.0.1:1".to_string());
        config.api_key = None;
        assert!(matches!(LlmClient::new(&config), Err(LlmError::MissingApiKey)));

        config.api_key = Some("  ".to_string());
        assert!(matches!(LlmClient::new(&config), Err(LlmError::MissingApiKey)));
    }

    #[test]
    fn test_into_text_rejects_missing_choices() {
        let response: ChatCompletionResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(matches!(
            response.into_text(),
            Err(LlmError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_into_text_rejects_null_content() {
        let response: ChatCompletionResponse =
            serde_json::from_value(completion_body(Value::Null)).unwrap();
        assert!(matches!(
            response.into_text(),
            Err(LlmError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_into_text_keeps_empty_content() {
        let response: ChatCompletionResponse =
            serde_json::from_value(completion_body(json!(""))).unwrap();
        assert_eq!(response.into_text().unwrap(), "");
    }

    #[tokio::test]
    async fn test_complete_sends_chat_request_and_returns_first_choice() {
        let captured: Arc<Mutex<Option<(HeaderMap, Value)>>> = Arc::new(Mutex::new(None));
        let sink = captured.clone();
        let app = Router::new().route(
            "/chat/completions",
            post(move |headers: HeaderMap, Json(body): Json<Value>| {
                let sink = sink.clone();
                async move {
                    *sink.lock().unwrap() = Some((headers, body));
                    Json(completion_body(json!("===== INTRODUCTION =====\nCells.")))
                }
            }),
        );
        let base_url = spawn_provider(app).await;

        // Trailing slash on the base URL must not double up in the endpoint.
        let client = LlmClient::new(&provider_config(format!("{base_url}/"))).unwrap();
        let text = client.complete(&two_message_request()).await.unwrap();
        assert_eq!(text, "===== INTRODUCTION =====\nCells.");

        let (headers, body) = captured.lock().unwrap().take().unwrap();
        assert_eq!(headers["authorization"], "Bearer sk-test");
        assert_eq!(body["model"], "deepseek-chat");
        assert_eq!(body["stream"], false);
        assert_eq!(body["max_tokens"], 4000);
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "You write study guides.");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "Biology, please.");
    }

    #[tokio::test]
    async fn test_unset_sampling_options_are_omitted() {
        let captured: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
        let sink = captured.clone();
        let app = Router::new().route(
            "/chat/completions",
            post(move |Json(body): Json<Value>| {
                let sink = sink.clone();
                async move {
                    *sink.lock().unwrap() = Some(body);
                    Json(completion_body(json!("ok")))
                }
            }),
        );
        let client = LlmClient::new(&provider_config(spawn_provider(app).await)).unwrap();

        let request = ChatRequest {
            messages: vec![ChatMessage::user("hi")],
            temperature: None,
            max_tokens: None,
        };
        client.complete(&request).await.unwrap();

        let body = captured.lock().unwrap().take().unwrap();
        assert!(body.get("temperature").is_none());
        assert!(body.get("max_tokens").is_none());
    }

    #[tokio::test]
    async fn test_unauthorized_is_classified_as_auth_error() {
        let app = Router::new().route(
            "/chat/completions",
            post(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"error": {"message": "Authentication Fails", "type": "authentication_error"}})),
                )
            }),
        );
        let client = LlmClient::new(&provider_config(spawn_provider(app).await)).unwrap();

        match client.complete(&two_message_request()).await {
            Err(LlmError::Auth { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "Authentication Fails");
            }
            other => panic!("expected auth error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_error_keeps_raw_body_when_not_json() {
        let app = Router::new().route(
            "/chat/completions",
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "upstream overloaded") }),
        );
        let client = LlmClient::new(&provider_config(spawn_provider(app).await)).unwrap();

        match client.complete(&two_message_request()).await {
            Err(LlmError::Api { status, message }) => {
                assert_eq!(status, 503);
                assert_eq!(message, "upstream overloaded");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_json_success_body_is_parse_error() {
        let app = Router::new().route("/chat/completions", post(|| async { "not json" }));
        let client = LlmClient::new(&provider_config(spawn_provider(app).await)).unwrap();

        assert!(matches!(
            client.complete(&two_message_request()).await,
            Err(LlmError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_null_content_is_malformed_response() {
        let app = Router::new().route(
            "/chat/completions",
            post(|| async { Json(completion_body(Value::Null)) }),
        );
        let client = LlmClient::new(&provider_config(spawn_provider(app).await)).unwrap();

        assert!(matches!(
            client.complete(&two_message_request()).await,
            Err(LlmError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_transport_error() {
        // Bind then drop to get a port nothing is listening on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = LlmClient::new(&provider_config(format!("http://{addr}"))).unwrap();
        assert!(matches!(
            client.complete(&two_message_request()).await,
            Err(LlmError::Http(_))
        ));
    }
}
