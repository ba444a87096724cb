//! LLM Client — the single point of entry for chat-completion calls in the bridge.
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint. One attempt per
//! call, no streaming. Handlers reach it only through [`CompletionBackend`].

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::Config;

pub mod prompts;

/// Low temperature keeps summaries close to deterministic.
pub const TEMPERATURE: f32 = 0.2;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAI API error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("Unexpected OpenAI response envelope: {0}")]
    Envelope(#[source] serde_json::Error),

    #[error("OpenAI response contained no message content")]
    EmptyContent,

    #[error("Failed to parse OpenAI response as JSON: {0}")]
    MalformedOutput(String),
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Text of the first choice exactly as generated, whitespace included.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

/// A chat-completion backend: one system instruction, one user message,
/// the generated text back.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError>;
}

/// Bearer-token client for `<base_url>/chat/completions`.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl LlmClient {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            api_key: config.openai_api_key.clone(),
            model: config.openai_model.clone(),
            endpoint: format!("{}/chat/completions", config.openai_base_url),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Makes a raw call to the completion API, returning the decoded envelope.
    pub async fn call(&self, system: &str, prompt: &str) -> Result<ChatResponse, LlmError> {
        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = serde_json::from_str(&body).map_err(LlmError::Envelope)?;

        if let Some(usage) = &chat.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(chat)
    }
}

#[async_trait]
impl CompletionBackend for LlmClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        let response = self.call(system, prompt).await?;
        response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }
}

/// Second-stage decode: the model's text is itself expected to be a JSON document.
pub fn parse_json_content<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    serde_json::from_str(strip_json_fences(text))
        .map_err(|e| LlmError::MalformedOutput(e.to_string()))
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{spawn_stub, test_config};
    use axum::{http::HeaderMap, http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    const INCIDENT_JSON: &str =
        r#"{"summary_and_risk": "**Risk Level:** Low", "followup_actions": "1. Log it"}"#;

    #[test]
    fn test_fenced_incident_answer_is_unwrapped() {
        let tagged = format!("```json\n{INCIDENT_JSON}\n```");
        assert_eq!(strip_json_fences(&tagged), INCIDENT_JSON);

        let untagged = format!("  ```\n{INCIDENT_JSON}\n```\n");
        assert_eq!(strip_json_fences(&untagged), INCIDENT_JSON);
    }

    #[test]
    fn test_unfenced_answer_only_loses_outer_whitespace() {
        assert_eq!(strip_json_fences(&format!("\n{INCIDENT_JSON} ")), INCIDENT_JSON);
    }

    #[test]
    fn test_unterminated_fence_keeps_body() {
        let open_only = format!("```json\n{INCIDENT_JSON}");
        assert_eq!(strip_json_fences(&open_only), INCIDENT_JSON);
    }

    #[test]
    fn test_parse_json_content_decodes_fenced_incident_answer() {
        let value: Value =
            parse_json_content(&format!("```json\n{INCIDENT_JSON}\n```")).unwrap();
        assert_eq!(value["followup_actions"], "1. Log it");
    }

    #[test]
    fn test_parse_json_content_reports_malformed_output() {
        let err = parse_json_content::<Value>("Here is your summary: Low risk").unwrap_err();
        assert!(matches!(err, LlmError::MalformedOutput(_)));
        assert!(err
            .to_string()
            .starts_with("Failed to parse OpenAI response as JSON"));
    }

    #[test]
    fn test_chat_response_text_returns_whitespace_content_unmodified() {
        let response: ChatResponse =
            serde_json::from_value(json!({"choices": [{"message": {"content": " \n "}}]}))
                .unwrap();
        assert_eq!(response.text(), Some(" \n "));
    }

    #[test]
    fn test_chat_response_text_absent_without_choices_or_content() {
        let response: ChatResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(response.text().is_none());

        let response: ChatResponse =
            serde_json::from_value(json!({"choices": [{"message": {"content": null}}]})).unwrap();
        assert!(response.text().is_none());
    }

    #[test]
    fn test_request_body_shape() {
        let body = ChatRequest {
            model: "gpt-4o-mini",
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "sys",
                },
                ChatMessage {
                    role: "user",
                    content: "hello",
                },
            ],
            temperature: TEMPERATURE,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["model"], "gpt-4o-mini");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "hello");
        assert!((value["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
    }

    async fn completions_stub(
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("Bearer sk-test") {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": {"message": "Incorrect API key provided"}})),
            );
        }
        let prompt = body["messages"][1]["content"].as_str().unwrap_or_default();
        match prompt {
            "empty" => (StatusCode::OK, Json(json!({"choices": []}))),
            "blank" => (
                StatusCode::OK,
                Json(json!({"choices": [{"message": {"role": "assistant", "content": "\n\n"}}]})),
            ),
            "garbage" => (StatusCode::OK, Json(json!({"choices": "nope"}))),
            _ => (
                StatusCode::OK,
                Json(json!({
                    "choices": [{"message": {"role": "assistant", "content": format!("echo: {prompt}")}}],
                    "usage": {"prompt_tokens": 12, "completion_tokens": 3}
                })),
            ),
        }
    }

    async fn stub_client(api_key: &str) -> LlmClient {
        let router = Router::new().route("/v1/chat/completions", post(completions_stub));
        let base = spawn_stub(router).await;
        let mut config = test_config();
        config.openai_base_url = format!("{base}/v1");
        config.openai_api_key = api_key.to_string();
        LlmClient::new(Client::new(), &config)
    }

    #[tokio::test]
    async fn test_complete_returns_first_message_content() {
        let client = stub_client("sk-test").await;
        let text = client.complete("sys", "hello").await.unwrap();
        assert_eq!(text, "echo: hello");
    }

    #[tokio::test]
    async fn test_complete_non_success_carries_status_and_body() {
        let client = stub_client("sk-wrong").await;
        let err = client.complete("sys", "hello").await.unwrap_err();
        match err {
            LlmError::Api { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("Incorrect API key"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_complete_without_choices_is_empty_content() {
        let client = stub_client("sk-test").await;
        let err = client.complete("sys", "empty").await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyContent));
    }

    #[tokio::test]
    async fn test_complete_passes_whitespace_only_content_through() {
        let client = stub_client("sk-test").await;
        let text = client.complete("sys", "blank").await.unwrap();
        assert_eq!(text, "\n\n");
    }

    #[tokio::test]
    async fn test_complete_bad_envelope_is_envelope_error() {
        let client = stub_client("sk-test").await;
        let err = client.complete("sys", "garbage").await.unwrap_err();
        assert!(matches!(err, LlmError::Envelope(_)));
    }
}
