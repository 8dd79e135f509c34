//! Groq chat-completions client (OpenAI-compatible wire format).
//!
//! The model call is the only blocking operation in the pipeline. It runs
//! with a per-request timeout and a small bounded retry budget that covers
//! transient failures only: connect errors, timeouts, HTTP 429 and 5xx.
//! Auth and malformed-request errors (other 4xx) fail immediately.

use serde::{Deserialize, Serialize};

use super::types::LlmClient;
use super::ExtractError;
use crate::config::AppConfig;

/// Production Groq endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com";

/// Model the service was calibrated against.
pub const DEFAULT_MODEL: &str = "mixtral-8x7b-32768";

/// HTTP client for the Groq chat-completions API.
pub struct GroqClient {
    base_url: String,
    model: String,
    api_key: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
    max_retries: u32,
}

impl GroqClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        max_retries: u32,
    ) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
            client,
            timeout_secs,
            max_retries,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            &config.base_url,
            &config.api_key,
            &config.model,
            config.timeout_secs,
            config.max_retries,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn send(&self, url: &str, body: &ChatRequest<'_>) -> Result<String, SendFailure> {
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .map_err(|e| SendFailure {
                transient: e.is_connect() || e.is_timeout(),
                detail: if e.is_timeout() {
                    format!("request timed out after {}s", self.timeout_secs)
                } else {
                    e.to_string()
                },
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SendFailure {
                transient: is_transient_status(status),
                detail: format!("model endpoint returned status {}: {}", status.as_u16(), body),
            });
        }

        let parsed: ChatResponse = response.json().map_err(|e| SendFailure {
            transient: false,
            detail: format!("cannot decode chat-completions response: {e}"),
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| SendFailure {
                transient: false,
                detail: "chat-completions response contained no choices".into(),
            })
    }
}

impl LlmClient for GroqClient {
    fn invoke(&self, system: &str, user: &str) -> Result<String, ExtractError> {
        let url = format!("{}/openai/v1/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: user },
            ],
            temperature: 0.0,
        };

        let mut last_detail = String::new();
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                tracing::warn!(attempt, error = %last_detail, "transient model-call failure, retrying");
            }
            match self.send(&url, &body) {
                Ok(content) => return Ok(content),
                Err(failure) => {
                    if !failure.transient || attempt == self.max_retries {
                        return Err(ExtractError::UpstreamUnavailable(failure.detail));
                    }
                    last_detail = failure.detail;
                }
            }
        }
        Err(ExtractError::UpstreamUnavailable(last_detail))
    }
}

/// One send attempt's failure, classified for the retry loop.
struct SendFailure {
    detail: String,
    transient: bool,
}

/// Rate limiting and server-side failures are worth another attempt; any
/// other non-success status (auth, malformed request) is not.
fn is_transient_status(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Mock model client for tests: a canned reply or a canned failure.
pub struct MockLlmClient {
    reply: String,
    fail_with: Option<String>,
}

impl MockLlmClient {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            fail_with: None,
        }
    }

    pub fn failing(detail: &str) -> Self {
        Self {
            reply: String::new(),
            fail_with: Some(detail.to_string()),
        }
    }
}

impl LlmClient for MockLlmClient {
    fn invoke(&self, _system: &str, _user: &str) -> Result<String, ExtractError> {
        match &self.fail_with {
            Some(detail) => Err(ExtractError::UpstreamUnavailable(detail.clone())),
            None => Ok(self.reply.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor_trims_trailing_slash() {
        let client = GroqClient::new("https://api.groq.com/", "key", DEFAULT_MODEL, 60, 2);
        assert_eq!(client.base_url(), "https://api.groq.com");
        assert_eq!(client.model(), "mixtral-8x7b-32768");
    }

    #[test]
    fn transient_status_classification() {
        use reqwest::StatusCode;
        assert!(is_transient_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_transient_status(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(is_transient_status(StatusCode::SERVICE_UNAVAILABLE));
        assert!(!is_transient_status(StatusCode::UNAUTHORIZED));
        assert!(!is_transient_status(StatusCode::BAD_REQUEST));
        assert!(!is_transient_status(StatusCode::NOT_FOUND));
    }

    #[test]
    fn chat_request_wire_format() {
        let body = ChatRequest {
            model: "mixtral-8x7b-32768",
            messages: vec![
                ChatMessage { role: "system", content: "instruction" },
                ChatMessage { role: "user", content: "note" },
            ],
            temperature: 0.0,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "mixtral-8x7b-32768");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "note");
        assert_eq!(json["temperature"], 0.0);
    }

    #[test]
    fn chat_response_decodes_first_choice() {
        let parsed: ChatResponse = serde_json::from_str(
            r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"{}"}}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.choices[0].message.content, "{}");
    }

    #[test]
    fn mock_client_returns_configured_reply() {
        let client = MockLlmClient::new("{\"status\": \"S\"}");
        let reply = client.invoke("system", "user").unwrap();
        assert_eq!(reply, "{\"status\": \"S\"}");
    }

    #[test]
    fn mock_client_failure_surfaces_as_upstream_unavailable() {
        let client = MockLlmClient::failing("connection refused");
        let err = client.invoke("system", "user").unwrap_err();
        assert!(matches!(err, ExtractError::UpstreamUnavailable(d) if d == "connection refused"));
    }
}
