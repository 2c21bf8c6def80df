//! OpenAI-compatible chat-completion backend.
//!
//! Speaks `POST {base_url}/chat/completions`, which OpenAI and most hosted
//! and local gateways accept.

use crate::backend::{LlmBackend, LlmMessage, LlmRequest, LlmResponse, MessageRole, TokenUsage, ToolCall};
use crate::error::LlmError;
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::RETRY_AFTER;
use rootcause::Report;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::{debug, instrument};

/// Configuration for an OpenAI-compatible backend.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    /// API base URL, without the `/chat/completions` suffix.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer token. Some local gateways need none.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// Token limit applied when a request sets none.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Sampling temperature applied when a request sets none.
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Whole-request timeout in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    500
}

fn default_timeout_seconds() -> u64 {
    30
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Chat-completion client for OpenAI-compatible APIs.
#[derive(Debug, Clone)]
pub struct OpenAiBackend {
    client: reqwest::Client,
    config: OpenAiConfig,
    endpoint: String,
}

impl OpenAiBackend {
    /// Creates a backend from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: OpenAiConfig) -> Result<Self, Report<LlmError>> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| LlmError::InvalidConfig {
                reason: format!("HTTP client error: {e}"),
            })?;
        let endpoint = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));

        Ok(Self {
            client,
            config,
            endpoint,
        })
    }

    fn wire_request<'a>(&'a self, request: &'a LlmRequest) -> WireRequest<'a> {
        WireRequest {
            model: &self.config.model,
            messages: request.messages.iter().map(WireMessage::from).collect(),
            max_tokens: request.max_tokens.unwrap_or(self.config.max_tokens),
            temperature: request.temperature.or(self.config.temperature),
            tools: request
                .tools
                .iter()
                .map(|tool| WireTool {
                    kind: "function",
                    function: WireToolFunction {
                        name: &tool.name,
                        description: &tool.description,
                        parameters: &tool.parameters,
                    },
                })
                .collect(),
        }
    }
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
    #[instrument(skip(self, request), fields(messages = request.messages.len()))]
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, Report<LlmError>> {
        let mut http = self.client.post(&self.endpoint).json(&self.wire_request(request));
        if let Some(key) = &self.config.api_key {
            http = http.bearer_auth(key);
        }

        let response = http.send().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout
            } else {
                LlmError::RequestFailed {
                    reason: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after_secs = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, retry_after_secs, body).into());
        }

        let body = response.text().await.map_err(|e| LlmError::RequestFailed {
            reason: e.to_string(),
        })?;
        let parsed = parse_response(&body)?;
        debug!(
            input_tokens = parsed.usage.input_tokens,
            output_tokens = parsed.usage.output_tokens,
            tool_calls = parsed.tool_calls.len(),
            "chat completion received"
        );
        Ok(parsed)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

fn status_error(status: StatusCode, retry_after_secs: Option<u64>, body: String) -> LlmError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::AuthenticationFailed {
            reason: format!("HTTP {status}: {body}"),
        },
        StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimited { retry_after_secs },
        _ => LlmError::RequestFailed {
            reason: format!("HTTP {status}: {body}"),
        },
    }
}

fn parse_response(body: &str) -> Result<LlmResponse, LlmError> {
    let wire: WireResponse =
        serde_json::from_str(body).map_err(|e| LlmError::ResponseParseFailed {
            reason: e.to_string(),
        })?;

    let message = wire
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .ok_or_else(|| LlmError::ResponseParseFailed {
            reason: "response has no choices[0].message".to_string(),
        })?;

    let tool_calls = message
        .tool_calls
        .into_iter()
        .map(|call| {
            let arguments = serde_json::from_str(&call.function.arguments)
                .unwrap_or(JsonValue::String(call.function.arguments));
            ToolCall::new(call.id, call.function.name, arguments)
        })
        .collect();

    let usage = wire.usage.unwrap_or_default();
    Ok(LlmResponse {
        content: message.content.unwrap_or_default(),
        tool_calls,
        usage: TokenUsage {
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
        },
        model: wire.model.unwrap_or_default(),
    })
}

#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool<'a>>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: Option<WireContent<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireToolCallOut<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum WireContent<'a> {
    Text(&'a str),
    Parts(Vec<WireContentPart<'a>>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: WireImageUrl },
}

#[derive(Serialize)]
struct WireImageUrl {
    url: String,
}

#[derive(Serialize)]
struct WireToolCallOut<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunctionOut<'a>,
}

#[derive(Serialize)]
struct WireFunctionOut<'a> {
    name: &'a str,
    arguments: String,
}

#[derive(Serialize)]
struct WireTool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireToolFunction<'a>,
}

#[derive(Serialize)]
struct WireToolFunction<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a JsonValue,
}

impl<'a> From<&'a LlmMessage> for WireMessage<'a> {
    fn from(message: &'a LlmMessage) -> Self {
        let role = match message.role {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::Tool => "tool",
        };

        let content = match (&message.content, &message.image_base64) {
            (text, Some(image)) => {
                let mut parts = Vec::new();
                if let Some(text) = text {
                    parts.push(WireContentPart::Text { text });
                }
                parts.push(WireContentPart::ImageUrl {
                    image_url: WireImageUrl {
                        url: format!("data:image/jpeg;base64,{image}"),
                    },
                });
                Some(WireContent::Parts(parts))
            }
            (Some(text), None) => Some(WireContent::Text(text)),
            (None, None) => None,
        };

        Self {
            role,
            content,
            tool_calls: message
                .tool_calls
                .iter()
                .map(|call| WireToolCallOut {
                    id: &call.id,
                    kind: "function",
                    function: WireFunctionOut {
                        name: &call.name,
                        arguments: call.arguments.to_string(),
                    },
                })
                .collect(),
            tool_call_id: message.tool_call_id.as_deref(),
        }
    }
}

#[derive(Deserialize)]
struct WireResponse {
    #[serde(default)]
    choices: Vec<WireChoice>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
struct WireChoice {
    #[serde(default)]
    message: Option<WireResponseMessage>,
}

#[derive(Deserialize)]
struct WireResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<WireToolCallIn>,
}

#[derive(Deserialize)]
struct WireToolCallIn {
    id: String,
    function: WireFunctionIn,
}

#[derive(Deserialize)]
struct WireFunctionIn {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Default, Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}
