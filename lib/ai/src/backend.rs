//! LLM backend abstraction.
//!
//! Agents build an [`LlmRequest`] from role-tagged messages and hand it to an
//! [`LlmBackend`]; the backend owns the model name and transport.

use crate::error::LlmError;
use async_trait::async_trait;
use flux_agent_conversation::{ChatTurn, Role};
use rootcause::Report;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System message.
    System,
    /// User/human message.
    User,
    /// Assistant/AI message.
    Assistant,
    /// Result of a tool call requested by the assistant.
    Tool,
}

impl From<Role> for MessageRole {
    fn from(role: Role) -> Self {
        match role {
            Role::System => Self::System,
            Role::User => Self::User,
            Role::Assistant => Self::Assistant,
        }
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned call identifier, echoed back with the result.
    pub id: String,
    /// The tool name.
    pub name: String,
    /// Arguments for the tool.
    pub arguments: JsonValue,
}

impl ToolCall {
    /// Creates a new tool call.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: JsonValue) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// A tool offered to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Unique name of the tool.
    pub name: String,
    /// Description of what the tool does.
    pub description: String,
    /// JSON schema for the tool's input parameters.
    pub parameters: JsonValue,
}

impl ToolSpec {
    /// Creates a tool spec with an empty object schema.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: serde_json::json!({"type": "object", "properties": {}}),
        }
    }

    /// Sets the input schema.
    #[must_use]
    pub fn with_parameters(mut self, schema: JsonValue) -> Self {
        self.parameters = schema;
        self
    }
}

/// A message sent to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmMessage {
    /// The role of the message sender.
    pub role: MessageRole,
    /// Text content. `None` only for assistant turns that carry tool calls.
    pub content: Option<String>,
    /// Base64 image attached to a user message.
    pub image_base64: Option<String>,
    /// Tool calls made by the assistant in this turn.
    pub tool_calls: Vec<ToolCall>,
    /// For tool messages, the call this result answers.
    pub tool_call_id: Option<String>,
}

impl LlmMessage {
    fn text(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            image_base64: None,
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Creates a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::text(MessageRole::System, content)
    }

    /// Creates a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::text(MessageRole::User, content)
    }

    /// Creates an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::text(MessageRole::Assistant, content)
    }

    /// Creates an assistant message that requests tool calls.
    #[must_use]
    pub fn assistant_tool_calls(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content,
            image_base64: None,
            tool_calls,
            tool_call_id: None,
        }
    }

    /// Creates a tool result message.
    #[must_use]
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::text(MessageRole::Tool, content)
        }
    }

    /// Attaches a base64-encoded image.
    #[must_use]
    pub fn with_image(mut self, image_base64: impl Into<String>) -> Self {
        self.image_base64 = Some(image_base64.into());
        self
    }
}

impl From<&ChatTurn> for LlmMessage {
    fn from(turn: &ChatTurn) -> Self {
        Self::text(turn.role().into(), turn.content())
    }
}

/// A request to an LLM.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmRequest {
    /// Role-tagged messages, oldest first.
    pub messages: Vec<LlmMessage>,
    /// Maximum tokens to generate. Falls back to the backend default.
    pub max_tokens: Option<u32>,
    /// Temperature for sampling. Falls back to the backend default.
    pub temperature: Option<f32>,
    /// Tools the model may call.
    pub tools: Vec<ToolSpec>,
}

impl LlmRequest {
    /// Creates a request from messages.
    #[must_use]
    pub fn new(messages: Vec<LlmMessage>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    /// Creates a request from conversation history.
    #[must_use]
    pub fn from_turns<'a>(turns: impl IntoIterator<Item = &'a ChatTurn>) -> Self {
        Self::new(turns.into_iter().map(LlmMessage::from).collect())
    }

    /// Appends a message.
    #[must_use]
    pub fn with_message(mut self, message: LlmMessage) -> Self {
        self.messages.push(message);
        self
    }

    /// Sets the max tokens.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Sets the temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Offers tools to the model.
    #[must_use]
    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = tools;
        self
    }
}

/// A response from an LLM.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmResponse {
    /// The generated text. Empty when the model only requested tools.
    pub content: String,
    /// Tools the model wants called before it answers.
    pub tool_calls: Vec<ToolCall>,
    /// Token usage statistics.
    pub usage: TokenUsage,
    /// Model that generated the response.
    pub model: String,
}

impl LlmResponse {
    /// Creates a plain text response.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Returns true if the model requested tool calls.
    #[must_use]
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Token usage statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of input tokens.
    pub input_tokens: u32,
    /// Number of output tokens.
    pub output_tokens: u32,
}

impl TokenUsage {
    /// Returns the total number of tokens.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

/// Trait for chat-completion backends.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Generates a completion for the given request.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream call fails or its payload is unusable.
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, Report<LlmError>>;

    /// Returns the model name.
    fn model(&self) -> &str;
}
