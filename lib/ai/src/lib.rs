//! AI primitives for flux agents.
//!
//! This crate provides:
//!
//! - **Backend**: the chat-completion abstraction and an OpenAI-compatible client
//! - **Marker**: extraction of model-requested tapbacks from reply text
//! - **Prompt**: system prompts shared by the model-backed agents
//! - **Tool loop**: bounded tool-calling execution against a backend

pub mod backend;
pub mod error;
pub mod marker;
pub mod openai;
pub mod prompt;
pub mod tool_loop;

pub use backend::{
    LlmBackend, LlmMessage, LlmRequest, LlmResponse, MessageRole, TokenUsage, ToolCall, ToolSpec,
};
pub use error::{LlmError, ToolError};
pub use marker::{TaggedReply, extract_reaction};
pub use openai::{OpenAiBackend, OpenAiConfig};
pub use tool_loop::{ToolExecutor, ToolLoop, ToolLoopOutcome};
