//! Error types for the AI crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `LlmError`: chat-completion backend and tool-loop failures
//! - `ToolError`: failures of a single tool invocation

use std::fmt;

/// Errors from LLM backend operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// The provider rejected our credentials.
    AuthenticationFailed { reason: String },
    /// Request failed.
    RequestFailed { reason: String },
    /// Response parsing failed.
    ResponseParseFailed { reason: String },
    /// Timeout waiting for response.
    Timeout,
    /// Rate limit exceeded.
    RateLimited { retry_after_secs: Option<u64> },
    /// Invalid configuration.
    InvalidConfig { reason: String },
    /// The model kept requesting tools past the iteration limit.
    IterationLimit { max: u32 },
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "LLM authentication failed: {reason}")
            }
            Self::RequestFailed { reason } => {
                write!(f, "LLM request failed: {reason}")
            }
            Self::ResponseParseFailed { reason } => {
                write!(f, "failed to parse LLM response: {reason}")
            }
            Self::Timeout => write!(f, "LLM request timed out"),
            Self::RateLimited { retry_after_secs } => {
                if let Some(secs) = retry_after_secs {
                    write!(f, "rate limited, retry after {secs}s")
                } else {
                    write!(f, "rate limited")
                }
            }
            Self::InvalidConfig { reason } => {
                write!(f, "invalid LLM configuration: {reason}")
            }
            Self::IterationLimit { max } => {
                write!(f, "model still requesting tools after {max} iterations")
            }
        }
    }
}

impl std::error::Error for LlmError {}

/// Errors from tool execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// The model asked for a tool we do not offer.
    NotFound { name: String },
    /// The model supplied arguments the tool cannot use.
    InvalidInput { name: String, reason: String },
    /// Tool execution failed.
    ExecutionFailed { name: String, reason: String },
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { name } => write!(f, "tool not found: {name}"),
            Self::InvalidInput { name, reason } => {
                write!(f, "invalid input for tool '{name}': {reason}")
            }
            Self::ExecutionFailed { name, reason } => {
                write!(f, "tool '{name}' execution failed: {reason}")
            }
        }
    }
}

impl std::error::Error for ToolError {}
