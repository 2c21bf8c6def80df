//! Error types for the agent crate.
//!
//! - `AgentError`: errors an agent reports to its host
//! - `HostError`: errors a host reports back when a callback fails

use crate::host::Capability;
use std::fmt;

/// Errors raised by agents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    /// A host capability the agent needs was not registered.
    MissingCapability { capability: Capability },
    /// The agent could not finish initializing.
    InitFailed { reason: String },
}

impl fmt::Display for AgentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCapability { capability } => {
                write!(f, "missing host capability: {capability}")
            }
            Self::InitFailed { reason } => write!(f, "agent init failed: {reason}"),
        }
    }
}

impl std::error::Error for AgentError {}

/// Errors raised by host callbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The host could not deliver the message or reaction.
    DeliveryFailed { reason: String },
    /// The recipient or message is unknown to the host.
    UnknownTarget { target: String },
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeliveryFailed { reason } => write!(f, "delivery failed: {reason}"),
            Self::UnknownTarget { target } => write!(f, "unknown target: {target}"),
        }
    }
}

impl std::error::Error for HostError {}
