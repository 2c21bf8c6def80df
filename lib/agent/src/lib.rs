//! Flux messaging agents.
//!
//! This crate provides:
//!
//! - **Host contract**: the [`FluxAgent`] trait and the callbacks a host
//!   registers through [`HostCapabilities`]
//! - **Tapbacks**: best-effort reaction dispatch
//! - **Policy**: the keyword rules behind the rule-based agent
//! - **Agents**: keyword, chat, email, search and calculator variants

pub mod calculator;
pub mod chat;
mod dialogue;
pub mod email;
pub mod error;
pub mod host;
pub mod keyword;
pub mod policy;
pub mod search;
pub mod tapback;

#[cfg(test)]
mod testing;

pub use calculator::{CalculatorAgent, CalculatorConfig, CalculatorTool};
pub use chat::ChatAgent;
pub use dialogue::{FALLBACK_REPLY, RESET_REPLY, is_reset};
pub use email::{EmailAgent, MailWatchConfig, MailWatcher};
pub use error::{AgentError, HostError};
pub use host::{Capability, FluxAgent, HostCapabilities, InvokeParams, MessageSender, TapbackSender};
pub use keyword::KeywordAgent;
pub use policy::{PolicyDecision, decide};
pub use search::SearchAgent;
pub use tapback::Tapbacks;
