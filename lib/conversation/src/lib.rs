//! Conversation history for flux agents.
//!
//! This crate provides:
//!
//! - **Chat turns**: immutable role-tagged messages
//! - **Conversation history**: a size-bounded, system-preserving turn buffer
//! - **Conversation store**: per-user histories behind per-key locks

pub mod history;
pub mod message;
pub mod store;

pub use history::{ConversationHistory, HistoryConfig};
pub use message::{ChatTurn, Role};
pub use store::ConversationStore;
