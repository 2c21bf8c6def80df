//! Chat turn types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The speaker of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions that frame the conversation.
    System,
    /// The human on the other end of the chat.
    User,
    /// The agent.
    Assistant,
}

impl Role {
    /// Returns the wire name used by chat-completion APIs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message in a conversation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    role: Role,
    content: String,
}

impl ChatTurn {
    /// Creates a turn.
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Creates a system turn.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Creates a user turn.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates an assistant turn.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns true for system turns.
    #[must_use]
    pub fn is_system(&self) -> bool {
        self.role == Role::System
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_role() {
        assert_eq!(ChatTurn::system("x").role(), Role::System);
        assert_eq!(ChatTurn::user("x").role(), Role::User);
        assert_eq!(ChatTurn::assistant("x").role(), Role::Assistant);
        assert!(ChatTurn::system("x").is_system());
        assert!(!ChatTurn::user("x").is_system());
    }

    #[test]
    fn turn_serializes_with_wire_role_names() {
        let turn = ChatTurn::assistant("Hello!");
        let json = serde_json::to_value(&turn).expect("serialize");
        assert_eq!(json, serde_json::json!({"role": "assistant", "content": "Hello!"}));
    }
}
