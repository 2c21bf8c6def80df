//! Bounded conversation history.
//!
//! The buffer never grows past `max_turns`. When it would, the oldest
//! dialogue turns are dropped; a leading system turn is always kept.

use crate::message::{ChatTurn, Role};
use serde::{Deserialize, Serialize};

/// Smallest cap that still fits a system turn and one dialogue turn.
const MIN_TURNS: usize = 2;

/// Sizing for per-user histories.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    /// Maximum number of turns kept per user, system turn included.
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,
}

fn default_max_turns() -> usize {
    20
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
        }
    }
}

impl HistoryConfig {
    /// Returns the cap, clamped to the supported minimum.
    #[must_use]
    pub fn effective_max_turns(&self) -> usize {
        self.max_turns.max(MIN_TURNS)
    }
}

/// Ordered, size-bounded list of chat turns for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationHistory {
    turns: Vec<ChatTurn>,
    max_turns: usize,
}

impl ConversationHistory {
    /// Creates an empty history.
    #[must_use]
    pub fn new(max_turns: usize) -> Self {
        Self {
            turns: Vec::new(),
            max_turns: max_turns.max(MIN_TURNS),
        }
    }

    /// Creates a history whose first entry is the given system prompt.
    #[must_use]
    pub fn with_system(max_turns: usize, system_prompt: impl Into<String>) -> Self {
        let mut history = Self::new(max_turns);
        history.turns.push(ChatTurn::system(system_prompt));
        history
    }

    /// Appends a turn and drops the oldest dialogue turns past the cap.
    pub fn push(&mut self, turn: ChatTurn) {
        self.turns.push(turn);
        self.enforce_cap();
    }

    /// Appends a turn built from its parts.
    pub fn append(&mut self, role: Role, content: impl Into<String>) {
        self.push(ChatTurn::new(role, content));
    }

    /// Removes the most recent turn equal to `turn`. Returns whether one was
    /// found.
    pub fn retract(&mut self, turn: &ChatTurn) -> bool {
        match self.turns.iter().rposition(|t| t == turn) {
            Some(index) => {
                self.turns.remove(index);
                true
            }
            None => false,
        }
    }

    fn enforce_cap(&mut self) {
        let len = self.turns.len();
        if len <= self.max_turns {
            return;
        }
        let excess = len - self.max_turns;
        if self.starts_with_system() {
            self.turns.drain(1..=excess);
        } else {
            self.turns.drain(..excess);
        }
    }

    /// Returns true when the first entry is a system turn.
    #[must_use]
    pub fn starts_with_system(&self) -> bool {
        self.turns.first().is_some_and(ChatTurn::is_system)
    }

    #[must_use]
    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    #[must_use]
    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    /// Returns the most recent turn, if any.
    #[must_use]
    pub fn last(&self) -> Option<&ChatTurn> {
        self.turns.last()
    }
}
