//! Process-wide store of per-user histories.
//!
//! The map itself sits behind an `RwLock` that is only held long enough to
//! find or insert a user's slot. Each slot has its own `Mutex`, so appends
//! for different users never wait on each other's history. Lock poisoning is
//! recovered rather than surfaced: none of these operations can fail.

use crate::history::{ConversationHistory, HistoryConfig};
use crate::message::{ChatTurn, Role};
use flux_agent_core::UserId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tracing::debug;

type Slot = Arc<Mutex<ConversationHistory>>;

/// Per-user conversation histories.
///
/// Cloning is cheap; clones share the same underlying map.
#[derive(Debug, Clone)]
pub struct ConversationStore {
    max_turns: usize,
    system_prompt: Option<Arc<str>>,
    slots: Arc<RwLock<HashMap<UserId, Slot>>>,
}

impl ConversationStore {
    /// Creates a store whose new histories start empty.
    #[must_use]
    pub fn new(config: &HistoryConfig) -> Self {
        Self {
            max_turns: config.effective_max_turns(),
            system_prompt: None,
            slots: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Seeds every new history with this system prompt.
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(Arc::from(prompt.into()));
        self
    }

    /// Returns a snapshot of the user's history, creating it if absent.
    #[must_use]
    pub fn get_or_create(&self, user: &UserId) -> ConversationHistory {
        let slot = self.slot(user);
        let history = lock(&slot);
        history.clone()
    }

    /// Appends one turn to the user's history, then enforces the cap.
    pub fn append(&self, user: &UserId, role: Role, content: impl Into<String>) {
        let slot = self.slot(user);
        let mut history = lock(&slot);
        history.append(role, content);
        debug!(user = %user, turns = history.len(), "appended turn");
    }

    /// Appends one turn and returns the resulting history under the same
    /// lock, so the snapshot ends with exactly this turn.
    #[must_use]
    pub fn append_and_snapshot(&self, user: &UserId, turn: ChatTurn) -> ConversationHistory {
        let slot = self.slot(user);
        let mut history = lock(&slot);
        history.push(turn);
        debug!(user = %user, turns = history.len(), "appended turn");
        history.clone()
    }

    /// Removes the most recent turn equal to `turn` from the user's history.
    pub fn retract(&self, user: &UserId, turn: &ChatTurn) -> bool {
        let Some(slot) = self
            .slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(user)
            .cloned()
        else {
            return false;
        };
        let retracted = lock(&slot).retract(turn);
        debug!(user = %user, retracted, "retracted turn");
        retracted
    }

    /// Removes the user's history entirely. Returns whether one existed.
    ///
    /// An append racing with the clear may land in the removed history and
    /// is dropped with it.
    pub fn clear(&self, user: &UserId) -> bool {
        let removed = self
            .slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(user)
            .is_some();
        debug!(user = %user, removed, "cleared history");
        removed
    }

    /// Returns a snapshot of the user's history without creating one.
    #[must_use]
    pub fn history(&self, user: &UserId) -> Option<ConversationHistory> {
        let slot = self
            .slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(user)
            .cloned()?;
        let history = lock(&slot);
        Some(history.clone())
    }

    /// Returns the number of users with a history.
    #[must_use]
    pub fn user_count(&self) -> usize {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    fn slot(&self, user: &UserId) -> Slot {
        if let Some(slot) = self
            .slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(user)
        {
            return Arc::clone(slot);
        }

        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        let slot = slots.entry(user.clone()).or_insert_with(|| {
            let history = match &self.system_prompt {
                Some(prompt) => ConversationHistory::with_system(self.max_turns, prompt.as_ref()),
                None => ConversationHistory::new(self.max_turns),
            };
            Arc::new(Mutex::new(history))
        });
        Arc::clone(slot)
    }
}

fn lock(slot: &Slot) -> MutexGuard<'_, ConversationHistory> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}
