//! Model-backed turn handling shared by the conversational agents.

use crate::host::InvokeParams;
use crate::tapback::Tapbacks;
use flux_agent_ai::{LlmBackend, LlmMessage, LlmRequest, extract_reaction};
use flux_agent_conversation::{ChatTurn, ConversationStore, Role};
use std::sync::Arc;
use tracing::{debug, warn};

/// Reply used whenever the model cannot be reached.
pub const FALLBACK_REPLY: &str =
    "Sorry, I'm having trouble thinking right now. Please try again in a moment.";

/// Reply to the `reset` command.
pub const RESET_REPLY: &str = "Conversation cleared. Let's start fresh! ✨";

/// Returns true if `message` is the `reset` command.
#[must_use]
pub fn is_reset(message: &str) -> bool {
    message.trim().eq_ignore_ascii_case("reset")
}

/// One user's dialogue with a model: history in, cleaned reply out.
pub(crate) struct Dialogue {
    backend: Arc<dyn LlmBackend>,
    store: ConversationStore,
    tapbacks: Tapbacks,
}

impl Dialogue {
    pub(crate) fn new(backend: Arc<dyn LlmBackend>, store: ConversationStore) -> Self {
        Self {
            backend,
            store,
            tapbacks: Tapbacks::new(),
        }
    }

    pub(crate) fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub(crate) fn tapbacks(&self) -> &Tapbacks {
        &self.tapbacks
    }

    /// Clears the sender's history if the message is `reset`.
    pub(crate) fn try_reset(&self, params: &InvokeParams) -> Option<String> {
        if !is_reset(&params.message) {
            return None;
        }
        let cleared = self.store.clear(&params.user_phone_number);
        debug!(user = %params.user_phone_number, cleared, "conversation reset");
        Some(RESET_REPLY.to_string())
    }

    /// Runs one turn.
    ///
    /// The plain message is recorded in history. When `context` is given it
    /// is prepended to the message sent to the model for this turn only, as
    /// is any attached image. If the model call fails the message is taken
    /// back out of history.
    pub(crate) async fn respond(&self, params: &InvokeParams, context: Option<String>) -> String {
        let user = &params.user_phone_number;
        let turn = ChatTurn::user(params.message.clone());
        let history = self.store.append_and_snapshot(user, turn.clone());
        let earlier = history.turns().split_last().map_or(history.turns(), |(_, earlier)| earlier);

        let content = match context {
            Some(context) => format!("{context}\n\nUser message: {}", params.message),
            None => params.message.clone(),
        };
        let mut message = LlmMessage::user(content);
        if let Some(image) = &params.image_base64 {
            message = message.with_image(image.clone());
        }
        let request = LlmRequest::from_turns(earlier).with_message(message);

        let response = match self.backend.generate(&request).await {
            Ok(response) => response,
            Err(report) => {
                warn!(user = %user, error = %report, "model call failed");
                self.store.retract(user, &turn);
                return FALLBACK_REPLY.to_string();
            }
        };

        let tagged = extract_reaction(&response.content);
        let text = if tagged.text.trim().is_empty() {
            FALLBACK_REPLY.to_string()
        } else {
            tagged.text
        };
        self.store.append(user, Role::Assistant, text.clone());

        if let Some(reaction) = tagged.reaction {
            self.tapbacks
                .react(params.message_guid.as_ref(), reaction, user)
                .await;
        }
        debug!(
            user = %user,
            reaction = ?tagged.reaction,
            tokens = response.usage.total(),
            "model replied"
        );
        text
    }
}
