//! The conversational agent.

use crate::dialogue::Dialogue;
use crate::error::AgentError;
use crate::host::{FluxAgent, HostCapabilities, InvokeParams};
use async_trait::async_trait;
use flux_agent_ai::{LlmBackend, prompt};
use flux_agent_conversation::{ConversationStore, HistoryConfig};
use flux_agent_core::InvocationId;
use rootcause::Report;
use std::sync::Arc;
use tracing::instrument;

/// Chats with a model, keeping per-user history and letting the model pick
/// tapbacks.
pub struct ChatAgent {
    dialogue: Dialogue,
}

impl ChatAgent {
    /// Creates the agent with its own history store.
    #[must_use]
    pub fn new(backend: Arc<dyn LlmBackend>, history: &HistoryConfig) -> Self {
        let store = ConversationStore::new(history).with_system_prompt(prompt::chat_system_prompt());
        Self {
            dialogue: Dialogue::new(backend, store),
        }
    }

    /// The history store.
    #[must_use]
    pub fn store(&self) -> &ConversationStore {
        self.dialogue.store()
    }
}

#[async_trait]
impl FluxAgent for ChatAgent {
    fn name(&self) -> &'static str {
        "chat"
    }

    #[instrument(
        skip(self, params),
        fields(invocation = %InvocationId::new(), user = %params.user_phone_number)
    )]
    async fn invoke(&self, params: InvokeParams) -> String {
        if let Some(reply) = self.dialogue.try_reset(&params) {
            return reply;
        }
        self.dialogue.respond(&params, None).await
    }

    async fn on_init(&self, capabilities: HostCapabilities) -> Result<(), Report<AgentError>> {
        self.dialogue.tapbacks().register(capabilities.send_tapback);
        Ok(())
    }
}
