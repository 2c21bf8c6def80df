//! The web-search agent.

use crate::dialogue::Dialogue;
use crate::error::AgentError;
use crate::host::{FluxAgent, HostCapabilities, InvokeParams};
use async_trait::async_trait;
use flux_agent_ai::{LlmBackend, prompt};
use flux_agent_conversation::{ConversationStore, HistoryConfig};
use flux_agent_core::InvocationId;
use flux_agent_integration::{ConnectorError, SearchHit, SearchQuery, WebSearch};
use rootcause::Report;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

fn search_context(results: &Result<Vec<SearchHit>, Report<ConnectorError>>) -> String {
    match results {
        Ok(hits) if hits.is_empty() => "Search results: nothing relevant was found.".to_string(),
        Ok(hits) => {
            let listed: Vec<String> = hits
                .iter()
                .enumerate()
                .map(|(i, hit)| format!("{}. {hit}", i + 1))
                .collect();
            format!("Search results:\n{}", listed.join("\n"))
        }
        Err(_) => "Search results: search is unavailable right now.".to_string(),
    }
}

/// Answers with fresh web search results in context.
pub struct SearchAgent {
    dialogue: Dialogue,
    search: Arc<dyn WebSearch>,
    result_count: u32,
}

impl SearchAgent {
    /// Creates the agent with its own history store.
    #[must_use]
    pub fn new(
        backend: Arc<dyn LlmBackend>,
        search: Arc<dyn WebSearch>,
        result_count: u32,
        history: &HistoryConfig,
    ) -> Self {
        let store =
            ConversationStore::new(history).with_system_prompt(prompt::search_system_prompt());
        Self {
            dialogue: Dialogue::new(backend, store),
            search,
            result_count: result_count.max(1),
        }
    }

    /// The history store.
    #[must_use]
    pub fn store(&self) -> &ConversationStore {
        self.dialogue.store()
    }
}

#[async_trait]
impl FluxAgent for SearchAgent {
    fn name(&self) -> &'static str {
        "search"
    }

    #[instrument(
        skip(self, params),
        fields(invocation = %InvocationId::new(), user = %params.user_phone_number)
    )]
    async fn invoke(&self, params: InvokeParams) -> String {
        if let Some(reply) = self.dialogue.try_reset(&params) {
            return reply;
        }

        let query = SearchQuery::new(params.message.trim(), self.result_count);
        let results = self.search.search(&query).await;
        match &results {
            Ok(hits) => debug!(hits = hits.len(), "search completed"),
            Err(report) => warn!(error = %report, "web search failed"),
        }
        self.dialogue
            .respond(&params, Some(search_context(&results)))
            .await
    }

    async fn on_init(&self, capabilities: HostCapabilities) -> Result<(), Report<AgentError>> {
        self.dialogue.tapbacks().register(capabilities.send_tapback);
        Ok(())
    }
}
