//! Console runner for flux agents.
//!
//! Builds the configured agent variant and feeds it stdin lines as inbound
//! messages from a [`ConsoleHost`](console::ConsoleHost).

pub mod config;
pub mod console;
pub mod error;

use crate::config::{AgentKind, RunnerConfig};
use crate::error::RunnerError;
use flux_agent::{
    CalculatorAgent, ChatAgent, EmailAgent, FluxAgent, KeywordAgent, SearchAgent,
};
use flux_agent_ai::{LlmBackend, OpenAiBackend};
use flux_agent_integration::{BraveSearchClient, GmailClient};
use rootcause::Report;
use std::sync::Arc;

fn backend(config: &RunnerConfig) -> Result<Arc<dyn LlmBackend>, Report<RunnerError>> {
    let backend = OpenAiBackend::new(config.llm.clone()).map_err(|report| RunnerError::Build {
        component: "llm backend".to_string(),
        reason: report.to_string(),
    })?;
    Ok(Arc::new(backend))
}

/// Builds the agent variant named in `config`.
///
/// # Errors
///
/// Returns an error if an upstream client cannot be built.
pub fn build_agent(config: &RunnerConfig) -> Result<Arc<dyn FluxAgent>, Report<RunnerError>> {
    let agent: Arc<dyn FluxAgent> = match config.agent {
        AgentKind::Keyword => Arc::new(KeywordAgent::new()),
        AgentKind::Chat => Arc::new(ChatAgent::new(backend(config)?, &config.history)),
        AgentKind::Email => {
            let mailbox = GmailClient::new(&config.email).map_err(|report| RunnerError::Build {
                component: "gmail client".to_string(),
                reason: report.to_string(),
            })?;
            Arc::new(EmailAgent::new(
                backend(config)?,
                Arc::new(mailbox),
                config.email.query(),
                config.mail_watch.clone(),
                &config.history,
            ))
        }
        AgentKind::Search => {
            let search =
                BraveSearchClient::new(&config.search).map_err(|report| RunnerError::Build {
                    component: "search client".to_string(),
                    reason: report.to_string(),
                })?;
            Arc::new(SearchAgent::new(
                backend(config)?,
                Arc::new(search),
                config.search.result_count,
                &config.history,
            ))
        }
        AgentKind::Calculator => {
            Arc::new(CalculatorAgent::new(backend(config)?, &config.calculator))
        }
    };
    Ok(agent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(agent: &str) -> RunnerConfig {
        serde_json::from_str(&format!(r#"{{"agent": "{agent}"}}"#)).expect("deserializes")
    }

    #[test]
    fn builds_every_variant() {
        for (kind, name) in [
            ("keyword", "keyword"),
            ("chat", "chat"),
            ("email", "email"),
            ("search", "search"),
            ("calculator", "calculator"),
        ] {
            let agent = build_agent(&config(kind)).expect("agent builds");
            assert_eq!(agent.name(), name);
        }
    }
}
