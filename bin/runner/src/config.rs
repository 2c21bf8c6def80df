//! Runner configuration.
//!
//! Loaded via the `config` crate from `FLUX`-prefixed environment variables,
//! with `__` after the prefix and between nested keys: `FLUX__AGENT=chat`,
//! `FLUX__LLM__API_KEY=...`, `FLUX__MAIL_WATCH__NOTIFY_TO=+15551234567`.
//!
//! Values are left as strings until deserialization, so numeric fields are
//! converted on demand and phone numbers keep their leading `+`.

use flux_agent::{CalculatorConfig, MailWatchConfig};
use flux_agent_ai::OpenAiConfig;
use flux_agent_conversation::HistoryConfig;
use flux_agent_integration::{BraveSearchConfig, GmailConfig};
use serde::Deserialize;
use std::fmt;

/// Which agent variant to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    /// Rule-based replies and tapbacks.
    #[default]
    Keyword,
    /// Conversational model agent.
    Chat,
    /// Model agent with recent emails in context.
    Email,
    /// Model agent with web search results in context.
    Search,
    /// Tool-calling arithmetic agent.
    Calculator,
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Keyword => "keyword",
            Self::Chat => "chat",
            Self::Email => "email",
            Self::Search => "search",
            Self::Calculator => "calculator",
        };
        f.write_str(name)
    }
}

/// Runner configuration composed from library configs.
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerConfig {
    /// Agent variant.
    #[serde(default)]
    pub agent: AgentKind,

    /// Sender used for console lines without a `user:` prefix.
    #[serde(default = "default_user")]
    pub default_user: String,

    /// Chat-completion backend.
    #[serde(default)]
    pub llm: OpenAiConfig,

    /// Per-user history sizing.
    #[serde(default)]
    pub history: HistoryConfig,

    /// Mailbox access for the email agent.
    #[serde(default)]
    pub email: GmailConfig,

    /// New-email notifications for the email agent.
    #[serde(default)]
    pub mail_watch: MailWatchConfig,

    /// Web search for the search agent.
    #[serde(default)]
    pub search: BraveSearchConfig,

    /// Tool loop limits for the calculator agent.
    #[serde(default)]
    pub calculator: CalculatorConfig,
}

const ENV_PREFIX: &str = "FLUX";

fn default_user() -> String {
    "console".to_string()
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
}

impl RunnerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a value is present but invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_source(environment())
    }

    fn from_source(source: config::Environment) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: RunnerConfig = serde_json::from_str("{}").expect("deserializes");
        assert_eq!(config.agent, AgentKind::Keyword);
        assert_eq!(config.default_user, "console");
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.history.max_turns, 20);
        assert_eq!(config.email.max_results, 5);
        assert_eq!(config.email.label, "INBOX");
        assert_eq!(config.mail_watch.poll_interval_seconds, 30);
        assert!(config.mail_watch.notify_to.is_none());
        assert_eq!(config.search.result_count, 3);
        assert_eq!(config.calculator.max_iterations, 5);
    }

    #[test]
    fn nested_values_override_defaults() {
        let config: RunnerConfig = serde_json::from_str(
            r#"{"agent": "email", "mail_watch": {"notify_to": "+15551234567", "poll_interval_seconds": 10}}"#,
        )
        .expect("deserializes");
        assert_eq!(config.agent, AgentKind::Email);
        assert_eq!(config.mail_watch.poll_interval_seconds, 10);
        assert_eq!(
            config.mail_watch.notify_to.as_ref().map(|u| u.as_str()),
            Some("+15551234567")
        );
    }

    fn from_vars(vars: &[(&str, &str)]) -> RunnerConfig {
        let vars: config::Map<String, String> = vars
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        RunnerConfig::from_source(environment().source(Some(vars))).expect("config loads")
    }

    #[test]
    fn env_nested_keys_override_defaults() {
        let config = from_vars(&[
            ("FLUX__AGENT", "email"),
            ("FLUX__MAIL_WATCH__POLL_INTERVAL_SECONDS", "10"),
            ("FLUX__MAIL_WATCH__NOTIFY_ON_FIRST_POLL", "true"),
            ("FLUX__HISTORY__MAX_TURNS", "8"),
        ]);
        assert_eq!(config.agent, AgentKind::Email);
        assert_eq!(config.mail_watch.poll_interval_seconds, 10);
        assert!(config.mail_watch.notify_on_first_poll);
        assert_eq!(config.history.max_turns, 8);
        assert_eq!(config.email.max_results, 5);
    }

    #[test]
    fn env_phone_number_keeps_plus() {
        let config = from_vars(&[("FLUX__MAIL_WATCH__NOTIFY_TO", "+15551234567")]);
        assert_eq!(
            config.mail_watch.notify_to.as_ref().map(|u| u.as_str()),
            Some("+15551234567")
        );
    }

    #[test]
    fn env_without_prefix_is_ignored() {
        let config = from_vars(&[
            ("EMAIL", "someone@example.com"),
            ("AGENT", "chat"),
            ("HISTORY__MAX_TURNS", "not a number"),
        ]);
        assert_eq!(config.agent, AgentKind::Keyword);
        assert_eq!(config.email.label, "INBOX");
        assert_eq!(config.history.max_turns, 20);
    }

    #[test]
    fn env_invalid_value_is_an_error() {
        let vars: config::Map<String, String> =
            [("FLUX__HISTORY__MAX_TURNS".to_string(), "lots".to_string())]
                .into_iter()
                .collect();
        assert!(RunnerConfig::from_source(environment().source(Some(vars))).is_err());
    }

    #[test]
    fn agent_kind_display_matches_config_name() {
        assert_eq!(AgentKind::Calculator.to_string(), "calculator");
    }
}
