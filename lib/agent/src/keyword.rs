//! The rule-based agent.

use crate::error::AgentError;
use crate::host::{FluxAgent, HostCapabilities, InvokeParams};
use crate::policy;
use crate::tapback::Tapbacks;
use async_trait::async_trait;
use flux_agent_core::InvocationId;
use rootcause::Report;
use tracing::{debug, instrument};

/// Replies and reacts from fixed keyword rules. Makes no upstream calls.
#[derive(Default)]
pub struct KeywordAgent {
    tapbacks: Tapbacks,
}

impl KeywordAgent {
    /// Creates the agent.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FluxAgent for KeywordAgent {
    fn name(&self) -> &'static str {
        "keyword"
    }

    #[instrument(
        skip(self, params),
        fields(invocation = %InvocationId::new(), user = %params.user_phone_number)
    )]
    async fn invoke(&self, params: InvokeParams) -> String {
        let decision = policy::decide(&params.message);
        debug!(reaction = ?decision.reaction, "keyword decision");

        if let Some(reaction) = decision.reaction {
            self.tapbacks
                .react(params.message_guid.as_ref(), reaction, &params.user_phone_number)
                .await;
        }
        decision.reply.to_string()
    }

    async fn on_init(&self, capabilities: HostCapabilities) -> Result<(), Report<AgentError>> {
        self.tapbacks.register(capabilities.send_tapback);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingHost;
    use flux_agent_core::{MessageGuid, ReactionType, UserId};
    use std::sync::Arc;

    async fn agent_with_host() -> (KeywordAgent, Arc<RecordingHost>) {
        let host = Arc::new(RecordingHost::default());
        let agent = KeywordAgent::new();
        agent
            .on_init(HostCapabilities::new().with_tapback_sender(host.clone()))
            .await
            .expect("init succeeds");
        (agent, host)
    }

    #[tokio::test]
    async fn thanks_replies_and_loves_the_message() {
        let (agent, host) = agent_with_host().await;
        let reply = agent
            .invoke(InvokeParams::new("thanks!", UserId::new("+1")).with_guid(MessageGuid::new("g-7")))
            .await;

        assert_eq!(reply, "You're welcome! 😊");
        assert_eq!(host.tapbacks(), vec![("g-7".to_string(), ReactionType::Love)]);
    }

    #[tokio::test]
    async fn greeting_sends_no_tapback() {
        let (agent, host) = agent_with_host().await;
        let reply = agent
            .invoke(InvokeParams::new("hi", UserId::new("+1")).with_guid(MessageGuid::new("g")))
            .await;

        assert!(reply.starts_with("Hey there!"));
        assert!(host.tapbacks().is_empty());
    }

    #[tokio::test]
    async fn works_without_capabilities() {
        let agent = KeywordAgent::new();
        let reply = agent.invoke(InvokeParams::new("cool", UserId::new("+1"))).await;
        assert_eq!(reply, "👍");
    }

    #[tokio::test]
    async fn tapback_failure_keeps_reply() {
        let host = Arc::new(RecordingHost::failing());
        let agent = KeywordAgent::new();
        agent
            .on_init(HostCapabilities::new().with_tapback_sender(host))
            .await
            .expect("init succeeds");

        let reply = agent
            .invoke(InvokeParams::new("haha", UserId::new("+1")).with_guid(MessageGuid::new("g")))
            .await;
        assert_eq!(reply, "Glad you found it funny! 😄");
    }
}
