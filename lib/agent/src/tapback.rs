//! Best-effort reaction dispatch.

use crate::host::TapbackSender;
use flux_agent_core::{MessageGuid, ReactionType, UserId};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, warn};

/// Holds the host's tapback callback and sends reactions through it.
///
/// Reacting never fails: every problem is logged and swallowed so the reply
/// is delivered regardless.
#[derive(Default)]
pub struct Tapbacks {
    sender: RwLock<Option<Arc<dyn TapbackSender>>>,
}

impl Tapbacks {
    /// Creates an empty dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the registered callback.
    pub fn register(&self, sender: Option<Arc<dyn TapbackSender>>) {
        *self
            .sender
            .write()
            .unwrap_or_else(PoisonError::into_inner) = sender;
    }

    /// Returns true if a callback is registered.
    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.current().is_some()
    }

    fn current(&self) -> Option<Arc<dyn TapbackSender>> {
        self.sender
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Puts `reaction` on the message `guid` from `user`.
    pub async fn react(&self, guid: Option<&MessageGuid>, reaction: ReactionType, user: &UserId) {
        let Some(guid) = guid else {
            debug!(%reaction, user = %user, "no message guid, skipping tapback");
            return;
        };
        let Some(sender) = self.current() else {
            debug!(%reaction, user = %user, "tapback capability not registered");
            return;
        };

        match sender.send_tapback(guid, reaction, Some(user)).await {
            Ok(true) => debug!(%reaction, guid = %guid, "tapback sent"),
            Ok(false) => warn!(%reaction, guid = %guid, "host declined tapback"),
            Err(report) => warn!(%reaction, guid = %guid, error = %report, "tapback failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingHost;

    #[tokio::test]
    async fn react_sends_through_registered_host() {
        let host = Arc::new(RecordingHost::default());
        let tapbacks = Tapbacks::new();
        tapbacks.register(Some(host.clone()));

        let guid = MessageGuid::new("g-1");
        tapbacks
            .react(Some(&guid), ReactionType::Love, &UserId::new("+1"))
            .await;

        assert_eq!(host.tapbacks(), vec![("g-1".to_string(), ReactionType::Love)]);
    }

    #[tokio::test]
    async fn react_without_guid_or_sender_is_a_no_op() {
        let host = Arc::new(RecordingHost::default());
        let tapbacks = Tapbacks::new();
        let user = UserId::new("+1");

        tapbacks
            .react(Some(&MessageGuid::new("g")), ReactionType::Like, &user)
            .await;
        assert!(!tapbacks.is_registered());

        tapbacks.register(Some(host.clone()));
        tapbacks.react(None, ReactionType::Like, &user).await;
        assert!(host.tapbacks().is_empty());
    }

    #[tokio::test]
    async fn failing_host_is_swallowed() {
        let host = Arc::new(RecordingHost::failing());
        let tapbacks = Tapbacks::new();
        tapbacks.register(Some(host.clone()));

        tapbacks
            .react(Some(&MessageGuid::new("g")), ReactionType::Laugh, &UserId::new("+1"))
            .await;
        assert!(host.tapbacks().is_empty());
    }
}
