//! The contract between an agent and its messaging host.
//!
//! The host calls [`FluxAgent::on_init`] once with the callbacks it offers,
//! then [`FluxAgent::invoke`] for every inbound message, and finally
//! [`FluxAgent::on_shutdown`].

use crate::error::{AgentError, HostError};
use async_trait::async_trait;
use flux_agent_core::{MessageGuid, ReactionType, UserId};
use rootcause::Report;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{error, info};

/// One inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeParams {
    /// Message text.
    pub message: String,
    /// Sender, usually a phone number.
    pub user_phone_number: UserId,
    /// Host identifier of the message, needed to react to it.
    pub message_guid: Option<MessageGuid>,
    /// Attached image, base64-encoded.
    pub image_base64: Option<String>,
}

impl InvokeParams {
    /// Creates params for a text message.
    #[must_use]
    pub fn new(message: impl Into<String>, user: UserId) -> Self {
        Self {
            message: message.into(),
            user_phone_number: user,
            message_guid: None,
            image_base64: None,
        }
    }

    /// Sets the message GUID.
    #[must_use]
    pub fn with_guid(mut self, guid: MessageGuid) -> Self {
        self.message_guid = Some(guid);
        self
    }

    /// Attaches an image.
    #[must_use]
    pub fn with_image(mut self, image_base64: impl Into<String>) -> Self {
        self.image_base64 = Some(image_base64.into());
        self
    }
}

/// Sends a proactive text message.
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Sends `text` to `to`. `Ok(false)` means the host declined.
    ///
    /// # Errors
    ///
    /// Returns an error if the host failed to deliver.
    async fn send_message(&self, to: &UserId, text: &str) -> Result<bool, Report<HostError>>;
}

/// Reacts to an inbound message.
#[async_trait]
pub trait TapbackSender: Send + Sync {
    /// Puts `reaction` on the message `guid`. `Ok(false)` means the host
    /// declined.
    ///
    /// # Errors
    ///
    /// Returns an error if the host failed to deliver.
    async fn send_tapback(
        &self,
        guid: &MessageGuid,
        reaction: ReactionType,
        user: Option<&UserId>,
    ) -> Result<bool, Report<HostError>>;
}

/// A host callback an agent may rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Proactive messages.
    SendMessage,
    /// Reactions on inbound messages.
    SendTapback,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SendMessage => write!(f, "send_message"),
            Self::SendTapback => write!(f, "send_tapback"),
        }
    }
}

/// Callbacks the host registered at startup.
#[derive(Clone, Default)]
pub struct HostCapabilities {
    /// Proactive message callback.
    pub send_message: Option<Arc<dyn MessageSender>>,
    /// Reaction callback.
    pub send_tapback: Option<Arc<dyn TapbackSender>>,
}

impl HostCapabilities {
    /// Creates an empty capability set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a message sender.
    #[must_use]
    pub fn with_message_sender(mut self, sender: Arc<dyn MessageSender>) -> Self {
        self.send_message = Some(sender);
        self
    }

    /// Registers a tapback sender.
    #[must_use]
    pub fn with_tapback_sender(mut self, sender: Arc<dyn TapbackSender>) -> Self {
        self.send_tapback = Some(sender);
        self
    }

    /// Returns true if `capability` is registered.
    #[must_use]
    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::SendMessage => self.send_message.is_some(),
            Capability::SendTapback => self.send_tapback.is_some(),
        }
    }

    /// Checks that every listed capability is registered.
    ///
    /// # Errors
    ///
    /// Returns `MissingCapability` for the first one that is absent.
    pub fn require(&self, capabilities: &[Capability]) -> Result<(), Report<AgentError>> {
        match capabilities.iter().find(|c| !self.has(**c)) {
            Some(&capability) => Err(AgentError::MissingCapability { capability }.into()),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for HostCapabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostCapabilities")
            .field("send_message", &self.send_message.is_some())
            .field("send_tapback", &self.send_tapback.is_some())
            .finish()
    }
}

/// An agent plugin.
#[async_trait]
pub trait FluxAgent: Send + Sync {
    /// Short variant name used in logs.
    fn name(&self) -> &'static str;

    /// Produces the reply to one inbound message. Never fails; upstream
    /// errors become a fallback reply.
    async fn invoke(&self, params: InvokeParams) -> String;

    /// Stores the host callbacks. Called once before any `invoke`.
    ///
    /// # Errors
    ///
    /// Returns an error if a required capability is missing.
    async fn on_init(&self, _capabilities: HostCapabilities) -> Result<(), Report<AgentError>> {
        Ok(())
    }

    /// Called by the host when it hits an error outside `invoke`.
    async fn on_error(&self, err: &(dyn std::error::Error + Send + Sync)) {
        error!(agent = self.name(), error = %err, "host reported an error");
    }

    /// Called once when the host shuts down.
    async fn on_shutdown(&self) {
        info!(agent = self.name(), "agent shutting down");
    }
}
