//! In-memory fakes shared by the agent tests.

use crate::error::HostError;
use crate::host::{MessageSender, TapbackSender};
use async_trait::async_trait;
use flux_agent_ai::{LlmBackend, LlmError, LlmRequest, LlmResponse};
use flux_agent_core::{MessageGuid, ReactionType, UserId};
use flux_agent_integration::{
    ConnectorError, EmailQuery, EmailSource, EmailSummary, SearchHit, SearchQuery, WebSearch,
};
use rootcause::Report;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Records everything the agent sends to the host.
#[derive(Default)]
pub struct RecordingHost {
    fail: bool,
    messages: Mutex<Vec<(String, String)>>,
    tapbacks: Mutex<Vec<(String, ReactionType)>>,
}

impl RecordingHost {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn messages(&self) -> Vec<(String, String)> {
        self.messages.lock().unwrap().clone()
    }

    pub fn tapbacks(&self) -> Vec<(String, ReactionType)> {
        self.tapbacks.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), Report<HostError>> {
        if self.fail {
            return Err(HostError::DeliveryFailed {
                reason: "host offline".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl MessageSender for RecordingHost {
    async fn send_message(&self, to: &UserId, text: &str) -> Result<bool, Report<HostError>> {
        self.check()?;
        self.messages
            .lock()
            .unwrap()
            .push((to.to_string(), text.to_string()));
        Ok(true)
    }
}

#[async_trait]
impl TapbackSender for RecordingHost {
    async fn send_tapback(
        &self,
        guid: &MessageGuid,
        reaction: ReactionType,
        _user: Option<&UserId>,
    ) -> Result<bool, Report<HostError>> {
        self.check()?;
        self.tapbacks
            .lock()
            .unwrap()
            .push((guid.to_string(), reaction));
        Ok(true)
    }
}

/// Replays scripted completions and records every request. An exhausted
/// script answers with a request failure.
#[derive(Default)]
pub struct FakeBackend {
    replies: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl FakeBackend {
    pub fn replying(replies: &[&str]) -> Self {
        let backend = Self::default();
        for reply in replies {
            backend.push(Ok(LlmResponse::text(*reply)));
        }
        backend
    }

    pub fn failing() -> Self {
        Self::default()
    }

    pub fn push(&self, reply: Result<LlmResponse, LlmError>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmBackend for FakeBackend {
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, Report<LlmError>> {
        self.requests.lock().unwrap().push(request.clone());
        match self.replies.lock().unwrap().pop_front() {
            Some(reply) => reply.map_err(Report::from),
            None => Err(LlmError::RequestFailed {
                reason: "no scripted reply".to_string(),
            }
            .into()),
        }
    }

    fn model(&self) -> &str {
        "fake"
    }
}

/// A mailbox whose contents tests can change between polls.
#[derive(Default)]
pub struct FakeMailbox {
    emails: Mutex<Option<Vec<EmailSummary>>>,
    queries: Mutex<Vec<EmailQuery>>,
}

impl FakeMailbox {
    pub fn with(emails: Vec<EmailSummary>) -> Self {
        let mailbox = Self::default();
        mailbox.set(emails);
        mailbox
    }

    /// A mailbox whose every fetch fails.
    pub fn unreachable() -> Self {
        Self::default()
    }

    pub fn set(&self, emails: Vec<EmailSummary>) {
        *self.emails.lock().unwrap() = Some(emails);
    }

    pub fn queries(&self) -> Vec<EmailQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailSource for FakeMailbox {
    async fn recent_emails(
        &self,
        query: &EmailQuery,
    ) -> Result<Vec<EmailSummary>, Report<ConnectorError>> {
        self.queries.lock().unwrap().push(query.clone());
        self.emails.lock().unwrap().clone().ok_or_else(|| {
            ConnectorError::ConnectionFailed {
                reason: "mailbox offline".to_string(),
            }
            .into()
        })
    }
}

pub fn email(id: &str, from: &str, subject: &str) -> EmailSummary {
    EmailSummary {
        id: id.to_string(),
        from: from.to_string(),
        subject: subject.to_string(),
        snippet: String::new(),
        received_at: None,
    }
}

/// Returns fixed hits, or fails when built with [`FakeSearch::unreachable`].
#[derive(Default)]
pub struct FakeSearch {
    hits: Option<Vec<SearchHit>>,
    queries: Mutex<Vec<SearchQuery>>,
}

impl FakeSearch {
    pub fn with(hits: Vec<SearchHit>) -> Self {
        Self {
            hits: Some(hits),
            ..Self::default()
        }
    }

    pub fn unreachable() -> Self {
        Self::default()
    }

    pub fn queries(&self) -> Vec<SearchQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl WebSearch for FakeSearch {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>, Report<ConnectorError>> {
        self.queries.lock().unwrap().push(query.clone());
        self.hits.clone().ok_or_else(|| ConnectorError::Timeout.into())
    }
}
