//! Recent-email lookup.
//!
//! [`GmailClient`] reads message metadata over the Gmail REST API. Only the
//! headers agents need are requested.

use crate::error::ConnectorError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rootcause::Report;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument};

const UNKNOWN_SENDER: &str = "unknown sender";
const NO_SUBJECT: &str = "no subject";

/// Summary of one message in the mailbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailSummary {
    /// Provider message id.
    pub id: String,
    /// The `From` header.
    pub from: String,
    /// The `Subject` header.
    pub subject: String,
    /// Short plain-text preview.
    pub snippet: String,
    /// When the provider received the message.
    pub received_at: Option<DateTime<Utc>>,
}

impl fmt::Display for EmailSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "From: {}\nSubject: {}", self.from, self.subject)?;
        if !self.snippet.is_empty() {
            write!(f, "\n{}", self.snippet)?;
        }
        Ok(())
    }
}

/// Which messages to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailQuery {
    /// Maximum number of messages.
    pub max_results: u32,
    /// Label the messages must carry.
    pub label: String,
}

impl EmailQuery {
    /// Creates a query.
    #[must_use]
    pub fn new(max_results: u32, label: impl Into<String>) -> Self {
        Self {
            max_results,
            label: label.into(),
        }
    }
}

/// A mailbox that can list its most recent messages.
#[async_trait]
pub trait EmailSource: Send + Sync {
    /// Returns up to `query.max_results` messages, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the mailbox cannot be reached or read.
    async fn recent_emails(
        &self,
        query: &EmailQuery,
    ) -> Result<Vec<EmailSummary>, Report<ConnectorError>>;
}

/// Gmail connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GmailConfig {
    /// API root.
    #[serde(default = "default_gmail_base_url")]
    pub base_url: String,
    /// OAuth access token with the `gmail.readonly` scope.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Messages fetched per lookup.
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    /// Label filter.
    #[serde(default = "default_label")]
    pub label: String,
    /// Request timeout.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_gmail_base_url() -> String {
    "https://gmail.googleapis.com".to_string()
}

fn default_max_results() -> u32 {
    5
}

fn default_label() -> String {
    "INBOX".to_string()
}

fn default_timeout_seconds() -> u64 {
    15
}

impl Default for GmailConfig {
    fn default() -> Self {
        Self {
            base_url: default_gmail_base_url(),
            access_token: None,
            max_results: default_max_results(),
            label: default_label(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl GmailConfig {
    /// The query these settings describe.
    #[must_use]
    pub fn query(&self) -> EmailQuery {
        EmailQuery::new(self.max_results, self.label.clone())
    }
}

#[derive(Deserialize)]
struct ListResponse {
    #[serde(default)]
    messages: Vec<MessageRef>,
}

#[derive(Deserialize)]
struct MessageRef {
    id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageMetadata {
    id: String,
    #[serde(default)]
    snippet: Option<String>,
    #[serde(default)]
    internal_date: Option<String>,
    #[serde(default)]
    payload: Option<Payload>,
}

#[derive(Deserialize)]
struct Payload {
    #[serde(default)]
    headers: Vec<Header>,
}

#[derive(Deserialize)]
struct Header {
    name: String,
    value: String,
}

impl MessageMetadata {
    fn header(&self, name: &str) -> Option<&str> {
        self.payload
            .as_ref()?
            .headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
            .filter(|v| !v.trim().is_empty())
    }

    fn into_summary(self) -> EmailSummary {
        let from = self.header("From").unwrap_or(UNKNOWN_SENDER).to_string();
        let subject = self.header("Subject").unwrap_or(NO_SUBJECT).to_string();
        let received_at = self
            .internal_date
            .as_deref()
            .and_then(|ms| ms.parse::<i64>().ok())
            .and_then(DateTime::<Utc>::from_timestamp_millis);
        EmailSummary {
            id: self.id,
            from,
            subject,
            snippet: self.snippet.unwrap_or_default(),
            received_at,
        }
    }
}

/// Gmail REST client.
pub struct GmailClient {
    client: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
}

impl GmailClient {
    /// Creates a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &GmailConfig) -> Result<Self, Report<ConnectorError>> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ConnectorError::ConnectionFailed {
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: config
                .access_token
                .clone()
                .filter(|token| !token.trim().is_empty()),
        })
    }

    fn token(&self) -> Result<&str, Report<ConnectorError>> {
        self.access_token.as_deref().ok_or_else(|| {
            ConnectorError::NotConfigured {
                connector: "gmail".to_string(),
            }
            .into()
        })
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, Report<ConnectorError>> {
        let response = request
            .bearer_auth(self.token()?)
            .send()
            .await
            .map_err(|e| ConnectorError::from_transport(&e))?;

        if !response.status().is_success() {
            return Err(ConnectorError::from_status(response).await.into());
        }

        response
            .json::<T>()
            .await
            .map_err(|e| {
                ConnectorError::InvalidResponse {
                    reason: e.to_string(),
                }
                .into()
            })
    }
}

#[async_trait]
impl EmailSource for GmailClient {
    #[instrument(skip(self), fields(max_results = query.max_results, label = %query.label))]
    async fn recent_emails(
        &self,
        query: &EmailQuery,
    ) -> Result<Vec<EmailSummary>, Report<ConnectorError>> {
        let messages_url = format!("{}/gmail/v1/users/me/messages", self.base_url);
        let list: ListResponse = self
            .get_json(self.client.get(&messages_url).query(&[
                ("maxResults", query.max_results.to_string()),
                ("labelIds", query.label.clone()),
            ]))
            .await?;

        let mut summaries = Vec::with_capacity(list.messages.len());
        for message in list.messages.iter().take(query.max_results as usize) {
            let metadata: MessageMetadata = self
                .get_json(
                    self.client
                        .get(format!("{messages_url}/{}", message.id))
                        .query(&[
                            ("format", "metadata"),
                            ("metadataHeaders", "From"),
                            ("metadataHeaders", "Subject"),
                        ]),
                )
                .await?;
            summaries.push(metadata.into_summary());
        }

        debug!(count = summaries.len(), "fetched recent emails");
        Ok(summaries)
    }
}
