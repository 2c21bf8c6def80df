//! The email-aware agent and its mailbox watcher.
//!
//! Every message is answered with the most recent emails in the model's
//! context. When the host can send messages and a recipient is configured,
//! [`MailWatcher`] also polls the mailbox and pushes a notification for each
//! email it has not seen before.

use crate::dialogue::Dialogue;
use crate::error::AgentError;
use crate::host::{Capability, FluxAgent, HostCapabilities, InvokeParams, MessageSender};
use async_trait::async_trait;
use flux_agent_ai::{LlmBackend, prompt};
use flux_agent_conversation::{ConversationStore, HistoryConfig};
use flux_agent_core::{InvocationId, UserId};
use flux_agent_integration::{ConnectorError, EmailQuery, EmailSource, EmailSummary};
use flux_agent_scheduler::{IntervalJob, IntervalTask, SchedulerError, TaskHandle};
use rootcause::Report;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

const WATCH_TASK: &str = "mail-watch";

/// Mailbox watch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailWatchConfig {
    /// Seconds between polls. Values below 1 are treated as 1.
    #[serde(default = "default_poll_interval_seconds")]
    pub poll_interval_seconds: u64,
    /// Who receives new-email notifications. No watcher runs without one.
    #[serde(default)]
    pub notify_to: Option<UserId>,
    /// Notify for emails already present on the first poll.
    #[serde(default)]
    pub notify_on_first_poll: bool,
}

fn default_poll_interval_seconds() -> u64 {
    30
}

impl Default for MailWatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: default_poll_interval_seconds(),
            notify_to: None,
            notify_on_first_poll: false,
        }
    }
}

impl MailWatchConfig {
    /// The poll period.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds.max(1))
    }
}

/// Formats fetched emails as the model's context block.
fn email_context(fetched: &Result<Vec<EmailSummary>, Report<ConnectorError>>) -> String {
    match fetched {
        Ok(emails) if emails.is_empty() => "Recent emails: the inbox is empty.".to_string(),
        Ok(emails) => {
            let listed: Vec<String> = emails
                .iter()
                .enumerate()
                .map(|(i, email)| format!("{}. {email}", i + 1))
                .collect();
            format!("Recent emails:\n{}", listed.join("\n\n"))
        }
        Err(_) => "Recent emails: email is unavailable right now.".to_string(),
    }
}

/// Text of a new-email notification.
fn notification_text(email: &EmailSummary) -> String {
    let mut text = format!("📧 New email from {}\n{}", email.from, email.subject);
    if !email.snippet.is_empty() {
        text.push('\n');
        text.push_str(&email.snippet);
    }
    text
}

/// Answers with the user's recent emails in context.
pub struct EmailAgent {
    dialogue: Dialogue,
    source: Arc<dyn EmailSource>,
    query: EmailQuery,
    watch: MailWatchConfig,
    watcher: Mutex<Option<TaskHandle>>,
}

impl EmailAgent {
    /// Creates the agent with its own history store.
    #[must_use]
    pub fn new(
        backend: Arc<dyn LlmBackend>,
        source: Arc<dyn EmailSource>,
        query: EmailQuery,
        watch: MailWatchConfig,
        history: &HistoryConfig,
    ) -> Self {
        let store =
            ConversationStore::new(history).with_system_prompt(prompt::email_system_prompt());
        Self {
            dialogue: Dialogue::new(backend, store),
            source,
            query,
            watch,
            watcher: Mutex::new(None),
        }
    }

    /// The history store.
    #[must_use]
    pub fn store(&self) -> &ConversationStore {
        self.dialogue.store()
    }

    /// Returns true while a mailbox watcher is running.
    #[must_use]
    pub fn is_watching(&self) -> bool {
        self.watcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_stopped())
    }

    fn take_watcher(&self) -> Option<TaskHandle> {
        self.watcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

#[async_trait]
impl FluxAgent for EmailAgent {
    fn name(&self) -> &'static str {
        "email"
    }

    #[instrument(
        skip(self, params),
        fields(invocation = %InvocationId::new(), user = %params.user_phone_number)
    )]
    async fn invoke(&self, params: InvokeParams) -> String {
        if let Some(reply) = self.dialogue.try_reset(&params) {
            return reply;
        }

        let fetched = self.source.recent_emails(&self.query).await;
        match &fetched {
            Ok(emails) => debug!(count = emails.len(), "emails fetched"),
            Err(report) => warn!(error = %report, "email fetch failed"),
        }
        self.dialogue
            .respond(&params, Some(email_context(&fetched)))
            .await
    }

    async fn on_init(&self, capabilities: HostCapabilities) -> Result<(), Report<AgentError>> {
        self.dialogue.tapbacks().register(capabilities.send_tapback.clone());

        let Some(recipient) = self.watch.notify_to.clone() else {
            debug!("no notification recipient, mailbox watch disabled");
            return Ok(());
        };
        capabilities.require(&[Capability::SendMessage])?;
        let Some(sender) = capabilities.send_message else {
            return Ok(());
        };

        let watcher = MailWatcher::new(
            Arc::clone(&self.source),
            self.query.clone(),
            sender,
            recipient,
        )
        .notify_on_first_poll(self.watch.notify_on_first_poll);
        let handle = IntervalTask::spawn(WATCH_TASK, self.watch.poll_interval(), watcher);

        let previous = self
            .watcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);
        if let Some(previous) = previous {
            previous.stop();
        }
        Ok(())
    }

    async fn on_shutdown(&self) {
        info!(agent = self.name(), "agent shutting down");
        if let Some(handle) = self.take_watcher() {
            handle.stop();
            if let Err(report) = handle.join().await {
                warn!(error = %report, "mailbox watcher did not stop cleanly");
            }
        }
    }
}

/// Ids from the last two fetches. Anything older has left the fetch window.
#[derive(Default)]
struct WatchState {
    previous: HashSet<String>,
    latest: HashSet<String>,
    primed: bool,
}

impl WatchState {
    fn is_seen(&self, id: &str) -> bool {
        self.latest.contains(id) || self.previous.contains(id)
    }

    #[cfg(test)]
    fn seen_count(&self) -> usize {
        self.latest.union(&self.previous).count()
    }
}

/// Polls a mailbox and notifies a recipient about emails it has not seen.
///
/// The first successful poll only records what is already there, unless
/// [`notify_on_first_poll`](Self::notify_on_first_poll) is set.
pub struct MailWatcher {
    source: Arc<dyn EmailSource>,
    query: EmailQuery,
    sender: Arc<dyn MessageSender>,
    recipient: UserId,
    notify_on_first_poll: bool,
    state: Mutex<WatchState>,
}

impl MailWatcher {
    /// Creates a watcher.
    #[must_use]
    pub fn new(
        source: Arc<dyn EmailSource>,
        query: EmailQuery,
        sender: Arc<dyn MessageSender>,
        recipient: UserId,
    ) -> Self {
        Self {
            source,
            query,
            sender,
            recipient,
            notify_on_first_poll: false,
            state: Mutex::new(WatchState::default()),
        }
    }

    /// Also notifies for emails found on the first poll.
    #[must_use]
    pub fn notify_on_first_poll(mut self, notify: bool) -> Self {
        self.notify_on_first_poll = notify;
        self
    }

    /// Marks the fetched emails seen and returns the new ones, oldest first.
    fn unseen(&self, emails: Vec<EmailSummary>) -> Vec<EmailSummary> {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let state = &mut *guard;
        let baseline = !state.primed;
        state.primed = true;

        let fetched: HashSet<String> = emails.iter().map(|email| email.id.clone()).collect();
        let mut batch = HashSet::new();
        let mut fresh: Vec<EmailSummary> = emails
            .into_iter()
            .filter(|email| !state.is_seen(&email.id) && batch.insert(email.id.clone()))
            .collect();
        state.previous = std::mem::replace(&mut state.latest, fetched);
        if baseline && !self.notify_on_first_poll {
            debug!(count = fresh.len(), "mailbox baseline recorded");
            return Vec::new();
        }
        fresh.reverse();
        fresh
    }
}

#[async_trait]
impl IntervalJob for MailWatcher {
    async fn run_once(&self) -> Result<(), Report<SchedulerError>> {
        let emails = self
            .source
            .recent_emails(&self.query)
            .await
            .map_err(|report| SchedulerError::RunFailed {
                task: WATCH_TASK.to_string(),
                reason: report.to_string(),
            })?;

        for email in self.unseen(emails) {
            let text = notification_text(&email);
            match self.sender.send_message(&self.recipient, &text).await {
                Ok(true) => debug!(email = %email.id, "new email notification sent"),
                Ok(false) => warn!(email = %email.id, "host declined new email notification"),
                Err(report) => {
                    warn!(email = %email.id, error = %report, "new email notification failed");
                }
            }
        }
        Ok(())
    }
}
