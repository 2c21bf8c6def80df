//! A host that talks to the terminal.

use async_trait::async_trait;
use flux_agent::{HostError, MessageSender, TapbackSender};
use flux_agent_core::{MessageGuid, ReactionType, UserId};
use rootcause::Report;

/// Prints outbound messages and tapbacks to stdout.
#[derive(Debug, Default)]
pub struct ConsoleHost;

#[async_trait]
impl MessageSender for ConsoleHost {
    async fn send_message(&self, to: &UserId, text: &str) -> Result<bool, Report<HostError>> {
        println!("[message to {to}]");
        for bubble in text.lines() {
            println!("  {bubble}");
        }
        Ok(true)
    }
}

#[async_trait]
impl TapbackSender for ConsoleHost {
    async fn send_tapback(
        &self,
        guid: &MessageGuid,
        reaction: ReactionType,
        _user: Option<&UserId>,
    ) -> Result<bool, Report<HostError>> {
        println!("[tapback {reaction} on {guid}]");
        Ok(true)
    }
}

/// Splits a console line into sender and text.
///
/// `+1555: hi` is a message from `+1555`. A line without a prefix, or with
/// whitespace before the colon, comes from `default_user`. Blank lines give
/// `None`.
#[must_use]
pub fn parse_line(line: &str, default_user: &str) -> Option<(UserId, String)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if let Some((user, text)) = line.split_once(':') {
        let text = text.trim();
        if !user.is_empty() && !user.contains(char::is_whitespace) && !text.is_empty() {
            return Some((UserId::new(user), text.to_string()));
        }
    }
    Some((UserId::new(default_user), line.to_string()))
}
