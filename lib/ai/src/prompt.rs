//! System prompts for the model-backed agents.

use crate::marker::canonical_marker;
use flux_agent_core::ReactionType;

/// Persona shared by every model-backed agent.
pub const PERSONA: &str = "You are Flux, a friendly assistant that people reach over text message. \
Keep replies short and conversational, like a text from a friend. \
Use plain text only, no markdown. Put each separate thought on its own line; \
every line is delivered as its own message bubble.";

/// Explains the reaction marker to the model.
#[must_use]
pub fn tapback_instructions() -> String {
    let markers: Vec<String> = ReactionType::ALL
        .into_iter()
        .map(canonical_marker)
        .collect();
    format!(
        "You may react to the user's message with a tapback. To do so, start your reply \
with exactly one of these markers: {}. Only react when it feels natural, for example \
love for thanks, laugh for jokes, emphasize for exciting news, question for confusing messages. \
Never put a marker anywhere except the very start of the reply.",
        markers.join(", ")
    )
}

/// System prompt for the plain chat agent.
#[must_use]
pub fn chat_system_prompt() -> String {
    format!("{PERSONA}\n\n{}", tapback_instructions())
}

/// System prompt for the email-aware agent.
#[must_use]
pub fn email_system_prompt() -> String {
    format!(
        "{PERSONA}\n\nYou can see the user's most recent emails, which are provided in each \
message under \"Recent emails\". Use them to answer questions about the user's inbox. \
Summarize; never paste whole emails. If the emails are unavailable, say so briefly.\n\n{}",
        tapback_instructions()
    )
}

/// System prompt for the web-search agent.
#[must_use]
pub fn search_system_prompt() -> String {
    format!(
        "{PERSONA}\n\nEach user message comes with web search results under \"Search results\". \
Answer from those results when they are relevant and say when they don't cover the question."
    )
}

/// System prompt for the calculator agent.
#[must_use]
pub fn calculator_system_prompt() -> String {
    format!(
        "{PERSONA}\n\nYou have a calculator tool. Use it for every arithmetic step instead of \
doing math in your head, then give the final answer."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tapback_instructions_list_every_marker() {
        let text = tapback_instructions();
        for kind in ReactionType::ALL {
            assert!(text.contains(&canonical_marker(kind)), "missing {kind}");
        }
    }

    #[test]
    fn prompts_share_persona() {
        for prompt in [
            chat_system_prompt(),
            email_system_prompt(),
            search_system_prompt(),
            calculator_system_prompt(),
        ] {
            assert!(prompt.starts_with(PERSONA));
        }
    }
}
