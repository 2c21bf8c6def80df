//! Rule-based reactions and replies.
//!
//! Rules run against the trimmed, lower-cased message in priority order and
//! the first match wins. The order and the short-question threshold are part
//! of the observable behavior.

use flux_agent_core::ReactionType;

/// Messages shorter than this (in characters) that contain `?` get a
/// question reaction.
const SHORT_QUESTION_CHARS: usize = 10;

const LOVE_REPLY: &str = "You're welcome! 😊";
const LAUGH_REPLY: &str = "Glad you found it funny! 😄";
const EMPHASIZE_REPLY: &str = "I know right?!\nThat's exciting!";
const LIKE_REPLY: &str = "👍";
const QUESTION_REPLY: &str = "Could you tell me more?";
const GREETING_REPLY: &str = "Hey there! 👋\nHow's it going?\nWhat can I help you with today?";
const BUBBLE_TEST_REPLY: &str =
    "Bubble 1: First message\nBubble 2: Second message\nBubble 3: Third message";
const HELP_REPLY: &str = "📱 Chat Agent with Tapbacks!\n\nTry saying:\n\
• 'thanks' - I'll ❤️ your message\n\
• 'haha' - I'll 😂 your message\n\
• 'awesome!' - I'll ‼️ your message\n\
• 'cool' - I'll 👍 your message";
const DEFAULT_REPLY: &str =
    "I'm here! Try 'hi', 'test', 'help', or say 'thanks' to see tapbacks! 😊";

/// What the rule-based agent does with a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDecision {
    /// Reaction to put on the inbound message.
    pub reaction: Option<ReactionType>,
    /// Reply text.
    pub reply: &'static str,
}

impl PolicyDecision {
    const fn react(reaction: ReactionType, reply: &'static str) -> Self {
        Self {
            reaction: Some(reaction),
            reply,
        }
    }

    const fn say(reply: &'static str) -> Self {
        Self {
            reaction: None,
            reply,
        }
    }
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| text.contains(n))
}

/// Decides the reaction and reply for `message`.
#[must_use]
pub fn decide(message: &str) -> PolicyDecision {
    let text = message.trim().to_lowercase();

    if contains_any(&text, &["thank you", "thanks"]) {
        return PolicyDecision::react(ReactionType::Love, LOVE_REPLY);
    }
    if contains_any(&text, &["lol", "haha", "funny"]) {
        return PolicyDecision::react(ReactionType::Laugh, LAUGH_REPLY);
    }
    if text.contains('!') && contains_any(&text, &["wow", "amazing", "awesome"]) {
        return PolicyDecision::react(ReactionType::Emphasize, EMPHASIZE_REPLY);
    }
    if contains_any(&text, &["cool", "nice", "great"]) {
        return PolicyDecision::react(ReactionType::Like, LIKE_REPLY);
    }
    if text.contains('?') && text.chars().count() < SHORT_QUESTION_CHARS {
        return PolicyDecision::react(ReactionType::Question, QUESTION_REPLY);
    }

    match text.as_str() {
        "hi" | "hello" | "hey" => PolicyDecision::say(GREETING_REPLY),
        "test" => PolicyDecision::say(BUBBLE_TEST_REPLY),
        "help" => PolicyDecision::say(HELP_REPLY),
        _ => PolicyDecision::say(DEFAULT_REPLY),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reaction(message: &str) -> Option<ReactionType> {
        decide(message).reaction
    }

    #[test]
    fn thanks_gets_love() {
        let decision = decide("thanks a lot");
        assert_eq!(decision.reaction, Some(ReactionType::Love));
        assert_eq!(decision.reply, LOVE_REPLY);
        assert_eq!(reaction("Thank You so much"), Some(ReactionType::Love));
    }

    #[test]
    fn greeting_has_no_reaction() {
        for greeting in ["hi", "Hello", "  HEY  "] {
            let decision = decide(greeting);
            assert_eq!(decision.reaction, None);
            assert_eq!(decision.reply.lines().count(), 3);
            assert!(decision.reply.starts_with("Hey there!"));
        }
    }

    #[test]
    fn excited_message_gets_emphasize() {
        assert_eq!(reaction("wow that's amazing!"), Some(ReactionType::Emphasize));
        assert_eq!(decide("AWESOME!").reply, EMPHASIZE_REPLY);
    }

    #[test]
    fn excitement_needs_exclamation() {
        assert_eq!(reaction("wow that's amazing"), None);
    }

    #[test]
    fn laugh_and_like() {
        assert_eq!(reaction("haha good one"), Some(ReactionType::Laugh));
        assert_eq!(reaction("that's funny"), Some(ReactionType::Laugh));
        assert_eq!(reaction("cool"), Some(ReactionType::Like));
        assert_eq!(decide("nice").reply, "👍");
    }

    #[test]
    fn earlier_rules_win() {
        assert_eq!(reaction("thanks, haha"), Some(ReactionType::Love));
        assert_eq!(reaction("lol wow amazing!"), Some(ReactionType::Laugh));
        assert_eq!(reaction("wow great!"), Some(ReactionType::Emphasize));
        assert_eq!(reaction("cool?"), Some(ReactionType::Like));
    }

    #[test]
    fn only_short_questions_get_question() {
        assert_eq!(reaction("what?"), Some(ReactionType::Question));
        assert_eq!(reaction("is it 9?"), Some(ReactionType::Question));
        assert_eq!(reaction("what time is it?"), None);
        assert_eq!(reaction("1234567?9"), Some(ReactionType::Question));
        assert_eq!(reaction("12345678?9"), None);
    }

    #[test]
    fn question_length_counts_characters() {
        assert_eq!(reaction("ça va??"), Some(ReactionType::Question));
        assert_eq!(reaction("😊😊😊😊😊😊😊😊?"), Some(ReactionType::Question));
    }

    #[test]
    fn commands_and_default() {
        assert_eq!(decide("test").reply, BUBBLE_TEST_REPLY);
        assert_eq!(decide("HELP").reply, HELP_REPLY);
        assert!(HELP_REPLY.contains("'thanks' - I'll ❤️ your message"));

        let fallback = decide("tell me something");
        assert_eq!(fallback.reaction, None);
        assert_eq!(fallback.reply, DEFAULT_REPLY);
        assert_eq!(decide("").reply, DEFAULT_REPLY);
    }

    #[test]
    fn greeting_must_match_exactly() {
        assert_eq!(decide("hi there").reply, DEFAULT_REPLY);
    }
}
