//! Reaction markers in model replies.
//!
//! Models are asked to prefix a reply with `[TAPBACK:<kind>]` when they want
//! the agent to react to the user's message. Older prompts produced bare or
//! past-tense bracketed names, which are still accepted. Only a marker at the
//! very start of the reply counts.

use flux_agent_core::ReactionType;

/// Accepted markers, checked in order. Matching ignores ASCII case.
const MARKERS: &[(&str, ReactionType)] = &[
    ("[TAPBACK:love]", ReactionType::Love),
    ("[TAPBACK:like]", ReactionType::Like),
    ("[TAPBACK:dislike]", ReactionType::Dislike),
    ("[TAPBACK:laugh]", ReactionType::Laugh),
    ("[TAPBACK:emphasize]", ReactionType::Emphasize),
    ("[TAPBACK:question]", ReactionType::Question),
    // Legacy spellings.
    ("[Love]", ReactionType::Love),
    ("[Like]", ReactionType::Like),
    ("[Dislike]", ReactionType::Dislike),
    ("[Laugh]", ReactionType::Laugh),
    ("[Emphasize]", ReactionType::Emphasize),
    ("[Question]", ReactionType::Question),
    ("[Loved]", ReactionType::Love),
    ("[Liked]", ReactionType::Like),
    ("[Disliked]", ReactionType::Dislike),
    ("[Laughed]", ReactionType::Laugh),
    ("[Emphasized]", ReactionType::Emphasize),
    ("[Questioned]", ReactionType::Question),
];

/// A reply split into its requested reaction and the text to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedReply {
    /// The reaction named by the leading marker, if any.
    pub reaction: Option<ReactionType>,
    /// The reply with leading markers and the whitespace after them removed.
    pub text: String,
}

/// Returns the canonical marker for a reaction.
#[must_use]
pub fn canonical_marker(reaction: ReactionType) -> String {
    format!("[TAPBACK:{reaction}]")
}

/// Splits a leading reaction marker off a reply.
///
/// Consecutive leading markers are all stripped and the first one wins, so
/// the returned text never itself starts with a marker. Without a marker the
/// reply comes back unchanged.
#[must_use]
pub fn extract_reaction(reply: &str) -> TaggedReply {
    let mut reaction = None;
    let mut rest = reply;

    while let Some((kind, len)) = leading_marker(rest) {
        reaction.get_or_insert(kind);
        rest = rest[len..].trim_start();
    }

    match reaction {
        Some(_) => TaggedReply {
            reaction,
            text: rest.to_string(),
        },
        None => TaggedReply {
            reaction: None,
            text: reply.to_string(),
        },
    }
}

fn leading_marker(text: &str) -> Option<(ReactionType, usize)> {
    MARKERS.iter().find_map(|&(pattern, kind)| {
        text.get(..pattern.len())
            .filter(|head| head.eq_ignore_ascii_case(pattern))
            .map(|_| (kind, pattern.len()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(reply: &str) -> (Option<ReactionType>, String) {
        let tagged = extract_reaction(reply);
        (tagged.reaction, tagged.text)
    }

    #[test]
    fn canonical_marker_is_extracted() {
        assert_eq!(
            split("[TAPBACK:love] thanks!"),
            (Some(ReactionType::Love), "thanks!".to_string())
        );
    }

    #[test]
    fn legacy_marker_is_extracted() {
        assert_eq!(
            split("[Laugh] that's great"),
            (Some(ReactionType::Laugh), "that's great".to_string())
        );
        assert_eq!(
            split("[Emphasized]\n\nWow"),
            (Some(ReactionType::Emphasize), "Wow".to_string())
        );
    }

    #[test]
    fn matching_ignores_case() {
        assert_eq!(
            split("[tapback:QUESTION] what?"),
            (Some(ReactionType::Question), "what?".to_string())
        );
        assert_eq!(split("[LIKE] ok").0, Some(ReactionType::Like));
    }

    #[test]
    fn text_without_marker_is_unchanged() {
        assert_eq!(split("no marker here"), (None, "no marker here".to_string()));
        assert_eq!(split("  padded  "), (None, "  padded  ".to_string()));
        assert_eq!(split(""), (None, String::new()));
    }

    #[test]
    fn marker_must_lead() {
        assert_eq!(split("hi [TAPBACK:love]").0, None);
        assert_eq!(split(" [TAPBACK:love] hi").0, None);
    }

    #[test]
    fn unknown_names_are_not_markers() {
        assert_eq!(split("[TAPBACK:wave] x"), (None, "[TAPBACK:wave] x".to_string()));
        assert_eq!(split("[Note] x").0, None);
    }

    #[test]
    fn marker_only_reply_leaves_empty_text() {
        assert_eq!(split("[TAPBACK:like]"), (Some(ReactionType::Like), String::new()));
    }

    #[test]
    fn stacked_markers_report_the_first() {
        assert_eq!(
            split("[love] [TAPBACK:like] hi"),
            (Some(ReactionType::Love), "hi".to_string())
        );
    }

    #[test]
    fn extraction_is_idempotent_on_its_output() {
        let inputs = [
            "[TAPBACK:love] thanks!",
            "[Laugh] that's great",
            "[love] [like] [question] stacked",
            "no marker here",
            "[TAPBACK:dislike]",
            "emoji first 😊 [Like]",
        ];
        for input in inputs {
            let once = extract_reaction(input);
            let twice = extract_reaction(&once.text);
            assert_eq!(twice.reaction, None, "input: {input}");
            assert_eq!(twice.text, once.text, "input: {input}");
        }
    }

    #[test]
    fn multibyte_text_does_not_panic() {
        assert_eq!(split("é[Love]").0, None);
        assert_eq!(split("😊😊😊😊").0, None);
    }

    #[test]
    fn every_reaction_has_a_canonical_marker() {
        for kind in ReactionType::ALL {
            let reply = format!("{} ok", canonical_marker(kind));
            assert_eq!(split(&reply), (Some(kind), "ok".to_string()));
        }
    }
}
