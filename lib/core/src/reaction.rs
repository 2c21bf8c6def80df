//! Tapback reaction kinds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A lightweight acknowledgment attached to a specific message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionType {
    /// Heart.
    Love,
    /// Thumbs up.
    Like,
    /// Thumbs down.
    Dislike,
    /// "Ha ha".
    Laugh,
    /// Double exclamation.
    Emphasize,
    /// Question mark.
    Question,
}

impl ReactionType {
    /// Every reaction, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Love,
        Self::Like,
        Self::Dislike,
        Self::Laugh,
        Self::Emphasize,
        Self::Question,
    ];

    /// Returns the lower-case canonical name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Love => "love",
            Self::Like => "like",
            Self::Dislike => "dislike",
            Self::Laugh => "laugh",
            Self::Emphasize => "emphasize",
            Self::Question => "question",
        }
    }
}

impl fmt::Display for ReactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known reaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseReactionError {
    /// The rejected input.
    pub input: String,
}

impl fmt::Display for ParseReactionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown reaction type: {}", self.input)
    }
}

impl std::error::Error for ParseReactionError {}

impl FromStr for ReactionType {
    type Err = ParseReactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseReactionError {
                input: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ignores_case() {
        assert_eq!("LOVE".parse::<ReactionType>(), Ok(ReactionType::Love));
        assert_eq!("Emphasize".parse::<ReactionType>(), Ok(ReactionType::Emphasize));
    }

    #[test]
    fn parse_rejects_unknown() {
        let err = "wave".parse::<ReactionType>().unwrap_err();
        assert_eq!(err.input, "wave");
    }

    #[test]
    fn display_matches_canonical_name() {
        for kind in ReactionType::ALL {
            assert_eq!(kind.to_string(), kind.as_str());
            assert_eq!(kind.as_str().parse::<ReactionType>(), Ok(kind));
        }
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&ReactionType::Question).expect("serialize");
        assert_eq!(json, "\"question\"");
    }
}
