//! Error types for the runner.

use std::fmt;

/// Errors that stop the runner before it serves messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerError {
    /// An upstream client could not be built.
    Build { component: String, reason: String },
}

impl fmt::Display for RunnerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Build { component, reason } => {
                write!(f, "failed to build {component}: {reason}")
            }
        }
    }
}

impl std::error::Error for RunnerError {}
