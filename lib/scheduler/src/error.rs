//! Error types for the scheduler crate.

use std::fmt;

/// Errors from scheduled work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// One run of a job failed. The task keeps running.
    RunFailed { task: String, reason: String },
    /// The task loop panicked or was aborted.
    TaskAborted { task: String },
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RunFailed { task, reason } => {
                write!(f, "task '{task}' run failed: {reason}")
            }
            Self::TaskAborted { task } => write!(f, "task '{task}' aborted"),
        }
    }
}

impl std::error::Error for SchedulerError {}
