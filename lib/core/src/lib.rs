//! Core types shared by every flux agent crate.
//!
//! - **Identifiers**: user, message and invocation handles
//! - **Reactions**: the closed set of tapback kinds
//! - **Errors**: the rootcause-backed `Result` alias

pub mod error;
pub mod id;
pub mod reaction;

pub use error::Result;
pub use id::{InvocationId, MessageGuid, ParseIdError, UserId};
pub use reaction::{ParseReactionError, ReactionType};
