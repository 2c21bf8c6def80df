//! Upstream connectors for flux agents.
//!
//! This crate provides:
//!
//! - **Email**: recent-message lookup over the Gmail REST API
//! - **Search**: web search over the Brave Search REST API
//!
//! Both sit behind traits so agents can be tested with in-memory fakes.

pub mod email;
pub mod error;
pub mod search;

pub use email::{EmailQuery, EmailSource, EmailSummary, GmailClient, GmailConfig};
pub use error::ConnectorError;
pub use search::{BraveSearchClient, BraveSearchConfig, SearchHit, SearchQuery, WebSearch};
