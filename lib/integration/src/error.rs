//! Error types for the integration crate.

use std::fmt;

/// Errors from connector operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectorError {
    /// Connection to service failed.
    ConnectionFailed { reason: String },
    /// Authentication failed.
    AuthenticationFailed { reason: String },
    /// Rate limit exceeded.
    RateLimited { retry_after_secs: Option<u64> },
    /// The service answered with a payload we could not read.
    InvalidResponse { reason: String },
    /// Timeout waiting for response.
    Timeout,
    /// Required credentials are not configured.
    NotConfigured { connector: String },
}

impl fmt::Display for ConnectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionFailed { reason } => {
                write!(f, "connection failed: {reason}")
            }
            Self::AuthenticationFailed { reason } => {
                write!(f, "authentication failed: {reason}")
            }
            Self::RateLimited { retry_after_secs } => {
                if let Some(secs) = retry_after_secs {
                    write!(f, "rate limited, retry after {secs}s")
                } else {
                    write!(f, "rate limited")
                }
            }
            Self::InvalidResponse { reason } => {
                write!(f, "invalid response: {reason}")
            }
            Self::Timeout => write!(f, "operation timed out"),
            Self::NotConfigured { connector } => {
                write!(f, "connector '{connector}' is not configured")
            }
        }
    }
}

impl std::error::Error for ConnectorError {}

impl ConnectorError {
    pub(crate) fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::ConnectionFailed {
                reason: err.to_string(),
            }
        }
    }

    /// Maps a non-success HTTP response to an error.
    pub(crate) async fn from_status(response: reqwest::Response) -> Self {
        let status = response.status();
        match status.as_u16() {
            401 | 403 => Self::AuthenticationFailed {
                reason: format!("HTTP {status}"),
            },
            429 => Self::RateLimited {
                retry_after_secs: response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.trim().parse().ok()),
            },
            _ => {
                let body = response.text().await.unwrap_or_default();
                Self::ConnectionFailed {
                    reason: format!("HTTP {status}: {body}"),
                }
            }
        }
    }
}
