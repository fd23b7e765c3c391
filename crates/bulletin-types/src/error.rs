//! Error kinds shared across the workspace.

use thiserror::Error;

/// Faults raised by individual crawl strategies.
///
/// Inside the cascade every variant has the same consequence (the strategy
/// yields no notices and the cascade continues), so the variants exist for
/// logging and for the `error` field of a failed result, not for control
/// flow.
#[derive(Error, Debug)]
pub enum CrawlError {
    /// Network, TLS, timeout, or non-2xx response.
    #[error("fetch failed: {message}")]
    Fetch { message: String },

    /// Malformed HTML or an invalid DOM query.
    #[error("parse failed: {message}")]
    Parse { message: String },

    /// Headless browser launch, navigation, or timeout failure.
    #[error("browser failed: {message}")]
    Browser { message: String },
}

impl CrawlError {
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch {
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    pub fn browser(message: impl Into<String>) -> Self {
        Self::Browser {
            message: message.into(),
        }
    }
}

/// Initialization-time configuration failures.
///
/// The only error kind allowed to abort the process, and only at startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {path}: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("cannot write {path}: {reason}")]
    Unwritable { path: String, reason: String },

    #[error("invalid configuration: {reason}")]
    Invalid { reason: String },

    #[error("invalid value for {field}: {reason}")]
    Field { field: String, reason: String },
}
