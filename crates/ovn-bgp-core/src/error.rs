//! Error types for the OVN BGP integration
//!
//! This module defines all error types used throughout the crate.
//!
//! Only [`Error`] ever crosses a public `Result` boundary. [`AddressError`] is
//! produced by gateway classification and [`DeliveryError`] is recorded inside
//! a [`NotificationOutcome`](crate::traits::NotificationOutcome); neither is
//! raised back into the host operation that triggered the event.

use std::net::IpAddr;
use thiserror::Error;

/// Result type alias for OVN BGP operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the OVN BGP integration
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP client errors (client construction, not delivery)
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors (event ingestion)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Gateway address selection failed
    #[error("Address error: {0}")]
    Address(#[from] AddressError),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

/// Failure to pick the gateway address to announce or withdraw
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// None of the gateway's addresses is IPv4
    #[error("No IPv4 address among gateway candidates {candidates:?}")]
    NoIPv4Gateway {
        /// The candidates that were inspected, in order
        candidates: Vec<IpAddr>,
    },
}

/// Failure to deliver a notification to one speaker endpoint
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The endpoint did not answer within its configured timeout
    #[error("request timed out")]
    Timeout,

    /// The endpoint could not be reached
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The endpoint answered with a non-2xx status
    #[error("speaker responded with status {0}")]
    NonSuccessStatus(u16),

    /// The request failed for any other reason
    #[error("request failed: {0}")]
    Request(String),
}
