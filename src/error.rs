//! Error types for the BeatSaver client
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! "Not found" is never an error: endpoint methods return `Ok(None)` for a
//! 404 so callers can tell absence apart from failure.

use crate::http::RateLimitInfo;
use thiserror::Error;

/// The main error type for the BeatSaver client
#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Request Errors
    // ============================================================================
    #[error("Invalid argument: {name} must not be empty")]
    InvalidArgument { name: String },

    #[error("Request cancelled")]
    Cancelled,

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {reason}")]
    HttpStatus { status: u16, reason: String },

    #[error("Rate limited: {} of {} requests remaining, resets at {}", info.remaining, info.total, info.reset_at)]
    RateLimited { info: RateLimitInfo },

    #[error("HTTP {status} without parseable rate limit headers")]
    MalformedRateLimit { status: u16 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Pagination Errors
    // ============================================================================
    #[error("Page has no next page")]
    NoNextPage,

    #[error("Page has no previous page")]
    NoPreviousPage,

    #[error("Not attached to a live client")]
    Detached,

    // ============================================================================
    // Partial Entity Errors
    // ============================================================================
    #[error("Partial beatmap key '{key}' did not resolve to a beatmap")]
    InvalidPartialKey { key: String },

    #[error("Partial beatmap hash '{hash}' did not resolve to a beatmap")]
    InvalidPartialHash { hash: String },

    #[error("Partial beatmap has neither key nor hash")]
    InvalidPartial,

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(name: impl Into<String>) -> Self {
        Self::InvalidArgument { name: name.into() }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, reason: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            reason: reason.into(),
        }
    }

    /// Whether this error came from the transport layer
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Http(_) | Error::HttpStatus { .. } | Error::MalformedRateLimit { .. }
        )
    }

    /// Whether this error came from a partial entity that could not be populated
    pub fn is_invalid_partial(&self) -> bool {
        matches!(
            self,
            Error::InvalidPartialKey { .. } | Error::InvalidPartialHash { .. } | Error::InvalidPartial
        )
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(e) => e.is_timeout() || e.is_connect(),
            Error::RateLimited { .. } => true,
            Error::HttpStatus { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }
}

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Result type alias for the BeatSaver client
pub type Result<T> = std::result::Result<T, Error>;
