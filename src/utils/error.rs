//! Error types for the cinetop pipeline
//!
//! This module defines the domain error types used throughout the application.

use std::fmt;
use thiserror::Error;

/// Enumerated per-attempt failure kind
///
/// Eviction is a property of the kind, not of call-site branching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// Connect/DNS/proxy-tunnel failure; the proxy is at fault
    Transport,
    /// The attempt timed out; transient, the proxy is kept
    Timeout,
    /// Non-2xx response; the upstream is at fault, the proxy is kept
    HttpStatus(u16),
}

impl FailureKind {
    /// Whether this failure discards the proxy it happened through
    pub fn evicts_proxy(&self) -> bool {
        matches!(self, Self::Transport)
    }

    /// Classify a client error into a failure kind
    pub fn from_error(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport => f.write_str("transport failure"),
            Self::Timeout => f.write_str("timeout"),
            Self::HttpStatus(code) => write!(f, "HTTP status {code}"),
        }
    }
}

/// Errors that can occur during HTTP fetching operations
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP client error (construction, request building)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// All retry attempts consumed without a success
    #[error("Retries exhausted for {url}: {last}")]
    RetriesExhausted { url: String, last: FailureKind },

    /// No live proxies available and refresh produced none
    #[error("Proxy pool is empty")]
    EmptyPool,
}

/// Errors that can abort a scan of the primary listing
#[derive(Error, Debug)]
pub enum ScanError {
    /// The listing page itself could not be fetched. Run-fatal: there is
    /// nothing to rank without it.
    #[error("Listing page unavailable: {source}")]
    ListingUnavailable {
        #[source]
        source: FetchError,
    },

    /// The proxy pool emptied mid-scan and could not be refilled
    #[error("Proxy pool exhausted during scan")]
    PoolExhausted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retries_exhausted_names_last_failure() {
        let err = FetchError::RetriesExhausted {
            url: String::from("/listing"),
            last: FailureKind::HttpStatus(503),
        };
        assert_eq!(
            err.to_string(),
            "Retries exhausted for /listing: HTTP status 503"
        );
    }
}
