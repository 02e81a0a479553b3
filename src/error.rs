//! Unified error handling for the cinetop crate
//!
//! Consolidates the domain-specific errors into a single [`Error`] enum for
//! use across module boundaries, while keeping the domain enums available
//! where callers need to branch on failure kind.
//!
//! Only two failure classes are run-fatal: inability to load the primary
//! listing at all, and inability to ever obtain a non-empty proxy pool.
//! Everything else degrades to a missing field or a missing secondary rating.

use thiserror::Error;

pub use crate::utils::error::{FailureKind, FetchError, ScanError};

/// Unified error type for the cinetop crate
#[derive(Error, Debug)]
pub enum Error {
    /// Fetch-level errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Scan-level errors (listing unavailable, pool exhausted)
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),
}

impl Error {
    /// Check whether this error terminates the whole run
    pub fn is_run_fatal(&self) -> bool {
        matches!(self, Self::Scan(_) | Self::Fetch(FetchError::EmptyPool))
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
