//! Common utilities and shared error types

pub mod error;

pub use error::{FailureKind, FetchError, ScanError};
