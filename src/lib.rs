//! cinetop - cinema listings ranked by cross-referenced ratings
//!
//! Aggregates today's cinema listings from a primary catalog source,
//! cross-references every title against an independent rating source, and
//! reports the top-N titles by rating.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`proxy`] - Egress proxy pool: discovery, validation, rotation
//! - [`fetch`] - Proxy-rotating HTTP fetcher with retry and pacing
//! - [`parser`] - HTML parsing and typed field extraction
//! - [`scanner`] - Listing enumeration and per-entry detail scraping
//! - [`crossref`] - Secondary-source rating resolution
//! - [`ranker`] - Filtering, stable sorting, truncation
//! - [`pipeline`] - End-to-end run orchestration and report rendering
//! - [`models`] - Core data structures and types
//!
//! # Example
//!
//! ```no_run
//! use cinetop::config::Config;
//! use cinetop::pipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let report = pipeline::run(&config, None, None).await?;
//!     print!("{}", report.render());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod crossref;
pub mod error;
pub mod fetch;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod proxy;
pub mod ranker;
pub mod scanner;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::crossref::CrossReferencer;
    pub use crate::error::{Error, Result};
    pub use crate::fetch::Fetcher;
    pub use crate::models::{CatalogEntry, Field, ListingRef, SecondaryRating};
    pub use crate::pipeline::Report;
    pub use crate::proxy::ProxyPool;
    pub use crate::scanner::ListingScanner;
}

// Direct re-exports for convenience
pub use models::{CatalogEntry, Field, ListingRef, SecondaryRating};
