//! HTML parsing and typed field extraction
//!
//! The pipeline depends on the [`PageParser`] trait only; the selector-backed
//! [`SourceParser`] is the concrete implementation for the two real sources.
//!
//! Extraction is total: no method errors for content-shape reasons. A shape
//! mismatch is the page's problem, not the caller's, and surfaces as
//! `Field::Missing` or `SecondaryRating::NoData`.

pub mod html;
pub mod selectors;

pub use html::SourceParser;

use crate::crossref::url::PageKind;
use crate::models::{Field, ListingRef, SecondaryRating};

/// Typed fields from a primary-source detail page
#[derive(Debug, Clone, PartialEq)]
pub struct DetailFields {
    pub rating: Field<f64>,
    pub votes: Field<u64>,
    pub year: Field<u16>,
}

impl DetailFields {
    /// All fields missing (page fetched, nothing recognizable on it)
    pub fn missing() -> Self {
        Self {
            rating: Field::Missing,
            votes: Field::Missing,
            year: Field::Missing,
        }
    }

    /// All fields unavailable (page fetch failed)
    pub fn unavailable() -> Self {
        Self {
            rating: Field::Unavailable,
            votes: Field::Unavailable,
            year: Field::Unavailable,
        }
    }
}

/// Page-specific field extraction
///
/// Implementations own the normalization of markup mismatches; none of these
/// methods may fail for shape reasons.
pub trait PageParser: Send + Sync {
    /// Extract (id, title) pairs from the listing page, in page order,
    /// duplicates included
    fn extract_listing(&self, html: &str) -> Vec<ListingRef>;

    /// Extract rating, vote count, and release year from a detail page
    fn extract_detail_fields(&self, html: &str) -> DetailFields;

    /// Count venues on a schedule page
    ///
    /// A page that parses but lists no venues yields `Value(0)`: a title
    /// genuinely showing nowhere is data, not absence.
    fn extract_venue_count(&self, html: &str) -> Field<u32>;

    /// Extract the secondary rating from a resolved page of the given kind
    fn extract_secondary_rating(&self, html: &str, kind: PageKind) -> SecondaryRating;
}
