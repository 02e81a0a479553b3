// Core data structures for the cinetop pipeline

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tri-state scraped field
///
/// Distinguishes "not yet fetched", "fetched but absent", and "fetch failed"
/// from a real value, so ranking and display logic never have to overload a
/// magic numeric zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field<T> {
    /// Not yet fetched
    Pending,
    /// Fetched, but the field was absent from the page
    Missing,
    /// The fetch for this field failed outright
    Unavailable,
    /// A real scraped value
    Value(T),
}

impl<T> Field<T> {
    /// Borrow the inner value, if any
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    /// True when a real value is present
    pub fn is_value(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    /// Build from an extraction result: `Some` becomes `Value`, `None`
    /// becomes `Missing`
    pub fn from_extracted(opt: Option<T>) -> Self {
        match opt {
            Some(v) => Self::Value(v),
            None => Self::Missing,
        }
    }
}

impl<T: Copy> Field<T> {
    /// Copy the inner value, if any
    pub fn get(&self) -> Option<T> {
        self.value().copied()
    }
}

impl<T: fmt::Display> fmt::Display for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{v}"),
            _ => write!(f, "-"),
        }
    }
}

/// A bare (identifier, title) pair lifted from the listing page
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListingRef {
    /// External identifier on the primary source
    pub id: String,
    /// Display title
    pub title: String,
}

impl ListingRef {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Rating obtained from the secondary source
///
/// `NoData` covers every non-answer: no match found, rating hidden by the
/// source, unrecognized result page, or fetch exhaustion. Source-internal
/// inconsistencies are normalized to `NoData` before this value leaves the
/// cross-referencer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecondaryRating {
    /// Rating value and vote count
    Score { rating: f64, votes: u64 },
    /// The rating could not be determined
    NoData,
}

impl SecondaryRating {
    /// The rating value, if any
    pub fn rating(&self) -> Option<f64> {
        match self {
            Self::Score { rating, .. } => Some(*rating),
            Self::NoData => None,
        }
    }

    /// The rating value, with `NoData` mapped to a default
    pub fn rating_or(&self, default: f64) -> f64 {
        self.rating().unwrap_or(default)
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData)
    }
}

impl fmt::Display for SecondaryRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Score { rating, votes } => write!(f, "{rating:.1} ({votes} votes)"),
            Self::NoData => write!(f, "-"),
        }
    }
}

/// One catalog entry, enriched step by step as the pipeline progresses
///
/// Created by the scanner from a [`ListingRef`], mutated once by the
/// cross-referencer to attach the secondary rating, read-only after ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// External identifier on the primary source
    pub id: String,
    /// Display title
    pub title: String,
    /// Release year
    pub year: Field<u16>,
    /// Primary-source rating
    pub primary_rating: Field<f64>,
    /// Primary-source vote count
    pub primary_votes: Field<u64>,
    /// Number of venues showing the title today
    pub venues: Field<u32>,
    /// Cross-referenced rating from the secondary source
    pub secondary: SecondaryRating,
}

impl CatalogEntry {
    /// Create a bare entry with all fields pending
    pub fn new(listing: ListingRef) -> Self {
        Self {
            id: listing.id,
            title: listing.title,
            year: Field::Pending,
            primary_rating: Field::Pending,
            primary_votes: Field::Pending,
            venues: Field::Pending,
            secondary: SecondaryRating::NoData,
        }
    }

    /// Sort key for ranking: the secondary rating, with no-data as the
    /// lowest possible value
    pub fn rank_key(&self) -> f64 {
        self.secondary.rating_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_value_access() {
        let f: Field<u32> = Field::Value(42);
        assert_eq!(f.get(), Some(42));
        assert!(f.is_value());

        let m: Field<u32> = Field::Missing;
        assert_eq!(m.get(), None);
        assert!(!m.is_value());
    }

    #[test]
    fn test_field_from_extracted() {
        assert_eq!(Field::from_extracted(Some(7u16)), Field::Value(7));
        assert_eq!(Field::from_extracted(None::<u16>), Field::Missing);
    }

    #[test]
    fn test_field_display_sentinels() {
        assert_eq!(Field::<u32>::Pending.to_string(), "-");
        assert_eq!(Field::<u32>::Missing.to_string(), "-");
        assert_eq!(Field::<u32>::Unavailable.to_string(), "-");
        assert_eq!(Field::Value(3u32).to_string(), "3");
    }

    #[test]
    fn test_secondary_rating_or() {
        let score = SecondaryRating::Score {
            rating: 7.8,
            votes: 1200,
        };
        assert_eq!(score.rating_or(0.0), 7.8);
        assert_eq!(SecondaryRating::NoData.rating_or(0.0), 0.0);
    }

    #[test]
    fn test_new_entry_is_all_pending() {
        let entry = CatalogEntry::new(ListingRef::new("251733", "Dunkirk"));
        assert_eq!(entry.year, Field::Pending);
        assert_eq!(entry.venues, Field::Pending);
        assert!(entry.secondary.is_no_data());
        assert_eq!(entry.rank_key(), 0.0);
    }
}
