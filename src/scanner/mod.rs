//! Primary-source listing scan
//!
//! Enumerates today's catalog entries from the single listing page, then
//! scrapes each entry's detail page and venue schedule page. The listing
//! fetch is the one run-fatal step: with no listing there is nothing to
//! rank. Every per-entry fetch degrades gracefully; a failed detail or
//! schedule fetch leaves the affected fields unavailable and the entry is
//! retained with partial data.

use std::collections::HashSet;

use crate::config::SourcesConfig;
use crate::fetch::Fetcher;
use crate::models::{CatalogEntry, Field, ListingRef};
use crate::parser::{DetailFields, PageParser};
use crate::utils::error::{FetchError, ScanError};

/// Scans the primary source into bare catalog entries
pub struct ListingScanner<'a, P: PageParser> {
    fetcher: &'a Fetcher,
    parser: &'a P,
    sources: SourcesConfig,
}

impl<'a, P: PageParser> ListingScanner<'a, P> {
    pub fn new(fetcher: &'a Fetcher, parser: &'a P, sources: &SourcesConfig) -> Self {
        Self {
            fetcher,
            parser,
            sources: sources.clone(),
        }
    }

    /// Enumerate today's entries with their primary-source fields
    ///
    /// # Errors
    ///
    /// - `ScanError::ListingUnavailable` when the listing page cannot be
    ///   fetched at all
    /// - `ScanError::PoolExhausted` when the proxy pool empties mid-scan and
    ///   cannot be refilled
    pub async fn scan(&self) -> Result<Vec<CatalogEntry>, ScanError> {
        let page = self
            .fetcher
            .fetch(&self.sources.listing_url)
            .await
            .map_err(|source| ScanError::ListingUnavailable { source })?;

        let refs = dedup_by_id(self.parser.extract_listing(&page.body));
        tracing::info!(entries = refs.len(), "Listing scanned");

        let mut entries = Vec::with_capacity(refs.len());
        for listing in refs {
            entries.push(self.scan_entry(listing).await?);
        }
        Ok(entries)
    }

    /// Fetch one entry's detail and venue pages; failures become sentinels
    async fn scan_entry(&self, listing: ListingRef) -> Result<CatalogEntry, ScanError> {
        let mut entry = CatalogEntry::new(listing);

        let detail_url = self.sources.movie_url.replace("{id}", &entry.id);
        let fields = match self.fetcher.fetch(&detail_url).await {
            Ok(page) => self.parser.extract_detail_fields(&page.body),
            Err(FetchError::EmptyPool) => return Err(ScanError::PoolExhausted),
            Err(e) => {
                tracing::warn!(id = %entry.id, url = %detail_url, error = %e, "Detail page fetch failed");
                DetailFields::unavailable()
            }
        };
        entry.primary_rating = fields.rating;
        entry.primary_votes = fields.votes;
        entry.year = fields.year;

        let schedule_url = self.sources.schedule_url.replace("{id}", &entry.id);
        entry.venues = match self.fetcher.fetch(&schedule_url).await {
            Ok(page) => self.parser.extract_venue_count(&page.body),
            Err(FetchError::EmptyPool) => return Err(ScanError::PoolExhausted),
            Err(e) => {
                tracing::warn!(id = %entry.id, url = %schedule_url, error = %e, "Schedule page fetch failed");
                Field::Unavailable
            }
        };

        Ok(entry)
    }
}

/// Drop duplicate listing references, keeping first-occurrence order
///
/// The same entry appears multiple times on the listing page; identity is
/// the external identifier. Order matters downstream: ranking ties preserve
/// scan order.
fn dedup_by_id(refs: Vec<ListingRef>) -> Vec<ListingRef> {
    let mut seen = HashSet::new();
    refs.into_iter()
        .filter(|r| seen.insert(r.id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_preserves_first_occurrence_order() {
        let refs = vec![
            ListingRef::new("3", "C"),
            ListingRef::new("1", "A"),
            ListingRef::new("3", "C again"),
            ListingRef::new("2", "B"),
            ListingRef::new("1", "A again"),
        ];
        let deduped = dedup_by_id(refs);
        let ids: Vec<&str> = deduped.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["3", "1", "2"]);
        assert_eq!(deduped[0].title, "C");
    }
}
