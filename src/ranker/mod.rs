//! Ranking: filter, stable sort, truncate
//!
//! Pure function of its inputs; no fetching, no mutation beyond reordering.

use std::cmp::Ordering;

use crate::models::CatalogEntry;

/// Rank entries by descending secondary rating and keep the top `limit`
///
/// The sort is stable: ties preserve input order, which reflects
/// listing-page order, so repeated runs over the same data reproduce the
/// same report. Entries without a rating sort as the lowest possible value;
/// they are dropped only when a minimum-rating floor is configured and
/// unmet.
pub fn rank(
    mut entries: Vec<CatalogEntry>,
    limit: usize,
    min_rating: Option<f64>,
) -> Vec<CatalogEntry> {
    if let Some(floor) = min_rating {
        entries.retain(|e| e.rank_key() >= floor);
    }

    entries.sort_by(|a, b| {
        b.rank_key()
            .partial_cmp(&a.rank_key())
            .unwrap_or(Ordering::Equal)
    });

    entries.truncate(limit);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ListingRef, SecondaryRating};

    fn entry(id: &str, rating: Option<f64>) -> CatalogEntry {
        let mut e = CatalogEntry::new(ListingRef::new(id, format!("title-{id}")));
        e.secondary = match rating {
            Some(rating) => SecondaryRating::Score { rating, votes: 100 },
            None => SecondaryRating::NoData,
        };
        e
    }

    fn ids(entries: &[CatalogEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_descending_order() {
        let ranked = rank(
            vec![entry("a", Some(3.0)), entry("b", Some(9.0)), entry("c", Some(6.5))],
            10,
            None,
        );
        assert_eq!(ids(&ranked), ["b", "c", "a"]);
    }

    #[test]
    fn test_stable_on_ties() {
        // Ratings [3.0, 4.5, 4.5, 2.0]: the two 4.5 entries keep their
        // relative input order.
        let ranked = rank(
            vec![
                entry("a", Some(3.0)),
                entry("b", Some(4.5)),
                entry("c", Some(4.5)),
                entry("d", Some(2.0)),
            ],
            10,
            None,
        );
        assert_eq!(ids(&ranked), ["b", "c", "a", "d"]);
    }

    #[test]
    fn test_truncates_to_limit() {
        let ranked = rank(
            vec![entry("a", Some(1.0)), entry("b", Some(2.0)), entry("c", Some(3.0))],
            2,
            None,
        );
        assert_eq!(ranked.len(), 2);
        assert_eq!(ids(&ranked), ["c", "b"]);
    }

    #[test]
    fn test_limit_beyond_len_keeps_all() {
        let ranked = rank(vec![entry("a", Some(1.0))], 21, None);
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn test_no_data_survives_without_floor() {
        let ranked = rank(vec![entry("a", None), entry("b", Some(5.0))], 10, None);
        assert_eq!(ids(&ranked), ["b", "a"]);
    }

    #[test]
    fn test_floor_drops_no_data_and_low_ratings() {
        let ranked = rank(
            vec![entry("a", None), entry("b", Some(5.0)), entry("c", Some(7.0))],
            10,
            Some(6.0),
        );
        assert_eq!(ids(&ranked), ["c"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(rank(Vec::new(), 5, None).is_empty());
    }
}
