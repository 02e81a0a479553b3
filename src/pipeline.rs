//! End-to-end run orchestration and report rendering
//!
//! Control flow: the scanner produces bare entries, the cross-referencer
//! enriches each with a secondary rating, the ranker filters/sorts/limits.
//! Entries are processed sequentially with one fetch in flight; the
//! fetcher's jitter pacing is the throttling mechanism, so parallelizing
//! here would defeat it.

use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::fmt::Write as _;

use crate::config::Config;
use crate::crossref::CrossReferencer;
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::models::CatalogEntry;
use crate::parser::{PageParser, SourceParser};
use crate::ranker::rank;
use crate::scanner::ListingScanner;

/// Final run output: the ranked entries plus run-level context
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Run date (local)
    pub date: NaiveDate,
    /// Total entries found on the listing page before ranking
    pub total: usize,
    /// Ranked entries, best first
    pub entries: Vec<CatalogEntry>,
}

impl Report {
    /// Render the report as the console output, one line per entry,
    /// 1-indexed. Fields without data print as `-`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "today {} {} movies run in cinemas across city",
            self.date, self.total
        );
        let _ = writeln!(
            out,
            "{} top movies from {} with best ratings are:",
            self.entries.len(),
            self.total
        );
        for (i, entry) in self.entries.iter().enumerate() {
            let _ = writeln!(
                out,
                "{:3}. {} ({})  rating {}  own rating {} ({} votes)  venues {}",
                i + 1,
                entry.title,
                entry.year,
                entry.secondary,
                entry.primary_rating,
                entry.primary_votes,
                entry.venues
            );
        }
        out
    }
}

/// Run the full pipeline with a fetcher built from the configuration
///
/// `top_n` and `min_rating` are CLI-level overrides; either falls back to
/// its `[ranking]` configuration value when absent.
pub async fn run(config: &Config, top_n: Option<usize>, min_rating: Option<f64>) -> Result<Report> {
    let fetcher = if config.fetch.direct {
        Fetcher::direct(config.fetch.clone())?
    } else {
        Fetcher::new(config.fetch.clone(), config.proxy.clone())?
    };
    let parser = SourceParser::new();
    execute(&fetcher, &parser, config, top_n, min_rating).await
}

/// Run the pipeline over an existing fetcher and parser
pub async fn execute<P: PageParser>(
    fetcher: &Fetcher,
    parser: &P,
    config: &Config,
    top_n: Option<usize>,
    min_rating: Option<f64>,
) -> Result<Report> {
    let scanner = ListingScanner::new(fetcher, parser, &config.sources);
    let crossref = CrossReferencer::new(fetcher, parser, &config.sources);

    let mut entries: Vec<CatalogEntry> = scanner.scan().await?;
    let total = entries.len();

    for entry in &mut entries {
        entry.secondary = crossref.resolve(&entry.title, entry.year.get()).await;
        tracing::debug!(id = %entry.id, title = %entry.title, rating = %entry.secondary, "Entry resolved");
    }

    let limit = top_n.unwrap_or(config.ranking.default_top as usize);
    let floor = min_rating.or(config.ranking.min_rating);
    let entries = rank(entries, limit, floor);

    Ok(Report {
        date: Local::now().date_naive(),
        total,
        entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Field, ListingRef, SecondaryRating};

    #[test]
    fn test_render_is_one_indexed_with_sentinels() {
        let mut entry = CatalogEntry::new(ListingRef::new("1", "Dunkirk"));
        entry.year = Field::Value(2017);
        entry.secondary = SecondaryRating::Score {
            rating: 8.0,
            votes: 1200,
        };

        let mut partial = CatalogEntry::new(ListingRef::new("2", "Obscure"));
        partial.venues = Field::Unavailable;

        let report = Report {
            date: NaiveDate::from_ymd_opt(2017, 8, 1).unwrap(),
            total: 12,
            entries: vec![entry, partial],
        };
        let text = report.render();

        assert!(text.contains("12 movies run"));
        assert!(text.contains("  1. Dunkirk (2017)"));
        assert!(text.contains("rating 8.0 (1200 votes)"));
        assert!(text.contains("  2. Obscure (-)"));
        assert!(text.contains("venues -"));
    }

    #[test]
    fn test_report_serializes_to_json() {
        let report = Report {
            date: NaiveDate::from_ymd_opt(2017, 8, 1).unwrap(),
            total: 0,
            entries: Vec::new(),
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"total\":0"));
    }
}
