//! Resolved-URL classification for the secondary source
//!
//! The secondary source's search endpoint either redirects straight to a
//! per-movie page or lands on a search-results page; anything else (consent
//! walls, geo redirects) is unusable. Classification happens once, here, and
//! the cross-referencer matches exhaustively on the result instead of
//! scattering string checks through extraction logic.

use serde::{Deserialize, Serialize};

use crate::config::SourcesConfig;

/// Shape of the page a secondary-source query resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    /// Direct per-movie page
    MoviePage,
    /// Disambiguation page listing multiple candidates
    SearchResults,
    /// Neither shape; the query produced an unusable result
    Unrecognized,
}

/// Classifies a final resolved URL into a [`PageKind`]
#[derive(Debug, Clone)]
pub struct UrlClassifier {
    movie_pattern: String,
    search_pattern: String,
}

impl UrlClassifier {
    pub fn new(movie_pattern: impl Into<String>, search_pattern: impl Into<String>) -> Self {
        Self {
            movie_pattern: movie_pattern.into(),
            search_pattern: search_pattern.into(),
        }
    }

    pub fn from_sources(sources: &SourcesConfig) -> Self {
        Self::new(&sources.movie_page_pattern, &sources.search_page_pattern)
    }

    /// Classify a final resolved URL
    ///
    /// The movie shape wins over the search shape; a redirect that reached a
    /// concrete movie page is a direct hit regardless of how the query URL
    /// looked.
    pub fn classify(&self, url: &str) -> PageKind {
        if url.contains(&self.movie_pattern) {
            PageKind::MoviePage
        } else if url.contains(&self.search_pattern) {
            PageKind::SearchResults
        } else {
            PageKind::Unrecognized
        }
    }
}
