//! Secondary-source rating resolution
//!
//! Matches a loosely-identified catalog entry (title + year) against the
//! secondary rating source. The search endpoint either redirects straight to
//! a movie page (direct hit) or lands on a disambiguation page; the resolved
//! URL is classified once and dispatched exhaustively.
//!
//! `resolve` is total: it always returns a [`SecondaryRating`], possibly the
//! no-data sentinel, and never errors for content-shape reasons. Fetch
//! exhaustion also degrades to no-data; the entry survives with a missing
//! rating rather than killing the run.
//!
//! Known limitation, preserved deliberately: the "most relevant" candidate
//! on a disambiguation page is trusted to be the right one. Title + year do
//! not uniquely identify a film, so occasional mismatches are possible; the
//! match policy is isolated here and in the classifier so it can be swapped.

pub mod url;

pub use url::{PageKind, UrlClassifier};

use crate::config::SourcesConfig;
use crate::fetch::Fetcher;
use crate::models::SecondaryRating;
use crate::parser::PageParser;

/// Resolves catalog entries against the secondary rating source
pub struct CrossReferencer<'a, P: PageParser> {
    fetcher: &'a Fetcher,
    parser: &'a P,
    classifier: UrlClassifier,
    search_url: String,
}

impl<'a, P: PageParser> CrossReferencer<'a, P> {
    pub fn new(fetcher: &'a Fetcher, parser: &'a P, sources: &SourcesConfig) -> Self {
        Self {
            fetcher,
            parser,
            classifier: UrlClassifier::from_sources(sources),
            search_url: sources.search_url.clone(),
        }
    }

    /// Resolve one entry to a secondary rating
    pub async fn resolve(&self, title: &str, year: Option<u16>) -> SecondaryRating {
        let query_url = self.search_query_url(title, year);

        let page = match self.fetcher.fetch(&query_url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(title, url = %query_url, error = %e, "Secondary lookup failed");
                return SecondaryRating::NoData;
            }
        };

        let kind = self.classifier.classify(&page.final_url);
        tracing::debug!(title, final_url = %page.final_url, kind = ?kind, "Secondary lookup resolved");

        match kind {
            PageKind::MoviePage | PageKind::SearchResults => {
                self.parser.extract_secondary_rating(&page.body, kind)
            }
            PageKind::Unrecognized => SecondaryRating::NoData,
        }
    }

    /// Build the search query URL from the raw title and year
    ///
    /// No normalization beyond the source's required percent-encoding;
    /// spaces become `+` as the endpoint expects.
    fn search_query_url(&self, title: &str, year: Option<u16>) -> String {
        let encoded = urlencoding::encode(title).replace("%20", "+");
        match year {
            Some(year) => format!("{}{encoded}+{year}", self.search_url),
            None => format!("{}{encoded}", self.search_url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FetchConfig, SourcesConfig};
    use crate::parser::SourceParser;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_fetch_config() -> FetchConfig {
        FetchConfig {
            max_retries: 2,
            timeout_secs: 2,
            min_delay_ms: 0,
            max_delay_ms: 1,
            rate_limit: 100,
            ..FetchConfig::default()
        }
    }

    /// Sources config whose URL shapes point at a mock server
    fn mock_sources(server_uri: &str) -> SourcesConfig {
        let mut sources = SourcesConfig::default();
        sources.search_url = format!("{server_uri}/search?q=");
        sources.movie_page_pattern = String::from("/film/");
        sources.search_page_pattern = String::from("/search");
        sources
    }

    #[tokio::test]
    async fn test_direct_hit_extracts_rating_exactly() {
        let server = MockServer::start().await;
        let html = r#"<span class="rating_ball">7.8</span>
                      <span class="ratingCount">1200</span>"#;
        // Search redirects straight to the movie page
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(
                ResponseTemplate::new(302).insert_header("location", "/film/843650/"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/film/843650/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(html))
            .mount(&server)
            .await;

        let fetcher = Fetcher::direct(fast_fetch_config()).unwrap();
        let parser = SourceParser::new();
        let sources = mock_sources(&server.uri());
        let crossref = CrossReferencer::new(&fetcher, &parser, &sources);

        let rating = crossref.resolve("Dunkirk", Some(2017)).await;
        assert_eq!(
            rating,
            SecondaryRating::Score {
                rating: 7.8,
                votes: 1200
            }
        );
    }

    #[tokio::test]
    async fn test_disambiguation_without_block_is_no_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("<div class='results'></div>"),
            )
            .mount(&server)
            .await;

        let fetcher = Fetcher::direct(fast_fetch_config()).unwrap();
        let parser = SourceParser::new();
        let sources = mock_sources(&server.uri());
        let crossref = CrossReferencer::new(&fetcher, &parser, &sources);

        let rating = crossref.resolve("Obscure Title", Some(1999)).await;
        assert_eq!(rating, SecondaryRating::NoData);
    }

    #[tokio::test]
    async fn test_fetch_exhaustion_is_no_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let fetcher = Fetcher::direct(fast_fetch_config()).unwrap();
        let parser = SourceParser::new();
        let sources = mock_sources(&server.uri());
        let crossref = CrossReferencer::new(&fetcher, &parser, &sources);

        let rating = crossref.resolve("Dunkirk", Some(2017)).await;
        assert_eq!(rating, SecondaryRating::NoData);
    }

    #[tokio::test]
    async fn test_unrecognized_redirect_is_no_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(302).insert_header("location", "/consent"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/consent"))
            .respond_with(ResponseTemplate::new(200).set_body_string("please accept cookies"))
            .mount(&server)
            .await;

        let fetcher = Fetcher::direct(fast_fetch_config()).unwrap();
        let parser = SourceParser::new();
        let sources = mock_sources(&server.uri());
        let crossref = CrossReferencer::new(&fetcher, &parser, &sources);

        let rating = crossref.resolve("Dunkirk", Some(2017)).await;
        assert_eq!(rating, SecondaryRating::NoData);
    }

    #[test]
    fn test_search_query_url_encoding() {
        let fetch_config = fast_fetch_config();
        let fetcher = Fetcher::direct(fetch_config).unwrap();
        let parser = SourceParser::new();
        let sources = SourcesConfig::default();
        let crossref = CrossReferencer::new(&fetcher, &parser, &sources);

        let url = crossref.search_query_url("Baby Driver", Some(2017));
        assert!(url.starts_with(&sources.search_url));
        assert!(url.ends_with("Baby+Driver+2017"));

        let no_year = crossref.search_query_url("Dunkirk", None);
        assert!(no_year.ends_with("Dunkirk"));
    }
}
