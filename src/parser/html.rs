//! Selector-backed parser for the two concrete sources

use scraper::Html;

use crate::crossref::url::PageKind;
use crate::models::{Field, ListingRef, SecondaryRating};
use crate::parser::selectors::{
    DETAIL_RATING, DETAIL_VOTES, DETAIL_YEAR, LISTING_PATTERN, MOVIE_RATING, MOVIE_VOTES,
    SEARCH_BEST_MATCH, SEARCH_RATING, VENUE_PATTERN, YEAR_PATTERN,
};
use crate::parser::{DetailFields, PageParser};

/// Non-breaking space; both sources use it as a thousands separator and as
/// filler inside rating blocks
const NBSP: char = '\u{a0}';

/// Parser for the real primary and secondary source markup
#[derive(Debug, Default, Clone)]
pub struct SourceParser;

impl SourceParser {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// First match's text content, trimmed; `None` when the selector misses
    fn text_of(document: &Html, selector: &scraper::Selector) -> Option<String> {
        document
            .select(selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
    }

    /// First token that parses as a float, commas normalized to dots
    fn parse_rating(text: &str) -> Option<f64> {
        text.replace(',', ".")
            .split_whitespace()
            .find_map(|tok| tok.parse::<f64>().ok())
            .filter(|r| r.is_finite() && *r >= 0.0)
    }

    /// First contiguous digit run, NBSP thousands separators stripped
    fn parse_count(text: &str) -> Option<u64> {
        let cleaned = text.replace(NBSP, "");
        let start = cleaned.find(|c: char| c.is_ascii_digit())?;
        let digits: String = cleaned[start..]
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.parse::<u64>().ok()
    }

    fn extract_movie_page_rating(&self, document: &Html) -> SecondaryRating {
        let rating = Self::text_of(document, &MOVIE_RATING).and_then(|t| Self::parse_rating(&t));

        match rating {
            Some(rating) => {
                let votes = Self::text_of(document, &MOVIE_VOTES)
                    .and_then(|t| Self::parse_count(&t))
                    .unwrap_or(0);
                SecondaryRating::Score { rating, votes }
            }
            // Expected ratings block absent: extraction inconsistency,
            // normalized to no-data right here
            None => SecondaryRating::NoData,
        }
    }

    fn extract_search_page_rating(&self, document: &Html) -> SecondaryRating {
        let Some(block) = document.select(&SEARCH_BEST_MATCH).next() else {
            return SecondaryRating::NoData;
        };

        // The source hides the rating element below its own undisclosed
        // vote threshold; that is no-data, not an error.
        let Some(rating_el) = block.select(&SEARCH_RATING).next() else {
            return SecondaryRating::NoData;
        };

        let text: String = rating_el.text().collect();
        let Some(rating) = Self::parse_rating(&text) else {
            return SecondaryRating::NoData;
        };

        // Vote count rides in the title attribute: "7.962 (123 456)"
        let votes = rating_el
            .value()
            .attr("title")
            .and_then(|t| t.split('(').nth(1))
            .and_then(|t| Self::parse_count(&t.replace(' ', "")))
            .unwrap_or(0);

        SecondaryRating::Score { rating, votes }
    }
}

impl PageParser for SourceParser {
    fn extract_listing(&self, html: &str) -> Vec<ListingRef> {
        LISTING_PATTERN
            .captures_iter(html)
            .filter_map(|caps| {
                let id = caps.get(1)?.as_str();
                let title = caps.get(2)?.as_str().trim();
                if title.is_empty() {
                    return None;
                }
                Some(ListingRef::new(id, title))
            })
            .collect()
    }

    fn extract_detail_fields(&self, html: &str) -> DetailFields {
        let document = Html::parse_document(html);

        let rating = Field::from_extracted(
            Self::text_of(&document, &DETAIL_RATING).and_then(|t| Self::parse_rating(&t)),
        );
        let votes = Field::from_extracted(
            Self::text_of(&document, &DETAIL_VOTES).and_then(|t| Self::parse_count(&t)),
        );
        let year = Field::from_extracted(
            Self::text_of(&document, &DETAIL_YEAR)
                .and_then(|t| YEAR_PATTERN.captures(&t).map(|c| c[1].to_string()))
                .and_then(|y| y.parse::<u16>().ok()),
        );

        DetailFields {
            rating,
            votes,
            year,
        }
    }

    fn extract_venue_count(&self, html: &str) -> Field<u32> {
        Field::Value(VENUE_PATTERN.find_iter(html).count() as u32)
    }

    fn extract_secondary_rating(&self, html: &str, kind: PageKind) -> SecondaryRating {
        match kind {
            PageKind::MoviePage => {
                let document = Html::parse_document(html);
                self.extract_movie_page_rating(&document)
            }
            PageKind::SearchResults => {
                let document = Html::parse_document(html);
                self.extract_search_page_rating(&document)
            }
            PageKind::Unrecognized => SecondaryRating::NoData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_listing_in_page_order() {
        let html = r#"
            <a href="https://www.afisha.ru/movie/251733/">Dunkirk</a>
            <a href="https://www.afisha.ru/movie/201179/">Baby Driver</a>
        "#;
        let refs = SourceParser::new().extract_listing(html);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0], ListingRef::new("251733", "Dunkirk"));
        assert_eq!(refs[1], ListingRef::new("201179", "Baby Driver"));
    }

    #[test]
    fn test_extract_detail_fields() {
        let html = r#"
            <p class="stars pngfix">Рейтинг фильма 8,1 из 10</p>
            <p class="details s-update-clickcount">Оценили 1244 человека</p>
            <span class="creation">UK, USA, 2017, 106 min</span>
        "#;
        let fields = SourceParser::new().extract_detail_fields(html);
        assert_eq!(fields.rating, Field::Value(8.1));
        assert_eq!(fields.votes, Field::Value(1244));
        assert_eq!(fields.year, Field::Value(2017));
    }

    #[test]
    fn test_detail_fields_missing_on_bare_page() {
        let fields = SourceParser::new().extract_detail_fields("<html><body></body></html>");
        assert_eq!(fields.rating, Field::Missing);
        assert_eq!(fields.votes, Field::Missing);
        assert_eq!(fields.year, Field::Missing);
    }

    #[test]
    fn test_venue_count_zero_is_a_value() {
        let count = SourceParser::new().extract_venue_count("<html></html>");
        assert_eq!(count, Field::Value(0));
    }

    #[test]
    fn test_venue_count() {
        let html = "href='https://www.afisha.ru/msk/cinema/1/ x href='https://www.afisha.ru/msk/cinema/2/ x href='https://www.afisha.ru/msk/cinema/3/";
        assert_eq!(
            SourceParser::new().extract_venue_count(html),
            Field::Value(3)
        );
    }

    #[test]
    fn test_movie_page_rating_extracted_exactly() {
        let html = r#"
            <span class="rating_ball">7.8</span>
            <span class="ratingCount">1&#160;200</span>
        "#;
        let rating = SourceParser::new().extract_secondary_rating(html, PageKind::MoviePage);
        assert_eq!(
            rating,
            SecondaryRating::Score {
                rating: 7.8,
                votes: 1200
            }
        );
    }

    #[test]
    fn test_movie_page_without_ratings_block_is_no_data() {
        let rating = SourceParser::new()
            .extract_secondary_rating("<html><body>404</body></html>", PageKind::MoviePage);
        assert_eq!(rating, SecondaryRating::NoData);
    }

    #[test]
    fn test_search_page_best_match() {
        let html = r#"
            <div class="element most_wanted">
                <div class="rating" title="7.962 (123 456)">7.962</div>
            </div>
        "#;
        let rating = SourceParser::new().extract_secondary_rating(html, PageKind::SearchResults);
        assert_eq!(
            rating,
            SecondaryRating::Score {
                rating: 7.962,
                votes: 123_456
            }
        );
    }

    #[test]
    fn test_search_page_hidden_rating_is_no_data() {
        // Candidate block present, rating element withheld by the source
        let html = r#"<div class="element most_wanted"><p class="name">Some film</p></div>"#;
        let rating = SourceParser::new().extract_secondary_rating(html, PageKind::SearchResults);
        assert_eq!(rating, SecondaryRating::NoData);
    }

    #[test]
    fn test_search_page_without_best_match_is_no_data() {
        let rating = SourceParser::new()
            .extract_secondary_rating("<div class='search'></div>", PageKind::SearchResults);
        assert_eq!(rating, SecondaryRating::NoData);
    }

    #[test]
    fn test_unrecognized_page_is_no_data() {
        let rating =
            SourceParser::new().extract_secondary_rating("anything", PageKind::Unrecognized);
        assert_eq!(rating, SecondaryRating::NoData);
    }

    #[test]
    fn test_parse_rating_comma_decimal() {
        assert_eq!(SourceParser::parse_rating("оценка 8,1 из 10"), Some(8.1));
        assert_eq!(SourceParser::parse_rating("no numbers here"), None);
    }

    #[test]
    fn test_parse_count_with_nbsp_separator() {
        assert_eq!(SourceParser::parse_count("1\u{a0}244 votes"), Some(1244));
        assert_eq!(SourceParser::parse_count("none"), None);
    }
}
