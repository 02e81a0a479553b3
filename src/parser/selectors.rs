//! Compiled selectors and patterns for the two concrete sources
//!
//! These are the volatile scraping details: exact markup selectors for the
//! primary catalog pages and the secondary source's movie/search pages.
//! Everything above this module depends only on the extraction signatures.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::Selector;

// Helper macro to parse selectors safely at startup
macro_rules! parse_selector {
    ($s:expr) => {
        Selector::parse($s).expect(concat!("Invalid CSS selector: ", $s))
    };
}

lazy_static! {
    // Primary listing page: (id, title) pairs out of movie links
    pub static ref LISTING_PATTERN: Regex =
        Regex::new(r"ru/movie/(\d+)/.>(.*?)</a>").unwrap();

    // Primary per-movie venue schedule page: one link per cinema
    pub static ref VENUE_PATTERN: Regex =
        Regex::new(r"href='https://www\.afisha\.ru/\w*/cinema/\d+/").unwrap();

    // First 4-digit run in a free-form production note
    pub static ref YEAR_PATTERN: Regex = Regex::new(r"(\d{4})").unwrap();

    // Primary detail page
    pub static ref DETAIL_RATING: Selector = parse_selector!("p.stars.pngfix");
    pub static ref DETAIL_VOTES: Selector = parse_selector!("p.details.s-update-clickcount");
    pub static ref DETAIL_YEAR: Selector = parse_selector!("span.creation");

    // Secondary direct movie page: the ratings block
    pub static ref MOVIE_RATING: Selector = parse_selector!("span.rating_ball");
    pub static ref MOVIE_VOTES: Selector = parse_selector!("span.ratingCount");

    // Secondary search-results page: the "most relevant" candidate block
    pub static ref SEARCH_BEST_MATCH: Selector = parse_selector!("div.element.most_wanted");
    pub static ref SEARCH_RATING: Selector = parse_selector!("div.rating");
}
