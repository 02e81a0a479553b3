use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, CONNECTION, USER_AGENT,
};

/// Build a browser-identifying header set
///
/// Both sources block obvious automation; every request goes out with the
/// header set a desktop browser would send.
///
/// # Examples
///
/// ```
/// use cinetop::fetch::headers::build_browser_headers;
///
/// let headers = build_browser_headers("Mozilla/5.0 (Windows NT 10.0; Win64; x64)");
/// assert!(headers.contains_key("accept-language"));
/// ```
pub fn build_browser_headers(user_agent: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();

    if let Ok(ua) = HeaderValue::from_str(user_agent) {
        headers.insert(USER_AGENT, ua);
    }
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8",
        ),
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("ru-RU,ru;q=0.8,en-US;q=0.6,en;q=0.4"),
    );
    headers.insert(
        ACCEPT_ENCODING,
        HeaderValue::from_static("gzip, deflate"),
    );
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

    headers
}
