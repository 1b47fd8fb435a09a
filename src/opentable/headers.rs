use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, CONTENT_TYPE,
    ORIGIN, USER_AGENT,
};

/// Page context OpenTable expects alongside GraphQL calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageContext {
    /// Restaurant profile page (availability queries)
    RestaurantProfile,
    /// Multi-search page (autocomplete)
    Search,
}

impl PageContext {
    pub fn page_group(&self) -> &'static str {
        match self {
            Self::RestaurantProfile => "rest-profile",
            Self::Search => "search",
        }
    }

    pub fn page_type(&self) -> &'static str {
        match self {
            Self::RestaurantProfile => "restprofilepage",
            Self::Search => "multi-search",
        }
    }
}

fn insert_static(headers: &mut HeaderMap, name: &'static str, value: &'static str) {
    headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
}

/// Build browser-like headers for a top-level page navigation
///
/// # Examples
///
/// ```
/// use tablewatch::opentable::headers::build_browser_headers;
///
/// let headers = build_browser_headers("Mozilla/5.0 (Windows NT 10.0; Win64; x64)");
/// assert!(headers.contains_key("sec-fetch-mode"));
/// ```
pub fn build_browser_headers(user_agent: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();

    if let Ok(value) = HeaderValue::from_str(user_agent) {
        headers.insert(USER_AGENT, value);
    }
    headers.insert(ACCEPT, HeaderValue::from_static("text/html"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));

    insert_static(&mut headers, "priority", "u=0, i");
    insert_static(
        &mut headers,
        "sec-ch-ua",
        "\"Google Chrome\";v=\"133\", \"Chromium\";v=\"133\", \"Not/A)Brand\";v=\"24\"",
    );
    insert_static(&mut headers, "sec-ch-ua-mobile", "?0");
    insert_static(&mut headers, "sec-ch-ua-platform", "\"macOS\"");
    insert_static(&mut headers, "sec-fetch-dest", "document");
    insert_static(&mut headers, "sec-fetch-mode", "navigate");
    insert_static(&mut headers, "sec-fetch-site", "same-origin");
    insert_static(&mut headers, "sec-fetch-user", "?1");
    insert_static(&mut headers, "upgrade-insecure-requests", "1");

    headers
}

/// Build headers for a GraphQL call made from an OpenTable page
///
/// # Arguments
///
/// * `user_agent` - User agent string
/// * `origin` - Site root, sent as `origin`
/// * `csrf_token` - Token scraped from the home page
/// * `page` - Page the call pretends to come from
/// * `query_timeout_ms` - Server-side query budget (`x-query-timeout`)
pub fn build_graphql_headers(
    user_agent: &str,
    origin: &str,
    csrf_token: &str,
    page: PageContext,
    query_timeout_ms: u32,
) -> HeaderMap {
    let mut headers = build_browser_headers(user_agent);

    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(value) = HeaderValue::from_str(origin) {
        headers.insert(ORIGIN, value);
    }

    insert_static(&mut headers, "ot-page-group", page.page_group());
    insert_static(&mut headers, "ot-page-type", page.page_type());
    insert_static(&mut headers, "priority", "u=1, i");
    insert_static(&mut headers, "sec-fetch-dest", "empty");
    insert_static(&mut headers, "sec-fetch-mode", "cors");
    insert_static(&mut headers, "sec-fetch-site", "same-origin");
    headers.remove("sec-fetch-user");
    headers.remove("upgrade-insecure-requests");

    if let Ok(value) = HeaderValue::from_str(csrf_token) {
        headers.insert(HeaderName::from_static("x-csrf-token"), value);
    }
    headers.insert(
        HeaderName::from_static("x-query-timeout"),
        HeaderValue::from(query_timeout_ms),
    );

    headers
}
