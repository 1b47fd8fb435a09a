//! Authenticated OpenTable session
//!
//! Bootstrapping a session takes three steps:
//! - build a cookie-keeping HTTP client with a bounded timeout
//! - scrape the CSRF token off the home page
//! - look up approximate coordinates for search (best effort)

use async_trait::async_trait;
use reqwest::{redirect, Client};
use scraper::{Html, Selector};
use std::time::Duration;

use super::availability;
use super::geo::lookup_coordinates;
use super::headers::{build_browser_headers, build_graphql_headers, PageContext};
use crate::config::OpenTableConfig;
use crate::models::Coordinates;
use crate::monitor::{Availability, AvailabilityFetcher, WatchTarget};
use crate::utils::error::FetchError;

/// Extract `windowVariables.__CSRF_TOKEN__` from the home page
///
/// # Errors
///
/// Returns `FetchError::CsrfTokenMissing` when the script tag or the token
/// is absent, `FetchError::Json` when the script body is not JSON
pub fn extract_csrf_token(html: &str) -> Result<String, FetchError> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("script#primary-window-vars")
        .map_err(|e| FetchError::Decode(format!("invalid selector: {e}")))?;

    let script: String = document
        .select(&selector)
        .next()
        .map(|el| el.text().collect())
        .unwrap_or_default();

    if script.trim().is_empty() {
        return Err(FetchError::CsrfTokenMissing(
            "script tag not found".to_string(),
        ));
    }

    let vars: serde_json::Value = serde_json::from_str(&script)?;
    vars.pointer("/windowVariables/__CSRF_TOKEN__")
        .and_then(|v| v.as_str())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            FetchError::CsrfTokenMissing("token missing in windowVariables".to_string())
        })
}

/// OpenTable client owning its cookie jar and CSRF token
pub struct OpenTableClient {
    /// HTTP client with configured timeout and cookie store
    client: Client,

    /// Site root without trailing slash
    base_url: String,

    /// Token sent as `x-csrf-token`
    csrf_token: String,

    /// Search bias location
    coordinates: Coordinates,

    /// Region sent with availability queries
    database_region: String,

    /// User agent string
    user_agent: String,
}

impl OpenTableClient {
    fn build_http_client(timeout: Duration) -> Result<Client, FetchError> {
        Ok(Client::builder()
            .timeout(timeout)
            .gzip(true)
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .build()?)
    }

    /// Bootstrap a session: CSRF token, then coordinates
    ///
    /// A failed geolocation lookup is logged and falls back to `(0, 0)`.
    ///
    /// # Errors
    ///
    /// Returns a `FetchError` when the client cannot be built or the CSRF
    /// token cannot be obtained
    pub async fn connect(config: &OpenTableConfig) -> Result<Self, FetchError> {
        let client =
            Self::build_http_client(Duration::from_secs(config.request_timeout_secs))?;
        let base_url = config.base_url.trim_end_matches('/').to_string();

        let csrf_token = Self::fetch_csrf_token(&client, &base_url, &config.user_agent).await?;
        tracing::debug!("CSRF token acquired");

        let coordinates =
            match lookup_coordinates(&client, &config.geo_url, &config.user_agent).await {
                Ok(coords) => coords,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "Geolocation lookup failed, searching without location"
                    );
                    Coordinates::default()
                }
            };

        Ok(Self {
            client,
            base_url,
            csrf_token,
            coordinates,
            database_region: config.database_region.clone(),
            user_agent: config.user_agent.clone(),
        })
    }

    /// Build a client from an already known session, skipping bootstrap
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn with_session(
        config: &OpenTableConfig,
        csrf_token: impl Into<String>,
        coordinates: Coordinates,
    ) -> Result<Self, FetchError> {
        Ok(Self {
            client: Self::build_http_client(Duration::from_secs(config.request_timeout_secs))?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            csrf_token: csrf_token.into(),
            coordinates,
            database_region: config.database_region.clone(),
            user_agent: config.user_agent.clone(),
        })
    }

    async fn fetch_csrf_token(
        client: &Client,
        base_url: &str,
        user_agent: &str,
    ) -> Result<String, FetchError> {
        let response = client
            .get(format!("{base_url}/"))
            .headers(build_browser_headers(user_agent))
            .send()
            .await
            .map_err(FetchError::from_request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::ServerError(status.as_u16()));
        }

        let html = response.text().await.map_err(FetchError::from_request)?;
        extract_csrf_token(&html)
    }

    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    pub fn csrf_token(&self) -> &str {
        &self.csrf_token
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST a persisted GraphQL query and return the raw body
    pub(crate) async fn post_graphql(
        &self,
        operation: &str,
        page: PageContext,
        query_timeout_ms: u32,
        payload: &serde_json::Value,
    ) -> Result<String, FetchError> {
        let url = format!(
            "{}/dapi/fe/gql?optype=query&opname={operation}",
            self.base_url
        );
        let headers = build_graphql_headers(
            &self.user_agent,
            &self.base_url,
            &self.csrf_token,
            page,
            query_timeout_ms,
        );

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(payload)
            .send()
            .await
            .map_err(FetchError::from_request)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(operation, status = status.as_u16(), "GraphQL request rejected");
            return Err(FetchError::ServerError(status.as_u16()));
        }

        response.text().await.map_err(FetchError::from_request)
    }
}

#[async_trait]
impl AvailabilityFetcher for OpenTableClient {
    async fn fetch(&self, target: &WatchTarget) -> Result<Availability, FetchError> {
        let restaurant_id = availability::parse_restaurant_id(&target.restaurant_id)?;
        let payload = availability::build_payload(restaurant_id, target, &self.database_region);

        let body = self
            .post_graphql(
                availability::OPERATION_NAME,
                PageContext::RestaurantProfile,
                availability::QUERY_TIMEOUT_MS,
                &payload,
            )
            .await?;

        let result = availability::parse_availability(&body, target.preferred_time)?;
        tracing::debug!(
            restaurant_id,
            slots = result.slots.len(),
            "Availability fetched"
        );
        Ok(result)
    }
}
