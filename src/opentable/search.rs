//! Restaurant autocomplete search

use serde::Deserialize;

use super::client::OpenTableClient;
use super::graphql::{check_errors, GraphQlError};
use super::headers::PageContext;
use crate::models::{Coordinates, RestaurantSummary};
use crate::utils::error::FetchError;

pub(crate) const OPERATION_NAME: &str = "Autocomplete";

const QUERY_HASH: &str = "fe1d118abd4c227750693027c2414d43014c2493f64f49bcef5a65274ce9c3c3";

const QUERY_TIMEOUT_MS: u32 = 1500;

/// Build the persisted-query payload for a search term
pub fn build_payload(term: &str, coordinates: Coordinates) -> serde_json::Value {
    serde_json::json!({
        "operationName": OPERATION_NAME,
        "variables": {
            "term": term,
            "latitude": coordinates.lat,
            "longitude": coordinates.lon,
            "useNewVersion": true,
        },
        "extensions": {
            "persistedQuery": {
                "version": 1,
                "sha256Hash": QUERY_HASH,
            }
        }
    })
}

#[derive(Debug, Deserialize)]
struct AutocompleteResponse {
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
    data: Option<AutocompleteData>,
}

#[derive(Debug, Deserialize)]
struct AutocompleteData {
    autocomplete: Option<AutocompleteResults>,
}

#[derive(Debug, Deserialize)]
struct AutocompleteResults {
    #[serde(rename = "autocompleteResults", default)]
    results: Option<Vec<RestaurantSummary>>,
}

/// Decode an Autocomplete response body
pub fn parse_autocomplete(body: &str) -> Result<Vec<RestaurantSummary>, FetchError> {
    let response: AutocompleteResponse = serde_json::from_str(body)?;
    check_errors(OPERATION_NAME, response.errors)?;

    Ok(response
        .data
        .and_then(|d| d.autocomplete)
        .and_then(|a| a.results)
        .unwrap_or_default())
}

impl OpenTableClient {
    /// Find restaurants matching `term`, biased towards the client's location
    ///
    /// # Errors
    ///
    /// Returns a `FetchError` on transport failure or an undecodable body
    pub async fn autocomplete(&self, term: &str) -> Result<Vec<RestaurantSummary>, FetchError> {
        let payload = build_payload(term, self.coordinates());

        tracing::debug!(term = %term, "Searching restaurants");

        let body = self
            .post_graphql(OPERATION_NAME, PageContext::Search, QUERY_TIMEOUT_MS, &payload)
            .await?;

        parse_autocomplete(&body)
    }
}
