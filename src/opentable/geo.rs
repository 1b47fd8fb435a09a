//! IP geolocation used to bias restaurant search

use reqwest::header::{HeaderValue, USER_AGENT};
use reqwest::Client;
use serde::Deserialize;

use crate::models::Coordinates;
use crate::utils::error::FetchError;

#[derive(Debug, Deserialize)]
struct GeoResponse {
    latitude: f64,
    longitude: f64,
}

/// Decode an ipapi-style `{"latitude": .., "longitude": ..}` document
pub fn parse_coordinates(body: &str) -> Result<Coordinates, FetchError> {
    let geo: GeoResponse = serde_json::from_str(body)?;
    Ok(Coordinates {
        lat: geo.latitude,
        lon: geo.longitude,
    })
}

/// Look up the caller's approximate coordinates
///
/// # Errors
///
/// Returns a `FetchError` on transport failure, non-2xx status, or a body
/// without coordinates
pub async fn lookup_coordinates(
    client: &Client,
    url: &str,
    user_agent: &str,
) -> Result<Coordinates, FetchError> {
    let mut request = client.get(url);
    if let Ok(value) = HeaderValue::from_str(user_agent) {
        request = request.header(USER_AGENT, value);
    }

    let response = request.send().await.map_err(FetchError::from_request)?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::ServerError(status.as_u16()));
    }

    let body = response.text().await.map_err(FetchError::from_request)?;
    parse_coordinates(&body)
}
