//! RestaurantsAvailability query and response decoding
//!
//! The service reports slot times as minute offsets from the requested time.
//! Decoding turns them into absolute clock times so nothing downstream has
//! to know about that encoding.

use chrono::{NaiveTime, TimeDelta};
use serde::Deserialize;

use super::graphql::{check_errors, GraphQlError};
use crate::models::Slot;
use crate::monitor::{Availability, WatchTarget};
use crate::utils::error::FetchError;

pub(crate) const OPERATION_NAME: &str = "RestaurantsAvailability";

const QUERY_HASH: &str = "c056cbf4dbe6a95dbb5f814916415dcff0b2c93c180a456d0d4a3a3f38d0b2cc";

/// `x-query-timeout` sent with availability queries
pub(crate) const QUERY_TIMEOUT_MS: u32 = 5500;

/// Build the persisted-query payload for one restaurant
pub fn build_payload(
    restaurant_id: i64,
    target: &WatchTarget,
    database_region: &str,
) -> serde_json::Value {
    serde_json::json!({
        "operationName": OPERATION_NAME,
        "variables": {
            "onlyPop": false,
            "forwardDays": 0,
            "requireTimes": false,
            "requireTypes": ["Standard", "Experience"],
            "privilegedAccess": [
                "VisaDiningProgram",
                "VisaEventsProgram",
                "ChaseDiningProgram"
            ],
            "restaurantIds": [restaurant_id],
            "date": target.date.format("%Y-%m-%d").to_string(),
            "time": target.preferred_time_label(),
            "partySize": target.party_size,
            "databaseRegion": database_region,
        },
        "extensions": {
            "persistedQuery": {
                "version": 1,
                "sha256Hash": QUERY_HASH,
            }
        }
    })
}

/// Parse a restaurant id the way the API expects it
pub fn parse_restaurant_id(raw: &str) -> Result<i64, FetchError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| FetchError::InvalidRestaurantId(raw.to_string()))
}

/// Clock time `offset_minutes` away from `base`, wrapping past midnight
pub fn offset_time(base: NaiveTime, offset_minutes: i64) -> NaiveTime {
    let (time, _) = base.overflowing_add_signed(TimeDelta::minutes(offset_minutes));
    time
}

#[derive(Debug, Deserialize)]
struct AvailabilityResponse {
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
    data: Option<AvailabilityData>,
}

#[derive(Debug, Deserialize)]
struct AvailabilityData {
    availability: Option<Vec<RestaurantAvailability>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RestaurantAvailability {
    #[serde(default)]
    restaurant_id: i64,
    #[serde(default)]
    restaurant_availability_token: Option<String>,
    #[serde(default)]
    availability_days: Option<Vec<AvailabilityDay>>,
}

#[derive(Debug, Deserialize)]
struct AvailabilityDay {
    #[serde(default)]
    slots: Option<Vec<RawSlot>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSlot {
    #[serde(default)]
    is_available: bool,
    #[serde(default)]
    time_offset_minutes: i64,
    #[serde(default)]
    slot_hash: Option<String>,
    #[serde(default)]
    points_type: Option<String>,
    #[serde(default)]
    points_value: Option<i64>,
    #[serde(default)]
    attributes: Option<Vec<String>>,
    #[serde(default)]
    is_mandatory: bool,
}

impl RawSlot {
    fn into_slot(self, preferred_time: NaiveTime) -> Slot {
        Slot::new(
            offset_time(preferred_time, self.time_offset_minutes),
            self.slot_hash.unwrap_or_default(),
        )
        .with_points(
            self.points_type.unwrap_or_default(),
            self.points_value.unwrap_or_default(),
        )
        .with_attributes(self.attributes.unwrap_or_default())
        .with_mandatory(self.is_mandatory)
    }
}

/// Decode a RestaurantsAvailability response body
///
/// Only the first restaurant entry is used. No entries at all yields
/// [`Availability::empty`]; unavailable slots are dropped.
///
/// # Errors
///
/// Returns `FetchError::Json` when the body is not the expected JSON shape,
/// and `FetchError::Decode` when the query was rejected or carried no `data`
pub fn parse_availability(
    body: &str,
    preferred_time: NaiveTime,
) -> Result<Availability, FetchError> {
    let response: AvailabilityResponse = serde_json::from_str(body)?;
    check_errors(OPERATION_NAME, response.errors)?;

    let data = response
        .data
        .ok_or_else(|| FetchError::Decode(format!("{OPERATION_NAME} response has no data")))?;

    let Some(entry) = data
        .availability
        .and_then(|entries| entries.into_iter().next())
    else {
        return Ok(Availability::empty());
    };

    let slots = entry
        .availability_days
        .unwrap_or_default()
        .into_iter()
        .flat_map(|day| day.slots.unwrap_or_default())
        .filter(|raw| raw.is_available)
        .map(|raw| raw.into_slot(preferred_time))
        .collect();

    Ok(Availability {
        slots,
        token: entry.restaurant_availability_token.unwrap_or_default(),
        restaurant_id: entry.restaurant_id,
    })
}
