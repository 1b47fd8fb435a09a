// Core data structures for the availability monitor

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Booking page that every reservation link points at
pub const BOOKING_DETAILS_URL: &str = "https://www.opentable.ca/booking/details";

/// One reservation window offered by the service
///
/// Slots are values: once built they are never mutated, and the
/// `slot_hash` (not the time) is what identifies them across polls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    time: NaiveTime,
    slot_hash: String,
    points_type: String,
    points_value: i64,
    attributes: Vec<String>,
    is_mandatory: bool,
}

impl Slot {
    /// Create a slot with no loyalty metadata or attributes
    pub fn new(time: NaiveTime, slot_hash: impl Into<String>) -> Self {
        Self {
            time,
            slot_hash: slot_hash.into(),
            points_type: String::new(),
            points_value: 0,
            attributes: Vec::new(),
            is_mandatory: false,
        }
    }

    /// Attach loyalty points metadata
    pub fn with_points(mut self, points_type: impl Into<String>, points_value: i64) -> Self {
        self.points_type = points_type.into();
        self.points_value = points_value;
        self
    }

    /// Attach descriptive tags (seating type, experience, ...)
    pub fn with_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    /// Mark whether attached terms must be accepted to book
    pub fn with_mandatory(mut self, is_mandatory: bool) -> Self {
        self.is_mandatory = is_mandatory;
        self
    }

    pub fn time(&self) -> NaiveTime {
        self.time
    }

    /// Time of day rendered as `HH:MM`
    pub fn time_label(&self) -> String {
        self.time.format("%H:%M").to_string()
    }

    pub fn slot_hash(&self) -> &str {
        &self.slot_hash
    }

    pub fn points_type(&self) -> &str {
        &self.points_type
    }

    pub fn points_value(&self) -> i64 {
        self.points_value
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    pub fn is_mandatory(&self) -> bool {
        self.is_mandatory
    }

    /// Short human description: `HH:MM [attr1,attr2]`
    pub fn describe(&self) -> String {
        format!("{} [{}]", self.time_label(), self.attributes.join(","))
    }
}

/// Build the booking URL for a slot
///
/// Pure string interpolation: the caller is trusted to pass sane values,
/// and malformed input simply yields a malformed URL.
pub fn build_reservation_link(
    slot: &Slot,
    date: NaiveDate,
    party_size: u32,
    availability_token: &str,
    restaurant_id: i64,
) -> String {
    let date_time = format!("{date}T{}:00", slot.time_label());
    let date_time: String = url::form_urlencoded::byte_serialize(date_time.as_bytes()).collect();

    format!(
        "{BOOKING_DETAILS_URL}?availabilityToken={availability_token}&dateTime={date_time}\
         &partySize={party_size}&points={points}&pointsType={points_type}&rid={restaurant_id}\
         &slotHash={slot_hash}&isModify=false&isMandatory={mandatory}&cfe=true",
        points = slot.points_value,
        points_type = slot.points_type,
        slot_hash = slot.slot_hash,
        mandatory = slot.is_mandatory,
    )
}

/// All slots observed in one poll cycle, keyed by slot identity
///
/// Iteration follows fetch order. When the service reports the same identity
/// twice, the first occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollSnapshot {
    slots: Vec<Slot>,
    index: HashMap<String, usize>,
}

impl PollSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_slots(slots: impl IntoIterator<Item = Slot>) -> Self {
        let mut snapshot = Self::new();
        for slot in slots {
            if snapshot.index.contains_key(slot.slot_hash()) {
                continue;
            }
            snapshot
                .index
                .insert(slot.slot_hash().to_string(), snapshot.slots.len());
            snapshot.slots.push(slot);
        }
        snapshot
    }

    pub fn get(&self, slot_hash: &str) -> Option<&Slot> {
        self.index.get(slot_hash).map(|&i| &self.slots[i])
    }

    pub fn contains(&self, slot_hash: &str) -> bool {
        self.index.contains_key(slot_hash)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Slot> {
        self.slots.iter()
    }
}

impl FromIterator<Slot> for PollSnapshot {
    fn from_iter<T: IntoIterator<Item = Slot>>(iter: T) -> Self {
        Self::from_slots(iter)
    }
}

impl<'a> IntoIterator for &'a PollSnapshot {
    type Item = &'a Slot;
    type IntoIter = std::slice::Iter<'a, Slot>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Restaurant returned by the autocomplete search
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RestaurantSummary {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub name: String,
    #[serde(rename = "neighborhoodName", default)]
    pub neighborhood: String,
    #[serde(rename = "metroName", default)]
    pub metro: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

impl RestaurantSummary {
    /// Placeholder used when only the numeric id is known
    pub fn from_id(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: format!("Restaurant {id}"),
            id,
            ..Default::default()
        }
    }

    /// `neighborhood, metro`, skipping empty parts
    pub fn location(&self) -> String {
        [self.neighborhood.as_str(), self.metro.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Latitude / longitude pair used to bias restaurant search
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}
