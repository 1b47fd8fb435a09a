//! OpenTable transport
//!
//! Session bootstrap, availability queries and restaurant search against
//! OpenTable's front-end GraphQL endpoint. [`OpenTableClient`] implements
//! [`crate::monitor::AvailabilityFetcher`].

pub mod availability;
pub mod client;
pub mod geo;
mod graphql;
pub mod headers;
pub mod search;

pub use client::{extract_csrf_token, OpenTableClient};
