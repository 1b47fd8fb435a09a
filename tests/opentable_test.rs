//! Integration tests for OpenTableClient using wiremock
//!
//! These tests validate session bootstrap, availability and search against
//! mock servers.

mod common;

use serde_json::json;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{t, target};
use tablewatch::config::OpenTableConfig;
use tablewatch::models::Coordinates;
use tablewatch::monitor::{AvailabilityFetcher, Monitor, MonitorError};
use tablewatch::opentable::OpenTableClient;
use tablewatch::utils::error::FetchError;

const HOME_PAGE: &str = r#"<!DOCTYPE html>
<html><head>
<script id="primary-window-vars" type="application/json">
{"windowVariables": {"__CSRF_TOKEN__": "csrf-abc", "__LOCALE__": "en-CA"}}
</script>
</head><body>OpenTable</body></html>"#;

fn config_for(server: &MockServer) -> OpenTableConfig {
    OpenTableConfig {
        base_url: server.uri(),
        geo_url: format!("{}/geo", server.uri()),
        request_timeout_secs: 5,
        ..Default::default()
    }
}

async fn mount_home(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(HOME_PAGE))
        .mount(server)
        .await;
}

fn availability_body() -> serde_json::Value {
    json!({
        "data": {
            "availability": [{
                "restaurantId": 1234,
                "restaurantAvailabilityToken": "avail-tok",
                "availabilityDays": [{
                    "slots": [
                        {"isAvailable": true, "timeOffsetMinutes": -30, "slotHash": "early",
                         "pointsType": "POINTS", "pointsValue": 100, "attributes": ["default"]},
                        {"isAvailable": false, "timeOffsetMinutes": 0, "slotHash": "gone"},
                        {"isAvailable": true, "timeOffsetMinutes": 60, "slotHash": "late",
                         "attributes": ["outdoor"]}
                    ]
                }]
            }]
        }
    })
}

/// Session bootstrap scrapes the CSRF token and looks up coordinates
#[tokio::test]
async fn test_connect_bootstraps_session() {
    let server = MockServer::start().await;
    mount_home(&server).await;

    Mock::given(method("GET"))
        .and(path("/geo"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"city": "Toronto", "latitude": 43.65, "longitude": -79.38})),
        )
        .mount(&server)
        .await;

    let client = OpenTableClient::connect(&config_for(&server)).await.unwrap();

    assert_eq!(client.csrf_token(), "csrf-abc");
    assert_eq!(
        client.coordinates(),
        Coordinates {
            lat: 43.65,
            lon: -79.38
        }
    );
}

/// A failing geolocation lookup is not fatal
#[tokio::test]
async fn test_connect_without_geolocation() {
    let server = MockServer::start().await;
    mount_home(&server).await;

    Mock::given(method("GET"))
        .and(path("/geo"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let client = OpenTableClient::connect(&config_for(&server)).await.unwrap();

    assert_eq!(client.coordinates(), Coordinates::default());
}

/// A home page without the token aborts the bootstrap
#[tokio::test]
async fn test_connect_without_csrf_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html><body>captcha</body></html>"),
        )
        .mount(&server)
        .await;

    let result = OpenTableClient::connect(&config_for(&server)).await;

    assert!(matches!(result, Err(FetchError::CsrfTokenMissing(_))));
}

/// A blocked home page surfaces its status
#[tokio::test]
async fn test_connect_blocked() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let result = OpenTableClient::connect(&config_for(&server)).await;

    assert!(matches!(result, Err(FetchError::ServerError(403))));
}

/// Availability request carries the session headers and decodes offsets
#[tokio::test]
async fn test_fetch_availability() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/dapi/fe/gql"))
        .and(query_param("optype", "query"))
        .and(query_param("opname", "RestaurantsAvailability"))
        .and(header("x-csrf-token", "csrf-abc"))
        .and(header("x-query-timeout", "5500"))
        .and(header("ot-page-group", "rest-profile"))
        .and(body_partial_json(json!({
            "operationName": "RestaurantsAvailability",
            "variables": {
                "restaurantIds": [1234],
                "date": "2025-07-04",
                "time": "18:00",
                "partySize": 2
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(availability_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client =
        OpenTableClient::with_session(&config_for(&server), "csrf-abc", Coordinates::default())
            .unwrap();

    let availability = client.fetch(&target("18:00")).await.unwrap();

    assert_eq!(availability.token, "avail-tok");
    assert_eq!(availability.restaurant_id, 1234);
    assert_eq!(availability.slots.len(), 2);
    assert_eq!(availability.slots[0].time(), t("17:30"));
    assert_eq!(availability.slots[0].points_value(), 100);
    assert_eq!(availability.slots[1].time(), t("19:00"));
    assert_eq!(availability.slots[1].attributes(), ["outdoor"]);
}

/// Non-2xx availability responses become ServerError
#[tokio::test]
async fn test_fetch_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/dapi/fe/gql"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client =
        OpenTableClient::with_session(&config_for(&server), "csrf-abc", Coordinates::default())
            .unwrap();

    let result = client.fetch(&target("18:00")).await;

    assert!(matches!(result, Err(FetchError::ServerError(500))));
}

/// A rejected query is an error, not an empty availability
#[tokio::test]
async fn test_fetch_graphql_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/dapi/fe/gql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{"message": "Unauthorized"}],
            "data": null
        })))
        .mount(&server)
        .await;

    let client =
        OpenTableClient::with_session(&config_for(&server), "expired", Coordinates::default())
            .unwrap();

    match client.fetch(&target("18:00")).await {
        Err(FetchError::Decode(msg)) => assert!(msg.contains("Unauthorized")),
        other => panic!("expected decode error, got {other:?}"),
    }
}

/// A slow service is cut off by the request timeout
#[tokio::test]
async fn test_fetch_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/dapi/fe/gql"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(availability_body())
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = OpenTableConfig {
        request_timeout_secs: 1,
        ..config_for(&server)
    };
    let client = OpenTableClient::with_session(&config, "csrf-abc", Coordinates::default())
        .unwrap();

    let result = client.fetch(&target("18:00")).await;

    assert!(matches!(result, Err(FetchError::Timeout)), "{result:?}");
}

/// Non-numeric ids fail before any request is made
#[tokio::test]
async fn test_fetch_invalid_restaurant_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client =
        OpenTableClient::with_session(&config_for(&server), "csrf-abc", Coordinates::default())
            .unwrap();

    let mut bad = target("18:00");
    bad.restaurant_id = "canoe".into();

    assert!(matches!(
        client.fetch(&bad).await,
        Err(FetchError::InvalidRestaurantId(_))
    ));
}

/// Autocomplete returns restaurant summaries
#[tokio::test]
async fn test_autocomplete() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/dapi/fe/gql"))
        .and(query_param("opname", "Autocomplete"))
        .and(header("x-query-timeout", "1500"))
        .and(header("ot-page-type", "multi-search"))
        .and(body_partial_json(json!({"variables": {"term": "canoe", "latitude": 43.65}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"autocomplete": {"autocompleteResults": [
                {"id": "1234", "type": "Restaurant", "name": "Canoe",
                 "neighborhoodName": "Financial District", "metroName": "Toronto",
                 "country": "CA", "latitude": 43.647, "longitude": -79.381}
            ]}}
        })))
        .mount(&server)
        .await;

    let client = OpenTableClient::with_session(
        &config_for(&server),
        "csrf-abc",
        Coordinates {
            lat: 43.65,
            lon: -79.38,
        },
    )
    .unwrap();

    let results = client.autocomplete("canoe").await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name, "Canoe");
    assert_eq!(results[0].location(), "Financial District, Toronto");
}

/// The monitor stops on the first poll when the preferred time is offered
#[tokio::test]
async fn test_monitor_against_mock_service() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/dapi/fe/gql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(availability_body()))
        .mount(&server)
        .await;

    let client =
        OpenTableClient::with_session(&config_for(&server), "csrf-abc", Coordinates::default())
            .unwrap();
    let monitor = Monitor::new(client);
    let cancel = CancellationToken::new();

    let mut events = Vec::new();
    let found = monitor
        .run(target("19:00"), &cancel, |e| events.push(e))
        .await
        .unwrap();

    assert_eq!(found.slot_hash(), "late");
    assert_eq!(events.len(), 1);
    let link = events[0].reservation_link();
    assert!(link
        .starts_with("https://www.opentable.ca/booking/details?availabilityToken=avail-tok"));
    assert!(link.contains("rid=1234"));
    assert!(link.contains("slotHash=late"));
}

/// A fetch failure ends the monitor with the transport error
#[tokio::test]
async fn test_monitor_stops_on_transport_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/dapi/fe/gql"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client =
        OpenTableClient::with_session(&config_for(&server), "csrf-abc", Coordinates::default())
            .unwrap();
    let monitor = Monitor::new(client);

    let result = monitor
        .run(target("19:00"), &CancellationToken::new(), |_| {})
        .await;

    assert!(matches!(
        result,
        Err(MonitorError::Fetch(FetchError::ServerError(503)))
    ));
}

/// A timed-out fetch ends the monitor
#[tokio::test]
async fn test_monitor_stops_on_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/dapi/fe/gql"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let config = OpenTableConfig {
        request_timeout_secs: 1,
        ..config_for(&server)
    };
    let client = OpenTableClient::with_session(&config, "csrf-abc", Coordinates::default())
        .unwrap();

    let mut events = Vec::new();
    let result = Monitor::new(client)
        .run(target("19:00"), &CancellationToken::new(), |e| events.push(e))
        .await;

    assert!(matches!(
        result,
        Err(MonitorError::Fetch(FetchError::Timeout))
    ));
    assert!(events.is_empty());
}

/// A rejected session ends the monitor instead of reading as "no slots"
#[tokio::test]
async fn test_monitor_stops_on_rejected_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/dapi/fe/gql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{"message": "Unauthorized"}],
            "data": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client =
        OpenTableClient::with_session(&config_for(&server), "expired", Coordinates::default())
            .unwrap();

    let result = Monitor::new(client)
        .run(target("19:00"), &CancellationToken::new(), |_| {})
        .await;

    assert!(matches!(
        result,
        Err(MonitorError::Fetch(FetchError::Decode(_)))
    ));
}
