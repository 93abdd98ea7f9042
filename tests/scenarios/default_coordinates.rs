//! Test: Default Coordinates - geocoding with no match falls back to the venue

use crate::helpers::*;
use meetup_ops::clients::{GoogleGeocoder, DEFAULT_COORDINATES};
use meetup_ops::core::config::GeocodingSettings;
use meetup_ops::core::{Fields, Workflow};
use meetup_ops::steps::GeocodeStep;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ADDRESS: &str = "1999 Harrison St. Ste. 1150 Oakland, CA 94612";

fn geocode_workflow(server: &MockServer) -> Workflow {
    let geocoder = GoogleGeocoder::new(
        &GeocodingSettings {
            api_url: format!("{}/geocode/json", server.uri()),
        },
        "maps_test",
    );
    Workflow::new("geocode").step(GeocodeStep::new(Arc::new(geocoder)))
}

#[tokio::test]
async fn test_empty_results_use_default_coordinates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geocode/json"))
        .and(query_param("address", ADDRESS))
        .and(query_param("key", "maps_test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ZERO_RESULTS",
            "results": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = run_workflow(&geocode_workflow(&server), Fields::new().with("eventLocation", ADDRESS)).await;

    assert_run_completed(&result);
    let coordinates = result.context().require("eventCoordinates").unwrap();
    assert_eq!(
        coordinates,
        &json!({"lat": DEFAULT_COORDINATES.lat, "lng": DEFAULT_COORDINATES.lng})
    );
}

#[tokio::test]
async fn test_first_result_is_used() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geocode/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "results": [
                {"geometry": {"location": {"lat": 40.7128, "lng": -74.006}}},
                {"geometry": {"location": {"lat": 0.0, "lng": 0.0}}}
            ]
        })))
        .mount(&server)
        .await;

    let result = run_workflow(&geocode_workflow(&server), Fields::new().with("eventLocation", "New York")).await;

    assert_run_completed(&result);
    assert_field(&result, "eventCoordinates", json!({"lat": 40.7128, "lng": -74.006}));
}

/// Only "no match" is defaulted; a rejected request still fails the step
#[tokio::test]
async fn test_denied_request_is_not_defaulted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geocode/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid.",
            "results": []
        })))
        .mount(&server)
        .await;

    let result = run_workflow(&geocode_workflow(&server), Fields::new().with("eventLocation", ADDRESS)).await;

    assert_run_failed_at(&result, "geocode venue", "REQUEST_DENIED");
    assert!(!result.context().contains("eventCoordinates"));
}

#[tokio::test]
async fn test_missing_address_fails_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = run_workflow(&geocode_workflow(&server), Fields::new()).await;

    assert_run_failed_at(&result, "geocode venue", "eventLocation");
}
