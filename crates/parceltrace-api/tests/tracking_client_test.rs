// Integration tests for `TrackingClient` using wiremock.

#![allow(clippy::unwrap_used)]

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use parceltrace_api::{Error, TrackingClient};

// ── Helpers ─────────────────────────────────────────────────────────

fn client_for(server: &MockServer) -> TrackingClient {
    let base: Url = server.uri().parse().unwrap();
    TrackingClient::from_reqwest(
        reqwest::Client::new(),
        base.clone(),
        base,
        SecretString::from("test-key"),
        "Germany",
        "en-GB",
    )
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn submit_returns_session_uuid() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    Mock::given(method("POST"))
        .and(path("/api/v3/shipments/tracking"))
        .and(body_partial_json(json!({
            "shipments": [{ "trackingId": "RR123456789NL", "destinationCountry": "Germany" }],
            "language": "en",
            "apiKey": "test-key",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "uuid": "abc-123" })))
        .mount(&server)
        .await;

    let resp = client.submit_tracking("RR123456789NL").await.unwrap();

    assert_eq!(resp.uuid.as_deref(), Some("abc-123"));
    assert!(resp.shipments.is_empty());
}

#[tokio::test]
async fn submit_returns_shipment_directly() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let body = json!({
        "shipments": [{
            "trackingId": "RR123456789NL",
            "status": "in_transit",
            "origin": "Netherlands",
            "destination": "Germany",
            "detectedCarrier": { "name": "PostNL" },
            "lastState": { "status": "Arrived at sorting center" },
            "eta": { "period": ["2024-03-08", "2024-03-10"], "remaining": [2, 4] },
            "attributes": [
                { "l": "days_transit", "val": 3 },
                { "l": "eta", "val": "March 8 - March 10" }
            ],
            "states": [
                { "location": "NL", "date": "2024-03-01T08:00:00Z", "status": "Accepted" }
            ]
        }]
    });

    Mock::given(method("POST"))
        .and(path("/api/v3/shipments/tracking"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let resp = client.submit_tracking("RR123456789NL").await.unwrap();
    let shipment = &resp.shipments[0];

    assert!(resp.uuid.is_none());
    assert_eq!(shipment.status.as_deref(), Some("in_transit"));
    assert_eq!(
        shipment.detected_carrier.as_ref().unwrap().name.as_deref(),
        Some("PostNL")
    );
    assert_eq!(
        shipment.last_state.as_ref().unwrap().status.as_deref(),
        Some("Arrived at sorting center")
    );
    assert_eq!(shipment.states[0].location.as_deref(), Some("NL"));
}

#[tokio::test]
async fn poll_by_session_sends_query_params() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    Mock::given(method("GET"))
        .and(path("/api/v3/shipments/tracking"))
        .and(query_param("uuid", "abc-123"))
        .and(query_param("apiKey", "test-key"))
        .and(query_param("language", "en"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "done": true,
            "shipments": [{ "status": "delivered" }]
        })))
        .mount(&server)
        .await;

    let resp = client.poll_by_session("abc-123").await.unwrap();

    assert!(resp.done);
    assert_eq!(resp.shipments[0].status.as_deref(), Some("delivered"));
}

#[tokio::test]
async fn poll_by_session_not_done_yet() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    Mock::given(method("GET"))
        .and(path("/api/v3/shipments/tracking"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "done": false })))
        .mount(&server)
        .await;

    let resp = client.poll_by_session("abc-123").await.unwrap();

    assert!(!resp.done);
    assert!(resp.shipments.is_empty());
}

#[tokio::test]
async fn probe_status_measures_round_trip() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    let status = client.probe_status().await.unwrap();

    assert!(status.reachable);
    assert_eq!(status.response_code, 200);
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn error_401_maps_to_invalid_api_key() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.submit_tracking("RR123456789NL").await;

    assert!(
        matches!(result, Err(Error::InvalidApiKey)),
        "expected InvalidApiKey, got: {result:?}"
    );
}

#[tokio::test]
async fn error_500_carries_status_and_body() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let result = client.submit_tracking("RR123456789NL").await;

    match result {
        Err(Error::Api { status, ref message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "upstream exploded");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn invalid_json_retains_raw_body() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let result = client.submit_tracking("RR123456789NL").await;

    match result {
        Err(Error::Deserialization { ref body, .. }) => {
            assert_eq!(body, "<html>not json</html>");
        }
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}

#[tokio::test]
async fn probe_failure_is_transient() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client.probe_status().await.unwrap_err();
    assert!(err.is_transient());
}
