//! Offline HTTP behavior against a local mock server.
use dashcharts::api::RETRY_BACKOFF_MS;
use dashcharts::{Client, Endpoint};

#[test]
fn server_errors_are_retried_then_reported() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/mock/weekly-mood-trend")
        .with_status(500)
        .expect(RETRY_BACKOFF_MS.len() + 1)
        .create();

    let client = Client::new(server.url()).unwrap();
    let err = client.fetch_payload(Endpoint::WeeklyMoodTrend).unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("HTTP 500"), "{msg}");
    assert!(msg.contains("giving up after 4 attempts"), "{msg}");
    mock.assert();

    assert!(client.fetch_state(Endpoint::WeeklyMoodTrend).is_error);
}

#[test]
fn recovers_when_a_retry_succeeds() {
    let mut server = mockito::Server::new();
    let failing = server
        .mock("GET", "/mock/top-coffee-brands")
        .with_status(503)
        .expect(1)
        .create();
    let ok = server
        .mock("GET", "/mock/top-coffee-brands")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"brand": "Mega", "popularity": "20"}]"#)
        .create();

    let client = Client::new(server.url()).unwrap();
    let payload = client.fetch_payload(Endpoint::TopCoffeeBrands).unwrap();
    let rows = dashcharts::normalize::payload_rows(&payload);
    assert_eq!(rows[0]["value"].as_f64(), Some(20.0));
    failing.assert();
    ok.assert();
}

#[test]
fn client_errors_are_not_retried() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/mock/snack-impact")
        .with_status(404)
        .expect(1)
        .create();

    let client = Client::new(server.url()).unwrap();
    let err = client.fetch_payload(Endpoint::SnackImpact).unwrap_err();
    assert!(format!("{err:#}").contains("not found"));
    mock.assert();
}
