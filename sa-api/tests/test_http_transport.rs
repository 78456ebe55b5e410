//! Integration tests for the HTTP pipeline against a mock server.
//!
//! Covers header selection, query encoding, JSON and CSV interpretation,
//! error classification, timeouts, connection failures and client release.

mod common;

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{authed_client, impatient_client, public_client, run_blocking, API_KEY, USER_ID};
use sa_api::{
    EventsQuery, ExportFormat, ExportQuery, HistogramQuery, Interval, NetworkErrorKind,
    NewWebsite, Payload, SaError, StatsQuery,
};

// ---- Stats ----

#[tokio::test(flavor = "multi_thread")]
async fn public_stats_are_returned_unmodified_without_auth_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/simpleanalytics.com.json"))
        .and(query_param("version", "5"))
        .and(query_param("info", "true"))
        .and(query_param("fields", "pageviews,visitors"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"pageviews": 120, "visitors": 80})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let stats = run_blocking(move || {
        let client = public_client(&uri);
        let query = StatsQuery::new("simpleanalytics.com").fields(["pageviews", "visitors"]);
        client.stats().get(&query)
    })
    .await
    .unwrap();

    assert_eq!(stats, json!({"pageviews": 120, "visitors": 80}));

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert!(!received[0].headers.contains_key("api-key"));
    assert!(!received[0].headers.contains_key("user-id"));
    let agent = received[0].headers.get("user-agent").unwrap().to_str().unwrap();
    assert!(agent.starts_with("sa-rust-api/"));
}

#[tokio::test(flavor = "multi_thread")]
async fn stats_filters_and_page_path_reach_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/example.com/pricing.json"))
        .and(query_param("country", "US"))
        .and(query_param("device_type", "desktop"))
        .and(query_param("timezone", "Europe/Amsterdam"))
        .and(query_param("limit", "5000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"pages": []})))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let result = run_blocking(move || {
        let client = public_client(&uri);
        let query = StatsQuery::new("example.com")
            .path("/pricing")
            .timezone("Europe/Amsterdam")
            .limit(5000)
            .filter("country", "US")
            .filter("device_type", "desktop");
        client.stats().get(&query)
    })
    .await;

    assert_eq!(result.unwrap(), json!({"pages": []}));
}

#[tokio::test(flavor = "multi_thread")]
async fn histogram_and_events_queries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/example.com.json"))
        .and(query_param("fields", "histogram"))
        .and(query_param("interval", "month"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"histogram": [
            {"date": "2024-01-01", "pageviews": 10, "visitors": 4}
        ]})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/example.com.json"))
        .and(query_param("events", "*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"events": []})))
        .mount(&server)
        .await;

    let uri = server.uri();
    let (histogram, events) = run_blocking(move || {
        let client = public_client(&uri);
        let histogram = client
            .stats()
            .get_histogram(&HistogramQuery::new("example.com").interval(Interval::Month));
        let events = client.stats().get_events(&EventsQuery::new("example.com"));
        (histogram, events)
    })
    .await;

    let histogram = Payload::Json(histogram.unwrap()["histogram"].clone());
    let entries: Vec<sa_api::HistogramEntry> = histogram.deserialize().unwrap();
    assert_eq!(entries[0].pageviews, 10);
    assert_eq!(events.unwrap(), json!({"events": []}));
}

// ---- Export ----

#[tokio::test(flavor = "multi_thread")]
async fn csv_export_is_returned_verbatim() {
    let csv = "added_iso,path\n2024-01-01T10:00:00.000Z,/\n2024-01-01T10:05:00.000Z,/pricing\n";
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/export/datapoints"))
        .and(header("Api-Key", API_KEY))
        .and(header("User-Id", USER_ID))
        .and(header("Accept", "text/csv"))
        .and(query_param("format", "csv"))
        .and(query_param("hostname", "example.com"))
        .and(query_param("fields", "added_iso,path"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(csv.as_bytes().to_vec(), "text/csv"))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let text = run_blocking(move || {
        let client = authed_client(&uri);
        let query = ExportQuery::new("example.com", "2024-01-01", "2024-01-31")
            .format(ExportFormat::Csv)
            .fields(["added_iso", "path"]);
        client.export().datapoints(&query)
    })
    .await
    .unwrap();

    assert_eq!(text, Payload::Text(csv.to_string()));
}

#[tokio::test(flavor = "multi_thread")]
async fn export_without_credentials_never_hits_the_network() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let err = run_blocking(move || {
        let client = public_client(&uri);
        client
            .export()
            .datapoints(&ExportQuery::new("example.com", "2024-01-01", "2024-01-31"))
    })
    .await
    .unwrap_err();

    assert!(matches!(err, SaError::Authentication { status: None, .. }));
    assert!(server.received_requests().await.unwrap().is_empty());
}

// ---- Admin ----

#[tokio::test(flavor = "multi_thread")]
async fn add_website_posts_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/websites/add"))
        .and(header("Content-Type", "application/json"))
        .and(header("Api-Key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"hostname": "new.com"})))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let created = run_blocking(move || {
        let client = authed_client(&uri);
        client
            .admin()
            .add_website(&NewWebsite::new("new.com").public(true))
    })
    .await
    .unwrap();
    assert_eq!(created["hostname"], "new.com");

    let received = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(body, json!({"hostname": "new.com", "timezone": "UTC", "public": true}));
}

// ---- Error classification ----

#[tokio::test(flavor = "multi_thread")]
async fn rate_limit_captures_retry_after_and_does_not_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/websites"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("Retry-After", "30")
                .set_body_json(json!({"error": "Rate limit exceeded"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let err = run_blocking(move || authed_client(&uri).admin().list_websites())
        .await
        .unwrap_err();

    assert!(matches!(err, SaError::RateLimit { status: 429, .. }));
    assert_eq!(err.retry_after(), Some(Duration::from_secs(30)));
    assert_eq!(err.message(), "Rate limit exceeded");
}

#[tokio::test(flavor = "multi_thread")]
async fn unauthorized_response_does_not_echo_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/websites"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": format!("API key {API_KEY} is not valid")
        })))
        .mount(&server)
        .await;

    let uri = server.uri();
    let err = run_blocking(move || authed_client(&uri).admin().list_websites())
        .await
        .unwrap_err();

    assert!(matches!(err, SaError::Authentication { status: Some(401), .. }));
    assert!(!err.to_string().contains(API_KEY));
    assert!(!err.body().unwrap_or_default().contains(API_KEY));
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_json_is_a_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/example.com.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(b"{\"pageviews\": ".to_vec(), "application/json"),
        )
        .mount(&server)
        .await;

    let uri = server.uri();
    let err = run_blocking(move || public_client(&uri).stats().get(&StatsQuery::new("example.com")))
        .await
        .unwrap_err();

    assert!(matches!(err, SaError::Server { status: 200, .. }));
    assert!(err.message().starts_with("invalid response body"));
}

#[tokio::test(flavor = "multi_thread")]
async fn not_found_and_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing.example.json"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "Not found"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken.example.json"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&server)
        .await;

    let uri = server.uri();
    let (missing, broken) = run_blocking(move || {
        let client = public_client(&uri);
        (
            client.stats().get(&StatsQuery::new("missing.example")),
            client.stats().get(&StatsQuery::new("broken.example")),
        )
    })
    .await;

    let missing = missing.unwrap_err();
    assert!(matches!(missing, SaError::NotFound { status: 404, .. }));
    assert!(missing.message().contains("missing.example"));

    let broken = broken.unwrap_err();
    assert!(matches!(broken, SaError::Server { status: 503, .. }));
    assert!(broken.is_retryable());
}

#[tokio::test(flavor = "multi_thread")]
async fn redirect_is_an_api_error_and_credentials_stay_on_the_origin() {
    let origin = MockServer::start().await;
    let foreign = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/websites"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", format!("{}/collect", foreign.uri()).as_str()),
        )
        .expect(1)
        .mount(&origin)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&foreign)
        .await;

    let uri = origin.uri();
    let result = run_blocking(move || authed_client(&uri).admin().list_websites()).await;

    let err = result.unwrap_err();
    assert!(matches!(err, SaError::Api { status: 302, .. }));
    assert!(!err.to_string().contains(API_KEY));
    assert!(foreign.received_requests().await.unwrap().is_empty());
}

// ---- Transport failures ----

#[tokio::test(flavor = "multi_thread")]
async fn slow_response_is_a_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/example.com.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"pageviews": 1}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let uri = server.uri();
    let err = run_blocking(move || {
        let client = impatient_client(&uri, Duration::from_millis(200));
        client.stats().get(&StatsQuery::new("example.com"))
    })
    .await
    .unwrap_err();

    assert!(matches!(err, SaError::Network { kind: NetworkErrorKind::Timeout, .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn per_request_timeout_overrides_client_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/example.com.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let uri = server.uri();
    let err = run_blocking(move || {
        let client = public_client(&uri);
        let query = StatsQuery::new("example.com").timeout(Duration::from_millis(200));
        client.stats().get(&query)
    })
    .await
    .unwrap_err();

    assert!(matches!(err, SaError::Network { kind: NetworkErrorKind::Timeout, .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn refused_connection_is_a_network_error() {
    // Reserve a free port, then release it so nothing is listening there.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let uri = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let err = run_blocking(move || public_client(&uri).stats().get(&StatsQuery::new("example.com")))
        .await
        .unwrap_err();

    assert!(matches!(err, SaError::Network { .. }));
}

// ---- Lifecycle ----

#[tokio::test(flavor = "multi_thread")]
async fn scoped_client_reuses_one_pool_and_rejects_calls_after_close() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/example.com.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"pageviews": 1})))
        .expect(2)
        .mount(&server)
        .await;

    let uri = server.uri();
    let after_close = run_blocking(move || {
        let client = public_client(&uri);
        let query = StatsQuery::new("example.com");
        client.stats().get(&query)?;
        client.stats().get(&query)?;
        client.close();
        Ok::<_, SaError>(client.stats().get(&query))
    })
    .await
    .unwrap();

    assert!(matches!(after_close, Err(SaError::Closed)));
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn scope_returns_the_closure_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/websites"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"hostname": "a.com"}, {"hostname": "b.com"}])),
        )
        .mount(&server)
        .await;

    let uri = server.uri();
    let site = run_blocking(move || {
        authed_client(&uri).scope(|client| client.admin().get_website("b.com"))
    })
    .await
    .unwrap();

    assert_eq!(site.unwrap()["hostname"], "b.com");
}
