/// Integration tests for the HTTP adapters against a local tiny_http server
///
/// Covers the reqwest feed client, the reqwest webhook sender and the
/// query endpoint end to end. Everything binds to 127.0.0.1 on an
/// ephemeral port.
///
/// Run with: cargo test --test http_adapters

use std::net::TcpListener;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::Utc;
use tiny_http::{Response, Server};

use wxwarn_service::cache::WarningCache;
use wxwarn_service::endpoint::{EndpointState, start_endpoint_server};
use wxwarn_service::error::{DeliveryError, FeedError};
use wxwarn_service::http::{HttpFetch, ReqwestFetch};
use wxwarn_service::ingest::smhi::parse_warning_feed;
use wxwarn_service::model::Snapshot;
use wxwarn_service::notify::{ReqwestWebhookSender, WebhookPayload, WebhookSender};
use wxwarn_service::query::QueryService;
use wxwarn_service::shutdown::Shutdown;

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

const TIMEOUT: Duration = Duration::from_secs(5);

const FEED: &str = r#"[{
  "id": 42,
  "event": { "en": "Snow", "sv": "Snö", "code": "SNOW" },
  "warningAreas": [{
    "id": 420,
    "warningLevel": { "en": "Orange", "sv": "Orange", "code": "ORANGE" },
    "affectedAreas": [ { "id": 25, "sv": "Norrbottens län", "en": "Norrbotten County" } ],
    "area": { "type": "Feature", "geometry": { "type": "Polygon",
      "coordinates": [[[20.0, 65.5], [23.0, 65.5], [23.0, 67.0], [20.0, 67.0], [20.0, 65.5]]] } }
  }]
}]"#;

#[derive(Debug)]
struct Recorded {
    method: String,
    url: String,
    content_type: Option<String>,
    body: String,
}

/// Answers `count` requests with `status` and `body`, then returns what it
/// received.
fn serve(status: u16, body: &'static str, count: usize) -> (String, JoinHandle<Vec<Recorded>>) {
    let server = Server::http("127.0.0.1:0").expect("test server should bind");
    let addr = server.server_addr().to_ip().expect("IP listener");
    let handle = thread::spawn(move || {
        let mut recorded = Vec::new();
        for _ in 0..count {
            let mut request = server.recv().expect("request should arrive");
            let mut received = String::new();
            request.as_reader().read_to_string(&mut received).unwrap();
            recorded.push(Recorded {
                method: request.method().to_string(),
                url: request.url().to_string(),
                content_type: request
                    .headers()
                    .iter()
                    .find(|h| h.field.equiv("Content-Type"))
                    .map(|h| h.value.to_string()),
                body: received,
            });
            request
                .respond(Response::from_string(body).with_status_code(status))
                .unwrap();
        }
        recorded
    });
    (format!("http://{}", addr), handle)
}

/// A local URL nothing listens on.
fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/", port)
}

fn payload() -> WebhookPayload {
    WebhookPayload {
        sensor_id: 7,
        sensor_name: "Kiruna mast".to_string(),
        status: "ORANGE".to_string(),
        warning: "Snow".to_string(),
        timestamp: Utc::now(),
    }
}

// ---------------------------------------------------------------------------
// Feed client
// ---------------------------------------------------------------------------

#[test]
fn test_feed_client_fetches_body() {
    let (base, server) = serve(200, FEED, 1);
    let client = ReqwestFetch::new(TIMEOUT).unwrap();

    let body = client
        .get_text(&format!("{}/ibww/warning.json", base))
        .expect("fetch should succeed");

    assert_eq!(parse_warning_feed(&body).unwrap()[0].id, 42);
    let recorded = server.join().unwrap();
    assert_eq!(recorded[0].method, "GET");
    assert_eq!(recorded[0].url, "/ibww/warning.json");
}

#[test]
fn test_feed_client_maps_non_2xx_to_status_error() {
    let (base, server) = serve(503, "maintenance", 1);
    let client = ReqwestFetch::new(TIMEOUT).unwrap();

    let result = client.get_text(&base);

    assert!(matches!(result, Err(FeedError::Status { status: 503, .. })), "got {:?}", result);
    server.join().unwrap();
}

#[test]
fn test_feed_client_maps_refused_connection_to_transport_error() {
    let client = ReqwestFetch::new(TIMEOUT).unwrap();
    let result = client.get_text(&closed_port_url());
    assert!(matches!(result, Err(FeedError::Transport { .. })), "got {:?}", result);
}

// ---------------------------------------------------------------------------
// Webhook sender
// ---------------------------------------------------------------------------

#[test]
fn test_webhook_sender_posts_json_payload() {
    let (base, server) = serve(204, "", 1);
    let sender = ReqwestWebhookSender::new(TIMEOUT).unwrap();

    sender
        .post_json(&format!("{}/hooks/weather", base), &payload())
        .expect("delivery should succeed");

    let recorded = server.join().unwrap();
    assert_eq!(recorded[0].method, "POST");
    assert_eq!(recorded[0].url, "/hooks/weather");
    assert_eq!(recorded[0].content_type.as_deref(), Some("application/json"));

    let body: serde_json::Value = serde_json::from_str(&recorded[0].body).unwrap();
    assert_eq!(body["sensor_id"], 7);
    assert_eq!(body["sensor_name"], "Kiruna mast");
    assert_eq!(body["status"], "ORANGE");
    assert_eq!(body["warning"], "Snow");
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[test]
fn test_webhook_sender_reports_http_failure_status() {
    let (base, server) = serve(500, "boom", 1);
    let sender = ReqwestWebhookSender::new(TIMEOUT).unwrap();

    let result = sender.post_json(&base, &payload());

    match result {
        Err(e @ DeliveryError::Status { .. }) => assert_eq!(e.status(), Some(500)),
        other => panic!("expected status error, got {:?}", other),
    }
    server.join().unwrap();
}

#[test]
fn test_webhook_sender_reports_unreachable_endpoint() {
    let sender = ReqwestWebhookSender::new(TIMEOUT).unwrap();
    let result = sender.post_json(&closed_port_url(), &payload());
    assert!(matches!(result, Err(DeliveryError::Transport { .. })), "got {:?}", result);
}

// ---------------------------------------------------------------------------
// Query endpoint
// ---------------------------------------------------------------------------

#[test]
fn test_endpoint_serves_queries_until_shutdown() {
    let cache = Arc::new(WarningCache::new());
    cache.replace(Snapshot::new(parse_warning_feed(FEED).unwrap(), Utc::now()));
    let state = Arc::new(EndpointState {
        query: QueryService::new(Arc::clone(&cache), 10),
        cache,
    });
    let shutdown = Shutdown::new();

    let server = start_endpoint_server("127.0.0.1:0", 2, state, shutdown.clone())
        .expect("endpoint should start");
    let base = format!("http://{}", server.local_addr().expect("IP listener"));
    let client = reqwest::blocking::Client::builder().timeout(TIMEOUT).build().unwrap();

    let response = client
        .get(format!("{}/api/weather-warnings?areaName=norrbotten&page=1", base))
        .send()
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().unwrap();
    assert_eq!(body["warnings"][0]["id"], 42);

    let empty: serde_json::Value = client
        .get(format!("{}/api/weather-warnings?eventType=WIND", base))
        .send()
        .unwrap()
        .json()
        .unwrap();
    assert_eq!(empty["warnings"].as_array().unwrap().len(), 0);

    let health: serde_json::Value = client.get(format!("{}/health", base)).send().unwrap().json().unwrap();
    assert_eq!(health["warnings"], 1);

    let missing = client.get(format!("{}/nope", base)).send().unwrap();
    assert_eq!(missing.status().as_u16(), 404);

    shutdown.trigger();
    server.join();
}
