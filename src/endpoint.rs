/// HTTP endpoint for querying current warnings
///
/// Endpoints:
/// - GET /api/weather-warnings - Filtered, paginated warnings from the cache
///   Query parameters: eventType, areaName, page, pageSize
/// - GET /health - Service health and snapshot freshness
///
/// Requests are served by a fixed number of worker threads sharing one
/// listener. Workers poll the shutdown handle between requests.

use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde::Serialize;
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};
use tracing::{debug, error, info, warn};

use crate::cache::WarningCache;
use crate::model::Warning;
use crate::query::{QueryService, WarningQuery};
use crate::shutdown::Shutdown;

const WARNINGS_PATH: &str = "/api/weather-warnings";
const HEALTH_PATH: &str = "/health";
const POLL: Duration = Duration::from_millis(250);

// ---------------------------------------------------------------------------
// Response Types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct WarningsResponse {
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub warnings: usize,
    /// RFC 3339, absent until the first successful fetch.
    pub fetched_at: Option<String>,
}

/// Shared read-only state for request handlers.
pub struct EndpointState {
    pub query: QueryService,
    pub cache: Arc<WarningCache>,
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

/// Routes one request to a status code and JSON body.
pub fn route(method: &Method, url: &str, state: &EndpointState) -> (u16, String) {
    let (path, query_string) = match url.split_once('?') {
        Some((path, query)) => (path, query),
        None => (url, ""),
    };

    if *method != Method::Get {
        return error_body(405, "Method not allowed");
    }

    match path {
        WARNINGS_PATH => {
            let query = parse_warning_query(query_string);
            debug!(?query, "warnings query");
            encode(&WarningsResponse {
                warnings: state.query.query(&query),
            })
        }
        HEALTH_PATH => {
            let snapshot = state.cache.read();
            encode(&HealthResponse {
                status: "ok",
                service: "wxwarn_service",
                version: env!("CARGO_PKG_VERSION"),
                warnings: snapshot.len(),
                fetched_at: snapshot.fetched_at.map(|t| t.to_rfc3339()),
            })
        }
        _ => (
            404,
            serde_json::json!({
                "error": "Not found",
                "available_endpoints": [WARNINGS_PATH, HEALTH_PATH]
            })
            .to_string(),
        ),
    }
}

/// Decodes `eventType`, `areaName`, `page` and `pageSize`. Unknown keys are
/// ignored; unparsable numbers fall back to 0, which the query service
/// treats as "use the default".
pub fn parse_warning_query(query_string: &str) -> WarningQuery {
    let mut query = WarningQuery::default();

    for pair in query_string.split('&').filter(|p| !p.is_empty()) {
        let (key, raw) = pair.split_once('=').unwrap_or((pair, ""));
        let value = decode_component(raw);
        match key {
            "eventType" => query.event_type = value,
            "areaName" => query.area_name = value,
            "page" => query.page = value.trim().parse().unwrap_or(0),
            "pageSize" => query.page_size = value.trim().parse().unwrap_or(0),
            _ => {}
        }
    }
    query
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

fn encode<T: Serialize>(body: &T) -> (u16, String) {
    match serde_json::to_string(body) {
        Ok(json) => (200, json),
        Err(e) => {
            error!(error = %e, "failed to encode response");
            error_body(500, "Failed to encode response")
        }
    }
}

fn error_body(status: u16, message: &str) -> (u16, String) {
    (status, serde_json::json!({ "error": message }).to_string())
}

/// Create HTTP response with JSON body
fn create_response(status_code: u16, body: String) -> Response<Cursor<Vec<u8>>> {
    let response =
        Response::from_data(body.into_bytes()).with_status_code(StatusCode::from(status_code));
    match Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
        Ok(header) => response.with_header(header),
        Err(()) => response,
    }
}

// ---------------------------------------------------------------------------
// HTTP Server
// ---------------------------------------------------------------------------

/// Running endpoint; `join` returns once every worker has seen shutdown.
pub struct EndpointServer {
    addr: Option<SocketAddr>,
    workers: Vec<JoinHandle<()>>,
}

impl EndpointServer {
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.addr
    }

    pub fn join(self) {
        for worker in self.workers {
            if worker.join().is_err() {
                error!("endpoint worker panicked");
            }
        }
    }
}

/// Binds `bind_addr` (e.g. `0.0.0.0:8080`) and starts `workers` threads.
pub fn start_endpoint_server(
    bind_addr: &str,
    workers: usize,
    state: Arc<EndpointState>,
    shutdown: Shutdown,
) -> Result<EndpointServer, String> {
    let server = Server::http(bind_addr)
        .map_err(|e| format!("Failed to start HTTP server on {}: {}", bind_addr, e))?;
    let server = Arc::new(server);
    let addr = server.server_addr().to_ip();

    info!(
        addr = %addr.map(|a| a.to_string()).unwrap_or_else(|| bind_addr.to_string()),
        workers,
        "HTTP endpoint listening"
    );

    let mut handles = Vec::with_capacity(workers);
    for index in 0..workers.max(1) {
        let server = Arc::clone(&server);
        let state = Arc::clone(&state);
        let shutdown = shutdown.clone();
        let handle = thread::Builder::new()
            .name(format!("wxwarn-http-{}", index))
            .spawn(move || serve(&server, &state, &shutdown))
            .map_err(|e| format!("Failed to spawn endpoint worker: {}", e))?;
        handles.push(handle);
    }

    Ok(EndpointServer {
        addr,
        workers: handles,
    })
}

fn serve(server: &Server, state: &EndpointState, shutdown: &Shutdown) {
    while !shutdown.is_triggered() {
        match server.recv_timeout(POLL) {
            Ok(Some(request)) => respond(request, state),
            Ok(None) => {}
            Err(e) => {
                error!(error = %e, "endpoint listener failed");
                break;
            }
        }
    }
}

fn respond(request: Request, state: &EndpointState) {
    let (status, body) = route(request.method(), request.url(), state);
    if status >= 400 {
        debug!(url = %request.url(), status, "request rejected");
    }
    if let Err(e) = request.respond(create_response(status, body)) {
        warn!(error = %e, "failed to send response");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
