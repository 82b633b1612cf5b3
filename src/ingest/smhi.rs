/// SMHI IBWW warning feed client.
///
/// Fetches the warning feed, a JSON array of warnings, e.g.
///   https://opendata-download-warnings.smhi.se/ibww/api/version/1/warning.json
/// and decodes it into a `Snapshot`. See `fixtures.rs` for annotated
/// examples of the response structure.
///
/// The fetcher never touches the cache. The scheduler installs the
/// snapshot only after `fetch_once` succeeds, so a failed fetch leaves the
/// previous snapshot in place.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::error::FeedError;
use crate::http::HttpFetch;
use crate::model::{Snapshot, Warning};

/// Decodes a feed body into warnings, preserving feed order.
///
/// # Errors
/// `FeedError::Decode` if the body is not a JSON array of warnings.
pub fn parse_warning_feed(json: &str) -> Result<Vec<Warning>, FeedError> {
    serde_json::from_str(json).map_err(|e| FeedError::Decode(e.to_string()))
}

/// Performs one fetch of the configured feed URL per call.
pub struct WarningFetcher {
    url: String,
    http: Arc<dyn HttpFetch>,
}

impl WarningFetcher {
    pub fn new(url: impl Into<String>, http: Arc<dyn HttpFetch>) -> Self {
        Self {
            url: url.into(),
            http,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Issues a single request and decodes the response into a snapshot
    /// stamped with the current time.
    pub fn fetch_once(&self) -> Result<Snapshot, FeedError> {
        debug!(url = %self.url, "fetching warning feed");
        let body = self.http.get_text(&self.url)?;
        let warnings = parse_warning_feed(&body)?;

        let areas: usize = warnings.iter().map(|w| w.warning_areas.len()).sum();
        info!(warnings = warnings.len(), areas, "fetched warning feed");

        Ok(Snapshot::new(warnings, Utc::now()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
