/// Error types for the service.
///
/// Only `ConfigError` and a failed initial fetch are fatal; every other
/// error is logged by the component that hit it and the pipeline moves on.

use thiserror::Error;

/// Failure to obtain a snapshot from the warning feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Connection, TLS or timeout failure.
    #[error("feed request to {url} failed: {details}")]
    Transport { url: String, details: String },

    /// Non-2xx HTTP response from the feed.
    #[error("feed at {url} responded with HTTP {status}")]
    Status { url: String, status: u16 },

    /// Body was not a JSON array of warnings.
    #[error("failed to decode warning feed: {0}")]
    Decode(String),
}

/// Geometry that cannot be used for containment tests.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("feature has no geometry")]
    MissingGeometry,

    #[error("geometry has no type")]
    MissingType,

    #[error("unsupported geometry type '{0}'")]
    UnsupportedType(String),

    #[error("malformed coordinates: {0}")]
    MalformedCoordinates(String),

    #[error("non-finite coordinate ({lon}, {lat})")]
    NonFinite { lon: f64, lat: f64 },
}

/// Failure reported by the sensor or webhook-subscriber directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("directory query failed: {0}")]
    Query(String),

    #[error("sensor {0} not found")]
    UnknownSensor(i64),

    #[error(transparent)]
    Postgres(#[from] postgres::Error),
}

/// A single failed webhook delivery.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("webhook {url} responded with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("webhook {url} unreachable: {details}")]
    Transport { url: String, details: String },
}

impl DeliveryError {
    /// HTTP status for logging, if the endpoint answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            DeliveryError::Status { status, .. } => Some(*status),
            DeliveryError::Transport { .. } => None,
        }
    }
}

/// Invalid or missing startup configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {details}")]
    Read { path: String, details: String },

    #[error("failed to parse {path}: {details}")]
    Parse { path: String, details: String },

    #[error("missing required setting `{0}`")]
    Missing(&'static str),

    #[error("invalid value for `{key}`: {details}")]
    Invalid { key: &'static str, details: String },
}
