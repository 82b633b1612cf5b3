/// Sensor and webhook registry loader - parses a registry TOML file.
///
/// Lets the service run without the account database, e.g. for a local
/// deployment watching a fixed set of sites. The file lists sensors and
/// webhook subscriptions:
///
/// ```toml
/// [[sensor]]
/// id = 1
/// name = "Roof station"
/// latitude = 59.33
/// longitude = 18.07
/// tenant_id = 1
///
/// [[webhook]]
/// url = "https://hooks.example.com/weather"
/// tenant_id = 1
/// ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::directory::InMemoryDirectory;
use crate::error::ConfigError;
use crate::model::{Sensor, WebhookSubscription};

#[derive(Debug, Deserialize)]
struct Registry {
    #[serde(default)]
    sensor: Vec<Sensor>,
    #[serde(default)]
    webhook: Vec<WebhookSubscription>,
}

/// Parses registry TOML into an in-memory directory.
pub fn parse_registry(contents: &str, origin: &str) -> Result<InMemoryDirectory, ConfigError> {
    let registry: Registry = toml::from_str(contents).map_err(|e| ConfigError::Parse {
        path: origin.to_string(),
        details: e.to_string(),
    })?;

    for sensor in &registry.sensor {
        if !(-90.0..=90.0).contains(&sensor.latitude) || !(-180.0..=180.0).contains(&sensor.longitude)
        {
            return Err(ConfigError::Invalid {
                key: "sensor",
                details: format!(
                    "sensor {} has out-of-range location ({}, {})",
                    sensor.id, sensor.latitude, sensor.longitude
                ),
            });
        }
    }

    Ok(InMemoryDirectory::new(registry.sensor, registry.webhook))
}

/// Loads the registry file at `path`.
pub fn load_registry<P: AsRef<Path>>(path: P) -> Result<InMemoryDirectory, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.display().to_string(),
        details: e.to_string(),
    })?;
    parse_registry(&contents, &path.display().to_string())
}
