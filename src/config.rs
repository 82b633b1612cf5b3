/// Service configuration loader - parses wxwarn.toml
///
/// Every setting has a default except the feed URL. Values from the file
/// can be overridden from the environment (a `.env` file in the working
/// directory is loaded first):
///
///   WXWARN_FEED_URL            feed.url
///   WXWARN_POLL_INTERVAL_SECS  feed.poll_interval_secs
///   DATABASE_URL               account database, for the postgres directory
///
/// Invalid configuration is reported as a `ConfigError` and is fatal at
/// startup.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::daemon::DaemonConfig;
use crate::error::ConfigError;
use crate::model::Severity;
use crate::notify::{DispatchConfig, SeveritySource};

pub const DEFAULT_CONFIG_PATH: &str = "wxwarn.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Default `tracing` filter; `RUST_LOG` takes precedence.
    pub log_level: String,
    pub feed: FeedConfig,
    pub notify: NotifyConfig,
    pub query: QueryConfig,
    pub endpoint: EndpointConfig,
    pub directory: DirectoryConfig,
    /// Only ever set from the environment.
    #[serde(skip)]
    pub database_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub url: String,
    pub poll_interval_secs: u64,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Minimum severity that triggers updates and webhooks.
    pub threshold: String,
    /// `"area_level"` or `"event_code"`.
    pub severity_source: String,
    pub max_in_flight: usize,
    pub webhook_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub default_page_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub port: u16,
    pub workers: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// `"postgres"` or `"registry"`.
    pub backend: String,
    pub registry_path: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            feed: FeedConfig::default(),
            notify: NotifyConfig::default(),
            query: QueryConfig::default(),
            endpoint: EndpointConfig::default(),
            directory: DirectoryConfig::default(),
            database_url: None,
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            poll_interval_secs: 15 * 60,
            timeout_secs: 30,
        }
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            threshold: "ORANGE".to_string(),
            severity_source: "area_level".to_string(),
            max_in_flight: 8,
            webhook_timeout_secs: 10,
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_page_size: crate::query::DEFAULT_PAGE_SIZE,
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            workers: 4,
        }
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            backend: "postgres".to_string(),
            registry_path: "registry.toml".to_string(),
        }
    }
}

/// Where sensors and webhook subscriptions come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryBackend {
    Postgres,
    Registry(PathBuf),
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Parses configuration TOML. Does not consult the environment.
pub fn parse_config(contents: &str, origin: &str) -> Result<ServiceConfig, ConfigError> {
    toml::from_str(contents).map_err(|e| ConfigError::Parse {
        path: origin.to_string(),
        details: e.to_string(),
    })
}

/// Reads `path`, applies `.env` and process environment overrides and
/// validates the result.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ServiceConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.display().to_string(),
        details: e.to_string(),
    })?;

    dotenv::dotenv().ok();

    let mut config = parse_config(&contents, &path.display().to_string())?;
    config.apply_env(|key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}

impl ServiceConfig {
    /// Applies environment overrides through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("WXWARN_FEED_URL").filter(|v| !v.trim().is_empty()) {
            self.feed.url = url;
        }
        if let Some(secs) = lookup("WXWARN_POLL_INTERVAL_SECS") {
            self.feed.poll_interval_secs =
                secs.trim().parse().map_err(|_| ConfigError::Invalid {
                    key: "WXWARN_POLL_INTERVAL_SECS",
                    details: format!("'{}' is not a whole number of seconds", secs),
                })?;
        }
        if let Some(url) = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()) {
            self.database_url = Some(url);
        }
        Ok(())
    }

    /// Checks every setting the service depends on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.feed.url.trim().is_empty() {
            return Err(ConfigError::Missing("feed.url"));
        }
        if self.feed.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "feed.poll_interval_secs",
                details: "must be greater than zero".to_string(),
            });
        }
        if self.feed.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "feed.timeout_secs",
                details: "must be greater than zero".to_string(),
            });
        }
        if self.notify.webhook_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "notify.webhook_timeout_secs",
                details: "must be greater than zero".to_string(),
            });
        }
        if self.notify.max_in_flight == 0 {
            return Err(ConfigError::Invalid {
                key: "notify.max_in_flight",
                details: "must be greater than zero".to_string(),
            });
        }
        if self.query.default_page_size == 0 {
            return Err(ConfigError::Invalid {
                key: "query.default_page_size",
                details: "must be greater than zero".to_string(),
            });
        }
        if self.endpoint.workers == 0 {
            return Err(ConfigError::Invalid {
                key: "endpoint.workers",
                details: "must be greater than zero".to_string(),
            });
        }
        self.dispatch_config()?;
        self.directory_backend()?;
        Ok(())
    }

    pub fn daemon_config(&self) -> DaemonConfig {
        DaemonConfig {
            poll_interval: Duration::from_secs(self.feed.poll_interval_secs),
        }
    }

    pub fn feed_timeout(&self) -> Duration {
        Duration::from_secs(self.feed.timeout_secs)
    }

    pub fn webhook_timeout(&self) -> Duration {
        Duration::from_secs(self.notify.webhook_timeout_secs)
    }

    pub fn dispatch_config(&self) -> Result<DispatchConfig, ConfigError> {
        let threshold =
            Severity::from_code(&self.notify.threshold).ok_or_else(|| ConfigError::Invalid {
                key: "notify.threshold",
                details: format!(
                    "'{}' is not one of YELLOW, ORANGE, RED",
                    self.notify.threshold
                ),
            })?;
        let severity_source = SeveritySource::parse(&self.notify.severity_source).ok_or_else(
            || ConfigError::Invalid {
                key: "notify.severity_source",
                details: format!(
                    "'{}' is not one of area_level, event_code",
                    self.notify.severity_source
                ),
            },
        )?;

        Ok(DispatchConfig {
            threshold,
            severity_source,
            max_in_flight: self.notify.max_in_flight,
        })
    }

    pub fn directory_backend(&self) -> Result<DirectoryBackend, ConfigError> {
        match self.directory.backend.trim().to_ascii_lowercase().as_str() {
            "postgres" => Ok(DirectoryBackend::Postgres),
            "registry" => Ok(DirectoryBackend::Registry(PathBuf::from(
                &self.directory.registry_path,
            ))),
            other => Err(ConfigError::Invalid {
                key: "directory.backend",
                details: format!("'{}' is not one of postgres, registry", other),
            }),
        }
    }
}
