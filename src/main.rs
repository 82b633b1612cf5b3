//! Weather Warning Service - Main Daemon
//!
//! A server-side daemon that continuously:
//! 1. Polls the SMHI severe-weather warning feed
//! 2. Keeps the latest warnings in memory for the query API
//! 3. Matches warning areas against registered sensor locations
//! 4. Updates sensor status and notifies subscribers by webhook
//!
//! Usage:
//!   cargo run --release                          # Uses ./wxwarn.toml
//!   cargo run --release -- --config /etc/wxwarn.toml
//!
//! Environment:
//!   DATABASE_URL               - PostgreSQL connection string (postgres directory)
//!   WXWARN_FEED_URL            - Overrides feed.url
//!   WXWARN_POLL_INTERVAL_SECS  - Overrides feed.poll_interval_secs
//!   RUST_LOG                   - Overrides log_level
//!
//! SIGINT or SIGTERM stops polling, abandons queued webhook deliveries and
//! lets the query endpoint drain before exiting.

use std::env;
use std::process;
use std::sync::Arc;

use tracing::{error, info};

use wxwarn_service::cache::WarningCache;
use wxwarn_service::config::{self, DirectoryBackend, ServiceConfig};
use wxwarn_service::daemon::Daemon;
use wxwarn_service::db::{self, PgDirectory};
use wxwarn_service::directory::{SensorDirectory, SubscriberDirectory};
use wxwarn_service::endpoint::{self, EndpointState};
use wxwarn_service::http::ReqwestFetch;
use wxwarn_service::ingest::smhi::WarningFetcher;
use wxwarn_service::logging;
use wxwarn_service::notify::{NotificationDispatcher, ReqwestWebhookSender};
use wxwarn_service::query::QueryService;
use wxwarn_service::registry;
use wxwarn_service::shutdown::Shutdown;

type Directories = (Arc<dyn SensorDirectory>, Arc<dyn SubscriberDirectory>);

fn main() {
    // Parse command-line arguments
    let args: Vec<String> = env::args().collect();
    let mut config_path = config::DEFAULT_CONFIG_PATH.to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                if i + 1 < args.len() {
                    config_path = args[i + 1].clone();
                    i += 2;
                } else {
                    eprintln!("Error: --config requires a file path");
                    process::exit(1);
                }
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                eprintln!("Usage: {} [--config PATH]", args[0]);
                process::exit(1);
            }
        }
    }

    let config = match config::load_config(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = logging::init(&config.log_level) {
        eprintln!("{}", e);
        process::exit(1);
    }

    if let Err(message) = run(&config) {
        error!("{}", message);
        process::exit(1);
    }
}

fn open_directories(config: &ServiceConfig) -> Result<Directories, String> {
    match config.directory_backend().map_err(|e| e.to_string())? {
        DirectoryBackend::Postgres => {
            let client = db::connect_and_verify(config.database_url.as_deref())
                .map_err(|e| e.to_string())?;
            let directory = Arc::new(PgDirectory::new(client));
            info!("using PostgreSQL sensor directory");
            let sensors: Arc<dyn SensorDirectory> = directory.clone();
            let subscribers: Arc<dyn SubscriberDirectory> = directory;
            Ok((sensors, subscribers))
        }
        DirectoryBackend::Registry(path) => {
            let directory = Arc::new(registry::load_registry(&path).map_err(|e| e.to_string())?);
            info!(path = %path.display(), "using registry sensor directory");
            let sensors: Arc<dyn SensorDirectory> = directory.clone();
            let subscribers: Arc<dyn SubscriberDirectory> = directory;
            Ok((sensors, subscribers))
        }
    }
}

fn run(config: &ServiceConfig) -> Result<(), String> {
    let (sensors, subscribers) = open_directories(config)?;

    let fetch = ReqwestFetch::new(config.feed_timeout())
        .map_err(|e| format!("failed to build feed client: {}", e))?;
    let sender = ReqwestWebhookSender::new(config.webhook_timeout())
        .map_err(|e| format!("failed to build webhook client: {}", e))?;
    let dispatch = config.dispatch_config().map_err(|e| e.to_string())?;

    let shutdown = Shutdown::new();
    shutdown
        .install_signal_handler()
        .map_err(|e| format!("failed to install signal handler: {}", e))?;
    let cache = Arc::new(WarningCache::new());
    let dispatcher = NotificationDispatcher::new(
        sensors,
        subscribers,
        Arc::new(sender),
        dispatch,
        shutdown.clone(),
    );
    let daemon = Daemon::new(
        config.daemon_config(),
        WarningFetcher::new(config.feed.url.clone(), Arc::new(fetch)),
        Arc::clone(&cache),
        dispatcher,
    );

    let report = daemon
        .initialize()
        .map_err(|e| format!("initial warning fetch failed: {}", e))?;
    info!(warnings = cache.read().len(), ?report, "initial fetch complete");

    let state = Arc::new(EndpointState {
        query: QueryService::new(Arc::clone(&cache), config.query.default_page_size),
        cache: Arc::clone(&cache),
    });
    let server = endpoint::start_endpoint_server(
        &format!("0.0.0.0:{}", config.endpoint.port),
        config.endpoint.workers,
        state,
        shutdown.clone(),
    )
    .map_err(|e| {
        shutdown.trigger();
        e
    })?;

    daemon.run(&shutdown);
    server.join();
    info!("shutdown complete");
    Ok(())
}
