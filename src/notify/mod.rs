/// Warning → sensor matching and webhook fan-out.
///
/// One `process` call per successful fetch:
///
/// 1. **Filter**: keep warning areas whose severity meets the threshold.
/// 2. **Match**: read every sensor once, convert each qualifying area's
///    geometry once, test each sensor's location against it.
/// 3. **Update**: set each matched sensor's status to the highest severity
///    it was matched at.
/// 4. **Notify**: resolve subscribers for all matched tenants in one call,
///    then POST one payload per (subscriber URL, sensor, warning).
///
/// Every step after the filter isolates failures: a bad polygon skips one
/// area, a failed status update or delivery is logged and the pass goes on.
/// Deliveries run on a pool of `max_in_flight` threads that is joined
/// before `process` returns, so nothing outlives the pass.

pub mod webhook;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::mpsc;

use chrono::Utc;
use threadpool::ThreadPool;
use tracing::{debug, error, info, warn};

use crate::directory::{SensorDirectory, SubscriberDirectory};
use crate::error::GeometryError;
use crate::geo::{self, Area, Position};
use crate::model::{
    NotificationEvent, Sensor, SensorId, Severity, Snapshot, TenantId, Warning, WarningArea,
    WarningId,
};
use crate::shutdown::Shutdown;

pub use webhook::{ReqwestWebhookSender, WebhookPayload, WebhookSender};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Which feed code decides an area's severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeveritySource {
    /// `warningAreas[].warningLevel.code` (YELLOW / ORANGE / RED).
    AreaLevel,
    /// `event.code` of the warning. Areas whose event code is not a
    /// severity level never qualify.
    EventCode,
}

impl SeveritySource {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "area_level" | "area" => Some(SeveritySource::AreaLevel),
            "event_code" | "event" => Some(SeveritySource::EventCode),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub threshold: Severity,
    pub severity_source: SeveritySource,
    pub max_in_flight: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            threshold: Severity::Orange,
            severity_source: SeveritySource::AreaLevel,
            max_in_flight: 8,
        }
    }
}

/// Counts from one pass, for logging and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessReport {
    pub qualifying_areas: usize,
    pub skipped_areas: usize,
    /// Sensors left out of matching for a non-finite location.
    pub unlocated_sensors: usize,
    pub matched_sensors: usize,
    pub status_updates: usize,
    pub status_update_failures: usize,
    pub deliveries: usize,
    pub delivery_failures: usize,
    pub deliveries_abandoned: usize,
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

pub struct NotificationDispatcher {
    sensors: Arc<dyn SensorDirectory>,
    subscribers: Arc<dyn SubscriberDirectory>,
    sender: Arc<dyn WebhookSender>,
    config: DispatchConfig,
    shutdown: Shutdown,
}

enum Outcome {
    Delivered,
    Failed,
    Abandoned,
}

impl NotificationDispatcher {
    pub fn new(
        sensors: Arc<dyn SensorDirectory>,
        subscribers: Arc<dyn SubscriberDirectory>,
        sender: Arc<dyn WebhookSender>,
        config: DispatchConfig,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            sensors,
            subscribers,
            sender,
            config,
            shutdown,
        }
    }

    fn area_severity(&self, warning: &Warning, area: &WarningArea) -> Option<Severity> {
        match self.config.severity_source {
            SeveritySource::AreaLevel => Severity::from_code(&area.warning_level.code),
            SeveritySource::EventCode => Severity::from_code(&warning.event.code),
        }
    }

    /// Runs one filter → match → update → notify pass over `snapshot`.
    pub fn process(&self, snapshot: &Snapshot) -> ProcessReport {
        let mut report = ProcessReport::default();

        let qualifying: Vec<(&Warning, &WarningArea, Severity)> = snapshot
            .warnings
            .iter()
            .flat_map(|w| w.warning_areas.iter().map(move |a| (w, a)))
            .filter_map(|(w, a)| {
                self.area_severity(w, a)
                    .filter(|s| *s >= self.config.threshold)
                    .map(|s| (w, a, s))
            })
            .collect();

        report.qualifying_areas = qualifying.len();
        if qualifying.is_empty() {
            debug!(threshold = %self.config.threshold, "no warning areas at or above threshold");
            return report;
        }

        let sensors = match self.sensors.list_sensors() {
            Ok(sensors) => sensors,
            Err(e) => {
                error!(error = %e, "failed to load sensors, skipping notification pass");
                return report;
            }
        };

        let located: Vec<&Sensor> = sensors
            .iter()
            .filter(|s| {
                let finite = s.latitude.is_finite() && s.longitude.is_finite();
                if !finite {
                    warn!(
                        sensor_id = s.id,
                        latitude = s.latitude,
                        longitude = s.longitude,
                        "skipping sensor with non-finite location"
                    );
                }
                finite
            })
            .collect();
        report.unlocated_sensors = sensors.len() - located.len();

        let (matches, skipped) = match_sensors(&qualifying, &located);
        report.skipped_areas = skipped;

        let by_id: HashMap<SensorId, &Sensor> = sensors.iter().map(|s| (s.id, s)).collect();
        let events: Vec<NotificationEvent> = matches
            .into_iter()
            .map(|((sensor_id, warning_id), severity)| NotificationEvent {
                sensor_id,
                warning_id,
                severity,
            })
            .collect();

        let mut sensor_status: BTreeMap<SensorId, Severity> = BTreeMap::new();
        for event in &events {
            let entry = sensor_status.entry(event.sensor_id).or_insert(event.severity);
            *entry = (*entry).max(event.severity);
        }
        report.matched_sensors = sensor_status.len();

        for (sensor_id, severity) in &sensor_status {
            match self.sensors.update_status(*sensor_id, severity.as_str()) {
                Ok(()) => report.status_updates += 1,
                Err(e) => {
                    report.status_update_failures += 1;
                    warn!(sensor_id, status = %severity, error = %e, "failed to update sensor status");
                }
            }
        }

        if events.is_empty() {
            info!(?report, "notification pass complete");
            return report;
        }

        let tenants: Vec<TenantId> = sensor_status
            .keys()
            .filter_map(|id| by_id.get(id).map(|s| s.tenant_id))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let subscribers = match self.subscribers.subscribers_for_tenants(&tenants) {
            Ok(subscribers) => subscribers,
            Err(e) => {
                error!(error = %e, "failed to resolve webhook subscribers");
                return report;
            }
        };

        let warnings: HashMap<WarningId, &Warning> =
            snapshot.warnings.iter().map(|w| (w.id, w)).collect();
        let timestamp = Utc::now();

        let mut seen: BTreeSet<(String, SensorId, WarningId)> = BTreeSet::new();
        let mut jobs: Vec<(String, WebhookPayload)> = Vec::new();
        for event in &events {
            let (Some(sensor), Some(warning)) =
                (by_id.get(&event.sensor_id), warnings.get(&event.warning_id))
            else {
                continue;
            };
            let Some(hooks) = subscribers.get(&sensor.tenant_id) else {
                debug!(sensor_id = sensor.id, tenant_id = sensor.tenant_id, "tenant has no webhooks");
                continue;
            };
            for hook in hooks {
                if !seen.insert((hook.url.clone(), event.sensor_id, event.warning_id)) {
                    continue;
                }
                jobs.push((
                    hook.url.clone(),
                    WebhookPayload {
                        sensor_id: sensor.id,
                        sensor_name: sensor.name.clone(),
                        status: event.severity.as_str().to_string(),
                        warning: warning.display_text().to_string(),
                        timestamp,
                    },
                ));
            }
        }

        self.deliver(jobs, &mut report);
        info!(?report, "notification pass complete");
        report
    }

    /// Posts every job on a bounded pool and waits for all of them.
    /// Jobs still queued once shutdown fires are dropped unsent.
    fn deliver(&self, jobs: Vec<(String, WebhookPayload)>, report: &mut ProcessReport) {
        if jobs.is_empty() {
            return;
        }

        let pool = ThreadPool::new(self.config.max_in_flight.max(1));
        let (tx, rx) = mpsc::channel();

        for (url, payload) in jobs {
            let tx = tx.clone();
            let sender = Arc::clone(&self.sender);
            let shutdown = self.shutdown.clone();
            pool.execute(move || {
                let outcome = if shutdown.is_triggered() {
                    Outcome::Abandoned
                } else {
                    match sender.post_json(&url, &payload) {
                        Ok(()) => {
                            debug!(url = %url, sensor_id = payload.sensor_id, "webhook delivered");
                            Outcome::Delivered
                        }
                        Err(e) => {
                            warn!(
                                url = %url,
                                status = ?e.status(),
                                sensor_id = payload.sensor_id,
                                error = %e,
                                "webhook delivery failed"
                            );
                            Outcome::Failed
                        }
                    }
                };
                let _ = tx.send(outcome);
            });
        }
        drop(tx);
        pool.join();

        for outcome in rx.try_iter() {
            match outcome {
                Outcome::Delivered => report.deliveries += 1,
                Outcome::Failed => {
                    report.deliveries += 1;
                    report.delivery_failures += 1;
                }
                Outcome::Abandoned => report.deliveries_abandoned += 1,
            }
        }
        if report.deliveries_abandoned > 0 {
            info!(abandoned = report.deliveries_abandoned, "shutdown abandoned queued deliveries");
        }
    }
}

/// Tests every sensor against every qualifying area. Returns the highest
/// severity per (sensor, warning) and the number of areas skipped for
/// unusable geometry.
fn match_sensors(
    qualifying: &[(&Warning, &WarningArea, Severity)],
    sensors: &[&Sensor],
) -> (BTreeMap<(SensorId, WarningId), Severity>, usize) {
    let mut matches: BTreeMap<(SensorId, WarningId), Severity> = BTreeMap::new();
    let mut skipped = 0;

    for (warning, area, severity) in qualifying {
        let converted = area
            .area
            .as_ref()
            .ok_or(GeometryError::MissingGeometry)
            .and_then(Area::from_feature);
        let shape = match converted {
            Ok(shape) => shape,
            Err(e) => {
                skipped += 1;
                warn!(
                    warning_id = warning.id,
                    area_id = area.id,
                    error = %e,
                    "skipping warning area with unusable geometry"
                );
                continue;
            }
        };

        for sensor in sensors {
            if geo::contains(Position::new(sensor.longitude, sensor.latitude), &shape) {
                matches
                    .entry((sensor.id, warning.id))
                    .and_modify(|s| *s = (*s).max(*severity))
                    .or_insert(*severity);
            }
        }
    }

    (matches, skipped)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
