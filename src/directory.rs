/// Collaborator seams for the account service.
///
/// Sensors and webhook subscriptions are owned elsewhere; the dispatcher
/// only needs a bulk read of all sensors, a status update keyed by sensor
/// id, and a bulk tenant → subscriber lookup. Both lookups are called once
/// per processing pass, never once per warning area.
///
/// Implementations:
/// - `db::PgDirectory`     : the account service's PostgreSQL tables.
/// - `InMemoryDirectory`   : static registry file or tests.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::error::DirectoryError;
use crate::model::{Sensor, SensorId, TenantId, WebhookSubscription};

pub trait SensorDirectory: Send + Sync {
    /// Every registered sensor with its location and owning tenant.
    fn list_sensors(&self) -> Result<Vec<Sensor>, DirectoryError>;

    /// Sets a sensor's status label. Setting the current value again is
    /// a no-op.
    fn update_status(&self, sensor_id: SensorId, status: &str) -> Result<(), DirectoryError>;
}

pub trait SubscriberDirectory: Send + Sync {
    /// Webhook subscriptions grouped by tenant. Tenants without any
    /// subscription may be absent from the map.
    fn subscribers_for_tenants(
        &self,
        tenants: &[TenantId],
    ) -> Result<HashMap<TenantId, Vec<WebhookSubscription>>, DirectoryError>;
}

// ---------------------------------------------------------------------------
// In-memory implementation
// ---------------------------------------------------------------------------

/// Directory backed by process memory. Status updates live only as long
/// as the process.
pub struct InMemoryDirectory {
    sensors: Mutex<Vec<Sensor>>,
    subscriptions: Vec<WebhookSubscription>,
}

impl InMemoryDirectory {
    pub fn new(sensors: Vec<Sensor>, subscriptions: Vec<WebhookSubscription>) -> Self {
        Self {
            sensors: Mutex::new(sensors),
            subscriptions,
        }
    }

    /// Current status label of a sensor, if it exists.
    pub fn status_of(&self, sensor_id: SensorId) -> Option<String> {
        let sensors = self.sensors.lock().unwrap_or_else(PoisonError::into_inner);
        sensors
            .iter()
            .find(|s| s.id == sensor_id)
            .map(|s| s.status.clone())
    }
}

impl SensorDirectory for InMemoryDirectory {
    fn list_sensors(&self) -> Result<Vec<Sensor>, DirectoryError> {
        let sensors = self.sensors.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(sensors.clone())
    }

    fn update_status(&self, sensor_id: SensorId, status: &str) -> Result<(), DirectoryError> {
        let mut sensors = self.sensors.lock().unwrap_or_else(PoisonError::into_inner);
        let sensor = sensors
            .iter_mut()
            .find(|s| s.id == sensor_id)
            .ok_or(DirectoryError::UnknownSensor(sensor_id))?;
        if sensor.status != status {
            sensor.status = status.to_string();
        }
        Ok(())
    }
}

impl SubscriberDirectory for InMemoryDirectory {
    fn subscribers_for_tenants(
        &self,
        tenants: &[TenantId],
    ) -> Result<HashMap<TenantId, Vec<WebhookSubscription>>, DirectoryError> {
        let mut grouped: HashMap<TenantId, Vec<WebhookSubscription>> = HashMap::new();
        for subscription in &self.subscriptions {
            if tenants.contains(&subscription.tenant_id) {
                grouped
                    .entry(subscription.tenant_id)
                    .or_default()
                    .push(subscription.clone());
            }
        }
        Ok(grouped)
    }
}
