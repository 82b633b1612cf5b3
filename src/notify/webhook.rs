/// Webhook payload and delivery.
///
/// One POST per (subscriber, sensor, warning). Deliveries are not retried;
/// a failure is returned to the dispatcher, which logs it.

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::blocking::Client;
use serde::{Serialize, Serializer};

use crate::error::DeliveryError;
use crate::http::build_client;
use crate::model::SensorId;

/// JSON body posted to subscriber endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookPayload {
    pub sensor_id: SensorId,
    pub sensor_name: String,
    /// Severity label, e.g. `"ORANGE"`.
    pub status: String,
    /// Human-readable event text of the warning.
    pub warning: String,
    #[serde(serialize_with = "rfc3339")]
    pub timestamp: DateTime<Utc>,
}

fn rfc3339<S: Serializer>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&timestamp.to_rfc3339_opts(SecondsFormat::Secs, true))
}

pub trait WebhookSender: Send + Sync {
    fn post_json(&self, url: &str, payload: &WebhookPayload) -> Result<(), DeliveryError>;
}

/// `WebhookSender` over reqwest's blocking client.
pub struct ReqwestWebhookSender {
    client: Client,
}

impl ReqwestWebhookSender {
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
        })
    }
}

impl WebhookSender for ReqwestWebhookSender {
    fn post_json(&self, url: &str, payload: &WebhookPayload) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(url)
            .json(payload)
            .send()
            .map_err(|e| DeliveryError::Transport {
                url: url.to_string(),
                details: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_payload_serializes_with_wire_field_names() {
        let payload = WebhookPayload {
            sensor_id: 42,
            sensor_name: "Roof station".to_string(),
            status: "ORANGE".to_string(),
            warning: "Wind".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 10, 5, 12, 30, 0).unwrap(),
        };

        let json: serde_json::Value = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["sensor_id"], 42);
        assert_eq!(json["sensor_name"], "Roof station");
        assert_eq!(json["status"], "ORANGE");
        assert_eq!(json["warning"], "Wind");
        assert_eq!(json["timestamp"], "2024-10-05T12:30:00Z");
        assert_eq!(json.as_object().unwrap().len(), 5, "no extra fields on the wire");
    }
}
