/// Core data types for the weather-warning notification service.
///
/// The warning types mirror the SMHI IBWW warning feed closely enough to
/// round-trip it through the query API: every field the service reads is
/// typed, and the area geometry is kept as raw GeoJSON so a malformed
/// polygon never prevents a warning from being served.
///
/// Sensor and webhook types belong to the account service; they are
/// referenced here read-only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

pub type WarningId = i64;
pub type SensorId = i64;
/// Owning company of sensors and users.
pub type TenantId = i64;

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Warning severity levels, in ascending order of severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Yellow,
    Orange,
    Red,
}

impl Severity {
    /// Parses a feed code such as `"ORANGE"` or `"red"`.
    ///
    /// Returns `None` for codes that are not a severity level, e.g. the
    /// event-type codes (`"WIND"`, `"FIRE"`) carried on the warning itself.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "YELLOW" => Some(Severity::Yellow),
            "ORANGE" => Some(Severity::Orange),
            "RED" => Some(Severity::Red),
            _ => None,
        }
    }

    /// Status label written to sensors and sent in webhook payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Yellow => "YELLOW",
            Severity::Orange => "ORANGE",
            Severity::Red => "RED",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Feed types
// ---------------------------------------------------------------------------

/// Swedish/English text pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BilingualText {
    #[serde(default)]
    pub en: String,
    #[serde(default)]
    pub sv: String,
}

/// Bilingual text with a machine-readable code (event type, warning level,
/// description title, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodedText {
    #[serde(default)]
    pub en: String,
    #[serde(default)]
    pub sv: String,
    #[serde(default)]
    pub code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default)]
    pub en: String,
    #[serde(default)]
    pub sv: String,
    /// Classification code of the warning, e.g. `"WIND"` or `"RAIN"`.
    #[serde(default)]
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mho_classification: Option<CodedText>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Description {
    pub title: CodedText,
    pub text: BilingualText,
}

/// One severe-weather advisory from the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Warning {
    pub id: WarningId,
    pub event: Event,
    #[serde(default)]
    pub normal_probability: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_name: Option<BilingualText>,
    #[serde(default)]
    pub warning_areas: Vec<WarningArea>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub descriptions: Vec<Description>,
}

impl Warning {
    /// Human-readable text used in webhook payloads.
    pub fn display_text(&self) -> &str {
        if self.event.en.is_empty() {
            &self.event.sv
        } else {
            &self.event.en
        }
    }
}

/// Geometric and temporal scope of a warning over one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarningArea {
    pub id: i64,
    /// `None` when the feed sent no usable feature object.
    #[serde(default, deserialize_with = "lenient_feature")]
    pub area: Option<GeoFeature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_name: Option<BilingualText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approximate_start: Option<String>, // ISO 8601
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approximate_end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
    #[serde(default)]
    pub normal_probability: bool,
    #[serde(default)]
    pub warning_level: CodedText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_description: Option<CodedText>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub descriptions: Vec<Description>,
    #[serde(default)]
    pub affected_areas: Vec<AffectedArea>,
}

/// Named sub-region (county, municipality) covered by a warning area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffectedArea {
    pub id: i64,
    #[serde(default)]
    pub sv: String,
    #[serde(default)]
    pub en: String,
}

impl AffectedArea {
    /// Case-insensitive substring match against either name.
    /// `needle` must already be lowercase.
    pub fn name_contains(&self, needle: &str) -> bool {
        self.sv.to_lowercase().contains(needle) || self.en.to_lowercase().contains(needle)
    }
}

/// GeoJSON Feature as delivered by the feed.
///
/// `geometry` stays untyped here; `geo::Area::from_feature` validates
/// and converts it when matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoFeature {
    #[serde(rename = "type", default = "feature_kind")]
    pub kind: String,
    #[serde(default)]
    pub geometry: Option<Value>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

fn feature_kind() -> String {
    "Feature".to_string()
}

/// Decodes an area feature without failing the enclosing warning: `null`
/// and objects that are not a feature both become `None`.
fn lenient_feature<'de, D>(deserializer: D) -> Result<Option<GeoFeature>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match serde_json::from_value(value) {
        Ok(feature) => Ok(Some(feature)),
        Err(e) => {
            warn!(error = %e, "dropping undecodable warning-area feature");
            Ok(None)
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// One complete, immutable view of all current warnings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub warnings: Vec<Warning>,
    /// `None` only for the empty snapshot served before the first fetch.
    pub fetched_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    pub fn new(warnings: Vec<Warning>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            warnings,
            fetched_at: Some(fetched_at),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Collaborator types
// ---------------------------------------------------------------------------

/// A registered monitoring point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    pub id: SensorId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Free-text severity label, `"OK"` until a warning matches.
    #[serde(default = "default_status")]
    pub status: String,
    pub tenant_id: TenantId,
}

fn default_status() -> String {
    "OK".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WebhookSubscription {
    pub url: String,
    pub tenant_id: TenantId,
    #[serde(default)]
    pub user_id: i64,
}

/// One fan-out unit: a sensor matched by a warning at a given severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NotificationEvent {
    pub sensor_id: SensorId,
    pub warning_id: WarningId,
    pub severity: Severity,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_levels_are_ordered() {
        assert!(Severity::Yellow < Severity::Orange);
        assert!(Severity::Orange < Severity::Red);
    }

    #[test]
    fn test_severity_parses_case_insensitively() {
        assert_eq!(Severity::from_code("orange"), Some(Severity::Orange));
        assert_eq!(Severity::from_code(" RED "), Some(Severity::Red));
        assert_eq!(Severity::from_code("Yellow"), Some(Severity::Yellow));
    }

    #[test]
    fn test_event_codes_are_not_severities() {
        assert_eq!(Severity::from_code("WIND"), None);
        assert_eq!(Severity::from_code(""), None);
    }

    #[test]
    fn test_severity_label_matches_feed_code() {
        for severity in [Severity::Yellow, Severity::Orange, Severity::Red] {
            assert_eq!(Severity::from_code(severity.as_str()), Some(severity));
        }
    }

    #[test]
    fn test_affected_area_matches_either_language() {
        let area = AffectedArea {
            id: 1,
            sv: "Skåne län".to_string(),
            en: "Scania County".to_string(),
        };
        assert!(area.name_contains("skåne"));
        assert!(area.name_contains("scania"));
        assert!(!area.name_contains("uppsala"));
    }

    #[test]
    fn test_display_text_falls_back_to_swedish() {
        let warning = Warning {
            id: 1,
            event: Event {
                en: String::new(),
                sv: "Kuling".to_string(),
                code: "WIND".to_string(),
                mho_classification: None,
            },
            normal_probability: true,
            area_name: None,
            warning_areas: Vec::new(),
            descriptions: Vec::new(),
        };
        assert_eq!(warning.display_text(), "Kuling");
    }

    #[test]
    fn test_sensor_status_defaults_to_ok() {
        let sensor: Sensor = serde_json::from_str(
            r#"{"id": 7, "name": "Roof", "latitude": 59.3, "longitude": 18.0, "tenant_id": 2}"#,
        )
        .expect("sensor should deserialize");
        assert_eq!(sensor.status, "OK");
    }

    #[test]
    fn test_empty_snapshot_has_no_fetch_time() {
        let snapshot = Snapshot::empty();
        assert!(snapshot.is_empty());
        assert!(snapshot.fetched_at.is_none());
    }
}
