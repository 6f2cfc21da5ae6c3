use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use time::OffsetDateTime;

/// Instantané du simulateur renvoyé par `peek` (et par `push` sans utilisateur)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalsSample {
    pub heart_rate: i32,
    pub foot_pressure: f64,
    pub bluetooth_connected: bool,
    pub battery_level: u8,
    pub anomalies_detected: u8,
    /// Millisecondes depuis l'epoch Unix
    pub timestamp: i64,
}

/// Mesure à persister pour un utilisateur (id et date assignés par le store)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHealthMetric {
    pub user_id: String,
    pub heart_rate: i32,
    pub foot_pressure: f64,
    pub bluetooth_connected: bool,
    pub battery_level: u8,
    pub anomalies_detected: u8,
}

impl NewHealthMetric {
    pub fn from_sample(user_id: &str, sample: &VitalsSample) -> Self {
        Self {
            user_id: user_id.to_string(),
            heart_rate: sample.heart_rate,
            foot_pressure: sample.foot_pressure,
            bluetooth_connected: sample.bluetooth_connected,
            battery_level: sample.battery_level,
            anomalies_detected: sample.anomalies_detected,
        }
    }
}

/// Mesure stockée, telle que renvoyée par le store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthMetricRecord {
    pub id: String,
    pub user_id: String,
    pub heart_rate: i32,
    pub foot_pressure: f64,
    pub bluetooth_connected: bool,
    pub battery_level: u8,
    pub anomalies_detected: u8,
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
}

impl HealthMetricRecord {
    pub fn new(id: String, metric: NewHealthMetric, recorded_at: OffsetDateTime) -> Self {
        Self {
            id,
            user_id: metric.user_id,
            heart_rate: metric.heart_rate,
            foot_pressure: metric.foot_pressure,
            bluetooth_connected: metric.bluetooth_connected,
            battery_level: metric.battery_level,
            anomalies_detected: metric.anomalies_detected,
            recorded_at,
        }
    }
}

/// Résultat d'un push : `{saved: true, metrics}` ou `{saved: false, record}`
#[derive(Debug, Clone, PartialEq)]
pub enum PushOutcome {
    Saved(HealthMetricRecord),
    Unsaved(VitalsSample),
}

impl PushOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, PushOutcome::Saved(_))
    }
}

impl Serialize for PushOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut out = serializer.serialize_struct("PushOutcome", 2)?;
        match self {
            PushOutcome::Saved(metrics) => {
                out.serialize_field("saved", &true)?;
                out.serialize_field("metrics", metrics)?;
            }
            PushOutcome::Unsaved(record) => {
                out.serialize_field("saved", &false)?;
                out.serialize_field("record", record)?;
            }
        }
        out.end()
    }
}
