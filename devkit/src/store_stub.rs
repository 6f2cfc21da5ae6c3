/*!
Mock MetricsStore pour tests sans stockage réel

Enregistre chaque appel reçu (espion) et peut simuler une panne de la base
pour vérifier la propagation des erreurs de persistance.
*/

use async_trait::async_trait;
use footcare_kernel::models::{HealthMetricRecord, NewHealthMetric};
use footcare_kernel::ports::{MetricsStore, StoreError, StoreInfo};
use parking_lot::Mutex;
use std::sync::Arc;
use time::OffsetDateTime;

/// Mock MetricsStore : renvoie l'enregistrement tel que stocké, ou échoue sur demande
#[derive(Clone, Default)]
pub struct MockMetricsStore {
    created: Arc<Mutex<Vec<NewHealthMetric>>>,
    records: Arc<Mutex<Vec<HealthMetricRecord>>>,
    failure: Arc<Mutex<Option<String>>>,
}

impl MockMetricsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store qui rejette toutes les écritures avec ce message
    pub fn failing<S: Into<String>>(message: S) -> Self {
        let store = Self::new();
        store.fail_with(message);
        store
    }

    pub fn fail_with<S: Into<String>>(&self, message: S) {
        *self.failure.lock() = Some(message.into());
    }

    pub fn recover(&self) {
        *self.failure.lock() = None;
    }

    /// Nombre d'appels à `create_health_metrics` (réussis ou non)
    pub fn create_calls(&self) -> usize {
        self.created.lock().len()
    }

    /// Mesures reçues, dans l'ordre des appels
    pub fn received(&self) -> Vec<NewHealthMetric> {
        self.created.lock().clone()
    }

    pub fn stored(&self) -> Vec<HealthMetricRecord> {
        self.records.lock().clone()
    }

    pub fn clear(&self) {
        self.created.lock().clear();
        self.records.lock().clear();
    }
}

#[async_trait]
impl MetricsStore for MockMetricsStore {
    async fn create_health_metrics(
        &self,
        metric: NewHealthMetric,
    ) -> Result<HealthMetricRecord, StoreError> {
        self.created.lock().push(metric.clone());

        if let Some(message) = self.failure.lock().clone() {
            log::info!("💥 [MOCK] Rejected health metrics for {}", metric.user_id);
            return Err(StoreError::Unavailable(message));
        }

        let record = HealthMetricRecord::new(
            format!("mock-{}", uuid::Uuid::new_v4()),
            metric,
            OffsetDateTime::now_utc(),
        );
        self.records.lock().push(record.clone());
        log::info!("💾 [MOCK] Stored health metrics {}", record.id);
        Ok(record)
    }

    async fn latest_health_metrics(
        &self,
        user_id: &str,
    ) -> Result<Option<HealthMetricRecord>, StoreError> {
        if let Some(message) = self.failure.lock().clone() {
            return Err(StoreError::Unavailable(message));
        }
        Ok(self
            .records
            .lock()
            .iter()
            .rev()
            .find(|r| r.user_id == user_id)
            .cloned())
    }

    fn info(&self) -> StoreInfo {
        StoreInfo {
            kind: "mock".to_string(),
            location: None,
            records: self.records.lock().len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metric(user: &str) -> NewHealthMetric {
        NewHealthMetric {
            user_id: user.to_string(),
            heart_rate: 72,
            foot_pressure: 85.0,
            bluetooth_connected: true,
            battery_level: 85,
            anomalies_detected: 0,
        }
    }

    #[tokio::test]
    async fn test_mock_store_records_calls() {
        let store = MockMetricsStore::new();
        let saved = store.create_health_metrics(metric("user_123")).await.unwrap();

        assert_eq!(store.create_calls(), 1);
        assert_eq!(store.received()[0].user_id, "user_123");
        assert!(saved.id.starts_with("mock-"));
        assert_eq!(store.info().records, 1);
    }

    #[tokio::test]
    async fn test_mock_store_failure_and_recovery() {
        let store = MockMetricsStore::failing("database offline");
        let err = store.create_health_metrics(metric("user_123")).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(ref m) if m == "database offline"));
        assert_eq!(store.create_calls(), 1);
        assert!(store.stored().is_empty());

        store.recover();
        store.create_health_metrics(metric("user_123")).await.unwrap();
        let latest = store.latest_health_metrics("user_123").await.unwrap();
        assert!(latest.is_some());
    }
}
