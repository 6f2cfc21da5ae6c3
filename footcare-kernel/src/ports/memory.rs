use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{latest_for_user, MetricsStore, StoreError, StoreInfo};
use crate::models::{HealthMetricRecord, NewHealthMetric};
use crate::state::{new_state, Shared};

/// Store en mémoire : les mesures disparaissent au redémarrage
#[derive(Clone)]
pub struct MemoryStore {
    records: Shared<Vec<HealthMetricRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: new_state(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetricsStore for MemoryStore {
    async fn create_health_metrics(
        &self,
        metric: NewHealthMetric,
    ) -> Result<HealthMetricRecord, StoreError> {
        let record = HealthMetricRecord::new(
            Uuid::new_v4().to_string(),
            metric,
            OffsetDateTime::now_utc(),
        );
        self.records.lock().push(record.clone());
        tracing::debug!(id = %record.id, user_id = %record.user_id, "[memory] stored health metrics");
        Ok(record)
    }

    async fn latest_health_metrics(
        &self,
        user_id: &str,
    ) -> Result<Option<HealthMetricRecord>, StoreError> {
        Ok(latest_for_user(self.records.lock().iter(), user_id))
    }

    fn info(&self) -> StoreInfo {
        StoreInfo {
            kind: "memory".to_string(),
            location: None,
            records: self.len(),
        }
    }
}
