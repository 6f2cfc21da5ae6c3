/**
 * STORE JSON - Persistance fichier des mesures de santé
 *
 * FONCTIONNEMENT :
 * - Fichier JSON unique (tableau de mesures), créé vide s'il n'existe pas
 * - Cache mémoire chargé au démarrage, source des lectures
 * - Chaque ajout réécrit le fichier complet ; la mesure n'entre dans le
 *   cache qu'après une écriture réussie, sinon l'erreur remonte à l'appelant
 *
 * DONNÉES EXEMPLE :
 * ```json
 * [{
 *   "id": "0b7c…",
 *   "userId": "demo_alice",
 *   "heartRate": 74,
 *   "footPressure": 84.6,
 *   "bluetoothConnected": true,
 *   "batteryLevel": 83,
 *   "anomaliesDetected": 0,
 *   "recordedAt": "2025-03-01T10:00:00Z"
 * }]
 * ```
 */

use async_trait::async_trait;
use std::path::PathBuf;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{latest_for_user, MetricsStore, StoreError, StoreInfo};
use crate::models::{HealthMetricRecord, NewHealthMetric};

pub struct JsonFileStore {
    /// Chemin du fichier de stockage JSON
    storage_path: PathBuf,
    /// Cache en mémoire des mesures
    cache: parking_lot::Mutex<Vec<HealthMetricRecord>>,
    /// Sérialise les réécritures du fichier
    write_lock: tokio::sync::Mutex<()>,
}

impl JsonFileStore {
    /// Ouvre (ou crée) le fichier de stockage et charge son contenu
    pub fn open<P: Into<PathBuf>>(storage_path: P) -> Result<Self, StoreError> {
        let path = storage_path.into();
        let store = Self {
            storage_path: path.clone(),
            cache: parking_lot::Mutex::new(Vec::new()),
            write_lock: tokio::sync::Mutex::new(()),
        };

        store.load_from_disk()?;
        tracing::info!(path = %path.display(), records = store.cache.lock().len(), "[json-store] opened");
        Ok(store)
    }

    fn load_from_disk(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.storage_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        if !self.storage_path.exists() {
            std::fs::write(&self.storage_path, "[]")?;
        }

        let content = std::fs::read_to_string(&self.storage_path)?;
        let records: Vec<HealthMetricRecord> = if content.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(&content)?
        };

        *self.cache.lock() = records;
        Ok(())
    }

    pub fn path(&self) -> &PathBuf {
        &self.storage_path
    }
}

#[async_trait]
impl MetricsStore for JsonFileStore {
    async fn create_health_metrics(
        &self,
        metric: NewHealthMetric,
    ) -> Result<HealthMetricRecord, StoreError> {
        let record = HealthMetricRecord::new(
            Uuid::new_v4().to_string(),
            metric,
            OffsetDateTime::now_utc(),
        );

        // le cache ne reçoit la mesure qu'une fois le fichier écrit
        let _write = self.write_lock.lock().await;
        let mut pending = self.cache.lock().clone();
        pending.push(record.clone());

        let written = match serde_json::to_string_pretty(&pending) {
            Ok(json) => tokio::fs::write(&self.storage_path, json).await.map_err(StoreError::from),
            Err(e) => Err(StoreError::from(e)),
        };
        if let Err(e) = written {
            tracing::error!(path = %self.storage_path.display(), error = %e, "[json-store] write failed");
            return Err(e);
        }
        self.cache.lock().push(record.clone());

        tracing::debug!(id = %record.id, user_id = %record.user_id, "[json-store] stored health metrics");
        Ok(record)
    }

    async fn latest_health_metrics(
        &self,
        user_id: &str,
    ) -> Result<Option<HealthMetricRecord>, StoreError> {
        Ok(latest_for_user(self.cache.lock().iter(), user_id))
    }

    fn info(&self) -> StoreInfo {
        StoreInfo {
            kind: "json_file".to_string(),
            location: Some(self.storage_path.display().to_string()),
            records: self.cache.lock().len(),
        }
    }
}
