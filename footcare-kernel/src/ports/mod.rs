/**
 * PORTS DE STOCKAGE - Persistance des mesures de santé
 *
 * RÔLE :
 * Ce module définit l'interface que le simulateur (et l'API) utilisent pour
 * persister les mesures d'un utilisateur. Le kernel ne connaît que le trait,
 * l'implémentation est choisie au démarrage via `kernel.yaml`.
 *
 * FONCTIONNEMENT :
 * - MetricsStore trait = interface commune (create / latest / info)
 * - MemoryStore = mesures en mémoire du process (démo, tests)
 * - JsonFileStore = fichier JSON + cache mémoire, réécrit à chaque ajout
 * - Stockage en ajout seul : pas de mise à jour ni de suppression ici
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::{HealthMetricRecord, NewHealthMetric};

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

/// Erreurs possibles lors des opérations sur un store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Informations descriptives d'un store, exposées par /system/health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreInfo {
    /// Type de store ("memory", "json_file")
    pub kind: String,
    /// Emplacement des données si persistées sur disque
    pub location: Option<String>,
    /// Nombre de mesures actuellement stockées
    pub records: usize,
}

/// Interface commune de persistance des mesures
#[async_trait]
pub trait MetricsStore: Send + Sync {
    /// Ajoute une mesure ; le store génère l'id et l'horodatage
    async fn create_health_metrics(
        &self,
        metric: NewHealthMetric,
    ) -> Result<HealthMetricRecord, StoreError>;

    /// Dernière mesure enregistrée pour un utilisateur
    async fn latest_health_metrics(
        &self,
        user_id: &str,
    ) -> Result<Option<HealthMetricRecord>, StoreError>;

    fn info(&self) -> StoreInfo;
}

/// Plus récente mesure d'un utilisateur parmi `records`
pub(crate) fn latest_for_user<'a, I>(records: I, user_id: &str) -> Option<HealthMetricRecord>
where
    I: IntoIterator<Item = &'a HealthMetricRecord>,
{
    // à date égale, la dernière insérée gagne
    records
        .into_iter()
        .filter(|r| r.user_id == user_id)
        .fold(None::<&HealthMetricRecord>, |best, r| match best {
            Some(b) if b.recorded_at > r.recorded_at => Some(b),
            _ => Some(r),
        })
        .cloned()
}
