use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::Path, sync::Arc};
use tokio::fs;

use crate::ports::{JsonFileStore, MemoryStore, MetricsStore, StoreError};

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct KernelConfig {
    pub listen: SocketAddr,
    pub storage: StorageConf,
    pub simulator: SimulatorConf,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConf {
    pub kind: StorageKind,
    pub path: String, // ex: "./data/health_metrics.json"
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    Memory,
    JsonFile,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct SimulatorConf {
    /// Graine fixe pour rejouer une démo à l'identique
    pub seed: Option<u64>,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 8080)),
            storage: StorageConf::default(),
            simulator: SimulatorConf::default(),
        }
    }
}

impl Default for StorageConf {
    fn default() -> Self {
        Self {
            kind: StorageKind::JsonFile,
            path: "./data/health_metrics.json".into(),
        }
    }
}

impl StorageConf {
    /// Instancie le store décrit par la conf
    pub fn open_store(&self) -> Result<Arc<dyn MetricsStore>, StoreError> {
        match self.kind {
            StorageKind::Memory => Ok(Arc::new(MemoryStore::new())),
            StorageKind::JsonFile => Ok(Arc::new(JsonFileStore::open(&self.path)?)),
        }
    }
}

pub fn parse_config(txt: &str) -> Result<KernelConfig, serde_yaml::Error> {
    if txt.trim().is_empty() {
        return Ok(KernelConfig::default());
    }
    serde_yaml::from_str(txt)
}

pub async fn load_config() -> KernelConfig {
    let path = std::env::var("FOOTCARE_KERNEL_CONFIG").unwrap_or_else(|_| "kernel.yaml".into());
    if !Path::new(&path).exists() {
        tracing::warn!(%path, "[kernel] pas de fichier de config, usage config par défaut");
        return KernelConfig::default();
    }
    let txt = match fs::read_to_string(&path).await {
        Ok(txt) => txt,
        Err(e) => {
            tracing::error!(%path, error = %e, "[kernel] config illisible");
            return KernelConfig::default();
        }
    };
    parse_config(&txt).unwrap_or_else(|e| {
        tracing::error!(%path, error = %e, "[kernel] config invalide");
        KernelConfig::default()
    })
}
