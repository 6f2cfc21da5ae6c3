/*!
# Footcare Kernel

Noyau serveur du suivi podologique : simulateur de signes vitaux, ports de
stockage des mesures et API REST qui les expose.

- `simulator` : état simulé partagé (fréquence cardiaque, pression plantaire,
  Bluetooth, batterie, anomalies) et politique d'évolution
- `ports` : interface de persistance des mesures + implémentations mémoire / JSON
- `http` : routes Axum au-dessus du simulateur et du store
- `config` : chargement `kernel.yaml`
- `health` : suivi de santé du kernel
*/

pub mod config;
pub mod health;
pub mod http;
pub mod models;
pub mod ports;
pub mod simulator;
pub mod state;

pub use models::{HealthMetricRecord, NewHealthMetric, PushOutcome, VitalsSample};
pub use ports::{MetricsStore, StoreError};
pub use simulator::{Clock, PersistenceError, RandomSource, SimulatorState, VitalsSimulator};
