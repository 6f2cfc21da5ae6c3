/*!
# Footcare DevKit - Doublures et utilitaires de test

Bibliothèque facilitant les tests du kernel avec:
- Store de mesures espion (et panne simulée)
- Horloge manuelle et aléa scripté pour un simulateur déterministe
- Harness enchaînant peek/push avec assertions de bornes
*/

pub mod scripted;
pub mod store_stub;
pub mod test_utils;

pub use scripted::{ManualClock, ScriptedRandom};
pub use store_stub::MockMetricsStore;
pub use test_utils::TestHarness;
