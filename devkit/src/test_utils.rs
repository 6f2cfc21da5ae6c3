/*!
Test Harness pour le simulateur de signes vitaux

Facilite l'écriture de tests avec:
- Setup automatique horloge manuelle + aléa scripté + store espion
- Assertions sur les bornes de l'état simulé
- Enchaînement d'appels peek/push avec avance d'horloge
*/

use crate::scripted::{ManualClock, ScriptedRandom};
use crate::store_stub::MockMetricsStore;
use anyhow::Result;
use footcare_kernel::models::{PushOutcome, VitalsSample};
use footcare_kernel::simulator::{PersistenceError, SimulatorState, VitalsSimulator};
use std::sync::Arc;

/// Instant de départ par défaut des harness (ms epoch)
pub const START_MILLIS: i64 = 1_700_000_000_000;

/// Harness de test complet pour le simulateur
pub struct TestHarness {
    pub simulator: VitalsSimulator,
    pub clock: ManualClock,
    pub random: ScriptedRandom,
    pub store: MockMetricsStore,
}

impl TestHarness {
    /// Harness avec un aléa constant
    pub fn new(random_value: f64) -> Self {
        Self::with_random(ScriptedRandom::constant(random_value))
    }

    pub fn with_random(random: ScriptedRandom) -> Self {
        Self::build(random, MockMetricsStore::new())
    }

    pub fn with_store(random: ScriptedRandom, store: MockMetricsStore) -> Self {
        Self::build(random, store)
    }

    fn build(random: ScriptedRandom, store: MockMetricsStore) -> Self {
        env_logger::try_init().ok(); // Init logging pour tests

        let clock = ManualClock::at(START_MILLIS);
        let simulator = VitalsSimulator::new(
            Arc::new(store.clone()),
            Arc::new(clock.clone()),
            Box::new(random.clone()),
        );
        Self {
            simulator,
            clock,
            random,
            store,
        }
    }

    /// Avance l'horloge puis appelle `peek`
    pub fn peek_after(&self, millis: i64) -> VitalsSample {
        self.clock.advance(millis);
        self.simulator.peek()
    }

    /// Avance l'horloge puis appelle `push_sample`
    pub async fn push_after(
        &self,
        millis: i64,
        user_id: Option<&str>,
    ) -> Result<PushOutcome, PersistenceError> {
        self.clock.advance(millis);
        self.simulator.push_sample(user_id).await
    }

    pub fn state(&self) -> SimulatorState {
        self.simulator.state()
    }

    /// Vérifie que tous les champs bornés sont dans leurs intervalles
    pub fn assert_bounds(&self) -> Result<()> {
        let s = self.state();
        if !(55.0..=110.0).contains(&s.heart_rate) {
            anyhow::bail!("heart rate out of bounds: {}", s.heart_rate);
        }
        if !(20.0..=100.0).contains(&s.foot_pressure) {
            anyhow::bail!("foot pressure out of bounds: {}", s.foot_pressure);
        }
        if s.battery_level > 100 {
            anyhow::bail!("battery out of bounds: {}", s.battery_level);
        }
        if s.anomalies_detected > 10 {
            anyhow::bail!("anomalies out of bounds: {}", s.anomalies_detected);
        }
        Ok(())
    }

    /// Vérifie qu'un échantillon n'a pas plus d'une décimale de pression
    pub fn assert_one_decimal(sample: &VitalsSample) -> Result<()> {
        let scaled = sample.foot_pressure * 10.0;
        if (scaled - scaled.round()).abs() > 1e-9 {
            anyhow::bail!("foot pressure has more than one decimal: {}", sample.foot_pressure);
        }
        Ok(())
    }
}
