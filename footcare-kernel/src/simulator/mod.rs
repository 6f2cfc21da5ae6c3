/**
 * SIMULATEUR DE SIGNES VITAUX - Télémétrie synthétique sans capteur
 *
 * RÔLE :
 * Produit une série temporelle crédible (fréquence cardiaque, pression
 * plantaire, Bluetooth, batterie, anomalies) pour la démo et le dev, et
 * persiste optionnellement un échantillon pour un utilisateur.
 *
 * FONCTIONNEMENT :
 * - Un seul état pour tout le process : pas de partition par utilisateur
 * - Chaque appel (peek / push) exécute un pas de simulation sous verrou
 * - Aléa et horloge injectés à la construction (tests déterministes)
 * - Push : le pas est appliqué AVANT l'écriture ; un échec de stockage
 *   ne revient pas sur l'état simulé
 */

use std::sync::Arc;

use crate::models::{NewHealthMetric, PushOutcome, VitalsSample};
use crate::ports::{MetricsStore, StoreError};
use crate::state::{new_state, Shared};

pub mod source;
pub mod step;

pub use source::{Clock, RandomSource, RngSource, SystemClock};
pub use step::SimulatorState;

/// Échec de persistance d'un échantillon ; l'erreur du store est conservée
#[derive(Debug, thiserror::Error)]
#[error("failed to persist health metrics for {user_id}: {source}")]
pub struct PersistenceError {
    pub user_id: String,
    #[source]
    pub source: StoreError,
}

struct Core {
    state: SimulatorState,
    rng: Box<dyn RandomSource>,
}

/// Service unique, construit au démarrage et partagé par `Arc`
pub struct VitalsSimulator {
    core: Shared<Core>,
    clock: Arc<dyn Clock>,
    store: Arc<dyn MetricsStore>,
}

impl VitalsSimulator {
    pub fn new(
        store: Arc<dyn MetricsStore>,
        clock: Arc<dyn Clock>,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        let state = SimulatorState::initial(clock.now_millis());
        Self {
            core: new_state(Core { state, rng }),
            clock,
            store,
        }
    }

    /// Horloge système ; aléa fixé par `seed` si fourni
    pub fn with_system_clock(store: Arc<dyn MetricsStore>, seed: Option<u64>) -> Self {
        let rng: Box<dyn RandomSource> = match seed {
            Some(seed) => Box::new(RngSource::seeded(seed)),
            None => Box::new(RngSource::from_entropy()),
        };
        Self::new(store, Arc::new(SystemClock), rng)
    }

    /// Avance l'état puis renvoie un instantané, sans persistance
    pub fn peek(&self) -> VitalsSample {
        self.advance()
    }

    /// Avance l'état puis, si un utilisateur est fourni, persiste l'échantillon
    pub async fn push_sample(&self, user_id: Option<&str>) -> Result<PushOutcome, PersistenceError> {
        let sample = self.advance();

        let Some(user_id) = user_id else {
            return Ok(PushOutcome::Unsaved(sample));
        };

        let metric = NewHealthMetric::from_sample(user_id, &sample);
        match self.store.create_health_metrics(metric).await {
            Ok(record) => {
                tracing::debug!(user_id, id = %record.id, "[simulator] sample persisted");
                Ok(PushOutcome::Saved(record))
            }
            Err(source) => Err(PersistenceError {
                user_id: user_id.to_string(),
                source,
            }),
        }
    }

    /// Copie de l'état courant, sans avancer la simulation
    pub fn state(&self) -> SimulatorState {
        self.core.lock().state
    }

    pub fn store(&self) -> &Arc<dyn MetricsStore> {
        &self.store
    }

    fn advance(&self) -> VitalsSample {
        let now = self.clock.now_millis();
        let mut core = self.core.lock();
        let Core { state, rng } = &mut *core;
        state.step(now, rng.as_mut());
        state.sample(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::MemoryStore;
    use std::sync::atomic::{AtomicI64, Ordering};

    struct StepClock(AtomicI64);

    impl Clock for StepClock {
        fn now_millis(&self) -> i64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    fn simulator(store: Arc<MemoryStore>, clock: Arc<StepClock>) -> VitalsSimulator {
        VitalsSimulator::new(store, clock, Box::new(RngSource::seeded(7)))
    }

    #[test]
    fn test_peek_within_gate_is_stable() {
        let clock = Arc::new(StepClock(AtomicI64::new(1_700_000_000_000)));
        let sim = simulator(Arc::new(MemoryStore::new()), clock.clone());

        let first = sim.peek();
        clock.0.fetch_add(1, Ordering::SeqCst);
        let second = sim.peek();

        assert_eq!(first.heart_rate, 72);
        assert_eq!(first.heart_rate, second.heart_rate);
        assert_eq!(first.foot_pressure, second.foot_pressure);
        assert_eq!(second.timestamp, first.timestamp + 1);
    }

    #[test]
    fn test_bounds_hold_over_long_run() {
        let clock = Arc::new(StepClock(AtomicI64::new(1_700_000_000_000)));
        let sim = simulator(Arc::new(MemoryStore::new()), clock.clone());

        for _ in 0..5_000 {
            clock.0.fetch_add(3_000, Ordering::SeqCst);
            let s = sim.peek();
            assert!((55..=110).contains(&s.heart_rate));
            assert!((20.0..=100.0).contains(&s.foot_pressure));
            assert!(s.battery_level <= 100);
            assert!(s.anomalies_detected <= 10);
            assert_eq!((s.foot_pressure * 10.0).round() / 10.0, s.foot_pressure);
        }
    }

    #[tokio::test]
    async fn test_push_without_user_skips_store() {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(StepClock(AtomicI64::new(1_700_000_000_000)));
        let sim = simulator(store.clone(), clock);

        let outcome = sim.push_sample(None).await.unwrap();
        assert!(!outcome.is_saved());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_push_with_user_persists_sample() {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(StepClock(AtomicI64::new(1_700_000_000_000)));
        let sim = simulator(store.clone(), clock);

        let PushOutcome::Saved(record) = sim.push_sample(Some("user_123")).await.unwrap() else {
            panic!("expected a saved outcome");
        };
        assert_eq!(record.user_id, "user_123");
        assert_eq!(record.heart_rate, sim.state().reported_heart_rate());
        assert_eq!(store.len(), 1);
    }
}
