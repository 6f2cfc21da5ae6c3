/*!
Horloge manuelle et aléa scripté

Rendent le simulateur déterministe : l'horloge n'avance que sur demande,
l'aléa rejoue une suite de tirages puis une valeur fixe.
*/

use footcare_kernel::simulator::{Clock, RandomSource};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Horloge pilotée par le test (ms epoch)
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn at(now_millis: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(now_millis)),
        }
    }

    pub fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }

    pub fn set(&self, now_millis: i64) {
        self.now.store(now_millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Aléa scripté : les tirages en file d'attente, puis `fallback`
///
/// Le clone partage la même file, ce qui permet d'en ajouter après avoir
/// donné la source au simulateur.
#[derive(Clone)]
pub struct ScriptedRandom {
    draws: Arc<Mutex<VecDeque<f64>>>,
    fallback: f64,
}

impl ScriptedRandom {
    /// Toujours la même valeur
    pub fn constant(value: f64) -> Self {
        Self::with_draws(&[], value)
    }

    pub fn with_draws(draws: &[f64], fallback: f64) -> Self {
        Self {
            draws: Arc::new(Mutex::new(draws.iter().copied().collect())),
            fallback,
        }
    }

    pub fn push_draws(&self, draws: &[f64]) {
        self.draws.lock().extend(draws.iter().copied());
    }

    pub fn pending(&self) -> usize {
        self.draws.lock().len()
    }
}

impl RandomSource for ScriptedRandom {
    fn next_f64(&mut self) -> f64 {
        self.draws.lock().pop_front().unwrap_or(self.fallback)
    }
}
