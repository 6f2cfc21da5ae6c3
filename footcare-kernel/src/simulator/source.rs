use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use time::OffsetDateTime;

/// Source d'aléa du simulateur : tirages uniformes dans [0, 1)
pub trait RandomSource: Send {
    fn next_f64(&mut self) -> f64;

    /// Vrai avec une probabilité `p`
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Entier uniforme dans [low, low + count)
    fn int_from(&mut self, low: i32, count: i32) -> i32 {
        low + (self.next_f64() * count as f64).floor() as i32
    }

    /// Dérive entière uniforme dans [-max, max]
    fn drift(&mut self, max: i32) -> i32 {
        self.int_from(-max, 2 * max + 1)
    }
}

/// Adapte n'importe quel générateur `rand` en `RandomSource`
pub struct RngSource<R>(R);

impl RngSource<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }
}

impl<R: RngCore + Send> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self(rng)
    }
}

impl<R: RngCore + Send> RandomSource for RngSource<R> {
    fn next_f64(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}

/// Horloge murale, en millisecondes depuis l'epoch Unix
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
    }
}

/// Arrondi à l'entier, les demis vers +∞
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Arrondi à une décimale, les demis vers +∞
pub fn round_one_decimal(value: f64) -> f64 {
    round_half_up(value * 10.0) / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    struct Fixed(f64);

    impl RandomSource for Fixed {
        fn next_f64(&mut self) -> f64 {
            self.0
        }
    }

    #[test]
    fn test_drift_stays_in_span() {
        assert_eq!(Fixed(0.0).drift(1), -1);
        assert_eq!(Fixed(0.5).drift(1), 0);
        assert_eq!(Fixed(0.999).drift(1), 1);
        assert_eq!(Fixed(0.0).drift(2), -2);
        assert_eq!(Fixed(0.999).drift(2), 2);
    }

    /// Balayage régulier de [0, 1) : chaque valeur de dérive doit sortir aussi souvent
    fn drift_histogram(max: i32, sweep: usize) -> BTreeMap<i32, usize> {
        let mut counts = BTreeMap::new();
        for i in 0..sweep {
            let r = i as f64 / sweep as f64;
            *counts.entry(Fixed(r).drift(max)).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn test_drift_is_uniform() {
        let heart = drift_histogram(1, 9_000);
        assert_eq!(heart.keys().copied().collect::<Vec<_>>(), vec![-1, 0, 1]);
        assert!(heart.values().all(|&n| n.abs_diff(3_000) <= 1), "{heart:?}");

        let pressure = drift_histogram(2, 10_000);
        assert_eq!(pressure.keys().copied().collect::<Vec<_>>(), vec![-2, -1, 0, 1, 2]);
        assert!(pressure.values().all(|&n| n.abs_diff(2_000) <= 1), "{pressure:?}");
    }

    #[test]
    fn test_int_from_covers_range() {
        assert_eq!(Fixed(0.0).int_from(3, 5), 3);
        assert_eq!(Fixed(0.999).int_from(3, 5), 7);
        assert_eq!(Fixed(0.999).int_from(0, 3), 2);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round_half_up(72.5), 73.0);
        assert_eq!(round_half_up(-0.5), 0.0);
        assert_eq!(round_one_decimal(85.37), 85.4);
        assert_eq!(round_one_decimal(85.34), 85.3);
    }

    #[test]
    fn test_seeded_source_is_reproducible() {
        let mut a = RngSource::seeded(42);
        let mut b = RngSource::seeded(42);
        for _ in 0..16 {
            let x = a.next_f64();
            assert_eq!(x, b.next_f64());
            assert!((0.0..1.0).contains(&x));
        }
    }
}
