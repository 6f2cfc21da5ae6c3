use serde::Serialize;

use super::source::{round_half_up, round_one_decimal, RandomSource};
use crate::models::VitalsSample;

pub const HEART_RATE_MIN: f64 = 55.0;
pub const HEART_RATE_MAX: f64 = 110.0;
pub const FOOT_PRESSURE_MIN: f64 = 20.0;
pub const FOOT_PRESSURE_MAX: f64 = 100.0;
pub const BATTERY_MAX: i32 = 100;
pub const ANOMALIES_MAX: i32 = 10;

/// Plage « normale » de fréquence cardiaque ; en dehors, une anomalie peut être levée
pub const NORMAL_HEART_RATE: (i32, i32) = (60, 100);

// portes temporelles : base + tirage dans [0, jitter)
const HEART_RATE_GATE_MS: (f64, f64) = (8_000.0, 4_000.0);
const FOOT_PRESSURE_GATE_MS: (f64, f64) = (10_000.0, 5_000.0);

// périodes des tendances sinusoïdales
const HEART_RATE_TREND_MS: f64 = 120_000.0;
const FOOT_PRESSURE_TREND_MS: f64 = 90_000.0;

const FLICKER_CHANCE: f64 = 0.01;
const DRAIN_CHANCE: f64 = 0.10;
const RECHARGE_CHANCE: f64 = 0.05;
const LOW_BATTERY: i32 = 20;
const ANOMALY_RAISE_CHANCE: f64 = 0.10;
const ANOMALY_DECAY_CHANCE: f64 = 0.02;

/// État courant du simulateur, partagé par tous les appelants du process
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatorState {
    pub heart_rate: f64,
    pub foot_pressure: f64,
    pub bluetooth_connected: bool,
    pub battery_level: u8,
    pub anomalies_detected: u8,
    /// Dernière avancée des marches aléatoires (ms epoch)
    pub last_update: i64,
}

impl SimulatorState {
    /// Valeurs de départ du simulateur
    pub fn initial(now: i64) -> Self {
        Self {
            heart_rate: 72.0,
            foot_pressure: 85.0,
            bluetooth_connected: true,
            battery_level: 85,
            anomalies_detected: 0,
            last_update: now,
        }
    }

    /// Un pas complet de simulation.
    ///
    /// L'ordre est fixe : connectivité, vidange puis recharge batterie,
    /// fréquence cardiaque, pression, puis hausse puis baisse des anomalies.
    pub fn step(&mut self, now: i64, rng: &mut dyn RandomSource) {
        self.flicker_connectivity(rng);
        self.drain_battery(rng);
        self.recharge_battery(rng);
        self.advance_heart_rate(now, rng);
        self.advance_foot_pressure(now, rng);
        self.track_anomalies(rng);
    }

    pub fn reported_heart_rate(&self) -> i32 {
        round_half_up(self.heart_rate) as i32
    }

    pub fn sample(&self, now: i64) -> VitalsSample {
        VitalsSample {
            heart_rate: self.reported_heart_rate(),
            foot_pressure: round_one_decimal(self.foot_pressure),
            bluetooth_connected: self.bluetooth_connected,
            battery_level: self.battery_level,
            anomalies_detected: self.anomalies_detected,
            timestamp: now,
        }
    }

    fn flicker_connectivity(&mut self, rng: &mut dyn RandomSource) {
        if !rng.chance(FLICKER_CHANCE) {
            return;
        }
        self.bluetooth_connected = !self.bluetooth_connected;
        if self.bluetooth_connected {
            tracing::info!("[simulator] bluetooth reconnected");
        } else {
            let loss = rng.int_from(0, 3);
            self.set_battery(self.battery_level as i32 - loss);
            tracing::info!(battery = self.battery_level, "[simulator] bluetooth dropped");
        }
    }

    fn drain_battery(&mut self, rng: &mut dyn RandomSource) {
        if self.bluetooth_connected && rng.chance(DRAIN_CHANCE) {
            self.set_battery(self.battery_level as i32 - 1);
        }
    }

    fn recharge_battery(&mut self, rng: &mut dyn RandomSource) {
        if (self.battery_level as i32) < LOW_BATTERY && rng.chance(RECHARGE_CHANCE) {
            let gain = rng.int_from(3, 5);
            self.set_battery(self.battery_level as i32 + gain);
            tracing::debug!(battery = self.battery_level, "[simulator] battery recharged");
        }
    }

    fn advance_heart_rate(&mut self, now: i64, rng: &mut dyn RandomSource) {
        if !self.gate_open(now, HEART_RATE_GATE_MS, rng) {
            return;
        }
        let trend = (now as f64 / HEART_RATE_TREND_MS).sin() * 2.0;
        let drift = rng.drift(1) as f64;
        self.heart_rate = (self.heart_rate + drift + trend).clamp(HEART_RATE_MIN, HEART_RATE_MAX);
        self.last_update = now;
        tracing::debug!(heart_rate = self.heart_rate, "[simulator] heart rate advanced");
    }

    fn advance_foot_pressure(&mut self, now: i64, rng: &mut dyn RandomSource) {
        if !self.gate_open(now, FOOT_PRESSURE_GATE_MS, rng) {
            return;
        }
        let trend = (now as f64 / FOOT_PRESSURE_TREND_MS).cos();
        let drift = rng.drift(2) as f64;
        self.foot_pressure = round_one_decimal(self.foot_pressure + drift + trend)
            .clamp(FOOT_PRESSURE_MIN, FOOT_PRESSURE_MAX);
        self.last_update = now;
        tracing::debug!(foot_pressure = self.foot_pressure, "[simulator] foot pressure advanced");
    }

    fn track_anomalies(&mut self, rng: &mut dyn RandomSource) {
        let bpm = self.reported_heart_rate();
        let (low, high) = NORMAL_HEART_RATE;
        if (bpm < low || bpm > high) && rng.chance(ANOMALY_RAISE_CHANCE) {
            self.anomalies_detected = (self.anomalies_detected as i32 + 1).min(ANOMALIES_MAX) as u8;
            tracing::info!(bpm, anomalies = self.anomalies_detected, "[simulator] anomaly flagged");
        }
        if rng.chance(ANOMALY_DECAY_CHANCE) {
            self.anomalies_detected = self.anomalies_detected.saturating_sub(1);
        }
    }

    /// Tirage frais du seuil à chaque appel
    fn gate_open(&self, now: i64, (base, jitter): (f64, f64), rng: &mut dyn RandomSource) -> bool {
        let threshold = base + rng.next_f64() * jitter;
        (now - self.last_update) as f64 > threshold
    }

    fn set_battery(&mut self, level: i32) {
        self.battery_level = level.clamp(0, BATTERY_MAX) as u8;
    }
}
