// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Time-of-day load shaping and phase classification.
//!
//! Keeps a 24-hour expected-load profile, seeded with a day/night curve and
//! adapted toward observed pressure by EMA. The current hour is classified
//! against the profile into one of six phases, and each phase maps to a
//! bounded admission adjustment: restrictive near the daily peak,
//! permissive in the trough.

use ahash::AHashMap;
use chrono::Timelike;
use parking_lot::Mutex;
use tracing::trace;

use sensocto_structures::{CircadianPhase, SystemLoadLevel};

/// Adjustment bounds exposed to the admission controller.
pub const ADJUSTMENT_FLOOR: f64 = 0.85;
pub const ADJUSTMENT_CEIL: f64 = 1.2;

/// Compiled-in seed: expected load per hour, day hours above night hours.
const SEED_PROFILE: [f64; 24] = [
    0.20, 0.15, 0.12, 0.12, 0.15, 0.25, // 00-05 night trough
    0.40, 0.55, 0.70, // 06-08 morning ramp
    0.80, 0.85, 0.85, 0.80, 0.80, 0.85, 0.80, 0.75, 0.70, // 09-17 working day
    0.60, 0.50, 0.45, 0.40, 0.30, 0.25, // 18-23 evening decline
];

/// Circadian scheduler configuration
#[derive(Debug, Clone)]
pub struct CircadianConfig {
    /// EMA step folding observed pressure into the hourly profile.
    pub smoothing: f64,

    /// Normalized profile position at or above which the hour is `peak`.
    pub peak_band: f64,

    /// Normalized profile position at or below which the hour is `off_peak`.
    pub trough_band: f64,

    /// Minimum hour-over-hour slope treated as approaching a transition.
    pub slope_epsilon: f64,
}

impl Default for CircadianConfig {
    fn default() -> Self {
        Self {
            smoothing: 0.2,
            peak_band: 0.85,
            trough_band: 0.15,
            slope_epsilon: 0.02,
        }
    }
}

#[derive(Debug)]
struct ProfileState {
    profile: [f64; 24],
    has_data: bool,
}

/// Day-shape scheduler: profile, phase and admission adjustment.
pub struct CircadianScheduler {
    config: CircadianConfig,
    state: Mutex<ProfileState>,
}

impl CircadianScheduler {
    pub fn new(config: CircadianConfig) -> Self {
        Self {
            config,
            state: Mutex::new(ProfileState {
                profile: SEED_PROFILE,
                has_data: false,
            }),
        }
    }

    /// Fold an observed load sample into the current hour's expectation.
    pub fn record_load(&self, level: SystemLoadLevel, pressure: f64) {
        self.record_load_at(level, pressure, current_hour());
    }

    pub(crate) fn record_load_at(&self, level: SystemLoadLevel, pressure: f64, hour: usize) {
        let hour = hour % 24;
        let pressure = pressure.clamp(0.0, 1.0);
        let alpha = self.config.smoothing;
        let mut state = self.state.lock();
        state.profile[hour] = alpha * pressure + (1.0 - alpha) * state.profile[hour];
        state.has_data = true;
        trace!(
            target: "sensocto-bio",
            "[CIRCADIAN] Load sample level={} pressure={:.2} hour={} expected={:.2}",
            level,
            pressure,
            hour,
            state.profile[hour]
        );
    }

    /// Phase classification for the current hour; `unknown` before any data.
    pub fn get_phase(&self) -> CircadianPhase {
        self.get_phase_at(current_hour())
    }

    pub(crate) fn get_phase_at(&self, hour: usize) -> CircadianPhase {
        let state = self.state.lock();
        if !state.has_data {
            return CircadianPhase::Unknown;
        }
        classify(&self.config, &state.profile, hour % 24)
    }

    /// Admission adjustment for the current phase, within [0.85, 1.2].
    ///
    /// Higher (more restrictive) toward the daily peak, lower (more
    /// permissive) in the trough.
    pub fn get_phase_adjustment(&self) -> f64 {
        self.get_phase_adjustment_at(current_hour())
    }

    pub(crate) fn get_phase_adjustment_at(&self, hour: usize) -> f64 {
        let adjustment: f64 = match self.get_phase_at(hour) {
            CircadianPhase::Peak => 1.2,
            CircadianPhase::ApproachingPeak => 1.1,
            CircadianPhase::Normal | CircadianPhase::Unknown => 1.0,
            CircadianPhase::ApproachingOffPeak => 0.95,
            CircadianPhase::OffPeak => 0.85,
        };
        adjustment.clamp(ADJUSTMENT_FLOOR, ADJUSTMENT_CEIL)
    }

    /// Expected load per hour of day; always exposes all 24 hours in [0, 1].
    pub fn get_profile(&self) -> AHashMap<u8, f64> {
        let state = self.state.lock();
        state
            .profile
            .iter()
            .enumerate()
            .map(|(hour, value)| (hour as u8, value.clamp(0.0, 1.0)))
            .collect()
    }

    /// Restore the seed profile and forget all observations.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.profile = SEED_PROFILE;
        state.has_data = false;
    }
}

impl Default for CircadianScheduler {
    fn default() -> Self {
        Self::new(CircadianConfig::default())
    }
}

fn current_hour() -> usize {
    chrono::Utc::now().hour() as usize
}

fn classify(config: &CircadianConfig, profile: &[f64; 24], hour: usize) -> CircadianPhase {
    let min = profile.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = profile.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if range < 0.05 {
        // Flat profile: every hour looks the same.
        return CircadianPhase::Normal;
    }

    let normalized = (profile[hour] - min) / range;
    if normalized >= config.peak_band {
        return CircadianPhase::Peak;
    }
    if normalized <= config.trough_band {
        return CircadianPhase::OffPeak;
    }

    let slope = profile[(hour + 1) % 24] - profile[(hour + 23) % 24];
    if slope > config.slope_epsilon {
        CircadianPhase::ApproachingPeak
    } else if slope < -config.slope_epsilon {
        CircadianPhase::ApproachingOffPeak
    } else {
        CircadianPhase::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_unknown_before_any_data() {
        let scheduler = CircadianScheduler::default();
        assert_eq!(scheduler.get_phase(), CircadianPhase::Unknown);
        assert_eq!(scheduler.get_phase_adjustment(), 1.0);
    }

    #[test]
    fn test_profile_exposes_all_24_hours_in_unit_range() {
        let scheduler = CircadianScheduler::default();
        let profile = scheduler.get_profile();
        assert_eq!(profile.len(), 24);
        for hour in 0u8..24 {
            let value = profile[&hour];
            assert!((0.0..=1.0).contains(&value));
        }
    }

    #[test]
    fn test_seed_profile_day_exceeds_night() {
        let scheduler = CircadianScheduler::default();
        let profile = scheduler.get_profile();
        let day = (profile[&9] + profile[&10] + profile[&14]) / 3.0;
        let night = (profile[&2] + profile[&3] + profile[&4]) / 3.0;
        assert!(day > night);
    }

    #[test]
    fn test_phase_classification_follows_the_curve() {
        let scheduler = CircadianScheduler::default();
        scheduler.record_load_at(SystemLoadLevel::Normal, 0.5, 12);
        assert_eq!(scheduler.get_phase_at(10), CircadianPhase::Peak);
        assert_eq!(scheduler.get_phase_at(2), CircadianPhase::OffPeak);
        assert_eq!(scheduler.get_phase_at(7), CircadianPhase::ApproachingPeak);
        assert_eq!(scheduler.get_phase_at(19), CircadianPhase::ApproachingOffPeak);
    }

    #[test]
    fn test_adjustment_restrictive_at_peak_permissive_at_trough() {
        let scheduler = CircadianScheduler::default();
        scheduler.record_load_at(SystemLoadLevel::High, 0.9, 10);
        let peak = scheduler.get_phase_adjustment_at(10);
        let trough = scheduler.get_phase_adjustment_at(3);
        assert!(peak > 1.0);
        assert!(trough < 1.0);
        for value in [peak, trough] {
            assert!((ADJUSTMENT_FLOOR..=ADJUSTMENT_CEIL).contains(&value));
        }
    }

    #[test]
    fn test_record_load_adapts_the_profile() {
        let scheduler = CircadianScheduler::default();
        let before = scheduler.get_profile()[&3];
        for _ in 0..30 {
            scheduler.record_load_at(SystemLoadLevel::Critical, 1.0, 3);
        }
        let after = scheduler.get_profile()[&3];
        assert!(after > before);
        assert!(after <= 1.0);
    }

    #[test]
    fn test_out_of_range_pressure_is_clamped() {
        let scheduler = CircadianScheduler::default();
        for _ in 0..50 {
            scheduler.record_load_at(SystemLoadLevel::Critical, 42.0, 6);
        }
        let profile = scheduler.get_profile();
        assert!(profile[&6] <= 1.0);
    }

    #[test]
    fn test_reset_restores_seed_and_unknown_phase() {
        let scheduler = CircadianScheduler::default();
        scheduler.record_load_at(SystemLoadLevel::High, 1.0, 2);
        scheduler.reset();
        assert_eq!(scheduler.get_phase(), CircadianPhase::Unknown);
        let profile = scheduler.get_profile();
        assert!((profile[&2] - SEED_PROFILE[2]).abs() < 1e-9);
    }
}
