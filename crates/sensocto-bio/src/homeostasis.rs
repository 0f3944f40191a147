// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Self-tuning offsets for the system load-level thresholds.
//!
//! The tuner observes which load levels the system actually reports and
//! nudges per-level threshold offsets so the observed distribution drifts
//! toward a target distribution. Positive offset = raise the pressure
//! threshold for that level (the classifier becomes less eager to report
//! it). Offsets are clamped to [-0.3, 0.3] on every single update, so no
//! input history can run them away.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::trace;

use sensocto_structures::SystemLoadLevel;

/// Homeostatic tuner configuration
#[derive(Debug, Clone)]
pub struct HomeostasisConfig {
    /// Proportional step applied per recorded sample.
    pub proportional_gain: f64,

    /// Symmetric clamp for every offset.
    pub offset_bound: f64,

    /// Observed counts are halved once this many samples accumulate, so the
    /// tuner keeps adapting to the current regime.
    pub observation_window: u64,

    /// Desired fraction of observations per level.
    pub target: TargetDistribution,
}

impl Default for HomeostasisConfig {
    fn default() -> Self {
        Self {
            proportional_gain: 0.02,
            offset_bound: 0.3,
            observation_window: 10_000,
            target: TargetDistribution::default(),
        }
    }
}

/// Desired fraction of observations per load level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TargetDistribution {
    pub normal: f64,
    pub elevated: f64,
    pub high: f64,
    pub critical: f64,
}

impl Default for TargetDistribution {
    fn default() -> Self {
        Self {
            normal: 0.70,
            elevated: 0.20,
            high: 0.08,
            critical: 0.02,
        }
    }
}

impl TargetDistribution {
    /// Target fraction of observations at or above `level`.
    fn at_or_above(&self, level: SystemLoadLevel) -> f64 {
        match level {
            SystemLoadLevel::Normal => 1.0,
            SystemLoadLevel::Elevated => self.elevated + self.high + self.critical,
            SystemLoadLevel::High => self.high + self.critical,
            SystemLoadLevel::Critical => self.critical,
        }
    }
}

/// Threshold offsets exposed to the admission controller's classifier.
///
/// Each field stays within [-offset_bound, offset_bound] regardless of
/// sample count or skew.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdOffsets {
    pub elevated: f64,
    pub high: f64,
    pub critical: f64,
}

#[derive(Debug, Default)]
struct TunerState {
    /// Observation counts indexed Normal..Critical.
    counts: [u64; 4],
    offsets: ThresholdOffsets,
}

impl TunerState {
    fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Observed fraction of samples at or above `level`.
    fn observed_at_or_above(&self, level: SystemLoadLevel) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let from = level_index(level);
        let above: u64 = self.counts[from..].iter().sum();
        above as f64 / total as f64
    }
}

/// Global self-tuner for load-level thresholds.
pub struct HomeostaticTuner {
    config: HomeostasisConfig,
    state: Mutex<TunerState>,
}

impl HomeostaticTuner {
    pub fn new(config: HomeostasisConfig) -> Self {
        Self {
            config,
            state: Mutex::new(TunerState::default()),
        }
    }

    /// Record an observed system load level (fire-and-forget).
    pub fn record_sample(&self, level: SystemLoadLevel) {
        let bound = self.config.offset_bound;
        let gain = self.config.proportional_gain;
        let mut state = self.state.lock();

        state.counts[level_index(level)] += 1;
        if state.total() >= self.config.observation_window {
            for count in state.counts.iter_mut() {
                *count /= 2;
            }
        }

        // One proportional step per thresholded level: over-observation of a
        // level pushes its threshold up, under-observation pulls it down.
        for thresholded in SystemLoadLevel::THRESHOLDED {
            let observed = state.observed_at_or_above(thresholded);
            let target = self.config.target.at_or_above(thresholded);
            let step = gain * (observed - target);
            let offset = match thresholded {
                SystemLoadLevel::Elevated => &mut state.offsets.elevated,
                SystemLoadLevel::High => &mut state.offsets.high,
                SystemLoadLevel::Critical => &mut state.offsets.critical,
                SystemLoadLevel::Normal => unreachable!("normal carries no offset"),
            };
            *offset = (*offset + step).clamp(-bound, bound);
        }

        trace!(
            target: "sensocto-bio",
            "[HOMEOSTASIS] Sample level={} offsets=({:.3}, {:.3}, {:.3})",
            level,
            state.offsets.elevated,
            state.offsets.high,
            state.offsets.critical
        );
    }

    /// Current threshold offsets, each within [-offset_bound, offset_bound].
    pub fn get_offsets(&self) -> ThresholdOffsets {
        self.state.lock().offsets
    }

    /// The target observation distribution the tuner steers toward.
    pub fn get_target_distribution(&self) -> TargetDistribution {
        self.config.target
    }

    /// Total samples currently in the observation window.
    pub fn sample_count(&self) -> u64 {
        self.state.lock().total()
    }

    /// Drop all observations and offsets.
    pub fn reset(&self) {
        *self.state.lock() = TunerState::default();
    }
}

impl Default for HomeostaticTuner {
    fn default() -> Self {
        Self::new(HomeostasisConfig::default())
    }
}

fn level_index(level: SystemLoadLevel) -> usize {
    match level {
        SystemLoadLevel::Normal => 0,
        SystemLoadLevel::Elevated => 1,
        SystemLoadLevel::High => 2,
        SystemLoadLevel::Critical => 3,
    }
}
