// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `sensocto_configuration.toml`. Every field has a compiled-in default so
//! a missing file or section never prevents startup.

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SensoctoConfig {
    pub system: SystemConfig,
    pub bio: BioConfig,
    pub logging: LoggingConfig,
}

/// System-level configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SystemConfig {
    pub max_cores: usize,
    pub debug: bool,
    pub log_level: String,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            max_cores: 0, // 0 = auto-detect
            debug: false,
            log_level: "INFO".to_string(),
        }
    }
}

/// Bio layer configuration, one section per component
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct BioConfig {
    pub novelty: NoveltySection,
    pub correlation: CorrelationSection,
    pub predictive: PredictiveSection,
    pub homeostasis: HomeostasisSection,
    pub arbiter: ArbiterSection,
    pub circadian: CircadianSection,
    pub sync: SyncSection,
}

/// Novelty detector tunables
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NoveltySection {
    pub max_tracked_attributes: usize,
    pub recent_events_capacity: usize,
    pub event_score_threshold: f64,
    pub min_samples_for_stats: u64,
}

impl Default for NoveltySection {
    fn default() -> Self {
        Self {
            max_tracked_attributes: 10_000,
            recent_events_capacity: 256,
            event_score_threshold: 3.0,
            min_samples_for_stats: 10,
        }
    }
}

/// Correlation tracker tunables
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorrelationSection {
    pub learning_rate: f64,
    pub correlation_threshold: f64,
    pub max_edges: usize,
    pub edge_ttl_secs: u64,
}

impl Default for CorrelationSection {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            correlation_threshold: 0.3,
            max_edges: 50_000,
            edge_ttl_secs: 3600,
        }
    }
}

/// Predictive load balancer tunables
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PredictiveSection {
    pub hourly_smoothing: f64,
    pub recent_window: usize,
    pub min_samples: u64,
    pub max_tracked_streams: usize,
    pub prediction_gain: f64,
}

impl Default for PredictiveSection {
    fn default() -> Self {
        Self {
            hourly_smoothing: 0.25,
            recent_window: 16,
            min_samples: 12,
            max_tracked_streams: 10_000,
            prediction_gain: 0.45,
        }
    }
}

/// Homeostatic tuner tunables
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HomeostasisSection {
    pub proportional_gain: f64,
    pub offset_bound: f64,
    pub observation_window: u64,
    pub target_normal: f64,
    pub target_elevated: f64,
    pub target_high: f64,
    pub target_critical: f64,
}

impl Default for HomeostasisSection {
    fn default() -> Self {
        Self {
            proportional_gain: 0.02,
            offset_bound: 0.3,
            observation_window: 10_000,
            target_normal: 0.70,
            target_elevated: 0.20,
            target_high: 0.08,
            target_critical: 0.02,
        }
    }
}

/// Resource arbiter tunables
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ArbiterSection {
    pub demand_smoothing: f64,
    pub demand_ttl_secs: u64,
    pub max_tracked_streams: usize,
}

impl Default for ArbiterSection {
    fn default() -> Self {
        Self {
            demand_smoothing: 0.3,
            demand_ttl_secs: 600,
            max_tracked_streams: 10_000,
        }
    }
}

/// Circadian scheduler tunables
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CircadianSection {
    pub smoothing: f64,
    pub peak_band: f64,
    pub trough_band: f64,
    pub slope_epsilon: f64,
}

impl Default for CircadianSection {
    fn default() -> Self {
        Self {
            smoothing: 0.2,
            peak_band: 0.85,
            trough_band: 0.15,
            slope_epsilon: 0.02,
        }
    }
}

/// Synchrony computer tunables
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SyncSection {
    pub tick_interval_ms: u64,
    pub phase_buffer_capacity: usize,
    pub smoothing_alpha: f64,
    pub sensor_ttl_secs: u64,
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            tick_interval_ms: 250,
            phase_buffer_capacity: 64,
            smoothing_alpha: 0.3,
            sensor_ttl_secs: 30,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_dir: String,
    pub retention_days: u64,
    pub retention_runs: usize,
    pub file_logging: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "./logs".to_string(),
            retention_days: 30,
            retention_runs: 10,
            file_logging: false,
        }
    }
}
