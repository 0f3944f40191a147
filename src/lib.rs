// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Sensocto - Adaptive Attention-Allocation Core
//!
//! Sensocto ingests continuous measurement streams from many concurrently
//! connected sensors. Under load, the platform must decide per stream how
//! much processing/sampling attention to grant. This umbrella crate
//! re-exports the bio layer - the adaptive control components behind that
//! decision - together with its configuration and observability
//! infrastructure.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! sensocto = "0.3"
//! ```
//!
//! ```rust,no_run
//! use sensocto::prelude::*;
//!
//! // Load configuration (falls back to compiled-in defaults) and start
//! // the bio layer.
//! let config = sensocto::config::load_config(None)?;
//! let bio = sensocto::bio_system_from_config(&config);
//!
//! // Producers report activity, fire-and-forget.
//! bio.predictive().record_attention("sensor-1", AttentionLevel::High);
//! bio.homeostasis().record_sample(SystemLoadLevel::Normal);
//!
//! // The admission controller combines the bounded read factors.
//! let factor = bio.predictive().get_predictive_factor("sensor-1")
//!     * bio.arbiter().get_multiplier("sensor-1")
//!     * bio.circadian().get_phase_adjustment();
//! # let _ = factor;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Crate Map
//! - [`bio`] - the seven attention-allocation components
//! - [`structures`] - shared level enums and measurement types
//! - [`config`] - TOML configuration loader
//! - [`observability`] - tracing initialization

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use sensocto_bio as bio;
pub use sensocto_config as config;
pub use sensocto_observability as observability;
pub use sensocto_structures as structures;

use sensocto_bio::arbiter::ArbiterConfig;
use sensocto_bio::circadian::CircadianConfig;
use sensocto_bio::correlation::CorrelationConfig;
use sensocto_bio::homeostasis::{HomeostasisConfig, TargetDistribution};
use sensocto_bio::novelty::NoveltyConfig;
use sensocto_bio::predictive::PredictiveConfig;
use sensocto_bio::sync::SyncConfig;
use sensocto_bio::{BioSystem, BioSystemConfig};
use sensocto_config::SensoctoConfig;
use std::time::Duration;

/// Build a [`BioSystem`] from a loaded platform configuration.
///
/// Maps each `[bio.*]` TOML section onto the corresponding component
/// config; sections absent from the file keep their compiled-in defaults.
pub fn bio_system_from_config(config: &SensoctoConfig) -> BioSystem {
    let bio = &config.bio;
    BioSystem::new(BioSystemConfig {
        novelty: NoveltyConfig {
            max_tracked_attributes: bio.novelty.max_tracked_attributes,
            recent_events_capacity: bio.novelty.recent_events_capacity,
            event_score_threshold: bio.novelty.event_score_threshold,
            min_samples_for_stats: bio.novelty.min_samples_for_stats,
        },
        correlation: CorrelationConfig {
            learning_rate: bio.correlation.learning_rate,
            correlation_threshold: bio.correlation.correlation_threshold,
            max_edges: bio.correlation.max_edges,
            edge_ttl: Duration::from_secs(bio.correlation.edge_ttl_secs),
        },
        predictive: PredictiveConfig {
            hourly_smoothing: bio.predictive.hourly_smoothing,
            recent_window: bio.predictive.recent_window,
            min_samples: bio.predictive.min_samples,
            max_tracked_streams: bio.predictive.max_tracked_streams,
            prediction_gain: bio.predictive.prediction_gain,
        },
        homeostasis: HomeostasisConfig {
            proportional_gain: bio.homeostasis.proportional_gain,
            offset_bound: bio.homeostasis.offset_bound,
            observation_window: bio.homeostasis.observation_window,
            target: TargetDistribution {
                normal: bio.homeostasis.target_normal,
                elevated: bio.homeostasis.target_elevated,
                high: bio.homeostasis.target_high,
                critical: bio.homeostasis.target_critical,
            },
        },
        arbiter: ArbiterConfig {
            demand_smoothing: bio.arbiter.demand_smoothing,
            demand_ttl: Duration::from_secs(bio.arbiter.demand_ttl_secs),
            max_tracked_streams: bio.arbiter.max_tracked_streams,
        },
        circadian: CircadianConfig {
            smoothing: bio.circadian.smoothing,
            peak_band: bio.circadian.peak_band,
            trough_band: bio.circadian.trough_band,
            slope_epsilon: bio.circadian.slope_epsilon,
        },
        sync: SyncConfig {
            tick_interval: Duration::from_millis(bio.sync.tick_interval_ms),
            phase_buffer_capacity: bio.sync.phase_buffer_capacity,
            smoothing_alpha: bio.sync.smoothing_alpha,
            sensor_ttl: Duration::from_secs(bio.sync.sensor_ttl_secs),
        },
    })
}

/// Commonly used types, for glob import.
pub mod prelude {
    pub use crate::bio_system_from_config;
    pub use sensocto_bio::{
        BioSystem, BioSystemConfig, CircadianScheduler, CorrelationTracker, HomeostaticTuner,
        NoveltyDetector, PredictiveLoadBalancer, ResourceArbiter, SyncComputer,
    };
    pub use sensocto_structures::{
        AttentionLevel, CircadianPhase, Measurement, SyncSignal, SystemLoadLevel,
    };
}
