// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-stream temporal attention forecasting.
//!
//! Each stream accumulates a 24-bucket hour-of-day attention signature
//! (EMA of the observed attention-level weights) plus a short recency
//! window. The predictive factor boosts streams whose signature predicts
//! imminent attention and discounts streams that look idle, always inside
//! [0.75, 1.2].

use std::collections::VecDeque;
use std::time::Instant;

use ahash::AHashMap;
use chrono::Timelike;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::trace;

use sensocto_structures::AttentionLevel;

pub const FACTOR_FLOOR: f64 = 0.75;
pub const FACTOR_CEIL: f64 = 1.2;

/// Predictive load balancer configuration
#[derive(Debug, Clone)]
pub struct PredictiveConfig {
    /// EMA step for the hourly signature buckets.
    pub hourly_smoothing: f64,

    /// Number of most-recent samples kept for recency weighting.
    pub recent_window: usize,

    /// Minimum recorded samples before a stream gets a non-neutral factor.
    pub min_samples: u64,

    /// Hard cap on tracked streams; least-recently-updated evicted.
    pub max_tracked_streams: usize,

    /// Gain applied to the blended deviation signal.
    pub prediction_gain: f64,
}

impl Default for PredictiveConfig {
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

/// Learned temporal signature snapshot for one stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttentionPattern {
    /// Expected attention weight per hour of day (24 buckets, [0, 1]).
    pub hourly: Vec<f64>,
    /// Total samples folded into the signature.
    pub samples: u64,
    /// Mean attention weight over the recency window.
    pub recent_mean: f64,
}

#[derive(Debug, Clone)]
struct StreamPattern {
    hourly: [f64; 24],
    samples: u64,
    recent: VecDeque<f64>,
    last_update: Instant,
}

impl StreamPattern {
    fn new(now: Instant) -> Self {
        Self {
            hourly: [0.0; 24],
            samples: 0,
            recent: VecDeque::new(),
            last_update: now,
        }
    }

    fn recent_mean(&self) -> f64 {
        if self.recent.is_empty() {
            return 0.0;
        }
        self.recent.iter().sum::<f64>() / self.recent.len() as f64
    }
}

/// Forecaster for per-stream attention demand.
///
/// Unseen streams always get factor 1.0; all factors are clamped to
/// [0.75, 1.2].
pub struct PredictiveLoadBalancer {
    config: PredictiveConfig,
    patterns: RwLock<AHashMap<String, StreamPattern>>,
}

impl PredictiveLoadBalancer {
    pub fn new(config: PredictiveConfig) -> Self {
        Self {
            config,
            patterns: RwLock::new(AHashMap::new()),
        }
    }

    /// Record an observed attention level for a stream (fire-and-forget).
    pub fn record_attention(&self, stream_id: &str, level: AttentionLevel) {
        self.record_attention_at(stream_id, level, current_hour());
    }

    pub(crate) fn record_attention_at(&self, stream_id: &str, level: AttentionLevel, hour: usize) {
        let hour = hour % 24;
        let weight = level.weight();
        let now = Instant::now();
        let mut patterns = self.patterns.write();

        if !patterns.contains_key(stream_id) && patterns.len() >= self.config.max_tracked_streams {
            evict_least_recent(&mut patterns);
        }
        let pattern = patterns
            .entry(stream_id.to_string())
            .or_insert_with(|| StreamPattern::new(now));

        let alpha = self.config.hourly_smoothing;
        pattern.hourly[hour] = alpha * weight + (1.0 - alpha) * pattern.hourly[hour];
        pattern.recent.push_back(weight);
        while pattern.recent.len() > self.config.recent_window {
            pattern.recent.pop_front();
        }
        pattern.samples += 1;
        pattern.last_update = now;

        trace!(
            target: "sensocto-bio",
            "[PREDICTIVE] Attention sample stream={} level={} hour={}",
            stream_id,
            level,
            hour
        );
    }

    /// Predictive attention factor for a stream.
    ///
    /// 1.0 for unseen streams and streams without enough history; otherwise
    /// in [0.75, 1.2], above 1.0 when the signature anticipates demand.
    pub fn get_predictive_factor(&self, stream_id: &str) -> f64 {
        self.get_predictive_factor_at(stream_id, current_hour())
    }

    pub(crate) fn get_predictive_factor_at(&self, stream_id: &str, hour: usize) -> f64 {
        let hour = hour % 24;
        let patterns = self.patterns.read();
        let Some(pattern) = patterns.get(stream_id) else {
            return 1.0;
        };
        if pattern.samples < self.config.min_samples {
            return 1.0;
        }

        let baseline = pattern.hourly.iter().sum::<f64>() / 24.0;
        // Blend the current and next hour so the factor anticipates demand
        // slightly ahead of the bucket boundary.
        let upcoming = 0.5 * pattern.hourly[hour] + 0.5 * pattern.hourly[(hour + 1) % 24];
        let recent = pattern.recent_mean();

        let signal = 0.6 * (upcoming - baseline) + 0.4 * (recent - baseline);
        (1.0 + self.config.prediction_gain * signal).clamp(FACTOR_FLOOR, FACTOR_CEIL)
    }

    /// Learned temporal signature, once enough samples exist.
    pub fn get_patterns(&self, stream_id: &str) -> Option<AttentionPattern> {
        let patterns = self.patterns.read();
        patterns
            .get(stream_id)
            .filter(|p| p.samples >= self.config.min_samples)
            .map(|p| AttentionPattern {
                hourly: p.hourly.to_vec(),
                samples: p.samples,
                recent_mean: p.recent_mean(),
            })
    }

    /// Current predictive factor for every known stream.
    pub fn get_predictions(&self) -> AHashMap<String, f64> {
        let hour = current_hour();
        let ids: Vec<String> = self.patterns.read().keys().cloned().collect();
        ids.into_iter()
            .map(|id| {
                let factor = self.get_predictive_factor_at(&id, hour);
                (id, factor)
            })
            .collect()
    }

    /// Number of streams currently tracked.
    pub fn tracked_stream_count(&self) -> usize {
        self.patterns.read().len()
    }

    /// Drop all learned signatures.
    pub fn reset(&self) {
        self.patterns.write().clear();
    }
}

impl Default for PredictiveLoadBalancer {
    fn default() -> Self {
        Self::new(PredictiveConfig::default())
    }
}

fn current_hour() -> usize {
    chrono::Utc::now().hour() as usize
}

fn evict_least_recent(patterns: &mut AHashMap<String, StreamPattern>) {
    let oldest = patterns
        .iter()
        .min_by_key(|(_, p)| p.last_update)
        .map(|(id, _)| id.clone());
    if let Some(id) = oldest {
        patterns.remove(&id);
    }
}
