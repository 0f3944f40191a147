// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Novelty detection over per-(sensor, attribute) measurement streams.
//!
//! Maintains single-pass running statistics (Welford) per stream attribute
//! and scores each reported batch by how far its mean deviates from the
//! learned baseline, in units of the running standard deviation. Scores are
//! computed against the statistics as they were *before* the batch is
//! folded in, so a deviant batch is measured against the baseline it
//! deviates from.

use std::collections::VecDeque;
use std::time::Instant;

use ahash::AHashMap;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use sensocto_structures::{numeric_payload, Measurement};

/// Variance below this is treated as degenerate (score 0.0, no division).
const VARIANCE_EPSILON: f64 = 1e-12;

/// Novelty detector configuration
#[derive(Debug, Clone)]
pub struct NoveltyConfig {
    /// Hard cap on tracked (sensor, attribute) keys; least-recently-updated
    /// entries are evicted past this point.
    pub max_tracked_attributes: usize,

    /// Capacity of the recent high-score event ring.
    pub recent_events_capacity: usize,

    /// Batches scoring at or above this land in the recent-event ring.
    pub event_score_threshold: f64,

    /// Minimum folded samples before `get_stats` exposes the statistics.
    pub min_samples_for_stats: u64,
}

impl Default for NoveltyConfig {
    fn default() -> Self {
        Self {
            max_tracked_attributes: 10_000,
            recent_events_capacity: 256,
            event_score_threshold: 3.0,
            min_samples_for_stats: 10,
        }
    }
}

/// Snapshot of the running statistics for one (sensor, attribute) key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WelfordStats {
    pub count: u64,
    pub mean: f64,
    pub m2: f64,
}

impl WelfordStats {
    /// Sample variance `m2 / (count - 1)`, or 0.0 when degenerate.
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            return 0.0;
        }
        self.m2 / (self.count - 1) as f64
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }
}

/// A recent high-novelty observation, kept for observability only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoveltyEvent {
    pub sensor_id: String,
    pub attribute_id: String,
    pub score: f64,
    pub batch_mean: f64,
    pub running_mean: f64,
    /// Unix timestamp in milliseconds at detection time.
    pub detected_at: i64,
}

/// Per-key learned state.
#[derive(Debug, Clone)]
struct AttributeState {
    count: u64,
    mean: f64,
    m2: f64,
    last_score: f64,
    last_update: Instant,
}

impl AttributeState {
    fn new(now: Instant) -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            last_score: 0.0,
            last_update: now,
        }
    }
}

/// Single-step Welford fold: `(count, mean, m2) × value → (count', mean', m2')`.
///
/// Sample variance of the folded sequence is `m2 / (count - 1)`.
pub fn welford_fold(count: u64, mean: f64, m2: f64, value: f64) -> (u64, f64, f64) {
    let count = count + 1;
    let delta = value - mean;
    let mean = mean + delta / count as f64;
    let m2 = m2 + delta * (value - mean);
    (count, mean, m2)
}

/// Per-(sensor, attribute) anomaly scorer.
///
/// All operations take `&self`; writes hold a short exclusive lock over the
/// stats table, reads hold a shared lock. Unknown keys score 0.0.
pub struct NoveltyDetector {
    config: NoveltyConfig,
    stats: RwLock<AHashMap<(String, String), AttributeState>>,
    recent_events: Mutex<VecDeque<NoveltyEvent>>,
}

impl NoveltyDetector {
    pub fn new(config: NoveltyConfig) -> Self {
        let recent_capacity = config.recent_events_capacity;
        Self {
            config,
            stats: RwLock::new(AHashMap::new()),
            recent_events: Mutex::new(VecDeque::with_capacity(recent_capacity)),
        }
    }

    /// Fold a reported measurement batch into the running statistics.
    ///
    /// Fire-and-forget: malformed entries are skipped silently and the call
    /// never fails. An empty (or fully malformed) batch is a no-op.
    pub fn report_batch(&self, sensor_id: &str, attribute_id: &str, batch: &[Measurement]) {
        let values: Vec<f64> = batch
            .iter()
            .filter_map(|m| numeric_payload(&m.payload))
            .collect();
        if values.is_empty() {
            return;
        }
        let batch_mean = values.iter().sum::<f64>() / values.len() as f64;

        let now = Instant::now();
        let key = (sensor_id.to_string(), attribute_id.to_string());
        let mut event = None;

        {
            let mut stats = self.stats.write();
            if !stats.contains_key(&key) && stats.len() >= self.config.max_tracked_attributes {
                evict_least_recent(&mut stats);
            }
            let state = stats.entry(key).or_insert_with(|| AttributeState::new(now));

            // Score against the pre-batch baseline.
            let prior = WelfordStats {
                count: state.count,
                mean: state.mean,
                m2: state.m2,
            };
            let score = batch_score(&prior, batch_mean);

            for value in &values {
                let (count, mean, m2) = welford_fold(state.count, state.mean, state.m2, *value);
                state.count = count;
                state.mean = mean;
                state.m2 = m2;
            }
            state.last_score = score;
            state.last_update = now;

            if score >= self.config.event_score_threshold {
                event = Some(NoveltyEvent {
                    sensor_id: sensor_id.to_string(),
                    attribute_id: attribute_id.to_string(),
                    score,
                    batch_mean,
                    running_mean: prior.mean,
                    detected_at: chrono::Utc::now().timestamp_millis(),
                });
            }
        }

        if let Some(event) = event {
            debug!(
                target: "sensocto-bio",
                "[NOVELTY] High-novelty batch sensor={} attribute={} score={:.2}",
                event.sensor_id,
                event.attribute_id,
                event.score
            );
            let mut ring = self.recent_events.lock();
            if ring.len() >= self.config.recent_events_capacity {
                ring.pop_front();
            }
            ring.push_back(event);
        } else {
            trace!(
                target: "sensocto-bio",
                "[NOVELTY] Batch folded sensor={} attribute={} values={}",
                sensor_id,
                attribute_id,
                values.len()
            );
        }
    }

    /// Novelty score of the most recent batch for this key.
    ///
    /// 0.0 for unknown keys, for keys with fewer than two folded samples,
    /// and for degenerate (zero-variance) baselines.
    pub fn get_novelty_score(&self, sensor_id: &str, attribute_id: &str) -> f64 {
        let key = (sensor_id.to_string(), attribute_id.to_string());
        let stats = self.stats.read();
        match stats.get(&key) {
            Some(state) if state.count >= 2 => state.last_score,
            _ => 0.0,
        }
    }

    /// Running statistics for this key, once enough samples exist.
    pub fn get_stats(&self, sensor_id: &str, attribute_id: &str) -> Option<WelfordStats> {
        let key = (sensor_id.to_string(), attribute_id.to_string());
        let stats = self.stats.read();
        stats
            .get(&key)
            .filter(|s| s.count >= self.config.min_samples_for_stats)
            .map(|s| WelfordStats {
                count: s.count,
                mean: s.mean,
                m2: s.m2,
            })
    }

    /// Recent high-score events, oldest first.
    pub fn get_recent_events(&self) -> Vec<NoveltyEvent> {
        self.recent_events.lock().iter().cloned().collect()
    }

    /// Number of (sensor, attribute) keys currently tracked.
    pub fn tracked_attribute_count(&self) -> usize {
        self.stats.read().len()
    }

    /// Drop all learned state, returning the detector to its initial state.
    pub fn reset(&self) {
        self.stats.write().clear();
        self.recent_events.lock().clear();
    }
}

impl Default for NoveltyDetector {
    fn default() -> Self {
        Self::new(NoveltyConfig::default())
    }
}

/// Z-score-like magnitude of a batch mean against the prior baseline.
fn batch_score(prior: &WelfordStats, batch_mean: f64) -> f64 {
    if prior.count < 2 {
        return 0.0;
    }
    let variance = prior.variance();
    if variance <= VARIANCE_EPSILON {
        return 0.0;
    }
    let score = (batch_mean - prior.mean).abs() / variance.sqrt();
    if score.is_finite() {
        score
    } else {
        0.0
    }
}

fn evict_least_recent(stats: &mut AHashMap<(String, String), AttributeState>) {
    let oldest = stats
        .iter()
        .min_by_key(|(_, state)| state.last_update)
        .map(|(key, _)| key.clone());
    if let Some(key) = oldest {
        trace!(
            target: "sensocto-bio",
            "[NOVELTY] Evicting least-recently-updated key ({}, {})",
            key.0,
            key.1
        );
        stats.remove(&key);
    }
}
