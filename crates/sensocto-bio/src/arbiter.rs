// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Competitive multiplicative budget allocation across streams.
//!
//! Streams accumulate a smoothed demand signal; `reallocate()` runs a
//! proportional-fair pass `multiplier = n · demand / Σ demand` over the
//! known set, clamped to [0.5, 5.0], so the mean multiplier stays near 1.0
//! and higher demand always wins a larger share. Reallocation is serialized
//! internally - overlapping calls return immediately without corrupting
//! state - and never blocks concurrent record/read traffic for longer than
//! a map swap.

use std::time::{Duration, Instant};

use ahash::AHashMap;
use parking_lot::{Mutex, RwLock};
use rayon::prelude::*;
use tracing::{debug, trace};

pub const MULTIPLIER_FLOOR: f64 = 0.5;
pub const MULTIPLIER_CEIL: f64 = 5.0;

/// Resource arbiter configuration
#[derive(Debug, Clone)]
pub struct ArbiterConfig {
    /// EMA step for the per-stream demand signal.
    pub demand_smoothing: f64,

    /// Demand entries not refreshed within this window are dropped during
    /// reallocation.
    pub demand_ttl: Duration,

    /// Hard cap on tracked streams; least-recently-updated evicted.
    pub max_tracked_streams: usize,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            demand_smoothing: 0.3,
            demand_ttl: Duration::from_secs(600),
            max_tracked_streams: 10_000,
        }
    }
}

#[derive(Debug, Clone)]
struct DemandEntry {
    demand: f64,
    last_update: Instant,
}

/// Proportional-fair budget allocator.
///
/// Unknown streams always get multiplier 1.0; all multipliers are clamped
/// to [0.5, 5.0].
pub struct ResourceArbiter {
    config: ArbiterConfig,
    demands: RwLock<AHashMap<String, DemandEntry>>,
    allocations: RwLock<AHashMap<String, f64>>,
    realloc_guard: Mutex<()>,
}

impl ResourceArbiter {
    pub fn new(config: ArbiterConfig) -> Self {
        Self {
            config,
            demands: RwLock::new(AHashMap::new()),
            allocations: RwLock::new(AHashMap::new()),
            realloc_guard: Mutex::new(()),
        }
    }

    /// Fold an observed demand signal for a stream (fire-and-forget).
    ///
    /// Negative demand is treated as zero. The signal is whatever the
    /// admission controller derives from its other reads (novelty scores,
    /// predictive factors, subscriber counts).
    pub fn record_demand(&self, stream_id: &str, demand: f64) {
        let demand = demand.max(0.0);
        let now = Instant::now();
        let alpha = self.config.demand_smoothing;
        let mut demands = self.demands.write();

        if !demands.contains_key(stream_id) && demands.len() >= self.config.max_tracked_streams {
            evict_least_recent(&mut demands);
        }
        let entry = demands.entry(stream_id.to_string()).or_insert(DemandEntry {
            demand: 0.0,
            last_update: now,
        });
        entry.demand = alpha * demand + (1.0 - alpha) * entry.demand;
        entry.last_update = now;
    }

    /// Recompute all multipliers competitively.
    ///
    /// Returns immediately. If a reallocation is already in flight the call
    /// is a successful no-op; with no known streams (or zero total demand)
    /// the current allocations are left untouched.
    pub fn reallocate(&self) {
        // Overlapping invocations must not corrupt state: only one pass runs.
        let Some(_guard) = self.realloc_guard.try_lock() else {
            trace!(target: "sensocto-bio", "[ARBITER] Reallocation already in flight, skipping");
            return;
        };

        let now = Instant::now();
        let ttl = self.config.demand_ttl;
        let snapshot: Vec<(String, f64)> = {
            let mut demands = self.demands.write();
            demands.retain(|_, entry| now.duration_since(entry.last_update) <= ttl);
            demands
                .iter()
                .map(|(id, entry)| (id.clone(), entry.demand))
                .collect()
        };

        if snapshot.is_empty() {
            trace!(target: "sensocto-bio", "[ARBITER] No known streams, reallocation is a no-op");
            return;
        }

        let total: f64 = snapshot.par_iter().map(|(_, demand)| demand).sum();
        let count = snapshot.len() as f64;
        let next: AHashMap<String, f64> = if total <= f64::EPSILON {
            // Nobody is asking for anything: everyone is average.
            snapshot.into_iter().map(|(id, _)| (id, 1.0)).collect()
        } else {
            let shares: Vec<(String, f64)> = snapshot
                .into_par_iter()
                .map(|(id, demand)| {
                    let share = (count * demand / total).clamp(MULTIPLIER_FLOOR, MULTIPLIER_CEIL);
                    (id, share)
                })
                .collect();
            shares.into_iter().collect()
        };

        let stream_count = next.len();
        *self.allocations.write() = next;
        debug!(
            target: "sensocto-bio",
            "[ARBITER] Reallocated budget across {} streams",
            stream_count
        );
    }

    /// Current budget multiplier for a stream; 1.0 for unknown streams.
    pub fn get_multiplier(&self, stream_id: &str) -> f64 {
        self.allocations
            .read()
            .get(stream_id)
            .copied()
            .unwrap_or(1.0)
    }

    /// Full allocation snapshot.
    pub fn get_allocations(&self) -> AHashMap<String, f64> {
        self.allocations.read().clone()
    }

    /// Number of streams with a live demand signal.
    pub fn tracked_stream_count(&self) -> usize {
        self.demands.read().len()
    }

    /// Drop all demand signals and allocations.
    pub fn reset(&self) {
        self.demands.write().clear();
        self.allocations.write().clear();
    }
}

impl Default for ResourceArbiter {
    fn default() -> Self {
        Self::new(ArbiterConfig::default())
    }
}

fn evict_least_recent(demands: &mut AHashMap<String, DemandEntry>) {
    let oldest = demands
        .iter()
        .min_by_key(|(_, entry)| entry.last_update)
        .map(|(id, _)| id.clone());
    if let Some(id) = oldest {
        demands.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_stream_gets_neutral_multiplier() {
        let arbiter = ResourceArbiter::default();
        assert_eq!(arbiter.get_multiplier("ghost"), 1.0);
    }

    #[test]
    fn test_reallocate_with_no_streams_is_a_noop() {
        let arbiter = ResourceArbiter::default();
        arbiter.reallocate();
        assert!(arbiter.get_allocations().is_empty());
        assert_eq!(arbiter.get_multiplier("anything"), 1.0);
    }

    #[test]
    fn test_uniform_demand_allocates_evenly() {
        let arbiter = ResourceArbiter::default();
        for id in ["a", "b", "c", "d"] {
            for _ in 0..10 {
                arbiter.record_demand(id, 2.0);
            }
        }
        arbiter.reallocate();
        for id in ["a", "b", "c", "d"] {
            assert!((arbiter.get_multiplier(id) - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_higher_demand_wins_larger_multiplier() {
        let arbiter = ResourceArbiter::default();
        for _ in 0..10 {
            arbiter.record_demand("hungry", 10.0);
            arbiter.record_demand("modest", 1.0);
        }
        arbiter.reallocate();
        let hungry = arbiter.get_multiplier("hungry");
        let modest = arbiter.get_multiplier("modest");
        assert!(hungry > modest);
        for value in [hungry, modest] {
            assert!((MULTIPLIER_FLOOR..=MULTIPLIER_CEIL).contains(&value));
        }
    }

    #[test]
    fn test_multipliers_always_bounded() {
        let arbiter = ResourceArbiter::default();
        // One stream hoarding nearly all demand against many idle peers.
        for _ in 0..10 {
            arbiter.record_demand("whale", 1_000.0);
        }
        for i in 0..50 {
            arbiter.record_demand(&format!("s{i}"), 0.001);
        }
        arbiter.reallocate();
        for (_, multiplier) in arbiter.get_allocations() {
            assert!((MULTIPLIER_FLOOR..=MULTIPLIER_CEIL).contains(&multiplier));
        }
        assert!((arbiter.get_multiplier("whale") - MULTIPLIER_CEIL).abs() < 1e-9);
    }

    #[test]
    fn test_zero_demand_everywhere_means_everyone_average() {
        let arbiter = ResourceArbiter::default();
        arbiter.record_demand("a", 0.0);
        arbiter.record_demand("b", 0.0);
        arbiter.reallocate();
        assert_eq!(arbiter.get_multiplier("a"), 1.0);
        assert_eq!(arbiter.get_multiplier("b"), 1.0);
    }

    #[test]
    fn test_repeated_reallocation_is_stable() {
        let arbiter = ResourceArbiter::default();
        for _ in 0..5 {
            arbiter.record_demand("a", 4.0);
            arbiter.record_demand("b", 1.0);
        }
        arbiter.reallocate();
        let first = arbiter.get_multiplier("a");
        arbiter.reallocate();
        arbiter.reallocate();
        assert!((arbiter.get_multiplier("a") - first).abs() < 1e-9);
    }

    #[test]
    fn test_demand_table_respects_cap() {
        let config = ArbiterConfig {
            max_tracked_streams: 8,
            ..ArbiterConfig::default()
        };
        let arbiter = ResourceArbiter::new(config);
        for i in 0..40 {
            arbiter.record_demand(&format!("s{i}"), 1.0);
        }
        assert!(arbiter.tracked_stream_count() <= 8);
    }

    #[test]
    fn test_reset_clears_state() {
        let arbiter = ResourceArbiter::default();
        arbiter.record_demand("a", 5.0);
        arbiter.reallocate();
        arbiter.reset();
        assert_eq!(arbiter.tracked_stream_count(), 0);
        assert_eq!(arbiter.get_multiplier("a"), 1.0);
    }
}
