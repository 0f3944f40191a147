// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Viewer-gated cross-stream phase synchrony.
//!
//! Producers push per-signal phase samples; while at least one viewer is
//! registered a periodic tick computes the Kuramoto order parameter
//! `r = |mean(e^{iθ})|` over the tracked sensors of each signal and
//! exponentially smooths it. With no viewers the computer is fully idle:
//! the tick thread is stopped and incoming samples are dropped at the door.
//!
//! This is the only bio component with background work; the gate is an
//! explicit reference count driving an `{idle, active}` state machine,
//! started on the idle→active transition and stopped on active→idle.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use ahash::{AHashMap, AHashSet};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use sensocto_structures::SyncSignal;

/// Granularity of the shutdown-flag poll inside the tick sleep.
const SHUTDOWN_POLL: Duration = Duration::from_millis(25);

/// Synchrony computer configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Interval between synchrony recomputations while active.
    pub tick_interval: Duration,

    /// Fixed capacity of each per-(signal, sensor) phase ring.
    pub phase_buffer_capacity: usize,

    /// Exponential smoothing factor for the order parameter.
    pub smoothing_alpha: f64,

    /// Sensors without a phase sample within this window are dropped.
    pub sensor_ttl: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(250),
            phase_buffer_capacity: 64,
            smoothing_alpha: 0.3,
            sensor_ttl: Duration::from_secs(30),
        }
    }
}

#[derive(Debug)]
struct PhaseRing {
    phases: VecDeque<f64>,
    last_update: Instant,
}

/// Externally visible snapshot of the synchrony state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncStateSnapshot {
    pub tracked_sensors: Vec<String>,
    pub viewer_count: usize,
    pub active: bool,
    pub breathing: f64,
    pub hrv: f64,
    pub rsa: f64,
}

/// State shared with the tick thread.
struct SyncShared {
    config: SyncConfig,
    running: AtomicBool,
    buffers: RwLock<AHashMap<SyncSignal, AHashMap<String, PhaseRing>>>,
    smoothed: RwLock<AHashMap<SyncSignal, f64>>,
}

/// Demand-gated synchrony aggregator.
pub struct SyncComputer {
    shared: Arc<SyncShared>,
    viewer_count: Mutex<usize>,
    thread_handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl SyncComputer {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            shared: Arc::new(SyncShared {
                config,
                running: AtomicBool::new(false),
                buffers: RwLock::new(AHashMap::new()),
                smoothed: RwLock::new(AHashMap::new()),
            }),
            viewer_count: Mutex::new(0),
            thread_handle: Mutex::new(None),
        }
    }

    /// Register a visualization viewer; idle→active starts the tick loop.
    pub fn register_viewer(&self) {
        let mut count = self.viewer_count.lock();
        *count += 1;
        if *count == 1 {
            self.start_tick_loop();
        }
        debug!(target: "sensocto-bio", "[SYNC] Viewer registered (count={})", *count);
    }

    /// Unregister a viewer; the count never goes negative, and the last
    /// viewer leaving suspends all synchrony work.
    pub fn unregister_viewer(&self) {
        let mut count = self.viewer_count.lock();
        if *count == 0 {
            return;
        }
        *count -= 1;
        if *count == 0 {
            self.stop_tick_loop();
        }
        debug!(target: "sensocto-bio", "[SYNC] Viewer unregistered (count={})", *count);
    }

    /// Push a phase sample (radians) for a sensor's signal channel.
    ///
    /// Dropped silently while idle: no viewers means no work, not even
    /// buffering.
    pub fn record_phase(&self, sensor_id: &str, signal: SyncSignal, phase: f64) {
        if !self.shared.running.load(Ordering::Acquire) {
            trace!(
                target: "sensocto-bio",
                "[SYNC] Dropping phase sample while idle (sensor={})",
                sensor_id
            );
            return;
        }
        if !phase.is_finite() {
            return;
        }
        let capacity = self.shared.config.phase_buffer_capacity;
        let now = Instant::now();
        let mut buffers = self.shared.buffers.write();
        let ring = buffers
            .entry(signal)
            .or_default()
            .entry(sensor_id.to_string())
            .or_insert_with(|| PhaseRing {
                phases: VecDeque::with_capacity(capacity),
                last_update: now,
            });
        if ring.phases.len() >= capacity {
            ring.phases.pop_front();
        }
        ring.phases.push_back(phase);
        ring.last_update = now;
    }

    /// Smoothed order-parameter magnitude for a signal, always in [0, 1].
    pub fn get_sync(&self, signal: SyncSignal) -> f64 {
        self.shared
            .smoothed
            .read()
            .get(&signal)
            .copied()
            .unwrap_or(0.0)
            .clamp(0.0, 1.0)
    }

    /// Number of distinct sensors currently tracked across all signals.
    pub fn tracked_sensor_count(&self) -> usize {
        let buffers = self.shared.buffers.read();
        let mut sensors: AHashSet<&str> = AHashSet::new();
        for per_signal in buffers.values() {
            for sensor_id in per_signal.keys() {
                sensors.insert(sensor_id.as_str());
            }
        }
        sensors.len()
    }

    /// Current number of registered viewers.
    pub fn viewer_count(&self) -> usize {
        *self.viewer_count.lock()
    }

    /// Whether the periodic computation is currently running.
    pub fn is_active(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Full state snapshot for the visualization consumer.
    pub fn get_state(&self) -> SyncStateSnapshot {
        let mut tracked: Vec<String> = {
            let buffers = self.shared.buffers.read();
            let mut sensors: AHashSet<String> = AHashSet::new();
            for per_signal in buffers.values() {
                sensors.extend(per_signal.keys().cloned());
            }
            sensors.into_iter().collect()
        };
        tracked.sort();
        SyncStateSnapshot {
            tracked_sensors: tracked,
            viewer_count: *self.viewer_count.lock(),
            active: self.is_active(),
            breathing: self.get_sync(SyncSignal::Breathing),
            hrv: self.get_sync(SyncSignal::Hrv),
            rsa: self.get_sync(SyncSignal::Rsa),
        }
    }

    /// Drop all phase buffers and smoothed values. Viewer registrations are
    /// owned by the consumers and survive a reset.
    pub fn reset(&self) {
        self.shared.buffers.write().clear();
        self.shared.smoothed.write().clear();
    }

    fn start_tick_loop(&self) {
        self.shared.running.store(true, Ordering::Release);
        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name("sensocto-sync-loop".to_string())
            .spawn(move || sync_loop(shared));
        match spawned {
            Ok(handle) => {
                *self.thread_handle.lock() = Some(handle);
                debug!(target: "sensocto-bio", "[SYNC] Tick loop started");
            }
            Err(e) => {
                self.shared.running.store(false, Ordering::Release);
                warn!(target: "sensocto-bio", "[SYNC] Failed to spawn tick loop: {}", e);
            }
        }
    }

    fn stop_tick_loop(&self) {
        self.shared.running.store(false, Ordering::Release);
        if let Some(handle) = self.thread_handle.lock().take() {
            if handle.join().is_err() {
                warn!(target: "sensocto-bio", "[SYNC] Tick loop thread panicked during shutdown");
            }
        }
        debug!(target: "sensocto-bio", "[SYNC] Tick loop suspended (no viewers)");
    }
}

impl Default for SyncComputer {
    fn default() -> Self {
        Self::new(SyncConfig::default())
    }
}

impl Drop for SyncComputer {
    fn drop(&mut self) {
        self.shared.running.store(false, Ordering::Release);
        if let Some(handle) = self.thread_handle.lock().take() {
            let _ = handle.join();
        }
    }
}

/// Periodic recomputation loop (runs only while viewers are registered).
fn sync_loop(shared: Arc<SyncShared>) {
    while shared.running.load(Ordering::Acquire) {
        compute_tick(&shared);

        // Sleep in short slices so active→idle is honored promptly.
        let mut remaining = shared.config.tick_interval;
        while shared.running.load(Ordering::Acquire) && remaining > Duration::ZERO {
            let slice = remaining.min(SHUTDOWN_POLL);
            thread::sleep(slice);
            remaining = remaining.saturating_sub(slice);
        }
    }
}

/// One synchrony recomputation: prune stale sensors, compute the order
/// parameter per signal, fold into the smoothed value.
fn compute_tick(shared: &SyncShared) {
    let ttl = shared.config.sensor_ttl;
    let alpha = shared.config.smoothing_alpha;
    let now = Instant::now();

    let mut order: AHashMap<SyncSignal, Option<f64>> = AHashMap::new();
    {
        let mut buffers = shared.buffers.write();
        for signal in SyncSignal::ALL {
            let Some(per_signal) = buffers.get_mut(&signal) else {
                order.insert(signal, None);
                continue;
            };
            per_signal.retain(|_, ring| now.duration_since(ring.last_update) <= ttl);
            order.insert(signal, order_parameter(per_signal));
        }
    }

    let mut smoothed = shared.smoothed.write();
    for signal in SyncSignal::ALL {
        let previous = smoothed.get(&signal).copied().unwrap_or(0.0);
        let next = match order.get(&signal).copied().flatten() {
            Some(r) => alpha * r + (1.0 - alpha) * previous,
            // No tracked sensors: decay toward zero.
            None => (1.0 - alpha) * previous,
        };
        smoothed.insert(signal, next.clamp(0.0, 1.0));
    }
    trace!(target: "sensocto-bio", "[SYNC] Tick complete");
}

/// Kuramoto order parameter `r = |mean(e^{iθ})|` over the latest phase of
/// each tracked sensor. `None` when no sensor has any phase.
fn order_parameter(per_signal: &AHashMap<String, PhaseRing>) -> Option<f64> {
    let mut sum_cos = 0.0;
    let mut sum_sin = 0.0;
    let mut n = 0usize;
    for ring in per_signal.values() {
        if let Some(theta) = ring.phases.back() {
            sum_cos += theta.cos();
            sum_sin += theta.sin();
            n += 1;
        }
    }
    if n == 0 {
        return None;
    }
    let mean_cos = sum_cos / n as f64;
    let mean_sin = sum_sin / n as f64;
    Some((mean_cos * mean_cos + mean_sin * mean_sin).sqrt())
}
