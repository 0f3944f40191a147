// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Sensocto Bio Layer
//!
//! Adaptive attention-allocation control for high-rate sensor streams.
//!
//! Seven independent components observe stream activity and system load and
//! expose bounded multiplicative factors. An external admission controller
//! combines the read factors (typically by multiplication) into one
//! per-stream throttling decision; this crate never makes that decision
//! itself.
//!
//! ## Components
//! - [`NoveltyDetector`] - per-(sensor, attribute) anomaly scoring via
//!   incremental mean/variance
//! - [`CorrelationTracker`] - pairwise co-activity affinity graph
//! - [`PredictiveLoadBalancer`] - per-stream temporal attention forecasting
//! - [`HomeostaticTuner`] - self-tuning load-threshold offsets
//! - [`ResourceArbiter`] - competitive multiplicative budget allocation
//! - [`CircadianScheduler`] - time-of-day load shaping and phase classification
//! - [`SyncComputer`] - viewer-gated cross-stream phase synchrony
//!
//! ## Contracts
//! - Every record/report operation is fire-and-forget: O(1) critical
//!   section, no blocking, no errors surfaced to the producer.
//! - Every read returns a documented neutral default for unknown keys and
//!   stays within its documented bound regardless of input history.
//! - Components share no state with each other; each is independently
//!   resettable to its empty learned state.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod arbiter;
pub mod circadian;
pub mod correlation;
pub mod homeostasis;
pub mod novelty;
pub mod predictive;
pub mod sync;
pub mod system;

pub use arbiter::{ArbiterConfig, ResourceArbiter};
pub use circadian::{CircadianConfig, CircadianScheduler};
pub use correlation::{CorrelatedPeer, CorrelationConfig, CorrelationTracker};
pub use homeostasis::{HomeostasisConfig, HomeostaticTuner, TargetDistribution, ThresholdOffsets};
pub use novelty::{NoveltyConfig, NoveltyDetector, NoveltyEvent, WelfordStats};
pub use predictive::{AttentionPattern, PredictiveConfig, PredictiveLoadBalancer};
pub use sync::{SyncComputer, SyncConfig, SyncStateSnapshot};
pub use system::{BioSystem, BioSystemConfig};
