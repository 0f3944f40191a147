// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Bundle wiring all seven bio components together.
//!
//! `BioSystem` owns one instance of each component behind an `Arc` so the
//! ingestion path, the admission controller and the visualization consumer
//! can each hold handles to the components they need. Combining the read
//! factors into an admission decision stays outside this crate.

use std::sync::Arc;

use tracing::info;

use crate::arbiter::{ArbiterConfig, ResourceArbiter};
use crate::circadian::{CircadianConfig, CircadianScheduler};
use crate::correlation::{CorrelationConfig, CorrelationTracker};
use crate::homeostasis::{HomeostasisConfig, HomeostaticTuner};
use crate::novelty::{NoveltyConfig, NoveltyDetector};
use crate::predictive::{PredictiveConfig, PredictiveLoadBalancer};
use crate::sync::{SyncComputer, SyncConfig};

/// Per-component configuration for the whole bio layer.
#[derive(Debug, Clone, Default)]
pub struct BioSystemConfig {
    pub novelty: NoveltyConfig,
    pub correlation: CorrelationConfig,
    pub predictive: PredictiveConfig,
    pub homeostasis: HomeostasisConfig,
    pub arbiter: ArbiterConfig,
    pub circadian: CircadianConfig,
    pub sync: SyncConfig,
}

/// Owned handles to the seven independent bio components.
///
/// The components never share state; dropping or resetting one leaves the
/// others untouched.
pub struct BioSystem {
    novelty: Arc<NoveltyDetector>,
    correlation: Arc<CorrelationTracker>,
    predictive: Arc<PredictiveLoadBalancer>,
    homeostasis: Arc<HomeostaticTuner>,
    arbiter: Arc<ResourceArbiter>,
    circadian: Arc<CircadianScheduler>,
    sync: Arc<SyncComputer>,
}

impl BioSystem {
    pub fn new(config: BioSystemConfig) -> Self {
        info!(target: "sensocto-bio", "[BIO] Starting bio layer components");
        Self {
            novelty: Arc::new(NoveltyDetector::new(config.novelty)),
            correlation: Arc::new(CorrelationTracker::new(config.correlation)),
            predictive: Arc::new(PredictiveLoadBalancer::new(config.predictive)),
            homeostasis: Arc::new(HomeostaticTuner::new(config.homeostasis)),
            arbiter: Arc::new(ResourceArbiter::new(config.arbiter)),
            circadian: Arc::new(CircadianScheduler::new(config.circadian)),
            sync: Arc::new(SyncComputer::new(config.sync)),
        }
    }

    pub fn novelty(&self) -> Arc<NoveltyDetector> {
        Arc::clone(&self.novelty)
    }

    pub fn correlation(&self) -> Arc<CorrelationTracker> {
        Arc::clone(&self.correlation)
    }

    pub fn predictive(&self) -> Arc<PredictiveLoadBalancer> {
        Arc::clone(&self.predictive)
    }

    pub fn homeostasis(&self) -> Arc<HomeostaticTuner> {
        Arc::clone(&self.homeostasis)
    }

    pub fn arbiter(&self) -> Arc<ResourceArbiter> {
        Arc::clone(&self.arbiter)
    }

    pub fn circadian(&self) -> Arc<CircadianScheduler> {
        Arc::clone(&self.circadian)
    }

    pub fn sync(&self) -> Arc<SyncComputer> {
        Arc::clone(&self.sync)
    }

    /// Reset every component to its empty learned state.
    ///
    /// Equivalent to restarting the whole layer: all learned statistics are
    /// lost, all read operations return their neutral defaults again.
    pub fn reset_all(&self) {
        self.novelty.reset();
        self.correlation.reset();
        self.predictive.reset();
        self.homeostasis.reset();
        self.arbiter.reset();
        self.circadian.reset();
        self.sync.reset();
        info!(target: "sensocto-bio", "[BIO] All components reset to defaults");
    }
}

impl Default for BioSystem {
    fn default() -> Self {
        Self::new(BioSystemConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensocto_structures::{AttentionLevel, SystemLoadLevel};

    #[test]
    fn test_components_are_independent() {
        let system = BioSystem::default();
        system.predictive().record_attention("s1", AttentionLevel::High);
        system.homeostasis().record_sample(SystemLoadLevel::Elevated);

        // Resetting one component leaves the others untouched.
        system.predictive().reset();
        assert_eq!(system.predictive().tracked_stream_count(), 0);
        assert_eq!(system.homeostasis().sample_count(), 1);
    }

    #[test]
    fn test_reset_all_restores_neutral_reads() {
        let system = BioSystem::default();
        for _ in 0..20 {
            system.correlation().record_co_access(&["a", "b"]);
            system.arbiter().record_demand("a", 5.0);
        }
        system.arbiter().reallocate();
        system.reset_all();

        assert_eq!(system.correlation().get_strength("a", "b"), 0.0);
        assert_eq!(system.arbiter().get_multiplier("a"), 1.0);
        assert_eq!(system.predictive().get_predictive_factor("a"), 1.0);
    }
}
