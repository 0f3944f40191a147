// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for the bio layer's external contracts.
//!
//! These exercise the components the way the admission controller and the
//! visualization consumer do: through the public record/read API only, and
//! assert the documented neutral defaults and output bounds.

use serde_json::json;

use sensocto_bio::arbiter::{MULTIPLIER_CEIL, MULTIPLIER_FLOOR};
use sensocto_bio::circadian::{ADJUSTMENT_CEIL, ADJUSTMENT_FLOOR};
use sensocto_bio::predictive::{FACTOR_CEIL, FACTOR_FLOOR};
use sensocto_bio::{
    BioSystem, CorrelationTracker, HomeostaticTuner, NoveltyDetector, PredictiveLoadBalancer,
    ResourceArbiter, SyncComputer,
};
use sensocto_structures::{AttentionLevel, CircadianPhase, Measurement, SyncSignal, SystemLoadLevel};

fn numeric_batch(values: &[f64]) -> Vec<Measurement> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| Measurement::new(json!(v), i as i64))
        .collect()
}

#[test]
fn predictive_factor_neutral_for_unknown_and_always_bounded() {
    let balancer = PredictiveLoadBalancer::default();
    assert_eq!(balancer.get_predictive_factor("never-seen"), 1.0);

    for i in 0..200 {
        let level = match i % 4 {
            0 => AttentionLevel::None,
            1 => AttentionLevel::Low,
            2 => AttentionLevel::Medium,
            _ => AttentionLevel::High,
        };
        balancer.record_attention("s1", level);
        let factor = balancer.get_predictive_factor("s1");
        assert!((FACTOR_FLOOR..=FACTOR_CEIL).contains(&factor));
    }
}

#[test]
fn correlation_strength_symmetric_increasing_and_thresholded() {
    let tracker = CorrelationTracker::default();
    assert_eq!(tracker.get_strength("a", "b"), 0.0);

    let mut previous = 0.0;
    for _ in 0..10 {
        tracker.record_co_access(&["a", "b"]);
        let forward = tracker.get_strength("a", "b");
        let backward = tracker.get_strength("b", "a");
        assert_eq!(forward, backward);
        assert!(forward > previous);
        previous = forward;
    }

    let peers = tracker.get_correlated("a");
    for window in peers.windows(2) {
        assert!(window[0].strength >= window[1].strength);
    }
    for peer in &peers {
        assert!(peer.strength > 0.3);
    }
}

#[test]
fn co_access_triple_correlates_all_members() {
    let tracker = CorrelationTracker::default();
    for _ in 0..5 {
        tracker.record_co_access(&["a", "b", "c"]);
    }
    let peers = tracker.get_correlated("a");
    let ids: Vec<&str> = peers.iter().map(|p| p.peer_id.as_str()).collect();
    assert!(ids.contains(&"b"));
    assert!(ids.contains(&"c"));
}

#[test]
fn homeostatic_offsets_bounded_under_any_sample_mix() {
    let tuner = HomeostaticTuner::default();
    for _ in 0..20 {
        tuner.record_sample(SystemLoadLevel::Normal);
    }
    for _ in 0..5 {
        tuner.record_sample(SystemLoadLevel::Elevated);
    }
    let offsets = tuner.get_offsets();
    for value in [offsets.elevated, offsets.high, offsets.critical] {
        assert!((-0.3..=0.3).contains(&value));
    }

    // Hammer one level and confirm the bound still holds.
    for _ in 0..10_000 {
        tuner.record_sample(SystemLoadLevel::Critical);
    }
    let offsets = tuner.get_offsets();
    for value in [offsets.elevated, offsets.high, offsets.critical] {
        assert!((-0.3..=0.3).contains(&value));
    }
}

#[test]
fn arbiter_multiplier_neutral_for_unknown_and_always_bounded() {
    let arbiter = ResourceArbiter::default();
    assert_eq!(arbiter.get_multiplier("never-seen"), 1.0);

    for i in 0..30 {
        arbiter.record_demand(&format!("s{i}"), (i as f64) * 3.0);
    }
    arbiter.reallocate();
    for (_, multiplier) in arbiter.get_allocations() {
        assert!((MULTIPLIER_FLOOR..=MULTIPLIER_CEIL).contains(&multiplier));
    }
}

#[test]
fn circadian_phase_and_adjustment_contracts() {
    let scheduler = sensocto_bio::CircadianScheduler::default();
    assert_eq!(scheduler.get_phase(), CircadianPhase::Unknown);

    let adjustment = scheduler.get_phase_adjustment();
    assert!((ADJUSTMENT_FLOOR..=ADJUSTMENT_CEIL).contains(&adjustment));

    let profile = scheduler.get_profile();
    assert_eq!(profile.len(), 24);
    for hour in 0u8..24 {
        assert!((0.0..=1.0).contains(&profile[&hour]));
    }
    let day = (profile[&9] + profile[&10] + profile[&14]) / 3.0;
    let night = (profile[&2] + profile[&3] + profile[&4]) / 3.0;
    assert!(day > night);

    scheduler.record_load(SystemLoadLevel::Elevated, 0.6);
    let known_phases = [
        CircadianPhase::Normal,
        CircadianPhase::ApproachingPeak,
        CircadianPhase::Peak,
        CircadianPhase::ApproachingOffPeak,
        CircadianPhase::OffPeak,
    ];
    assert!(known_phases.contains(&scheduler.get_phase()));
    let adjustment = scheduler.get_phase_adjustment();
    assert!((ADJUSTMENT_FLOOR..=ADJUSTMENT_CEIL).contains(&adjustment));
}

#[test]
fn novelty_outlier_batch_scores_above_baseline() {
    let detector = NoveltyDetector::default();
    // 20 batches with mean ~50 and a little jitter.
    for i in 0..20 {
        let jitter = (i % 7) as f64 * 0.3;
        detector.report_batch("s1", "hr", &numeric_batch(&[49.0 + jitter, 51.0 - jitter]));
    }
    let before = detector.get_novelty_score("s1", "hr");
    assert!(before.is_finite());

    detector.report_batch("s1", "hr", &numeric_batch(&[500.0, 501.0]));
    let after = detector.get_novelty_score("s1", "hr");
    assert!(after.is_finite());
    assert!(after > before);
}

#[test]
fn novelty_malformed_batches_never_fail() {
    let detector = NoveltyDetector::default();
    let batch = vec![
        Measurement::new(json!({"unit": "bpm"}), 0),
        Measurement::new(json!("not-a-number"), 1),
        Measurement::new(json!(null), 2),
    ];
    detector.report_batch("s1", "hr", &batch);
    assert_eq!(detector.get_novelty_score("s1", "hr"), 0.0);
}

#[test]
fn sync_viewer_gate_and_bounds() {
    let computer = SyncComputer::default();
    for signal in SyncSignal::ALL {
        assert!((0.0..=1.0).contains(&computer.get_sync(signal)));
    }
    assert_eq!(computer.tracked_sensor_count(), 0);

    computer.register_viewer();
    assert!(computer.is_active());
    assert!(computer.viewer_count() >= 1);

    computer.record_phase("s1", SyncSignal::Breathing, 0.4);
    computer.record_phase("s2", SyncSignal::Breathing, 0.5);
    assert_eq!(computer.tracked_sensor_count(), 2);

    computer.unregister_viewer();
    assert!(!computer.is_active());
    assert_eq!(computer.viewer_count(), 0);
    // Never negative.
    computer.unregister_viewer();
    assert_eq!(computer.viewer_count(), 0);

    for signal in SyncSignal::ALL {
        assert!((0.0..=1.0).contains(&computer.get_sync(signal)));
    }
}

#[test]
fn admission_controller_composition_stays_positive_and_finite() {
    // The admission controller multiplies the read factors together; the
    // product must stay positive and finite for any stream, known or not.
    let system = BioSystem::default();

    for i in 0..50 {
        let id = format!("s{}", i % 5);
        system.predictive().record_attention(&id, AttentionLevel::Medium);
        system.arbiter().record_demand(&id, 1.0 + (i % 3) as f64);
        system.homeostasis().record_sample(SystemLoadLevel::Normal);
        system.circadian().record_load(SystemLoadLevel::Normal, 0.4);
        system
            .novelty()
            .report_batch(&id, "hr", &numeric_batch(&[60.0, 62.0]));
    }
    system.arbiter().reallocate();

    for id in ["s0", "s1", "unknown-stream"] {
        let combined = system.predictive().get_predictive_factor(id)
            * system.arbiter().get_multiplier(id)
            * system.circadian().get_phase_adjustment();
        assert!(combined.is_finite());
        assert!(combined > 0.0);
    }
}
