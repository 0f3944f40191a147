// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Collects every violation before failing so an operator sees the full
//! list in one pass instead of fixing fields one at a time.

use crate::{ConfigError, ConfigResult, SensoctoConfig};

/// Validate all configuration ranges.
pub fn validate_config(config: &SensoctoConfig) -> ConfigResult<()> {
    let mut violations = Vec::new();

    check_unit_interval(&mut violations, "bio.correlation.learning_rate", config.bio.correlation.learning_rate);
    check_unit_interval(&mut violations, "bio.correlation.correlation_threshold", config.bio.correlation.correlation_threshold);
    check_unit_interval(&mut violations, "bio.predictive.hourly_smoothing", config.bio.predictive.hourly_smoothing);
    check_unit_interval(&mut violations, "bio.circadian.smoothing", config.bio.circadian.smoothing);
    check_unit_interval(&mut violations, "bio.sync.smoothing_alpha", config.bio.sync.smoothing_alpha);
    check_unit_interval(&mut violations, "bio.arbiter.demand_smoothing", config.bio.arbiter.demand_smoothing);

    if config.bio.predictive.prediction_gain <= 0.0 {
        violations.push("bio.predictive.prediction_gain must be > 0".to_string());
    }
    if config.bio.homeostasis.proportional_gain <= 0.0 {
        violations.push("bio.homeostasis.proportional_gain must be > 0".to_string());
    }
    if config.bio.homeostasis.offset_bound <= 0.0 || config.bio.homeostasis.offset_bound > 1.0 {
        violations.push("bio.homeostasis.offset_bound must be in (0, 1]".to_string());
    }
    let target_sum = config.bio.homeostasis.target_normal
        + config.bio.homeostasis.target_elevated
        + config.bio.homeostasis.target_high
        + config.bio.homeostasis.target_critical;
    if (target_sum - 1.0).abs() > 0.01 {
        violations.push(format!(
            "bio.homeostasis.target_* fractions must sum to 1.0 (got {target_sum:.3})"
        ));
    }

    if config.bio.sync.tick_interval_ms == 0 {
        violations.push("bio.sync.tick_interval_ms must be > 0".to_string());
    }
    if config.bio.sync.phase_buffer_capacity == 0 {
        violations.push("bio.sync.phase_buffer_capacity must be > 0".to_string());
    }

    for (name, value) in [
        ("bio.novelty.max_tracked_attributes", config.bio.novelty.max_tracked_attributes),
        ("bio.correlation.max_edges", config.bio.correlation.max_edges),
        ("bio.predictive.max_tracked_streams", config.bio.predictive.max_tracked_streams),
        ("bio.arbiter.max_tracked_streams", config.bio.arbiter.max_tracked_streams),
    ] {
        if value == 0 {
            violations.push(format!("{name} must be > 0"));
        }
    }

    if config.bio.circadian.peak_band <= config.bio.circadian.trough_band {
        violations.push("bio.circadian.peak_band must exceed trough_band".to_string());
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(violations.join("; ")))
    }
}

fn check_unit_interval(violations: &mut Vec<String>, name: &str, value: f64) {
    if !(value > 0.0 && value <= 1.0) {
        violations.push(format!("{name} must be in (0, 1] (got {value})"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SensoctoConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&SensoctoConfig::default()).is_ok());
    }

    #[test]
    fn test_out_of_range_learning_rate_rejected() {
        let mut config = SensoctoConfig::default();
        config.bio.correlation.learning_rate = 1.5;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_zero_tick_interval_rejected() {
        let mut config = SensoctoConfig::default();
        config.bio.sync.tick_interval_ms = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_all_violations_reported_together() {
        let mut config = SensoctoConfig::default();
        config.bio.correlation.learning_rate = 0.0;
        config.bio.sync.tick_interval_ms = 0;
        let err = validate_config(&config).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("learning_rate"));
        assert!(message.contains("tick_interval_ms"));
    }
}
