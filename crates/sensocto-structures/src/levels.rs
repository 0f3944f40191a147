// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Closed level vocabularies shared across the platform.
//!
//! These enums mirror the wire-level values exchanged with connected agents
//! (`"none"`, `"low"`, ... / `"normal"`, `"elevated"`, ...) and are the only
//! level encodings the bio layer understands.

use crate::error::SensoctoDataError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Attention level for a single sensor stream.
///
/// Describes how actively a stream is currently being consumed/observed,
/// from "nobody is looking" to "actively watched at full rate".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AttentionLevel {
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl AttentionLevel {
    /// Scalar weight used by temporal pattern learning.
    pub fn weight(&self) -> f64 {
        match self {
            AttentionLevel::None => 0.0,
            AttentionLevel::Low => 0.33,
            AttentionLevel::Medium => 0.66,
            AttentionLevel::High => 1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AttentionLevel::None => "none",
            AttentionLevel::Low => "low",
            AttentionLevel::Medium => "medium",
            AttentionLevel::High => "high",
        }
    }
}

impl fmt::Display for AttentionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttentionLevel {
    type Err = SensoctoDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(AttentionLevel::None),
            "low" => Ok(AttentionLevel::Low),
            "medium" => Ok(AttentionLevel::Medium),
            "high" => Ok(AttentionLevel::High),
            other => Err(SensoctoDataError::UnknownLevel(
                other.to_string(),
                "AttentionLevel",
            )),
        }
    }
}

/// System-wide load level reported by the ingestion path.
///
/// Variant order is load order: `Normal < Elevated < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SystemLoadLevel {
    #[default]
    Normal,
    Elevated,
    High,
    Critical,
}

impl SystemLoadLevel {
    /// The three non-baseline levels, in ascending load order.
    pub const THRESHOLDED: [SystemLoadLevel; 3] = [
        SystemLoadLevel::Elevated,
        SystemLoadLevel::High,
        SystemLoadLevel::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SystemLoadLevel::Normal => "normal",
            SystemLoadLevel::Elevated => "elevated",
            SystemLoadLevel::High => "high",
            SystemLoadLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for SystemLoadLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SystemLoadLevel {
    type Err = SensoctoDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(SystemLoadLevel::Normal),
            "elevated" => Ok(SystemLoadLevel::Elevated),
            "high" => Ok(SystemLoadLevel::High),
            "critical" => Ok(SystemLoadLevel::Critical),
            other => Err(SensoctoDataError::UnknownLevel(
                other.to_string(),
                "SystemLoadLevel",
            )),
        }
    }
}

/// Physiological signal channel tracked by the synchrony computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncSignal {
    Breathing,
    Hrv,
    Rsa,
}

impl SyncSignal {
    /// All signal channels, for iteration.
    pub const ALL: [SyncSignal; 3] = [SyncSignal::Breathing, SyncSignal::Hrv, SyncSignal::Rsa];

    pub fn as_str(&self) -> &'static str {
        match self {
            SyncSignal::Breathing => "breathing",
            SyncSignal::Hrv => "hrv",
            SyncSignal::Rsa => "rsa",
        }
    }
}

impl fmt::Display for SyncSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time-of-day phase classified by the circadian scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CircadianPhase {
    #[default]
    Unknown,
    Normal,
    ApproachingPeak,
    Peak,
    ApproachingOffPeak,
    OffPeak,
}

impl CircadianPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircadianPhase::Unknown => "unknown",
            CircadianPhase::Normal => "normal",
            CircadianPhase::ApproachingPeak => "approaching_peak",
            CircadianPhase::Peak => "peak",
            CircadianPhase::ApproachingOffPeak => "approaching_off_peak",
            CircadianPhase::OffPeak => "off_peak",
        }
    }
}

impl fmt::Display for CircadianPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
