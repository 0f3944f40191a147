// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Sensocto Core Structures
//!
//! Shared data types for the Sensocto sensor platform: the closed level
//! enums used by the attention-allocation layer, measurement batch entries,
//! and numeric payload extraction.
//!
//! All ids on the platform are opaque strings; the enums here are the only
//! closed vocabularies shared between the ingestion path, the bio layer and
//! the visualization consumers.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod levels;
pub mod measurement;

pub use error::SensoctoDataError;
pub use levels::{AttentionLevel, CircadianPhase, SyncSignal, SystemLoadLevel};
pub use measurement::{numeric_payload, Measurement};
