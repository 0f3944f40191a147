// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Sensocto Observability
//!
//! Unified logging initialization for the Sensocto platform. Console
//! output is always available; per-run rotating file logs are behind the
//! `file-logging` feature (server deployments only).

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod config;
pub mod init;

pub use config::CrateDebugFlags;
pub use init::{init_logging, LoggingGuard};

/// Crates whose logs get their own filter directive.
pub const KNOWN_CRATES: &[&str] = &[
    "sensocto-bio",
    "sensocto-config",
    "sensocto-structures",
];
