// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-crate debug flags and filter-string construction.

use serde::{Deserialize, Serialize};

/// Per-crate debug toggles used to build the tracing filter.
///
/// A flagged crate logs at `debug`, everything else at the base level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrateDebugFlags {
    /// Base level for everything not explicitly flagged (e.g. "info").
    pub base_level: Option<String>,

    /// Crate names (as in [`crate::KNOWN_CRATES`]) to log at debug.
    pub debug_crates: Vec<String>,
}

impl CrateDebugFlags {
    /// Build an `EnvFilter`-compatible directive string.
    pub fn to_filter_string(&self) -> String {
        let base = self.base_level.as_deref().unwrap_or("info");
        let mut directives = vec![base.to_string()];
        for name in &self.debug_crates {
            // Crate names use dashes on disk, underscores as targets.
            directives.push(format!("{}=debug", name.replace('-', "_")));
        }
        directives.join(",")
    }
}
