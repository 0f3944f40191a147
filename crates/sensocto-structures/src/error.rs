// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Common error type for Sensocto data operations.

/// Errors produced while parsing or validating shared data types.
///
/// The bio layer's record/read API itself never returns errors - unknown
/// keys yield neutral defaults and malformed entries are skipped - so this
/// type only appears at parse boundaries (wire payloads, configuration).
#[derive(Debug, thiserror::Error)]
pub enum SensoctoDataError {
    /// A level string did not match any variant of a closed enum
    #[error("Unknown level '{0}' for {1}")]
    UnknownLevel(String, &'static str),

    /// Invalid parameters provided to a constructor or helper
    #[error("Bad parameters: {0}")]
    BadParameters(String),
}
