// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Measurement batch entries as delivered by the ingestion path.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single measurement inside a reported batch.
///
/// The attribute id travels alongside the batch (one batch is always for one
/// `(sensor, attribute)` pair), so entries only carry payload and timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Measurement {
    /// The measurement payload. Usually a bare number or an object with a
    /// numeric `"value"` field; anything else is skipped by the consumers.
    pub payload: Value,

    /// Unix timestamp in milliseconds.
    pub timestamp: i64,
}

impl Measurement {
    pub fn new(payload: Value, timestamp: i64) -> Self {
        Self { payload, timestamp }
    }
}

/// Extract the numeric value of a measurement payload.
///
/// Accepted shapes, in order:
/// - a bare JSON number
/// - an object with a numeric `"value"` field
/// - a string that parses as f64
///
/// Returns `None` for anything else (the caller skips the entry). Non-finite
/// numbers are rejected so downstream statistics stay finite.
pub fn numeric_payload(payload: &Value) -> Option<f64> {
    let raw = match payload {
        Value::Number(n) => n.as_f64(),
        Value::Object(map) => map.get("value").and_then(Value::as_f64),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    };
    raw.filter(|v| v.is_finite())
}
