// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Unified logging initialization for Sensocto
//!
//! Console output with an `EnvFilter` built from per-crate debug flags;
//! with the `file-logging` feature a timestamped run folder additionally
//! receives a rotating combined log file.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::config::CrateDebugFlags;

/// Logging initialization result
///
/// Keep this alive for the lifetime of the process: dropping it flushes and
/// detaches any file appender workers.
pub struct LoggingGuard {
    #[cfg(feature = "file-logging")]
    _file_guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
    log_dir: Option<PathBuf>,
}

impl LoggingGuard {
    /// The run's log directory, when file logging is enabled.
    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }
}

/// Initialize logging with console output (and file output when the
/// `file-logging` feature is enabled).
///
/// # Arguments
/// * `debug_flags` - Per-crate debug flags for filtering
/// * `log_dir` - Base directory for file logs (default: `./logs`)
pub fn init_logging(
    debug_flags: &CrateDebugFlags,
    log_dir: Option<PathBuf>,
) -> Result<LoggingGuard> {
    let filter = debug_flags.to_filter_string();
    let env_filter = EnvFilter::try_new(&filter)
        .with_context(|| format!("Invalid log filter: {filter}"))?;

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_filter(env_filter);

    #[cfg(feature = "file-logging")]
    {
        let base_log_dir = log_dir.unwrap_or_else(|| PathBuf::from("./logs"));
        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
        let run_folder = base_log_dir.join(format!("run_{}", timestamp));
        std::fs::create_dir_all(&run_folder)
            .with_context(|| format!("Failed to create log directory: {}", run_folder.display()))?;

        let file_appender = tracing_appender::rolling::daily(&run_folder, "sensocto.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_target(true)
            .with_ansi(false)
            .boxed();

        Registry::default()
            .with(console_layer.boxed())
            .with(file_layer)
            .try_init()
            .context("Failed to initialize tracing subscriber")?;

        return Ok(LoggingGuard {
            _file_guards: vec![guard],
            log_dir: Some(run_folder),
        });
    }

    #[cfg(not(feature = "file-logging"))]
    {
        let _ = log_dir;
        Registry::default()
            .with(console_layer.boxed())
            .try_init()
            .context("Failed to initialize tracing subscriber")?;

        Ok(LoggingGuard { log_dir: None })
    }
}
