// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Loading is two-tier:
//! 1. TOML file (base values, all fields defaulted)
//! 2. Environment variables (runtime overrides)

use crate::{validate_config, ConfigError, ConfigResult, SensoctoConfig};
use std::env;
use std::fs;
use std::path::PathBuf;

/// Find the Sensocto configuration file
///
/// Search order:
/// 1. `SENSOCTO_CONFIG_PATH` environment variable
/// 2. Current working directory: `./sensocto_configuration.toml`
/// 3. Ancestor directories (up to 5 levels, for workspace roots)
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found.
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("SENSOCTO_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by SENSOCTO_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join("sensocto_configuration.toml"));
        let mut current = cwd.clone();
        for _ in 0..5 {
            if let Some(parent) = current.parent() {
                search_paths.push(parent.join("sensocto_configuration.toml"));
                current = parent.to_path_buf();
            }
        }
    }

    for path in &search_paths {
        if path.exists() {
            return Ok(path.clone());
        }
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "Sensocto configuration file 'sensocto_configuration.toml' not found in any of these locations:\n{}\n\nSet SENSOCTO_CONFIG_PATH to specify a custom location.",
        search_list
    )))
}

/// Load, override and validate the configuration.
///
/// With `path == None` the file is discovered via [`find_config_file`]; a
/// missing file falls back to compiled-in defaults (the bio layer must be
/// able to start with zero configuration).
pub fn load_config(path: Option<PathBuf>) -> ConfigResult<SensoctoConfig> {
    let resolved = match path {
        Some(p) => Some(p),
        None => find_config_file().ok(),
    };

    let mut config = match resolved {
        Some(path) => {
            let raw = fs::read_to_string(&path)?;
            toml::from_str::<SensoctoConfig>(&raw)?
        }
        None => SensoctoConfig::default(),
    };

    apply_environment_overrides(&mut config);
    validate_config(&config)?;
    Ok(config)
}

/// Apply `SENSOCTO_*` environment variable overrides.
///
/// Unparseable values are ignored (the file/default value wins) - an
/// operator typo must not take the platform down.
pub fn apply_environment_overrides(config: &mut SensoctoConfig) {
    if let Ok(level) = env::var("SENSOCTO_LOG_LEVEL") {
        config.system.log_level = level;
    }
    if let Ok(debug) = env::var("SENSOCTO_DEBUG") {
        if let Ok(parsed) = debug.parse::<bool>() {
            config.system.debug = parsed;
        }
    }
    if let Ok(tick) = env::var("SENSOCTO_SYNC_TICK_MS") {
        if let Ok(parsed) = tick.parse::<u64>() {
            config.bio.sync.tick_interval_ms = parsed;
        }
    }
    if let Ok(dir) = env::var("SENSOCTO_LOG_DIR") {
        config.logging.log_dir = dir;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_without_file_uses_defaults() {
        // No config file in the test environment: defaults must load clean.
        let config = load_config(Some(PathBuf::from("/nonexistent/sensocto.toml")));
        assert!(config.is_err()); // explicit missing path is an error

        let defaults = SensoctoConfig::default();
        assert_eq!(defaults.bio.sync.tick_interval_ms, 250);
    }

    #[test]
    fn test_environment_overrides_apply() {
        let mut config = SensoctoConfig::default();
        env::set_var("SENSOCTO_SYNC_TICK_MS", "100");
        apply_environment_overrides(&mut config);
        env::remove_var("SENSOCTO_SYNC_TICK_MS");
        assert_eq!(config.bio.sync.tick_interval_ms, 100);
    }

    #[test]
    fn test_unparseable_override_is_ignored() {
        let mut config = SensoctoConfig::default();
        env::set_var("SENSOCTO_DEBUG", "definitely");
        apply_environment_overrides(&mut config);
        env::remove_var("SENSOCTO_DEBUG");
        assert!(!config.system.debug);
    }
}
