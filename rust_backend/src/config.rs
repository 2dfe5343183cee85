//! Engine configuration file support.
//!
//! This module provides utilities for reading the engine's tunables from a
//! TOML configuration file. Every section and key is optional:
//!
//! ```toml
//! [compare]
//! absolute_threshold = 5.0
//! relative_threshold = 0.05
//!
//! [scanner]
//! step = "adaptive"   # or "fixed"
//! step_secs = 60
//! adaptive_gain = 30.0
//!
//! [cleaning]
//! min_interval_between_dots = 10
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::algorithms::compare::CompareThresholds;
use crate::algorithms::limits::ScannerConfig;
use crate::algorithms::reconstruct::MIN_INTERVAL_BETWEEN_DOTS;
use crate::error::{TrafficError, TrafficResult};

/// Dot cleaning settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CleaningConfig {
    #[serde(default = "default_min_interval_between_dots")]
    pub min_interval_between_dots: i64,
}

fn default_min_interval_between_dots() -> i64 {
    MIN_INTERVAL_BETWEEN_DOTS
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            min_interval_between_dots: default_min_interval_between_dots(),
        }
    }
}

/// Engine configuration from file.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub compare: CompareThresholds,
    #[serde(default)]
    pub scanner: ScannerConfig,
    #[serde(default)]
    pub cleaning: CleaningConfig,
}

impl EngineConfig {
    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> TrafficResult<Self> {
        let config: EngineConfig = toml::from_str(content).map_err(|e| {
            TrafficError::ConfigurationError(format!("Failed to parse config file: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load engine configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(EngineConfig)` if successful
    /// * `Err(TrafficError::ConfigurationError)` if the file cannot be read,
    ///   parsed or validated
    pub fn from_file<P: AsRef<Path>>(path: P) -> TrafficResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            TrafficError::ConfigurationError(format!("Failed to read config file: {}", e))
        })?;

        Self::from_toml_str(&content)
    }

    /// Load engine configuration from the default location.
    ///
    /// Searches for `traffic.toml` in:
    /// 1. Current directory
    /// 2. `rust_backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> TrafficResult<Self> {
        let search_paths = [
            PathBuf::from("traffic.toml"),
            PathBuf::from("rust_backend/traffic.toml"),
            PathBuf::from("../traffic.toml"),
        ];

        for path in &search_paths {
            if path.exists() {
                return Self::from_file(path);
            }
        }

        Err(TrafficError::ConfigurationError(
            "No traffic.toml found in standard locations".to_string(),
        ))
    }

    /// Check value ranges that the type system does not.
    pub fn validate(&self) -> TrafficResult<()> {
        let thresholds = [
            ("compare.absolute_threshold", self.compare.absolute_threshold),
            ("compare.relative_threshold", self.compare.relative_threshold),
            ("scanner.adaptive_gain", self.scanner.adaptive_gain),
        ];
        for (key, value) in thresholds {
            if !value.is_finite() || value < 0.0 {
                return Err(TrafficError::ConfigurationError(format!(
                    "'{}' must be a finite, non-negative number, got {}",
                    key, value
                )));
            }
        }

        if self.scanner.step_secs <= 0 {
            return Err(TrafficError::ConfigurationError(format!(
                "'scanner.step_secs' must be positive, got {}",
                self.scanner.step_secs
            )));
        }

        if self.cleaning.min_interval_between_dots < 0 {
            return Err(TrafficError::ConfigurationError(format!(
                "'cleaning.min_interval_between_dots' must not be negative, got {}",
                self.cleaning.min_interval_between_dots
            )));
        }

        Ok(())
    }
}
