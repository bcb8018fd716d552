//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading payroll
//! configuration from YAML files.

use chrono::NaiveDate;
use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{EngineSettings, PayrollConfig, StatutoryRates};

/// Loads and provides access to payroll configuration.
///
/// # Directory Structure
///
/// ```text
/// config/payroll/
/// ├── engine.yaml          # Schedule divisors, overtime multipliers, timeouts
/// └── statutory/
///     └── 2024-01-01.yaml  # IHSS and RAP constants effective from this date
/// ```
///
/// # Example
///
/// ```no_run
/// use quincena_payroll::config::ConfigLoader;
/// use chrono::NaiveDate;
///
/// let loader = ConfigLoader::load("./config/payroll").unwrap();
/// let date = NaiveDate::from_ymd_opt(2024, 3, 26).unwrap();
/// let rates = loader.statutory_rates(date).unwrap();
/// println!("IHSS: {}", rates.ihss_fixed);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: PayrollConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - The statutory directory holds no rate files
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let settings = Self::load_yaml::<EngineSettings>(&path.join("engine.yaml"))?;
        let statutory = Self::load_statutory(&path.join("statutory"))?;

        Ok(Self {
            config: PayrollConfig::new(settings, statutory),
        })
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: PayrollConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads all statutory rate files from a directory.
    fn load_statutory(dir: &Path) -> EngineResult<Vec<StatutoryRates>> {
        let dir_str = dir.display().to_string();

        let entries = fs::read_dir(dir).map_err(|_| EngineError::ConfigNotFound {
            path: dir_str.clone(),
        })?;

        let mut rates = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                rates.push(Self::load_yaml::<StatutoryRates>(&path)?);
            }
        }

        if rates.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no statutory rate files found)", dir_str),
            });
        }

        Ok(rates)
    }

    /// Returns the underlying payroll configuration.
    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }

    /// Gets the statutory rates in force for a period ending on `date`.
    pub fn statutory_rates(&self, date: NaiveDate) -> EngineResult<&StatutoryRates> {
        self.config
            .statutory_for(date)
            .ok_or_else(|| EngineError::ConfigNotFound {
                path: format!("statutory rates effective on or before {}", date),
            })
    }
}
