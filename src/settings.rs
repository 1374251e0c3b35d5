//! # Settings Module
//!
//! ## Purpose
//! Central place for every tunable constant of the application: the name of the ammonia
//! column in the input CSV, the random forest hyperparameters, the four mass-transfer
//! sliders (range, default position, scale divisor) and the logging setup.
//!
//! ## Architecture
//! - **AppConfig**: Serializable configuration structure with sensible defaults
//! - **SliderSpec**: integer slider range plus the divisor that turns a slider position into
//!   an effective physical value
//! - **ConfigManager**: loads the configuration from a JSON file, saves it back and resets it
//!
//! ## Configuration Format
//! ```json
//! {
//!   "ammonia_column": "Ammonia",
//!   "forecast": { "n_trees": 200, "max_depth": 15, "test_fraction": 0.2, "seed": 42, ... },
//!   "sliders": {
//!     "k_g": { "min": 1, "max": 30, "default": 10, "divisor": 1000.0 },
//!     "k_l": { "min": 1, "max": 20, "default": 5, "divisor": 1000.0 },
//!     "p_a": { "min": 1, "max": 30, "default": 10, "divisor": 1000.0 },
//!     "ph": { "min": 50, "max": 110, "default": 75, "divisor": 10.0 }
//!   },
//!   "logging": { "level": "info", "log_file": null }
//! }
//! ```
//! Every section may be omitted, missing parts are filled from the defaults.
//!
//! ## Usage
//! ```rust, ignore
//! let manager = ConfigManager::with_config_file("ammonia_config.json")?;
//! let spec = manager.get_config().sliders.get(MassTransferParameter::PH);
//! assert_eq!(spec.effective(75), 7.5);
//! ```

use crate::Forecast::forecast_model::ForecastConfig;
use crate::MassTransfer::mass_transfer_rates::MassTransferParameter;
use crate::error::{AmmoniaError, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the concentration column expected in the input CSV
pub const AMMONIA_COLUMN: &str = "Ammonia";
/// Configuration file looked up in the working directory
pub const CONFIG_FILE: &str = "ammonia_config.json";

/// Bounded integer slider; the effective value is the slider position divided by `divisor`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliderSpec {
    pub min: i32,
    pub max: i32,
    pub default: i32,
    pub divisor: f64,
}

impl SliderSpec {
    pub const fn new(min: i32, max: i32, default: i32, divisor: f64) -> Self {
        Self {
            min,
            max,
            default,
            divisor,
        }
    }

    pub fn contains(&self, raw: i32) -> bool {
        raw >= self.min && raw <= self.max
    }
    /// slider position -> physical value
    pub fn effective(&self, raw: i32) -> f64 {
        raw as f64 / self.divisor
    }

    pub fn default_effective(&self) -> f64 {
        self.effective(self.default)
    }

    fn validate(&self, name: &str) -> Result<()> {
        if self.min > self.max {
            return Err(AmmoniaError::invalid_parameter(
                name,
                format!("slider min {} is above max {}", self.min, self.max),
            ));
        }
        if !self.contains(self.default) {
            return Err(AmmoniaError::invalid_parameter(
                name,
                format!(
                    "default {} outside slider range {}..={}",
                    self.default, self.min, self.max
                ),
            ));
        }
        if !self.divisor.is_finite() || self.divisor <= 0.0 {
            return Err(AmmoniaError::invalid_parameter(
                name,
                format!("divisor must be a positive number, got {}", self.divisor),
            ));
        }
        Ok(())
    }
}

/// The four mass-transfer sliders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliderConfig {
    pub k_g: SliderSpec,
    pub k_l: SliderSpec,
    pub p_a: SliderSpec,
    pub ph: SliderSpec,
}

impl Default for SliderConfig {
    fn default() -> Self {
        Self {
            k_g: SliderSpec::new(1, 30, 10, 1000.0),
            k_l: SliderSpec::new(1, 20, 5, 1000.0),
            p_a: SliderSpec::new(1, 30, 10, 1000.0),
            ph: SliderSpec::new(50, 110, 75, 10.0),
        }
    }
}

impl SliderConfig {
    pub fn get(&self, parameter: MassTransferParameter) -> &SliderSpec {
        match parameter {
            MassTransferParameter::GasCoefficient => &self.k_g,
            MassTransferParameter::LiquidCoefficient => &self.k_l,
            MassTransferParameter::Permeability => &self.p_a,
            MassTransferParameter::PH => &self.ph,
        }
    }

    pub fn get_mut(&mut self, parameter: MassTransferParameter) -> &mut SliderSpec {
        match parameter {
            MassTransferParameter::GasCoefficient => &mut self.k_g,
            MassTransferParameter::LiquidCoefficient => &mut self.k_l,
            MassTransferParameter::Permeability => &mut self.p_a,
            MassTransferParameter::PH => &mut self.ph,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// one of "off", "error", "warn", "info", "debug", "trace"
    pub level: String,
    pub log_file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_file: None,
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub ammonia_column: String,
    pub forecast: ForecastConfig,
    pub sliders: SliderConfig,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ammonia_column: AMMONIA_COLUMN.to_string(),
            forecast: ForecastConfig::default(),
            sliders: SliderConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Checks the values that cannot be expressed in the types alone
    pub fn validate(&self) -> Result<()> {
        if self.ammonia_column.trim().is_empty() {
            return Err(AmmoniaError::InvalidDataset(
                "ammonia column name must not be empty".to_string(),
            ));
        }
        for parameter in MassTransferParameter::ALL {
            self.sliders.get(parameter).validate(parameter.key())?;
        }
        self.forecast.validate()
    }
}

/// Loads, keeps and saves the [`AppConfig`].
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: AppConfig,
    config_file: PathBuf,
}

impl ConfigManager {
    /// Uses `ammonia_config.json` from the working directory, falling back to the defaults
    /// if the file is missing or broken.
    pub fn new() -> Self {
        let config_file = PathBuf::from(CONFIG_FILE);
        let config = match Self::load_config(&config_file) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Could not use configuration file '{}': {}. Using defaults",
                    config_file.display(),
                    e
                );
                AppConfig::default()
            }
        };
        Self {
            config,
            config_file,
        }
    }

    /// Same as [`ConfigManager::new`] but for an explicit file; here a broken file is an error
    pub fn with_config_file<P: AsRef<Path>>(config_file: P) -> Result<Self> {
        let config_file = config_file.as_ref().to_path_buf();
        let config = Self::load_config(&config_file)?;
        Ok(Self {
            config,
            config_file,
        })
    }

    fn load_config(config_file: &Path) -> Result<AppConfig> {
        if config_file.exists() {
            let content = fs::read_to_string(config_file)?;
            let config: AppConfig = serde_json::from_str(&content)?;
            config.validate()?;
            info!("Configuration loaded from '{}'", config_file.display());
            Ok(config)
        } else {
            Ok(AppConfig::default())
        }
    }

    pub fn save_config(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.config)?;
        fs::write(&self.config_file, content)?;
        info!("Configuration saved to '{}'", self.config_file.display());
        Ok(())
    }

    pub fn get_config(&self) -> &AppConfig {
        &self.config
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Moves the default position of a slider, rejecting positions outside its range
    pub fn set_slider_default(&mut self, parameter: MassTransferParameter, raw: i32) -> Result<()> {
        let spec = self.config.sliders.get_mut(parameter);
        if !spec.contains(raw) {
            return Err(AmmoniaError::invalid_parameter(
                parameter.key(),
                format!("{} outside slider range {}..={}", raw, spec.min, spec.max),
            ));
        }
        spec.default = raw;
        Ok(())
    }

    pub fn reset_to_defaults(&mut self) {
        self.config = AppConfig::default();
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_sliders_match_session_defaults() {
        let sliders = SliderConfig::default();
        assert_relative_eq!(sliders.k_g.default_effective(), 0.010, epsilon = 1e-15);
        assert_relative_eq!(sliders.k_l.default_effective(), 0.005, epsilon = 1e-15);
        assert_relative_eq!(sliders.p_a.default_effective(), 0.010, epsilon = 1e-15);
        assert_relative_eq!(sliders.ph.default_effective(), 7.5, epsilon = 1e-12);
        assert_eq!((sliders.ph.min, sliders.ph.max), (50, 110));
        assert_eq!((sliders.k_l.min, sliders.k_l.max), (1, 20));
    }

    #[test]
    fn test_slider_contains() {
        let spec = SliderConfig::default().ph;
        assert!(spec.contains(50));
        assert!(spec.contains(110));
        assert!(!spec.contains(49));
        assert!(!spec.contains(111));
    }

    #[test]
    fn test_slider_lookup_by_parameter() {
        let mut sliders = SliderConfig::default();
        assert_eq!(*sliders.get(MassTransferParameter::PH), sliders.ph);
        sliders.get_mut(MassTransferParameter::LiquidCoefficient).default = 7;
        assert_eq!(sliders.k_l.default, 7);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_config_file(dir.path().join("absent.json")).unwrap();
        assert_eq!(manager.get_config(), &AppConfig::default());
    }

    #[test]
    fn test_partial_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{ "ammonia_column": "NH3", "forecast": { "n_trees": 10 } }"#)
            .unwrap();
        let manager = ConfigManager::with_config_file(file.path()).unwrap();
        let config = manager.get_config();
        assert_eq!(config.ammonia_column, "NH3");
        assert_eq!(config.forecast.n_trees, 10);
        assert_eq!(config.forecast.max_depth, 15);
        assert_eq!(config.sliders, SliderConfig::default());
    }

    #[test]
    fn test_malformed_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        let result = ConfigManager::with_config_file(file.path());
        assert!(matches!(result, Err(AmmoniaError::Config(_))));
    }

    #[test]
    fn test_invalid_slider_in_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{ "sliders": { "ph": { "min": 50, "max": 110, "default": 200, "divisor": 10.0 } } }"#)
            .unwrap();
        let result = ConfigManager::with_config_file(file.path());
        assert!(matches!(result, Err(AmmoniaError::InvalidParameter { .. })));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut manager = ConfigManager::with_config_file(&path).unwrap();
        manager
            .set_slider_default(MassTransferParameter::PH, 90)
            .unwrap();
        manager.save_config().unwrap();

        let reloaded = ConfigManager::with_config_file(&path).unwrap();
        assert_eq!(reloaded.get_config().sliders.ph.default, 90);
    }

    #[test]
    fn test_set_slider_default_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = ConfigManager::with_config_file(dir.path().join("c.json")).unwrap();
        assert!(
            manager
                .set_slider_default(MassTransferParameter::GasCoefficient, 31)
                .is_err()
        );
        manager
            .set_slider_default(MassTransferParameter::GasCoefficient, 30)
            .unwrap();
        manager.reset_to_defaults();
        assert_eq!(manager.get_config().sliders.k_g.default, 10);
    }

    #[test]
    fn test_reset_then_save_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut manager = ConfigManager::with_config_file(&path).unwrap();
        manager
            .set_slider_default(MassTransferParameter::PH, 100)
            .unwrap();
        manager.save_config().unwrap();
        manager.reset_to_defaults();
        manager.save_config().unwrap();
        let reloaded = ConfigManager::with_config_file(&path).unwrap();
        assert_eq!(reloaded.get_config(), &AppConfig::default());
    }
}
