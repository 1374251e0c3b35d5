//! # Analysis session
//!
//! ## Purpose
//! Owns everything that changes while the application runs: the loaded dataset, the
//! slider positions of the four mass-transfer parameters and the two results computed from
//! them. The front ends (console menu and GUI) only talk to this struct, one event at a time:
//!
//! | event                  | what is replaced                                    |
//! |------------------------|-----------------------------------------------------|
//! | load dataset           | dataset, forecast result and mass-transfer result   |
//! | change one parameter   | that parameter and the mass-transfer result         |
//!
//! A load is all or nothing: the new dataset and both results are computed first and only
//! then swapped in, so a bad file or a failed fit leaves the previous state on screen.
//! Changing a parameter before any dataset is loaded only stores the new value.
use crate::AmmoniaData::AmmoniaDataset;
use crate::Forecast::forecast_model::{ForecastResult, run_forecast};
use crate::MassTransfer::mass_transfer_rates::{
    MassTransferParameter, MassTransferParams, MassTransferResult,
};
use crate::error::{AmmoniaError, Result};
use crate::settings::AppConfig;
use log::{debug, info};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct AmmoniaSession {
    config: AppConfig,
    dataset: Option<AmmoniaDataset>,
    /// slider positions
    raw_values: HashMap<MassTransferParameter, i32>,
    /// slider positions converted to physical values
    params: MassTransferParams,
    forecast: Option<ForecastResult>,
    mass_transfer: Option<MassTransferResult>,
    status: String,
}

impl AmmoniaSession {
    /// New session with every slider at its configured default
    pub fn new(config: AppConfig) -> Self {
        let mut raw_values = HashMap::new();
        let mut params = MassTransferParams::default();
        for parameter in MassTransferParameter::ALL {
            let spec = config.sliders.get(parameter);
            raw_values.insert(parameter, spec.default);
            params.set(parameter, spec.default_effective());
        }
        Self {
            config,
            dataset: None,
            raw_values,
            params,
            forecast: None,
            mass_transfer: None,
            status: String::new(),
        }
    }

    /// Reads the configured ammonia column from a CSV file and replaces the current dataset
    pub fn load_dataset<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let dataset = AmmoniaDataset::from_csv(path, &self.config.ammonia_column)?;
        self.replace_dataset(dataset)
    }

    /// Installs a dataset and recomputes both results; on error nothing changes
    pub fn replace_dataset(&mut self, dataset: AmmoniaDataset) -> Result<()> {
        info!("Analysing dataset with {} records", dataset.len());
        let forecast = run_forecast(&dataset, &self.config.forecast)?;
        let mass_transfer = MassTransferResult::calculate(Some(&dataset), &self.params)?;
        self.status = match dataset.source() {
            Some(path) => format!("Loaded Dataset: {}", path.display()),
            None => format!("Loaded Dataset: {} records", dataset.len()),
        };
        self.dataset = Some(dataset);
        self.forecast = Some(forecast);
        self.mass_transfer = Some(mass_transfer);
        Ok(())
    }

    /// Moves one slider. The position must lie inside the slider range.
    /// Returns the new mass-transfer result, or `None` while no dataset is loaded.
    pub fn set_parameter(
        &mut self,
        parameter: MassTransferParameter,
        raw: i32,
    ) -> Result<Option<&MassTransferResult>> {
        let spec = *self.config.sliders.get(parameter);
        if !spec.contains(raw) {
            return Err(AmmoniaError::invalid_parameter(
                parameter.key(),
                format!("{} outside slider range {}..={}", raw, spec.min, spec.max),
            ));
        }
        let value = spec.effective(raw);
        debug!("{} set to {} (slider position {})", parameter.label(), value, raw);
        self.raw_values.insert(parameter, raw);
        self.params.set(parameter, value);
        self.recompute_mass_transfer()
    }

    /// Recomputes the mass-transfer series from the current dataset and parameters.
    /// Without a dataset this is a no-op that returns `Ok(None)`.
    pub fn recompute_mass_transfer(&mut self) -> Result<Option<&MassTransferResult>> {
        match MassTransferResult::calculate(self.dataset.as_ref(), &self.params) {
            Ok(result) => {
                self.mass_transfer = Some(result);
                Ok(self.mass_transfer.as_ref())
            }
            Err(AmmoniaError::InvalidDataset(reason)) if self.dataset.is_none() => {
                debug!("mass transfer not recomputed: {}", reason);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn dataset(&self) -> Option<&AmmoniaDataset> {
        self.dataset.as_ref()
    }

    pub fn forecast(&self) -> Option<&ForecastResult> {
        self.forecast.as_ref()
    }

    pub fn mass_transfer(&self) -> Option<&MassTransferResult> {
        self.mass_transfer.as_ref()
    }

    pub fn params(&self) -> &MassTransferParams {
        &self.params
    }

    pub fn raw_value(&self, parameter: MassTransferParameter) -> i32 {
        self.raw_values
            .get(&parameter)
            .copied()
            .unwrap_or(self.config.sliders.get(parameter).default)
    }

    pub fn status(&self) -> &str {
        &self.status
    }
}

impl Default for AmmoniaSession {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}
