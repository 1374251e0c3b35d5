//! # Mass-transfer rates of free ammonia
//!
//! ## Aim
//! Turns a measured ammonia series into three derived series that describe how fast the free
//! ammonia can be recovered:
//! - absorption rate   `k_G * (c_free - c_ref)`
//! - stripping rate    `k_L * (c_free - c_ref)`
//! - membrane flux     `P_A * c_free / δ`
//!
//! where `c_free = c_total * fraction(pH)` (see [`super::ammonia_equilibrium`]), `c_ref = 0.034`
//! is the reference (equilibrium) concentration and `δ = 0.001` the membrane thickness.
//! Negative rates mean the driving force is reversed; they are kept as they are.
//!
//! ## Main structures
//! - `MassTransferParameter`: names the four user-adjustable parameters
//! - `MassTransferParams`: effective values of the parameters
//! - `MassTransferResult`: the three series, aligned with the time index of the dataset
//!
//! The calculation has no state and no randomness: the same series and parameters always
//! give bit-identical output.
use super::ammonia_equilibrium::{available_ammonia, nh3_fraction_default};
use crate::AmmoniaData::AmmoniaDataset;
use crate::error::{AmmoniaError, Result};
use log::debug;
use nalgebra::DVector;
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference concentration subtracted before scaling by k_G or k_L, mol basis
pub const REFERENCE_CONCENTRATION: f64 = 0.034;
/// Membrane thickness dividing the permeability-weighted free ammonia
pub const MEMBRANE_THICKNESS: f64 = 0.001;

/// The four user-adjustable parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MassTransferParameter {
    /// gas-phase mass-transfer coefficient k_G
    GasCoefficient,
    /// liquid-phase mass-transfer coefficient k_L
    LiquidCoefficient,
    /// membrane permeability P_A
    Permeability,
    PH,
}

impl MassTransferParameter {
    pub const ALL: [MassTransferParameter; 4] = [
        MassTransferParameter::GasCoefficient,
        MassTransferParameter::LiquidCoefficient,
        MassTransferParameter::Permeability,
        MassTransferParameter::PH,
    ];
    /// short name used in configuration files and on the console
    pub fn key(&self) -> &'static str {
        match self {
            MassTransferParameter::GasCoefficient => "k_g",
            MassTransferParameter::LiquidCoefficient => "k_l",
            MassTransferParameter::Permeability => "p_a",
            MassTransferParameter::PH => "ph",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MassTransferParameter::GasCoefficient => "k_G",
            MassTransferParameter::LiquidCoefficient => "k_L",
            MassTransferParameter::Permeability => "P_A",
            MassTransferParameter::PH => "pH",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            MassTransferParameter::GasCoefficient => "mol/m²·s·Pa",
            MassTransferParameter::LiquidCoefficient => "mol/m²·s·Pa",
            MassTransferParameter::Permeability => "mol/m²·s",
            MassTransferParameter::PH => "",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.key().eq_ignore_ascii_case(key) || p.label() == key)
    }
}

impl fmt::Display for MassTransferParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit().is_empty() {
            write!(f, "{}", self.label())
        } else {
            write!(f, "{} ({})", self.label(), self.unit())
        }
    }
}

/// Effective (already scaled) values of the mass-transfer parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[allow(non_snake_case)]
pub struct MassTransferParams {
    pub k_G: f64,
    pub k_L: f64,
    pub P_A: f64,
    pub pH: f64,
}

impl Default for MassTransferParams {
    fn default() -> Self {
        Self::new(0.010, 0.005, 0.010, 7.5)
    }
}

#[allow(non_snake_case)]
impl MassTransferParams {
    pub fn new(k_G: f64, k_L: f64, P_A: f64, pH: f64) -> Self {
        Self { k_G, k_L, P_A, pH }
    }

    pub fn get(&self, parameter: MassTransferParameter) -> f64 {
        match parameter {
            MassTransferParameter::GasCoefficient => self.k_G,
            MassTransferParameter::LiquidCoefficient => self.k_L,
            MassTransferParameter::Permeability => self.P_A,
            MassTransferParameter::PH => self.pH,
        }
    }

    pub fn set(&mut self, parameter: MassTransferParameter, value: f64) {
        match parameter {
            MassTransferParameter::GasCoefficient => self.k_G = value,
            MassTransferParameter::LiquidCoefficient => self.k_L = value,
            MassTransferParameter::Permeability => self.P_A = value,
            MassTransferParameter::PH => self.pH = value,
        }
    }
    /// ranges are checked at the slider boundary, here only NaN and infinities are rejected
    pub fn validate(&self) -> Result<()> {
        for parameter in MassTransferParameter::ALL {
            let value = self.get(parameter);
            if !value.is_finite() {
                return Err(AmmoniaError::invalid_parameter(
                    parameter.key(),
                    format!("value must be finite, got {}", value),
                ));
            }
        }
        Ok(())
    }
}

/// Absorption rate, stripping rate and membrane flux for every record of a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MassTransferResult {
    pub params: MassTransferParams,
    /// free-ammonia fraction at `params.pH`
    pub nh3_fraction: f64,
    pub available_ammonia: DVector<f64>,
    pub absorption_rate: DVector<f64>,
    pub stripping_rate: DVector<f64>,
    pub membrane_flux: DVector<f64>,
}

impl MassTransferResult {
    /// Computes the three series for the loaded dataset.
    /// Without a dataset there is nothing to compute and `InvalidDataset` is returned
    pub fn calculate(
        dataset: Option<&AmmoniaDataset>,
        params: &MassTransferParams,
    ) -> Result<Self> {
        match dataset {
            Some(dataset) => Self::from_series(dataset.ammonia(), params),
            None => Err(AmmoniaError::InvalidDataset(
                "no dataset loaded".to_string(),
            )),
        }
    }

    /// Computes the three series for a raw total-ammonia series
    pub fn from_series(total_ammonia: &DVector<f64>, params: &MassTransferParams) -> Result<Self> {
        params.validate()?;
        let nh3_fraction = nh3_fraction_default(params.pH);
        let available = available_ammonia(total_ammonia, params.pH);

        let absorption_rate = available.map(|c| params.k_G * (c - REFERENCE_CONCENTRATION));
        let stripping_rate = available.map(|c| params.k_L * (c - REFERENCE_CONCENTRATION));
        let membrane_flux = available.map(|c| (params.P_A * c) / MEMBRANE_THICKNESS);
        debug!(
            "mass transfer recomputed for {} records: k_G = {}, k_L = {}, P_A = {}, pH = {}, NH3 fraction = {:.6}",
            total_ammonia.len(),
            params.k_G,
            params.k_L,
            params.P_A,
            params.pH,
            nh3_fraction
        );
        Ok(Self {
            params: *params,
            nh3_fraction,
            available_ammonia: available,
            absorption_rate,
            stripping_rate,
            membrane_flux,
        })
    }

    pub fn len(&self) -> usize {
        self.absorption_rate.len()
    }

    pub fn is_empty(&self) -> bool {
        self.absorption_rate.is_empty()
    }

    /// Table of the first `max_rows` records (all records if `None`)
    pub fn to_table(&self, max_rows: Option<usize>) -> Table {
        let mut table = Table::new();
        table.add_row(Row::new(vec![
            Cell::new("Time"),
            Cell::new("Free NH3"),
            Cell::new("Absorption rate"),
            Cell::new("Stripping rate"),
            Cell::new("Membrane flux"),
        ]));
        let rows = max_rows.unwrap_or(self.len()).min(self.len());
        for i in 0..rows {
            table.add_row(Row::new(vec![
                Cell::new(&i.to_string()),
                Cell::new(&format!("{:.6e}", self.available_ammonia[i])),
                Cell::new(&format!("{:.6e}", self.absorption_rate[i])),
                Cell::new(&format!("{:.6e}", self.stripping_rate[i])),
                Cell::new(&format!("{:.6e}", self.membrane_flux[i])),
            ]));
        }
        table
    }

    pub fn pretty_print(&self, max_rows: Option<usize>) {
        println!(
            "k_G = {}, k_L = {}, P_A = {}, pH = {} (NH3 fraction {:.6})",
            self.params.k_G, self.params.k_L, self.params.P_A, self.params.pH, self.nh3_fraction
        );
        self.to_table(max_rows).printstd();
        if let Some(max_rows) = max_rows {
            if max_rows < self.len() {
                println!("... {} more records", self.len() - max_rows);
            }
        }
    }
}
