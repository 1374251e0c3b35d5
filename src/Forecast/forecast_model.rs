//! # Ammonia forecast
//!
//! ## Aim
//! Checks how well the ammonia concentration can be predicted from the time index alone:
//! the records are split into a training and a held-out subset, a random forest is fitted
//! on the training subset and its predictions for the held-out records are compared with
//! the measured values.
//!
//! ## Main Data Structures and Logic
//! - `ForecastConfig`: hyperparameters, held-out fraction and the seed; all randomness of the
//!   split and of the forest is derived from that seed, so a run is reproducible
//! - `TrainTestSplit`: shuffled record indices, held-out part first
//! - `ForecastResult`: held-out time indices, actual and predicted values, metrics
//!
//! ## Split policy
//! `n_test = ceil(test_fraction * n)` and `n_train = n - n_test`. With the default fraction
//! 0.2 a dataset of 2 records gives one record to each side, fewer than 2 records is an
//! invalid dataset.
use super::metrics::ForecastMetrics;
use super::random_forest::RandomForestRegressor;
use super::decision_tree::TreeParams;
use crate::AmmoniaData::AmmoniaDataset;
use crate::error::{AmmoniaError, Result};
use log::info;
use nalgebra::DVector;
use prettytable::{Cell, Row, Table};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

pub const DEFAULT_N_TREES: usize = 200;
pub const DEFAULT_MAX_DEPTH: usize = 15;
pub const DEFAULT_TEST_FRACTION: f64 = 0.2;
pub const DEFAULT_SEED: u64 = 42;
/// bins of the prediction-error histogram
pub const HISTOGRAM_BINS: usize = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: Option<usize>,
    pub test_fraction: f64,
    pub seed: u64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            n_trees: DEFAULT_N_TREES,
            max_depth: DEFAULT_MAX_DEPTH,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            test_fraction: DEFAULT_TEST_FRACTION,
            seed: DEFAULT_SEED,
        }
    }
}

impl ForecastConfig {
    pub fn validate(&self) -> Result<()> {
        if self.n_trees == 0 {
            return Err(AmmoniaError::invalid_parameter("n_trees", "must be at least 1"));
        }
        if self.max_depth == 0 {
            return Err(AmmoniaError::invalid_parameter("max_depth", "must be at least 1"));
        }
        if self.min_samples_split < 2 {
            return Err(AmmoniaError::invalid_parameter(
                "min_samples_split",
                "must be at least 2",
            ));
        }
        if self.min_samples_leaf == 0 {
            return Err(AmmoniaError::invalid_parameter(
                "min_samples_leaf",
                "must be at least 1",
            ));
        }
        if self.max_features == Some(0) {
            return Err(AmmoniaError::invalid_parameter(
                "max_features",
                "must be at least 1",
            ));
        }
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(AmmoniaError::invalid_parameter(
                "test_fraction",
                format!("must lie strictly between 0 and 1, got {}", self.test_fraction),
            ));
        }
        Ok(())
    }

    pub fn tree_params(&self) -> TreeParams {
        TreeParams {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            max_features: self.max_features,
        }
    }

    pub fn build_forest(&self) -> RandomForestRegressor {
        RandomForestRegressor::new(self.n_trees, self.tree_params(), self.seed)
    }
}

/// Record indices of the two subsets
#[derive(Debug, Clone, PartialEq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Size of the held-out subset for `n_samples` records
pub fn test_size(n_samples: usize, test_fraction: f64) -> usize {
    (test_fraction * n_samples as f64).ceil() as usize
}

/// Shuffles `0..n_samples` with the seed and cuts off the held-out part
pub fn train_test_split(n_samples: usize, test_fraction: f64, seed: u64) -> Result<TrainTestSplit> {
    if n_samples < 2 {
        return Err(AmmoniaError::InvalidDataset(format!(
            "at least 2 records are needed to split into training and held-out data, got {}",
            n_samples
        )));
    }
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(AmmoniaError::invalid_parameter(
            "test_fraction",
            format!("must lie strictly between 0 and 1, got {}", test_fraction),
        ));
    }
    let n_test = test_size(n_samples, test_fraction);
    if n_test == 0 || n_test >= n_samples {
        return Err(AmmoniaError::InvalidDataset(format!(
            "held-out fraction {} leaves an empty subset for {} records",
            test_fraction, n_samples
        )));
    }
    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);
    let train = indices.split_off(n_test);
    Ok(TrainTestSplit {
        train,
        test: indices,
    })
}

/// Equal-width histogram of prediction errors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorHistogram {
    /// `counts.len() + 1` bin edges
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl ErrorHistogram {
    /// Bins `values` over their own range; the last bin includes its right edge.
    /// A zero-width range is widened to ±0.5 around the value, an empty input uses 0..1.
    pub fn new(values: &[f64], bins: usize) -> Self {
        let bins = bins.max(1);
        let (mut lo, mut hi) = if values.is_empty() {
            (0.0, 1.0)
        } else {
            values
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                    (lo.min(v), hi.max(v))
                })
        };
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }
        let width = (hi - lo) / bins as f64;
        let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
        let mut counts = vec![0; bins];
        for &v in values {
            let bin = (((v - lo) / (hi - lo)) * bins as f64).floor() as usize;
            counts[bin.min(bins - 1)] += 1;
        }
        Self { edges, counts }
    }

    pub fn bin_width(&self) -> f64 {
        self.edges[1] - self.edges[0]
    }

    pub fn bin_centers(&self) -> Vec<f64> {
        self.edges.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    /// time index of every held-out record, in split order
    pub time_index: DVector<f64>,
    pub actual: DVector<f64>,
    pub predicted: DVector<f64>,
    pub metrics: ForecastMetrics,
    pub n_train: usize,
}

impl ForecastResult {
    /// actual - predicted
    pub fn residuals(&self) -> DVector<f64> {
        &self.actual - &self.predicted
    }

    pub fn error_histogram(&self, bins: usize) -> ErrorHistogram {
        ErrorHistogram::new(self.residuals().as_slice(), bins)
    }

    pub fn metrics_text(&self) -> String {
        self.metrics.metrics_text()
    }

    pub fn n_test(&self) -> usize {
        self.actual.len()
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.add_row(Row::new(vec![
            Cell::new("Time"),
            Cell::new("Actual"),
            Cell::new("Predicted"),
            Cell::new("Residual"),
        ]));
        let residuals = self.residuals();
        for i in 0..self.n_test() {
            table.add_row(Row::new(vec![
                Cell::new(&format!("{}", self.time_index[i])),
                Cell::new(&format!("{:.4}", self.actual[i])),
                Cell::new(&format!("{:.4}", self.predicted[i])),
                Cell::new(&format!("{:.4}", residuals[i])),
            ]));
        }
        table
    }

    pub fn pretty_print(&self) {
        println!(
            "trained on {} records, evaluated on {} held-out records",
            self.n_train,
            self.n_test()
        );
        self.metrics.to_table().printstd();
        self.to_table().printstd();
    }
}

/// Splits the dataset, fits the forest on the training part and evaluates it on the held-out part
pub fn run_forecast(dataset: &AmmoniaDataset, config: &ForecastConfig) -> Result<ForecastResult> {
    let split = train_test_split(dataset.len(), config.test_fraction, config.seed)?;
    info!(
        "Train/test split: {} training and {} held-out records (seed {})",
        split.train.len(),
        split.test.len(),
        config.seed
    );
    let x = dataset.feature_matrix();
    let y = dataset.ammonia();
    let x_train = x.select_rows(split.train.iter());
    let y_train = y.select_rows(split.train.iter());
    let x_test = x.select_rows(split.test.iter());
    let actual = y.select_rows(split.test.iter());
    let time_index = dataset.time_index().select_rows(split.test.iter());

    let mut forest = config.build_forest();
    forest.fit(&x_train, &y_train)?;
    let predicted = forest.predict(&x_test)?;

    let metrics = ForecastMetrics::compute(actual.as_slice(), predicted.as_slice());
    info!("{}", metrics.metrics_text());
    Ok(ForecastResult {
        time_index,
        actual,
        predicted,
        metrics,
        n_train: split.train.len(),
    })
}
