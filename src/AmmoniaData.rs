//! # Ammonia dataset
//!
//! A loaded measurement series: one ammonia concentration per record, in file order.
//! The time index of a record is its 0-based position, so the indices are always the
//! contiguous integers `0..len`. A dataset is never edited after it has been created;
//! loading another file creates a new one that replaces the old one in the session.
use crate::Utils::load_from_file::load_column_from_file;
use crate::error::{AmmoniaError, Result};
use nalgebra::{DMatrix, DVector};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct AmmoniaDataset {
    /// file the data came from, `None` for in-memory data
    source: Option<PathBuf>,
    column: String,
    time_index: DVector<f64>,
    ammonia: DVector<f64>,
}

impl AmmoniaDataset {
    /// Builds a dataset from already parsed concentrations
    pub fn from_values(values: Vec<f64>, column: &str) -> Result<Self> {
        if values.is_empty() {
            return Err(AmmoniaError::InvalidDataset(format!(
                "column '{}' contains no records",
                column
            )));
        }
        if let Some((row, bad)) = values
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v < 0.0)
        {
            return Err(AmmoniaError::InvalidDataset(format!(
                "'{}' in row {} must be a finite non-negative number, got {}",
                column,
                row + 1,
                bad
            )));
        }
        let n = values.len();
        Ok(Self {
            source: None,
            column: column.to_string(),
            time_index: DVector::from_iterator(n, (0..n).map(|i| i as f64)),
            ammonia: DVector::from_vec(values),
        })
    }

    pub fn from_csv<P: AsRef<Path>>(path: P, column: &str) -> Result<Self> {
        let path = path.as_ref();
        let values = load_column_from_file(path, column)?;
        let mut dataset = Self::from_values(values, column)?;
        dataset.source = Some(path.to_path_buf());
        Ok(dataset)
    }

    pub fn len(&self) -> usize {
        self.ammonia.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ammonia.is_empty()
    }

    pub fn ammonia(&self) -> &DVector<f64> {
        &self.ammonia
    }

    pub fn time_index(&self) -> &DVector<f64> {
        &self.time_index
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Predictor matrix for the forecast: one row per record, the time index as the only column
    pub fn feature_matrix(&self) -> DMatrix<f64> {
        DMatrix::from_column_slice(self.len(), 1, self.time_index.as_slice())
    }
}
