//! Forecast accuracy metrics
//!
//! All functions take the actual values first and the predicted values second and
//! return NaN when the slices are empty or of different length.
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};

/// Mean Squared Error: mean of (actual - predicted)²
pub fn mse(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }
    let sum: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    sum / actual.len() as f64
}

/// Mean Absolute Error: mean of |actual - predicted|
pub fn mae(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }
    let sum: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).abs())
        .sum();
    sum / actual.len() as f64
}

/// Coefficient of determination R² = 1 - SS_res / SS_tot.
///
/// When the actual values have no variance (SS_tot = 0) the ratio is undefined;
/// the result is then 1.0 for a perfect prediction and 0.0 otherwise.
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_res: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    if ss_tot == 0.0 {
        if ss_res == 0.0 { 1.0 } else { 0.0 }
    } else {
        1.0 - ss_res / ss_tot
    }
}

/// The three summary metrics of a forecast
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastMetrics {
    pub mse: f64,
    pub mae: f64,
    pub r2: f64,
}

impl ForecastMetrics {
    pub fn compute(actual: &[f64], predicted: &[f64]) -> Self {
        Self {
            mse: mse(actual, predicted),
            mae: mae(actual, predicted),
            r2: r2_score(actual, predicted),
        }
    }
    /// Text shown under the evaluation plots
    pub fn metrics_text(&self) -> String {
        format!(
            "RandomForest Metrics:\nR2: {:.4}\nMSE: {:.4}\nMAE: {:.4}",
            self.r2, self.mse, self.mae
        )
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.add_row(Row::new(vec![Cell::new("Metric"), Cell::new("Value")]));
        table.add_row(Row::new(vec![
            Cell::new("R2"),
            Cell::new(&format!("{:.4}", self.r2)),
        ]));
        table.add_row(Row::new(vec![
            Cell::new("MSE"),
            Cell::new(&format!("{:.4}", self.mse)),
        ]));
        table.add_row(Row::new(vec![
            Cell::new("MAE"),
            Cell::new(&format!("{:.4}", self.mae)),
        ]));
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_perfect_prediction() {
        let actual = vec![0.5, 1.5, 2.0, 7.25];
        let metrics = ForecastMetrics::compute(&actual, &actual);
        assert_eq!(metrics.mse, 0.0);
        assert_eq!(metrics.mae, 0.0);
        assert_eq!(metrics.r2, 1.0);
    }

    #[test]
    fn test_known_values() {
        let actual = vec![1.0, 2.0, 3.0, 4.0];
        let predicted = vec![1.5, 2.0, 2.0, 5.0];
        // residuals 0.5, 0, -1, 1
        assert_relative_eq!(mse(&actual, &predicted), 2.25 / 4.0);
        assert_relative_eq!(mae(&actual, &predicted), 2.5 / 4.0);
        // ss_tot = 5
        assert_relative_eq!(r2_score(&actual, &predicted), 1.0 - 2.25 / 5.0);
    }

    #[test]
    fn test_mean_prediction_has_zero_r2() {
        let actual = vec![1.0, 2.0, 3.0];
        let predicted = vec![2.0, 2.0, 2.0];
        assert_relative_eq!(r2_score(&actual, &predicted), 0.0);
    }

    #[test]
    fn test_constant_actual() {
        let actual = vec![3.0, 3.0];
        assert_eq!(r2_score(&actual, &[3.0, 3.0]), 1.0);
        assert_eq!(r2_score(&actual, &[3.0, 4.0]), 0.0);
    }

    #[test]
    fn test_mismatched_or_empty() {
        assert!(mse(&[1.0], &[1.0, 2.0]).is_nan());
        assert!(mae(&[], &[]).is_nan());
        assert!(r2_score(&[], &[]).is_nan());
    }

    #[test]
    fn test_metrics_text() {
        let metrics = ForecastMetrics {
            mse: 0.123456,
            mae: 0.5,
            r2: 0.98766,
        };
        assert_eq!(
            metrics.metrics_text(),
            "RandomForest Metrics:\nR2: 0.9877\nMSE: 0.1235\nMAE: 0.5000"
        );
        assert_eq!(metrics.to_table().len(), 4);
    }
}
