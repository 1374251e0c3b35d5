/// eng
/// Regression tree grown by the CART algorithm (squared-error criterion, midpoint thresholds),
/// stored as a flat vector of nodes
pub mod decision_tree;
/// eng
/// Bootstrap-aggregated forest of regression trees with per-split feature subsampling;
/// every random draw is derived from one explicit seed
pub mod random_forest;
/// eng
/// MSE, MAE and R² of a forecast
pub mod metrics;
/// eng
/// The forecast of ammonia concentration over time: seeded train/held-out split, forest fit,
/// evaluation on the held-out records, residuals and the prediction-error histogram.
/// # Examples
/// ```
/// use NH3Recovery::AmmoniaData::AmmoniaDataset;
/// use NH3Recovery::Forecast::forecast_model::{ForecastConfig, run_forecast};
/// let values: Vec<f64> = (0..50).map(|i| 1.0 + 0.1 * i as f64).collect();
/// let dataset = AmmoniaDataset::from_values(values, "Ammonia").unwrap();
/// let config = ForecastConfig { n_trees: 20, ..ForecastConfig::default() };
/// let result = run_forecast(&dataset, &config).unwrap();
/// assert_eq!(result.actual.len(), 10);
/// assert_eq!(result.predicted.len(), 10);
/// assert!(result.metrics.r2 > 0.9);
/// println!("{}", result.metrics_text());
/// ```
pub mod forecast_model;
