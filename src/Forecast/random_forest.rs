//! # Random forest regressor
//!
//! Ensemble of [`RegressionTree`]s. Every tree is grown on a bootstrap resample
//! (n draws with replacement from the n training rows) and considers a random subset
//! of `max_features` features at each split. The forest prediction is the mean of the
//! tree predictions.
//!
//! All randomness comes from one `StdRng` seeded with the forest seed: it hands out a
//! seed to every tree in order, so the same seed, data and hyperparameters always give
//! the same forest.
use super::decision_tree::{RegressionTree, TreeParams};
use crate::error::{AmmoniaError, Result};
use log::info;
use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone)]
pub struct RandomForestRegressor {
    pub n_trees: usize,
    pub tree_params: TreeParams,
    pub seed: u64,
    trees: Vec<RegressionTree>,
}

impl RandomForestRegressor {
    pub fn new(n_trees: usize, tree_params: TreeParams, seed: u64) -> Self {
        Self {
            n_trees,
            tree_params,
            seed,
            trees: Vec::new(),
        }
    }

    fn check_input(&self, x: &DMatrix<f64>, y: &DVector<f64>) -> Result<()> {
        if self.n_trees == 0 {
            return Err(AmmoniaError::Fitting(
                "number of trees must be at least 1".to_string(),
            ));
        }
        if self.tree_params.max_depth == 0 {
            return Err(AmmoniaError::Fitting(
                "max_depth must be at least 1".to_string(),
            ));
        }
        if self.tree_params.min_samples_split < 2 || self.tree_params.min_samples_leaf < 1 {
            return Err(AmmoniaError::Fitting(format!(
                "min_samples_split must be >= 2 and min_samples_leaf >= 1, got {} and {}",
                self.tree_params.min_samples_split, self.tree_params.min_samples_leaf
            )));
        }
        if x.nrows() == 0 {
            return Err(AmmoniaError::Fitting("training set is empty".to_string()));
        }
        if x.nrows() != y.len() {
            return Err(AmmoniaError::Fitting(format!(
                "feature matrix has {} rows but target has {} values",
                x.nrows(),
                y.len()
            )));
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(AmmoniaError::Fitting(
                "training data contains non-finite values".to_string(),
            ));
        }
        Ok(())
    }

    /// Grows `n_trees` trees on `x` (one row per sample) and `y`; replaces any previous fit
    pub fn fit(&mut self, x: &DMatrix<f64>, y: &DVector<f64>) -> Result<()> {
        self.check_input(x, y)?;
        info!(
            "Fitting random forest: {} trees, max depth {}, {} samples, {} features",
            self.n_trees,
            self.tree_params.max_depth,
            x.nrows(),
            x.ncols()
        );
        let n = x.nrows();
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut trees = Vec::with_capacity(self.n_trees);
        for _ in 0..self.n_trees {
            let mut tree_rng = StdRng::seed_from_u64(rng.r#gen::<u64>());
            let bootstrap: Vec<usize> = (0..n).map(|_| tree_rng.gen_range(0..n)).collect();
            trees.push(RegressionTree::fit(
                x,
                y,
                &bootstrap,
                &self.tree_params,
                &mut tree_rng,
            )?);
        }
        self.trees = trees;
        info!("Random forest fitted");
        Ok(())
    }

    pub fn predict(&self, x: &DMatrix<f64>) -> Result<DVector<f64>> {
        let first = self
            .trees
            .first()
            .ok_or_else(|| AmmoniaError::Fitting("model is not fitted".to_string()))?;
        if x.ncols() != first.n_features() {
            return Err(AmmoniaError::Fitting(format!(
                "model was fitted on {} features, got {}",
                first.n_features(),
                x.ncols()
            )));
        }
        let mut sum = DVector::zeros(x.nrows());
        for tree in &self.trees {
            sum += tree.predict(x);
        }
        Ok(sum / self.trees.len() as f64)
    }

    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn linear_data(n: usize) -> (DMatrix<f64>, DVector<f64>) {
        let x = DMatrix::from_iterator(n, 1, (0..n).map(|i| i as f64));
        let y = DVector::from_iterator(n, (0..n).map(|i| 0.5 * i as f64 + 1.0));
        (x, y)
    }

    #[test]
    fn test_fit_and_predict() {
        let (x, y) = linear_data(50);
        let mut forest = RandomForestRegressor::new(20, TreeParams::default(), 42);
        forest.fit(&x, &y).unwrap();
        assert!(forest.is_fitted());
        assert_eq!(forest.trees().len(), 20);
        let predictions = forest.predict(&x).unwrap();
        assert_eq!(predictions.len(), 50);
        for i in 0..50 {
            // every prediction is a mean of training targets, inside their range
            assert!(predictions[i] >= 1.0 && predictions[i] <= 25.5);
            assert!((predictions[i] - y[i]).abs() < 2.0);
        }
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (x, y) = linear_data(30);
        let mut a = RandomForestRegressor::new(10, TreeParams::default(), 7);
        let mut b = RandomForestRegressor::new(10, TreeParams::default(), 7);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a.trees(), b.trees());
        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
    }

    #[test]
    fn test_constant_target() {
        let x = DMatrix::from_iterator(8, 1, (0..8).map(|i| i as f64));
        let y = DVector::from_element(8, 0.75);
        let mut forest = RandomForestRegressor::new(5, TreeParams::default(), 0);
        forest.fit(&x, &y).unwrap();
        let predictions = forest.predict(&x).unwrap();
        for p in predictions.iter() {
            assert_relative_eq!(*p, 0.75, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_fitting_errors() {
        let (x, y) = linear_data(5);
        let mut no_trees = RandomForestRegressor::new(0, TreeParams::default(), 0);
        assert!(matches!(no_trees.fit(&x, &y), Err(AmmoniaError::Fitting(_))));

        let flat = TreeParams {
            max_depth: 0,
            ..TreeParams::default()
        };
        let mut no_depth = RandomForestRegressor::new(3, flat, 0);
        assert!(matches!(no_depth.fit(&x, &y), Err(AmmoniaError::Fitting(_))));

        let mut forest = RandomForestRegressor::new(3, TreeParams::default(), 0);
        let empty_x = DMatrix::<f64>::zeros(0, 1);
        let empty_y = DVector::<f64>::zeros(0);
        assert!(matches!(forest.fit(&empty_x, &empty_y), Err(AmmoniaError::Fitting(_))));

        let mut bad_y = y.clone();
        bad_y[2] = f64::NAN;
        assert!(matches!(forest.fit(&x, &bad_y), Err(AmmoniaError::Fitting(_))));
    }

    #[test]
    fn test_predict_before_fit() {
        let (x, _) = linear_data(3);
        let forest = RandomForestRegressor::new(3, TreeParams::default(), 0);
        assert!(matches!(forest.predict(&x), Err(AmmoniaError::Fitting(_))));
    }

    #[test]
    fn test_predict_with_wrong_feature_count() {
        let (x, y) = linear_data(10);
        let mut forest = RandomForestRegressor::new(3, TreeParams::default(), 0);
        forest.fit(&x, &y).unwrap();
        let wide = DMatrix::<f64>::zeros(2, 2);
        assert!(forest.predict(&wide).is_err());
    }
}
