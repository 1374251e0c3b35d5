//! # Regression tree (CART)
//!
//! Binary regression tree grown greedily by minimizing the squared error of the two
//! children at every split. The nodes are kept in a flat vector, children refer to
//! their parent by index and the root is node 0.
//!
//! A split on feature `f` at `threshold` sends a sample left when `x[f] <= threshold`.
//! Candidate thresholds are the midpoints between consecutive distinct feature values.
//! A node becomes a leaf when
//! - its depth reached `max_depth`
//! - it holds fewer than `min_samples_split` samples
//! - its targets are all equal
//! - no split leaves at least `min_samples_leaf` samples on both sides
//!
//! The leaf value is the mean target of the samples that reached it. Samples may repeat
//! (bootstrap resampling), a repeated sample simply counts several times.
use crate::error::{AmmoniaError, Result};
use nalgebra::{DMatrix, DVector};
use rand::Rng;
use rand::seq::index::sample;
use serde::{Deserialize, Serialize};

/// Growth limits of a single tree
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// number of features drawn at random for every split, `None` means all of them
    pub max_features: Option<usize>,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: 15,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TreeNode {
    Leaf {
        value: f64,
        n_samples: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
    n_features: usize,
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    /// sum_left²/n_left + sum_right²/n_right, larger is a lower squared error
    score: f64,
}

impl RegressionTree {
    /// Grows a tree on the rows `samples` of `x` / `y`.
    pub fn fit<R: Rng + ?Sized>(
        x: &DMatrix<f64>,
        y: &DVector<f64>,
        samples: &[usize],
        params: &TreeParams,
        rng: &mut R,
    ) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(AmmoniaError::Fitting(format!(
                "feature matrix has {} rows but target has {} values",
                x.nrows(),
                y.len()
            )));
        }
        if x.ncols() == 0 {
            return Err(AmmoniaError::Fitting(
                "feature matrix has no columns".to_string(),
            ));
        }
        if samples.is_empty() {
            return Err(AmmoniaError::Fitting(
                "cannot grow a tree without samples".to_string(),
            ));
        }
        if let Some(&bad) = samples.iter().find(|&&i| i >= y.len()) {
            return Err(AmmoniaError::Fitting(format!(
                "sample index {} out of range for {} rows",
                bad,
                y.len()
            )));
        }
        let mut tree = Self {
            nodes: Vec::new(),
            n_features: x.ncols(),
        };
        tree.grow(x, y, samples.to_vec(), 0, params, rng);
        Ok(tree)
    }

    fn grow<R: Rng + ?Sized>(
        &mut self,
        x: &DMatrix<f64>,
        y: &DVector<f64>,
        samples: Vec<usize>,
        depth: usize,
        params: &TreeParams,
        rng: &mut R,
    ) -> usize {
        let node_id = self.nodes.len();
        let n = samples.len();
        let mean = samples.iter().map(|&i| y[i]).sum::<f64>() / n as f64;
        self.nodes.push(TreeNode::Leaf {
            value: mean,
            n_samples: n,
        });

        // exact comparison keeps the stopping rule independent of the units of y
        let (lo, hi) = samples
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &i| {
                (lo.min(y[i]), hi.max(y[i]))
            });
        if depth >= params.max_depth
            || n < params.min_samples_split
            || n < 2 * params.min_samples_leaf
            || lo == hi
        {
            return node_id;
        }

        if let Some(split) = best_split(x, y, &samples, params, rng) {
            let (left_samples, right_samples): (Vec<usize>, Vec<usize>) = samples
                .into_iter()
                .partition(|&i| x[(i, split.feature)] <= split.threshold);
            let left = self.grow(x, y, left_samples, depth + 1, params, rng);
            let right = self.grow(x, y, right_samples, depth + 1, params, rng);
            self.nodes[node_id] = TreeNode::Split {
                feature: split.feature,
                threshold: split.threshold,
                left,
                right,
            };
        }
        node_id
    }

    /// Prediction for row `row` of `x`
    pub fn predict_sample(&self, x: &DMatrix<f64>, row: usize) -> f64 {
        let mut node = 0;
        loop {
            match &self.nodes[node] {
                TreeNode::Leaf { value, .. } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if x[(row, *feature)] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    pub fn predict(&self, x: &DMatrix<f64>) -> DVector<f64> {
        DVector::from_iterator(x.nrows(), (0..x.nrows()).map(|r| self.predict_sample(x, r)))
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, TreeNode::Leaf { .. }))
            .count()
    }

    /// depth of the deepest leaf, a lone root has depth 0
    pub fn depth(&self) -> usize {
        fn node_depth(nodes: &[TreeNode], node: usize) -> usize {
            match &nodes[node] {
                TreeNode::Leaf { .. } => 0,
                TreeNode::Split { left, right, .. } => {
                    1 + node_depth(nodes, *left).max(node_depth(nodes, *right))
                }
            }
        }
        node_depth(&self.nodes, 0)
    }
}

fn best_split<R: Rng + ?Sized>(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    samples: &[usize],
    params: &TreeParams,
    rng: &mut R,
) -> Option<SplitCandidate> {
    let n_features = x.ncols();
    let k = params
        .max_features
        .unwrap_or(n_features)
        .clamp(1, n_features);
    let features: Vec<usize> = if k < n_features {
        sample(rng, n_features, k).into_vec()
    } else {
        (0..n_features).collect()
    };

    let n = samples.len();
    let total_sum: f64 = samples.iter().map(|&i| y[i]).sum();
    let mut sorted = samples.to_vec();
    let mut best: Option<SplitCandidate> = None;

    for feature in features {
        sorted.sort_by(|&a, &b| x[(a, feature)].total_cmp(&x[(b, feature)]));
        let mut left_sum = 0.0;
        for pos in 0..n - 1 {
            let i = sorted[pos];
            left_sum += y[i];
            let n_left = pos + 1;
            let n_right = n - n_left;
            if n_left < params.min_samples_leaf || n_right < params.min_samples_leaf {
                continue;
            }
            let current = x[(i, feature)];
            let next = x[(sorted[pos + 1], feature)];
            // equal values cannot be separated
            if next <= current {
                continue;
            }
            let right_sum = total_sum - left_sum;
            let score = left_sum * left_sum / n_left as f64 + right_sum * right_sum / n_right as f64;
            if best.as_ref().is_none_or(|b| score > b.score) {
                let mut threshold = current + (next - current) / 2.0;
                if threshold >= next || !threshold.is_finite() {
                    threshold = current;
                }
                best = Some(SplitCandidate {
                    feature,
                    threshold,
                    score,
                });
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn time_matrix(n: usize) -> DMatrix<f64> {
        DMatrix::from_iterator(n, 1, (0..n).map(|i| i as f64))
    }

    #[test]
    fn test_step_function_stump() {
        let x = time_matrix(10);
        let y = DVector::from_iterator(10, (0..10).map(|i| if i < 5 { 1.0 } else { 3.0 }));
        let samples: Vec<usize> = (0..10).collect();
        let params = TreeParams {
            max_depth: 1,
            ..TreeParams::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        let tree = RegressionTree::fit(&x, &y, &samples, &params, &mut rng).unwrap();

        assert_eq!(tree.n_nodes(), 3);
        assert_eq!(tree.n_leaves(), 2);
        assert_eq!(tree.depth(), 1);
        match &tree.nodes()[0] {
            TreeNode::Split {
                feature, threshold, ..
            } => {
                assert_eq!(*feature, 0);
                assert_relative_eq!(*threshold, 4.5);
            }
            other => panic!("expected a split at the root, got {:?}", other),
        }
        let predictions = tree.predict(&x);
        assert_eq!(predictions, y);
    }

    #[test]
    fn test_constant_target_gives_single_leaf() {
        let x = time_matrix(6);
        let y = DVector::from_element(6, 2.5);
        let samples: Vec<usize> = (0..6).collect();
        let mut rng = StdRng::seed_from_u64(1);
        let tree = RegressionTree::fit(&x, &y, &samples, &TreeParams::default(), &mut rng).unwrap();
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.predict_sample(&x, 3), 2.5);
    }

    #[test]
    fn test_tiny_targets_still_split() {
        let x = time_matrix(10);
        let y = DVector::from_iterator(10, (0..10).map(|i| if i < 5 { 1e-10 } else { 3e-10 }));
        let samples: Vec<usize> = (0..10).collect();
        let mut rng = StdRng::seed_from_u64(0);
        let tree = RegressionTree::fit(&x, &y, &samples, &TreeParams::default(), &mut rng).unwrap();
        assert_eq!(tree.n_leaves(), 2);
        let predictions = tree.predict(&x);
        for i in 0..10 {
            assert_relative_eq!(predictions[i], y[i], max_relative = 1e-12);
        }
    }

    #[test]
    fn test_full_depth_tree_interpolates_training_data() {
        let n = 40;
        let x = time_matrix(n);
        let y = DVector::from_iterator(n, (0..n).map(|i| ((i as f64) * 0.3).sin() + 2.0));
        let samples: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(7);
        let tree = RegressionTree::fit(&x, &y, &samples, &TreeParams::default(), &mut rng).unwrap();
        let predictions = tree.predict(&x);
        for i in 0..n {
            assert_relative_eq!(predictions[i], y[i], epsilon = 1e-12);
        }
        assert!(tree.depth() <= 15);
    }

    #[test]
    fn test_max_depth_is_respected() {
        let n = 200;
        let x = time_matrix(n);
        let y = DVector::from_iterator(n, (0..n).map(|i| (i % 7) as f64));
        let samples: Vec<usize> = (0..n).collect();
        let params = TreeParams {
            max_depth: 3,
            ..TreeParams::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let tree = RegressionTree::fit(&x, &y, &samples, &params, &mut rng).unwrap();
        assert!(tree.depth() <= 3);
        assert!(tree.n_leaves() <= 8);
    }

    #[test]
    fn test_min_samples_leaf() {
        let x = time_matrix(4);
        let y = DVector::from_vec(vec![0.0, 10.0, 10.0, 10.0]);
        let samples: Vec<usize> = (0..4).collect();
        let params = TreeParams {
            min_samples_leaf: 2,
            ..TreeParams::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let tree = RegressionTree::fit(&x, &y, &samples, &params, &mut rng).unwrap();
        for node in tree.nodes() {
            if let TreeNode::Leaf { n_samples, .. } = node {
                assert!(*n_samples >= 2);
            }
        }
    }

    #[test]
    fn test_repeated_samples_weight_the_leaf_mean() {
        let x = time_matrix(2);
        let y = DVector::from_vec(vec![1.0, 4.0]);
        let params = TreeParams {
            max_depth: 0,
            ..TreeParams::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let tree = RegressionTree::fit(&x, &y, &[0, 0, 1], &params, &mut rng).unwrap();
        assert_relative_eq!(tree.predict_sample(&x, 0), 2.0);
    }

    #[test]
    fn test_invalid_input() {
        let x = time_matrix(3);
        let y = DVector::from_vec(vec![1.0, 2.0]);
        let mut rng = StdRng::seed_from_u64(0);
        let params = TreeParams::default();
        assert!(RegressionTree::fit(&x, &y, &[0, 1], &params, &mut rng).is_err());
        let y = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        assert!(RegressionTree::fit(&x, &y, &[], &params, &mut rng).is_err());
        assert!(RegressionTree::fit(&x, &y, &[0, 5], &params, &mut rng).is_err());
    }

    #[test]
    fn test_feature_subsampling_is_reproducible() {
        let n = 30;
        let x = DMatrix::from_fn(n, 3, |r, c| ((r * (c + 1)) % 11) as f64);
        let y = DVector::from_iterator(n, (0..n).map(|i| (i as f64).sqrt()));
        let samples: Vec<usize> = (0..n).collect();
        let params = TreeParams {
            max_features: Some(1),
            ..TreeParams::default()
        };
        let tree1 =
            RegressionTree::fit(&x, &y, &samples, &params, &mut StdRng::seed_from_u64(5)).unwrap();
        let tree2 =
            RegressionTree::fit(&x, &y, &samples, &params, &mut StdRng::seed_from_u64(5)).unwrap();
        assert_eq!(tree1, tree2);
        assert_eq!(tree1.n_features(), 3);
    }
}
