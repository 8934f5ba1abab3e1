//! Bagged ensemble of decision trees

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use lead_scoring_config::TrainingConfig;

use super::tree::{DecisionTree, TreeParams};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_features: usize,
}

impl RandomForest {
    /// Grow `config.n_trees` trees
    ///
    /// Every tree draws its own seed from a master RNG seeded with
    /// `config.seed`. Returns the forest and the mean per-tree impurity
    /// decrease, renormalised to sum to 1 (all zeros if no tree split).
    ///
    /// Inputs must be non-empty with one label per row, all rows
    /// `n_features` long; `ConversionModel` checks this before calling.
    pub(crate) fn fit(
        features: &[Vec<f64>],
        labels: &[bool],
        n_features: usize,
        config: &TrainingConfig,
    ) -> (Self, Vec<f64>) {
        let n = features.len();
        let params = TreeParams {
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split,
            min_samples_leaf: config.min_samples_leaf,
            max_features: config.max_features.resolve(n_features),
        };

        let mut master = StdRng::seed_from_u64(config.seed);
        let mut trees = Vec::with_capacity(config.n_trees);
        let mut importance = vec![0.0; n_features];

        for index in 0..config.n_trees {
            let mut rng = StdRng::seed_from_u64(master.gen());
            let rows: Vec<usize> = if config.bootstrap {
                (0..n).map(|_| rng.gen_range(0..n)).collect()
            } else {
                (0..n).collect()
            };

            let (tree, tree_importance) =
                DecisionTree::fit(features, labels, rows, n_features, params, &mut rng);

            tracing::debug!(tree = index, depth = tree.depth(), "Tree trained");

            for (total, value) in importance.iter_mut().zip(tree_importance) {
                *total += value;
            }
            trees.push(tree);
        }

        let sum: f64 = importance.iter().sum();
        if sum > 0.0 {
            importance.iter_mut().for_each(|v| *v /= sum);
        }

        (Self { trees, n_features }, importance)
    }

    /// Mean leaf probability across trees, in `[0, 1]`
    pub fn predict_probability(&self, row: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let total: f64 = self.trees.iter().map(|tree| tree.predict(row)).sum();
        (total / self.trees.len() as f64).clamp(0.0, 1.0)
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    pub(crate) fn is_well_formed(&self) -> bool {
        !self.trees.is_empty() && self.trees.iter().all(|t| t.is_well_formed(self.n_features))
    }
}
