//! CART decision tree with Gini impurity for the binary conversion label

use rand::prelude::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Growth limits for a single tree
#[derive(Debug, Clone, Copy)]
pub(crate) struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Candidate features examined per split, already resolved
    pub max_features: usize,
}

/// Arena node; children always sit at higher indices than their parent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Leaf {
        /// Fraction of converted training rows that reached this leaf
        probability: f64,
        samples: usize,
    },
    Split {
        feature: usize,
        /// `value <= threshold` goes left
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

/// Best split found for one node
struct Candidate {
    feature: usize,
    threshold: f64,
    /// `n_left * gini_left + n_right * gini_right`
    weighted_impurity: f64,
}

struct Builder<'a, R> {
    features: &'a [Vec<f64>],
    labels: &'a [bool],
    params: TreeParams,
    rng: &'a mut R,
    nodes: Vec<Node>,
    /// Unnormalised impurity decrease per feature
    importance: Vec<f64>,
    max_depth_reached: usize,
}

impl DecisionTree {
    /// Grow a tree on `rows` (indices into `features`, repeats allowed)
    ///
    /// Returns the tree and its per-feature impurity decrease, normalised to
    /// sum to 1 (all zeros when the tree never split).
    pub(crate) fn fit<R: Rng>(
        features: &[Vec<f64>],
        labels: &[bool],
        rows: Vec<usize>,
        n_features: usize,
        params: TreeParams,
        rng: &mut R,
    ) -> (Self, Vec<f64>) {
        let mut builder = Builder {
            features,
            labels,
            params,
            rng,
            nodes: Vec::new(),
            importance: vec![0.0; n_features],
            max_depth_reached: 0,
        };
        builder.grow(rows, 0);

        tracing::trace!(
            nodes = builder.nodes.len(),
            depth = builder.max_depth_reached,
            "Grew decision tree"
        );

        let mut importance = builder.importance;
        let total: f64 = importance.iter().sum();
        if total > 0.0 {
            importance.iter_mut().for_each(|v| *v /= total);
        }

        (
            Self {
                nodes: builder.nodes,
            },
            importance,
        )
    }

    /// Positive-class probability of the leaf `row` lands in
    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                Some(Node::Leaf { probability, .. }) => return *probability,
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = row.get(*feature).copied().unwrap_or(0.0);
                    index = if value <= *threshold { *left } else { *right };
                }
                None => return 0.0,
            }
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Longest root-to-leaf path, in edges
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], index: usize) -> usize {
            match nodes.get(index) {
                Some(Node::Split { left, right, .. }) => {
                    1 + walk(nodes, *left).max(walk(nodes, *right))
                }
                _ => 0,
            }
        }
        walk(&self.nodes, 0)
    }

    /// Structural check for trees read back from disk
    pub(crate) fn is_well_formed(&self, n_features: usize) -> bool {
        !self.nodes.is_empty()
            && self.nodes.iter().enumerate().all(|(i, node)| match node {
                Node::Leaf { probability, .. } => (0.0..=1.0).contains(probability),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    *feature < n_features
                        && !threshold.is_nan()
                        && *left > i
                        && *right > i
                        && *left < self.nodes.len()
                        && *right < self.nodes.len()
                }
            })
    }
}

fn gini(positives: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let p = positives as f64 / total as f64;
    2.0 * p * (1.0 - p)
}

impl<R: Rng> Builder<'_, R> {
    fn leaf(&mut self, positives: usize, samples: usize) -> usize {
        self.nodes.push(Node::Leaf {
            probability: positives as f64 / samples.max(1) as f64,
            samples,
        });
        self.nodes.len() - 1
    }

    fn grow(&mut self, rows: Vec<usize>, depth: usize) -> usize {
        self.max_depth_reached = self.max_depth_reached.max(depth);

        let n = rows.len();
        let positives = rows.iter().filter(|&&i| self.labels[i]).count();

        let depth_exhausted = self.params.max_depth.is_some_and(|max| depth >= max);
        if depth_exhausted
            || n < self.params.min_samples_split
            || n < 2 * self.params.min_samples_leaf
            || positives == 0
            || positives == n
        {
            return self.leaf(positives, n);
        }

        let Some(best) = self.best_split(&rows, positives) else {
            return self.leaf(positives, n);
        };

        let decrease = n as f64 * gini(positives, n) - best.weighted_impurity;
        self.importance[best.feature] += decrease.max(0.0);

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .into_iter()
            .partition(|&i| self.features[i][best.feature] <= best.threshold);

        // Reserve the slot so children land after their parent
        let index = self.nodes.len();
        self.nodes.push(Node::Leaf {
            probability: 0.0,
            samples: 0,
        });
        let left = self.grow(left_rows, depth + 1);
        let right = self.grow(right_rows, depth + 1);
        self.nodes[index] = Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left,
            right,
        };
        index
    }

    /// Scan candidate features in random order until `max_features`
    /// non-constant ones have been examined
    fn best_split(&mut self, rows: &[usize], positives: usize) -> Option<Candidate> {
        let n_features = self.importance.len();
        let mut order: Vec<usize> = (0..n_features).collect();
        order.shuffle(&mut *self.rng);

        let n = rows.len();
        let min_leaf = self.params.min_samples_leaf;
        let mut best: Option<Candidate> = None;
        let mut examined = 0;
        let mut column: Vec<(f64, bool)> = Vec::with_capacity(n);

        for feature in order {
            if examined >= self.params.max_features {
                break;
            }

            column.clear();
            column.extend(rows.iter().map(|&i| (self.features[i][feature], self.labels[i])));
            column.sort_by(|a, b| a.0.total_cmp(&b.0));

            if column[0].0 == column[n - 1].0 {
                continue;
            }
            examined += 1;

            let mut left_pos = 0;
            for split_at in 1..n {
                if column[split_at - 1].1 {
                    left_pos += 1;
                }
                let (lower, upper) = (column[split_at - 1].0, column[split_at].0);
                if lower == upper || split_at < min_leaf || n - split_at < min_leaf {
                    continue;
                }

                let weighted = split_at as f64 * gini(left_pos, split_at)
                    + (n - split_at) as f64 * gini(positives - left_pos, n - split_at);

                if best
                    .as_ref()
                    .map_or(true, |b| weighted < b.weighted_impurity)
                {
                    let mut threshold = lower + (upper - lower) / 2.0;
                    if threshold >= upper || !threshold.is_finite() {
                        threshold = lower;
                    }
                    best = Some(Candidate {
                        feature,
                        threshold,
                        weighted_impurity: weighted,
                    });
                }
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn params() -> TreeParams {
        TreeParams {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: 2,
        }
    }

    #[test]
    fn test_learns_single_threshold() {
        // Feature 0 separates the classes at 5; feature 1 is noise
        let features: Vec<Vec<f64>> = (0..10)
            .map(|i| vec![i as f64, ((i * 7) % 3) as f64])
            .collect();
        let labels: Vec<bool> = (0..10).map(|i| i >= 5).collect();
        let mut rng = StdRng::seed_from_u64(1);

        let (tree, importance) =
            DecisionTree::fit(&features, &labels, (0..10).collect(), 2, params(), &mut rng);

        assert_eq!(tree.predict(&[2.0, 0.0]), 0.0);
        assert_eq!(tree.predict(&[8.0, 0.0]), 1.0);
        assert_eq!(tree.depth(), 1);
        assert!(matches!(
            tree.nodes()[0],
            Node::Split { feature: 0, threshold, .. } if threshold == 4.5
        ));
        assert_eq!(importance, vec![1.0, 0.0]);
        assert!(tree.is_well_formed(2));
    }

    #[test]
    fn test_pure_node_is_leaf() {
        let features = vec![vec![1.0], vec![2.0], vec![3.0]];
        let labels = vec![true, true, true];
        let mut rng = StdRng::seed_from_u64(1);
        let (tree, importance) =
            DecisionTree::fit(&features, &labels, vec![0, 1, 2], 1, params(), &mut rng);
        assert_eq!(tree.nodes().len(), 1);
        assert_eq!(tree.predict(&[10.0]), 1.0);
        assert_eq!(importance, vec![0.0]);
    }

    #[test]
    fn test_max_depth_limits_growth() {
        let features: Vec<Vec<f64>> = (0..16).map(|i| vec![i as f64]).collect();
        let labels: Vec<bool> = (0..16).map(|i| i % 2 == 0).collect();
        let mut rng = StdRng::seed_from_u64(3);
        let limited = TreeParams {
            max_depth: Some(2),
            max_features: 1,
            ..params()
        };
        let (tree, _) =
            DecisionTree::fit(&features, &labels, (0..16).collect(), 1, limited, &mut rng);
        assert!(tree.depth() <= 2);
        for i in 0..16 {
            let p = tree.predict(&[i as f64]);
            assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn test_constant_features_make_a_leaf() {
        let features = vec![vec![1.0, 1.0]; 4];
        let labels = vec![true, false, true, false];
        let mut rng = StdRng::seed_from_u64(0);
        let (tree, _) =
            DecisionTree::fit(&features, &labels, vec![0, 1, 2, 3], 2, params(), &mut rng);
        assert_eq!(tree.nodes().len(), 1);
        assert_eq!(tree.predict(&[1.0, 1.0]), 0.5);
    }

    #[test]
    fn test_min_samples_leaf_respected() {
        let features: Vec<Vec<f64>> = (0..6).map(|i| vec![i as f64]).collect();
        let labels = vec![true, false, false, false, false, false];
        let mut rng = StdRng::seed_from_u64(0);
        let wide_leaves = TreeParams {
            min_samples_leaf: 3,
            max_features: 1,
            ..params()
        };
        let (tree, _) =
            DecisionTree::fit(&features, &labels, (0..6).collect(), 1, wide_leaves, &mut rng);
        for node in tree.nodes() {
            if let Node::Leaf { samples, .. } = node {
                assert!(*samples >= 3);
            }
        }
    }

    #[test]
    fn test_malformed_tree_detected() {
        let tree = DecisionTree {
            nodes: vec![Node::Split {
                feature: 0,
                threshold: 1.0,
                left: 0,
                right: 5,
            }],
        };
        assert!(!tree.is_well_formed(1));
        assert!(!DecisionTree { nodes: vec![] }.is_well_formed(1));
    }
}
