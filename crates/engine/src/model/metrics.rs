//! Held-out evaluation metrics
//!
//! Diagnostic only; nothing here can fail training.

use serde::{Deserialize, Serialize};

/// Precision, recall and F1 for one class
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Held-out rows whose true label is this class
    pub support: usize,
}

/// Averages across the two classes
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_negative: usize,
    pub false_positive: usize,
    pub false_negative: usize,
    pub true_positive: usize,
}

impl ConfusionMatrix {
    pub fn from_predictions(labels: &[bool], predicted: impl Iterator<Item = bool>) -> Self {
        let mut matrix = Self::default();
        for (&actual, predicted) in labels.iter().zip(predicted) {
            match (actual, predicted) {
                (false, false) => matrix.true_negative += 1,
                (false, true) => matrix.false_positive += 1,
                (true, false) => matrix.false_negative += 1,
                (true, true) => matrix.true_positive += 1,
            }
        }
        matrix
    }

    pub fn total(&self) -> usize {
        self.true_negative + self.false_positive + self.false_negative + self.true_positive
    }

    fn converted(&self) -> ClassMetrics {
        class_metrics(self.true_positive, self.false_positive, self.false_negative)
    }

    fn not_converted(&self) -> ClassMetrics {
        class_metrics(self.true_negative, self.false_negative, self.false_positive)
    }
}

/// Zero denominators yield 0 rather than NaN
fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn class_metrics(true_pos: usize, false_pos: usize, false_neg: usize) -> ClassMetrics {
    let precision = ratio(true_pos, true_pos + false_pos);
    let recall = ratio(true_pos, true_pos + false_neg);
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };
    ClassMetrics {
        precision,
        recall,
        f1,
        support: true_pos + false_neg,
    }
}

/// Classification report for the held-out partition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub not_converted: ClassMetrics,
    pub converted: ClassMetrics,
    pub accuracy: f64,
    pub macro_avg: AverageMetrics,
    pub weighted_avg: AverageMetrics,
    pub confusion_matrix: ConfusionMatrix,
    /// Area under the ROC curve for the converted class; `None` when the
    /// held-out rows are all one class
    pub roc_auc: Option<f64>,
    pub decision_threshold: f64,
    pub train_samples: usize,
    pub test_samples: usize,
}

impl EvaluationReport {
    /// Score held-out probabilities; a row is predicted to convert when its
    /// probability is at or above `decision_threshold`
    pub fn evaluate(
        labels: &[bool],
        probabilities: &[f64],
        decision_threshold: f64,
        train_samples: usize,
    ) -> Self {
        let confusion_matrix = ConfusionMatrix::from_predictions(
            labels,
            probabilities.iter().map(|&p| p >= decision_threshold),
        );
        let converted = confusion_matrix.converted();
        let not_converted = confusion_matrix.not_converted();
        let total = confusion_matrix.total();

        let macro_avg = AverageMetrics {
            precision: (converted.precision + not_converted.precision) / 2.0,
            recall: (converted.recall + not_converted.recall) / 2.0,
            f1: (converted.f1 + not_converted.f1) / 2.0,
        };

        let weight = |c: &ClassMetrics| ratio(c.support, total);
        let weighted = |f: fn(&ClassMetrics) -> f64| {
            f(&converted) * weight(&converted) + f(&not_converted) * weight(&not_converted)
        };
        let weighted_avg = AverageMetrics {
            precision: weighted(|c| c.precision),
            recall: weighted(|c| c.recall),
            f1: weighted(|c| c.f1),
        };

        Self {
            not_converted,
            converted,
            accuracy: ratio(
                confusion_matrix.true_positive + confusion_matrix.true_negative,
                total,
            ),
            macro_avg,
            weighted_avg,
            confusion_matrix,
            roc_auc: roc_auc(probabilities, labels),
            decision_threshold,
            train_samples,
            test_samples: total,
        }
    }
}

/// Rank-based ROC AUC (Mann-Whitney U); tied scores share their average rank
///
/// Returns `None` unless both classes are present.
pub fn roc_auc(scores: &[f64], labels: &[bool]) -> Option<f64> {
    let n = scores.len().min(labels.len());
    let positives = labels[..n].iter().filter(|&&l| l).count();
    let negatives = n - positives;
    if positives == 0 || negatives == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut positive_rank_sum = 0.0;
    let mut start = 0;
    while start < n {
        let mut end = start + 1;
        while end < n && scores[order[end]] == scores[order[start]] {
            end += 1;
        }
        // Ranks are 1-based: the tie group spans ranks start+1..=end
        let average_rank = (start + 1 + end) as f64 / 2.0;
        let tied_positives = order[start..end].iter().filter(|&&i| labels[i]).count();
        positive_rank_sum += average_rank * tied_positives as f64;
        start = end;
    }

    let p = positives as f64;
    Some((positive_rank_sum - p * (p + 1.0) / 2.0) / (p * negatives as f64))
}
