//! Multinomial naive Bayes over sparse TF-IDF features.

use serde::{Deserialize, Serialize};

use super::SparseVector;

/// Fitted multinomial naive Bayes model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultinomialNb {
    alpha: f64,
    class_log_prior: Vec<f64>,
    /// `[class][feature]` smoothed log probabilities
    feature_log_prob: Vec<Vec<f64>>,
}

impl MultinomialNb {
    /// Fit on rows `x` with class indices `y` (each `< n_classes`).
    ///
    /// Every class in `0..n_classes` must occur at least once in `y`.
    pub fn fit(
        x: &[SparseVector],
        y: &[usize],
        n_classes: usize,
        n_features: usize,
        alpha: f64,
    ) -> Self {
        let mut class_count = vec![0.0f64; n_classes];
        let mut feature_count = vec![vec![0.0f64; n_features]; n_classes];

        for (row, &class) in x.iter().zip(y) {
            class_count[class] += 1.0;
            for &(feature, value) in row {
                feature_count[class][feature] += value;
            }
        }

        let total: f64 = class_count.iter().sum();
        let class_log_prior = class_count.iter().map(|c| (c / total).ln()).collect();

        let feature_log_prob = feature_count
            .into_iter()
            .map(|counts| {
                let denominator = counts.iter().sum::<f64>() + alpha * n_features as f64;
                counts
                    .into_iter()
                    .map(|c| ((c + alpha) / denominator).ln())
                    .collect()
            })
            .collect();

        Self {
            alpha,
            class_log_prior,
            feature_log_prob,
        }
    }

    pub fn n_classes(&self) -> usize {
        self.class_log_prior.len()
    }

    pub fn n_features(&self) -> usize {
        self.feature_log_prob.first().map_or(0, Vec::len)
    }

    /// Posterior class probabilities. Features beyond the fitted width are ignored.
    pub fn predict_proba(&self, x: &SparseVector) -> Vec<f64> {
        let joint: Vec<f64> = self
            .class_log_prior
            .iter()
            .zip(&self.feature_log_prob)
            .map(|(prior, log_probs)| {
                prior
                    + x.iter()
                        .filter_map(|&(f, v)| log_probs.get(f).map(|lp| v * lp))
                        .sum::<f64>()
            })
            .collect();

        let max = joint.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let log_norm = max + joint.iter().map(|j| (j - max).exp()).sum::<f64>().ln();
        joint.iter().map(|j| (j - log_norm).exp()).collect()
    }

    /// Most probable class and its probability. Ties go to the lowest index.
    pub fn predict(&self, x: &SparseVector) -> Option<(usize, f64)> {
        argmax(&self.predict_proba(x))
    }

    pub fn is_consistent(&self) -> bool {
        let width = self.n_features();
        self.alpha > 0.0
            && !self.class_log_prior.is_empty()
            && self.feature_log_prob.len() == self.class_log_prior.len()
            && self.feature_log_prob.iter().all(|row| row.len() == width)
            && self.class_log_prior.iter().all(|p| p.is_finite())
    }
}

/// Index of the largest value; the first one wins ties.
pub fn argmax(values: &[f64]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (index, &value) in values.iter().enumerate() {
        match best {
            Some((_, top)) if value <= top => {}
            _ => best = Some((index, value)),
        }
    }
    best
}
