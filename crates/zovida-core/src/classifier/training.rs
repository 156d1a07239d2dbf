//! Offline training of the pair classifier from the reference dataset.

use thiserror::Error;
use tracing::info;

use super::{LabelEncoder, MultinomialNb, TfidfVectorizer, TrainedModel};
use crate::models::ReferencePair;

/// Training errors.
#[derive(Error, Debug, PartialEq)]
pub enum TrainingError {
    #[error("Reference dataset is empty")]
    EmptyDataset,

    #[error("Reference row {0} has a blank level")]
    BlankLabel(usize),

    #[error("Reference dataset has no usable terms")]
    EmptyVocabulary,

    #[error("Smoothing alpha must be positive, got {0}")]
    InvalidAlpha(f64),
}

pub type TrainingResult<T> = Result<T, TrainingError>;

/// Fits vectorizer, label encoder and classifier together.
#[derive(Debug, Clone)]
pub struct Trainer {
    alpha: f64,
}

impl Default for Trainer {
    fn default() -> Self {
        Self { alpha: 1.0 }
    }
}

impl Trainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Additive smoothing for the classifier.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Train on labelled pairs. Each pair is keyed canonically, so row order
    /// and name order within a row do not change the model.
    pub fn fit(&self, pairs: &[ReferencePair]) -> TrainingResult<TrainedModel> {
        if !(self.alpha > 0.0 && self.alpha.is_finite()) {
            return Err(TrainingError::InvalidAlpha(self.alpha));
        }
        if pairs.is_empty() {
            return Err(TrainingError::EmptyDataset);
        }
        if let Some(index) = pairs.iter().position(|p| p.level.trim().is_empty()) {
            return Err(TrainingError::BlankLabel(index + 1));
        }

        let documents: Vec<String> = pairs.iter().map(|p| p.key().as_text()).collect();
        let vectorizer = TfidfVectorizer::fit(&documents);
        if vectorizer.n_features() == 0 {
            return Err(TrainingError::EmptyVocabulary);
        }

        let labels = LabelEncoder::fit(pairs.iter().map(|p| p.level.as_str()));
        let y: Vec<usize> = pairs
            .iter()
            .enumerate()
            .map(|(i, p)| labels.encode(&p.level).ok_or(TrainingError::BlankLabel(i + 1)))
            .collect::<TrainingResult<_>>()?;
        let x: Vec<_> = documents.iter().map(|d| vectorizer.transform(d)).collect();

        let classifier = MultinomialNb::fit(
            &x,
            &y,
            labels.len(),
            vectorizer.n_features(),
            self.alpha,
        );

        info!(
            rows = pairs.len(),
            features = vectorizer.n_features(),
            classes = labels.len(),
            "trained interaction classifier"
        );

        Ok(TrainedModel::new(vectorizer, classifier, labels))
    }
}
