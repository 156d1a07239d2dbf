//! The trained vectorizer + classifier + label encoder triple.

use serde::{Deserialize, Serialize};

use super::{argmax, LabelEncoder, MultinomialNb, TfidfVectorizer};
use crate::models::{InteractionResult, PairKey, ResultSource};

/// A trained model. The three parts are only meaningful together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    vectorizer: TfidfVectorizer,
    classifier: MultinomialNb,
    labels: LabelEncoder,
}

impl TrainedModel {
    pub fn new(vectorizer: TfidfVectorizer, classifier: MultinomialNb, labels: LabelEncoder) -> Self {
        Self {
            vectorizer,
            classifier,
            labels,
        }
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    pub fn classifier(&self) -> &MultinomialNb {
        &self.classifier
    }

    pub fn labels(&self) -> &LabelEncoder {
        &self.labels
    }

    /// Describe the first mismatch between the parts, if any.
    pub fn consistency_error(&self) -> Option<String> {
        if !self.vectorizer.is_consistent() {
            return Some("vectorizer vocabulary and weights disagree".into());
        }
        if !self.labels.is_consistent() {
            return Some("label encoder classes are empty or unsorted".into());
        }
        if !self.classifier.is_consistent() {
            return Some("classifier parameters are malformed".into());
        }
        if self.classifier.n_features() != self.vectorizer.n_features() {
            return Some(format!(
                "classifier expects {} features, vectorizer produces {}",
                self.classifier.n_features(),
                self.vectorizer.n_features()
            ));
        }
        if self.classifier.n_classes() != self.labels.len() {
            return Some(format!(
                "classifier has {} classes, label encoder has {}",
                self.classifier.n_classes(),
                self.labels.len()
            ));
        }
        None
    }

    /// Score a pair: vectorize its key text, take the most probable class.
    ///
    /// Confidence is that class's probability in percent. Pairs with no known
    /// terms fall back to the class priors.
    pub fn predict(&self, key: &PairKey) -> InteractionResult {
        let features = self.vectorizer.transform(&key.as_text());
        let probabilities = self.classifier.predict_proba(&features);

        let (index, probability) = argmax(&probabilities).unwrap_or((0, 0.0));
        let level = self.labels.decode(index).unwrap_or_default().to_string();

        InteractionResult {
            level,
            confidence: probability * 100.0,
            source: ResultSource::Model,
        }
    }
}
