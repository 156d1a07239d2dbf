//! Drug-pair interaction classifier.
//!
//! A pair is first looked up in the curated override table; only pairs
//! without an override reach the trained model.

mod labels;
mod model;
mod naive_bayes;
mod overrides;
mod training;
mod vectorizer;

pub use labels::*;
pub use model::*;
pub use naive_bayes::*;
pub use overrides::*;
pub use training::*;
pub use vectorizer::*;

use tracing::debug;

use crate::models::{InteractionResult, PairKey};

/// Override table in front of a trained model.
pub struct InteractionClassifier {
    model: TrainedModel,
    overrides: OverrideTable,
}

impl InteractionClassifier {
    pub fn new(model: TrainedModel, overrides: OverrideTable) -> Self {
        Self { model, overrides }
    }

    /// Severity of the unordered pair `(a, b)`.
    ///
    /// Symmetric and deterministic: `check(a, b) == check(b, a)` and repeated
    /// calls return identical results.
    pub fn check(&self, a: &str, b: &str) -> InteractionResult {
        let key = PairKey::new(a, b);
        if let Some(level) = self.overrides.lookup(&key) {
            debug!(pair = %key, severity = level, "override hit");
            return InteractionResult::certain(level);
        }
        self.model.predict(&key)
    }

    pub fn model(&self) -> &TrainedModel {
        &self.model
    }

    pub fn overrides(&self) -> &OverrideTable {
        &self.overrides
    }
}
