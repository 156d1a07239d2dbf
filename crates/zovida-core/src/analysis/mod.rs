//! Prescription analysis: extraction, pairwise checks and lifestyle advice.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use zovida_llm::{DrugListExtractor, LifestyleAdviser, LlmClient};

use crate::artifacts::ArtifactBundle;
use crate::classifier::InteractionClassifier;
use crate::extractor::{DrugExtractor, PartialMatchPolicy};
use crate::lifestyle::LifestyleAdvisor;
use crate::models::{DrugInteraction, ExtractedDrugSet, InteractionResult, LifestyleWarning};

/// Full report for one prescription.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrescriptionAnalysis {
    pub analysis_id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Title-cased names, sorted
    pub drugs: Vec<String>,
    pub interactions: Vec<DrugInteraction>,
    pub lifestyle: Vec<LifestyleWarning>,
}

/// Every unordered pair `(items[i], items[j])` with `i < j`.
pub fn unordered_pairs<T>(items: &[T]) -> Vec<(&T, &T)> {
    let mut pairs = Vec::with_capacity(items.len() * items.len().saturating_sub(1) / 2);
    for (i, a) in items.iter().enumerate() {
        for b in &items[i + 1..] {
            pairs.push((a, b));
        }
    }
    pairs
}

/// Ties the extractor, classifier and lifestyle advisor together.
pub struct PrescriptionAnalyzer {
    extractor: DrugExtractor,
    classifier: InteractionClassifier,
    advisor: LifestyleAdvisor,
}

impl PrescriptionAnalyzer {
    pub fn new(
        extractor: DrugExtractor,
        classifier: InteractionClassifier,
        advisor: LifestyleAdvisor,
    ) -> Self {
        Self {
            extractor,
            classifier,
            advisor,
        }
    }

    /// Assemble from a loaded bundle. With a client, extraction and lifestyle
    /// advice fall back to the language model.
    pub fn from_bundle(
        bundle: ArtifactBundle,
        policy: PartialMatchPolicy,
        client: Option<Arc<dyn LlmClient>>,
    ) -> Self {
        let mut extractor = DrugExtractor::new(bundle.vocabulary, bundle.typos).with_policy(policy);
        let mut advisor = LifestyleAdvisor::new(bundle.lifestyle);
        if let Some(client) = client {
            extractor = extractor.with_fallback(Arc::new(DrugListExtractor::new(client.clone())));
            advisor = advisor.with_source(Arc::new(LifestyleAdviser::new(client)));
        }
        let classifier = InteractionClassifier::new(bundle.model, bundle.overrides);
        Self::new(extractor, classifier, advisor)
    }

    pub fn extractor(&self) -> &DrugExtractor {
        &self.extractor
    }

    pub fn classifier(&self) -> &InteractionClassifier {
        &self.classifier
    }

    pub fn extract_drugs(&self, text: &str) -> ExtractedDrugSet {
        self.extractor.extract(text)
    }

    pub fn check_interaction(&self, drug1: &str, drug2: &str) -> InteractionResult {
        self.classifier.check(drug1, drug2)
    }

    /// Interaction rows for a drug set.
    ///
    /// No drugs gives no rows; one drug gives a single `Safe` row with no
    /// partner; N drugs give one row per unordered pair.
    pub fn interactions_for(&self, drugs: &ExtractedDrugSet) -> Vec<DrugInteraction> {
        let names = drugs.to_vec();
        match names.as_slice() {
            [] => Vec::new(),
            [only] => vec![DrugInteraction::single(only)],
            _ => unordered_pairs(&names)
                .into_iter()
                .map(|(a, b)| DrugInteraction::pair(a, b, self.classifier.check(a, b)))
                .collect(),
        }
    }

    /// Analyze free prescription text (typed or OCR output).
    pub fn analyze_text(&self, text: &str) -> PrescriptionAnalysis {
        let drugs = self.extractor.extract(text);
        self.analyze_set(drugs)
    }

    /// Analyze a list of names entered by hand.
    ///
    /// The names go through the same extraction as free text so typos and
    /// partial names resolve against the vocabulary.
    pub fn analyze_manual(&self, names: &[String]) -> PrescriptionAnalysis {
        self.analyze_text(&names.join(" "))
    }

    fn analyze_set(&self, drugs: ExtractedDrugSet) -> PrescriptionAnalysis {
        let interactions = self.interactions_for(&drugs);
        let names = drugs.to_vec();
        let lifestyle = self.advisor.advise(&names);

        let analysis = PrescriptionAnalysis {
            analysis_id: Uuid::new_v4(),
            created_at: Utc::now(),
            drugs: names,
            interactions,
            lifestyle,
        };

        info!(
            analysis_id = %analysis.analysis_id,
            drugs = analysis.drugs.len(),
            pairs = analysis.interactions.len(),
            warnings = analysis.lifestyle.len(),
            "prescription analyzed"
        );

        analysis
    }
}
