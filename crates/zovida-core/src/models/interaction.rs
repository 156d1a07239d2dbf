//! Drug-pair interaction models.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Separator between the two names of a canonical pair key.
pub const PAIR_SEPARATOR: &str = " + ";

/// Severity reported when a prescription holds a single drug.
pub const SAFE_LEVEL: &str = "Safe";

/// Confidence (percent) of results that are not model estimates: override
/// hits and single-drug rows. Equal to a probability of 1.0.
pub const CERTAIN_CONFIDENCE: f64 = 100.0;

/// Canonical key of an unordered drug pair.
///
/// Both names are lower-cased and stored in lexicographic order, so
/// `PairKey::new(a, b) == PairKey::new(b, a)` for every `a`, `b`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairKey {
    first: String,
    second: String,
}

impl PairKey {
    pub fn new(a: &str, b: &str) -> Self {
        let a = a.to_lowercase();
        let b = b.to_lowercase();
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    /// Lexicographically smaller name.
    pub fn first(&self) -> &str {
        &self.first
    }

    /// Lexicographically larger name.
    pub fn second(&self) -> &str {
        &self.second
    }

    /// The text fed to the vectorizer: `"first + second"`.
    pub fn as_text(&self) -> String {
        format!("{}{}{}", self.first, PAIR_SEPARATOR, self.second)
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.first, PAIR_SEPARATOR, self.second)
    }
}

/// Where an interaction result came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    /// Curated override table
    Override,
    /// Trained classifier
    Model,
}

/// Severity verdict for one drug pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InteractionResult {
    /// Severity label (e.g. "Safe", "Minor", "Moderate", "Major")
    pub level: String,
    /// Confidence in percent, full precision (0.0 - 100.0)
    pub confidence: f64,
    /// Override table or model
    pub source: ResultSource,
}

impl InteractionResult {
    /// A result that bypassed the model.
    pub fn certain(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            confidence: CERTAIN_CONFIDENCE,
            source: ResultSource::Override,
        }
    }

    /// Confidence rounded to two decimals for display.
    pub fn display_confidence(&self) -> f64 {
        round2(self.confidence)
    }

    /// Confidence as a fraction (0.0 - 1.0).
    pub fn fraction(&self) -> f64 {
        self.confidence / 100.0
    }
}

/// One row of a prescription's interaction report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DrugInteraction {
    pub drug1: String,
    /// `None` when the prescription holds a single drug
    pub drug2: Option<String>,
    pub level: String,
    /// Confidence in percent, full precision
    pub confidence: f64,
}

impl DrugInteraction {
    /// Row for a pair scored by the classifier.
    pub fn pair(drug1: &str, drug2: &str, result: InteractionResult) -> Self {
        Self {
            drug1: drug1.to_string(),
            drug2: Some(drug2.to_string()),
            level: result.level,
            confidence: result.confidence,
        }
    }

    /// Synthesized row for a single-drug prescription.
    pub fn single(drug: &str) -> Self {
        Self {
            drug1: drug.to_string(),
            drug2: None,
            level: SAFE_LEVEL.to_string(),
            confidence: CERTAIN_CONFIDENCE,
        }
    }

    /// Confidence rounded to two decimals for display.
    pub fn display_confidence(&self) -> f64 {
        round2(self.confidence)
    }

    /// Confidence as a fraction (0.0 - 1.0).
    pub fn fraction(&self) -> f64 {
        self.confidence / 100.0
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
