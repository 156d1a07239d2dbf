//! Reference dataset and curated rule models.

use serde::{Deserialize, Serialize};

use super::PairKey;

/// One labelled row of the reference interaction dataset.
///
/// CSV header: `Drug_A,Drug_B,Level`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReferencePair {
    #[serde(rename = "Drug_A")]
    pub drug_a: String,
    #[serde(rename = "Drug_B")]
    pub drug_b: String,
    #[serde(rename = "Level")]
    pub level: String,
}

impl ReferencePair {
    pub fn new(drug_a: &str, drug_b: &str, level: &str) -> Self {
        Self {
            drug_a: drug_a.to_string(),
            drug_b: drug_b.to_string(),
            level: level.to_string(),
        }
    }

    /// Canonical key of this row's pair.
    pub fn key(&self) -> PairKey {
        PairKey::new(&self.drug_a, &self.drug_b)
    }
}

/// A curated known-dangerous pair that bypasses the classifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OverrideRule {
    pub drug_a: String,
    pub drug_b: String,
    pub level: String,
    /// Free-text rationale for auditors
    #[serde(default)]
    pub note: Option<String>,
}

impl OverrideRule {
    pub fn new(drug_a: &str, drug_b: &str, level: &str) -> Self {
        Self {
            drug_a: drug_a.to_string(),
            drug_b: drug_b.to_string(),
            level: level.to_string(),
            note: None,
        }
    }

    pub fn key(&self) -> PairKey {
        PairKey::new(&self.drug_a, &self.drug_b)
    }
}

/// Token-level typo correction (`"ibupro" -> "ibuprofen"`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypoCorrection {
    pub token: String,
    pub canonical: String,
}

impl TypoCorrection {
    pub fn new(token: &str, canonical: &str) -> Self {
        Self {
            token: token.to_string(),
            canonical: canonical.to_string(),
        }
    }
}

/// A versioned set of curated rules, as stored in rule files.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RuleSet {
    /// Version label recorded with the rules (e.g. "2024-06-01")
    pub version: String,
    #[serde(default)]
    pub overrides: Vec<OverrideRule>,
    #[serde(default)]
    pub typos: Vec<TypoCorrection>,
    #[serde(default)]
    pub lifestyle: Vec<super::LifestyleRule>,
}
