//! Food, alcohol and lifestyle warnings for a set of drugs.
//!
//! The language model is asked first; if it is unavailable or returns
//! nothing usable, the curated per-drug table answers instead.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use tracing::{debug, warn};
use zovida_llm::{LifestyleAdviser, LlmClient};

use crate::extractor::FallbackError;
use crate::models::{LifestyleRule, LifestyleWarning};

/// External source of lifestyle warnings.
pub trait LifestyleSource: Send + Sync {
    fn lifestyle_warnings(&self, drugs: &[String]) -> Result<Vec<LifestyleWarning>, FallbackError>;
}

impl<C: LlmClient> LifestyleSource for LifestyleAdviser<C> {
    fn lifestyle_warnings(&self, drugs: &[String]) -> Result<Vec<LifestyleWarning>, FallbackError> {
        let raw = self.advise(drugs)?;
        let total = raw.len();
        let warnings: Vec<LifestyleWarning> =
            raw.iter().filter_map(LifestyleWarning::from_raw).collect();
        if warnings.len() < total {
            debug!(dropped = total - warnings.len(), "discarded malformed lifestyle warnings");
        }
        Ok(warnings)
    }
}

/// Curated warnings keyed by lower-cased drug name.
#[derive(Debug, Clone, Default)]
pub struct LifestyleTable {
    by_drug: BTreeMap<String, Vec<LifestyleWarning>>,
}

impl LifestyleTable {
    pub fn from_rules(rules: &[LifestyleRule]) -> Self {
        let mut by_drug: BTreeMap<String, Vec<LifestyleWarning>> = BTreeMap::new();
        for rule in rules {
            by_drug
                .entry(rule.drug.trim().to_lowercase())
                .or_default()
                .push(rule.warning.clone());
        }
        Self { by_drug }
    }

    pub fn warnings_for(&self, drug: &str) -> &[LifestyleWarning] {
        self.by_drug
            .get(&drug.trim().to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of drugs with at least one warning.
    pub fn len(&self) -> usize {
        self.by_drug.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_drug.is_empty()
    }
}

/// Combines the model source with the curated table.
pub struct LifestyleAdvisor {
    table: LifestyleTable,
    source: Option<Arc<dyn LifestyleSource>>,
}

impl LifestyleAdvisor {
    pub fn new(table: LifestyleTable) -> Self {
        Self { table, source: None }
    }

    pub fn with_source(mut self, source: Arc<dyn LifestyleSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Warnings for `drugs`. Never fails.
    pub fn advise(&self, drugs: &[String]) -> Vec<LifestyleWarning> {
        if drugs.is_empty() {
            return Vec::new();
        }

        if let Some(source) = &self.source {
            match source.lifestyle_warnings(drugs) {
                Ok(warnings) if !warnings.is_empty() => {
                    // model answers repeat titles across drugs
                    return dedupe_by(warnings, |w| w.warning.to_lowercase());
                }
                Ok(_) => debug!("lifestyle source returned nothing; using curated table"),
                Err(e) => warn!(error = %e, "lifestyle source failed; using curated table"),
            }
        }

        self.curated(drugs)
    }

    /// Curated table only, deduplicated by type and title.
    pub fn curated(&self, drugs: &[String]) -> Vec<LifestyleWarning> {
        let warnings = drugs
            .iter()
            .flat_map(|d| self.table.warnings_for(d).iter().cloned())
            .collect();
        dedupe_by(warnings, |w| w.dedupe_key())
    }
}

/// Keep the first warning for each key, preserving order.
fn dedupe_by<F>(warnings: Vec<LifestyleWarning>, key: F) -> Vec<LifestyleWarning>
where
    F: Fn(&LifestyleWarning) -> String,
{
    let mut seen = HashSet::new();
    warnings.into_iter().filter(|w| seen.insert(key(w))).collect()
}
