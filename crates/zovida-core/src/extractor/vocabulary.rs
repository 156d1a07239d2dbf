//! Known drug vocabulary.

use std::collections::BTreeSet;

use strsim::{jaro_winkler, normalized_levenshtein};

use crate::models::ReferencePair;

/// Minimum similarity for a name to be offered as a suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.6;

/// Lower-cased drug names known to the reference dataset.
///
/// Iteration is in lexicographic order, which also fixes the tie-break for
/// partial matching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrugVocabulary {
    names: BTreeSet<String>,
}

impl DrugVocabulary {
    /// Build from raw names; trims, lower-cases and collapses inner whitespace.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = names
            .into_iter()
            .map(|n| normalize_name(n.as_ref()))
            .filter(|n| !n.is_empty())
            .collect();
        Self { names }
    }

    /// Every name in either column of the dataset.
    pub fn from_reference_pairs(pairs: &[ReferencePair]) -> Self {
        Self::from_names(
            pairs
                .iter()
                .flat_map(|p| [p.drug_a.as_str(), p.drug_b.as_str()]),
        )
    }

    /// Exact membership of a lower-cased name.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// First name (lexicographically) that contains `fragment` as a substring.
    pub fn first_containing(&self, fragment: &str) -> Option<&str> {
        self.names
            .iter()
            .find(|name| name.contains(fragment))
            .map(String::as_str)
    }

    /// Names similar to `query`, best first. Ties keep lexicographic order.
    pub fn suggest(&self, query: &str, limit: usize) -> Vec<(String, f64)> {
        let query = normalize_name(query);
        if query.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut scored: Vec<(String, f64)> = self
            .names
            .iter()
            .map(|name| (name.clone(), fuzzy_match(&query, name)))
            .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(limit);
        scored
    }
}

fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Fuzzy string similarity (0.0 - 1.0).
fn fuzzy_match(a: &str, b: &str) -> f64 {
    // Jaro-Winkler favours shared prefixes, which is how drug names get misspelt
    let jw = jaro_winkler(a, b);
    let lev = normalized_levenshtein(a, b);
    jw * 0.6 + lev * 0.4
}
