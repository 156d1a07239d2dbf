//! TF-IDF text vectorizer over pair-key text.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Sparse feature vector: `(feature index, weight)` sorted by index.
pub type SparseVector = Vec<(usize, f64)>;

/// Word tokens of two or more word characters, lower-cased.
pub fn feature_tokens(text: &str) -> Vec<String> {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    let token = TOKEN.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("valid feature regex"));
    let lower = text.to_lowercase();
    token
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Fitted TF-IDF vectorizer.
///
/// Feature indices follow lexicographic term order. IDF is smoothed
/// (`ln((1 + n) / (1 + df)) + 1`) and output rows are L2-normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Learn the vocabulary and IDF weights from `documents`.
    pub fn fit<S: AsRef<str>>(documents: &[S]) -> Self {
        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();
        for document in documents {
            let terms: BTreeSet<String> = feature_tokens(document.as_ref()).into_iter().collect();
            for term in terms {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        let n = documents.len() as f64;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(document_frequency.len());
        for (index, (term, df)) in document_frequency.into_iter().enumerate() {
            idf.push(((1.0 + n) / (1.0 + df as f64)).ln() + 1.0);
            vocabulary.insert(term, index);
        }

        Self { vocabulary, idf }
    }

    /// Vectorize one document. Unknown terms are ignored; a document with
    /// no known terms maps to the empty vector.
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in feature_tokens(text) {
            if let Some(&index) = self.vocabulary.get(&term) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let weighted: SparseVector = counts
            .into_iter()
            .map(|(index, tf)| (index, tf * self.idf[index]))
            .collect();

        let norm = weighted.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm == 0.0 {
            return Vec::new();
        }
        weighted.into_iter().map(|(i, w)| (i, w / norm)).collect()
    }

    pub fn n_features(&self) -> usize {
        self.idf.len()
    }

    pub fn contains_term(&self, term: &str) -> bool {
        self.vocabulary.contains_key(term)
    }

    /// Check the index map and weights agree (after deserialization).
    pub fn is_consistent(&self) -> bool {
        let indices: BTreeSet<usize> = self.vocabulary.values().copied().collect();
        indices.len() == self.vocabulary.len()
            && self.idf.len() == self.vocabulary.len()
            && indices.iter().all(|&i| i < self.idf.len())
            && self.idf.iter().all(|w| w.is_finite() && *w > 0.0)
    }
}
