//! Token-level typo corrections.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

use crate::models::TypoCorrection;

/// Map of known misspelt tokens to their canonical lower-case spelling.
#[derive(Debug, Clone, Default)]
pub struct TypoTable {
    corrections: BTreeMap<String, String>,
}

impl TypoTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from stored corrections. A later entry for the same token wins.
    pub fn from_corrections(corrections: &[TypoCorrection]) -> Self {
        let corrections = corrections
            .iter()
            .map(|c| (c.token.trim().to_lowercase(), c.canonical.trim().to_lowercase()))
            .filter(|(token, canonical)| !token.is_empty() && !canonical.is_empty())
            .collect();
        Self { corrections }
    }

    /// Canonical spelling of `token`, or the token itself.
    pub fn correct<'a>(&'a self, token: &'a str) -> &'a str {
        self.corrections
            .get(token)
            .map(String::as_str)
            .unwrap_or(token)
    }

    pub fn len(&self) -> usize {
        self.corrections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corrections.is_empty()
    }

    /// Hex SHA-256 over the corrections in token order.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for (token, canonical) in &self.corrections {
            hasher.update(token.as_bytes());
            hasher.update(b"\t");
            hasher.update(canonical.as_bytes());
            hasher.update(b"\n");
        }
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_known_token() {
        let table = TypoTable::from_corrections(&[
            TypoCorrection::new("ibupro", "ibuprofen"),
            TypoCorrection::new("Asprin", "Aspirin"),
        ]);
        assert_eq!(table.correct("ibupro"), "ibuprofen");
        assert_eq!(table.correct("asprin"), "aspirin");
        assert_eq!(table.correct("warfarin"), "warfarin");
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_blank_entries_skipped() {
        let table = TypoTable::from_corrections(&[TypoCorrection::new(" ", "aspirin")]);
        assert!(table.is_empty());
    }

    #[test]
    fn test_fingerprint_ignores_input_order() {
        let a = TypoTable::from_corrections(&[
            TypoCorrection::new("ibupro", "ibuprofen"),
            TypoCorrection::new("asprin", "aspirin"),
        ]);
        let b = TypoTable::from_corrections(&[
            TypoCorrection::new("asprin", "aspirin"),
            TypoCorrection::new("ibupro", "ibuprofen"),
        ]);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), TypoTable::new().fingerprint());
    }
}
