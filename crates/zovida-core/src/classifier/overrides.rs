//! Curated override table for known-dangerous pairs.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};
use tracing::warn;

use crate::models::{OverrideRule, PairKey};

/// Pair key -> severity level, consulted before the classifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideTable {
    levels: BTreeMap<PairKey, String>,
}

impl OverrideTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from rules; a later rule for the same pair replaces the earlier one.
    pub fn from_rules(rules: &[OverrideRule]) -> Self {
        let mut levels = BTreeMap::new();
        for rule in rules {
            let level = rule.level.trim();
            if level.is_empty() {
                warn!(pair = %rule.key(), "skipping override with blank level");
                continue;
            }
            if let Some(previous) = levels.insert(rule.key(), level.to_string()) {
                warn!(pair = %rule.key(), previous = %previous, "duplicate override replaced");
            }
        }
        Self { levels }
    }

    pub fn lookup(&self, key: &PairKey) -> Option<&str> {
        self.levels.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PairKey, &str)> {
        self.levels.iter().map(|(k, v)| (k, v.as_str()))
    }

    /// Hex SHA-256 over the table contents in key order.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for (key, level) in &self.levels {
            hasher.update(key.as_text().as_bytes());
            hasher.update(b"\t");
            hasher.update(level.as_bytes());
            hasher.update(b"\n");
        }
        hex::encode(hasher.finalize())
    }
}
