//! Drug-name extraction from free text.
//!
//! Local matching runs first, token by token:
//! 1. typo corrections rewrite known misspellings;
//! 2. bigrams are matched greedily before unigrams, so "calcium carbonate"
//!    wins over a partial hit on "calcium";
//! 3. longer unmatched tokens may partially match a vocabulary name.
//!
//! Only when nothing matches locally is the optional fallback consulted.

mod corrections;
mod fallback;
mod vocabulary;

pub use corrections::*;
pub use fallback::*;
pub use vocabulary::*;

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::ExtractedDrugSet;

/// Tokens must be longer than this to be partially matched.
const MIN_PARTIAL_LEN: usize = 3;

/// How unmatched tokens are partially matched against the vocabulary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PartialMatchPolicy {
    /// First vocabulary name (lexicographic) containing the token.
    #[default]
    FirstMatch,
    /// Exact matches only.
    Off,
}

impl fmt::Display for PartialMatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartialMatchPolicy::FirstMatch => write!(f, "first-match"),
            PartialMatchPolicy::Off => write!(f, "off"),
        }
    }
}

impl FromStr for PartialMatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "first-match" | "first_match" | "first" => Ok(PartialMatchPolicy::FirstMatch),
            "off" | "none" | "disabled" => Ok(PartialMatchPolicy::Off),
            other => Err(format!("Unknown partial match policy: {}", other)),
        }
    }
}

/// Split text into lower-cased alphabetic runs.
pub fn tokenize(text: &str) -> Vec<String> {
    static WORD: OnceLock<Regex> = OnceLock::new();
    let word = WORD.get_or_init(|| Regex::new("[a-z]+").expect("valid token regex"));
    let lower = text.to_lowercase();
    word.find_iter(&lower).map(|m| m.as_str().to_string()).collect()
}

/// Drug-name extractor.
pub struct DrugExtractor {
    vocabulary: DrugVocabulary,
    typos: TypoTable,
    policy: PartialMatchPolicy,
    fallback: Option<Arc<dyn ExtractionFallback>>,
}

impl DrugExtractor {
    /// Local-only extractor.
    pub fn new(vocabulary: DrugVocabulary, typos: TypoTable) -> Self {
        Self {
            vocabulary,
            typos,
            policy: PartialMatchPolicy::default(),
            fallback: None,
        }
    }

    pub fn with_policy(mut self, policy: PartialMatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn ExtractionFallback>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn vocabulary(&self) -> &DrugVocabulary {
        &self.vocabulary
    }

    pub fn policy(&self) -> PartialMatchPolicy {
        self.policy
    }

    /// Extract the drugs mentioned in `text`.
    ///
    /// Never fails: fallback errors degrade to an empty set.
    pub fn extract(&self, text: &str) -> ExtractedDrugSet {
        let found = self.extract_local(text);
        if !found.is_empty() || text.trim().is_empty() {
            return found;
        }
        self.escalate(text)
    }

    /// Dictionary matching only; the fallback is never consulted.
    pub fn extract_local(&self, text: &str) -> ExtractedDrugSet {
        let tokens: Vec<String> = tokenize(text)
            .iter()
            .map(|t| self.typos.correct(t).to_string())
            .collect();

        let mut found = ExtractedDrugSet::new();
        let mut i = 0;
        while i < tokens.len() {
            if let Some(next) = tokens.get(i + 1) {
                let bigram = format!("{} {}", tokens[i], next);
                if self.vocabulary.contains(&bigram) {
                    found.insert(&bigram);
                    i += 2;
                    continue;
                }
            }

            let token = &tokens[i];
            if self.vocabulary.contains(token) {
                found.insert(token);
            } else if let Some(name) = self.partial_match(token) {
                debug!(token = %token, name = %name, "partial match");
                found.insert(name);
            }
            i += 1;
        }
        found
    }

    fn partial_match(&self, token: &str) -> Option<&str> {
        match self.policy {
            PartialMatchPolicy::Off => None,
            PartialMatchPolicy::FirstMatch if token.chars().count() > MIN_PARTIAL_LEN => {
                self.vocabulary.first_containing(token)
            }
            PartialMatchPolicy::FirstMatch => None,
        }
    }

    fn escalate(&self, text: &str) -> ExtractedDrugSet {
        let Some(fallback) = &self.fallback else {
            debug!("no local match and no fallback configured");
            return ExtractedDrugSet::new();
        };

        match fallback.extract_names(text) {
            Ok(names) => {
                debug!(count = names.len(), "fallback extraction");
                ExtractedDrugSet::from_names(names)
            }
            Err(e) => {
                warn!(error = %e, "fallback extraction failed; returning no drugs");
                ExtractedDrugSet::new()
            }
        }
    }
}
