//! Drug-name extraction from LLM output.

use thiserror::Error;
use tracing::debug;

use crate::client::{ClientError, LlmClient};
use crate::prompts::{make_extraction_prompt, EXTRACTION_SYSTEM_PROMPT, NONE_SENTINEL};

/// Longest entry accepted as a drug name.
const MAX_NAME_CHARS: usize = 60;

/// Most words accepted in a single drug name.
const MAX_NAME_WORDS: usize = 4;

/// Extraction errors.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("LLM client error: {0}")]
    Client(#[from] ClientError),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid response format: {0}")]
    InvalidFormat(String),
}

pub type ExtractionResult<T> = Result<T, ExtractionError>;

/// Parsed answer to an extraction prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrugList {
    /// The model found no medicine in the text.
    None,
    /// Drug names in answer order, trimmed, never empty.
    Names(Vec<String>),
}

impl DrugList {
    /// Names in answer order (empty for `DrugList::None`).
    pub fn into_names(self) -> Vec<String> {
        match self {
            DrugList::None => Vec::new(),
            DrugList::Names(names) => names,
        }
    }
}

/// Parse an extraction answer.
///
/// Accepted shapes:
/// 1. the sentinel `none` (any case, optional trailing period);
/// 2. a comma-separated list, optionally spread over lines, optionally
///    wrapped in a code fence, with optional `-`/`*` bullets.
///
/// Within an entry, combinations (`Amoxicillin/Clavulanate`,
/// `Paracetamol + Codeine`) yield one name per component and parenthesised
/// synonyms (`Vitamin D3 (Cholecalciferol)`) are dropped.
///
/// Names must be letters, digits, spaces, `-` or `'`, at most four words.
/// Entries that are not are skipped; if no entry qualifies the answer is
/// `InvalidFormat`.
pub fn parse_drug_list(response: &str) -> ExtractionResult<DrugList> {
    let body = strip_code_fence(response.trim());
    if body.is_empty() {
        return Err(ExtractionError::InvalidFormat("Empty response".into()));
    }

    if is_none_sentinel(body) {
        return Ok(DrugList::None);
    }

    let mut names = Vec::new();
    let mut rejected = Vec::new();
    for raw in body.split([',', '\n']) {
        let entry = raw.trim().trim_start_matches(['-', '*']).trim();
        if entry.is_empty() || is_none_sentinel(entry) {
            continue;
        }

        let without_synonyms = strip_parenthetical(entry);
        for part in without_synonyms.split(['/', '+']) {
            let name = part.trim().trim_end_matches('.').trim();
            if name.is_empty() {
                continue;
            }
            if looks_like_drug_name(name) {
                names.push(name.to_string());
            } else {
                rejected.push(name.to_string());
            }
        }
    }

    match (names.is_empty(), rejected.first()) {
        (true, Some(first)) => Err(ExtractionError::InvalidFormat(format!(
            "Not a drug name: {:?}",
            first
        ))),
        (true, None) => Ok(DrugList::None),
        (false, _) => {
            if !rejected.is_empty() {
                debug!(skipped = ?rejected, "ignoring entries that are not drug names");
            }
            Ok(DrugList::Names(names))
        }
    }
}

/// Remove `( ... )` groups and collapse the remaining whitespace.
fn strip_parenthetical(entry: &str) -> String {
    let mut kept = String::with_capacity(entry.len());
    let mut depth = 0usize;
    for c in entry.chars() {
        match c {
            '(' => depth += 1,
            ')' if depth > 0 => depth -= 1,
            _ if depth == 0 => kept.push(c),
            _ => {}
        }
    }
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop an optional language tag on the opening fence line.
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    rest.trim_end().trim_end_matches("```").trim()
}

fn is_none_sentinel(text: &str) -> bool {
    text.trim_end_matches('.').trim().eq_ignore_ascii_case(NONE_SENTINEL)
}

fn looks_like_drug_name(entry: &str) -> bool {
    entry.chars().count() <= MAX_NAME_CHARS
        && entry.split_whitespace().count() <= MAX_NAME_WORDS
        && entry.chars().any(|c| c.is_alphabetic())
        && entry
            .chars()
            .all(|c| c.is_alphanumeric() || c == ' ' || c == '-' || c == '\'')
}

/// Extraction fallback that asks an LLM for the drugs in a text.
pub struct DrugListExtractor<C: LlmClient> {
    client: C,
}

impl<C: LlmClient> DrugListExtractor<C> {
    /// Wrap a client.
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// The wrapped client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Ask the model for the drugs in `text`.
    pub fn extract(&self, text: &str) -> ExtractionResult<DrugList> {
        let answer = self.client.complete(
            EXTRACTION_SYSTEM_PROMPT,
            &make_extraction_prompt(text),
            false,
        )?;
        parse_drug_list(&answer)
    }
}
