//! Lifestyle advice from LLM output.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::client::LlmClient;
use crate::extraction::{ExtractionError, ExtractionResult};
use crate::prompts::{make_lifestyle_prompt, LIFESTYLE_SYSTEM_PROMPT};

/// A lifestyle warning as the model returns it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawLifestyleWarning {
    #[serde(rename = "type")]
    pub kind: String,
    pub warning: String,
    #[serde(default)]
    pub impact: String,
    #[serde(default)]
    pub action: String,
}

/// The JSON shapes a lifestyle answer is accepted in.
#[derive(Deserialize)]
#[serde(untagged)]
enum LifestylePayload {
    /// `[warning, ...]`
    List(Vec<RawLifestyleWarning>),
    /// `{"warnings": [..]}` or `{"Aspirin": [..], "Metformin": [..]}`
    Grouped(BTreeMap<String, Vec<RawLifestyleWarning>>),
    /// `{"recommendations": {"Aspirin": [..]}}`
    Nested(BTreeMap<String, BTreeMap<String, Vec<RawLifestyleWarning>>>),
}

impl LifestylePayload {
    fn flatten(self) -> Vec<RawLifestyleWarning> {
        match self {
            LifestylePayload::List(items) => items,
            LifestylePayload::Grouped(groups) => groups.into_values().flatten().collect(),
            LifestylePayload::Nested(outer) => outer
                .into_values()
                .flat_map(|inner| inner.into_values().flatten())
                .collect(),
        }
    }
}

/// Parse a lifestyle answer into a flat list of warnings.
///
/// Only the three shapes of `LifestylePayload` are accepted; anything else is
/// `InvalidFormat`. Leading or trailing prose around the JSON is ignored.
pub fn parse_lifestyle_response(response: &str) -> ExtractionResult<Vec<RawLifestyleWarning>> {
    let start = response.find(['{', '[']).ok_or_else(|| {
        ExtractionError::InvalidFormat("No JSON value found in response".into())
    })?;
    let closing = if response[start..].starts_with('[') { ']' } else { '}' };
    let end = response.rfind(closing).filter(|&end| end > start).ok_or_else(|| {
        ExtractionError::InvalidFormat("No closing bracket found in response".into())
    })?;

    let payload: LifestylePayload =
        serde_json::from_str(&response[start..=end]).map_err(|e| {
            ExtractionError::InvalidFormat(format!("Unrecognised lifestyle payload: {}", e))
        })?;

    Ok(payload.flatten())
}

/// Lifestyle advice source backed by an LLM.
pub struct LifestyleAdviser<C: LlmClient> {
    client: C,
}

impl<C: LlmClient> LifestyleAdviser<C> {
    /// Wrap a client.
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Ask the model for lifestyle warnings covering `drugs`.
    pub fn advise(&self, drugs: &[String]) -> ExtractionResult<Vec<RawLifestyleWarning>> {
        let answer = self.client.complete(
            LIFESTYLE_SYSTEM_PROMPT,
            &make_lifestyle_prompt(drugs),
            true,
        )?;
        parse_lifestyle_response(&answer)
    }
}
