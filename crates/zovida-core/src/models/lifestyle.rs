//! Lifestyle advice models.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use zovida_llm::RawLifestyleWarning;

/// What a warning is about.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum WarningKind {
    Food,
    Alcohol,
    Supplement,
    Lifestyle,
}

/// What the patient should do.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum WarningAction {
    Avoid,
    Eat,
    Monitor,
}

impl WarningKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningKind::Food => "food",
            WarningKind::Alcohol => "alcohol",
            WarningKind::Supplement => "supplement",
            WarningKind::Lifestyle => "lifestyle",
        }
    }
}

impl FromStr for WarningKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "food" => Ok(WarningKind::Food),
            "alcohol" => Ok(WarningKind::Alcohol),
            "supplement" => Ok(WarningKind::Supplement),
            "lifestyle" => Ok(WarningKind::Lifestyle),
            other => Err(format!("Unknown warning type: {}", other)),
        }
    }
}

impl WarningAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningAction::Avoid => "avoid",
            WarningAction::Eat => "eat",
            WarningAction::Monitor => "monitor",
        }
    }
}

impl FromStr for WarningAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "avoid" => Ok(WarningAction::Avoid),
            "eat" => Ok(WarningAction::Eat),
            "monitor" => Ok(WarningAction::Monitor),
            other => Err(format!("Unknown warning action: {}", other)),
        }
    }
}

/// A food/alcohol/supplement/lifestyle warning for a medication.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LifestyleWarning {
    #[serde(rename = "type")]
    pub kind: WarningKind,
    /// Short title (e.g. "Avoid Grapefruit")
    pub warning: String,
    /// What happens and why
    pub impact: String,
    pub action: WarningAction,
}

impl LifestyleWarning {
    pub fn new(kind: WarningKind, warning: &str, impact: &str, action: WarningAction) -> Self {
        Self {
            kind,
            warning: warning.to_string(),
            impact: impact.to_string(),
            action,
        }
    }

    /// Convert a model-provided warning; `None` if its type or action is unknown
    /// or its title is blank.
    pub fn from_raw(raw: &RawLifestyleWarning) -> Option<Self> {
        let warning = raw.warning.trim();
        if warning.is_empty() {
            return None;
        }
        Some(Self {
            kind: raw.kind.parse().ok()?,
            warning: warning.to_string(),
            impact: raw.impact.trim().to_string(),
            action: raw.action.parse().ok()?,
        })
    }

    /// Key used to dedupe curated warnings: `"type:warning"`.
    pub fn dedupe_key(&self) -> String {
        format!("{}:{}", self.kind.as_str(), self.warning)
    }
}

/// A curated lifestyle warning attached to one drug.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LifestyleRule {
    /// Drug name, matched case-insensitively
    pub drug: String,
    #[serde(flatten)]
    pub warning: LifestyleWarning,
}
