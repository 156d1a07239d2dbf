//! Runtime configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::extractor::PartialMatchPolicy;

pub const DEFAULT_DB_PATH: &str = "zovida.db";
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_LLM_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 10;

/// Service configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZovidaConfig {
    /// SQLite artifact store
    pub db_path: PathBuf,
    /// OpenAI-compatible chat completions endpoint
    pub llm_base_url: String,
    pub llm_model: String,
    /// Language model features are disabled without a key
    #[serde(skip_serializing)]
    pub llm_api_key: Option<String>,
    pub llm_timeout_secs: u64,
    pub partial_match: PartialMatchPolicy,
}

impl Default for ZovidaConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            llm_base_url: DEFAULT_LLM_BASE_URL.to_string(),
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            llm_api_key: None,
            llm_timeout_secs: DEFAULT_LLM_TIMEOUT_SECS,
            partial_match: PartialMatchPolicy::default(),
        }
    }
}

impl ZovidaConfig {
    /// Defaults overridden by `ZOVIDA_*` environment variables.
    ///
    /// `GROQ_API_KEY` is accepted when `ZOVIDA_LLM_API_KEY` is unset.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = get("ZOVIDA_DB_PATH") {
            config.db_path = PathBuf::from(path);
        }
        if let Some(url) = get("ZOVIDA_LLM_BASE_URL") {
            config.llm_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = get("ZOVIDA_LLM_MODEL") {
            config.llm_model = model;
        }
        config.llm_api_key = get("ZOVIDA_LLM_API_KEY").or_else(|| get("GROQ_API_KEY"));
        if let Some(timeout) = get("ZOVIDA_LLM_TIMEOUT_SECS") {
            match timeout.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.llm_timeout_secs = secs,
                _ => warn!(value = %timeout, "invalid ZOVIDA_LLM_TIMEOUT_SECS, using default"),
            }
        }
        if let Some(policy) = get("ZOVIDA_PARTIAL_MATCH") {
            match policy.parse() {
                Ok(p) => config.partial_match = p,
                Err(e) => warn!(error = %e, "invalid ZOVIDA_PARTIAL_MATCH, using default"),
            }
        }

        config
    }

    pub fn with_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = path.into();
        self
    }

    /// Whether language model fallbacks can be used.
    pub fn llm_enabled(&self) -> bool {
        self.llm_api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ZovidaConfig::from_lookup(lookup(&[]));
        assert_eq!(config, ZovidaConfig::default());
        assert!(!config.llm_enabled());
        assert_eq!(config.llm_model, "llama-3.3-70b-versatile");
    }

    #[test]
    fn test_overrides() {
        let config = ZovidaConfig::from_lookup(lookup(&[
            ("ZOVIDA_DB_PATH", "/var/lib/zovida/store.db"),
            ("ZOVIDA_LLM_BASE_URL", "http://localhost:8080/v1/"),
            ("ZOVIDA_LLM_TIMEOUT_SECS", "30"),
            ("ZOVIDA_PARTIAL_MATCH", "off"),
            ("ZOVIDA_LLM_API_KEY", "k1"),
        ]));
        assert_eq!(config.db_path, PathBuf::from("/var/lib/zovida/store.db"));
        assert_eq!(config.llm_base_url, "http://localhost:8080/v1");
        assert_eq!(config.llm_timeout_secs, 30);
        assert_eq!(config.partial_match, PartialMatchPolicy::Off);
        assert_eq!(config.llm_api_key.as_deref(), Some("k1"));
    }

    #[test]
    fn test_groq_key_fallback() {
        let config = ZovidaConfig::from_lookup(lookup(&[("GROQ_API_KEY", "gsk")]));
        assert_eq!(config.llm_api_key.as_deref(), Some("gsk"));

        let config = ZovidaConfig::from_lookup(lookup(&[
            ("GROQ_API_KEY", "gsk"),
            ("ZOVIDA_LLM_API_KEY", "own"),
        ]));
        assert_eq!(config.llm_api_key.as_deref(), Some("own"));
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = ZovidaConfig::from_lookup(lookup(&[
            ("ZOVIDA_LLM_TIMEOUT_SECS", "soon"),
            ("ZOVIDA_PARTIAL_MATCH", "fuzzy"),
            ("ZOVIDA_LLM_API_KEY", "   "),
        ]));
        assert_eq!(config.llm_timeout_secs, DEFAULT_LLM_TIMEOUT_SECS);
        assert_eq!(config.partial_match, PartialMatchPolicy::FirstMatch);
        assert!(!config.llm_enabled());
    }

    #[test]
    fn test_api_key_not_serialized() {
        let mut config = ZovidaConfig::default();
        config.llm_api_key = Some("secret".into());
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }
}
