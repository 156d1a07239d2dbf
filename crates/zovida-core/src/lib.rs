//! Zovida Core Library
//!
//! Medication-safety core: finds drug names in prescription text and grades
//! the interaction severity of every drug pair.
//!
//! # Architecture
//!
//! ```text
//! Prescription text (typed / OCR)
//!         │
//!         ▼
//!   Drug extraction ── typo table → bigram/unigram dictionary → partial match
//!         │                                   │ (nothing found)
//!         │                                   ▼
//!         │                            LLM fallback (optional)
//!         ▼
//!   Extracted drug set ──► every unordered pair
//!                                   │
//!                     ┌─────────────▼─────────────┐
//!                     │  Override table (curated) │──► level, 100%
//!                     └─────────────┬─────────────┘
//!                                   │ miss
//!                                   ▼
//!                     TF-IDF → naive Bayes → label  ──► level, p × 100
//! ```
//!
//! # Modules
//!
//! - [`db`]: SQLite artifact store (reference dataset, rules, trained model)
//! - [`models`]: Domain types (PairKey, InteractionResult, LifestyleWarning, etc.)
//! - [`extractor`]: Drug-name extraction
//! - [`classifier`]: Pair classifier, override table and trainer
//! - [`artifacts`]: Startup bundle loading and fingerprinting
//! - [`lifestyle`]: Food/alcohol/lifestyle warnings
//! - [`analysis`]: Whole-prescription analysis
//! - [`config`]: Environment configuration

pub mod analysis;
pub mod artifacts;
pub mod classifier;
pub mod config;
pub mod db;
pub mod extractor;
pub mod lifestyle;
pub mod models;

// Re-export commonly used types
pub use analysis::{PrescriptionAnalysis, PrescriptionAnalyzer};
pub use artifacts::{ArtifactBundle, ArtifactError, ArtifactInfo};
pub use classifier::{InteractionClassifier, Trainer, TrainedModel};
pub use config::ZovidaConfig;
pub use db::Database;
pub use extractor::{DrugExtractor, PartialMatchPolicy};
pub use models::{
    DrugInteraction, ExtractedDrugSet, InteractionResult, LifestyleWarning, PairKey, ResultSource,
};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::Arc;

use tracing::info;
use zovida_llm::{ChatClient, LlmClient};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum ZovidaError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Artifact error: {0}")]
    ArtifactError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl From<db::DbError> for ZovidaError {
    fn from(e: db::DbError) -> Self {
        ZovidaError::DatabaseError(e.to_string())
    }
}

impl From<ArtifactError> for ZovidaError {
    fn from(e: ArtifactError) -> Self {
        ZovidaError::ArtifactError(e.to_string())
    }
}

impl From<zovida_llm::ClientError> for ZovidaError {
    fn from(e: zovida_llm::ClientError) -> Self {
        ZovidaError::ConfigurationError(e.to_string())
    }
}

// =========================================================================
// Service Assembly
// =========================================================================

/// Load artifacts from the configured store and assemble an analyzer.
///
/// Fails if the store lacks a reference dataset or a valid model.
pub fn load_analyzer(config: &ZovidaConfig) -> Result<(PrescriptionAnalyzer, ArtifactInfo), ZovidaError> {
    let db = Database::open(&config.db_path)?;
    let bundle = ArtifactBundle::load(&db)?;
    let info = bundle.info();

    let client = build_llm_client(config)?;
    info!(
        db = %config.db_path.display(),
        llm = client.is_some(),
        partial_match = %config.partial_match,
        "analyzer ready"
    );

    let analyzer = PrescriptionAnalyzer::from_bundle(bundle, config.partial_match, client);
    Ok((analyzer, info))
}

/// Chat client for the configured endpoint, or `None` without an API key.
pub fn build_llm_client(config: &ZovidaConfig) -> Result<Option<Arc<dyn LlmClient>>, ZovidaError> {
    let Some(key) = &config.llm_api_key else {
        return Ok(None);
    };
    let client = ChatClient::new(
        config.llm_base_url.as_str(),
        config.llm_model.as_str(),
        key.as_str(),
        config.llm_timeout_secs,
    )?;
    Ok(Some(Arc::new(client)))
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open the artifact store at `path`; other settings come from the environment.
#[uniffi::export]
pub fn open_core(path: String) -> Result<Arc<ZovidaCore>, ZovidaError> {
    let config = ZovidaConfig::from_env().with_db_path(path);
    ZovidaCore::from_config(&config).map(Arc::new)
}

/// Open using environment configuration only.
#[uniffi::export]
pub fn open_core_from_env() -> Result<Arc<ZovidaCore>, ZovidaError> {
    ZovidaCore::from_config(&ZovidaConfig::from_env()).map(Arc::new)
}

// =========================================================================
// Main API Object
// =========================================================================

/// Loaded, immutable analyzer for FFI. Safe to share across threads.
#[derive(uniffi::Object)]
pub struct ZovidaCore {
    analyzer: PrescriptionAnalyzer,
    info: ArtifactInfo,
}

impl ZovidaCore {
    pub fn from_config(config: &ZovidaConfig) -> Result<Self, ZovidaError> {
        let (analyzer, info) = load_analyzer(config)?;
        Ok(Self { analyzer, info })
    }

    /// Wrap an already assembled analyzer.
    pub fn from_parts(analyzer: PrescriptionAnalyzer, info: ArtifactInfo) -> Self {
        Self { analyzer, info }
    }
}

#[uniffi::export]
impl ZovidaCore {
    // =========================================================================
    // Extraction
    // =========================================================================

    /// Drug names found in free text, title-cased and sorted.
    pub fn extract_drugs(&self, text: String) -> Vec<String> {
        self.analyzer.extract_drugs(&text).to_vec()
    }

    /// Vocabulary names close to `query`, best first.
    pub fn suggest_drugs(&self, query: String, limit: u32) -> Vec<String> {
        self.analyzer
            .extractor()
            .vocabulary()
            .suggest(&query, limit as usize)
            .into_iter()
            .map(|(name, _)| models::title_case(&name))
            .collect()
    }

    // =========================================================================
    // Interactions
    // =========================================================================

    /// Severity of one pair; confidence rounded to two decimals.
    ///
    /// Never fails: unknown or blank names are scored from the class priors.
    pub fn check_interaction(&self, drug1: String, drug2: String) -> FfiInteractionResult {
        self.analyzer.check_interaction(&drug1, &drug2).into()
    }

    /// Analyze free prescription text.
    pub fn analyze_prescription(&self, text: String) -> FfiPrescriptionAnalysis {
        self.analyzer.analyze_text(&text).into()
    }

    /// Analyze hand-entered drug names.
    pub fn analyze_manual(&self, drugs: Vec<String>) -> FfiPrescriptionAnalysis {
        self.analyzer.analyze_manual(&drugs).into()
    }

    // =========================================================================
    // Status
    // =========================================================================

    pub fn artifact_info(&self) -> FfiArtifactInfo {
        self.info.clone().into()
    }
}

// =========================================================================
// FFI Record Types
// =========================================================================

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiInteractionResult {
    pub level: String,
    /// Percent, rounded to two decimals
    pub confidence: f64,
    /// Same confidence as a probability (0.0 - 1.0), full precision
    pub probability: f64,
    /// "override" or "model"
    pub source: String,
}

impl From<InteractionResult> for FfiInteractionResult {
    fn from(r: InteractionResult) -> Self {
        let confidence = r.display_confidence();
        let probability = r.fraction();
        Self {
            level: r.level,
            confidence,
            probability,
            source: match r.source {
                ResultSource::Override => "override".into(),
                ResultSource::Model => "model".into(),
            },
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDrugInteraction {
    pub drug1: String,
    pub drug2: Option<String>,
    pub level: String,
    /// Percent, rounded to two decimals
    pub confidence: f64,
    /// Probability (0.0 - 1.0); 1.0 for single-drug rows
    pub probability: f64,
}

impl From<DrugInteraction> for FfiDrugInteraction {
    fn from(i: DrugInteraction) -> Self {
        let confidence = i.display_confidence();
        let probability = i.fraction();
        Self {
            drug1: i.drug1,
            drug2: i.drug2,
            level: i.level,
            confidence,
            probability,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiLifestyleWarning {
    pub kind: String,
    pub warning: String,
    pub impact: String,
    pub action: String,
}

impl From<LifestyleWarning> for FfiLifestyleWarning {
    fn from(w: LifestyleWarning) -> Self {
        Self {
            kind: w.kind.as_str().to_string(),
            warning: w.warning,
            impact: w.impact,
            action: w.action.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPrescriptionAnalysis {
    pub analysis_id: String,
    /// RFC 3339
    pub created_at: String,
    pub drugs: Vec<String>,
    pub interactions: Vec<FfiDrugInteraction>,
    pub lifestyle: Vec<FfiLifestyleWarning>,
}

impl From<PrescriptionAnalysis> for FfiPrescriptionAnalysis {
    fn from(a: PrescriptionAnalysis) -> Self {
        Self {
            analysis_id: a.analysis_id.to_string(),
            created_at: a.created_at.to_rfc3339(),
            drugs: a.drugs,
            interactions: a.interactions.into_iter().map(|i| i.into()).collect(),
            lifestyle: a.lifestyle.into_iter().map(|w| w.into()).collect(),
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiArtifactInfo {
    pub fingerprint: String,
    pub model_version: String,
    pub rules_version: String,
    pub vocabulary_size: u64,
    pub override_count: u64,
    pub labels: Vec<String>,
}

impl From<ArtifactInfo> for FfiArtifactInfo {
    fn from(i: ArtifactInfo) -> Self {
        Self {
            fingerprint: i.fingerprint,
            model_version: i.model_version,
            rules_version: i.rules_version,
            vocabulary_size: i.vocabulary_size as u64,
            override_count: i.override_count as u64,
            labels: i.labels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReferencePair;

    fn core() -> ZovidaCore {
        let db = Database::open_in_memory().unwrap();
        let pairs = vec![
            ReferencePair::new("Warfarin", "Ibuprofen", "Major"),
            ReferencePair::new("Metformin", "Omeprazole", "Minor"),
        ];
        db.insert_reference_pairs(&pairs).unwrap();
        let model = Trainer::new().fit(&pairs).unwrap();
        ArtifactBundle::save_model(&db, &model, "m1").unwrap();

        let bundle = ArtifactBundle::load(&db).unwrap();
        let info = bundle.info();
        let analyzer = PrescriptionAnalyzer::from_bundle(bundle, PartialMatchPolicy::FirstMatch, None);
        ZovidaCore::from_parts(analyzer, info)
    }

    #[test]
    fn test_extract_drugs() {
        let core = core();
        assert_eq!(
            core.extract_drugs("warfarin and ibuprofen".into()),
            vec!["Ibuprofen", "Warfarin"]
        );
    }

    #[test]
    fn test_check_interaction_rounds() {
        let result = core().check_interaction("Metformin".into(), "Omeprazole".into());
        assert_eq!(result.level, "Minor");
        assert_eq!(result.source, "model");
        assert_eq!(result.confidence, (result.confidence * 100.0).round() / 100.0);
        assert!((result.probability * 100.0 - result.confidence).abs() < 0.01);
    }

    #[test]
    fn test_check_interaction_blank_input_is_scored() {
        let core = core();
        let blank = core.check_interaction(" ".into(), "aspirin".into());
        let swapped = core.check_interaction("aspirin".into(), " ".into());
        assert_eq!(blank.level, swapped.level);
        assert_eq!(blank.probability, swapped.probability);
        assert_eq!(blank.source, "model");
        assert!(blank.probability > 0.0 && blank.probability <= 1.0);
    }

    #[test]
    fn test_analyze_prescription_record() {
        let analysis = core().analyze_prescription("Metformin 500mg".into());
        assert_eq!(analysis.drugs, vec!["Metformin"]);
        assert_eq!(analysis.interactions[0].drug2, None);
        assert_eq!(analysis.interactions[0].level, "Safe");
        assert_eq!(analysis.interactions[0].confidence, 100.0);
        assert_eq!(analysis.interactions[0].probability, 1.0);
        assert!(!analysis.analysis_id.is_empty());
    }

    #[test]
    fn test_suggest_drugs_title_cased() {
        let suggestions = core().suggest_drugs("warfrin".into(), 3);
        assert_eq!(suggestions[0], "Warfarin");
    }

    #[test]
    fn test_artifact_info() {
        let info = core().artifact_info();
        assert_eq!(info.model_version, "m1");
        assert_eq!(info.vocabulary_size, 4);
        assert_eq!(info.labels, vec!["Major", "Minor"]);
        assert_eq!(info.fingerprint.len(), 64);
    }

    #[test]
    fn test_no_llm_client_without_key() {
        let config = ZovidaConfig::default();
        assert!(build_llm_client(&config).unwrap().is_none());
    }
}
