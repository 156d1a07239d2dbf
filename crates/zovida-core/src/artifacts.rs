//! Loading and saving the artifact bundle a running service needs.
//!
//! A bundle is everything read once at startup: the vocabulary (derived from
//! the reference dataset), the curated rules and the trained model. Loading is
//! all-or-nothing; a missing or tampered artifact is fatal.

use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::info;

use crate::classifier::{
    LabelEncoder, MultinomialNb, OverrideTable, TfidfVectorizer, TrainedModel,
};
use crate::db::{Database, DbError, StoredArtifact};
use crate::extractor::{DrugVocabulary, TypoTable};
use crate::lifestyle::LifestyleTable;

pub const VECTORIZER_ARTIFACT: &str = "vectorizer";
pub const CLASSIFIER_ARTIFACT: &str = "classifier";
pub const LABEL_ENCODER_ARTIFACT: &str = "label_encoder";

/// Artifact loading errors.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Artifact '{name}' is malformed: {source}")]
    Malformed {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Artifact '{0}' does not match its recorded hash")]
    HashMismatch(String),

    #[error("Artifacts are from different versions: {0}")]
    VersionMismatch(String),

    #[error("Artifacts are inconsistent: {0}")]
    Inconsistent(String),

    #[error("Reference dataset is empty; no drug vocabulary")]
    EmptyVocabulary,
}

pub type ArtifactResult<T> = Result<T, ArtifactError>;

/// What a loaded bundle contains, without the bulky parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactInfo {
    pub fingerprint: String,
    pub model_version: String,
    pub rules_version: String,
    pub vocabulary_size: usize,
    pub override_count: usize,
    pub labels: Vec<String>,
}

/// Everything loaded at startup, immutable afterwards.
#[derive(Debug, Clone)]
pub struct ArtifactBundle {
    pub vocabulary: DrugVocabulary,
    pub typos: TypoTable,
    pub overrides: OverrideTable,
    pub lifestyle: LifestyleTable,
    pub model: TrainedModel,
    pub model_version: String,
    pub rules_version: String,
    fingerprint: String,
}

impl ArtifactBundle {
    /// Load and validate the full bundle.
    pub fn load(db: &Database) -> ArtifactResult<Self> {
        let known = db.list_known_drugs()?;
        if known.is_empty() {
            return Err(ArtifactError::EmptyVocabulary);
        }
        let vocabulary = DrugVocabulary::from_names(&known);

        let rules = db.load_rule_set()?;
        let typos = TypoTable::from_corrections(&rules.typos);
        let overrides = OverrideTable::from_rules(&rules.overrides);
        let lifestyle = LifestyleTable::from_rules(&rules.lifestyle);

        let vectorizer_row = db.require_artifact(VECTORIZER_ARTIFACT)?;
        let classifier_row = db.require_artifact(CLASSIFIER_ARTIFACT)?;
        let labels_row = db.require_artifact(LABEL_ENCODER_ARTIFACT)?;

        let model_version = vectorizer_row.version.clone();
        for row in [&classifier_row, &labels_row] {
            if row.version != model_version {
                return Err(ArtifactError::VersionMismatch(format!(
                    "'{}' is {}, '{}' is {}",
                    VECTORIZER_ARTIFACT, model_version, row.name, row.version
                )));
            }
        }

        let vectorizer: TfidfVectorizer = decode(&vectorizer_row)?;
        let classifier: MultinomialNb = decode(&classifier_row)?;
        let labels: LabelEncoder = decode(&labels_row)?;
        let model = TrainedModel::new(vectorizer, classifier, labels);
        if let Some(problem) = model.consistency_error() {
            return Err(ArtifactError::Inconsistent(problem));
        }

        let fingerprint = compute_fingerprint(
            &[&vectorizer_row, &classifier_row, &labels_row],
            &rules.version,
            &overrides,
            &typos,
        );

        let bundle = Self {
            vocabulary,
            typos,
            overrides,
            lifestyle,
            model,
            model_version,
            rules_version: rules.version,
            fingerprint,
        };

        info!(
            model_version = %bundle.model_version,
            rules_version = %bundle.rules_version,
            vocabulary = bundle.vocabulary.len(),
            overrides = bundle.overrides.len(),
            typos = bundle.typos.len(),
            labels = ?bundle.model.labels().classes(),
            fingerprint = %bundle.fingerprint,
            "artifact bundle loaded"
        );

        Ok(bundle)
    }

    /// Store a trained model as the active artifact set under `version`.
    pub fn save_model(db: &Database, model: &TrainedModel, version: &str) -> ArtifactResult<()> {
        let payloads = [
            (VECTORIZER_ARTIFACT, encode(VECTORIZER_ARTIFACT, model.vectorizer())?),
            (CLASSIFIER_ARTIFACT, encode(CLASSIFIER_ARTIFACT, model.classifier())?),
            (LABEL_ENCODER_ARTIFACT, encode(LABEL_ENCODER_ARTIFACT, model.labels())?),
        ];
        db.save_artifacts(version, &payloads)?;
        info!(version, "model artifacts saved");
        Ok(())
    }

    /// Hex SHA-256 identifying the exact model and rules in use.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Summary for status output and audit logs.
    pub fn info(&self) -> ArtifactInfo {
        ArtifactInfo {
            fingerprint: self.fingerprint.clone(),
            model_version: self.model_version.clone(),
            rules_version: self.rules_version.clone(),
            vocabulary_size: self.vocabulary.len(),
            override_count: self.overrides.len(),
            labels: self.model.labels().classes().to_vec(),
        }
    }
}

fn decode<T: DeserializeOwned>(row: &StoredArtifact) -> ArtifactResult<T> {
    if !row.verify() {
        return Err(ArtifactError::HashMismatch(row.name.clone()));
    }
    serde_json::from_str(&row.payload).map_err(|source| ArtifactError::Malformed {
        name: row.name.clone(),
        source,
    })
}

fn encode<T: Serialize>(name: &str, value: &T) -> ArtifactResult<String> {
    serde_json::to_string(value).map_err(|source| ArtifactError::Malformed {
        name: name.to_string(),
        source,
    })
}

fn compute_fingerprint(
    rows: &[&StoredArtifact],
    rules_version: &str,
    overrides: &OverrideTable,
    typos: &TypoTable,
) -> String {
    let mut hasher = Sha256::new();
    for row in rows {
        hasher.update(row.name.as_bytes());
        hasher.update(b"=");
        hasher.update(row.sha256.as_bytes());
        hasher.update(b"\n");
    }
    hasher.update(b"rules=");
    hasher.update(rules_version.as_bytes());
    hasher.update(b"\n");
    hasher.update(overrides.fingerprint().as_bytes());
    hasher.update(b"\n");
    hasher.update(typos.fingerprint().as_bytes());
    hex::encode(hasher.finalize())
}
