//! Model artifact storage.

use rusqlite::{params, OptionalExtension};
use sha2::{Digest, Sha256};

use super::{Database, DbError, DbResult};

/// Metadata key holding the active model version.
pub const MODEL_VERSION_KEY: &str = "model_version";

/// A serialized model artifact as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredArtifact {
    pub name: String,
    pub version: String,
    /// JSON payload
    pub payload: String,
    /// Hex SHA-256 of `payload`, recorded at save time
    pub sha256: String,
    pub created_at: String,
}

impl StoredArtifact {
    /// Whether the payload still matches its recorded hash.
    pub fn verify(&self) -> bool {
        payload_hash(&self.payload) == self.sha256
    }
}

/// Hex SHA-256 of a payload.
pub fn payload_hash(payload: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    hex::encode(hasher.finalize())
}

impl Database {
    /// Replace a set of artifacts under one version, atomically.
    ///
    /// `artifacts` holds `(name, json payload)` pairs. Returns their hashes in order.
    pub fn save_artifacts(&self, version: &str, artifacts: &[(&str, String)]) -> DbResult<Vec<String>> {
        if version.trim().is_empty() {
            return Err(DbError::Invalid("artifact version must not be blank".into()));
        }

        let tx = self.conn.unchecked_transaction()?;
        let mut hashes = Vec::with_capacity(artifacts.len());

        for (name, payload) in artifacts {
            let sha = payload_hash(payload);
            tx.execute(
                r#"
                INSERT INTO model_artifacts (name, version, payload, sha256, created_at)
                VALUES (?1, ?2, ?3, ?4, datetime('now'))
                ON CONFLICT(name) DO UPDATE SET
                    version = excluded.version,
                    payload = excluded.payload,
                    sha256 = excluded.sha256,
                    created_at = datetime('now')
                "#,
                params![name, version, payload, sha],
            )?;
            hashes.push(sha);
        }

        tx.execute(
            r#"
            INSERT INTO store_metadata (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = datetime('now')
            "#,
            params![MODEL_VERSION_KEY, version],
        )?;

        tx.commit()?;
        Ok(hashes)
    }

    /// Load one artifact by name.
    pub fn load_artifact(&self, name: &str) -> DbResult<Option<StoredArtifact>> {
        let artifact = self
            .conn
            .query_row(
                r#"
                SELECT name, version, payload, sha256, created_at
                FROM model_artifacts
                WHERE name = ?
                "#,
                [name],
                |row| {
                    Ok(StoredArtifact {
                        name: row.get(0)?,
                        version: row.get(1)?,
                        payload: row.get(2)?,
                        sha256: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(artifact)
    }

    /// Load one artifact, failing if it is absent.
    pub fn require_artifact(&self, name: &str) -> DbResult<StoredArtifact> {
        self.load_artifact(name)?
            .ok_or_else(|| DbError::NotFound(format!("model artifact '{}'", name)))
    }
}
