//! SQLite schema definition.

/// Complete artifact store schema.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Reference Dataset (known interacting pairs; source of the vocabulary)
-- ============================================================================

CREATE TABLE IF NOT EXISTS reference_pairs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    drug_a TEXT NOT NULL,
    drug_b TEXT NOT NULL,
    level TEXT NOT NULL CHECK (length(trim(level)) > 0),
    pair_key TEXT NOT NULL,                       -- "a + b", lower-cased and sorted
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_reference_pair_key ON reference_pairs(pair_key);

-- ============================================================================
-- Curated Rules (versioned configuration data)
-- ============================================================================

CREATE TABLE IF NOT EXISTS override_rules (
    pair_key TEXT PRIMARY KEY,
    drug_a TEXT NOT NULL,
    drug_b TEXT NOT NULL,
    level TEXT NOT NULL CHECK (length(trim(level)) > 0),
    note TEXT,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS typo_corrections (
    token TEXT PRIMARY KEY,
    canonical TEXT NOT NULL CHECK (length(trim(canonical)) > 0),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS lifestyle_rules (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    drug TEXT NOT NULL,
    kind TEXT NOT NULL CHECK (kind IN ('food', 'alcohol', 'supplement', 'lifestyle')),
    warning TEXT NOT NULL,
    impact TEXT NOT NULL DEFAULT '',
    action TEXT NOT NULL CHECK (action IN ('avoid', 'eat', 'monitor')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE (drug, kind, warning)
);

CREATE INDEX IF NOT EXISTS idx_lifestyle_drug ON lifestyle_rules(drug);

-- ============================================================================
-- Trained Model Artifacts (replaced as a set on retraining)
-- ============================================================================

CREATE TABLE IF NOT EXISTS model_artifacts (
    name TEXT PRIMARY KEY CHECK (name IN ('vectorizer', 'classifier', 'label_encoder')),
    version TEXT NOT NULL,
    payload TEXT NOT NULL,                        -- JSON
    sha256 TEXT NOT NULL,                         -- SHA-256 of payload, hex
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- ============================================================================
-- Store Metadata
-- ============================================================================

CREATE TABLE IF NOT EXISTS store_metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

INSERT OR IGNORE INTO store_metadata (key, value) VALUES ('rules_version', '');
INSERT OR IGNORE INTO store_metadata (key, value) VALUES ('model_version', '');
"#;
