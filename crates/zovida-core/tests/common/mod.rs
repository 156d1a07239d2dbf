//! Shared fixtures for integration tests.
#![allow(dead_code)]

use zovida_core::models::{
    LifestyleRule, LifestyleWarning, OverrideRule, ReferencePair, RuleSet, TypoCorrection,
    WarningAction, WarningKind,
};
use zovida_core::{ArtifactBundle, Database, Trainer};

/// Four severity groups with disjoint drugs.
pub fn reference_pairs() -> Vec<ReferencePair> {
    vec![
        ReferencePair::new("Aspirin", "Clopidogrel", "Major"),
        ReferencePair::new("Warfarin", "Ibuprofen", "Major"),
        ReferencePair::new("Warfarin", "Naproxen", "Major"),
        ReferencePair::new("Ibuprofen", "Naproxen", "Major"),
        ReferencePair::new("Clopidogrel", "Naproxen", "Major"),
        ReferencePair::new("Lisinopril", "Spironolactone", "Moderate"),
        ReferencePair::new("Lisinopril", "Potassium Chloride", "Moderate"),
        ReferencePair::new("Spironolactone", "Potassium Chloride", "Moderate"),
        ReferencePair::new("Digoxin", "Spironolactone", "Moderate"),
        ReferencePair::new("Metformin", "Calcium Carbonate", "Minor"),
        ReferencePair::new("Metformin", "Omeprazole", "Minor"),
        ReferencePair::new("Omeprazole", "Calcium Carbonate", "Minor"),
        ReferencePair::new("Levothyroxine", "Calcium Carbonate", "Minor"),
        ReferencePair::new("Amoxicillin", "Paracetamol", "Safe"),
        ReferencePair::new("Paracetamol", "Cetirizine", "Safe"),
        ReferencePair::new("Amoxicillin", "Cetirizine", "Safe"),
        ReferencePair::new("Cetirizine", "Loratadine", "Safe"),
    ]
}

pub fn rule_set() -> RuleSet {
    RuleSet {
        version: "test-rules-1".into(),
        overrides: vec![
            OverrideRule::new("Warfarin", "Aspirin", "Major"),
            OverrideRule::new("Metformin", "Omeprazole", "Moderate"),
        ],
        typos: vec![
            TypoCorrection::new("ibupro", "ibuprofen"),
            TypoCorrection::new("paracetmol", "paracetamol"),
        ],
        lifestyle: vec![
            LifestyleRule {
                drug: "Warfarin".into(),
                warning: LifestyleWarning::new(
                    WarningKind::Food,
                    "Limit Vitamin K",
                    "Leafy greens reduce the anticoagulant effect.",
                    WarningAction::Monitor,
                ),
            },
            LifestyleRule {
                drug: "Ibuprofen".into(),
                warning: LifestyleWarning::new(
                    WarningKind::Alcohol,
                    "Avoid Alcohol",
                    "Raises the risk of stomach bleeding.",
                    WarningAction::Avoid,
                ),
            },
            LifestyleRule {
                drug: "Naproxen".into(),
                warning: LifestyleWarning::new(
                    WarningKind::Alcohol,
                    "Avoid Alcohol",
                    "Raises the risk of stomach bleeding.",
                    WarningAction::Avoid,
                ),
            },
        ],
    }
}

/// Store with the reference dataset, rules and a trained model.
pub fn seeded_store(db: &Database) {
    let pairs = reference_pairs();
    db.insert_reference_pairs(&pairs).unwrap();
    db.replace_rule_set(&rule_set()).unwrap();
    let model = Trainer::new().fit(&pairs).unwrap();
    ArtifactBundle::save_model(db, &model, "test-model-1").unwrap();
}

pub fn seeded_bundle() -> ArtifactBundle {
    let db = Database::open_in_memory().unwrap();
    seeded_store(&db);
    ArtifactBundle::load(&db).unwrap()
}
