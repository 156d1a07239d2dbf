//! Golden tests for drug-name extraction.
//!
//! These tests run extraction against a store seeded with the shared
//! reference dataset and rule set.

mod common;

use std::sync::Arc;

use zovida_core::{PartialMatchPolicy, PrescriptionAnalyzer};
use zovida_llm::{LlmClient, MockLlmClient};

/// Test case from golden file.
struct GoldenCase {
    id: &'static str,
    text: &'static str,
    expected: &'static [&'static str],
}

fn get_golden_cases() -> Vec<GoldenCase> {
    vec![
        GoldenCase {
            id: "unigram-and-bigram",
            text: "Take Warfarin 5mg and Calcium Carbonate 500mg daily",
            expected: &["Calcium Carbonate", "Warfarin"],
        },
        GoldenCase {
            id: "typo-table",
            text: "ibupro 400 twice daily",
            expected: &["Ibuprofen"],
        },
        GoldenCase {
            id: "typo-and-symbol",
            text: "paracetmol + cetirizine",
            expected: &["Cetirizine", "Paracetamol"],
        },
        GoldenCase {
            id: "uppercase-bigram",
            text: "POTASSIUM CHLORIDE with lisinopril",
            expected: &["Lisinopril", "Potassium Chloride"],
        },
        GoldenCase {
            id: "partial-prefix",
            text: "omepra 20mg",
            expected: &["Omeprazole"],
        },
        GoldenCase {
            id: "partial-first-word-of-bigram",
            text: "calcium tablets",
            expected: &["Calcium Carbonate"],
        },
        GoldenCase {
            id: "partial-second-word-of-bigram",
            text: "chloride",
            expected: &["Potassium Chloride"],
        },
        GoldenCase {
            id: "duplicates",
            text: "metformin metformin METFORMIN",
            expected: &["Metformin"],
        },
        GoldenCase {
            id: "punctuation-separated",
            text: "Spironolactone/Digoxin;Aspirin",
            expected: &["Aspirin", "Digoxin", "Spironolactone"],
        },
        GoldenCase {
            id: "ocr-noise",
            text: "Rx: warfarin\n\n 2.5 mg  o.d. | amoxicillin 500 t.d.s",
            expected: &["Amoxicillin", "Warfarin"],
        },
        GoldenCase {
            id: "no-drugs",
            text: "no medicines here",
            expected: &[],
        },
        GoldenCase {
            id: "empty",
            text: "",
            expected: &[],
        },
    ]
}

fn local_analyzer(policy: PartialMatchPolicy) -> PrescriptionAnalyzer {
    PrescriptionAnalyzer::from_bundle(common::seeded_bundle(), policy, None)
}

#[test]
fn test_golden_cases() {
    let analyzer = local_analyzer(PartialMatchPolicy::FirstMatch);

    for case in get_golden_cases() {
        let found = analyzer.extract_drugs(case.text).to_vec();
        assert_eq!(found, case.expected, "Case {}: extraction mismatch", case.id);
    }
}

#[test]
fn test_partial_matching_disabled() {
    let analyzer = local_analyzer(PartialMatchPolicy::Off);

    assert!(analyzer.extract_drugs("omepra 20mg").is_empty());
    assert!(analyzer.extract_drugs("calcium tablets").is_empty());
    // exact and typo matches are unaffected
    assert_eq!(
        analyzer.extract_drugs("ibupro and warfarin").to_vec(),
        vec!["Ibuprofen", "Warfarin"]
    );
}

#[test]
fn test_extraction_is_idempotent_on_its_output() {
    let analyzer = local_analyzer(PartialMatchPolicy::FirstMatch);

    for case in get_golden_cases() {
        let first = analyzer.extract_drugs(case.text);
        let joined = first.to_vec().join(" ");
        let second = analyzer.extract_drugs(&joined);
        assert_eq!(first, second, "Case {}: re-extraction changed the set", case.id);
    }
}

#[test]
fn test_fallback_only_when_nothing_matches() {
    let mock = Arc::new(MockLlmClient::new("Lisinopril, Atorvastatin"));
    let client: Arc<dyn LlmClient> = mock.clone();
    let analyzer = PrescriptionAnalyzer::from_bundle(
        common::seeded_bundle(),
        PartialMatchPolicy::FirstMatch,
        Some(client),
    );

    assert_eq!(analyzer.extract_drugs("warfarin").to_vec(), vec!["Warfarin"]);
    assert!(analyzer.extract_drugs("   ").is_empty());
    assert_eq!(mock.calls(), 0);

    let found = analyzer.extract_drugs("the blue pill and the statin");
    assert_eq!(found.to_vec(), vec!["Atorvastatin", "Lisinopril"]);
    assert_eq!(mock.calls(), 1);
    assert!(mock
        .last_prompt()
        .unwrap()
        .contains("the blue pill and the statin"));
}

#[test]
fn test_fallback_keeps_names_around_combinations() {
    let mock = Arc::new(MockLlmClient::new("Amoxicillin/Clavulanate, Ibuprofen, Metformin"));
    let client: Arc<dyn LlmClient> = mock.clone();
    let analyzer = PrescriptionAnalyzer::from_bundle(
        common::seeded_bundle(),
        PartialMatchPolicy::FirstMatch,
        Some(client),
    );

    let found = analyzer.extract_drugs("the usual tablets twice");
    assert_eq!(
        found.to_vec(),
        vec!["Amoxicillin", "Clavulanate", "Ibuprofen", "Metformin"]
    );

    let client: Arc<dyn LlmClient> =
        Arc::new(MockLlmClient::new("Ibuprofen, Vitamin D3 (Cholecalciferol)"));
    let analyzer = PrescriptionAnalyzer::from_bundle(
        common::seeded_bundle(),
        PartialMatchPolicy::FirstMatch,
        Some(client),
    );
    assert_eq!(
        analyzer.extract_drugs("pain tabs and sunshine pills").to_vec(),
        vec!["Ibuprofen", "Vitamin D3"]
    );
}

#[test]
fn test_fallback_failure_yields_empty_set() {
    let client: Arc<dyn LlmClient> = Arc::new(MockLlmClient::failing());
    let analyzer = PrescriptionAnalyzer::from_bundle(
        common::seeded_bundle(),
        PartialMatchPolicy::FirstMatch,
        Some(client),
    );

    let analysis = analyzer.analyze_text("the blue pill");
    assert!(analysis.drugs.is_empty());
    assert!(analysis.interactions.is_empty());
}

#[test]
fn test_fallback_prose_is_rejected() {
    let client: Arc<dyn LlmClient> = Arc::new(MockLlmClient::new(
        "I think the patient is taking something for blood pressure.",
    ));
    let analyzer = PrescriptionAnalyzer::from_bundle(
        common::seeded_bundle(),
        PartialMatchPolicy::FirstMatch,
        Some(client),
    );

    assert!(analyzer.extract_drugs("bp tabs").is_empty());
}
