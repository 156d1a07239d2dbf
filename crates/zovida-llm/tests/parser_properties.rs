//! Property tests for the response adapters.
//!
//! Whatever a model sends back, the parsers either return well-formed values
//! or an error. They never panic and never pass prose through as a drug name.

use proptest::prelude::*;
use zovida_llm::{parse_drug_list, parse_lifestyle_response, DrugList};

proptest! {
    #[test]
    fn drug_list_parser_never_panics(response in ".{0,200}") {
        let _ = parse_drug_list(&response);
    }

    #[test]
    fn parsed_names_are_name_shaped(response in "[A-Za-z ,.\\-\n:0-9]{0,120}") {
        if let Ok(DrugList::Names(names)) = parse_drug_list(&response) {
            prop_assert!(!names.is_empty());
            for name in names {
                prop_assert!(!name.trim().is_empty());
                prop_assert!(name.split_whitespace().count() <= 4);
                prop_assert!(name.chars().any(|c| c.is_alphabetic()));
                prop_assert!(!name.contains(','));
                prop_assert!(!name.contains(':'));
            }
        }
    }

    #[test]
    fn comma_lists_round_trip(names in prop::collection::vec("[A-Z][a-z]{3,12}", 1..6)) {
        prop_assume!(names.iter().all(|n| !n.eq_ignore_ascii_case("none")));
        let response = names.join(", ");
        let parsed = parse_drug_list(&response).unwrap();
        prop_assert_eq!(parsed, DrugList::Names(names));
    }

    #[test]
    fn combination_entries_keep_every_component(
        names in prop::collection::vec("[A-Z][a-z]{3,12}", 2..5),
        synonym in "[A-Z][a-z]{3,12}",
        extra in "[A-Z][a-z]{3,12}",
    ) {
        prop_assume!(names.iter().chain([&synonym, &extra]).all(|n| !n.eq_ignore_ascii_case("none")));
        let response = format!("{} ({}), {}", names.join("/"), synonym, extra);
        let parsed = parse_drug_list(&response).unwrap().into_names();

        let mut expected = names.clone();
        expected.push(extra);
        prop_assert_eq!(parsed, expected);
    }

    #[test]
    fn one_bad_entry_does_not_discard_the_rest(
        names in prop::collection::vec("[A-Z][a-z]{3,12}", 1..5),
        position in 0usize..5,
    ) {
        prop_assume!(names.iter().all(|n| !n.eq_ignore_ascii_case("none")));
        let mut entries: Vec<String> = names.clone();
        let at = position.min(entries.len());
        entries.insert(at, "see note: 5mg".to_string());

        let parsed = parse_drug_list(&entries.join(", ")).unwrap();
        prop_assert_eq!(parsed, DrugList::Names(names));
    }

    #[test]
    fn lifestyle_parser_never_panics(response in ".{0,200}") {
        let _ = parse_lifestyle_response(&response);
    }
}

#[test]
fn test_lifestyle_shapes_agree() {
    let item = r#"{"type":"food","warning":"Avoid Grapefruit","impact":"x","action":"avoid"}"#;

    let list = parse_lifestyle_response(&format!("[{}]", item)).unwrap();
    let grouped = parse_lifestyle_response(&format!(r#"{{"warnings":[{}]}}"#, item)).unwrap();
    let nested =
        parse_lifestyle_response(&format!(r#"{{"atorvastatin":{{"food":[{}]}}}}"#, item)).unwrap();

    assert_eq!(list, grouped);
    assert_eq!(grouped, nested);
    assert_eq!(list[0].warning, "Avoid Grapefruit");
}
