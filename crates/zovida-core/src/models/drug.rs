//! Extracted drug name models.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Set of canonical, title-cased drug names extracted from one input.
///
/// Never holds duplicates or blank names. Iteration is in sorted order so
/// pairing downstream is reproducible.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ExtractedDrugSet {
    names: BTreeSet<String>,
}

impl ExtractedDrugSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw names, title-casing each and dropping blanks.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for name in names {
            set.insert(name.as_ref());
        }
        set
    }

    /// Insert a name (title-cased). Returns false for blanks and duplicates.
    pub fn insert(&mut self, name: &str) -> bool {
        let collapsed = name.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            return false;
        }
        self.names.insert(title_case(&collapsed))
    }

    /// Check membership of an already title-cased name.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Names in sorted order.
    pub fn to_vec(&self) -> Vec<String> {
        self.names.iter().cloned().collect()
    }
}

impl<'a> IntoIterator for &'a ExtractedDrugSet {
    type Item = &'a String;
    type IntoIter = std::collections::btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.iter()
    }
}

/// Title-case a name: the first letter of every alphabetic run is upper-cased,
/// the rest lower-cased ("calcium carbonate" -> "Calcium Carbonate",
/// "co-trimoxazole" -> "Co-Trimoxazole").
pub fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_alpha = false;
    for c in name.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("aspirin"), "Aspirin");
        assert_eq!(title_case("calcium carbonate"), "Calcium Carbonate");
        assert_eq!(title_case("WARFARIN"), "Warfarin");
        assert_eq!(title_case("co-trimoxazole"), "Co-Trimoxazole");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_set_dedupes_and_drops_blanks() {
        let set = ExtractedDrugSet::from_names(["aspirin", "ASPIRIN", "  ", "", "Warfarin"]);
        assert_eq!(set.len(), 2);
        assert!(set.contains("Aspirin"));
        assert!(set.contains("Warfarin"));
    }

    #[test]
    fn test_set_collapses_inner_whitespace() {
        let set = ExtractedDrugSet::from_names(["calcium   carbonate"]);
        assert!(set.contains("Calcium Carbonate"));
    }

    #[test]
    fn test_set_iterates_sorted() {
        let set = ExtractedDrugSet::from_names(["warfarin", "aspirin", "metformin"]);
        assert_eq!(set.to_vec(), vec!["Aspirin", "Metformin", "Warfarin"]);
    }

    #[test]
    fn test_set_serializes_as_list() {
        let set = ExtractedDrugSet::from_names(["warfarin", "aspirin"]);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["Aspirin","Warfarin"]"#);
    }
}
