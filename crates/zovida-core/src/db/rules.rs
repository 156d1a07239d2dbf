//! Curated rule operations (overrides, typo corrections, lifestyle table).

use rusqlite::{params, Connection};
use tracing::info;

use super::{Database, DbError, DbResult};
use crate::models::{
    LifestyleRule, LifestyleWarning, OverrideRule, RuleSet, TypoCorrection, WarningAction,
    WarningKind,
};

/// Metadata key holding the active rule set version.
pub const RULES_VERSION_KEY: &str = "rules_version";

impl Database {
    /// Insert or replace an override rule (keyed by canonical pair).
    pub fn upsert_override_rule(&self, rule: &OverrideRule) -> DbResult<()> {
        upsert_override(&self.conn, rule)
    }

    /// Remove the override for a pair. Returns false if none existed.
    pub fn delete_override_rule(&self, drug_a: &str, drug_b: &str) -> DbResult<bool> {
        let key = crate::models::PairKey::new(drug_a, drug_b);
        let changed = self.conn.execute(
            "DELETE FROM override_rules WHERE pair_key = ?",
            [key.as_text()],
        )?;
        Ok(changed > 0)
    }

    /// Override rules ordered by pair key.
    pub fn list_override_rules(&self) -> DbResult<Vec<OverrideRule>> {
        let mut stmt = self.conn.prepare(
            "SELECT drug_a, drug_b, level, note FROM override_rules ORDER BY pair_key",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(OverrideRule {
                drug_a: row.get(0)?,
                drug_b: row.get(1)?,
                level: row.get(2)?,
                note: row.get(3)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }

    pub fn upsert_typo_correction(&self, correction: &TypoCorrection) -> DbResult<()> {
        upsert_typo(&self.conn, correction)
    }

    /// Typo corrections ordered by token.
    pub fn list_typo_corrections(&self) -> DbResult<Vec<TypoCorrection>> {
        let mut stmt = self
            .conn
            .prepare("SELECT token, canonical FROM typo_corrections ORDER BY token")?;

        let rows = stmt.query_map([], |row| {
            Ok(TypoCorrection {
                token: row.get(0)?,
                canonical: row.get(1)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }

    /// Lifestyle rules in insertion order.
    pub fn list_lifestyle_rules(&self) -> DbResult<Vec<LifestyleRule>> {
        let mut stmt = self.conn.prepare(
            "SELECT drug, kind, warning, impact, action FROM lifestyle_rules ORDER BY id",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(LifestyleRuleRow {
                drug: row.get(0)?,
                kind: row.get(1)?,
                warning: row.get(2)?,
                impact: row.get(3)?,
                action: row.get(4)?,
            })
        })?;

        rows.map(|r| r.map_err(DbError::from).and_then(LifestyleRule::try_from))
            .collect()
    }

    /// Replace all curated rules with `rules` and record its version.
    ///
    /// Runs in one transaction: either the whole set is active or none of it.
    pub fn replace_rule_set(&self, rules: &RuleSet) -> DbResult<()> {
        let tx = self.conn.unchecked_transaction()?;

        tx.execute("DELETE FROM override_rules", [])?;
        tx.execute("DELETE FROM typo_corrections", [])?;
        tx.execute("DELETE FROM lifestyle_rules", [])?;

        for rule in &rules.overrides {
            upsert_override(&tx, rule)?;
        }
        for correction in &rules.typos {
            upsert_typo(&tx, correction)?;
        }
        for rule in &rules.lifestyle {
            upsert_lifestyle(&tx, rule)?;
        }

        tx.execute(
            r#"
            INSERT INTO store_metadata (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = datetime('now')
            "#,
            params![RULES_VERSION_KEY, rules.version],
        )?;

        tx.commit()?;

        info!(
            version = %rules.version,
            overrides = rules.overrides.len(),
            typos = rules.typos.len(),
            lifestyle = rules.lifestyle.len(),
            "rule set replaced"
        );
        Ok(())
    }

    /// Current curated rules as one versioned set.
    pub fn load_rule_set(&self) -> DbResult<RuleSet> {
        Ok(RuleSet {
            version: self.get_metadata(RULES_VERSION_KEY)?.unwrap_or_default(),
            overrides: self.list_override_rules()?,
            typos: self.list_typo_corrections()?,
            lifestyle: self.list_lifestyle_rules()?,
        })
    }
}

fn upsert_override(conn: &Connection, rule: &OverrideRule) -> DbResult<()> {
    if rule.level.trim().is_empty() {
        return Err(DbError::Invalid(format!(
            "override for {} has a blank level",
            rule.key()
        )));
    }
    conn.execute(
        r#"
        INSERT INTO override_rules (pair_key, drug_a, drug_b, level, note, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, datetime('now'))
        ON CONFLICT(pair_key) DO UPDATE SET
            drug_a = excluded.drug_a,
            drug_b = excluded.drug_b,
            level = excluded.level,
            note = excluded.note,
            updated_at = datetime('now')
        "#,
        params![
            rule.key().as_text(),
            rule.drug_a.trim(),
            rule.drug_b.trim(),
            rule.level.trim(),
            rule.note,
        ],
    )?;
    Ok(())
}

fn upsert_typo(conn: &Connection, correction: &TypoCorrection) -> DbResult<()> {
    let token = correction.token.trim().to_lowercase();
    if token.is_empty() || correction.canonical.trim().is_empty() {
        return Err(DbError::Invalid(format!(
            "typo correction '{}' -> '{}' is incomplete",
            correction.token, correction.canonical
        )));
    }
    conn.execute(
        r#"
        INSERT INTO typo_corrections (token, canonical, updated_at)
        VALUES (?1, ?2, datetime('now'))
        ON CONFLICT(token) DO UPDATE SET
            canonical = excluded.canonical,
            updated_at = datetime('now')
        "#,
        params![token, correction.canonical.trim().to_lowercase()],
    )?;
    Ok(())
}

fn upsert_lifestyle(conn: &Connection, rule: &LifestyleRule) -> DbResult<()> {
    conn.execute(
        r#"
        INSERT INTO lifestyle_rules (drug, kind, warning, impact, action, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, datetime('now'))
        ON CONFLICT(drug, kind, warning) DO UPDATE SET
            impact = excluded.impact,
            action = excluded.action,
            updated_at = datetime('now')
        "#,
        params![
            rule.drug.trim().to_lowercase(),
            rule.warning.kind.as_str(),
            rule.warning.warning,
            rule.warning.impact,
            rule.warning.action.as_str(),
        ],
    )?;
    Ok(())
}

/// Intermediate row type for lifestyle rules.
struct LifestyleRuleRow {
    drug: String,
    kind: String,
    warning: String,
    impact: String,
    action: String,
}

impl TryFrom<LifestyleRuleRow> for LifestyleRule {
    type Error = DbError;

    fn try_from(row: LifestyleRuleRow) -> Result<Self, Self::Error> {
        let kind: WarningKind = row.kind.parse().map_err(DbError::Invalid)?;
        let action: WarningAction = row.action.parse().map_err(DbError::Invalid)?;
        Ok(LifestyleRule {
            drug: row.drug,
            warning: LifestyleWarning {
                kind,
                warning: row.warning,
                impact: row.impact,
                action,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rules() -> RuleSet {
        RuleSet {
            version: "2024-06-01".into(),
            overrides: vec![OverrideRule::new("Warfarin", "Aspirin", "Major")],
            typos: vec![TypoCorrection::new("Ibupro", "ibuprofen")],
            lifestyle: vec![LifestyleRule {
                drug: "Warfarin".into(),
                warning: LifestyleWarning::new(
                    WarningKind::Food,
                    "Limit Vitamin K",
                    "Leafy greens reduce the anticoagulant effect.",
                    WarningAction::Monitor,
                ),
            }],
        }
    }

    #[test]
    fn test_override_upsert_is_order_independent() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_override_rule(&OverrideRule::new("Warfarin", "Aspirin", "Moderate"))
            .unwrap();
        db.upsert_override_rule(&OverrideRule::new("aspirin", "warfarin", "Major"))
            .unwrap();

        let rules = db.list_override_rules().unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].level, "Major");
    }

    #[test]
    fn test_delete_override() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_override_rule(&OverrideRule::new("Warfarin", "Aspirin", "Major"))
            .unwrap();

        assert!(db.delete_override_rule("aspirin", "WARFARIN").unwrap());
        assert!(!db.delete_override_rule("aspirin", "warfarin").unwrap());
    }

    #[test]
    fn test_typos_lowercased() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_typo_correction(&TypoCorrection::new("Paracetmol", "Paracetamol"))
            .unwrap();

        let typos = db.list_typo_corrections().unwrap();
        assert_eq!(typos, vec![TypoCorrection::new("paracetmol", "paracetamol")]);
    }

    #[test]
    fn test_incomplete_typo_rejected() {
        let db = Database::open_in_memory().unwrap();
        let err = db
            .upsert_typo_correction(&TypoCorrection::new("asprin", " "))
            .unwrap_err();
        assert!(matches!(err, DbError::Invalid(_)));
    }

    #[test]
    fn test_replace_rule_set_round_trip() {
        let db = Database::open_in_memory().unwrap();
        db.replace_rule_set(&sample_rules()).unwrap();

        let loaded = db.load_rule_set().unwrap();
        assert_eq!(loaded.version, "2024-06-01");
        assert_eq!(loaded.overrides.len(), 1);
        assert_eq!(loaded.typos[0].token, "ibupro");
        assert_eq!(loaded.lifestyle[0].drug, "warfarin");
        assert_eq!(loaded.lifestyle[0].warning.action, WarningAction::Monitor);
    }

    #[test]
    fn test_replace_rule_set_drops_previous_rules() {
        let db = Database::open_in_memory().unwrap();
        db.replace_rule_set(&sample_rules()).unwrap();

        let next = RuleSet {
            version: "2024-07-01".into(),
            ..RuleSet::default()
        };
        db.replace_rule_set(&next).unwrap();

        let loaded = db.load_rule_set().unwrap();
        assert_eq!(loaded.version, "2024-07-01");
        assert!(loaded.overrides.is_empty());
        assert!(loaded.typos.is_empty());
        assert!(loaded.lifestyle.is_empty());
    }

    #[test]
    fn test_failed_replace_keeps_previous_rules() {
        let db = Database::open_in_memory().unwrap();
        db.replace_rule_set(&sample_rules()).unwrap();

        let broken = RuleSet {
            version: "broken".into(),
            overrides: vec![OverrideRule::new("a", "b", "")],
            ..RuleSet::default()
        };
        assert!(db.replace_rule_set(&broken).is_err());

        let loaded = db.load_rule_set().unwrap();
        assert_eq!(loaded.version, "2024-06-01");
        assert_eq!(loaded.overrides.len(), 1);
    }
}
