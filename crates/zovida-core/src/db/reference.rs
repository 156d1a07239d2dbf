//! Reference dataset operations.

use std::collections::BTreeSet;
use std::io::Read;

use rusqlite::params;
use tracing::debug;

use super::{Database, DbError, DbResult};
use crate::models::ReferencePair;

impl Database {
    /// Append reference rows in one transaction. Returns the number inserted.
    ///
    /// Rows with a blank name or level are rejected before anything is written.
    pub fn insert_reference_pairs(&self, pairs: &[ReferencePair]) -> DbResult<usize> {
        self.write_reference_pairs(pairs, false)
    }

    /// Swap the whole reference dataset for `pairs` in one transaction.
    ///
    /// On any error the previous rows are left untouched.
    pub fn replace_reference_pairs(&self, pairs: &[ReferencePair]) -> DbResult<usize> {
        self.write_reference_pairs(pairs, true)
    }

    /// Import a `Drug_A,Drug_B,Level` CSV, appending or replacing.
    ///
    /// The file is parsed in full before the store is touched.
    pub fn import_reference_csv<R: Read>(&self, reader: R, replace: bool) -> DbResult<usize> {
        let pairs = read_reference_csv(reader)?;
        let written = self.write_reference_pairs(&pairs, replace)?;
        debug!(rows = written, replace, "imported reference dataset");
        Ok(written)
    }

    fn write_reference_pairs(&self, pairs: &[ReferencePair], replace: bool) -> DbResult<usize> {
        for (index, pair) in pairs.iter().enumerate() {
            validate_pair(index, pair)?;
        }

        let tx = self.conn.unchecked_transaction()?;
        if replace {
            let removed = tx.execute("DELETE FROM reference_pairs", [])?;
            debug!(removed, "cleared reference dataset");
        }
        {
            let mut stmt = tx.prepare(
                "INSERT INTO reference_pairs (drug_a, drug_b, level, pair_key) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for pair in pairs {
                stmt.execute(params![
                    pair.drug_a.trim(),
                    pair.drug_b.trim(),
                    pair.level.trim(),
                    pair.key().as_text(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(pairs.len())
    }

    /// All reference rows in insertion order.
    pub fn list_reference_pairs(&self) -> DbResult<Vec<ReferencePair>> {
        let mut stmt = self
            .conn
            .prepare("SELECT drug_a, drug_b, level FROM reference_pairs ORDER BY id")?;

        let rows = stmt.query_map([], |row| {
            Ok(ReferencePair {
                drug_a: row.get(0)?,
                drug_b: row.get(1)?,
                level: row.get(2)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }

    pub fn count_reference_pairs(&self) -> DbResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM reference_pairs", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Distinct lower-cased drug names appearing in either column.
    pub fn list_known_drugs(&self) -> DbResult<BTreeSet<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT drug_a FROM reference_pairs UNION SELECT drug_b FROM reference_pairs")?;

        let names = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut known = BTreeSet::new();
        for name in names {
            let name = name?.trim().to_lowercase();
            if !name.is_empty() {
                known.insert(name);
            }
        }
        Ok(known)
    }
}

/// Parse a `Drug_A,Drug_B,Level` CSV. Extra columns are ignored.
fn read_reference_csv<R: Read>(reader: R) -> DbResult<Vec<ReferencePair>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut pairs = Vec::new();
    for record in csv_reader.deserialize() {
        let pair: ReferencePair = record?;
        pairs.push(pair);
    }
    Ok(pairs)
}

fn validate_pair(index: usize, pair: &ReferencePair) -> DbResult<()> {
    if pair.drug_a.trim().is_empty() || pair.drug_b.trim().is_empty() {
        return Err(DbError::Invalid(format!(
            "reference row {} has a blank drug name",
            index + 1
        )));
    }
    if pair.level.trim().is_empty() {
        return Err(DbError::Invalid(format!(
            "reference row {} has a blank level",
            index + 1
        )));
    }
    Ok(())
}
