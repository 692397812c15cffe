//! Merchant knowledge base: past merchant → subcategory assignments,
//! loaded from a CSV export.
//!
//! Expected header (case-insensitive, any column order):
//!   merchant,category,subcategory
//! `category` is optional; when present it must own the subcategory.
//! "Merchant Name" is accepted for the merchant column.

use fatura_core::{Category, CategoryError, Subcategory, Transaction};
use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::classify::MerchantClassifier;

#[derive(Debug, Error)]
pub enum KnowledgeBaseError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing column {0:?}")]
    MissingColumn(&'static str),

    #[error("line {line}: {source}")]
    InvalidRow {
        line: u64,
        #[source]
        source: CategoryError,
    },

    #[error("line {line}: empty merchant")]
    EmptyMerchant { line: u64 },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct KnowledgeBase {
    entries: BTreeMap<String, Subcategory>,
}

/// Uppercase, whitespace collapsed
fn merchant_key(merchant: &str) -> String {
    merchant
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, KnowledgeBaseError> {
        let rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path.as_ref())?;
        Self::from_csv(rdr)
    }

    pub fn from_reader(reader: impl io::Read) -> Result<Self, KnowledgeBaseError> {
        let rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        Self::from_csv(rdr)
    }

    fn from_csv<R: io::Read>(mut rdr: csv::Reader<R>) -> Result<Self, KnowledgeBaseError> {
        let headers = rdr.headers()?.clone();
        let column = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.eq_ignore_ascii_case(n)))
        };

        let merchant_col = column(&["merchant", "merchant name"])
            .ok_or(KnowledgeBaseError::MissingColumn("merchant"))?;
        let subcategory_col =
            column(&["subcategory"]).ok_or(KnowledgeBaseError::MissingColumn("subcategory"))?;
        let category_col = column(&["category"]);

        let mut kb = KnowledgeBase::new();

        for result in rdr.records() {
            let record = result?;
            let line = record.position().map_or(0, |p| p.line());

            let merchant = record.get(merchant_col).unwrap_or("");
            if merchant.is_empty() {
                // trailing blank rows are common in spreadsheet exports
                if record.iter().all(str::is_empty) {
                    continue;
                }
                return Err(KnowledgeBaseError::EmptyMerchant { line });
            }

            let invalid = |source| KnowledgeBaseError::InvalidRow { line, source };

            let subcategory: Subcategory = record
                .get(subcategory_col)
                .unwrap_or("")
                .parse()
                .map_err(invalid)?;

            if let Some(raw) = category_col.and_then(|c| record.get(c)).filter(|s| !s.is_empty()) {
                let category: Category = raw.parse().map_err(invalid)?;
                if !category.contains(subcategory) {
                    return Err(invalid(CategoryError::InvalidCategoryAssignment {
                        merchant: merchant.to_string(),
                        category,
                        subcategory,
                    }));
                }
            }

            kb.insert(merchant, subcategory);
        }

        debug!(entries = kb.len(), "loaded merchant knowledge base");
        Ok(kb)
    }

    /// Later entries for the same merchant replace earlier ones.
    pub fn insert(&mut self, merchant: &str, subcategory: Subcategory) {
        if let Some(previous) = self.entries.insert(merchant_key(merchant), subcategory) {
            if previous != subcategory {
                debug!(merchant, %previous, %subcategory, "knowledge base entry replaced");
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact match first, then the longest known merchant that prefixes the
    /// given name at a word boundary ("NETFLIX.COM" knows "NETFLIX.COM SP").
    pub fn lookup(&self, merchant: &str) -> Option<Subcategory> {
        let key = merchant_key(merchant);
        if let Some(sub) = self.entries.get(&key) {
            return Some(*sub);
        }

        self.entries
            .iter()
            .filter(|(known, _)| {
                key.strip_prefix(known.as_str())
                    .and_then(|rest| rest.chars().next())
                    .is_some_and(|c| !c.is_alphanumeric())
            })
            .max_by_key(|(known, _)| known.len())
            .map(|(_, sub)| *sub)
    }
}

impl MerchantClassifier for KnowledgeBase {
    fn classify(&self, txn: &Transaction) -> Option<Subcategory> {
        self.lookup(&txn.merchant)
    }
}
