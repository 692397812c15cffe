//! Spending aggregation over categorized transactions.
//!
//! Sums are accumulated in input order, so the same input always yields the
//! same floating-point totals.

use fatura_core::{CategorizedTransaction, Category, CategoryError, Subcategory};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SummaryError {
    #[error(transparent)]
    Category(#[from] CategoryError),

    #[error("{merchant:?}: spending amount must be finite and non-negative, got {amount}")]
    InvalidAmount { merchant: String, amount: f64 },
}

/// `part / whole`, or 0 when `whole` is 0.
pub fn share(part: f64, whole: f64) -> f64 {
    if whole == 0.0 { 0.0 } else { part / whole }
}

/// Shares of the parent total, as fractions in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct Percentages {
    /// Fixed total over grand total
    pub fixed: f64,
    /// Variable total over grand total
    pub variable: f64,
    /// Each subcategory total over its category total
    pub subcategories: BTreeMap<Subcategory, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubcategoryShare {
    pub subcategory: Subcategory,
    pub total: f64,
    /// Fraction of the owning category's total
    pub share: f64,
}

/// Totals for one statement. Built only by `summarize`; recompute from
/// scratch when the input changes.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct SpendingSummary {
    total: f64,
    fixed_total: f64,
    variable_total: f64,
    subcategory_totals: BTreeMap<Subcategory, f64>,
    percentages: Percentages,
    transaction_count: usize,
}

impl SpendingSummary {
    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn fixed_total(&self) -> f64 {
        self.fixed_total
    }

    pub fn variable_total(&self) -> f64 {
        self.variable_total
    }

    pub fn category_total(&self, category: Category) -> f64 {
        match category {
            Category::Fixed => self.fixed_total,
            Category::Variable => self.variable_total,
        }
    }

    pub fn category_share(&self, category: Category) -> f64 {
        match category {
            Category::Fixed => self.percentages.fixed,
            Category::Variable => self.percentages.variable,
        }
    }

    /// Keyed by subcategory; the key implies the category.
    pub fn subcategory_totals(&self) -> &BTreeMap<Subcategory, f64> {
        &self.subcategory_totals
    }

    pub fn subcategory_total(&self, subcategory: Subcategory) -> f64 {
        self.subcategory_totals.get(&subcategory).copied().unwrap_or(0.0)
    }

    pub fn percentages(&self) -> &Percentages {
        &self.percentages
    }

    /// Number of Spending transactions that were counted
    pub fn transaction_count(&self) -> usize {
        self.transaction_count
    }

    /// The `n` largest subcategories of `category`, descending by total.
    /// Equal totals keep enumeration order.
    pub fn top_subcategories(&self, category: Category, n: usize) -> Vec<SubcategoryShare> {
        let mut ranked: Vec<SubcategoryShare> = category
            .subcategories()
            .iter()
            .filter_map(|sub| {
                self.subcategory_totals.get(sub).map(|&total| SubcategoryShare {
                    subcategory: *sub,
                    total,
                    share: self.percentages.subcategories.get(sub).copied().unwrap_or(0.0),
                })
            })
            .collect();

        // sort_by is stable, so ties stay in enumeration order
        ranked.sort_by(|a, b| b.total.total_cmp(&a.total));
        ranked.truncate(n);
        ranked
    }
}

/// Aggregate categorized transactions into category and subcategory totals.
///
/// Payments and reversals are skipped even if they reach this point. A record
/// whose subcategory is outside its category fails the whole call rather
/// than being counted in the wrong bucket, and so does a negative or
/// non-finite amount.
pub fn summarize(txns: &[CategorizedTransaction]) -> Result<SpendingSummary, SummaryError> {
    let mut summary = SpendingSummary::default();
    let mut excluded = 0usize;

    for rec in txns {
        if !rec.transaction().is_spending() {
            excluded += 1;
            debug!(merchant = %rec.transaction().merchant, kind = ?rec.transaction().kind, "excluding non-spending record");
            continue;
        }
        rec.validate()?;

        let amount = rec.amount();
        if !amount.is_finite() || amount < 0.0 {
            return Err(SummaryError::InvalidAmount {
                merchant: rec.transaction().merchant.clone(),
                amount,
            });
        }
        summary.total += amount;
        match rec.category() {
            Category::Fixed => summary.fixed_total += amount,
            Category::Variable => summary.variable_total += amount,
        }
        *summary.subcategory_totals.entry(rec.subcategory()).or_insert(0.0) += amount;
        summary.transaction_count += 1;
    }

    summary.percentages = Percentages {
        fixed: share(summary.fixed_total, summary.total),
        variable: share(summary.variable_total, summary.total),
        subcategories: summary
            .subcategory_totals
            .iter()
            .map(|(sub, &amount)| (*sub, share(amount, summary.category_total(sub.category()))))
            .collect(),
    };

    info!(
        counted = summary.transaction_count,
        excluded,
        total = summary.total,
        "summarized spending"
    );
    Ok(summary)
}
