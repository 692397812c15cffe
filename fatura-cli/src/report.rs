//! Plain-text and JSON renderings of a spending summary.

use fatura_core::{Category, Transaction};
use fatura_finance::{SpendingSummary, SubcategoryShare};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub summary: &'a SpendingSummary,
    pub top_fixed: Vec<SubcategoryShare>,
    pub top_variable: Vec<SubcategoryShare>,
    pub unresolved: &'a [Transaction],
}

impl<'a> Report<'a> {
    pub fn new(summary: &'a SpendingSummary, top: usize, unresolved: &'a [Transaction]) -> Self {
        Self {
            summary,
            top_fixed: summary.top_subcategories(Category::Fixed, top),
            top_variable: summary.top_subcategories(Category::Variable, top),
            unresolved,
        }
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.summary;

        writeln!(f, "Total: {:.2}\n", s.total())?;
        for category in Category::ALL {
            writeln!(
                f,
                "{}: {:.2}, {}",
                category,
                s.category_total(category),
                pct(s.category_share(category))
            )?;
        }

        for (category, top) in [
            (Category::Fixed, &self.top_fixed),
            (Category::Variable, &self.top_variable),
        ] {
            writeln!(f, "\n{category} Cost Top {} Biggest Spendings:", top.len())?;
            if top.is_empty() {
                writeln!(f, "(none)")?;
            }
            for (i, entry) in top.iter().enumerate() {
                writeln!(
                    f,
                    "{}. {}: {:.2}, {}",
                    i + 1,
                    entry.subcategory,
                    entry.total,
                    pct(entry.share)
                )?;
            }
        }

        if !self.unresolved.is_empty() {
            writeln!(f, "\nUnresolved merchants ({}):", self.unresolved.len())?;
            for t in self.unresolved {
                writeln!(f, "- {} {} {:.2}", t.date, t.merchant, t.amount)?;
            }
        }
        Ok(())
    }
}

fn pct(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

/// One line per transaction: date, kind, amount, merchant
pub fn render_transactions(txns: &[Transaction]) -> String {
    txns.iter()
        .map(|t| {
            format!(
                "{:<7} {:<9} {:>12.2}  {}\n",
                t.date.to_string(),
                format!("{:?}", t.kind).to_lowercase(),
                t.amount,
                t.merchant
            )
        })
        .collect()
}
