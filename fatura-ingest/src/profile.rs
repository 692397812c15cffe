//! Issuer profiles: the statement-layout assumptions that differ between
//! card issuers (cover pages, marker phrases, month names, line pattern).

use fatura_core::TransactionKind;
use serde::{Deserialize, Serialize};

/// Transaction line layout used when a profile does not bring its own:
///
/// ```text
/// 15 JAN
/// UBER TRIP
/// R$ 23,50
/// ```
///
/// The merchant is the whole line after the date and must not start with a
/// digit or a currency marker, so an amount line is never read as a merchant.
/// The amount may carry an `R$` or `$` prefix and must end its line.
pub const DEFAULT_TRANSACTION_PATTERN: &str = concat!(
    r"(?P<date>\d{2} [A-Z]{3})[ \t]*\r?\n\s*",
    r"(?P<merchant>(?:[^\d\s$R]|R[^$\n])[^\n]*?)[ \t]*\r?\n\s*",
    r"(?P<amount>(?:R\$|\$)? ?[0-9][0-9.,]*)[ \t]*(?:\r?\n|$)"
);

pub const ENGLISH_MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

pub const PORTUGUESE_MONTHS: [&str; 12] = [
    "JAN", "FEV", "MAR", "ABR", "MAI", "JUN", "JUL", "AGO", "SET", "OUT", "NOV", "DEZ",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerProfile {
    pub name: String,
    /// Cover/summary pages that never contain transaction lines
    #[serde(default = "default_skip_leading_pages")]
    pub skip_leading_pages: usize,
    /// Case-sensitive phrase marking a payment received
    pub payment_marker: String,
    /// Case-sensitive phrase marking a reversal/refund
    pub reversal_marker: String,
    /// Month abbreviations January..December as printed by the issuer
    #[serde(default = "default_months")]
    pub month_abbreviations: Vec<String>,
    /// Regex with named groups `date`, `merchant` and `amount`
    #[serde(default)]
    pub transaction_pattern: Option<String>,
}

fn default_skip_leading_pages() -> usize {
    3
}

fn default_months() -> Vec<String> {
    ENGLISH_MONTHS.iter().map(|m| m.to_string()).collect()
}

impl Default for IssuerProfile {
    fn default() -> Self {
        Self::nubank()
    }
}

impl IssuerProfile {
    /// Nubank (Brazil): three cover pages, Portuguese months,
    /// "Pagamento em" for payments and "Estorno" for reversals.
    pub fn nubank() -> Self {
        Self {
            name: "nubank".to_string(),
            skip_leading_pages: 3,
            payment_marker: "Pagamento em".to_string(),
            reversal_marker: "Estorno".to_string(),
            month_abbreviations: PORTUGUESE_MONTHS.iter().map(|m| m.to_string()).collect(),
            transaction_pattern: None,
        }
    }

    /// English-language statements with no cover pages.
    pub fn generic_en() -> Self {
        Self {
            name: "generic-en".to_string(),
            skip_leading_pages: 0,
            payment_marker: "PAYMENT RECEIVED".to_string(),
            reversal_marker: "REVERSAL".to_string(),
            month_abbreviations: default_months(),
            transaction_pattern: None,
        }
    }

    pub fn builtins() -> Vec<IssuerProfile> {
        vec![Self::nubank(), Self::generic_en()]
    }

    pub fn builtin(name: &str) -> Option<IssuerProfile> {
        Self::builtins().into_iter().find(|p| p.name == name)
    }

    pub fn with_skip_leading_pages(mut self, pages: usize) -> Self {
        self.skip_leading_pages = pages;
        self
    }

    pub fn with_markers(mut self, payment: impl Into<String>, reversal: impl Into<String>) -> Self {
        self.payment_marker = payment.into();
        self.reversal_marker = reversal.into();
        self
    }

    pub fn pattern(&self) -> &str {
        self.transaction_pattern
            .as_deref()
            .unwrap_or(DEFAULT_TRANSACTION_PATTERN)
    }

    /// Month number for an abbreviation. The issuer's own names win; English
    /// abbreviations are always accepted as well.
    pub fn month_number(&self, abbrev: &str) -> Option<u32> {
        let abbrev = abbrev.trim();
        let position = self
            .month_abbreviations
            .iter()
            .position(|m| m.eq_ignore_ascii_case(abbrev))
            .or_else(|| {
                ENGLISH_MONTHS
                    .iter()
                    .position(|m| m.eq_ignore_ascii_case(abbrev))
            })?;
        Some(position as u32 + 1)
    }

    /// Payment marker is checked before the reversal marker.
    pub fn kind_of(&self, merchant: &str) -> TransactionKind {
        if merchant.contains(&self.payment_marker) {
            TransactionKind::Payment
        } else if merchant.contains(&self.reversal_marker) {
            TransactionKind::Reversal
        } else {
            TransactionKind::Spending
        }
    }
}
