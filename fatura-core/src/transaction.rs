//! Transactions as printed on a card statement

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::RecordError;

/// A statement date without a year ("15 JAN").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawStatementDate")]
pub struct StatementDate {
    /// Day of month, 1..=31
    pub day: u32,
    /// Month number, 1..=12
    pub month: u32,
    /// The date as printed on the statement
    pub token: String,
}

impl StatementDate {
    /// Build a date, rejecting days outside 1..=31 and months outside 1..=12.
    pub fn new(day: u32, month: u32, token: impl Into<String>) -> Option<Self> {
        if !(1..=31).contains(&day) || !(1..=12).contains(&month) {
            return None;
        }
        Some(Self {
            day,
            month,
            token: token.into(),
        })
    }

    /// Normalize to a calendar date once the statement year is known.
    /// Returns None for dates that do not exist in that year (31 FEB).
    pub fn with_year(&self, year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.month, self.day)
    }
}

#[derive(Deserialize)]
struct RawStatementDate {
    day: u32,
    month: u32,
    token: String,
}

impl TryFrom<RawStatementDate> for StatementDate {
    type Error = RecordError;

    fn try_from(raw: RawStatementDate) -> Result<Self, Self::Error> {
        let malformed = RecordError::MalformedDate(raw.token.clone());
        StatementDate::new(raw.day, raw.month, raw.token).ok_or(malformed)
    }
}

impl fmt::Display for StatementDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    #[serde(rename = "spending")]
    Spending,
    #[serde(rename = "payment")]
    Payment,
    #[serde(rename = "reversal")]
    Reversal,
}

impl TransactionKind {
    pub fn is_spending(&self) -> bool {
        matches!(self, TransactionKind::Spending)
    }
}

/// One parsed statement line. Created once by the parser and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "RawTransaction")]
pub struct Transaction {
    pub date: StatementDate,
    /// Trimmed, non-empty, single line
    pub merchant: String,
    /// Non-negative amount in the statement currency
    pub amount: f64,
    pub kind: TransactionKind,
}

impl Transaction {
    /// The merchant is trimmed and must be a non-empty single line; the
    /// amount must be finite and non-negative.
    pub fn new(
        date: StatementDate,
        merchant: impl Into<String>,
        amount: f64,
        kind: TransactionKind,
    ) -> Result<Self, RecordError> {
        let merchant = merchant.into();
        let merchant = merchant.trim();
        if merchant.is_empty() {
            return Err(RecordError::EmptyMerchant);
        }
        if merchant.contains(['\n', '\r']) {
            return Err(RecordError::MultilineMerchant(merchant.to_string()));
        }
        if !amount.is_finite() || amount < 0.0 {
            return Err(RecordError::MalformedAmount(amount.to_string()));
        }

        Ok(Self {
            date,
            merchant: merchant.to_string(),
            amount,
            kind,
        })
    }

    pub fn is_spending(&self) -> bool {
        self.kind.is_spending()
    }
}

#[derive(Deserialize)]
struct RawTransaction {
    date: StatementDate,
    merchant: String,
    amount: f64,
    kind: TransactionKind,
}

impl TryFrom<RawTransaction> for Transaction {
    type Error = RecordError;

    fn try_from(raw: RawTransaction) -> Result<Self, Self::Error> {
        Transaction::new(raw.date, raw.merchant, raw.amount, raw.kind)
    }
}
