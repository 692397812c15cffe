//! Error taxonomy for statement parsing and categorization.
//!
//! `RecordError` is per candidate line and never aborts a parse.
//! `StatementError` is fatal to a `parse` call. `CategoryError` guards the
//! closed category/subcategory relation.

use thiserror::Error;

use crate::category::{Category, Subcategory};

/// A single matched line could not be turned into a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("malformed amount: {0:?}")]
    MalformedAmount(String),

    #[error("malformed date: {0:?}")]
    MalformedDate(String),

    #[error("empty merchant name")]
    EmptyMerchant,

    #[error("merchant name spans several lines: {0:?}")]
    MultilineMerchant(String),
}

/// The statement input or parser configuration is unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatementError {
    #[error("invalid input on page {page}: {reason}")]
    InvalidInput { page: usize, reason: String },

    #[error("invalid parser configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CategoryError {
    #[error("{merchant:?}: subcategory {subcategory} does not belong to category {category}")]
    InvalidCategoryAssignment {
        merchant: String,
        category: Category,
        subcategory: Subcategory,
    },

    #[error("unknown category: {0:?}")]
    UnknownCategory(String),

    #[error("unknown subcategory: {0:?}")]
    UnknownSubcategory(String),
}
