//! fatura-core: statement data model and error types shared by the parser and aggregator

pub mod category;
pub mod error;
pub mod transaction;

pub use category::{CategorizedTransaction, Category, Subcategory};
pub use error::{CategoryError, RecordError, StatementError};
pub use transaction::{StatementDate, Transaction, TransactionKind};
