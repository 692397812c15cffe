//! fatura-finance: spending aggregation, merchant knowledge base, and the
//! categorization boundary

pub mod classify;
pub mod knowledge_base;
pub mod summary;

pub use classify::{Categorization, FallbackClassifier, MerchantClassifier, categorize_spending};
pub use knowledge_base::{KnowledgeBase, KnowledgeBaseError};
pub use summary::{Percentages, SpendingSummary, SubcategoryShare, SummaryError, share, summarize};
