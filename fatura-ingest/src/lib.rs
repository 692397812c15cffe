//! fatura-ingest: card statement text parsing with per-issuer profiles.

pub mod amount;
pub mod pages;
pub mod parser;
pub mod profile;

pub use amount::parse_amount;
pub use pages::split_pages;
pub use parser::{RawMatch, RawMatches, StatementParser};
pub use profile::IssuerProfile;
