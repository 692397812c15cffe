//! Statement text parser.
//!
//! Expected extracted-text layout (one field per line):
//!   15 JAN
//!   UBER TRIP
//!   R$ 23,50
//!
//! Parsing is two steps: `scan` yields raw regex matches lazily, and
//! `normalize` turns each one into a `Transaction` or a `RecordError`.
//! Bad candidates are dropped; only unusable input fails the whole call.

use fatura_core::{RecordError, StatementDate, StatementError, Transaction};
use regex::Regex;
use tracing::{debug, info};

use crate::amount::parse_amount;
use crate::profile::IssuerProfile;

/// One regex match, before any normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawMatch<'a> {
    /// Index into the full page sequence (skipped pages included)
    pub page: usize,
    pub date: &'a str,
    pub merchant: &'a str,
    pub amount: &'a str,
}

#[derive(Debug, Clone)]
pub struct StatementParser {
    profile: IssuerProfile,
    regex: Regex,
}

impl StatementParser {
    pub fn new(profile: IssuerProfile) -> Result<Self, StatementError> {
        if profile.payment_marker.is_empty() || profile.reversal_marker.is_empty() {
            return Err(StatementError::InvalidConfig(format!(
                "profile {:?}: marker phrases must not be empty",
                profile.name
            )));
        }
        if profile.month_abbreviations.len() != 12 {
            return Err(StatementError::InvalidConfig(format!(
                "profile {:?}: expected 12 month abbreviations, got {}",
                profile.name,
                profile.month_abbreviations.len()
            )));
        }

        let regex = Regex::new(profile.pattern()).map_err(|e| {
            StatementError::InvalidConfig(format!("profile {:?}: {e}", profile.name))
        })?;
        for group in ["date", "merchant", "amount"] {
            if !regex.capture_names().flatten().any(|name| name == group) {
                return Err(StatementError::InvalidConfig(format!(
                    "profile {:?}: transaction pattern lacks named group `{group}`",
                    profile.name
                )));
            }
        }

        Ok(Self { profile, regex })
    }

    pub fn profile(&self) -> &IssuerProfile {
        &self.profile
    }

    /// Parse page texts into transactions, in page order then text order.
    ///
    /// Payments and reversals are kept (tagged by `kind`) so the result is a
    /// complete record of the statement.
    pub fn parse<P: AsRef<str>>(&self, pages: &[P]) -> Result<Vec<Transaction>, StatementError> {
        for (idx, page) in pages.iter().enumerate() {
            check_page_text(idx, page.as_ref())?;
        }

        let mut txns = Vec::new();
        let mut dropped = 0usize;

        for raw in self.scan(pages) {
            match self.normalize(&raw) {
                Ok(txn) => txns.push(txn),
                Err(err) => {
                    dropped += 1;
                    debug!(page = raw.page, date = raw.date, amount = raw.amount, %err, "dropping candidate line");
                }
            }
        }

        info!(
            profile = %self.profile.name,
            pages = pages.len(),
            skipped = self.profile.skip_leading_pages.min(pages.len()),
            parsed = txns.len(),
            dropped,
            "parsed statement"
        );
        Ok(txns)
    }

    /// Lazily scan pages for transaction-shaped matches, leftmost first,
    /// never overlapping. Clone the iterator to restart it.
    pub fn scan<'a, P: AsRef<str>>(&'a self, pages: &'a [P]) -> RawMatches<'a, P> {
        RawMatches {
            regex: &self.regex,
            pages,
            page: self.profile.skip_leading_pages,
            pos: 0,
        }
    }

    /// Turn a raw match into a transaction.
    pub fn normalize(&self, raw: &RawMatch<'_>) -> Result<Transaction, RecordError> {
        let date = self.parse_date(raw.date)?;

        let merchant = raw.merchant.trim();
        let amount = parse_amount(raw.amount)?;
        let kind = self.profile.kind_of(merchant);

        Transaction::new(date, merchant, amount, kind)
    }

    fn parse_date(&self, token: &str) -> Result<StatementDate, RecordError> {
        let malformed = || RecordError::MalformedDate(token.to_string());

        let token = token.trim();
        let (day, month) = token.split_once(char::is_whitespace).ok_or_else(malformed)?;
        let day: u32 = day.parse().map_err(|_| malformed())?;
        let month = self.profile.month_number(month).ok_or_else(malformed)?;

        StatementDate::new(day, month, token).ok_or_else(malformed)
    }
}

/// The loader must hand over extracted text, not the PDF itself.
fn check_page_text(page: usize, text: &str) -> Result<(), StatementError> {
    if text.starts_with("%PDF-") {
        return Err(StatementError::InvalidInput {
            page,
            reason: "raw PDF bytes instead of extracted text".to_string(),
        });
    }
    if text.contains('\0') {
        return Err(StatementError::InvalidInput {
            page,
            reason: "binary data (NUL byte) in page text".to_string(),
        });
    }
    Ok(())
}

/// Iterator over raw matches across pages, created by `StatementParser::scan`.
pub struct RawMatches<'a, P> {
    regex: &'a Regex,
    pages: &'a [P],
    page: usize,
    pos: usize,
}

impl<P> Clone for RawMatches<'_, P> {
    fn clone(&self) -> Self {
        Self {
            regex: self.regex,
            pages: self.pages,
            page: self.page,
            pos: self.pos,
        }
    }
}

impl<'a, P: AsRef<str>> Iterator for RawMatches<'a, P> {
    type Item = RawMatch<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let pages: &'a [P] = self.pages;

        while self.page < pages.len() {
            let text = pages[self.page].as_ref();

            if self.pos <= text.len() {
                if let Some(caps) = self.regex.captures_at(text, self.pos) {
                    let whole = caps.get(0)?;
                    // an empty match must still make progress, one char at a time
                    self.pos = if whole.end() > whole.start() {
                        whole.end()
                    } else {
                        whole.end() + text[whole.end()..].chars().next().map_or(1, char::len_utf8)
                    };

                    let group = |name: &str| caps.name(name).map_or("", |m| m.as_str());
                    return Some(RawMatch {
                        page: self.page,
                        date: group("date"),
                        merchant: group("merchant"),
                        amount: group("amount"),
                    });
                }
            }

            self.page += 1;
            self.pos = 0;
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fatura_core::TransactionKind;

    const SCENARIO: &str = "15 JAN\nUBER TRIP\nR$ 23,50\n16 JAN\nPagamento em 16/01\nR$ 500,00\n";

    fn parser(skip: usize) -> StatementParser {
        StatementParser::new(IssuerProfile::nubank().with_skip_leading_pages(skip)).unwrap()
    }

    #[test]
    fn test_parses_payment_and_spending() {
        let txns = parser(0).parse(&[SCENARIO]).unwrap();
        assert_eq!(txns.len(), 2);

        assert_eq!(txns[0].date.to_string(), "15 JAN");
        assert_eq!((txns[0].date.day, txns[0].date.month), (15, 1));
        assert_eq!(txns[0].merchant, "UBER TRIP");
        assert_eq!(txns[0].amount, 23.50);
        assert_eq!(txns[0].kind, TransactionKind::Spending);

        assert_eq!(txns[1].date.to_string(), "16 JAN");
        assert_eq!(txns[1].merchant, "Pagamento em 16/01");
        assert_eq!(txns[1].amount, 500.00);
        assert_eq!(txns[1].kind, TransactionKind::Payment);
    }

    #[test]
    fn test_skips_leading_pages() {
        let pages = ["cover 01 JAN\nRESUMO\nR$ 9,99\n", "", "", SCENARIO];
        let txns = parser(3).parse(&pages).unwrap();
        assert_eq!(txns.len(), 2);
        assert_eq!(txns[0].merchant, "UBER TRIP");

        let txns = parser(0).parse(&pages).unwrap();
        assert_eq!(txns.len(), 3);
        assert_eq!(txns[0].merchant, "RESUMO");
    }

    #[test]
    fn test_skip_beyond_page_count_is_empty() {
        assert!(parser(10).parse(&[SCENARIO]).unwrap().is_empty());
    }

    #[test]
    fn test_empty_input() {
        let pages: [&str; 0] = [];
        assert!(parser(0).parse(&pages).unwrap().is_empty());
        assert!(parser(3).parse(&pages).unwrap().is_empty());
    }

    #[test]
    fn test_reversal_marker() {
        let text = "20 FEV\nEstorno de compra\nR$ 12,00\n21 FEV\nIFOOD *RESTAURANTE\nR$ 1.045,90\n";
        let txns = parser(0).parse(&[text]).unwrap();
        assert_eq!(txns.len(), 2);
        assert_eq!(txns[0].kind, TransactionKind::Reversal);
        assert_eq!(txns[0].date.month, 2);
        assert_eq!(txns[1].amount, 1045.90);
    }

    #[test]
    fn test_custom_markers() {
        let profile = IssuerProfile::generic_en().with_markers("THANK YOU", "REFUND");
        let parser = StatementParser::new(profile).unwrap();
        let text = "03 MAR\nPAYMENT - THANK YOU\n$1,200.00\n04 MAR\nREFUND AMAZON\n$15.99\n";
        let txns = parser.parse(&[text]).unwrap();
        assert_eq!(txns[0].kind, TransactionKind::Payment);
        assert_eq!(txns[0].amount, 1200.0);
        assert_eq!(txns[1].kind, TransactionKind::Reversal);
    }

    #[test]
    fn test_malformed_candidates_do_not_abort() {
        // 45 JAN and XYZ are not dates; both candidates are dropped
        let text = "45 JAN\nBAD DAY\nR$ 1,00\n10 XYZ\nBAD MONTH\nR$ 2,00\n11 JAN\nPADARIA\nR$ 3,00\n";
        let txns = parser(0).parse(&[text]).unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].merchant, "PADARIA");
        assert_eq!(txns[0].amount, 3.0);
    }

    #[test]
    fn test_unstructured_page_contributes_nothing() {
        let pages = ["Resumo da fatura\nTotal a pagar R$ 523,50", SCENARIO];
        let txns = parser(0).parse(&pages).unwrap();
        assert_eq!(txns.len(), 2);
    }

    #[test]
    fn test_rejects_raw_pdf() {
        let err = parser(0).parse(&["%PDF-1.7 ...", SCENARIO]).unwrap_err();
        assert!(matches!(err, StatementError::InvalidInput { page: 0, .. }));

        let err = parser(0).parse(&[SCENARIO, "abc\0def"]).unwrap_err();
        assert!(matches!(err, StatementError::InvalidInput { page: 1, .. }));
    }

    #[test]
    fn test_invalid_config() {
        let mut profile = IssuerProfile::nubank();
        profile.transaction_pattern = Some(r"(?P<date>\d{2} [A-Z]{3})\n(?P<amount>[0-9,]+)".to_string());
        assert!(matches!(StatementParser::new(profile), Err(StatementError::InvalidConfig(_))));

        let profile = IssuerProfile::nubank().with_markers("", "Estorno");
        assert!(matches!(StatementParser::new(profile), Err(StatementError::InvalidConfig(_))));

        let mut profile = IssuerProfile::nubank();
        profile.transaction_pattern = Some("(unclosed".to_string());
        assert!(matches!(StatementParser::new(profile), Err(StatementError::InvalidConfig(_))));
    }

    #[test]
    fn test_scan_is_restartable() {
        let p = parser(0);
        let pages = [SCENARIO, SCENARIO];
        let scan = p.scan(&pages);
        let first: Vec<_> = scan.clone().collect();
        let second: Vec<_> = scan.collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
        assert_eq!(first[2].page, 1);
        assert_eq!(first[1].amount, "R$ 500,00");
    }

    #[test]
    fn test_parse_is_idempotent() {
        let p = parser(0);
        let pages = [SCENARIO, "05 JAN\nNETFLIX.COM\nR$ 55,90\n"];
        assert_eq!(p.parse(&pages).unwrap(), p.parse(&pages).unwrap());
    }

    #[test]
    fn test_output_invariants() {
        let text = "01 JAN\n  SUPERMERCADO DIA   \nR$ 87,13\n02 JAN\nPOSTO SHELL\n   R$ 200,00\n";
        let p = parser(0);
        let pages = [text];
        let matches = p.scan(&pages).count();
        let txns = p.parse(&pages).unwrap();
        assert!(txns.len() <= matches);
        for t in &txns {
            assert!(!t.merchant.is_empty());
            assert_eq!(t.merchant, t.merchant.trim());
            assert!(t.amount >= 0.0);
        }
        assert_eq!(txns[0].merchant, "SUPERMERCADO DIA");
        assert_eq!(txns[1].amount, 200.0);
    }

    #[test]
    fn test_missing_merchant_line_does_not_swallow_next_record() {
        let text = "15 JAN\nR$ 23,50\n16 JAN\nIFOOD\nR$ 10,00\n";
        let txns = parser(0).parse(&[text]).unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].merchant, "IFOOD");
        assert_eq!(txns[0].amount, 10.0);
        assert_eq!(txns[0].date.to_string(), "16 JAN");

        // bare-dollar and unsigned amount lines are not merchants either
        let text = "15 JAN\n$23.50\n16 JAN\n23,50\n17 JAN\nRESTAURANTE\nR$ 5,00\n";
        let txns = parser(0).parse(&[text]).unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].merchant, "RESTAURANTE");
    }

    #[test]
    fn test_amount_must_end_its_line() {
        // "16" of the next date is not an amount
        let text = "15 JAN\nUBER TRIP\n16 JAN\nIFOOD\nR$ 10,00\n";
        let p = parser(0);
        let pages = [text];
        let raw: Vec<_> = p.scan(&pages).collect();
        assert_eq!(raw.len(), 1);
        assert_eq!(raw[0].merchant, "IFOOD");

        let txns = p.parse(&["15 JAN\nUBER TRIP\nR$ 23,50 pendente\n"]).unwrap();
        assert!(txns.is_empty());
    }

    #[test]
    fn test_empty_matches_advance_by_whole_chars() {
        let mut profile = IssuerProfile::nubank().with_skip_leading_pages(0);
        profile.transaction_pattern = Some("(?P<date>x?)(?P<merchant>y?)(?P<amount>z?)".to_string());
        let p = StatementParser::new(profile).unwrap();

        // empty matches at 0, 2 and 4 only: 'ç' and 'ã' are two bytes each
        let pages = ["çã"];
        let raw: Vec<_> = p.scan(&pages).collect();
        assert_eq!(raw.len(), 3);
        assert!(raw.iter().all(|m| m.date.is_empty() && m.merchant.is_empty()));

        let pages = ["Transações de 10 DEZ", "ÇÃO"];
        assert!(p.parse(&pages).unwrap().is_empty());
    }

    #[test]
    fn test_windows_line_endings() {
        let text = "15 JAN\r\nUBER TRIP\r\nR$ 23,50\r\n";
        let txns = parser(0).parse(&[text]).unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].merchant, "UBER TRIP");
    }
}
