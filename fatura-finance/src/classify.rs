//! The categorization boundary: anything that can map a merchant to a
//! subcategory plugs in here. Payments and reversals are never handed to a
//! classifier, and merchants it cannot place come back as unresolved
//! instead of failing the run.

use fatura_core::{CategorizedTransaction, Subcategory, Transaction};
use tracing::{info, warn};

pub trait MerchantClassifier {
    /// `None` means the merchant is unknown to this classifier.
    fn classify(&self, txn: &Transaction) -> Option<Subcategory>;
}

impl<F> MerchantClassifier for F
where
    F: Fn(&Transaction) -> Option<Subcategory>,
{
    fn classify(&self, txn: &Transaction) -> Option<Subcategory> {
        self(txn)
    }
}

/// Tries `primary`, then assigns a fixed subcategory to whatever is left.
pub struct FallbackClassifier<C> {
    primary: C,
    fallback: Subcategory,
}

impl<C: MerchantClassifier> FallbackClassifier<C> {
    pub fn new(primary: C, fallback: Subcategory) -> Self {
        Self { primary, fallback }
    }

    /// Unknown merchants land in Variable / Other.
    pub fn other(primary: C) -> Self {
        Self::new(primary, Subcategory::Other)
    }
}

impl<C: MerchantClassifier> MerchantClassifier for FallbackClassifier<C> {
    fn classify(&self, txn: &Transaction) -> Option<Subcategory> {
        self.primary.classify(txn).or(Some(self.fallback))
    }
}

/// Output of `categorize_spending`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Categorization {
    pub categorized: Vec<CategorizedTransaction>,
    /// Spending transactions no classifier could place
    pub unresolved: Vec<Transaction>,
}

/// Categorize the Spending transactions of a parse result, in order.
pub fn categorize_spending<C>(txns: &[Transaction], classifier: &C) -> Categorization
where
    C: MerchantClassifier + ?Sized,
{
    let mut out = Categorization::default();

    for txn in txns.iter().filter(|t| t.is_spending()) {
        match classifier.classify(txn) {
            Some(sub) => out
                .categorized
                .push(CategorizedTransaction::from_subcategory(txn.clone(), sub)),
            None => {
                warn!(merchant = %txn.merchant, date = %txn.date, "unresolved merchant");
                out.unresolved.push(txn.clone());
            }
        }
    }

    info!(
        categorized = out.categorized.len(),
        unresolved = out.unresolved.len(),
        "categorized spending"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use fatura_core::{Category, StatementDate, TransactionKind};

    fn txn(merchant: &str, kind: TransactionKind) -> Transaction {
        Transaction::new(StatementDate::new(2, 3, "02 MAR").unwrap(), merchant, 10.0, kind).unwrap()
    }

    fn only_uber(t: &Transaction) -> Option<Subcategory> {
        t.merchant.starts_with("UBER").then_some(Subcategory::CarToll)
    }

    #[test]
    fn test_skips_non_spending() {
        let seen = std::cell::RefCell::new(Vec::new());
        let spy = |t: &Transaction| {
            seen.borrow_mut().push(t.merchant.clone());
            Some(Subcategory::Other)
        };
        let txns = vec![
            txn("Pagamento em 02/03", TransactionKind::Payment),
            txn("UBER TRIP", TransactionKind::Spending),
            txn("Estorno", TransactionKind::Reversal),
        ];
        let out = categorize_spending(&txns, &spy);
        assert_eq!(out.categorized.len(), 1);
        assert_eq!(*seen.borrow(), vec!["UBER TRIP".to_string()]);
    }

    #[test]
    fn test_unresolved_are_returned() {
        let txns = vec![
            txn("UBER TRIP", TransactionKind::Spending),
            txn("LOJA DESCONHECIDA", TransactionKind::Spending),
        ];
        let out = categorize_spending(&txns, &only_uber);
        assert_eq!(out.categorized.len(), 1);
        assert_eq!(out.categorized[0].subcategory(), Subcategory::CarToll);
        assert_eq!(out.categorized[0].category(), Category::Variable);
        assert_eq!(out.unresolved.len(), 1);
        assert_eq!(out.unresolved[0].merchant, "LOJA DESCONHECIDA");
    }

    #[test]
    fn test_fallback_resolves_everything() {
        let txns = vec![
            txn("UBER TRIP", TransactionKind::Spending),
            txn("LOJA DESCONHECIDA", TransactionKind::Spending),
        ];
        let classifier = FallbackClassifier::other(only_uber);
        let out = categorize_spending(&txns, &classifier);
        assert!(out.unresolved.is_empty());
        assert_eq!(out.categorized[1].subcategory(), Subcategory::Other);
    }

    #[test]
    fn test_input_is_untouched() {
        let txns = vec![txn("UBER TRIP", TransactionKind::Spending)];
        let before = txns.clone();
        let out = categorize_spending(&txns, &only_uber);
        assert_eq!(txns, before);
        assert_eq!(out.categorized[0].transaction(), &before[0]);
    }
}
