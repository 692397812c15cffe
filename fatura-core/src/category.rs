//! Closed spending categories and the categorized transaction record.
//!
//! Every subcategory belongs to exactly one category. `CategorizedTransaction`
//! can only be built (or deserialized) with a matching pair.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CategoryError;
use crate::transaction::Transaction;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    #[serde(rename = "fixed")]
    Fixed,
    #[serde(rename = "variable")]
    Variable,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Fixed, Category::Variable];

    /// Members of this category, in enumeration order
    pub fn subcategories(&self) -> &'static [Subcategory] {
        match self {
            Category::Fixed => &Subcategory::ALL[..4],
            Category::Variable => &Subcategory::ALL[4..],
        }
    }

    pub fn contains(&self, subcategory: Subcategory) -> bool {
        subcategory.category() == *self
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Fixed => "Fixed",
            Category::Variable => "Variable",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fixed" => Ok(Category::Fixed),
            "variable" => Ok(Category::Variable),
            _ => Err(CategoryError::UnknownCategory(s.to_string())),
        }
    }
}

/// Spending subcategories. Declaration order is the tie-break order used
/// wherever subcategories are ranked.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Subcategory {
    #[serde(rename = "utilities")]
    Utilities,
    #[serde(rename = "rent")]
    Rent,
    #[serde(rename = "car-insurance")]
    CarInsurance,
    #[serde(rename = "health-insurance")]
    HealthInsurance,
    #[serde(rename = "groceries")]
    Groceries,
    #[serde(rename = "restaurants")]
    Restaurants,
    #[serde(rename = "subscription")]
    Subscription,
    #[serde(rename = "shopping")]
    Shopping,
    #[serde(rename = "donation")]
    Donation,
    #[serde(rename = "pharmacy")]
    Pharmacy,
    #[serde(rename = "gas")]
    Gas,
    #[serde(rename = "car-toll")]
    CarToll,
    #[serde(rename = "travel")]
    Travel,
    #[serde(rename = "other")]
    Other,
}

impl Subcategory {
    pub const ALL: [Subcategory; 14] = [
        Subcategory::Utilities,
        Subcategory::Rent,
        Subcategory::CarInsurance,
        Subcategory::HealthInsurance,
        Subcategory::Groceries,
        Subcategory::Restaurants,
        Subcategory::Subscription,
        Subcategory::Shopping,
        Subcategory::Donation,
        Subcategory::Pharmacy,
        Subcategory::Gas,
        Subcategory::CarToll,
        Subcategory::Travel,
        Subcategory::Other,
    ];

    /// The category this subcategory belongs to
    pub fn category(&self) -> Category {
        match self {
            Subcategory::Utilities
            | Subcategory::Rent
            | Subcategory::CarInsurance
            | Subcategory::HealthInsurance => Category::Fixed,
            _ => Category::Variable,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Subcategory::Utilities => "Utilities",
            Subcategory::Rent => "Rent",
            Subcategory::CarInsurance => "Car Insurance",
            Subcategory::HealthInsurance => "Health Insurance",
            Subcategory::Groceries => "Groceries",
            Subcategory::Restaurants => "Restaurants",
            Subcategory::Subscription => "Subscription",
            Subcategory::Shopping => "Shopping",
            Subcategory::Donation => "Donation",
            Subcategory::Pharmacy => "Pharmacy",
            Subcategory::Gas => "Gas",
            Subcategory::CarToll => "Car Toll",
            Subcategory::Travel => "Travel",
            Subcategory::Other => "Other",
        }
    }
}

impl fmt::Display for Subcategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Subcategory {
    type Err = CategoryError;

    /// Accepts labels in any case, with spaces, hyphens or underscores
    /// ("Car Insurance", "car-insurance", "CAR_INSURANCE").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();

        let sub = match key.as_str() {
            "utilities" | "utility" => Subcategory::Utilities,
            "rent" => Subcategory::Rent,
            "carinsurance" => Subcategory::CarInsurance,
            "healthinsurance" => Subcategory::HealthInsurance,
            "groceries" | "grocery" => Subcategory::Groceries,
            "restaurants" | "restaurant" => Subcategory::Restaurants,
            "subscription" | "subscriptions" => Subcategory::Subscription,
            "shopping" => Subcategory::Shopping,
            "donation" | "donations" => Subcategory::Donation,
            "pharmacy" | "farmacy" => Subcategory::Pharmacy,
            "gas" => Subcategory::Gas,
            "cartoll" => Subcategory::CarToll,
            "travel" => Subcategory::Travel,
            "other" => Subcategory::Other,
            _ => return Err(CategoryError::UnknownSubcategory(s.to_string())),
        };
        Ok(sub)
    }
}

/// A transaction plus its validated (category, subcategory) pair.
///
/// Wraps the parsed transaction instead of mutating it, so the raw parse
/// result stays available for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCategorized")]
pub struct CategorizedTransaction {
    #[serde(flatten)]
    transaction: Transaction,
    category: Category,
    subcategory: Subcategory,
}

impl CategorizedTransaction {
    /// Fails with `InvalidCategoryAssignment` when `subcategory` is not a
    /// member of `category`.
    pub fn new(
        transaction: Transaction,
        category: Category,
        subcategory: Subcategory,
    ) -> Result<Self, CategoryError> {
        let record = Self {
            transaction,
            category,
            subcategory,
        };
        record.validate()?;
        Ok(record)
    }

    /// Category inferred from the subcategory; cannot fail.
    pub fn from_subcategory(transaction: Transaction, subcategory: Subcategory) -> Self {
        Self {
            transaction,
            category: subcategory.category(),
            subcategory,
        }
    }

    pub fn validate(&self) -> Result<(), CategoryError> {
        if self.category.contains(self.subcategory) {
            Ok(())
        } else {
            Err(CategoryError::InvalidCategoryAssignment {
                merchant: self.transaction.merchant.clone(),
                category: self.category,
                subcategory: self.subcategory,
            })
        }
    }

    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn subcategory(&self) -> Subcategory {
        self.subcategory
    }

    pub fn amount(&self) -> f64 {
        self.transaction.amount
    }

    pub fn into_transaction(self) -> Transaction {
        self.transaction
    }

    /// Skips the membership check, for exercising downstream validation.
    #[cfg(any(test, feature = "test-util"))]
    pub fn new_unchecked(
        transaction: Transaction,
        category: Category,
        subcategory: Subcategory,
    ) -> Self {
        Self {
            transaction,
            category,
            subcategory,
        }
    }
}

#[derive(Deserialize)]
struct RawCategorized {
    #[serde(flatten)]
    transaction: Transaction,
    category: Category,
    subcategory: Subcategory,
}

impl TryFrom<RawCategorized> for CategorizedTransaction {
    type Error = CategoryError;

    fn try_from(raw: RawCategorized) -> Result<Self, Self::Error> {
        CategorizedTransaction::new(raw.transaction, raw.category, raw.subcategory)
    }
}
