//! The extracted statement record.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The five statement fields the recognizer looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Last four digits of the card number.
    CardLast4,
    /// Card product name ("Sapphire Preferred", "Platinum Card", ...).
    CardVariant,
    /// Statement / billing period as printed.
    BillingCycle,
    /// Payment due date, ISO 8601 when parseable.
    PaymentDueDate,
    /// New balance, formatted with two decimals when parseable.
    TotalBalance,
}

impl Field {
    /// All fields, in record order.
    pub const ALL: [Field; 5] = [
        Field::CardLast4,
        Field::CardVariant,
        Field::BillingCycle,
        Field::PaymentDueDate,
        Field::TotalBalance,
    ];

    /// JSON key of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::CardLast4 => "card_last4",
            Field::CardVariant => "card_variant",
            Field::BillingCycle => "billing_cycle",
            Field::PaymentDueDate => "payment_due_date",
            Field::TotalBalance => "total_balance",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields extracted from one statement.
///
/// Every domain field is independently optional and serializes as `null`
/// when absent. The two underscore-prefixed fields record provenance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    pub card_last4: Option<String>,
    pub card_variant: Option<String>,
    pub billing_cycle: Option<String>,
    pub payment_due_date: Option<String>,
    pub total_balance: Option<String>,

    /// Source file name (without directories).
    #[serde(rename = "_file", default)]
    pub file: String,

    /// Leading characters of the first page's text.
    #[serde(rename = "_sample_text_snippet", default)]
    pub sample_text_snippet: String,
}

impl ExtractedRecord {
    /// Get a domain field.
    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::CardLast4 => self.card_last4.as_deref(),
            Field::CardVariant => self.card_variant.as_deref(),
            Field::BillingCycle => self.billing_cycle.as_deref(),
            Field::PaymentDueDate => self.payment_due_date.as_deref(),
            Field::TotalBalance => self.total_balance.as_deref(),
        }
    }

    /// Set a domain field.
    pub fn set(&mut self, field: Field, value: Option<String>) {
        let slot = match field {
            Field::CardLast4 => &mut self.card_last4,
            Field::CardVariant => &mut self.card_variant,
            Field::BillingCycle => &mut self.billing_cycle,
            Field::PaymentDueDate => &mut self.payment_due_date,
            Field::TotalBalance => &mut self.total_balance,
        };
        *slot = value;
    }

    /// Number of domain fields that were found.
    pub fn found_count(&self) -> usize {
        Field::ALL.iter().filter(|f| self.get(**f).is_some()).count()
    }

    /// Names of the domain fields that were not found.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        Field::ALL
            .iter()
            .filter(|f| self.get(**f).is_none())
            .map(|f| f.as_str())
            .collect()
    }
}
