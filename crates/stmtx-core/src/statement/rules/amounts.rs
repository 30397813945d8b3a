//! Amount normalization for statement balances.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Parse a US-formatted currency amount ("$1,234.56", "-$50", "1234.").
///
/// Dollar signs and thousands separators are dropped; a trailing period
/// (sentence punctuation) is ignored.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s.chars().filter(|c| *c != '$' && *c != ',').collect();
    let cleaned = cleaned.trim().trim_end_matches('.');

    if cleaned.is_empty() {
        return None;
    }

    Decimal::from_str(cleaned).ok()
}

/// Format an amount with exactly two decimal places ("1234.50").
///
/// Returns `None` for amounts with too many integer digits to carry two
/// decimal places.
pub fn format_amount(amount: Decimal) -> Option<String> {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    (rounded.scale() == 2).then(|| rounded.to_string())
}

/// Normalize a captured balance.
///
/// Returns the two-decimal form when the text parses as a number, otherwise
/// the trimmed input unchanged. Applying it twice gives the same result as
/// applying it once.
pub fn normalize_amount(raw: &str) -> String {
    let trimmed = raw.trim();
    parse_amount(trimmed)
        .and_then(format_amount)
        .unwrap_or_else(|| trimmed.to_string())
}

/// Format amount for display ($1,234.56).
pub fn format_display_amount(amount: Decimal) -> String {
    let s = format_amount(amount.abs()).unwrap_or_else(|| amount.abs().trunc().to_string());
    let (integer_part, decimal_part) = s.split_once('.').unwrap_or((s.as_str(), "00"));

    // Add thousand separators
    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::new();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(*c);
    }

    let sign = if amount.is_sign_negative() && !amount.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}${}.{}", sign, formatted, decimal_part)
}
