//! Field recognition over full statement text.

use std::fmt;
use std::time::Instant;

use regex::Regex;
use tracing::{debug, info, trace};

use crate::models::record::{ExtractedRecord, Field};

use super::rules::{
    normalize_amount, normalize_date, DateParser, ExtractionMatch, FieldExtractor,
    BILLING_CYCLE, CARD_LAST4, CARD_VARIANT, DUE_DATE, TOTAL_BALANCE,
};

/// Turns a trimmed capture into the field's final value.
pub type Normalizer = Box<dyn Fn(&str) -> String + Send + Sync>;

/// One entry of the recognizer's dispatch table.
pub struct FieldRule {
    field: Field,
    pattern: Regex,
    normalize: Normalizer,
}

impl FieldRule {
    /// Create a rule. The value is capture group 1 of `pattern` (or the whole
    /// match when the pattern has no groups), trimmed, then normalized.
    pub fn new(
        field: Field,
        pattern: Regex,
        normalize: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            field,
            pattern,
            normalize: Box::new(normalize),
        }
    }

    /// Create a rule that keeps the trimmed capture as-is.
    pub fn raw(field: Field, pattern: Regex) -> Self {
        Self::new(field, pattern, |s: &str| s.to_string())
    }

    /// The field this rule fills.
    pub fn field(&self) -> Field {
        self.field
    }

    /// The rule's pattern.
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    fn to_match(&self, caps: &regex::Captures) -> Option<ExtractionMatch<String>> {
        let value = caps.get(1).or_else(|| caps.get(0))?;
        let whole = caps.get(0)?;
        Some(
            ExtractionMatch::new((self.normalize)(value.as_str().trim()), whole.as_str())
                .with_position(whole.start(), whole.end()),
        )
    }
}

impl FieldExtractor for FieldRule {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let caps = self.pattern.captures(text)?;
        self.to_match(&caps)
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| self.to_match(&caps))
            .collect()
    }
}

impl fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRule")
            .field("field", &self.field)
            .field("pattern", &self.pattern.as_str())
            .finish_non_exhaustive()
    }
}

/// Locates statement fields in text with a table of labeled patterns.
///
/// Rules are tried in table order; for each field the first rule that
/// matches supplies the value, and within a rule the earliest occurrence in
/// the text wins. Recognition never fails: unmatched fields are `None` and
/// values that do not normalize are kept as raw text.
#[derive(Debug)]
pub struct FieldRecognizer {
    rules: Vec<FieldRule>,
}

impl FieldRecognizer {
    /// Create a recognizer with the standard rules, resolving year-less due
    /// dates against today.
    pub fn new() -> Self {
        Self::with_date_parser(DateParser::new())
    }

    /// Create a recognizer with the standard rules and a specific date parser.
    pub fn with_date_parser(dates: DateParser) -> Self {
        let rules = vec![
            FieldRule::raw(Field::CardLast4, CARD_LAST4.clone()),
            FieldRule::raw(Field::CardVariant, CARD_VARIANT.clone()),
            FieldRule::raw(Field::BillingCycle, BILLING_CYCLE.clone()),
            FieldRule::new(Field::PaymentDueDate, DUE_DATE.clone(), move |raw| {
                normalize_date(&dates, raw)
            }),
            FieldRule::new(Field::TotalBalance, TOTAL_BALANCE.clone(), normalize_amount),
        ];
        Self { rules }
    }

    /// Create a recognizer with no rules.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule, tried after the existing rules for the same field.
    pub fn with_rule(mut self, rule: FieldRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// The dispatch table.
    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    /// Recognize all fields in `full_text`.
    ///
    /// Provenance fields are left empty; the pipeline fills them.
    pub fn recognize(&self, full_text: &str) -> ExtractedRecord {
        let start = Instant::now();
        let mut record = ExtractedRecord::default();

        for rule in &self.rules {
            if record.get(rule.field).is_some() {
                continue;
            }
            if let Some(m) = rule.extract(full_text) {
                trace!("{} matched {:?} at {:?}", rule.field, m.source, m.position);
                record.set(rule.field, Some(m.value));
            }
        }

        let missing = record.missing_fields();
        if !missing.is_empty() {
            debug!("Fields not found: {}", missing.join(", "));
        }
        info!(
            "Recognized {}/{} fields from {} chars in {}ms",
            record.found_count(),
            Field::ALL.len(),
            full_text.len(),
            start.elapsed().as_millis()
        );

        record
    }
}

impl Default for FieldRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn recognizer() -> FieldRecognizer {
        FieldRecognizer::with_date_parser(DateParser::with_reference(
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        ))
    }

    #[test]
    fn test_recognize_full_statement() {
        let text = r#"
            CHASE SAPPHIRE STATEMENT
            Account ending in ****1234
            Card Type: Sapphire Preferred
            Statement Period: 02/01/2024 - 02/29/2024
            Payment Due Date: March 25, 2024
            New Balance: $1,234.56
        "#;

        let record = recognizer().recognize(text);

        assert_eq!(record.card_last4.as_deref(), Some("1234"));
        assert_eq!(record.card_variant.as_deref(), Some("Sapphire Preferred"));
        assert_eq!(record.billing_cycle.as_deref(), Some("02/01/2024 - 02/29/2024"));
        assert_eq!(record.payment_due_date.as_deref(), Some("2024-03-25"));
        assert_eq!(record.total_balance.as_deref(), Some("1234.56"));
        assert_eq!(record.file, "");
    }

    #[test]
    fn test_empty_text() {
        let record = recognizer().recognize("");
        assert_eq!(record, ExtractedRecord::default());
    }

    #[test]
    fn test_earliest_occurrence_wins() {
        let text = "Total Due: $20.00\nNew Balance: $10.00";
        let record = recognizer().recognize(text);
        assert_eq!(record.total_balance.as_deref(), Some("20.00"));
    }

    #[test]
    fn test_extra_rule_fills_missing_field() {
        let rule = FieldRule::new(
            Field::TotalBalance,
            Regex::new(r"(?i)statement\s+balance\s+([\d,.]+)").unwrap(),
            normalize_amount,
        );
        let recognizer = recognizer().with_rule(rule);

        let record = recognizer.recognize("Statement Balance 1,050.5");
        assert_eq!(record.total_balance.as_deref(), Some("1050.50"));

        // The built-in rule still takes precedence
        let record = recognizer.recognize("Statement Balance 9.00\nNew Balance: 7.00");
        assert_eq!(record.total_balance.as_deref(), Some("7.00"));
    }

    #[test]
    fn test_rule_extract_all() {
        let rule = FieldRule::raw(Field::CardLast4, CARD_LAST4.clone());
        let all = rule.extract_all("ending in 1111 ... Account ending in 2222");
        let values: Vec<&str> = all.iter().map(|m| m.value.as_str()).collect();
        assert_eq!(values, vec!["1111", "2222"]);
    }

    #[test]
    fn test_dispatch_table_covers_every_field() {
        let fields: Vec<Field> = recognizer().rules().iter().map(|r| r.field()).collect();
        assert_eq!(fields, Field::ALL.to_vec());
    }
}
