//! Common regex patterns for statement extraction.
//!
//! Every labeled pattern captures the field value in group 1; the first match
//! in document order is taken as-is.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Card number tail, possibly behind masking ("****1234", "XXXX-XXXX-1234")
    pub static ref CARD_LAST4: Regex = Regex::new(
        r"(?i)\b(?:account\s+ending(?:\s+in)?|ending\s+in|ending|acct\.?|account)(?:\s+(?:no|number)\.?)?\s*[:#\-]?\s*[\*xX•\- ]*(\d{4})"
    ).unwrap();

    // Card product name on the same line as its label
    pub static ref CARD_VARIANT: Regex = Regex::new(
        r"(?i)\b(?:card\s+type|account\s+type|card)\b[ \t]*[:\-]?\s*([A-Za-z0-9][A-Za-z0-9\- \t]*(?:card|visa|mastercard|amex|american\s+express|sapphire|platinum)?)"
    ).unwrap();

    // Statement period: two date-ish tokens joined by "to" or a hyphen
    pub static ref BILLING_CYCLE: Regex = Regex::new(
        r"(?i)\b(?:statement\s+period|billing\s+period|statement\s+date)[:\s]*([A-Za-z0-9,/ \t\-]+?[ \t]*(?:\bto\b|-)[ \t]*[A-Za-z0-9,/ \t\-]*[A-Za-z0-9])"
    ).unwrap();

    // Due date expression, parsed later
    pub static ref DUE_DATE: Regex = Regex::new(
        r"(?i)\b(?:payment\s+due\s+date|due\s+date|pay\s+by)[:\s]*([A-Za-z0-9,/.\- ]{6,40})"
    ).unwrap();

    // Balance amount; "- " and "$ " between label and value are separators,
    // a '-' or '$' touching the digits belongs to the value
    pub static ref TOTAL_BALANCE: Regex = Regex::new(
        r"(?i)\b(?:new\s+balance|total\s+due|amount\s+due|balance\s+due|total\s+balance)(?:[:\s]|[\-\$]\s)*([\-\$,\d.]*\d[\-\$,\d.]*)"
    ).unwrap();

    // Date shapes used by the fuzzy date parser
    pub static ref DATE_YMD: Regex = Regex::new(
        r"\b(\d{4})[./\-](\d{1,2})[./\-](\d{1,2})\b"
    ).unwrap();

    pub static ref DATE_MONTH_DAY: Regex = Regex::new(
        r"(?i)\b(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?\s+(\d{1,2})(?:st|nd|rd|th)?\b,?(?:\s+(\d{4}|\d{2})\b)?"
    ).unwrap();

    pub static ref DATE_DAY_MONTH: Regex = Regex::new(
        r"(?i)\b(\d{1,2})(?:st|nd|rd|th)?\s+(?:of\s+)?(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\b\.?,?(?:\s+(\d{4}|\d{2})\b)?"
    ).unwrap();

    pub static ref DATE_NUMERIC: Regex = Regex::new(
        r"\b(\d{1,2})[./\-](\d{1,2})[./\-](\d{4}|\d{2})\b"
    ).unwrap();

    pub static ref DATE_NUMERIC_NO_YEAR: Regex = Regex::new(
        r"\b(\d{1,2})/(\d{1,2})\b"
    ).unwrap();

    pub static ref DATE_MONTH_YEAR: Regex = Regex::new(
        r"(?i)\b(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?,?\s+(\d{4})\b"
    ).unwrap();
}
