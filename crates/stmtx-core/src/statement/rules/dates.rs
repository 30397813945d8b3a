//! Fuzzy date parsing for statement due dates.
//!
//! The parser looks for the earliest date-shaped token anywhere in its input
//! and ignores the surrounding words, so "March 5, 2024 Minimum Payment" and
//! "by 03/05/24" both resolve to 2024-03-05. Missing components come from
//! the reference date: "03/25" takes its year, "March 2024" its day.

use chrono::{Datelike, Local, NaiveDate};
use regex::Regex;

use super::patterns::{
    DATE_DAY_MONTH, DATE_MONTH_DAY, DATE_MONTH_YEAR, DATE_NUMERIC, DATE_NUMERIC_NO_YEAR, DATE_YMD,
};
use super::{ExtractionMatch, FieldExtractor};

/// Date parser with a reference date for expressions that omit the year.
#[derive(Debug, Clone, Copy)]
pub struct DateParser {
    reference: NaiveDate,
}

impl DateParser {
    /// Create a parser that fills missing years from today's date.
    pub fn new() -> Self {
        Self::with_reference(Local::now().date_naive())
    }

    /// Create a parser with a fixed reference date.
    pub fn with_reference(reference: NaiveDate) -> Self {
        Self { reference }
    }

    /// The date used to fill in missing components.
    pub fn reference(&self) -> NaiveDate {
        self.reference
    }

    /// Parse the earliest date in `text`.
    pub fn parse(&self, text: &str) -> Option<NaiveDate> {
        self.extract(text).map(|m| m.value)
    }

    /// Every valid date produced by `re`, converting captures with `build`.
    fn dated_matches(
        &self,
        re: &Regex,
        text: &str,
        build: impl Fn(&regex::Captures) -> Option<NaiveDate>,
    ) -> Vec<ExtractionMatch<NaiveDate>> {
        re.captures_iter(text)
            .filter_map(|caps| {
                let date = build(&caps)?;
                let m = caps.get(0)?;
                Some(ExtractionMatch::new(date, m.as_str()).with_position(m.start(), m.end()))
            })
            .collect()
    }

    fn year_or_reference(&self, year: Option<regex::Match>) -> i32 {
        year.map(|y| parse_year(y.as_str()))
            .unwrap_or_else(|| self.reference.year())
    }
}

impl Default for DateParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateParser {
    type Output = ExtractionMatch<NaiveDate>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        // Earliest start wins; on a tie the more specific shape (listed first)
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        // YYYY-MM-DD, YYYY/MM/DD, YYYY.MM.DD
        results.extend(self.dated_matches(&DATE_YMD, text, |caps| {
            let year: i32 = caps[1].parse().ok()?;
            let month: u32 = caps[2].parse().ok()?;
            let day: u32 = caps[3].parse().ok()?;
            NaiveDate::from_ymd_opt(year, month, day)
        }));

        // "March 5, 2024", "Mar. 5th", "Sept 30 24"
        results.extend(self.dated_matches(&DATE_MONTH_DAY, text, |caps| {
            let month = month_to_number(&caps[1])?;
            let day: u32 = caps[2].parse().ok()?;
            NaiveDate::from_ymd_opt(self.year_or_reference(caps.get(3)), month, day)
        }));

        // "5 March 2024", "5th of March"
        results.extend(self.dated_matches(&DATE_DAY_MONTH, text, |caps| {
            let day: u32 = caps[1].parse().ok()?;
            let month = month_to_number(&caps[2])?;
            NaiveDate::from_ymd_opt(self.year_or_reference(caps.get(3)), month, day)
        }));

        // MM/DD/YYYY, month first unless that cannot be a month
        results.extend(self.dated_matches(&DATE_NUMERIC, text, |caps| {
            let first: u32 = caps[1].parse().ok()?;
            let second: u32 = caps[2].parse().ok()?;
            let (month, day) = month_first(first, second);
            NaiveDate::from_ymd_opt(parse_year(&caps[3]), month, day)
        }));

        // MM/DD, unless it is the front of a full MM/DD/YY
        results.extend(self.dated_matches(&DATE_NUMERIC_NO_YEAR, text, |caps| {
            let rest = text.get(caps.get(0)?.end()..)?;
            if rest
                .strip_prefix('/')
                .is_some_and(|r| r.starts_with(|c: char| c.is_ascii_digit()))
            {
                return None;
            }
            let first: u32 = caps[1].parse().ok()?;
            let second: u32 = caps[2].parse().ok()?;
            let (month, day) = month_first(first, second);
            NaiveDate::from_ymd_opt(self.reference.year(), month, day)
        }));

        // "March 2024"
        results.extend(self.dated_matches(&DATE_MONTH_YEAR, text, |caps| {
            let month = month_to_number(&caps[1])?;
            let year: i32 = caps[2].parse().ok()?;
            // Reference day, or the month's last day when it is shorter
            (1..=self.reference.day())
                .rev()
                .find_map(|day| NaiveDate::from_ymd_opt(year, month, day))
        }));

        // Stable sort keeps pattern priority for matches starting at the same offset
        results.sort_by_key(|m| m.start());
        results
    }
}

/// Normalize a captured due date to ISO 8601, or return it trimmed.
pub fn normalize_date(parser: &DateParser, raw: &str) -> String {
    let trimmed = raw.trim();
    match parser.parse(trimmed) {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => trimmed.to_string(),
    }
}

/// Numeric dates read month first unless the first number cannot be a month.
fn month_first(first: u32, second: u32) -> (u32, u32) {
    if first > 12 && second <= 12 {
        (second, first)
    } else {
        (first, second)
    }
}

fn parse_year(s: &str) -> i32 {
    let year: i32 = s.parse().unwrap_or(0);
    if s.len() <= 2 {
        // Two-digit year: assume 2000s for 00-50, 1900s for 51-99
        if year <= 50 {
            2000 + year
        } else {
            1900 + year
        }
    } else {
        year
    }
}

fn month_to_number(month: &str) -> Option<u32> {
    let month = month.to_lowercase();
    let number = match month.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parser() -> DateParser {
        DateParser::with_reference(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_name_first() {
        assert_eq!(parser().parse("March 5, 2024"), Some(ymd(2024, 3, 5)));
        assert_eq!(parser().parse("Mar. 5th 2024"), Some(ymd(2024, 3, 5)));
        assert_eq!(parser().parse("Sept 30 24"), Some(ymd(2024, 9, 30)));
    }

    #[test]
    fn test_day_first_month_name() {
        assert_eq!(parser().parse("5 March 2024"), Some(ymd(2024, 3, 5)));
        assert_eq!(parser().parse("the 21st of December, 2023"), Some(ymd(2023, 12, 21)));
    }

    #[test]
    fn test_numeric_dates() {
        assert_eq!(parser().parse("04/05/2024"), Some(ymd(2024, 4, 5)));
        assert_eq!(parser().parse("25/12/2023"), Some(ymd(2023, 12, 25)));
        assert_eq!(parser().parse("03-05-24"), Some(ymd(2024, 3, 5)));
        assert_eq!(parser().parse("2024-03-05"), Some(ymd(2024, 3, 5)));
    }

    #[test]
    fn test_missing_year_uses_reference() {
        assert_eq!(parser().parse("Jul 15"), Some(ymd(2024, 7, 15)));
    }

    #[test]
    fn test_partial_numeric_date_uses_reference_year() {
        assert_eq!(parser().parse("03/25"), Some(ymd(2024, 3, 25)));
        assert_eq!(parser().parse("due 25/12"), Some(ymd(2024, 12, 25)));
        assert_eq!(parser().parse("04/10/2023"), Some(ymd(2023, 4, 10)));
        assert_eq!(parser().parse("12.50"), None);
    }

    #[test]
    fn test_month_and_year_use_reference_day() {
        assert_eq!(parser().parse("March 2024"), Some(ymd(2024, 3, 1)));

        let late = DateParser::with_reference(ymd(2024, 5, 31));
        assert_eq!(late.parse("March 2024"), Some(ymd(2024, 3, 31)));
        assert_eq!(late.parse("Feb 2023"), Some(ymd(2023, 2, 28)));
        assert_eq!(late.parse("5 March 2024"), Some(ymd(2024, 3, 5)));
    }

    #[test]
    fn test_fuzzy_surrounding_text() {
        assert_eq!(
            parser().parse("March 5, 2024 Minimum Payment Due"),
            Some(ymd(2024, 3, 5))
        );
        assert_eq!(parser().parse("on or before 04/10/2024"), Some(ymd(2024, 4, 10)));
    }

    #[test]
    fn test_earliest_date_wins() {
        let m = parser().extract("due 04/10/2024 or by May 1, 2024").unwrap();
        assert_eq!(m.value, ymd(2024, 4, 10));
        assert_eq!(m.source, "04/10/2024");
        assert_eq!(parser().extract_all("due 04/10/2024 or by May 1, 2024").len(), 2);
    }

    #[test]
    fn test_unparseable() {
        assert_eq!(parser().parse("upon receipt"), None);
        assert_eq!(parser().parse("February 30, 2024"), None);
        assert_eq!(parser().parse("13/13/2024"), None);
    }

    #[test]
    fn test_normalize_date() {
        assert_eq!(normalize_date(&parser(), " March 5, 2024 "), "2024-03-05");
        assert_eq!(normalize_date(&parser(), "2024-03-05"), "2024-03-05");
        assert_eq!(normalize_date(&parser(), " upon receipt "), "upon receipt");
        assert_eq!(normalize_date(&parser(), "03/25"), "2024-03-25");
    }
}
