//! Date and year checks run before any query leaves the client.
//!
//! Every rule is evaluated; the violations are collected into a single
//! [`ValidationError`] instead of stopping at the first one.

use chrono::NaiveDate;
use std::fmt;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single broken rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// `value` is not in the expected `YYYY-MM-DD` / `YYYY` shape.
    Format { field: &'static str, value: String },
    /// The end of the range lies before its start.
    Order {
        start: &'static str,
        end: &'static str,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Format { field, value } => {
                write!(f, "{} format '{}' not correct", field, value)
            }
            Violation::Order { start, end } => write!(f, "{} must be later than {}", end, start),
        }
    }
}

/// All violations found for one query, rendered as a multi-line message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    violations: Vec<Violation>,
}

impl ValidationError {
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Exception(s) found:")?;
        for v in &self.violations {
            write!(f, "\n{}", v)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Validates a `YYYY-MM-DD` start date and an optional end date.
///
/// `None` means the end date was not supplied. A required end date should be
/// passed as `Some` even when empty, so that it fails the format check.
pub fn validate_date_range(start: &str, end: Option<&str>) -> Result<(), ValidationError> {
    check_range(("start_date", "end_date"), start, end, parse_date)
}

/// Validates a `YYYY` start year and an optional end year.
///
/// Ordering compares the strings directly, which matches numeric order for
/// four-digit years.
pub fn validate_year_range(start: &str, end: Option<&str>) -> Result<(), ValidationError> {
    check_range(("start_year", "end_year"), start, end, parse_year)
}

fn check_range<'a, T, F>(
    (start_field, end_field): (&'static str, &'static str),
    start: &'a str,
    end: Option<&'a str>,
    parse: F,
) -> Result<(), ValidationError>
where
    T: PartialOrd,
    F: Fn(&'a str) -> Option<T>,
{
    let mut violations = Vec::new();

    let parsed_start = parse(start);
    if parsed_start.is_none() {
        violations.push(Violation::Format {
            field: start_field,
            value: start.to_string(),
        });
    }

    if let Some(end) = end {
        let parsed_end = parse(end);
        if parsed_end.is_none() {
            violations.push(Violation::Format {
                field: end_field,
                value: end.to_string(),
            });
        }

        // Ordering only makes sense once both sides are well-formed.
        if let (Some(s), Some(e)) = (parsed_start, parsed_end) {
            if e < s {
                violations.push(Violation::Order {
                    start: start_field,
                    end: end_field,
                });
            }
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { violations })
    }
}

fn is_year(s: &str) -> bool {
    s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit())
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    // chrono skips whitespace before numeric fields and its %Y accepts signs
    // and any digit count; the wire format allows neither.
    if s.bytes().any(|b| b.is_ascii_whitespace()) {
        return None;
    }
    let year = s.split('-').next()?;
    if !is_year(year) {
        return None;
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

fn parse_year(s: &str) -> Option<&str> {
    is_year(s).then_some(s)
}
