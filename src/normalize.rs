//! Text normalization for values scraped out of rendered markup.

use std::str::FromStr;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::FormatError;

/// A dollar amount as it reaches the converter: either already numeric or
/// still the free-form text shown on the page (`"-$7,000.42"`).
#[derive(Debug, Clone, Copy)]
pub enum DollarAmount<'a> {
    Text(&'a str),
    Number(f64),
}

impl<'a> From<&'a str> for DollarAmount<'a> {
    fn from(value: &'a str) -> Self {
        DollarAmount::Text(value)
    }
}

impl<'a> From<&'a String> for DollarAmount<'a> {
    fn from(value: &'a String) -> Self {
        DollarAmount::Text(value.as_str())
    }
}

impl From<f64> for DollarAmount<'_> {
    fn from(value: f64) -> Self {
        DollarAmount::Number(value)
    }
}

/// Convert a dollar amount to integer cents.
///
/// Text input keeps only digits, `-` and `.` before parsing, so currency
/// symbols and thousands separators are ignored while the sign survives.
/// The result is rounded to the nearest cent.
pub fn dollars_to_cents<'a>(value: impl Into<DollarAmount<'a>>) -> Result<i64, FormatError> {
    let value = value.into();
    let dollars = match value {
        DollarAmount::Text(text) => {
            let stripped: String = text
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '-' || *c == '.')
                .collect();
            Decimal::from_str(&stripped).map_err(|_| FormatError {
                input: text.to_string(),
            })?
        }
        DollarAmount::Number(number) => Decimal::from_f64(number).ok_or_else(|| FormatError {
            input: number.to_string(),
        })?,
    };

    (dollars * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| FormatError {
            input: dollars.to_string(),
        })
}

/// Collapse every run of whitespace into a single space and trim the ends,
/// the way a browser renders a text node.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
