//! Month-name parsing for the arrival-month column.

use chrono::Month;

use crate::error::{AnalysisError, Result};

/// Calendar order, January first.
pub const MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

/// Parses a full English month name, ignoring case and surrounding whitespace.
/// Abbreviations are rejected.
pub fn parse_month(name: &str) -> Option<Month> {
    let name = name.trim();
    MONTHS
        .iter()
        .copied()
        .find(|m| m.name().eq_ignore_ascii_case(name))
}

/// Parses the month cell at `row` of `column`, failing on a null or an
/// unrecognized name.
pub(crate) fn month_at(column: &str, cells: &[Option<String>], row: usize) -> Result<Month> {
    let name = cells[row]
        .as_deref()
        .ok_or_else(|| AnalysisError::invalid_value(column, row, "missing month"))?;
    parse_month(name).ok_or_else(|| {
        AnalysisError::invalid_value(column, row, format!("unknown month name `{name}`"))
    })
}
