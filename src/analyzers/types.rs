//! Result types produced by the analyzers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analyzers::utility::quantile;

/// Cancellation counts for one group of bookings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRate {
    /// One value per grouping column, in grouping order.
    pub keys: Vec<String>,
    pub total: usize,
    pub canceled: usize,
    pub rate: f64,
}

/// Raw lead times split by cancellation outcome, in row order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LeadTimeSplit {
    pub canceled: Vec<f64>,
    pub not_canceled: Vec<f64>,
}

/// Five-number summary with Tukey whiskers, as drawn by a box plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSummary {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    /// Smallest value within 1.5 IQR below Q1.
    pub lower_whisker: f64,
    /// Largest value within 1.5 IQR above Q3.
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

impl BoxSummary {
    /// Returns `None` for empty input.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile(&sorted, 0.25)?;
        let median = quantile(&sorted, 0.5)?;
        let q3 = quantile(&sorted, 0.75)?;
        let iqr = q3 - q1;
        let (low_fence, high_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

        let inside = || sorted.iter().copied().filter(|v| (low_fence..=high_fence).contains(v));
        let lower_whisker = inside().next().unwrap_or(q1);
        let upper_whisker = inside().last().unwrap_or(q3);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|v| !(low_fence..=high_fence).contains(v))
            .collect();

        Some(Self {
            count: sorted.len(),
            min: sorted[0],
            q1,
            median,
            q3,
            max: sorted[sorted.len() - 1],
            lower_whisker,
            upper_whisker,
            outliers,
        })
    }
}

/// Average bookings for one (month, hotel) pair across the years covered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyGuests {
    pub month: String,
    pub hotel: String,
    /// `None` when the hotel has no booking in that month.
    pub guests: Option<f64>,
}

/// Bookings in one calendar month, optionally for a single hotel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    /// First day of the month.
    pub period: NaiveDate,
    pub hotel: Option<String>,
    pub bookings: usize,
}

/// How monthly booking volume is computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthlyPolicy {
    /// Counts per month name collapsed across years, divided by the number
    /// of years each month appears in the data.
    #[default]
    AverageAcrossYears,
    /// Counts per distinct calendar month over the actual date range.
    Chronological,
}

/// Monthly volume under whichever policy was selected.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "policy", content = "points", rename_all = "snake_case")]
pub enum MonthlyVolume {
    AverageAcrossYears(Vec<MonthlyGuests>),
    Chronological(Vec<TrendPoint>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_summary_empty() {
        assert_eq!(BoxSummary::from_values(&[]), None);
    }

    #[test]
    fn test_box_summary_quartiles_and_outliers() {
        let values = [5.0, 1.0, 3.0, 2.0, 4.0, 100.0];
        let summary = BoxSummary::from_values(&values).unwrap();

        assert_eq!(summary.count, 6);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 100.0);
        assert_eq!(summary.median, 3.5);
        assert_eq!(summary.q1, 2.25);
        assert_eq!(summary.q3, 4.75);
        assert_eq!(summary.outliers, vec![100.0]);
        assert_eq!(summary.lower_whisker, 1.0);
        assert_eq!(summary.upper_whisker, 5.0);
    }

    #[test]
    fn test_box_summary_single_value() {
        let summary = BoxSummary::from_values(&[7.0]).unwrap();
        assert_eq!(summary.median, 7.0);
        assert_eq!(summary.lower_whisker, 7.0);
        assert_eq!(summary.upper_whisker, 7.0);
        assert!(summary.outliers.is_empty());
    }
}
