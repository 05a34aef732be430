use polars::prelude::DataFrame;

use crate::analyzers::cancellation::cancellation_flags;
use crate::analyzers::types::LeadTimeSplit;
use crate::error::{AnalysisError, Result};
use crate::frame::numbers;
use crate::schema;

/// Splits lead times into canceled and non-canceled bookings.
pub fn lead_time_by_outcome(frame: &DataFrame) -> Result<LeadTimeSplit> {
    let flags = cancellation_flags(frame)?;
    let lead_time = numbers(frame, schema::LEAD_TIME)?;

    let mut split = LeadTimeSplit::default();
    for (row, (canceled, days)) in flags.into_iter().zip(lead_time).enumerate() {
        let days = days.ok_or_else(|| {
            AnalysisError::invalid_value(schema::LEAD_TIME, row, "missing lead time")
        })?;
        if canceled {
            split.canceled.push(days);
        } else {
            split.not_canceled.push(days);
        }
    }
    Ok(split)
}
