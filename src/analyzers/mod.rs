//! Read-only aggregations over the cleaned bookings table.
//!
//! Every query takes the table by shared reference and returns a new value;
//! none depends on another, so they can run in any order.

pub mod cancellation;
pub mod lead_time;
pub mod month;
pub mod monthly;
pub mod types;
pub mod utility;

pub use cancellation::{cancellation_by_group, overall_cancellation_rate};
pub use lead_time::lead_time_by_outcome;
pub use monthly::{average_monthly_guests, monthly_trend, monthly_volume};
pub use types::{
    BoxSummary, GroupRate, LeadTimeSplit, MonthlyGuests, MonthlyPolicy, MonthlyVolume, TrendPoint,
};
