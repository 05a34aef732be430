//! Column names of the hotel-bookings table.

pub const HOTEL: &str = "hotel";
pub const IS_CANCELED: &str = "is_canceled";
pub const LEAD_TIME: &str = "lead_time";
pub const ARRIVAL_YEAR: &str = "arrival_date_year";
pub const ARRIVAL_MONTH: &str = "arrival_date_month";
pub const ADULTS: &str = "adults";
pub const CHILDREN: &str = "children";
pub const BABIES: &str = "babies";
pub const MEAL: &str = "meal";
pub const COUNTRY: &str = "country";
pub const AGENT: &str = "agent";
pub const COMPANY: &str = "company";
pub const CUSTOMER_TYPE: &str = "customer_type";
