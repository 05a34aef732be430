//! Monthly booking volume.
//!
//! Two policies are offered. [`average_monthly_guests`] collapses every year
//! onto the twelve month names and divides by the number of years each month
//! covers in the dataset (three for July and August, two otherwise).
//! [`monthly_trend`] keeps the calendar and counts bookings per real month.

use chrono::{Month, NaiveDate};
use polars::prelude::DataFrame;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::analyzers::month::{MONTHS, month_at};
use crate::analyzers::types::{MonthlyGuests, MonthlyPolicy, MonthlyVolume, TrendPoint};
use crate::error::{AnalysisError, Result};
use crate::frame::{numbers, texts};
use crate::schema;

/// Number of years of data each arrival month spans.
pub fn year_factor(month: Month) -> f64 {
    match month {
        Month::July | Month::August => 3.0,
        _ => 2.0,
    }
}

/// Average bookings per (month, hotel), one January..December series per
/// hotel, hotels in sorted order.
pub fn average_monthly_guests(frame: &DataFrame) -> Result<Vec<MonthlyGuests>> {
    let months = texts(frame, schema::ARRIVAL_MONTH)?;
    let hotels = texts(frame, schema::HOTEL)?;

    let mut counts: BTreeMap<(String, u32), usize> = BTreeMap::new();
    let mut hotel_names = BTreeSet::new();
    for row in 0..frame.height() {
        let month = month_at(schema::ARRIVAL_MONTH, &months, row)?;
        let hotel = hotel_at(&hotels, row)?;
        *counts
            .entry((hotel.clone(), month.number_from_month()))
            .or_default() += 1;
        hotel_names.insert(hotel);
    }

    let mut points = Vec::with_capacity(hotel_names.len() * MONTHS.len());
    for hotel in &hotel_names {
        for month in MONTHS {
            let guests = counts
                .get(&(hotel.clone(), month.number_from_month()))
                .map(|&n| n as f64 / year_factor(month));
            points.push(MonthlyGuests {
                month: month.name().to_string(),
                hotel: hotel.clone(),
                guests,
            });
        }
    }

    debug!(hotels = hotel_names.len(), "Computed average monthly guests");
    Ok(points)
}

/// Bookings per calendar month in chronological order, per hotel when
/// `split_by_hotel` is set.
///
/// Split series share one timeline: a hotel without bookings in a month
/// seen in the data gets a zero point for it.
pub fn monthly_trend(frame: &DataFrame, split_by_hotel: bool) -> Result<Vec<TrendPoint>> {
    let years = numbers(frame, schema::ARRIVAL_YEAR)?;
    let months = texts(frame, schema::ARRIVAL_MONTH)?;
    let hotels = if split_by_hotel {
        Some(texts(frame, schema::HOTEL)?)
    } else {
        None
    };

    let mut counts: BTreeMap<(NaiveDate, Option<String>), usize> = BTreeMap::new();
    for row in 0..frame.height() {
        let period = period_at(&years, &months, row)?;
        let hotel = hotels
            .as_deref()
            .map(|cells| hotel_at(cells, row))
            .transpose()?;
        *counts.entry((period, hotel)).or_default() += 1;
    }

    if split_by_hotel {
        let periods: BTreeSet<NaiveDate> = counts.keys().map(|(period, _)| *period).collect();
        let hotel_names: BTreeSet<Option<String>> =
            counts.keys().map(|(_, hotel)| hotel.clone()).collect();
        for period in &periods {
            for hotel in &hotel_names {
                counts.entry((*period, hotel.clone())).or_insert(0);
            }
        }
    }

    debug!(points = counts.len(), split_by_hotel, "Computed monthly trend");
    Ok(counts
        .into_iter()
        .map(|((period, hotel), bookings)| TrendPoint {
            period,
            hotel,
            bookings,
        })
        .collect())
}

/// Runs the computation `policy` selects.
#[tracing::instrument(skip(frame))]
pub fn monthly_volume(
    frame: &DataFrame,
    policy: MonthlyPolicy,
    split_by_hotel: bool,
) -> Result<MonthlyVolume> {
    Ok(match policy {
        MonthlyPolicy::AverageAcrossYears => {
            MonthlyVolume::AverageAcrossYears(average_monthly_guests(frame)?)
        }
        MonthlyPolicy::Chronological => {
            MonthlyVolume::Chronological(monthly_trend(frame, split_by_hotel)?)
        }
    })
}

fn hotel_at(cells: &[Option<String>], row: usize) -> Result<String> {
    cells[row]
        .clone()
        .ok_or_else(|| AnalysisError::invalid_value(schema::HOTEL, row, "missing hotel"))
}

/// First day of the arrival month at `row`.
fn period_at(years: &[Option<f64>], months: &[Option<String>], row: usize) -> Result<NaiveDate> {
    let month = month_at(schema::ARRIVAL_MONTH, months, row)?;
    let year = years[row].ok_or_else(|| {
        AnalysisError::invalid_value(schema::ARRIVAL_YEAR, row, "missing year")
    })?;
    if year.fract() != 0.0 {
        return Err(AnalysisError::invalid_value(
            schema::ARRIVAL_YEAR,
            row,
            format!("`{year}` is not a whole year"),
        ));
    }
    NaiveDate::from_ymd_opt(year as i32, month.number_from_month(), 1).ok_or_else(|| {
        AnalysisError::invalid_value(schema::ARRIVAL_YEAR, row, format!("year {year} out of range"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_from_reader;

    fn bookings(rows: &[(&str, i32, &str)]) -> DataFrame {
        let mut data = String::from("hotel,arrival_date_year,arrival_date_month\n");
        for (hotel, year, month) in rows {
            data.push_str(&format!("{hotel},{year},{month}\n"));
        }
        load_from_reader(data.as_bytes(), b',').unwrap()
    }

    fn guests_for<'a>(points: &'a [MonthlyGuests], hotel: &str, month: &str) -> &'a MonthlyGuests {
        points
            .iter()
            .find(|p| p.hotel == hotel && p.month == month)
            .unwrap()
    }

    #[test]
    fn test_july_and_august_divide_by_three() {
        let mut rows = Vec::new();
        for year in [2015, 2016, 2017] {
            for _ in 0..2 {
                rows.push(("City Hotel", year, "July"));
            }
            rows.push(("City Hotel", year, "August"));
        }
        let frame = bookings(&rows);

        let points = average_monthly_guests(&frame).unwrap();
        assert_eq!(points.len(), 12);
        assert_eq!(guests_for(&points, "City Hotel", "July").guests, Some(2.0));
        assert_eq!(guests_for(&points, "City Hotel", "August").guests, Some(1.0));
        assert_eq!(guests_for(&points, "City Hotel", "March").guests, None);
    }

    #[test]
    fn test_other_months_divide_by_two() {
        let frame = bookings(&[
            ("Resort Hotel", 2016, "March"),
            ("Resort Hotel", 2017, "March"),
            ("Resort Hotel", 2017, "March"),
        ]);
        let points = average_monthly_guests(&frame).unwrap();
        assert_eq!(guests_for(&points, "Resort Hotel", "March").guests, Some(1.5));
    }

    #[test]
    fn test_series_follow_calendar_order_per_hotel() {
        let frame = bookings(&[
            ("Resort Hotel", 2016, "December"),
            ("City Hotel", 2016, "January"),
            ("City Hotel", 2016, "May"),
        ]);
        let points = average_monthly_guests(&frame).unwrap();

        assert_eq!(points.len(), 24);
        let city: Vec<_> = points[..12].iter().map(|p| p.month.as_str()).collect();
        assert_eq!(city[0], "January");
        assert_eq!(city[11], "December");
        assert!(points[..12].iter().all(|p| p.hotel == "City Hotel"));
        assert!(points[12..].iter().all(|p| p.hotel == "Resort Hotel"));
        // a month seen for one hotel only is missing for the other
        assert_eq!(guests_for(&points, "Resort Hotel", "May").guests, None);
    }

    #[test]
    fn test_unknown_month_fails_loudly() {
        let frame = bookings(&[("City Hotel", 2016, "July"), ("City Hotel", 2016, "Jly")]);
        let err = average_monthly_guests(&frame).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidValue { row: 1, .. }));
        assert!(monthly_trend(&frame, false).is_err());
    }

    #[test]
    fn test_trend_is_chronological_and_not_collapsed() {
        let frame = bookings(&[
            ("City Hotel", 2016, "July"),
            ("City Hotel", 2015, "July"),
            ("Resort Hotel", 2015, "July"),
            ("City Hotel", 2015, "December"),
        ]);
        let points = monthly_trend(&frame, false).unwrap();

        let summary: Vec<_> = points
            .iter()
            .map(|p| (p.period.to_string(), p.bookings))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("2015-07-01".to_string(), 2),
                ("2015-12-01".to_string(), 1),
                ("2016-07-01".to_string(), 1),
            ]
        );
        assert!(points.iter().all(|p| p.hotel.is_none()));
    }

    #[test]
    fn test_trend_split_by_hotel() {
        let frame = bookings(&[
            ("City Hotel", 2015, "July"),
            ("Resort Hotel", 2015, "July"),
            ("Resort Hotel", 2015, "July"),
        ]);
        let points = monthly_trend(&frame, true).unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].hotel.as_deref(), Some("City Hotel"));
        assert_eq!(points[0].bookings, 1);
        assert_eq!(points[1].hotel.as_deref(), Some("Resort Hotel"));
        assert_eq!(points[1].bookings, 2);
    }

    #[test]
    fn test_split_trend_fills_months_without_bookings() {
        let frame = bookings(&[
            ("City Hotel", 2015, "July"),
            ("Resort Hotel", 2015, "August"),
            ("City Hotel", 2015, "September"),
        ]);
        let points = monthly_trend(&frame, true).unwrap();

        let city: Vec<_> = points
            .iter()
            .filter(|p| p.hotel.as_deref() == Some("City Hotel"))
            .map(|p| (p.period.to_string(), p.bookings))
            .collect();
        assert_eq!(
            city,
            vec![
                ("2015-07-01".to_string(), 1),
                ("2015-08-01".to_string(), 0),
                ("2015-09-01".to_string(), 1),
            ]
        );
        assert_eq!(points.len(), 6);
        assert_eq!(points.iter().map(|p| p.bookings).sum::<usize>(), 3);
    }

    #[test]
    fn test_monthly_volume_dispatches_on_policy() {
        let frame = bookings(&[("City Hotel", 2015, "July")]);
        assert!(matches!(
            monthly_volume(&frame, MonthlyPolicy::AverageAcrossYears, false).unwrap(),
            MonthlyVolume::AverageAcrossYears(_)
        ));
        assert!(matches!(
            monthly_volume(&frame, MonthlyPolicy::Chronological, false).unwrap(),
            MonthlyVolume::Chronological(_)
        ));
    }
}
