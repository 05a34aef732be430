use polars::prelude::DataFrame;
use std::collections::BTreeMap;
use tracing::debug;

use crate::analyzers::types::GroupRate;
use crate::analyzers::utility::ratio;
use crate::error::{AnalysisError, Result};
use crate::frame::{numbers, texts};
use crate::schema;

/// Reads the cancellation flag of every row.
///
/// # Errors
///
/// Fails with [`AnalysisError::InvalidValue`] on a null flag or a value other
/// than 0 or 1.
pub(crate) fn cancellation_flags(frame: &DataFrame) -> Result<Vec<bool>> {
    numbers(frame, schema::IS_CANCELED)?
        .into_iter()
        .enumerate()
        .map(|(row, flag)| match flag {
            Some(v) if v == 0.0 => Ok(false),
            Some(v) if v == 1.0 => Ok(true),
            Some(v) => Err(AnalysisError::invalid_value(
                schema::IS_CANCELED,
                row,
                format!("expected 0 or 1, found {v}"),
            )),
            None => Err(AnalysisError::invalid_value(
                schema::IS_CANCELED,
                row,
                "missing cancellation flag",
            )),
        })
        .collect()
}

/// Share of canceled bookings, in [0, 1]. An empty table yields 0.0.
pub fn overall_cancellation_rate(frame: &DataFrame) -> Result<f64> {
    let flags = cancellation_flags(frame)?;
    let canceled = flags.iter().filter(|c| **c).count();
    Ok(ratio(canceled, flags.len()))
}

/// Cancellation counts and rate per distinct combination of `group_by`
/// values, ordered by key.
///
/// An empty `group_by` puts every row in a single group.
#[tracing::instrument(skip(frame))]
pub fn cancellation_by_group(frame: &DataFrame, group_by: &[&str]) -> Result<Vec<GroupRate>> {
    let flags = cancellation_flags(frame)?;
    let key_columns = group_by
        .iter()
        .map(|name| Ok((*name, texts(frame, name)?)))
        .collect::<Result<Vec<_>>>()?;

    let mut groups: BTreeMap<Vec<String>, (usize, usize)> = BTreeMap::new();
    for (row, canceled) in flags.iter().enumerate() {
        let key = key_columns
            .iter()
            .map(|(name, cells)| {
                cells[row].clone().ok_or_else(|| {
                    AnalysisError::invalid_value(*name, row, "missing group key")
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let (total, canceled_count) = groups.entry(key).or_default();
        *total += 1;
        if *canceled {
            *canceled_count += 1;
        }
    }

    debug!(groups = groups.len(), keys = ?group_by, "Grouped cancellations");

    Ok(groups
        .into_iter()
        .map(|(keys, (total, canceled))| GroupRate {
            keys,
            total,
            canceled,
            rate: ratio(canceled, total),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_from_reader;
    use polars::prelude::Column;

    fn bookings(rows: &[(&str, &str, u8)]) -> DataFrame {
        let mut data = String::from("hotel,customer_type,is_canceled\n");
        for (hotel, customer, canceled) in rows {
            data.push_str(&format!("{hotel},{customer},{canceled}\n"));
        }
        load_from_reader(data.as_bytes(), b',').unwrap()
    }

    fn contract_frame() -> DataFrame {
        let mut rows = Vec::new();
        for i in 0..10 {
            let hotel = if i % 2 == 0 { "City Hotel" } else { "Resort Hotel" };
            rows.push((hotel, "Contract", u8::from(i < 4)));
        }
        rows.push(("City Hotel", "Transient", 1));
        rows.push(("Resort Hotel", "Group", 0));
        bookings(&rows)
    }

    #[test]
    fn test_overall_rate_is_canceled_over_total() {
        let frame = contract_frame();
        let rate = overall_cancellation_rate(&frame).unwrap();
        assert_eq!(rate, 5.0 / 12.0);
        assert!((0.0..=1.0).contains(&rate));
    }

    #[test]
    fn test_overall_rate_empty_table() {
        let frame =
            DataFrame::new(vec![Column::new("is_canceled".into(), Vec::<i64>::new())]).unwrap();
        assert_eq!(overall_cancellation_rate(&frame).unwrap(), 0.0);
    }

    #[test]
    fn test_missing_group_key_fails() {
        let data = "customer_type,is_canceled\nContract,1\nNA,0\n";
        let frame = load_from_reader(data.as_bytes(), b',').unwrap();
        let err = cancellation_by_group(&frame, &["customer_type"]).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidValue { row: 1, .. }));
    }

    #[test]
    fn test_contract_group_rate() {
        let frame = contract_frame();
        let groups = cancellation_by_group(&frame, &["customer_type"]).unwrap();

        let keys: Vec<_> = groups.iter().map(|g| g.keys[0].as_str()).collect();
        assert_eq!(keys, vec!["Contract", "Group", "Transient"]);

        let contract = &groups[0];
        assert_eq!(contract.total, 10);
        assert_eq!(contract.canceled, 4);
        assert_eq!(contract.rate, 0.4);

        let total: usize = groups.iter().map(|g| g.total).sum();
        assert_eq!(total, frame.height());
    }

    #[test]
    fn test_group_by_customer_type_and_hotel() {
        let frame = contract_frame();
        let groups = cancellation_by_group(&frame, &["customer_type", "hotel"]).unwrap();

        assert_eq!(groups.len(), 4);
        assert_eq!(groups[0].keys, vec!["Contract", "City Hotel"]);
        // City Hotel contract rows are i = 0, 2, 4, 6, 8; canceled for 0 and 2
        assert_eq!(groups[0].total, 5);
        assert_eq!(groups[0].canceled, 2);
        for group in &groups {
            assert_eq!(group.rate, group.canceled as f64 / group.total as f64);
        }
        assert_eq!(groups.iter().map(|g| g.total).sum::<usize>(), 12);
    }

    #[test]
    fn test_unknown_group_column_is_schema_error() {
        let frame = contract_frame();
        let err = cancellation_by_group(&frame, &["market_segment"]).unwrap_err();
        assert!(matches!(err, AnalysisError::Schema { .. }));
    }

    #[test]
    fn test_invalid_flag_fails() {
        let frame = bookings(&[("City Hotel", "Contract", 2)]);
        let err = overall_cancellation_rate(&frame).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidValue { row: 0, .. }));
    }
}
