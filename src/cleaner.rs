//! Missing-value imputation, meal normalization and zero-occupant filtering.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::frame::{Value, column, fill_null, numbers, replace_text};
use crate::schema;

/// Default written into the null cells of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Imputation {
    pub column: String,
    pub value: Value,
}

impl Imputation {
    pub fn new(column: &str, value: Value) -> Self {
        Self {
            column: column.to_string(),
            value,
        }
    }
}

/// What the cleaner does, column by column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningPlan {
    /// Applied in order; every column must exist in the table.
    pub imputations: Vec<Imputation>,
    pub meal_column: String,
    pub meal_sentinel: String,
    pub meal_replacement: String,
    /// Rows where these columns sum to zero are dropped.
    pub occupant_columns: Vec<String>,
}

impl Default for CleaningPlan {
    fn default() -> Self {
        Self {
            imputations: vec![
                Imputation::new(schema::CHILDREN, Value::Float(0.0)),
                Imputation::new(schema::COUNTRY, Value::Text("Unknown".to_string())),
                Imputation::new(schema::AGENT, Value::Int(0)),
                Imputation::new(schema::COMPANY, Value::Int(0)),
            ],
            meal_column: schema::MEAL.to_string(),
            meal_sentinel: "Undefined".to_string(),
            meal_replacement: "SC".to_string(),
            occupant_columns: vec![
                schema::ADULTS.to_string(),
                schema::CHILDREN.to_string(),
                schema::BABIES.to_string(),
            ],
        }
    }
}

/// Bookkeeping of what cleaning changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleaningReport {
    /// Cells filled per imputed column.
    pub filled: Vec<(String, usize)>,
    pub meal_rewritten: usize,
    pub dropped_rows: usize,
}

#[derive(Debug, Clone)]
pub struct Cleaned {
    pub frame: DataFrame,
    pub report: CleaningReport,
}

/// Produces a cleaned copy of `frame`; the input is left untouched.
///
/// Imputation runs before the zero-occupant filter so that imputed
/// `children` values take part in the occupant sum.
///
/// # Errors
///
/// Returns [`crate::AnalysisError::Schema`] if a column named by the plan is
/// absent, before any cleaning is done.
#[tracing::instrument(skip_all)]
pub fn clean(frame: &DataFrame, plan: &CleaningPlan) -> Result<Cleaned> {
    for imputation in &plan.imputations {
        column(frame, &imputation.column)?;
    }
    column(frame, &plan.meal_column)?;
    for name in &plan.occupant_columns {
        column(frame, name)?;
    }

    let mut report = CleaningReport::default();

    let mut cleaned = frame.clone();
    for imputation in &plan.imputations {
        let (series, filled) = fill_null(
            column(&cleaned, &imputation.column)?.as_materialized_series(),
            &imputation.value,
        )?;
        debug!(column = %imputation.column, value = %imputation.value, filled, "Imputed missing values");
        report.filled.push((imputation.column.clone(), filled));
        cleaned.with_column(series)?;
    }

    let (meal, rewritten) = replace_text(
        column(&cleaned, &plan.meal_column)?.as_materialized_series(),
        &plan.meal_sentinel,
        &plan.meal_replacement,
    );
    report.meal_rewritten = rewritten;
    cleaned.with_column(meal)?;

    let mask = occupied_rows(&cleaned, &plan.occupant_columns)?;
    report.dropped_rows = mask.iter().filter(|keep| !**keep).count();
    let cleaned = cleaned.filter(&BooleanChunked::from_slice("keep".into(), &mask))?;

    info!(
        rows = cleaned.height(),
        dropped = report.dropped_rows,
        meal_rewritten = report.meal_rewritten,
        "Table cleaned"
    );

    Ok(Cleaned {
        frame: cleaned,
        report,
    })
}

/// `true` for rows to keep: total occupants is non-zero or cannot be computed.
fn occupied_rows(frame: &DataFrame, occupant_columns: &[String]) -> Result<Vec<bool>> {
    let columns = occupant_columns
        .iter()
        .map(|name| numbers(frame, name))
        .collect::<Result<Vec<_>>>()?;

    let mut mask = Vec::with_capacity(frame.height());
    let mut unknown = 0usize;
    for row in 0..frame.height() {
        let total = columns
            .iter()
            .try_fold(0.0, |sum, values| values[row].map(|v| sum + v));
        match total {
            Some(sum) => mask.push(sum != 0.0),
            None => {
                unknown += 1;
                mask.push(true);
            }
        }
    }

    if unknown > 0 {
        warn!(rows = unknown, "Rows kept with an incomplete occupant count");
    }

    Ok(mask)
}
