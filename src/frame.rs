//! Helpers over polars [`DataFrame`]s.
//!
//! Tables are loaded once and never mutated: cleaning builds new series and
//! swaps them into a clone. The helpers here read columns as plain vectors
//! for the row-wise analyzers and render frames as aligned text.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AnalysisError, Result};

/// A single typed cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{v:.1}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(v),
        }
    }
}

fn is_integer(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

fn is_numeric(dtype: &DataType) -> bool {
    is_integer(dtype) || matches!(dtype, DataType::Float32 | DataType::Float64)
}

/// `true` when the series holds no value at all; the CSV reader types such
/// columns as strings.
fn is_all_null(series: &Series) -> bool {
    series.null_count() == series.len()
}

/// # Errors
///
/// Returns [`AnalysisError::Schema`] if no column is called `name`.
pub fn column<'a>(frame: &'a DataFrame, name: &str) -> Result<&'a Column> {
    frame.column(name).map_err(|_| AnalysisError::schema(name))
}

/// Every cell of a numeric column as `f64`, nulls as `None`.
///
/// # Errors
///
/// - [`AnalysisError::Schema`] if the column is absent.
/// - [`AnalysisError::ColumnType`] if it holds text.
pub fn numbers(frame: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = column(frame, name)?.as_materialized_series();
    if !is_numeric(series.dtype()) && !is_all_null(series) {
        return Err(AnalysisError::ColumnType {
            column: name.to_string(),
            expected: "numeric",
        });
    }
    let floats = series.cast(&DataType::Float64)?;
    Ok(floats.f64()?.into_iter().collect())
}

/// Every cell as display text (numbers included), nulls as `None`.
pub fn texts(frame: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    series_texts(column(frame, name)?.as_materialized_series())
}

fn series_texts(series: &Series) -> Result<Vec<Option<String>>> {
    let text = series.cast(&DataType::String)?;
    Ok(text
        .str()?
        .into_iter()
        .map(|cell| cell.map(str::to_string))
        .collect())
}

/// `(column, null cells)` in column order.
pub fn null_counts(frame: &DataFrame) -> Vec<(String, usize)> {
    frame
        .get_columns()
        .iter()
        .map(|c| (c.name().to_string(), c.null_count()))
        .collect()
}

/// Replaces every null of `series` with `value`. Returns the new series and
/// the number of cells filled.
///
/// An `Int` default keeps an integer column integer and fills a float column
/// as `f64`; a `Float` default casts to `f64`; a `Text` default (or any
/// default on a text column) casts to string. An all-null column takes the
/// default's type.
pub fn fill_null(series: &Series, value: &Value) -> Result<(Series, usize)> {
    let filled = series.null_count();
    let name = series.name().clone();
    let dtype = series.dtype();
    let all_null = is_all_null(series);

    let out = match value {
        Value::Int(v) if is_integer(dtype) || all_null => series
            .cast(&DataType::Int64)?
            .i64()?
            .into_iter()
            .map(|cell| Some(cell.unwrap_or(*v)))
            .collect::<Int64Chunked>()
            .with_name(name)
            .into_series(),
        Value::Int(v) if is_numeric(dtype) => fill_floats(series, *v as f64)?.with_name(name),
        Value::Float(v) if is_numeric(dtype) || all_null => {
            fill_floats(series, *v)?.with_name(name)
        }
        other => {
            let text = other.to_string();
            series
                .cast(&DataType::String)?
                .str()?
                .into_iter()
                .map(|cell| Some(cell.unwrap_or(text.as_str())))
                .collect::<StringChunked>()
                .with_name(name)
                .into_series()
        }
    };
    Ok((out, filled))
}

fn fill_floats(series: &Series, value: f64) -> Result<Series> {
    Ok(series
        .cast(&DataType::Float64)?
        .f64()?
        .into_iter()
        .map(|cell| Some(cell.unwrap_or(value)))
        .collect::<Float64Chunked>()
        .into_series())
}

/// Rewrites every text cell exactly equal to `from` to `to`. Returns the new
/// series and the number of cells rewritten; a non-text series cannot hold
/// `from` and comes back unchanged.
pub fn replace_text(series: &Series, from: &str, to: &str) -> (Series, usize) {
    let Ok(cells) = series.str() else {
        return (series.clone(), 0);
    };
    let mut replaced = 0;
    let out = cells
        .into_iter()
        .map(|cell| match cell {
            Some(s) if s == from => {
                replaced += 1;
                Some(to)
            }
            other => other,
        })
        .collect::<StringChunked>()
        .with_name(series.name().clone())
        .into_series();
    (out, replaced)
}

/// Per-call rendering options for [`render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayOptions {
    /// Columns shown before eliding the middle ones; 0 shows every column.
    pub max_columns: usize,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self { max_columns: 36 }
    }
}

/// Renders the frame as an aligned text table with a leading row index.
/// Nulls show as `NaN`.
pub fn render(frame: &DataFrame, options: &DisplayOptions) -> Result<String> {
    let columns = frame.get_columns();
    let slots = visible_columns(columns.len(), options.max_columns);
    let cells = slots
        .iter()
        .map(|slot| {
            slot.map(|idx| series_texts(columns[idx].as_materialized_series()))
                .transpose()
        })
        .collect::<Result<Vec<_>>>()?;

    let mut grid = Vec::with_capacity(frame.height() + 1);
    grid.push(
        std::iter::once(String::new())
            .chain(slots.iter().map(|slot| match slot {
                Some(idx) => columns[*idx].name().to_string(),
                None => "...".to_string(),
            }))
            .collect::<Vec<_>>(),
    );
    for row in 0..frame.height() {
        grid.push(
            std::iter::once(row.to_string())
                .chain(cells.iter().map(|column| match column {
                    Some(values) => values[row].clone().unwrap_or_else(|| "NaN".to_string()),
                    None => "...".to_string(),
                }))
                .collect(),
        );
    }

    let widths: Vec<usize> = (0..=slots.len())
        .map(|c| grid.iter().map(|r| r[c].chars().count()).max().unwrap_or(0))
        .collect();

    let mut out = String::new();
    for row in &grid {
        let line = row
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(c, (text, &w))| {
                if c == 0 {
                    format!("{text:<w$}")
                } else {
                    format!("{text:>w$}")
                }
            })
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(line.trim_end());
        out.push('\n');
    }
    Ok(out)
}

/// Column indices to show; `None` marks the elided middle.
fn visible_columns(width: usize, max_columns: usize) -> Vec<Option<usize>> {
    if max_columns == 0 || width <= max_columns {
        return (0..width).map(Some).collect();
    }
    let left = max_columns.div_ceil(2);
    let right = max_columns / 2;
    (0..left)
        .map(Some)
        .chain(std::iter::once(None))
        .chain((width - right..width).map(Some))
        .collect()
}
