//! Text report written to standard output (or any writer).

use polars::prelude::*;
use std::io::Write;

use crate::analyzers::GroupRate;
use crate::error::Result;
use crate::frame::{DisplayOptions, null_counts, render};

/// Closing business recommendations, printed as-is at the end of every run.
pub const RECOMMENDATIONS: &str = "\
1. Contract and Transient bookings are canceled most often; ask these customers for a deposit to reduce the risk.
2. Bookings made more than 100 days ahead are canceled markedly more often; consider a tiered cancellation and change policy.
3. The City Hotel has more guests in spring and autumn, the Resort Hotel has fewer guests from June to September, and both hotels see the fewest guests in winter.
";

/// Formats a rate in [0, 1] as a percentage with two decimals.
pub fn format_percent(rate: f64) -> String {
    format!("{:.2}%", rate * 100.0)
}

/// Writes the report sections in the order they are called.
pub struct Reporter<W: Write> {
    out: W,
    display: DisplayOptions,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, display: DisplayOptions) -> Self {
        Self { out, display }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn dataset_shape(&mut self, frame: &DataFrame) -> Result<()> {
        let (rows, columns) = frame.shape();
        writeln!(self.out, "Dataset shape: ({rows}, {columns})")?;
        Ok(())
    }

    pub fn head(&mut self, frame: &DataFrame, rows: usize) -> Result<()> {
        writeln!(self.out, "\nFirst {rows} rows:")?;
        write!(self.out, "{}", render(&frame.head(Some(rows)), &self.display)?)?;
        Ok(())
    }

    pub fn missing_values(&mut self, frame: &DataFrame) -> Result<()> {
        let counts = null_counts(frame);
        let width = counts.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
        writeln!(self.out, "\nMissing values per column:")?;
        for (name, count) in counts {
            writeln!(self.out, "{name:<width$}  {count}")?;
        }
        Ok(())
    }

    pub fn cleaned_shape(&mut self, frame: &DataFrame) -> Result<()> {
        let (rows, columns) = frame.shape();
        writeln!(self.out, "\nCleaned dataset shape: ({rows}, {columns})")?;
        Ok(())
    }

    pub fn overall_rate(&mut self, rate: f64) -> Result<()> {
        writeln!(self.out, "\nOverall cancellation rate: {}", format_percent(rate))?;
        Ok(())
    }

    /// Renders one row per group: key columns, total, canceled and rate.
    pub fn group_rates(&mut self, group_by: &[&str], groups: &[GroupRate]) -> Result<()> {
        let mut columns: Vec<Column> = group_by
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let keys: Vec<&str> = groups
                    .iter()
                    .map(|g| g.keys.get(idx).map_or("", String::as_str))
                    .collect();
                Column::new((*name).into(), keys)
            })
            .collect();
        let totals: Vec<u64> = groups.iter().map(|g| g.total as u64).collect();
        let canceled: Vec<u64> = groups.iter().map(|g| g.canceled as u64).collect();
        let rates: Vec<String> = groups.iter().map(|g| format_percent(g.rate)).collect();
        columns.push(Column::new("total".into(), totals));
        columns.push(Column::new("canceled".into(), canceled));
        columns.push(Column::new("cancel_rate".into(), rates));
        let table = DataFrame::new(columns)?;

        writeln!(self.out, "\nCancellation rate by {}:", group_by.join(" and "))?;
        write!(self.out, "{}", render(&table, &DisplayOptions { max_columns: 0 })?)?;
        Ok(())
    }

    pub fn recommendations(&mut self) -> Result<()> {
        writeln!(self.out, "\nRecommendations:")?;
        write!(self.out, "{RECOMMENDATIONS}")?;
        self.out.flush()?;
        Ok(())
    }
}
