//! Run configuration.
//!
//! Every field has a default, so an empty JSON object (or no file at all) is
//! a valid configuration:
//! ```json
//! {
//!   "input": "hotel_bookings.csv",
//!   "group_by": ["customer_type", "hotel"],
//!   "monthly_policy": "chronological"
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::analyzers::MonthlyPolicy;
use crate::cleaner::CleaningPlan;
use crate::error::{AnalysisError, Result};
use crate::frame::DisplayOptions;
use crate::schema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub input: PathBuf,
    pub delimiter: char,
    /// Rows shown in the preview of the loaded table.
    pub head_rows: usize,
    pub display: DisplayOptions,
    pub cleaning: CleaningPlan,
    /// Columns the cancellation rate is grouped by.
    pub group_by: Vec<String>,
    pub monthly_policy: MonthlyPolicy,
    /// Split the chronological trend per hotel.
    pub split_trend_by_hotel: bool,
    /// Where chart files go; `None` disables chart output.
    pub chart_dir: Option<PathBuf>,
    /// Where to write the JSON run summary, if anywhere.
    pub summary_json: Option<PathBuf>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("hotel_bookings.csv"),
            delimiter: ',',
            head_rows: 3,
            display: DisplayOptions::default(),
            cleaning: CleaningPlan::default(),
            group_by: vec![schema::CUSTOMER_TYPE.to_string()],
            monthly_policy: MonthlyPolicy::default(),
            split_trend_by_hotel: true,
            chart_dir: Some(PathBuf::from("charts")),
            summary_json: None,
        }
    }
}

impl AnalysisConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AnalysisError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => AnalysisError::Io(e),
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// The delimiter as the single byte the CSV reader expects.
    pub fn delimiter_byte(&self) -> Result<u8> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                AnalysisError::config(format!("delimiter `{}` is not an ASCII character", self.delimiter))
            })
    }

    pub fn group_columns(&self) -> Vec<&str> {
        self.group_by.iter().map(String::as_str).collect()
    }
}
