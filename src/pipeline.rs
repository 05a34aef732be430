//! The analysis run: load, clean, aggregate, report.

use polars::prelude::DataFrame;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::analyzers::{
    GroupRate, MonthlyVolume, cancellation_by_group, lead_time_by_outcome, monthly_volume,
    overall_cancellation_rate,
};
use crate::charts::{BoxPlot, ChartSink, LinePlot};
use crate::cleaner::{CleaningReport, clean};
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::frame::null_counts;
use crate::loader::load_csv;
use crate::report::Reporter;

/// Everything a run computed, for machine consumption.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisSummary {
    pub raw_shape: (usize, usize),
    pub cleaned_shape: (usize, usize),
    pub missing_values: Vec<(String, usize)>,
    pub cleaning: CleaningReport,
    pub overall_cancellation_rate: f64,
    pub group_by: Vec<String>,
    pub group_rates: Vec<GroupRate>,
    pub monthly: MonthlyVolume,
}

/// Loads `config.input` and runs the analysis on it.
#[tracing::instrument(skip_all, fields(input = %config.input.display()))]
pub fn run<W: Write>(
    config: &AnalysisConfig,
    reporter: &mut Reporter<W>,
    charts: &mut dyn ChartSink,
) -> Result<AnalysisSummary> {
    let raw = load_csv(&config.input, config.delimiter_byte()?)?;
    analyze(&raw, config, reporter, charts)
}

/// Runs every stage after loading on an already loaded table.
///
/// Stdout sections come out in a fixed order: raw shape, preview, missing
/// values, cleaned shape, overall rate, grouped rates, recommendations.
pub fn analyze<W: Write>(
    raw: &DataFrame,
    config: &AnalysisConfig,
    reporter: &mut Reporter<W>,
    charts: &mut dyn ChartSink,
) -> Result<AnalysisSummary> {
    reporter.dataset_shape(raw)?;
    reporter.head(raw, config.head_rows)?;
    reporter.missing_values(raw)?;

    let cleaned = clean(raw, &config.cleaning)?;
    let frame = &cleaned.frame;
    reporter.cleaned_shape(frame)?;

    let overall = overall_cancellation_rate(frame)?;
    reporter.overall_rate(overall)?;
    info!(rate = overall, "Overall cancellation rate");

    let group_by = config.group_columns();
    let group_rates = cancellation_by_group(frame, &group_by)?;
    reporter.group_rates(&group_by, &group_rates)?;

    let lead_times = lead_time_by_outcome(frame)?;
    charts.box_plot(&BoxPlot::lead_time(&lead_times))?;

    let monthly = monthly_volume(frame, config.monthly_policy, config.split_trend_by_hotel)?;
    charts.line_plot(&LinePlot::monthly(&monthly))?;

    reporter.recommendations()?;

    Ok(AnalysisSummary {
        raw_shape: raw.shape(),
        cleaned_shape: frame.shape(),
        missing_values: null_counts(raw),
        cleaning: cleaned.report,
        overall_cancellation_rate: overall,
        group_by: config.group_by.clone(),
        group_rates,
        monthly,
    })
}

/// Writes the summary as pretty-printed JSON.
pub fn write_summary(path: impl AsRef<Path>, summary: &AnalysisSummary) -> Result<()> {
    std::fs::write(path.as_ref(), serde_json::to_string_pretty(summary)?)?;
    info!(path = %path.as_ref().display(), "Summary written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::MonthlyPolicy;
    use crate::charts::NoopChartSink;
    use crate::error::AnalysisError;
    use crate::frame::DisplayOptions;
    use crate::loader::load_from_reader;
    use std::env;
    use std::fs;

    const DATA: &str = "\
hotel,is_canceled,lead_time,arrival_date_year,arrival_date_month,adults,children,babies,meal,country,agent,company,customer_type
Resort Hotel,0,342,2015,July,2,0,0,BB,PRT,NULL,NULL,Transient
Resort Hotel,1,737,2015,July,2,NA,0,Undefined,NULL,304,NULL,Contract
City Hotel,0,7,2016,August,0,0,0,BB,GBR,9,NULL,Transient
City Hotel,1,13,2016,March,1,0,0,HB,GBR,9,40,Transient-Party
";

    fn run_on(data: &str, config: &AnalysisConfig) -> Result<(AnalysisSummary, String)> {
        let raw = load_from_reader(data.as_bytes(), b',')?;
        let mut reporter = Reporter::new(Vec::new(), DisplayOptions::default());
        let summary = analyze(&raw, config, &mut reporter, &mut NoopChartSink)?;
        Ok((summary, String::from_utf8(reporter.into_inner()).unwrap()))
    }

    #[test]
    fn test_summary_matches_cleaned_table() {
        let (summary, _) = run_on(DATA, &AnalysisConfig::default()).unwrap();

        assert_eq!(summary.raw_shape, (4, 13));
        assert_eq!(summary.cleaned_shape, (3, 13));
        assert_eq!(summary.cleaning.dropped_rows, 1);
        assert_eq!(summary.cleaning.meal_rewritten, 1);
        assert_eq!(summary.overall_cancellation_rate, 2.0 / 3.0);
        assert_eq!(
            summary.group_rates.iter().map(|g| g.total).sum::<usize>(),
            summary.cleaned_shape.0
        );
        assert!(matches!(summary.monthly, MonthlyVolume::AverageAcrossYears(_)));
    }

    #[test]
    fn test_report_sections_in_order() {
        let (_, out) = run_on(DATA, &AnalysisConfig::default()).unwrap();

        let sections = [
            "Dataset shape: (4, 13)",
            "First 3 rows:",
            "Missing values per column:",
            "Cleaned dataset shape: (3, 13)",
            "Overall cancellation rate: 66.67%",
            "Cancellation rate by customer_type:",
            "Recommendations:",
        ];
        let positions: Vec<_> = sections.iter().map(|s| out.find(s).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_chronological_policy() {
        let config = AnalysisConfig {
            monthly_policy: MonthlyPolicy::Chronological,
            split_trend_by_hotel: false,
            ..Default::default()
        };
        let (summary, _) = run_on(DATA, &config).unwrap();
        match summary.monthly {
            MonthlyVolume::Chronological(points) => {
                assert_eq!(points.len(), 2);
                assert_eq!(points[0].bookings, 2);
            }
            other => panic!("unexpected volume: {other:?}"),
        }
    }

    #[test]
    fn test_schema_mismatch_aborts_run() {
        let data = "hotel,is_canceled\nCity Hotel,0\n";
        let err = run_on(data, &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::Schema { .. }));
    }

    #[test]
    fn test_write_summary_json() {
        let (summary, _) = run_on(DATA, &AnalysisConfig::default()).unwrap();
        let path = env::temp_dir().join("hotel_booking_analysis_summary.json");

        write_summary(&path, &summary).unwrap();
        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed["cleaned_shape"][0], 3);
        assert_eq!(parsed["monthly"]["policy"], "average_across_years");

        fs::remove_file(&path).unwrap();
    }
}
