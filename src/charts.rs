//! Chart hand-off.
//!
//! Charts are described as data plus labels and passed to a [`ChartSink`];
//! rendering is left to whatever sits behind the sink. [`FileChartSink`]
//! writes each chart as a JSON description and a long-format CSV table.

use csv::WriterBuilder;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::analyzers::{BoxSummary, LeadTimeSplit, MonthlyVolume};
use crate::error::Result;

/// Series colors, assigned in series order and cycled.
pub const PALETTE: &[&str] = &["#1f77b4", "#ff7f0e"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxGroup {
    pub label: String,
    pub values: Vec<f64>,
    /// `None` when the group is empty.
    pub summary: Option<BoxSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxPlot {
    pub slug: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub groups: Vec<BoxGroup>,
}

impl BoxPlot {
    /// Lead time (y) per cancellation outcome (x), non-canceled first.
    pub fn lead_time(split: &LeadTimeSplit) -> Self {
        let group = |label: &str, values: &[f64]| BoxGroup {
            label: label.to_string(),
            values: values.to_vec(),
            summary: BoxSummary::from_values(values),
        };
        Self {
            slug: "lead_time_by_cancellation".to_string(),
            title: "Lead time vs. booking cancellation".to_string(),
            x_label: "Canceled (0 = no, 1 = yes)".to_string(),
            y_label: "Lead time (days)".to_string(),
            groups: vec![
                group("0", &split.not_canceled),
                group("1", &split.canceled),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinePoint {
    pub x: String,
    /// Missing points leave a gap in the line.
    pub y: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeries {
    pub name: String,
    pub color: String,
    pub points: Vec<LinePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinePlot {
    pub slug: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Degrees to rotate x tick labels by.
    pub x_tick_rotation: u16,
    pub series: Vec<LineSeries>,
}

impl LinePlot {
    /// Month (x) against booking volume (y), one series per hotel. Series
    /// are ordered by name, so each hotel keeps its color whatever the data
    /// order.
    pub fn monthly(volume: &MonthlyVolume) -> Self {
        let mut named: Vec<(String, Vec<LinePoint>)> = Vec::new();
        let mut push = |name: &str, point: LinePoint| match named.iter_mut().find(|(n, _)| n == name) {
            Some((_, points)) => points.push(point),
            None => named.push((name.to_string(), vec![point])),
        };

        let (slug, title) = match volume {
            MonthlyVolume::AverageAcrossYears(points) => {
                for p in points {
                    push(
                        &p.hotel,
                        LinePoint {
                            x: p.month.clone(),
                            y: p.guests,
                        },
                    );
                }
                ("monthly_average_guests", "Average monthly guests by hotel")
            }
            MonthlyVolume::Chronological(points) => {
                for p in points {
                    push(
                        p.hotel.as_deref().unwrap_or("All hotels"),
                        LinePoint {
                            x: p.period.format("%Y-%m").to_string(),
                            y: Some(p.bookings as f64),
                        },
                    );
                }
                ("monthly_booking_trend", "Monthly bookings over time")
            }
        };

        named.sort_by(|a, b| a.0.cmp(&b.0));
        let series = named
            .into_iter()
            .enumerate()
            .map(|(idx, (name, points))| LineSeries {
                name,
                color: PALETTE[idx % PALETTE.len()].to_string(),
                points,
            })
            .collect();

        Self {
            slug: slug.to_string(),
            title: title.to_string(),
            x_label: "Month".to_string(),
            y_label: "Bookings".to_string(),
            x_tick_rotation: 45,
            series,
        }
    }
}

/// Receives chart descriptions for rendering.
pub trait ChartSink {
    fn box_plot(&mut self, chart: &BoxPlot) -> Result<()>;
    fn line_plot(&mut self, chart: &LinePlot) -> Result<()>;
}

/// Discards every chart.
#[derive(Debug, Default)]
pub struct NoopChartSink;

impl ChartSink for NoopChartSink {
    fn box_plot(&mut self, chart: &BoxPlot) -> Result<()> {
        debug!(slug = %chart.slug, "Box plot skipped");
        Ok(())
    }

    fn line_plot(&mut self, chart: &LinePlot) -> Result<()> {
        debug!(slug = %chart.slug, "Line plot skipped");
        Ok(())
    }
}

/// Writes `<slug>.json` (the chart description) and `<slug>.csv` (its data
/// in long format) into a directory.
#[derive(Debug)]
pub struct FileChartSink {
    dir: PathBuf,
}

#[derive(Serialize)]
struct BoxRow<'a> {
    group: &'a str,
    value: f64,
}

#[derive(Serialize)]
struct LineRow<'a> {
    series: &'a str,
    x: &'a str,
    y: Option<f64>,
}

impl FileChartSink {
    /// Creates `dir` if it does not exist yet.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write_json(&self, slug: &str, chart: &impl Serialize) -> Result<()> {
        let path = self.dir.join(format!("{slug}.json"));
        fs::write(&path, serde_json::to_string_pretty(chart)?)?;
        info!(path = %path.display(), "Chart written");
        Ok(())
    }

    fn write_rows<T: Serialize>(&self, slug: &str, rows: impl IntoIterator<Item = T>) -> Result<()> {
        let path = self.dir.join(format!("{slug}.csv"));
        let mut writer = WriterBuilder::new().has_headers(true).from_path(&path)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        debug!(path = %path.display(), "Chart data written");
        Ok(())
    }
}

impl ChartSink for FileChartSink {
    fn box_plot(&mut self, chart: &BoxPlot) -> Result<()> {
        self.write_json(&chart.slug, chart)?;
        self.write_rows(
            &chart.slug,
            chart.groups.iter().flat_map(|g| {
                g.values.iter().map(move |&value| BoxRow {
                    group: &g.label,
                    value,
                })
            }),
        )
    }

    fn line_plot(&mut self, chart: &LinePlot) -> Result<()> {
        self.write_json(&chart.slug, chart)?;
        self.write_rows(
            &chart.slug,
            chart.series.iter().flat_map(|s| {
                s.points.iter().map(move |p| LineRow {
                    series: &s.name,
                    x: &p.x,
                    y: p.y,
                })
            }),
        )
    }
}
