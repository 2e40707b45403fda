//! Run summary written as `summary.json`

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use greentrend_algorithms::imagery::{IndexHistogram, SceneClassification};
use greentrend_algorithms::pipeline::{DroppedScene, PipelineConfig, SeriesAnalysis};
use greentrend_algorithms::temporal::TrendResult;

pub const SUMMARY_FILE: &str = "summary.json";

#[derive(Debug, Serialize)]
pub struct ConfigReport {
    pub veg_low: f64,
    pub water_threshold: f64,
    pub water_mask: bool,
    pub raw_max: Option<f64>,
    pub reflectance: bool,
    pub strict_shape: bool,
}

impl From<&PipelineConfig> for ConfigReport {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            veg_low: config.classify.veg_low,
            water_threshold: config.water.threshold,
            water_mask: config.water.enabled,
            raw_max: config.normalize.raw_max,
            reflectance: config.normalize.use_reflectance,
            strict_shape: config.strict_shape,
        }
    }
}

/// One scene as seen by the observer
#[derive(Debug, Serialize)]
pub struct SceneReport {
    pub date: NaiveDate,
    pub rows: usize,
    pub cols: usize,
    pub water_pixels: usize,
    pub classification: Option<SceneClassification>,
    pub ndvi_histogram: IndexHistogram,
}

#[derive(Debug, Serialize)]
pub struct Summary<'a> {
    pub generated_at: DateTime<Utc>,
    pub config: ConfigReport,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub span_days: i64,
    pub scenes: &'a [SceneReport],
    pub dropped: &'a [DroppedScene],
    pub trend: &'a [TrendResult],
}

impl<'a> Summary<'a> {
    pub fn new(config: &PipelineConfig, analysis: &'a SeriesAnalysis, scenes: &'a [SceneReport]) -> Self {
        Self {
            generated_at: Utc::now(),
            config: config.into(),
            first_date: analysis.series.first_date(),
            last_date: analysis.series.last_date(),
            span_days: analysis.series.span_days(),
            scenes,
            dropped: &analysis.dropped,
            trend: &analysis.trend,
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}
