//! Rate-of-change trend over a dated series
//!
//! Each consecutive pair of samples gives one rate, `Δvalue / Δdays`. The
//! trend is the mean of those rates, its uncertainty their sample standard
//! deviation, and it is significant when `|mean| > uncertainty`.

use std::fmt;

use chrono::NaiveDate;
use greentrend_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::series::TimeSeries;
use crate::imagery::SceneClassification;

/// Minimum number of samples for a trend
const MIN_SAMPLES: usize = 2;

/// Per-scene quantity a trend is computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendMetric {
    /// Fraction of classifiable pixels that are vegetation
    VegetationProportion,
    /// Fraction of classifiable pixels that are soil
    SoilProportion,
    /// Median vegetation index of unmasked pixels
    MedianIndex,
}

impl TrendMetric {
    pub const ALL: [TrendMetric; 3] = [
        TrendMetric::VegetationProportion,
        TrendMetric::SoilProportion,
        TrendMetric::MedianIndex,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TrendMetric::VegetationProportion => "vegetation proportion",
            TrendMetric::SoilProportion => "soil proportion",
            TrendMetric::MedianIndex => "median NDVI",
        }
    }

    /// Value of this metric for one scene
    pub fn value(self, record: &SceneClassification) -> Option<f64> {
        match self {
            TrendMetric::VegetationProportion => Some(record.vegetation_proportion()),
            TrendMetric::SoilProportion => Some(record.soil_proportion()),
            TrendMetric::MedianIndex => record.median_vegetation_index(),
        }
    }

    /// +1 when a rising value means greening, -1 when it means browning
    fn greening_sign(self) -> f64 {
        match self {
            TrendMetric::SoilProportion => -1.0,
            TrendMetric::VegetationProportion | TrendMetric::MedianIndex => 1.0,
        }
    }
}

impl fmt::Display for TrendMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Verdict of a trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Greening,
    Browning,
    NoSignificantChange,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrendDirection::Greening => "greening",
            TrendDirection::Browning => "browning",
            TrendDirection::NoSignificantChange => "no significant change",
        };
        f.write_str(s)
    }
}

/// One dated value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendSample {
    pub date: NaiveDate,
    pub value: f64,
}

/// Result of [`estimate_trend`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendResult {
    metric: TrendMetric,
    mean_rate_per_day: f64,
    rate_per_day_uncertainty: f64,
    is_significant: bool,
    direction: TrendDirection,
    intervals: usize,
    span_days: i64,
}

impl TrendResult {
    pub fn metric(&self) -> TrendMetric {
        self.metric
    }

    /// Mean of the per-interval rates, in metric units per day
    pub fn mean_rate_per_day(&self) -> f64 {
        self.mean_rate_per_day
    }

    /// Sample standard deviation of the per-interval rates
    pub fn rate_per_day_uncertainty(&self) -> f64 {
        self.rate_per_day_uncertainty
    }

    pub fn is_significant(&self) -> bool {
        self.is_significant
    }

    pub fn direction(&self) -> TrendDirection {
        self.direction
    }

    /// Number of consecutive-sample intervals
    pub fn intervals(&self) -> usize {
        self.intervals
    }

    /// Days between the first and last sample
    pub fn span_days(&self) -> i64 {
        self.span_days
    }
}

/// Estimate the trend of dated samples.
///
/// # Errors
/// * `InsufficientSeriesLength` with fewer than two samples
/// * `NonMonotonicDate` when a date does not follow its predecessor
pub fn estimate_trend(samples: &[TrendSample], metric: TrendMetric) -> Result<TrendResult> {
    if samples.len() < MIN_SAMPLES {
        return Err(Error::InsufficientSeriesLength {
            len: samples.len(),
            required: MIN_SAMPLES,
        });
    }

    let rates = samples
        .windows(2)
        .enumerate()
        .map(|(i, pair)| {
            let (prev, cur) = (pair[0], pair[1]);
            let days = (cur.date - prev.date).num_days();
            if days <= 0 {
                return Err(Error::NonMonotonicDate {
                    index: i + 1,
                    previous: prev.date,
                    current: cur.date,
                });
            }
            Ok((cur.value - prev.value) / days as f64)
        })
        .collect::<Result<Vec<f64>>>()?;

    let n = rates.len();
    let (mean, uncertainty) = if rates.iter().all(|&r| r == rates[0]) {
        // identical rates: exact mean, no dispersion
        (rates[0], 0.0)
    } else {
        let mean = rates.iter().sum::<f64>() / n as f64;
        let var = rates.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        (mean, var.sqrt())
    };

    let is_significant = mean.abs() > uncertainty;
    let direction = if !is_significant {
        TrendDirection::NoSignificantChange
    } else if mean * metric.greening_sign() > 0.0 {
        TrendDirection::Greening
    } else {
        TrendDirection::Browning
    };

    let span_days = (samples[samples.len() - 1].date - samples[0].date).num_days();

    debug!(
        "Trend of {}: {:.6} ± {:.6} per day over {} intervals ({})",
        metric, mean, uncertainty, n, direction
    );

    Ok(TrendResult {
        metric,
        mean_rate_per_day: mean,
        rate_per_day_uncertainty: uncertainty,
        is_significant,
        direction,
        intervals: n,
        span_days,
    })
}

/// Trend estimator bound to one metric
#[derive(Debug, Clone, Copy)]
pub struct TrendEstimator {
    metric: TrendMetric,
}

impl TrendEstimator {
    pub fn new(metric: TrendMetric) -> Self {
        Self { metric }
    }

    pub fn metric(&self) -> TrendMetric {
        self.metric
    }

    pub fn estimate(&self, series: &TimeSeries) -> Result<TrendResult> {
        estimate_trend(&series.samples(self.metric), self.metric)
    }
}

impl Default for TrendEstimator {
    fn default() -> Self {
        Self::new(TrendMetric::VegetationProportion)
    }
}
