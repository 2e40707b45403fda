//! Time series of scene classifications and trend estimation

mod series;
mod trend;

pub use series::TimeSeries;
pub use trend::{estimate_trend, TrendDirection, TrendEstimator, TrendMetric, TrendResult, TrendSample};
