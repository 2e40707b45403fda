//! # greentrend algorithms
//!
//! Analysis stages for four-band scene time series.
//!
//! - **imagery**: vegetation and water indices, water masking, soil /
//!   vegetation classification
//! - **temporal**: date-ordered series and rate-of-change trends
//! - **pipeline**: scene-by-scene orchestration of the above

pub mod imagery;
pub(crate) mod maybe_rayon;
pub mod pipeline;
pub mod temporal;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::imagery::{
        class_map, classify_scene, index_histogram, normalized_difference, spectral_index,
        vegetation_index, water_index, water_mask, Classifier, ClassifyParams, IndexEngine,
        IndexHistogram, PixelClass, SceneClassification, SceneIndices, SpectralIndex,
        WaterMaskParams,
    };
    pub use crate::pipeline::{
        DroppedScene, Pipeline, PipelineConfig, SceneAnalysis, SceneOutcome, SeriesAnalysis,
    };
    pub use crate::temporal::{
        estimate_trend, TimeSeries, TrendDirection, TrendEstimator, TrendMetric, TrendResult,
        TrendSample,
    };
    pub use greentrend_core::prelude::*;
}
