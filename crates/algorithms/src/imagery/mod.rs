//! Imagery analysis
//!
//! - Spectral indices: vegetation (NDVI) and water (NDWI)
//! - Water masking from the water index
//! - Soil / vegetation classification and class maps
//! - Index histograms

mod classify;
mod engine;
mod histogram;
mod indices;
mod water;

pub use classify::{
    class_map, classify_pixel, classify_scene, Classifier, ClassifyParams, PixelClass,
    SceneClassification,
};
pub use engine::{IndexEngine, SceneIndices};
pub use histogram::{index_histogram, IndexHistogram};
pub use indices::{normalized_difference, spectral_index, vegetation_index, water_index, SpectralIndex};
pub use water::{water_mask, WaterMaskParams};
