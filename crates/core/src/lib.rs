//! # greentrend core
//!
//! Core types and I/O for greentrend.
//!
//! This crate provides:
//! - `Raster<T>`: generic 2D raster plane
//! - `IndexMap` / `WaterMask`: per-pixel index values and exclusion masks
//! - `RawScene` / `RasterScene`: four-band scenes before and after
//!   validation and normalization
//! - I/O for scene images, XML sidecars and directory discovery

pub mod error;
pub mod io;
pub mod raster;
pub mod scene;

pub use error::{Error, Result};
pub use raster::{IndexMap, IndexPixel, Raster, RasterElement, WaterMask};
pub use scene::{Band, BandSet, NormalizeParams, RasterScene, RawScene};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::raster::{IndexMap, IndexPixel, Raster, RasterElement, WaterMask};
    pub use crate::scene::{Band, BandSet, NormalizeParams, RasterScene, RawScene};
}
