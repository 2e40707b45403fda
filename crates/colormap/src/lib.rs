//! # greentrend colormap
//!
//! Colour schemes and PNG rendering of index maps, water masks, class
//! rasters and series charts. [`index_to_rgba`] maps an [`IndexMap`](greentrend_core::IndexMap)
//! through a [`ColorScheme`] into a row-major RGBA buffer that
//! [`write_png`] saves.
//!
//! ## Usage
//!
//! ```ignore
//! use greentrend_colormap::{index_to_rgba, write_png, ColorScheme, ColormapParams};
//!
//! let rgba = index_to_rgba(&ndvi, &ColormapParams::new(ColorScheme::Ndvi));
//! write_png("ndvi.png", rgba, ndvi.cols(), ndvi.rows())?;
//! ```

mod chart;
mod png;
mod render;
mod scheme;

pub use chart::{line_chart_rgba, ChartLine};
pub use png::write_png;
pub use render::{classes_to_rgba, index_to_rgba, mask_to_rgba, ColormapParams};
pub use scheme::{class_color, evaluate, ColorScheme, ColorStop, Rgb, CLASS_PALETTE};
