//! Raster planes: generic numeric grids, index maps and masks

mod element;
mod grid;
mod index_map;
mod mask;

pub use element::RasterElement;
pub use grid::Raster;
pub use index_map::{IndexMap, IndexPixel};
pub use mask::WaterMask;
