//! Index maps, masks and class rasters to RGBA buffers

use greentrend_core::raster::{IndexMap, IndexPixel, Raster, WaterMask};

use crate::scheme::{class_color, evaluate, ColorScheme, Rgb};

/// Parameters for index rendering.
#[derive(Debug, Clone)]
pub struct ColormapParams {
    pub scheme: ColorScheme,
    /// Value mapped to the start of the scheme. Lower values are clamped.
    pub min: f64,
    /// Value mapped to the end of the scheme. Higher values are clamped.
    pub max: f64,
    /// RGBA for undefined pixels. Default: fully transparent.
    pub undefined_color: [u8; 4],
}

impl ColormapParams {
    /// Full index range `[-1, 1]`
    pub fn new(scheme: ColorScheme) -> Self {
        Self::with_range(scheme, -1.0, 1.0)
    }

    pub fn with_range(scheme: ColorScheme, min: f64, max: f64) -> Self {
        Self {
            scheme,
            min,
            max,
            undefined_color: [0, 0, 0, 0],
        }
    }
}

/// RGBA buffer (`rows * cols * 4`, row-major) of an index map.
pub fn index_to_rgba(map: &IndexMap, params: &ColormapParams) -> Vec<u8> {
    let range = params.max - params.min;
    let inv_range = if range.abs() > f64::EPSILON { 1.0 / range } else { 1.0 };

    map.pixels()
        .flat_map(|pixel| match pixel {
            IndexPixel::Defined(v) => evaluate(params.scheme, (v - params.min) * inv_range).to_rgba(255),
            IndexPixel::Undefined => params.undefined_color,
        })
        .collect()
}

/// Masked pixels in `color`, the rest transparent.
pub fn mask_to_rgba(mask: &WaterMask, color: Rgb) -> Vec<u8> {
    mask.data()
        .iter()
        .flat_map(|&masked| if masked { color.to_rgba(255) } else { [0, 0, 0, 0] })
        .collect()
}

/// Class codes through the class palette; code 0 is transparent.
pub fn classes_to_rgba(classes: &Raster<u8>) -> Vec<u8> {
    classes
        .data()
        .iter()
        .flat_map(|&code| match code {
            0 => [0, 0, 0, 0],
            c => class_color(c).to_rgba(255),
        })
        .collect()
}
