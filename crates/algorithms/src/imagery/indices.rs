//! Normalized-difference spectral indices
//!
//! Both indices used here share one formula and one undefined-pixel policy,
//! so there is a single implementation parameterized by band pair.

use crate::maybe_rayon::*;
use greentrend_core::raster::{IndexMap, IndexPixel, Raster};
use greentrend_core::scene::{Band, RasterScene};
use greentrend_core::{Error, Result};
use serde::Serialize;

/// Spectral indices computed per scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SpectralIndex {
    /// NDVI: `(NIR - Red) / (NIR + Red)`
    Vegetation,
    /// NDWI (McFeeters): `(Green - NIR) / (Green + NIR)`
    Water,
}

impl SpectralIndex {
    /// The (positive, negative) band pair of the ratio
    pub fn bands(self) -> (Band, Band) {
        match self {
            SpectralIndex::Vegetation => (Band::Nir, Band::Red),
            SpectralIndex::Water => (Band::Green, Band::Nir),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SpectralIndex::Vegetation => "NDVI",
            SpectralIndex::Water => "NDWI",
        }
    }
}

// ---------------------------------------------------------------------------
// Generic normalized difference
// ---------------------------------------------------------------------------

/// Compute the normalized difference between two bands:
///
/// `(band_a - band_b) / (band_a + band_b)`
///
/// For non-negative inputs every defined pixel lies in `[-1, 1]`. Pixels
/// whose band sum is exactly zero, or where either band is non-finite, are
/// [`IndexPixel::Undefined`].
///
/// # Arguments
/// * `band_a` - Numerator positive band
/// * `band_b` - Numerator negative band
pub fn normalized_difference(band_a: &Raster<f64>, band_b: &Raster<f64>) -> Result<IndexMap> {
    check_dimensions(band_a, band_b)?;

    let (rows, cols) = band_a.shape();
    let a = band_a.data();
    let b = band_b.data();

    let pixels: Vec<IndexPixel> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            (0..cols)
                .map(|col| ratio(a[[row, col]], b[[row, col]]))
                .collect::<Vec<_>>()
        })
        .collect();

    IndexMap::from_vec(pixels, rows, cols)
}

fn ratio(a: f64, b: f64) -> IndexPixel {
    if !a.is_finite() || !b.is_finite() {
        return IndexPixel::Undefined;
    }
    let sum = a + b;
    if sum == 0.0 {
        return IndexPixel::Undefined;
    }
    let value = (a - b) / sum;
    if value.is_finite() {
        IndexPixel::Defined(value)
    } else {
        IndexPixel::Undefined
    }
}

/// Compute `index` from the scene's bands
pub fn spectral_index(scene: &RasterScene, index: SpectralIndex) -> Result<IndexMap> {
    let (a, b) = index.bands();
    normalized_difference(scene.band(a), scene.band(b))
}

/// Normalized Difference Vegetation Index
///
/// Dense vegetation sits around 0.6 to 0.9, bare soil around 0.1 to 0.2 and
/// water below zero.
pub fn vegetation_index(scene: &RasterScene) -> Result<IndexMap> {
    spectral_index(scene, SpectralIndex::Vegetation)
}

/// Normalized Difference Water Index (McFeeters, 1996)
///
/// Positive values indicate open water.
pub fn water_index(scene: &RasterScene) -> Result<IndexMap> {
    spectral_index(scene, SpectralIndex::Water)
}

fn check_dimensions(a: &Raster<f64>, b: &Raster<f64>) -> Result<()> {
    if a.shape() != b.shape() {
        return Err(Error::SizeMismatch {
            expected: a.shape(),
            actual: b.shape(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use greentrend_core::scene::{BandSet, NormalizeParams, RawScene};

    fn make_band(rows: usize, cols: usize, value: f64) -> Raster<f64> {
        Raster::filled(rows, cols, value)
    }

    fn make_gradient(rows: usize, cols: usize, start: f64, step: f64) -> Raster<f64> {
        let mut r = Raster::new(rows, cols);
        for row in 0..rows {
            for col in 0..cols {
                r.set(row, col, start + (row * cols + col) as f64 * step).unwrap();
            }
        }
        r
    }

    fn defined(map: &IndexMap, row: usize, col: usize) -> f64 {
        map.get(row, col).unwrap().value().expect("pixel should be defined")
    }

    #[test]
    fn test_normalized_difference_basic() {
        let a = make_band(5, 5, 0.8);
        let b = make_band(5, 5, 0.2);

        let result = normalized_difference(&a, &b).unwrap();

        // (0.8 - 0.2) / (0.8 + 0.2) = 0.6
        assert_relative_eq!(defined(&result, 2, 2), 0.6, epsilon = 1e-10);
    }

    #[test]
    fn test_normalized_difference_range() {
        let a = make_gradient(10, 10, 0.0, 0.01);
        let b = make_gradient(10, 10, 1.0, -0.01);

        let result = normalized_difference(&a, &b).unwrap();

        for pixel in result.pixels() {
            if let Some(v) = pixel.value() {
                assert!((-1.0..=1.0).contains(&v), "ND out of range: {v}");
            }
        }
        assert_relative_eq!(defined(&result, 0, 0), -1.0);
    }

    #[test]
    fn test_both_zero_is_undefined() {
        let mut a = make_band(3, 3, 0.4);
        let mut b = make_band(3, 3, 0.1);
        a.set(1, 1, 0.0).unwrap();
        b.set(1, 1, 0.0).unwrap();

        let result = normalized_difference(&a, &b).unwrap();
        assert_eq!(result.get(1, 1).unwrap(), IndexPixel::Undefined);
        assert_eq!(result.undefined_count(), 1);
    }

    #[test]
    fn test_single_zero_band_is_defined() {
        let a = make_band(2, 2, 0.5);
        let b = make_band(2, 2, 0.0);

        let result = normalized_difference(&a, &b).unwrap();
        assert_relative_eq!(defined(&result, 0, 0), 1.0);
    }

    #[test]
    fn test_non_finite_is_undefined() {
        let nir = make_band(5, 5, 0.5);
        let mut red = make_band(5, 5, 0.1);
        red.set(0, 0, f64::NAN).unwrap();
        red.set(2, 2, f64::INFINITY).unwrap();

        let result = normalized_difference(&nir, &red).unwrap();
        assert_eq!(result.get(0, 0).unwrap(), IndexPixel::Undefined);
        assert_eq!(result.get(2, 2).unwrap(), IndexPixel::Undefined);
        assert_eq!(result.undefined_count(), 2);
    }

    #[test]
    fn test_tiny_nonzero_sum_is_defined() {
        // 16-bit digital numbers over a very large divisor
        let nir = make_band(2, 2, 3000.0 / 1e12);
        let red = make_band(2, 2, 1000.0 / 1e12);

        let result = normalized_difference(&nir, &red).unwrap();
        assert_eq!(result.undefined_count(), 0);
        assert_relative_eq!(defined(&result, 1, 1), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = make_band(5, 5, 1.0);
        let b = make_band(5, 10, 1.0);

        let result = normalized_difference(&a, &b);
        assert!(matches!(result, Err(Error::SizeMismatch { .. })));
    }

    #[test]
    fn test_scene_indices_use_band_pairs() {
        // blue, green, red, nir as 16-bit digital numbers
        let raw = RawScene::new(
            NaiveDate::from_ymd_opt(2020, 7, 1).unwrap(),
            BandSet {
                blue: make_band(4, 4, 1000.0),
                green: make_band(4, 4, 3000.0),
                red: make_band(4, 4, 1000.0),
                nir: make_band(4, 4, 5000.0),
            },
            16,
        );
        let scene = RasterScene::from_raw(&raw, &NormalizeParams::default()).unwrap();

        let ndvi = vegetation_index(&scene).unwrap();
        let ndwi = water_index(&scene).unwrap();

        assert_eq!(ndvi.shape(), scene.shape());
        assert_relative_eq!(defined(&ndvi, 3, 3), 4000.0 / 6000.0, epsilon = 1e-10);
        assert_relative_eq!(defined(&ndwi, 3, 3), -2000.0 / 8000.0, epsilon = 1e-10);
    }

    #[test]
    fn test_index_band_pairs() {
        assert_eq!(SpectralIndex::Vegetation.bands(), (Band::Nir, Band::Red));
        assert_eq!(SpectralIndex::Water.bands(), (Band::Green, Band::Nir));
    }
}
