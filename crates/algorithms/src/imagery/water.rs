//! Water masking from the water index

use crate::maybe_rayon::*;
use greentrend_core::raster::{IndexMap, IndexPixel, WaterMask};
use greentrend_core::{Error, Result};

/// Parameters for water masking
#[derive(Debug, Clone, PartialEq)]
pub struct WaterMaskParams {
    /// Water index above which a pixel is water, in `[-1, 1]`.
    /// Default: 0.0
    pub threshold: f64,
    /// When false no pixel is masked.
    /// Default: true
    pub enabled: bool,
}

impl Default for WaterMaskParams {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            enabled: true,
        }
    }
}

impl WaterMaskParams {
    pub fn validate(&self) -> Result<()> {
        if !(-1.0..=1.0).contains(&self.threshold) {
            return Err(Error::InvalidParameter {
                name: "water_threshold",
                value: self.threshold.to_string(),
                reason: "must be within [-1, 1]".into(),
            });
        }
        Ok(())
    }
}

/// Flag pixels whose water index exceeds `threshold`.
///
/// The comparison is strict. Undefined pixels are never water; the
/// vegetation index excludes them on its own.
pub fn water_mask(water_index: &IndexMap, threshold: f64) -> Result<WaterMask> {
    let (rows, cols) = water_index.shape();
    let data = water_index.data();

    let flags: Vec<bool> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            (0..cols)
                .map(|col| matches!(data[[row, col]], IndexPixel::Defined(v) if v > threshold))
                .collect::<Vec<_>>()
        })
        .collect();

    WaterMask::from_vec(flags, rows, cols)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_index(values: &[Option<f64>], rows: usize, cols: usize) -> IndexMap {
        IndexMap::from_values(values, rows, cols).unwrap()
    }

    #[test]
    fn test_threshold_is_strict() {
        let index = make_index(&[Some(-0.5), Some(0.0), Some(0.01), Some(0.8)], 2, 2);
        let mask = water_mask(&index, 0.0).unwrap();

        assert!(!mask.is_masked(0, 0).unwrap());
        assert!(!mask.is_masked(0, 1).unwrap());
        assert!(mask.is_masked(1, 0).unwrap());
        assert!(mask.is_masked(1, 1).unwrap());
        assert_eq!(mask.masked_count(), 2);
    }

    #[test]
    fn test_undefined_is_not_water() {
        let index = make_index(&[None, Some(0.9)], 1, 2);
        let mask = water_mask(&index, 0.3).unwrap();

        assert!(!mask.is_masked(0, 0).unwrap());
        assert!(mask.is_masked(0, 1).unwrap());
    }

    #[test]
    fn test_mask_keeps_shape() {
        let index = make_index(&[Some(0.1); 12], 3, 4);
        assert_eq!(water_mask(&index, 0.5).unwrap().shape(), (3, 4));
    }

    #[test]
    fn test_params_validation() {
        assert!(WaterMaskParams::default().validate().is_ok());
        let params = WaterMaskParams {
            threshold: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(Error::InvalidParameter { name: "water_threshold", .. })
        ));
    }
}
