//! Four-band scenes: raw input and validated, normalized scenes
//!
//! A [`RawScene`] is whatever the decoder handed over: digital numbers per
//! band, a bit depth and optionally reflectance coefficients. A
//! [`RasterScene`] is the only form the index and classification stages
//! accept. It is built once by [`RasterScene::from_raw`], which checks the
//! band shapes and scales every band into `[0, 1]`.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::raster::Raster;

/// Spectral bands of a four-band scene, in sensor sample order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Blue,
    Green,
    Red,
    Nir,
}

impl Band {
    /// All bands in sample order
    pub const ALL: [Band; 4] = [Band::Blue, Band::Green, Band::Red, Band::Nir];

    pub fn name(&self) -> &'static str {
        match self {
            Band::Blue => "blue",
            Band::Green => "green",
            Band::Red => "red",
            Band::Nir => "nir",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One value per band.
#[derive(Debug, Clone, PartialEq)]
pub struct BandSet<T> {
    pub blue: T,
    pub green: T,
    pub red: T,
    pub nir: T,
}

impl<T> BandSet<T> {
    pub fn get(&self, band: Band) -> &T {
        match band {
            Band::Blue => &self.blue,
            Band::Green => &self.green,
            Band::Red => &self.red,
            Band::Nir => &self.nir,
        }
    }

    /// Iterate in sample order
    pub fn iter(&self) -> impl Iterator<Item = (Band, &T)> {
        Band::ALL.into_iter().map(move |band| (band, self.get(band)))
    }

    pub fn map<U>(&self, mut f: impl FnMut(Band, &T) -> U) -> BandSet<U> {
        BandSet {
            blue: f(Band::Blue, &self.blue),
            green: f(Band::Green, &self.green),
            red: f(Band::Red, &self.red),
            nir: f(Band::Nir, &self.nir),
        }
    }
}

/// Parameters for scaling raw digital numbers into `[0, 1]`
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeParams {
    /// Divisor overriding the one derived from the scene's bit depth.
    /// Default: `None` (16-bit data divides by 65535)
    pub raw_max: Option<f64>,
    /// Multiply by the scene's reflectance coefficients when it has them.
    /// Default: false
    pub use_reflectance: bool,
}

impl Default for NormalizeParams {
    fn default() -> Self {
        Self {
            raw_max: None,
            use_reflectance: false,
        }
    }
}

impl NormalizeParams {
    pub fn validate(&self) -> Result<()> {
        if let Some(max) = self.raw_max {
            if !(max.is_finite() && max > 0.0) {
                return Err(Error::InvalidParameter {
                    name: "raw_max",
                    value: max.to_string(),
                    reason: "must be a positive finite number".into(),
                });
            }
        }
        Ok(())
    }
}

/// Largest raw value representable with `bit_depth` bits
pub fn max_raw_value(bit_depth: u8) -> Result<f64> {
    if bit_depth == 0 || bit_depth > 32 {
        return Err(Error::InvalidParameter {
            name: "bit_depth",
            value: bit_depth.to_string(),
            reason: "must be between 1 and 32".into(),
        });
    }
    Ok(((1u64 << bit_depth) - 1) as f64)
}

/// A decoded acquisition before validation.
#[derive(Debug, Clone)]
pub struct RawScene {
    pub date: NaiveDate,
    pub bands: BandSet<Raster<f64>>,
    pub bit_depth: u8,
    /// Top-of-atmosphere reflectance coefficient per band
    pub reflectance: Option<BandSet<f64>>,
}

impl RawScene {
    pub fn new(date: NaiveDate, bands: BandSet<Raster<f64>>, bit_depth: u8) -> Self {
        Self {
            date,
            bands,
            bit_depth,
            reflectance: None,
        }
    }

    pub fn with_reflectance(mut self, coefficients: BandSet<f64>) -> Self {
        self.reflectance = Some(coefficients);
        self
    }
}

/// A validated scene with all bands scaled into `[0, 1]`.
///
/// There is no way to build one except [`RasterScene::from_raw`] and no way
/// to modify one afterwards, so every scene is normalized exactly once.
#[derive(Debug, Clone)]
pub struct RasterScene {
    date: NaiveDate,
    bands: BandSet<Raster<f64>>,
}

impl RasterScene {
    /// Validate band shapes and normalize.
    ///
    /// Raw values are divided by the largest value of the scene's bit depth
    /// (or `params.raw_max`), or multiplied by the reflectance coefficients
    /// when requested and present, then clamped into `[0, 1]`. Non-finite
    /// samples become `0.0`. The raw scene is left untouched.
    ///
    /// # Errors
    /// * `ShapeMismatch` when a band's shape differs from the blue band's
    /// * `EmptyScene` when either dimension is zero
    /// * `InvalidParameter` when `params` fails validation
    pub fn from_raw(raw: &RawScene, params: &NormalizeParams) -> Result<Self> {
        params.validate()?;
        let expected = raw.bands.blue.shape();
        for (band, plane) in raw.bands.iter() {
            if plane.shape() != expected {
                return Err(Error::ShapeMismatch {
                    date: Some(raw.date),
                    band,
                    expected,
                    actual: plane.shape(),
                });
            }
        }

        let (rows, cols) = expected;
        if rows == 0 || cols == 0 {
            return Err(Error::EmptyScene {
                date: raw.date,
                rows,
                cols,
            });
        }

        let factors = scale_factors(raw, params)?;
        let bands = raw.bands.map(|band, plane| {
            let factor = *factors.get(band);
            plane.map(move |v| normalize_sample(v, factor))
        });

        debug!("Normalized scene {} ({} x {})", raw.date, cols, rows);
        Ok(Self {
            date: raw.date,
            bands,
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Dimensions as (rows, cols), shared by all bands
    pub fn shape(&self) -> (usize, usize) {
        self.bands.blue.shape()
    }

    pub fn band(&self, band: Band) -> &Raster<f64> {
        self.bands.get(band)
    }

    pub fn bands(&self) -> &BandSet<Raster<f64>> {
        &self.bands
    }
}

fn scale_factors(raw: &RawScene, params: &NormalizeParams) -> Result<BandSet<f64>> {
    if params.use_reflectance {
        match &raw.reflectance {
            Some(coefficients) => {
                for (band, &c) in coefficients.iter() {
                    if !(c.is_finite() && c > 0.0) {
                        return Err(Error::InvalidParameter {
                            name: "reflectance_coefficient",
                            value: format!("{band}={c}"),
                            reason: "must be a positive finite number".into(),
                        });
                    }
                }
                return Ok(coefficients.clone());
            }
            None => warn!(
                "Scene {} has no reflectance coefficients, scaling by bit depth",
                raw.date
            ),
        }
    }

    let max = match params.raw_max {
        Some(max) => max,
        None => max_raw_value(raw.bit_depth)?,
    };
    let factor = 1.0 / max;
    Ok(BandSet {
        blue: factor,
        green: factor,
        red: factor,
        nir: factor,
    })
}

fn normalize_sample(value: f64, factor: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * factor).clamp(0.0, 1.0)
}
