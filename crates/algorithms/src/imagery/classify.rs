//! Soil / vegetation classification of a masked vegetation index
//!
//! A pixel that is neither water-masked nor undefined is:
//! - soil when `0 <= v <= veg_low`
//! - vegetation when `veg_low < v <= 1`
//! - unclassified otherwise (negative index)
//!
//! Proportions are taken over soil + vegetation only, so masked and
//! unclassified pixels never dilute them.

use std::ops::Add;

use chrono::NaiveDate;
use greentrend_core::raster::{IndexMap, IndexPixel, Raster, WaterMask};
use greentrend_core::{Error, Result};
use serde::Serialize;
use tracing::debug;

use crate::maybe_rayon::*;

/// Parameters for soil / vegetation classification
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifyParams {
    /// Upper bound (inclusive) of the soil band, in `[0, 1]`.
    /// Default: 0.2
    pub veg_low: f64,
}

impl Default for ClassifyParams {
    fn default() -> Self {
        Self { veg_low: 0.2 }
    }
}

impl ClassifyParams {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.veg_low) {
            return Err(Error::InvalidParameter {
                name: "veg_low",
                value: self.veg_low.to_string(),
                reason: "must be within [0, 1]".into(),
            });
        }
        Ok(())
    }
}

/// Outcome for a single pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelClass {
    Soil,
    Vegetation,
    /// Defined but outside both bands
    Unclassified,
    /// Excluded by the water mask
    Water,
    /// Index undefined
    Undefined,
}

impl PixelClass {
    /// Code used in class maps
    pub fn code(self) -> u8 {
        match self {
            PixelClass::Undefined | PixelClass::Unclassified => 0,
            PixelClass::Soil => 1,
            PixelClass::Vegetation => 2,
            PixelClass::Water => 3,
        }
    }
}

/// Classify one pixel
pub fn classify_pixel(pixel: IndexPixel, masked: bool, veg_low: f64) -> PixelClass {
    if masked {
        return PixelClass::Water;
    }
    match pixel {
        IndexPixel::Undefined => PixelClass::Undefined,
        IndexPixel::Defined(v) if (0.0..=veg_low).contains(&v) => PixelClass::Soil,
        IndexPixel::Defined(v) if v > veg_low && v <= 1.0 => PixelClass::Vegetation,
        IndexPixel::Defined(_) => PixelClass::Unclassified,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct PixelCounts {
    soil: usize,
    vegetation: usize,
    unclassified: usize,
    water: usize,
    undefined: usize,
}

impl PixelCounts {
    fn record(&mut self, class: PixelClass) {
        match class {
            PixelClass::Soil => self.soil += 1,
            PixelClass::Vegetation => self.vegetation += 1,
            PixelClass::Unclassified => self.unclassified += 1,
            PixelClass::Water => self.water += 1,
            PixelClass::Undefined => self.undefined += 1,
        }
    }
}

impl Add for PixelCounts {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            soil: self.soil + rhs.soil,
            vegetation: self.vegetation + rhs.vegetation,
            unclassified: self.unclassified + rhs.unclassified,
            water: self.water + rhs.water,
            undefined: self.undefined + rhs.undefined,
        }
    }
}

/// Per-scene soil / vegetation summary.
///
/// Built once by the classifier (or [`SceneClassification::new`]) and
/// read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneClassification {
    date: NaiveDate,
    vegetation_pixels: usize,
    soil_pixels: usize,
    total_classifiable_pixels: usize,
    vegetation_proportion: f64,
    soil_proportion: f64,
    water_pixels: usize,
    undefined_pixels: usize,
    unclassified_pixels: usize,
    median_vegetation_index: Option<f64>,
}

impl SceneClassification {
    /// Build from soil and vegetation counts.
    ///
    /// # Errors
    /// `NoClassifiablePixels` when both counts are zero
    pub fn new(date: NaiveDate, vegetation_pixels: usize, soil_pixels: usize) -> Result<Self> {
        let total = vegetation_pixels + soil_pixels;
        if total == 0 {
            return Err(Error::NoClassifiablePixels { date });
        }
        Ok(Self {
            date,
            vegetation_pixels,
            soil_pixels,
            total_classifiable_pixels: total,
            vegetation_proportion: vegetation_pixels as f64 / total as f64,
            soil_proportion: soil_pixels as f64 / total as f64,
            water_pixels: 0,
            undefined_pixels: 0,
            unclassified_pixels: 0,
            median_vegetation_index: None,
        })
    }

    fn from_counts(date: NaiveDate, counts: PixelCounts, median: Option<f64>) -> Result<Self> {
        let mut record = Self::new(date, counts.vegetation, counts.soil)?;
        record.water_pixels = counts.water;
        record.undefined_pixels = counts.undefined;
        record.unclassified_pixels = counts.unclassified;
        record.median_vegetation_index = median;
        Ok(record)
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn vegetation_pixels(&self) -> usize {
        self.vegetation_pixels
    }

    pub fn soil_pixels(&self) -> usize {
        self.soil_pixels
    }

    /// Soil + vegetation
    pub fn total_classifiable_pixels(&self) -> usize {
        self.total_classifiable_pixels
    }

    pub fn vegetation_proportion(&self) -> f64 {
        self.vegetation_proportion
    }

    pub fn soil_proportion(&self) -> f64 {
        self.soil_proportion
    }

    pub fn water_pixels(&self) -> usize {
        self.water_pixels
    }

    pub fn undefined_pixels(&self) -> usize {
        self.undefined_pixels
    }

    pub fn unclassified_pixels(&self) -> usize {
        self.unclassified_pixels
    }

    /// Median of the defined, unmasked vegetation index
    pub fn median_vegetation_index(&self) -> Option<f64> {
        self.median_vegetation_index
    }
}

/// Count soil and vegetation pixels of one scene.
///
/// # Arguments
/// * `date` - Acquisition date, carried into the record and any error
/// * `vegetation` - Vegetation index map
/// * `mask` - Water mask of the same shape
/// * `params` - Classification thresholds
///
/// # Errors
/// * `SizeMismatch` when map and mask shapes differ
/// * `NoClassifiablePixels` when no pixel is soil or vegetation
pub fn classify_scene(
    date: NaiveDate,
    vegetation: &IndexMap,
    mask: &WaterMask,
    params: &ClassifyParams,
) -> Result<SceneClassification> {
    check_shapes(vegetation, mask)?;

    let (rows, cols) = vegetation.shape();
    let index = vegetation.data();
    let water = mask.data();
    let veg_low = params.veg_low;

    let counts = (0..rows)
        .into_par_iter()
        .map(|row| {
            let mut counts = PixelCounts::default();
            for col in 0..cols {
                counts.record(classify_pixel(index[[row, col]], water[[row, col]], veg_low));
            }
            counts
        })
        .collect::<Vec<_>>()
        .into_iter()
        .fold(PixelCounts::default(), |acc, c| acc + c);

    let mut unmasked: Vec<f64> = index
        .iter()
        .zip(water.iter())
        .filter(|&(_, &masked)| !masked)
        .filter_map(|(pixel, _)| pixel.value())
        .collect();
    let median = median(&mut unmasked);

    debug!(
        "Scene {}: {} soil, {} vegetation, {} water, {} undefined, {} unclassified",
        date, counts.soil, counts.vegetation, counts.water, counts.undefined, counts.unclassified
    );

    SceneClassification::from_counts(date, counts, median)
}

/// Per-pixel class codes (see [`PixelClass::code`])
pub fn class_map(vegetation: &IndexMap, mask: &WaterMask, params: &ClassifyParams) -> Result<Raster<u8>> {
    check_shapes(vegetation, mask)?;

    let (rows, cols) = vegetation.shape();
    let index = vegetation.data();
    let water = mask.data();

    let codes: Vec<u8> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            (0..cols)
                .map(|col| classify_pixel(index[[row, col]], water[[row, col]], params.veg_low).code())
                .collect::<Vec<_>>()
        })
        .collect();

    Raster::from_vec(codes, rows, cols)
}

/// Classifier holding its thresholds
#[derive(Debug, Clone)]
pub struct Classifier {
    params: ClassifyParams,
}

impl Classifier {
    pub fn new(params: ClassifyParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &ClassifyParams {
        &self.params
    }

    pub fn classify(
        &self,
        date: NaiveDate,
        vegetation: &IndexMap,
        mask: &WaterMask,
    ) -> Result<SceneClassification> {
        classify_scene(date, vegetation, mask, &self.params)
    }

    pub fn class_map(&self, vegetation: &IndexMap, mask: &WaterMask) -> Result<Raster<u8>> {
        class_map(vegetation, mask, &self.params)
    }
}

fn check_shapes(vegetation: &IndexMap, mask: &WaterMask) -> Result<()> {
    if vegetation.shape() != mask.shape() {
        return Err(Error::SizeMismatch {
            expected: vegetation.shape(),
            actual: mask.shape(),
        });
    }
    Ok(())
}

fn median(values: &mut [f64]) -> Option<f64> {
    let n = values.len();
    if n == 0 {
        return None;
    }
    let mid = n / 2;
    let (lower, upper, _) = values.select_nth_unstable_by(mid, f64::total_cmp);
    let upper = *upper;
    if n % 2 == 1 {
        return Some(upper);
    }
    let below = lower.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some((below + upper) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 7, 1).unwrap()
    }

    fn make_index(values: &[Option<f64>], rows: usize, cols: usize) -> IndexMap {
        IndexMap::from_values(values, rows, cols).unwrap()
    }

    #[test]
    fn test_threshold_boundary() {
        let params = ClassifyParams::default();
        let eps = 1e-9;

        assert_eq!(classify_pixel(IndexPixel::Defined(0.2), false, params.veg_low), PixelClass::Soil);
        assert_eq!(
            classify_pixel(IndexPixel::Defined(0.2 + eps), false, params.veg_low),
            PixelClass::Vegetation
        );
        assert_eq!(classify_pixel(IndexPixel::Defined(0.0), false, params.veg_low), PixelClass::Soil);
        assert_eq!(classify_pixel(IndexPixel::Defined(1.0), false, params.veg_low), PixelClass::Vegetation);
        assert_eq!(
            classify_pixel(IndexPixel::Defined(-0.01), false, params.veg_low),
            PixelClass::Unclassified
        );
    }

    #[test]
    fn test_threshold_boundary_in_scene() {
        let map = make_index(&[Some(0.2), Some(0.2 + 1e-9)], 1, 2);
        let record = classify_scene(date(), &map, &WaterMask::clear(1, 2), &ClassifyParams::default()).unwrap();

        assert_eq!(record.soil_pixels(), 1);
        assert_eq!(record.vegetation_pixels(), 1);
    }

    #[test]
    fn test_proportions_exclude_masked_and_undefined() {
        // soil, veg, veg, undefined, water (would be veg), negative
        let map = make_index(
            &[Some(0.1), Some(0.5), Some(0.9), None, Some(0.7), Some(-0.4)],
            2,
            3,
        );
        let mask = WaterMask::from_vec(vec![false, false, false, false, true, false], 2, 3).unwrap();

        let record = classify_scene(date(), &map, &mask, &ClassifyParams::default()).unwrap();

        assert_eq!(record.soil_pixels(), 1);
        assert_eq!(record.vegetation_pixels(), 2);
        assert_eq!(record.total_classifiable_pixels(), 3);
        assert_eq!(record.water_pixels(), 1);
        assert_eq!(record.undefined_pixels(), 1);
        assert_eq!(record.unclassified_pixels(), 1);
        assert_relative_eq!(record.vegetation_proportion(), 2.0 / 3.0);
        assert_relative_eq!(record.soil_proportion(), 1.0 / 3.0);
        assert_relative_eq!(record.vegetation_proportion() + record.soil_proportion(), 1.0);
    }

    #[test]
    fn test_undefined_pixels_never_counted() {
        let map = make_index(&[None, None, Some(0.5), None], 2, 2);
        let record = classify_scene(date(), &map, &WaterMask::clear(2, 2), &ClassifyParams::default()).unwrap();

        assert_eq!(record.total_classifiable_pixels(), 1);
        assert_eq!(record.undefined_pixels(), 3);
    }

    #[test]
    fn test_fully_masked_scene_has_no_classifiable_pixels() {
        let map = make_index(&[Some(0.5); 4], 2, 2);
        let mask = WaterMask::from_vec(vec![true; 4], 2, 2).unwrap();

        let err = classify_scene(date(), &map, &mask, &ClassifyParams::default()).unwrap_err();
        assert!(matches!(err, Error::NoClassifiablePixels { date: d } if d == date()));
    }

    #[test]
    fn test_custom_threshold() {
        let classifier = Classifier::new(ClassifyParams { veg_low: 0.5 }).unwrap();
        let map = make_index(&[Some(0.3), Some(0.45), Some(0.55), Some(0.8)], 2, 2);

        let record = classifier.classify(date(), &map, &WaterMask::clear(2, 2)).unwrap();
        assert_eq!(record.soil_pixels(), 2);
        assert_eq!(record.vegetation_pixels(), 2);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        assert!(Classifier::new(ClassifyParams { veg_low: 1.2 }).is_err());
        assert!(Classifier::new(ClassifyParams { veg_low: -0.1 }).is_err());
    }

    #[test]
    fn test_median_of_unmasked_values() {
        let map = make_index(&[Some(0.1), Some(0.4), Some(-0.2), Some(0.9), None, Some(0.6)], 2, 3);
        let mask = WaterMask::from_vec(vec![false, false, false, true, false, false], 2, 3).unwrap();

        let record = classify_scene(date(), &map, &mask, &ClassifyParams::default()).unwrap();
        // unmasked defined: -0.2, 0.1, 0.4, 0.6
        assert_relative_eq!(record.median_vegetation_index().unwrap(), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_class_map_codes() {
        let map = make_index(&[Some(0.1), Some(0.5), None, Some(0.5)], 2, 2);
        let mask = WaterMask::from_vec(vec![false, false, false, true], 2, 2).unwrap();

        let classes = class_map(&map, &mask, &ClassifyParams::default()).unwrap();
        assert_eq!(classes.get(0, 0).unwrap(), 1);
        assert_eq!(classes.get(0, 1).unwrap(), 2);
        assert_eq!(classes.get(1, 0).unwrap(), 0);
        assert_eq!(classes.get(1, 1).unwrap(), 3);
    }

    #[test]
    fn test_mask_shape_mismatch() {
        let map = make_index(&[Some(0.5); 4], 2, 2);
        let err = classify_scene(date(), &map, &WaterMask::clear(2, 3), &ClassifyParams::default()).unwrap_err();
        assert!(matches!(err, Error::SizeMismatch { .. }));
    }
}
