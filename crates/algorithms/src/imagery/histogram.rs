//! Histogram of index values over `[-1, 1]`

use greentrend_core::raster::{IndexMap, WaterMask};
use greentrend_core::{Error, Result};
use serde::Serialize;

/// Equal-width bins over `[-1, 1]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexHistogram {
    pub counts: Vec<usize>,
}

impl IndexHistogram {
    pub fn bin_width(&self) -> f64 {
        2.0 / self.counts.len() as f64
    }

    /// Lower and upper edge of bin `i`
    pub fn bin_edges(&self, i: usize) -> (f64, f64) {
        let w = self.bin_width();
        (-1.0 + i as f64 * w, -1.0 + (i + 1) as f64 * w)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Count defined index values, skipping masked pixels when a mask is given.
///
/// A value of exactly 1.0 falls into the last bin.
pub fn index_histogram(map: &IndexMap, mask: Option<&WaterMask>, bins: usize) -> Result<IndexHistogram> {
    if bins == 0 {
        return Err(Error::InvalidParameter {
            name: "bins",
            value: bins.to_string(),
            reason: "must be at least 1".into(),
        });
    }
    if let Some(mask) = mask {
        if mask.shape() != map.shape() {
            return Err(Error::SizeMismatch {
                expected: map.shape(),
                actual: mask.shape(),
            });
        }
    }

    let mut counts = vec![0usize; bins];
    for ((row, col), pixel) in map.data().indexed_iter() {
        if mask.is_some_and(|m| m.data()[[row, col]]) {
            continue;
        }
        if let Some(v) = pixel.value() {
            let t = ((v + 1.0) / 2.0).clamp(0.0, 1.0);
            let bin = ((t * bins as f64) as usize).min(bins - 1);
            counts[bin] += 1;
        }
    }

    Ok(IndexHistogram { counts })
}
