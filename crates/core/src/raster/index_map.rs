//! Per-pixel spectral index values with explicit undefined pixels

use crate::error::{Error, Result};
use ndarray::Array2;

/// One pixel of a spectral index.
///
/// A ratio whose denominator vanished is `Undefined` rather than NaN, so
/// downstream counts and statistics must handle it explicitly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndexPixel {
    Defined(f64),
    Undefined,
}

impl IndexPixel {
    /// The index value, if defined
    pub fn value(self) -> Option<f64> {
        match self {
            IndexPixel::Defined(v) => Some(v),
            IndexPixel::Undefined => None,
        }
    }

    pub fn is_defined(self) -> bool {
        matches!(self, IndexPixel::Defined(_))
    }
}

/// A 2D plane of [`IndexPixel`] values, one per scene pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexMap {
    data: Array2<IndexPixel>,
}

impl IndexMap {
    pub fn from_array(data: Array2<IndexPixel>) -> Self {
        Self { data }
    }

    /// Build from row-major pixels
    pub fn from_vec(pixels: Vec<IndexPixel>, rows: usize, cols: usize) -> Result<Self> {
        let len = pixels.len();
        let data = Array2::from_shape_vec((rows, cols), pixels)
            .map_err(|_| Error::InvalidDimensions { rows, cols, len })?;
        Ok(Self { data })
    }

    /// Build from row-major optional values, `None` marking undefined pixels
    pub fn from_values(values: &[Option<f64>], rows: usize, cols: usize) -> Result<Self> {
        let pixels = values
            .iter()
            .map(|v| v.map_or(IndexPixel::Undefined, IndexPixel::Defined))
            .collect();
        Self::from_vec(pixels, rows, cols)
    }

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> Result<IndexPixel> {
        self.data
            .get((row, col))
            .copied()
            .ok_or(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            })
    }

    pub fn data(&self) -> &Array2<IndexPixel> {
        &self.data
    }

    /// Iterate over all pixels in row-major order
    pub fn pixels(&self) -> impl Iterator<Item = IndexPixel> + '_ {
        self.data.iter().copied()
    }

    /// Number of undefined pixels
    pub fn undefined_count(&self) -> usize {
        self.pixels().filter(|p| !p.is_defined()).count()
    }
}
