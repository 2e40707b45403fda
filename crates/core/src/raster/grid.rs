//! Main Raster type

use crate::error::{Error, Result};
use crate::raster::RasterElement;
use ndarray::Array2;

/// A 2D raster plane.
///
/// `Raster<T>` stores values of type `T` in row-major order. Scenes of one
/// series share a pixel grid, so no georeferencing is carried here.
/// Missing data is not tagged on the raster; samples that cannot be used
/// surface as undefined index pixels downstream.
///
/// # Example
///
/// ```ignore
/// use greentrend_core::Raster;
///
/// let mut band: Raster<f64> = Raster::new(100, 100);
/// band.set(10, 20, 0.42)?;
/// let value = band.get(10, 20)?;
/// ```
#[derive(Debug, Clone)]
pub struct Raster<T: RasterElement> {
    data: Array2<T>,
}

impl<T: RasterElement> Raster<T> {
    /// Create a new raster filled with zeros
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::from_array(Array2::zeros((rows, cols)))
    }

    /// Create a new raster filled with a specific value
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self::from_array(Array2::from_elem((rows, cols), value))
    }

    /// Create a raster from row-major data
    pub fn from_vec(data: Vec<T>, rows: usize, cols: usize) -> Result<Self> {
        let len = data.len();
        let array = Array2::from_shape_vec((rows, cols), data)
            .map_err(|_| Error::InvalidDimensions { rows, cols, len })?;
        Ok(Self::from_array(array))
    }

    /// Create a raster from an ndarray
    pub fn from_array(data: Array2<T>) -> Self {
        Self { data }
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the raster has no cells
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get value at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Result<T> {
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

    /// Set value at (row, col)
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        let (rows, cols) = self.shape();
        match self.data.get_mut((row, col)) {
            Some(cell) => {
                *cell = value;
                Ok(())
            }
            None => Err(Error::IndexOutOfBounds { row, col, rows, cols }),
        }
    }

    /// Get a reference to the underlying array
    pub fn data(&self) -> &Array2<T> {
        &self.data
    }

    /// Apply `f` to every cell, producing a new raster of the same shape.
    pub fn map<U: RasterElement>(&self, f: impl Fn(T) -> U) -> Raster<U> {
        Raster::from_array(self.data.mapv(f))
    }
}
