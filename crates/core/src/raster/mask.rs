//! Boolean exclusion mask

use crate::error::{Error, Result};
use ndarray::Array2;

/// Pixels flagged as water, excluded from vegetation analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaterMask {
    data: Array2<bool>,
}

impl WaterMask {
    pub fn from_array(data: Array2<bool>) -> Self {
        Self { data }
    }

    /// A mask that excludes nothing
    pub fn clear(rows: usize, cols: usize) -> Self {
        Self::from_array(Array2::from_elem((rows, cols), false))
    }

    /// Build from row-major flags
    pub fn from_vec(flags: Vec<bool>, rows: usize, cols: usize) -> Result<Self> {
        let len = flags.len();
        let data = Array2::from_shape_vec((rows, cols), flags)
            .map_err(|_| Error::InvalidDimensions { rows, cols, len })?;
        Ok(Self { data })
    }

    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn is_masked(&self, row: usize, col: usize) -> Result<bool> {
        let (rows, cols) = self.shape();
        self.data
            .get((row, col))
            .copied()
            .ok_or(Error::IndexOutOfBounds { row, col, rows, cols })
    }

    pub fn data(&self) -> &Array2<bool> {
        &self.data
    }

    /// Number of masked pixels
    pub fn masked_count(&self) -> usize {
        self.data.iter().filter(|&&m| m).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_mask() {
        let mask = WaterMask::clear(3, 4);
        assert_eq!(mask.shape(), (3, 4));
        assert_eq!(mask.masked_count(), 0);
    }

    #[test]
    fn test_masked_count() {
        let mask = WaterMask::from_vec(vec![true, false, true, false], 2, 2).unwrap();
        assert_eq!(mask.masked_count(), 2);
        assert!(mask.is_masked(1, 0).unwrap());
        assert!(mask.is_masked(2, 0).is_err());
    }
}
