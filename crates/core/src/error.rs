//! Error types for greentrend

use chrono::NaiveDate;
use thiserror::Error;

use crate::scene::Band;

/// Main error type for greentrend operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid raster dimensions: {len} values for {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize, len: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Raster size mismatch: expected {expected:?}, got {actual:?}")]
    SizeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("band shape mismatch{}: {band} is {actual:?}, expected {expected:?}", on_date(.date))]
    ShapeMismatch {
        date: Option<NaiveDate>,
        band: Band,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("scene {date} is empty ({rows}x{cols})")]
    EmptyScene {
        date: NaiveDate,
        rows: usize,
        cols: usize,
    },

    #[error("scene {date} has shape {actual:?} but the series started at {expected:?}")]
    SceneShapeMismatch {
        date: NaiveDate,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("scene {date} has no classifiable pixels after masking")]
    NoClassifiablePixels { date: NaiveDate },

    #[error("trend needs at least {required} scenes, got {len}")]
    InsufficientSeriesLength { len: usize, required: usize },

    #[error("dates must strictly increase: {current} at position {index} follows {previous}")]
    NonMonotonicDate {
        index: usize,
        previous: NaiveDate,
        current: NaiveDate,
    },

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("TIFF error: {0}")]
    Tiff(String),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("Render error: {0}")]
    Render(String),
}

impl Error {
    /// Whether the pipeline may drop the affected scene and keep going.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::NoClassifiablePixels { .. })
    }
}

fn on_date(date: &Option<NaiveDate>) -> String {
    match date {
        Some(d) => format!(" in scene {d}"),
        None => String::new(),
    }
}

/// Result type alias for greentrend operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_mismatch_names_scene() {
        let err = Error::ShapeMismatch {
            date: NaiveDate::from_ymd_opt(2020, 7, 1),
            band: Band::Nir,
            expected: (4, 4),
            actual: (4, 5),
        };
        let msg = err.to_string();
        assert!(msg.contains("2020-07-01"), "{msg}");
        assert!(msg.contains("nir is (4, 5), expected (4, 4)"), "{msg}");
    }

    #[test]
    fn test_only_empty_mask_is_recoverable() {
        let date = NaiveDate::from_ymd_opt(2020, 7, 1).unwrap();
        assert!(Error::NoClassifiablePixels { date }.is_recoverable());
        assert!(!Error::EmptyScene { date, rows: 0, cols: 3 }.is_recoverable());
        assert!(!Error::InsufficientSeriesLength { len: 1, required: 2 }.is_recoverable());
    }
}
