//! Raster element trait for generic cell values

use num_traits::Zero;
use std::fmt::Debug;

/// Trait for types that can be stored in a raster cell.
///
/// Raw band planes arrive as integer digital numbers and are widened to
/// `f64`; normalized bands are `f64` and class maps are `u8`.
pub trait RasterElement: Copy + Debug + PartialOrd + Zero + Send + Sync + 'static {}

macro_rules! impl_raster_element {
    ($($t:ty),*) => {
        $(impl RasterElement for $t {})*
    };
}

impl_raster_element!(u8, u16, u32, i16, i32, f32, f64);
