//! Reading scene series from disk
//!
//! - [`discover_scenes`]: find dated image/sidecar pairs under a directory
//! - [`read_scene_tiff`]: decode a four-band image into raw band planes
//! - [`read_scene_metadata`]: acquisition date and reflectance coefficients
//! - [`write_index_tiff`]: single-band float output for index maps

mod discovery;
mod metadata;
mod tiff;

pub use discovery::{discover_scenes, parse_scene_date, SceneFiles};
pub use metadata::{parse_scene_metadata, read_scene_metadata, SceneMetadata};
pub use self::tiff::{
    read_scene_tiff, read_scene_tiff_from_buffer, write_index_tiff, DecodedBands,
};
