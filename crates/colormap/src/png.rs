//! PNG output

use std::path::Path;

use greentrend_core::{Error, Result};
use image::RgbaImage;

/// Write an RGBA buffer of `width * height` pixels as PNG.
pub fn write_png<P: AsRef<Path>>(path: P, rgba: Vec<u8>, width: usize, height: usize) -> Result<()> {
    let path = path.as_ref();
    let expected = width * height * 4;
    if rgba.len() != expected {
        return Err(Error::Render(format!(
            "buffer holds {} bytes, {}x{} RGBA needs {}",
            rgba.len(),
            width,
            height,
            expected
        )));
    }

    let img = RgbaImage::from_raw(width as u32, height as u32, rgba)
        .ok_or_else(|| Error::Render(format!("cannot build {width}x{height} image")))?;
    img.save(path)
        .map_err(|e| Error::Render(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        write_png(&path, vec![255; 2 * 3 * 4], 2, 3).unwrap();

        let img = image::open(&path).unwrap();
        assert_eq!((img.width(), img.height()), (2, 3));
    }

    #[test]
    fn test_buffer_size_checked() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_png(dir.path().join("bad.png"), vec![0; 7], 2, 1).unwrap_err();
        assert!(matches!(err, Error::Render(_)));
    }
}
