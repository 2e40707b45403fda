//! Native TIFF decoding of pixel-interleaved four-band scenes
//!
//! Uses the `tiff` crate. Samples are taken in sensor order: blue, green,
//! red, near-infrared. Extra samples (alpha, further bands) are ignored.

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, Write};
use std::path::Path;

use ::tiff::decoder::{Decoder, DecodingResult};
use ::tiff::encoder::colortype::Gray32Float;
use ::tiff::encoder::TiffEncoder;
use ::tiff::ColorType;
use tracing::debug;

use crate::error::{Error, Result};
use crate::raster::{IndexMap, Raster};
use crate::scene::{Band, BandSet};

/// Raw band planes decoded from one image
#[derive(Debug, Clone)]
pub struct DecodedBands {
    pub bands: BandSet<Raster<f64>>,
    /// Bits per sample as stored in the file
    pub bit_depth: u8,
    /// Samples per pixel in the file
    pub samples_per_pixel: usize,
}

/// Read a four-band scene image
pub fn read_scene_tiff<P: AsRef<Path>>(path: P) -> Result<DecodedBands> {
    let file = File::open(path.as_ref())?;
    decode_scene(BufReader::new(file))
}

/// Read a four-band scene image from an in-memory buffer
pub fn read_scene_tiff_from_buffer(data: &[u8]) -> Result<DecodedBands> {
    decode_scene(Cursor::new(data))
}

fn decode_scene<R: Read + Seek>(reader: R) -> Result<DecodedBands> {
    let mut decoder = Decoder::new(reader).map_err(tiff_error)?;
    let (width, height) = decoder.dimensions().map_err(tiff_error)?;
    let bit_depth = match decoder.colortype().map_err(tiff_error)? {
        ColorType::Gray(b)
        | ColorType::GrayA(b)
        | ColorType::RGB(b)
        | ColorType::RGBA(b)
        | ColorType::CMYK(b) => b,
        ColorType::Multiband { bit_depth, .. } => bit_depth,
        other => {
            return Err(Error::UnsupportedDataType(format!(
                "colour type {other:?}"
            )))
        }
    };

    let rows = height as usize;
    let cols = width as usize;

    let samples: Vec<f64> = match decoder.read_image().map_err(tiff_error)? {
        DecodingResult::U8(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::U16(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::U32(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::I8(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::I16(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::I32(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::F32(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::F64(buf) => buf,
        _ => {
            return Err(Error::UnsupportedDataType(
                "64-bit integer samples".to_string(),
            ))
        }
    };

    let pixels = rows * cols;
    if pixels == 0 || samples.len() % pixels != 0 {
        return Err(Error::InvalidDimensions {
            rows,
            cols,
            len: samples.len(),
        });
    }
    let samples_per_pixel = samples.len() / pixels;
    if samples_per_pixel < Band::ALL.len() {
        return Err(Error::UnsupportedDataType(format!(
            "{samples_per_pixel} samples per pixel, need blue, green, red and nir"
        )));
    }

    let plane = |offset: usize| -> Result<Raster<f64>> {
        let data = samples
            .iter()
            .skip(offset)
            .step_by(samples_per_pixel)
            .copied()
            .collect();
        Raster::from_vec(data, rows, cols)
    };

    let bands = BandSet {
        blue: plane(0)?,
        green: plane(1)?,
        red: plane(2)?,
        nir: plane(3)?,
    };
    debug!(
        "Decoded {} x {} scene, {} samples/pixel at {} bits",
        cols, rows, samples_per_pixel, bit_depth
    );

    Ok(DecodedBands {
        bands,
        bit_depth,
        samples_per_pixel,
    })
}

/// Write an index map as a single-band 32-bit float TIFF.
///
/// Undefined pixels are written as NaN.
pub fn write_index_tiff<P: AsRef<Path>>(map: &IndexMap, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    encode_index(map, file)
}

fn encode_index<W: Write + Seek>(map: &IndexMap, writer: W) -> Result<()> {
    let mut encoder = TiffEncoder::new(writer).map_err(tiff_error)?;
    let (rows, cols) = map.shape();
    let data: Vec<f32> = map
        .pixels()
        .map(|p| p.value().map_or(f32::NAN, |v| v as f32))
        .collect();

    encoder
        .write_image::<Gray32Float>(cols as u32, rows as u32, &data)
        .map_err(tiff_error)?;
    Ok(())
}

fn tiff_error(e: ::tiff::TiffError) -> Error {
    Error::Tiff(e.to_string())
}
