//! XML sidecar metadata
//!
//! Reads the acquisition date and per-band top-of-atmosphere reflectance
//! coefficients from a scene's `_metadata.xml` sidecar. Element names are
//! matched on their local part, so `ps:bandNumber` and `bandNumber` are the
//! same element.

use std::path::Path;

use chrono::NaiveDate;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{Error, Result};
use crate::scene::BandSet;

/// Fields of interest from a scene sidecar
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneMetadata {
    pub acquired: Option<NaiveDate>,
    /// Present only when all four bands carry a coefficient
    pub reflectance: Option<BandSet<f64>>,
}

/// Read and parse a sidecar file
pub fn read_scene_metadata<P: AsRef<Path>>(path: P) -> Result<SceneMetadata> {
    let xml = std::fs::read_to_string(path.as_ref())?;
    parse_scene_metadata(&xml)
}

/// Parse sidecar XML
pub fn parse_scene_metadata(xml: &str) -> Result<SceneMetadata> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut meta = SceneMetadata::default();
    let mut curr = String::new();
    let mut in_band = false;
    let mut band_number: Option<usize> = None;
    let mut coefficient: Option<f64> = None;
    let mut coefficients: [Option<f64>; 4] = [None; 4];

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                curr = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if curr == "bandSpecificMetadata" {
                    in_band = true;
                    band_number = None;
                    coefficient = None;
                }
            }
            Event::End(e) => {
                if e.local_name().as_ref() == b"bandSpecificMetadata" {
                    in_band = false;
                    if let (Some(n @ 1..=4), Some(c)) = (band_number, coefficient) {
                        coefficients[n - 1] = Some(c);
                    }
                }
                curr.clear();
            }
            Event::Text(e) => {
                let txt = e.unescape()?;
                match curr.as_str() {
                    "acquisitionDateTime" if meta.acquired.is_none() => {
                        meta.acquired = Some(parse_acquisition_date(&txt)?);
                    }
                    "bandNumber" if in_band => {
                        band_number = Some(parse_field(&txt, "bandNumber")?);
                    }
                    "reflectanceCoefficient" if in_band => {
                        coefficient = Some(parse_field(&txt, "reflectanceCoefficient")?);
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let [Some(blue), Some(green), Some(red), Some(nir)] = coefficients {
        meta.reflectance = Some(BandSet {
            blue,
            green,
            red,
            nir,
        });
    }

    Ok(meta)
}

/// `2019-09-27T21:19:21+00:00` -> 2019-09-27
fn parse_acquisition_date(text: &str) -> Result<NaiveDate> {
    let day = text.split('T').next().unwrap_or(text).trim();
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| Error::Metadata(format!("acquisitionDateTime '{text}': {e}")))
}

fn parse_field<T: std::str::FromStr>(text: &str, name: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    text.trim()
        .parse()
        .map_err(|e| Error::Metadata(format!("{name} '{text}': {e}")))
}
