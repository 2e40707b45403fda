//! Finding scene files by naming convention
//!
//! An image is any `*_AnalyticMS.tif` (or `.tiff`) whose file name starts
//! with the acquisition date as `YYYYMMDD`. Its sidecar, when present, sits
//! next to it with `_metadata.xml` appended to the stem.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::debug;

use crate::error::Result;

const IMAGE_STEM_SUFFIX: &str = "_AnalyticMS";
const METADATA_SUFFIX: &str = "_metadata.xml";

/// One image file and its optional sidecar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneFiles {
    pub date: NaiveDate,
    pub image: PathBuf,
    pub metadata: Option<PathBuf>,
}

/// Parse the leading `YYYYMMDD` of a scene file name
pub fn parse_scene_date(file_name: &str) -> Option<NaiveDate> {
    let prefix = file_name.get(..8)?;
    if !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(prefix, "%Y%m%d").ok()
}

/// Recursively collect scene images under `dir`, sorted by date then path.
pub fn discover_scenes(dir: &Path) -> Result<Vec<SceneFiles>> {
    let mut found = Vec::new();
    walk(dir, &mut found)?;
    found.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.image.cmp(&b.image)));
    Ok(found)
}

fn walk(dir: &Path, found: &mut Vec<SceneFiles>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            walk(&path, found)?;
        } else if let Some(scene) = scene_files(&path) {
            debug!("Found scene {} at {}", scene.date, path.display());
            found.push(scene);
        }
    }
    Ok(())
}

fn scene_files(path: &Path) -> Option<SceneFiles> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    if ext != "tif" && ext != "tiff" {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    if !stem.ends_with(IMAGE_STEM_SUFFIX) {
        return None;
    }
    let date = parse_scene_date(stem)?;

    let sidecar = path.with_file_name(format!("{stem}{METADATA_SUFFIX}"));
    Some(SceneFiles {
        date,
        image: path.to_path_buf(),
        metadata: sidecar.is_file().then_some(sidecar),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_parse_scene_date() {
        assert_eq!(
            parse_scene_date("20190927_211921_1018_3B_AnalyticMS"),
            NaiveDate::from_ymd_opt(2019, 9, 27)
        );
        assert_eq!(parse_scene_date("2019"), None);
        assert_eq!(parse_scene_date("20191340_x"), None);
        assert_eq!(parse_scene_date("scene_20190927"), None);
    }

    #[test]
    fn test_discover_sorted_with_sidecars() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let late = root.join("b/20190928_211958_103d_3B_AnalyticMS.tif");
        let early = root.join("a/20190927_211921_1018_3B_AnalyticMS.tif");
        touch(&late);
        touch(&early);
        touch(&root.join("a/20190927_211921_1018_3B_AnalyticMS_metadata.xml"));
        touch(&root.join("a/20190927_211921_1018_3B_udm2.tif"));
        touch(&root.join("notes.txt"));

        let scenes = discover_scenes(root).unwrap();
        assert_eq!(scenes.len(), 2);
        assert_eq!(scenes[0].image, early);
        assert_eq!(scenes[0].date, NaiveDate::from_ymd_opt(2019, 9, 27).unwrap());
        assert!(scenes[0].metadata.is_some());
        assert_eq!(scenes[1].image, late);
        assert!(scenes[1].metadata.is_none());
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_scenes(&dir.path().join("nope")).is_err());
    }
}
