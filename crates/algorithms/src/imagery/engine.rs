//! Per-scene index computation

use greentrend_core::raster::{IndexMap, WaterMask};
use greentrend_core::scene::RasterScene;
use greentrend_core::Result;
use tracing::debug;

use super::indices::{vegetation_index, water_index};
use super::water::{water_mask, WaterMaskParams};

/// Everything derived from a single scene before classification
#[derive(Debug, Clone)]
pub struct SceneIndices {
    pub vegetation: IndexMap,
    pub water: IndexMap,
    pub mask: WaterMask,
}

/// Computes the vegetation index, water index and water mask of a scene
#[derive(Debug, Clone, Default)]
pub struct IndexEngine {
    water: WaterMaskParams,
}

impl IndexEngine {
    pub fn new(water: WaterMaskParams) -> Result<Self> {
        water.validate()?;
        Ok(Self { water })
    }

    pub fn vegetation_index(&self, scene: &RasterScene) -> Result<IndexMap> {
        vegetation_index(scene)
    }

    pub fn water_index(&self, scene: &RasterScene) -> Result<IndexMap> {
        water_index(scene)
    }

    /// Water mask for `water`; all clear when masking is disabled
    pub fn water_mask(&self, water: &IndexMap) -> Result<WaterMask> {
        if !self.water.enabled {
            let (rows, cols) = water.shape();
            return Ok(WaterMask::clear(rows, cols));
        }
        water_mask(water, self.water.threshold)
    }

    pub fn analyze(&self, scene: &RasterScene) -> Result<SceneIndices> {
        let vegetation = self.vegetation_index(scene)?;
        let water = self.water_index(scene)?;
        let mask = self.water_mask(&water)?;

        debug!(
            "Scene {}: {} undefined index pixels, {} water pixels",
            scene.date(),
            vegetation.undefined_count(),
            mask.masked_count()
        );

        Ok(SceneIndices { vegetation, water, mask })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use greentrend_core::raster::{IndexPixel, Raster};
    use greentrend_core::scene::{BandSet, NormalizeParams, RawScene};

    fn make_band(value: f64) -> Raster<f64> {
        Raster::filled(2, 2, value)
    }

    fn make_scene(green: f64, red: f64, nir: f64) -> RasterScene {
        let raw = RawScene::new(
            NaiveDate::from_ymd_opt(2020, 7, 1).unwrap(),
            BandSet {
                blue: make_band(1000.0),
                green: make_band(green),
                red: make_band(red),
                nir: make_band(nir),
            },
            16,
        );
        RasterScene::from_raw(&raw, &NormalizeParams::default()).unwrap()
    }

    #[test]
    fn test_analyze_land_scene() {
        let engine = IndexEngine::default();
        let out = engine.analyze(&make_scene(1000.0, 1000.0, 3000.0)).unwrap();

        assert_eq!(out.mask.masked_count(), 0);
        match out.vegetation.get(0, 0).unwrap() {
            IndexPixel::Defined(v) => assert!((v - 0.5).abs() < 1e-12),
            IndexPixel::Undefined => panic!("expected defined pixel"),
        }
    }

    #[test]
    fn test_analyze_water_scene() {
        let engine = IndexEngine::default();
        let out = engine.analyze(&make_scene(5000.0, 1000.0, 1000.0)).unwrap();
        assert_eq!(out.mask.masked_count(), 4);
    }

    #[test]
    fn test_disabled_mask_is_clear() {
        let engine = IndexEngine::new(WaterMaskParams {
            enabled: false,
            ..Default::default()
        })
        .unwrap();
        let out = engine.analyze(&make_scene(5000.0, 1000.0, 1000.0)).unwrap();
        assert_eq!(out.mask.masked_count(), 0);
    }
}
