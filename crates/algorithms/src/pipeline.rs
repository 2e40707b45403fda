//! Scene-by-scene orchestration
//!
//! Scenes arrive in date order. Each one is normalized, indexed, masked and
//! classified, handed to an observer, and reduced to its
//! [`SceneClassification`]. Scenes with no classifiable pixels are dropped
//! with a warning; every other error stops the run. Trends are estimated
//! once all scenes are in.

use chrono::NaiveDate;
use greentrend_core::scene::{NormalizeParams, RasterScene, RawScene};
use greentrend_core::{Error, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::imagery::{Classifier, ClassifyParams, IndexEngine, SceneClassification, SceneIndices, WaterMaskParams};
use crate::temporal::{TimeSeries, TrendEstimator, TrendMetric, TrendResult};

/// All parameters of a run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub normalize: NormalizeParams,
    pub water: WaterMaskParams,
    pub classify: ClassifyParams,
    /// Require every scene to share the first scene's shape.
    /// Default: true
    pub strict_shape: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            normalize: NormalizeParams::default(),
            water: WaterMaskParams::default(),
            classify: ClassifyParams::default(),
            strict_shape: true,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        self.normalize.validate()?;
        self.water.validate()?;
        self.classify.validate()
    }
}

/// A scene left out of the series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DroppedScene {
    pub date: NaiveDate,
    pub reason: String,
}

/// What became of one scene
#[derive(Debug, Clone, PartialEq)]
pub enum SceneOutcome {
    Classified(SceneClassification),
    Dropped(DroppedScene),
}

/// Everything derived from one scene, lent to the observer
#[derive(Debug)]
pub struct SceneAnalysis {
    pub scene: RasterScene,
    pub indices: SceneIndices,
    pub outcome: SceneOutcome,
}

impl SceneAnalysis {
    pub fn date(&self) -> NaiveDate {
        self.scene.date()
    }

    pub fn classification(&self) -> Option<&SceneClassification> {
        match &self.outcome {
            SceneOutcome::Classified(record) => Some(record),
            SceneOutcome::Dropped(_) => None,
        }
    }
}

/// Result of a full run
#[derive(Debug, Clone, Serialize)]
pub struct SeriesAnalysis {
    pub series: TimeSeries,
    pub dropped: Vec<DroppedScene>,
    /// One entry per metric that had enough samples; the vegetation
    /// proportion always comes first.
    pub trend: Vec<TrendResult>,
}

impl SeriesAnalysis {
    pub fn trend_for(&self, metric: TrendMetric) -> Option<&TrendResult> {
        self.trend.iter().find(|t| t.metric() == metric)
    }

    /// The vegetation-proportion trend
    pub fn primary_trend(&self) -> Option<&TrendResult> {
        self.trend_for(TrendMetric::VegetationProportion)
    }
}

/// Runs scenes through normalization, indexing and classification
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    engine: IndexEngine,
    classifier: Classifier,
}

impl Pipeline {
    /// # Errors
    /// `InvalidParameter` when any part of `config` is out of range
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let engine = IndexEngine::new(config.water.clone())?;
        let classifier = Classifier::new(config.classify.clone())?;
        Ok(Self {
            config,
            engine,
            classifier,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Process a single scene.
    ///
    /// An empty classification comes back as [`SceneOutcome::Dropped`];
    /// every other failure is an error.
    pub fn analyze_scene(&self, raw: &RawScene) -> Result<SceneAnalysis> {
        let scene = RasterScene::from_raw(raw, &self.config.normalize)?;
        let indices = self.engine.analyze(&scene)?;

        let outcome = match self.classifier.classify(scene.date(), &indices.vegetation, &indices.mask) {
            Ok(record) => SceneOutcome::Classified(record),
            Err(err) if err.is_recoverable() => SceneOutcome::Dropped(DroppedScene {
                date: scene.date(),
                reason: err.to_string(),
            }),
            Err(err) => return Err(err),
        };

        Ok(SceneAnalysis {
            scene,
            indices,
            outcome,
        })
    }

    /// Process scenes in date order and estimate the trends.
    ///
    /// `observe` sees each scene's analysis before its rasters are
    /// dropped; an error from it stops the run.
    ///
    /// # Errors
    /// * `NonMonotonicDate` when a scene does not follow its predecessor
    /// * `SceneShapeMismatch` when `strict_shape` is set and shapes differ
    /// * `InsufficientSeriesLength` when fewer than two scenes survive
    /// * any error from reading, normalizing or indexing a scene
    pub fn run<I, F>(&self, scenes: I, mut observe: F) -> Result<SeriesAnalysis>
    where
        I: IntoIterator<Item = Result<RawScene>>,
        F: FnMut(&SceneAnalysis) -> Result<()>,
    {
        let mut series = TimeSeries::empty();
        let mut dropped = Vec::new();
        let mut previous: Option<NaiveDate> = None;
        let mut first_shape: Option<(usize, usize)> = None;

        for (index, raw) in scenes.into_iter().enumerate() {
            let raw = raw?;

            if let Some(prev) = previous {
                if raw.date <= prev {
                    return Err(Error::NonMonotonicDate {
                        index,
                        previous: prev,
                        current: raw.date,
                    });
                }
            }
            previous = Some(raw.date);

            let analysis = self.analyze_scene(&raw)?;
            drop(raw);

            let shape = analysis.scene.shape();
            match first_shape {
                None => first_shape = Some(shape),
                Some(expected) if self.config.strict_shape && expected != shape => {
                    return Err(Error::SceneShapeMismatch {
                        date: analysis.date(),
                        expected,
                        actual: shape,
                    });
                }
                Some(_) => {}
            }

            observe(&analysis)?;

            match analysis.outcome {
                SceneOutcome::Classified(record) => {
                    info!(
                        "Scene {}: {:.1}% vegetation, {:.1}% soil",
                        record.date(),
                        record.vegetation_proportion() * 100.0,
                        record.soil_proportion() * 100.0
                    );
                    series.push(record)?;
                }
                SceneOutcome::Dropped(scene) => {
                    warn!("Dropping scene {}: {}", scene.date, scene.reason);
                    dropped.push(scene);
                }
            }
        }

        debug!("{} scenes classified, {} dropped", series.len(), dropped.len());

        let trend = self.estimate_trends(&series)?;

        Ok(SeriesAnalysis {
            series,
            dropped,
            trend,
        })
    }

    /// Primary trend is required; secondary metrics are reported when they
    /// have enough samples.
    fn estimate_trends(&self, series: &TimeSeries) -> Result<Vec<TrendResult>> {
        let mut trend = Vec::with_capacity(TrendMetric::ALL.len());
        for metric in TrendMetric::ALL {
            match TrendEstimator::new(metric).estimate(series) {
                Ok(result) => trend.push(result),
                Err(err) if metric == TrendMetric::VegetationProportion => return Err(err),
                Err(Error::InsufficientSeriesLength { len, .. }) => {
                    debug!("No {} trend: only {} samples", metric, len);
                }
                Err(err) => return Err(err),
            }
        }
        Ok(trend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use greentrend_core::raster::Raster;
    use greentrend_core::scene::BandSet;

    fn make_band(value: f64) -> Raster<f64> {
        Raster::filled(3, 3, value)
    }

    fn make_scene(day: u32, green: f64, red: f64, nir: f64) -> RawScene {
        RawScene::new(
            NaiveDate::from_ymd_opt(2020, 7, day).unwrap(),
            BandSet {
                blue: make_band(800.0),
                green: make_band(green),
                red: make_band(red),
                nir: make_band(nir),
            },
            16,
        )
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = PipelineConfig {
            classify: ClassifyParams { veg_low: 2.0 },
            ..Default::default()
        };
        assert!(matches!(Pipeline::new(config), Err(Error::InvalidParameter { name: "veg_low", .. })));
    }

    #[test]
    fn test_analyze_scene_classifies_land() {
        let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        let analysis = pipeline.analyze_scene(&make_scene(1, 1000.0, 1000.0, 3000.0)).unwrap();

        let record = analysis.classification().unwrap();
        assert_eq!(record.vegetation_pixels(), 9);
        assert_eq!(record.soil_pixels(), 0);
    }

    #[test]
    fn test_analyze_scene_drops_water() {
        let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        let analysis = pipeline.analyze_scene(&make_scene(1, 5000.0, 1000.0, 1000.0)).unwrap();

        assert!(matches!(analysis.outcome, SceneOutcome::Dropped(_)));
    }

    #[test]
    fn test_run_rejects_out_of_order() {
        let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        let scenes = vec![
            Ok(make_scene(5, 1000.0, 1000.0, 3000.0)),
            Ok(make_scene(2, 1000.0, 1000.0, 3000.0)),
        ];

        let err = pipeline.run(scenes, |_| Ok(())).unwrap_err();
        assert!(matches!(err, Error::NonMonotonicDate { index: 1, .. }));
    }

    #[test]
    fn test_run_stops_on_reader_error() {
        let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        let scenes = vec![
            Ok(make_scene(1, 1000.0, 1000.0, 3000.0)),
            Err(Error::Tiff("truncated".into())),
        ];

        assert!(matches!(pipeline.run(scenes, |_| Ok(())), Err(Error::Tiff(_))));
    }

    #[test]
    fn test_observer_sees_every_scene() {
        let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        let scenes = vec![
            Ok(make_scene(1, 1000.0, 1000.0, 3000.0)),
            Ok(make_scene(2, 5000.0, 1000.0, 1000.0)),
            Ok(make_scene(3, 1000.0, 1000.0, 4000.0)),
        ];

        let mut seen = Vec::new();
        let result = pipeline
            .run(scenes, |analysis| {
                seen.push(analysis.date());
                Ok(())
            })
            .unwrap();

        assert_eq!(seen.len(), 3);
        assert_eq!(result.series.len(), 2);
        assert_eq!(result.dropped.len(), 1);
    }
}
