//! greentrend CLI - vegetation trend analysis over four-band scene series

mod report;

use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use greentrend_algorithms::imagery::{index_histogram, ClassifyParams, WaterMaskParams};
use greentrend_algorithms::pipeline::{Pipeline, PipelineConfig, SceneAnalysis, SeriesAnalysis};
use greentrend_algorithms::temporal::{TrendDirection, TrendMetric, TrendResult};
use greentrend_colormap::{
    classes_to_rgba, index_to_rgba, line_chart_rgba, mask_to_rgba, write_png, ChartLine, ColorScheme,
    ColormapParams, Rgb,
};
use greentrend_core::io::{discover_scenes, read_scene_metadata, read_scene_tiff, write_index_tiff, SceneFiles};
use greentrend_core::scene::{NormalizeParams, RawScene};

use report::{SceneReport, Summary, SUMMARY_FILE};

const HISTOGRAM_BINS: usize = 20;
const WATER_COLOR: Rgb = Rgb::new(30, 110, 200);
const SERIES_FILE: &str = "series.png";
const SERIES_SIZE: (u32, u32) = (800, 400);
const SERIES_LINES: [(TrendMetric, Rgb); 3] = [
    (TrendMetric::VegetationProportion, Rgb::new(34, 139, 34)),
    (TrendMetric::SoilProportion, Rgb::new(176, 124, 64)),
    (TrendMetric::MedianIndex, Rgb::new(30, 110, 200)),
];

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "greentrend")]
#[command(author, version, about = "Vegetation trend analysis over four-band scene series", long_about = None)]
struct Cli {
    /// Directory searched recursively for *_AnalyticMS.tif scenes
    data_directory: PathBuf,

    /// Directory for rendered maps and summary.json
    output_directory: PathBuf,

    /// Upper vegetation-index bound of bare soil
    #[arg(long, default_value = "0.2")]
    veg_low: f64,

    /// Water-index value above which a pixel is water
    #[arg(long, default_value = "0.0", allow_negative_numbers = true)]
    water_threshold: f64,

    /// Raw value mapped to 1.0 (default: derived from bit depth)
    #[arg(long)]
    raw_max: Option<f64>,

    /// Scale by the sidecar's reflectance coefficients
    #[arg(long)]
    reflectance: bool,

    /// Do not exclude water pixels
    #[arg(long)]
    no_water_mask: bool,

    /// Allow scenes of differing shape in one series
    #[arg(long)]
    allow_shape_change: bool,

    /// Skip PNG rendering
    #[arg(long)]
    no_render: bool,

    /// Also write the vegetation index of each scene as a float GeoTIFF
    #[arg(long)]
    geotiff: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            normalize: NormalizeParams {
                raw_max: self.raw_max,
                use_reflectance: self.reflectance,
            },
            water: WaterMaskParams {
                threshold: self.water_threshold,
                enabled: !self.no_water_mask,
            },
            classify: ClassifyParams { veg_low: self.veg_low },
            strict_shape: !self.allow_shape_change,
        }
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn progress(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.green/white} {pos}/{len} {msg}")
            .unwrap(),
    );
    pb
}

/// Decode a scene and attach its sidecar, if any.
///
/// The file-name date is authoritative; a differing sidecar date is logged.
fn load_scene(files: &SceneFiles) -> greentrend_core::Result<RawScene> {
    let decoded = read_scene_tiff(&files.image)?;
    let mut raw = RawScene::new(files.date, decoded.bands, decoded.bit_depth);

    if let Some(path) = &files.metadata {
        let metadata = read_scene_metadata(path)?;
        if let Some(acquired) = metadata.acquired.filter(|d| *d != files.date) {
            warn!(
                "{}: sidecar date {} differs from file name, using {}",
                files.image.display(),
                acquired,
                files.date
            );
        }
        if let Some(coefficients) = metadata.reflectance {
            raw = raw.with_reflectance(coefficients);
        }
    }

    Ok(raw)
}

fn render_scene(analysis: &SceneAnalysis, pipeline: &Pipeline, out: &Path) -> greentrend_core::Result<()> {
    let (rows, cols) = analysis.scene.shape();
    let stem = analysis.date().format("%Y-%m-%d").to_string();
    let indices = &analysis.indices;

    let ndvi = index_to_rgba(&indices.vegetation, &ColormapParams::new(ColorScheme::Ndvi));
    write_png(out.join(format!("{stem}-ndvi.png")), ndvi, cols, rows)?;

    let ndwi = index_to_rgba(&indices.water, &ColormapParams::new(ColorScheme::Water));
    write_png(out.join(format!("{stem}-ndwi.png")), ndwi, cols, rows)?;

    let water = mask_to_rgba(&indices.mask, WATER_COLOR);
    write_png(out.join(format!("{stem}-water.png")), water, cols, rows)?;

    let classes = pipeline.classifier().class_map(&indices.vegetation, &indices.mask)?;
    write_png(out.join(format!("{stem}-classes.png")), classes_to_rgba(&classes), cols, rows)
}

/// Vegetation proportion, soil proportion and median NDVI against days
/// since the first scene.
fn render_series(analysis: &SeriesAnalysis, path: &Path) -> greentrend_core::Result<()> {
    let series = &analysis.series;
    let Some(first) = series.first_date() else {
        return Ok(());
    };
    let lines: Vec<ChartLine> = SERIES_LINES
        .iter()
        .map(|&(metric, color)| {
            let points = series
                .samples(metric)
                .iter()
                .map(|s| ((s.date - first).num_days() as f64, s.value))
                .collect();
            ChartLine::new(points, color)
        })
        .collect();

    let (width, height) = SERIES_SIZE;
    let rgba = line_chart_rgba(&lines, width, height)?;
    write_png(path, rgba, width as usize, height as usize)
}

fn scene_report(analysis: &SceneAnalysis) -> greentrend_core::Result<SceneReport> {
    let (rows, cols) = analysis.scene.shape();
    let indices = &analysis.indices;
    Ok(SceneReport {
        date: analysis.date(),
        rows,
        cols,
        water_pixels: indices.mask.masked_count(),
        classification: analysis.classification().cloned(),
        ndvi_histogram: index_histogram(&indices.vegetation, Some(&indices.mask), HISTOGRAM_BINS)?,
    })
}

fn format_rate(trend: &TrendResult) -> String {
    format!(
        "({:+.3} ± {:.3}) % per day",
        trend.mean_rate_per_day() * 100.0,
        trend.rate_per_day_uncertainty() * 100.0
    )
}

fn verdict(trend: &TrendResult) -> &'static str {
    match trend.direction() {
        TrendDirection::Greening => "The area is greening.",
        TrendDirection::Browning => "The area is browning.",
        TrendDirection::NoSignificantChange => "No significant change in vegetation cover.",
    }
}

fn print_summary(analysis: &SeriesAnalysis) {
    let series = &analysis.series;
    if let (Some(first), Some(last)) = (series.first_date(), series.last_date()) {
        println!(
            "\nSeries: {} scenes from {} to {} ({} days)",
            series.len(),
            first,
            last,
            series.span_days()
        );
    }
    for dropped in &analysis.dropped {
        println!("  Dropped {}: {}", dropped.date, dropped.reason);
    }

    if let Some(primary) = analysis.primary_trend() {
        println!("\nVegetation proportion: {}", format_rate(primary));
        println!("{}", verdict(primary));
    }

    for metric in [TrendMetric::SoilProportion, TrendMetric::MedianIndex] {
        if let Some(trend) = analysis.trend_for(metric) {
            println!("  {}: {} ({})", metric, format_rate(trend), trend.direction());
        }
    }
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    if !cli.data_directory.is_dir() {
        anyhow::bail!("Data directory not found: {}", cli.data_directory.display());
    }
    std::fs::create_dir_all(&cli.output_directory)
        .with_context(|| format!("Failed to create {}", cli.output_directory.display()))?;

    let config = cli.pipeline_config();
    let pipeline = Pipeline::new(config.clone()).context("Invalid configuration")?;

    let start = Instant::now();

    let pb = spinner("Searching for scenes...");
    let files = discover_scenes(&cli.data_directory).context("Failed to search data directory")?;
    pb.finish_and_clear();
    if files.is_empty() {
        anyhow::bail!("No *_AnalyticMS.tif scenes found in {}", cli.data_directory.display());
    }
    info!("Found {} scenes", files.len());

    let pb = progress(files.len());
    let current = Cell::new(0usize);
    let scenes = files.iter().enumerate().map(|(i, f)| {
        current.set(i);
        pb.set_message(f.date.to_string());
        load_scene(f)
    });

    let mut reports = Vec::with_capacity(files.len());
    let analysis = pipeline
        .run(scenes, |analysis| {
            if !cli.no_render {
                render_scene(analysis, &pipeline, &cli.output_directory)?;
            }
            if cli.geotiff {
                let path = cli.output_directory.join(format!("{}-ndvi.tif", analysis.date().format("%Y-%m-%d")));
                write_index_tiff(&analysis.indices.vegetation, path)?;
            }
            reports.push(scene_report(analysis)?);

            pb.inc(1);
            Ok(())
        })
        .with_context(|| format!("Analysis failed (last scene read: {})", files[current.get()].image.display()))?;
    pb.finish_and_clear();

    print_summary(&analysis);

    if !cli.no_render {
        let series_path = cli.output_directory.join(SERIES_FILE);
        render_series(&analysis, &series_path).context("Failed to render series chart")?;
        info!("Series chart written to {}", series_path.display());
    }

    let summary_path = cli.output_directory.join(SUMMARY_FILE);
    Summary::new(&config, &analysis, &reports).write(&summary_path)?;
    done("Summary", &summary_path, start.elapsed());

    Ok(())
}

fn done(name: &str, path: &Path, elapsed: std::time::Duration) {
    println!("\n{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}
