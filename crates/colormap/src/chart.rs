//! Line chart of per-scene series values

use greentrend_core::{Error, Result};
use image::{ImageBuffer, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};

use crate::scheme::Rgb;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const GRID: Rgba<u8> = Rgba([225, 225, 225, 255]);
const AXIS: Rgba<u8> = Rgba([90, 90, 90, 255]);
const MARGIN: u32 = 24;
const GRID_STEPS: u32 = 4;
const POINT_RADIUS: i32 = 3;

/// One plotted series: `(x, y)` points drawn in `color`
#[derive(Debug, Clone)]
pub struct ChartLine {
    pub points: Vec<(f64, f64)>,
    pub color: Rgb,
}

impl ChartLine {
    pub fn new(points: Vec<(f64, f64)>, color: Rgb) -> Self {
        Self { points, color }
    }
}

/// Render `lines` into a `width * height` RGBA buffer.
///
/// The y axis always covers `[0, 1]` and widens to include every value; the
/// x axis spans the smallest to the largest x over all lines.
pub fn line_chart_rgba(lines: &[ChartLine], width: u32, height: u32) -> Result<Vec<u8>> {
    if width <= 2 * MARGIN || height <= 2 * MARGIN {
        return Err(Error::Render(format!(
            "chart of {width}x{height} leaves no room inside a {MARGIN} pixel margin"
        )));
    }

    let points = || lines.iter().flat_map(|l| l.points.iter().copied());
    let (x_min, x_max) = points().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (x, _)| {
        (lo.min(x), hi.max(x))
    });
    let (y_min, y_max) = points().fold((0.0f64, 1.0f64), |(lo, hi), (_, y)| (lo.min(y), hi.max(y)));

    let left = MARGIN as f32;
    let right = (width - MARGIN) as f32;
    let top = MARGIN as f32;
    let bottom = (height - MARGIN) as f32;

    let project = |x: f64, y: f64| -> (f32, f32) {
        let tx = if x_max > x_min { (x - x_min) / (x_max - x_min) } else { 0.5 };
        let ty = (y - y_min) / (y_max - y_min);
        (
            left + (tx as f32) * (right - left),
            bottom - (ty as f32) * (bottom - top),
        )
    };

    let mut img: RgbaImage = ImageBuffer::from_pixel(width, height, BACKGROUND);

    for step in 0..=GRID_STEPS {
        let y = top + (bottom - top) * step as f32 / GRID_STEPS as f32;
        draw_line_segment_mut(&mut img, (left, y), (right, y), GRID);
    }
    draw_line_segment_mut(&mut img, (left, top), (left, bottom), AXIS);
    draw_line_segment_mut(&mut img, (left, bottom), (right, bottom), AXIS);

    for line in lines {
        let color = Rgba(line.color.to_rgba(255));
        let projected: Vec<(f32, f32)> = line.points.iter().map(|&(x, y)| project(x, y)).collect();
        for pair in projected.windows(2) {
            draw_line_segment_mut(&mut img, pair[0], pair[1], color);
        }
        for &(px, py) in &projected {
            draw_filled_circle_mut(&mut img, (px.round() as i32, py.round() as i32), POINT_RADIUS, color);
        }
    }

    Ok(img.into_raw())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb = Rgb::new(200, 0, 0);

    fn pixel(rgba: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * width + x) * 4) as usize;
        [rgba[i], rgba[i + 1], rgba[i + 2], rgba[i + 3]]
    }

    #[test]
    fn test_buffer_size_and_background() {
        let rgba = line_chart_rgba(&[], 120, 80).unwrap();
        assert_eq!(rgba.len(), 120 * 80 * 4);
        assert_eq!(pixel(&rgba, 120, 2, 2), [255, 255, 255, 255]);
    }

    #[test]
    fn test_points_land_at_plot_corners() {
        // x 0..10 spans the plot width, y 0 and 1 the plot height
        let line = ChartLine::new(vec![(0.0, 0.0), (10.0, 1.0)], RED);
        let rgba = line_chart_rgba(&[line], 124, 124).unwrap();

        assert_eq!(pixel(&rgba, 124, 24, 100), [200, 0, 0, 255]);
        assert_eq!(pixel(&rgba, 124, 100, 24), [200, 0, 0, 255]);
        assert_eq!(pixel(&rgba, 124, 62, 62), [200, 0, 0, 255]);
    }

    #[test]
    fn test_single_point_is_centered() {
        let line = ChartLine::new(vec![(5.0, 0.5)], RED);
        let rgba = line_chart_rgba(&[line], 124, 124).unwrap();
        assert_eq!(pixel(&rgba, 124, 62, 62), [200, 0, 0, 255]);
    }

    #[test]
    fn test_too_small_is_rejected() {
        let err = line_chart_rgba(&[], 40, 200).unwrap_err();
        assert!(matches!(err, Error::Render(_)));
    }
}
