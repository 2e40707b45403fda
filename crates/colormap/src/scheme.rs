//! Colour schemes and multi-stop interpolation

/// RGB colour, 0..=255 per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_rgba(self, alpha: u8) -> [u8; 4] {
        [self.r, self.g, self.b, alpha]
    }
}

/// Position in [0, 1] mapped to a colour.
#[derive(Debug, Clone, Copy)]
pub struct ColorStop {
    pub t: f64,
    pub color: Rgb,
}

impl ColorStop {
    pub const fn new(t: f64, r: u8, g: u8, b: u8) -> Self {
        Self {
            t,
            color: Rgb::new(r, g, b),
        }
    }
}

/// Available colour schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorScheme {
    /// Water blue -> bare brown -> pale yellow -> dense green, over [-1, 1]
    Ndvi,
    /// Dry tan -> white -> deep blue, over [-1, 1]
    Water,
}

// ─── Colour stops ─────────────────────────────────────────────────────

// t = 0.5 is an index value of 0, t = 0.6 is the default soil/vegetation split
const NDVI_STOPS: &[ColorStop] = &[
    ColorStop::new(0.00, 37, 52, 148),
    ColorStop::new(0.45, 166, 189, 219),
    ColorStop::new(0.50, 140, 90, 40),
    ColorStop::new(0.60, 222, 203, 135),
    ColorStop::new(0.75, 120, 190, 70),
    ColorStop::new(1.00, 0, 90, 30),
];

const WATER_STOPS: &[ColorStop] = &[
    ColorStop::new(0.00, 191, 160, 110),
    ColorStop::new(0.50, 245, 245, 245),
    ColorStop::new(0.75, 90, 170, 225),
    ColorStop::new(1.00, 8, 48, 107),
];

/// Class palette: 0 undefined / unclassified, 1 soil, 2 vegetation, 3 water
pub const CLASS_PALETTE: &[Rgb] = &[
    Rgb::new(0, 0, 0),
    Rgb::new(176, 124, 64),
    Rgb::new(34, 139, 34),
    Rgb::new(30, 110, 200),
];

// ─── Interpolation ────────────────────────────────────────────────────

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn lerp_color(c1: Rgb, c2: Rgb, t: f64) -> Rgb {
    Rgb::new(
        lerp(c1.r as f64, c2.r as f64, t).round() as u8,
        lerp(c1.g as f64, c2.g as f64, t).round() as u8,
        lerp(c1.b as f64, c2.b as f64, t).round() as u8,
    )
}

fn multi_stop(stops: &[ColorStop], t: f64) -> Rgb {
    let last = stops[stops.len() - 1];
    if t <= stops[0].t {
        return stops[0].color;
    }
    stops
        .windows(2)
        .find(|pair| t <= pair[1].t)
        .map(|pair| {
            let ratio = (t - pair[0].t) / (pair[1].t - pair[0].t);
            lerp_color(pair[0].color, pair[1].color, ratio)
        })
        .unwrap_or(last.color)
}

/// Colour for class code `code`; out-of-range codes get the undefined colour.
pub fn class_color(code: u8) -> Rgb {
    CLASS_PALETTE
        .get(code as usize)
        .copied()
        .unwrap_or(CLASS_PALETTE[0])
}

/// Evaluate a scheme at normalized position `t` in [0, 1].
pub fn evaluate(scheme: ColorScheme, t: f64) -> Rgb {
    match scheme {
        ColorScheme::Ndvi => multi_stop(NDVI_STOPS, t),
        ColorScheme::Water => multi_stop(WATER_STOPS, t),
    }
}
