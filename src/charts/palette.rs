//! Color palettes shared by all static charts.

use plotters::style::RGBColor;

/// Categorical palette for one-line-per-industry charts.
pub const PALETTE: [RGBColor; 10] = [
    RGBColor(76, 114, 176),  // Blue
    RGBColor(221, 132, 82),  // Orange
    RGBColor(85, 168, 104),  // Green
    RGBColor(196, 78, 82),   // Red
    RGBColor(129, 114, 179), // Purple
    RGBColor(147, 120, 96),  // Brown
    RGBColor(218, 139, 195), // Pink
    RGBColor(140, 140, 140), // Gray
    RGBColor(204, 185, 116), // Olive
    RGBColor(100, 181, 205), // Cyan
];

/// Viridis, sampled at 0, 0.25, 0.5, 0.75 and 1.
const VIRIDIS: [RGBColor; 5] = [
    RGBColor(68, 1, 84),
    RGBColor(59, 82, 139),
    RGBColor(33, 145, 140),
    RGBColor(94, 201, 98),
    RGBColor(253, 231, 37),
];

/// Diverging blue-white-red map for the correlation heatmap.
const COOLWARM: [RGBColor; 5] = [
    RGBColor(59, 76, 192),
    RGBColor(130, 165, 251),
    RGBColor(221, 220, 220),
    RGBColor(244, 154, 123),
    RGBColor(180, 4, 38),
];

pub const MISSING_CELL: RGBColor = RGBColor(235, 235, 235);

/// Get color for the n-th series.
pub fn series_color(index: usize) -> RGBColor {
    PALETTE[index % PALETTE.len()]
}

/// `n` evenly spaced viridis colors, dark to light.
pub fn viridis_colors(n: usize) -> Vec<RGBColor> {
    (0..n)
        .map(|i| {
            let t = if n <= 1 {
                0.0
            } else {
                i as f64 / (n - 1) as f64
            };
            interpolate(&VIRIDIS, t)
        })
        .collect()
}

/// Map `value` within `[min, max]` onto the coolwarm gradient.
pub fn coolwarm(value: f64, min: f64, max: f64) -> RGBColor {
    let t = if max > min {
        (value - min) / (max - min)
    } else {
        0.5
    };
    interpolate(&COOLWARM, t)
}

/// Black or white, whichever reads better on `background`.
pub fn text_color_for(background: RGBColor) -> RGBColor {
    let RGBColor(r, g, b) = background;
    let luminance = (0.2126 * r as f64 + 0.7152 * g as f64 + 0.0722 * b as f64) / 255.0;
    if luminance < 0.408 {
        RGBColor(255, 255, 255)
    } else {
        RGBColor(0, 0, 0)
    }
}

fn interpolate(stops: &[RGBColor], t: f64) -> RGBColor {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let scaled = t * (stops.len() - 1) as f64;
    let lower = (scaled.floor() as usize).min(stops.len() - 2);
    let frac = scaled - lower as f64;

    let (a, b) = (stops[lower], stops[lower + 1]);
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * frac).round() as u8;
    RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}
