//! Color palettes for categories, stacks and the positive rate color mapper.

use plotters::style::colors::colormaps::{ColorMap, ViridisRGB};
use plotters::style::RGBColor;

/// Stack colors of the population chart.
pub const MALE_COLOR: RGBColor = RGBColor(46, 204, 113); // Green
pub const FEMALE_COLOR: RGBColor = RGBColor(52, 152, 219); // Blue

/// `n` distinct colors sampled evenly along viridis, in category order.
pub fn category_colors(n: usize) -> Vec<RGBColor> {
    match n {
        0 => Vec::new(),
        1 => vec![ViridisRGB.get_color_normalized(0.0f64, 0.0, 1.0)],
        _ => (0..n)
            .map(|i| ViridisRGB.get_color_normalized(i as f64, 0.0, (n - 1) as f64))
            .collect(),
    }
}

/// Linear color mapping of `value` within `[low, high]`.
pub fn rate_color(value: f64, low: f64, high: f64) -> RGBColor {
    if high > low {
        ViridisRGB.get_color_normalized(value.clamp(low, high), low, high)
    } else {
        ViridisRGB.get_color_normalized(0.5f64, 0.0, 1.0)
    }
}

/// CSS hex notation.
pub fn hex(color: RGBColor) -> String {
    format!("#{:02x}{:02x}{:02x}", color.0, color.1, color.2)
}
