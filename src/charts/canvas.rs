//! Shared SVG canvas helpers.
//!
//! Every chart is drawn as one or more SVG layers of identical size. Layers of
//! the same chart are built with the same [`Layout`] and data ranges, so their
//! plotting areas line up pixel for pixel and can be stacked in the page.

use crate::charts::RenderError;
use chrono::{Duration, NaiveDate};
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use serde::Serialize;
use std::ops::Range;

pub(crate) type Chart<'a, 'b> =
    ChartContext<'a, SVGBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Pixel size and label area reservation of one SVG layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub width: u32,
    pub height: u32,
    pub margin: u32,
    pub x_label_area: u32,
    pub y_label_area: u32,
}

impl Layout {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            margin: 15,
            x_label_area: 50,
            y_label_area: 70,
        }
    }
}

/// Where the plotting area sits in the layer and which data it spans.
///
/// Shipped to the page so hover and range interactions can map between
/// pointer pixels and data coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlotFrame {
    pub width: u32,
    pub height: u32,
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl PlotFrame {
    pub(crate) fn capture(chart: &Chart, layout: &Layout, x: &Range<f64>, y: &Range<f64>) -> Self {
        let (px, py) = chart.plotting_area().get_pixel_range();
        Self {
            width: layout.width,
            height: layout.height,
            left: px.start,
            right: px.end,
            top: py.start,
            bottom: py.end,
            x_min: x.start,
            x_max: x.end,
            y_min: y.start,
            y_max: y.end,
        }
    }

    /// Horizontal pixel of a data x value.
    pub fn pixel_x(&self, x: f64) -> f64 {
        let span = self.x_max - self.x_min;
        self.left as f64 + (x - self.x_min) / span * (self.right - self.left) as f64
    }

    /// Vertical pixel of a data y value.
    pub fn pixel_y(&self, y: f64) -> f64 {
        let span = self.y_max - self.y_min;
        self.bottom as f64 - (y - self.y_min) / span * (self.bottom - self.top) as f64
    }
}

/// Draw into a fresh SVG document and return its markup.
pub(crate) fn render_svg<T, F>(layout: &Layout, draw: F) -> Result<(String, T), RenderError>
where
    F: FnOnce(&DrawingArea<SVGBackend, Shift>) -> Result<T, RenderError>,
{
    let mut svg = String::new();
    let out = {
        let root = SVGBackend::with_string(&mut svg, (layout.width, layout.height))
            .into_drawing_area();
        let out = draw(&root)?;
        root.present().map_err(RenderError::draw)?;
        out
    };
    Ok((svg, out))
}

/// Cartesian chart with the layout's label areas reserved and no caption.
pub(crate) fn cartesian<'a, 'b>(
    root: &'a DrawingArea<SVGBackend<'b>, Shift>,
    layout: &Layout,
    x: Range<f64>,
    y: Range<f64>,
) -> Result<Chart<'a, 'b>, RenderError> {
    ChartBuilder::on(root)
        .margin(layout.margin)
        .x_label_area_size(layout.x_label_area)
        .y_label_area_size(layout.y_label_area)
        .build_cartesian_2d(x, y)
        .map_err(RenderError::draw)
}

/// Value range padded by 5% above, always including zero.
pub(crate) fn value_range<'a>(values: impl IntoIterator<Item = &'a f64>) -> Range<f64> {
    let (low, high) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((0.0f64, 0.0f64), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if high - low <= f64::EPSILON {
        return low..low + 1.0;
    }
    let pad = (high - low) * 0.05;
    let low = if low < 0.0 { low - pad } else { low };
    low..high + pad
}

/// Day offset of each date relative to the first one.
pub(crate) fn day_offsets(dates: &[NaiveDate]) -> Vec<f64> {
    let Some(&start) = dates.first() else {
        return Vec::new();
    };
    dates
        .iter()
        .map(|d| (*d - start).num_days() as f64)
        .collect()
}

/// Horizontal date range, at least one day wide.
pub(crate) fn day_range(offsets: &[f64]) -> Range<f64> {
    let end = offsets.last().copied().unwrap_or(0.0);
    0.0..end.max(1.0)
}

/// Format a day offset as an ISO date.
pub fn day_label(start: NaiveDate, offset: f64) -> String {
    (start + Duration::days(offset.round() as i64))
        .format("%Y-%m-%d")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, m, d).unwrap()
    }

    #[test]
    fn offsets_count_calendar_days() {
        let offsets = day_offsets(&[date(2, 28), date(2, 29), date(3, 2)]);
        assert_eq!(offsets, vec![0.0, 1.0, 3.0]);
        assert_eq!(day_range(&offsets), 0.0..3.0);
        assert_eq!(day_range(&[0.0]), 0.0..1.0);
    }

    #[test]
    fn day_labels_are_iso_dates() {
        assert_eq!(day_label(date(2, 28), 2.0), "2020-03-01");
    }

    #[test]
    fn value_range_includes_zero_and_pads() {
        let range = value_range(&[2.0, 10.0]);
        assert_eq!(range.start, 0.0);
        assert_relative_eq!(range.end, 10.5);

        let range = value_range(&[-10.0, 10.0]);
        assert_relative_eq!(range.start, -11.0);

        assert_eq!(value_range(&[0.0, 0.0]), 0.0..1.0);
    }

    #[test]
    fn layers_share_the_plotting_area() {
        let layout = Layout::new(400, 300);
        let frame = |fill: bool| {
            render_svg(&layout, |root| {
                if fill {
                    root.fill(&WHITE).map_err(RenderError::draw)?;
                }
                let chart = cartesian(root, &layout, 0.0..10.0, 0.0..5.0)?;
                Ok(PlotFrame::capture(&chart, &layout, &(0.0..10.0), &(0.0..5.0)))
            })
            .unwrap()
        };

        let (svg, base) = frame(true);
        let (_, layer) = frame(false);
        assert!(svg.contains("<svg"));
        assert_eq!(base, layer);
        assert!(base.left >= layout.y_label_area as i32);
        assert!(base.bottom <= (layout.height - layout.x_label_area) as i32);
        assert_relative_eq!(base.pixel_x(0.0), base.left as f64);
        assert_relative_eq!(base.pixel_y(5.0), base.top as f64);
    }
}
