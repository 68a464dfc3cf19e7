//! Line Chart Module
//! One line per category over a shared date axis, with a toggleable legend.

use crate::charts::canvas::{self, cartesian, render_svg};
use crate::charts::{
    day_label, hex, ChartDataSource, ChartSpec, ChartView, Layout, PlotFrame, RenderError,
    SeriesSpec,
};
use plotters::prelude::*;
use tracing::debug;

/// Presentation settings of the multi-line chart.
#[derive(Debug, Clone, PartialEq)]
pub struct LineChartOptions {
    pub id: String,
    pub width: u32,
    pub height: u32,
    pub y_label: String,
    pub category_label: String,
    pub value_label: String,
}

impl Default for LineChartOptions {
    fn default() -> Self {
        Self {
            id: "daily-new-cases".to_string(),
            width: 1000,
            height: 800,
            y_label: "Averaged daily new cases".to_string(),
            category_label: "Canton".to_string(),
            value_label: "Cases".to_string(),
        }
    }
}

/// Draws multi-line charts as stacked SVG layers.
pub struct LinePlotter;

impl LinePlotter {
    pub fn render(
        source: &ChartDataSource,
        options: &LineChartOptions,
    ) -> Result<ChartView, RenderError> {
        if source.is_empty() {
            return Err(RenderError::InvalidData("no dates to plot".to_string()));
        }

        let layout = Layout::new(options.width, options.height);
        let start = source.dates()[0];
        let offsets = canvas::day_offsets(source.dates());
        let x_range = canvas::day_range(&offsets);
        let y_range = canvas::value_range(source.series().iter().flat_map(|s| &s.values));

        let (base, frame) = render_svg(&layout, |root| {
            root.fill(&WHITE).map_err(RenderError::draw)?;
            let mut chart = cartesian(root, &layout, x_range.clone(), y_range.clone())?;
            let date_formatter = |x: &f64| day_label(start, *x);
            chart
                .configure_mesh()
                .x_desc("Date")
                .y_desc(options.y_label.as_str())
                .x_labels(10)
                .x_label_formatter(&date_formatter)
                .draw()
                .map_err(RenderError::draw)?;
            Ok(PlotFrame::capture(&chart, &layout, &x_range, &y_range))
        })?;

        let mut markup = format!(
            "<div class=\"chart-stage\" style=\"width:{}px;height:{}px\">\n<div class=\"layer\">{}</div>\n",
            options.width, options.height, base
        );
        for i in 0..source.series().len() {
            let (svg, _) = Self::render_layer(source, options, i)?;
            markup.push_str(&format!(
                "<div class=\"layer\" data-series=\"{i}\">{svg}</div>\n"
            ));
        }
        markup.push_str("<div class=\"hover-marker\"></div>\n</div>\n<div class=\"legend\"></div>");

        debug!(series = source.series().len(), points = source.len(), "rendered line chart");

        let spec = ChartSpec::Lines {
            id: options.id.clone(),
            frame,
            dates: source.dates().iter().map(|d| d.format("%Y-%m-%d").to_string()).collect(),
            x: offsets,
            series: source
                .series()
                .iter()
                .map(|s| SeriesSpec {
                    name: s.name.clone(),
                    color: hex(s.color),
                    values: s.values.clone(),
                })
                .collect(),
            category_label: options.category_label.clone(),
            value_label: options.value_label.clone(),
        };

        Ok(ChartView { markup, spec })
    }

    /// Draw the transparent layer of one series.
    pub fn render_layer(
        source: &ChartDataSource,
        options: &LineChartOptions,
        index: usize,
    ) -> Result<(String, PlotFrame), RenderError> {
        let series = source.series().get(index).ok_or_else(|| {
            RenderError::InvalidData(format!("no series at position {index}"))
        })?;
        let layout = Layout::new(options.width, options.height);
        let offsets = canvas::day_offsets(source.dates());
        let x_range = canvas::day_range(&offsets);
        let y_range = canvas::value_range(source.series().iter().flat_map(|s| &s.values));

        render_svg(&layout, |root| {
            let mut chart = cartesian(root, &layout, x_range.clone(), y_range.clone())?;
            chart
                .draw_series(LineSeries::new(
                    offsets.iter().copied().zip(series.values.iter().copied()),
                    series.color.stroke_width(2),
                ))
                .map_err(RenderError::draw)?;
            Ok(PlotFrame::capture(&chart, &layout, &x_range, &y_range))
        })
    }
}
