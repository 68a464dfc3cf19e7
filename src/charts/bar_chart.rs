//! Stacked Bar Chart Module
//! Population per (canton, age group) with one stacked segment per sex.

use crate::charts::canvas::{cartesian, render_svg};
use crate::charts::{
    hex, ChartSpec, ChartView, Layout, PlotFrame, RenderError, SeriesSpec, FEMALE_COLOR, MALE_COLOR,
};
use crate::data::PopulationStacks;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::debug;

/// Presentation settings of the stacked bar chart.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChartOptions {
    pub id: String,
    pub width: u32,
    pub height: u32,
    pub x_label: String,
    pub y_label: String,
    pub factor_label: String,
    pub value_label: String,
}

impl Default for BarChartOptions {
    fn default() -> Self {
        Self {
            id: "canton-population".to_string(),
            width: 1600,
            height: 500,
            x_label: "Canton".to_string(),
            y_label: "Population Size".to_string(),
            factor_label: "Canton, age group".to_string(),
            value_label: "population".to_string(),
        }
    }
}

/// Vertical extent of one stack within one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarSegment {
    pub factor: usize,
    pub stack: usize,
    pub bottom: f64,
    pub top: f64,
}

/// Draws grouped stacked bars.
pub struct StackedBarPlotter;

impl StackedBarPlotter {
    /// Stack colors in stack order.
    pub fn stack_colors() -> [RGBColor; 2] {
        [MALE_COLOR, FEMALE_COLOR]
    }

    /// Segments bottom to top, stacks in order, empty segments skipped.
    pub fn segments(stacks: &PopulationStacks) -> Vec<BarSegment> {
        let mut segments = Vec::new();
        for factor in 0..stacks.factors.len() {
            let mut bottom = 0.0;
            for (stack, s) in stacks.stacks.iter().enumerate() {
                let value = s.values[factor];
                if value > 0.0 {
                    segments.push(BarSegment {
                        factor,
                        stack,
                        bottom,
                        top: bottom + value,
                    });
                }
                bottom += value.max(0.0);
            }
        }
        segments
    }

    /// Cantons with their first and last factor position.
    fn canton_spans(stacks: &PopulationStacks) -> Vec<(&str, usize, usize)> {
        let mut spans: Vec<(&str, usize, usize)> = Vec::new();
        for (i, (canton, _)) in stacks.factors.iter().enumerate() {
            match spans.last_mut() {
                Some(span) if span.0 == canton.as_str() => span.2 = i,
                _ => spans.push((canton.as_str(), i, i)),
            }
        }
        spans
    }

    pub fn render(
        stacks: &PopulationStacks,
        options: &BarChartOptions,
    ) -> Result<ChartView, RenderError> {
        if stacks.factors.is_empty() {
            return Err(RenderError::InvalidData("no bars to plot".to_string()));
        }
        if stacks.stacks.len() > Self::stack_colors().len() {
            return Err(RenderError::InvalidData(format!(
                "{} stacks, at most {} supported",
                stacks.stacks.len(),
                Self::stack_colors().len()
            )));
        }

        let layout = Layout {
            x_label_area: 60,
            y_label_area: 80,
            ..Layout::new(options.width, options.height)
        };
        let colors = Self::stack_colors();
        let segments = Self::segments(stacks);
        let x_range = 0.0..stacks.factors.len() as f64;
        let top = stacks.totals().into_iter().fold(0.0f64, f64::max);
        let y_range = 0.0..(top * 1.1).max(1.0);

        let (svg, frame) = render_svg(&layout, |root| {
            root.fill(&WHITE).map_err(RenderError::draw)?;
            let mut chart = cartesian(root, &layout, x_range.clone(), y_range.clone())?;
            let no_label = |_: &f64| String::new();
            let whole = |y: &f64| format!("{y:.0}");
            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_desc(options.x_label.as_str())
                .y_desc(options.y_label.as_str())
                .x_label_formatter(&no_label)
                .y_label_formatter(&whole)
                .draw()
                .map_err(RenderError::draw)?;

            chart
                .draw_series(segments.iter().map(|seg| {
                    let x = seg.factor as f64;
                    Rectangle::new(
                        [(x + 0.25, seg.bottom), (x + 0.75, seg.top)],
                        colors[seg.stack].mix(0.3).filled(),
                    )
                }))
                .map_err(RenderError::draw)?;
            chart
                .draw_series(segments.iter().map(|seg| {
                    let x = seg.factor as f64;
                    Rectangle::new(
                        [(x + 0.25, seg.bottom), (x + 0.75, seg.top)],
                        colors[seg.stack].stroke_width(1),
                    )
                }))
                .map_err(RenderError::draw)?;

            let label_style =
                TextStyle::from(("sans-serif", 11).into_font()).pos(Pos::new(HPos::Center, VPos::Top));
            for (canton, first, last) in Self::canton_spans(stacks) {
                let center = (first + last + 1) as f64 / 2.0;
                let (px, py) = chart.backend_coord(&(center, y_range.start));
                root.draw(&Text::new(canton.to_string(), (px, py + 6), label_style.clone()))
                    .map_err(RenderError::draw)?;
            }

            Ok(PlotFrame::capture(&chart, &layout, &x_range, &y_range))
        })?;

        debug!(bars = stacks.factors.len(), segments = segments.len(), "rendered stacked bars");

        let markup = format!(
            "<div class=\"chart-stage\" style=\"width:{}px;height:{}px\">\n<div class=\"layer\">{}</div>\n</div>\n<div class=\"legend\"></div>",
            options.width, options.height, svg
        );
        let spec = ChartSpec::StackedBars {
            id: options.id.clone(),
            frame,
            factors: stacks.factors.clone(),
            stacks: stacks
                .stacks
                .iter()
                .zip(colors)
                .map(|(s, color)| SeriesSpec {
                    name: s.name.clone(),
                    color: hex(color),
                    values: s.values.clone(),
                })
                .collect(),
            factor_label: options.factor_label.clone(),
            value_label: options.value_label.clone(),
        };

        Ok(ChartView { markup, spec })
    }
}
