//! Linked Scatter Chart Module
//! Detail scatter of total tests colored by positive rate, a color bar, and an
//! overview line of positive cases carrying the range selector.

use crate::charts::canvas::{self, cartesian, render_svg};
use crate::charts::{day_label, rate_color, ChartSpec, ChartView, Layout, PlotFrame, RenderError};
use crate::data::TestVolumeSeries;
use plotters::prelude::*;
use tracing::debug;

const COLOR_BAR_STEPS: usize = 64;

/// Presentation settings of the linked charts.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkedChartOptions {
    pub id: String,
    /// Visible width of the detail chart and width of the overview.
    pub width: u32,
    pub detail_height: u32,
    pub overview_height: u32,
    pub color_bar_width: u32,
    /// Initially visible span of the detail chart, in rows.
    pub initial_days: usize,
    pub point_size: u32,
}

impl Default for LinkedChartOptions {
    fn default() -> Self {
        Self {
            id: "covid-tests".to_string(),
            width: 1600,
            detail_height: 650,
            overview_height: 250,
            color_bar_width: 110,
            initial_days: 30,
            point_size: 5,
        }
    }
}

/// Draws the detail/overview pair.
pub struct LinkedScatterPlotter;

impl LinkedScatterPlotter {
    /// Full width of the scrollable detail chart so that `initial_days`
    /// rows fill the visible width.
    pub fn detail_width(offsets: &[f64], options: &LinkedChartOptions) -> u32 {
        let span = canvas::day_range(offsets).end;
        let window_end = options.initial_days.min(offsets.len().saturating_sub(1));
        let window = offsets.get(window_end).copied().unwrap_or(span).max(1.0);
        let scaled = options.width as f64 * span / window;
        (scaled.round() as u32).max(options.width)
    }

    pub fn render(
        series: &TestVolumeSeries,
        options: &LinkedChartOptions,
    ) -> Result<ChartView, RenderError> {
        if series.is_empty() {
            return Err(RenderError::InvalidData("no test data to plot".to_string()));
        }

        let start = series.dates[0];
        let offsets = canvas::day_offsets(&series.dates);
        let x_range = canvas::day_range(&offsets);
        let (low, high) = series.rate_range();
        let date_formatter = |x: &f64| day_label(start, *x);

        let detail_width = Self::detail_width(&offsets, options);
        let detail_layout = Layout::new(detail_width, options.detail_height);
        let tests_range = canvas::value_range(&series.tests);
        let (detail_svg, detail) = render_svg(&detail_layout, |root| {
            root.fill(&WHITE).map_err(RenderError::draw)?;
            let mut chart = cartesian(root, &detail_layout, x_range.clone(), tests_range.clone())?;
            chart
                .configure_mesh()
                .x_desc("Date")
                .y_desc("Total Tests")
                .x_labels((offsets.len() / 3).max(2))
                .x_label_formatter(&date_formatter)
                .draw()
                .map_err(RenderError::draw)?;
            chart
                .draw_series(offsets.iter().zip(&series.tests).zip(&series.positive_rate).map(
                    |((&x, &tests), &rate)| {
                        Circle::new((x, tests), options.point_size, rate_color(rate, low, high).filled())
                    },
                ))
                .map_err(RenderError::draw)?;
            Ok(PlotFrame::capture(&chart, &detail_layout, &x_range, &tests_range))
        })?;

        let bar_layout = Layout {
            x_label_area: detail_layout.x_label_area,
            y_label_area: 0,
            ..Layout::new(options.color_bar_width, options.detail_height)
        };
        let rate_range = if high > low { low..high } else { low..low + 1.0 };
        let (bar_svg, _) = render_svg(&bar_layout, |root| {
            root.fill(&WHITE).map_err(RenderError::draw)?;
            let mut chart = ChartBuilder::on(root)
                .margin(bar_layout.margin)
                .x_label_area_size(bar_layout.x_label_area)
                .right_y_label_area_size(70)
                .build_cartesian_2d(0.0..1.0, rate_range.clone())
                .map_err(RenderError::draw)?;
            let step = (rate_range.end - rate_range.start) / COLOR_BAR_STEPS as f64;
            chart
                .draw_series((0..COLOR_BAR_STEPS).map(|i| {
                    let y0 = rate_range.start + step * i as f64;
                    Rectangle::new(
                        [(0.0, y0), (1.0, y0 + step)],
                        rate_color(y0 + step / 2.0, low, high).filled(),
                    )
                }))
                .map_err(RenderError::draw)?;
            let percent = |y: &f64| format!("{:.1}%", y * 100.0);
            chart
                .configure_mesh()
                .disable_mesh()
                .disable_x_axis()
                .y_desc("P-rate")
                .y_labels(8)
                .y_label_formatter(&percent)
                .draw()
                .map_err(RenderError::draw)?;
            Ok(())
        })?;

        let overview_layout = Layout::new(options.width, options.overview_height);
        let positives_range = canvas::value_range(&series.positives);
        let (overview_svg, overview) = render_svg(&overview_layout, |root| {
            root.fill(&WHITE).map_err(RenderError::draw)?;
            let mut chart =
                cartesian(root, &overview_layout, x_range.clone(), positives_range.clone())?;
            chart
                .configure_mesh()
                .disable_y_mesh()
                .x_desc("Date")
                .y_desc("Positive Cases")
                .x_labels(12)
                .x_label_formatter(&date_formatter)
                .draw()
                .map_err(RenderError::draw)?;
            chart
                .draw_series(LineSeries::new(
                    offsets.iter().copied().zip(series.positives.iter().copied()),
                    BLUE.stroke_width(2),
                ))
                .map_err(RenderError::draw)?;
            Ok(PlotFrame::capture(&chart, &overview_layout, &x_range, &positives_range))
        })?;

        debug!(days = series.len(), detail_width, "rendered linked test charts");

        let markup = format!(
            "<div class=\"linked-top\">\n\
             <div class=\"detail-scroll\" style=\"width:{width}px\">\n\
             <div class=\"chart-stage detail\" style=\"width:{detail_width}px;height:{dh}px\">\n\
             <div class=\"layer\">{detail_svg}</div>\n<div class=\"hover-marker\"></div>\n</div>\n</div>\n\
             <div class=\"color-bar\">{bar_svg}</div>\n</div>\n\
             <div class=\"chart-stage overview\" style=\"width:{width}px;height:{oh}px\">\n\
             <div class=\"layer\">{overview_svg}</div>\n<div class=\"range-window\"></div>\n\
             <div class=\"hover-marker\"></div>\n</div>",
            width = options.width,
            dh = options.detail_height,
            oh = options.overview_height,
        );
        let spec = ChartSpec::LinkedScatter {
            id: options.id.clone(),
            detail,
            overview,
            dates: series.dates.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect(),
            x: offsets,
            tests: series.tests.clone(),
            positives: series.positives.clone(),
            rates: series.positive_rate.clone(),
        };

        Ok(ChartView { markup, spec })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_width_fits_initial_window() {
        let options = LinkedChartOptions {
            width: 1000,
            initial_days: 30,
            ..LinkedChartOptions::default()
        };
        let offsets: Vec<f64> = (0..91).map(f64::from).collect();

        assert_eq!(LinkedScatterPlotter::detail_width(&offsets, &options), 3000);
    }

    #[test]
    fn short_series_keep_the_visible_width() {
        let options = LinkedChartOptions {
            width: 1000,
            ..LinkedChartOptions::default()
        };
        let offsets: Vec<f64> = (0..10).map(f64::from).collect();

        assert_eq!(LinkedScatterPlotter::detail_width(&offsets, &options), 1000);
        assert_eq!(LinkedScatterPlotter::detail_width(&[0.0], &options), 1000);
    }

    #[test]
    fn empty_series_is_invalid() {
        let empty = TestVolumeSeries {
            dates: Vec::new(),
            positives: Vec::new(),
            positive_rate: Vec::new(),
            tests: Vec::new(),
        };
        let result = LinkedScatterPlotter::render(&empty, &LinkedChartOptions::default());
        assert!(matches!(result, Err(RenderError::InvalidData(_))));
    }
}
