//! Charts module - SVG rendering and HTML report assembly

mod bar_chart;
mod canvas;
mod line_chart;
mod linked_chart;
mod palette;
mod report;
mod source;

pub use bar_chart::{BarChartOptions, BarSegment, StackedBarPlotter};
pub use canvas::{day_label, Layout, PlotFrame};
pub use line_chart::{LineChartOptions, LinePlotter};
pub use linked_chart::{LinkedChartOptions, LinkedScatterPlotter};
pub use palette::{category_colors, hex, rate_color, FEMALE_COLOR, MALE_COLOR};
pub use report::{ChartSpec, ChartView, HtmlReport, SeriesSpec};
pub use source::{ChartDataSource, NamedSeries};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to draw chart: {0}")]
    Draw(String),
    #[error("Invalid chart data: {0}")]
    InvalidData(String),
    #[error("Failed to encode chart description: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RenderError {
    pub(crate) fn draw<E: std::fmt::Display>(err: E) -> Self {
        RenderError::Draw(err.to_string())
    }
}
