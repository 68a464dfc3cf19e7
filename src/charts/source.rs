//! Chart Data Source Module
//! Immutable parallel sequences handed to the plotters: a shared date axis
//! plus one named, colored series per category.

use crate::charts::{category_colors, RenderError};
use crate::data::TimeSeriesTable;
use chrono::NaiveDate;
use plotters::style::RGBColor;

#[derive(Debug, Clone, PartialEq)]
pub struct NamedSeries {
    pub name: String,
    pub color: RGBColor,
    pub values: Vec<f64>,
}

/// Date axis and category series of equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartDataSource {
    dates: Vec<NaiveDate>,
    series: Vec<NamedSeries>,
}

impl ChartDataSource {
    /// Assign colors in series order and check alignment with the date axis.
    pub fn new(dates: Vec<NaiveDate>, series: Vec<(String, Vec<f64>)>) -> Result<Self, RenderError> {
        if let Some((name, values)) = series.iter().find(|(_, v)| v.len() != dates.len()) {
            return Err(RenderError::InvalidData(format!(
                "series {name} has {} values for {} dates",
                values.len(),
                dates.len()
            )));
        }

        let colors = category_colors(series.len());
        let series = series
            .into_iter()
            .zip(colors)
            .map(|((name, values), color)| NamedSeries {
                name,
                color,
                values,
            })
            .collect();

        Ok(Self { dates, series })
    }

    /// Use each category's trailing average as its series.
    pub fn from_averages(table: &TimeSeriesTable) -> Result<Self, RenderError> {
        let mut series = Vec::with_capacity(table.categories().len());
        for category in table.categories() {
            if !category.is_derived() {
                return Err(RenderError::InvalidData(format!(
                    "averages for {} have not been computed",
                    category.name
                )));
            }
            series.push((category.name.clone(), category.average.clone()));
        }
        Self::new(table.dates().to_vec(), series)
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn series(&self) -> &[NamedSeries] {
        &self.series
    }

    pub fn get(&self, name: &str) -> Option<&NamedSeries> {
        self.series.iter().find(|s| s.name == name)
    }

    /// Number of points on the date axis.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}
