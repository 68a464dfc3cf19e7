//! Time Series Table Module
//! Date indexed table holding one cumulative counter per category (canton).

use crate::data::DataError;
use chrono::NaiveDate;

/// Derived sequences for a single category.
///
/// `delta` and `average` stay empty until the processor has run.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySeries {
    pub name: String,
    pub cumulative: Vec<f64>,
    pub delta: Vec<f64>,
    pub average: Vec<f64>,
}

impl CategorySeries {
    pub fn new(name: impl Into<String>, cumulative: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            cumulative,
            delta: Vec::new(),
            average: Vec::new(),
        }
    }

    /// Whether daily deltas and averages have been computed.
    pub fn is_derived(&self) -> bool {
        !self.cumulative.is_empty()
            && self.delta.len() == self.cumulative.len()
            && self.average.len() == self.cumulative.len()
    }
}

/// Rows indexed by strictly increasing dates, one column per category.
///
/// Every category column has a value for every row.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesTable {
    dates: Vec<NaiveDate>,
    categories: Vec<CategorySeries>,
}

impl TimeSeriesTable {
    /// Build a table from raw columns, forward filling missing cells.
    pub fn new(
        dates: Vec<NaiveDate>,
        columns: Vec<(String, Vec<Option<f64>>)>,
    ) -> Result<Self, DataError> {
        if let Some(pair) = dates.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(DataError::invalid(format!(
                "dates must be strictly increasing, found {} followed by {}",
                pair[0], pair[1]
            )));
        }

        let mut categories = Vec::with_capacity(columns.len());
        for (name, raw) in columns {
            if raw.len() != dates.len() {
                return Err(DataError::invalid(format!(
                    "column {name} has {} values for {} dates",
                    raw.len(),
                    dates.len()
                )));
            }
            if categories.iter().any(|c: &CategorySeries| c.name == name) {
                return Err(DataError::invalid(format!("duplicate column {name}")));
            }
            categories.push(CategorySeries::new(name, forward_fill(&raw)));
        }

        Ok(Self { dates, categories })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn categories(&self) -> &[CategorySeries] {
        &self.categories
    }

    pub(crate) fn categories_mut(&mut self) -> &mut [CategorySeries] {
        &mut self.categories
    }

    pub fn category(&self, name: &str) -> Option<&CategorySeries> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn category_names(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.name.clone()).collect()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Replace each missing value with the most recent preceding value.
///
/// Cumulative counts start at zero, so nulls before the first value become 0.
pub fn forward_fill(values: &[Option<f64>]) -> Vec<f64> {
    values
        .iter()
        .scan(0.0, |last, value| {
            if let Some(v) = value {
                *last = *v;
            }
            Some(*last)
        })
        .collect()
}
