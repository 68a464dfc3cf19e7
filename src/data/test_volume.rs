//! Test Volume Module
//! Daily test counts and positive rates from the federal testing dataset.

use crate::data::{DataError, DataLoader};
use chrono::NaiveDate;
use polars::prelude::DataFrame;
use statrs::statistics::Statistics;
use tracing::{info, warn};

/// Column names of the testing dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct TestVolumeColumns {
    pub date: String,
    pub positives: String,
    /// Mislabelled upstream: the column holds the fraction of positive tests.
    pub positive_rate: String,
    pub tests: String,
}

impl Default for TestVolumeColumns {
    fn default() -> Self {
        Self {
            date: "date".to_string(),
            positives: "n_positive".to_string(),
            positive_rate: "frac_negative".to_string(),
            tests: "n_tests".to_string(),
        }
    }
}

impl TestVolumeColumns {
    pub fn required(&self) -> [&str; 4] {
        [
            self.date.as_str(),
            self.positives.as_str(),
            self.positive_rate.as_str(),
            self.tests.as_str(),
        ]
    }
}

/// Parallel per-day sequences, all of equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct TestVolumeSeries {
    pub dates: Vec<NaiveDate>,
    pub positives: Vec<f64>,
    pub positive_rate: Vec<f64>,
    pub tests: Vec<f64>,
}

impl TestVolumeSeries {
    /// Extract complete rows, sorted by date.
    pub fn from_frame(df: &DataFrame, columns: &TestVolumeColumns) -> Result<Self, DataError> {
        let dates = DataLoader::get_string_values(df, &columns.date)?;
        let positives = DataLoader::get_numeric_values(df, &columns.positives)?;
        let rates = DataLoader::get_numeric_values(df, &columns.positive_rate)?;
        let tests = DataLoader::get_numeric_values(df, &columns.tests)?;

        let mut rows = Vec::with_capacity(dates.len());
        let mut skipped = 0usize;
        for (row, (((date, pos), rate), total)) in
            dates.into_iter().zip(positives).zip(rates).zip(tests).enumerate()
        {
            let (Some(date), Some(pos), Some(rate), Some(total)) = (date, pos, rate, total) else {
                skipped += 1;
                continue;
            };
            let date = super::loader::parse_date(&date).ok_or_else(|| {
                DataError::invalid(format!("row {row}: {date:?} is not a date"))
            })?;
            rows.push((date, pos, rate, total));
        }

        if skipped > 0 {
            warn!(rows = skipped, "skipped incomplete test rows");
        }
        if rows.is_empty() {
            return Err(DataError::invalid("no complete test rows"));
        }

        rows.sort_by_key(|r| r.0);
        if rows.windows(2).any(|pair| pair[0].0 == pair[1].0) {
            return Err(DataError::invalid("duplicate dates in test data"));
        }

        info!(days = rows.len(), "extracted test volume");
        Ok(Self {
            dates: rows.iter().map(|r| r.0).collect(),
            positives: rows.iter().map(|r| r.1).collect(),
            positive_rate: rows.iter().map(|r| r.2).collect(),
            tests: rows.iter().map(|r| r.3).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// `(min, max)` of the positive rate, the color mapper's domain.
    pub fn rate_range(&self) -> (f64, f64) {
        let low = Statistics::min(self.positive_rate.iter());
        let high = Statistics::max(self.positive_rate.iter());
        (low, high)
    }
}
