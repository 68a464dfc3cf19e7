//! CSV Data Loader Module
//! Handles dataset fetching, CSV parsing and column extraction using Polars.

use crate::data::{DataError, DataSource, TimeSeriesTable};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::io::Cursor;
use tracing::{debug, info, warn};

/// Column layout rules applied when building a [`TimeSeriesTable`].
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOptions {
    /// Date-like column used as the row index.
    pub index_column: String,
    /// Value columns kept after the index, counted in file order.
    pub max_columns: Option<usize>,
    /// Aggregate columns removed from the category set.
    pub drop_columns: Vec<String>,
    /// Treat the first row as the zero point of every cumulative counter.
    pub zero_baseline: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            index_column: "Date".to_string(),
            max_columns: Some(27),
            drop_columns: vec!["CH".to_string()],
            zero_baseline: true,
        }
    }
}

/// Handles CSV loading with Polars.
pub struct DataLoader;

impl DataLoader {
    /// Fetch a dataset and parse it into a DataFrame.
    pub fn read_frame(source: &DataSource) -> Result<DataFrame, DataError> {
        let bytes = source.fetch()?;
        Self::parse_csv(source, bytes)
    }

    /// Parse raw CSV bytes with a header row.
    pub fn parse_csv(source: &DataSource, bytes: Vec<u8>) -> Result<DataFrame, DataError> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish()
            .map_err(|e| DataError::unavailable(source, e))?;

        if df.height() == 0 {
            return Err(DataError::unavailable(source, "dataset has no rows"));
        }

        info!(rows = df.height(), columns = df.width(), "parsed CSV");
        Ok(df)
    }

    /// Fail with `DataUnavailable` unless every named column is present.
    pub fn require_columns(
        source: &DataSource,
        df: &DataFrame,
        columns: &[&str],
    ) -> Result<(), DataError> {
        let names = Self::get_columns(df);
        match columns.iter().find(|c| !names.iter().any(|n| n == *c)) {
            Some(missing) => Err(DataError::unavailable(
                source,
                format!("missing column {missing}"),
            )),
            None => Ok(()),
        }
    }

    /// Fetch a cumulative per-category dataset and clean it into a table.
    pub fn load_time_series(
        source: &DataSource,
        options: &LoadOptions,
    ) -> Result<TimeSeriesTable, DataError> {
        let df = Self::read_frame(source)?;
        Self::require_columns(source, &df, &[options.index_column.as_str()])?;
        let table = Self::time_series_from_frame(&df, options)?;

        info!(
            rows = table.len(),
            categories = table.categories().len(),
            "loaded time series"
        );
        Ok(table)
    }

    /// Clip, drop and convert the frame's value columns.
    pub fn time_series_from_frame(
        df: &DataFrame,
        options: &LoadOptions,
    ) -> Result<TimeSeriesTable, DataError> {
        let mut value_columns: Vec<String> = Self::get_columns(df)
            .into_iter()
            .filter(|name| name != &options.index_column)
            .collect();
        if let Some(max) = options.max_columns {
            value_columns.truncate(max);
        }

        for dropped in &options.drop_columns {
            if !value_columns.contains(dropped) {
                warn!(column = %dropped, "aggregate column not present, nothing to drop");
            }
        }
        value_columns.retain(|name| !options.drop_columns.contains(name));

        let dates = Self::get_dates(df, &options.index_column)?;

        let mut columns = Vec::with_capacity(value_columns.len());
        for name in value_columns {
            let mut values = Self::get_numeric_values(df, &name)?;
            if options.zero_baseline {
                if let Some(first) = values.first_mut() {
                    *first = Some(0.0);
                }
            }
            debug!(
                column = %name,
                nulls = values.iter().filter(|v| v.is_none()).count(),
                "read category column"
            );
            columns.push((name, values));
        }

        TimeSeriesTable::new(dates, columns)
    }

    /// Get list of column names.
    pub fn get_columns(df: &DataFrame) -> Vec<String> {
        df.get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Read a column as floats. Non-numeric cells are an error.
    pub fn get_numeric_values(df: &DataFrame, column: &str) -> Result<Vec<Option<f64>>, DataError> {
        let series = df
            .column(column)?
            .as_materialized_series()
            .strict_cast(&DataType::Float64)
            .map_err(|e| DataError::invalid(format!("column {column} is not numeric: {e}")))?;

        Ok(series.f64()?.into_iter().collect())
    }

    /// Read a column as text, whatever type the CSV reader inferred.
    pub fn get_string_values(df: &DataFrame, column: &str) -> Result<Vec<Option<String>>, DataError> {
        let series = df
            .column(column)?
            .as_materialized_series()
            .cast(&DataType::String)?;

        Ok(series
            .str()?
            .into_iter()
            .map(|v| v.map(|s| s.trim_matches('"').to_string()))
            .collect())
    }

    /// Read a date index column. Every cell must hold a date.
    pub fn get_dates(df: &DataFrame, column: &str) -> Result<Vec<NaiveDate>, DataError> {
        Self::get_string_values(df, column)?
            .into_iter()
            .enumerate()
            .map(|(row, value)| {
                let value = value
                    .ok_or_else(|| DataError::invalid(format!("row {row} has no {column}")))?;
                parse_date(&value).ok_or_else(|| {
                    DataError::invalid(format!("row {row}: {value:?} is not a date"))
                })
            })
            .collect()
    }
}

/// Parse `YYYY-MM-DD`, optionally followed by a time of day.
pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
                .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S"))
                .ok()
                .map(|dt| dt.date())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(csv: &str) -> DataFrame {
        let source = DataSource::parse("inline.csv");
        DataLoader::parse_csv(&source, csv.as_bytes().to_vec()).unwrap()
    }

    #[test]
    fn parses_dates_with_and_without_time() {
        let expected = NaiveDate::from_ymd_opt(2020, 3, 5);
        assert_eq!(parse_date("2020-03-05"), expected);
        assert_eq!(parse_date("2020-03-05T00:00:00"), expected);
        assert_eq!(parse_date("2020-03-05 12:30:00"), expected);
        assert_eq!(parse_date("05.03.2020"), None);
    }

    #[test]
    fn cleans_cumulative_table() {
        let df = frame(
            "Date,AG,BE,CH\n\
             2020-03-01,3,,10\n\
             2020-03-02,5,2,12\n\
             2020-03-03,,4,15\n",
        );

        let table = DataLoader::time_series_from_frame(&df, &LoadOptions::default()).unwrap();

        assert_eq!(table.category_names(), vec!["AG", "BE"]);
        assert_eq!(table.category("AG").unwrap().cumulative, vec![0.0, 5.0, 5.0]);
        assert_eq!(table.category("BE").unwrap().cumulative, vec![0.0, 2.0, 4.0]);
        assert_eq!(
            table.dates()[2],
            NaiveDate::from_ymd_opt(2020, 3, 3).unwrap()
        );
    }

    #[test]
    fn clips_trailing_columns_before_dropping() {
        let df = frame(
            "Date,AG,BE,CH,AG_pc\n\
             2020-03-01,0,0,0,0.1\n\
             2020-03-02,1,1,2,0.2\n",
        );
        let options = LoadOptions {
            max_columns: Some(3),
            ..LoadOptions::default()
        };

        let table = DataLoader::time_series_from_frame(&df, &options).unwrap();
        assert_eq!(table.category_names(), vec!["AG", "BE"]);
    }

    #[test]
    fn baseline_can_be_disabled() {
        let df = frame("Date,AG\n2020-03-01,3\n2020-03-02,5\n");
        let options = LoadOptions {
            zero_baseline: false,
            ..LoadOptions::default()
        };

        let table = DataLoader::time_series_from_frame(&df, &options).unwrap();
        assert_eq!(table.category("AG").unwrap().cumulative, vec![3.0, 5.0]);
    }

    #[test]
    fn non_numeric_cells_are_invalid() {
        let df = frame("Date,AG\n2020-03-01,0\n2020-03-02,many\n");
        let result = DataLoader::time_series_from_frame(&df, &LoadOptions::default());
        assert!(matches!(result, Err(DataError::InvalidData(_))));
    }

    #[test]
    fn bad_dates_are_invalid() {
        let df = frame("Date,AG\nyesterday,0\n2020-03-02,1\n");
        let result = DataLoader::time_series_from_frame(&df, &LoadOptions::default());
        assert!(matches!(result, Err(DataError::InvalidData(_))));
    }

    #[test]
    fn missing_index_column_is_unavailable() {
        let source = DataSource::parse("inline.csv");
        let df = frame("Day,AG\n2020-03-01,0\n");
        let result = DataLoader::require_columns(&source, &df, &["Date"]);
        assert!(matches!(result, Err(DataError::DataUnavailable { .. })));
    }

    #[test]
    fn header_only_csv_is_unavailable() {
        let source = DataSource::parse("inline.csv");
        let result = DataLoader::parse_csv(&source, b"Date,AG\n".to_vec());
        assert!(matches!(result, Err(DataError::DataUnavailable { .. })));
    }
}
