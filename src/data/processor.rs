//! Data Processor Module
//! Turns cumulative counters into daily deltas and trailing averages.

use crate::data::{DataError, TimeSeriesTable};
use statrs::statistics::Statistics;
use tracing::{debug, info};

/// Smoothing window used by the daily new cases chart.
pub const DEFAULT_WINDOW: usize = 3;

/// Handles data cleaning and transformation operations.
pub struct DataProcessor;

impl DataProcessor {
    /// First differences of a cumulative series. `delta[0]` is 0.
    pub fn daily_deltas(cumulative: &[f64]) -> Vec<f64> {
        let mut deltas = Vec::with_capacity(cumulative.len());
        if !cumulative.is_empty() {
            deltas.push(0.0);
        }
        deltas.extend(cumulative.windows(2).map(|pair| pair[1] - pair[0]));
        deltas
    }

    /// Trailing mean over `window` samples ending at (and including) each index.
    ///
    /// Indices with fewer than `window` samples of history are 0.
    pub fn trailing_average(deltas: &[f64], window: usize) -> Vec<f64> {
        if window == 0 {
            return vec![0.0; deltas.len()];
        }

        (0..deltas.len())
            .map(|i| {
                if i + 1 < window {
                    0.0
                } else {
                    deltas[i + 1 - window..=i].iter().mean()
                }
            })
            .collect()
    }

    /// Compute `delta` and `average` for every category of the table in place.
    pub fn derive_daily_averages(
        table: &mut TimeSeriesTable,
        window: usize,
    ) -> Result<(), DataError> {
        if window == 0 {
            return Err(DataError::invalid("smoothing window must be at least 1"));
        }

        for series in table.categories_mut() {
            if let Some(pos) = series.cumulative.iter().position(|v| !v.is_finite()) {
                return Err(DataError::invalid(format!(
                    "column {} has a non-finite value at row {pos}",
                    series.name
                )));
            }

            series.delta = Self::daily_deltas(&series.cumulative);
            series.average = Self::trailing_average(&series.delta, window);

            debug!(
                category = %series.name,
                total = series.delta.iter().sum::<f64>(),
                "derived daily averages"
            );
        }

        info!(
            categories = table.categories().len(),
            window, "computed trailing averages"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn table(columns: Vec<(&str, Vec<f64>)>) -> TimeSeriesTable {
        let rows = columns.first().map(|(_, v)| v.len()).unwrap_or(0);
        let start = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
        let dates = (0..rows)
            .map(|i| start + chrono::Duration::days(i as i64))
            .collect();
        let columns = columns
            .into_iter()
            .map(|(name, values)| (name.to_string(), values.into_iter().map(Some).collect()))
            .collect();
        TimeSeriesTable::new(dates, columns).unwrap()
    }

    #[test]
    fn deltas_start_at_zero() {
        assert_eq!(
            DataProcessor::daily_deltas(&[0.0, 5.0, 5.0, 8.0]),
            vec![0.0, 5.0, 0.0, 3.0]
        );
        assert!(DataProcessor::daily_deltas(&[]).is_empty());
        assert_eq!(DataProcessor::daily_deltas(&[7.0]), vec![0.0]);
    }

    #[test]
    fn trailing_average_includes_current_point() {
        let avg = DataProcessor::trailing_average(&[0.0, 5.0, 0.0, 3.0], 3);

        assert_eq!(avg[0], 0.0);
        assert_eq!(avg[1], 0.0);
        assert_relative_eq!(avg[2], 5.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(avg[3], 8.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn window_of_one_is_identity() {
        let deltas = [0.0, 2.0, -1.0, 4.0];
        assert_eq!(DataProcessor::trailing_average(&deltas, 1), deltas.to_vec());
    }

    #[test]
    fn window_longer_than_series_is_all_zero() {
        assert_eq!(
            DataProcessor::trailing_average(&[0.0, 1.0], 5),
            vec![0.0, 0.0]
        );
    }

    #[test]
    fn derives_every_category() {
        let mut table = table(vec![
            ("AG", vec![0.0, 5.0, 5.0, 8.0, 14.0]),
            ("BE", vec![0.0, 1.0, 2.0, 3.0, 4.0]),
        ]);

        DataProcessor::derive_daily_averages(&mut table, 3).unwrap();

        for series in table.categories() {
            assert!(series.is_derived());
            assert_eq!(series.delta[0], 0.0);
            assert_eq!(series.average[0], 0.0);
            assert_eq!(series.average[1], 0.0);
            for i in 2..series.delta.len() {
                let expected = series.delta[i - 2..=i].iter().sum::<f64>() / 3.0;
                assert_relative_eq!(series.average[i], expected, epsilon = 1e-12);
            }
        }
        assert_eq!(
            table.category("AG").unwrap().delta,
            vec![0.0, 5.0, 0.0, 3.0, 6.0]
        );
        assert_relative_eq!(table.category("AG").unwrap().average[4], 3.0);
    }

    #[test]
    fn derivation_is_deterministic() {
        let mut first = table(vec![("ZH", vec![0.0, 3.0, 7.0, 7.0, 20.0, 21.0])]);
        let mut second = first.clone();

        DataProcessor::derive_daily_averages(&mut first, 3).unwrap();
        DataProcessor::derive_daily_averages(&mut second, 3).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn zero_window_is_invalid() {
        let mut table = table(vec![("AG", vec![0.0, 1.0])]);
        let result = DataProcessor::derive_daily_averages(&mut table, 0);
        assert!(matches!(result, Err(DataError::InvalidData(_))));
    }

    #[test]
    fn non_finite_values_are_invalid() {
        let mut table = table(vec![("AG", vec![0.0, f64::NAN, 2.0])]);
        let result = DataProcessor::derive_daily_averages(&mut table, 3);
        assert!(matches!(result, Err(DataError::InvalidData(_))));
    }
}
