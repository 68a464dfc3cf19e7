//! Data Error Module

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Data unavailable from {location}: {reason}")]
    DataUnavailable { location: String, reason: String },
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl DataError {
    pub(crate) fn unavailable(location: impl ToString, reason: impl ToString) -> Self {
        DataError::DataUnavailable {
            location: location.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        DataError::InvalidData(reason.into())
    }
}

/// Polars failures after a frame has been parsed are schema or type mismatches.
impl From<PolarsError> for DataError {
    fn from(err: PolarsError) -> Self {
        DataError::InvalidData(err.to_string())
    }
}
