//! Data module - dataset loading and processing

mod error;
mod loader;
mod population;
mod processor;
mod source;
mod table;
mod test_volume;

pub use error::DataError;
pub use loader::{DataLoader, LoadOptions};
pub use population::{PopulationColumns, PopulationStacks, Stack};
pub use processor::{DataProcessor, DEFAULT_WINDOW};
pub use source::DataSource;
pub use table::{forward_fill, CategorySeries, TimeSeriesTable};
pub use test_volume::{TestVolumeColumns, TestVolumeSeries};
