//! Canton Charts - Swiss COVID-19 statistics as interactive HTML charts
//!
//! Datasets are fetched once, cleaned into ordered per-day sequences and
//! rendered with plotters into a self-contained HTML page.

pub mod charts;
pub mod config;
pub mod data;
pub mod pipeline;
