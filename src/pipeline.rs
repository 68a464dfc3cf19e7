//! Pipeline Module
//! Runs fetch, clean, aggregate, plot and write for each chart.

use crate::charts::{
    ChartDataSource, ChartView, HtmlReport, LinePlotter, LinkedScatterPlotter, RenderError,
    StackedBarPlotter,
};
use crate::config::{CasesConfig, DemographicsConfig, Settings, TestsConfig};
use crate::data::{
    DataError, DataLoader, DataProcessor, DataSource, PopulationStacks, TestVolumeSeries,
};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// The charts this tool can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartKind {
    #[default]
    Cases,
    Demographics,
    Tests,
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChartKind::Cases => "cases",
            ChartKind::Demographics => "demographics",
            ChartKind::Tests => "tests",
        };
        f.write_str(name)
    }
}

pub struct Pipeline;

impl Pipeline {
    /// Produce one chart and return the path of the written file.
    pub fn run(kind: ChartKind, settings: &Settings) -> Result<PathBuf, PipelineError> {
        info!(chart = %kind, "running pipeline");
        match kind {
            ChartKind::Cases => Self::run_cases(&settings.cases),
            ChartKind::Demographics => Self::run_demographics(&settings.demographics),
            ChartKind::Tests => Self::run_tests(&settings.tests),
        }
    }

    /// Load cumulative counts and turn them into smoothed daily new cases.
    pub fn daily_new_cases(config: &CasesConfig) -> Result<ChartDataSource, PipelineError> {
        let source = DataSource::parse(&config.source);
        let mut table = DataLoader::load_time_series(&source, &config.load_options())?;
        DataProcessor::derive_daily_averages(&mut table, config.window)?;
        Ok(ChartDataSource::from_averages(&table)?)
    }

    pub fn cases_view(
        data: &ChartDataSource,
        config: &CasesConfig,
    ) -> Result<ChartView, PipelineError> {
        Ok(LinePlotter::render(data, &config.chart_options())?)
    }

    pub fn run_cases(config: &CasesConfig) -> Result<PathBuf, PipelineError> {
        let data = Self::daily_new_cases(config)?;
        let view = Self::cases_view(&data, config)?;
        Self::write(&config.title, view, &config.output)
    }

    /// Load demographics and aggregate them into male/female stacks.
    pub fn canton_population(
        config: &DemographicsConfig,
    ) -> Result<PopulationStacks, PipelineError> {
        let source = DataSource::parse(&config.source);
        let columns = config.columns();
        let df = DataLoader::read_frame(&source)?;
        DataLoader::require_columns(&source, &df, &columns.required())?;
        Ok(PopulationStacks::from_frame(&df, &columns)?)
    }

    pub fn run_demographics(config: &DemographicsConfig) -> Result<PathBuf, PipelineError> {
        let stacks = Self::canton_population(config)?;
        let view = StackedBarPlotter::render(&stacks, &config.chart_options())?;
        Self::write(&config.title, view, &config.output)
    }

    /// Load daily test totals, positives and positive rate.
    pub fn test_volume(config: &TestsConfig) -> Result<TestVolumeSeries, PipelineError> {
        let source = DataSource::parse(&config.source);
        let columns = config.columns();
        let df = DataLoader::read_frame(&source)?;
        DataLoader::require_columns(&source, &df, &columns.required())?;
        Ok(TestVolumeSeries::from_frame(&df, &columns)?)
    }

    pub fn run_tests(config: &TestsConfig) -> Result<PathBuf, PipelineError> {
        let series = Self::test_volume(config)?;
        let view = LinkedScatterPlotter::render(&series, &config.chart_options())?;
        Self::write(&config.title, view, &config.output)
    }

    fn write(title: &str, view: ChartView, output: &Path) -> Result<PathBuf, PipelineError> {
        let mut report = HtmlReport::new(title);
        report.push(view);
        report.write(output)?;
        Ok(output.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cases_is_the_default_chart() {
        assert_eq!(ChartKind::default(), ChartKind::Cases);
        assert_eq!(ChartKind::Demographics.to_string(), "demographics");
    }

    #[test]
    fn unreachable_source_is_data_unavailable() {
        let config = CasesConfig {
            source: "/nonexistent/cases.csv".to_string(),
            ..CasesConfig::default()
        };
        let result = Pipeline::daily_new_cases(&config);
        assert!(matches!(
            result,
            Err(PipelineError::Data(DataError::DataUnavailable { .. }))
        ));
    }
}
