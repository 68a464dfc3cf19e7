//! Configuration Module
//! Per-pipeline settings. Defaults reproduce the published datasets and
//! charts; an optional TOML file can override any field.

use crate::charts::{BarChartOptions, LineChartOptions, LinkedChartOptions};
use crate::data::{LoadOptions, PopulationColumns, TestVolumeColumns, DEFAULT_WINDOW};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DATA_REPOSITORY: &str =
    "https://raw.githubusercontent.com/daenuprobst/covid19-cases-switzerland/master";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// All pipeline settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub cases: CasesConfig,
    pub demographics: DemographicsConfig,
    pub tests: TestsConfig,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }
}

/// Daily new cases per canton (multi-line chart).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CasesConfig {
    pub source: String,
    pub index_column: String,
    pub max_columns: Option<usize>,
    pub drop_columns: Vec<String>,
    pub zero_baseline: bool,
    pub window: usize,
    pub output: PathBuf,
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for CasesConfig {
    fn default() -> Self {
        let load = LoadOptions::default();
        let chart = LineChartOptions::default();
        Self {
            source: format!("{DATA_REPOSITORY}/covid19_cases_switzerland_openzh-phase2.csv"),
            index_column: load.index_column,
            max_columns: load.max_columns,
            drop_columns: load.drop_columns,
            zero_baseline: load.zero_baseline,
            window: DEFAULT_WINDOW,
            output: PathBuf::from("daily_new_cases.html"),
            title: "Daily New Cases in Switzerland".to_string(),
            width: chart.width,
            height: chart.height,
        }
    }
}

impl CasesConfig {
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            index_column: self.index_column.clone(),
            max_columns: self.max_columns,
            drop_columns: self.drop_columns.clone(),
            zero_baseline: self.zero_baseline,
        }
    }

    pub fn chart_options(&self) -> LineChartOptions {
        LineChartOptions {
            width: self.width,
            height: self.height,
            ..LineChartOptions::default()
        }
    }
}

/// Population per canton, age group and sex (stacked bar chart).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemographicsConfig {
    pub source: String,
    pub canton_column: String,
    pub age_group_column: String,
    pub sex_column: String,
    pub population_column: String,
    pub excluded_canton: String,
    pub male_label: String,
    pub female_label: String,
    pub output: PathBuf,
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for DemographicsConfig {
    fn default() -> Self {
        let columns = PopulationColumns::default();
        let chart = BarChartOptions::default();
        Self {
            source: format!("{DATA_REPOSITORY}/demographics_switzerland_bag.csv"),
            canton_column: columns.canton,
            age_group_column: columns.age_group,
            sex_column: columns.sex,
            population_column: columns.population,
            excluded_canton: columns.excluded_canton,
            male_label: columns.male_label,
            female_label: columns.female_label,
            output: PathBuf::from("canton_population.html"),
            title: "Canton Population Visualization".to_string(),
            width: chart.width,
            height: chart.height,
        }
    }
}

impl DemographicsConfig {
    pub fn columns(&self) -> PopulationColumns {
        PopulationColumns {
            canton: self.canton_column.clone(),
            age_group: self.age_group_column.clone(),
            sex: self.sex_column.clone(),
            population: self.population_column.clone(),
            excluded_canton: self.excluded_canton.clone(),
            male_label: self.male_label.clone(),
            female_label: self.female_label.clone(),
        }
    }

    pub fn chart_options(&self) -> BarChartOptions {
        BarChartOptions {
            width: self.width,
            height: self.height,
            ..BarChartOptions::default()
        }
    }
}

/// Test volume and positive rate (linked scatter and range selector).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TestsConfig {
    pub source: String,
    pub date_column: String,
    pub positives_column: String,
    pub positive_rate_column: String,
    pub tests_column: String,
    pub initial_days: usize,
    pub output: PathBuf,
    pub title: String,
    pub width: u32,
    pub detail_height: u32,
    pub overview_height: u32,
}

impl Default for TestsConfig {
    fn default() -> Self {
        let columns = TestVolumeColumns::default();
        let chart = LinkedChartOptions::default();
        Self {
            source: format!("{DATA_REPOSITORY}/covid19_tests_switzerland_bag.csv"),
            date_column: columns.date,
            positives_column: columns.positives,
            positive_rate_column: columns.positive_rate,
            tests_column: columns.tests,
            initial_days: chart.initial_days,
            output: PathBuf::from("covid_tests.html"),
            title: "Covid-19 Tests in Switzerland".to_string(),
            width: chart.width,
            detail_height: chart.detail_height,
            overview_height: chart.overview_height,
        }
    }
}

impl TestsConfig {
    pub fn columns(&self) -> TestVolumeColumns {
        TestVolumeColumns {
            date: self.date_column.clone(),
            positives: self.positives_column.clone(),
            positive_rate: self.positive_rate_column.clone(),
            tests: self.tests_column.clone(),
        }
    }

    pub fn chart_options(&self) -> LinkedChartOptions {
        LinkedChartOptions {
            width: self.width,
            detail_height: self.detail_height,
            overview_height: self.overview_height,
            initial_days: self.initial_days,
            ..LinkedChartOptions::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(Settings::from_toml_str("").unwrap(), Settings::default());
    }

    #[test]
    fn defaults_match_the_published_datasets() {
        let settings = Settings::default();
        assert!(settings.cases.source.ends_with("covid19_cases_switzerland_openzh-phase2.csv"));
        assert_eq!(settings.cases.window, 3);
        assert_eq!(settings.cases.max_columns, Some(27));
        assert_eq!(settings.cases.drop_columns, vec!["CH"]);
        assert_eq!(settings.tests.initial_days, 30);
        assert_eq!(settings.demographics.excluded_canton, "CH");
    }

    #[test]
    fn partial_sections_override_single_fields() {
        let settings = Settings::from_toml_str(
            r#"
            [cases]
            window = 7
            output = "out/cases.html"

            [tests]
            source = "data/tests.csv"
            "#,
        )
        .unwrap();

        assert_eq!(settings.cases.window, 7);
        assert_eq!(settings.cases.output, PathBuf::from("out/cases.html"));
        assert_eq!(settings.cases.index_column, "Date");
        assert_eq!(settings.tests.source, "data/tests.csv");
        assert_eq!(settings.demographics, DemographicsConfig::default());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = Settings::from_toml_str("[cases]\nwindwo = 7\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn options_carry_configured_values() {
        let cases = CasesConfig {
            index_column: "day".to_string(),
            width: 640,
            ..CasesConfig::default()
        };
        assert_eq!(cases.load_options().index_column, "day");
        assert_eq!(cases.chart_options().width, 640);

        let tests = TestsConfig {
            initial_days: 14,
            ..TestsConfig::default()
        };
        assert_eq!(tests.chart_options().initial_days, 14);
        assert_eq!(tests.columns().positive_rate, "frac_negative");
    }
}
