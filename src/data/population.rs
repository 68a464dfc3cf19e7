//! Population Module
//! Aggregates canton demographics into male/female stacks per (canton, age group).

use crate::data::{DataError, DataLoader};
use polars::prelude::*;
use std::collections::HashMap;
use tracing::{info, warn};

/// Column names and labels of the demographics dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulationColumns {
    pub canton: String,
    pub age_group: String,
    pub sex: String,
    pub population: String,
    /// Canton value holding the whole-country total.
    pub excluded_canton: String,
    pub male_label: String,
    pub female_label: String,
}

impl Default for PopulationColumns {
    fn default() -> Self {
        Self {
            canton: "canton".to_string(),
            age_group: "age_group".to_string(),
            sex: "sex".to_string(),
            population: "pop_size".to_string(),
            excluded_canton: "CH".to_string(),
            male_label: "Männlich".to_string(),
            female_label: "Weiblich".to_string(),
        }
    }
}

impl PopulationColumns {
    pub fn required(&self) -> [&str; 4] {
        [
            self.canton.as_str(),
            self.age_group.as_str(),
            self.sex.as_str(),
            self.population.as_str(),
        ]
    }
}

/// One named stack with a value per factor.
#[derive(Debug, Clone, PartialEq)]
pub struct Stack {
    pub name: String,
    pub values: Vec<f64>,
}

/// Population totals keyed by (canton, age group) factors.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulationStacks {
    pub factors: Vec<(String, String)>,
    pub stacks: Vec<Stack>,
}

impl PopulationStacks {
    /// Cantons in factor order, each listed once.
    pub fn cantons(&self) -> Vec<&str> {
        let mut cantons: Vec<&str> = Vec::new();
        for (canton, _) in &self.factors {
            if cantons.last() != Some(&canton.as_str()) {
                cantons.push(canton);
            }
        }
        cantons
    }

    /// Sum of all stacks for each factor.
    pub fn totals(&self) -> Vec<f64> {
        (0..self.factors.len())
            .map(|i| self.stacks.iter().map(|s| s.values[i]).sum())
            .collect()
    }

    /// Sum population per (canton, age group, sex) and split by sex.
    pub fn from_frame(df: &DataFrame, columns: &PopulationColumns) -> Result<Self, DataError> {
        let grouped = df
            .clone()
            .lazy()
            .with_column(col(columns.population.as_str()).strict_cast(DataType::Float64))
            .filter(col(columns.canton.as_str()).neq(lit(columns.excluded_canton.as_str())))
            .group_by_stable([
                col(columns.canton.as_str()),
                col(columns.age_group.as_str()),
                col(columns.sex.as_str()),
            ])
            .agg([col(columns.population.as_str()).sum()])
            .collect()?;

        let cantons = DataLoader::get_string_values(&grouped, &columns.canton)?;
        let ages = DataLoader::get_string_values(&grouped, &columns.age_group)?;
        let sexes = DataLoader::get_string_values(&grouped, &columns.sex)?;
        let sizes = DataLoader::get_numeric_values(&grouped, &columns.population)?;

        let mut canton_order: Vec<String> = Vec::new();
        let mut age_order: Vec<String> = Vec::new();
        let mut sums: HashMap<(String, String, String), f64> = HashMap::new();
        let mut unknown_sex = 0usize;

        for (((canton, age), sex), size) in cantons.into_iter().zip(ages).zip(sexes).zip(sizes) {
            let (Some(canton), Some(age), Some(sex)) = (canton, age, sex) else {
                continue;
            };
            if sex != columns.male_label && sex != columns.female_label {
                unknown_sex += 1;
                continue;
            }
            if !canton_order.contains(&canton) {
                canton_order.push(canton.clone());
            }
            if !age_order.contains(&age) {
                age_order.push(age.clone());
            }
            *sums.entry((canton, age, sex)).or_default() += size.unwrap_or(0.0);
        }

        if unknown_sex > 0 {
            warn!(groups = unknown_sex, "skipped groups with an unknown sex label");
        }

        let factors: Vec<(String, String)> = canton_order
            .iter()
            .flat_map(|c| age_order.iter().map(move |a| (c.clone(), a.clone())))
            .collect();

        let stack = |name: &str, label: &str| Stack {
            name: name.to_string(),
            values: factors
                .iter()
                .map(|(c, a)| {
                    sums.get(&(c.clone(), a.clone(), label.to_string()))
                        .copied()
                        .unwrap_or(0.0)
                })
                .collect(),
        };
        let stacks = vec![
            stack("male", &columns.male_label),
            stack("female", &columns.female_label),
        ];

        info!(
            cantons = canton_order.len(),
            age_groups = age_order.len(),
            "aggregated population stacks"
        );
        Ok(Self { factors, stacks })
    }
}
