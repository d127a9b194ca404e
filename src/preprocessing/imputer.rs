//! Missing value imputation

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Strategy for imputing missing values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImputeStrategy {
    /// Replace with mean (numeric only)
    Mean,
    /// Replace with median (numeric only)
    Median,
    /// Replace with the most frequent value; ties go to the smallest value
    MostFrequent,
}

/// Value learned for one column at fit time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FillValue {
    Number(f64),
    Text(String),
}

/// Imputer for handling missing values.
///
/// Expects numeric columns as `Float64` and categorical columns as `String`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Imputer {
    strategy: ImputeStrategy,
    fill_values: Vec<(String, FillValue)>,
    is_fitted: bool,
}

impl Imputer {
    pub fn new(strategy: ImputeStrategy) -> Self {
        Self {
            strategy,
            fill_values: Vec::new(),
            is_fitted: false,
        }
    }

    /// Learn one fill value per column
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        let mut fill_values = Vec::with_capacity(columns.len());
        for col_name in columns {
            let column = df
                .column(col_name)
                .map_err(|_| PipelineError::FeatureNotFound(col_name.to_string()))?;
            let value = self.compute_fill_value(col_name, column.as_materialized_series())?;
            fill_values.push((col_name.to_string(), value));
        }

        self.fill_values = fill_values;
        self.is_fitted = true;
        Ok(self)
    }

    /// Replace nulls in every fitted column
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(PipelineError::ModelNotFitted);
        }

        let mut result = df.clone();
        for (col_name, fill_value) in &self.fill_values {
            let column = df
                .column(col_name)
                .map_err(|_| PipelineError::FeatureNotFound(col_name.clone()))?;
            let filled = fill_series(column.as_materialized_series(), fill_value)?;
            result.with_column(filled)?;
        }

        Ok(result)
    }

    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    /// The value learned for `column`, if fitted
    pub fn fill_value(&self, column: &str) -> Option<&FillValue> {
        self.fill_values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, v)| v)
    }

    pub fn strategy(&self) -> ImputeStrategy {
        self.strategy
    }

    fn compute_fill_value(&self, name: &str, series: &Series) -> Result<FillValue> {
        if series.dtype() == &DataType::String {
            if self.strategy != ImputeStrategy::MostFrequent {
                return Err(PipelineError::DataError(format!(
                    "{:?} imputation needs a numeric column, '{}' holds text",
                    self.strategy, name
                )));
            }
            let ca = series.str()?;
            return most_frequent_text(ca.into_iter().flatten())
                .map(FillValue::Text)
                .ok_or_else(|| no_observed_values(name));
        }

        let ca = series.f64()?;
        let mut values: Vec<f64> = ca.into_iter().flatten().filter(|v| !v.is_nan()).collect();
        if values.is_empty() {
            return Err(no_observed_values(name));
        }
        values.sort_by(|a, b| a.total_cmp(b));

        let value = match self.strategy {
            ImputeStrategy::Mean => values.iter().sum::<f64>() / values.len() as f64,
            ImputeStrategy::Median => median_of_sorted(&values),
            ImputeStrategy::MostFrequent => mode_of_sorted(&values),
        };
        Ok(FillValue::Number(value))
    }
}

fn no_observed_values(name: &str) -> PipelineError {
    PipelineError::ComputationError(format!(
        "column '{}' has no observed values to impute from",
        name
    ))
}

fn fill_series(series: &Series, fill_value: &FillValue) -> Result<Series> {
    let name = series.name().clone();
    let filled = match fill_value {
        FillValue::Number(fill) => {
            let ca: Float64Chunked = series
                .f64()?
                .into_iter()
                .map(|v| Some(v.filter(|x| !x.is_nan()).unwrap_or(*fill)))
                .collect();
            ca.with_name(name).into_series()
        }
        FillValue::Text(fill) => {
            let ca: StringChunked = series
                .str()?
                .into_iter()
                .map(|v| Some(v.unwrap_or(fill.as_str())))
                .collect();
            ca.with_name(name).into_series()
        }
    };
    Ok(filled)
}

/// Median of an ascending slice; even counts average the two middle values.
fn median_of_sorted(values: &[f64]) -> f64 {
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}

fn mode_of_sorted(values: &[f64]) -> f64 {
    let mut best = values[0];
    let mut best_count = 0;
    let mut i = 0;
    while i < values.len() {
        let mut j = i;
        while j < values.len() && values[j] == values[i] {
            j += 1;
        }
        // strictly greater keeps the smallest value on ties
        if j - i > best_count {
            best = values[i];
            best_count = j - i;
        }
        i = j;
    }
    best
}

fn most_frequent_text<'a>(values: impl Iterator<Item = &'a str>) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for v in values {
        *counts.entry(v).or_insert(0) += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for (value, count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((value, count));
        }
    }
    best.map(|(v, _)| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_imputation() {
        let df = df!("a" => &[Some(1.0), Some(4.0), None, Some(2.0), Some(10.0)]).unwrap();

        let mut imputer = Imputer::new(ImputeStrategy::Median);
        let out = imputer.fit_transform(&df, &["a"]).unwrap();

        assert_eq!(imputer.fill_value("a"), Some(&FillValue::Number(3.0)));
        let filled: Vec<f64> = out
            .column("a")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(filled, vec![1.0, 4.0, 3.0, 2.0, 10.0]);
    }

    #[test]
    fn test_nan_counts_as_missing() {
        let df = df!("a" => &[1.0, f64::NAN, 3.0]).unwrap();
        let mut imputer = Imputer::new(ImputeStrategy::Mean);
        let out = imputer.fit_transform(&df, &["a"]).unwrap();
        let col = out.column("a").unwrap().as_materialized_series().f64().unwrap().clone();
        assert_eq!(col.get(1), Some(2.0));
    }

    #[test]
    fn test_most_frequent_text_ties_go_smallest() {
        let df = df!("color" => &[Some("white"), Some("red"), None, Some("white"), Some("red")])
            .unwrap();

        let mut imputer = Imputer::new(ImputeStrategy::MostFrequent);
        imputer.fit(&df, &["color"]).unwrap();
        assert_eq!(
            imputer.fill_value("color"),
            Some(&FillValue::Text("red".to_string()))
        );
    }

    #[test]
    fn test_most_frequent_numeric() {
        let df = df!("a" => &[3.0, 1.0, 3.0, 2.0, 1.0, 3.0]).unwrap();
        let mut imputer = Imputer::new(ImputeStrategy::MostFrequent);
        imputer.fit(&df, &["a"]).unwrap();
        assert_eq!(imputer.fill_value("a"), Some(&FillValue::Number(3.0)));
    }

    #[test]
    fn test_all_missing_is_computation_error() {
        let df = df!("a" => &[None::<f64>, None]).unwrap();
        let err = Imputer::new(ImputeStrategy::Median).fit(&df, &["a"]).unwrap_err();
        assert!(matches!(err, PipelineError::ComputationError(_)));
    }

    #[test]
    fn test_median_of_text_rejected() {
        let df = df!("s" => &["a", "b"]).unwrap();
        assert!(Imputer::new(ImputeStrategy::Median).fit(&df, &["s"]).is_err());
    }

    #[test]
    fn test_transform_before_fit() {
        let df = df!("a" => &[1.0]).unwrap();
        let err = Imputer::new(ImputeStrategy::Median).transform(&df).unwrap_err();
        assert!(matches!(err, PipelineError::ModelNotFitted));
    }
}
