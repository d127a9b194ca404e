//! Single raw observations

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// One raw cell value before any preprocessing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
    Missing,
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        if v.is_nan() {
            RawValue::Missing
        } else {
            RawValue::Number(v)
        }
    }
}

impl From<&str> for RawValue {
    fn from(v: &str) -> Self {
        RawValue::Text(v.to_string())
    }
}

impl From<String> for RawValue {
    fn from(v: String) -> Self {
        RawValue::Text(v)
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(RawValue::Missing)
    }
}

/// An ordered collection of named raw values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    fields: Vec<(String, RawValue)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field, replacing any earlier value with the same name.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<RawValue>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&RawValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Build a one-row frame. Text cells become string columns, numbers and
    /// missing cells become float columns.
    pub fn to_frame(&self) -> Result<DataFrame> {
        if self.fields.is_empty() {
            return Err(PipelineError::InvalidInput("empty input row".to_string()));
        }

        let columns = self
            .fields
            .iter()
            .map(|(name, value)| match value {
                RawValue::Number(v) => Column::new(name.as_str().into(), [Some(*v)]),
                RawValue::Missing => Column::new(name.as_str().into(), [None::<f64>]),
                RawValue::Text(s) => Column::new(name.as_str().into(), [Some(s.as_str())]),
            })
            .collect::<Vec<_>>();

        Ok(DataFrame::new(columns)?)
    }
}
