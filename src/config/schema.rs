//! Dataset schema: declared feature and target datatypes

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Column data type resolved from a declared datatype tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    Numeric,
    Categorical,
}

impl ColumnType {
    /// Resolve a declared tag such as `float64` or `object`.
    ///
    /// Float and integer tags are numeric, every other tag is categorical.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "float64" | "float32" | "float" | "double" | "int64" | "int32" | "int" | "integer" => {
                ColumnType::Numeric
            }
            _ => ColumnType::Categorical,
        }
    }
}

/// One declared column as written in `schema.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDecl {
    pub name: String,
    pub dtype: String,
}

impl ColumnDecl {
    pub fn new(name: impl Into<String>, dtype: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dtype: dtype.into(),
        }
    }

    pub fn column_type(&self) -> ColumnType {
        ColumnType::from_tag(&self.dtype)
    }
}

/// A feature with its resolved type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSpec {
    pub name: String,
    pub dtype: ColumnType,
}

#[derive(Debug, Clone, Deserialize)]
struct RawSchema {
    features: Vec<ColumnDecl>,
    target: ColumnDecl,
    #[serde(default)]
    external_data_schema: Vec<ColumnDecl>,
}

/// Immutable schema, resolved once at load time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    features: Vec<FeatureSpec>,
    target: String,
    external_columns: Vec<String>,
}

impl Schema {
    /// Build a schema from declared columns, in declaration order.
    pub fn new(
        features: Vec<ColumnDecl>,
        target: ColumnDecl,
        external_data_schema: Vec<ColumnDecl>,
    ) -> Result<Self> {
        if features.is_empty() {
            return Err(PipelineError::ConfigError(
                "schema declares no features".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for decl in &features {
            if !seen.insert(decl.name.as_str()) {
                return Err(PipelineError::ConfigError(format!(
                    "feature '{}' is declared more than once",
                    decl.name
                )));
            }
        }
        if seen.contains(target.name.as_str()) {
            return Err(PipelineError::ConfigError(format!(
                "target '{}' is also declared as a feature",
                target.name
            )));
        }
        if target.column_type() != ColumnType::Numeric {
            return Err(PipelineError::ConfigError(format!(
                "target '{}' must be numeric for regression, declared as '{}'",
                target.name, target.dtype
            )));
        }

        Ok(Self {
            features: features
                .into_iter()
                .map(|decl| FeatureSpec {
                    dtype: decl.column_type(),
                    name: decl.name,
                })
                .collect(),
            target: target.name,
            external_columns: external_data_schema.into_iter().map(|d| d.name).collect(),
        })
    }

    /// Parse from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        let raw: RawSchema = toml::from_str(text)?;
        Self::new(raw.features, raw.target, raw.external_data_schema)
    }

    /// Features in declaration order
    pub fn features(&self) -> &[FeatureSpec] {
        &self.features
    }

    pub fn feature_names(&self) -> Vec<&str> {
        self.features.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Column names the raw external dataset must carry
    pub fn external_columns(&self) -> &[String] {
        &self.external_columns
    }
}
