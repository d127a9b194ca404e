//! Wine prediction form

use crate::data::RawRow;
use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};

/// Accepted range for each measurement, inclusive
pub const FIELD_BOUNDS: [(&str, f64, f64); 11] = [
    ("fixed_acidity", 1.0, 25.0),
    ("volatile_acidity", 0.01, 5.0),
    ("citric_acid", 0.0, 3.0),
    ("residual_sugar", 0.1, 99.99),
    ("chlorides", 0.01, 2.0),
    ("free_sulfur_dioxide", 1.0, 400.0),
    ("total_sulfur_dioxide", 1.0, 600.0),
    ("density", 0.01, 3.0),
    ("pH", 0.01, 9.99),
    ("sulphates", 0.0, 9.0),
    ("alcohol", 5.0, 25.0),
];

/// Raw measurements for one wine, as submitted for prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionForm {
    pub fixed_acidity: f64,
    pub volatile_acidity: f64,
    pub citric_acid: f64,
    pub residual_sugar: f64,
    pub chlorides: f64,
    pub free_sulfur_dioxide: f64,
    pub total_sulfur_dioxide: f64,
    pub density: f64,
    #[serde(rename = "pH")]
    pub ph: f64,
    pub sulphates: f64,
    pub alcohol: f64,
    /// `red` or `white`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl PredictionForm {
    fn measurements(&self) -> [f64; 11] {
        [
            self.fixed_acidity,
            self.volatile_acidity,
            self.citric_acid,
            self.residual_sugar,
            self.chlorides,
            self.free_sulfur_dioxide,
            self.total_sulfur_dioxide,
            self.density,
            self.ph,
            self.sulphates,
            self.alcohol,
        ]
    }

    /// Reject measurements outside [`FIELD_BOUNDS`], including NaN.
    pub fn validate(&self) -> Result<()> {
        let out_of_range: Vec<String> = FIELD_BOUNDS
            .iter()
            .zip(self.measurements())
            .filter(|((_, min, max), value)| !(*min..=*max).contains(value))
            .map(|((name, min, max), value)| format!("{} = {} not in [{}, {}]", name, value, min, max))
            .collect();

        if out_of_range.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::InvalidInput(out_of_range.join(", ")))
        }
    }

    /// Convert into a raw row keyed by dataset column names.
    pub fn to_raw_row(&self) -> RawRow {
        let row = RawRow::new()
            .with("fixed_acidity", self.fixed_acidity)
            .with("volatile_acidity", self.volatile_acidity)
            .with("citric_acid", self.citric_acid)
            .with("residual_sugar", self.residual_sugar)
            .with("chlorides", self.chlorides)
            .with("free_sulfur_dioxide", self.free_sulfur_dioxide)
            .with("total_sulfur_dioxide", self.total_sulfur_dioxide)
            .with("density", self.density)
            .with("pH", self.ph)
            .with("sulphates", self.sulphates)
            .with("alcohol", self.alcohol);
        match &self.color {
            Some(color) => row.with("color", color.as_str()),
            None => row,
        }
    }
}

/// Outcome returned to the caller
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionOutcome {
    /// Score rounded to the nearest integer quality grade
    pub quality: i64,
    /// Raw model output
    pub score: f64,
}

impl PredictionOutcome {
    pub fn from_score(score: f64) -> Self {
        Self {
            quality: score.round() as i64,
            score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RawValue;
    use crate::error::ErrorKind;

    fn form_json() -> serde_json::Value {
        serde_json::json!({
            "fixed_acidity": 7.4,
            "volatile_acidity": 0.7,
            "citric_acid": 0.0,
            "residual_sugar": 1.9,
            "chlorides": 0.076,
            "free_sulfur_dioxide": 11.0,
            "total_sulfur_dioxide": 34.0,
            "density": 0.9978,
            "pH": 3.51,
            "sulphates": 0.56,
            "alcohol": 9.4
        })
    }

    #[test]
    fn test_form_to_row() {
        let form: PredictionForm = serde_json::from_value(form_json()).unwrap();
        let row = form.to_raw_row();
        assert_eq!(row.len(), 11);
        assert_eq!(row.get("pH"), Some(&RawValue::Number(3.51)));
        assert!(row.get("color").is_none());

        let with_color = PredictionForm {
            color: Some("red".to_string()),
            ..form
        };
        assert_eq!(
            with_color.to_raw_row().get("color"),
            Some(&RawValue::Text("red".to_string()))
        );
    }

    #[test]
    fn test_missing_field_rejected() {
        let mut json = form_json();
        json.as_object_mut().unwrap().remove("alcohol");
        assert!(serde_json::from_value::<PredictionForm>(json).is_err());
    }

    #[test]
    fn test_in_range_form_validates() {
        let form: PredictionForm = serde_json::from_value(form_json()).unwrap();
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_out_of_range_fields_rejected() {
        let form: PredictionForm = serde_json::from_value(form_json()).unwrap();
        let bad = PredictionForm {
            chlorides: -5.0,
            alcohol: 1e308,
            ..form.clone()
        };
        let err = bad.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        let msg = err.to_string();
        assert!(msg.contains("chlorides = -5 not in [0.01, 2]"));
        assert!(msg.contains("alcohol"));
        assert!(!msg.contains("density"));

        let nan = PredictionForm { ph: f64::NAN, ..form };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let form: PredictionForm = serde_json::from_value(form_json()).unwrap();
        let edge = PredictionForm {
            fixed_acidity: 25.0,
            citric_acid: 0.0,
            alcohol: 5.0,
            ..form
        };
        assert!(edge.validate().is_ok());
    }

    #[test]
    fn test_quality_rounding() {
        assert_eq!(PredictionOutcome::from_score(5.49).quality, 5);
        assert_eq!(PredictionOutcome::from_score(5.5).quality, 6);
        assert_eq!(PredictionOutcome::from_score(6.7).quality, 7);
    }
}
