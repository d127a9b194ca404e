//! Regression metrics

use crate::error::{PipelineError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Regression metrics for one data split, keyed as in the score report
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    #[serde(rename = "MAE")]
    pub mae: f64,
    #[serde(rename = "MSE")]
    pub mse: f64,
    #[serde(rename = "RMSE")]
    pub rmse: f64,
    /// Mean percentage error, in percent
    #[serde(rename = "MPE")]
    pub mpe: f64,
    /// Mean absolute percentage error, in percent
    #[serde(rename = "MAPE")]
    pub mape: f64,
    #[serde(rename = "R2-Score")]
    pub r2: f64,
    #[serde(rename = "Adjusted R2-Score")]
    pub adjusted_r2: f64,
}

impl RegressionMetrics {
    /// Compute every metric for predictions made from `n_features` predictors.
    pub fn compute(y_true: &Array1<f64>, y_pred: &Array1<f64>, n_features: usize) -> Result<Self> {
        let n = y_true.len();
        if n == 0 {
            return Err(PipelineError::ComputationError(
                "cannot score an empty prediction set".to_string(),
            ));
        }
        if y_pred.len() != n {
            return Err(PipelineError::ShapeError {
                expected: format!("{} predictions", n),
                actual: format!("{} predictions", y_pred.len()),
            });
        }
        if y_true.iter().any(|&v| v == 0.0) {
            return Err(PipelineError::ComputationError(
                "percentage errors are undefined when a true value is zero".to_string(),
            ));
        }

        let nf = n as f64;
        let errors = y_true - y_pred;
        let mae = errors.mapv(f64::abs).sum() / nf;
        let mse = errors.mapv(|e| e * e).sum() / nf;
        let rmse = mse.sqrt();
        let relative = &errors / y_true;
        let mpe = relative.sum() / nf * 100.0;
        let mape = relative.mapv(f64::abs).sum() / nf * 100.0;
        let r2 = r2_score(y_true, y_pred);
        let adjusted_r2 = adjusted_r2(r2, n, n_features)?;

        let metrics = Self {
            mae,
            mse,
            rmse,
            mpe,
            mape,
            r2,
            adjusted_r2,
        };
        if metrics.values().iter().any(|v| !v.is_finite()) {
            return Err(PipelineError::ComputationError(format!(
                "non-finite regression metric: {:?}",
                metrics
            )));
        }
        Ok(metrics)
    }

    /// Every metric rounded to 2 decimal places
    pub fn rounded(&self) -> Self {
        Self {
            mae: round2(self.mae),
            mse: round2(self.mse),
            rmse: round2(self.rmse),
            mpe: round2(self.mpe),
            mape: round2(self.mape),
            r2: round2(self.r2),
            adjusted_r2: round2(self.adjusted_r2),
        }
    }

    fn values(&self) -> [f64; 7] {
        [
            self.mae,
            self.mse,
            self.rmse,
            self.mpe,
            self.mape,
            self.r2,
            self.adjusted_r2,
        ]
    }
}

/// Coefficient of determination. A constant target scores 1.0 when predicted
/// exactly and 0.0 otherwise.
pub fn r2_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    let mean = y_true.mean().unwrap_or(0.0);
    let ss_res = (y_true - y_pred).mapv(|e| e * e).sum();
    let ss_tot = y_true.mapv(|v| (v - mean).powi(2)).sum();
    if ss_tot == 0.0 {
        if ss_res == 0.0 {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - ss_res / ss_tot
    }
}

/// `1 - (1 - r2)(n - 1)/(n - p - 1)`; fails when `n <= p + 1`.
pub fn adjusted_r2(r2: f64, n_samples: usize, n_features: usize) -> Result<f64> {
    if n_samples <= n_features + 1 {
        return Err(PipelineError::ComputationError(format!(
            "adjusted R2 needs more observations than features + 1 (n = {}, p = {})",
            n_samples, n_features
        )));
    }
    let n = n_samples as f64;
    let p = n_features as f64;
    Ok(1.0 - (1.0 - r2) * (n - 1.0) / (n - p - 1.0))
}

/// Round half away from zero to 2 decimal places
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_metrics_values() {
        let y_true = array![3.0, 5.0, 2.0, 7.0, 4.0];
        let y_pred = array![2.5, 5.0, 3.0, 8.0, 4.0];
        let m = RegressionMetrics::compute(&y_true, &y_pred, 1).unwrap();

        assert!((m.mae - 0.5).abs() < 1e-12);
        assert!((m.mse - 0.45).abs() < 1e-12);
        assert!((m.rmse - 0.45f64.sqrt()).abs() < 1e-12);
        // relative errors: 1/6, 0, -1/2, -1/7, 0
        let expected_mpe = (1.0 / 6.0 - 0.5 - 1.0 / 7.0) / 5.0 * 100.0;
        assert!((m.mpe - expected_mpe).abs() < 1e-9);
        let expected_mape = (1.0 / 6.0 + 0.5 + 1.0 / 7.0) / 5.0 * 100.0;
        assert!((m.mape - expected_mape).abs() < 1e-9);
        // ss_tot = 14.8, ss_res = 2.25
        assert!((m.r2 - (1.0 - 2.25 / 14.8)).abs() < 1e-12);
        assert!((m.adjusted_r2 - (1.0 - (2.25 / 14.8) * 4.0 / 3.0)).abs() < 1e-12);
    }

    #[test]
    fn test_adjusted_r2_guard() {
        let err = adjusted_r2(0.5, 3, 2).unwrap_err();
        assert!(matches!(err, PipelineError::ComputationError(_)));
        assert!(adjusted_r2(0.5, 2, 2).is_err());
        assert!(adjusted_r2(0.5, 4, 2).is_ok());
    }

    #[test]
    fn test_compute_fails_on_too_few_rows() {
        let y = array![1.0, 2.0, 3.0];
        assert!(RegressionMetrics::compute(&y, &y, 2).is_err());
    }

    #[test]
    fn test_zero_true_value_rejected() {
        let y_true = array![0.0, 1.0, 2.0, 3.0];
        let err = RegressionMetrics::compute(&y_true, &y_true, 1).unwrap_err();
        assert!(err.to_string().contains("zero"));
    }

    #[test]
    fn test_r2_constant_target() {
        let y = array![2.0, 2.0, 2.0];
        assert_eq!(r2_score(&y, &y), 1.0);
        assert_eq!(r2_score(&y, &array![2.0, 2.0, 3.0]), 0.0);
    }

    #[test]
    fn test_rounding_and_keys() {
        let m = RegressionMetrics {
            mae: 0.123,
            mse: 1.005,
            rmse: 2.0,
            mpe: -3.456,
            mape: 3.456,
            r2: 0.987,
            adjusted_r2: 0.9849,
        }
        .rounded();
        assert_eq!(m.mae, 0.12);
        assert_eq!(m.mpe, -3.46);
        assert_eq!(m.adjusted_r2, 0.98);

        let json = serde_json::to_value(m).unwrap();
        assert_eq!(json["R2-Score"], 0.99);
        assert!(json.get("Adjusted R2-Score").is_some());
    }
}
