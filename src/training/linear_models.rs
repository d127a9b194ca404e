//! Elastic-net linear regression

use crate::artifact::{Artifact, ArtifactKind};
use crate::config::{ElasticNetParams, Selection};
use crate::error::{PipelineError, Result};
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Elastic Net Regression (L1 + L2 regularization via coordinate descent)
///
/// Minimizes `1/(2n) * ||y - Xw - b||^2 + alpha * l1_ratio * ||w||_1
/// + 0.5 * alpha * (1 - l1_ratio) * ||w||^2`, with the intercept fitted by
/// centering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElasticNet {
    pub params: ElasticNetParams,
    pub coefficients: Option<Array1<f64>>,
    pub intercept: Option<f64>,
    /// Sweeps performed by the last fit
    pub n_iter: usize,
    pub converged: bool,
    /// Duality gap at the returned coefficients, per sample
    pub dual_gap: f64,
    pub is_fitted: bool,
}

impl ElasticNet {
    pub fn new(params: ElasticNetParams) -> Self {
        Self {
            params,
            coefficients: None,
            intercept: None,
            n_iter: 0,
            converged: false,
            dual_gap: 0.0,
            is_fitted: false,
        }
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.params.solver.max_iter = max_iter;
        self
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.params.solver.tol = tol;
        self
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.params.solver.selection = selection;
        self
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();
        if n_samples == 0 {
            return Err(PipelineError::ShapeError {
                expected: "at least 1 training row".to_string(),
                actual: "0 rows".to_string(),
            });
        }
        if n_samples != y.len() {
            return Err(PipelineError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(PipelineError::ComputationError(
                "training data contains NaN or infinite values".to_string(),
            ));
        }

        let alpha = self.params.hyperparameters.alpha;
        let l1_ratio = self.params.hyperparameters.l1_ratio;
        let solver = self.params.solver;

        let x_mean = x
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(n_features));
        let y_mean = y.mean().unwrap_or(0.0);
        let x_c = x - &x_mean.view().insert_axis(Axis(0));
        let y_c = y - y_mean;

        let col_norms: Vec<f64> = (0..n_features)
            .map(|j| x_c.column(j).mapv(|v| v * v).sum())
            .collect();

        let n = n_samples as f64;
        let l1_penalty = alpha * l1_ratio * n;
        let l2_penalty = alpha * (1.0 - l1_ratio) * n;

        let mut w = Array1::<f64>::zeros(n_features);
        let mut r = y_c.clone();
        let mut order: Vec<usize> = (0..n_features).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.params.random_seed);

        let mut n_iter = 0;
        let mut converged = false;
        while n_iter < solver.max_iter {
            n_iter += 1;
            if solver.selection == Selection::Random {
                order.shuffle(&mut rng);
            }

            let mut diff = 0.0;
            for &j in &order {
                let denom = col_norms[j] + l2_penalty;
                let old_wj = w[j];
                let new_wj = if denom < 1e-15 {
                    0.0
                } else {
                    let rho = x_c.column(j).dot(&r) + col_norms[j] * old_wj;
                    soft_threshold(rho, l1_penalty) / denom
                };
                if new_wj != old_wj {
                    r.scaled_add(old_wj - new_wj, &x_c.column(j));
                    w[j] = new_wj;
                    diff += (new_wj - old_wj).abs();
                }
            }

            if diff < solver.tol {
                converged = true;
                break;
            }
        }

        if w.iter().any(|v| !v.is_finite()) {
            return Err(PipelineError::ComputationError(
                "coordinate descent produced non-finite coefficients".to_string(),
            ));
        }
        let intercept = y_mean - w.dot(&x_mean);
        if !intercept.is_finite() {
            return Err(PipelineError::ComputationError(
                "coordinate descent produced a non-finite intercept".to_string(),
            ));
        }

        let dual_gap = duality_gap(&x_c, &y_c, &r, &w, l1_penalty, l2_penalty) / n;

        if converged {
            debug!(n_iter, dual_gap, "Elastic net converged");
        } else {
            warn!(
                max_iter = solver.max_iter,
                tol = solver.tol,
                dual_gap,
                "Elastic net did not converge; consider raising max_iter"
            );
        }

        self.coefficients = Some(w);
        self.intercept = Some(intercept);
        self.n_iter = n_iter;
        self.converged = converged;
        self.dual_gap = dual_gap;
        self.is_fitted = true;
        Ok(self)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let (coefficients, intercept) = match (&self.coefficients, self.intercept) {
            (Some(c), Some(b)) if self.is_fitted => (c, b),
            _ => return Err(PipelineError::ModelNotFitted),
        };
        if x.ncols() != coefficients.len() {
            return Err(PipelineError::ShapeError {
                expected: format!("{} features", coefficients.len()),
                actual: format!("{} features", x.ncols()),
            });
        }
        Ok(x.dot(coefficients) + intercept)
    }

    /// Coefficient of determination on `(x, y)`
    pub fn score(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        let p = self.predict(x)?;
        let ym = y.mean().unwrap_or(0.0);
        let ss_res = (&p - y).mapv(|v| v * v).sum();
        let ss_tot = y.mapv(|v| (v - ym).powi(2)).sum();
        Ok(if ss_tot == 0.0 { 1.0 } else { 1.0 - ss_res / ss_tot })
    }

    /// Number of features the model was fitted on
    pub fn n_features_in(&self) -> Option<usize> {
        self.coefficients.as_ref().map(|c| c.len())
    }
}

impl Artifact for ElasticNet {
    const KIND: ArtifactKind = ArtifactKind::Model;
}

/// Gap between the primal objective at `w` and the best dual point built
/// from the residual `r = y - Xw`. Zero at the optimum.
fn duality_gap(
    x: &Array2<f64>,
    y: &Array1<f64>,
    r: &Array1<f64>,
    w: &Array1<f64>,
    l1_penalty: f64,
    l2_penalty: f64,
) -> f64 {
    let xt_a = x.t().dot(r) - &w.mapv(|v| v * l2_penalty);
    let dual_norm = xt_a.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    let r_norm2 = r.dot(r);
    let w_norm2 = w.dot(w);

    let (scale, base) = if dual_norm > l1_penalty {
        let c = l1_penalty / dual_norm;
        (c, 0.5 * r_norm2 * (1.0 + c * c))
    } else {
        (1.0, r_norm2)
    };

    base + l1_penalty * w.mapv(f64::abs).sum() - scale * r.dot(y)
        + 0.5 * l2_penalty * (1.0 + scale * scale) * w_norm2
}

fn soft_threshold(x: f64, lambda: f64) -> f64 {
    if x > lambda {
        x - lambda
    } else if x < -lambda {
        x + lambda
    } else {
        0.0
    }
}
