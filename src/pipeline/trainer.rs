//! Model training stage

use super::Stage;
use crate::artifact::Artifact;
use crate::config::{ElasticNetParams, ModelTrainerConfig};
use crate::error::{Result, StageContext};
use crate::training::{split_features_target, ElasticNet};
use ndarray::Array2;
use tracing::info;

/// Fit an elastic net on a transformed training array.
pub fn fit_model(train: &Array2<f64>, params: &ElasticNetParams) -> Result<ElasticNet> {
    params.validate()?;
    let (x, y) = split_features_target(train)?;
    let mut model = ElasticNet::new(*params);
    model.fit(&x, &y)?;
    Ok(model)
}

/// Load the training array, fit the model and persist it.
pub fn train_model(config: &ModelTrainerConfig, params: &ElasticNetParams) -> Result<ElasticNet> {
    const STAGE: &str = Stage::Training.name();
    let train = Array2::<f64>::load(&config.train_array_path).in_stage(STAGE)?;
    let model = fit_model(&train, params).in_stage(STAGE)?;
    model.save(&config.model_path).in_stage(STAGE)?;

    info!(
        rows = train.nrows(),
        features = train.ncols() - 1,
        n_iter = model.n_iter,
        converged = model.converged,
        model_path = %config.model_path.display(),
        "Model trained"
    );
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_fit_model_is_deterministic() {
        let train = array![
            [0.1, 1.0, 5.0],
            [0.4, -1.0, 6.0],
            [0.9, 0.5, 7.0],
            [1.3, -0.2, 6.0],
            [1.8, 0.3, 8.0]
        ];
        let params = ElasticNetParams::new(0.1, 0.5, 42);
        let a = fit_model(&train, &params).unwrap();
        let b = fit_model(&train, &params).unwrap();
        assert_eq!(a.coefficients, b.coefficients);
        assert_eq!(a.intercept, b.intercept);
        assert_eq!(a.n_features_in(), Some(2));
    }

    #[test]
    fn test_train_model_persists() {
        let dir = tempfile::tempdir().unwrap();
        let config = ModelTrainerConfig {
            train_array_path: dir.path().join("train.bin"),
            model_path: dir.path().join("models").join("model.bin"),
        };
        array![[1.0, 3.0], [2.0, 5.0], [3.0, 7.0]]
            .save(&config.train_array_path)
            .unwrap();

        let model = train_model(&config, &ElasticNetParams::new(0.01, 0.5, 0)).unwrap();
        let loaded = ElasticNet::load(&config.model_path).unwrap();
        assert_eq!(loaded.coefficients, model.coefficients);
        assert_eq!(loaded.params, model.params);
    }
}
