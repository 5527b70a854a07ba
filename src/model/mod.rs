mod forest;
mod linear;

pub use forest::{DecisionTree, ForestRegressor, TreeNode};
pub use linear::LinearRegressor;

use crate::{Error, Result, error::PredictError, features::FeatureVector};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, path::Path};
use tracing::info;

/// Inference seam. Implementations hold no per-call state and are shared
/// across concurrent requests.
pub trait Regressor: Send + Sync {
    fn feature_names(&self) -> &[String];

    fn predict(&self, row: &FeatureVector) -> std::result::Result<f64, PredictError>;
}

/// On-disk model format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    Linear(LinearRegressor),
    Forest(ForestRegressor),
}

impl ModelArtifact {
    fn feature_names(&self) -> &[String] {
        match self {
            Self::Linear(m) => &m.feature_names,
            Self::Forest(m) => &m.feature_names,
        }
    }

    fn validate(&self) -> Result<()> {
        let names = self.feature_names();
        let unique: HashSet<&String> = names.iter().collect();
        if unique.len() != names.len() {
            return Err(Error::model("duplicate feature names in model artifact"));
        }

        match self {
            Self::Linear(m) => m.validate(),
            Self::Forest(m) => m.validate(),
        }
    }
}

/// The trained model, loaded once and read-only afterwards.
#[derive(Debug)]
pub struct ModelInvoker {
    artifact: ModelArtifact,
}

impl ModelInvoker {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::model(format!("failed to read model {}: {e}", path.display()))
        })?;
        let artifact: ModelArtifact = serde_json::from_str(&raw)?;
        let invoker = Self::from_artifact(artifact)?;

        info!(
            "Model loaded from {} ({} features)",
            path.display(),
            invoker.feature_names().len()
        );
        Ok(invoker)
    }

    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self> {
        artifact.validate()?;
        Ok(Self { artifact })
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }
}

impl Regressor for ModelInvoker {
    fn feature_names(&self) -> &[String] {
        self.artifact.feature_names()
    }

    fn predict(&self, row: &FeatureVector) -> std::result::Result<f64, PredictError> {
        check_feature_names(self.feature_names(), row.columns())?;

        let prediction = match &self.artifact {
            ModelArtifact::Linear(m) => m.predict_row(row.values()),
            ModelArtifact::Forest(m) => m.predict_row(row.values()),
        };

        if !prediction.is_finite() {
            return Err(PredictError::inference(format!(
                "model produced a non-finite prediction: {prediction}"
            )));
        }
        Ok(prediction)
    }
}

/// The row must carry exactly the fitted feature names, in fitted order.
pub fn check_feature_names(
    expected: &[String],
    actual: &[String],
) -> std::result::Result<(), PredictError> {
    if expected == actual {
        return Ok(());
    }

    let expected_set: HashSet<&String> = expected.iter().collect();
    let actual_set: HashSet<&String> = actual.iter().collect();

    if expected_set == actual_set && expected.len() == actual.len() {
        return Err(PredictError::inference(
            "feature names must be in the same order as they were in fit",
        ));
    }

    let unseen: Vec<&str> = actual
        .iter()
        .filter(|c| !expected_set.contains(c))
        .map(String::as_str)
        .collect();
    let missing: Vec<&str> = expected
        .iter()
        .filter(|c| !actual_set.contains(c))
        .map(String::as_str)
        .collect();

    let mut parts = Vec::new();
    if !unseen.is_empty() {
        parts.push(format!("unseen at fit time: {}", unseen.join(", ")));
    }
    if !missing.is_empty() {
        parts.push(format!("seen at fit time, yet now missing: {}", missing.join(", ")));
    }
    if parts.is_empty() {
        parts.push(format!(
            "expected {} features, got {}",
            expected.len(),
            actual.len()
        ));
    }

    Err(PredictError::inference(format!(
        "feature names do not match the model ({})",
        parts.join("; ")
    )))
}
