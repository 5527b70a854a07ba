use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Ordinary least squares fit: `intercept + sum(coefficient * feature)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegressor {
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LinearRegressor {
    pub fn validate(&self) -> Result<()> {
        if self.coefficients.len() != self.feature_names.len() {
            return Err(Error::model(format!(
                "linear model has {} coefficients for {} features",
                self.coefficients.len(),
                self.feature_names.len()
            )));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(Error::model("linear model contains non-finite parameters"));
        }
        Ok(())
    }

    pub fn predict_row(&self, values: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(values)
            .fold(self.intercept, |acc, (coef, value)| acc + coef * value)
    }
}
