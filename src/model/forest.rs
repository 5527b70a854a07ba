use crate::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// Regression tree stored as a flat node array rooted at index 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    // Children must come after their parent, which also rules out cycles.
    fn validate(&self, n_features: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(Error::model("decision tree has no nodes"));
        }

        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(Error::model(format!(
                            "node {idx} splits on feature {feature}, model has {n_features}"
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(Error::model(format!("node {idx} has a non-finite threshold")));
                    }
                    for child in [left, right] {
                        if *child <= idx || *child >= self.nodes.len() {
                            return Err(Error::model(format!(
                                "node {idx} points to invalid child {child}"
                            )));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(Error::model(format!("leaf {idx} has a non-finite value")));
                    }
                }
            }
        }
        Ok(())
    }

    fn evaluate(&self, values: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if values[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

/// Averaging tree ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestRegressor {
    pub feature_names: Vec<String>,
    pub trees: Vec<DecisionTree>,
}

impl ForestRegressor {
    pub fn validate(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(Error::model("forest has no trees"));
        }
        for (idx, tree) in self.trees.iter().enumerate() {
            tree.validate(self.feature_names.len())
                .map_err(|e| Error::model(format!("tree {idx}: {e}")))?;
        }
        Ok(())
    }

    /// `values` must hold one entry per feature name.
    pub fn predict_row(&self, values: &[f64]) -> f64 {
        let total: f64 = self.trees.iter().map(|tree| tree.evaluate(values)).sum();
        total / self.trees.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(threshold: f64, low: f64, high: f64) -> DecisionTree {
        DecisionTree {
            nodes: vec![
                TreeNode::Split {
                    feature: 0,
                    threshold,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf { value: low },
                TreeNode::Leaf { value: high },
            ],
        }
    }

    fn forest() -> ForestRegressor {
        ForestRegressor {
            feature_names: vec!["area".to_string()],
            trees: vec![stump(1000.0, 10.0, 20.0), stump(2000.0, 30.0, 50.0)],
        }
    }

    #[test]
    fn test_forest_averages_trees() {
        let model = forest();
        model.validate().unwrap();

        assert_eq!(model.predict_row(&[500.0]), 20.0);
        assert_eq!(model.predict_row(&[1000.0]), 20.0);
        assert_eq!(model.predict_row(&[1500.0]), 25.0);
        assert_eq!(model.predict_row(&[2500.0]), 35.0);
    }

    #[test]
    fn test_backward_child_rejected() {
        let mut model = forest();
        model.trees[0].nodes[0] = TreeNode::Split {
            feature: 0,
            threshold: 1.0,
            left: 0,
            right: 2,
        };
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_unknown_feature_rejected() {
        let mut model = forest();
        model.trees[1].nodes[0] = TreeNode::Split {
            feature: 3,
            threshold: 1.0,
            left: 1,
            right: 2,
        };
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_empty_forest_rejected() {
        let model = ForestRegressor {
            feature_names: vec![],
            trees: vec![],
        };
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_node_json_shape() {
        let node: TreeNode = serde_json::from_str(r#"{"node":"leaf","value":4.5}"#).unwrap();
        assert_eq!(node, TreeNode::Leaf { value: 4.5 });
    }
}
