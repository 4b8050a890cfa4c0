//! Gradient-boosted regression trees exported from the training notebook.
//!
//! Each tree is stored as parallel node arrays: `children_left[i] == -1` marks a
//! leaf, otherwise the walk goes left when `x[feature[i]] <= threshold[i]`.
//!
//! Every type here is checked while it is deserialized, so a value that exists
//! is safe to evaluate: child indices only point forward, features are in
//! range and the multi-output wrapper holds exactly two estimators.

use serde::Deserialize;

use super::features::{FeatureVector, FEATURE_COUNT};

const LEAF: i64 = -1;

#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RegressionTreeFile")]
pub struct RegressionTree {
    children_left: Vec<i64>,
    children_right: Vec<i64>,
    feature: Vec<i64>,
    threshold: Vec<f64>,
    value: Vec<f64>,
}

#[derive(Deserialize)]
struct RegressionTreeFile {
    children_left: Vec<i64>,
    children_right: Vec<i64>,
    feature: Vec<i64>,
    threshold: Vec<f64>,
    value: Vec<f64>,
}

impl TryFrom<RegressionTreeFile> for RegressionTree {
    type Error = String;

    fn try_from(file: RegressionTreeFile) -> Result<Self, Self::Error> {
        let tree = Self {
            children_left: file.children_left,
            children_right: file.children_right,
            feature: file.feature,
            threshold: file.threshold,
            value: file.value,
        };
        tree.validate()?;
        Ok(tree)
    }
}

impl RegressionTree {
    fn validate(&self) -> Result<(), String> {
        let nodes = self.value.len();
        if nodes == 0 {
            return Err("tree has no nodes".into());
        }
        if self.children_left.len() != nodes
            || self.children_right.len() != nodes
            || self.feature.len() != nodes
            || self.threshold.len() != nodes
        {
            return Err("tree node arrays differ in length".into());
        }

        for node in 0..nodes {
            let left = self.children_left[node];
            let right = self.children_right[node];
            if left == LEAF {
                if right != LEAF {
                    return Err(format!("node {node} has only a right child"));
                }
                continue;
            }

            // Children always sit after their parent, so the walk cannot loop.
            for child in [left, right] {
                if child <= node as i64 || child >= nodes as i64 {
                    return Err(format!("node {node} points at invalid child {child}"));
                }
            }
            let feature = self.feature[node];
            if feature < 0 || feature >= FEATURE_COUNT as i64 {
                return Err(format!("node {node} splits on unknown feature {feature}"));
            }
        }

        Ok(())
    }

    pub fn evaluate(&self, features: &FeatureVector) -> f64 {
        let mut node = 0usize;
        loop {
            let left = self.children_left[node];
            if left == LEAF {
                return self.value[node];
            }
            let feature = self.feature[node] as usize;
            node = if features[feature] <= self.threshold[node] {
                left as usize
            } else {
                self.children_right[node] as usize
            };
        }
    }
}

/// Single-output gradient boosting regressor.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "GradientBoostingFile")]
pub struct GradientBoostingRegressor {
    init: f64,
    learning_rate: f64,
    trees: Vec<RegressionTree>,
}

#[derive(Deserialize)]
struct GradientBoostingFile {
    init: f64,
    learning_rate: f64,
    trees: Vec<RegressionTree>,
}

impl TryFrom<GradientBoostingFile> for GradientBoostingRegressor {
    type Error = String;

    fn try_from(file: GradientBoostingFile) -> Result<Self, Self::Error> {
        let model = Self {
            init: file.init,
            learning_rate: file.learning_rate,
            trees: file.trees,
        };
        model.validate()?;
        Ok(model)
    }
}

impl GradientBoostingRegressor {
    fn validate(&self) -> Result<(), String> {
        if !self.init.is_finite() || !self.learning_rate.is_finite() {
            return Err("non-finite init or learning_rate".into());
        }
        for (index, tree) in self.trees.iter().enumerate() {
            tree.validate().map_err(|reason| format!("tree {index}: {reason}"))?;
        }
        Ok(())
    }

    pub fn predict(&self, features: &FeatureVector) -> f64 {
        self.trees.iter().fold(self.init, |acc, tree| {
            acc + self.learning_rate * tree.evaluate(features)
        })
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

/// One regressor per target: index 0 is mood score, index 1 is stress level.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "MultiOutputFile")]
pub struct MultiOutputRegressor {
    estimators: Vec<GradientBoostingRegressor>,
}

#[derive(Deserialize)]
struct MultiOutputFile {
    estimators: Vec<GradientBoostingRegressor>,
}

impl TryFrom<MultiOutputFile> for MultiOutputRegressor {
    type Error = String;

    fn try_from(file: MultiOutputFile) -> Result<Self, Self::Error> {
        let model = Self {
            estimators: file.estimators,
        };
        model.validate()?;
        Ok(model)
    }
}

impl MultiOutputRegressor {
    pub const OUTPUTS: usize = 2;

    pub fn estimators(&self) -> &[GradientBoostingRegressor] {
        &self.estimators
    }

    fn validate(&self) -> Result<(), String> {
        if self.estimators.len() != Self::OUTPUTS {
            return Err(format!(
                "expected {} estimators, found {}",
                Self::OUTPUTS,
                self.estimators.len()
            ));
        }
        for (index, estimator) in self.estimators.iter().enumerate() {
            estimator
                .validate()
                .map_err(|reason| format!("estimator {index}: {reason}"))?;
        }
        Ok(())
    }

    pub fn predict(&self, features: &FeatureVector) -> [f64; 2] {
        [
            self.estimators[0].predict(features),
            self.estimators[1].predict(features),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(feature: i64, threshold: f64, left: f64, right: f64) -> RegressionTree {
        RegressionTree {
            children_left: vec![1, LEAF, LEAF],
            children_right: vec![2, LEAF, LEAF],
            feature: vec![feature, -2, -2],
            threshold: vec![threshold, -2.0, -2.0],
            value: vec![0.0, left, right],
        }
    }

    #[test]
    fn tree_walk_goes_left_on_equal() {
        let tree = stump(3, 0.5, -1.0, 1.0);
        tree.validate().unwrap();

        let mut x = [0.0; 8];
        x[3] = 0.5;
        assert_eq!(tree.evaluate(&x), -1.0);
        x[3] = 0.6;
        assert_eq!(tree.evaluate(&x), 1.0);
    }

    #[test]
    fn boosting_adds_shrunken_tree_outputs() {
        let model = GradientBoostingRegressor {
            init: 5.0,
            learning_rate: 0.5,
            trees: vec![stump(0, 0.0, -2.0, 2.0), stump(1, 0.0, -1.0, 1.0)],
        };
        model.validate().unwrap();

        assert_eq!(model.predict(&[1.0; 8]), 6.5);
        assert_eq!(model.predict(&[-1.0; 8]), 3.5);
        assert_eq!(model.tree_count(), 2);
    }

    #[test]
    fn leaf_only_tree_returns_its_value() {
        let tree = RegressionTree {
            children_left: vec![LEAF],
            children_right: vec![LEAF],
            feature: vec![-2],
            threshold: vec![-2.0],
            value: vec![0.25],
        };
        tree.validate().unwrap();
        assert_eq!(tree.evaluate(&[100.0; 8]), 0.25);
    }

    #[test]
    fn malformed_trees_are_rejected() {
        let mut cyclic = stump(0, 0.0, 0.0, 0.0);
        cyclic.children_left[0] = 0;
        assert!(cyclic.validate().is_err());

        let bad_feature = stump(8, 0.0, 0.0, 0.0);
        assert!(bad_feature.validate().unwrap_err().contains("unknown feature"));

        let mut ragged = stump(0, 0.0, 0.0, 0.0);
        ragged.threshold.pop();
        assert!(ragged.validate().is_err());
    }

    const STUMP_JSON: &str = r#"{
        "children_left": [1, -1, -1],
        "children_right": [2, -1, -1],
        "feature": [0, -2, -2],
        "threshold": [0.0, -2.0, -2.0],
        "value": [0.0, -1.0, 1.0]
    }"#;

    #[test]
    fn single_estimator_export_does_not_deserialize() {
        let json = format!(
            r#"{{"estimators": [{{"init": 5.0, "learning_rate": 0.1, "trees": [{STUMP_JSON}]}}]}}"#
        );
        let err = serde_json::from_str::<MultiOutputRegressor>(&json).unwrap_err();
        assert!(err.to_string().contains("expected 2 estimators, found 1"));
    }

    #[test]
    fn cyclic_tree_export_does_not_deserialize() {
        let json = STUMP_JSON.replace("[1, -1, -1]", "[0, -1, -1]");
        let err = serde_json::from_str::<RegressionTree>(&json).unwrap_err();
        assert!(err.to_string().contains("invalid child"));

        let estimator = format!(r#"{{"init": 0.0, "learning_rate": 0.1, "trees": [{json}]}}"#);
        assert!(serde_json::from_str::<GradientBoostingRegressor>(&estimator).is_err());
    }

    #[test]
    fn well_formed_export_deserializes_and_predicts() {
        let estimator = format!(r#"{{"init": 5.0, "learning_rate": 0.5, "trees": [{STUMP_JSON}]}}"#);
        let json = format!(r#"{{"estimators": [{estimator}, {estimator}]}}"#);
        let model: MultiOutputRegressor = serde_json::from_str(&json).unwrap();
        assert_eq!(model.predict(&[1.0; 8]), [5.5, 5.5]);
        assert_eq!(model.estimators()[0].tree_count(), 1);
    }

    #[test]
    fn multi_output_needs_exactly_two_estimators() {
        let single = MultiOutputRegressor {
            estimators: vec![GradientBoostingRegressor {
                init: 0.0,
                learning_rate: 0.1,
                trees: Vec::new(),
            }],
        };
        assert!(single.validate().is_err());
    }
}
