use serde::Deserialize;

use super::features::{FeatureVector, FEATURE_ORDER};

/// Fitted per-feature affine transform applied before inference.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureScaler {
    /// `(x - mean) / scale`
    Standard {
        mean: FeatureVector,
        scale: FeatureVector,
    },
    /// `x * scale + min`
    MinMax {
        min: FeatureVector,
        scale: FeatureVector,
    },
}

impl FeatureScaler {
    pub fn validate(&self) -> Result<(), String> {
        let (offsets, factors) = match self {
            FeatureScaler::Standard { mean, scale } => (mean, scale),
            FeatureScaler::MinMax { min, scale } => (min, scale),
        };

        for (index, id) in FEATURE_ORDER.iter().enumerate() {
            if !offsets[index].is_finite() || !factors[index].is_finite() {
                return Err(format!("non-finite parameter for {}", id.name()));
            }
            if matches!(self, FeatureScaler::Standard { .. }) && factors[index] == 0.0 {
                return Err(format!("zero scale for {}", id.name()));
            }
        }

        Ok(())
    }

    pub fn transform(&self, features: &FeatureVector) -> FeatureVector {
        let mut scaled = *features;
        match self {
            FeatureScaler::Standard { mean, scale } => {
                for (index, value) in scaled.iter_mut().enumerate() {
                    *value = (*value - mean[index]) / scale[index];
                }
            }
            FeatureScaler::MinMax { min, scale } => {
                for (index, value) in scaled.iter_mut().enumerate() {
                    *value = *value * scale[index] + min[index];
                }
            }
        }
        scaled
    }
}
