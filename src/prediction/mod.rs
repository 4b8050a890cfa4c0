//! Mood and stress prediction from one day of lifestyle metrics.
//!
//! Flow: encode the three categorical fields, assemble the vector in
//! [`FEATURE_ORDER`], scale it, run the two boosted regressors and round each
//! output to one decimal place. Artifacts are loaded once through an
//! [`ArtifactStore`] owned by the application state.

pub mod artifacts;
pub mod encoder;
mod error;
pub mod features;
pub mod interpretation;
pub mod model;
pub mod scaler;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use artifacts::{ArtifactStore, ModelArtifacts};
pub use error::PredictionError;
pub use features::{
    DailyEntry, DietQuality, EncodedCategories, FeatureId, FeatureVector, SleepQuality, Weather,
    FEATURE_COUNT, FEATURE_ORDER,
};
pub use interpretation::{MoodBand, StressBand};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub mood_score: f64,
    pub stress_level: f64,
}

impl Prediction {
    pub fn mood_band(&self) -> MoodBand {
        MoodBand::from_score(self.mood_score)
    }

    pub fn stress_band(&self) -> StressBand {
        StressBand::from_score(self.stress_level)
    }
}

/// Round to one decimal, ties to even. Scores are not clamped.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

impl ModelArtifacts {
    pub fn encode(&self, entry: &DailyEntry) -> Result<EncodedCategories, PredictionError> {
        Ok(EncodedCategories {
            sleep_quality: self.sleep_quality.encode(entry.sleep_quality.as_str())?,
            weather: self.weather.encode(entry.weather.as_str())?,
            diet_quality: self.diet_quality.encode(entry.diet_quality.as_str())?,
        })
    }

    /// Encoded and scaled model input.
    pub fn feature_vector(&self, entry: &DailyEntry) -> Result<FeatureVector, PredictionError> {
        let codes = self.encode(entry)?;
        let scaled = self.scaler.transform(&entry.raw_features(&codes));

        for (id, value) in FEATURE_ORDER.iter().zip(scaled.iter()) {
            if !value.is_finite() {
                return Err(PredictionError::NumericFailure {
                    what: format!("scaled {}", id.name()),
                    value: *value,
                });
            }
        }

        Ok(scaled)
    }

    pub fn predict(&self, entry: &DailyEntry) -> Result<Prediction, PredictionError> {
        let features = self.feature_vector(entry)?;
        let [mood_score, stress_level] = self.model.predict(&features);

        for (what, value) in [("mood_score", mood_score), ("stress_level", stress_level)] {
            if !value.is_finite() {
                return Err(PredictionError::NumericFailure {
                    what: what.to_string(),
                    value,
                });
            }
        }

        Ok(Prediction {
            mood_score: round_to_tenth(mood_score),
            stress_level: round_to_tenth(stress_level),
        })
    }
}

#[derive(Clone)]
pub struct MentalHealthPredictor {
    store: Arc<ArtifactStore>,
}

impl MentalHealthPredictor {
    pub fn new(store: Arc<ArtifactStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub fn predict(&self, entry: &DailyEntry) -> Result<Prediction, PredictionError> {
        let artifacts = self.store.get_or_load()?;
        artifacts.predict(entry)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::{
        fs,
        path::{Path, PathBuf},
    };

    use super::{artifacts::ARTIFACT_FILES, DailyEntry, DietQuality, SleepQuality, Weather};

    pub fn fixture_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/artifacts")
    }

    /// Copy the fixture artifacts into `dest`, leaving out `skip`.
    pub fn copy_fixture_artifacts(dest: &Path, skip: &[&str]) {
        for name in ARTIFACT_FILES.iter().filter(|name| !skip.contains(name)) {
            fs::copy(fixture_dir().join(name), dest.join(name)).unwrap();
        }
    }

    pub fn sample_entry() -> DailyEntry {
        DailyEntry {
            sleep_hours: 7.5,
            sleep_quality: SleepQuality::Good,
            screen_time: 5.0,
            physical_activity: 30,
            social_interaction: 3.0,
            work_productivity: 7,
            weather: Weather::Sunny,
            diet_quality: DietQuality::Good,
        }
    }
}
