use std::{
    fs,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex, OnceLock,
    },
};

use serde::de::DeserializeOwned;

use super::{
    encoder::{LabelEncoder, LabelEncoderFile},
    model::MultiOutputRegressor,
    scaler::FeatureScaler,
    PredictionError,
};
use crate::{log_info, log_warn};

const ENABLE_LOGS: bool = true;

pub const MODEL_FILE: &str = "gradient_boosting_tuning.json";
pub const SLEEP_QUALITY_ENCODER_FILE: &str = "le_sleep_quality.json";
pub const WEATHER_ENCODER_FILE: &str = "le_weather.json";
pub const DIET_QUALITY_ENCODER_FILE: &str = "le_diet_quality.json";
pub const SCALER_FILE: &str = "scaler.json";

pub const ARTIFACT_FILES: [&str; 5] = [
    MODEL_FILE,
    SLEEP_QUALITY_ENCODER_FILE,
    WEATHER_ENCODER_FILE,
    DIET_QUALITY_ENCODER_FILE,
    SCALER_FILE,
];

/// Everything the pipeline needs for inference. Immutable once loaded, and
/// only built by [`ModelArtifacts::load`].
#[derive(Debug, Clone)]
pub struct ModelArtifacts {
    pub(super) model: MultiOutputRegressor,
    pub(super) sleep_quality: LabelEncoder,
    pub(super) weather: LabelEncoder,
    pub(super) diet_quality: LabelEncoder,
    pub(super) scaler: FeatureScaler,
}

impl ModelArtifacts {
    /// Read and validate all five artifacts from `dir`. Returns nothing unless
    /// every file is present and well formed.
    pub fn load(dir: &Path) -> Result<Self, PredictionError> {
        let model_path = dir.join(MODEL_FILE);
        let model: MultiOutputRegressor = read_json(&model_path)?;

        let sleep_quality =
            read_encoder(&dir.join(SLEEP_QUALITY_ENCODER_FILE), "sleep_quality")?;
        let weather = read_encoder(&dir.join(WEATHER_ENCODER_FILE), "weather")?;
        let diet_quality = read_encoder(&dir.join(DIET_QUALITY_ENCODER_FILE), "diet_quality")?;

        let scaler_path = dir.join(SCALER_FILE);
        let scaler: FeatureScaler = read_json(&scaler_path)?;
        scaler
            .validate()
            .map_err(|reason| PredictionError::invalid(&scaler_path, reason))?;

        Ok(Self {
            model,
            sleep_quality,
            weather,
            diet_quality,
            scaler,
        })
    }

    pub fn model(&self) -> &MultiOutputRegressor {
        &self.model
    }

    pub fn sleep_quality(&self) -> &LabelEncoder {
        &self.sleep_quality
    }

    pub fn weather(&self) -> &LabelEncoder {
        &self.weather
    }

    pub fn diet_quality(&self) -> &LabelEncoder {
        &self.diet_quality
    }

    pub fn scaler(&self) -> &FeatureScaler {
        &self.scaler
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, PredictionError> {
    let contents = fs::read_to_string(path).map_err(|source| PredictionError::ArtifactMissing {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|err| PredictionError::invalid(path, err.to_string()))
}

fn read_encoder(path: &Path, field: &'static str) -> Result<LabelEncoder, PredictionError> {
    let file: LabelEncoderFile = read_json(path)?;
    LabelEncoder::from_classes(field, file.classes)
        .map_err(|reason| PredictionError::invalid(path, reason))
}

/// Process-wide holder for the loaded artifacts.
///
/// Reads after the first successful load never block. The first load runs
/// under `load_guard`, so concurrent first callers wait for a single load
/// instead of each reading the directory. Failed loads leave the store empty
/// and the next call tries again.
pub struct ArtifactStore {
    dir: PathBuf,
    loaded: OnceLock<Arc<ModelArtifacts>>,
    load_guard: Mutex<()>,
    loads: AtomicUsize,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            loaded: OnceLock::new(),
            load_guard: Mutex::new(()),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.get().is_some()
    }

    /// Number of successful disk loads performed by this store.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn get_or_load(&self) -> Result<Arc<ModelArtifacts>, PredictionError> {
        if let Some(artifacts) = self.loaded.get() {
            return Ok(Arc::clone(artifacts));
        }

        let _guard = match self.load_guard.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        // Another caller may have finished loading while we waited.
        if let Some(artifacts) = self.loaded.get() {
            return Ok(Arc::clone(artifacts));
        }

        match ModelArtifacts::load(&self.dir) {
            Ok(artifacts) => {
                let artifacts = Arc::new(artifacts);
                let _ = self.loaded.set(Arc::clone(&artifacts));
                self.loads.fetch_add(1, Ordering::SeqCst);
                log_info!("Loaded model artifacts from {}", self.dir.display());
                Ok(artifacts)
            }
            Err(err) => {
                log_warn!("Failed to load model artifacts: {err}");
                Err(err)
            }
        }
    }
}
