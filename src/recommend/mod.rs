//! Free-text recommendations generated from a prediction and the raw metrics.
//!
//! The [`Recommender`] trait is the seam to the text-generation service. The
//! Gemini implementation calls out over HTTPS; the offline implementation is
//! deterministic and needs no network.

mod gemini;
mod offline;
mod prompt;

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use thiserror::Error;

pub use gemini::{GeminiRecommender, GEMINI_API_KEY_ENV};
pub use offline::OfflineRecommender;
pub use prompt::RecommendationPrompt;

use crate::settings::{RecommenderProvider, RecommenderSettings};
use crate::log_warn;

const ENABLE_LOGS: bool = true;

#[derive(Error, Debug)]
pub enum RecommendationError {
    #[error("recommendation request failed: {0}")]
    Request(String),

    #[error("recommendation service returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("recommendation service returned no text")]
    EmptyResponse,
}

#[async_trait]
pub trait Recommender: Send + Sync {
    fn name(&self) -> &'static str;

    async fn recommend(&self, prompt: &RecommendationPrompt) -> Result<String, RecommendationError>;
}

/// Pick the recommender described by `settings`. Falls back to the offline
/// recommender when Gemini is selected but no API key is available.
pub fn build_recommender(
    settings: &RecommenderSettings,
    api_key: Option<String>,
) -> Arc<dyn Recommender> {
    match (settings.provider, api_key) {
        (RecommenderProvider::Gemini, Some(key)) if !key.trim().is_empty() => Arc::new(
            GeminiRecommender::new(key, settings.model.clone())
                .with_timeout(Duration::from_secs(settings.timeout_secs)),
        ),
        (RecommenderProvider::Gemini, _) => {
            log_warn!("{GEMINI_API_KEY_ENV} is not set; using offline recommendations");
            Arc::new(OfflineRecommender)
        }
        (RecommenderProvider::Offline, _) => Arc::new(OfflineRecommender),
    }
}
