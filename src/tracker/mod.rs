//! Daily tracking workflow: one prediction per user and calendar day, a
//! short history and a CSV export.

mod export;

use std::{io::Write, sync::Arc};

use chrono::{NaiveDate, Utc};
use thiserror::Error;

pub use export::{export_file_name, write_entries_csv, EXPORT_HEADER};

use crate::{
    db::{
        models::{NewTrackerEntry, TrackerEntry},
        Database,
    },
    log_info,
    prediction::{DailyEntry, MentalHealthPredictor, PredictionError},
    recommend::{RecommendationError, RecommendationPrompt, Recommender},
};

const ENABLE_LOGS: bool = true;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Prediction for today already exists. Please wait until tomorrow to make a new prediction.")]
    DailyEntryExists { date: NaiveDate },

    #[error(transparent)]
    Prediction(#[from] PredictionError),

    #[error(transparent)]
    Recommendation(#[from] RecommendationError),

    #[error("storage error: {0:#}")]
    Storage(#[from] anyhow::Error),

    #[error("failed to write export: {0}")]
    Export(#[from] csv::Error),
}

#[derive(Clone)]
pub struct TrackerService {
    db: Database,
    predictor: MentalHealthPredictor,
    recommender: Arc<dyn Recommender>,
    history_limit: usize,
}

impl TrackerService {
    pub fn new(
        db: Database,
        predictor: MentalHealthPredictor,
        recommender: Arc<dyn Recommender>,
        history_limit: usize,
    ) -> Self {
        Self {
            db,
            predictor,
            recommender,
            history_limit,
        }
    }

    /// Predict, recommend and persist the entry for `date`. Nothing is stored
    /// unless every step succeeds.
    pub async fn record_entry(
        &self,
        user_id: i64,
        entry: &DailyEntry,
        date: NaiveDate,
    ) -> Result<TrackerEntry, TrackerError> {
        if self.db.entry_exists_for_date(user_id, date).await? {
            return Err(TrackerError::DailyEntryExists { date });
        }

        let prediction = self.predictor.predict(entry)?;
        let prompt = RecommendationPrompt::new(&prediction, entry);
        let recommendation = self.recommender.recommend(&prompt).await?;

        // A concurrent request for the same day can win between the check
        // above and this insert; the unique index settles it.
        let inserted = self
            .db
            .insert_tracker_entry(NewTrackerEntry {
                user_id,
                entry_date: date,
                created_at: Utc::now(),
                metrics: entry.clone(),
                prediction,
                ai_recommendation: Some(recommendation),
            })
            .await?;
        let Some(stored) = inserted else {
            return Err(TrackerError::DailyEntryExists { date });
        };

        log_info!(
            "Recorded entry {} for user {} on {} via {} (mood {}, stress {})",
            stored.id,
            user_id,
            date,
            self.recommender.name(),
            stored.mood_score,
            stored.stress_level
        );

        Ok(stored)
    }

    pub async fn record_today(
        &self,
        user_id: i64,
        entry: &DailyEntry,
    ) -> Result<TrackerEntry, TrackerError> {
        self.record_entry(user_id, entry, Utc::now().date_naive())
            .await
    }

    /// Most recent entries, oldest first.
    pub async fn history(&self, user_id: i64) -> Result<Vec<TrackerEntry>, TrackerError> {
        Ok(self.db.recent_entries(user_id, self.history_limit).await?)
    }

    /// Write every entry of the user as CSV, oldest first. Returns the row count.
    pub async fn export_csv<W: Write>(
        &self,
        user_id: i64,
        writer: W,
    ) -> Result<usize, TrackerError> {
        let entries = self.db.all_entries(user_id).await?;
        write_entries_csv(&entries, writer)?;
        Ok(entries.len())
    }
}
