//! Stored daily entries: the raw metrics plus what the pipeline produced.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::prediction::{DailyEntry, Prediction};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerEntry {
    pub id: i64,
    pub user_id: i64,
    /// Calendar day (UTC) the entry counts for. At most one per user.
    pub entry_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub metrics: DailyEntry,
    pub mood_score: f64,
    pub stress_level: f64,
    pub ai_recommendation: Option<String>,
}

impl TrackerEntry {
    pub fn prediction(&self) -> Prediction {
        Prediction {
            mood_score: self.mood_score,
            stress_level: self.stress_level,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewTrackerEntry {
    pub user_id: i64,
    pub entry_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub metrics: DailyEntry,
    pub prediction: Prediction,
    pub ai_recommendation: Option<String>,
}
