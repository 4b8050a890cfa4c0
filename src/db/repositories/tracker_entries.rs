use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use rusqlite::{ffi, params, OptionalExtension, Row};

use crate::db::{
    connection::Database,
    helpers::{format_date, parse_category, parse_date, parse_datetime},
    models::{NewTrackerEntry, TrackerEntry},
};
use crate::prediction::DailyEntry;

const ENTRY_COLUMNS: &str = "id, user_id, entry_date, created_at, sleep_hours, sleep_quality, \
     screen_time, physical_activity, social_interaction, work_productivity, weather, \
     diet_quality, mood_score, stress_level, ai_recommendation";

fn row_to_tracker_entry(row: &Row) -> Result<TrackerEntry> {
    let entry_date: String = row.get("entry_date")?;
    let created_at: String = row.get("created_at")?;
    let sleep_quality: String = row.get("sleep_quality")?;
    let weather: String = row.get("weather")?;
    let diet_quality: String = row.get("diet_quality")?;

    Ok(TrackerEntry {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        entry_date: parse_date(&entry_date, "entry_date")?,
        created_at: parse_datetime(&created_at, "created_at")?,
        metrics: DailyEntry {
            sleep_hours: row.get("sleep_hours")?,
            sleep_quality: parse_category(&sleep_quality, "sleep_quality")?,
            screen_time: row.get("screen_time")?,
            physical_activity: row.get("physical_activity")?,
            social_interaction: row.get("social_interaction")?,
            work_productivity: row.get("work_productivity")?,
            weather: parse_category(&weather, "weather")?,
            diet_quality: parse_category(&diet_quality, "diet_quality")?,
        },
        mood_score: row.get("mood_score")?,
        stress_level: row.get("stress_level")?,
        ai_recommendation: row.get("ai_recommendation")?,
    })
}

impl Database {
    pub async fn entry_exists_for_date(&self, user_id: i64, date: NaiveDate) -> Result<bool> {
        self.execute(move |conn| {
            let found: Option<i64> = conn
                .query_row(
                    "SELECT id FROM tracker_entries WHERE user_id = ?1 AND entry_date = ?2",
                    params![user_id, format_date(date)],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(found.is_some())
        })
        .await
    }

    /// Insert the entry. Returns `None` when the user already has an entry for
    /// that date.
    pub async fn insert_tracker_entry(
        &self,
        entry: NewTrackerEntry,
    ) -> Result<Option<TrackerEntry>> {
        self.execute(move |conn| {
            let metrics = &entry.metrics;
            let inserted = conn.execute(
                "INSERT INTO tracker_entries (
                    user_id, entry_date, created_at, sleep_hours, sleep_quality, screen_time,
                    physical_activity, social_interaction, work_productivity, weather,
                    diet_quality, mood_score, stress_level, ai_recommendation
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                params![
                    entry.user_id,
                    format_date(entry.entry_date),
                    entry.created_at.to_rfc3339(),
                    metrics.sleep_hours,
                    metrics.sleep_quality.as_str(),
                    metrics.screen_time,
                    metrics.physical_activity,
                    metrics.social_interaction,
                    metrics.work_productivity,
                    metrics.weather.as_str(),
                    metrics.diet_quality.as_str(),
                    entry.prediction.mood_score,
                    entry.prediction.stress_level,
                    entry.ai_recommendation,
                ],
            );
            match inserted {
                Ok(_) => {}
                Err(rusqlite::Error::SqliteFailure(err, _))
                    if err.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
                {
                    return Ok(None);
                }
                Err(err) => return Err(err.into()),
            }

            let id = conn.last_insert_rowid();
            let sql = format!("SELECT {ENTRY_COLUMNS} FROM tracker_entries WHERE id = ?1");
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query(params![id])?;
            match rows.next()? {
                Some(row) => row_to_tracker_entry(row).map(Some),
                None => Err(anyhow!("Tracker entry not found after insert")),
            }
        })
        .await
    }

    /// The `limit` most recent entries, returned oldest first.
    pub async fn recent_entries(&self, user_id: i64, limit: usize) -> Result<Vec<TrackerEntry>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.execute(move |conn| {
            let sql = format!(
                "SELECT {ENTRY_COLUMNS} FROM tracker_entries
                 WHERE user_id = ?1
                 ORDER BY entry_date DESC, id DESC
                 LIMIT ?2"
            );
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query(params![user_id, limit])?;

            let mut entries = Vec::new();
            while let Some(row) = rows.next()? {
                entries.push(row_to_tracker_entry(row)?);
            }
            entries.reverse();
            Ok(entries)
        })
        .await
    }

    pub async fn all_entries(&self, user_id: i64) -> Result<Vec<TrackerEntry>> {
        self.execute(move |conn| {
            let sql = format!(
                "SELECT {ENTRY_COLUMNS} FROM tracker_entries
                 WHERE user_id = ?1
                 ORDER BY entry_date ASC, id ASC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query(params![user_id])?;

            let mut entries = Vec::new();
            while let Some(row) = rows.next()? {
                entries.push(row_to_tracker_entry(row)?);
            }
            Ok(entries)
        })
        .await
    }
}
