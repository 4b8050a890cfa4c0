use std::io::Write;

use crate::db::models::TrackerEntry;

pub const EXPORT_HEADER: [&str; 12] = [
    "created_at",
    "sleep_hours",
    "sleep_quality",
    "screen_time",
    "physical_activity",
    "social_interaction",
    "work_productivity_score",
    "weather",
    "diet_quality",
    "mood_score",
    "stress_level",
    "ai_recommendation",
];

const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn export_file_name(username: &str) -> String {
    format!("tracker_data_{username}.csv")
}

pub fn write_entries_csv<W: Write>(entries: &[TrackerEntry], writer: W) -> Result<(), csv::Error> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(EXPORT_HEADER)?;

    for entry in entries {
        let metrics = &entry.metrics;
        out.write_record([
            entry.created_at.format(CREATED_AT_FORMAT).to_string(),
            metrics.sleep_hours.to_string(),
            metrics.sleep_quality.to_string(),
            metrics.screen_time.to_string(),
            metrics.physical_activity.to_string(),
            metrics.social_interaction.to_string(),
            metrics.work_productivity.to_string(),
            metrics.weather.to_string(),
            metrics.diet_quality.to_string(),
            entry.mood_score.to_string(),
            entry.stress_level.to_string(),
            entry.ai_recommendation.clone().unwrap_or_default(),
        ])?;
    }

    out.flush()?;
    Ok(())
}
