use async_trait::async_trait;

use super::{RecommendationError, RecommendationPrompt, Recommender};
use crate::prediction::{DietQuality, MoodBand, SleepQuality, StressBand};

/// Rule-based recommendations for when no text-generation service is configured.
pub struct OfflineRecommender;

impl OfflineRecommender {
    pub fn compose(prompt: &RecommendationPrompt) -> String {
        let entry = &prompt.entry;
        let prediction = &prompt.prediction;
        let mut tips: Vec<&str> = Vec::new();

        if entry.sleep_hours < 7.0 || entry.sleep_quality == SleepQuality::Poor {
            tips.push("Aim for 7-9 hours of sleep with a consistent bedtime and wake time.");
        }
        if entry.screen_time > 6.0 {
            tips.push("Cut back on recreational screen time, especially in the hour before bed.");
        }
        if entry.physical_activity < 30 {
            tips.push("Add at least 30 minutes of movement today; even a brisk walk helps.");
        }
        if entry.social_interaction < 2.0 {
            tips.push("Reach out to a friend or family member; short conversations count.");
        }
        if entry.diet_quality == DietQuality::Poor {
            tips.push("Favour regular meals with vegetables, protein and enough water.");
        }
        if entry.work_productivity <= 4 {
            tips.push("Break work into small tasks and take short breaks between them.");
        }

        match prediction.stress_band() {
            StressBand::High => {
                tips.push("Try a few minutes of slow breathing or a short mindfulness exercise.")
            }
            StressBand::VeryHigh => tips.push(
                "Your stress looks very high. Consider talking to a mental health professional.",
            ),
            StressBand::Low | StressBand::Moderate => {}
        }
        if prediction.mood_band() == MoodBand::Low {
            tips.push("If low mood persists for weeks, please seek support from a professional.");
        }
        if tips.is_empty() {
            tips.push("Keep up your current routine; it seems to be working for you.");
        }

        let mut text = format!(
            "**Mood {}/10:** {}\n**Stress {}/10:** {}\n\n",
            prediction.mood_score,
            prediction.mood_band().label(),
            prediction.stress_level,
            prediction.stress_band().label(),
        );
        for tip in tips {
            text.push_str("- ");
            text.push_str(tip);
            text.push('\n');
        }
        text
    }
}

#[async_trait]
impl Recommender for OfflineRecommender {
    fn name(&self) -> &'static str {
        "offline"
    }

    async fn recommend(&self, prompt: &RecommendationPrompt) -> Result<String, RecommendationError> {
        Ok(Self::compose(prompt))
    }
}
