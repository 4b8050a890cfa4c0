use crate::prediction::{DailyEntry, Prediction};

/// Prompt handed to the text-generation collaborator.
#[derive(Debug, Clone)]
pub struct RecommendationPrompt {
    pub prediction: Prediction,
    pub entry: DailyEntry,
}

impl RecommendationPrompt {
    pub fn new(prediction: &Prediction, entry: &DailyEntry) -> Self {
        Self {
            prediction: *prediction,
            entry: entry.clone(),
        }
    }

    pub fn render(&self) -> String {
        let entry = &self.entry;
        format!(
            "Based on the following information, provide personalized recommendations for improving mental health:\n\
             - Mood Score: {}\n\
             - Stress Level: {}\n\
             - Sleep Hours: {}\n\
             - Screen Time: {}\n\
             - Physical Activity: {}\n\
             - Social Interaction: {}\n\
             - Work Productivity Score: {}\n\
             - Weather: {}\n\
             - Diet Quality: {}\n",
            self.prediction.mood_score,
            self.prediction.stress_level,
            entry.sleep_hours,
            entry.screen_time,
            entry.physical_activity,
            entry.social_interaction,
            entry.work_productivity,
            entry.weather,
            entry.diet_quality,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction::{DietQuality, SleepQuality, Weather};

    #[test]
    fn prompt_lists_scores_and_metrics() {
        let entry = DailyEntry {
            sleep_hours: 6.5,
            sleep_quality: SleepQuality::Fair,
            screen_time: 9.0,
            physical_activity: 15,
            social_interaction: 1.5,
            work_productivity: 4,
            weather: Weather::Rainy,
            diet_quality: DietQuality::Poor,
        };
        let prediction = Prediction {
            mood_score: 4.2,
            stress_level: 7.8,
        };

        let text = RecommendationPrompt::new(&prediction, &entry).render();
        assert!(text.starts_with("Based on the following information"));
        assert!(text.contains("- Mood Score: 4.2\n"));
        assert!(text.contains("- Stress Level: 7.8\n"));
        assert!(text.contains("- Screen Time: 9\n"));
        assert!(text.contains("- Physical Activity: 15\n"));
        assert!(text.contains("- Weather: Rainy\n"));
        assert!(text.contains("- Diet Quality: Poor\n"));
        assert_eq!(text.lines().count(), 10);
    }
}
