use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodBand {
    Excellent,
    Good,
    Moderate,
    Low,
}

impl MoodBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 8.0 {
            MoodBand::Excellent
        } else if score >= 6.0 {
            MoodBand::Good
        } else if score >= 4.0 {
            MoodBand::Moderate
        } else {
            MoodBand::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MoodBand::Excellent => "Excellent mood!",
            MoodBand::Good => "Good mood",
            MoodBand::Moderate => "Moderate mood",
            MoodBand::Low => "Low mood - need attention",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StressBand {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl StressBand {
    pub fn from_score(score: f64) -> Self {
        if score <= 3.0 {
            StressBand::Low
        } else if score <= 5.0 {
            StressBand::Moderate
        } else if score <= 7.0 {
            StressBand::High
        } else {
            StressBand::VeryHigh
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StressBand::Low => "Low stress - great!",
            StressBand::Moderate => "Moderate stress",
            StressBand::High => "High stress - be careful",
            StressBand::VeryHigh => "Very high stress - seek help!",
        }
    }
}
