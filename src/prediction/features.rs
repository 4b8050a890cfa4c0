//! Daily entry types and the fixed feature layout the model was trained on.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::PredictionError;

pub const FEATURE_COUNT: usize = 8;

/// Scaled model input, laid out in [`FEATURE_ORDER`].
pub type FeatureVector = [f64; FEATURE_COUNT];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureId {
    SleepHours,
    SleepQuality,
    ScreenTime,
    PhysicalActivity,
    SocialInteraction,
    WorkProductivity,
    Weather,
    DietQuality,
}

impl FeatureId {
    pub fn name(&self) -> &'static str {
        match self {
            FeatureId::SleepHours => "sleep_hours",
            FeatureId::SleepQuality => "sleep_quality",
            FeatureId::ScreenTime => "screen_time",
            FeatureId::PhysicalActivity => "physical_activity",
            FeatureId::SocialInteraction => "social_interaction",
            FeatureId::WorkProductivity => "work_productivity",
            FeatureId::Weather => "weather",
            FeatureId::DietQuality => "diet_quality",
        }
    }

    pub fn position(&self) -> usize {
        FEATURE_ORDER
            .iter()
            .position(|id| id == self)
            .unwrap_or(FEATURE_COUNT)
    }
}

/// Column order used when the model and scaler were fitted. Reordering this
/// invalidates every exported artifact.
pub const FEATURE_ORDER: [FeatureId; FEATURE_COUNT] = [
    FeatureId::SleepHours,
    FeatureId::SleepQuality,
    FeatureId::ScreenTime,
    FeatureId::PhysicalActivity,
    FeatureId::SocialInteraction,
    FeatureId::WorkProductivity,
    FeatureId::Weather,
    FeatureId::DietQuality,
];

macro_rules! category_enum {
    ($name:ident, $field:literal, [$($variant:ident),+ $(,)?]) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = PredictionError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                $name::ALL
                    .iter()
                    .copied()
                    .find(|candidate| candidate.as_str() == value)
                    .ok_or_else(|| PredictionError::UnknownCategory {
                        field: $field,
                        value: value.to_string(),
                    })
            }
        }
    };
}

category_enum!(SleepQuality, "sleep_quality", [Poor, Fair, Good, Excellent]);
category_enum!(Weather, "weather", [Cloudy, Rainy, Sunny]);
category_enum!(DietQuality, "diet_quality", [Average, Good, Poor]);

/// One day of self-reported lifestyle metrics. Values are not range checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyEntry {
    /// Hours slept.
    pub sleep_hours: f64,
    pub sleep_quality: SleepQuality,
    /// Hours of screen time.
    pub screen_time: f64,
    /// Minutes of physical activity.
    pub physical_activity: i64,
    /// Hours spent with other people.
    pub social_interaction: f64,
    /// Self-rated productivity on a 1-10 scale.
    pub work_productivity: i64,
    pub weather: Weather,
    pub diet_quality: DietQuality,
}

/// Integer codes assigned by the fitted label encoders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedCategories {
    pub sleep_quality: u32,
    pub weather: u32,
    pub diet_quality: u32,
}

impl DailyEntry {
    /// Unscaled feature vector in training order.
    pub fn raw_features(&self, codes: &EncodedCategories) -> FeatureVector {
        FEATURE_ORDER.map(|id| match id {
            FeatureId::SleepHours => self.sleep_hours,
            FeatureId::SleepQuality => f64::from(codes.sleep_quality),
            FeatureId::ScreenTime => self.screen_time,
            FeatureId::PhysicalActivity => self.physical_activity as f64,
            FeatureId::SocialInteraction => self.social_interaction,
            FeatureId::WorkProductivity => self.work_productivity as f64,
            FeatureId::Weather => f64::from(codes.weather),
            FeatureId::DietQuality => f64::from(codes.diet_quality),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry() -> DailyEntry {
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

    #[test]
    fn raw_features_follow_training_order() {
        let codes = EncodedCategories {
            sleep_quality: 2,
            weather: 2,
            diet_quality: 1,
        };
        let features = sample_entry().raw_features(&codes);
        assert_eq!(features, [7.5, 2.0, 5.0, 30.0, 3.0, 7.0, 2.0, 1.0]);
        assert_eq!(FeatureId::Weather.position(), 6);
        assert_eq!(features[FeatureId::WorkProductivity.position()], 7.0);
    }

    #[test]
    fn category_parsing_is_exact() {
        assert_eq!("Excellent".parse::<SleepQuality>().unwrap(), SleepQuality::Excellent);
        assert_eq!("Rainy".parse::<Weather>().unwrap(), Weather::Rainy);

        let err = "Terrible".parse::<SleepQuality>().unwrap_err();
        assert!(matches!(
            err,
            PredictionError::UnknownCategory { field: "sleep_quality", .. }
        ));
        assert!("sunny".parse::<Weather>().is_err());
        assert!(" Good".parse::<DietQuality>().is_err());
    }

    #[test]
    fn entry_serializes_categories_by_name() {
        let json = serde_json::to_value(sample_entry()).unwrap();
        assert_eq!(json["sleep_quality"], "Good");
        assert_eq!(json["weather"], "Sunny");

        let bad = json.to_string().replace("\"Sunny\"", "\"Snowy\"");
        assert!(serde_json::from_str::<DailyEntry>(&bad).is_err());
    }
}
