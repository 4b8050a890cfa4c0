//! Command-line surface. Every command prints JSON on stdout.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::{
    config::{ARTIFACT_DIR_ENV, DATA_DIR_ENV},
    prediction::{DailyEntry, DietQuality, SleepQuality, Weather},
    settings::RecommenderProvider,
};

#[derive(Parser, Debug)]
#[command(name = "calmora", version, about = "Daily mood and stress tracker")]
pub struct Cli {
    /// Directory holding the database, settings and media
    #[arg(long, global = true, env = DATA_DIR_ENV)]
    pub data_dir: Option<PathBuf>,

    /// Directory holding the exported model artifacts
    #[arg(long, global = true, env = ARTIFACT_DIR_ENV)]
    pub artifact_dir: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a user
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
    },
    /// Predict today's mood and stress and store the entry
    Predict(PredictArgs),
    /// Show the most recent entries
    History {
        #[arg(long)]
        user: String,
    },
    /// Write every entry of a user to CSV
    Export {
        #[arg(long)]
        user: String,
        /// Defaults to tracker_data_<user>.csv in the current directory
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Show, edit or delete a profile
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Show or change stored preferences
    #[command(subcommand)]
    Settings(SettingsCommand),
    /// Load and validate the model artifacts
    CheckArtifacts,
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    #[arg(long)]
    pub user: String,
    /// Hours slept
    #[arg(long)]
    pub sleep_hours: f64,
    /// Poor, Fair, Good or Excellent
    #[arg(long)]
    pub sleep_quality: SleepQuality,
    /// Hours of screen time
    #[arg(long)]
    pub screen_time: f64,
    /// Minutes of physical activity
    #[arg(long)]
    pub physical_activity: i64,
    /// Hours spent with other people
    #[arg(long)]
    pub social_interaction: f64,
    /// Self-rated productivity, 1-10
    #[arg(long)]
    pub work_productivity: i64,
    /// Cloudy, Rainy or Sunny
    #[arg(long)]
    pub weather: Weather,
    /// Average, Good or Poor
    #[arg(long)]
    pub diet_quality: DietQuality,
    /// Record for this date instead of today (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

impl PredictArgs {
    pub fn entry(&self) -> DailyEntry {
        DailyEntry {
            sleep_hours: self.sleep_hours,
            sleep_quality: self.sleep_quality,
            screen_time: self.screen_time,
            physical_activity: self.physical_activity,
            social_interaction: self.social_interaction,
            work_productivity: self.work_productivity,
            weather: self.weather,
            diet_quality: self.diet_quality,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    Show {
        #[arg(long)]
        user: String,
    },
    Update {
        #[arg(long)]
        user: String,
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        gender: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        birth_date: Option<String>,
        /// Image file to use as profile picture
        #[arg(long)]
        image: Option<PathBuf>,
    },
    Delete {
        #[arg(long)]
        user: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    Show,
    Set {
        #[arg(long, value_enum)]
        provider: Option<RecommenderProvider>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        timeout_secs: Option<u64>,
        #[arg(long)]
        history_limit: Option<usize>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_arguments_parse_into_entry() {
        let cli = Cli::try_parse_from([
            "calmora",
            "predict",
            "--user",
            "ana",
            "--sleep-hours",
            "7.5",
            "--sleep-quality",
            "Good",
            "--screen-time",
            "5",
            "--physical-activity",
            "30",
            "--social-interaction",
            "3",
            "--work-productivity",
            "7",
            "--weather",
            "Sunny",
            "--diet-quality",
            "Good",
            "--date",
            "2026-03-09",
        ])
        .unwrap();

        let Command::Predict(args) = cli.command else {
            panic!("expected predict");
        };
        assert_eq!(args.entry(), crate::prediction::test_support::sample_entry());
        assert_eq!(args.date, NaiveDate::from_ymd_opt(2026, 3, 9));
    }

    #[test]
    fn unknown_category_is_a_usage_error() {
        let result = Cli::try_parse_from([
            "calmora",
            "predict",
            "--user",
            "ana",
            "--sleep-hours",
            "7",
            "--sleep-quality",
            "Great",
            "--screen-time",
            "5",
            "--physical-activity",
            "30",
            "--social-interaction",
            "3",
            "--work-productivity",
            "7",
            "--weather",
            "Sunny",
            "--diet-quality",
            "Good",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn settings_provider_uses_snake_case_values() {
        let cli = Cli::try_parse_from(["calmora", "settings", "set", "--provider", "offline"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Settings(SettingsCommand::Set {
                provider: Some(RecommenderProvider::Offline),
                ..
            })
        ));
    }
}
