pub mod account;
pub mod cli;
pub mod config;
pub mod db;
pub mod prediction;
pub mod recommend;
pub mod settings;
pub mod tracker;
pub mod utils;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use serde_json::{json, Value};

use account::{AccountService, ImageUpload, MediaStore, ProfileUpdate};
use cli::{Cli, Command, ProfileCommand, SettingsCommand};
use config::AppPaths;
use db::Database;
use prediction::{artifacts::ARTIFACT_FILES, ArtifactStore, MentalHealthPredictor};
use recommend::{build_recommender, GEMINI_API_KEY_ENV};
use settings::SettingsStore;
use tracker::{export_file_name, TrackerService};

const ENABLE_LOGS: bool = true;

/// Everything a command needs, wired once at startup.
pub struct AppState {
    pub paths: AppPaths,
    pub db: Database,
    pub settings: SettingsStore,
    pub artifacts: Arc<ArtifactStore>,
    pub accounts: AccountService,
    pub tracker: TrackerService,
}

impl AppState {
    pub fn open(paths: AppPaths) -> Result<Self> {
        let db = Database::new(paths.database_file.clone())?;
        let settings = SettingsStore::new(paths.settings_file.clone())?;
        let snapshot = settings.snapshot();

        let artifacts = Arc::new(ArtifactStore::new(paths.artifact_dir.clone()));
        let predictor = MentalHealthPredictor::new(Arc::clone(&artifacts));
        let api_key = std::env::var(GEMINI_API_KEY_ENV).ok();
        let recommender = build_recommender(&snapshot.recommender, api_key);
        log_info!("Using {} recommendations", recommender.name());

        let accounts = AccountService::new(db.clone(), MediaStore::new(paths.media_dir.clone()));
        let tracker = TrackerService::new(
            db.clone(),
            predictor,
            recommender,
            snapshot.history_limit,
        );

        Ok(Self {
            paths,
            db,
            settings,
            artifacts,
            accounts,
            tracker,
        })
    }
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    utils::logging::init(if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });

    let paths = AppPaths::resolve(cli.data_dir, cli.artifact_dir);
    log_debug!("Data directory: {}", paths.data_dir.display());
    let state = AppState::open(paths)?;

    let output = dispatch(&state, cli.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub async fn dispatch(state: &AppState, command: Command) -> Result<Value> {
    match command {
        Command::Register { username, email } => {
            let user = state.accounts.register(&username, &email).await?;
            Ok(serde_json::to_value(user)?)
        }
        Command::Predict(args) => {
            let user = state.accounts.find_by_username(&args.user).await?;
            let entry = args.entry();
            let stored = match args.date {
                Some(date) => state.tracker.record_entry(user.id, &entry, date).await?,
                None => state.tracker.record_today(user.id, &entry).await?,
            };
            let prediction = stored.prediction();
            Ok(json!({
                "mood_score": stored.mood_score,
                "stress_level": stored.stress_level,
                "mood": prediction.mood_band().label(),
                "stress": prediction.stress_band().label(),
                "ai_recommendation": stored.ai_recommendation,
                "date": stored.created_at,
            }))
        }
        Command::History { user } => {
            let user = state.accounts.find_by_username(&user).await?;
            Ok(serde_json::to_value(state.tracker.history(user.id).await?)?)
        }
        Command::Export { user, output } => {
            let user = state.accounts.find_by_username(&user).await?;
            let path = output.unwrap_or_else(|| PathBuf::from(export_file_name(&user.username)));
            // Build the whole export before touching the output file.
            let mut buffer = Vec::new();
            let rows = state.tracker.export_csv(user.id, &mut buffer).await?;
            tokio::fs::write(&path, buffer)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            Ok(json!({ "path": path, "rows": rows }))
        }
        Command::Profile(command) => profile_command(state, command).await,
        Command::Settings(command) => settings_command(state, command),
        Command::CheckArtifacts => {
            let artifacts = state.artifacts.get_or_load()?;
            let trees: Vec<usize> = artifacts
                .model()
                .estimators()
                .iter()
                .map(|estimator| estimator.tree_count())
                .collect();
            Ok(json!({
                "dir": state.artifacts.dir(),
                "files": ARTIFACT_FILES,
                "trees_per_output": trees,
                "sleep_quality": artifacts.sleep_quality().classes(),
                "weather": artifacts.weather().classes(),
                "diet_quality": artifacts.diet_quality().classes(),
            }))
        }
    }
}

async fn profile_command(state: &AppState, command: ProfileCommand) -> Result<Value> {
    match command {
        ProfileCommand::Show { user } => {
            let user = state.accounts.find_by_username(&user).await?;
            Ok(serde_json::to_value(state.accounts.profile(user.id).await?)?)
        }
        ProfileCommand::Update {
            user,
            full_name,
            email,
            username,
            gender,
            birth_date,
            image,
        } => {
            let user = state.accounts.find_by_username(&user).await?;
            let image = match image {
                Some(path) => Some(read_upload(&path).await?),
                None => None,
            };
            let profile = state
                .accounts
                .update_profile(
                    user.id,
                    ProfileUpdate {
                        full_name,
                        email,
                        username,
                        gender,
                        birth_date,
                        image,
                    },
                )
                .await?;
            Ok(json!({ "message": "Profile updated successfully", "profile": profile }))
        }
        ProfileCommand::Delete { user } => {
            let user = state.accounts.find_by_username(&user).await?;
            state.accounts.delete_account(user.id).await?;
            Ok(json!({ "message": "Account deleted successfully" }))
        }
    }
}

fn settings_command(state: &AppState, command: SettingsCommand) -> Result<Value> {
    let settings = match command {
        SettingsCommand::Show => state.settings.snapshot(),
        SettingsCommand::Set {
            provider,
            model,
            timeout_secs,
            history_limit,
        } => state.settings.update(|settings| {
            if let Some(provider) = provider {
                settings.recommender.provider = provider;
            }
            if let Some(model) = model {
                settings.recommender.model = model;
            }
            if let Some(timeout_secs) = timeout_secs {
                settings.recommender.timeout_secs = timeout_secs;
            }
            if let Some(history_limit) = history_limit {
                settings.history_limit = history_limit;
            }
        })?,
    };
    Ok(serde_json::to_value(settings)?)
}

async fn read_upload(path: &Path) -> Result<ImageUpload> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(ImageUpload { file_name, bytes })
}
