//! Filesystem layout resolved from CLI flags, environment and defaults.

use std::{
    env,
    path::{Path, PathBuf},
};

pub const DATA_DIR_ENV: &str = "CALMORA_DATA_DIR";
pub const ARTIFACT_DIR_ENV: &str = "CALMORA_ARTIFACT_DIR";

const DEFAULT_DATA_DIR: &str = "calmora-data";

#[derive(Debug, Clone, PartialEq)]
pub struct AppPaths {
    pub data_dir: PathBuf,
    pub artifact_dir: PathBuf,
    pub media_dir: PathBuf,
    pub database_file: PathBuf,
    pub settings_file: PathBuf,
}

impl AppPaths {
    /// Flags win over environment variables, which win over defaults.
    pub fn resolve(data_dir: Option<PathBuf>, artifact_dir: Option<PathBuf>) -> Self {
        let data_dir = data_dir
            .or_else(|| env_path(DATA_DIR_ENV))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let artifact_dir = artifact_dir.or_else(|| env_path(ARTIFACT_DIR_ENV));
        Self::under(&data_dir, artifact_dir)
    }

    pub fn under(data_dir: &Path, artifact_dir: Option<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
            artifact_dir: artifact_dir.unwrap_or_else(|| data_dir.join("models")),
            media_dir: data_dir.join("media"),
            database_file: data_dir.join("calmora.sqlite3"),
            settings_file: data_dir.join("settings.json"),
        }
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}
