use std::path::{Path, PathBuf};

use calmora_lib::{
    cli::{Cli, Command},
    config::AppPaths,
    dispatch, AppState,
};
use clap::Parser;
use serde_json::Value;

fn fixture_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/artifacts")
}

fn open_state(data_dir: &Path) -> AppState {
    std::fs::create_dir_all(data_dir).unwrap();
    std::fs::write(
        data_dir.join("settings.json"),
        r#"{ "recommender": { "provider": "offline" } }"#,
    )
    .unwrap();
    AppState::open(AppPaths::under(data_dir, Some(fixture_dir()))).unwrap()
}

fn command(args: &[&str]) -> Command {
    let mut argv = vec!["calmora"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap().command
}

async fn run(state: &AppState, args: &[&str]) -> anyhow::Result<Value> {
    dispatch(state, command(args)).await
}

const PREDICT: &[&str] = &[
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
];

#[tokio::test]
async fn register_predict_and_read_back() {
    let dir = tempfile::tempdir().unwrap();
    let state = open_state(dir.path());

    let user = run(&state, &["register", "--username", "ana", "--email", "ana@example.com"])
        .await
        .unwrap();
    assert_eq!(user["username"], "ana");

    let predicted = run(&state, PREDICT).await.unwrap();
    assert_eq!(predicted["mood_score"], 6.3);
    assert_eq!(predicted["stress_level"], 4.9);
    assert_eq!(predicted["mood"], "Good mood");
    assert_eq!(predicted["stress"], "Moderate stress");

    let err = run(&state, PREDICT).await.unwrap_err();
    assert!(err.to_string().starts_with("Prediction for today already exists"));

    let history = run(&state, &["history", "--user", "ana"]).await.unwrap();
    let entries = history.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["entry_date"], "2026-03-09");
    assert_eq!(entries[0]["weather"], "Sunny");
}

#[tokio::test]
async fn export_writes_named_file() {
    let dir = tempfile::tempdir().unwrap();
    let state = open_state(dir.path());
    run(&state, &["register", "--username", "ana", "--email", "ana@example.com"])
        .await
        .unwrap();
    run(&state, PREDICT).await.unwrap();

    let out = dir.path().join("tracker_data_ana.csv");
    let out_arg = out.to_string_lossy().into_owned();
    let result = run(&state, &["export", "--user", "ana", "--output", &out_arg])
        .await
        .unwrap();
    assert_eq!(result["rows"], 1);

    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("created_at,sleep_hours,sleep_quality"));
    assert_eq!(text.lines().filter(|line| line.contains(",Sunny,")).count(), 1);
}

#[tokio::test]
async fn settings_and_artifact_check() {
    let dir = tempfile::tempdir().unwrap();
    let state = open_state(dir.path());

    let updated = run(&state, &["settings", "set", "--history-limit", "10"])
        .await
        .unwrap();
    assert_eq!(updated["history_limit"], 10);
    assert_eq!(updated["recommender"]["provider"], "offline");

    let check = run(&state, &["check-artifacts"]).await.unwrap();
    assert_eq!(check["trees_per_output"], serde_json::json!([2, 2]));
    assert_eq!(
        check["weather"],
        serde_json::json!(["Cloudy", "Rainy", "Sunny"])
    );
}

#[tokio::test]
async fn unknown_user_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let state = open_state(dir.path());
    let err = run(&state, &["history", "--user", "nobody"]).await.unwrap_err();
    assert_eq!(err.to_string(), "User not found");
}

#[tokio::test]
async fn profile_update_and_delete() {
    let dir = tempfile::tempdir().unwrap();
    let state = open_state(dir.path());
    run(&state, &["register", "--username", "ana", "--email", "ana@example.com"])
        .await
        .unwrap();

    let updated = run(
        &state,
        &["profile", "update", "--user", "ana", "--full-name", "Ana Lima", "--birth-date", "1994-05-17"],
    )
    .await
    .unwrap();
    assert_eq!(updated["profile"]["full_name"], "Ana Lima");
    assert_eq!(updated["profile"]["birth_date"], "1994-05-17");

    let deleted = run(&state, &["profile", "delete", "--user", "ana"]).await.unwrap();
    assert_eq!(deleted["message"], "Account deleted successfully");
    assert!(run(&state, &["profile", "show", "--user", "ana"]).await.is_err());
}

#[tokio::test]
async fn failed_export_leaves_existing_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let state = open_state(dir.path());
    run(&state, &["register", "--username", "ana", "--email", "ana@example.com"])
        .await
        .unwrap();
    run(&state, PREDICT).await.unwrap();

    // A row whose category no longer parses makes the export fail midway.
    let conn = rusqlite::Connection::open(dir.path().join("calmora.sqlite3")).unwrap();
    conn.execute(
        "INSERT INTO tracker_entries (user_id, entry_date, created_at, sleep_hours, sleep_quality,
            screen_time, physical_activity, social_interaction, work_productivity, weather,
            diet_quality, mood_score, stress_level)
         VALUES (1, '2026-03-10', '2026-03-10T08:00:00+00:00', 7, 'Good', 5, 30, 3, 7, 'Foggy', 'Good', 6.0, 5.0)",
        [],
    )
    .unwrap();
    drop(conn);

    let out = dir.path().join("tracker_data_ana.csv");
    std::fs::write(&out, "previous export\n").unwrap();
    let out_arg = out.to_string_lossy().into_owned();

    assert!(run(&state, &["export", "--user", "ana", "--output", &out_arg])
        .await
        .is_err());
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "previous export\n");
}
