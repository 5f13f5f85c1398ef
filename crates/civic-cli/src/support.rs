use crate::cli::SourceArgs;
use civic_store::{
    CivicStore, Issue, NotificationSink, StoreConfig, read_issues_from_path, seed_store,
};
use serde::Serialize;
use serde_json::{Value, json};
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

pub fn fail(message: impl Display) -> ! {
    eprintln!("error: {message}");
    std::process::exit(1);
}

pub fn parse_or_exit<T>(raw: &str) -> T
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse().unwrap_or_else(|e| fail(e))
}

pub fn load_config_or_exit(source: &SourceArgs) -> StoreConfig {
    match &source.config {
        Some(path) => StoreConfig::load(path).unwrap_or_else(|e| fail(e)),
        None => StoreConfig::default(),
    }
}

/// Build a fresh store from `--config` and `--issues`/`--seed`.
///
/// Without either source the store starts empty.
pub fn load_store_or_exit(source: &SourceArgs, sink: Arc<dyn NotificationSink>) -> CivicStore {
    let config = load_config_or_exit(source);
    let mut store = CivicStore::new(config, sink);

    if source.seed {
        seed_store(&mut store).unwrap_or_else(|e| fail(format!("failed to seed store: {e}")));
    } else if let Some(path) = &source.issues {
        let issues = read_issues_from_path(path)
            .unwrap_or_else(|e| fail(format!("failed to load {path}: {e}")));
        let count = store
            .ingest_issues(issues)
            .unwrap_or_else(|e| fail(format!("failed to load {path}: {e}")));
        debug!(path, count, "issues ingested");
    }
    store
}

pub fn source_label(source: &SourceArgs) -> String {
    if source.seed {
        "seed".to_string()
    } else {
        source.issues.clone().unwrap_or_else(|| "empty".to_string())
    }
}

pub fn to_json_or_exit(value: &impl Serialize) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| fail(format!("json serialization: {e}")))
}

pub fn print_json(payload: &Value) {
    let text = serde_json::to_string_pretty(payload)
        .unwrap_or_else(|e| fail(format!("json serialization: {e}")));
    println!("{text}");
}

/// Row shape shared by list-style commands.
pub fn issue_row(issue: &Issue) -> Value {
    json!({
        "id": issue.id,
        "title": issue.title,
        "category": issue.category,
        "status": issue.status,
        "reportedBy": issue.reported_by,
        "reportedDate": issue.reported_date().to_string(),
        "distance": issue.distance,
        "spamReports": issue.spam_report_count(),
        "isHidden": issue.is_hidden
    })
}

pub fn issue_line(issue: &Issue) -> String {
    let mut line = format!(
        "  - #{} [{}] {} ({}, {} km)",
        issue.id, issue.status, issue.title, issue.category, issue.distance
    );
    if issue.has_spam_reports() {
        line.push_str(&format!(" spam:{}", issue.spam_report_count()));
    }
    if issue.is_hidden {
        line.push_str(" hidden");
    }
    line
}
