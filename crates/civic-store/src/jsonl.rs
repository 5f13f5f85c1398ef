//! JSONL ingestion: one issue per line.
//!
//! Fixtures may use the legacy record shape alongside the canonical one:
//! - `id` as a number or a numeric string
//! - `reportedDate` + `reportedTime` instead of `reportedAt`
//! - `distance` as a number or a numeric string
//! - `image: ""` meaning no image
//!
//! Output is always the canonical `Issue` serialization.

use crate::issue::{Category, Coordinates, Issue, IssueId, Status};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// Errors from JSONL operations.
#[derive(Debug, thiserror::Error)]
pub enum JsonlError {
    #[error("line {0}: I/O error: {1}")]
    Io(usize, String),

    #[error("line {0}: parse error: {1}")]
    Parse(usize, String),

    #[error("line {0}: invalid record: {1}")]
    InvalidRecord(usize, String),

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("corrupted input: {0}")]
    Corrupt(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecordId {
    Number(u64),
    Text(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecordNumber {
    Number(f64),
    Text(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueRecord {
    id: RecordId,
    title: String,
    #[serde(default)]
    description: String,
    category: Category,
    #[serde(default = "default_status")]
    status: Status,
    #[serde(default)]
    address: String,
    #[serde(default)]
    coordinates: Option<Coordinates>,
    #[serde(default)]
    distance: Option<RecordNumber>,
    #[serde(default)]
    reported_by: String,
    #[serde(default)]
    reported_at: Option<DateTime<Utc>>,
    #[serde(default)]
    reported_date: Option<NaiveDate>,
    #[serde(default)]
    reported_time: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    spam_reports: Vec<String>,
    #[serde(default)]
    is_hidden: bool,
}

fn default_status() -> Status {
    Status::Reported
}

impl IssueRecord {
    fn into_issue(self) -> Result<Issue, String> {
        let id = match self.id {
            RecordId::Number(value) => IssueId(value),
            RecordId::Text(text) => text.parse::<IssueId>().map_err(|e| e.to_string())?,
        };

        let distance = match self.distance {
            None => 0.0,
            Some(RecordNumber::Number(value)) => value,
            Some(RecordNumber::Text(text)) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("invalid distance: {text:?}"))?,
        };

        let reported_at = match (self.reported_at, self.reported_date) {
            (Some(at), _) => at,
            (None, Some(date)) => {
                let time = match self.reported_time.as_deref() {
                    None | Some("") => NaiveTime::default(),
                    Some(raw) => parse_clock(raw)?,
                };
                date.and_time(time).and_utc()
            }
            (None, None) => return Err("missing reportedAt or reportedDate".to_string()),
        };

        let spam_reports: BTreeSet<String> = self.spam_reports.into_iter().collect();

        Ok(Issue {
            id,
            title: self.title,
            description: self.description,
            category: self.category,
            status: self.status,
            address: self.address,
            coordinates: self.coordinates,
            distance,
            reported_by: self.reported_by,
            reported_at,
            image: self.image.filter(|image| !image.trim().is_empty()),
            spam_reports,
            is_hidden: self.is_hidden,
        })
    }
}

fn parse_clock(raw: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| format!("invalid reportedTime: {raw:?}"))
}

/// Read issues from a JSONL reader.
pub fn read_issues(reader: impl BufRead) -> Result<Vec<Issue>, JsonlError> {
    let mut issues = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| JsonlError::Io(line_no + 1, e.to_string()))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let record: IssueRecord = serde_json::from_str(trimmed)
            .map_err(|e| JsonlError::Parse(line_no + 1, e.to_string()))?;
        let issue = record
            .into_issue()
            .map_err(|message| JsonlError::InvalidRecord(line_no + 1, message))?;
        issues.push(issue);
    }
    Ok(issues)
}

/// Write issues to a JSONL writer in canonical form.
pub fn write_issues<'a>(
    writer: &mut impl Write,
    issues: impl IntoIterator<Item = &'a Issue>,
) -> Result<(), JsonlError> {
    for issue in issues {
        let line =
            serde_json::to_string(issue).map_err(|e| JsonlError::Serialize(e.to_string()))?;
        writeln!(writer, "{line}").map_err(|e| JsonlError::Io(0, e.to_string()))?;
    }
    Ok(())
}

/// Read issues from a JSONL file path.
pub fn read_issues_from_path(path: impl AsRef<Path>) -> Result<Vec<Issue>, JsonlError> {
    let path = path.as_ref();
    let bytes =
        fs::read(path).map_err(|e| JsonlError::Io(0, format!("{}: {e}", path.display())))?;
    validate_input_bytes(path, &bytes)?;
    read_issues(BufReader::new(bytes.as_slice()))
}

pub(crate) fn validate_input_bytes(path: &Path, bytes: &[u8]) -> Result<(), JsonlError> {
    if bytes.contains(&0) {
        return Err(JsonlError::Corrupt(format!(
            "{}: contains NUL byte(s)",
            path.display()
        )));
    }
    if std::str::from_utf8(bytes).is_err() {
        return Err(JsonlError::Corrupt(format!(
            "{}: contains non-UTF-8 byte sequence(s)",
            path.display()
        )));
    }
    Ok(())
}
