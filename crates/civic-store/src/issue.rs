//! Issue type: the primary record owned by the registry.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::error::StoreError;

/// Opaque, totally ordered issue key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueId(pub u64);

impl IssueId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl Display for IssueId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid issue id: {0:?}")]
pub struct IssueIdParseError(pub String);

impl FromStr for IssueId {
    type Err = IssueIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(IssueId)
            .map_err(|_| IssueIdParseError(s.to_string()))
    }
}

/// Fixed set of issue categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Roads,
    Lighting,
    #[serde(rename = "Water Supply")]
    WaterSupply,
    Cleanliness,
    #[serde(rename = "Public Safety")]
    PublicSafety,
    Obstructions,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Roads,
        Category::Lighting,
        Category::WaterSupply,
        Category::Cleanliness,
        Category::PublicSafety,
        Category::Obstructions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Roads => "Roads",
            Category::Lighting => "Lighting",
            Category::WaterSupply => "Water Supply",
            Category::Cleanliness => "Cleanliness",
            Category::PublicSafety => "Public Safety",
            Category::Obstructions => "Obstructions",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = StoreError;

    /// Accepts display names and their kebab/snake spellings
    /// (`Water Supply`, `water-supply`, `water_supply`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_label(s);
        Category::ALL
            .into_iter()
            .find(|category| normalize_label(category.as_str()) == wanted)
            .ok_or_else(|| StoreError::InvalidInput(format!("unknown category: {s}")))
    }
}

/// Issue lifecycle status.
///
/// No transition graph lives here; `TransitionPolicy` in the registry
/// decides which changes `set_status` accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Status {
    Reported,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
    Closed,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::Reported,
        Status::InProgress,
        Status::Resolved,
        Status::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Reported => "Reported",
            Status::InProgress => "In Progress",
            Status::Resolved => "Resolved",
            Status::Closed => "Closed",
        }
    }

    /// Position along the forward lifecycle.
    pub fn rank(&self) -> u8 {
        match self {
            Status::Reported => 0,
            Status::InProgress => 1,
            Status::Resolved => 2,
            Status::Closed => 3,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Resolved | Status::Closed)
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_label(s);
        Status::ALL
            .into_iter()
            .find(|status| normalize_label(status.as_str()) == wanted)
            .ok_or_else(|| StoreError::InvalidInput(format!("unknown status: {s}")))
    }
}

fn normalize_label(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// A reported community issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: IssueId,

    // ── Content ──
    pub title: String,
    pub description: String,
    pub category: Category,
    pub status: Status,

    // ── Location ──
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub distance: f64,

    // ── Attribution ──
    pub reported_by: String,
    pub reported_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    // ── Moderation ──
    #[serde(default)]
    pub spam_reports: BTreeSet<String>,
    #[serde(default)]
    pub is_hidden: bool,
}

impl Issue {
    pub(crate) fn from_new(id: IssueId, input: NewIssue) -> Self {
        Self {
            id,
            title: input.title,
            description: input.description,
            category: input.category,
            status: input.status.unwrap_or(Status::Reported),
            address: input.address,
            coordinates: input.coordinates,
            distance: input.distance,
            reported_by: input.reported_by,
            reported_at: input.reported_at.unwrap_or_else(Utc::now),
            image: input.image,
            spam_reports: BTreeSet::new(),
            is_hidden: false,
        }
    }

    pub fn is_visible(&self) -> bool {
        !self.is_hidden
    }

    pub fn spam_report_count(&self) -> usize {
        self.spam_reports.len()
    }

    pub fn has_spam_reports(&self) -> bool {
        !self.spam_reports.is_empty()
    }

    /// Calendar day the issue was reported (`YYYY-MM-DD` view).
    pub fn reported_date(&self) -> NaiveDate {
        self.reported_at.date_naive()
    }

    /// Wall-clock time the issue was reported, as `HH:MM`.
    pub fn reported_time(&self) -> String {
        self.reported_at.format("%H:%M").to_string()
    }
}

/// Creation input for `IssueRegistry::create`.
///
/// The registry does not validate this; call `validate` at the boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIssue {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub address: String,
    #[serde(default)]
    pub reported_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub distance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

impl NewIssue {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        category: Category,
        address: impl Into<String>,
        reported_by: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            category,
            address: address.into(),
            reported_by: reported_by.into(),
            status: None,
            reported_at: None,
            distance: 0.0,
            image: None,
            coordinates: None,
        }
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_reported_at(mut self, reported_at: DateTime<Utc>) -> Self {
        self.reported_at = Some(reported_at);
        self
    }

    pub fn with_distance(mut self, distance: f64) -> Self {
        self.distance = distance;
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_coordinates(mut self, lat: f64, lng: f64) -> Self {
        self.coordinates = Some(Coordinates { lat, lng });
        self
    }

    /// Reject blank required fields.
    pub fn validate(&self) -> Result<(), StoreError> {
        let missing: Vec<&str> = [
            ("title", &self.title),
            ("description", &self.description),
            ("address", &self.address),
            ("reportedBy", &self.reported_by),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            return Err(StoreError::InvalidInput(format!(
                "missing required field(s): {}",
                missing.join(", ")
            )));
        }
        if !self.distance.is_finite() || self.distance < 0.0 {
            return Err(StoreError::InvalidInput(format!(
                "distance must be a non-negative number (got {})",
                self.distance
            )));
        }
        Ok(())
    }
}

/// Partial update merged by `IssueRegistry::update`.
///
/// Moderation state (`spamReports`, `isHidden`) and the id are not
/// patchable; those change only through `ModerationEngine`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IssuePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl IssuePatch {
    pub fn is_empty(&self) -> bool {
        *self == IssuePatch::default()
    }

    pub(crate) fn apply(self, issue: &mut Issue) {
        if let Some(title) = self.title {
            issue.title = title;
        }
        if let Some(description) = self.description {
            issue.description = description;
        }
        if let Some(category) = self.category {
            issue.category = category;
        }
        if let Some(status) = self.status {
            issue.status = status;
        }
        if let Some(address) = self.address {
            issue.address = address;
        }
        if let Some(coordinates) = self.coordinates {
            issue.coordinates = Some(coordinates);
        }
        if let Some(distance) = self.distance {
            issue.distance = distance;
        }
        if let Some(image) = self.image {
            issue.image = Some(image);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn category_parses_display_and_kebab_spellings() {
        assert_eq!(
            "Water Supply".parse::<Category>().expect("display name"),
            Category::WaterSupply
        );
        assert_eq!(
            "public-safety".parse::<Category>().expect("kebab name"),
            Category::PublicSafety
        );
        assert!("Parks".parse::<Category>().is_err());
    }

    #[test]
    fn status_serializes_with_display_names() {
        let raw = serde_json::to_string(&Status::InProgress).expect("status should serialize");
        assert_eq!(raw, "\"In Progress\"");
        let parsed: Status = serde_json::from_str("\"Closed\"").expect("closed should parse");
        assert_eq!(parsed, Status::Closed);
        assert_eq!("in_progress".parse::<Status>(), Ok(Status::InProgress));
    }

    #[test]
    fn issue_id_parses_trimmed_numbers_only() {
        assert_eq!(" 42 ".parse::<IssueId>(), Ok(IssueId(42)));
        assert!("bd-1".parse::<IssueId>().is_err());
    }

    #[test]
    fn validate_lists_every_blank_field() {
        let input = NewIssue::new("", "desc", Category::Roads, " ", "alice");
        let err = input.validate().expect_err("blank fields must be rejected");
        assert_eq!(
            err,
            StoreError::InvalidInput("missing required field(s): title, address".to_string())
        );
    }

    #[test]
    fn validate_rejects_negative_distance() {
        let input = NewIssue::new("Pothole", "Deep", Category::Roads, "Main St", "alice")
            .with_distance(-1.0);
        assert!(input.validate().is_err());
    }

    #[test]
    fn split_date_and_time_views() {
        let at = Utc
            .with_ymd_and_hms(2024, 1, 15, 14, 30, 0)
            .single()
            .expect("valid timestamp");
        let issue = Issue::from_new(
            IssueId(1),
            NewIssue::new("Light", "Out", Category::Lighting, "Main St", "system")
                .with_reported_at(at),
        );
        assert_eq!(issue.reported_date().to_string(), "2024-01-15");
        assert_eq!(issue.reported_time(), "14:30");
    }

    #[test]
    fn patch_merges_only_provided_fields() {
        let mut issue = Issue::from_new(
            IssueId(7),
            NewIssue::new("Old", "Desc", Category::Roads, "Addr", "bob"),
        );
        issue.spam_reports.insert("carol".to_string());

        IssuePatch {
            title: Some("New".to_string()),
            category: Some(Category::Obstructions),
            ..IssuePatch::default()
        }
        .apply(&mut issue);

        assert_eq!(issue.title, "New");
        assert_eq!(issue.category, Category::Obstructions);
        assert_eq!(issue.description, "Desc");
        assert_eq!(issue.spam_report_count(), 1);
    }

    #[test]
    fn patch_rejects_moderation_fields() {
        let raw = r#"{"isHidden":false}"#;
        assert!(serde_json::from_str::<IssuePatch>(raw).is_err());
    }
}
