//! Listing filters used by browse and "my issues" views.

use crate::error::StoreError;
use crate::issue::{Category, Issue, Status};
use std::str::FromStr;

/// Radius buckets offered by the browse view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceBand {
    Within1Km,
    Within3Km,
    Within5Km,
}

impl DistanceBand {
    pub fn max_km(self) -> f64 {
        match self {
            DistanceBand::Within1Km => 1.0,
            DistanceBand::Within3Km => 3.0,
            DistanceBand::Within5Km => 5.0,
        }
    }
}

impl FromStr for DistanceBand {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "1km" => Ok(DistanceBand::Within1Km),
            "3" | "3km" => Ok(DistanceBand::Within3Km),
            "5" | "5km" => Ok(DistanceBand::Within5Km),
            other => Err(StoreError::InvalidInput(format!(
                "unknown distance band: {other} (expected 1km, 3km or 5km)"
            ))),
        }
    }
}

/// Conjunctive filter; unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueFilter {
    /// Case-insensitive substring of title or description.
    pub search: Option<String>,
    pub category: Option<Category>,
    pub status: Option<Status>,
    pub within: Option<DistanceBand>,
}

impl IssueFilter {
    pub fn is_empty(&self) -> bool {
        *self == IssueFilter::default()
    }

    pub fn matches(&self, issue: &Issue) -> bool {
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            if !issue.title.to_lowercase().contains(&needle)
                && !issue.description.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        if self.category.is_some_and(|category| issue.category != category) {
            return false;
        }
        if self.status.is_some_and(|status| issue.status != status) {
            return false;
        }
        if self
            .within
            .is_some_and(|band| issue.distance > band.max_km())
        {
            return false;
        }
        true
    }

    pub fn apply<'a>(&self, issues: impl IntoIterator<Item = &'a Issue>) -> Vec<&'a Issue> {
        issues.into_iter().filter(|issue| self.matches(issue)).collect()
    }
}

/// Order issues newest report first; equal timestamps keep their order.
pub fn sort_newest_first(issues: &mut [&Issue]) {
    issues.sort_by(|a, b| b.reported_at.cmp(&a.reported_at));
}
