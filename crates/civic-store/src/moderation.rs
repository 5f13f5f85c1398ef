//! Crowd-sourced spam moderation over the issue registry.
//!
//! Each reporter may flag an issue once. The flag that brings the distinct
//! reporter count to the hide threshold hides the issue in the same
//! mutation, then notifies the admins. Only `unhide` clears spam history.

use crate::issue::{Issue, IssueId};
use crate::notify::{Notification, NotificationKind, NotificationSink, Recipient};
use crate::registry::IssueRegistry;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Distinct spam reports that hide an issue.
pub const HIDE_THRESHOLD: usize = 3;

/// Result of one spam flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SpamOutcome {
    #[serde(rename_all = "camelCase")]
    Accepted {
        report_count: usize,
        auto_hidden: bool,
    },
    AlreadyReported,
    /// The reporter filed the issue and self-reports are disabled.
    OwnIssue,
    NotFound,
}

impl SpamOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SpamOutcome::Accepted { .. })
    }
}

/// Moderation layer wrapping the registry.
pub struct ModerationEngine {
    registry: IssueRegistry,
    sink: Arc<dyn NotificationSink>,
    hide_threshold: usize,
    allow_self_reports: bool,
}

impl std::fmt::Debug for ModerationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModerationEngine")
            .field("issues", &self.registry.len())
            .field("hide_threshold", &self.hide_threshold)
            .field("allow_self_reports", &self.allow_self_reports)
            .finish_non_exhaustive()
    }
}

impl ModerationEngine {
    pub fn new(registry: IssueRegistry, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            registry,
            sink,
            hide_threshold: HIDE_THRESHOLD,
            allow_self_reports: false,
        }
    }

    /// Override the hide threshold. Values below 1 are clamped to 1.
    pub fn with_hide_threshold(mut self, threshold: usize) -> Self {
        self.hide_threshold = threshold.max(1);
        self
    }

    pub fn with_self_reports(mut self, allow: bool) -> Self {
        self.allow_self_reports = allow;
        self
    }

    pub fn hide_threshold(&self) -> usize {
        self.hide_threshold
    }

    pub fn registry(&self) -> &IssueRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut IssueRegistry {
        &mut self.registry
    }

    /// Record one reporter's spam flag against an issue.
    pub fn report_spam(&mut self, issue_id: IssueId, reporter: &str) -> SpamOutcome {
        let threshold = self.hide_threshold;
        let Some(issue) = self.registry.get_mut(issue_id) else {
            debug!(issue_id = %issue_id, reporter, "spam flag skipped: unknown issue");
            return SpamOutcome::NotFound;
        };

        if !self.allow_self_reports && issue.reported_by == reporter {
            debug!(issue_id = %issue_id, reporter, "spam flag refused: own issue");
            return SpamOutcome::OwnIssue;
        }

        if !issue.spam_reports.insert(reporter.to_string()) {
            debug!(issue_id = %issue_id, reporter, "spam flag ignored: already reported");
            return SpamOutcome::AlreadyReported;
        }

        let report_count = issue.spam_reports.len();
        let auto_hidden = !issue.is_hidden && report_count >= threshold;
        if auto_hidden {
            issue.is_hidden = true;
        }
        info!(issue_id = %issue_id, reporter, report_count, "spam flag accepted");

        if auto_hidden {
            warn!(issue_id = %issue_id, report_count, threshold, "issue auto-hidden");
            let message = format!(
                "Issue \"{}\" has been auto-hidden due to multiple spam reports",
                issue.title
            );
            self.sink.emit(Notification::new(
                NotificationKind::Warning,
                Recipient::Admins,
                message,
            ));
        }

        SpamOutcome::Accepted {
            report_count,
            auto_hidden,
        }
    }

    /// Restore an issue to public view with a clean spam history.
    pub fn unhide(&mut self, issue_id: IssueId) -> bool {
        let Some(issue) = self.registry.get_mut(issue_id) else {
            return false;
        };
        let cleared = issue.spam_reports.len();
        issue.is_hidden = false;
        issue.spam_reports.clear();
        info!(issue_id = %issue_id, cleared, "issue unhidden");
        true
    }

    /// Hide an issue by moderator decision, keeping its spam history.
    pub fn hide(&mut self, issue_id: IssueId) -> bool {
        let Some(issue) = self.registry.get_mut(issue_id) else {
            return false;
        };
        issue.is_hidden = true;
        info!(issue_id = %issue_id, "issue hidden by moderator");
        true
    }

    /// Issues with at least one spam report, in insertion order.
    pub fn flagged(&self) -> Vec<&Issue> {
        self.registry
            .issues()
            .filter(|issue| issue.has_spam_reports())
            .collect()
    }

    /// Hidden issues, in insertion order.
    pub fn hidden(&self) -> Vec<&Issue> {
        self.registry
            .issues()
            .filter(|issue| issue.is_hidden)
            .collect()
    }
}
