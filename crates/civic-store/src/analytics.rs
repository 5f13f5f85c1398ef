//! Read-side aggregates over an issue snapshot.
//!
//! Everything here is recomputed from the issues handed in; nothing is
//! cached and nothing mutates.

use crate::issue::{Category, Issue, Status};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub total_issues: usize,
    /// Observed categories only.
    pub category_stats: BTreeMap<Category, usize>,
    pub status_stats: BTreeMap<Status, usize>,
    /// Issues carrying at least one spam report.
    pub spam_report_count: usize,
    pub hidden_count: usize,
    /// `None` when there are no issues.
    pub most_reported_category: Option<Category>,
    /// Issues in a terminal status (`Resolved` or `Closed`).
    pub resolved_count: usize,
    /// Issues still in `Reported`.
    pub pending_count: usize,
    pub reporter_stats: BTreeMap<String, usize>,
}

impl Analytics {
    pub fn from_issues<'a>(issues: impl IntoIterator<Item = &'a Issue>) -> Self {
        let mut total_issues = 0;
        let mut category_stats = BTreeMap::new();
        let mut category_order: Vec<Category> = Vec::new();
        let mut status_stats = BTreeMap::new();
        let mut spam_report_count = 0;
        let mut hidden_count = 0;
        let mut resolved_count = 0;
        let mut pending_count = 0;
        let mut reporter_stats: BTreeMap<String, usize> = BTreeMap::new();

        for issue in issues {
            total_issues += 1;

            let seen = category_stats.entry(issue.category).or_insert(0);
            if *seen == 0 {
                category_order.push(issue.category);
            }
            *seen += 1;

            *status_stats.entry(issue.status).or_insert(0) += 1;
            *reporter_stats.entry(issue.reported_by.clone()).or_default() += 1;

            if issue.has_spam_reports() {
                spam_report_count += 1;
            }
            if issue.is_hidden {
                hidden_count += 1;
            }
            if issue.status.is_terminal() {
                resolved_count += 1;
            }
            if issue.status == Status::Reported {
                pending_count += 1;
            }
        }

        // Ties go to the category encountered first.
        let mut most_reported_category: Option<(Category, usize)> = None;
        for category in category_order {
            let count = category_stats[&category];
            if most_reported_category.is_none_or(|(_, best)| count > best) {
                most_reported_category = Some((category, count));
            }
        }

        Self {
            total_issues,
            category_stats,
            status_stats,
            spam_report_count,
            hidden_count,
            most_reported_category: most_reported_category.map(|(category, _)| category),
            resolved_count,
            pending_count,
            reporter_stats,
        }
    }

    /// Most reported category name, or `"None"` for an empty issue set.
    pub fn most_reported_label(&self) -> &'static str {
        self.most_reported_category
            .map(|category| category.as_str())
            .unwrap_or("None")
    }

    /// Resolved issues over total issues, `0.0` when empty.
    pub fn resolution_rate(&self) -> f64 {
        ratio(self.resolved_count, self.total_issues)
    }

    pub fn pending_rate(&self) -> f64 {
        ratio(self.pending_count, self.total_issues)
    }

    /// Resolution rate rounded to a whole percent.
    pub fn resolution_percent(&self) -> u32 {
        (self.resolution_rate() * 100.0).round() as u32
    }

    pub fn pending_percent(&self) -> u32 {
        (self.pending_rate() * 100.0).round() as u32
    }
}

fn ratio(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::{IssueId, NewIssue};

    fn issue(id: u64, category: Category, status: Status, reporter: &str) -> Issue {
        Issue::from_new(
            IssueId(id),
            NewIssue::new(format!("Issue {id}"), "details", category, "Somewhere", reporter)
                .with_status(status),
        )
    }

    #[test]
    fn empty_set_uses_none_sentinel() {
        let analytics = Analytics::from_issues(&Vec::<Issue>::new());
        assert_eq!(analytics.total_issues, 0);
        assert!(analytics.category_stats.is_empty());
        assert_eq!(analytics.most_reported_category, None);
        assert_eq!(analytics.most_reported_label(), "None");
        assert_eq!(analytics.resolution_rate(), 0.0);
    }

    #[test]
    fn stats_sum_to_total() {
        let issues = vec![
            issue(1, Category::Roads, Status::Reported, "a"),
            issue(2, Category::WaterSupply, Status::Resolved, "b"),
            issue(3, Category::Roads, Status::Closed, "a"),
            issue(4, Category::Cleanliness, Status::InProgress, "c"),
            issue(5, Category::Lighting, Status::Reported, "c"),
        ];
        let analytics = Analytics::from_issues(&issues);

        assert_eq!(analytics.total_issues, 5);
        assert_eq!(analytics.category_stats.values().sum::<usize>(), 5);
        assert_eq!(analytics.status_stats.values().sum::<usize>(), 5);
        assert_eq!(analytics.reporter_stats.values().sum::<usize>(), 5);
        assert_eq!(analytics.resolved_count, 2);
        assert_eq!(analytics.pending_count, 2);
        assert_eq!(analytics.resolution_percent(), 40);
        assert_eq!(analytics.pending_percent(), 40);
    }

    #[test]
    fn most_reported_tie_goes_to_first_encountered() {
        let issues = vec![
            issue(1, Category::Obstructions, Status::Reported, "a"),
            issue(2, Category::Roads, Status::Reported, "a"),
            issue(3, Category::Roads, Status::Reported, "a"),
            issue(4, Category::Obstructions, Status::Reported, "a"),
        ];
        let analytics = Analytics::from_issues(&issues);
        assert_eq!(
            analytics.most_reported_category,
            Some(Category::Obstructions)
        );

        let mut more_roads = issues;
        more_roads.push(issue(5, Category::Roads, Status::Reported, "a"));
        let analytics = Analytics::from_issues(&more_roads);
        assert_eq!(analytics.most_reported_category, Some(Category::Roads));
    }

    #[test]
    fn spam_and_hidden_counts() {
        let mut flagged = issue(1, Category::Roads, Status::Reported, "a");
        flagged.spam_reports.insert("x".to_string());
        let mut hidden = issue(2, Category::Roads, Status::Reported, "a");
        hidden.spam_reports.extend(["x", "y", "z"].map(String::from));
        hidden.is_hidden = true;
        let clean = issue(3, Category::Roads, Status::Reported, "a");

        let analytics = Analytics::from_issues(&[flagged, hidden, clean]);
        assert_eq!(analytics.spam_report_count, 2);
        assert_eq!(analytics.hidden_count, 1);
    }

    #[test]
    fn analytics_json_shape() {
        let mut hidden = issue(3, Category::Roads, Status::InProgress, "alice");
        hidden.spam_reports.insert("mallory".to_string());
        hidden.is_hidden = true;
        let issues = vec![
            issue(1, Category::Roads, Status::Reported, "alice"),
            issue(2, Category::Lighting, Status::Resolved, "bob"),
            hidden,
        ];

        insta::assert_json_snapshot!(Analytics::from_issues(&issues), @r#"
        {
          "totalIssues": 3,
          "categoryStats": {
            "Roads": 2,
            "Lighting": 1
          },
          "statusStats": {
            "Reported": 1,
            "In Progress": 1,
            "Resolved": 1
          },
          "spamReportCount": 1,
          "hiddenCount": 1,
          "mostReportedCategory": "Roads",
          "resolvedCount": 1,
          "pendingCount": 1,
          "reporterStats": {
            "alice": 2,
            "bob": 1
          }
        }
        "#);
    }
}
