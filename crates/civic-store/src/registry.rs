//! Canonical in-memory collection of issues.
//!
//! The registry owns issue records and their lifecycle status:
//! - create/read/update/delete with insertion order preserved
//! - id allocation from a monotonically increasing counter
//! - status changes through a single `set_status` entry point

use crate::error::StoreError;
use crate::issue::{Issue, IssueId, IssuePatch, NewIssue, Status};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Which status changes `set_status` accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPolicy {
    /// Any status may follow any other, including reopening resolved issues.
    #[default]
    Free,
    /// Status may only move forward along `Reported → In Progress → Resolved → Closed`.
    ForwardOnly,
}

impl TransitionPolicy {
    pub fn permits(self, from: Status, to: Status) -> bool {
        match self {
            TransitionPolicy::Free => true,
            TransitionPolicy::ForwardOnly => to.rank() >= from.rank(),
        }
    }
}

/// Largest id accepted from ingested issues.
///
/// Ids above it would leave `create` no room to allocate.
pub const MAX_ISSUE_ID: u64 = i64::MAX as u64;

/// Authoritative issue collection.
#[derive(Debug, Clone)]
pub struct IssueRegistry {
    issues: BTreeMap<IssueId, Issue>,
    order: Vec<IssueId>,
    next_id: u64,
    policy: TransitionPolicy,
}

impl Default for IssueRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl IssueRegistry {
    pub fn new() -> Self {
        Self {
            issues: BTreeMap::new(),
            order: Vec::new(),
            next_id: 1,
            policy: TransitionPolicy::Free,
        }
    }

    pub fn with_policy(mut self, policy: TransitionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Build a registry from already-identified issues, keeping their order.
    ///
    /// Duplicate ids are rejected.
    pub fn from_issues(issues: Vec<Issue>) -> Result<Self, StoreError> {
        let mut registry = Self::new();
        for issue in issues {
            registry.insert(issue)?;
        }
        Ok(registry)
    }

    /// Total number of issues, hidden included.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Store a new issue under a freshly allocated id.
    pub fn create(&mut self, input: NewIssue) -> Issue {
        let id = IssueId(self.next_id);
        self.next_id += 1;

        let issue = Issue::from_new(id, input);
        info!(
            issue_id = %id,
            category = %issue.category,
            reported_by = %issue.reported_by,
            "issue created"
        );
        self.order.push(id);
        self.issues.insert(id, issue.clone());
        issue
    }

    /// Ingest an issue that already carries an id.
    ///
    /// Advances the id counter past it so later `create` calls stay unique.
    /// Ids above `MAX_ISSUE_ID` are rejected.
    pub fn insert(&mut self, issue: Issue) -> Result<(), StoreError> {
        let id = issue.id;
        if id.get() > MAX_ISSUE_ID {
            return Err(StoreError::InvalidInput(format!(
                "issue id out of range: {id} (max {MAX_ISSUE_ID})"
            )));
        }
        if self.issues.contains_key(&id) {
            return Err(StoreError::DuplicateIssueId(id));
        }
        self.next_id = self.next_id.max(id.get() + 1);
        self.order.push(id);
        self.issues.insert(id, issue);
        Ok(())
    }

    /// Lookup one issue by id.
    pub fn get(&self, id: IssueId) -> Option<&Issue> {
        self.issues.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: IssueId) -> Option<&mut Issue> {
        self.issues.get_mut(&id)
    }

    /// Iterate all issues in insertion order.
    pub fn issues(&self) -> impl Iterator<Item = &Issue> {
        self.order.iter().filter_map(|id| self.issues.get(id))
    }

    pub fn list_all(&self) -> Vec<&Issue> {
        self.issues().collect()
    }

    pub fn list_visible(&self) -> Vec<&Issue> {
        self.issues().filter(|issue| issue.is_visible()).collect()
    }

    pub fn list_by_reporter(&self, username: &str) -> Vec<&Issue> {
        self.issues()
            .filter(|issue| issue.reported_by == username)
            .collect()
    }

    pub fn list_visible_by_reporter(&self, username: &str) -> Vec<&Issue> {
        self.issues()
            .filter(|issue| issue.is_visible() && issue.reported_by == username)
            .collect()
    }

    /// Merge `patch` into an existing issue.
    ///
    /// Returns `false` when the id is unknown. Status changes carried by a
    /// patch bypass the transition policy, as a bulk edit would.
    pub fn update(&mut self, id: IssueId, patch: IssuePatch) -> bool {
        let Some(issue) = self.issues.get_mut(&id) else {
            debug!(issue_id = %id, "update skipped: unknown issue");
            return false;
        };
        patch.apply(issue);
        info!(issue_id = %id, "issue updated");
        true
    }

    /// Change one issue's status under the registry's transition policy.
    pub fn set_status(&mut self, id: IssueId, status: Status) -> bool {
        let policy = self.policy;
        let Some(issue) = self.issues.get_mut(&id) else {
            debug!(issue_id = %id, "status change skipped: unknown issue");
            return false;
        };

        let from = issue.status;
        if !policy.permits(from, status) {
            warn!(
                issue_id = %id,
                from = %from,
                to = %status,
                ?policy,
                "status transition refused"
            );
            return false;
        }

        if status.rank() < from.rank() {
            info!(issue_id = %id, from = %from, to = %status, "issue reopened");
        }
        issue.status = status;
        info!(issue_id = %id, from = %from, to = %status, "issue status changed");
        true
    }

    pub fn delete(&mut self, id: IssueId) -> bool {
        if self.issues.remove(&id).is_none() {
            return false;
        }
        self.order.retain(|existing| *existing != id);
        info!(issue_id = %id, "issue deleted");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::Category;

    fn input(title: &str, reporter: &str) -> NewIssue {
        NewIssue::new(title, "details", Category::Roads, "Main St", reporter)
    }

    #[test]
    fn create_assigns_sequential_ids_and_clean_moderation_state() {
        let mut registry = IssueRegistry::new();
        let first = registry.create(input("A", "alice"));
        let second = registry.create(input("B", "bob"));

        assert_eq!(first.id, IssueId(1));
        assert_eq!(second.id, IssueId(2));
        assert!(first.spam_reports.is_empty());
        assert!(!first.is_hidden);
        assert_eq!(first.status, Status::Reported);
    }

    #[test]
    fn create_get_round_trip_matches_input() {
        let mut registry = IssueRegistry::new();
        let request = input("Pothole", "alice")
            .with_distance(2.1)
            .with_image("/pothole.jpg")
            .with_coordinates(40.7, -73.9);
        let created = registry.create(request.clone());

        let fetched = registry.get(created.id).expect("created issue must exist");
        assert_eq!(fetched, &created);
        assert_eq!(fetched.title, request.title);
        assert_eq!(fetched.category, request.category);
        assert_eq!(fetched.image, request.image);
        assert_eq!(fetched.coordinates, request.coordinates);
    }

    #[test]
    fn deleted_ids_are_not_reused() {
        let mut registry = IssueRegistry::new();
        let first = registry.create(input("A", "alice"));
        let second = registry.create(input("B", "alice"));
        assert!(registry.delete(second.id));
        assert!(!registry.delete(second.id));

        let third = registry.create(input("C", "alice"));
        assert_eq!(third.id, IssueId(3));
        assert_eq!(
            registry.list_all().iter().map(|i| i.id).collect::<Vec<_>>(),
            vec![first.id, third.id]
        );
    }

    #[test]
    fn insert_rejects_duplicates_and_advances_counter() {
        let mut seed = IssueRegistry::new();
        let issue = seed.create(input("A", "alice"));
        let mut relabeled = issue.clone();
        relabeled.id = IssueId(10);

        let mut registry = IssueRegistry::new();
        registry.insert(relabeled.clone()).expect("first insert");
        let err = registry.insert(relabeled).expect_err("duplicate id must fail");
        assert_eq!(err, StoreError::DuplicateIssueId(IssueId(10)));

        let next = registry.create(input("B", "bob"));
        assert_eq!(next.id, IssueId(11));
    }

    #[test]
    fn insert_rejects_ids_without_room_to_allocate() {
        let mut scratch = IssueRegistry::new();
        let template = scratch.create(input("A", "alice"));

        let mut registry = IssueRegistry::new();
        let mut huge = template.clone();
        huge.id = IssueId(u64::MAX);
        let err = registry.insert(huge).expect_err("u64::MAX must be rejected");
        assert!(matches!(err, StoreError::InvalidInput(_)));
        assert!(registry.is_empty());

        let mut last = template;
        last.id = IssueId(MAX_ISSUE_ID);
        registry.insert(last).expect("largest accepted id");
        let next = registry.create(input("B", "bob"));
        assert_eq!(next.id, IssueId(MAX_ISSUE_ID + 1));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn insertion_order_survives_out_of_order_ids() {
        let mut scratch = IssueRegistry::new();
        let mut high = scratch.create(input("high", "a"));
        high.id = IssueId(9);
        let mut low = scratch.create(input("low", "a"));
        low.id = IssueId(2);

        let registry = IssueRegistry::from_issues(vec![high, low]).expect("registry builds");
        let titles: Vec<&str> = registry.issues().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["high", "low"]);
    }

    #[test]
    fn visible_listing_is_ordered_subset_of_all() {
        let mut registry = IssueRegistry::new();
        for title in ["A", "B", "C", "D"] {
            registry.create(input(title, "alice"));
        }
        registry
            .get_mut(IssueId(2))
            .expect("issue 2 exists")
            .is_hidden = true;

        let visible: Vec<IssueId> = registry.list_visible().iter().map(|i| i.id).collect();
        let expected: Vec<IssueId> = registry
            .list_all()
            .iter()
            .filter(|i| !i.is_hidden)
            .map(|i| i.id)
            .collect();
        assert_eq!(visible, expected);
        assert_eq!(visible, vec![IssueId(1), IssueId(3), IssueId(4)]);
    }

    #[test]
    fn reporter_listings_expose_hidden_and_visible_variants() {
        let mut registry = IssueRegistry::new();
        let mine = registry.create(input("mine", "alice"));
        registry.create(input("theirs", "bob"));
        let hidden = registry.create(input("mine hidden", "alice"));
        registry.get_mut(hidden.id).expect("exists").is_hidden = true;

        assert_eq!(registry.list_by_reporter("alice").len(), 2);
        let visible: Vec<IssueId> = registry
            .list_visible_by_reporter("alice")
            .iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(visible, vec![mine.id]);
    }

    #[test]
    fn update_merges_and_reports_unknown_ids() {
        let mut registry = IssueRegistry::new();
        let issue = registry.create(input("Old", "alice"));
        let patch = IssuePatch {
            title: Some("New".to_string()),
            ..IssuePatch::default()
        };

        assert!(registry.update(issue.id, patch.clone()));
        assert!(!registry.update(IssueId(99), patch));
        assert_eq!(registry.get(issue.id).expect("exists").title, "New");
    }

    #[test]
    fn free_policy_allows_reopening_resolved_issue() {
        let mut registry = IssueRegistry::new();
        let issue = registry.create(input("A", "alice"));

        assert!(registry.set_status(issue.id, Status::Resolved));
        assert!(registry.set_status(issue.id, Status::Reported));
        assert!(registry.set_status(issue.id, Status::Closed));
        assert!(registry.set_status(issue.id, Status::InProgress));
        assert_eq!(
            registry.get(issue.id).expect("exists").status,
            Status::InProgress
        );
        assert!(!registry.set_status(IssueId(42), Status::Resolved));
    }

    #[test]
    fn forward_only_policy_refuses_reopening() {
        let mut registry = IssueRegistry::new().with_policy(TransitionPolicy::ForwardOnly);
        let issue = registry.create(input("A", "alice"));

        assert!(registry.set_status(issue.id, Status::Resolved));
        assert!(!registry.set_status(issue.id, Status::InProgress));
        assert!(registry.set_status(issue.id, Status::Resolved));
        assert!(registry.set_status(issue.id, Status::Closed));
        assert_eq!(
            registry.get(issue.id).expect("exists").status,
            Status::Closed
        );
    }
}
