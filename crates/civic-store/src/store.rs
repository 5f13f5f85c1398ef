//! Store facade: one registry, one moderation engine, one user directory.
//!
//! `CivicStore` is constructed by the host and passed around explicitly;
//! there is no global instance. The component accessors expose the raw
//! operations; the actor-aware methods layer the configured policies
//! (admin-only moderation, optional ban enforcement) on top.
//!
//! `SharedStore` wraps a store in one mutex so each call, including the
//! flag-then-hide step and id allocation, runs in a single critical section.

use crate::analytics::Analytics;
use crate::config::StoreConfig;
use crate::directory::UserDirectory;
use crate::error::StoreError;
use crate::identity::{self, Actor};
use crate::issue::{Issue, IssueId, IssuePatch, NewIssue, Status};
use crate::moderation::{ModerationEngine, SpamOutcome};
use crate::notify::{NotificationSink, TracingSink};
use crate::registry::IssueRegistry;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug)]
pub struct CivicStore {
    config: StoreConfig,
    moderation: ModerationEngine,
    directory: UserDirectory,
}

impl Default for CivicStore {
    fn default() -> Self {
        Self::new(StoreConfig::default(), Arc::new(TracingSink))
    }
}

impl CivicStore {
    pub fn new(config: StoreConfig, sink: Arc<dyn NotificationSink>) -> Self {
        let registry = IssueRegistry::new().with_policy(config.transition_policy);
        let moderation = ModerationEngine::new(registry, sink)
            .with_hide_threshold(config.hide_threshold)
            .with_self_reports(config.allow_self_reports);
        Self {
            config,
            moderation,
            directory: UserDirectory::new(),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn registry(&self) -> &IssueRegistry {
        self.moderation.registry()
    }

    pub fn registry_mut(&mut self) -> &mut IssueRegistry {
        self.moderation.registry_mut()
    }

    pub fn moderation(&self) -> &ModerationEngine {
        &self.moderation
    }

    pub fn moderation_mut(&mut self) -> &mut ModerationEngine {
        &mut self.moderation
    }

    pub fn directory(&self) -> &UserDirectory {
        &self.directory
    }

    pub fn directory_mut(&mut self) -> &mut UserDirectory {
        &mut self.directory
    }

    /// Add an already-identified issue (fixtures, seed data).
    pub fn ingest_issue(&mut self, issue: Issue) -> Result<(), StoreError> {
        self.registry_mut().insert(issue)
    }

    pub fn ingest_issues(&mut self, issues: Vec<Issue>) -> Result<usize, StoreError> {
        let count = issues.len();
        for issue in issues {
            self.ingest_issue(issue)?;
        }
        Ok(count)
    }

    /// Aggregates over every issue, hidden included.
    pub fn analytics(&self) -> Analytics {
        Analytics::from_issues(self.registry().issues())
    }

    /// Resolve a sign-in email against the directory.
    pub fn sign_in(&mut self, email: &str) -> Result<Actor, StoreError> {
        identity::sign_in(&mut self.directory, email, &self.config.admin_email)
    }

    /// Actor for a username that has already signed in.
    ///
    /// The role comes from the directory, never from the caller.
    pub fn actor(&self, username: &str) -> Result<Actor, StoreError> {
        self.directory
            .get(username)
            .map(Actor::from)
            .ok_or_else(|| StoreError::InvalidInput(format!("unknown user: {username}")))
    }

    /// File a new issue on behalf of `actor`.
    ///
    /// The reporter is always the actor, whatever the input says. Only
    /// admins may file an issue with an explicit status.
    pub fn report_issue(&mut self, actor: &Actor, mut input: NewIssue) -> Result<Issue, StoreError> {
        self.ensure_not_banned(actor)?;
        if input.status.is_some() {
            ensure_admin(actor, "change issue status")?;
        }
        input.reported_by = actor.username.clone();
        input.validate()?;
        Ok(self.registry_mut().create(input))
    }

    pub fn flag_spam(&mut self, actor: &Actor, id: IssueId) -> Result<SpamOutcome, StoreError> {
        self.ensure_not_banned(actor)?;
        Ok(self.moderation.report_spam(id, &actor.username))
    }

    /// Edit an issue. Allowed for admins and for the issue's reporter.
    pub fn edit_issue(
        &mut self,
        actor: &Actor,
        id: IssueId,
        patch: IssuePatch,
    ) -> Result<bool, StoreError> {
        self.ensure_owner_or_admin(actor, id, "edit this issue")?;
        if patch.status.is_some() {
            ensure_admin(actor, "change issue status")?;
        }
        Ok(self.registry_mut().update(id, patch))
    }

    pub fn change_status(
        &mut self,
        actor: &Actor,
        id: IssueId,
        status: Status,
    ) -> Result<bool, StoreError> {
        ensure_admin(actor, "change issue status")?;
        Ok(self.registry_mut().set_status(id, status))
    }

    /// Delete an issue. Allowed for admins and for the issue's reporter.
    pub fn delete_issue(&mut self, actor: &Actor, id: IssueId) -> Result<bool, StoreError> {
        self.ensure_owner_or_admin(actor, id, "delete this issue")?;
        Ok(self.registry_mut().delete(id))
    }

    pub fn hide_issue(&mut self, actor: &Actor, id: IssueId) -> Result<bool, StoreError> {
        ensure_admin(actor, "hide issues")?;
        Ok(self.moderation.hide(id))
    }

    pub fn unhide_issue(&mut self, actor: &Actor, id: IssueId) -> Result<bool, StoreError> {
        ensure_admin(actor, "unhide issues")?;
        Ok(self.moderation.unhide(id))
    }

    pub fn ban_user(&mut self, actor: &Actor, username: &str) -> Result<bool, StoreError> {
        ensure_admin(actor, "ban users")?;
        Ok(self.directory.ban(username))
    }

    pub fn unban_user(&mut self, actor: &Actor, username: &str) -> Result<bool, StoreError> {
        ensure_admin(actor, "unban users")?;
        Ok(self.directory.unban(username))
    }

    fn ensure_not_banned(&self, actor: &Actor) -> Result<(), StoreError> {
        if !self.config.enforce_bans {
            return Ok(());
        }
        match self.directory.get(&actor.username) {
            Some(user) if user.is_banned => Err(StoreError::Banned(actor.username.clone())),
            _ => Ok(()),
        }
    }

    fn ensure_owner_or_admin(
        &self,
        actor: &Actor,
        id: IssueId,
        action: &'static str,
    ) -> Result<(), StoreError> {
        if actor.is_admin() {
            return Ok(());
        }
        // Unknown ids fall through so the caller reports `false`.
        match self.registry().get(id) {
            Some(issue) if issue.reported_by != actor.username => Err(StoreError::Forbidden {
                username: actor.username.clone(),
                action,
            }),
            _ => Ok(()),
        }
    }
}

fn ensure_admin(actor: &Actor, action: &'static str) -> Result<(), StoreError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(StoreError::Forbidden {
            username: actor.username.clone(),
            action,
        })
    }
}

/// Cloneable, lock-guarded handle for hosts with concurrent callers.
#[derive(Debug, Clone)]
pub struct SharedStore {
    inner: Arc<Mutex<CivicStore>>,
}

impl SharedStore {
    pub fn new(store: CivicStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Run `f` with exclusive access to the store.
    ///
    /// A poisoned lock is recovered: every store operation leaves the
    /// state consistent before it returns.
    pub fn with<T>(&self, f: impl FnOnce(&mut CivicStore) -> T) -> T {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub fn report_issue(&self, actor: &Actor, input: NewIssue) -> Result<Issue, StoreError> {
        self.with(|store| store.report_issue(actor, input))
    }

    pub fn flag_spam(&self, actor: &Actor, id: IssueId) -> Result<SpamOutcome, StoreError> {
        self.with(|store| store.flag_spam(actor, id))
    }

    pub fn get(&self, id: IssueId) -> Option<Issue> {
        self.with(|store| store.registry().get(id).cloned())
    }

    pub fn list_visible(&self) -> Vec<Issue> {
        self.with(|store| {
            store
                .registry()
                .list_visible()
                .into_iter()
                .cloned()
                .collect()
        })
    }

    pub fn analytics(&self) -> Analytics {
        self.with(|store| store.analytics())
    }
}
