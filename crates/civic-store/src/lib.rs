//! # civic-store
//!
//! Issue lifecycle and moderation state for community issue reporting.
//!
//! This crate provides:
//! - `Issue` and `User` records
//! - `IssueRegistry` (authoritative in-memory issue collection)
//! - `ModerationEngine` (spam flags and the auto-hide rule)
//! - `UserDirectory` (lookup-or-create, ban/unban)
//! - `Analytics` (read-side aggregates over an issue snapshot)
//! - `CivicStore` / `SharedStore` (actor-aware facade and its locked handle)
//!
//! State is volatile: nothing here writes to disk. JSONL is an ingestion
//! format for fixtures and session scripts, not a persistence layer.
//!
//! ## Data flow
//!
//! ```text
//! fixtures / seed / session script
//!     ↓  ingest / replay
//! CivicStore ─ ModerationEngine ─ IssueRegistry
//!            └ UserDirectory
//!     ↓  snapshot
//! Analytics
//! ```

pub mod analytics;
pub mod config;
pub mod directory;
pub mod error;
pub mod identity;
pub mod issue;
pub mod jsonl;
pub mod moderation;
pub mod notify;
pub mod query;
pub mod registry;
pub mod seed;
pub mod session;
pub mod store;
pub mod user;

pub use analytics::Analytics;
pub use config::{ConfigError, StoreConfig};
pub use directory::UserDirectory;
pub use error::StoreError;
pub use identity::{Actor, sign_in, username_from_email};
pub use issue::{
    Category, Coordinates, Issue, IssueId, IssueIdParseError, IssuePatch, NewIssue, Status,
};
pub use jsonl::{JsonlError, read_issues, read_issues_from_path, write_issues};
pub use moderation::{HIDE_THRESHOLD, ModerationEngine, SpamOutcome};
pub use notify::{
    Notification, NotificationKind, NotificationLog, NotificationSink, Recipient, TracingSink,
};
pub use query::{DistanceBand, IssueFilter, sort_newest_first};
pub use registry::{IssueRegistry, MAX_ISSUE_ID, TransitionPolicy};
pub use seed::{ADMIN_EMAIL, ADMIN_USERNAME, seed_issues, seed_store};
pub use session::{
    SessionAction, SessionError, SessionReport, SessionStep, StepOutcome, StepReport,
    read_session, read_session_from_path, replay_session,
};
pub use store::{CivicStore, SharedStore};
pub use user::{Role, User};
