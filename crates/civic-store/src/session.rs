//! Session scripts: a JSONL list of store actions replayed in order.
//!
//! One object per line, tagged by `action`:
//!
//! ```text
//! {"action":"sign_in","email":"alice@example.com"}
//! {"action":"report_issue","actor":"alice","issue":{...NewIssue...}}
//! {"action":"report_spam","actor":"bob","id":1}
//! {"action":"unhide","actor":"admin","id":1}
//! ```
//!
//! Actors are usernames that must have signed in earlier in the script (or
//! been seeded); their role comes from the directory. Refusals from the
//! store (forbidden, banned, invalid input) are recorded per step and do
//! not stop the replay.

use crate::analytics::Analytics;
use crate::error::StoreError;
use crate::issue::{IssueId, IssuePatch, NewIssue, Status};
use crate::jsonl::{JsonlError, validate_input_bytes};
use crate::moderation::SpamOutcome;
use crate::store::CivicStore;
use crate::user::Role;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("line {0}: I/O error: {1}")]
    Io(usize, String),

    #[error("line {0}: parse error: {1}")]
    Parse(usize, String),

    #[error(transparent)]
    Input(#[from] JsonlError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SessionAction {
    SignIn {
        email: String,
    },
    ReportIssue {
        actor: String,
        issue: NewIssue,
    },
    UpdateIssue {
        actor: String,
        id: IssueId,
        patch: IssuePatch,
    },
    SetStatus {
        actor: String,
        id: IssueId,
        status: Status,
    },
    DeleteIssue {
        actor: String,
        id: IssueId,
    },
    ReportSpam {
        actor: String,
        id: IssueId,
    },
    Hide {
        actor: String,
        id: IssueId,
    },
    Unhide {
        actor: String,
        id: IssueId,
    },
    Ban {
        actor: String,
        username: String,
    },
    Unban {
        actor: String,
        username: String,
    },
}

impl SessionAction {
    pub fn name(&self) -> &'static str {
        match self {
            SessionAction::SignIn { .. } => "sign_in",
            SessionAction::ReportIssue { .. } => "report_issue",
            SessionAction::UpdateIssue { .. } => "update_issue",
            SessionAction::SetStatus { .. } => "set_status",
            SessionAction::DeleteIssue { .. } => "delete_issue",
            SessionAction::ReportSpam { .. } => "report_spam",
            SessionAction::Hide { .. } => "hide",
            SessionAction::Unhide { .. } => "unhide",
            SessionAction::Ban { .. } => "ban",
            SessionAction::Unban { .. } => "unban",
        }
    }
}

/// One parsed script line.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStep {
    pub line: usize,
    pub action: SessionAction,
}

/// What one step did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum StepOutcome {
    SignedIn { username: String, role: Role },
    Reported { id: IssueId },
    Flagged { outcome: SpamOutcome },
    /// `applied` is false when the target issue or user does not exist.
    Applied { applied: bool },
    Refused { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    pub line: usize,
    pub action: &'static str,
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionReport {
    pub steps: Vec<StepReport>,
    pub analytics: Analytics,
}

impl SessionReport {
    pub fn refused(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| matches!(step.outcome, StepOutcome::Refused { .. }))
            .count()
    }
}

pub fn read_session(reader: impl BufRead) -> Result<Vec<SessionStep>, SessionError> {
    let mut steps = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| SessionError::Io(line_no + 1, e.to_string()))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let action: SessionAction = serde_json::from_str(trimmed)
            .map_err(|e| SessionError::Parse(line_no + 1, e.to_string()))?;
        steps.push(SessionStep {
            line: line_no + 1,
            action,
        });
    }
    Ok(steps)
}

pub fn read_session_from_path(path: impl AsRef<Path>) -> Result<Vec<SessionStep>, SessionError> {
    let path = path.as_ref();
    let bytes =
        fs::read(path).map_err(|e| SessionError::Io(0, format!("{}: {e}", path.display())))?;
    validate_input_bytes(path, &bytes)?;
    read_session(BufReader::new(bytes.as_slice()))
}

/// Apply every step to `store` and summarize the result.
pub fn replay_session(store: &mut CivicStore, steps: &[SessionStep]) -> SessionReport {
    let reports = steps
        .iter()
        .map(|step| {
            let outcome = match apply_step(store, &step.action) {
                Ok(outcome) => outcome,
                Err(err) => {
                    debug!(line = step.line, action = step.action.name(), %err, "step refused");
                    StepOutcome::Refused {
                        error: err.to_string(),
                    }
                }
            };
            StepReport {
                line: step.line,
                action: step.action.name(),
                outcome,
            }
        })
        .collect();

    SessionReport {
        steps: reports,
        analytics: store.analytics(),
    }
}

fn apply_step(store: &mut CivicStore, action: &SessionAction) -> Result<StepOutcome, StoreError> {
    let outcome = match action {
        SessionAction::SignIn { email } => {
            let actor = store.sign_in(email)?;
            StepOutcome::SignedIn {
                username: actor.username,
                role: actor.role,
            }
        }
        SessionAction::ReportIssue { actor, issue } => {
            let actor = store.actor(actor)?;
            StepOutcome::Reported {
                id: store.report_issue(&actor, issue.clone())?.id,
            }
        }
        SessionAction::UpdateIssue { actor, id, patch } => {
            let actor = store.actor(actor)?;
            StepOutcome::Applied {
                applied: store.edit_issue(&actor, *id, patch.clone())?,
            }
        }
        SessionAction::SetStatus { actor, id, status } => {
            let actor = store.actor(actor)?;
            StepOutcome::Applied {
                applied: store.change_status(&actor, *id, *status)?,
            }
        }
        SessionAction::DeleteIssue { actor, id } => {
            let actor = store.actor(actor)?;
            StepOutcome::Applied {
                applied: store.delete_issue(&actor, *id)?,
            }
        }
        SessionAction::ReportSpam { actor, id } => {
            let actor = store.actor(actor)?;
            StepOutcome::Flagged {
                outcome: store.flag_spam(&actor, *id)?,
            }
        }
        SessionAction::Hide { actor, id } => {
            let actor = store.actor(actor)?;
            StepOutcome::Applied {
                applied: store.hide_issue(&actor, *id)?,
            }
        }
        SessionAction::Unhide { actor, id } => {
            let actor = store.actor(actor)?;
            StepOutcome::Applied {
                applied: store.unhide_issue(&actor, *id)?,
            }
        }
        SessionAction::Ban { actor, username } => {
            let actor = store.actor(actor)?;
            StepOutcome::Applied {
                applied: store.ban_user(&actor, username)?,
            }
        }
        SessionAction::Unban { actor, username } => {
            let actor = store.actor(actor)?;
            StepOutcome::Applied {
                applied: store.unban_user(&actor, username)?,
            }
        }
    };
    Ok(outcome)
}
