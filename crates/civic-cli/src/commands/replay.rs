use crate::cli::SourceArgs;
use crate::support::{fail, load_store_or_exit, print_json, source_label, to_json_or_exit};
use civic_store::{
    NotificationLog, StepOutcome, StepReport, read_session_from_path, replay_session,
};
use serde_json::json;
use std::sync::Arc;

pub fn run(session: String, source: SourceArgs, json_output: bool) {
    let steps = read_session_from_path(&session)
        .unwrap_or_else(|e| fail(format!("failed to read session {session}: {e}")));
    let log = Arc::new(NotificationLog::new());
    let mut store = load_store_or_exit(&source, log.clone());

    let report = replay_session(&mut store, &steps);
    let notifications = log.all();

    if json_output {
        let payload = json!({
            "action": "replay",
            "session": session,
            "source": source_label(&source),
            "stepCount": report.steps.len(),
            "refused": report.refused(),
            "steps": to_json_or_exit(&report.steps),
            "analytics": to_json_or_exit(&report.analytics),
            "notifications": to_json_or_exit(&notifications)
        });
        print_json(&payload);
        return;
    }

    println!(
        "civic replay\n  Session: {session}\n  Source: {}\n  Steps: {} ({} refused)",
        source_label(&source),
        report.steps.len(),
        report.refused()
    );
    for step in &report.steps {
        println!("  {}", step_line(step));
    }
    println!(
        "  Issues: {} total, {} hidden, {} with spam reports",
        report.analytics.total_issues,
        report.analytics.hidden_count,
        report.analytics.spam_report_count
    );
    println!("  Notifications: {}", notifications.len());
    for notification in &notifications {
        println!("    [{:?}] {}", notification.kind, notification.message);
    }
}

fn step_line(step: &StepReport) -> String {
    let detail = match &step.outcome {
        StepOutcome::SignedIn { username, role } => format!("signed in {username} ({role})"),
        StepOutcome::Reported { id } => format!("reported #{id}"),
        StepOutcome::Flagged { outcome } => format!("{outcome:?}"),
        StepOutcome::Applied { applied: true } => "ok".to_string(),
        StepOutcome::Applied { applied: false } => "no such issue or user".to_string(),
        StepOutcome::Refused { error } => format!("refused: {error}"),
    };
    format!("line {} {}: {detail}", step.line, step.action)
}
