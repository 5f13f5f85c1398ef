use crate::cli::SourceArgs;
use crate::support::{load_store_or_exit, print_json, source_label, to_json_or_exit};
use civic_store::TracingSink;
use serde_json::json;
use std::sync::Arc;

pub fn run(source: SourceArgs, json_output: bool) {
    let store = load_store_or_exit(&source, Arc::new(TracingSink));
    let analytics = store.analytics();

    if json_output {
        let payload = json!({
            "action": "analytics",
            "source": source_label(&source),
            "analytics": to_json_or_exit(&analytics),
            "resolutionPercent": analytics.resolution_percent(),
            "pendingPercent": analytics.pending_percent()
        });
        print_json(&payload);
        return;
    }

    println!("civic analytics\n  Source: {}", source_label(&source));
    println!("  Total issues: {}", analytics.total_issues);
    println!(
        "  Resolved: {} ({}%)",
        analytics.resolved_count,
        analytics.resolution_percent()
    );
    println!(
        "  Pending: {} ({}%)",
        analytics.pending_count,
        analytics.pending_percent()
    );
    println!("  Spam reported: {}", analytics.spam_report_count);
    println!("  Hidden: {}", analytics.hidden_count);
    println!("  Most reported: {}", analytics.most_reported_label());
    println!("  By category:");
    for (category, count) in &analytics.category_stats {
        println!("    {category}: {count}");
    }
    println!("  By status:");
    for (status, count) in &analytics.status_stats {
        println!("    {status}: {count}");
    }
}
