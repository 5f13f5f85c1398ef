use crate::cli::SourceArgs;
use crate::support::{issue_line, issue_row, load_store_or_exit, print_json, source_label};
use civic_store::TracingSink;
use serde_json::json;
use std::sync::Arc;

pub fn run(source: SourceArgs, json_output: bool) {
    let store = load_store_or_exit(&source, Arc::new(TracingSink));
    let moderation = store.moderation();
    let flagged = moderation.flagged();
    let hidden = moderation.hidden();

    if json_output {
        let payload = json!({
            "action": "queue",
            "source": source_label(&source),
            "hideThreshold": moderation.hide_threshold(),
            "flagged": flagged.iter().map(|issue| issue_row(issue)).collect::<Vec<_>>(),
            "hidden": hidden.iter().map(|issue| issue_row(issue)).collect::<Vec<_>>()
        });
        print_json(&payload);
        return;
    }

    println!(
        "civic queue\n  Source: {}\n  Hide threshold: {}",
        source_label(&source),
        moderation.hide_threshold()
    );
    println!("  Flagged: {}", flagged.len());
    for issue in &flagged {
        println!("  {}", issue_line(issue));
    }
    println!("  Hidden: {}", hidden.len());
    for issue in &hidden {
        println!("  {}", issue_line(issue));
    }
}
