use crate::cli::SourceArgs;
use crate::support::{fail, load_store_or_exit, parse_or_exit, print_json, to_json_or_exit};
use civic_store::{IssueId, TracingSink};
use serde_json::json;
use std::sync::Arc;

pub fn run(id: String, source: SourceArgs, json_output: bool) {
    let issue_id: IssueId = parse_or_exit(&id);
    let store = load_store_or_exit(&source, Arc::new(TracingSink));
    let Some(issue) = store.registry().get(issue_id) else {
        fail(format!("issue not found: {issue_id}"));
    };

    if json_output {
        let payload = json!({
            "action": "show",
            "issue": to_json_or_exit(issue),
            "reportedDate": issue.reported_date().to_string(),
            "reportedTime": issue.reported_time()
        });
        print_json(&payload);
        return;
    }

    println!("#{} {}", issue.id, issue.title);
    println!("  Status: {}", issue.status);
    println!("  Category: {}", issue.category);
    println!("  Address: {}", issue.address);
    if let Some(coordinates) = &issue.coordinates {
        println!("  Coordinates: {}, {}", coordinates.lat, coordinates.lng);
    }
    println!("  Distance: {} km", issue.distance);
    println!(
        "  Reported: {} {} by {}",
        issue.reported_date(),
        issue.reported_time(),
        issue.reported_by
    );
    if let Some(image) = &issue.image {
        println!("  Image: {image}");
    }
    println!("  Spam reports: {}", issue.spam_report_count());
    println!("  Hidden: {}", if issue.is_hidden { "yes" } else { "no" });
    println!();
    println!("{}", issue.description);
}
