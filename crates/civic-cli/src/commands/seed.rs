use crate::support::{fail, issue_row, print_json};
use civic_store::{ADMIN_EMAIL, ADMIN_USERNAME, seed_issues, write_issues};
use serde_json::json;
use std::io::Write;

pub fn run(json_output: bool) {
    let issues = seed_issues().unwrap_or_else(|e| fail(format!("seed data is invalid: {e}")));

    if json_output {
        let items = issues.iter().map(issue_row).collect::<Vec<_>>();
        let payload = json!({
            "action": "seed",
            "admin": {
                "username": ADMIN_USERNAME,
                "email": ADMIN_EMAIL
            },
            "count": items.len(),
            "items": items
        });
        print_json(&payload);
    } else {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        write_issues(&mut out, &issues).unwrap_or_else(|e| fail(e));
        out.flush().unwrap_or_else(|e| fail(e));
    }
}
