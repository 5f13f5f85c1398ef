use crate::cli::SourceArgs;
use crate::support::{
    issue_line, issue_row, load_store_or_exit, parse_or_exit, print_json, source_label,
};
use civic_store::{
    Category, DistanceBand, Issue, IssueFilter, Status, TracingSink, sort_newest_first,
};
use serde_json::json;
use std::sync::Arc;

pub struct Args {
    pub source: SourceArgs,
    pub all: bool,
    pub reporter: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub within: Option<String>,
    pub json: bool,
}

pub fn run(args: Args) {
    let store = load_store_or_exit(&args.source, Arc::new(TracingSink));
    let filter = IssueFilter {
        search: args.search,
        category: args.category.as_deref().map(parse_or_exit::<Category>),
        status: args.status.as_deref().map(parse_or_exit::<Status>),
        within: args.within.as_deref().map(parse_or_exit::<DistanceBand>),
    };

    let registry = store.registry();
    let base = match (args.reporter.as_deref(), args.all) {
        (Some(reporter), true) => registry.list_by_reporter(reporter),
        (Some(reporter), false) => registry.list_visible_by_reporter(reporter),
        (None, true) => registry.list_all(),
        (None, false) => registry.list_visible(),
    };
    let mut rows: Vec<&Issue> = filter.apply(base);
    sort_newest_first(&mut rows);

    if args.json {
        let items = rows.iter().map(|issue| issue_row(issue)).collect::<Vec<_>>();
        let payload = json!({
            "action": "list",
            "source": source_label(&args.source),
            "includeHidden": args.all,
            "count": items.len(),
            "items": items
        });
        print_json(&payload);
    } else {
        println!(
            "civic list\n  Source: {}\n  Count: {}",
            source_label(&args.source),
            rows.len()
        );
        for issue in rows {
            println!("{}", issue_line(issue));
        }
    }
}
