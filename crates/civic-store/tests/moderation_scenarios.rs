//! Integration tests: lifecycle and moderation properties through the
//! public API only.

use civic_store::{
    Actor, Analytics, Category, CivicStore, IssueId, IssuePatch, NewIssue, NotificationKind,
    MAX_ISSUE_ID, NotificationLog, Recipient, SpamOutcome, Status, StoreConfig, StoreError,
    read_issues, seed_store,
};
use std::sync::Arc;

fn store_with_log() -> (CivicStore, Arc<NotificationLog>) {
    let log = Arc::new(NotificationLog::new());
    let store = CivicStore::new(StoreConfig::default(), log.clone());
    (store, log)
}

fn streetlight() -> NewIssue {
    NewIssue::new(
        "Broken Streetlight",
        "Lamp out on the corner",
        Category::Lighting,
        "123 Main St",
        "carol",
    )
}

#[test]
fn broken_streetlight_scenario() {
    let (mut store, log) = store_with_log();
    let issue = store.registry_mut().create(streetlight());
    let id = issue.id;

    let analytics = |store: &CivicStore| store.analytics();
    assert_eq!(analytics(&store).hidden_count, 0);

    assert_eq!(
        store.moderation_mut().report_spam(id, "a"),
        SpamOutcome::Accepted {
            report_count: 1,
            auto_hidden: false
        }
    );
    assert_eq!(
        store.moderation_mut().report_spam(id, "b"),
        SpamOutcome::Accepted {
            report_count: 2,
            auto_hidden: false
        }
    );
    assert!(store.registry().get(id).expect("exists").is_visible());

    assert_eq!(
        store.moderation_mut().report_spam(id, "c"),
        SpamOutcome::Accepted {
            report_count: 3,
            auto_hidden: true
        }
    );
    assert!(store.registry().list_visible().is_empty());
    assert_eq!(store.registry().list_all().len(), 1);
    assert_eq!(analytics(&store).hidden_count, 1);

    let notices = log.all();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, NotificationKind::Warning);
    assert_eq!(notices[0].recipient, Recipient::Admins);
    assert!(notices[0].message.contains("Broken Streetlight"));
    assert_eq!(log.for_actor(&Actor::admin("admin")).len(), 1);
    assert!(log.for_actor(&Actor::user("carol")).is_empty());

    assert!(store.moderation_mut().unhide(id));
    let restored = store.registry().get(id).expect("exists");
    assert!(restored.is_visible());
    assert_eq!(restored.spam_report_count(), 0);
    assert_eq!(analytics(&store).hidden_count, 0);
}

#[test]
fn flagging_is_idempotent_per_reporter() {
    let (mut store, log) = store_with_log();
    let id = store.registry_mut().create(streetlight()).id;

    store.moderation_mut().report_spam(id, "a");
    for _ in 0..5 {
        assert_eq!(
            store.moderation_mut().report_spam(id, "a"),
            SpamOutcome::AlreadyReported
        );
    }
    let issue = store.registry().get(id).expect("exists");
    assert_eq!(issue.spam_report_count(), 1);
    assert!(!issue.is_hidden);
    assert!(log.is_empty());
}

#[test]
fn unhide_resets_history_so_threshold_counts_again() {
    let (mut store, log) = store_with_log();
    let id = store.registry_mut().create(streetlight()).id;
    for reporter in ["a", "b", "c"] {
        store.moderation_mut().report_spam(id, reporter);
    }
    assert!(store.moderation_mut().unhide(id));

    // Previous reporters may flag again after a reset.
    for reporter in ["a", "b"] {
        assert!(store.moderation_mut().report_spam(id, reporter).is_accepted());
    }
    assert!(store.registry().get(id).expect("exists").is_visible());
    assert!(matches!(
        store.moderation_mut().report_spam(id, "c"),
        SpamOutcome::Accepted {
            auto_hidden: true,
            ..
        }
    ));
    assert_eq!(log.len(), 2);
}

#[test]
fn flag_on_unknown_issue_is_not_found() {
    let (mut store, _) = store_with_log();
    assert_eq!(
        store.moderation_mut().report_spam(IssueId(404), "a"),
        SpamOutcome::NotFound
    );
}

#[test]
fn create_then_get_round_trips_fields() {
    let (mut store, _) = store_with_log();
    let input = streetlight()
        .with_distance(0.5)
        .with_image("/brokenstreetlight.webp")
        .with_coordinates(40.7128, -74.006);
    let created = store.registry_mut().create(input.clone());

    let fetched = store.registry().get(created.id).expect("exists");
    assert_eq!(fetched, &created);
    assert_eq!(fetched.title, input.title);
    assert_eq!(fetched.status, Status::Reported);
    assert!(fetched.spam_reports.is_empty());
    assert!(!fetched.is_hidden);
}

#[test]
fn visibility_filter_preserves_insertion_order() {
    let (mut store, _) = store_with_log();
    let ids: Vec<IssueId> = ["first", "second", "third", "fourth"]
        .into_iter()
        .map(|title| {
            store
                .registry_mut()
                .create(NewIssue::new(title, "d", Category::Roads, "a", "r"))
                .id
        })
        .collect();
    store.moderation_mut().hide(ids[1]);

    let visible: Vec<&str> = store
        .registry()
        .list_visible()
        .iter()
        .map(|issue| issue.title.as_str())
        .collect();
    assert_eq!(visible, vec!["first", "third", "fourth"]);
    assert_eq!(store.registry().list_all().len(), 4);
}

#[test]
fn analytics_sums_match_total_on_seed_data() {
    let mut store = CivicStore::default();
    seed_store(&mut store).expect("seed should load");

    let analytics = store.analytics();
    assert_eq!(analytics.total_issues, 6);
    assert_eq!(analytics.category_stats.values().sum::<usize>(), 6);
    assert_eq!(analytics.status_stats.values().sum::<usize>(), 6);
    assert_eq!(analytics.reporter_stats.get("system"), Some(&6));
    assert_eq!(analytics.resolved_count, 1);
    assert_eq!(analytics.pending_count, 3);
    assert_eq!(analytics.resolution_percent(), 17);
    // Every category appears once; the first encountered wins the tie.
    assert_eq!(analytics.most_reported_category, Some(Category::Lighting));
}

#[test]
fn empty_store_analytics_use_sentinels() {
    let analytics = Analytics::from_issues(CivicStore::default().registry().issues());
    assert_eq!(analytics.total_issues, 0);
    assert_eq!(analytics.most_reported_category, None);
    assert_eq!(analytics.most_reported_label(), "None");
    assert_eq!(analytics.resolution_rate(), 0.0);
}

#[test]
fn resolved_issue_can_be_reopened_under_default_policy() {
    let (mut store, _) = store_with_log();
    let admin = Actor::admin("admin");
    let id = store.registry_mut().create(streetlight()).id;

    assert_eq!(store.change_status(&admin, id, Status::Resolved), Ok(true));
    assert_eq!(store.change_status(&admin, id, Status::Reported), Ok(true));
    assert_eq!(
        store.registry().get(id).map(|issue| issue.status),
        Some(Status::Reported)
    );
}

#[test]
fn update_patch_leaves_moderation_state_alone() {
    let (mut store, _) = store_with_log();
    let id = store.registry_mut().create(streetlight()).id;
    store.moderation_mut().report_spam(id, "a");

    let patch = IssuePatch {
        title: Some("Streetlight still broken".to_string()),
        category: Some(Category::PublicSafety),
        ..IssuePatch::default()
    };
    assert!(store.registry_mut().update(id, patch));
    assert!(!store.registry_mut().update(IssueId(99), IssuePatch::default()));

    let issue = store.registry().get(id).expect("exists");
    assert_eq!(issue.title, "Streetlight still broken");
    assert_eq!(issue.category, Category::PublicSafety);
    assert_eq!(issue.spam_report_count(), 1);
}

#[test]
fn deleted_ids_are_not_reused() {
    let (mut store, _) = store_with_log();
    let first = store.registry_mut().create(streetlight()).id;
    assert!(store.registry_mut().delete(first));
    assert!(!store.registry_mut().delete(first));

    let second = store.registry_mut().create(streetlight()).id;
    assert_ne!(first, second);
    assert!(store.registry().get(first).is_none());
}

#[test]
fn unknown_user_ban_is_silent() {
    let mut store = CivicStore::default();
    let admin = Actor::admin("admin");
    assert_eq!(store.ban_user(&admin, "nobody"), Ok(false));
    assert!(store.directory().get("nobody").is_none());
    assert!(store.directory().is_empty());
}

#[test]
fn lookalike_admin_email_cannot_take_over_admin() {
    let mut store = CivicStore::default();
    seed_store(&mut store).expect("seed should load");
    store.sign_in("victim@example.com").expect("victim signs in");

    let err = store
        .sign_in("admin@evil.example")
        .expect_err("lookalike admin email must fail");
    assert!(matches!(err, StoreError::Forbidden { .. }));

    let real = store.sign_in("ADMIN@civictrack.com").expect("admin signs in");
    assert_eq!(real, Actor::admin("admin"));
    assert_eq!(store.ban_user(&real, "victim"), Ok(true));
    assert!(store.directory().get("ADMIN").is_none());
}

#[test]
fn ingesting_max_id_is_rejected_and_create_still_works() {
    let line = |id: u64| {
        format!(
            r#"{{"id":{id},"title":"Edge","description":"d","category":"Roads","status":"Reported","address":"a","reportedDate":"2024-01-15","reportedTime":"14:30","reportedBy":"r","distance":"0.5"}}"#
        )
    };
    let (mut store, _) = store_with_log();

    let huge = read_issues(line(u64::MAX).as_bytes()).expect("valid jsonl");
    let err = store.ingest_issues(huge).expect_err("u64::MAX id must fail");
    assert!(matches!(err, StoreError::InvalidInput(_)));
    assert!(store.registry().is_empty());

    let last = read_issues(line(MAX_ISSUE_ID).as_bytes()).expect("valid jsonl");
    assert_eq!(store.ingest_issues(last), Ok(1));
    let created = store.registry_mut().create(streetlight());
    assert_eq!(created.id, IssueId(MAX_ISSUE_ID + 1));
    assert_eq!(store.registry().list_all().len(), 2);
}
