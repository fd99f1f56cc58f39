mod common;

use common::*;
use show_sync_import::policy::UpdatePolicy;
use show_sync_import::shows::{SEASON_ICON, ShowSync};
use show_sync_notion::PropertyValue;

const SHOWS_DB: &str = "shows-db";
const SEASONS_DB: &str = "seasons-db";

fn sync<'a>(
    provider: &'a FakeShowProvider,
    store: &'a FakeStore,
) -> ShowSync<'a, FakeShowProvider, FakeStore> {
    ShowSync::new(provider, store, SHOWS_DB, SEASONS_DB)
        .with_policy(UpdatePolicy::with_today(date("2024-06-10")))
}

fn select_name(value: &PropertyValue) -> Option<&str> {
    match value {
        PropertyValue::Select { select } => select.as_ref().map(|option| option.name.as_str()),
        other => panic!("expected a select, got {other:?}"),
    }
}

#[test]
fn updates_the_show_and_reconciles_existing_and_missing_seasons() {
    let store = FakeStore::new();
    store.seed_db(
        SHOWS_DB,
        vec![show_page("show-1", "tt0000001", Some("Update"), Some("2024-06-09"))],
    );
    store.seed_db(
        SEASONS_DB,
        vec![
            season_page("season-1", "Season 1", "show-1"),
            season_page("season-2", "Season 2", "show-1"),
            season_page("season-3", "Season 3", "show-1"),
        ],
    );
    store.set_create_template(SEASONS_DB, season_page("schema", "", ""));
    let provider = FakeShowProvider::new();
    provider.insert(show_entity("tt0000001", "Dark", 5));

    let report = sync(&provider, &store).run(&[]).unwrap();

    assert!(report.succeeded());
    assert_eq!(report.stats().updated, 1);
    assert_eq!(report.stats().seasons_updated, 3);
    assert_eq!(report.stats().seasons_created, 2);

    // Show first, then seasons in ascending order; the two creates are
    // followed by their own full update.
    let touched: Vec<String> = store
        .updated
        .borrow()
        .iter()
        .map(|update| update.page_id.clone())
        .collect();
    assert_eq!(
        touched,
        ["show-1", "season-1", "season-2", "season-3", "created-1", "created-2"]
    );

    let created = store.created.borrow();
    assert_eq!(created.len(), 2);
    assert_eq!(created[0].database_id, SEASONS_DB);
    assert_eq!(created[0].icon.as_deref(), Some(SEASON_ICON));
    match &created[0].properties["Season Index"] {
        PropertyValue::Title { title } => assert_eq!(title[0].plain_text, "Season 4"),
        other => panic!("expected a title, got {other:?}"),
    }
    match &created[1].properties["Season Index"] {
        PropertyValue::Title { title } => assert_eq!(title[0].plain_text, "Season 5"),
        other => panic!("expected a title, got {other:?}"),
    }
}

#[test]
fn manual_update_resets_the_hint_and_wipes_old_errors() {
    let store = FakeStore::new();
    store.seed_db(
        SHOWS_DB,
        vec![show_page("show-1", "tt0000001", Some("Update"), Some("2024-06-09"))],
    );
    store.seed_db(SEASONS_DB, Vec::new());
    let provider = FakeShowProvider::new();
    provider.insert(show_entity("tt0000001", "Dark", 0));

    sync(&provider, &store).run(&[]).unwrap();

    // A manual hint is fresh, so the provider cache is honored.
    assert_eq!(provider.fetches.borrow().as_slice(), [("tt0000001".to_string(), false)]);

    let updates = store.updates_for("show-1");
    assert_eq!(updates.len(), 1);
    let payload = &updates[0].properties;
    assert_eq!(
        select_name(&payload["[IMPORT] Next Import Hint"]),
        Some("Check Status")
    );
    match &payload["[IMPORT] Errors"] {
        PropertyValue::RichText { rich_text } => assert!(rich_text.is_empty()),
        other => panic!("expected rich text, got {other:?}"),
    }
    match &payload["Number of Seasons"] {
        PropertyValue::Number { number } => assert_eq!(*number, Some(0.0)),
        other => panic!("expected a number, got {other:?}"),
    }
    // Embedded commas never reach multi-select options.
    match &payload["Cast"] {
        PropertyValue::MultiSelect { multi_select } => {
            let names: Vec<&str> = multi_select.iter().map(|option| option.name.as_str()).collect();
            assert_eq!(names, ["Lead Jr.", "Support"]);
        }
        other => panic!("expected a multi-select, got {other:?}"),
    }
}

#[test]
fn automated_refresh_bypasses_the_cache_and_keeps_the_hint() {
    let store = FakeStore::new();
    store.seed_db(
        SHOWS_DB,
        vec![show_page("show-1", "tt0000001", Some("Automate"), Some("2024-06-01"))],
    );
    store.seed_db(SEASONS_DB, Vec::new());
    let provider = FakeShowProvider::new();
    provider.insert(show_entity("tt0000001", "Dark", 0));

    let report = sync(&provider, &store).run(&[]).unwrap();

    assert_eq!(report.stats().updated, 1);
    assert_eq!(provider.fetches.borrow().as_slice(), [("tt0000001".to_string(), true)]);
    let updates = store.updates_for("show-1");
    assert!(
        !updates[0].properties.contains_key("[IMPORT] Next Import Hint"),
        "an interval refresh must leave the hint alone"
    );
}

#[test]
fn parked_rows_are_fetched_but_never_written() {
    let store = FakeStore::new();
    store.seed_db(
        SHOWS_DB,
        vec![show_page("show-1", "tt0000001", Some("Check Status"), Some("2024-06-09"))],
    );
    store.seed_db(SEASONS_DB, Vec::new());
    let provider = FakeShowProvider::new();
    provider.insert(show_entity("tt0000001", "Dark", 3));

    let report = sync(&provider, &store).run(&[]).unwrap();

    assert_eq!(report.stats().skipped, 1);
    assert_eq!(report.stats().updated, 0);
    assert_eq!(report.stats().seasons_created, 0);
    assert_eq!(provider.fetches.borrow().len(), 1);
    assert!(store.updated.borrow().is_empty());
    assert!(store.created.borrow().is_empty());
}

#[test]
fn one_failing_fetch_does_not_stop_the_others() {
    let store = FakeStore::new();
    store.seed_db(
        SHOWS_DB,
        vec![
            show_page("show-1", "tt0000001", Some("Update"), Some("2024-06-09")),
            show_page("show-2", "tt0000002", Some("Update"), Some("2024-06-09")),
            show_page("show-3", "tt0000003", Some("Update"), Some("2024-06-09")),
        ],
    );
    store.seed_db(SEASONS_DB, Vec::new());
    let provider = FakeShowProvider::new();
    provider.insert(show_entity("tt0000001", "First", 0));
    provider.fail("tt0000002");
    provider.insert(show_entity("tt0000003", "Third", 0));

    let report = sync(&provider, &store).run(&[]).unwrap();

    assert!(!report.succeeded());
    assert_eq!(report.errors(), ["No entity found for IMDB ID: tt0000002"]);
    assert_eq!(report.stats().updated, 2);
    assert_eq!(report.stats().failed, 1);

    // The failure is parked on the row itself with a fresh import date.
    let updates = store.updates_for("show-2");
    assert_eq!(updates.len(), 1);
    match &updates[0].properties["[IMPORT] Errors"] {
        PropertyValue::RichText { rich_text } => {
            assert_eq!(rich_text[0].plain_text, "No entity found for IMDB ID: tt0000002");
        }
        other => panic!("expected rich text, got {other:?}"),
    }
    match &updates[0].properties["[IMPORT] Last Import Date"] {
        PropertyValue::Date { date } => {
            assert_eq!(date.as_ref().map(|d| d.start.as_str()), Some("2024-06-10"));
        }
        other => panic!("expected a date, got {other:?}"),
    }
}

#[test]
fn requested_ids_limit_the_run_and_unknown_ids_are_reported() {
    let store = FakeStore::new();
    store.seed_db(
        SHOWS_DB,
        vec![
            show_page("show-1", "tt0000001", Some("Update"), Some("2024-06-09")),
            show_page("show-2", "tt0000002", Some("Update"), Some("2024-06-09")),
        ],
    );
    store.seed_db(SEASONS_DB, Vec::new());
    let provider = FakeShowProvider::new();
    provider.insert(show_entity("tt0000001", "First", 0));
    provider.insert(show_entity("tt0000002", "Second", 0));

    let input = vec!["tt0000001".to_string(), "tt9999999".to_string()];
    let report = sync(&provider, &store).run(&input).unwrap();

    assert_eq!(provider.fetches.borrow().len(), 1);
    assert_eq!(store.updates_for("show-1").len(), 1);
    assert!(store.updates_for("show-2").is_empty());
    assert_eq!(report.invalid_ids(), ["tt9999999"]);
    assert!(!report.succeeded());
    let lines = report.render("IMDB IDs: tt0000001, tt9999999");
    assert_eq!(lines[0], "Failed to update IMDB IDs: tt0000001, tt9999999");
    assert_eq!(lines.last().unwrap(), "Invalid IMDB IDs: [tt9999999]");
}

#[test]
fn rows_without_an_imdb_id_are_left_alone() {
    let store = FakeStore::new();
    store.seed_db(SHOWS_DB, vec![show_page("show-1", "   ", Some("Update"), None)]);
    store.seed_db(SEASONS_DB, Vec::new());
    let provider = FakeShowProvider::new();

    let report = sync(&provider, &store).run(&[]).unwrap();

    assert!(report.succeeded());
    assert!(provider.fetches.borrow().is_empty());
    assert!(store.updated.borrow().is_empty());
}

#[test]
fn season_rows_of_unknown_shows_are_ignored() {
    let store = FakeStore::new();
    store.seed_db(
        SHOWS_DB,
        vec![show_page("show-1", "tt0000001", Some("Update"), Some("2024-06-09"))],
    );
    store.seed_db(
        SEASONS_DB,
        vec![
            season_page("season-1", "Season 1", "show-1"),
            season_page("stray", "Season 1", "someone-else"),
        ],
    );
    let provider = FakeShowProvider::new();
    provider.insert(show_entity("tt0000001", "Dark", 1));

    sync(&provider, &store).run(&[]).unwrap();

    assert_eq!(store.updates_for("season-1").len(), 1);
    assert!(store.updates_for("stray").is_empty());
}

#[test]
fn a_failed_show_write_still_reconciles_seasons() {
    let store = FakeStore::new();
    store.seed_db(
        SHOWS_DB,
        vec![show_page("show-1", "tt0000001", Some("Update"), Some("2024-06-09"))],
    );
    store.seed_db(SEASONS_DB, Vec::new());
    store.set_create_template(SEASONS_DB, season_page("schema", "", ""));
    store.fail_updates_for("show-1");
    let provider = FakeShowProvider::new();
    provider.insert(show_entity("tt0000001", "Dark", 1));

    let report = sync(&provider, &store).run(&[]).unwrap();

    assert_eq!(report.stats().failed, 1);
    assert_eq!(report.stats().seasons_created, 1);
    assert_eq!(report.errors().len(), 1);
    assert!(report.errors()[0].starts_with("Failed to update Notion row for IMDB ID tt0000001:"));

    // The season landed even though the show row refused every write.
    let created = store.created.borrow();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].database_id, SEASONS_DB);
}

#[test]
fn new_seasons_start_as_not_started_and_updates_never_touch_watch_status() {
    let store = FakeStore::new();
    store.seed_db(
        SHOWS_DB,
        vec![show_page("show-1", "tt0000001", Some("Update"), Some("2024-06-09"))],
    );
    store.seed_db(SEASONS_DB, vec![season_page("season-1", "Season 1", "show-1")]);
    store.set_create_template(SEASONS_DB, season_page("schema", "", ""));
    let provider = FakeShowProvider::new();
    provider.insert(show_entity("tt0000001", "Dark", 2));

    sync(&provider, &store).run(&[]).unwrap();

    let existing = store.updates_for("season-1");
    assert!(
        !existing[0].properties.contains_key("Watch Status"),
        "watch progress belongs to the person, not the sync"
    );

    let fresh = store.updates_for("created-1");
    assert_eq!(fresh.len(), 1);
    assert_eq!(select_name(&fresh[0].properties["Watch Status"]), Some("Not Started"));
    // The season backdrop is the show's, labeled for the season.
    match &fresh[0].properties["Backdrop"] {
        PropertyValue::Files { files } => assert_eq!(files[0].name, "Poster for Dark Season 2"),
        other => panic!("expected files, got {other:?}"),
    }
}
