use std::sync::Arc;

use entryfill_cli::AutofillEngine;
use learning_engine::Pattern;
use page_model::{MemoryPage, Page, PageSnapshot, SnapshotElement};
use pattern_store::{MemoryPatternStore, PatternStore};
use profile_model::Profile;
use serde_json::json;

fn labelled(label: &str, control: SnapshotElement) -> SnapshotElement {
    SnapshotElement::new("div")
        .child(SnapshotElement::new("span").text(label))
        .child(control)
}

fn pref_select(name: &str) -> SnapshotElement {
    SnapshotElement::new("select")
        .attr("name", name)
        .child(SnapshotElement::option("", "選択してください"))
        .child(SnapshotElement::option("01", "北海道"))
        .child(SnapshotElement::option("13", "東京都"))
        .child(SnapshotElement::option("27", "大阪府"))
}

fn entry_page() -> MemoryPage {
    MemoryPage::from_snapshot(
        &PageSnapshot::new("https://careers.example.test/apply")
            .node(labelled("氏名（姓）", SnapshotElement::input("text").attr("name", "f1")))
            .node(
                SnapshotElement::new("div")
                    .child(SnapshotElement::new("span").text("郵便番号"))
                    .child(SnapshotElement::input("text").attr("name", "z1").attr("maxlength", "3"))
                    .child(SnapshotElement::input("text").attr("name", "z2").attr("maxlength", "4")),
            )
            .node(labelled("都道府県", pref_select("p1"))),
    )
}

fn profile() -> Profile {
    Profile::from_value(json!({
        "kanji_sei": "山田",
        "tel": { "mobile": "09012345678" },
        "address": { "current": { "postal": "1234567", "pref": "東京都" } }
    }))
    .unwrap()
}

fn value(page: &MemoryPage, name: &str) -> Option<String> {
    page.value_of(page.by_name(name).unwrap())
}

#[test]
fn heuristic_fill_writes_name_postal_pair_and_prefecture() {
    let engine = AutofillEngine::default();
    let page = entry_page();
    let shared: Arc<dyn Page> = Arc::new(page.clone());

    let report = engine.fill(shared, &profile(), &Pattern::heuristic_default());

    assert_eq!(value(&page, "f1").as_deref(), Some("山田"));
    assert_eq!(value(&page, "z1").as_deref(), Some("123"));
    assert_eq!(value(&page, "z2").as_deref(), Some("4567"));
    assert_eq!(value(&page, "p1").as_deref(), Some("13"));
    assert_eq!(report.filled_count, 4);
    assert_eq!(report.adapter, "heuristic");
}

#[test]
fn second_fill_changes_nothing() {
    let engine = AutofillEngine::default();
    let page = entry_page();
    let first = engine.fill(Arc::new(page.clone()), &profile(), &Pattern::heuristic_default());
    let after_first = page.snapshot();

    let second = engine.fill(Arc::new(page.clone()), &profile(), &Pattern::heuristic_default());

    assert_eq!(first.filled_count, 4);
    assert_eq!(second.filled_count, 0);
    assert_eq!(page.snapshot(), after_first);
}

#[test]
fn manual_edits_survive_a_fill() {
    let engine = AutofillEngine::default();
    let page = MemoryPage::from_snapshot(
        &PageSnapshot::new("https://careers.example.test/apply")
            .node(labelled("氏名（姓）", SnapshotElement::input("text").attr("name", "f1").value("佐藤"))),
    );

    let report = engine.fill(Arc::new(page.clone()), &profile(), &Pattern::heuristic_default());

    assert_eq!(value(&page, "f1").as_deref(), Some("佐藤"));
    assert_eq!(report.filled_count, 0);
}

fn site_page(filled: bool) -> MemoryPage {
    let text = |name: &str, filled_value: &str| {
        let input = SnapshotElement::input("text").attr("name", name);
        if filled {
            input.value(filled_value)
        } else {
            input
        }
    };
    let mut select = SnapshotElement::new("select")
        .attr("name", "q7")
        .child(SnapshotElement::option("", "-"));
    select = if filled {
        select.child(SnapshotElement::option("13", "東京都").attr("selected", ""))
    } else {
        select.child(SnapshotElement::option("13", "東京都"))
    };
    MemoryPage::from_snapshot(
        &PageSnapshot::new("https://jobs.example.test/form")
            .node(text("q1", "山田"))
            .node(text("q2", "taro@example.test"))
            .node(select),
    )
}

#[tokio::test]
async fn learned_pattern_replays_through_the_store() {
    let engine = AutofillEngine::default();
    let profile = Profile::from_value(json!({
        "kanji_sei": "山田",
        "email": { "primary": "taro@example.test" },
        "address": { "current": { "pref": "東京都" } }
    }))
    .unwrap();

    let report = engine.learn(&site_page(true), &profile, "jobs");
    assert!(report.is_learned());
    assert_eq!(report.match_count, 3);

    let store = MemoryPatternStore::new();
    store.set("jobs", report.pattern.clone()).await.unwrap();
    let pattern = store.get("jobs").await.unwrap().unwrap();

    let blank = site_page(false);
    let fill = engine.fill(Arc::new(blank.clone()), &profile, &pattern);

    assert_eq!(value(&blank, "q1").as_deref(), Some("山田"));
    assert_eq!(value(&blank, "q2").as_deref(), Some("taro@example.test"));
    assert_eq!(value(&blank, "q7").as_deref(), Some("13"));
    assert_eq!(fill.pattern.as_deref(), Some("jobs"));
    assert!(fill.issues.is_empty());
}

#[test]
fn learning_an_untouched_page_asks_for_a_manual_pass() {
    let engine = AutofillEngine::default();
    let report = engine.learn(&site_page(false), &profile(), "jobs");
    assert!(!report.is_learned());
    assert_eq!(report.match_count, 0);
}

#[test]
fn malformed_import_keeps_the_stored_pattern() {
    let store = MemoryPatternStore::new();
    tokio_test::block_on(async {
        store
            .import("jobs", r#"{ "mapping": {}, "learned_fields": [] }"#)
            .await
            .unwrap();

        assert!(store.import("jobs", "{ not json").await.is_err());
        assert!(store.get("jobs").await.unwrap().is_some());
    });
}

#[test]
fn inspect_lists_data_controls() {
    let engine = AutofillEngine::default();
    let controls = engine.inspect(&entry_page());
    assert_eq!(controls.len(), 4);
}
