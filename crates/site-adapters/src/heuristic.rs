use std::collections::HashSet;
use std::sync::Arc;

use entryfill_core_types::{ControlKind, EngineIssue, FieldValue};
use fill_engine::FillSession;
use heuristic_finder::{find_detailed, name_contains, FinderFilter};
use page_model::{NodeId, Page};
use profile_model::{flatten, get_by_path, Profile};
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::adapter::{FillContext, SiteAdapter};
use crate::keywords::{KeywordField, KeywordTable, Section};
use crate::report::{FillReport, FillRun};
use crate::signature::PageSignature;

pub const HEURISTIC_ADAPTER: &str = "heuristic";

/// Default adapter: keyword table first, then a name-contains guess from
/// each flattened key's last segment.
#[derive(Clone, Debug)]
pub struct HeuristicAdapter {
    table: Arc<KeywordTable>,
}

impl Default for HeuristicAdapter {
    fn default() -> Self {
        Self::new(KeywordTable::builtin())
    }
}

impl HeuristicAdapter {
    pub fn new(table: KeywordTable) -> Self {
        Self {
            table: Arc::new(table),
        }
    }

    pub fn table(&self) -> &KeywordTable {
        &self.table
    }

    /// Best unclaimed control for `path`, with an ambiguity issue when the
    /// winning keyword set matched more than one control.
    pub(crate) fn locate(&self, page: &dyn Page, path: &str, run: &FillRun) -> Option<(NodeId, Option<EngineIssue>)> {
        let generic = generic_path(path);
        for field in self.table.for_path(&generic) {
            for filter in field.filters() {
                let filter = filter.exclude(run.claimed().iter().copied());
                let finding = find_detailed(page, path, &field.sets, &filter);
                if let Some(node) = finding.node {
                    if !run.is_claimed(page, node) {
                        return Some((node, finding.issue(path)));
                    }
                }
            }
        }
        let fragment = path.rsplit('.').next().unwrap_or(path);
        let filter = FinderFilter::none()
            .kinds(&[ControlKind::Text, ControlKind::Select, ControlKind::SplitSegment])
            .exclude(run.claimed().iter().copied());
        name_contains(page, fragment, &filter)
            .filter(|node| !run.is_claimed(page, *node))
            .map(|node| {
                debug!(field = path, fragment, ?node, "name-contains fallback");
                (node, None)
            })
    }

    /// Fills every table entry, then every remaining leaf by name, one
    /// section at a time.
    pub(crate) fn fill_run(&self, page: &dyn Page, profile: &Profile, run: &mut FillRun) {
        let flat = flatten(profile);
        let mut handled: HashSet<String> = HashSet::new();

        for section in Section::ORDER {
            for field in self.table.section(section) {
                if !field.enabled_for(profile) {
                    debug!(field = %field.path, "entry switched off by profile flag");
                    continue;
                }
                let Some(value) = lookup(profile, &field.path) else {
                    continue;
                };
                if let Some(path) = self.fill_entry(page, field, &value, run) {
                    handled.insert(path);
                }
            }

            for (path, value) in flat.iter() {
                if Section::of_path(path) != section || value.is_empty() {
                    continue;
                }
                let generic = generic_path(path);
                if handled.contains(&generic) || self.table.covers(&generic) {
                    continue;
                }
                if matches!(value, FieldValue::Flag(_)) {
                    continue;
                }
                let fragment = path.rsplit('.').next().unwrap_or(path);
                let filter = FinderFilter::none()
                    .kinds(&[ControlKind::Text, ControlKind::Select, ControlKind::SplitSegment])
                    .exclude(run.claimed().iter().copied());
                if let Some(node) = name_contains(page, fragment, &filter) {
                    if run.is_claimed(page, node) {
                        continue;
                    }
                    debug!(field = %path, fragment, ?node, "name-contains fallback");
                    run.apply(page, path, &[node], value);
                    handled.insert(generic);
                }
            }
        }
    }

    fn fill_entry(
        &self,
        page: &dyn Page,
        field: &KeywordField,
        value: &FieldValue,
        run: &mut FillRun,
    ) -> Option<String> {
        for filter in field.filters() {
            let filter = filter.exclude(run.claimed().iter().copied());
            let finding = find_detailed(page, &field.path, &field.sets, &filter);
            let Some(node) = finding.node else { continue };
            if run.is_claimed(page, node) {
                continue;
            }
            if let Some(issue) = finding.issue(&field.path) {
                run.issue(issue);
            }
            run.apply(page, &field.path, &[node], value);
            return Some(field.path.clone());
        }
        None
    }
}

impl SiteAdapter for HeuristicAdapter {
    fn name(&self) -> &str {
        HEURISTIC_ADAPTER
    }

    fn matches(&self, _signature: &PageSignature) -> bool {
        true
    }

    #[instrument(skip_all, fields(adapter = HEURISTIC_ADAPTER, page = %page.page_id()))]
    fn fill(&self, page: &Arc<dyn Page>, profile: &Profile, ctx: &FillContext) -> FillReport {
        let mut run = FillRun::new(FillSession::new(ctx.policy.clone()));
        if ctx.policy.enabled {
            self.fill_run(page.as_ref(), profile, &mut run);
        }
        let report = run.finish(HEURISTIC_ADAPTER, None, None);
        info!(filled = report.filled_count, issues = report.issues.len(), "heuristic fill finished");
        report
    }
}

/// Drops array indices so `school.0.dname` finds the `school.dname` entry.
fn generic_path(path: &str) -> String {
    path.split('.')
        .filter(|segment| segment.parse::<usize>().is_err())
        .collect::<Vec<_>>()
        .join(".")
}

/// Value for a table path; an array along the way contributes its first
/// entry holding a value.
pub(crate) fn lookup(profile: &Profile, path: &str) -> Option<FieldValue> {
    if let Some(value) = get_by_path(profile, path).filter(|value| !value.is_empty()) {
        return Some(value);
    }
    let (root, rest) = path.split_once('.')?;
    let Some(Value::Array(items)) = profile.raw(root) else {
        return None;
    };
    (0..items.len()).find_map(|index| {
        get_by_path(profile, &format!("{root}.{index}.{rest}")).filter(|value| !value.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use page_model::{MemoryPage, PageSnapshot, SnapshotElement};
    use serde_json::json;

    fn labelled(label: &str, control: SnapshotElement) -> SnapshotElement {
        SnapshotElement::new("div")
            .child(SnapshotElement::new("span").text(label))
            .child(control)
    }

    fn pref_select(name: &str) -> SnapshotElement {
        let mut select = SnapshotElement::new("select")
            .attr("name", name)
            .child(SnapshotElement::option("", "選択してください"));
        for pref in heuristic_finder::PREFECTURES {
            select = select.child(SnapshotElement::option(pref, pref));
        }
        select
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
                .node(labelled("都道府県", pref_select("p1")))
                .node(labelled("メールアドレス", SnapshotElement::input("text").attr("name", "m1")))
                .node(labelled("メールアドレス（確認）", SnapshotElement::input("text").attr("name", "m2"))),
        )
    }

    fn profile() -> Profile {
        Profile::from_value(json!({
            "kanji_sei": "山田",
            "address": { "current": { "postal": "1234567", "pref": "東京都" } },
            "email": { "primary": "taro@example.test", "primaryConfirm": true }
        }))
        .unwrap()
    }

    #[test]
    fn fills_by_keywords_in_section_order() {
        let page = entry_page();
        let shared: Arc<dyn Page> = Arc::new(page.clone());
        let report = HeuristicAdapter::default().fill(&shared, &profile(), &FillContext::default());

        assert_eq!(page.value_of(page.by_name("f1").unwrap()).as_deref(), Some("山田"));
        assert_eq!(page.value_of(page.by_name("z1").unwrap()).as_deref(), Some("123"));
        assert_eq!(page.value_of(page.by_name("z2").unwrap()).as_deref(), Some("4567"));
        assert_eq!(page.value_of(page.by_name("p1").unwrap()).as_deref(), Some("東京都"));
        assert_eq!(page.value_of(page.by_name("m1").unwrap()).as_deref(), Some("taro@example.test"));
        assert_eq!(page.value_of(page.by_name("m2").unwrap()).as_deref(), Some("taro@example.test"));
        assert_eq!(report.filled_count, 6);
        assert!(report.cascade.is_none());
    }

    #[test]
    fn confirmation_box_waits_for_its_flag() {
        let page = entry_page();
        let profile = Profile::from_value(json!({
            "email": { "primary": "taro@example.test", "primaryConfirm": false }
        }))
        .unwrap();
        let shared: Arc<dyn Page> = Arc::new(page.clone());
        let report = HeuristicAdapter::default().fill(&shared, &profile, &FillContext::default());

        assert_eq!(page.value_of(page.by_name("m1").unwrap()).as_deref(), Some("taro@example.test"));
        assert_eq!(page.value_of(page.by_name("m2").unwrap()).as_deref(), Some(""));
        assert_eq!(report.filled_count, 1);
    }

    fn vacation_page() -> MemoryPage {
        MemoryPage::from_snapshot(
            &PageSnapshot::new("https://careers.example.test/apply")
                .node(labelled("市区町村", SnapshotElement::input("text").attr("name", "jushog1")))
                .node(labelled("現住所と同じ", SnapshotElement::input("checkbox").attr("name", "jushosame")))
                .node(labelled("休暇中 市区町村", SnapshotElement::input("text").attr("name", "jushok1"))),
        )
    }

    #[test]
    fn vacation_address_only_when_it_differs() {
        let fill = |same: bool| {
            let page = vacation_page();
            let profile = Profile::from_value(json!({
                "address": {
                    "current": { "city": "大阪市" },
                    "vacation": { "sameAsCurrent": same, "city": "松山市" }
                }
            }))
            .unwrap();
            let shared: Arc<dyn Page> = Arc::new(page.clone());
            HeuristicAdapter::default().fill(&shared, &profile, &FillContext::default());
            page
        };

        let same = fill(true);
        assert_eq!(same.value_of(same.by_name("jushog1").unwrap()).as_deref(), Some("大阪市"));
        assert_eq!(same.value_of(same.by_name("jushok1").unwrap()).as_deref(), Some(""));

        let differs = fill(false);
        assert_eq!(differs.value_of(differs.by_name("jushok1").unwrap()).as_deref(), Some("松山市"));
    }

    #[test]
    fn birth_date_boxes_are_filled_one_by_one() {
        let page = MemoryPage::from_snapshot(
            &PageSnapshot::new("https://careers.example.test/apply").node(
                SnapshotElement::new("div")
                    .text("生年月日")
                    .child(SnapshotElement::input("text").attr("name", "birth_y").attr("maxlength", "4"))
                    .child(SnapshotElement::input("text").attr("name", "birth_m").attr("maxlength", "2"))
                    .child(SnapshotElement::input("text").attr("name", "birth_d").attr("maxlength", "2")),
            ),
        );
        let profile = Profile::from_value(json!({
            "birth": { "Y": "2001", "m": "04", "d": "15" }
        }))
        .unwrap();
        let shared: Arc<dyn Page> = Arc::new(page.clone());
        let report = HeuristicAdapter::default().fill(&shared, &profile, &FillContext::default());

        assert_eq!(page.value_of(page.by_name("birth_y").unwrap()).as_deref(), Some("2001"));
        assert_eq!(page.value_of(page.by_name("birth_m").unwrap()).as_deref(), Some("04"));
        assert_eq!(page.value_of(page.by_name("birth_d").unwrap()).as_deref(), Some("15"));
        assert_eq!(report.filled_count, 3);
    }

    #[test]
    fn name_fallback_uses_last_segment() {
        let page = MemoryPage::from_snapshot(
            &PageSnapshot::new("https://careers.example.test/apply")
                .node(SnapshotElement::input("text").attr("name", "user_nickname")),
        );
        let profile = Profile::from_value(json!({ "profile": { "nickname": "たろう" } })).unwrap();
        let shared: Arc<dyn Page> = Arc::new(page.clone());
        let report = HeuristicAdapter::default().fill(&shared, &profile, &FillContext::default());
        assert_eq!(report.filled_count, 1);
        assert_eq!(page.value_of(page.by_name("user_nickname").unwrap()).as_deref(), Some("たろう"));
    }

    #[test]
    fn array_roots_resolve_through_first_entry() {
        let profile = Profile::from_value(json!({
            "school": [{ "zemi": "" }, { "zemi": "計量経済" }]
        }))
        .unwrap();
        assert_eq!(lookup(&profile, "school.zemi"), Some(FieldValue::text("計量経済")));
        assert_eq!(generic_path("school.1.zemi"), "school.zemi");
    }
}
