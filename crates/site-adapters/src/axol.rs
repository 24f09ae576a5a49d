//! Built-in adapter for job.axol.jp entry forms.

use action_locator::Locator;
use cascade_sequencer::{CascadeField, CascadeGroup, CascadeStage};
use entryfill_core_types::{ControlKind, FieldValue};
use learning_engine::{Binding, LearnedField, Pattern};

use crate::gate::{Condition, FieldGate};
use crate::heuristic::HeuristicAdapter;
use crate::pattern::PatternAdapter;
use crate::signature::SiteMatcher;

pub const AXOL_ADAPTER: &str = "axol";

const BY_NAME: &[(&str, &str)] = &[
    ("kanji_sei", "kanji_sei"),
    ("kanji_na", "kanji_na"),
    ("kana_sei", "kana_sei"),
    ("kana_na", "kana_na"),
    ("sex", "sex"),
    ("birth.Y", "birth_Y"),
    ("birth.m", "birth_m"),
    ("birth.d", "birth_d"),
    ("address.current.postal", "yubing_h"),
    ("address.current.city", "jushog1"),
    ("address.current.street", "jushog2"),
    ("address.current.building", "jushog3"),
    ("tel.home", "telg_h"),
    ("tel.mobile", "keitai_h"),
    ("address.vacation.sameAsCurrent", "jushosame"),
    ("address.vacation.postal", "yubink_h"),
    ("address.vacation.city", "jushok1"),
    ("address.vacation.street", "jushok2"),
    ("address.vacation.building", "jushok3"),
    ("address.vacation.tel", "telk_h"),
    ("email.primary", "email"),
    ("email.secondary", "kmail"),
    ("school.kubun", "kubun"),
    ("school.kokushi", "kokushi"),
    ("school.initial", "initial"),
    ("school.from.Y", "school_from_Y"),
    ("school.from.m", "school_from_m"),
    ("school.to.Y", "school_to_Y"),
    ("school.to.m", "school_to_m"),
    ("school.zemi", "zemi"),
    ("school.club", "club"),
];

const BY_ID: &[(&str, &str)] = &[
    ("address.current.pref", "keng"),
    ("address.vacation.pref", "kenk"),
];

/// Confirmation boxes replayed with the current value of another path.
const CONFIRMATIONS: &[(&str, &str)] = &[("email2", "email.primary"), ("kmail2", "email.secondary")];

pub fn axol_pattern() -> Pattern {
    let mut pattern = Pattern::new(AXOL_ADAPTER);
    for (path, name) in BY_NAME {
        pattern = pattern.with_mapping(*path, Locator::by_name(*name));
    }
    for (path, id) in BY_ID {
        pattern = pattern.with_mapping(*path, Locator::by_id(*id));
    }
    pattern.learned_fields = CONFIRMATIONS
        .iter()
        .map(|(name, path)| LearnedField {
            label: None,
            locator: Locator::by_name(*name),
            value: FieldValue::text(""),
            kind: ControlKind::Text,
            binding: Binding::Alias((*path).to_string()),
        })
        .collect();
    pattern
}

/// School, faculty and department selects, populated after the search.
pub fn axol_school_cascade() -> CascadeGroup {
    let field = |path: &str| CascadeField {
        path: path.to_string(),
        locator: Locator::by_name(path),
    };
    let stage = |name: &str, code: &str, text: &str| CascadeStage {
        name: name.to_string(),
        select: Locator::by_name(code),
        code_path: Some(code.to_string()),
        text_path: Some(text.to_string()),
        free_text: Some(Locator::by_name(text)),
    };
    CascadeGroup {
        name: "school".to_string(),
        root: "school".to_string(),
        prereqs: vec![field("kubun"), field("kokushi"), field("initial")],
        stages: vec![
            stage("school", "dcd", "dname"),
            stage("faculty", "bcd", "bname"),
            stage("department", "paxcd", "kname"),
        ],
    }
}

pub fn axol_matcher() -> SiteMatcher {
    SiteMatcher {
        host_suffix: Some("axol.jp".to_string()),
        path_contains: vec!["/entry/input".to_string(), "/navi/input".to_string()],
        body_ids: vec!["entry_input".to_string()],
    }
}

/// Vacation contact only when it differs from the current address;
/// confirmation boxes only when the profile asks for them.
pub fn axol_gates() -> Vec<FieldGate> {
    vec![
        FieldGate::paths(
            "address.vacation",
            Condition::when("address.vacation.sameAsCurrent", false),
        ),
        FieldGate::control("email2", Condition::when("email.primaryConfirm", true)),
        FieldGate::control("kmail2", Condition::when("email.secondaryConfirm", true)),
    ]
}

pub fn axol_adapter(fallback: HeuristicAdapter) -> PatternAdapter {
    PatternAdapter::new(axol_pattern(), fallback)
        .named(AXOL_ADAPTER)
        .with_matcher(axol_matcher())
        .with_cascade(axol_school_cascade())
        .with_gates(axol_gates())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{FillContext, SiteAdapter};
    use crate::signature::PageSignature;
    use cascade_sequencer::{CascadeState, SelectedBy};
    use page_model::{DomEvent, MemoryPage, Page, PageSnapshot, SnapshotElement};
    use profile_model::Profile;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn text(name: &str) -> SnapshotElement {
        SnapshotElement::input("text").attr("name", name)
    }

    fn segment(name: &str, max: &str) -> SnapshotElement {
        text(name).attr("maxlength", max)
    }

    fn axol_page() -> MemoryPage {
        MemoryPage::from_snapshot(
            &PageSnapshot::new("https://job.axol.jp/xx/s/acme_27/entry/input")
                .node(text("kanji_sei"))
                .node(text("kanji_na"))
                .node(
                    SnapshotElement::new("div")
                        .child(segment("yubing_h", "3"))
                        .child(segment("yubing_l", "4")),
                )
                .node(
                    SnapshotElement::new("select")
                        .attr("id", "keng")
                        .child(SnapshotElement::option("", "--"))
                        .child(SnapshotElement::option("13", "東京都")),
                )
                .node(
                    SnapshotElement::new("div")
                        .child(segment("keitai_h", "3"))
                        .child(segment("keitai_m", "4"))
                        .child(segment("keitai_l", "4")),
                )
                .node(text("email"))
                .node(text("email2"))
                .node(
                    SnapshotElement::new("select")
                        .attr("name", "kubun")
                        .child(SnapshotElement::option("", "--"))
                        .child(SnapshotElement::option("1", "大学")),
                )
                .node(text("initial"))
                .node(SnapshotElement::new("button").attr("id", "search").text("検索"))
                .node(
                    SnapshotElement::new("select")
                        .attr("name", "dcd")
                        .child(SnapshotElement::option("", "--")),
                )
                .node(text("dname")),
        )
    }

    fn profile() -> Profile {
        Profile::from_value(json!({
            "kanji_sei": "山田", "kanji_na": "太郎",
            "address": { "current": { "postal": "530-0001", "pref": "東京都" } },
            "tel": { "mobile": "09012345678" },
            "email": { "primary": "taro@example.test", "primaryConfirm": true },
            "school": [{ "kubun": "1", "initial": "と", "dcd": "0001", "dname": "東京大学" }]
        }))
        .unwrap()
    }

    #[test]
    fn matches_entry_pages_only() {
        let adapter = axol_adapter(HeuristicAdapter::default());
        let entry = PageSignature {
            url: "https://job.axol.jp/xx/s/acme_27/navi/input".into(),
            ..PageSignature::default()
        };
        let other = PageSignature {
            url: "https://job.axol.jp/xx/s/acme_27/mypage".into(),
            ..PageSignature::default()
        };
        assert!(adapter.matches(&entry));
        assert!(!adapter.matches(&other));
    }

    #[tokio::test(start_paused = true)]
    async fn fills_fields_then_runs_school_cascade() {
        let page = axol_page();
        let search = page.by_id("search").unwrap();
        let dcd = page.by_name("dcd").unwrap();
        page.on(DomEvent::Click, Some(search), move |page, _| {
            let page = page.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(400)).await;
                page.replace_options(dcd, &[("", "--"), ("0001", "東京大学")]).unwrap();
            });
        });

        let shared: Arc<dyn Page> = Arc::new(page.clone());
        let report = axol_adapter(HeuristicAdapter::default()).fill(&shared, &profile(), &FillContext::default());

        // two names, postal 2, prefecture, mobile 3, email, confirmation
        assert_eq!(report.filled_count, 10);
        assert_eq!(page.value_of(page.by_name("yubing_l").unwrap()).as_deref(), Some("0001"));
        assert_eq!(page.value_of(page.by_name("keitai_m").unwrap()).as_deref(), Some("1234"));
        assert_eq!(page.value_of(page.by_id("keng").unwrap()).as_deref(), Some("13"));
        assert_eq!(page.value_of(page.by_name("email2").unwrap()).as_deref(), Some("taro@example.test"));

        let cascade = report.cascade.expect("school cascade armed").finished().await;
        assert_eq!(cascade.state, CascadeState::Done);
        assert_eq!(cascade.entry_index, Some(0));
        assert_eq!(cascade.selections[0].by, SelectedBy::Code);
        assert_eq!(page.value_of(page.by_name("kubun").unwrap()).as_deref(), Some("1"));
        assert_eq!(page.value_of(dcd).as_deref(), Some("0001"));
    }

    fn contact_page() -> MemoryPage {
        MemoryPage::from_snapshot(
            &PageSnapshot::new("https://job.axol.jp/xx/s/acme_27/entry/input")
                .node(text("jushog1"))
                .node(SnapshotElement::input("checkbox").attr("name", "jushosame"))
                .node(text("jushok1"))
                .node(text("email"))
                .node(text("email2"))
                .node(text("kmail"))
                .node(text("kmail2")),
        )
    }

    fn contact_fill(same: bool, confirm: bool) -> MemoryPage {
        let page = contact_page();
        let profile = Profile::from_value(json!({
            "address": {
                "current": { "city": "大阪市" },
                "vacation": { "sameAsCurrent": same, "city": "松山市" }
            },
            "email": {
                "primary": "taro@example.test", "primaryConfirm": confirm,
                "secondary": "taro@mobile.test", "secondaryConfirm": confirm
            }
        }))
        .unwrap();
        let shared: Arc<dyn Page> = Arc::new(page.clone());
        axol_adapter(HeuristicAdapter::default()).fill(&shared, &profile, &FillContext::default());
        page
    }

    #[test]
    fn same_address_and_no_confirmation_skip_their_fields() {
        let page = contact_fill(true, false);
        let value = |name: &str| page.value_of(page.by_name(name).unwrap());
        assert_eq!(value("jushog1").as_deref(), Some("大阪市"));
        assert_eq!(value("jushok1").as_deref(), Some(""));
        assert_eq!(value("email").as_deref(), Some("taro@example.test"));
        assert_eq!(value("email2").as_deref(), Some(""));
        assert_eq!(value("kmail").as_deref(), Some("taro@mobile.test"));
        assert_eq!(value("kmail2").as_deref(), Some(""));
        assert!(page.element(page.by_name("jushosame").unwrap()).unwrap().checked);
    }

    #[test]
    fn separate_vacation_address_and_confirmations_are_filled() {
        let page = contact_fill(false, true);
        let value = |name: &str| page.value_of(page.by_name(name).unwrap());
        assert_eq!(value("jushok1").as_deref(), Some("松山市"));
        assert_eq!(value("email2").as_deref(), Some("taro@example.test"));
        assert_eq!(value("kmail2").as_deref(), Some("taro@mobile.test"));
    }

}
