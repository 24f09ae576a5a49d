use std::collections::{BTreeMap, HashSet};

use action_locator::build as build_locator;
use chrono::Utc;
use element_classifier::{classify, is_fillable, label_for, split_group};
use entryfill_core_types::{ControlKind, EngineIssue, FieldValue};
use page_model::{NodeId, Page, PageExt};
use profile_model::{flatten, FlatProfile, Profile};
use tracing::{debug, info, instrument, warn};

use crate::model::{Binding, LearnReport, LearnStatus, LearnedField, Pattern, PatternMetadata};
use crate::policy::LearnOptions;

const NO_MATCH_INSTRUCTION: &str =
    "No profile value was found on this page. Fill the form in by hand, then learn again.";

/// What one control (or split group) contributes to learning.
struct Observation {
    node: NodeId,
    kind: ControlKind,
    value: FieldValue,
    /// Extra text forms the value may match under (e.g. a select's option text).
    aliases: Vec<String>,
}

fn digits(text: &str) -> String {
    text.chars().filter(char::is_ascii_digit).collect()
}

fn is_boolean_checkbox(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value == "on"
}

fn observe(page: &dyn Page, node: NodeId, seen_groups: &mut HashSet<NodeId>) -> Option<Observation> {
    let element = page.element(node)?;
    let kind = classify(page, node)?;
    match kind {
        ControlKind::Radio => {
            let value = element.value.trim();
            (element.checked && !value.is_empty()).then(|| Observation {
                node,
                kind,
                value: FieldValue::text(value),
                aliases: Vec::new(),
            })
        }
        ControlKind::Checkbox if is_boolean_checkbox(&element.value) => Some(Observation {
            node,
            kind,
            value: FieldValue::Flag(element.checked),
            aliases: Vec::new(),
        }),
        ControlKind::Checkbox => {
            let value = element.value.trim();
            (element.checked && !value.is_empty()).then(|| Observation {
                node,
                kind,
                value: FieldValue::text(value),
                aliases: Vec::new(),
            })
        }
        ControlKind::SplitSegment => {
            let group = split_group(page, node)?;
            if !seen_groups.insert(group.first()) {
                return None;
            }
            let parts: Vec<String> = group
                .routed(page)
                .into_iter()
                .filter_map(|n| page.element(n).map(|el| el.value.trim().to_string()))
                .collect();
            if parts.iter().any(String::is_empty) {
                return None;
            }
            Some(Observation {
                node: group.first(),
                kind,
                value: FieldValue::text(parts.join("-")),
                aliases: Vec::new(),
            })
        }
        ControlKind::Select => {
            let value = element.value.trim();
            if value.is_empty() {
                return None;
            }
            let aliases = page
                .options(node)
                .into_iter()
                .find(|option| option.value == element.value)
                .map(|option| option.text)
                .filter(|text| !text.is_empty() && text != value)
                .into_iter()
                .collect();
            Some(Observation {
                node,
                kind,
                value: FieldValue::text(value),
                aliases,
            })
        }
        ControlKind::Text => {
            let value = element.value.trim();
            (!value.is_empty()).then(|| Observation {
                node,
                kind,
                value: FieldValue::text(value),
                aliases: Vec::new(),
            })
        }
    }
}

/// Profile paths the observation's value matches.
/// Words of a profile key long enough to identify a control, e.g.
/// `sameAsCurrent` -> `same`, `current`.
fn key_words(path: &str) -> Vec<String> {
    let key = path.rsplit('.').next().unwrap_or(path);
    let mut words = Vec::new();
    let mut current = String::new();
    for ch in key.chars() {
        if ch == '_' || ch == '-' || ch.is_uppercase() {
            words.push(std::mem::take(&mut current));
        }
        if ch.is_alphanumeric() {
            current.extend(ch.to_lowercase());
        }
    }
    words.push(current);
    words.retain(|word| word.chars().count() >= 4);
    words
}

/// Whether a checked boolean control plausibly belongs to the flag at `path`:
/// its name, id or label contains a word of the flag's key.
fn flag_relates(page: &dyn Page, node: NodeId, path: &str) -> bool {
    let Some(element) = page.element(node) else {
        return false;
    };
    let text = [
        element.name().map(str::to_string),
        element.id().map(str::to_string),
        label_for(page, node),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ")
    .to_lowercase();
    key_words(path).iter().any(|word| text.contains(word.as_str()))
}

fn matching_paths(observation: &Observation, flat: &FlatProfile, options: &LearnOptions) -> Vec<String> {
    let FieldValue::Text(value) = &observation.value else {
        return Vec::new();
    };
    let candidates: Vec<&str> = std::iter::once(value.as_str())
        .chain(observation.aliases.iter().map(String::as_str))
        .collect();

    flat.iter()
        .filter_map(|(path, leaf)| {
            let leaf = leaf.as_text()?.trim();
            if leaf.is_empty() {
                return None;
            }
            let hit = candidates.iter().any(|candidate| {
                if observation.kind == ControlKind::SplitSegment {
                    let wanted = digits(candidate);
                    !wanted.is_empty() && digits(leaf) == wanted
                } else {
                    *candidate == leaf
                }
            });
            if !hit {
                return None;
            }
            // Short codes only count on enumeration controls, never in free text.
            let enumerated = matches!(
                observation.kind,
                ControlKind::Radio | ControlKind::Select | ControlKind::Checkbox
            );
            if leaf.chars().count() <= 1 && !(enumerated && options.allows_short_value(path)) {
                debug!(path = %path, "single-character match rejected");
                return None;
            }
            Some(path.clone())
        })
        .collect()
}

/// Learns a pattern from a page a person has filled with `profile`'s values.
#[instrument(skip_all, fields(url = %page.url(), pattern = %options.pattern_name))]
pub fn learn(page: &dyn Page, profile: &Profile, options: &LearnOptions) -> LearnReport {
    let flat = flatten(profile);
    let true_flags: Vec<&String> = flat
        .iter()
        .filter(|(_, leaf)| leaf.as_flag() == Some(true))
        .map(|(path, _)| path)
        .collect();

    let mut pattern = Pattern {
        mapping: BTreeMap::new(),
        learned_fields: Vec::new(),
        metadata: PatternMetadata {
            name: options.pattern_name.clone(),
            learned_at: Some(Utc::now()),
            page_url: Some(page.url()),
        },
    };
    let mut issues = Vec::new();
    let mut seen_groups = HashSet::new();
    // path -> index into learned_fields of the current winner
    let mut winners: BTreeMap<String, usize> = BTreeMap::new();
    let mut matched: Vec<Vec<String>> = Vec::new();

    for node in page.form_controls() {
        if !is_fillable(page, node) {
            continue;
        }
        let Some(observation) = observe(page, node, &mut seen_groups) else {
            continue;
        };
        let locator = match build_locator(page, observation.node) {
            Ok(locator) => locator,
            Err(err) => {
                debug!(?node, error = %err, "control skipped");
                continue;
            }
        };

        let paths = match observation.value {
            FieldValue::Flag(true) => match true_flags
                .iter()
                .filter(|path| flag_relates(page, observation.node, path))
                .collect::<Vec<_>>()
                .as_slice()
            {
                [only] => vec![(**only).clone()],
                [] => Vec::new(),
                many => {
                    let issue = EngineIssue::AmbiguousMatch {
                        field: locator.to_string(),
                        candidates: many.len(),
                    };
                    warn!(%issue, "checked checkbox not mapped");
                    issues.push(issue);
                    Vec::new()
                }
            },
            FieldValue::Flag(false) => Vec::new(),
            FieldValue::Text(_) => matching_paths(&observation, &flat, options),
        };

        let index = pattern.learned_fields.len();
        for path in &paths {
            debug!(path = %path, locator = %locator, "profile match");
            pattern.mapping.insert(path.clone(), locator.clone());
            winners.insert(path.clone(), index);
        }
        pattern.learned_fields.push(LearnedField {
            label: label_for(page, observation.node),
            locator,
            value: observation.value,
            kind: observation.kind,
            binding: Binding::Literal,
        });
        matched.push(paths);
    }

    for (index, (field, paths)) in pattern.learned_fields.iter_mut().zip(&matched).enumerate() {
        field.binding = paths
            .iter()
            .find(|path| winners.get(*path) == Some(&index))
            .map(|path| Binding::Mapped(path.clone()))
            .or_else(|| paths.first().map(|path| Binding::Alias(path.clone())))
            .unwrap_or(Binding::Literal);
    }

    let match_count = pattern.mapping.len();
    let status = if match_count == 0 {
        issues.push(EngineIssue::NoLearnableValue);
        warn!("no profile value matched");
        LearnStatus::NoMatch {
            instruction: NO_MATCH_INSTRUCTION.to_string(),
        }
    } else {
        LearnStatus::Learned
    };
    info!(
        match_count,
        learned_fields = pattern.learned_fields.len(),
        "learning finished"
    );

    LearnReport {
        pattern,
        match_count,
        status,
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use page_model::{MemoryPage, PageSnapshot, SnapshotElement};
    use serde_json::json;

    fn profile() -> Profile {
        Profile::from_value(json!({
            "kanji_sei": "山田",
            "sex": "1",
            "birth": { "Y": "2001", "m": "4", "d": "1" },
            "address": {
                "current": { "postal": "1234567", "pref": "東京都" },
                "vacation": { "sameAsCurrent": true }
            },
            "email": { "primary": "taro@example.jp" }
        }))
        .unwrap()
    }

    fn filled_page() -> MemoryPage {
        MemoryPage::from_snapshot(
            &PageSnapshot::new("https://example.test/entry")
                .node(SnapshotElement::new("label").attr("for", "sei").text("姓"))
                .node(SnapshotElement::input("text").attr("id", "sei").value("山田"))
                .node(SnapshotElement::input("radio").attr("name", "sex").attr("value", "1").checked(true))
                .node(SnapshotElement::input("radio").attr("name", "sex").attr("value", "2"))
                .node(SnapshotElement::input("text").attr("name", "birth_d").value("1"))
                .node(
                    SnapshotElement::new("span")
                        .child(SnapshotElement::input("text").attr("name", "zip1").attr("maxlength", "3").value("123"))
                        .child(SnapshotElement::input("text").attr("name", "zip2").attr("maxlength", "4").value("4567")),
                )
                .node(
                    SnapshotElement::new("select")
                        .attr("name", "pref")
                        .child(SnapshotElement::option("", "選択"))
                        .child(SnapshotElement::option("13", "東京都").attr("selected", "")),
                )
                .node(SnapshotElement::input("checkbox").attr("name", "same").checked(true))
                .node(SnapshotElement::input("text").attr("name", "mail").value("taro@example.jp"))
                .node(SnapshotElement::input("text").attr("name", "mail2").value("taro@example.jp"))
                .node(SnapshotElement::input("text").attr("name", "motive").value("御社を志望")),
        )
    }

    #[test]
    fn maps_profile_values_to_controls() {
        let page = filled_page();
        let report = learn(&page, &profile(), &LearnOptions::named("site"));
        assert!(report.is_learned());
        let mapping = &report.pattern.mapping;

        assert_eq!(mapping["kanji_sei"].id.as_deref(), Some("sei"));
        assert_eq!(mapping["sex"].name.as_deref(), Some("sex"));
        assert_eq!(mapping["address.current.postal"].name.as_deref(), Some("zip1"));
        assert_eq!(mapping["address.current.pref"].name.as_deref(), Some("pref"));
        assert_eq!(mapping["address.vacation.sameAsCurrent"].name.as_deref(), Some("same"));
        assert_eq!(mapping["email.primary"].name.as_deref(), Some("mail2"));
        assert_eq!(report.match_count, mapping.len());
        assert_eq!(report.pattern.metadata.name, "site");
    }

    #[test]
    fn single_character_values_only_match_allow_listed_keys() {
        let page = filled_page();
        let report = learn(&page, &profile(), &LearnOptions::default());
        assert!(!report.pattern.mapping.contains_key("birth.d"));
        assert!(!report.pattern.mapping.contains_key("birth.m"));
        let birth_d = report
            .pattern
            .learned_fields
            .iter()
            .find(|f| f.locator.name.as_deref() == Some("birth_d"))
            .unwrap();
        assert_eq!(birth_d.binding, Binding::Literal);
        assert_eq!(birth_d.value, FieldValue::text("1"));
    }

    #[test]
    fn records_bindings_for_every_observed_control() {
        let page = filled_page();
        let report = learn(&page, &profile(), &LearnOptions::default());
        let fields = &report.pattern.learned_fields;
        let by_name = |name: &str| {
            fields
                .iter()
                .find(|f| f.locator.name.as_deref() == Some(name))
                .unwrap()
        };

        assert_eq!(by_name("mail").binding, Binding::Alias("email.primary".into()));
        assert_eq!(by_name("mail2").binding, Binding::Mapped("email.primary".into()));
        assert_eq!(by_name("motive").binding, Binding::Literal);
        assert_eq!(by_name("zip1").kind, ControlKind::SplitSegment);
        assert_eq!(by_name("zip1").value, FieldValue::text("123-4567"));
        assert!(fields.iter().all(|f| f.locator.name.as_deref() != Some("zip2")));
        assert_eq!(fields[0].label.as_deref(), Some("姓"));
        // the unchecked radio contributes nothing
        assert_eq!(fields.iter().filter(|f| f.kind == ControlKind::Radio).count(), 1);
    }

    #[test]
    fn empty_page_reports_no_match() {
        let page = MemoryPage::from_snapshot(
            &PageSnapshot::new("https://example.test/")
                .node(SnapshotElement::input("text").attr("name", "sei")),
        );
        let report = learn(&page, &profile(), &LearnOptions::default());
        assert_eq!(report.match_count, 0);
        assert!(matches!(report.status, LearnStatus::NoMatch { .. }));
        assert_eq!(report.issues, vec![EngineIssue::NoLearnableValue]);
    }

    #[test]
    fn unrelated_checked_box_does_not_take_the_flag() {
        let page = MemoryPage::from_snapshot(
            &PageSnapshot::new("https://example.test/")
                .node(SnapshotElement::input("text").attr("name", "sei").value("山田"))
                .node(SnapshotElement::input("checkbox").attr("name", "jushosame").checked(true))
                .node(SnapshotElement::input("checkbox").attr("name", "privacy_agree").checked(true)),
        );
        let report = learn(&page, &profile(), &LearnOptions::default());
        let mapping = &report.pattern.mapping;
        assert_eq!(
            mapping["address.vacation.sameAsCurrent"].name.as_deref(),
            Some("jushosame")
        );
        let fields = &report.pattern.learned_fields;
        assert_eq!(
            fields[1].binding,
            Binding::Mapped("address.vacation.sameAsCurrent".into())
        );
        assert_eq!(fields[2].value, FieldValue::Flag(true));
        assert_eq!(fields[2].binding, Binding::Literal);
    }

    #[test]
    fn date_boxes_map_each_part() {
        let profile = Profile::from_value(json!({
            "birth": { "Y": "2001", "m": "04", "d": "15" }
        }))
        .unwrap();
        let page = MemoryPage::from_snapshot(
            &PageSnapshot::new("https://example.test/").node(
                SnapshotElement::new("div")
                    .text("生年月日")
                    .child(SnapshotElement::input("text").attr("name", "birth_y").attr("maxlength", "4").value("2001"))
                    .child(SnapshotElement::input("text").attr("name", "birth_m").attr("maxlength", "2").value("04"))
                    .child(SnapshotElement::input("text").attr("name", "birth_d").attr("maxlength", "2").value("15")),
            ),
        );
        let report = learn(&page, &profile, &LearnOptions::default());
        assert!(report.is_learned());
        let mapping = &report.pattern.mapping;
        assert_eq!(mapping["birth.Y"].name.as_deref(), Some("birth_y"));
        assert_eq!(mapping["birth.m"].name.as_deref(), Some("birth_m"));
        assert_eq!(mapping["birth.d"].name.as_deref(), Some("birth_d"));
        assert!(report.pattern.learned_fields.iter().all(|f| f.kind == ControlKind::Text));
    }

    #[test]
    fn unchecked_boolean_checkbox_is_recorded_but_unmapped() {
        let page = MemoryPage::from_snapshot(
            &PageSnapshot::new("https://example.test/")
                .node(SnapshotElement::input("text").attr("name", "sei").value("山田"))
                .node(SnapshotElement::input("checkbox").attr("name", "same")),
        );
        let report = learn(&page, &profile(), &LearnOptions::default());
        let same = &report.pattern.learned_fields[1];
        assert_eq!(same.value, FieldValue::Flag(false));
        assert_eq!(same.binding, Binding::Literal);
        assert!(!report.pattern.mapping.contains_key("address.vacation.sameAsCurrent"));
    }
}
