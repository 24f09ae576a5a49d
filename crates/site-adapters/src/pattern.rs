use std::collections::HashMap;
use std::sync::Arc;

use action_locator::resolve;
use cascade_sequencer::{CascadeGroup, CascadeHandle, CascadeValues};
use fill_engine::FillSession;
use learning_engine::{Binding, Pattern};
use page_model::{NodeId, Page, PageExt};
use profile_model::Profile;
use tracing::{debug, info, instrument};

use crate::adapter::{FillContext, SiteAdapter};
use crate::gate::{control_open, path_open, FieldGate};
use crate::heuristic::{lookup, HeuristicAdapter};
use crate::report::{FillReport, FillRun};
use crate::signature::{PageSignature, SiteMatcher};

/// Replays a stored (or built-in) pattern, falling back to the heuristic
/// finder for any mapped field whose locator no longer resolves.
#[derive(Clone, Debug)]
pub struct PatternAdapter {
    name: String,
    pattern: Pattern,
    matcher: Option<SiteMatcher>,
    cascade: Option<CascadeGroup>,
    gates: Vec<FieldGate>,
    fallback: HeuristicAdapter,
}

impl PatternAdapter {
    pub fn new(pattern: Pattern, fallback: HeuristicAdapter) -> Self {
        Self {
            name: pattern.name().to_string(),
            pattern,
            matcher: None,
            cascade: None,
            gates: Vec::new(),
            fallback,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Without a matcher the adapter is never picked by signature.
    pub fn with_matcher(mut self, matcher: SiteMatcher) -> Self {
        self.matcher = Some(matcher);
        self
    }

    pub fn with_cascade(mut self, group: CascadeGroup) -> Self {
        self.cascade = Some(group);
        self
    }

    /// Fields replayed only while a profile flag holds.
    pub fn with_gates(mut self, gates: Vec<FieldGate>) -> Self {
        self.gates = gates;
        self
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Mapping entries ordered by their first resolved control in
    /// document order; unresolved entries go last.
    fn replay_mapping(&self, page: &dyn Page, profile: &Profile, run: &mut FillRun) {
        let order: HashMap<NodeId, usize> = page
            .form_controls()
            .into_iter()
            .enumerate()
            .map(|(index, node)| (node, index))
            .collect();
        let mut entries: Vec<(usize, &str, Vec<NodeId>)> = self
            .pattern
            .mapping
            .iter()
            .map(|(path, locator)| {
                let nodes = resolve(page, locator);
                let position = nodes
                    .iter()
                    .filter_map(|node| order.get(node).copied())
                    .min()
                    .unwrap_or(usize::MAX);
                (position, path.as_str(), nodes)
            })
            .collect();
        entries.sort_by_key(|(position, _, _)| *position);

        for (_, path, nodes) in entries {
            if !path_open(&self.gates, path, profile) {
                debug!(field = path, "switched off by profile flag");
                continue;
            }
            let Some(value) = lookup(profile, path) else {
                debug!(field = path, "no profile value");
                continue;
            };
            if !nodes.is_empty() {
                run.apply(page, path, &nodes, &value);
                continue;
            }
            match self.fallback.locate(page, path, run) {
                Some((node, issue)) => {
                    debug!(field = path, ?node, "stale locator; heuristic fallback");
                    if let Some(issue) = issue {
                        run.issue(issue);
                    }
                    run.apply(page, path, &[node], &value);
                }
                None => run.unresolvable(path),
            }
        }
    }

    fn replay_learned(&self, page: &dyn Page, profile: &Profile, run: &mut FillRun) {
        for field in &self.pattern.learned_fields {
            if !control_open(&self.gates, field.locator.name.as_deref(), profile) {
                debug!(locator = %field.locator, "switched off by profile flag");
                continue;
            }
            let value = match &field.binding {
                Binding::Mapped(_) => continue,
                Binding::Literal => field.value.clone(),
                Binding::Alias(path) => match lookup(profile, path) {
                    Some(value) => value,
                    None => continue,
                },
            };
            let name = field
                .label
                .clone()
                .unwrap_or_else(|| field.locator.to_string());
            let nodes = resolve(page, &field.locator);
            if nodes.is_empty() {
                run.unresolvable(&name);
                continue;
            }
            run.apply(page, &name, &nodes, &value);
        }
    }

    fn arm_cascade(&self, page: &Arc<dyn Page>, profile: &Profile, ctx: &FillContext) -> Option<CascadeHandle> {
        let group = self.cascade.as_ref()?;
        let Some(values) = CascadeValues::from_profile(group, profile) else {
            debug!(group = %group.name, "profile has no values for cascade");
            return None;
        };
        Some(ctx.sequencer.arm(Arc::clone(page), group.clone(), values))
    }
}

impl SiteAdapter for PatternAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, signature: &PageSignature) -> bool {
        self.matcher
            .as_ref()
            .map(|matcher| matcher.matches(signature))
            .unwrap_or(false)
    }

    #[instrument(skip_all, fields(adapter = %self.name, pattern = %self.pattern.name(), page = %page.page_id()))]
    fn fill(&self, page: &Arc<dyn Page>, profile: &Profile, ctx: &FillContext) -> FillReport {
        let mut run = FillRun::new(FillSession::new(ctx.policy.clone()));
        let mut cascade = None;
        if ctx.policy.enabled {
            self.replay_mapping(page.as_ref(), profile, &mut run);
            self.replay_learned(page.as_ref(), profile, &mut run);
            cascade = self.arm_cascade(page, profile, ctx);
        }
        let report = run.finish(&self.name, Some(self.pattern.name().to_string()), cascade);
        info!(
            filled = report.filled_count,
            issues = report.issues.len(),
            cascade = report.cascade.is_some(),
            "pattern fill finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use action_locator::Locator;
    use entryfill_core_types::{ControlKind, EngineIssue, FieldValue};
    use learning_engine::LearnedField;
    use page_model::{MemoryPage, PageSnapshot, SnapshotElement};
    use serde_json::json;

    fn page() -> MemoryPage {
        MemoryPage::from_snapshot(
            &PageSnapshot::new("https://careers.example.test/form")
                .node(
                    SnapshotElement::new("div")
                        .child(SnapshotElement::new("span").text("メールアドレス"))
                        .child(SnapshotElement::input("text").attr("name", "mail_a")),
                )
                .node(SnapshotElement::input("text").attr("name", "mail_b"))
                .node(SnapshotElement::input("text").attr("name", "motive"))
                .node(SnapshotElement::input("text").attr("name", "kanji_sei")),
        )
    }

    fn profile() -> Profile {
        Profile::from_value(json!({
            "kanji_sei": "山田",
            "email": { "primary": "taro@example.test" },
            "zemi": "計量経済"
        }))
        .unwrap()
    }

    fn learned(name: &str, value: &str, binding: Binding) -> LearnedField {
        LearnedField {
            label: None,
            locator: Locator::by_name(name),
            value: FieldValue::text(value),
            kind: ControlKind::Text,
            binding,
        }
    }

    #[test]
    fn replays_mapping_then_learned_fields() {
        let mut pattern = Pattern::new("careers")
            .with_mapping("kanji_sei", Locator::by_name("kanji_sei"))
            .with_mapping("email.primary", Locator::by_name("mail_b"));
        pattern.learned_fields = vec![
            learned("mail_a", "old@example.test", Binding::Alias("email.primary".into())),
            learned("mail_b", "old@example.test", Binding::Mapped("email.primary".into())),
            learned("motive", "御社の理念に共感", Binding::Literal),
        ];
        let page = page();
        let shared: Arc<dyn Page> = Arc::new(page.clone());
        let report = PatternAdapter::new(pattern, HeuristicAdapter::default()).fill(
            &shared,
            &profile(),
            &FillContext::default(),
        );

        assert_eq!(page.value_of(page.by_name("mail_a").unwrap()).as_deref(), Some("taro@example.test"));
        assert_eq!(page.value_of(page.by_name("mail_b").unwrap()).as_deref(), Some("taro@example.test"));
        assert_eq!(page.value_of(page.by_name("motive").unwrap()).as_deref(), Some("御社の理念に共感"));
        assert_eq!(page.value_of(page.by_name("kanji_sei").unwrap()).as_deref(), Some("山田"));
        assert_eq!(report.filled_count, 4);
        assert!(report.issues.is_empty());
        assert_eq!(report.pattern.as_deref(), Some("careers"));
    }

    #[test]
    fn stale_locator_falls_back_to_keywords() {
        let pattern = Pattern::new("careers")
            .with_mapping("email.primary", Locator::by_id("gone"))
            .with_mapping("zemi", Locator::by_id("also-gone"));
        let page = page();
        let shared: Arc<dyn Page> = Arc::new(page.clone());
        let report = PatternAdapter::new(pattern, HeuristicAdapter::default()).fill(
            &shared,
            &profile(),
            &FillContext::default(),
        );

        assert_eq!(page.value_of(page.by_name("mail_a").unwrap()).as_deref(), Some("taro@example.test"));
        assert_eq!(
            report.issues,
            vec![EngineIssue::UnresolvableLocator { field: "zemi".into() }]
        );
        assert_eq!(report.tally.skipped_unresolvable, 1);
    }

    #[test]
    fn array_profile_roots_replay_their_first_entry() {
        let pattern = Pattern::new("careers")
            .with_mapping("school.zemi", Locator::by_name("zemi"))
            .with_mapping("school.club", Locator::by_name("club"));
        let page = MemoryPage::from_snapshot(
            &PageSnapshot::new("https://careers.example.test/form")
                .node(SnapshotElement::input("text").attr("name", "zemi"))
                .node(SnapshotElement::input("text").attr("name", "club")),
        );
        let profile = Profile::from_value(json!({
            "school": [{ "zemi": "計量経済", "club": "野球部" }]
        }))
        .unwrap();
        let shared: Arc<dyn Page> = Arc::new(page.clone());
        let report = PatternAdapter::new(pattern, HeuristicAdapter::default()).fill(
            &shared,
            &profile,
            &FillContext::default(),
        );

        assert_eq!(page.value_of(page.by_name("zemi").unwrap()).as_deref(), Some("計量経済"));
        assert_eq!(page.value_of(page.by_name("club").unwrap()).as_deref(), Some("野球部"));
        assert_eq!(report.filled_count, 2);
    }

    #[test]
    fn aliases_follow_array_entries_too() {
        let mut pattern = Pattern::new("careers");
        pattern.learned_fields = vec![learned("club_again", "", Binding::Alias("school.club".into()))];
        let page = MemoryPage::from_snapshot(
            &PageSnapshot::new("https://careers.example.test/form")
                .node(SnapshotElement::input("text").attr("name", "club_again")),
        );
        let profile = Profile::from_value(json!({ "school": [{ "club": "野球部" }] })).unwrap();
        let shared: Arc<dyn Page> = Arc::new(page.clone());
        PatternAdapter::new(pattern, HeuristicAdapter::default()).fill(&shared, &profile, &FillContext::default());
        assert_eq!(page.value_of(page.by_name("club_again").unwrap()).as_deref(), Some("野球部"));
    }

    #[test]
    fn unmatched_adapter_is_never_selected() {
        let adapter = PatternAdapter::new(Pattern::new("x"), HeuristicAdapter::default());
        assert!(!adapter.matches(&PageSignature::default()));
    }
}
