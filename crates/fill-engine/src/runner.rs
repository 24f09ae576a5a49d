use std::collections::HashSet;

use element_classifier::{classify, is_fillable, resync_cosmetic, split_group};
use entryfill_core_types::{ControlKind, FieldValue};
use page_model::{normalize_space, NodeId, Page, PageExt};
use tracing::{debug, instrument};

use crate::errors::FillError;
use crate::model::FillTally;
use crate::policy::FillPolicy;
use crate::segments::segments_for;
use crate::write::{write_checked, write_text};

/// One fill run's bookkeeping: the policy and the radio groups and split
/// groups already handled, so several locators hitting the same group
/// write it once.
#[derive(Debug, Default)]
pub struct FillSession {
    policy: FillPolicy,
    visited: HashSet<NodeId>,
    tally: FillTally,
}

impl FillSession {
    pub fn new(policy: FillPolicy) -> Self {
        Self {
            policy,
            visited: HashSet::new(),
            tally: FillTally::default(),
        }
    }

    pub fn policy(&self) -> &FillPolicy {
        &self.policy
    }

    pub fn tally(&self) -> FillTally {
        self.tally
    }

    /// Records a field whose locator and fallbacks found nothing.
    pub fn record_unresolvable(&mut self) {
        self.tally += FillTally::unresolvable();
    }

    /// Whether the control (or its group) was already handled this run.
    pub fn visited(&self, page: &dyn Page, node: NodeId) -> bool {
        self.visited.contains(&group_key(page, node))
    }

    /// Applies `value` to every resolved control that is fillable.
    #[instrument(skip_all, fields(field = %field, controls = nodes.len()))]
    pub fn apply_field(
        &mut self,
        page: &dyn Page,
        field: &str,
        nodes: &[NodeId],
        value: &FieldValue,
    ) -> Result<FillTally, FillError> {
        if !self.policy.enabled {
            return Err(FillError::Disabled);
        }
        let mut tally = FillTally::default();
        for node in nodes {
            if !is_fillable(page, *node) {
                debug!(?node, "control not fillable; skipped");
                continue;
            }
            let key = group_key(page, *node);
            if !self.visited.insert(key) {
                debug!(?node, "group already handled this run");
                continue;
            }
            tally += apply(page, *node, value, &self.policy)?;
        }
        self.tally += tally;
        Ok(tally)
    }
}

/// Radio groups are keyed by their first member, split groups likewise.
fn group_key(page: &dyn Page, node: NodeId) -> NodeId {
    if let Some(group) = split_group(page, node) {
        return group.first();
    }
    radio_group(page, node).first().copied().unwrap_or(node)
}

fn radio_group(page: &dyn Page, node: NodeId) -> Vec<NodeId> {
    let Some(element) = page.element(node) else {
        return Vec::new();
    };
    if element.input_type() != "radio" {
        return vec![node];
    }
    match element.name() {
        Some(name) => page.elements_where(|el| el.input_type() == "radio" && el.name() == Some(name)),
        None => vec![node],
    }
}

/// Applies `value` to one control according to its kind.
pub fn apply(page: &dyn Page, node: NodeId, value: &FieldValue, policy: &FillPolicy) -> Result<FillTally, FillError> {
    if !policy.enabled {
        return Err(FillError::Disabled);
    }
    if value.is_empty() {
        return Ok(FillTally::default());
    }
    let Some(kind) = classify(page, node) else {
        return Ok(FillTally::incompatible());
    };
    let tally = match (kind, value) {
        (ControlKind::Text, FieldValue::Text(text)) => apply_text(page, node, text, policy)?,
        (ControlKind::Select, FieldValue::Text(text)) => apply_select(page, node, text, policy)?,
        (ControlKind::Radio, FieldValue::Text(text)) => apply_radio(page, node, text)?,
        (ControlKind::Checkbox, value) => apply_checkbox(page, node, value)?,
        (ControlKind::SplitSegment, FieldValue::Text(text)) => apply_split(page, node, text, policy)?,
        (_, FieldValue::Flag(_)) => FillTally::incompatible(),
    };
    debug!(?node, kind = kind.label(), ?tally, "control processed");
    Ok(tally)
}

fn current_value(page: &dyn Page, node: NodeId) -> String {
    page.element(node).map(|el| el.value).unwrap_or_default()
}

fn apply_text(page: &dyn Page, node: NodeId, text: &str, policy: &FillPolicy) -> Result<FillTally, FillError> {
    let current = current_value(page, node);
    if !current.trim().is_empty() {
        // Matching or not, what is there stays.
        return Ok(FillTally::already_filled());
    }
    write_text(page, node, text, policy)?;
    Ok(FillTally::applied(1))
}

fn apply_select(page: &dyn Page, node: NodeId, text: &str, policy: &FillPolicy) -> Result<FillTally, FillError> {
    if !current_value(page, node).trim().is_empty() {
        return Ok(FillTally::already_filled());
    }
    let wanted = text.trim();
    let comparable = |s: &str| {
        if policy.text_match_ignores_whitespace {
            normalize_space(s)
        } else {
            s.trim().to_string()
        }
    };
    let options = page.options(node);
    let hit = options
        .iter()
        .find(|option| !option.value.is_empty() && option.value == wanted)
        .or_else(|| {
            options
                .iter()
                .find(|option| !option.value.is_empty() && comparable(&option.text) == comparable(wanted))
        });
    let Some(option) = hit else {
        debug!(?node, wanted, "no option matches");
        return Ok(FillTally::unmatched());
    };
    write_text(page, node, &option.value, policy)?;
    resync_cosmetic(page, node)?;
    Ok(FillTally::applied(1))
}

fn apply_radio(page: &dyn Page, node: NodeId, text: &str) -> Result<FillTally, FillError> {
    let group = radio_group(page, node);
    let views: Vec<_> = group.iter().filter_map(|n| page.element(*n)).collect();
    if views.iter().any(|el| el.checked) {
        return Ok(FillTally::already_filled());
    }
    let Some(target) = views.iter().find(|el| el.value == text.trim()) else {
        return Ok(FillTally::unmatched());
    };
    write_checked(page, target.node, true)?;
    Ok(FillTally::applied(1))
}

fn apply_checkbox(page: &dyn Page, node: NodeId, value: &FieldValue) -> Result<FillTally, FillError> {
    let Some(element) = page.element(node) else {
        return Ok(FillTally::incompatible());
    };
    match value {
        FieldValue::Flag(wanted) => {
            if element.checked == *wanted {
                return Ok(FillTally::already_filled());
            }
            write_checked(page, node, *wanted)?;
            Ok(FillTally::applied(1))
        }
        FieldValue::Text(text) => {
            if element.value != text.trim() {
                return Ok(FillTally::unmatched());
            }
            if element.checked {
                return Ok(FillTally::already_filled());
            }
            write_checked(page, node, true)?;
            Ok(FillTally::applied(1))
        }
    }
}

fn apply_split(page: &dyn Page, node: NodeId, text: &str, policy: &FillPolicy) -> Result<FillTally, FillError> {
    let Some(group) = split_group(page, node) else {
        return apply_text(page, node, text, policy);
    };
    let members = group.routed(page);
    let segments = segments_for(text, members.len());
    if segments.is_empty() {
        return Ok(FillTally::unmatched());
    }
    // Fewer segments than inputs: the leading (area) part is the one missing.
    let offset = members.len().saturating_sub(segments.len());

    let mut tally = FillTally {
        attempted: 1,
        ..FillTally::default()
    };
    let mut all_filled = true;
    for (member, segment) in members[offset..].iter().zip(&segments) {
        if !current_value(page, *member).trim().is_empty() {
            continue;
        }
        all_filled = false;
        write_text(page, *member, segment, policy)?;
        tally.applied += 1;
    }
    if all_filled {
        tally.skipped_already_filled = 1;
    }
    Ok(tally)
}
