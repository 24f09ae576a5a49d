use std::collections::HashSet;

use element_classifier::{cosmetic_wrapper, is_fillable, is_non_data_input, label_for};
use entryfill_core_types::EngineIssue;
use page_model::{NodeId, Page, PageExt};
use tracing::{debug, warn};

use crate::filter::FinderFilter;
use crate::keywords::KeywordSet;

/// Result of a keyword search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Finding {
    pub node: Option<NodeId>,
    /// Controls (radio groups counted once) the winning set matched.
    pub candidates: usize,
    /// Index of the keyword set that matched.
    pub set_index: Option<usize>,
}

impl Finding {
    fn none() -> Self {
        Self {
            node: None,
            candidates: 0,
            set_index: None,
        }
    }

    pub fn is_ambiguous(&self) -> bool {
        self.candidates > 1
    }

    pub fn issue(&self, field: &str) -> Option<EngineIssue> {
        self.is_ambiguous().then(|| EngineIssue::AmbiguousMatch {
            field: field.to_string(),
            candidates: self.candidates,
        })
    }
}

/// Label, placeholder, name and id joined and lower-cased.
pub fn identification_text(page: &dyn Page, node: NodeId) -> String {
    let Some(element) = page.element(node) else {
        return String::new();
    };
    let parts = [
        label_for(page, node),
        element.placeholder().map(str::to_string),
        element.name().map(str::to_string),
        element.id().map(str::to_string),
    ];
    parts
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn writable(page: &dyn Page, node: NodeId) -> bool {
    let Some(element) = page.element(node) else {
        return false;
    };
    if is_non_data_input(&element) || element.is_disabled() {
        return false;
    }
    is_fillable(page, node) || cosmetic_wrapper(page, node).is_some()
}

/// Candidates for one keyword set, radio groups collapsed to their first member.
fn candidates(page: &dyn Page, set: &KeywordSet, filter: &FinderFilter) -> Vec<NodeId> {
    let mut groups = HashSet::new();
    page.form_controls()
        .into_iter()
        .filter(|node| writable(page, *node))
        .filter(|node| set.matches(&identification_text(page, *node)))
        .filter(|node| filter.accepts(page, *node))
        .filter(|node| {
            let Some(element) = page.element(*node) else {
                return false;
            };
            if element.input_type() != "radio" {
                return true;
            }
            groups.insert(element.name().unwrap_or_default().to_string())
        })
        .collect()
}

/// Tries `sets` in priority order; the first set with any match wins and
/// its first control in document order is returned.
pub fn find_detailed(
    page: &dyn Page,
    field: &str,
    sets: &[KeywordSet],
    filter: &FinderFilter,
) -> Finding {
    for (index, set) in sets.iter().enumerate() {
        let found = candidates(page, set, filter);
        let Some(first) = found.first().copied() else {
            continue;
        };
        let finding = Finding {
            node: Some(first),
            candidates: found.len(),
            set_index: Some(index),
        };
        if let Some(issue) = finding.issue(field) {
            warn!(%issue, keywords = ?set.0, "taking first match in document order");
        } else {
            debug!(field, keywords = ?set.0, ?first, "heuristic match");
        }
        return finding;
    }
    debug!(field, "no heuristic match");
    Finding::none()
}

pub fn find(page: &dyn Page, sets: &[KeywordSet], filter: &FinderFilter) -> Option<NodeId> {
    find_detailed(page, "", sets, filter).node
}

/// First writable control whose `name` contains `fragment`; fragments
/// shorter than three characters never match.
pub fn name_contains(page: &dyn Page, fragment: &str, filter: &FinderFilter) -> Option<NodeId> {
    if fragment.chars().count() < 3 {
        return None;
    }
    page.form_controls().into_iter().find(|node| {
        page.element(*node)
            .and_then(|el| el.name().map(|name| name.contains(fragment)))
            .unwrap_or(false)
            && writable(page, *node)
            && filter.accepts(page, *node)
    })
}
