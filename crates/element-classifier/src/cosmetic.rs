//! Cosmetic select replacements (nice-select, select2, chosen, ...).
//!
//! The native select stays in the document, usually hidden, and a styled
//! sibling or parent mirrors its selection. Writes go to the native select;
//! the mirror is updated afterwards.

use page_model::{NodeId, Page, PageError, PageExt};
use tracing::debug;

const HIDDEN_SELECT_CLASSES: &[&str] = &["select2-hidden-accessible"];
const WRAPPER_CLASSES: &[&str] = &[
    "nice-select",
    "select2-container",
    "chosen-container",
    "custom-select",
    "fancy-select",
];
const DISPLAY_CLASSES: &[&str] = &[
    "current",
    "select2-selection__rendered",
    "chosen-single",
    "selected-text",
];
const ACTIVE_ITEM_CLASS: &str = "selected";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CosmeticWrapper {
    pub select: NodeId,
    pub wrapper: NodeId,
    /// Element whose text shows the current choice.
    pub display: Option<NodeId>,
    /// Items carrying `data-value`, one per option.
    pub items: Vec<NodeId>,
}

fn has_wrapper_class(page: &dyn Page, node: NodeId) -> bool {
    page.element(node)
        .map(|el| WRAPPER_CLASSES.iter().any(|class| el.has_class(class)))
        .unwrap_or(false)
}

/// Finds the wrapper paired with `select`: its next element sibling or its parent.
pub fn cosmetic_wrapper(page: &dyn Page, select: NodeId) -> Option<CosmeticWrapper> {
    let element = page.element(select)?;
    if !element.is_tag("select") {
        return None;
    }
    let parent = page.parent(select)?;
    let siblings = page.element_children(parent);
    let next = siblings
        .iter()
        .position(|n| *n == select)
        .and_then(|i| siblings.get(i + 1).copied());

    let wrapper = next
        .filter(|n| has_wrapper_class(page, *n))
        .or_else(|| has_wrapper_class(page, parent).then_some(parent))
        .or_else(|| {
            // select2 marks the native control and inserts its container right after it.
            HIDDEN_SELECT_CLASSES
                .iter()
                .any(|class| element.has_class(class))
                .then_some(next)
                .flatten()
        })?;

    let inner: Vec<NodeId> = page
        .descendants(wrapper)
        .into_iter()
        .filter(|n| *n != select && !page.ancestors(*n).contains(&select))
        .collect();
    let display = inner.iter().copied().find(|n| {
        page.element(*n)
            .map(|el| DISPLAY_CLASSES.iter().any(|class| el.has_class(class)))
            .unwrap_or(false)
    });
    let items = inner
        .into_iter()
        .filter(|n| page.element(*n).map(|el| el.has_attr("data-value")).unwrap_or(false))
        .collect();

    Some(CosmeticWrapper {
        select,
        wrapper,
        display,
        items,
    })
}

/// Mirrors the select's current option into its wrapper's label and items.
/// Returns `false` when the select has no wrapper.
pub fn resync_cosmetic(page: &dyn Page, select: NodeId) -> Result<bool, PageError> {
    let Some(wrapper) = cosmetic_wrapper(page, select) else {
        return Ok(false);
    };
    let current = page.element(select).map(|el| el.value).unwrap_or_default();
    let text = page
        .options(select)
        .into_iter()
        .find(|option| option.value == current)
        .map(|option| option.text)
        .unwrap_or_default();

    if let Some(display) = wrapper.display {
        page.set_text_content(display, &text)?;
    }
    for item in &wrapper.items {
        let active = page
            .element(*item)
            .and_then(|el| el.attr("data-value").map(|v| v == current))
            .unwrap_or(false);
        page.toggle_class(*item, ACTIVE_ITEM_CLASS, active)?;
    }
    debug!(?select, label = %text, "cosmetic wrapper resynced");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::page;
    use page_model::{RenderState, SnapshotElement, WritePath};

    fn nice_select() -> SnapshotElement {
        SnapshotElement::new("div")
            .child(
                SnapshotElement::new("select")
                    .attr("name", "pref")
                    .render(RenderState::hidden())
                    .child(SnapshotElement::option("", "選択"))
                    .child(SnapshotElement::option("13", "東京都")),
            )
            .child(
                SnapshotElement::new("div")
                    .attr("class", "nice-select")
                    .child(SnapshotElement::new("span").attr("class", "current").text("選択"))
                    .child(
                        SnapshotElement::new("ul")
                            .child(SnapshotElement::new("li").attr("data-value", "").attr("class", "option selected"))
                            .child(SnapshotElement::new("li").attr("data-value", "13").attr("class", "option")),
                    ),
            )
    }

    #[test]
    fn finds_sibling_wrapper_parts() {
        let page = page(vec![nice_select()]);
        let select = page.by_name("pref").unwrap();
        let wrapper = cosmetic_wrapper(&page, select).unwrap();
        assert!(wrapper.display.is_some());
        assert_eq!(wrapper.items.len(), 2);
    }

    #[test]
    fn resync_moves_label_and_active_item() {
        let page = page(vec![nice_select()]);
        let select = page.by_name("pref").unwrap();
        page.write_value(select, "13", WritePath::Native).unwrap();
        assert!(resync_cosmetic(&page, select).unwrap());

        let wrapper = cosmetic_wrapper(&page, select).unwrap();
        assert_eq!(page.text_content(wrapper.display.unwrap()), "東京都");
        let active: Vec<bool> = wrapper
            .items
            .iter()
            .map(|n| page.element(*n).unwrap().has_class("selected"))
            .collect();
        assert_eq!(active, vec![false, true]);
    }

    #[test]
    fn plain_select_has_no_wrapper() {
        let page = page(vec![SnapshotElement::new("select").attr("name", "x")]);
        let select = page.by_name("x").unwrap();
        assert!(cosmetic_wrapper(&page, select).is_none());
        assert!(!resync_cosmetic(&page, select).unwrap());
    }
}
