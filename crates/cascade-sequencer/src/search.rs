//! Page-side affordances a cascade relies on.

use element_classifier::is_rendered;
use page_model::{normalize_space, NodeId, Page, PageExt};

use crate::model::SelectedBy;
use crate::values::StageValue;

fn contains_phrase(text: &str, phrases: &[String]) -> bool {
    let text = text.to_lowercase();
    phrases
        .iter()
        .any(|phrase| !phrase.is_empty() && text.contains(&phrase.to_lowercase()))
}

/// The page's own search control: a button, link or button-type input whose
/// visible label contains one of `phrases`. Rendered candidates win.
pub fn find_search_button(page: &dyn Page, phrases: &[String]) -> Option<NodeId> {
    let clickable = page.elements_where(|el| {
        let kind_ok = el.is_tag("button")
            || el.is_tag("a")
            || (el.is_tag("input") && matches!(el.input_type().as_str(), "button" | "submit" | "image"));
        kind_ok && !el.is_disabled()
    });
    let labelled: Vec<NodeId> = clickable
        .into_iter()
        .filter(|node| {
            let attr_hit = page
                .element(*node)
                .map(|el| {
                    [el.attr("value"), el.attr("alt"), el.attr("title")]
                        .into_iter()
                        .flatten()
                        .any(|text| contains_phrase(text, phrases))
                })
                .unwrap_or(false);
            attr_hit || contains_phrase(&page.text_content(*node), phrases)
        })
        .collect();
    labelled
        .iter()
        .copied()
        .find(|node| is_rendered(page, *node))
        .or_else(|| labelled.first().copied())
}

pub fn option_count(page: &dyn Page, select: NodeId) -> usize {
    page.options(select).len()
}

/// Picks an option for `wanted`: by code, then by visible text, then the
/// manual-entry option.
pub fn choose_option(
    page: &dyn Page,
    select: NodeId,
    wanted: &StageValue,
    not_in_list: &[String],
) -> Option<(String, SelectedBy)> {
    let options = page.options(select);
    if let Some(code) = &wanted.code {
        if let Some(option) = options.iter().find(|o| !o.value.is_empty() && o.value == *code) {
            return Some((option.value.clone(), SelectedBy::Code));
        }
    }
    if let Some(text) = &wanted.text {
        let text = normalize_space(text);
        if let Some(option) = options
            .iter()
            .find(|o| !o.value.is_empty() && normalize_space(&o.text) == text)
        {
            return Some((option.value.clone(), SelectedBy::Text));
        }
    }
    options
        .iter()
        .find(|o| !o.value.is_empty() && contains_phrase(&o.text, not_in_list))
        .map(|o| (o.value.clone(), SelectedBy::NotInList))
}
