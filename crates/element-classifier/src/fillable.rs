use page_model::{ElementView, NodeId, Page, PageExt};

use crate::cosmetic::cosmetic_wrapper;

const NON_DATA_INPUT_TYPES: &[&str] = &["submit", "reset", "image", "file", "hidden", "button"];

pub fn is_non_data_input(element: &ElementView) -> bool {
    element.is_tag("input") && NON_DATA_INPUT_TYPES.contains(&element.input_type().as_str())
}

/// Rendered: no `display:none` on the control or any ancestor, not
/// `visibility:hidden` (inherited) and not zero-sized.
pub fn is_rendered(page: &dyn Page, node: NodeId) -> bool {
    let Some(element) = page.element(node) else {
        return false;
    };
    if element.render.display_none || element.render.visibility_hidden || element.render.zero_size {
        return false;
    }
    !page.ancestors(node).into_iter().any(|ancestor| {
        page.element(ancestor)
            .map(|el| el.render.display_none || el.render.visibility_hidden)
            .unwrap_or(false)
    })
}

/// Whether the engine may write `node` now.
///
/// A select replaced by a cosmetic wrapper stays fillable while hidden.
pub fn is_fillable(page: &dyn Page, node: NodeId) -> bool {
    let Some(element) = page.element(node) else {
        return false;
    };
    if !element.is_form_control() || element.is_disabled() || is_non_data_input(&element) {
        return false;
    }
    is_rendered(page, node) || cosmetic_wrapper(page, node).is_some()
}
