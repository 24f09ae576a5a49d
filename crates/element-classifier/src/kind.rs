use entryfill_core_types::ControlKind;
use page_model::{ElementView, NodeId, Page, PageExt};

use crate::fillable::is_non_data_input;

/// Widest `maxlength` a split segment may declare.
const MAX_SEGMENT_LENGTH: usize = 4;

/// Input types that take free text.
pub fn is_text_like(element: &ElementView) -> bool {
    if element.is_tag("textarea") {
        return true;
    }
    if !element.is_tag("input") {
        return false;
    }
    matches!(
        element.input_type().as_str(),
        "text" | "tel" | "email" | "number" | "search" | "url" | "password" | "date" | "month"
    )
}

/// 2-3 text inputs sharing a parent whose widths fit a postal code (3+4)
/// or a phone number. Only `split_group` builds one, so it is never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitGroup {
    members: Vec<NodeId>,
}

impl SplitGroup {
    /// Members in document order.
    pub fn members(&self) -> &[NodeId] {
        &self.members
    }

    pub fn first(&self) -> NodeId {
        self.members[0]
    }

    /// Members in segment order: declared maxlength ascending, stable on document order.
    pub fn routed(&self, page: &dyn Page) -> Vec<NodeId> {
        let mut ordered: Vec<(usize, NodeId)> = self
            .members
            .iter()
            .map(|n| {
                let width = page
                    .element(*n)
                    .and_then(|el| el.max_length())
                    .unwrap_or(MAX_SEGMENT_LENGTH);
                (width, *n)
            })
            .collect();
        ordered.sort_by_key(|(width, _)| *width);
        ordered.into_iter().map(|(_, n)| n).collect()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.members.contains(&node)
    }
}

/// The split group `node` belongs to, if any.
pub fn split_group(page: &dyn Page, node: NodeId) -> Option<SplitGroup> {
    let element = page.element(node)?;
    if !element.is_tag("input") || !is_text_like(&element) {
        return None;
    }
    let parent = page.parent(node)?;
    page.element(parent)?;
    let members: Vec<NodeId> = page
        .descendants(parent)
        .into_iter()
        .filter(|n| {
            page.element(*n)
                .map(|el| el.is_tag("input") && is_text_like(&el))
                .unwrap_or(false)
        })
        .collect();
    if !(2..=3).contains(&members.len()) {
        return None;
    }
    let widths: Option<Vec<usize>> = members
        .iter()
        .map(|n| {
            page.element(*n)
                .and_then(|el| el.max_length())
                .filter(|len| *len > 0 && *len <= MAX_SEGMENT_LENGTH)
        })
        .collect();
    let widths = widths?;
    segment_shape(&widths).then_some(SplitGroup { members })
}

/// Postal code: 3 then 4. Phone: the last box takes 4 digits and one of the
/// first two takes at least 3. Date boxes (4/2/2, 2/2/4) fit neither.
fn segment_shape(widths: &[usize]) -> bool {
    match widths {
        [3, 4] => true,
        [lead, middle, 4] => *lead >= 3 || *middle >= 3,
        _ => false,
    }
}

/// Control-type semantics for `node`; `None` for anything that holds no data.
pub fn classify(page: &dyn Page, node: NodeId) -> Option<ControlKind> {
    let element = page.element(node)?;
    if element.is_tag("select") {
        return Some(ControlKind::Select);
    }
    if element.is_tag("textarea") {
        return Some(ControlKind::Text);
    }
    if !element.is_tag("input") || is_non_data_input(&element) {
        return None;
    }
    match element.input_type().as_str() {
        "radio" => Some(ControlKind::Radio),
        "checkbox" => Some(ControlKind::Checkbox),
        _ if split_group(page, node).is_some() => Some(ControlKind::SplitSegment),
        _ => Some(ControlKind::Text),
    }
}
