use entryfill_core_types::PageId;

use crate::errors::PageError;
use crate::model::{DomEvent, ElementView, NodeId, OptionView, WritePath};

/// Host page port.
///
/// Everything the engine knows about a page it learns through this trait;
/// it assumes no cooperation from the page beyond what an in-page script
/// can do with standard control read/write/query and event dispatch.
pub trait Page: Send + Sync {
    fn page_id(&self) -> PageId;

    fn url(&self) -> String;

    fn root(&self) -> NodeId;

    /// Element snapshot, `None` for text nodes and unknown ids.
    fn element(&self, node: NodeId) -> Option<ElementView>;

    /// Content of a text node, `None` for elements.
    fn text_node(&self, node: NodeId) -> Option<String>;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Child nodes (elements and text) in document order.
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// Whether the control's prototype setter is reachable separately from
    /// any instance-level override.
    fn has_native_setter(&self, node: NodeId) -> bool;

    fn write_value(&self, node: NodeId, value: &str, path: WritePath) -> Result<(), PageError>;

    fn set_checked(&self, node: NodeId, checked: bool) -> Result<(), PageError>;

    fn set_text_content(&self, node: NodeId, text: &str) -> Result<(), PageError>;

    fn toggle_class(&self, node: NodeId, class: &str, on: bool) -> Result<(), PageError>;

    fn dispatch(&self, node: NodeId, event: DomEvent) -> Result<(), PageError>;
}

/// Query helpers built only on the `Page` port.
pub trait PageExt: Page {
    /// Element descendants of `node` in document (pre-)order, excluding `node`.
    fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).into_iter().rev().collect();
        while let Some(current) = stack.pop() {
            if self.element(current).is_some() {
                out.push(current);
                stack.extend(self.children(current).into_iter().rev());
            }
        }
        out
    }

    fn elements(&self) -> Vec<NodeId> {
        self.descendants(self.root())
    }

    fn elements_where<F>(&self, predicate: F) -> Vec<NodeId>
    where
        F: Fn(&ElementView) -> bool,
    {
        self.elements()
            .into_iter()
            .filter(|node| self.element(*node).map(|el| predicate(&el)).unwrap_or(false))
            .collect()
    }

    /// `input`, `select` and `textarea` elements in document order.
    fn form_controls(&self) -> Vec<NodeId> {
        self.elements_where(|el| el.is_form_control())
    }

    fn by_attr(&self, name: &str, value: &str) -> Vec<NodeId> {
        self.elements_where(|el| el.attr(name) == Some(value))
    }

    fn element_children(&self, node: NodeId) -> Vec<NodeId> {
        self.children(node)
            .into_iter()
            .filter(|child| self.element(*child).is_some())
            .collect()
    }

    /// Ancestors from the parent up to (and including) the document root.
    fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.parent(node);
        while let Some(parent) = current {
            out.push(parent);
            current = self.parent(parent);
        }
        out
    }

    /// Concatenated text of all descendant text nodes.
    fn text_content(&self, node: NodeId) -> String {
        if let Some(text) = self.text_node(node) {
            return text;
        }
        let mut out = String::new();
        for child in self.children(node) {
            out.push_str(&self.text_content(child));
        }
        out
    }

    /// Options of a select in document order (including those in optgroups).
    fn options(&self, select: NodeId) -> Vec<OptionView> {
        let current = self.element(select).map(|el| el.value).unwrap_or_default();
        let mut out = Vec::new();
        for node in self.descendants(select) {
            let Some(el) = self.element(node) else { continue };
            if !el.is_tag("option") {
                continue;
            }
            let text = normalize_space(&self.text_content(node));
            let value = el.attr("value").map(str::to_string).unwrap_or_else(|| text.clone());
            out.push(OptionView {
                node,
                selected: el.has_attr("selected") || (!current.is_empty() && value == current),
                value,
                text,
            });
        }
        out
    }

    fn body_id(&self) -> Option<String> {
        self.elements_where(|el| el.is_tag("body"))
            .first()
            .and_then(|node| self.element(*node))
            .and_then(|el| el.id().map(str::to_string))
    }
}

impl<P: Page + ?Sized> PageExt for P {}

/// Trims and collapses runs of whitespace to single spaces.
pub fn normalize_space(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
