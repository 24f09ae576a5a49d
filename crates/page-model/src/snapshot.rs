//! JSON form of a document.
//!
//! ```json
//! { "url": "https://example.test/entry",
//!   "nodes": [ { "tag": "label", "attrs": { "for": "sei" }, "children": ["姓"] },
//!              { "tag": "input", "attrs": { "id": "sei", "name": "kanji_sei" } } ] }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::PageError;
use crate::model::RenderState;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default)]
    pub nodes: Vec<SnapshotNode>,
}

impl PageSnapshot {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: String::new(),
            nodes: Vec::new(),
        }
    }

    pub fn node(mut self, node: impl Into<SnapshotNode>) -> Self {
        self.nodes.push(node.into());
        self
    }

    pub fn from_json(text: &str) -> Result<Self, PageError> {
        serde_json::from_str(text).map_err(|err| PageError::InvalidSnapshot(err.to_string()))
    }

    pub fn to_json_pretty(&self) -> Result<String, PageError> {
        serde_json::to_string_pretty(self).map_err(|err| PageError::InvalidSnapshot(err.to_string()))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SnapshotNode {
    Text(String),
    Element(SnapshotElement),
}

impl From<SnapshotElement> for SnapshotNode {
    fn from(element: SnapshotElement) -> Self {
        SnapshotNode::Element(element)
    }
}

impl From<&str> for SnapshotNode {
    fn from(text: &str) -> Self {
        SnapshotNode::Text(text.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnapshotElement {
    pub tag: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    #[serde(default, skip_serializing_if = "RenderState::is_default")]
    pub render: RenderState,
    /// A page framework overrides this control's value setter.
    #[serde(default, skip_serializing_if = "is_false")]
    pub framework_managed: bool,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub native_setter: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SnapshotNode>,
}

impl SnapshotElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: BTreeMap::new(),
            value: None,
            checked: None,
            render: RenderState::default(),
            framework_managed: false,
            native_setter: true,
            children: Vec::new(),
        }
    }

    /// `<input type=..>`
    pub fn input(kind: &str) -> Self {
        Self::new("input").attr("type", kind)
    }

    /// `<option value=..>text</option>`
    pub fn option(value: &str, text: &str) -> Self {
        Self::new("option").attr("value", value).text(text)
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn value(mut self, value: &str) -> Self {
        self.value = Some(value.to_string());
        self
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = Some(checked);
        self
    }

    pub fn render(mut self, render: RenderState) -> Self {
        self.render = render;
        self
    }

    pub fn framework_managed(mut self) -> Self {
        self.framework_managed = true;
        self
    }

    pub fn without_native_setter(mut self) -> Self {
        self.native_setter = false;
        self
    }

    pub fn child(mut self, child: impl Into<SnapshotNode>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn text(self, text: &str) -> Self {
        self.child(SnapshotNode::Text(text.to_string()))
    }
}

fn default_true() -> bool {
    true
}

fn is_true(value: &bool) -> bool {
    *value
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_snapshot() {
        let snapshot = PageSnapshot::from_json(
            r#"{ "url": "https://example.test/entry",
                 "nodes": [ { "tag": "label", "attrs": { "for": "sei" }, "children": ["姓"] },
                            { "tag": "input", "attrs": { "id": "sei" }, "native_setter": false } ] }"#,
        )
        .unwrap();
        assert_eq!(snapshot.nodes.len(), 2);
        let SnapshotNode::Element(input) = &snapshot.nodes[1] else {
            panic!("expected element");
        };
        assert!(!input.native_setter);
        assert!(!input.framework_managed);
    }

    #[test]
    fn rejects_garbage() {
        assert!(PageSnapshot::from_json("{ nope").is_err());
    }
}
