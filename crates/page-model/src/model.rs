use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// Notifications a manual edit produces; dispatched after every engine write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomEvent {
    Input,
    Change,
    Blur,
    Click,
}

/// How a value write reaches the control.
///
/// `Native` calls the element prototype's own setter, bypassing any
/// framework override installed on the instance. `Assignment` goes through
/// whatever setter the instance exposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WritePath {
    Native,
    Assignment,
}

/// Computed rendering facts for one element.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderState {
    pub display_none: bool,
    pub visibility_hidden: bool,
    pub zero_size: bool,
}

impl RenderState {
    pub fn hidden() -> Self {
        Self {
            display_none: true,
            ..Self::default()
        }
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Read-only view of an element at the time of the call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementView {
    pub node: NodeId,
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
    pub value: String,
    pub checked: bool,
    pub render: RenderState,
}

impl ElementView {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id").filter(|id| !id.trim().is_empty())
    }

    pub fn name(&self) -> Option<&str> {
        self.attr("name").filter(|name| !name.trim().is_empty())
    }

    pub fn placeholder(&self) -> Option<&str> {
        self.attr("placeholder").filter(|text| !text.trim().is_empty())
    }

    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    /// Lower-cased `type` of an input; `text` when absent. Empty for other tags.
    pub fn input_type(&self) -> String {
        if !self.is_tag("input") {
            return String::new();
        }
        self.attr("type")
            .map(|t| t.trim().to_ascii_lowercase())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "text".to_string())
    }

    pub fn classes(&self) -> Vec<&str> {
        self.attr("class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().iter().any(|c| *c == class)
    }

    pub fn max_length(&self) -> Option<usize> {
        self.attr("maxlength").and_then(|v| v.trim().parse().ok())
    }

    pub fn is_disabled(&self) -> bool {
        self.has_attr("disabled")
    }

    pub fn is_form_control(&self) -> bool {
        self.is_tag("input") || self.is_tag("select") || self.is_tag("textarea")
    }
}

/// One `<option>` of a select.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionView {
    pub node: NodeId,
    pub value: String,
    pub text: String,
    pub selected: bool,
}
