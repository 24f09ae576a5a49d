//! Form element collector: a flat listing of every data control on a page.

use std::fmt;

use entryfill_core_types::ControlKind;
use page_model::{NodeId, Page, PageExt};
use serde::Serialize;

use crate::fillable::{is_fillable, is_non_data_input};
use crate::kind::classify;
use crate::label::label_for;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ControlSummary {
    #[serde(skip)]
    pub node: NodeId,
    pub index: usize,
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ControlKind>,
    pub fillable: bool,
}

impl ControlSummary {
    /// Where a value for this control goes, keyed by its most durable attribute.
    pub fn target_hint(&self) -> String {
        let label = self.label.as_deref().unwrap_or("(no label)");
        match (&self.id, &self.name) {
            (Some(id), _) => format!("id=\"{id}\" <- {label}"),
            (None, Some(name)) => format!("name=\"{name}\" <- {label}"),
            (None, None) => format!("<- {label}"),
        }
    }
}

impl fmt::Display for ControlSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let type_suffix = self
            .input_type
            .as_deref()
            .map(|t| format!("[type={t}]"))
            .unwrap_or_default();
        let mut attrs = vec![
            self.id
                .as_deref()
                .map(|id| format!("id=\"{id}\""))
                .unwrap_or_else(|| "id: (none)".to_string()),
            self.name
                .as_deref()
                .map(|name| format!("name=\"{name}\""))
                .unwrap_or_else(|| "name: (none)".to_string()),
        ];
        if let Some(placeholder) = &self.placeholder {
            attrs.push(format!("placeholder=\"{placeholder}\""));
        }
        write!(
            f,
            "{}. <{}{}> ({}) -> {}",
            self.index + 1,
            self.tag,
            type_suffix,
            attrs.join(", "),
            self.target_hint()
        )
    }
}

/// Every `input`/`select`/`textarea` except non-data inputs, in document order.
pub fn collect(page: &dyn Page) -> Vec<ControlSummary> {
    page.form_controls()
        .into_iter()
        .filter_map(|node| page.element(node).map(|el| (node, el)))
        .filter(|(_, el)| !is_non_data_input(el))
        .enumerate()
        .map(|(index, (node, el))| ControlSummary {
            node,
            index,
            tag: el.tag.to_ascii_lowercase(),
            input_type: el.is_tag("input").then(|| el.input_type()),
            id: el.id().map(str::to_string),
            name: el.name().map(str::to_string),
            placeholder: el.placeholder().map(str::to_string),
            label: label_for(page, node),
            kind: classify(page, node),
            fillable: is_fillable(page, node),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::page;
    use page_model::SnapshotElement;

    #[test]
    fn lists_data_controls_with_hints() {
        let page = page(vec![
            SnapshotElement::new("label").attr("for", "sei").text("姓"),
            SnapshotElement::input("text").attr("id", "sei").attr("name", "kanji_sei"),
            SnapshotElement::input("hidden").attr("name", "csrf"),
            SnapshotElement::new("select").attr("name", "keng"),
            SnapshotElement::input("submit"),
        ]);
        let controls = collect(&page);
        assert_eq!(controls.len(), 2);
        assert_eq!(
            controls[0].to_string(),
            "1. <input[type=text]> (id=\"sei\", name=\"kanji_sei\") -> id=\"sei\" <- 姓"
        );
        assert_eq!(controls[1].kind, Some(ControlKind::Select));
        assert_eq!(controls[1].target_hint(), "name=\"keng\" <- (no label)");

        let json = serde_json::to_value(&controls[0]).unwrap();
        assert_eq!(json["label"], "姓");
        assert_eq!(json["kind"], "text");
    }
}
