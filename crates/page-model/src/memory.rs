//! Arena-backed in-memory document.
//!
//! Follows browser semantics where the engine depends on them: a select's
//! value tracks its selected option, checking a radio unchecks its group,
//! and unchecked checkboxes still report their `value` (default `on`).

use std::collections::BTreeMap;
use std::sync::Arc;

use entryfill_core_types::PageId;
use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::errors::PageError;
use crate::model::{DomEvent, ElementView, NodeId, RenderState, WritePath};
use crate::port::{Page, PageExt};
use crate::snapshot::{PageSnapshot, SnapshotElement, SnapshotNode};

/// One dispatched notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventRecord {
    pub node: NodeId,
    pub event: DomEvent,
}

type Handler = Arc<dyn Fn(&MemoryPage, NodeId) + Send + Sync>;

struct Listener {
    node: Option<NodeId>,
    event: DomEvent,
    handler: Handler,
}

#[derive(Clone, Debug)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

#[derive(Clone, Debug)]
enum NodeData {
    Document,
    Element(ElementData),
    Text(String),
}

#[derive(Clone, Debug)]
struct ElementData {
    tag: String,
    attrs: BTreeMap<String, String>,
    value: String,
    checked: bool,
    render: RenderState,
    framework_managed: bool,
    native_setter: bool,
}

struct Dom {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Dom {
    fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                data: NodeData::Document,
            }],
            root: NodeId(0),
        }
    }

    fn node(&self, id: NodeId) -> Result<&Node, PageError> {
        self.nodes.get(id.0).ok_or(PageError::UnknownNode(id))
    }

    fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.nodes.get(id.0)?.data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut ElementData, PageError> {
        let node = self.nodes.get_mut(id.0).ok_or(PageError::UnknownNode(id))?;
        match &mut node.data {
            NodeData::Element(element) => Ok(element),
            _ => Err(PageError::NotAnElement(id)),
        }
    }

    fn push(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            data,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    fn append(&mut self, parent: NodeId, node: &SnapshotNode) -> NodeId {
        match node {
            SnapshotNode::Text(text) => self.push(parent, NodeData::Text(text.clone())),
            SnapshotNode::Element(element) => self.append_element(parent, element),
        }
    }

    fn append_element(&mut self, parent: NodeId, spec: &SnapshotElement) -> NodeId {
        let tag = spec.tag.to_ascii_lowercase();
        let input_type = spec
            .attrs
            .get("type")
            .map(|t| t.to_ascii_lowercase())
            .unwrap_or_default();
        let checkable = tag == "input" && (input_type == "checkbox" || input_type == "radio");
        let default_value = match spec.attrs.get("value") {
            Some(value) => value.clone(),
            None if checkable => "on".to_string(),
            None => String::new(),
        };
        let data = ElementData {
            tag: tag.clone(),
            attrs: spec.attrs.clone(),
            value: default_value,
            checked: spec.checked.unwrap_or_else(|| spec.attrs.contains_key("checked")),
            render: spec.render.clone(),
            framework_managed: spec.framework_managed,
            native_setter: spec.native_setter,
        };
        let id = self.push(parent, NodeData::Element(data));
        for child in &spec.children {
            self.append(id, child);
        }

        match tag.as_str() {
            "textarea" => {
                let text = spec.value.clone().unwrap_or_else(|| self.text_of(id));
                if let Ok(element) = self.element_mut(id) {
                    element.value = text;
                }
            }
            "select" => match &spec.value {
                Some(value) => self.set_select_value(id, value),
                None => self.sync_select_value(id),
            },
            _ => {
                if let (Some(value), Ok(element)) = (&spec.value, self.element_mut(id)) {
                    element.value = value.clone();
                }
            }
        }
        id
    }

    fn text_of(&self, id: NodeId) -> String {
        let Some(node) = self.nodes.get(id.0) else {
            return String::new();
        };
        match &node.data {
            NodeData::Text(text) => text.clone(),
            _ => node.children.iter().map(|child| self.text_of(*child)).collect(),
        }
    }

    fn options_of(&self, select: NodeId) -> Vec<(NodeId, String)> {
        let mut out = Vec::new();
        self.collect_options(select, &mut out);
        out
    }

    fn collect_options(&self, node: NodeId, out: &mut Vec<(NodeId, String)>) {
        let Some(current) = self.nodes.get(node.0) else { return };
        for child in &current.children {
            if let Some(element) = self.element(*child) {
                if element.tag == "option" {
                    let value = element
                        .attrs
                        .get("value")
                        .cloned()
                        .unwrap_or_else(|| self.text_of(*child).trim().to_string());
                    out.push((*child, value));
                }
            }
            self.collect_options(*child, out);
        }
    }

    fn set_select_value(&mut self, select: NodeId, requested: &str) {
        let options = self.options_of(select);
        let matched = options
            .iter()
            .find(|(_, value)| value == requested)
            .map(|(node, value)| (*node, value.clone()));
        for (option, _) in &options {
            if let Ok(element) = self.element_mut(*option) {
                if Some(*option) == matched.as_ref().map(|(node, _)| *node) {
                    element.attrs.insert("selected".into(), "selected".into());
                } else {
                    element.attrs.remove("selected");
                }
            }
        }
        if let Ok(element) = self.element_mut(select) {
            element.value = matched.map(|(_, value)| value).unwrap_or_default();
        }
    }

    fn sync_select_value(&mut self, select: NodeId) {
        let options = self.options_of(select);
        let chosen = options
            .iter()
            .find(|(node, _)| {
                self.element(*node)
                    .map(|el| el.attrs.contains_key("selected"))
                    .unwrap_or(false)
            })
            .or_else(|| options.first())
            .map(|(_, value)| value.clone())
            .unwrap_or_default();
        if let Ok(element) = self.element_mut(select) {
            element.value = chosen;
        }
    }

    fn to_snapshot_node(&self, id: NodeId) -> Option<SnapshotNode> {
        let node = self.nodes.get(id.0)?;
        match &node.data {
            NodeData::Text(text) => Some(SnapshotNode::Text(text.clone())),
            NodeData::Document => None,
            NodeData::Element(element) => {
                let is_control = matches!(element.tag.as_str(), "input" | "select" | "textarea");
                let is_checkable = element.tag == "input"
                    && matches!(
                        element.attrs.get("type").map(|t| t.to_ascii_lowercase()).as_deref(),
                        Some("checkbox") | Some("radio")
                    );
                let mut attrs = element.attrs.clone();
                if is_checkable {
                    attrs.remove("checked");
                }
                Some(SnapshotNode::Element(SnapshotElement {
                    tag: element.tag.clone(),
                    attrs,
                    value: (is_control && !is_checkable && element.tag != "select")
                        .then(|| element.value.clone()),
                    checked: is_checkable.then_some(element.checked),
                    render: element.render.clone(),
                    framework_managed: element.framework_managed,
                    native_setter: element.native_setter,
                    children: node
                        .children
                        .iter()
                        .filter_map(|child| self.to_snapshot_node(*child))
                        .collect(),
                }))
            }
        }
    }
}

struct Inner {
    id: PageId,
    url: RwLock<String>,
    title: RwLock<String>,
    dom: RwLock<Dom>,
    events: Mutex<Vec<EventRecord>>,
    listeners: RwLock<Vec<Listener>>,
}

/// Shared handle to an in-memory document. Clones refer to the same page.
#[derive(Clone)]
pub struct MemoryPage {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for MemoryPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryPage")
            .field("id", &self.inner.id)
            .field("url", &*self.inner.url.read())
            .finish()
    }
}

impl MemoryPage {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Inner {
                id: PageId::new(),
                url: RwLock::new(url.into()),
                title: RwLock::new(String::new()),
                dom: RwLock::new(Dom::new()),
                events: Mutex::new(Vec::new()),
                listeners: RwLock::new(Vec::new()),
            }),
        }
    }

    pub fn from_snapshot(snapshot: &PageSnapshot) -> Self {
        let page = Self::new(snapshot.url.clone());
        *page.inner.title.write() = snapshot.title.clone();
        {
            let mut dom = page.inner.dom.write();
            let root = dom.root;
            for node in &snapshot.nodes {
                dom.append(root, node);
            }
        }
        page
    }

    pub fn snapshot(&self) -> PageSnapshot {
        let dom = self.inner.dom.read();
        let nodes = dom.nodes[dom.root.0]
            .children
            .iter()
            .filter_map(|child| dom.to_snapshot_node(*child))
            .collect();
        PageSnapshot {
            url: self.inner.url.read().clone(),
            title: self.inner.title.read().clone(),
            nodes,
        }
    }

    pub fn title(&self) -> String {
        self.inner.title.read().clone()
    }

    /// Appends a subtree under `parent` and returns the new node.
    pub fn append(&self, parent: NodeId, node: impl Into<SnapshotNode>) -> Result<NodeId, PageError> {
        let mut dom = self.inner.dom.write();
        dom.node(parent)?;
        Ok(dom.append(parent, &node.into()))
    }

    /// Replaces every option of `select` with `(value, text)` pairs.
    pub fn replace_options(&self, select: NodeId, options: &[(&str, &str)]) -> Result<(), PageError> {
        let mut dom = self.inner.dom.write();
        dom.element_mut(select)?;
        let old = std::mem::take(&mut dom.nodes[select.0].children);
        for child in old {
            dom.nodes[child.0].parent = None;
        }
        for (value, text) in options {
            dom.append(select, &SnapshotElement::option(value, text).into());
        }
        dom.sync_select_value(select);
        Ok(())
    }

    pub fn set_render(&self, node: NodeId, render: RenderState) -> Result<(), PageError> {
        self.inner.dom.write().element_mut(node)?.render = render;
        Ok(())
    }

    pub fn set_attr(&self, node: NodeId, name: &str, value: &str) -> Result<(), PageError> {
        self.inner
            .dom
            .write()
            .element_mut(node)?
            .attrs
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    /// First element whose `name` attribute equals `name`.
    pub fn by_name(&self, name: &str) -> Option<NodeId> {
        self.by_attr("name", name).into_iter().next()
    }

    /// First element whose `id` attribute equals `id`.
    pub fn by_id(&self, id: &str) -> Option<NodeId> {
        self.by_attr("id", id).into_iter().next()
    }

    pub fn value_of(&self, node: NodeId) -> Option<String> {
        self.element(node).map(|el| el.value)
    }

    pub fn events(&self) -> Vec<EventRecord> {
        self.inner.events.lock().clone()
    }

    pub fn events_for(&self, node: NodeId) -> Vec<DomEvent> {
        self.inner
            .events
            .lock()
            .iter()
            .filter(|record| record.node == node)
            .map(|record| record.event)
            .collect()
    }

    pub fn clear_events(&self) {
        self.inner.events.lock().clear();
    }

    /// Registers a page-side reaction to an event, on one node or any node.
    pub fn on<F>(&self, event: DomEvent, node: Option<NodeId>, handler: F)
    where
        F: Fn(&MemoryPage, NodeId) + Send + Sync + 'static,
    {
        self.inner.listeners.write().push(Listener {
            node,
            event,
            handler: Arc::new(handler),
        });
    }
}

impl Page for MemoryPage {
    fn page_id(&self) -> PageId {
        self.inner.id.clone()
    }

    fn url(&self) -> String {
        self.inner.url.read().clone()
    }

    fn root(&self) -> NodeId {
        self.inner.dom.read().root
    }

    fn element(&self, node: NodeId) -> Option<ElementView> {
        let dom = self.inner.dom.read();
        let element = dom.element(node)?;
        Some(ElementView {
            node,
            tag: element.tag.clone(),
            attrs: element.attrs.clone(),
            value: element.value.clone(),
            checked: element.checked,
            render: element.render.clone(),
        })
    }

    fn text_node(&self, node: NodeId) -> Option<String> {
        match &self.inner.dom.read().nodes.get(node.0)?.data {
            NodeData::Text(text) => Some(text.clone()),
            _ => None,
        }
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.inner.dom.read().nodes.get(node.0)?.parent
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.inner
            .dom
            .read()
            .nodes
            .get(node.0)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn has_native_setter(&self, node: NodeId) -> bool {
        self.inner
            .dom
            .read()
            .element(node)
            .map(|el| el.native_setter)
            .unwrap_or(false)
    }

    fn write_value(&self, node: NodeId, value: &str, path: WritePath) -> Result<(), PageError> {
        let mut dom = self.inner.dom.write();
        let element = dom.element_mut(node)?;
        match path {
            WritePath::Native if !element.native_setter => {
                return Err(PageError::NativeSetterUnavailable(node));
            }
            WritePath::Assignment if element.framework_managed => {
                // The framework's instance setter keeps its own state; the DOM value is untouched.
                debug!(?node, "assignment swallowed by framework-managed setter");
                return Ok(());
            }
            _ => {}
        }
        if element.tag != "select" {
            element.value = value.to_string();
            return Ok(());
        }
        dom.set_select_value(node, value);
        Ok(())
    }

    fn set_checked(&self, node: NodeId, checked: bool) -> Result<(), PageError> {
        let mut dom = self.inner.dom.write();
        let element = dom.element_mut(node)?;
        element.checked = checked;
        let is_radio = element.attrs.get("type").map(|t| t.eq_ignore_ascii_case("radio")) == Some(true);
        let group = element.attrs.get("name").cloned();
        if checked && is_radio {
            if let Some(group) = group {
                let peers: Vec<NodeId> = (0..dom.nodes.len())
                    .map(NodeId)
                    .filter(|id| *id != node)
                    .filter(|id| {
                        dom.element(*id)
                            .map(|el| {
                                el.tag == "input"
                                    && el.attrs.get("type").map(|t| t.eq_ignore_ascii_case("radio"))
                                        == Some(true)
                                    && el.attrs.get("name") == Some(&group)
                            })
                            .unwrap_or(false)
                    })
                    .collect();
                for peer in peers {
                    dom.element_mut(peer)?.checked = false;
                }
            }
        }
        Ok(())
    }

    fn set_text_content(&self, node: NodeId, text: &str) -> Result<(), PageError> {
        let mut dom = self.inner.dom.write();
        dom.element_mut(node)?;
        let old = std::mem::take(&mut dom.nodes[node.0].children);
        for child in old {
            dom.nodes[child.0].parent = None;
        }
        dom.push(node, NodeData::Text(text.to_string()));
        Ok(())
    }

    fn toggle_class(&self, node: NodeId, class: &str, on: bool) -> Result<(), PageError> {
        let mut dom = self.inner.dom.write();
        let element = dom.element_mut(node)?;
        let mut classes: Vec<String> = element
            .attrs
            .get("class")
            .map(|c| c.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        let present = classes.iter().any(|c| c == class);
        if on && !present {
            classes.push(class.to_string());
        } else if !on && present {
            classes.retain(|c| c != class);
        }
        element.attrs.insert("class".to_string(), classes.join(" "));
        Ok(())
    }

    fn dispatch(&self, node: NodeId, event: DomEvent) -> Result<(), PageError> {
        self.inner.dom.read().node(node)?;
        self.inner.events.lock().push(EventRecord { node, event });
        let handlers: Vec<Handler> = self
            .inner
            .listeners
            .read()
            .iter()
            .filter(|l| l.event == event && l.node.map(|n| n == node).unwrap_or(true))
            .map(|l| l.handler.clone())
            .collect();
        for handler in handlers {
            handler(self, node);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sample() -> MemoryPage {
        MemoryPage::from_snapshot(
            &PageSnapshot::new("https://example.test/form")
                .node(
                    SnapshotElement::new("select")
                        .attr("id", "pref")
                        .child(SnapshotElement::option("", "選択してください"))
                        .child(SnapshotElement::option("13", "東京都"))
                        .child(SnapshotElement::option("27", "大阪府")),
                )
                .node(SnapshotElement::input("radio").attr("name", "sex").attr("value", "1"))
                .node(SnapshotElement::input("radio").attr("name", "sex").attr("value", "2"))
                .node(SnapshotElement::input("checkbox").attr("name", "agree"))
                .node(SnapshotElement::input("text").attr("name", "react").framework_managed()),
        )
    }

    #[test]
    fn select_value_follows_selected_option() {
        let page = sample();
        let select = page.by_id("pref").unwrap();
        assert_eq!(page.value_of(select).as_deref(), Some(""));
        page.write_value(select, "13", WritePath::Native).unwrap();
        assert_eq!(page.value_of(select).as_deref(), Some("13"));
        let selected: Vec<_> = page
            .options(select)
            .into_iter()
            .filter(|o| o.selected)
            .map(|o| o.text)
            .collect();
        assert_eq!(selected, vec!["東京都".to_string()]);
        page.write_value(select, "99", WritePath::Native).unwrap();
        assert_eq!(page.value_of(select).as_deref(), Some(""));
    }

    #[test]
    fn checking_a_radio_unchecks_its_group() {
        let page = sample();
        let radios = page.by_attr("name", "sex");
        page.set_checked(radios[0], true).unwrap();
        page.set_checked(radios[1], true).unwrap();
        assert!(!page.element(radios[0]).unwrap().checked);
        assert!(page.element(radios[1]).unwrap().checked);
    }

    #[test]
    fn checkbox_value_defaults_to_on() {
        let page = sample();
        let agree = page.by_name("agree").unwrap();
        assert_eq!(page.value_of(agree).as_deref(), Some("on"));
    }

    #[test]
    fn framework_managed_assignment_is_swallowed() {
        let page = sample();
        let node = page.by_name("react").unwrap();
        page.write_value(node, "x", WritePath::Assignment).unwrap();
        assert_eq!(page.value_of(node).as_deref(), Some(""));
        page.write_value(node, "x", WritePath::Native).unwrap();
        assert_eq!(page.value_of(node).as_deref(), Some("x"));
    }

    #[test]
    fn listeners_fire_after_dispatch() {
        let page = sample();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let agree = page.by_name("agree").unwrap();
        page.on(DomEvent::Click, Some(agree), move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        page.dispatch(agree, DomEvent::Click).unwrap();
        page.dispatch(agree, DomEvent::Change).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(page.events_for(agree), vec![DomEvent::Click, DomEvent::Change]);
    }

    #[test]
    fn replace_options_resets_selection() {
        let page = sample();
        let select = page.by_id("pref").unwrap();
        page.replace_options(select, &[("", "--"), ("a", "A")]).unwrap();
        assert_eq!(page.options(select).len(), 2);
        assert_eq!(page.value_of(select).as_deref(), Some(""));
    }

    #[test]
    fn snapshot_reflects_writes() {
        let page = sample();
        let node = page.by_name("react").unwrap();
        page.write_value(node, "typed", WritePath::Native).unwrap();
        let json = page.snapshot().to_json_pretty().unwrap();
        let reloaded = MemoryPage::from_snapshot(&PageSnapshot::from_json(&json).unwrap());
        let again = reloaded.by_name("react").unwrap();
        assert_eq!(reloaded.value_of(again).as_deref(), Some("typed"));
    }
}
