//! Arena-backed document.
//!
//! Nodes are appended to a flat `Vec` and addressed by `NodeId`; ids are never reused,
//! so a `NodeId` handed out once stays valid for the life of the document even as new
//! subtrees are inserted. Element attributes and live form state are kept apart: the
//! attribute is what the markup said, the live state is what a user (or the engine)
//! typed, checked, or selected.

use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use url::Url;

use crate::dom::error::DomError;
use crate::dom::events::{DispatchedEvent, EventInit, EventKind};
use crate::dom::mutation::{AddedNode, MutationRecord};
use crate::dom::selector::SelectorProbe;

/// Element names the engine treats as form fields.
pub const FORM_FIELD_TAGS: &[&str] = &["input", "select", "textarea"];

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct ElementData {
    tag: String,
    attrs: Vec<(String, String)>,
    value: String,
    dirty: bool,
    checked: bool,
    selected: bool,
}

impl ElementData {
    fn new(tag: &str, attrs: Vec<(String, String)>) -> Self {
        let lookup = |name: &str| attrs.iter().find(|(k, _)| k == name).map(|(_, v)| v);
        let value = lookup("value").cloned().unwrap_or_default();
        let checked = lookup("checked").is_some();
        let selected = lookup("selected").is_some();
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs,
            value,
            dirty: false,
            checked,
            selected,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[derive(Debug, Clone)]
enum NodeData {
    Document,
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

#[derive(Debug)]
pub struct Document {
    location: Url,
    nodes: Vec<Node>,
    events: Vec<DispatchedEvent>,
    subscribers: Vec<mpsc::UnboundedSender<MutationRecord>>,
}

impl Document {
    /// Parses a full HTML document loaded from `location`.
    pub fn parse(location: &str, html: &str) -> Result<Self, DomError> {
        let location = Url::parse(location)?;
        let mut document = Self {
            location,
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                data: NodeData::Document,
            }],
            events: Vec::new(),
            subscribers: Vec::new(),
        };

        let parsed = Html::parse_document(html);
        let root = document.root();
        document.import_element(parsed.root_element(), root);
        Ok(document)
    }

    pub fn location(&self) -> &Url {
        &self.location
    }

    pub fn hostname(&self) -> &str {
        self.location.host_str().unwrap_or_default()
    }

    // ── Tree construction ────────────────────────────────────────────────────

    fn push_node(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            data,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    fn import_element(&mut self, element: ElementRef<'_>, parent: NodeId) -> NodeId {
        let source = element.value();
        let attrs = source
            .attrs()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let id = self.push_node(parent, NodeData::Element(ElementData::new(source.name(), attrs)));

        for child in element.children() {
            if let Some(child_element) = ElementRef::wrap(child) {
                self.import_element(child_element, id);
            } else if let Some(text) = child.value().as_text() {
                self.push_node(id, NodeData::Text(String::from(&**text)));
            }
        }

        self.settle_form_state(id);
        id
    }

    /// Initialises live state that depends on an element's children.
    fn settle_form_state(&mut self, id: NodeId) {
        let tag = self.tag_name(id).map(str::to_string);
        match tag.as_deref() {
            Some("textarea") => {
                let text = self.text_content(id);
                if let Ok(el) = self.element_mut(id) {
                    if !el.dirty {
                        el.value = text;
                    }
                }
            }
            Some("select") if !self.has_attr(id, "multiple") => {
                let options = self.options(id);
                let selected: Vec<NodeId> = options
                    .iter()
                    .copied()
                    .filter(|&o| self.is_selected(o))
                    .collect();
                // A single-select shows exactly one option: the last one marked
                // `selected`, or the first option when none is.
                let keep = selected.last().copied().or_else(|| options.first().copied());
                for option in options {
                    self.set_selected_flag(option, Some(option) == keep);
                }
            }
            _ => {}
        }
    }

    /// Parses `html` as a fragment, appends it under `parent`, and notifies subscribers.
    pub fn insert_html(&mut self, parent: NodeId, html: &str) -> Result<Vec<NodeId>, DomError> {
        if self.nodes.get(parent.0).is_none() {
            return Err(DomError::UnknownNode(parent));
        }

        let fragment = Html::parse_fragment(html);
        let mut inserted = Vec::new();
        for child in fragment.root_element().children() {
            if let Some(element) = ElementRef::wrap(child) {
                inserted.push(self.import_element(element, parent));
            } else if let Some(text) = child.value().as_text() {
                self.push_node(parent, NodeData::Text(String::from(&**text)));
            }
        }
        if self.tag_name(parent) == Some("select") {
            self.settle_form_state(parent);
        }

        let record = MutationRecord {
            target: parent,
            added: inserted
                .iter()
                .map(|&node| AddedNode {
                    node,
                    tag: self.tag_name(node).unwrap_or_default().to_string(),
                    has_form_field: self.contains_form_field(node),
                })
                .collect(),
        };
        self.notify(record);
        Ok(inserted)
    }

    // ── Mutation subscribers ─────────────────────────────────────────────────

    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<MutationRecord> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    fn notify(&mut self, record: MutationRecord) {
        self.subscribers.retain(|tx| tx.send(record.clone()).is_ok());
    }

    // ── Traversal ────────────────────────────────────────────────────────────

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn body(&self) -> Option<NodeId> {
        self.elements_by_tag(self.root(), "body").into_iter().next()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    /// Parent, grandparent, ... up to (and including) the document node.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&p| self.parent(p))
    }

    /// All nodes below `id` in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    pub fn elements_by_tag(&self, root: NodeId, tag: &str) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|&n| self.tag_name(n) == Some(tag))
            .collect()
    }

    pub fn element_by_id(&self, id_attr: &str) -> Option<NodeId> {
        if id_attr.is_empty() {
            return None;
        }
        self.descendants(self.root())
            .into_iter()
            .find(|&n| self.attr(n, "id") == Some(id_attr))
    }

    pub fn previous_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(id)?);
        let position = siblings.iter().position(|&s| s == id)?;
        siblings[..position]
            .iter()
            .rev()
            .copied()
            .find(|&s| self.is_element(s))
    }

    pub fn is_within(&self, id: NodeId, ancestor: NodeId) -> bool {
        id == ancestor || self.ancestors(id).any(|a| a == ancestor)
    }

    /// Concatenated text of every text node below `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        self.collect_text(id, None)
    }

    /// Like `text_content`, but skips the subtree rooted at `excluded`.
    pub fn text_content_excluding(&self, id: NodeId, excluded: NodeId) -> String {
        self.collect_text(id, Some(excluded))
    }

    fn collect_text(&self, id: NodeId, excluded: Option<NodeId>) -> String {
        let mut out = String::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if Some(next) == excluded {
                continue;
            }
            match self.nodes.get(next.0).map(|n| &n.data) {
                Some(NodeData::Text(text)) => out.push_str(text),
                Some(_) => stack.extend(self.children(next).iter().rev().copied()),
                None => {}
            }
        }
        out
    }

    // ── Element accessors ────────────────────────────────────────────────────

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.nodes.get(id.0).map(|n| &n.data) {
            Some(NodeData::Element(el)) => Some(el),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut ElementData, DomError> {
        match self.nodes.get_mut(id.0).map(|n| &mut n.data) {
            Some(NodeData::Element(el)) => Ok(el),
            Some(_) => Err(DomError::NotAnElement(id)),
            None => Err(DomError::UnknownNode(id)),
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag())
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|el| el.attr(name))
    }

    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    /// Whitespace-separated token match against the `class` attribute.
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attr(id, "class")
            .map(|c| c.split_whitespace().any(|token| token == class))
            .unwrap_or(false)
    }

    /// Case-insensitive substring match against the raw `class` attribute.
    pub fn class_contains(&self, id: NodeId, needle: &str) -> bool {
        self.attr(id, "class")
            .map(|c| c.to_ascii_lowercase().contains(&needle.to_ascii_lowercase()))
            .unwrap_or(false)
    }

    /// Writes an attribute. A `value` attribute also updates the live value of a
    /// control the user has not edited yet, as browsers do.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let el = self.element_mut(id)?;
        match el.attrs.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            Some((_, v)) => *v = value.to_string(),
            None => el.attrs.push((name.to_ascii_lowercase(), value.to_string())),
        }
        if name.eq_ignore_ascii_case("value") && !el.dirty {
            el.value = value.to_string();
        }
        Ok(())
    }

    /// Lowercased `type` of an `<input>`, defaulting to `text`.
    pub fn input_type(&self, id: NodeId) -> String {
        self.attr(id, "type")
            .map(|t| t.trim().to_ascii_lowercase())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "text".to_string())
    }

    pub fn is_form_field(&self, id: NodeId) -> bool {
        self.tag_name(id)
            .map(|t| FORM_FIELD_TAGS.contains(&t))
            .unwrap_or(false)
    }

    pub fn contains_form_field(&self, id: NodeId) -> bool {
        self.is_form_field(id)
            || self
                .descendants(id)
                .into_iter()
                .any(|n| self.is_form_field(n))
    }

    pub fn form_owner(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id).find(|&a| self.tag_name(a) == Some("form"))
    }

    /// Radios sharing `id`'s name within the same form owner, in document order.
    /// An unnamed radio is a group of one.
    pub fn radio_group(&self, id: NodeId) -> Vec<NodeId> {
        let name = match self.attr(id, "name") {
            Some(n) if !n.is_empty() => n,
            _ => return vec![id],
        };
        let owner = self.form_owner(id);
        let scope = owner.unwrap_or_else(|| self.root());
        self.elements_by_tag(scope, "input")
            .into_iter()
            .filter(|&n| {
                self.input_type(n) == "radio"
                    && self.attr(n, "name") == Some(name)
                    && self.form_owner(n) == owner
            })
            .collect()
    }

    // ── Live form state ──────────────────────────────────────────────────────

    /// Current value: the selected option's value for a `<select>`, otherwise the
    /// control's live value.
    pub fn value(&self, id: NodeId) -> String {
        if self.tag_name(id) == Some("select") {
            return self
                .options(id)
                .into_iter()
                .find(|&o| self.is_selected(o))
                .map(|o| self.option_value(o))
                .unwrap_or_default();
        }
        self.element(id).map(|el| el.value.clone()).unwrap_or_default()
    }

    /// The native value setter. Marks the control dirty so later attribute writes
    /// no longer change what it shows.
    pub fn set_value(&mut self, id: NodeId, value: &str) -> Result<(), DomError> {
        if self.tag_name(id) == Some("select") {
            let option = self
                .options(id)
                .into_iter()
                .find(|&o| self.option_value(o) == value);
            if let Some(option) = option {
                self.select_option(id, option)?;
            }
            return Ok(());
        }
        let el = self.element_mut(id)?;
        el.value = value.to_string();
        el.dirty = true;
        Ok(())
    }

    pub fn checked(&self, id: NodeId) -> bool {
        self.element(id).map(|el| el.checked).unwrap_or(false)
    }

    /// Checking a radio unchecks the rest of its group.
    pub fn set_checked(&mut self, id: NodeId, checked: bool) -> Result<(), DomError> {
        if checked && self.input_type(id) == "radio" {
            for member in self.radio_group(id) {
                if member != id {
                    self.element_mut(member)?.checked = false;
                }
            }
        }
        self.element_mut(id)?.checked = checked;
        Ok(())
    }

    /// `<option>` descendants of a select (including those inside `<optgroup>`).
    pub fn options(&self, select: NodeId) -> Vec<NodeId> {
        self.elements_by_tag(select, "option")
    }

    /// Option value, falling back to its text as the DOM does.
    pub fn option_value(&self, option: NodeId) -> String {
        match self.attr(option, "value") {
            Some(v) => v.to_string(),
            None => self.option_text(option),
        }
    }

    pub fn option_text(&self, option: NodeId) -> String {
        collapse_whitespace(&self.text_content(option))
    }

    pub fn is_selected(&self, option: NodeId) -> bool {
        self.element(option).map(|el| el.selected).unwrap_or(false)
    }

    fn set_selected_flag(&mut self, option: NodeId, selected: bool) {
        if let Ok(el) = self.element_mut(option) {
            el.selected = selected;
        }
    }

    pub fn select_option(&mut self, select: NodeId, option: NodeId) -> Result<(), DomError> {
        let options = self.options(select);
        if !options.contains(&option) {
            return Err(DomError::OptionNotInSelect { select, option });
        }
        let multiple = self.has_attr(select, "multiple");
        for other in options {
            if other == option {
                self.set_selected_flag(other, true);
            } else if !multiple {
                self.set_selected_flag(other, false);
            }
        }
        Ok(())
    }

    // ── Events ───────────────────────────────────────────────────────────────

    pub fn dispatch_event(&mut self, target: NodeId, kind: EventKind, init: EventInit) {
        self.events.push(DispatchedEvent { target, kind, init });
    }

    pub fn events(&self) -> &[DispatchedEvent] {
        &self.events
    }

    pub fn events_for(&self, target: NodeId) -> Vec<EventKind> {
        self.events
            .iter()
            .filter(|e| e.target == target)
            .map(|e| e.kind)
            .collect()
    }

    // ── Serialisation ────────────────────────────────────────────────────────

    pub fn selector_probe(&self) -> SelectorProbe {
        SelectorProbe::new(self)
    }

    /// Serialises the tree, reflecting live value / checked / selected state into
    /// the markup.
    pub fn to_html(&self) -> String {
        let mut out = String::from("<!DOCTYPE html>");
        for &child in self.children(self.root()) {
            self.write_node(child, &mut out);
        }
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.nodes.get(id.0) else {
            return;
        };
        match &node.data {
            NodeData::Document => {
                for &child in &node.children {
                    self.write_node(child, out);
                }
            }
            NodeData::Text(text) => {
                let raw = self
                    .parent(id)
                    .and_then(|p| self.tag_name(p))
                    .map(|t| RAW_TEXT_ELEMENTS.contains(&t))
                    .unwrap_or(false);
                if raw {
                    out.push_str(text);
                } else {
                    out.push_str(&escape_text(text));
                }
            }
            NodeData::Element(el) => {
                out.push('<');
                out.push_str(&el.tag);
                for (name, value) in self.reflected_attrs(id, el) {
                    out.push(' ');
                    out.push_str(&name);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(&value));
                    out.push('"');
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&el.tag.as_str()) {
                    return;
                }
                if el.tag == "textarea" {
                    out.push_str(&escape_text(&el.value));
                } else {
                    for &child in &node.children {
                        self.write_node(child, out);
                    }
                }
                out.push_str("</");
                out.push_str(&el.tag);
                out.push('>');
            }
        }
    }

    fn reflected_attrs(&self, id: NodeId, el: &ElementData) -> Vec<(String, String)> {
        let mut attrs: Vec<(String, String)> = el
            .attrs
            .iter()
            .filter(|(k, _)| !matches!(k.as_str(), "checked" | "selected"))
            .cloned()
            .collect();

        match el.tag.as_str() {
            "input" => {
                let kind = self.input_type(id);
                if matches!(kind.as_str(), "checkbox" | "radio") {
                    if el.checked {
                        attrs.push(("checked".to_string(), String::new()));
                    }
                } else if el.dirty {
                    attrs.retain(|(k, _)| k != "value");
                    attrs.push(("value".to_string(), el.value.clone()));
                }
            }
            "option" if el.selected => attrs.push(("selected".to_string(), String::new())),
            _ => {}
        }
        attrs
    }
}

/// Trims and collapses runs of whitespace to single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}
