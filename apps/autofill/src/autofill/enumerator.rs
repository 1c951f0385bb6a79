//! Field enumeration and the processed-field tracker.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dom::{Document, DomError, NodeId, FORM_FIELD_TAGS};

/// Attribute the engine writes once onto each field it analyses.
pub const FIELD_MARKER_ATTR: &str = "data-autofill-id";

/// Input types that never carry applicant data.
const SKIPPED_INPUT_TYPES: &[&str] = &["hidden", "submit", "button", "reset", "image", "file"];

/// Stable opaque identity of a field, stored on the element as `FIELD_MARKER_ATTR`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(String);

impl FieldId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reads the marker, writing a fresh one first if the field has none.
    pub fn ensure(document: &mut Document, field: NodeId) -> Result<Self, DomError> {
        if let Some(existing) = document.attr(field, FIELD_MARKER_ATTR) {
            if !existing.is_empty() {
                return Ok(Self(existing.to_string()));
            }
        }
        let id = Uuid::new_v4().to_string();
        document.set_attribute(field, FIELD_MARKER_ATTR, &id)?;
        Ok(Self(id))
    }

    /// The marker if one was written, without writing.
    pub fn of(document: &Document, field: NodeId) -> Option<Self> {
        document
            .attr(field, FIELD_MARKER_ATTR)
            .filter(|v| !v.is_empty())
            .map(|v| Self(v.to_string()))
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fields handled during this page lifetime. Grows until `clear`.
#[derive(Debug, Default)]
pub struct ProcessedFieldSet {
    ids: HashSet<FieldId>,
}

impl ProcessedFieldSet {
    pub fn contains(&self, id: &FieldId) -> bool {
        self.ids.contains(id)
    }

    /// True when `field` carries a marker that is already in the set.
    pub fn contains_node(&self, document: &Document, field: NodeId) -> bool {
        FieldId::of(document, field)
            .map(|id| self.contains(&id))
            .unwrap_or(false)
    }

    pub fn insert(&mut self, id: FieldId) -> bool {
        self.ids.insert(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

/// Every input/select/textarea under `root` that could take a value, in DOM order.
pub fn candidate_fields(document: &Document, root: NodeId) -> Vec<NodeId> {
    document
        .descendants(root)
        .into_iter()
        .filter(|&n| {
            document
                .tag_name(n)
                .map(|t| FORM_FIELD_TAGS.contains(&t))
                .unwrap_or(false)
        })
        .filter(|&n| is_fillable(document, n))
        .collect()
}

pub fn is_fillable(document: &Document, field: NodeId) -> bool {
    if document.tag_name(field) == Some("input")
        && SKIPPED_INPUT_TYPES.contains(&document.input_type(field).as_str())
    {
        return false;
    }
    if document.has_attr(field, "disabled") {
        return false;
    }
    !is_hidden(document, field) && !document.ancestors(field).any(|a| is_hidden(document, a))
}

/// Hidden by its own markup. Without a layout engine this covers the `hidden`
/// attribute, inline `display:none` / `visibility:hidden`, and `<template>` content.
fn is_hidden(document: &Document, node: NodeId) -> bool {
    if document.tag_name(node) == Some("template") || document.has_attr(node, "hidden") {
        return true;
    }
    document
        .attr(node, "style")
        .map(|style| {
            let style: String = style
                .to_ascii_lowercase()
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            style.contains("display:none") || style.contains("visibility:hidden")
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(document: &Document, fields: &[NodeId]) -> Vec<String> {
        fields
            .iter()
            .filter_map(|&n| document.attr(n, "id").map(str::to_string))
            .collect()
    }

    #[test]
    fn test_candidates_skip_hidden_and_inert_fields() {
        let d = Document::parse(
            "https://example.com/apply",
            r#"<form>
                <input id="name">
                <input id="h" type="hidden" name="csrf">
                <input id="s" type="submit">
                <input id="file" type="file">
                <input id="dis" disabled>
                <input id="attr" hidden>
                <div style="display: none"><input id="nested"></div>
                <div style="Visibility:Hidden"><select id="vis"></select></div>
                <textarea id="bio"></textarea>
                <input id="cb" type="checkbox">
            </form>"#,
        )
        .unwrap();
        let fields = candidate_fields(&d, d.root());
        assert_eq!(ids(&d, &fields), vec!["name", "bio", "cb"]);
    }

    #[test]
    fn test_fields_outside_forms_are_found() {
        let d = Document::parse(
            "https://example.com",
            r#"<body><div class="apply"><input id="orphan"></div><form><input id="inside"></form></body>"#,
        )
        .unwrap();
        let body = d.body().unwrap();
        assert_eq!(ids(&d, &candidate_fields(&d, body)), vec!["orphan", "inside"]);
    }

    #[test]
    fn test_marker_is_written_once() {
        let mut d = Document::parse("https://example.com", r#"<input id="f">"#).unwrap();
        let f = d.element_by_id("f").unwrap();
        assert_eq!(FieldId::of(&d, f), None);

        let first = FieldId::ensure(&mut d, f).unwrap();
        let second = FieldId::ensure(&mut d, f).unwrap();
        assert_eq!(first, second);
        assert!(Uuid::parse_str(first.as_str()).is_ok());
        assert_eq!(d.attr(f, FIELD_MARKER_ATTR), Some(first.as_str()));
    }

    #[test]
    fn test_processed_set() {
        let mut d = Document::parse("https://example.com", r#"<input id="f"><input id="g">"#).unwrap();
        let f = d.element_by_id("f").unwrap();
        let g = d.element_by_id("g").unwrap();
        let mut set = ProcessedFieldSet::default();

        let id = FieldId::ensure(&mut d, f).unwrap();
        assert!(set.insert(id.clone()));
        assert!(!set.insert(id));
        assert!(set.contains_node(&d, f));
        assert!(!set.contains_node(&d, g));

        set.clear();
        assert!(set.is_empty());
        assert!(!set.contains_node(&d, f));
    }
}
