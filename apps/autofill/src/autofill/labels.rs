//! Field label extraction.
//!
//! Strategies run in a fixed order and the first non-empty result wins. A strategy
//! that finds nothing usable returns `None`, never an empty string.

use regex::Regex;
use tracing::trace;

use crate::autofill::platform::Platform;
use crate::dom::document::collapse_whitespace;
use crate::dom::{Document, NodeId};

type Strategy = fn(&Document, NodeId, Platform) -> Option<String>;

const STRATEGIES: &[(&str, Strategy)] = &[
    ("aria-labelledby", |d, f, _| aria_labelledby(d, f)),
    ("label-for", |d, f, _| label_for(d, f)),
    ("wrapping-label", |d, f, _| wrapping_label(d, f)),
    ("preceding-sibling", |d, f, _| preceding_sibling(d, f)),
    ("wrapper-container", |d, f, _| wrapper_container(d, f)),
    ("vendor-nested", vendor_nested),
    ("own-attributes", |d, f, _| own_attributes(d, f)),
];

/// Class fragments of the containers ATS front ends wrap each field in.
pub const WRAPPER_CLASSES: &[&str] = &[
    "field",
    "form-group",
    "form-field",
    "question",
    "input-wrapper",
    "form-item",
    "application-question",
];

/// A vendor's own container/label convention: the nearest ancestor whose
/// `container_attr` contains `container_value` holds an element whose
/// `label_attr` contains `label_value`.
#[derive(Debug, Clone, Copy)]
pub struct NestedLabelRule {
    pub platform: Platform,
    pub container_attr: &'static str,
    pub container_value: &'static str,
    pub label_attr: &'static str,
    pub label_value: &'static str,
}

pub const NESTED_LABEL_RULES: &[NestedLabelRule] = &[
    NestedLabelRule {
        platform: Platform::Workday,
        container_attr: "data-automation-id",
        container_value: "formField",
        label_attr: "data-automation-id",
        label_value: "formLabel",
    },
    NestedLabelRule {
        platform: Platform::Lever,
        container_attr: "class",
        container_value: "application-question",
        label_attr: "class",
        label_value: "application-label",
    },
    NestedLabelRule {
        platform: Platform::Ashby,
        container_attr: "class",
        container_value: "ashby-application-form-field-entry",
        label_attr: "class",
        label_value: "ashby-application-form-question-title",
    },
    NestedLabelRule {
        platform: Platform::SmartRecruiters,
        container_attr: "class",
        container_value: "question-container",
        label_attr: "class",
        label_value: "question-title",
    },
    NestedLabelRule {
        platform: Platform::Icims,
        container_attr: "class",
        container_value: "iCIMS_FieldRow",
        label_attr: "class",
        label_value: "iCIMS_LabelText",
    },
];

/// Best-effort human-readable label for `field`; empty only when every strategy fails.
pub fn extract_label(document: &Document, field: NodeId, platform: Platform) -> String {
    for (name, strategy) in STRATEGIES {
        if let Some(label) = strategy(document, field, platform) {
            trace!(strategy = *name, %label, "Label resolved");
            return label;
        }
    }
    String::new()
}

/// Label of one radio within a group: only the explicit associations, then its value.
pub fn option_label(document: &Document, radio: NodeId) -> String {
    aria_labelledby(document, radio)
        .or_else(|| label_for(document, radio))
        .or_else(|| wrapping_label(document, radio))
        .or_else(|| following_text(document, radio))
        .unwrap_or_else(|| document.attr(radio, "value").unwrap_or_default().to_string())
}

/// The question a radio group answers: the fieldset legend, or a `radiogroup`'s label.
pub fn group_question(document: &Document, field: NodeId) -> Option<String> {
    for ancestor in document.ancestors(field) {
        match document.tag_name(ancestor) {
            Some("fieldset") => {
                return document
                    .children(ancestor)
                    .iter()
                    .find(|&&c| document.tag_name(c) == Some("legend"))
                    .and_then(|&legend| non_empty(document.text_content(legend)));
            }
            Some(_) if document.attr(ancestor, "role") == Some("radiogroup") => {
                return aria_labelledby(document, ancestor)
                    .or_else(|| attr_text(document, ancestor, "aria-label"));
            }
            _ => {}
        }
    }
    None
}

fn non_empty(text: String) -> Option<String> {
    let text = collapse_whitespace(&text);
    (!text.is_empty()).then_some(text)
}

fn attr_text(document: &Document, node: NodeId, name: &str) -> Option<String> {
    document
        .attr(node, name)
        .and_then(|v| non_empty(v.to_string()))
}

fn is_label_like(document: &Document, node: NodeId) -> bool {
    matches!(document.tag_name(node), Some("label") | Some("legend"))
        || document.class_contains(node, "label")
}

fn aria_labelledby(document: &Document, field: NodeId) -> Option<String> {
    let ids = document.attr(field, "aria-labelledby")?;
    let text = ids
        .split_whitespace()
        .filter_map(|id| document.element_by_id(id))
        .map(|target| document.text_content(target))
        .collect::<Vec<_>>()
        .join(" ");
    non_empty(text)
}

fn label_for(document: &Document, field: NodeId) -> Option<String> {
    let id = document.attr(field, "id").filter(|id| !id.is_empty())?;
    document
        .elements_by_tag(document.root(), "label")
        .into_iter()
        .find(|&label| document.attr(label, "for") == Some(id))
        .and_then(|label| non_empty(document.text_content(label)))
}

fn wrapping_label(document: &Document, field: NodeId) -> Option<String> {
    let label = document
        .ancestors(field)
        .find(|&a| document.tag_name(a) == Some("label"))?;
    let mut text = document.text_content_excluding(label, field);
    if is_text_like(document, field) {
        let current = document.value(field);
        let current = current.trim();
        if !current.is_empty() {
            if let Ok(token) = Regex::new(&format!(r"\b{}\b", regex::escape(current))) {
                text = token.replace_all(&text, " ").into_owned();
            }
        }
    }
    non_empty(text)
}

/// Inputs that show their value as typed text. A checkbox or radio `value` is
/// never displayed, so it is left in the label.
fn is_text_like(document: &Document, field: NodeId) -> bool {
    match document.tag_name(field) {
        Some("textarea") => true,
        Some("input") => !matches!(document.input_type(field).as_str(), "checkbox" | "radio"),
        _ => false,
    }
}

fn preceding_sibling(document: &Document, field: NodeId) -> Option<String> {
    let sibling = document.previous_element_sibling(field)?;
    if !is_label_like(document, sibling) || document.contains_form_field(sibling) {
        return None;
    }
    non_empty(document.text_content(sibling))
}

fn wrapper_container(document: &Document, field: NodeId) -> Option<String> {
    let container = document.ancestors(field).find(|&a| {
        WRAPPER_CLASSES
            .iter()
            .any(|class| document.class_contains(a, class))
    })?;
    document
        .descendants(container)
        .into_iter()
        .filter(|&n| is_label_like(document, n) && !document.is_within(field, n))
        .find_map(|n| non_empty(document.text_content(n)))
}

fn vendor_nested(document: &Document, field: NodeId, platform: Platform) -> Option<String> {
    let attr_contains = |node: NodeId, attr: &str, needle: &str| {
        document
            .attr(node, attr)
            .map(|v| v.contains(needle))
            .unwrap_or(false)
    };

    NESTED_LABEL_RULES
        .iter()
        .filter(|rule| rule.platform == platform)
        .find_map(|rule| {
            let container = document
                .ancestors(field)
                .find(|&a| attr_contains(a, rule.container_attr, rule.container_value))?;
            document
                .descendants(container)
                .into_iter()
                .filter(|&n| attr_contains(n, rule.label_attr, rule.label_value))
                .find_map(|n| non_empty(document.text_content(n)))
        })
}

fn own_attributes(document: &Document, field: NodeId) -> Option<String> {
    ["placeholder", "name", "id"]
        .iter()
        .find_map(|attr| attr_text(document, field, attr))
}

/// Bare text immediately after a radio, as in `<input type=radio> Yes`.
fn following_text(document: &Document, radio: NodeId) -> Option<String> {
    let parent = document.parent(radio)?;
    let siblings = document.children(parent);
    let position = siblings.iter().position(|&s| s == radio)?;
    let next = *siblings.get(position + 1)?;
    if document.is_element(next) && !is_label_like(document, next) {
        return None;
    }
    non_empty(document.text_content(next))
}
