//! Per-field analysis context, rebuilt on every pass.

use serde::{Deserialize, Serialize};

use crate::autofill::error::FieldError;
use crate::autofill::labels::{extract_label, group_question, option_label};
use crate::autofill::patterns;
use crate::autofill::platform::Platform;
use crate::dom::{Document, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetType {
    Text,
    Select,
    Checkbox,
    Radio,
    Textarea,
}

impl WidgetType {
    pub fn of(document: &Document, field: NodeId) -> Option<Self> {
        match document.tag_name(field)? {
            "select" => Some(WidgetType::Select),
            "textarea" => Some(WidgetType::Textarea),
            "input" => Some(match document.input_type(field).as_str() {
                "checkbox" => WidgetType::Checkbox,
                "radio" => WidgetType::Radio,
                _ => WidgetType::Text,
            }),
            _ => None,
        }
    }
}

/// One choice of a select (an `<option>`) or of a radio group (a member radio).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOption {
    pub node: NodeId,
    pub value: String,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct FieldContext {
    pub raw_label_text: String,
    pub field_name: String,
    pub placeholder: String,
    pub aria_label: String,
    /// Lowercased, space-joined label, name, placeholder, aria-label and group question.
    pub combined_search_text: String,
    pub widget_type: WidgetType,
    pub is_required: bool,
    pub is_knockout_candidate: bool,
    pub options: Vec<FieldOption>,
}

pub fn build_context(
    document: &Document,
    field: NodeId,
    platform: Platform,
) -> Result<FieldContext, FieldError> {
    let widget_type = WidgetType::of(document, field).ok_or(FieldError::NotAFormField(field))?;

    let attr = |name: &str| document.attr(field, name).unwrap_or_default().trim().to_string();
    let raw_label_text = extract_label(document, field, platform);
    let field_name = attr("name");
    let placeholder = attr("placeholder");
    let aria_label = attr("aria-label");

    let question = match widget_type {
        WidgetType::Radio | WidgetType::Checkbox => group_question(document, field),
        _ => None,
    };

    let combined_search_text = [
        Some(raw_label_text.as_str()),
        Some(field_name.as_str()),
        Some(placeholder.as_str()),
        Some(aria_label.as_str()),
        question.as_deref(),
    ]
    .into_iter()
    .flatten()
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(" ")
    .to_lowercase();

    let is_required = document.has_attr(field, "required")
        || document.attr(field, "aria-required") == Some("true")
        || raw_label_text.contains('*');

    let options = match widget_type {
        WidgetType::Select => document
            .options(field)
            .into_iter()
            .map(|node| FieldOption {
                node,
                value: document.option_value(node),
                text: document.option_text(node),
            })
            .collect(),
        WidgetType::Radio => document
            .radio_group(field)
            .into_iter()
            .map(|node| FieldOption {
                node,
                value: document.attr(node, "value").unwrap_or("on").to_string(),
                text: option_label(document, node),
            })
            .collect(),
        _ => Vec::new(),
    };

    Ok(FieldContext {
        is_knockout_candidate: patterns::is_knockout(&combined_search_text),
        raw_label_text,
        field_name,
        placeholder,
        aria_label,
        combined_search_text,
        widget_type,
        is_required,
        options,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context_for(html: &str) -> FieldContext {
        let d = Document::parse("https://careers.example.com/apply", html).unwrap();
        let field = d.element_by_id("f").unwrap();
        build_context(&d, field, Platform::Generic).unwrap()
    }

    #[test]
    fn test_widget_types() {
        let d = Document::parse(
            "https://example.com",
            r#"<input id="a"><input id="b" type="EMAIL"><input id="c" type="checkbox">
               <input id="d" type="radio"><select id="e"></select><textarea id="g"></textarea><div id="h"></div>"#,
        )
        .unwrap();
        let widget = |id: &str| WidgetType::of(&d, d.element_by_id(id).unwrap());
        assert_eq!(widget("a"), Some(WidgetType::Text));
        assert_eq!(widget("b"), Some(WidgetType::Text));
        assert_eq!(widget("c"), Some(WidgetType::Checkbox));
        assert_eq!(widget("d"), Some(WidgetType::Radio));
        assert_eq!(widget("e"), Some(WidgetType::Select));
        assert_eq!(widget("g"), Some(WidgetType::Textarea));
        assert_eq!(widget("h"), None);
    }

    #[test]
    fn test_not_a_form_field() {
        let d = Document::parse("https://example.com", r#"<div id="f"></div>"#).unwrap();
        let field = d.element_by_id("f").unwrap();
        assert!(matches!(
            build_context(&d, field, Platform::Generic),
            Err(FieldError::NotAFormField(_))
        ));
    }

    #[test]
    fn test_combined_text_is_lowercased() {
        let ctx = context_for(
            r#"<label for="f">Email Address *</label>
               <input id="f" name="candidate_email" placeholder="you@company.com" aria-label="Work Email">"#,
        );
        assert_eq!(ctx.raw_label_text, "Email Address *");
        assert_eq!(
            ctx.combined_search_text,
            "email address * candidate_email you@company.com work email"
        );
        assert!(ctx.is_required);
        assert!(!ctx.is_knockout_candidate);
    }

    #[test]
    fn test_required_flags() {
        assert!(context_for(r#"<input id="f" required>"#).is_required);
        assert!(context_for(r#"<input id="f" aria-required="true">"#).is_required);
        assert!(!context_for(r#"<input id="f" aria-required="false">"#).is_required);
    }

    #[test]
    fn test_select_options_in_order() {
        let ctx = context_for(
            r#"<select id="f"><option value="">Select...</option>
               <optgroup label="Americas"><option value="us">United States</option></optgroup>
               <option>Canada</option></select>"#,
        );
        let pairs: Vec<(&str, &str)> = ctx
            .options
            .iter()
            .map(|o| (o.value.as_str(), o.text.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![("", "Select..."), ("us", "United States"), ("Canada", "Canada")]
        );
    }

    #[test]
    fn test_radio_context_includes_group_question() {
        let ctx = context_for(
            r#"<fieldset><legend>Will you require sponsorship?</legend>
               <label><input type="radio" id="f" name="sp" value="y"> Yes</label>
               <label><input type="radio" name="sp" value="n"> No</label></fieldset>"#,
        );
        assert_eq!(ctx.widget_type, WidgetType::Radio);
        assert_eq!(ctx.options.len(), 2);
        assert_eq!(ctx.options[1].text, "No");
        assert!(ctx.combined_search_text.ends_with("will you require sponsorship?"));
        assert!(ctx.is_knockout_candidate);
    }
}
