//! Knockout / consent responder.
//!
//! Shared by `KNOCKOUT` and `YES_NO` fields. The branch is picked by widget type
//! alone, and every branch leaves the field answered.

use tracing::debug;

use crate::autofill::context::{FieldContext, FieldOption, WidgetType};
use crate::autofill::error::FieldError;
use crate::autofill::executor::{apply, EventSequence, FillAction};
use crate::autofill::patterns;
use crate::dom::{Document, NodeId};

/// Answers `field` affirmatively and fires the event sequence on what changed.
pub fn resolve_yes(
    document: &mut Document,
    field: NodeId,
    ctx: &FieldContext,
    events: &EventSequence,
) -> Result<(), FieldError> {
    let action = match ctx.widget_type {
        WidgetType::Checkbox => FillAction::Check,
        WidgetType::Radio => FillAction::CheckRadio(pick_radio(field, &ctx.options)),
        WidgetType::Select => match pick_select_option(&ctx.options) {
            Some(option) => FillAction::SelectOption(option),
            None if ctx.options.is_empty() => return Err(FieldError::NoOptions { field }),
            // A lone option is already the selected one.
            None => {
                events.fire(document, field);
                return Ok(());
            }
        },
        WidgetType::Text | WidgetType::Textarea => FillAction::Text("Yes".to_string()),
    };
    debug!(?action, "Answering knockout");
    apply(document, field, &action, events)
}

fn first_affirmative(options: &[FieldOption]) -> Option<&FieldOption> {
    options
        .iter()
        .find(|o| patterns::is_affirmative(&o.text, &o.value))
}

/// First affirmative member, else the first member of the group, which may be a
/// negative answer.
fn pick_radio(field: NodeId, options: &[FieldOption]) -> NodeId {
    first_affirmative(options)
        .or_else(|| options.first())
        .map(|o| o.node)
        .unwrap_or(field)
}

/// First affirmative option, else the first option that is not an empty placeholder.
fn pick_select_option(options: &[FieldOption]) -> Option<NodeId> {
    if let Some(option) = first_affirmative(options) {
        return Some(option.node);
    }
    if options.len() <= 1 {
        return None;
    }
    let index = if options[0].value.trim().is_empty() { 1 } else { 0 };
    Some(options[index].node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autofill::context::build_context;
    use crate::autofill::platform::Platform;
    use crate::dom::EventKind;

    fn answer(html: &str) -> Document {
        let mut d = Document::parse("https://example.com/apply", html).unwrap();
        let field = d.element_by_id("f").unwrap();
        let ctx = build_context(&d, field, Platform::Generic).unwrap();
        resolve_yes(&mut d, field, &ctx, &EventSequence::default()).unwrap();
        d
    }

    fn checked_ids(d: &Document) -> Vec<String> {
        d.elements_by_tag(d.root(), "input")
            .into_iter()
            .filter(|&n| d.checked(n))
            .filter_map(|n| d.attr(n, "id").map(str::to_string))
            .collect()
    }

    #[test]
    fn test_checkbox_is_checked() {
        let d = answer(r#"<label><input type="checkbox" id="f"> I agree to the terms</label>"#);
        let f = d.element_by_id("f").unwrap();
        assert!(d.checked(f));
        assert!(d.events_for(f).contains(&EventKind::Change));
    }

    #[test]
    fn test_radio_picks_affirmative_member() {
        let d = answer(
            r#"<input type="radio" name="radio_auth" id="f" value="no"><label for="f">No, I require sponsorship</label>
               <input type="radio" name="radio_auth" id="y" value="yes"><label for="y">Yes, I am authorized</label>"#,
        );
        assert_eq!(checked_ids(&d), vec!["y"]);
    }

    #[test]
    fn test_radio_falls_back_to_first_member() {
        let d = answer(
            r#"<input type="radio" name="q" id="a" value="1"><label for="a">Red</label>
               <input type="radio" name="q" id="f" value="2" checked><label for="f">Blue</label>"#,
        );
        assert_eq!(checked_ids(&d), vec!["a"]);
    }

    #[test]
    fn test_select_picks_affirmative_option() {
        let d = answer(
            r#"<select id="f"><option value="">Choose</option><option value="0">No</option>
               <option value="1">Yes</option></select>"#,
        );
        let f = d.element_by_id("f").unwrap();
        assert_eq!(d.value(f), "1");
    }

    #[test]
    fn test_select_skips_empty_placeholder() {
        let d = answer(
            r#"<select id="f"><option value="">Choose</option><option value="b">B</option></select>"#,
        );
        assert_eq!(d.value(d.element_by_id("f").unwrap()), "b");

        let d = answer(
            r#"<select id="f"><option value="a">A</option><option value="b">B</option></select>"#,
        );
        assert_eq!(d.value(d.element_by_id("f").unwrap()), "a");
    }

    #[test]
    fn test_select_without_options_is_an_error() {
        let mut d = Document::parse("https://example.com", r#"<select id="f"></select>"#).unwrap();
        let field = d.element_by_id("f").unwrap();
        let ctx = build_context(&d, field, Platform::Generic).unwrap();
        let err = resolve_yes(&mut d, field, &ctx, &EventSequence::default()).unwrap_err();
        assert!(matches!(err, FieldError::NoOptions { .. }));
    }

    #[test]
    fn test_text_gets_literal_yes() {
        let d = answer(r#"<input type="text" id="f" name="authorized">"#);
        let f = d.element_by_id("f").unwrap();
        assert_eq!(d.value(f), "Yes");
        assert_eq!(d.events_for(f).len(), 5);
    }
}
