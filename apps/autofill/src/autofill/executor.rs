//! Fill executor: writes through the native setters, then fires the event sequence
//! reactive front ends listen for.

use crate::autofill::error::FieldError;
use crate::dom::{Document, EventInit, EventKind, NodeId};

/// Ordered events fired after every write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSequence {
    pub steps: Vec<EventKind>,
    pub init: EventInit,
}

impl Default for EventSequence {
    fn default() -> Self {
        Self {
            steps: vec![
                EventKind::Focus,
                EventKind::Input,
                EventKind::Change,
                EventKind::Blur,
                EventKind::FocusOut,
            ],
            init: EventInit::default(),
        }
    }
}

impl EventSequence {
    pub fn fire(&self, document: &mut Document, target: NodeId) {
        for kind in &self.steps {
            document.dispatch_event(target, *kind, self.init);
        }
    }
}

/// A concrete write to perform on a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FillAction {
    /// Set the live value of a text-like control.
    Text(String),
    /// Check a checkbox.
    Check,
    /// Check one radio of a group; the rest of the group is unchecked.
    CheckRadio(NodeId),
    /// Select one `<option>` of a select.
    SelectOption(NodeId),
}

/// Applies `action` to `field` and fires `events` on the element that changed.
pub fn apply(
    document: &mut Document,
    field: NodeId,
    action: &FillAction,
    events: &EventSequence,
) -> Result<(), FieldError> {
    let target = match action {
        FillAction::Text(value) => {
            document.set_value(field, value)?;
            field
        }
        FillAction::Check => {
            document.set_checked(field, true)?;
            field
        }
        FillAction::CheckRadio(radio) => {
            document.set_checked(*radio, true)?;
            *radio
        }
        FillAction::SelectOption(option) => {
            document.select_option(field, *option)?;
            field
        }
    };
    events.fire(document, target);
    Ok(())
}
