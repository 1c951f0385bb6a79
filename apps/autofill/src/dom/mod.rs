// Page model: an arena of nodes parsed from HTML, with live form state,
// an event log, and subtree-insertion notifications.

pub mod document;
pub mod error;
pub mod events;
pub mod mutation;
pub mod selector;

pub use document::{Document, NodeId, FORM_FIELD_TAGS};
pub use error::DomError;
pub use events::{DispatchedEvent, EventInit, EventKind};
pub use mutation::{AddedNode, MutationRecord};
pub use selector::SelectorProbe;
