use thiserror::Error;

use crate::dom::{DomError, NodeId};

/// Failure while analysing or filling a single field.
///
/// Never crosses the engine boundary: the pass logs it, leaves the field unprocessed
/// and moves on to the next one.
#[derive(Debug, Error)]
pub enum FieldError {
    #[error(transparent)]
    Dom(#[from] DomError),

    #[error("Node {0:?} is not an input, select or textarea")]
    NotAFormField(NodeId),

    #[error("Select {field:?} has no options yet")]
    NoOptions { field: NodeId },
}
