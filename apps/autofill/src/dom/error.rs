use thiserror::Error;

use crate::dom::document::NodeId;

#[derive(Debug, Error)]
pub enum DomError {
    #[error("Invalid page URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Unknown node {0:?}")]
    UnknownNode(NodeId),

    #[error("Node {0:?} is not an element")]
    NotAnElement(NodeId),

    #[error("Option {option:?} does not belong to select {select:?}")]
    OptionNotInSelect { select: NodeId, option: NodeId },
}
