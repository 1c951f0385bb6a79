use crate::dom::document::NodeId;

/// A root node appended by a subtree insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedNode {
    pub node: NodeId,
    pub tag: String,
    /// True when the node is, or contains, an input/select/textarea.
    pub has_form_field: bool,
}

/// Delivered to every subscriber after `Document::insert_html`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub target: NodeId,
    pub added: Vec<AddedNode>,
}

impl MutationRecord {
    pub fn adds_form_fields(&self) -> bool {
        self.added.iter().any(|a| a.has_form_field)
    }
}
