//! DOM Mutations
//!
//! Records of changes applied to the realized tree.

use crate::NodeId;

/// Mutation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    NodeInserted,
    NodeRemoved,
    NodeReplaced,
    AttrSet,
    AttrRemoved,
    TextChanged,
    RawHtmlChanged,
}

/// A single journaled mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub kind: MutationKind,
    pub target: NodeId,
    /// Parent for insert/remove, replacement for replace
    pub related_node: Option<NodeId>,
    pub attr_name: Option<String>,
    pub prev_value: Option<String>,
    pub new_value: Option<String>,
}

impl MutationRecord {
    fn bare(kind: MutationKind, target: NodeId) -> Self {
        Self {
            kind,
            target,
            related_node: None,
            attr_name: None,
            prev_value: None,
            new_value: None,
        }
    }

    /// Node inserted under `parent`
    pub fn node_inserted(target: NodeId, parent: NodeId) -> Self {
        Self {
            related_node: Some(parent),
            ..Self::bare(MutationKind::NodeInserted, target)
        }
    }

    /// Node removed from `parent`
    pub fn node_removed(target: NodeId, parent: NodeId) -> Self {
        Self {
            related_node: Some(parent),
            ..Self::bare(MutationKind::NodeRemoved, target)
        }
    }

    /// Node replaced by `replacement`
    pub fn node_replaced(target: NodeId, replacement: NodeId) -> Self {
        Self {
            related_node: Some(replacement),
            ..Self::bare(MutationKind::NodeReplaced, target)
        }
    }

    /// Attribute written
    pub fn attr_set(target: NodeId, name: &str, old_value: Option<&str>, new_value: &str) -> Self {
        Self {
            attr_name: Some(name.to_string()),
            prev_value: old_value.map(str::to_string),
            new_value: Some(new_value.to_string()),
            ..Self::bare(MutationKind::AttrSet, target)
        }
    }

    /// Attribute removed
    pub fn attr_removed(target: NodeId, name: &str, old_value: &str) -> Self {
        Self {
            attr_name: Some(name.to_string()),
            prev_value: Some(old_value.to_string()),
            ..Self::bare(MutationKind::AttrRemoved, target)
        }
    }

    /// Text content changed
    pub fn text_changed(target: NodeId, old_value: &str, new_value: &str) -> Self {
        Self {
            prev_value: Some(old_value.to_string()),
            new_value: Some(new_value.to_string()),
            ..Self::bare(MutationKind::TextChanged, target)
        }
    }

    /// Raw markup changed
    pub fn raw_html_changed(
        target: NodeId,
        old_value: Option<&str>,
        new_value: Option<&str>,
    ) -> Self {
        Self {
            prev_value: old_value.map(str::to_string),
            new_value: new_value.map(str::to_string),
            ..Self::bare(MutationKind::RawHtmlChanged, target)
        }
    }

    /// Structural change (insert/remove/replace)
    pub fn is_structural(&self) -> bool {
        matches!(
            self.kind,
            MutationKind::NodeInserted | MutationKind::NodeRemoved | MutationKind::NodeReplaced
        )
    }
}
