//! Arbor DOM - Realized document model
//!
//! Arena-backed document tree that virtual nodes are materialized into.
//! Nodes are addressed by generational [`NodeId`]s, so a handle to a node
//! that has been released never resolves to whatever reuses its slot.

mod node;
mod tree;
mod document;
mod mutation;
mod serializer;

use std::fmt;

pub use node::{Node, NodeData, ElementData, TextData, Attribute};
pub use tree::DomTree;
pub use document::{Document, ReadyState};
pub use mutation::{MutationKind, MutationRecord};
pub use serializer::HtmlSerializer;

/// SVG namespace URI
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Node identifier (generational index into the arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl NodeId {
    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId { index: u32::MAX, generation: 0 };

    /// Check if this id refers to a slot at all
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.index != u32::MAX
    }

    /// Slot index
    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Slot generation
    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "#{}v{}", self.index, self.generation)
        } else {
            f.write_str("#none")
        }
    }
}

/// DOM error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("Node {0} does not exist")]
    InvalidNode(NodeId),

    #[error("Node {0} is not an element")]
    NotAnElement(NodeId),

    #[error("Node {0} is not a text node")]
    NotText(NodeId),

    #[error("Node {0} is not attached to a parent")]
    Detached(NodeId),

    #[error("Cannot insert {child} into {parent}: would create a cycle")]
    HierarchyRequest { parent: NodeId, child: NodeId },
}
