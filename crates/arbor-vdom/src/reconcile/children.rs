//! Positional child reconciliation

use crate::diff::{Patch, diff};
use crate::VNode;

/// Child operations for one element
#[derive(Debug, Clone, Default)]
pub struct ChildPatch {
    /// One patch per old child, zipped against the live children at apply time
    pub updates: Vec<Patch>,
    /// New tail children, rendered and appended in order
    pub appends: Vec<VNode>,
}

impl ChildPatch {
    /// Number of DOM-visible operations
    pub fn mutation_estimate(&self) -> usize {
        self.updates.iter().map(Patch::mutation_estimate).sum::<usize>() + self.appends.len()
    }
}

/// Pair old and new children by index
///
/// Keys are not consulted; a reorder overwrites content in place.
pub fn reconcile_children(old: &[VNode], new: &[VNode]) -> ChildPatch {
    ChildPatch {
        updates: old
            .iter()
            .enumerate()
            .map(|(i, child)| diff(child, new.get(i)))
            .collect(),
        appends: new.iter().skip(old.len()).cloned().collect(),
    }
}
