//! Tree differ
//!
//! Same tag at the same position is the only identity heuristic: such pairs
//! are patched in place, anything else is replaced wholesale.

use std::rc::Rc;

use crate::reconcile::{AttrPatch, ChildPatch, reconcile_attrs, reconcile_children};
use crate::{VElement, VNode};

/// Operation on one realized node
#[derive(Debug, Clone)]
pub enum Patch {
    /// Remove the subtree
    Remove,
    /// Mount a fresh subtree in place of the node
    Replace(VNode),
    /// Rewrite the content of a text node
    SetText(String),
    /// Nothing to do
    Keep,
    /// Patch attributes and children in place
    Update(Box<ElementPatch>),
}

/// In-place patch of an element
#[derive(Debug, Clone)]
pub struct ElementPatch {
    pub old: Rc<VElement>,
    /// Node the realized element is relinked to
    pub new: Rc<VElement>,
    pub attrs: AttrPatch,
    pub children: ChildPatch,
}

impl Patch {
    /// Number of DOM-visible operations this patch performs
    pub fn mutation_estimate(&self) -> usize {
        match self {
            Patch::Keep => 0,
            Patch::Remove | Patch::Replace(_) | Patch::SetText(_) => 1,
            Patch::Update(patch) => {
                patch.attrs.visible_changes() + patch.children.mutation_estimate()
            }
        }
    }

    /// Check if applying this patch leaves the DOM untouched
    pub fn is_noop(&self) -> bool {
        self.mutation_estimate() == 0
    }
}

/// Compare two trees
pub fn diff(old: &VNode, new: Option<&VNode>) -> Patch {
    let Some(new) = new else {
        return Patch::Remove;
    };

    match (old, new) {
        (VNode::Text(a), VNode::Text(b)) => {
            if a == b {
                Patch::Keep
            } else {
                Patch::SetText(b.clone())
            }
        }
        (VNode::Element(old), VNode::Element(new)) if old.tag() == new.tag() => {
            let attrs =
                reconcile_attrs(old.attrs(), new.attrs()).with_hooks(old.hooks(), new.hooks());
            let children = reconcile_children(&old.children(), &new.children());
            Patch::Update(Box::new(ElementPatch {
                old: Rc::clone(old),
                new: Rc::clone(new),
                attrs,
                children,
            }))
        }
        _ => Patch::Replace(new.clone()),
    }
}
