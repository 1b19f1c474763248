//! Virtual nodes

use std::cell::{Cell, Ref, RefCell};
use std::rc::{Rc, Weak};

use arbor_dom::NodeId;
use arbor_style::format_number;

use crate::attrs::{AttrValue, Attrs, reserved};
use crate::HookId;

/// Virtual node
///
/// Text leaves carry no identity and compare by value.
#[derive(Debug, Clone)]
pub enum VNode {
    Element(Rc<VElement>),
    Text(String),
}

impl VNode {
    /// Element payload, if any
    pub fn as_element(&self) -> Option<&Rc<VElement>> {
        match self {
            VNode::Element(element) => Some(element),
            VNode::Text(_) => None,
        }
    }

    /// Text payload, if any
    pub fn as_text(&self) -> Option<&str> {
        match self {
            VNode::Text(text) => Some(text),
            VNode::Element(_) => None,
        }
    }

    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self, VNode::Text(_))
    }

    /// Tag name of an element node
    pub fn tag(&self) -> Option<&str> {
        self.as_element().map(|e| e.tag())
    }

    /// Realized DOM handle of an element node
    pub fn realized(&self) -> Option<NodeId> {
        self.as_element().and_then(|e| e.realized())
    }
}

impl From<Rc<VElement>> for VNode {
    fn from(element: Rc<VElement>) -> Self {
        VNode::Element(element)
    }
}

impl From<&str> for VNode {
    fn from(text: &str) -> Self {
        VNode::Text(text.to_string())
    }
}

impl From<String> for VNode {
    fn from(text: String) -> Self {
        VNode::Text(text)
    }
}

impl From<i32> for VNode {
    fn from(n: i32) -> Self {
        VNode::Text(n.to_string())
    }
}

impl From<i64> for VNode {
    fn from(n: i64) -> Self {
        VNode::Text(n.to_string())
    }
}

impl From<usize> for VNode {
    fn from(n: usize) -> Self {
        VNode::Text(n.to_string())
    }
}

impl From<f64> for VNode {
    fn from(n: f64) -> Self {
        VNode::Text(format_number(n))
    }
}

/// Structured virtual node
#[derive(Debug)]
pub struct VElement {
    tag: String,
    attrs: Attrs,
    children: RefCell<Vec<VNode>>,
    /// Owning element; never an owning reference
    parent: RefCell<Weak<VElement>>,
    /// Set on mount, cleared on unmount
    realized: Cell<Option<NodeId>>,
    /// Hook identities of the component builds that returned this node,
    /// innermost first
    hooks: RefCell<Vec<HookId>>,
}

impl VElement {
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    /// Borrow the children
    pub fn children(&self) -> Ref<'_, Vec<VNode>> {
        self.children.borrow()
    }

    /// Snapshot of the children, for walks that call back into the app
    pub fn child_list(&self) -> Vec<VNode> {
        self.children.borrow().clone()
    }

    pub fn child_count(&self) -> usize {
        self.children.borrow().len()
    }

    pub fn parent(&self) -> Option<Rc<VElement>> {
        self.parent.borrow().upgrade()
    }

    pub fn realized(&self) -> Option<NodeId> {
        self.realized.get()
    }

    /// Hook identities bound to this node
    pub fn hooks(&self) -> Vec<HookId> {
        self.hooks.borrow().clone()
    }

    pub(crate) fn set_parent(&self, parent: &Rc<VElement>) {
        *self.parent.borrow_mut() = Rc::downgrade(parent);
    }

    pub(crate) fn set_realized(&self, node: Option<NodeId>) {
        self.realized.set(node);
    }

    pub(crate) fn push_hook(&self, id: HookId) {
        let mut hooks = self.hooks.borrow_mut();
        if !hooks.contains(&id) {
            hooks.push(id);
        }
    }

    pub(crate) fn push_child(self: &Rc<Self>, child: VNode) {
        if let VNode::Element(element) = &child {
            element.set_parent(self);
        }
        self.children.borrow_mut().push(child);
    }

    /// Swap `old` for `new` in the children; false when `old` is not a child
    pub(crate) fn replace_child(self: &Rc<Self>, old: &Rc<VElement>, new: VNode) -> bool {
        let mut children = self.children.borrow_mut();
        let Some(slot) = children
            .iter_mut()
            .find(|c| c.as_element().is_some_and(|e| Rc::ptr_eq(e, old)))
        else {
            return false;
        };
        if let VNode::Element(element) = &new {
            element.set_parent(self);
        }
        *slot = new;
        true
    }
}

/// Create an element node
///
/// A `children` attribute is folded into the children sequence and every
/// element child gets its parent back-link.
pub fn create_node(tag: &str, mut attrs: Attrs, mut children: Vec<VNode>) -> VNode {
    match attrs.remove(reserved::CHILDREN) {
        Some(AttrValue::Children(extra)) => children.extend(extra),
        Some(other) => {
            if let Some(text) = other.to_dom_value() {
                children.push(VNode::Text(text));
            }
        }
        None => {}
    }

    let element = Rc::new(VElement {
        tag: tag.to_string(),
        attrs,
        children: RefCell::new(children),
        parent: RefCell::new(Weak::new()),
        realized: Cell::new(None),
        hooks: RefCell::new(Vec::new()),
    });
    for child in element.children.borrow().iter() {
        if let VNode::Element(child) = child {
            child.set_parent(&element);
        }
    }
    VNode::Element(element)
}
