//! Renderer and patch application
//!
//! Materializes virtual nodes into the document and applies patches to the
//! realized tree. Every realized element is linked both ways: the element
//! records its node id and the app maps the node id back to the element.

use std::rc::Rc;

use arbor_dom::NodeId;
use arbor_events::{Condition, RemoveBy};

use crate::attrs::{AttrValue, reserved};
use crate::diff::{ElementPatch, Patch};
use crate::reconcile::{AttrPatch, ChildPatch};
use crate::{App, HookId, VElement, VNode, VdomError};

/// DOM attribute a virtual key is written to
fn dom_name(name: &str) -> &str {
    if name == reserved::CLASS_NAME { "class" } else { name }
}

impl App {
    // ---- linkage --------------------------------------------------------

    /// Virtual element realized at `node`
    pub fn vnode_of(&self, node: NodeId) -> Option<Rc<VElement>> {
        self.links.get(&node).and_then(|weak| weak.upgrade())
    }

    fn link(&mut self, node: NodeId, element: &Rc<VElement>) {
        element.set_realized(Some(node));
        self.links.insert(node, Rc::downgrade(element));
    }

    fn unlink(&mut self, node: NodeId) -> Option<Rc<VElement>> {
        self.links.remove(&node).and_then(|weak| weak.upgrade())
    }

    // ---- materialization ------------------------------------------------

    /// Materialize a detached subtree
    ///
    /// Effects of the new elements are queued; callers attach the result
    /// and then flush.
    pub(crate) fn render(&mut self, vnode: &VNode) -> Result<NodeId, VdomError> {
        match vnode {
            VNode::Text(text) => Ok(self.document.tree_mut().create_text(text)),
            VNode::Element(element) => self.render_element(element),
        }
    }

    fn render_element(&mut self, element: &Rc<VElement>) -> Result<NodeId, VdomError> {
        let tag = element.tag();
        let tree = self.document.tree_mut();
        let node = if tag == self.config.fragment_tag {
            tree.create_fragment()
        } else if let Some(namespace) = self.config.namespace_for(tag) {
            tree.create_element_ns(namespace, tag)
        } else {
            tree.create_element(tag)
        };
        self.stats.renders += 1;

        self.link(node, element);
        let patch = AttrPatch::initial(element.attrs());
        self.write_attrs(node, &patch);
        self.pending_effects.extend(element.hooks());

        for child in element.child_list() {
            let child_node = self.render(&child)?;
            self.document.tree_mut().append_child(node, child_node)?;
        }
        Ok(node)
    }

    /// Run effects queued by `render`, in document order
    pub(crate) fn flush_effects(&mut self) {
        let pending = std::mem::take(&mut self.pending_effects);
        for id in pending {
            self.run_effect(id);
        }
    }

    /// Replace `old` with a freshly rendered `new`
    ///
    /// The old subtree is torn down, except for hook records the new root
    /// carries over.
    pub fn mount(&mut self, old: NodeId, new: &VNode) -> Result<NodeId, VdomError> {
        let node = self.render(new)?;

        if let (Some(old_element), VNode::Element(new_element)) = (self.vnode_of(old), new) {
            if new_element.parent().is_none() {
                if let Some(parent) = old_element.parent() {
                    new_element.set_parent(&parent);
                }
            }
        }
        if self.app_node == Some(old) {
            self.app_node = Some(node);
        }

        let keep = new.as_element().map(|e| e.hooks()).unwrap_or_default();
        self.teardown(old, &keep);
        let tree = self.document.tree_mut();
        if tree.parent(old).is_some() {
            tree.replace_with(old, node)?;
        }
        tree.release(old);

        self.flush_effects();
        Ok(node)
    }

    /// Render `child`, append it to the element at `node` and record it
    pub fn insert_child(&mut self, node: NodeId, child: VNode) -> Result<NodeId, VdomError> {
        let parent = self.vnode_of(node).ok_or(VdomError::MissingLinkage(node))?;
        parent.push_child(child.clone());

        let child_node = self.append_rendered(node, &child)?;
        self.flush_effects();
        Ok(child_node)
    }

    fn append_rendered(&mut self, parent: NodeId, vnode: &VNode) -> Result<NodeId, VdomError> {
        let child = self.render(vnode)?;
        self.document.tree_mut().append_child(parent, child)?;
        Ok(child)
    }

    // ---- removal --------------------------------------------------------

    /// Remove the subtree at `node`
    ///
    /// Children go first. Listeners are deregistered, refs cleared and hook
    /// records deleted before the nodes are released.
    pub fn remove_subtree(&mut self, node: NodeId) {
        self.teardown(node, &[]);
        self.document.tree_mut().release(node);
    }

    fn teardown(&mut self, node: NodeId, keep: &[HookId]) {
        for child in self.document.tree().child_nodes(node) {
            self.teardown(child, keep);
        }
        self.events.remove_listener(RemoveBy::Node(node), None);

        let Some(element) = self.unlink(node) else {
            return;
        };
        // Relinked to another node by a later patch
        if element.realized() != Some(node) {
            return;
        }
        for (_, value) in element.attrs().iter() {
            if let AttrValue::Ref(target) = value {
                target.assign(None);
            }
        }
        for id in element.hooks() {
            if !keep.contains(&id) {
                self.drop_hook(id);
            }
        }
        element.set_realized(None);
    }

    // ---- patching -------------------------------------------------------

    /// Apply a patch to the realized node; returns the node now in its place
    pub fn apply_patch(&mut self, patch: &Patch, node: NodeId) -> Option<NodeId> {
        self.stats.patches += 1;
        match patch {
            Patch::Keep => Some(node),
            Patch::Remove => {
                self.remove_subtree(node);
                None
            }
            Patch::Replace(vnode) => self.mount_or_log(node, vnode),
            Patch::SetText(text) => match self.document.tree_mut().set_text(node, text) {
                Ok(()) => Some(node),
                Err(err) => {
                    tracing::error!(node = %node, error = %err, "text patch failed; remounting");
                    self.mount_or_log(node, &VNode::Text(text.clone()))
                }
            },
            Patch::Update(update) => self.apply_update(update, node),
        }
    }

    fn mount_or_log(&mut self, node: NodeId, vnode: &VNode) -> Option<NodeId> {
        match self.mount(node, vnode) {
            Ok(new_node) => Some(new_node),
            Err(err) => {
                tracing::error!(node = %node, error = %err, "mount failed");
                None
            }
        }
    }

    fn apply_update(&mut self, update: &ElementPatch, node: NodeId) -> Option<NodeId> {
        let tree = self.document.tree();
        if !tree.exists(node) {
            tracing::error!(node = %node, "{}", VdomError::NotRendered);
            return None;
        }
        if tree.is_fragment(node) {
            tracing::warn!(node = %node, "fragment children were moved on insert; skipping patch");
            return Some(node);
        }
        if self.vnode_of(node).is_none() {
            tracing::error!(node = %node, "{}; skipping subtree", VdomError::MissingLinkage(node));
            return Some(node);
        }

        self.link(node, &update.new);
        self.apply_attr_patch(node, &update.attrs);
        self.apply_child_patch(node, &update.children);
        Some(node)
    }

    /// Removals, then sets, then effects of the new hooks; hooks the new
    /// node no longer carries are deleted last
    ///
    /// A new identity standing in for an old one at the same nesting depth
    /// only runs its effect when the dependency signature changed.
    pub(crate) fn apply_attr_patch(&mut self, node: NodeId, patch: &AttrPatch) {
        self.write_attrs(node, patch);
        for (depth, id) in patch.new_hooks.iter().enumerate() {
            let replaced = patch.old_hooks.get(depth).copied().filter(|old| old != id);
            if let Some(old) = replaced {
                if self.hooks.carry_effect(old, *id) {
                    tracing::trace!(
                        hook = %id,
                        from = %old,
                        "dependencies unchanged; effect carried over"
                    );
                    continue;
                }
            }
            self.run_effect(*id);
        }
        let dropped: Vec<HookId> = patch.dropped_hooks().collect();
        for id in dropped {
            self.drop_hook(id);
        }
    }

    fn write_attrs(&mut self, node: NodeId, patch: &AttrPatch) {
        for (name, value) in &patch.removals {
            if let Err(err) = self.remove_attr(node, name, value) {
                tracing::warn!(
                    node = %node,
                    attr = %name,
                    error = %err,
                    "attribute removal failed"
                );
            }
        }
        for (name, value) in &patch.sets {
            if let Err(err) = self.set_attr(node, name, value) {
                tracing::warn!(node = %node, attr = %name, error = %err, "attribute write failed");
            }
        }
    }

    fn set_attr(&mut self, node: NodeId, name: &str, value: &AttrValue) -> Result<(), VdomError> {
        match value {
            AttrValue::Event(binding) => {
                self.events.add_listener(
                    Condition::Node(node),
                    binding.event_type(),
                    Rc::clone(binding.handler()),
                );
            }
            AttrValue::Ref(target) => target.assign(Some(node)),
            AttrValue::RawHtml(markup) => self.document.tree_mut().set_raw_html(node, markup)?,
            AttrValue::Key(_) | AttrValue::HookBinding(_) | AttrValue::Children(_) => {}
            plain => {
                let tree = self.document.tree_mut();
                if !tree.is_element(node) {
                    return Ok(());
                }
                let name = dom_name(name);
                let Some(text) = plain.to_dom_value() else {
                    return Ok(());
                };
                if plain.is_truthy() || tree.get_attribute(node, name).is_some() {
                    tree.set_attribute(node, name, &text)?;
                }
            }
        }
        Ok(())
    }

    fn remove_attr(
        &mut self,
        node: NodeId,
        name: &str,
        value: &AttrValue,
    ) -> Result<(), VdomError> {
        match value {
            AttrValue::Event(binding) => {
                self.events.remove_listener(RemoveBy::Node(node), Some(binding.event_type()));
            }
            AttrValue::Ref(target) => target.assign(None),
            AttrValue::RawHtml(_) => self.document.tree_mut().set_raw_html(node, "")?,
            AttrValue::Key(_) | AttrValue::HookBinding(_) | AttrValue::Children(_) => {}
            _ => {
                let tree = self.document.tree_mut();
                if tree.is_element(node) {
                    tree.remove_attribute(node, dom_name(name))?;
                }
            }
        }
        Ok(())
    }

    /// Zip the updates against a snapshot of the live children, then append
    pub(crate) fn apply_child_patch(&mut self, node: NodeId, patch: &ChildPatch) {
        let live = self.document.tree().child_nodes(node);
        if live.len() < patch.updates.len() {
            tracing::warn!(
                node = %node,
                expected = patch.updates.len(),
                found = live.len(),
                "fewer live children than virtual ones"
            );
        }
        for (update, child) in patch.updates.iter().zip(live) {
            self.apply_patch(update, child);
        }

        for vchild in &patch.appends {
            if let Err(err) = self.append_rendered(node, vchild) {
                tracing::error!(node = %node, error = %err, "failed to append child");
            }
        }
        self.flush_effects();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::{Attrs, Config, create_node};

    fn app() -> App {
        App::new(Config::default())
    }

    #[test]
    fn test_render_links_both_ways() {
        let mut app = app();
        let vnode = create_node("div", Attrs::new().with("id", "x"), vec!["hi".into()]);
        let node = app.render(&vnode).unwrap();

        let element = vnode.as_element().unwrap();
        assert_eq!(element.realized(), Some(node));
        assert!(Rc::ptr_eq(&app.vnode_of(node).unwrap(), element));
        assert_eq!(app.dom().get_attribute(node, "id"), Some("x"));
        assert_eq!(app.dom().text_content(node), "hi");
    }

    #[test]
    fn test_class_name_and_falsy_values() {
        let mut app = app();
        let attrs = Attrs::new()
            .class(vec!["a".to_string(), "b".to_string()])
            .with("title", "")
            .with("hidden", false)
            .with("tabindex", 0);
        let node = app.render(&create_node("p", attrs, vec![])).unwrap();

        assert_eq!(app.dom().get_attribute(node, "class"), Some("a b"));
        assert_eq!(app.dom().get_attribute(node, "title"), None);
        assert_eq!(app.dom().get_attribute(node, "hidden"), None);
        assert_eq!(app.dom().get_attribute(node, "tabindex"), Some("0"));
    }

    #[test]
    fn test_remove_subtree_clears_refs_and_listeners() {
        let mut app = app();
        let cell = app.use_ref();
        let cleared = Rc::new(Cell::new(false));
        let flag = Rc::clone(&cleared);

        let inner = create_node(
            "button",
            Attrs::new()
                .on("click", |_, _| {})
                .ref_callback(move |node| flag.set(node.is_none())),
            vec![],
        );
        let outer = create_node("div", Attrs::new().node_ref(&cell), vec![inner]);
        let node = app.render(&outer).unwrap();
        assert_eq!(cell.get(), Some(node));
        assert_eq!(app.events().listener_count("click"), 1);

        app.remove_subtree(node);
        assert_eq!(cell.get(), None);
        assert!(cleared.get());
        assert_eq!(app.events().listener_count("click"), 0);
        assert!(!app.dom().exists(node));
        assert!(app.vnode_of(node).is_none());
    }

    #[test]
    fn test_insert_child_appends_only_new() {
        let mut app = app();
        let item = create_node("li", Attrs::new(), vec!["a".into()]);
        let vnode = create_node("ul", Attrs::new(), vec![item]);
        let node = app.render(&vnode).unwrap();
        let first = app.dom().child_nodes(node)[0];

        app.insert_child(node, create_node("li", Attrs::new(), vec!["b".into()])).unwrap();
        let children = app.dom().child_nodes(node);
        assert_eq!(children.len(), 2);
        assert_eq!(children[0], first);
        assert_eq!(vnode.as_element().unwrap().child_count(), 2);
    }

    #[test]
    fn test_svg_namespace() {
        let mut app = app();
        let path = create_node("path", Attrs::new(), vec![]);
        let vnode = create_node("svg", Attrs::new(), vec![path]);
        let node = app.render(&vnode).unwrap();
        assert_eq!(app.dom().namespace(node), Some(arbor_dom::SVG_NAMESPACE));
    }
}
