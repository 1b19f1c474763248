//! DOM Tree (generational arena)

use crate::{DomError, MutationRecord, Node, NodeData, NodeId};

/// Arena slot
#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena-based DOM tree
///
/// Released slots are recycled with a bumped generation, so stale ids fail
/// lookups instead of aliasing new nodes.
#[derive(Debug)]
pub struct DomTree {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    root: NodeId,
    live: usize,
    recording: bool,
    journal: Vec<MutationRecord>,
}

impl DomTree {
    /// Create a new tree holding only a document node
    pub fn new() -> Self {
        let mut tree = Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            root: NodeId::NONE,
            live: 0,
            recording: false,
            journal: Vec::new(),
        };
        tree.root = tree.alloc(Node::document());
        tree
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        self.live += 1;
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            NodeId { index, generation: slot.generation }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot { generation: 0, node: Some(node) });
            NodeId { index, generation: 0 }
        }
    }

    fn record(&mut self, record: MutationRecord) {
        if self.recording {
            self.journal.push(record);
        }
    }

    /// Document node
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots.get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    fn node(&self, id: NodeId) -> Result<&Node, DomError> {
        self.get(id).ok_or(DomError::InvalidNode(id))
    }

    /// Check if an id still resolves
    #[inline]
    pub fn exists(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live nodes (document included)
    pub fn len(&self) -> usize {
        self.live
    }

    /// Check if only the document node is alive
    pub fn is_empty(&self) -> bool {
        self.live <= 1
    }

    // ---- creation -------------------------------------------------------

    /// Create an element in the default namespace
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.alloc(Node::element(name, None))
    }

    /// Create an element in the given namespace
    pub fn create_element_ns(&mut self, namespace: &str, name: &str) -> NodeId {
        self.alloc(Node::element(name, Some(namespace)))
    }

    /// Create a text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.alloc(Node::text(content.to_string()))
    }

    /// Create a document fragment
    pub fn create_fragment(&mut self) -> NodeId {
        self.alloc(Node::fragment())
    }

    // ---- structure ------------------------------------------------------

    /// Parent of a node, if attached
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).map(|n| n.parent).filter(NodeId::is_valid)
    }

    /// Child ids in order
    pub fn child_nodes(&self, parent: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cursor = self.get(parent).map_or(NodeId::NONE, |n| n.first_child);
        while let Some(node) = self.get(cursor) {
            out.push(cursor);
            cursor = node.next_sibling;
        }
        out
    }

    /// Check if `node` is `ancestor` or one of its descendants
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = node;
        while let Some(current) = self.get(cursor) {
            if cursor == ancestor {
                return true;
            }
            cursor = current.parent;
        }
        false
    }

    /// Check if a node is connected to the document
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.exists(id) && self.contains(self.root, id)
    }

    fn unlink(&mut self, id: NodeId) {
        let Some(node) = self.get(id) else { return };
        let (parent, prev, next) = (node.parent, node.prev_sibling, node.next_sibling);

        if let Some(p) = self.get_mut(prev) {
            p.next_sibling = next;
        } else if let Some(p) = self.get_mut(parent) {
            p.first_child = next;
        }
        if let Some(n) = self.get_mut(next) {
            n.prev_sibling = prev;
        } else if let Some(p) = self.get_mut(parent) {
            p.last_child = prev;
        }
        if let Some(node) = self.get_mut(id) {
            node.parent = NodeId::NONE;
            node.prev_sibling = NodeId::NONE;
            node.next_sibling = NodeId::NONE;
        }
    }

    fn link_last(&mut self, parent: NodeId, child: NodeId) {
        let last = self.get(parent).map_or(NodeId::NONE, |n| n.last_child);
        if let Some(c) = self.get_mut(child) {
            c.parent = parent;
            c.prev_sibling = last;
            c.next_sibling = NodeId::NONE;
        }
        if let Some(l) = self.get_mut(last) {
            l.next_sibling = child;
        }
        if let Some(p) = self.get_mut(parent) {
            if !p.first_child.is_valid() {
                p.first_child = child;
            }
            p.last_child = child;
        }
    }

    fn link_before(&mut self, reference: NodeId, child: NodeId) {
        let Some(r) = self.get(reference) else { return };
        let (parent, prev) = (r.parent, r.prev_sibling);
        if let Some(c) = self.get_mut(child) {
            c.parent = parent;
            c.prev_sibling = prev;
            c.next_sibling = reference;
        }
        if let Some(r) = self.get_mut(reference) {
            r.prev_sibling = child;
        }
        if let Some(p) = self.get_mut(prev) {
            p.next_sibling = child;
        } else if let Some(p) = self.get_mut(parent) {
            p.first_child = child;
        }
    }

    /// Nodes a fragment contributes, or the node itself
    fn insertion_set(&mut self, child: NodeId) -> Vec<NodeId> {
        let is_fragment = self.get(child).is_some_and(Node::is_fragment);
        if !is_fragment {
            self.unlink(child);
            return vec![child];
        }
        let moved = self.child_nodes(child);
        for id in &moved {
            self.unlink(*id);
        }
        moved
    }

    /// Append a child; a fragment's children are moved in its place
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.node(parent)?;
        self.node(child)?;
        if self.contains(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        for id in self.insertion_set(child) {
            self.link_last(parent, id);
            self.record(MutationRecord::node_inserted(id, parent));
        }
        Ok(())
    }

    /// Insert `child` before `reference` under the reference's parent
    pub fn insert_before(&mut self, reference: NodeId, child: NodeId) -> Result<(), DomError> {
        let parent = self.parent(reference).ok_or(DomError::Detached(reference))?;
        self.node(child)?;
        if self.contains(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        for id in self.insertion_set(child) {
            self.link_before(reference, id);
            self.record(MutationRecord::node_inserted(id, parent));
        }
        Ok(())
    }

    /// Detach a node from its parent (no-op when already detached)
    pub fn detach(&mut self, id: NodeId) -> Result<(), DomError> {
        let parent = self.node(id)?.parent;
        if parent.is_valid() {
            self.unlink(id);
            self.record(MutationRecord::node_removed(id, parent));
        }
        Ok(())
    }

    /// Put `new` where `old` is and detach `old`
    pub fn replace_with(&mut self, old: NodeId, new: NodeId) -> Result<(), DomError> {
        let parent = self.parent(old).ok_or(DomError::Detached(old))?;
        self.node(new)?;
        if self.contains(new, parent) {
            return Err(DomError::HierarchyRequest { parent, child: new });
        }
        for id in self.insertion_set(new) {
            self.link_before(old, id);
        }
        self.unlink(old);
        self.record(MutationRecord::node_replaced(old, new));
        Ok(())
    }

    /// Free a node and its whole subtree
    ///
    /// The node is detached first; every id in the subtree stops resolving.
    pub fn release(&mut self, id: NodeId) {
        if !self.exists(id) || id == self.root {
            return;
        }
        let _ = self.detach(id);
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            stack.extend(self.child_nodes(current));
            if let Some(slot) = self.slots.get_mut(current.index as usize) {
                if slot.generation == current.generation && slot.node.take().is_some() {
                    slot.generation = slot.generation.wrapping_add(1);
                    self.free_list.push(current.index);
                    self.live -= 1;
                }
            }
        }
        tracing::trace!(node = %id, "released subtree");
    }

    // ---- content --------------------------------------------------------

    /// Tag name of an element
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.get(id)?.as_element().map(|e| e.name.as_str())
    }

    /// Namespace of an element
    pub fn namespace(&self, id: NodeId) -> Option<&str> {
        self.get(id)?.as_element()?.namespace.as_deref()
    }

    /// Check if a node is an element
    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::is_element)
    }

    /// Check if a node is a text node
    pub fn is_text(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::is_text)
    }

    /// Check if a node is a fragment
    pub fn is_fragment(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::is_fragment)
    }

    /// Get an attribute value
    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.get(id)?.as_element()?.get_attr(name)
    }

    /// All attributes in insertion order
    pub fn attributes(&self, id: NodeId) -> &[crate::Attribute] {
        self.get(id)
            .and_then(Node::as_element)
            .map(|e| e.attrs.as_slice())
            .unwrap_or(&[])
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut crate::ElementData, DomError> {
        self.get_mut(id)
            .ok_or(DomError::InvalidNode(id))?
            .as_element_mut()
            .ok_or(DomError::NotAnElement(id))
    }

    /// Set an attribute; unchanged values are not journaled
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let elem = self.element_mut(id)?;
        if elem.get_attr(name) == Some(value) {
            return Ok(());
        }
        let old = elem.set_attr(name, value);
        self.record(MutationRecord::attr_set(id, name, old.as_deref(), value));
        Ok(())
    }

    /// Remove an attribute; returns whether it was present
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<bool, DomError> {
        let removed = self.element_mut(id)?.remove_attr(name);
        match removed {
            Some(old) => {
                self.record(MutationRecord::attr_removed(id, name, &old));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Raw markup of an element
    pub fn raw_html(&self, id: NodeId) -> Option<&str> {
        self.get(id)?.as_element()?.raw_html.as_deref()
    }

    /// Inject raw markup; an empty string clears it
    pub fn set_raw_html(&mut self, id: NodeId, markup: &str) -> Result<(), DomError> {
        let elem = self.element_mut(id)?;
        let next = (!markup.is_empty()).then(|| markup.to_string());
        if elem.raw_html == next {
            return Ok(());
        }
        let old = std::mem::replace(&mut elem.raw_html, next);
        self.record(MutationRecord::raw_html_changed(
            id,
            old.as_deref(),
            (!markup.is_empty()).then_some(markup),
        ));
        Ok(())
    }

    /// Text of a text node
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.get(id)?.as_text()
    }

    /// Replace the content of a text node
    pub fn set_text(&mut self, id: NodeId, content: &str) -> Result<(), DomError> {
        let node = self.get_mut(id).ok_or(DomError::InvalidNode(id))?;
        let NodeData::Text(text) = &mut node.data else {
            return Err(DomError::NotText(id));
        };
        if text.content == content {
            return Ok(());
        }
        let old = std::mem::replace(&mut text.content, content.to_string());
        self.record(MutationRecord::text_changed(id, &old, content));
        Ok(())
    }

    /// Concatenated text of a subtree
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        if let Some(text) = self.text(id) {
            out.push_str(text);
            return;
        }
        for child in self.child_nodes(id) {
            self.collect_text(child, out);
        }
    }

    // ---- journal --------------------------------------------------------

    /// Enable or disable mutation recording
    pub fn set_recording(&mut self, enabled: bool) {
        self.recording = enabled;
        if !enabled {
            self.journal.clear();
        }
    }

    /// Check if mutations are being recorded
    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Drain recorded mutations
    pub fn take_mutations(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.journal)
    }

    /// Number of recorded mutations not yet drained
    pub fn mutation_count(&self) -> usize {
        self.journal.len()
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MutationKind;

    #[test]
    fn test_release_invalidates_ids() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        let span = tree.create_element("span");
        tree.append_child(div, span).unwrap();

        tree.release(div);
        assert!(!tree.exists(div));
        assert!(!tree.exists(span));

        // Slot is reused with a new generation
        let p = tree.create_element("p");
        assert!(tree.exists(p));
        assert_eq!(p.index(), span.index());
        assert_ne!(p, span);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_fragment_append_moves_children() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        let frag = tree.create_fragment();
        let a = tree.create_text("a");
        let b = tree.create_text("b");
        tree.append_child(frag, a).unwrap();
        tree.append_child(frag, b).unwrap();

        tree.append_child(div, frag).unwrap();

        assert_eq!(tree.child_nodes(div), vec![a, b]);
        assert!(tree.child_nodes(frag).is_empty());
        assert_eq!(tree.parent(frag), None);
    }

    #[test]
    fn test_replace_with_keeps_position() {
        let mut tree = DomTree::new();
        let ul = tree.create_element("ul");
        let items: Vec<_> = (0..3).map(|_| tree.create_element("li")).collect();
        for item in &items {
            tree.append_child(ul, *item).unwrap();
        }
        let p = tree.create_element("p");

        tree.replace_with(items[1], p).unwrap();

        assert_eq!(tree.child_nodes(ul), vec![items[0], p, items[2]]);
        assert_eq!(tree.parent(items[1]), None);
    }

    #[test]
    fn test_replace_detached_fails() {
        let mut tree = DomTree::new();
        let a = tree.create_element("a");
        let b = tree.create_element("b");
        assert_eq!(tree.replace_with(a, b), Err(DomError::Detached(a)));
    }

    #[test]
    fn test_cycle_rejected() {
        let mut tree = DomTree::new();
        let outer = tree.create_element("div");
        let inner = tree.create_element("div");
        tree.append_child(outer, inner).unwrap();

        assert!(matches!(
            tree.append_child(inner, outer),
            Err(DomError::HierarchyRequest { .. })
        ));
    }

    #[test]
    fn test_unchanged_writes_not_journaled() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        let text = tree.create_text("x");
        tree.set_recording(true);

        tree.set_attribute(div, "class", "a").unwrap();
        tree.set_attribute(div, "class", "a").unwrap();
        tree.set_text(text, "x").unwrap();
        tree.set_raw_html(div, "").unwrap();

        let mutations = tree.take_mutations();
        assert_eq!(mutations.len(), 1);
        assert_eq!(mutations[0].kind, MutationKind::AttrSet);
    }

    #[test]
    fn test_attribute_on_text_fails() {
        let mut tree = DomTree::new();
        let text = tree.create_text("x");
        assert_eq!(
            tree.set_attribute(text, "class", "a"),
            Err(DomError::NotAnElement(text))
        );
    }
}
