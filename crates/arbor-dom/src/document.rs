//! Document - High-level document API

use crate::{DomTree, NodeId};

/// Document loading state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadyState {
    #[default]
    Loading,
    Interactive,
    Complete,
}

/// HTML Document
#[derive(Debug)]
pub struct Document {
    /// The DOM tree
    pub tree: DomTree,
    /// Document title
    title: String,
    /// Loading state
    ready_state: ReadyState,
    /// Cached reference to <html> element
    html_element: NodeId,
    /// Cached reference to <head> element
    head_element: NodeId,
    /// Cached reference to <body> element
    body_element: NodeId,
}

impl Document {
    /// Create a new document with an html/head/body skeleton
    pub fn new() -> Self {
        let mut tree = DomTree::new();

        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        // Freshly created nodes cannot fail to link
        let root = tree.root();
        let _ = tree.append_child(root, html);
        let _ = tree.append_child(html, head);
        let _ = tree.append_child(html, body);

        Self {
            tree,
            title: String::new(),
            ready_state: ReadyState::Loading,
            html_element: html,
            head_element: head,
            body_element: body,
        }
    }

    /// Get document title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Set document title
    pub fn set_title(&mut self, title: &str) {
        if self.title != title {
            tracing::trace!(title, "document title changed");
            self.title = title.to_string();
        }
    }

    /// Current loading state
    pub fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    /// Advance the loading state
    pub fn set_ready_state(&mut self, state: ReadyState) {
        self.ready_state = state;
    }

    /// Get <html> element
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    /// Get <head> element
    pub fn head(&self) -> NodeId {
        self.head_element
    }

    /// Get <body> element
    pub fn body(&self) -> NodeId {
        self.body_element
    }

    /// Get element by ID
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.find_element_with_id(self.tree.root(), id)
    }

    fn find_element_with_id(&self, start: NodeId, target_id: &str) -> Option<NodeId> {
        for node_id in self.tree.child_nodes(start) {
            if self.tree.get_attribute(node_id, "id") == Some(target_id) {
                return Some(node_id);
            }
            if let Some(found) = self.find_element_with_id(node_id, target_id) {
                return Some(found);
            }
        }
        None
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skeleton() {
        let doc = Document::new();
        let tree = doc.tree();

        assert_eq!(tree.tag_name(doc.document_element()), Some("html"));
        assert_eq!(tree.child_nodes(doc.document_element()), vec![doc.head(), doc.body()]);
        assert_eq!(doc.ready_state(), ReadyState::Loading);
    }

    #[test]
    fn test_get_element_by_id() {
        let mut doc = Document::new();
        let body = doc.body();
        let tree = doc.tree_mut();
        let root = tree.create_element("div");
        tree.set_attribute(root, "id", "root").unwrap();
        tree.append_child(body, root).unwrap();

        assert_eq!(doc.get_element_by_id("root"), Some(root));
        assert_eq!(doc.get_element_by_id("missing"), None);
    }
}
