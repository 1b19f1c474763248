//! HTML Serialization (innerHTML/outerHTML)
//!
//! Raw markup set on an element is emitted verbatim ahead of its child nodes.

use crate::{DomTree, NodeData, NodeId};

/// HTML serializer
#[derive(Debug, Clone, Default)]
pub struct HtmlSerializer {
    /// Emit the namespace as an `xmlns` attribute on namespaced elements
    pub emit_namespaces: bool,
}

/// Void elements (self-closing, no end tag)
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input",
    "link", "meta", "param", "source", "track", "wbr",
];

impl HtmlSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize innerHTML of a node (children only)
    pub fn serialize_inner(&self, tree: &DomTree, node_id: NodeId) -> String {
        let mut output = String::new();
        if let Some(markup) = tree.raw_html(node_id) {
            output.push_str(markup);
        }
        for child in tree.child_nodes(node_id) {
            self.serialize_node(tree, child, &mut output);
        }
        output
    }

    /// Serialize outerHTML of a node (including the node itself)
    pub fn serialize_outer(&self, tree: &DomTree, node_id: NodeId) -> String {
        let mut output = String::new();
        self.serialize_node(tree, node_id, &mut output);
        output
    }

    fn serialize_node(&self, tree: &DomTree, node_id: NodeId, output: &mut String) {
        let Some(node) = tree.get(node_id) else {
            return;
        };

        match &node.data {
            NodeData::Document | NodeData::Fragment => {
                for child in tree.child_nodes(node_id) {
                    self.serialize_node(tree, child, output);
                }
            }
            NodeData::Element(elem) => {
                let tag = elem.name.as_str();

                output.push('<');
                output.push_str(tag);

                if self.emit_namespaces {
                    if let Some(ns) = &elem.namespace {
                        output.push_str(" xmlns=\"");
                        escape_attribute(ns, output);
                        output.push('"');
                    }
                }

                for attr in &elem.attrs {
                    output.push(' ');
                    output.push_str(&attr.name);
                    if !attr.value.is_empty() {
                        output.push_str("=\"");
                        escape_attribute(&attr.value, output);
                        output.push('"');
                    }
                }

                if VOID_ELEMENTS.contains(&tag)
                    && elem.raw_html.is_none()
                    && !node.first_child.is_valid()
                {
                    output.push_str(" />");
                    return;
                }

                output.push('>');
                if let Some(markup) = &elem.raw_html {
                    output.push_str(markup);
                }
                for child in tree.child_nodes(node_id) {
                    self.serialize_node(tree, child, output);
                }
                output.push_str("</");
                output.push_str(tag);
                output.push('>');
            }
            NodeData::Text(text) => {
                escape_text(&text.content, output);
            }
        }
    }
}

/// Escape text content
fn escape_text(text: &str, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '\u{00A0}' => output.push_str("&nbsp;"),
            _ => output.push(c),
        }
    }
}

/// Escape attribute value
fn escape_attribute(value: &str, output: &mut String) {
    for c in value.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '"' => output.push_str("&quot;"),
            '\u{00A0}' => output.push_str("&nbsp;"),
            _ => output.push(c),
        }
    }
}
