//! App Configuration

use std::collections::HashMap;

use arbor_dom::SVG_NAMESPACE;

/// Tags created in the SVG namespace by default
const SVG_TAGS: &[&str] = &[
    "svg", "path", "g", "circle", "ellipse", "line", "polyline", "polygon", "rect", "defs", "use",
];

/// App configuration options
#[derive(Debug, Clone)]
pub struct Config {
    /// Id of the mount-point element created inside <body>
    pub root_id: String,

    /// Tag name → namespace URI for tags outside the HTML namespace
    pub namespaced_tags: HashMap<String, String>,

    /// Synthetic tag that renders to a document fragment
    pub fragment_tag: String,

    /// Journal DOM mutations (diagnostics and tests)
    pub record_mutations: bool,

    /// Title shown while a page is loading
    pub loading_title: String,

    /// Event types whose default action is always prevented
    pub auto_prevent: Vec<String>,
}

impl Config {
    /// Set the mount-point id
    pub fn with_root_id(mut self, id: &str) -> Self {
        self.root_id = id.to_string();
        self
    }

    /// Create `tag` in `namespace`
    pub fn with_namespaced_tag(mut self, tag: &str, namespace: &str) -> Self {
        self.namespaced_tags.insert(tag.to_string(), namespace.to_string());
        self
    }

    /// Enable or disable the mutation journal
    pub fn with_mutation_journal(mut self, enabled: bool) -> Self {
        self.record_mutations = enabled;
        self
    }

    /// Set the loading title placeholder
    pub fn with_loading_title(mut self, title: &str) -> Self {
        self.loading_title = title.to_string();
        self
    }

    /// Namespace for a tag, if it has one
    pub fn namespace_for(&self, tag: &str) -> Option<&str> {
        self.namespaced_tags.get(tag).map(String::as_str)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_id: "root".to_string(),
            namespaced_tags: SVG_TAGS
                .iter()
                .map(|tag| (tag.to_string(), SVG_NAMESPACE.to_string()))
                .collect(),
            fragment_tag: "fragment".to_string(),
            record_mutations: false,
            loading_title: "Loading".to_string(),
            auto_prevent: vec!["submit".to_string()],
        }
    }
}
