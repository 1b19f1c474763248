//! Component functions and their props

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::attrs::{AttrValue, Attrs};
use crate::{App, VNode};

/// Route parameters handed to every page component
pub type Params = BTreeMap<String, String>;

/// Component build function
#[derive(Clone)]
pub struct Component(Rc<dyn Fn(&mut App, &Props) -> VNode>);

impl Component {
    pub fn new(build: impl Fn(&mut App, &Props) -> VNode + 'static) -> Self {
        Self(Rc::new(build))
    }

    /// Component that renders its children into a fragment
    pub fn fragment() -> Self {
        Self::new(|app, props| app.fragment(props.children.clone()))
    }

    pub(crate) fn call(&self, app: &mut App, props: &Props) -> VNode {
        (self.0)(app, props)
    }

    /// Check if two handles share the same build function
    pub fn ptr_eq(&self, other: &Component) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Component(..)")
    }
}

/// Arguments of a component build
#[derive(Debug, Clone, Default)]
pub struct Props {
    pub attrs: Attrs,
    pub children: Vec<VNode>,
}

impl Props {
    pub fn new(attrs: Attrs, children: Vec<VNode>) -> Self {
        Self { attrs, children }
    }

    /// Route parameters as text attributes
    pub fn from_params(params: &Params) -> Self {
        let mut attrs = Attrs::new();
        for (name, value) in params {
            attrs.insert(name, AttrValue::Text(value.clone()));
        }
        Self::new(attrs, Vec::new())
    }

    pub fn with_children(mut self, children: Vec<VNode>) -> Self {
        self.children = children;
        self
    }

    /// Plain attribute as text
    pub fn get_text(&self, name: &str) -> Option<String> {
        self.attrs.get_text(name)
    }
}

/// What `App::build` instantiates
#[derive(Debug, Clone)]
pub enum Tag {
    Name(String),
    Component(Component),
}

impl From<&str> for Tag {
    fn from(name: &str) -> Self {
        Tag::Name(name.to_string())
    }
}

impl From<String> for Tag {
    fn from(name: String) -> Self {
        Tag::Name(name)
    }
}

impl From<Component> for Tag {
    fn from(component: Component) -> Self {
        Tag::Component(component)
    }
}

impl From<&Component> for Tag {
    fn from(component: &Component) -> Self {
        Tag::Component(component.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_props_from_params() {
        let mut params = Params::new();
        params.insert("id".into(), "42".into());

        let props = Props::from_params(&params);
        assert_eq!(props.get_text("id").as_deref(), Some("42"));
        assert!(props.children.is_empty());
    }

    #[test]
    fn test_component_identity() {
        let a = Component::fragment();
        let b = a.clone();
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&Component::fragment()));
    }
}
