//! Virtual attributes
//!
//! Attribute kinds are resolved when the attribute is created, so the
//! reconciler dispatches on the variant instead of inspecting key strings.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use arbor_dom::NodeId;
use arbor_events::Event;
use arbor_style::{StyleMap, format_number, to_style};

use crate::{App, HookId, VNode};

/// Reserved attribute keys
pub mod reserved {
    /// Bookkeeping key, never written to the element
    pub const KEY: &str = "key";
    /// Element reference target
    pub const REF: &str = "ref";
    /// Raw markup injection
    pub const HTML: &str = "html";
    /// Hook identity carried into a rebuild
    pub const HOOK_KEY: &str = "hookKey";
    /// Children convenience value
    pub const CHILDREN: &str = "children";
    /// Virtual name of the class attribute
    pub const CLASS_NAME: &str = "className";
}

/// Event handler
pub type Handler = Rc<dyn Fn(&mut App, &mut Event)>;

/// Shared `.current` cell filled with the realized element
pub type NodeRef = Rc<Cell<Option<NodeId>>>;

/// Keyed slots filled with realized elements
pub type RefMap = Rc<RefCell<HashMap<String, Option<NodeId>>>>;

/// Event-prop binding
#[derive(Clone)]
pub struct EventBinding {
    event_type: String,
    handler: Handler,
}

impl EventBinding {
    /// Bind a handler to an event type (case-insensitive)
    pub fn new(event_type: &str, handler: Handler) -> Self {
        Self {
            event_type: event_type.to_ascii_lowercase(),
            handler,
        }
    }

    /// Lower-cased event type
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// The bound handler
    pub fn handler(&self) -> &Handler {
        &self.handler
    }
}

/// Where the realized element is published
#[derive(Clone)]
pub enum RefTarget {
    /// Invoked with the element on mount and `None` on removal
    Callback(Rc<dyn Fn(Option<NodeId>)>),
    /// `.current`-style cell
    Cell(NodeRef),
    /// `[object, key]` pair
    Keyed(RefMap, String),
}

impl RefTarget {
    /// Publish (or clear) the element
    pub(crate) fn assign(&self, node: Option<NodeId>) {
        match self {
            RefTarget::Callback(cb) => cb(node),
            RefTarget::Cell(cell) => cell.set(node),
            RefTarget::Keyed(map, key) => {
                map.borrow_mut().insert(key.clone(), node);
            }
        }
    }
}

impl fmt::Debug for RefTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefTarget::Callback(_) => f.write_str("Callback(..)"),
            RefTarget::Cell(cell) => f.debug_tuple("Cell").field(&cell.get()).finish(),
            RefTarget::Keyed(_, key) => f.debug_tuple("Keyed").field(key).finish(),
        }
    }
}

/// Attribute value
#[derive(Clone)]
pub enum AttrValue {
    Text(String),
    Number(f64),
    Bool(bool),
    /// Class names joined with a single space
    ClassList(Vec<String>),
    /// Serialized to inline CSS
    Style(StyleMap),
    Event(EventBinding),
    Ref(RefTarget),
    RawHtml(String),
    Key(String),
    HookBinding(HookId),
    /// Folded into the children sequence at construction
    Children(Vec<VNode>),
}

impl AttrValue {
    /// Check if this is an event-prop
    #[inline]
    pub fn is_event(&self) -> bool {
        matches!(self, AttrValue::Event(_))
    }

    /// Check if this value is written to the element as an attribute
    pub fn is_plain(&self) -> bool {
        matches!(
            self,
            AttrValue::Text(_)
                | AttrValue::Number(_)
                | AttrValue::Bool(_)
                | AttrValue::ClassList(_)
                | AttrValue::Style(_)
        )
    }

    /// Attribute text for plain values
    pub fn to_dom_value(&self) -> Option<String> {
        match self {
            AttrValue::Text(text) => Some(text.clone()),
            AttrValue::Number(n) => Some(format_number(*n)),
            AttrValue::Bool(b) => Some(b.to_string()),
            AttrValue::ClassList(classes) => Some(classes.join(" ")),
            AttrValue::Style(style) => Some(to_style(style)),
            _ => None,
        }
    }

    /// Falsy values are only written over an existing attribute
    pub(crate) fn is_truthy(&self) -> bool {
        match self {
            AttrValue::Text(text) => !text.is_empty(),
            AttrValue::Number(_) => true,
            AttrValue::Bool(b) => *b,
            AttrValue::ClassList(classes) => classes.iter().any(|c| !c.is_empty()),
            AttrValue::Style(style) => !style.is_empty(),
            _ => false,
        }
    }
}

impl fmt::Debug for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Text(text) => f.debug_tuple("Text").field(text).finish(),
            AttrValue::Number(n) => f.debug_tuple("Number").field(n).finish(),
            AttrValue::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            AttrValue::ClassList(c) => f.debug_tuple("ClassList").field(c).finish(),
            AttrValue::Style(s) => f.debug_tuple("Style").field(s).finish(),
            AttrValue::Event(b) => f.debug_tuple("Event").field(&b.event_type).finish(),
            AttrValue::Ref(r) => f.debug_tuple("Ref").field(r).finish(),
            AttrValue::RawHtml(m) => f.debug_tuple("RawHtml").field(m).finish(),
            AttrValue::Key(k) => f.debug_tuple("Key").field(k).finish(),
            AttrValue::HookBinding(id) => f.debug_tuple("HookBinding").field(id).finish(),
            AttrValue::Children(c) => f.debug_tuple("Children").field(&c.len()).finish(),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

impl From<&String> for AttrValue {
    fn from(value: &String) -> Self {
        AttrValue::Text(value.clone())
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Number(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        AttrValue::Number(f64::from(value))
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Number(value as f64)
    }
}

impl From<usize> for AttrValue {
    fn from(value: usize) -> Self {
        AttrValue::Number(value as f64)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<Vec<String>> for AttrValue {
    fn from(value: Vec<String>) -> Self {
        AttrValue::ClassList(value)
    }
}

impl From<StyleMap> for AttrValue {
    fn from(value: StyleMap) -> Self {
        AttrValue::Style(value)
    }
}

impl From<RefTarget> for AttrValue {
    fn from(value: RefTarget) -> Self {
        AttrValue::Ref(value)
    }
}

/// Insertion-ordered attribute map
#[derive(Debug, Clone, Default)]
pub struct Attrs {
    entries: Vec<(String, AttrValue)>,
}

impl Attrs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.insert(name, value.into());
        self
    }

    /// Bind an event handler under `on<event>`
    pub fn on(self, event: &str, handler: impl Fn(&mut App, &mut Event) + 'static) -> Self {
        let binding = EventBinding::new(event, Rc::new(handler));
        let key = format!("on{}", binding.event_type());
        self.with(&key, AttrValue::Event(binding))
    }

    /// Set `className`
    pub fn class(self, value: impl Into<AttrValue>) -> Self {
        self.with(reserved::CLASS_NAME, value)
    }

    /// Set an inline style map
    pub fn style(self, style: StyleMap) -> Self {
        self.with("style", AttrValue::Style(style))
    }

    /// Publish the realized element into a `.current` cell
    pub fn node_ref(self, cell: &NodeRef) -> Self {
        self.with(reserved::REF, AttrValue::Ref(RefTarget::Cell(Rc::clone(cell))))
    }

    /// Publish the realized element through a callback
    pub fn ref_callback(self, cb: impl Fn(Option<NodeId>) + 'static) -> Self {
        self.with(reserved::REF, AttrValue::Ref(RefTarget::Callback(Rc::new(cb))))
    }

    /// Inject raw markup
    pub fn html(self, markup: &str) -> Self {
        self.with(reserved::HTML, AttrValue::RawHtml(markup.to_string()))
    }

    /// Attach a bookkeeping key
    pub fn key(self, key: &str) -> Self {
        self.with(reserved::KEY, AttrValue::Key(key.to_string()))
    }

    /// Pass children through the attribute map
    pub fn children(self, children: Vec<VNode>) -> Self {
        self.with(reserved::CHILDREN, AttrValue::Children(children))
    }

    /// Insert or replace; a replaced entry keeps its position
    pub fn insert(&mut self, name: &str, value: AttrValue) -> Option<AttrValue> {
        match self.entries.iter_mut().find(|(k, _)| k == name) {
            Some(entry) => Some(std::mem::replace(&mut entry.1, value)),
            None => {
                self.entries.push((name.to_string(), value));
                None
            }
        }
    }

    /// Remove an entry
    pub fn remove(&mut self, name: &str) -> Option<AttrValue> {
        let pos = self.entries.iter().position(|(k, _)| k == name)?;
        Some(self.entries.remove(pos).1)
    }

    /// Get an entry
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Plain value as text (`Text`, `Number`, `Bool`, ...)
    pub fn get_text(&self, name: &str) -> Option<String> {
        self.get(name).and_then(AttrValue::to_dom_value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
