//! Listener registry
//!
//! One root listener per event type; conditions decide which registered
//! callbacks see a given event.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use arbor_dom::{DomTree, NodeId};

use crate::Event;

/// Listener callback
pub type Callback<C> = Rc<dyn Fn(&mut C, &mut Event)>;

/// Listener identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// When a listener fires
#[derive(Clone)]
pub enum Condition {
    /// Event target is this node or one of its descendants
    Node(NodeId),
    /// Always (`true`) or never (`false`)
    Always(bool),
    /// Predicate over the raw event
    Predicate(Rc<dyn Fn(&Event) -> bool>),
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Node(id) => f.debug_tuple("Node").field(id).finish(),
            Condition::Always(flag) => f.debug_tuple("Always").field(flag).finish(),
            Condition::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Which listeners to remove
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveBy {
    /// Every listener bound to a node
    Node(NodeId),
    /// A single listener
    Listener(ListenerId),
}

/// Where the shared root listener for a type is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootTarget {
    Document,
    Window,
}

struct Listener<C> {
    id: ListenerId,
    condition: Condition,
    callback: Callback<C>,
}

/// A callback paired with the event it should receive
pub struct Delivery<C> {
    pub callback: Callback<C>,
    pub event: Event,
}

impl<C> fmt::Debug for Delivery<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delivery").field("event", &self.event).finish_non_exhaustive()
    }
}

/// Delegated event registry
pub struct Events<C> {
    /// Listeners per event type, in registration order
    listeners: HashMap<String, Vec<Listener<C>>>,
    /// Event types registered per node
    node_types: HashMap<NodeId, Vec<String>>,
    /// Installed root listeners
    installed: HashMap<String, RootTarget>,
    /// Types whose default action is always prevented
    auto_prevent: Vec<String>,
    next_id: u64,
}

impl<C> Events<C> {
    /// Create a registry with the given auto-prevented types
    pub fn new(auto_prevent: Vec<String>) -> Self {
        Self {
            listeners: HashMap::new(),
            node_types: HashMap::new(),
            installed: HashMap::new(),
            auto_prevent,
            next_id: 0,
        }
    }

    /// Root target for an event type
    pub fn root_target(event_type: &str) -> RootTarget {
        match event_type {
            "popstate" => RootTarget::Window,
            _ => RootTarget::Document,
        }
    }

    /// Register a listener
    ///
    /// A node holds at most one listener per type; a second registration for
    /// the same node and type is ignored and returns `None`.
    pub fn add_listener(
        &mut self,
        condition: Condition,
        event_type: &str,
        callback: Callback<C>,
    ) -> Option<ListenerId> {
        let event_type = event_type.to_ascii_lowercase();

        if let Condition::Node(node) = condition {
            let types = self.node_types.entry(node).or_default();
            if types.contains(&event_type) {
                return None;
            }
            types.push(event_type.clone());
        }

        if !self.installed.contains_key(&event_type) {
            let target = Self::root_target(&event_type);
            tracing::trace!(event_type = %event_type, ?target, "installing root listener");
            self.installed.insert(event_type.clone(), target);
        }

        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.entry(event_type).or_default().push(Listener {
            id,
            condition,
            callback,
        });
        Some(id)
    }

    /// Remove listeners
    ///
    /// Without an event type, removing by node drops every type registered
    /// for that node and removing by listener searches all types.
    pub fn remove_listener(&mut self, by: RemoveBy, event_type: Option<&str>) {
        let types: Vec<String> = match (by, event_type) {
            (_, Some(t)) => vec![t.to_ascii_lowercase()],
            (RemoveBy::Node(node), None) => match self.node_types.get(&node) {
                Some(types) => types.clone(),
                None => return,
            },
            (RemoveBy::Listener(_), None) => self.listeners.keys().cloned().collect(),
        };

        if let RemoveBy::Node(node) = by {
            let Some(registered) = self.node_types.get_mut(&node) else {
                return;
            };
            registered.retain(|t| !types.contains(t));
            if registered.is_empty() {
                self.node_types.remove(&node);
            }
        }

        for event_type in types {
            let Some(list) = self.listeners.get_mut(&event_type) else {
                continue;
            };
            list.retain(|l| match by {
                RemoveBy::Node(node) => !matches!(l.condition, Condition::Node(n) if n == node),
                RemoveBy::Listener(id) => l.id != id,
            });
            if list.is_empty() {
                self.listeners.remove(&event_type);
                self.installed.remove(&event_type);
                tracing::trace!(event_type = %event_type, "removed root listener");
            }
        }
    }

    /// Collect the callbacks an event should be delivered to
    ///
    /// Auto-prevented types have their default prevented on `event` before
    /// matching. Node listeners receive a copy whose `current_target` is the
    /// listening node.
    pub fn matching(&self, tree: &DomTree, event: &mut Event) -> Vec<Delivery<C>> {
        if self.auto_prevent.contains(&event.event_type) {
            event.prevent_default();
        }
        let Some(list) = self.listeners.get(&event.event_type) else {
            return Vec::new();
        };

        list.iter()
            .filter_map(|listener| {
                let mut delivered = event.clone();
                let matched = match &listener.condition {
                    Condition::Always(flag) => *flag,
                    Condition::Predicate(predicate) => predicate(&*event),
                    Condition::Node(node) => {
                        delivered.current_target = Some(*node);
                        tree.contains(*node, event.target)
                    }
                };
                matched.then(|| Delivery {
                    callback: Rc::clone(&listener.callback),
                    event: delivered,
                })
            })
            .collect()
    }

    /// Check if a root listener is installed for a type
    pub fn is_listening(&self, event_type: &str) -> bool {
        self.installed.contains_key(event_type)
    }

    /// Event types a node is registered for
    pub fn node_types(&self, node: NodeId) -> &[String] {
        self.node_types.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of listeners for a type
    pub fn listener_count(&self, event_type: &str) -> usize {
        self.listeners.get(event_type).map_or(0, Vec::len)
    }

    /// Total number of listeners
    pub fn len(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }

    /// Check if no listener is registered
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<C> Default for Events<C> {
    fn default() -> Self {
        Self::new(vec!["submit".to_string()])
    }
}

impl<C> fmt::Debug for Events<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Events")
            .field("listeners", &self.len())
            .field("installed", &self.installed)
            .field("auto_prevent", &self.auto_prevent)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Log(Vec<String>);

    fn recorder(tag: &'static str) -> Callback<Log> {
        Rc::new(move |log: &mut Log, _event: &mut Event| log.0.push(tag.to_string()))
    }

    fn deliver(events: &Events<Log>, tree: &DomTree, event: Event, log: &mut Log) -> Event {
        let mut event = event;
        for mut delivery in events.matching(tree, &mut event) {
            (delivery.callback)(log, &mut delivery.event);
        }
        event
    }

    fn tree_with_button() -> (DomTree, NodeId, NodeId) {
        let mut tree = DomTree::new();
        let form = tree.create_element("form");
        let button = tree.create_element("button");
        tree.append_child(form, button).unwrap();
        (tree, form, button)
    }

    #[test]
    fn test_node_condition_matches_descendants() {
        let (tree, form, button) = tree_with_button();
        let mut events = Events::default();
        events.add_listener(Condition::Node(form), "click", recorder("form"));

        let mut log = Log::default();
        deliver(&events, &tree, Event::click(button), &mut log);
        assert_eq!(log.0, vec!["form"]);

        let mut log = Log::default();
        let outside = NodeId::NONE;
        deliver(&events, &tree, Event::click(outside), &mut log);
        assert!(log.0.is_empty());
    }

    #[test]
    fn test_current_target_is_listening_node() {
        let (tree, form, button) = tree_with_button();
        let mut events: Events<Log> = Events::default();
        events.add_listener(Condition::Node(form), "click", recorder("form"));

        let mut event = Event::click(button);
        let deliveries = events.matching(&tree, &mut event);
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].event.current_target, Some(form));
        assert_eq!(deliveries[0].event.target, button);
    }

    #[test]
    fn test_boolean_and_predicate_conditions() {
        let (tree, _, button) = tree_with_button();
        let mut events = Events::default();
        events.add_listener(Condition::Always(true), "click", recorder("always"));
        events.add_listener(Condition::Always(false), "click", recorder("never"));
        events.add_listener(
            Condition::Predicate(Rc::new(|e: &Event| e.target.is_valid())),
            "click",
            recorder("predicate"),
        );

        let mut log = Log::default();
        deliver(&events, &tree, Event::click(button), &mut log);
        assert_eq!(log.0, vec!["always", "predicate"]);
    }

    #[test]
    fn test_duplicate_node_type_ignored() {
        let (_, form, _) = tree_with_button();
        let mut events: Events<Log> = Events::default();

        assert!(events.add_listener(Condition::Node(form), "click", recorder("a")).is_some());
        assert!(events.add_listener(Condition::Node(form), "Click", recorder("b")).is_none());
        assert_eq!(events.listener_count("click"), 1);
    }

    #[test]
    fn test_remove_by_node_drops_all_types() {
        let (_, form, button) = tree_with_button();
        let mut events: Events<Log> = Events::default();
        events.add_listener(Condition::Node(form), "click", recorder("a"));
        events.add_listener(Condition::Node(form), "input", recorder("b"));
        events.add_listener(Condition::Node(button), "click", recorder("c"));

        events.remove_listener(RemoveBy::Node(form), None);

        assert_eq!(events.listener_count("click"), 1);
        assert!(!events.is_listening("input"));
        assert!(events.node_types(form).is_empty());
    }

    #[test]
    fn test_remove_by_node_single_type() {
        let (_, form, _) = tree_with_button();
        let mut events: Events<Log> = Events::default();
        events.add_listener(Condition::Node(form), "click", recorder("a"));
        events.add_listener(Condition::Node(form), "input", recorder("b"));

        events.remove_listener(RemoveBy::Node(form), Some("click"));

        assert_eq!(events.node_types(form), ["input".to_string()]);
        assert!(!events.is_listening("click"));
        assert!(events.is_listening("input"));
    }

    #[test]
    fn test_remove_by_listener_id() {
        let mut events: Events<Log> = Events::default();
        let a = events.add_listener(Condition::Always(true), "keydown", recorder("a")).unwrap();
        events.add_listener(Condition::Always(true), "keydown", recorder("b"));

        events.remove_listener(RemoveBy::Listener(a), None);
        assert_eq!(events.listener_count("keydown"), 1);
    }

    #[test]
    fn test_submit_auto_prevented() {
        let (tree, form, _) = tree_with_button();
        let events: Events<Log> = Events::default();

        let mut log = Log::default();
        let event = deliver(&events, &tree, Event::submit(form), &mut log);
        assert!(event.is_default_prevented());
    }

    #[test]
    fn test_popstate_binds_window() {
        let mut events: Events<Log> = Events::default();
        events.add_listener(Condition::Always(true), "popstate", recorder("back"));

        assert_eq!(Events::<Log>::root_target("popstate"), RootTarget::Window);
        assert_eq!(Events::<Log>::root_target("click"), RootTarget::Document);
        assert!(events.is_listening("popstate"));
    }
}
