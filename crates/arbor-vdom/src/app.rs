//! Application context
//!
//! Owns the document, the listener registry and the hook store. Component
//! functions, event handlers, effects and setters all receive it by
//! mutable reference.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::rc::{Rc, Weak};

use arbor_dom::{Document, DomTree, HtmlSerializer, NodeId, ReadyState};
use arbor_events::{Delivery, Event, Events};

use crate::attrs::{AttrValue, Attrs, reserved};
use crate::diff::diff;
use crate::{
    Component, Config, HookId, HookStore, Params, Props, Tag, VElement, VNode, VdomError,
    create_node,
};

/// Callback deferred until the document has loaded
type SafeCallback = Box<dyn FnOnce(&mut App)>;

/// Render statistics
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderStats {
    /// Page loads, initial and subsequent
    pub page_loads: u64,
    /// Elements materialized
    pub renders: u64,
    /// Patches applied
    pub patches: u64,
    /// Targeted subtree rebuilds triggered by setters
    pub rebuilds: u64,
    /// Effect mount callbacks invoked
    pub effects_run: u64,
    /// Hook records deleted
    pub hooks_dropped: u64,
}

/// A render tree bound to one document
pub struct App {
    pub(crate) config: Config,
    pub(crate) document: Document,
    pub(crate) events: Events<App>,
    pub(crate) hooks: HookStore,
    /// DomHandle → owning virtual element
    pub(crate) links: HashMap<NodeId, Weak<VElement>>,
    /// Element the page is mounted under
    mount_point: NodeId,
    /// Realized root of the page
    pub(crate) app_node: Option<NodeId>,
    /// Virtual root of the page
    pub(crate) mounted: Option<VNode>,
    last_page: Option<(Vec<Component>, Params)>,
    safe_queue: VecDeque<SafeCallback>,
    /// Effects of freshly rendered elements awaiting attachment
    pub(crate) pending_effects: Vec<HookId>,
    pub(crate) stats: RenderStats,
}

impl App {
    /// Create an app with an empty document and its mount point
    pub fn new(config: Config) -> Self {
        let mut document = Document::new();
        let body = document.body();
        let tree = document.tree_mut();
        let mount_point = tree.create_element("div");
        if let Err(err) = tree
            .set_attribute(mount_point, "id", &config.root_id)
            .and_then(|()| tree.append_child(body, mount_point))
        {
            tracing::error!(error = %err, "failed to create mount point");
        }
        tree.set_recording(config.record_mutations);

        tracing::debug!(root = %config.root_id, "app created");
        Self {
            events: Events::new(config.auto_prevent.clone()),
            config,
            document,
            hooks: HookStore::new(),
            links: HashMap::new(),
            mount_point,
            app_node: None,
            mounted: None,
            last_page: None,
            safe_queue: VecDeque::new(),
            pending_effects: Vec::new(),
            stats: RenderStats::default(),
        }
    }

    // ---- tree construction ----------------------------------------------

    /// Build an element, or invoke a component
    ///
    /// Children of a component are handed over as `props.children`.
    pub fn build(&mut self, tag: impl Into<Tag>, attrs: Attrs, children: Vec<VNode>) -> VNode {
        match tag.into() {
            Tag::Name(name) => create_node(&name, attrs, children),
            Tag::Component(component) => {
                self.build_with_props(&component, Props::new(attrs, children))
            }
        }
    }

    /// Invoke a component with no attributes
    pub fn build_component(&mut self, component: &Component) -> VNode {
        self.build_with_props(component, Props::default())
    }

    /// Invoke a component under a fresh or threaded hook identity
    ///
    /// A `hookKey` binding in `props` reuses that identity. When the build
    /// used hooks, the record learns the component, its props and the
    /// returned element.
    pub fn build_with_props(&mut self, component: &Component, mut props: Props) -> VNode {
        let id = match props.attrs.remove(reserved::HOOK_KEY) {
            Some(AttrValue::HookBinding(id)) => id,
            _ => self.hooks.allocate(),
        };

        self.hooks.enter(id);
        let vnode = component.call(self, &props);
        self.hooks.exit();

        if self.hooks.contains(id) {
            match &vnode {
                VNode::Element(element) => {
                    self.hooks.bind(id, component, props, element);
                    element.push_hook(id);
                }
                VNode::Text(_) => {
                    tracing::error!(hook = %id, "{}", VdomError::TextRoot);
                    self.hooks.remove(id);
                }
            }
        }
        vnode
    }

    /// Fragment of `children`
    pub fn fragment(&mut self, children: Vec<VNode>) -> VNode {
        let tag = self.config.fragment_tag.clone();
        create_node(&tag, Attrs::new(), children)
    }

    /// Rebuild the component realized at `node` and patch the difference
    ///
    /// The identity of the node's outermost hook is threaded into the
    /// rebuild unless `props` already carries one.
    pub fn render_subtree(&mut self, node: NodeId, component: &Component, mut props: Props) {
        let old = self.vnode_of(node);
        let hook = match props.attrs.get(reserved::HOOK_KEY) {
            Some(AttrValue::HookBinding(id)) => Some(*id),
            _ => old.as_ref().and_then(|e| e.hooks().last().copied()),
        };
        if let Some(id) = hook {
            props.attrs.insert(reserved::HOOK_KEY, AttrValue::HookBinding(id));
        }

        let new = self.build_with_props(component, props);
        let Some(old) = old else {
            tracing::error!(node = %node, "{}; remounting", VdomError::MissingLinkage(node));
            if let Err(err) = self.mount(node, &new) {
                tracing::error!(node = %node, error = %err, "remount failed");
            }
            return;
        };

        if let (Some(id), VNode::Element(element)) = (hook, &new) {
            self.adopt_outer_hooks(&old, element, id);
        }
        self.splice(&old, &new);

        let patch = diff(&VNode::Element(old), Some(&new));
        self.apply_patch(&patch, node);
    }

    /// Carry the hooks of enclosing component builds over to a rebuilt node
    fn adopt_outer_hooks(&mut self, old: &Rc<VElement>, new: &Rc<VElement>, id: HookId) {
        let hooks = old.hooks();
        let Some(pos) = hooks.iter().position(|h| *h == id) else {
            return;
        };
        for outer in &hooks[pos + 1..] {
            new.push_hook(*outer);
            self.hooks.set_owner(*outer, new);
        }
    }

    /// Put `new` where `old` sits in the virtual tree
    fn splice(&mut self, old: &Rc<VElement>, new: &VNode) {
        if let Some(parent) = old.parent() {
            if !parent.replace_child(old, new.clone()) {
                tracing::warn!(
                    tag = old.tag(),
                    "rebuilt node not found among its parent's children"
                );
            }
            return;
        }
        let is_root = self
            .mounted
            .as_ref()
            .and_then(VNode::as_element)
            .is_some_and(|root| Rc::ptr_eq(root, old));
        if is_root {
            self.mounted = Some(new.clone());
        }
    }

    // ---- pages ----------------------------------------------------------

    /// Compose and show a page
    ///
    /// `components` is ordered outermost first. The innermost component is
    /// built first and each enclosing one receives the tree built so far as
    /// its children. The first load materializes the tree under the mount
    /// point; later loads patch the mounted tree.
    pub fn load_page(&mut self, components: Vec<Component>, params: &Params) {
        self.last_page = Some((components.clone(), params.clone()));
        self.stats.page_loads += 1;
        let loading = self.config.loading_title.clone();
        self.document.set_title(&loading);

        if components.is_empty() {
            tracing::error!("{}", VdomError::MissingRoutes);
            return;
        }

        let mut stack = components;
        let mut tree: Option<VNode> = None;
        while let Some(component) = stack.pop() {
            let props = Props::from_params(params).with_children(tree.take().into_iter().collect());
            tree = Some(self.build_with_props(&component, props));
        }
        let Some(tree) = tree else {
            return;
        };

        let previous = self.mounted.replace(tree.clone());
        match (previous, self.app_node) {
            (Some(old), Some(node)) if self.document.tree().exists(node) => {
                tracing::debug!(node = %node, "patching page");
                let patch = diff(&old, Some(&tree));
                self.app_node = self.apply_patch(&patch, node);
            }
            _ => {
                tracing::debug!("mounting page");
                match self.render(&tree) {
                    Ok(node) => {
                        let mount_point = self.mount_point;
                        if let Err(err) = self.document.tree_mut().append_child(mount_point, node)
                        {
                            tracing::error!(error = %err, "failed to attach page");
                        }
                        self.app_node = Some(node);
                        self.flush_effects();
                    }
                    Err(err) => tracing::error!(error = %err, "failed to render page"),
                }
            }
        }
    }

    /// Reload the last page with the same components and params
    pub fn refresh(&mut self) {
        match self.last_page.clone() {
            Some((components, params)) => self.load_page(components, &params),
            None => tracing::warn!("refresh before any page was loaded"),
        }
    }

    // ---- document lifecycle ---------------------------------------------

    /// Run `callback` now if the document has loaded, otherwise once it has
    pub fn safe_load(&mut self, callback: impl FnOnce(&mut App) + 'static) {
        if self.document.ready_state() == ReadyState::Complete {
            callback(self);
        } else {
            self.safe_queue.push_back(Box::new(callback));
        }
    }

    /// Mark the document loaded and drain the safe-load queue in order
    pub fn on_page_loaded(&mut self) {
        self.document.set_ready_state(ReadyState::Complete);
        tracing::debug!(queued = self.safe_queue.len(), "page loaded");
        while let Some(callback) = self.safe_queue.pop_front() {
            callback(self);
        }
    }

    /// Deliver an event to every matching listener
    ///
    /// Returns the event with the default/propagation flags the listeners
    /// left on it.
    pub fn dispatch_event(&mut self, mut event: Event) -> Event {
        let deliveries = self.events.matching(self.document.tree(), &mut event);
        tracing::trace!(
            event_type = %event.event_type,
            listeners = deliveries.len(),
            "dispatching"
        );

        for Delivery { callback, event: mut delivered } in deliveries {
            if event.is_propagation_stopped() {
                break;
            }
            callback(self, &mut delivered);
            if delivered.is_default_prevented() {
                event.prevent_default();
            }
            if delivered.is_propagation_stopped() {
                event.stop_propagation();
            }
        }
        event
    }

    pub fn set_title(&mut self, title: &str) {
        self.document.set_title(title);
    }

    // ---- accessors ------------------------------------------------------

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Realized tree
    pub fn dom(&self) -> &DomTree {
        self.document.tree()
    }

    /// Realized tree, for journal access
    pub fn dom_mut(&mut self) -> &mut DomTree {
        self.document.tree_mut()
    }

    pub fn hooks(&self) -> &HookStore {
        &self.hooks
    }

    pub fn events(&self) -> &Events<App> {
        &self.events
    }

    /// Element the page is mounted under
    pub fn mount_point(&self) -> NodeId {
        self.mount_point
    }

    /// Realized root of the page
    pub fn app_node(&self) -> Option<NodeId> {
        self.app_node
    }

    /// Virtual root of the page
    pub fn mounted_tree(&self) -> Option<&VNode> {
        self.mounted.as_ref()
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    /// Markup under the mount point
    pub fn html(&self) -> String {
        HtmlSerializer::new().serialize_inner(self.document.tree(), self.mount_point)
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("app_node", &self.app_node)
            .field("hooks", &self.hooks.len())
            .field("events", &self.events)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
