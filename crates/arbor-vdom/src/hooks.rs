//! Hook store
//!
//! Per-component state and effects, keyed by the identity of a component
//! build. The identity is allocated on first mount and threaded back into
//! every targeted rebuild of the same instance.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::rc::{Rc, Weak};

use serde::Serialize;

use crate::attrs::{AttrValue, NodeRef, reserved};
use crate::{App, Component, Props, VElement, VdomError};

/// Hook identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HookId(pub(crate) u64);

impl fmt::Display for HookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hook#{}", self.0)
    }
}

/// Callback returned by an effect, run when the hook is dropped
pub type Cleanup = Box<dyn FnOnce(&mut App)>;

/// Effect mount callback
pub type EffectFn = Rc<dyn Fn(&mut App) -> Option<Cleanup>>;

/// Deferred effect of one hook identity
pub struct EffectRecord {
    mount: EffectFn,
    unmount: Option<Cleanup>,
    /// JSON of the last dependencies; `None` when unset
    signature: Option<String>,
    should_run: bool,
}

impl EffectRecord {
    pub fn should_run(&self) -> bool {
        self.should_run
    }

    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    /// Check if a cleanup callback is pending
    pub fn has_cleanup(&self) -> bool {
        self.unmount.is_some()
    }
}

impl fmt::Debug for EffectRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectRecord")
            .field("signature", &self.signature)
            .field("should_run", &self.should_run)
            .field("has_cleanup", &self.unmount.is_some())
            .finish()
    }
}

/// Persisted state of one component instance
pub struct HookRecord {
    id: HookId,
    state: Option<Box<dyn Any>>,
    effect: Option<EffectRecord>,
    owner: Weak<VElement>,
    component: Option<Component>,
    props: Props,
}

impl HookRecord {
    fn new(id: HookId) -> Self {
        Self {
            id,
            state: None,
            effect: None,
            owner: Weak::new(),
            component: None,
            props: Props::default(),
        }
    }

    pub fn id(&self) -> HookId {
        self.id
    }

    /// Current state, if it was seeded with a `T`
    pub fn state<T: 'static>(&self) -> Option<&T> {
        self.state.as_ref()?.downcast_ref()
    }

    pub fn effect(&self) -> Option<&EffectRecord> {
        self.effect.as_ref()
    }

    /// Element returned by the last build
    pub fn owner(&self) -> Option<Rc<VElement>> {
        self.owner.upgrade()
    }

    /// Props of the last build
    pub fn props(&self) -> &Props {
        &self.props
    }
}

impl fmt::Debug for HookRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRecord")
            .field("id", &self.id)
            .field("has_state", &self.state.is_some())
            .field("effect", &self.effect)
            .field("owned", &(self.owner.strong_count() > 0))
            .finish()
    }
}

/// Identity → record map plus the stack of builds in progress
#[derive(Debug, Default)]
pub struct HookStore {
    records: HashMap<HookId, HookRecord>,
    active: Vec<HookId>,
    next_id: u64,
}

impl HookStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh identity
    pub fn allocate(&mut self) -> HookId {
        self.next_id += 1;
        HookId(self.next_id)
    }

    /// Begin a component build
    pub fn enter(&mut self, id: HookId) {
        self.active.push(id);
    }

    /// End the innermost component build
    pub fn exit(&mut self) -> Option<HookId> {
        self.active.pop()
    }

    /// Identity of the innermost build in progress
    pub fn active(&self) -> Option<HookId> {
        self.active.last().copied()
    }

    pub fn contains(&self, id: HookId) -> bool {
        self.records.contains_key(&id)
    }

    pub fn get(&self, id: HookId) -> Option<&HookRecord> {
        self.records.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: HookId) -> Option<&mut HookRecord> {
        self.records.get_mut(&id)
    }

    pub(crate) fn entry(&mut self, id: HookId) -> &mut HookRecord {
        self.records.entry(id).or_insert_with(|| HookRecord::new(id))
    }

    pub(crate) fn remove(&mut self, id: HookId) -> Option<HookRecord> {
        self.records.remove(&id)
    }

    /// Record the build that produced `owner`
    pub(crate) fn bind(
        &mut self,
        id: HookId,
        component: &Component,
        props: Props,
        owner: &Rc<VElement>,
    ) {
        if let Some(record) = self.records.get_mut(&id) {
            record.component = Some(component.clone());
            record.props = props;
            record.owner = Rc::downgrade(owner);
        }
    }

    /// Continue the effect of `from` under `to` when both were registered
    /// with the same dependency signature
    ///
    /// The effect of `to` is no longer due and takes over the pending
    /// cleanup of `from`. Returns false, changing nothing, when either
    /// effect is missing, the dependencies are unset or they differ.
    pub(crate) fn carry_effect(&mut self, from: HookId, to: HookId) -> bool {
        let signature = |store: &Self, id: HookId| {
            store.get(id).and_then(HookRecord::effect).and_then(|e| e.signature.clone())
        };
        let Some(previous) = signature(&*self, from) else {
            return false;
        };
        if signature(&*self, to).as_ref() != Some(&previous) {
            return false;
        }

        let unmount = self
            .records
            .get_mut(&from)
            .and_then(|r| r.effect.as_mut())
            .and_then(|e| e.unmount.take());
        if let Some(effect) = self.records.get_mut(&to).and_then(|r| r.effect.as_mut()) {
            effect.should_run = false;
            effect.unmount = unmount;
        }
        true
    }

    pub(crate) fn set_owner(&mut self, id: HookId, owner: &Rc<VElement>) {
        if let Some(record) = self.records.get_mut(&id) {
            record.owner = Rc::downgrade(owner);
        }
    }

    /// Number of live records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// State setter bound to a hook identity
pub struct Setter<T> {
    hook: Option<HookId>,
    _marker: PhantomData<fn(T)>,
}

impl<T> Clone for Setter<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Setter<T> {}

impl<T> fmt::Debug for Setter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Setter").field(&self.hook).finish()
    }
}

impl<T: 'static> Setter<T> {
    fn bound(id: HookId) -> Self {
        Self { hook: Some(id), _marker: PhantomData }
    }

    /// Setter returned outside a component build
    fn detached() -> Self {
        Self { hook: None, _marker: PhantomData }
    }

    /// Identity this setter writes to
    pub fn hook(&self) -> Option<HookId> {
        self.hook
    }

    /// Store `value` and rebuild the owning subtree
    pub fn set(&self, app: &mut App, value: T) {
        match self.hook {
            Some(id) => app.set_state(id, Box::new(value)),
            None => tracing::error!("setter called on a hook created outside a component build"),
        }
    }
}

impl App {
    /// Current state of the active component, seeded with `initial`
    ///
    /// Outside a component build this logs and returns `initial` with a
    /// setter that does nothing.
    pub fn use_state<T: Clone + 'static>(&mut self, initial: T) -> (T, Setter<T>) {
        let Some(id) = self.hooks.active() else {
            tracing::error!("{}", VdomError::NoActiveIdentity("use_state"));
            return (initial, Setter::detached());
        };

        let record = self.hooks.entry(id);
        if let Some(current) = record.state.as_ref().and_then(|s| s.downcast_ref::<T>()) {
            return (current.clone(), Setter::bound(id));
        }
        if record.state.is_some() {
            tracing::warn!(hook = %id, "state type changed; reseeding");
        }
        record.state = Some(Box::new(initial.clone()));
        (initial, Setter::bound(id))
    }

    /// Effect that runs after every patch of the active component
    pub fn use_effect(&mut self, mount: impl Fn(&mut App) -> Option<Cleanup> + 'static) {
        self.register_effect(Rc::new(mount), None);
    }

    /// Effect that runs when the serialized `deps` change
    pub fn use_effect_with<D: Serialize + ?Sized>(
        &mut self,
        mount: impl Fn(&mut App) -> Option<Cleanup> + 'static,
        deps: &D,
    ) {
        let signature = match serde_json::to_string(deps) {
            Ok(json) => Some(json),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    "effect dependencies not serializable; running every build"
                );
                None
            }
        };
        self.register_effect(Rc::new(mount), signature);
    }

    /// Fresh `.current` cell
    pub fn use_ref(&self) -> NodeRef {
        NodeRef::default()
    }

    fn register_effect(&mut self, mount: EffectFn, signature: Option<String>) {
        let Some(id) = self.hooks.active() else {
            tracing::error!("{}", VdomError::NoActiveIdentity("use_effect"));
            return;
        };

        let record = self.hooks.entry(id);
        match &mut record.effect {
            Some(effect) => {
                effect.should_run = signature.is_none() || signature != effect.signature;
                effect.signature = signature;
                effect.mount = mount;
            }
            None => {
                record.effect = Some(EffectRecord {
                    mount,
                    unmount: None,
                    signature,
                    should_run: true,
                });
            }
        }
    }

    /// Store new state and rebuild the subtree owned by `id`
    pub(crate) fn set_state(&mut self, id: HookId, value: Box<dyn Any>) {
        let Some(record) = self.hooks.get_mut(id) else {
            tracing::error!("{}", VdomError::HookNotFound(id));
            return;
        };
        record.state = Some(value);

        let Some(owner) = record.owner.upgrade() else {
            tracing::error!("{}", VdomError::HookUnowned(id));
            return;
        };
        let Some(component) = record.component.clone() else {
            tracing::error!("{}", VdomError::HookUnowned(id));
            return;
        };
        let mut props = record.props.clone();
        let Some(node) = owner.realized() else {
            tracing::error!(hook = %id, "{}", VdomError::NotRendered);
            return;
        };

        tracing::debug!(hook = %id, node = %node, "rebuilding subtree");
        self.stats.rebuilds += 1;
        props.attrs.insert(reserved::HOOK_KEY, AttrValue::HookBinding(id));
        self.render_subtree(node, &component, props);
    }

    /// Run the effect of `id` if it is due
    pub(crate) fn run_effect(&mut self, id: HookId) {
        let Some(effect) = self.hooks.get_mut(id).and_then(|r| r.effect.as_mut()) else {
            return;
        };
        if !effect.should_run {
            return;
        }
        effect.should_run = false;
        let mount = Rc::clone(&effect.mount);

        tracing::trace!(hook = %id, "running effect");
        self.stats.effects_run += 1;
        let cleanup = mount(self);

        match self.hooks.get_mut(id).and_then(|r| r.effect.as_mut()) {
            Some(effect) => effect.unmount = cleanup,
            // Dropped while the effect ran
            None => {
                if let Some(cleanup) = cleanup {
                    cleanup(self);
                }
            }
        }
    }

    /// Delete a hook record, running its pending cleanup
    pub(crate) fn drop_hook(&mut self, id: HookId) {
        let Some(record) = self.hooks.remove(id) else {
            return;
        };
        tracing::debug!(hook = %id, "dropped hook record");
        self.stats.hooks_dropped += 1;
        if let Some(cleanup) = record.effect.and_then(|e| e.unmount) {
            cleanup(self);
        }
    }
}
