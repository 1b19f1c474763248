//! Attribute reconciliation

use crate::attrs::{AttrValue, Attrs};
use crate::HookId;

/// Attribute operations for one element
#[derive(Debug, Clone, Default)]
pub struct AttrPatch {
    /// Applied first, with the value being removed
    pub removals: Vec<(String, AttrValue)>,
    /// Applied after every removal, in insertion order
    pub sets: Vec<(String, AttrValue)>,
    /// Hook identities bound to the old node
    pub old_hooks: Vec<HookId>,
    /// Hook identities bound to the new node; their effects run after the sets
    pub new_hooks: Vec<HookId>,
    /// Removals and sets that change what the element shows
    visible: usize,
}

impl AttrPatch {
    /// Patch for a freshly created element
    pub fn initial(attrs: &Attrs) -> Self {
        reconcile_attrs(&Attrs::new(), attrs)
    }

    pub fn with_hooks(mut self, old_hooks: Vec<HookId>, new_hooks: Vec<HookId>) -> Self {
        self.old_hooks = old_hooks;
        self.new_hooks = new_hooks;
        self
    }

    /// Hooks of the old node that the new node no longer carries
    pub fn dropped_hooks(&self) -> impl Iterator<Item = HookId> + '_ {
        self.old_hooks.iter().copied().filter(|id| !self.new_hooks.contains(id))
    }

    /// Number of DOM-visible attribute writes
    pub fn visible_changes(&self) -> usize {
        self.visible
    }
}

/// Element-visible payload of a value
fn visible_value(value: &AttrValue) -> Option<String> {
    match value {
        AttrValue::RawHtml(markup) => Some(markup.clone()),
        other => other.to_dom_value(),
    }
}

/// Falsy values only overwrite an existing attribute
fn writes(value: &AttrValue) -> bool {
    match value {
        AttrValue::RawHtml(markup) => !markup.is_empty(),
        other => other.is_truthy(),
    }
}

/// Diff two attribute sets
///
/// Keys missing from `new` are removed, and so is every event-prop so it
/// can be rebound; every key of `new` is then (re)applied.
pub fn reconcile_attrs(old: &Attrs, new: &Attrs) -> AttrPatch {
    let mut patch = AttrPatch::default();

    for (name, value) in old.iter() {
        let kept = new.contains(name);
        if kept && !value.is_event() {
            continue;
        }
        if !kept && visible_value(value).is_some() {
            patch.visible += 1;
        }
        patch.removals.push((name.to_string(), value.clone()));
    }

    for (name, value) in new.iter() {
        if let Some(next) = visible_value(value) {
            let prev = old.get(name).and_then(visible_value);
            if prev.as_deref() != Some(next.as_str()) && (writes(value) || prev.is_some()) {
                patch.visible += 1;
            }
        }
        patch.sets.push((name.to_string(), value.clone()));
    }

    patch
}
