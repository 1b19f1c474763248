//! Attribute and child reconcilers
//!
//! Both produce plain data that `App::apply_patch` turns into DOM writes.

mod attrs;
mod children;

pub use attrs::{AttrPatch, reconcile_attrs};
pub use children::{ChildPatch, reconcile_children};
