//! Arbor VDOM - Virtual DOM reconciler
//!
//! Component functions build trees of [`VNode`]s; the [`App`] materializes
//! them into an [`arbor_dom::Document`], diffs each rebuilt tree against the
//! mounted one and applies only what changed. Per-component state lives in a
//! [`HookStore`] keyed by a [`HookId`] that is threaded through rebuilds of
//! the same component instance.
//!
//! # Example
//! ```rust,ignore
//! use arbor_vdom::{App, Attrs, Component, Config, Props, VNode};
//!
//! fn counter(app: &mut App, _props: &Props) -> VNode {
//!     let (count, set_count) = app.use_state(0);
//!     app.build(
//!         "button",
//!         Attrs::new().on("click", move |app, _| set_count.set(app, count + 1)),
//!         vec![count.into()],
//!     )
//! }
//!
//! let mut app = App::new(Config::default());
//! app.load_page(vec![Component::new(counter)], &Default::default());
//! ```

mod app;
mod attrs;
mod component;
mod config;
mod diff;
mod error;
mod hooks;
mod node;
mod reconcile;
mod render;

pub use app::{App, RenderStats};
pub use attrs::{AttrValue, Attrs, EventBinding, Handler, NodeRef, RefMap, RefTarget, reserved};
pub use component::{Component, Params, Props, Tag};
pub use config::Config;
pub use diff::{ElementPatch, Patch, diff};
pub use error::VdomError;
pub use hooks::{Cleanup, EffectFn, EffectRecord, HookId, HookRecord, HookStore, Setter};
pub use node::{VElement, VNode, create_node};
pub use reconcile::{AttrPatch, ChildPatch, reconcile_attrs, reconcile_children};

// Re-export sub-crates for advanced usage
pub use arbor_dom as dom;
pub use arbor_events as events;
pub use arbor_style as style;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
