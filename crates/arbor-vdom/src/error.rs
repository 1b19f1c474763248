//! VDOM errors
//!
//! None of these escape `build`/`load_page`/setters: they are logged where
//! they occur and the affected subtree degrades.

use arbor_dom::{DomError, NodeId};

use crate::HookId;

/// Reconciler error
#[derive(Debug, thiserror::Error)]
pub enum VdomError {
    #[error("{0} called outside of a component build")]
    NoActiveIdentity(&'static str),

    #[error("Hook {0} does not exist")]
    HookNotFound(HookId),

    #[error("Hook {0} has no owning element")]
    HookUnowned(HookId),

    #[error("No virtual node is linked to {0}")]
    MissingLinkage(NodeId),

    #[error("Virtual node was never rendered")]
    NotRendered,

    #[error("No route components to load")]
    MissingRoutes,

    #[error("Component rendered a text node where an element is required")]
    TextRoot,

    #[error("DOM error: {0}")]
    Dom(#[from] DomError),
}
