//! Arbor Events - Delegated event listeners
//!
//! Listeners are registered against a shared root per event type and
//! dispatched to every listener whose [`Condition`] matches the event.
//! Registries are generic over the context handed to callbacks, so a
//! callback can mutate the application that owns the registry.

mod event;
mod registry;

pub use event::Event;
pub use registry::{Callback, Condition, Delivery, Events, ListenerId, RemoveBy, RootTarget};
