//! UI events

use arbor_dom::NodeId;

/// A dispatched UI event
#[derive(Debug, Clone)]
pub struct Event {
    /// Lower-cased event type (`click`, `submit`, ...)
    pub event_type: String,
    /// Node the event originated on
    pub target: NodeId,
    /// Node whose listener is currently handling the event
    pub current_target: Option<NodeId>,
    pub bubbles: bool,
    pub cancelable: bool,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl Event {
    /// Create a bubbling, cancelable event
    pub fn new(event_type: &str, target: NodeId) -> Self {
        Self {
            event_type: event_type.to_ascii_lowercase(),
            target,
            current_target: None,
            bubbles: true,
            cancelable: true,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// Create a click event
    pub fn click(target: NodeId) -> Self {
        Self::new("click", target)
    }

    /// Create a submit event
    pub fn submit(target: NodeId) -> Self {
        Self::new("submit", target)
    }

    /// Create an input event
    pub fn input(target: NodeId) -> Self {
        Self::new("input", target)
    }

    /// Prevent default action
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    /// Stop propagation to the remaining listeners
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Check if default was prevented
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Check if propagation was stopped
    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}
