//! Single-selection broadcast.
//!
//! Elements subscribe to learn whether they are the selected one; the canvas
//! publishes whenever the selection changes.

use crate::element::ElementId;
use std::fmt;

/// Callback invoked with the newly selected element (or `None`).
pub type SelectionCallback = Box<dyn FnMut(Option<ElementId>)>;

/// Handle returned by [`SelectionBroadcast::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Holds the current selection and notifies subscribers when it changes.
#[derive(Default)]
pub struct SelectionBroadcast {
    subscribers: Vec<(SubscriptionId, SelectionCallback)>,
    next_subscription: u64,
    current: Option<ElementId>,
}

impl fmt::Debug for SelectionBroadcast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionBroadcast")
            .field("subscribers", &self.subscribers.len())
            .field("current", &self.current)
            .finish()
    }
}

impl SelectionBroadcast {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback. It is not invoked with the current value.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(Option<ElementId>) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a callback. Returns false if it was already removed.
    pub fn unsubscribe(&mut self, subscription: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(id, _)| *id != subscription);
        self.subscribers.len() != before
    }

    /// Publish a new selection.
    ///
    /// Republishing the current value notifies nobody. Returns whether
    /// subscribers were notified.
    pub fn publish(&mut self, selected: Option<ElementId>) -> bool {
        if selected == self.current {
            return false;
        }
        self.current = selected;
        log::debug!("Selection changed to {:?}", selected);
        for (_, callback) in &mut self.subscribers {
            callback(selected);
        }
        true
    }

    /// The currently selected element.
    pub fn selected(&self) -> Option<ElementId> {
        self.current
    }

    pub fn is_selected(&self, id: ElementId) -> bool {
        self.current == Some(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
