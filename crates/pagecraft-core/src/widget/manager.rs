//! Widget manager for tracking UI state of elements.

use super::state::WidgetState;
use crate::element::ElementId;
use std::collections::HashMap;

/// Manages UI state for all elements on a canvas.
///
/// Elements remain pure data; the flags here only matter while the user
/// interacts with them and are never exported.
#[derive(Debug, Clone, Default)]
pub struct WidgetManager {
    /// UI state for each element. Missing entries are `Normal`.
    states: HashMap<ElementId, WidgetState>,
    /// Element currently being dragged, if any.
    dragging: Option<ElementId>,
}

impl WidgetManager {
    /// Create a new widget manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the state of an element.
    pub fn state(&self, id: ElementId) -> WidgetState {
        self.states.get(&id).copied().unwrap_or_default()
    }

    fn set_state(&mut self, id: ElementId, state: WidgetState) {
        if state == WidgetState::Normal {
            self.states.remove(&id);
        } else {
            self.states.insert(id, state);
        }
    }

    pub fn is_resizing_mode(&self, id: ElementId) -> bool {
        self.state(id).is_resizing_mode()
    }

    pub fn is_dragging(&self, id: ElementId) -> bool {
        self.state(id).is_dragging()
    }

    /// The element currently being dragged.
    pub fn dragging(&self) -> Option<ElementId> {
        self.dragging
    }

    /// Flip resizing mode for an element. Returns the new mode.
    pub fn toggle_resizing_mode(&mut self, id: ElementId) -> bool {
        let enabled = !self.is_resizing_mode(id);
        let state = if enabled {
            WidgetState::ResizingMode
        } else {
            WidgetState::Normal
        };
        self.set_state(id, state);
        enabled
    }

    /// Mark an element as being dragged. Any previous drag is released.
    pub fn begin_drag(&mut self, id: ElementId) {
        self.end_drag();
        self.set_state(id, WidgetState::Dragging);
        self.dragging = Some(id);
    }

    /// Release the dragged element. Safe to call when nothing is dragged.
    pub fn end_drag(&mut self) {
        if let Some(id) = self.dragging.take() {
            if self.is_dragging(id) {
                self.set_state(id, WidgetState::Normal);
            }
        }
    }

    /// Remove state for a deleted element.
    pub fn remove(&mut self, id: ElementId) {
        self.states.remove(&id);
        if self.dragging == Some(id) {
            self.dragging = None;
        }
    }
}
