//! Widget state definitions.

/// The UI state of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WidgetState {
    /// Normal display state - no interaction.
    #[default]
    Normal,
    /// Resize handles are live; the element cannot be dragged.
    ResizingMode,
    /// The element is being dragged and is hidden from collision tests.
    Dragging,
}

impl WidgetState {
    /// Check if resize handles are live.
    pub fn is_resizing_mode(&self) -> bool {
        matches!(self, Self::ResizingMode)
    }

    /// Check if the element is mid-drag.
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging)
    }
}
