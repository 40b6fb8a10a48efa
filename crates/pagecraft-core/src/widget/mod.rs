//! Widget system for interactive element state.
//!
//! - Resize handles and their hit regions
//! - Per-element flags (resizing mode, mid-drag)
//!
//! Elements remain pure data. Widgets wrap them with UI state.

mod handles;
mod manager;
mod state;

pub use handles::{HANDLE_HIT_TOLERANCE, Handle, HandleKind, handles_for, hit_test_handles};
pub use manager::WidgetManager;
pub use state::WidgetState;
