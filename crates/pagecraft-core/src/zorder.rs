//! Stacking order.
//!
//! Every element carries a unique z-index. Moving an element one step swaps
//! its z-index with its nearest neighbor in that direction; nothing else is
//! renumbered.

use crate::element::{CanvasElement, ElementId};
use serde::{Deserialize, Serialize};

/// Direction of a one-step stacking change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZDirection {
    /// Toward the front (+1).
    Forward,
    /// Toward the back (-1).
    Backward,
}

impl ZDirection {
    /// Interpret a `+1` / `-1` step.
    pub fn from_step(step: i32) -> Option<Self> {
        match step {
            1 => Some(ZDirection::Forward),
            -1 => Some(ZDirection::Backward),
            _ => None,
        }
    }
}

/// Lowest and highest z-index on a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ZIndexLimits {
    pub bottom: i64,
    pub top: i64,
}

/// Z-index limits of `elements`; `{0, 0}` when empty.
pub fn z_index_limits(elements: &[CanvasElement]) -> ZIndexLimits {
    let bottom = elements.iter().map(|e| e.z_index).min();
    let top = elements.iter().map(|e| e.z_index).max();
    match (bottom, top) {
        (Some(bottom), Some(top)) => ZIndexLimits { bottom, top },
        _ => ZIndexLimits::default(),
    }
}

/// Z-index for a new element placed above everything else.
///
/// `None` if the topmost element already sits at `i64::MAX`.
pub fn next_z_index(elements: &[CanvasElement]) -> Option<i64> {
    match elements.iter().map(|e| e.z_index).max() {
        Some(top) => top.checked_add(1),
        None => Some(0),
    }
}

/// Index of the nearest neighbor of `current` in `direction`.
fn neighbor(elements: &[CanvasElement], current: i64, direction: ZDirection) -> Option<usize> {
    let candidates = elements.iter().enumerate();
    match direction {
        ZDirection::Forward => candidates
            .filter(|(_, e)| e.z_index > current)
            .min_by_key(|(_, e)| e.z_index)
            .map(|(i, _)| i),
        ZDirection::Backward => candidates
            .filter(|(_, e)| e.z_index < current)
            .max_by_key(|(_, e)| e.z_index)
            .map(|(i, _)| i),
    }
}

/// Whether `id` can move one step in `direction`.
pub fn can_move(elements: &[CanvasElement], id: ElementId, direction: ZDirection) -> bool {
    elements
        .iter()
        .find(|e| e.id == id)
        .and_then(|e| neighbor(elements, e.z_index, direction))
        .is_some()
}

/// Swap `id`'s z-index with its nearest neighbor in `direction`.
///
/// Returns the neighbor's id, or `None` if `id` is unknown or already at the
/// extreme.
pub fn change_z_index(elements: &mut [CanvasElement], id: ElementId, direction: ZDirection) -> Option<ElementId> {
    let index = elements.iter().position(|e| e.id == id)?;
    let other = neighbor(elements, elements[index].z_index, direction)?;

    let z = elements[index].z_index;
    elements[index].z_index = elements[other].z_index;
    elements[other].z_index = z;
    Some(elements[other].id)
}
