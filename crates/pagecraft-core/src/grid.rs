//! Grid options consumed by placement and export.

use crate::element::ElementPosition;
use serde::{Deserialize, Serialize};

/// Default grid cell size.
pub const GRID_SIZE: f64 = 10.0;

/// Values of the grid controls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridOptions {
    pub enabled: bool,
    #[serde(default = "default_grid_size")]
    pub size: f64,
    #[serde(default)]
    pub snap: bool,
}

fn default_grid_size() -> f64 {
    GRID_SIZE
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            size: GRID_SIZE,
            snap: false,
        }
    }
}

impl GridOptions {
    /// Position a drop lands on when the grid is enabled.
    ///
    /// Cell snapping is not implemented: an enabled grid pins every drop to
    /// the canvas origin. `None` means the drop keeps its pointer position.
    pub fn pinned_position(&self) -> Option<ElementPosition> {
        self.enabled.then(ElementPosition::origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let grid = GridOptions::default();
        assert!(!grid.enabled);
        assert!(!grid.snap);
        assert_eq!(grid.size, 10.0);
        assert_eq!(grid.pinned_position(), None);
    }

    #[test]
    fn test_enabled_grid_pins_to_origin() {
        let grid = GridOptions {
            enabled: true,
            ..GridOptions::default()
        };
        assert_eq!(grid.pinned_position(), Some(ElementPosition::origin()));
    }

    #[test]
    fn test_partial_json() {
        let grid: GridOptions = serde_json::from_str(r#"{"enabled": true}"#).unwrap();
        assert_eq!(grid.size, GRID_SIZE);
        assert!(!grid.snap);
    }
}
