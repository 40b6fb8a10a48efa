//! PageCraft Core Library
//!
//! Platform-agnostic canvas interaction engine for the PageCraft page builder:
//! drag and resize gestures, overlap detection, stacking order and layout export.

pub mod canvas;
pub mod config;
pub mod element;
pub mod error;
pub mod export;
pub mod grid;
pub mod overlap;
pub mod resize;
pub mod selection;
pub mod surface;
pub mod widget;
pub mod zorder;

pub use canvas::{Canvas, CanvasDocument, DropOutcome, GestureState};
pub use config::CanvasConfig;
pub use element::{CanvasElement, ElementContent, ElementId, ElementKind, ElementPosition, HorizontalOffset};
pub use error::{CanvasError, CanvasResult, ConfigError, ExportError};
pub use export::{ExportDocument, ExportResult, ValidationFailure, export_layout};
pub use grid::{GRID_SIZE, GridOptions};
pub use overlap::{DragSession, OverlapDetector, SessionKind};
pub use resize::{MIN_SIZE, ResizeCommit, ResizeController};
pub use selection::{SelectionBroadcast, SubscriptionId};
pub use surface::{CanvasSurface, LayoutSurface, StaticSurface, SurfaceChild};
pub use widget::{Handle, HandleKind, WidgetManager, WidgetState};
pub use zorder::{ZDirection, ZIndexLimits};
