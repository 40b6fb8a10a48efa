//! Error types for canvas operations.

use crate::element::{ElementId, ElementKind};
use thiserror::Error;

/// Result type for canvas operations.
pub type CanvasResult<T> = Result<T, CanvasError>;

/// Errors that can occur while editing a canvas.
///
/// A drop blocked by overlap is not an error; see
/// [`DropOutcome::Rejected`](crate::canvas::DropOutcome::Rejected).
#[derive(Debug, Error)]
pub enum CanvasError {
    /// No element with this id exists in the collection.
    #[error("Element not found: {0}")]
    ElementNotFound(ElementId),

    /// A palette item carried a type tag that is not a known element kind.
    #[error("Unknown element type: {0}")]
    UnknownElementType(String),

    /// Replacement content does not match the element's kind.
    #[error("Content of kind {found} cannot be applied to a {expected} element")]
    ContentMismatch {
        expected: ElementKind,
        found: ElementKind,
    },

    /// The element is in resizing mode and cannot be dragged.
    #[error("Element {0} is in resizing mode")]
    ResizingModeActive(ElementId),

    /// The host has not reported canvas bounds yet.
    #[error("Canvas surface is not mounted")]
    CanvasNotMounted,

    /// Two elements share an id.
    #[error("Duplicate element id: {0}")]
    DuplicateId(ElementId),

    /// Two elements share a stacking position.
    #[error("Duplicate z-index: {0}")]
    DuplicateZIndex(i64),

    /// No further element id or z-index can be allocated.
    #[error("Element id or z-index range exhausted")]
    SequenceExhausted,

    /// Collection serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Hard failures of an export.
///
/// Validation problems are reported through
/// [`ExportResult`](crate::export::ExportResult) instead.
#[derive(Debug, Error)]
pub enum ExportError {
    /// A surface the exporter reads from is absent.
    #[error("Required host element is missing: {0}")]
    MissingHostElement(&'static str),
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
