//! Layout export.
//!
//! Reads the live canvas, validates every child against the canvas bounds and
//! the element collection, and produces a serializable [`ExportDocument`].
//! The first failing element aborts the whole export: a failed export never
//! carries a partial element list.

use crate::canvas::CanvasDocument;
use crate::config::CanvasConfig;
use crate::element::{ElementContent, ElementId, ElementKind};
use crate::error::ExportError;
use crate::grid::GridOptions;
use crate::surface::{CanvasSurface, SurfaceChild};
use kurbo::Rect;
use serde::Serialize;
use thiserror::Error;

/// Project metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    pub name: String,
    pub version: String,
    /// Epoch milliseconds.
    pub created: u64,
    /// Epoch milliseconds.
    pub last_modified: u64,
}

/// Canvas size and grid configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanvasInfo {
    pub width: f64,
    pub height: f64,
    pub grid: GridOptions,
}

/// A position component: a number of pixels or a CSS-like string such as `"100%"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Dimension {
    Number(f64),
    Text(String),
}

impl Dimension {
    fn full_width() -> Self {
        Dimension::Text("100%".to_string())
    }
}

/// Exported placement of an element, relative to the canvas's top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedPosition {
    pub x: Dimension,
    pub y: Dimension,
    pub width: Dimension,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<Dimension>,
    pub z_index: i64,
    /// Distance from the element's bottom edge to the canvas bottom.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<f64>,
    /// Whether the element is pinned in place.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed: Option<bool>,
}

/// One exported element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportedElement {
    /// 1-based stacking ordinal, zero-padded to three digits.
    pub id: String,
    #[serde(flatten)]
    pub content: ElementContent,
    pub position: ExportedPosition,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    pub total_elements: usize,
    pub export_format: String,
    pub export_version: String,
}

/// The exported layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportDocument {
    pub project: ProjectInfo,
    pub canvas: CanvasInfo,
    pub elements: Vec<ExportedElement>,
    pub metadata: ExportMetadata,
}

/// Outcome of an export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportResult {
    /// The document, present only on success.
    pub output: Option<ExportDocument>,
    pub success: bool,
    pub message: String,
}

impl ExportResult {
    fn succeeded(document: ExportDocument) -> Self {
        let message = format!("Exported {} elements", document.elements.len());
        Self {
            output: Some(document),
            success: true,
            message,
        }
    }

    fn failed(failure: ValidationFailure) -> Self {
        Self {
            output: None,
            success: false,
            message: failure.to_string(),
        }
    }

    /// Exported elements; empty when the export failed.
    pub fn elements(&self) -> &[ExportedElement] {
        self.output.as_ref().map(|d| d.elements.as_slice()).unwrap_or_default()
    }

    /// Pretty-printed JSON of the whole result.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Why an element failed validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationFailure {
    #[error("Element {id} ({kind}) lies outside the canvas")]
    OutOfCanvas { id: ElementId, kind: ElementKind },

    #[error("Element {id} has unrecognized type \"{type_tag}\"")]
    UnrecognizedType { id: ElementId, type_tag: String },

    #[error("Element {0} is on the canvas but not in the collection")]
    UnknownElement(ElementId),

    #[error("Element {id} is rendered as {rendered} but stored as {stored}")]
    TypeMismatch {
        id: ElementId,
        rendered: ElementKind,
        stored: ElementKind,
    },
}

/// Whether `inner` lies inside `outer` on all four edges. Touching is inside.
fn contains(outer: &Rect, inner: &Rect) -> bool {
    inner.x0 >= outer.x0 && inner.y0 >= outer.y0 && inner.x1 <= outer.x1 && inner.y1 <= outer.y1
}

/// Position shape for `kind` from live bounds relative to `canvas`.
fn exported_position(kind: ElementKind, bounds: Rect, canvas: Rect, z_index: i64) -> ExportedPosition {
    let x = bounds.x0 - canvas.x0;
    let y = bounds.y0 - canvas.y0;
    match kind {
        ElementKind::Header | ElementKind::Slider => ExportedPosition {
            x: Dimension::Number(0.0),
            y: Dimension::Number(y),
            width: Dimension::full_width(),
            height: Some(Dimension::Number(bounds.height())),
            z_index,
            bottom: None,
            fixed: None,
        },
        ElementKind::Footer => ExportedPosition {
            x: Dimension::Number(0.0),
            y: Dimension::Number(y),
            width: Dimension::full_width(),
            height: Some(Dimension::Number(bounds.height())),
            z_index,
            bottom: Some(canvas.y1 - bounds.y1),
            fixed: Some(true),
        },
        ElementKind::TextContent | ElementKind::Card => ExportedPosition {
            x: Dimension::Number(x),
            y: Dimension::Number(y),
            width: Dimension::Number(bounds.width()),
            height: Some(Dimension::Number(bounds.height())),
            z_index,
            bottom: None,
            fixed: None,
        },
    }
}

fn export_child(
    ordinal: usize,
    child: &SurfaceChild,
    canvas: Rect,
    document: &CanvasDocument,
) -> Result<ExportedElement, ValidationFailure> {
    let kind = ElementKind::from_tag(&child.type_tag).ok_or_else(|| ValidationFailure::UnrecognizedType {
        id: child.id,
        type_tag: child.type_tag.clone(),
    })?;
    let element = document
        .get(child.id)
        .ok_or(ValidationFailure::UnknownElement(child.id))?;
    if element.kind() != kind {
        return Err(ValidationFailure::TypeMismatch {
            id: child.id,
            rendered: kind,
            stored: element.kind(),
        });
    }
    if !contains(&canvas, &child.bounds) {
        return Err(ValidationFailure::OutOfCanvas { id: child.id, kind });
    }

    Ok(ExportedElement {
        id: format!("{:03}", ordinal),
        content: element.content.clone(),
        position: exported_position(kind, child.bounds, canvas, child.z_index),
    })
}

/// Validate the canvas and build the export document.
///
/// Validation failures are reported in the returned [`ExportResult`]. Only a
/// missing canvas is an error.
pub fn export_layout<S>(
    surface: &S,
    document: &CanvasDocument,
    grid: &GridOptions,
    config: &CanvasConfig,
) -> Result<ExportResult, ExportError>
where
    S: CanvasSurface + ?Sized,
{
    let canvas = surface
        .canvas_rect()
        .ok_or(ExportError::MissingHostElement("canvas"))?;

    let mut children = surface.children();
    children.sort_by_key(|child| child.z_index);

    let mut elements = Vec::with_capacity(children.len());
    for (index, child) in children.iter().enumerate() {
        match export_child(index + 1, child, canvas, document) {
            Ok(element) => elements.push(element),
            Err(failure) => {
                log::info!("Export failed: {}", failure);
                return Ok(ExportResult::failed(failure));
            }
        }
    }

    let output = ExportDocument {
        project: ProjectInfo {
            name: config.project_name.clone().unwrap_or_else(|| document.name.clone()),
            version: config.project_version.clone(),
            created: document.created,
            last_modified: document.modified,
        },
        canvas: CanvasInfo {
            width: canvas.width(),
            height: canvas.height(),
            grid: *grid,
        },
        metadata: ExportMetadata {
            total_elements: elements.len(),
            export_format: "json".to_string(),
            export_version: config.export_version.clone(),
        },
        elements,
    };
    log::info!("Exported {} elements", output.elements.len());
    Ok(ExportResult::succeeded(output))
}
