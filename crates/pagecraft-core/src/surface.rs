//! The canvas surface seen by the overlap detector and the exporter.
//!
//! A host (a browser page, a test harness) exposes its canvas through
//! [`CanvasSurface`]. [`LayoutSurface`] is the built-in host: it lays out a
//! [`CanvasDocument`] inside known canvas bounds.

use crate::canvas::CanvasDocument;
use crate::element::ElementId;
use crate::widget::WidgetManager;
use kurbo::Rect;
use std::collections::HashMap;

/// A child of the canvas as the host currently renders it.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceChild {
    pub id: ElementId,
    /// Type tag of the rendered block.
    pub type_tag: String,
    pub z_index: i64,
    /// Live bounding box, in the same coordinate space as the canvas rect.
    pub bounds: Rect,
    /// Whether the child is the element currently being dragged.
    pub dragging: bool,
}

/// Read access to the live canvas.
pub trait CanvasSurface {
    /// Bounding box of the canvas. `None` if the canvas is not mounted.
    fn canvas_rect(&self) -> Option<Rect>;

    /// Current children of the canvas.
    fn children(&self) -> Vec<SurfaceChild>;

    /// Live bounding box of one child.
    fn child_bounds(&self, id: ElementId) -> Option<Rect> {
        self.children()
            .into_iter()
            .find(|child| child.id == id)
            .map(|child| child.bounds)
    }
}

/// Lays out a document inside fixed canvas bounds.
///
/// `live` holds geometry applied during a gesture but not yet committed.
#[derive(Debug, Clone, Copy)]
pub struct LayoutSurface<'a> {
    document: &'a CanvasDocument,
    canvas: Option<Rect>,
    widgets: &'a WidgetManager,
    live: &'a HashMap<ElementId, Rect>,
}

impl<'a> LayoutSurface<'a> {
    pub fn new(
        document: &'a CanvasDocument,
        canvas: Option<Rect>,
        widgets: &'a WidgetManager,
        live: &'a HashMap<ElementId, Rect>,
    ) -> Self {
        Self {
            document,
            canvas,
            widgets,
            live,
        }
    }
}

impl CanvasSurface for LayoutSurface<'_> {
    fn canvas_rect(&self) -> Option<Rect> {
        self.canvas
    }

    fn children(&self) -> Vec<SurfaceChild> {
        let Some(canvas) = self.canvas else {
            return Vec::new();
        };
        self.document
            .elements()
            .iter()
            .map(|element| SurfaceChild {
                id: element.id(),
                type_tag: element.kind().tag().to_string(),
                z_index: element.z_index(),
                bounds: self
                    .live
                    .get(&element.id())
                    .copied()
                    .unwrap_or_else(|| element.layout_rect(canvas)),
                dragging: self.widgets.is_dragging(element.id()),
            })
            .collect()
    }

    fn child_bounds(&self, id: ElementId) -> Option<Rect> {
        let canvas = self.canvas?;
        if let Some(rect) = self.live.get(&id) {
            return Some(*rect);
        }
        self.document.get(id).map(|element| element.layout_rect(canvas))
    }
}

/// A fixed set of children, for hosts that report geometry directly.
#[derive(Debug, Clone, Default)]
pub struct StaticSurface {
    pub canvas: Option<Rect>,
    pub children: Vec<SurfaceChild>,
}

impl StaticSurface {
    pub fn new(canvas: Rect) -> Self {
        Self {
            canvas: Some(canvas),
            children: Vec::new(),
        }
    }

    /// Add a child with the given geometry.
    pub fn with_child(mut self, id: u64, type_tag: &str, z_index: i64, bounds: Rect) -> Self {
        self.children.push(SurfaceChild {
            id: ElementId::new(id),
            type_tag: type_tag.to_string(),
            z_index,
            bounds,
            dragging: false,
        });
        self
    }

    /// Move a child, as a host reflow would.
    pub fn set_bounds(&mut self, id: ElementId, bounds: Rect) {
        if let Some(child) = self.children.iter_mut().find(|child| child.id == id) {
            child.bounds = bounds;
        }
    }
}

impl CanvasSurface for StaticSurface {
    fn canvas_rect(&self) -> Option<Rect> {
        self.canvas
    }

    fn children(&self) -> Vec<SurfaceChild> {
        self.children.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementContent, ElementKind, ElementPosition, HorizontalOffset};

    #[test]
    fn test_layout_surface_reports_children() {
        let mut document = CanvasDocument::new();
        let id = document.create(
            ElementContent::default_for(ElementKind::Card),
            ElementPosition::new(HorizontalOffset::Pixels(10.0), 20.0),
        )
        .unwrap();
        let widgets = WidgetManager::new();
        let live = HashMap::new();
        let surface = LayoutSurface::new(&document, Some(Rect::new(0.0, 0.0, 800.0, 600.0)), &widgets, &live);

        let children = surface.children();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].type_tag, "card");
        assert_eq!(children[0].bounds, Rect::new(10.0, 20.0, 310.0, 220.0));
        assert_eq!(surface.child_bounds(id), Some(children[0].bounds));
    }

    #[test]
    fn test_live_geometry_overrides_layout() {
        let mut document = CanvasDocument::new();
        let id = document.create(ElementContent::default_for(ElementKind::Card), ElementPosition::origin()).unwrap();
        let widgets = WidgetManager::new();
        let mut live = HashMap::new();
        live.insert(id, Rect::new(0.0, 0.0, 50.0, 50.0));
        let surface = LayoutSurface::new(&document, Some(Rect::new(0.0, 0.0, 800.0, 600.0)), &widgets, &live);

        assert_eq!(surface.child_bounds(id), Some(Rect::new(0.0, 0.0, 50.0, 50.0)));
        assert_eq!(surface.children()[0].bounds, Rect::new(0.0, 0.0, 50.0, 50.0));
    }

    #[test]
    fn test_unmounted_surface_has_no_children() {
        let mut document = CanvasDocument::new();
        let id = document.create(ElementContent::default_for(ElementKind::Header), ElementPosition::origin()).unwrap();
        let widgets = WidgetManager::new();
        let live = HashMap::new();
        let surface = LayoutSurface::new(&document, None, &widgets, &live);

        assert!(surface.children().is_empty());
        assert_eq!(surface.child_bounds(id), None);
    }
}
