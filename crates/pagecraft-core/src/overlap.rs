//! Overlap detection for drag and resize gestures.
//!
//! A session is opened when a gesture starts and closed when it ends:
//!
//! - [`OverlapDetector::begin_palette_drag`] when a palette item starts dragging
//! - [`OverlapDetector::begin_existing_drag`] when a placed element starts dragging
//! - [`OverlapDetector::on_drag_over`] on every drag-over frame
//! - [`OverlapDetector::begin_resize`] / [`OverlapDetector::on_resize_frame`] for resizes
//! - [`OverlapDetector::has_blocking_overlap`] to decide whether a drop may commit
//! - [`OverlapDetector::end`] on drop, drag end, or cancellation
//!
//! The sibling list is snapshotted once per session. Sibling rectangles are
//! re-read from the surface on every frame because layout may shift mid-gesture.

use crate::element::{ElementId, ElementKind, palette_footprint};
use crate::surface::CanvasSurface;
use kurbo::{Point, Rect, Size, Vec2};
use std::collections::HashSet;

/// What started the current session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionKind {
    /// A new block dragged in from the palette, identified by its type tag.
    Palette { type_tag: String },
    /// A placed element being moved.
    Existing { id: ElementId },
    /// A placed element being resized.
    Resize { id: ElementId },
}

impl SessionKind {
    /// The element excluded from collision tests.
    pub fn subject(&self) -> Option<ElementId> {
        match self {
            SessionKind::Palette { .. } => None,
            SessionKind::Existing { id } | SessionKind::Resize { id } => Some(*id),
        }
    }
}

/// State of an in-progress gesture.
#[derive(Debug, Clone)]
pub struct DragSession {
    kind: SessionKind,
    /// Size of the dragged block.
    footprint: Size,
    /// Offset from the pointer to the dragged block's top-left corner.
    anchor: Vec2,
    /// Full-width blocks are laid out at the canvas's left edge whatever the pointer x.
    full_width: bool,
    /// Siblings to test against, captured when the session began.
    siblings: Vec<ElementId>,
    overlapping: bool,
    highlighted: HashSet<ElementId>,
}

impl DragSession {
    pub fn kind(&self) -> &SessionKind {
        &self.kind
    }

    pub fn footprint(&self) -> Size {
        self.footprint
    }

    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    pub fn is_full_width(&self) -> bool {
        self.full_width
    }

    pub fn siblings(&self) -> &[ElementId] {
        &self.siblings
    }
}

/// Strict rectangle intersection: rectangles that only share an edge do not overlap.
pub fn intersects(a: &Rect, b: &Rect) -> bool {
    !(a.x1 <= b.x0 || a.x0 >= b.x1 || a.y1 <= b.y0 || a.y0 >= b.y1)
}

/// Tracks collisions for at most one gesture at a time.
#[derive(Debug, Clone, Default)]
pub struct OverlapDetector {
    session: Option<DragSession>,
}

impl OverlapDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session for a block dragged in from the palette.
    pub fn begin_palette_drag<S>(&mut self, surface: &S, type_tag: &str)
    where
        S: CanvasSurface + ?Sized,
    {
        let width = surface.canvas_rect().map(|r| r.width()).unwrap_or_default();
        let full_width = ElementKind::from_tag(type_tag).is_some_and(ElementKind::is_full_width);
        self.begin(
            surface,
            SessionKind::Palette {
                type_tag: type_tag.to_string(),
            },
            palette_footprint(type_tag, width),
            Vec2::ZERO,
            full_width,
        );
    }

    /// Start a session for a placed element grabbed at `anchor` from its top-left.
    ///
    /// Whether the element spans the full width is read from its type tag on the surface.
    pub fn begin_existing_drag<S>(&mut self, surface: &S, id: ElementId, anchor: Vec2, size: Size)
    where
        S: CanvasSurface + ?Sized,
    {
        let full_width = surface
            .children()
            .iter()
            .find(|child| child.id == id)
            .and_then(|child| ElementKind::from_tag(&child.type_tag))
            .is_some_and(ElementKind::is_full_width);
        self.begin(surface, SessionKind::Existing { id }, size, anchor, full_width);
    }

    /// Start a session for an element being resized.
    pub fn begin_resize<S>(&mut self, surface: &S, id: ElementId)
    where
        S: CanvasSurface + ?Sized,
    {
        self.begin(surface, SessionKind::Resize { id }, Size::ZERO, Vec2::ZERO, false);
    }

    fn begin<S>(&mut self, surface: &S, kind: SessionKind, footprint: Size, anchor: Vec2, full_width: bool)
    where
        S: CanvasSurface + ?Sized,
    {
        // A session that was never closed must not leak into this one.
        self.end();

        let subject = kind.subject();
        let siblings: Vec<ElementId> = surface
            .children()
            .into_iter()
            .filter(|child| Some(child.id) != subject && !child.dragging)
            .map(|child| child.id)
            .collect();

        log::debug!(
            "Overlap session started: {:?}, {} siblings",
            kind,
            siblings.len()
        );
        self.session = Some(DragSession {
            kind,
            footprint,
            anchor,
            full_width,
            siblings,
            overlapping: false,
            highlighted: HashSet::new(),
        });
    }

    /// Test the dragged block at `pointer` against the siblings.
    ///
    /// Returns whether the block currently overlaps anything. Without an
    /// open drag session this returns false and changes nothing.
    pub fn on_drag_over<S>(&mut self, surface: &S, pointer: Point) -> bool
    where
        S: CanvasSurface + ?Sized,
    {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        match &session.kind {
            SessionKind::Palette { type_tag } => {
                // Full-width blocks follow the canvas if it resized mid-drag.
                let width = surface.canvas_rect().map(|r| r.width()).unwrap_or_default();
                session.footprint = palette_footprint(type_tag, width);
            }
            SessionKind::Existing { .. } => {}
            SessionKind::Resize { .. } => return session.overlapping,
        }
        let mut origin = pointer + session.anchor;
        if session.full_width {
            if let Some(canvas) = surface.canvas_rect() {
                origin.x = canvas.x0;
                session.footprint.width = canvas.width();
            }
        }
        let candidate = Rect::from_origin_size(origin, session.footprint);
        apply_collisions(session, surface, candidate)
    }

    /// Test the live rectangle of the element being resized against the siblings.
    pub fn on_resize_frame<S>(&mut self, surface: &S, live: Rect) -> bool
    where
        S: CanvasSurface + ?Sized,
    {
        match self.session.as_mut() {
            Some(session) => apply_collisions(session, surface, live),
            None => false,
        }
    }

    /// Whether the last frame found any overlapping sibling.
    pub fn has_blocking_overlap(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.overlapping)
    }

    /// Whether a sibling is currently flagged as overlapped.
    pub fn is_highlighted(&self, id: ElementId) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.highlighted.contains(&id))
    }

    /// All siblings currently flagged as overlapped.
    pub fn highlighted(&self) -> Vec<ElementId> {
        let mut ids: Vec<ElementId> = self
            .session
            .as_ref()
            .map(|s| s.highlighted.iter().copied().collect())
            .unwrap_or_default();
        ids.sort();
        ids
    }

    /// Remove every highlight flag and reset the overlap state.
    pub fn clear_highlights(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.highlighted.clear();
            session.overlapping = false;
        }
    }

    /// Close the session. Idempotent and safe when no session was opened.
    pub fn end(&mut self) {
        self.clear_highlights();
        if let Some(session) = self.session.take() {
            log::debug!("Overlap session ended: {:?}", session.kind);
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }
}

/// Reconcile the highlight set against the siblings `candidate` intersects.
fn apply_collisions<S>(session: &mut DragSession, surface: &S, candidate: Rect) -> bool
where
    S: CanvasSurface + ?Sized,
{
    let overlapping: HashSet<ElementId> = session
        .siblings
        .iter()
        .filter_map(|&id| surface.child_bounds(id).map(|bounds| (id, bounds)))
        .filter(|(_, bounds)| intersects(&candidate, bounds))
        .map(|(id, _)| id)
        .collect();

    session.highlighted.retain(|id| overlapping.contains(id));
    for id in &overlapping {
        if session.highlighted.insert(*id) {
            log::trace!("Highlighting overlapped element {}", id);
        }
    }

    session.overlapping = !overlapping.is_empty();
    session.overlapping
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::StaticSurface;

    fn canvas() -> Rect {
        Rect::new(0.0, 0.0, 1000.0, 800.0)
    }

    #[test]
    fn test_touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(!intersects(&a, &Rect::new(100.0, 0.0, 200.0, 100.0)));
        assert!(!intersects(&a, &Rect::new(0.0, 100.0, 100.0, 200.0)));
        assert!(intersects(&a, &Rect::new(99.0, 99.0, 200.0, 200.0)));
        assert!(intersects(&a, &Rect::new(10.0, 10.0, 20.0, 20.0)));
    }

    #[test]
    fn test_disjoint_siblings_never_block() {
        let surface = StaticSurface::new(canvas())
            .with_child(0, "card", 0, Rect::new(0.0, 0.0, 300.0, 200.0))
            .with_child(1, "card", 1, Rect::new(400.0, 0.0, 700.0, 200.0));
        let mut detector = OverlapDetector::new();
        detector.begin_existing_drag(&surface, ElementId::new(1), Vec2::ZERO, Size::new(300.0, 200.0));

        assert!(!detector.on_drag_over(&surface, Point::new(400.0, 0.0)));
        assert!(!detector.has_blocking_overlap());
    }

    #[test]
    fn test_palette_drag_highlights_overlapped_sibling() {
        let surface = StaticSurface::new(canvas())
            .with_child(0, "header", 0, Rect::new(0.0, 0.0, 1000.0, 80.0))
            .with_child(1, "card", 1, Rect::new(0.0, 300.0, 300.0, 500.0));
        let mut detector = OverlapDetector::new();
        detector.begin_palette_drag(&surface, "card");

        assert!(detector.on_drag_over(&surface, Point::new(100.0, 40.0)));
        assert_eq!(detector.highlighted(), vec![ElementId::new(0)]);

        // Moving onto the second card swaps the highlight.
        assert!(detector.on_drag_over(&surface, Point::new(200.0, 250.0)));
        assert_eq!(detector.highlighted(), vec![ElementId::new(1)]);

        assert!(!detector.on_drag_over(&surface, Point::new(500.0, 100.0)));
        assert!(detector.highlighted().is_empty());
    }

    #[test]
    fn test_palette_footprint_follows_canvas_width() {
        let mut surface = StaticSurface::new(canvas())
            .with_child(0, "card", 0, Rect::new(900.0, 300.0, 1000.0, 400.0));
        let mut detector = OverlapDetector::new();
        detector.begin_palette_drag(&surface, "header");
        assert_eq!(detector.session().unwrap().footprint(), Size::new(1000.0, 80.0));

        surface.canvas = Some(Rect::new(0.0, 0.0, 500.0, 800.0));
        assert!(!detector.on_drag_over(&surface, Point::new(0.0, 320.0)));
        assert_eq!(detector.session().unwrap().footprint(), Size::new(500.0, 80.0));
    }

    #[test]
    fn test_full_width_palette_block_is_tested_at_left_edge() {
        let surface = StaticSurface::new(canvas())
            .with_child(0, "card", 0, Rect::new(0.0, 0.0, 300.0, 200.0));
        let mut detector = OverlapDetector::new();
        detector.begin_palette_drag(&surface, "header");
        assert!(detector.session().unwrap().is_full_width());

        // The header lays out at x=0, so it covers the card even from the right half.
        assert!(detector.on_drag_over(&surface, Point::new(500.0, 50.0)));
        assert!(detector.is_highlighted(ElementId::new(0)));
        assert!(!detector.on_drag_over(&surface, Point::new(500.0, 200.0)));
    }

    #[test]
    fn test_full_width_existing_block_ignores_grab_x() {
        let surface = StaticSurface::new(canvas())
            .with_child(0, "card", 0, Rect::new(0.0, 200.0, 300.0, 400.0))
            .with_child(1, "header", 1, Rect::new(0.0, 0.0, 1000.0, 80.0));
        let mut detector = OverlapDetector::new();
        detector.begin_existing_drag(
            &surface,
            ElementId::new(1),
            Vec2::new(-900.0, -10.0),
            Size::new(1000.0, 80.0),
        );
        assert!(detector.session().unwrap().is_full_width());
        assert!(detector.on_drag_over(&surface, Point::new(1250.0, 230.0)));

        detector.begin_existing_drag(&surface, ElementId::new(0), Vec2::ZERO, Size::new(300.0, 200.0));
        assert!(!detector.session().unwrap().is_full_width());
    }

    #[test]
    fn test_never_tests_against_self() {
        let surface = StaticSurface::new(canvas())
            .with_child(0, "card", 0, Rect::new(0.0, 0.0, 300.0, 200.0));
        let mut detector = OverlapDetector::new();

        detector.begin_existing_drag(&surface, ElementId::new(0), Vec2::ZERO, Size::new(300.0, 200.0));
        assert!(detector.session().unwrap().siblings().is_empty());
        assert!(!detector.on_drag_over(&surface, Point::new(10.0, 10.0)));

        detector.begin_resize(&surface, ElementId::new(0));
        assert!(!detector.on_resize_frame(&surface, Rect::new(0.0, 0.0, 400.0, 300.0)));
        assert!(!detector.is_highlighted(ElementId::new(0)));
    }

    #[test]
    fn test_mid_drag_children_are_skipped() {
        let mut surface = StaticSurface::new(canvas())
            .with_child(0, "card", 0, Rect::new(0.0, 0.0, 300.0, 200.0));
        surface.children[0].dragging = true;
        let mut detector = OverlapDetector::new();
        detector.begin_palette_drag(&surface, "card");
        assert!(!detector.on_drag_over(&surface, Point::new(10.0, 10.0)));
    }

    #[test]
    fn test_sibling_bounds_are_reread_each_frame() {
        let mut surface = StaticSurface::new(canvas())
            .with_child(0, "card", 0, Rect::new(0.0, 0.0, 300.0, 200.0));
        let mut detector = OverlapDetector::new();
        detector.begin_resize(&surface, ElementId::new(1));

        let live = Rect::new(400.0, 0.0, 500.0, 100.0);
        assert!(!detector.on_resize_frame(&surface, live));
        surface.set_bounds(ElementId::new(0), Rect::new(350.0, 0.0, 650.0, 200.0));
        assert!(detector.on_resize_frame(&surface, live));
        assert!(detector.is_highlighted(ElementId::new(0)));
    }

    #[test]
    fn test_end_is_idempotent() {
        let surface = StaticSurface::new(canvas())
            .with_child(0, "card", 0, Rect::new(0.0, 0.0, 300.0, 200.0));
        let mut detector = OverlapDetector::new();
        detector.end();
        assert!(!detector.is_active());

        detector.begin_palette_drag(&surface, "card");
        assert!(detector.on_drag_over(&surface, Point::new(0.0, 0.0)));
        detector.end();
        detector.end();
        assert!(!detector.is_active());
        assert!(!detector.has_blocking_overlap());
        assert!(detector.highlighted().is_empty());
        assert!(!detector.on_drag_over(&surface, Point::new(0.0, 0.0)));
    }

    #[test]
    fn test_clear_highlights_keeps_session() {
        let surface = StaticSurface::new(canvas())
            .with_child(0, "card", 0, Rect::new(0.0, 0.0, 300.0, 200.0));
        let mut detector = OverlapDetector::new();
        detector.begin_palette_drag(&surface, "unknown-block");
        assert_eq!(detector.session().unwrap().footprint(), Size::new(100.0, 100.0));
        assert!(detector.on_drag_over(&surface, Point::new(250.0, 150.0)));

        detector.clear_highlights();
        assert!(detector.is_active());
        assert!(!detector.has_blocking_overlap());
        assert!(detector.highlighted().is_empty());
    }
}
