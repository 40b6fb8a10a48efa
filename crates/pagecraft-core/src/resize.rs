//! Pointer-driven resizing.
//!
//! The controller is idle until a pointer goes down on a handle of an element
//! whose resizing mode is on. While resizing it consumes every pointer move
//! (even outside the handle) and feeds the live rectangle to the overlap
//! detector. Pointer up commits; cancellation discards.

use crate::element::ElementId;
use crate::overlap::OverlapDetector;
use crate::surface::CanvasSurface;
use crate::widget::HandleKind;
use kurbo::{Point, Rect};

/// Smallest width or height a resize can produce.
pub const MIN_SIZE: f64 = 20.0;

/// Geometry captured when a resize starts.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeSession {
    pub element: ElementId,
    pub handle: HandleKind,
    pub start_pointer: Point,
    /// Element bounds when the pointer went down.
    pub start: Rect,
    /// `start` width over height, used by the aspect-locked handle.
    pub aspect_ratio: f64,
    /// Bounds after the latest pointer move.
    pub current: Rect,
}

impl ResizeSession {
    fn new(element: ElementId, handle: HandleKind, start_pointer: Point, start: Rect) -> Self {
        let aspect_ratio = (start.width() / start.height().max(1.0)).max(1e-6);
        Self {
            element,
            handle,
            start_pointer,
            start,
            aspect_ratio,
            current: start,
        }
    }
}

/// Controller state.
#[derive(Debug, Clone, Default)]
pub enum ResizeState {
    #[default]
    Idle,
    Resizing(ResizeSession),
}

/// Final geometry of a finished resize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeCommit {
    pub element: ElementId,
    pub handle: HandleKind,
    /// Final bounds, in surface coordinates.
    pub bounds: Rect,
    /// Whether the final bounds overlapped a sibling.
    pub overlapping: bool,
}

/// Apply a pointer delta to `start` for the given handle.
///
/// Every dimension is floored at `min_size`; results are rounded to whole units.
pub fn resize_rect(handle: HandleKind, start: Rect, dx: f64, dy: f64, aspect_ratio: f64, min_size: f64) -> Rect {
    let (start_w, start_h) = (start.width(), start.height());
    let grow = |from: f64, delta: f64| (from + delta).round().max(min_size);

    let mut width = start_w;
    let mut height = start_h;
    let mut left = start.x0;
    let mut top = start.y0;

    match handle {
        HandleKind::Right | HandleKind::Horizontal => {
            width = grow(start_w, dx);
        }
        HandleKind::Left => {
            width = grow(start_w, -dx);
            left = (start.x0 + dx).round();
        }
        HandleKind::Bottom | HandleKind::Vertical => {
            height = grow(start_h, dy);
        }
        HandleKind::Top => {
            height = grow(start_h, -dy);
            top = (start.y0 + dy).round();
        }
        HandleKind::BottomRight | HandleKind::Both => {
            // Horizontal movement drives both dimensions.
            width = grow(start_w, dx);
            height = (width / aspect_ratio).round().max(min_size);
        }
        HandleKind::TopLeft => {
            width = grow(start_w, -dx);
            height = grow(start_h, -dy);
            left = (start.x0 + dx).round();
            top = (start.y0 + dy).round();
        }
        HandleKind::TopRight => {
            width = grow(start_w, dx);
            height = grow(start_h, -dy);
            top = (start.y0 + dy).round();
        }
        HandleKind::BottomLeft => {
            width = grow(start_w, -dx);
            height = grow(start_h, dy);
            left = (start.x0 + dx).round();
        }
    }

    Rect::new(left, top, left + width, top + height)
}

/// Resize state machine for the elements of one canvas.
#[derive(Debug, Clone)]
pub struct ResizeController {
    state: ResizeState,
    min_size: f64,
}

impl Default for ResizeController {
    fn default() -> Self {
        Self::new(MIN_SIZE)
    }
}

impl ResizeController {
    pub fn new(min_size: f64) -> Self {
        Self {
            state: ResizeState::Idle,
            min_size,
        }
    }

    pub fn state(&self) -> &ResizeState {
        &self.state
    }

    pub fn session(&self) -> Option<&ResizeSession> {
        match &self.state {
            ResizeState::Resizing(session) => Some(session),
            ResizeState::Idle => None,
        }
    }

    /// Whether pointer moves and ups are currently captured.
    pub fn is_resizing(&self) -> bool {
        matches!(self.state, ResizeState::Resizing(_))
    }

    /// Pointer down on `handle` of `element`.
    ///
    /// Starts resizing only if `enabled` (the element's resizing mode) is on,
    /// no resize is already running, and the surface knows the element.
    /// Opens a resize session on `detector`.
    pub fn pointer_down<S>(
        &mut self,
        detector: &mut OverlapDetector,
        surface: &S,
        element: ElementId,
        handle: HandleKind,
        pointer: Point,
        enabled: bool,
    ) -> bool
    where
        S: CanvasSurface + ?Sized,
    {
        if !enabled || self.is_resizing() {
            return false;
        }
        let Some(start) = surface.child_bounds(element) else {
            log::warn!("Resize requested for element {} not on the canvas", element);
            return false;
        };

        detector.begin_resize(surface, element);
        log::debug!("Resize started on element {} with {} handle", element, handle.tag());
        self.state = ResizeState::Resizing(ResizeSession::new(element, handle, pointer, start));
        true
    }

    /// Pointer move while resizing. Returns the live bounds, or `None` when idle.
    pub fn pointer_move<S>(&mut self, detector: &mut OverlapDetector, surface: &S, pointer: Point) -> Option<Rect>
    where
        S: CanvasSurface + ?Sized,
    {
        let ResizeState::Resizing(session) = &mut self.state else {
            return None;
        };
        let dx = pointer.x - session.start_pointer.x;
        let dy = pointer.y - session.start_pointer.y;
        let bounds = resize_rect(session.handle, session.start, dx, dy, session.aspect_ratio, self.min_size);
        session.current = bounds;

        // Highlight only; whether overlap blocks the commit is the caller's call.
        detector.on_resize_frame(surface, bounds);
        Some(bounds)
    }

    /// Pointer up: finish the resize and close the overlap session.
    pub fn pointer_up(&mut self, detector: &mut OverlapDetector) -> Option<ResizeCommit> {
        let ResizeState::Resizing(session) = std::mem::take(&mut self.state) else {
            return None;
        };
        let overlapping = detector.has_blocking_overlap();
        detector.end();
        log::debug!(
            "Resize finished on element {}: {}x{}",
            session.element,
            session.current.width(),
            session.current.height()
        );
        Some(ResizeCommit {
            element: session.element,
            handle: session.handle,
            bounds: session.current,
            overlapping,
        })
    }

    /// Abort the resize without committing. Safe when idle.
    pub fn cancel(&mut self, detector: &mut OverlapDetector) {
        if let ResizeState::Resizing(session) = std::mem::take(&mut self.state) {
            log::debug!("Resize cancelled on element {}", session.element);
            detector.end();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::StaticSurface;

    const ALL_HANDLES: [HandleKind; 11] = [
        HandleKind::Top,
        HandleKind::Bottom,
        HandleKind::Left,
        HandleKind::Right,
        HandleKind::TopLeft,
        HandleKind::TopRight,
        HandleKind::BottomLeft,
        HandleKind::BottomRight,
        HandleKind::Horizontal,
        HandleKind::Vertical,
        HandleKind::Both,
    ];

    fn card_surface() -> StaticSurface {
        StaticSurface::new(Rect::new(0.0, 0.0, 1000.0, 800.0))
            .with_child(0, "card", 0, Rect::new(100.0, 100.0, 400.0, 300.0))
            .with_child(1, "card", 1, Rect::new(500.0, 100.0, 800.0, 300.0))
    }

    #[test]
    fn test_handle_table() {
        let start = Rect::new(100.0, 100.0, 400.0, 300.0);
        let r = |h| resize_rect(h, start, 30.0, 10.0, 1.5, MIN_SIZE);

        assert_eq!(r(HandleKind::Right), Rect::new(100.0, 100.0, 430.0, 300.0));
        assert_eq!(r(HandleKind::Horizontal), r(HandleKind::Right));
        assert_eq!(r(HandleKind::Left), Rect::new(130.0, 100.0, 400.0, 300.0));
        assert_eq!(r(HandleKind::Bottom), Rect::new(100.0, 100.0, 400.0, 310.0));
        assert_eq!(r(HandleKind::Vertical), r(HandleKind::Bottom));
        assert_eq!(r(HandleKind::Top), Rect::new(100.0, 110.0, 400.0, 300.0));
        assert_eq!(r(HandleKind::TopLeft), Rect::new(130.0, 110.0, 400.0, 300.0));
        assert_eq!(r(HandleKind::TopRight), Rect::new(100.0, 110.0, 430.0, 300.0));
        assert_eq!(r(HandleKind::BottomLeft), Rect::new(130.0, 100.0, 400.0, 310.0));
        assert_eq!(r(HandleKind::BottomRight), Rect::new(100.0, 100.0, 430.0, 320.0));
        assert_eq!(r(HandleKind::Both), r(HandleKind::BottomRight));
    }

    #[test]
    fn test_min_size_for_every_handle() {
        let start = Rect::new(100.0, 100.0, 400.0, 300.0);
        let deltas = [-5000.0, -301.0, -50.0, 0.0, 50.0, 301.0, 5000.0];
        for handle in ALL_HANDLES {
            for &dx in &deltas {
                for &dy in &deltas {
                    let rect = resize_rect(handle, start, dx, dy, 1.5, MIN_SIZE);
                    assert!(rect.width() >= MIN_SIZE, "{:?} dx={} dy={}", handle, dx, dy);
                    assert!(rect.height() >= MIN_SIZE, "{:?} dx={} dy={}", handle, dx, dy);
                }
            }
        }
    }

    #[test]
    fn test_aspect_lock_every_frame() {
        let surface = card_surface();
        let mut detector = OverlapDetector::new();
        let mut controller = ResizeController::default();
        assert!(controller.pointer_down(
            &mut detector,
            &surface,
            ElementId::new(0),
            HandleKind::Both,
            Point::new(400.0, 300.0),
            true,
        ));
        let aspect = controller.session().unwrap().aspect_ratio;
        assert_eq!(aspect, 1.5);

        for dx in [-250.0, -37.0, 0.0, 13.0, 60.0, 171.0] {
            let rect = controller
                .pointer_move(&mut detector, &surface, Point::new(400.0 + dx, 300.0 + 99.0))
                .unwrap();
            assert_eq!(rect.height(), (rect.width() / aspect).round().max(MIN_SIZE));
        }
    }

    #[test]
    fn test_card_resize_scenario() {
        let surface = card_surface();
        let mut detector = OverlapDetector::new();
        let mut controller = ResizeController::default();
        controller.pointer_down(
            &mut detector,
            &surface,
            ElementId::new(0),
            HandleKind::BottomRight,
            Point::new(400.0, 300.0),
            true,
        );
        let live = controller
            .pointer_move(&mut detector, &surface, Point::new(460.0, 300.0))
            .unwrap();
        assert_eq!((live.width(), live.height()), (360.0, 240.0));

        let commit = controller.pointer_up(&mut detector).unwrap();
        assert_eq!(commit.bounds, Rect::new(100.0, 100.0, 460.0, 340.0));
        assert!(!commit.overlapping);
        assert!(!controller.is_resizing());
        assert!(!detector.is_active());
    }

    #[test]
    fn test_requires_resizing_mode() {
        let surface = card_surface();
        let mut detector = OverlapDetector::new();
        let mut controller = ResizeController::default();
        assert!(!controller.pointer_down(
            &mut detector,
            &surface,
            ElementId::new(0),
            HandleKind::Right,
            Point::new(400.0, 200.0),
            false,
        ));
        assert!(!detector.is_active());
        assert_eq!(controller.pointer_move(&mut detector, &surface, Point::new(0.0, 0.0)), None);
        assert_eq!(controller.pointer_up(&mut detector), None);
    }

    #[test]
    fn test_overlap_is_reported_not_enforced() {
        let surface = card_surface();
        let mut detector = OverlapDetector::new();
        let mut controller = ResizeController::default();
        controller.pointer_down(
            &mut detector,
            &surface,
            ElementId::new(0),
            HandleKind::Right,
            Point::new(400.0, 200.0),
            true,
        );
        controller.pointer_move(&mut detector, &surface, Point::new(550.0, 200.0));
        assert!(detector.is_highlighted(ElementId::new(1)));

        let commit = controller.pointer_up(&mut detector).unwrap();
        assert!(commit.overlapping);
        assert_eq!(commit.bounds.width(), 450.0);
        assert!(detector.highlighted().is_empty());
    }

    #[test]
    fn test_cancel_closes_session() {
        let surface = card_surface();
        let mut detector = OverlapDetector::new();
        let mut controller = ResizeController::default();
        controller.pointer_down(
            &mut detector,
            &surface,
            ElementId::new(0),
            HandleKind::Left,
            Point::new(100.0, 200.0),
            true,
        );
        controller.cancel(&mut detector);
        controller.cancel(&mut detector);
        assert!(!controller.is_resizing());
        assert!(!detector.is_active());
    }

    #[test]
    fn test_zero_height_start_is_guarded() {
        let session = ResizeSession::new(
            ElementId::new(0),
            HandleKind::Both,
            Point::ZERO,
            Rect::new(0.0, 0.0, 50.0, 0.0),
        );
        assert_eq!(session.aspect_ratio, 50.0);
        let session = ResizeSession::new(ElementId::new(0), HandleKind::Both, Point::ZERO, Rect::ZERO);
        assert_eq!(session.aspect_ratio, 1e-6);
    }
}
