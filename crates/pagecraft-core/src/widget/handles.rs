//! Resize handle definitions.

use kurbo::{Point, Rect};

/// Default hit radius for handles, in canvas units.
pub const HANDLE_HIT_TOLERANCE: f64 = 8.0;

/// A resize handle placed on an element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    /// The kind of handle (determines behavior).
    pub kind: HandleKind,
    /// Position in canvas coordinates.
    pub position: Point,
}

/// The direction a handle resizes in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    // Edge handles
    Top,
    Bottom,
    Left,
    Right,
    // Corner handles
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    // Legacy aliases: right, bottom, and an aspect-locked bottom-right.
    Horizontal,
    Vertical,
    Both,
}

impl HandleKind {
    /// Parse the direction tag a renderer puts on a handle region.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let kind = match tag {
            "top" => HandleKind::Top,
            "bottom" => HandleKind::Bottom,
            "left" => HandleKind::Left,
            "right" => HandleKind::Right,
            "top-left" => HandleKind::TopLeft,
            "top-right" => HandleKind::TopRight,
            "bottom-left" => HandleKind::BottomLeft,
            "bottom-right" => HandleKind::BottomRight,
            "horizontal" => HandleKind::Horizontal,
            "vertical" => HandleKind::Vertical,
            "both" => HandleKind::Both,
            _ => return None,
        };
        Some(kind)
    }

    pub fn tag(self) -> &'static str {
        match self {
            HandleKind::Top => "top",
            HandleKind::Bottom => "bottom",
            HandleKind::Left => "left",
            HandleKind::Right => "right",
            HandleKind::TopLeft => "top-left",
            HandleKind::TopRight => "top-right",
            HandleKind::BottomLeft => "bottom-left",
            HandleKind::BottomRight => "bottom-right",
            HandleKind::Horizontal => "horizontal",
            HandleKind::Vertical => "vertical",
            HandleKind::Both => "both",
        }
    }

    /// Whether dragging this handle shifts the element's left edge.
    pub fn moves_left(self) -> bool {
        matches!(self, HandleKind::Left | HandleKind::TopLeft | HandleKind::BottomLeft)
    }

    /// Whether dragging this handle shifts the element's top edge.
    pub fn moves_top(self) -> bool {
        matches!(self, HandleKind::Top | HandleKind::TopLeft | HandleKind::TopRight)
    }

    /// Where this handle sits on `bounds`.
    pub fn anchor(self, bounds: Rect) -> Point {
        let center = bounds.center();
        match self {
            HandleKind::Top => Point::new(center.x, bounds.y0),
            HandleKind::Bottom | HandleKind::Vertical => Point::new(center.x, bounds.y1),
            HandleKind::Left => Point::new(bounds.x0, center.y),
            HandleKind::Right | HandleKind::Horizontal => Point::new(bounds.x1, center.y),
            HandleKind::TopLeft => Point::new(bounds.x0, bounds.y0),
            HandleKind::TopRight => Point::new(bounds.x1, bounds.y0),
            HandleKind::BottomLeft => Point::new(bounds.x0, bounds.y1),
            HandleKind::BottomRight | HandleKind::Both => Point::new(bounds.x1, bounds.y1),
        }
    }
}

impl Handle {
    /// Create a new handle.
    pub fn new(kind: HandleKind, position: Point) -> Self {
        Self { kind, position }
    }

    /// Check if a point hits this handle.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let dx = point.x - self.position.x;
        let dy = point.y - self.position.y;
        dx * dx + dy * dy <= tolerance * tolerance
    }
}

/// Lay out the given handle kinds on `bounds`.
pub fn handles_for(bounds: Rect, kinds: &[HandleKind]) -> Vec<Handle> {
    kinds
        .iter()
        .map(|&kind| Handle::new(kind, kind.anchor(bounds)))
        .collect()
}

/// Find which handle (if any) is hit at the given point.
pub fn hit_test_handles(bounds: Rect, kinds: &[HandleKind], point: Point, tolerance: f64) -> Option<HandleKind> {
    handles_for(bounds, kinds)
        .into_iter()
        .find(|handle| handle.hit_test(point, tolerance))
        .map(|handle| handle.kind)
}
