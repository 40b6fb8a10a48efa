//! Canvas document and interaction state.

use crate::config::CanvasConfig;
use crate::element::{CanvasElement, ElementContent, ElementId, ElementKind, ElementPosition, HorizontalOffset};
use crate::error::{CanvasError, CanvasResult, ExportError};
use crate::export::{ExportResult, export_layout};
use crate::grid::GridOptions;
use crate::overlap::{OverlapDetector, SessionKind};
use crate::resize::{ResizeCommit, ResizeController};
use crate::selection::{SelectionBroadcast, SubscriptionId};
use crate::surface::{CanvasSurface, LayoutSurface};
use crate::widget::{HANDLE_HIT_TOLERANCE, HandleKind, WidgetManager, hit_test_handles};
use crate::zorder::{self, ZDirection, ZIndexLimits};
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;
use web_time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch.
fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// The elements of one canvas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasDocument {
    /// Unique document identifier.
    pub id: String,
    /// Document name.
    pub name: String,
    /// Elements in creation order. Stacking order is their z-index.
    elements: Vec<CanvasElement>,
    /// Creation time, epoch milliseconds.
    #[serde(default)]
    pub created: u64,
    /// Last modification time, epoch milliseconds.
    #[serde(default)]
    pub modified: u64,
}

impl Default for CanvasDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasDocument {
    /// Create a new empty document.
    pub fn new() -> Self {
        let now = now_millis();
        Self {
            id: Uuid::new_v4().to_string(),
            name: "Untitled".to_string(),
            elements: Vec::new(),
            created: now,
            modified: now,
        }
    }

    fn touch(&mut self) {
        self.modified = now_millis();
    }

    /// Id for the next element: the successor of the highest id currently
    /// present, or `0` when empty. `None` once the id range is used up.
    pub fn next_id(&self) -> Option<ElementId> {
        match self.elements.iter().map(|e| e.id).max() {
            Some(top) => top.successor(),
            None => Some(ElementId::new(0)),
        }
    }

    /// Add an element on top of the stack. Returns its id.
    pub fn create(&mut self, content: ElementContent, position: ElementPosition) -> CanvasResult<ElementId> {
        let id = self.next_id().ok_or(CanvasError::SequenceExhausted)?;
        let z_index = zorder::next_z_index(&self.elements).ok_or(CanvasError::SequenceExhausted)?;
        self.elements.push(CanvasElement::new(id, content, position, z_index));
        self.touch();
        Ok(id)
    }

    /// Remove an element.
    pub fn remove(&mut self, id: ElementId) -> Option<CanvasElement> {
        let index = self.elements.iter().position(|e| e.id == id)?;
        self.touch();
        Some(self.elements.remove(index))
    }

    pub fn get(&self, id: ElementId) -> Option<&CanvasElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut CanvasElement> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    /// Elements in creation order.
    pub fn elements(&self) -> &[CanvasElement] {
        &self.elements
    }

    /// Elements back to front.
    pub fn elements_by_z(&self) -> Vec<&CanvasElement> {
        let mut ordered: Vec<&CanvasElement> = self.elements.iter().collect();
        ordered.sort_by_key(|e| e.z_index);
        ordered
    }

    /// Swap an element with its nearest stacking neighbor. See [`zorder::change_z_index`].
    pub fn change_z_index(&mut self, id: ElementId, direction: ZDirection) -> Option<ElementId> {
        let swapped = zorder::change_z_index(&mut self.elements, id, direction);
        if swapped.is_some() {
            self.touch();
        }
        swapped
    }

    pub fn z_index_limits(&self) -> ZIndexLimits {
        zorder::z_index_limits(&self.elements)
    }

    /// Replace an element's content. The new content must be of the same kind.
    pub fn set_content(&mut self, id: ElementId, content: ElementContent) -> CanvasResult<()> {
        let element = self.get_mut(id).ok_or(CanvasError::ElementNotFound(id))?;
        if element.kind() != content.kind() {
            return Err(CanvasError::ContentMismatch {
                expected: element.kind(),
                found: content.kind(),
            });
        }
        element.content = content;
        self.touch();
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Serialize the document to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a document from JSON.
    ///
    /// Rejects duplicate ids or z-indices, and documents whose ids or
    /// z-indices leave no room for another element.
    pub fn from_json(json: &str) -> CanvasResult<Self> {
        let document: Self = serde_json::from_str(json)?;
        let mut ids = HashSet::new();
        let mut z_indices = HashSet::new();
        for element in &document.elements {
            if !ids.insert(element.id) {
                return Err(CanvasError::DuplicateId(element.id));
            }
            if !z_indices.insert(element.z_index) {
                return Err(CanvasError::DuplicateZIndex(element.z_index));
            }
        }
        if document.next_id().is_none() || zorder::next_z_index(&document.elements).is_none() {
            return Err(CanvasError::SequenceExhausted);
        }
        Ok(document)
    }
}

/// Result of a drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// A new element was created.
    Created(ElementId),
    /// An existing element was moved.
    Moved(ElementId),
    /// The drop overlapped another element; nothing changed.
    Rejected,
}

/// Drag gesture in progress, if any. Resizes are tracked by the resize controller.
#[derive(Debug, Clone, PartialEq, Default)]
enum Drag {
    #[default]
    Idle,
    Palette { type_tag: String },
    Element { id: ElementId, anchor: Vec2 },
}

/// Coarse gesture state of a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureState {
    Idle,
    Dragging,
    Resizing,
}

/// Builds a layout surface from disjoint fields so the detector and resizer
/// can be borrowed mutably alongside it.
macro_rules! layout_surface {
    ($canvas:expr) => {
        LayoutSurface::new(
            &$canvas.document,
            $canvas.bounds,
            &$canvas.widgets,
            &$canvas.live_geometry,
        )
    };
}

/// A canvas being edited: the document plus all transient interaction state.
///
/// Each canvas owns its own overlap detector, resize controller and selection,
/// so independent canvases never share gesture state.
#[derive(Debug)]
pub struct Canvas {
    /// The element collection.
    pub document: CanvasDocument,
    /// Grid control values.
    pub grid: GridOptions,
    config: CanvasConfig,
    /// Host canvas bounds; all placement math is relative to its origin.
    bounds: Option<Rect>,
    detector: OverlapDetector,
    resizer: ResizeController,
    selection: SelectionBroadcast,
    widgets: WidgetManager,
    /// Geometry applied by an in-progress resize.
    live_geometry: HashMap<ElementId, Rect>,
    drag: Drag,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(CanvasConfig::default())
    }
}

impl Canvas {
    /// Create a canvas with an empty document.
    pub fn new(config: CanvasConfig) -> Self {
        Self::with_document(CanvasDocument::new(), config)
    }

    /// Create a canvas with an existing document.
    pub fn with_document(document: CanvasDocument, config: CanvasConfig) -> Self {
        Self {
            document,
            grid: config.grid,
            resizer: ResizeController::new(config.min_size),
            config,
            bounds: None,
            detector: OverlapDetector::new(),
            selection: SelectionBroadcast::new(),
            widgets: WidgetManager::new(),
            live_geometry: HashMap::new(),
            drag: Drag::Idle,
        }
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    /// Record the host canvas bounds.
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = Some(bounds);
    }

    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    /// The canvas as seen by collision tests and export.
    pub fn surface(&self) -> LayoutSurface<'_> {
        layout_surface!(self)
    }

    pub fn detector(&self) -> &OverlapDetector {
        &self.detector
    }

    pub fn resizer(&self) -> &ResizeController {
        &self.resizer
    }

    pub fn widgets(&self) -> &WidgetManager {
        &self.widgets
    }

    pub fn gesture_state(&self) -> GestureState {
        if self.resizer.is_resizing() {
            GestureState::Resizing
        } else if self.drag != Drag::Idle {
            GestureState::Dragging
        } else {
            GestureState::Idle
        }
    }

    /// Whether an element is flagged as overlapped by the current gesture.
    pub fn is_highlighted(&self, id: ElementId) -> bool {
        self.detector.is_highlighted(id)
    }

    // --- Selection ---

    /// Select an element (or clear the selection with `None`).
    pub fn select(&mut self, id: Option<ElementId>) -> bool {
        self.selection.publish(id)
    }

    pub fn selected(&self) -> Option<ElementId> {
        self.selection.selected()
    }

    pub fn subscribe_selection<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(Option<ElementId>) + 'static,
    {
        self.selection.subscribe(callback)
    }

    pub fn unsubscribe_selection(&mut self, subscription: SubscriptionId) -> bool {
        self.selection.unsubscribe(subscription)
    }

    // --- Dragging ---

    /// A palette item carrying `type_tag` started dragging.
    pub fn begin_palette_drag(&mut self, type_tag: &str) {
        self.end_drag();
        self.detector.begin_palette_drag(&layout_surface!(self), type_tag);
        self.drag = Drag::Palette {
            type_tag: type_tag.to_string(),
        };
    }

    /// A placed element started dragging, grabbed at `pointer`.
    pub fn begin_element_drag(&mut self, id: ElementId, pointer: Point) -> CanvasResult<()> {
        if self.document.get(id).is_none() {
            return Err(CanvasError::ElementNotFound(id));
        }
        if self.widgets.is_resizing_mode(id) {
            return Err(CanvasError::ResizingModeActive(id));
        }
        self.end_drag();

        let surface = layout_surface!(self);
        let rect = surface.child_bounds(id).ok_or(CanvasError::CanvasNotMounted)?;
        let anchor = rect.origin() - pointer;
        self.detector.begin_existing_drag(&surface, id, anchor, rect.size());

        self.widgets.begin_drag(id);
        self.drag = Drag::Element { id, anchor };
        Ok(())
    }

    /// A drag-over frame at `pointer`. Returns whether the drop would be blocked.
    pub fn drag_over(&mut self, pointer: Point) -> bool {
        self.detector.on_drag_over(&layout_surface!(self), pointer)
    }

    /// The drag ended without a drop on this canvas, or was aborted.
    ///
    /// Idempotent; also safe when no drag was started.
    pub fn end_drag(&mut self) {
        self.detector.end();
        self.widgets.end_drag();
        self.drag = Drag::Idle;
    }

    /// Drop whatever is being dragged at `pointer`.
    pub fn drop_at(&mut self, pointer: Point) -> CanvasResult<DropOutcome> {
        match std::mem::take(&mut self.drag) {
            Drag::Palette { type_tag } => self.drop_from_palette(&type_tag, pointer, None),
            Drag::Element { id, .. } => self.drop_existing(id, pointer),
            Drag::Idle => {
                self.end_drag();
                Ok(DropOutcome::Rejected)
            }
        }
    }

    fn canvas_rect(&self) -> CanvasResult<Rect> {
        self.bounds.ok_or(CanvasError::CanvasNotMounted)
    }

    /// Position for a block whose top-left corner lands at `corner`.
    fn position_at(&self, canvas: Rect, corner: Point) -> ElementPosition {
        if let Some(pinned) = self.grid.pinned_position() {
            return pinned;
        }
        ElementPosition::new(
            HorizontalOffset::percent_of(corner.x - canvas.x0, canvas.width()),
            corner.y - canvas.y0,
        )
    }

    /// Drop a new block from the palette at `pointer`.
    ///
    /// Rejected without any change if the block would overlap an element.
    pub fn drop_from_palette(
        &mut self,
        type_tag: &str,
        pointer: Point,
        content: Option<ElementContent>,
    ) -> CanvasResult<DropOutcome> {
        let result = self.try_drop_from_palette(type_tag, pointer, content);
        self.end_drag();
        result
    }

    fn try_drop_from_palette(
        &mut self,
        type_tag: &str,
        pointer: Point,
        content: Option<ElementContent>,
    ) -> CanvasResult<DropOutcome> {
        let kind = ElementKind::from_tag(type_tag)
            .ok_or_else(|| CanvasError::UnknownElementType(type_tag.to_string()))?;
        if let Some(content) = &content {
            if content.kind() != kind {
                return Err(CanvasError::ContentMismatch {
                    expected: kind,
                    found: content.kind(),
                });
            }
        }
        let canvas = self.canvas_rect()?;

        let palette_session = matches!(
            self.detector.session().map(|s| s.kind()),
            Some(SessionKind::Palette { type_tag: tag }) if tag == type_tag
        );
        if !palette_session {
            self.detector.begin_palette_drag(&layout_surface!(self), type_tag);
        }
        if self.detector.on_drag_over(&layout_surface!(self), pointer) {
            log::warn!("Drop of {} at ({}, {}) rejected: overlaps an element", type_tag, pointer.x, pointer.y);
            return Ok(DropOutcome::Rejected);
        }

        let position = self.position_at(canvas, pointer);
        let content = content.unwrap_or_else(|| ElementContent::default_for(kind));
        let id = self.document.create(content, position)?;
        log::debug!("Created {} element {}", kind, id);
        Ok(DropOutcome::Created(id))
    }

    /// Drop a placed element at `pointer`, keeping the offset it was grabbed at.
    ///
    /// Rejected without any change if it would overlap another element.
    pub fn drop_existing(&mut self, id: ElementId, pointer: Point) -> CanvasResult<DropOutcome> {
        let result = self.try_drop_existing(id, pointer);
        self.end_drag();
        result
    }

    fn try_drop_existing(&mut self, id: ElementId, pointer: Point) -> CanvasResult<DropOutcome> {
        let canvas = self.canvas_rect()?;
        let subject = self.detector.session().and_then(|s| s.kind().subject());
        if subject != Some(id) {
            // The drop carries an id we did not see start dragging; grab at the corner.
            let surface = layout_surface!(self);
            let rect = surface.child_bounds(id).ok_or(CanvasError::ElementNotFound(id))?;
            self.detector.begin_existing_drag(&surface, id, Vec2::ZERO, rect.size());
        }
        let anchor = self.detector.session().map(|s| s.anchor()).unwrap_or(Vec2::ZERO);

        if self.detector.on_drag_over(&layout_surface!(self), pointer) {
            log::warn!("Move of element {} rejected: overlaps an element", id);
            return Ok(DropOutcome::Rejected);
        }

        let position = self.position_at(canvas, pointer + anchor);
        let element = self.document.get_mut(id).ok_or(CanvasError::ElementNotFound(id))?;
        element.position = position;
        self.document.touch();
        log::debug!("Moved element {} to {:?}", id, position);
        Ok(DropOutcome::Moved(id))
    }

    // --- Editing ---

    /// Delete an element.
    pub fn delete(&mut self, id: ElementId) -> CanvasResult<CanvasElement> {
        if self.resizer.session().is_some_and(|s| s.element == id) {
            self.resizer.cancel(&mut self.detector);
        }
        if self.widgets.dragging() == Some(id) {
            self.end_drag();
        }
        let removed = self.document.remove(id).ok_or(CanvasError::ElementNotFound(id))?;
        self.widgets.remove(id);
        self.live_geometry.remove(&id);
        if self.selection.is_selected(id) {
            self.selection.publish(None);
        }
        log::debug!("Deleted element {}", id);
        Ok(removed)
    }

    /// Move an element one step forward or backward in the stack.
    ///
    /// Returns whether anything changed; an element already at the extreme
    /// stays put.
    pub fn change_z_index(&mut self, id: ElementId, direction: ZDirection) -> CanvasResult<bool> {
        if self.document.get(id).is_none() {
            return Err(CanvasError::ElementNotFound(id));
        }
        Ok(self.document.change_z_index(id, direction).is_some())
    }

    pub fn z_index_limits(&self) -> ZIndexLimits {
        self.document.z_index_limits()
    }

    pub fn set_content(&mut self, id: ElementId, content: ElementContent) -> CanvasResult<()> {
        self.document.set_content(id, content)
    }

    pub fn element(&self, id: ElementId) -> Option<&CanvasElement> {
        self.document.get(id)
    }

    /// Elements back to front.
    pub fn elements_by_z(&self) -> Vec<&CanvasElement> {
        self.document.elements_by_z()
    }

    // --- Resizing ---

    /// Toggle resize handles for an element. Returns the new mode.
    pub fn toggle_resizing_mode(&mut self, id: ElementId) -> CanvasResult<bool> {
        let element = self.document.get(id).ok_or(CanvasError::ElementNotFound(id))?;
        if !element.kind().is_resizable() {
            return Ok(false);
        }
        if self.widgets.dragging() == Some(id) {
            self.end_drag();
        }
        Ok(self.widgets.toggle_resizing_mode(id))
    }

    /// Which resize handle of `id` lies under `point`, if handles are live.
    pub fn handle_at(&self, id: ElementId, point: Point) -> Option<HandleKind> {
        if !self.widgets.is_resizing_mode(id) {
            return None;
        }
        let element = self.document.get(id)?;
        let bounds = self.surface().child_bounds(id)?;
        hit_test_handles(bounds, element.kind().resize_handles(), point, HANDLE_HIT_TOLERANCE)
    }

    /// Pointer down on the handle tagged `handle_tag` of `id`.
    ///
    /// Returns whether a resize started. Unknown tags, handles the element's
    /// kind does not accept, and elements not in resizing mode are ignored.
    pub fn resize_pointer_down(&mut self, id: ElementId, handle_tag: &str, pointer: Point) -> CanvasResult<bool> {
        let element = self.document.get(id).ok_or(CanvasError::ElementNotFound(id))?;
        let Some(handle) = HandleKind::from_tag(handle_tag) else {
            return Ok(false);
        };
        if !element.kind().accepts_handle(handle) {
            return Ok(false);
        }
        let enabled = self.widgets.is_resizing_mode(id);
        let surface = layout_surface!(self);
        Ok(self
            .resizer
            .pointer_down(&mut self.detector, &surface, id, handle, pointer, enabled))
    }

    /// Pointer move during a resize. Returns the live bounds.
    pub fn resize_pointer_move(&mut self, pointer: Point) -> Option<Rect> {
        let surface = layout_surface!(self);
        let bounds = self.resizer.pointer_move(&mut self.detector, &surface, pointer)?;
        let id = self.resizer.session()?.element;
        self.live_geometry.insert(id, bounds);
        Some(bounds)
    }

    /// Pointer up during a resize: commit the final geometry.
    ///
    /// Returns the commit, or `None` if no resize was running or the resize
    /// was reverted because it overlapped and the config blocks that.
    pub fn resize_pointer_up(&mut self) -> CanvasResult<Option<ResizeCommit>> {
        let Some(commit) = self.resizer.pointer_up(&mut self.detector) else {
            return Ok(None);
        };
        self.live_geometry.remove(&commit.element);

        if commit.overlapping && self.config.block_overlapping_resize {
            log::warn!("Resize of element {} reverted: overlaps an element", commit.element);
            return Ok(None);
        }
        self.apply_resize(&commit)?;
        Ok(Some(commit))
    }

    /// Abort a resize, discarding its live geometry. Safe when idle.
    pub fn resize_cancel(&mut self) {
        if let Some(session) = self.resizer.session() {
            self.live_geometry.remove(&session.element);
        }
        self.resizer.cancel(&mut self.detector);
    }

    /// Persist size and, for left/top handles, the shifted position.
    fn apply_resize(&mut self, commit: &ResizeCommit) -> CanvasResult<()> {
        let canvas = self.canvas_rect()?;
        let element = self
            .document
            .get_mut(commit.element)
            .ok_or(CanvasError::ElementNotFound(commit.element))?;

        element.size = Some(Size::new(commit.bounds.width(), commit.bounds.height()));
        if commit.handle.moves_left() {
            element.position.left = element
                .position
                .left
                .with_pixels(commit.bounds.x0 - canvas.x0, canvas.width());
        }
        if commit.handle.moves_top() {
            element.position.top = commit.bounds.y0 - canvas.y0;
        }
        self.document.touch();
        Ok(())
    }

    /// Abort whatever gesture is running. Every session is closed.
    pub fn cancel_gesture(&mut self) {
        self.resize_cancel();
        self.end_drag();
    }

    // --- Export ---

    /// Validate and export the layout.
    pub fn export(&self) -> Result<ExportResult, ExportError> {
        export_layout(&self.surface(), &self.document, &self.grid, &self.config)
    }
}
