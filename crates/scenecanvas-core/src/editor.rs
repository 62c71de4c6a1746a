//! The scene editor: one canvas instance with its own viewport, elements,
//! selection and gesture state.
//!
//! Every public entry point runs to completion, re-rendering the scene onto
//! the owned surface whenever something visible changed.

use crate::config::EditorConfig;
use crate::document::{DocumentError, DrawingDocument, ViewportSnapshot};
use crate::elements::{Element, ElementId, Label, Line, Rectangle};
use crate::geometry::{distance, midpoint};
use crate::gesture::{Interaction, Preview, exceeds_move_threshold, is_tap};
use crate::input::TouchEvent;
use crate::render::{DisplayList, RenderContext, Surface, render_scene};
use crate::selection::{
    HandleKind, HitBoxes, fixed_corner, hit_test_element, hit_test_handles, hit_test_label,
};
use crate::storage::{Storage, StorageResult};
use crate::tools::{EditorMode, ToolKind};
use crate::viewport::Viewport;
use kurbo::{Point, Size};
use std::fmt;

/// Token identifying a label placement that is waiting for text entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PendingLabelId(u64);

impl fmt::Display for PendingLabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pending-label-{}", self.0)
    }
}

/// A label placement awaiting its text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingLabel {
    pub id: PendingLabelId,
    /// Anchor in canvas coordinates.
    pub position: Point,
}

/// Something the host has to act on after a pointer release.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// Ask the user for label text, then call `confirm_label` or `cancel_label`.
    LabelRequested {
        pending: PendingLabelId,
        position: Point,
    },
    /// A label was tapped in view mode.
    NavigateToLabel { id: ElementId, text: String },
}

/// Interactive scene editor bound to a drawing surface.
pub struct SceneEditor<S = DisplayList> {
    surface: S,
    size: Size,
    config: EditorConfig,
    viewport: Viewport,
    elements: Vec<Element>,
    selection: Option<ElementId>,
    mode: EditorMode,
    tool: ToolKind,
    interaction: Interaction,
    pending_label: Option<PendingLabel>,
    next_pending: u64,
    hit_boxes: HitBoxes,
}

impl<S: Surface> SceneEditor<S> {
    /// Create an editor drawing onto `surface` of `width × height` pixels.
    pub fn new(surface: S, width: f64, height: f64) -> Self {
        Self::with_config(surface, width, height, EditorConfig::default())
    }

    /// Create an editor with custom tunables.
    pub fn with_config(surface: S, width: f64, height: f64, config: EditorConfig) -> Self {
        let mut editor = Self {
            surface,
            size: Size::new(width, height),
            viewport: Viewport::with_bounds(config.min_scale, config.max_scale),
            config,
            elements: Vec::new(),
            selection: None,
            mode: EditorMode::default(),
            tool: ToolKind::default(),
            interaction: Interaction::Idle,
            pending_label: None,
            next_pending: 0,
            hit_boxes: HitBoxes::new(),
        };
        editor.render();
        editor
    }

    // --- accessors ---

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn selection(&self) -> Option<&ElementId> {
        self.selection.as_ref()
    }

    /// The selected element, if any.
    pub fn selected_element(&self) -> Option<&Element> {
        self.selection.as_ref().and_then(|id| self.find(id))
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn pending_label(&self) -> Option<&PendingLabel> {
        self.pending_label.as_ref()
    }

    /// Label boxes from the last render.
    pub fn hit_boxes(&self) -> &HitBoxes {
        &self.hit_boxes
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    fn find(&self, id: &ElementId) -> Option<&Element> {
        self.elements.iter().find(|el| el.id() == id)
    }

    fn contains(&self, id: &ElementId) -> bool {
        self.find(id).is_some()
    }

    // --- host commands ---

    /// Update the surface size after the host resized it.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.size = Size::new(width, height);
        self.render();
    }

    /// Switch between view and edit mode, dropping tool, selection, any
    /// gesture in progress and a pending label.
    pub fn set_mode(&mut self, mode: EditorMode) {
        log::debug!("Mode {} -> {}", self.mode, mode);
        self.mode = mode;
        self.tool = ToolKind::None;
        self.selection = None;
        self.abort_interaction();
        self.pending_label = None;
        self.render();
    }

    /// Arm a creation tool, dropping the selection and any gesture in progress.
    pub fn set_tool(&mut self, tool: ToolKind) {
        log::debug!("Tool {} -> {}", self.tool, tool);
        self.tool = tool;
        self.selection = None;
        self.abort_interaction();
        self.render();
    }

    /// Remove the most recently added element. Always clears the selection.
    pub fn undo(&mut self) -> Option<Element> {
        self.selection = None;
        let removed = self.elements.pop();
        if let Some(element) = &removed {
            log::debug!("Undo removed {} {}", element.kind(), element.id());
        }
        self.render();
        removed
    }

    /// Remove the selected element; no-op without a selection.
    pub fn delete_selected(&mut self) -> Option<Element> {
        let id = self.selection.take()?;
        let index = self.elements.iter().position(|el| el.id() == &id)?;
        let removed = self.elements.remove(index);
        log::debug!("Deleted {} {}", removed.kind(), id);
        self.render();
        Some(removed)
    }

    // --- label placement ---

    /// Reserve a label at a canvas position; the text arrives later.
    ///
    /// Replaces any placement already waiting.
    pub fn begin_label_placement(&mut self, position: Point) -> PendingLabelId {
        self.next_pending += 1;
        let id = PendingLabelId(self.next_pending);
        if let Some(previous) = self.pending_label.replace(PendingLabel { id, position }) {
            log::debug!("Dropping {} in favour of {}", previous.id, id);
        }
        id
    }

    /// Create the pending label with `text`.
    ///
    /// Returns the new element's id, or `None` when the token is stale or the
    /// trimmed text is empty (the placement then stays pending).
    pub fn confirm_label(&mut self, pending: PendingLabelId, text: &str) -> Option<ElementId> {
        let Some(placement) = self.pending_label.filter(|p| p.id == pending) else {
            log::warn!("Ignoring confirmation for stale {pending}");
            return None;
        };
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let mut label = Label::new(placement.position, text);
        label.font_size = self.config.label_font_size;
        label.color = self.config.label_color;
        let id = label.id.clone();
        self.elements.push(label.into());
        self.pending_label = None;
        self.tool = ToolKind::None;
        self.render();
        Some(id)
    }

    /// Drop the pending label. Returns whether the token was current.
    pub fn cancel_label(&mut self, pending: PendingLabelId) -> bool {
        if self.pending_label.is_some_and(|p| p.id == pending) {
            self.pending_label = None;
            true
        } else {
            log::warn!("Ignoring cancellation for stale {pending}");
            false
        }
    }

    // --- documents ---

    /// Snapshot viewport and elements.
    pub fn export(&self) -> DrawingDocument {
        DrawingDocument::new(ViewportSnapshot::from(&self.viewport), self.elements.clone())
    }

    /// Replace viewport and elements with a document's content.
    ///
    /// Rectangles are normalized and duplicate identifiers replaced, so
    /// identifiers stay unique whatever the document's origin.
    pub fn import(&mut self, mut document: DrawingDocument) {
        document.sanitize();
        document.viewport.apply(&mut self.viewport);
        self.elements = document.elements;
        self.selection = None;
        self.abort_interaction();
        log::info!("Loaded drawing with {} elements", self.elements.len());
        self.render();
    }

    pub fn export_json(&self) -> Result<String, DocumentError> {
        self.export().to_json()
    }

    pub fn import_json(&mut self, json: &str) -> Result<(), DocumentError> {
        let document = DrawingDocument::from_json(json)?;
        self.import(document);
        Ok(())
    }

    /// Save the current drawing under `key`.
    pub async fn save_to<T: Storage + ?Sized>(&self, storage: &T, key: &str) -> StorageResult<()> {
        storage.save(key, &self.export()).await
    }

    /// Replace the current drawing with the one stored under `key`.
    pub async fn load_from<T: Storage + ?Sized>(&mut self, storage: &T, key: &str) -> StorageResult<()> {
        let document = storage.load(key).await?;
        self.import(document);
        Ok(())
    }

    // --- pointer input ---

    /// Handle contacts touching down.
    pub fn pointer_start(&mut self, event: &TouchEvent) {
        if let Some((a, b)) = event.pair() {
            self.abort_interaction();
            self.interaction = Interaction::Pinching {
                distance: distance(a, b),
                center: midpoint(a, b),
            };
            log::debug!("Gesture -> pinching");
            self.render();
            return;
        }

        let Some(pos) = event.primary() else {
            return;
        };
        let started = event.timestamp;

        self.interaction = match self.mode {
            EditorMode::View => Interaction::panning(pos, started),
            EditorMode::Edit => self.press_in_edit_mode(pos, started),
        };
        log::debug!("Gesture -> {}", self.interaction.name());
        self.render();
    }

    fn press_in_edit_mode(&self, pos: Point, started: crate::input::Instant) -> Interaction {
        if self.tool.draws_shape() {
            let start = self.viewport.to_canvas(pos);
            return Interaction::Drawing {
                tool: self.tool,
                start,
                current: start,
            };
        }
        if self.tool == ToolKind::Label {
            return Interaction::panning(pos, started);
        }

        let canvas = self.viewport.to_canvas(pos);
        if let Some((element, handle)) = self.selected_handle_at(canvas) {
            return Interaction::Resizing {
                element: element.id().clone(),
                handle,
                fixed: fixed_corner(element, handle),
            };
        }

        let tolerance = self.viewport.screen_len(self.config.element_hit_threshold);
        match hit_test_element(&self.elements, canvas, tolerance, &self.hit_boxes) {
            Some(element) => Interaction::PotentialMove {
                element: element.id().clone(),
                origin: pos,
            },
            None => Interaction::panning(pos, started),
        }
    }

    fn selected_handle_at(&self, canvas: Point) -> Option<(&Element, HandleKind)> {
        let element = self.selected_element()?;
        let radius = self.viewport.screen_len(self.config.handle_hit_radius);
        hit_test_handles(element, canvas, radius).map(|handle| (element, handle.kind))
    }

    /// Handle contacts moving.
    pub fn pointer_move(&mut self, event: &TouchEvent) {
        if event.contact_count() >= 2 || self.interaction.is_pinching() {
            self.pinch_move(event);
            return;
        }

        let Some(pos) = event.primary() else {
            return;
        };

        let changed = match &mut self.interaction {
            Interaction::Drawing { current, .. } => {
                *current = self.viewport.to_canvas(pos);
                true
            }
            Interaction::PotentialMove { element, origin } => {
                if exceeds_move_threshold(*origin, pos, &self.config) {
                    let id = element.clone();
                    if self.elements.iter().any(|el| el.id() == &id) {
                        self.selection = Some(id.clone());
                    }
                    self.interaction = Interaction::Moving {
                        element: id,
                        last: pos,
                    };
                    log::debug!("Gesture -> moving");
                    true
                } else {
                    false
                }
            }
            Interaction::Moving { element, last } => {
                let delta = pos - *last;
                *last = pos;
                let scale = self.viewport.scale;
                if let Some(el) = self.elements.iter_mut().find(|el| el.id() == &*element) {
                    el.move_by_screen(delta, scale);
                }
                true
            }
            Interaction::Resizing {
                element,
                handle,
                fixed,
            } => {
                let canvas = self.viewport.to_canvas(pos);
                if let Some(el) = self.elements.iter_mut().find(|el| el.id() == &*element) {
                    crate::selection::apply_resize(el, *handle, canvas, *fixed);
                }
                true
            }
            Interaction::Panning { last, .. } => {
                self.viewport.pan(pos - *last);
                *last = pos;
                true
            }
            Interaction::Idle | Interaction::Pinching { .. } => false,
        };

        if changed {
            self.render();
        }
    }

    fn pinch_move(&mut self, event: &TouchEvent) {
        if !self.interaction.is_pinching() {
            self.abort_interaction();
        }
        let Some((a, b)) = event.pair() else {
            return;
        };
        let dist = distance(a, b);
        let center = midpoint(a, b);

        if let Interaction::Pinching {
            distance: last_distance,
            center: last_center,
        } = self.interaction
        {
            if last_distance > 0.0 {
                self.viewport.apply_zoom(center, dist / last_distance);
                self.viewport.pan(center - last_center);
            }
        } else {
            log::debug!("Gesture -> pinching");
        }

        self.interaction = Interaction::Pinching {
            distance: dist,
            center,
        };
        self.render();
    }

    /// Handle contacts lifting. Returns an event when the host must act.
    pub fn pointer_end(&mut self, event: &TouchEvent) -> Option<EditorEvent> {
        let interaction = std::mem::take(&mut self.interaction);
        if !interaction.is_idle() {
            log::debug!("Gesture {} -> idle", interaction.name());
        }

        match interaction {
            Interaction::Idle | Interaction::Pinching { .. } => None,
            Interaction::Drawing {
                tool,
                start,
                current,
            } => {
                self.finish_drawing(Preview {
                    tool,
                    start,
                    current,
                });
                None
            }
            Interaction::Moving { .. } | Interaction::Resizing { .. } => {
                self.render();
                None
            }
            Interaction::PotentialMove { element, .. } => {
                if self.contains(&element) {
                    self.selection = Some(element);
                }
                self.render();
                None
            }
            Interaction::Panning {
                origin, started, ..
            } => {
                let release = event.released().unwrap_or(origin);
                if !is_tap(origin, release, event.since(started), &self.config) {
                    return None;
                }
                self.tap(self.viewport.to_canvas(release))
            }
        }
    }

    fn finish_drawing(&mut self, preview: Preview) {
        if preview.is_committable(self.config.min_draw_distance) {
            let element: Option<Element> = match preview.tool {
                ToolKind::Line => {
                    let mut line = Line::new(preview.start, preview.current);
                    line.color = self.config.stroke_color;
                    line.line_width = self.config.stroke_width;
                    Some(line.into())
                }
                ToolKind::Rect => {
                    let mut rect = Rectangle::from_corners(preview.start, preview.current);
                    rect.color = self.config.stroke_color;
                    rect.line_width = self.config.stroke_width;
                    Some(rect.into())
                }
                ToolKind::None | ToolKind::Label => None,
            };
            if let Some(element) = element {
                log::debug!("Created {} {}", element.kind(), element.id());
                self.elements.push(element);
            }
        }
        self.tool = ToolKind::None;
        self.render();
    }

    fn tap(&mut self, canvas: Point) -> Option<EditorEvent> {
        match self.mode {
            EditorMode::Edit => {
                if self.tool == ToolKind::Label && self.pending_label.is_none() {
                    let pending = self.begin_label_placement(canvas);
                    Some(EditorEvent::LabelRequested {
                        pending,
                        position: canvas,
                    })
                } else {
                    self.selection = None;
                    self.render();
                    None
                }
            }
            EditorMode::View => hit_test_label(&self.elements, canvas, &self.hit_boxes).map(|label| {
                EditorEvent::NavigateToLabel {
                    id: label.id.clone(),
                    text: label.text.clone(),
                }
            }),
        }
    }

    /// Drop the current gesture without committing anything.
    pub fn abort_interaction(&mut self) {
        if !self.interaction.is_idle() {
            log::debug!("Gesture {} aborted", self.interaction.name());
        }
        self.interaction = Interaction::Idle;
    }

    /// Redraw the whole scene and refresh the label hit boxes.
    pub fn render(&mut self) {
        let ctx = RenderContext::new(&self.elements, &self.viewport, self.size, &self.config)
            .with_mode(self.mode)
            .with_selection(self.selection.as_ref())
            .with_preview(self.interaction.preview());
        self.hit_boxes = render_scene(&mut self.surface, &ctx);
    }
}
