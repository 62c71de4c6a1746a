//! Scene rendering onto an abstract drawing surface.
//!
//! The pipeline redraws the whole scene on every call: background, grid,
//! elements, the in-progress draw preview and the selection handles. It
//! returns the label hit boxes it laid out so the editor can refresh its
//! side table.

use crate::config::EditorConfig;
use crate::elements::{Element, ElementId, Label, SerializableColor};
use crate::gesture::Preview;
use crate::selection::{HitBoxes, get_handles};
use crate::tools::{EditorMode, ToolKind};
use crate::viewport::Viewport;
use kurbo::{Affine, BezPath, Circle, Point, Rect, RoundedRect, Shape, Size};
use peniko::Color;

/// Path flattening tolerance for curves (rounded boxes, handles).
const PATH_TOLERANCE: f64 = 0.1;
const LABEL_CORNER_RADIUS: f64 = 4.0;
const GRID_COLOR: SerializableColor = SerializableColor::rgb(0xf0, 0xf0, 0xf0);

/// A 2D drawing target.
///
/// Geometry is given in canvas coordinates together with the canvas→screen
/// transform; stroke widths are in canvas units and scale with the transform.
pub trait Surface {
    /// Clear the whole surface to a solid color.
    fn clear(&mut self, size: Size, color: Color);

    /// Stroke a path.
    fn stroke(&mut self, path: &BezPath, transform: Affine, color: Color, width: f64);

    /// Fill a path (non-zero winding).
    fn fill(&mut self, path: &BezPath, transform: Affine, color: Color);

    /// Draw text with its baseline starting at `origin`.
    fn fill_text(&mut self, text: &str, origin: Point, font_size: f64, color: Color, transform: Affine);

    /// Measure the advance width of `text`, if the surface has font metrics.
    fn measure_text(&mut self, _text: &str, _font_size: f64) -> Option<f64> {
        None
    }
}

/// One recorded drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear {
        size: Size,
        color: SerializableColor,
    },
    Stroke {
        path: BezPath,
        transform: Affine,
        color: SerializableColor,
        width: f64,
    },
    Fill {
        path: BezPath,
        transform: Affine,
        color: SerializableColor,
    },
    Text {
        text: String,
        origin: Point,
        font_size: f64,
        color: SerializableColor,
        transform: Affine,
    },
}

/// A surface that records commands instead of rasterizing them.
///
/// Used headless and in tests; a host can replay the commands onto its own
/// canvas.
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    commands: Vec<DrawCommand>,
    /// Per-character advance relative to font size, for simulated metrics.
    char_advance: Option<f64>,
    frames: usize,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report text widths as `chars × font_size × advance`.
    pub fn with_char_advance(mut self, advance: f64) -> Self {
        self.char_advance = Some(advance);
        self
    }

    /// Commands of the last frame.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of frames started since creation.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Text strings drawn in the last frame, in draw order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for DisplayList {
    fn clear(&mut self, size: Size, color: Color) {
        self.commands.clear();
        self.frames += 1;
        self.commands.push(DrawCommand::Clear {
            size,
            color: color.into(),
        });
    }

    fn stroke(&mut self, path: &BezPath, transform: Affine, color: Color, width: f64) {
        self.commands.push(DrawCommand::Stroke {
            path: path.clone(),
            transform,
            color: color.into(),
            width,
        });
    }

    fn fill(&mut self, path: &BezPath, transform: Affine, color: Color) {
        self.commands.push(DrawCommand::Fill {
            path: path.clone(),
            transform,
            color: color.into(),
        });
    }

    fn fill_text(&mut self, text: &str, origin: Point, font_size: f64, color: Color, transform: Affine) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            origin,
            font_size,
            color: color.into(),
            transform,
        });
    }

    fn measure_text(&mut self, text: &str, font_size: f64) -> Option<f64> {
        self.char_advance
            .map(|advance| text.chars().count() as f64 * font_size * advance)
    }
}

/// Everything needed to draw one frame.
pub struct RenderContext<'a> {
    pub elements: &'a [Element],
    pub viewport: &'a Viewport,
    /// Surface size in pixels.
    pub size: Size,
    pub mode: EditorMode,
    pub selection: Option<&'a ElementId>,
    pub preview: Option<Preview>,
    pub config: &'a EditorConfig,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        elements: &'a [Element],
        viewport: &'a Viewport,
        size: Size,
        config: &'a EditorConfig,
    ) -> Self {
        Self {
            elements,
            viewport,
            size,
            mode: EditorMode::default(),
            selection: None,
            preview: None,
            config,
        }
    }

    pub fn with_mode(mut self, mode: EditorMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_selection(mut self, selection: Option<&'a ElementId>) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_preview(mut self, preview: Option<Preview>) -> Self {
        self.preview = preview;
        self
    }

    fn is_selected(&self, element: &Element) -> bool {
        self.selection.is_some_and(|id| id == element.id())
    }
}

/// Draw a full frame and return the rendered label boxes.
pub fn render_scene<S: Surface + ?Sized>(surface: &mut S, ctx: &RenderContext<'_>) -> HitBoxes {
    let transform = ctx.viewport.transform();
    let mut hit_boxes = HitBoxes::new();

    surface.clear(ctx.size, SerializableColor::white().into());
    draw_grid(surface, ctx, transform);

    for element in ctx.elements {
        let selected = ctx.is_selected(element);
        match element {
            Element::Line(line) => {
                let mut path = BezPath::new();
                path.move_to(line.start());
                path.line_to(line.end());
                surface.stroke(&path, transform, stroke_color(ctx, line.color, selected), line.line_width);
            }
            Element::Rect(rect) => {
                let path = rect.as_rect().to_path(PATH_TOLERANCE);
                surface.stroke(&path, transform, stroke_color(ctx, rect.color, selected), rect.line_width);
            }
            Element::Label(label) => {
                let hit_box = draw_label(surface, ctx, transform, label, selected);
                hit_boxes.insert(label.id.clone(), hit_box);
            }
        }
    }

    if let Some(preview) = ctx.preview {
        draw_preview(surface, ctx, transform, preview);
    }

    draw_handles(surface, ctx, transform);

    hit_boxes
}

fn stroke_color(ctx: &RenderContext<'_>, color: SerializableColor, selected: bool) -> Color {
    if selected {
        ctx.config.selection_color.into()
    } else {
        color.into()
    }
}

fn draw_grid<S: Surface + ?Sized>(surface: &mut S, ctx: &RenderContext<'_>, transform: Affine) {
    let grid = ctx.config.grid_size;
    if grid <= 0.0 || ctx.size.is_zero_area() {
        return;
    }
    let top_left = ctx.viewport.to_canvas(Point::ZERO);
    let bottom_right = ctx.viewport.to_canvas(Point::new(ctx.size.width, ctx.size.height));
    let bounds = Rect::new(
        (top_left.x / grid).floor() * grid,
        (top_left.y / grid).floor() * grid,
        (bottom_right.x / grid).ceil() * grid,
        (bottom_right.y / grid).ceil() * grid,
    );

    let spacing = grid * ctx.viewport.scale;
    let (Some(columns), Some(rows)) = (
        line_count(bounds.width(), grid, ctx.size.width / spacing),
        line_count(bounds.height(), grid, ctx.size.height / spacing),
    ) else {
        log::debug!("Skipping grid for viewport offset {:?}", ctx.viewport.offset);
        return;
    };

    let mut path = BezPath::new();
    for i in 0..=columns {
        let x = bounds.x0 + i as f64 * grid;
        path.move_to((x, bounds.y0));
        path.line_to((x, bounds.y1));
    }
    for i in 0..=rows {
        let y = bounds.y0 + i as f64 * grid;
        path.move_to((bounds.x0, y));
        path.line_to((bounds.x1, y));
    }
    surface.stroke(&path, transform, GRID_COLOR.into(), 0.5 / ctx.viewport.scale);
}

/// Number of grid steps spanning `extent`, or `None` when float precision at
/// the current offset makes the span meaningless.
fn line_count(extent: f64, grid: f64, visible: f64) -> Option<u32> {
    let steps = (extent / grid).round();
    let cap = visible.ceil() + 2.0;
    (steps.is_finite() && steps >= 0.0 && steps <= cap).then_some(steps as u32)
}

fn draw_label<S: Surface + ?Sized>(
    surface: &mut S,
    ctx: &RenderContext<'_>,
    transform: Affine,
    label: &Label,
    selected: bool,
) -> Rect {
    let text_width = surface
        .measure_text(&label.text, label.font_size)
        .unwrap_or_else(|| label.estimated_text_width());
    let bg = label.background_box(text_width);
    let path = RoundedRect::from_rect(bg, LABEL_CORNER_RADIUS).to_path(PATH_TOLERANCE);

    // Fill alpha: 0.25 selected, 0.18 view, 0.10 edit
    let alpha = match (selected, ctx.mode) {
        (true, _) => 64,
        (false, EditorMode::View) => 46,
        (false, EditorMode::Edit) => 26,
    };
    surface.fill(&path, transform, label.color.with_alpha(alpha).into());
    surface.stroke(&path, transform, label.color.into(), if selected { 2.0 } else { 1.0 });
    surface.fill_text(&label.text, label.anchor(), label.font_size, label.color.into(), transform);

    bg
}

fn draw_preview<S: Surface + ?Sized>(
    surface: &mut S,
    ctx: &RenderContext<'_>,
    transform: Affine,
    preview: Preview,
) {
    let path = match preview.tool {
        ToolKind::Line => {
            let mut path = BezPath::new();
            path.move_to(preview.start);
            path.line_to(preview.current);
            path
        }
        ToolKind::Rect => Rect::from_points(preview.start, preview.current).to_path(PATH_TOLERANCE),
        ToolKind::None | ToolKind::Label => return,
    };
    let color = ctx.config.stroke_color.with_alpha(128);
    surface.stroke(&path, transform, color.into(), ctx.config.stroke_width);
}

fn draw_handles<S: Surface + ?Sized>(surface: &mut S, ctx: &RenderContext<'_>, transform: Affine) {
    if ctx.mode != EditorMode::Edit {
        return;
    }
    let Some(element) = ctx
        .selection
        .and_then(|id| ctx.elements.iter().find(|el| el.id() == id))
    else {
        return;
    };

    let scale = ctx.viewport.scale;
    let radius = ctx.config.handle_radius / scale;
    for handle in get_handles(element) {
        let path = Circle::new(handle.position, radius).to_path(PATH_TOLERANCE);
        surface.fill(&path, transform, SerializableColor::white().into());
        surface.stroke(&path, transform, ctx.config.selection_color.into(), 2.0 / scale);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Line, Rectangle};
    use kurbo::Vec2;

    fn strokes(list: &DisplayList) -> Vec<&DrawCommand> {
        list.commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Stroke { .. }))
            .collect()
    }

    #[test]
    fn test_empty_scene_draws_background_and_grid() {
        let config = EditorConfig::default();
        let viewport = Viewport::new();
        let mut list = DisplayList::new();
        let ctx = RenderContext::new(&[], &viewport, Size::new(100.0, 100.0), &config);
        let boxes = render_scene(&mut list, &ctx);

        assert!(boxes.is_empty());
        assert!(matches!(list.commands()[0], DrawCommand::Clear { .. }));
        let grid = strokes(&list);
        assert_eq!(grid.len(), 1);
        let DrawCommand::Stroke { width, .. } = grid[0] else {
            unreachable!()
        };
        assert!((width - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_grid_width_is_hairline_at_any_zoom() {
        let config = EditorConfig::default();
        let mut viewport = Viewport::new();
        viewport.apply_zoom(Point::ZERO, 2.0);
        let mut list = DisplayList::new();
        let ctx = RenderContext::new(&[], &viewport, Size::new(100.0, 100.0), &config);
        render_scene(&mut list, &ctx);
        let DrawCommand::Stroke { width, transform, .. } = strokes(&list)[0] else {
            unreachable!()
        };
        assert!((width - 0.25).abs() < f64::EPSILON);
        assert_eq!(*transform, viewport.transform());
    }

    #[test]
    fn test_grid_bounded_at_extreme_offset() {
        let config = EditorConfig::default();
        let mut viewport = Viewport::new();
        viewport.offset = Vec2::new(1e18, -3e17);
        let mut list = DisplayList::new();
        let ctx = RenderContext::new(&[], &viewport, Size::new(800.0, 600.0), &config);
        render_scene(&mut list, &ctx);

        for command in strokes(&list) {
            let DrawCommand::Stroke { path, .. } = command else {
                unreachable!()
            };
            assert!(path.elements().len() <= 2 * (20 + 15 + 6));
        }
    }

    #[test]
    fn test_grid_line_count_follows_zoom() {
        let config = EditorConfig::default();
        let mut viewport = Viewport::new();
        viewport.apply_zoom(Point::ZERO, 0.2);
        let mut list = DisplayList::new();
        let ctx = RenderContext::new(&[], &viewport, Size::new(100.0, 100.0), &config);
        render_scene(&mut list, &ctx);
        let DrawCommand::Stroke { path, .. } = strokes(&list)[0] else {
            unreachable!()
        };
        // 500 canvas units per axis: 11 vertical and 11 horizontal lines
        assert_eq!(path.elements().len(), 2 * 22);
    }

    #[test]
    fn test_selected_element_uses_selection_color() {
        let config = EditorConfig::default();
        let viewport = Viewport::new();
        let line = Element::from(Line::new(Point::ZERO, Point::new(10.0, 0.0)));
        let id = line.id().clone();
        let elements = vec![line];
        let mut list = DisplayList::new();
        let ctx = RenderContext::new(&elements, &viewport, Size::new(10.0, 10.0), &config)
            .with_selection(Some(&id));
        render_scene(&mut list, &ctx);

        let DrawCommand::Stroke { color, .. } = strokes(&list)[1] else {
            unreachable!()
        };
        assert_eq!(*color, config.selection_color);
    }

    #[test]
    fn test_label_hit_box_uses_measured_width() {
        let config = EditorConfig::default();
        let viewport = Viewport::new();
        let label = Label::new(Point::new(100.0, 50.0), "ab");
        let id = label.id.clone();
        let elements = vec![Element::from(label)];

        let mut measured = DisplayList::new().with_char_advance(1.0);
        let boxes = render_scene(
            &mut measured,
            &RenderContext::new(&elements, &viewport, Size::new(10.0, 10.0), &config),
        );
        // 2 chars × 14 = 28 wide text
        assert_eq!(boxes.get(&id), Some(Rect::new(92.0, 30.0, 136.0, 60.0)));
        assert_eq!(measured.texts(), vec!["ab"]);

        let mut estimated = DisplayList::new();
        let boxes = render_scene(
            &mut estimated,
            &RenderContext::new(&elements, &viewport, Size::new(10.0, 10.0), &config),
        );
        let rect = boxes.get(&id).unwrap();
        assert!((rect.width() - (2.0 * 14.0 * 0.6 + 16.0)).abs() < 1e-9);
    }

    #[test]
    fn test_handles_only_in_edit_mode() {
        let config = EditorConfig::default();
        let viewport = Viewport::new();
        let rect = Element::from(Rectangle::new(Point::ZERO, 10.0, 10.0));
        let id = rect.id().clone();
        let elements = vec![rect];
        let size = Size::new(10.0, 10.0);

        let mut view = DisplayList::new();
        render_scene(
            &mut view,
            &RenderContext::new(&elements, &viewport, size, &config).with_selection(Some(&id)),
        );
        let mut edit = DisplayList::new();
        render_scene(
            &mut edit,
            &RenderContext::new(&elements, &viewport, size, &config)
                .with_selection(Some(&id))
                .with_mode(EditorMode::Edit),
        );
        // Four handles, each one fill and one stroke
        assert_eq!(edit.commands().len(), view.commands().len() + 8);
    }

    #[test]
    fn test_preview_drawn_translucent() {
        let config = EditorConfig::default();
        let mut viewport = Viewport::new();
        viewport.pan(Vec2::new(5.0, 5.0));
        let preview = Preview {
            tool: ToolKind::Rect,
            start: Point::new(10.0, 10.0),
            current: Point::new(0.0, 0.0),
        };
        let mut list = DisplayList::new();
        render_scene(
            &mut list,
            &RenderContext::new(&[], &viewport, Size::new(10.0, 10.0), &config)
                .with_preview(Some(preview)),
        );
        let DrawCommand::Stroke { color, .. } = strokes(&list).last().copied().unwrap() else {
            unreachable!()
        };
        assert_eq!(color.a, 128);
    }

    #[test]
    fn test_frames_counted() {
        let config = EditorConfig::default();
        let viewport = Viewport::new();
        let mut list = DisplayList::new();
        let ctx = RenderContext::new(&[], &viewport, Size::new(10.0, 10.0), &config);
        render_scene(&mut list, &ctx);
        render_scene(&mut list, &ctx);
        assert_eq!(list.frames(), 2);
    }
}
