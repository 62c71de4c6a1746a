//! Vello implementation of the drawing surface.

use crate::renderer::{RenderResult, RendererError};
use kurbo::{Affine, BezPath, Point, Rect, Size, Stroke};
use parley::layout::{Layout, PositionedLayoutItem};
use parley::{FontContext, LayoutContext, StyleProperty};
use peniko::{Brush, Color, Fill};
use scenecanvas_core::Surface;
use vello::Scene;

/// A `Surface` that records drawing into a Vello scene.
///
/// Text is shaped with Parley. Fonts must be registered by the host with
/// [`VelloSurface::register_font`]; until one is, text measurement reports
/// no metrics and labels fall back to the estimated width.
pub struct VelloSurface {
    scene: Scene,
    font_cx: FontContext,
    layout_cx: LayoutContext<Brush>,
    size: Size,
}

impl Default for VelloSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl VelloSurface {
    pub fn new() -> Self {
        Self {
            scene: Scene::new(),
            font_cx: FontContext::new(),
            layout_cx: LayoutContext::new(),
            size: Size::ZERO,
        }
    }

    /// Register font data, returning the number of families it added.
    pub fn register_font(&mut self, data: Vec<u8>) -> RenderResult<usize> {
        if data.is_empty() {
            return Err(RendererError::Font("empty font data".to_string()));
        }
        let families = self
            .font_cx
            .collection
            .register_fonts(vello::peniko::Blob::new(std::sync::Arc::new(data)), None);
        if families.is_empty() {
            return Err(RendererError::Font("no font families found".to_string()));
        }
        log::debug!("Registered {} font families", families.len());
        Ok(families.len())
    }

    /// The recorded scene.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Take ownership of the scene (resets internal scene).
    pub fn take_scene(&mut self) -> Scene {
        std::mem::take(&mut self.scene)
    }

    /// Size of the last cleared frame.
    pub fn size(&self) -> Size {
        self.size
    }

    fn layout(&mut self, text: &str, font_size: f64, color: Color) -> Layout<Brush> {
        let brush = Brush::Solid(color);
        let mut builder = self.layout_cx.ranged_builder(&mut self.font_cx, text, 1.0, false);
        builder.push_default(StyleProperty::FontSize(font_size as f32));
        builder.push_default(StyleProperty::Brush(brush));
        let mut layout = builder.build(text);
        layout.break_all_lines(None);
        layout.align(None, parley::Alignment::Start, parley::AlignmentOptions::default());
        layout
    }
}

fn has_glyphs(layout: &Layout<Brush>) -> bool {
    layout.lines().any(|line| {
        line.items()
            .any(|item| matches!(item, PositionedLayoutItem::GlyphRun(run) if run.glyphs().next().is_some()))
    })
}

impl Surface for VelloSurface {
    fn clear(&mut self, size: Size, color: Color) {
        self.scene.reset();
        self.size = size;
        let rect = Rect::from_origin_size(Point::ORIGIN, size);
        self.scene.fill(Fill::NonZero, Affine::IDENTITY, color, None, &rect);
    }

    fn stroke(&mut self, path: &BezPath, transform: Affine, color: Color, width: f64) {
        self.scene
            .stroke(&Stroke::new(width), transform, color, None, path);
    }

    fn fill(&mut self, path: &BezPath, transform: Affine, color: Color) {
        self.scene.fill(Fill::NonZero, transform, color, None, path);
    }

    fn fill_text(&mut self, text: &str, origin: Point, font_size: f64, color: Color, transform: Affine) {
        if text.is_empty() {
            return;
        }
        let layout = self.layout(text, font_size, color);
        let brush = Brush::Solid(color);

        // Parley puts y=0 at the top of the layout; shift so the first
        // baseline lands on `origin`.
        let first_baseline = layout
            .lines()
            .next()
            .map(|line| line.metrics().baseline as f64)
            .unwrap_or(0.0);
        let text_transform =
            transform * Affine::translate((origin.x, origin.y - first_baseline));

        let mut drawn = 0usize;
        for line in layout.lines() {
            for item in line.items() {
                let PositionedLayoutItem::GlyphRun(glyph_run) = item else {
                    continue;
                };
                let mut x = glyph_run.offset();
                let y = glyph_run.baseline();
                let run = glyph_run.run();
                let synthesis = run.synthesis();
                let glyph_xform = synthesis
                    .skew()
                    .map(|angle| Affine::skew(angle.to_radians().tan() as f64, 0.0));

                let glyphs: Vec<vello::Glyph> = glyph_run
                    .glyphs()
                    .map(|glyph| {
                        let gx = x + glyph.x;
                        let gy = y - glyph.y;
                        x += glyph.advance;
                        vello::Glyph { id: glyph.id, x: gx, y: gy }
                    })
                    .collect();

                if glyphs.is_empty() {
                    continue;
                }
                drawn += glyphs.len();
                self.scene
                    .draw_glyphs(run.font())
                    .brush(&brush)
                    .hint(true)
                    .transform(text_transform)
                    .glyph_transform(glyph_xform)
                    .font_size(run.font_size())
                    .normalized_coords(run.normalized_coords())
                    .draw(Fill::NonZero, glyphs.into_iter());
            }
        }

        if drawn == 0 {
            log::trace!("No glyphs shaped for {:?}; is a font registered?", text);
        }
    }

    fn measure_text(&mut self, text: &str, font_size: f64) -> Option<f64> {
        if text.is_empty() {
            return Some(0.0);
        }
        let layout = self.layout(text, font_size, Color::BLACK);
        has_glyphs(&layout).then(|| layout.width() as f64)
    }
}
