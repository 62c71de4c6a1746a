//! Viewport module for pan/zoom transforms.

use kurbo::{Affine, Point, Vec2};

/// Smallest allowed zoom factor.
pub const MIN_SCALE: f64 = 0.2;
/// Largest allowed zoom factor.
pub const MAX_SCALE: f64 = 5.0;

/// Viewport manages the view transform for the canvas.
///
/// It handles panning (translation in screen pixels) and zooming (scaling),
/// converting between screen coordinates and canvas coordinates with
/// `canvas = (screen - offset) / scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Current translation offset (pan) in screen pixels.
    pub offset: Vec2,
    /// Current zoom factor.
    pub scale: f64,
    /// Minimum allowed zoom factor.
    pub min_scale: f64,
    /// Maximum allowed zoom factor.
    pub max_scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: 1.0,
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
        }
    }
}

impl Viewport {
    /// Create a viewport with the identity transform.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an identity viewport with custom zoom bounds.
    pub fn with_bounds(min_scale: f64, max_scale: f64) -> Self {
        Self {
            min_scale,
            max_scale,
            ..Self::default()
        }
    }

    /// Get the affine transform for rendering (canvas → screen).
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }

    /// Convert a screen point to canvas coordinates.
    pub fn to_canvas(&self, screen_point: Point) -> Point {
        Point::new(
            (screen_point.x - self.offset.x) / self.scale,
            (screen_point.y - self.offset.y) / self.scale,
        )
    }

    /// Convert a canvas point to screen coordinates.
    pub fn to_screen(&self, canvas_point: Point) -> Point {
        Point::new(
            canvas_point.x * self.scale + self.offset.x,
            canvas_point.y * self.scale + self.offset.y,
        )
    }

    /// Convert a length in screen pixels to canvas units at the current zoom.
    pub fn screen_len(&self, pixels: f64) -> f64 {
        pixels / self.scale
    }

    /// Pan the viewport by a delta in screen coordinates.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Zoom by `ratio`, keeping the canvas point under `focal` fixed.
    ///
    /// The resulting scale is clamped to `[min_scale, max_scale]`; the offset
    /// is solved for the clamped scale so the focal point never drifts.
    pub fn apply_zoom(&mut self, focal: Point, ratio: f64) {
        if !ratio.is_finite() || ratio <= 0.0 {
            return;
        }
        let anchor = self.to_canvas(focal);
        self.scale = (self.scale * ratio).clamp(self.min_scale, self.max_scale);
        self.offset = Vec2::new(
            focal.x - anchor.x * self.scale,
            focal.y - anchor.y * self.scale,
        );
    }

    /// Replace offset and scale, clamping the scale into bounds.
    pub fn set(&mut self, offset: Vec2, scale: f64) {
        self.offset = offset;
        self.scale = if scale.is_finite() && scale > 0.0 {
            scale.clamp(self.min_scale, self.max_scale)
        } else {
            1.0_f64.clamp(self.min_scale, self.max_scale)
        };
    }
}
