//! Text label element.

use super::{ElementId, ElementTrait, SerializableColor, accent_or_default};
use crate::geometry::rect_contains;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Padding between label text and its background box, in canvas units.
pub const LABEL_PADDING: f64 = 8.0;

/// Average glyph advance relative to font size, used when the surface
/// cannot measure text.
const RENDER_WIDTH_FACTOR: f64 = 0.6;
/// Wider estimate used for hit-testing before the label was ever rendered.
const HIT_WIDTH_FACTOR: f64 = 0.7;

fn default_font_size() -> f64 {
    14.0
}

/// A text tag anchored at its baseline origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    #[serde(default = "ElementId::generate")]
    pub(crate) id: ElementId,
    /// Anchor: left end of the text baseline.
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default = "SerializableColor::accent", deserialize_with = "accent_or_default")]
    pub color: SerializableColor,
}

impl Label {
    /// Create a new label with the default font size and color.
    pub fn new(anchor: Point, text: impl Into<String>) -> Self {
        Self {
            id: ElementId::generate(),
            x: anchor.x,
            y: anchor.y,
            text: text.into(),
            font_size: default_font_size(),
            color: SerializableColor::accent(),
        }
    }

    pub fn anchor(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Text width estimate from character count.
    pub fn estimated_text_width(&self) -> f64 {
        self.text.chars().count() as f64 * self.font_size * RENDER_WIDTH_FACTOR
    }

    /// Background box drawn around the text, given the measured text width.
    ///
    /// This is also the label's hit box once it has been rendered.
    pub fn background_box(&self, text_width: f64) -> Rect {
        let x0 = self.x - LABEL_PADDING;
        let y0 = self.y - self.font_size - LABEL_PADDING + 2.0;
        Rect::new(
            x0,
            y0,
            x0 + text_width + LABEL_PADDING * 2.0,
            y0 + self.font_size + LABEL_PADDING * 2.0,
        )
    }

    /// Hit box used when no rendered box is known yet.
    pub fn approximate_hit_box(&self) -> Rect {
        let width = self.text.chars().count() as f64 * self.font_size * HIT_WIDTH_FACTOR;
        Rect::new(
            self.x - LABEL_PADDING,
            self.y - self.font_size - LABEL_PADDING,
            self.x + width + LABEL_PADDING,
            self.y + LABEL_PADDING,
        )
    }
}

impl ElementTrait for Label {
    fn id(&self) -> &ElementId {
        &self.id
    }

    fn bounds(&self) -> Rect {
        self.approximate_hit_box()
    }

    fn hit_test(&self, point: Point, _tolerance: f64) -> bool {
        rect_contains(self.approximate_hit_box(), point)
    }

    fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_box() {
        let label = Label::new(Point::new(100.0, 50.0), "Shelf");
        let rect = label.background_box(40.0);
        assert_eq!(rect, Rect::new(92.0, 30.0, 148.0, 60.0));
    }

    #[test]
    fn test_estimated_width_counts_chars() {
        let label = Label::new(Point::ZERO, "衣柜");
        assert!((label.estimated_text_width() - 2.0 * 14.0 * 0.6).abs() < 1e-10);
    }

    #[test]
    fn test_approximate_hit_test() {
        let label = Label::new(Point::new(0.0, 0.0), "ab");
        // width = 2 * 14 * 0.7 = 19.6
        assert!(label.hit_test(Point::new(10.0, -5.0), 0.0));
        assert!(label.hit_test(Point::new(27.0, 8.0), 0.0));
        assert!(!label.hit_test(Point::new(28.0, 0.0), 0.0));
        assert!(!label.hit_test(Point::new(0.0, -23.0), 0.0));
    }

    #[test]
    fn test_translate() {
        let mut label = Label::new(Point::new(1.0, 1.0), "x");
        label.translate(Vec2::new(4.0, 5.0));
        assert_eq!(label.anchor(), Point::new(5.0, 6.0));
    }
}
