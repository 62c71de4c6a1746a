//! Rectangle element.

use super::{ElementId, ElementTrait, SerializableColor, ink_or_default};
use crate::geometry::normalize_corners;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

pub(crate) fn default_line_width() -> f64 {
    2.0
}

/// An axis-aligned rectangle outline, always stored with non-negative size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rectangle {
    #[serde(default = "ElementId::generate")]
    pub(crate) id: ElementId,
    /// Top-left corner.
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default = "SerializableColor::ink", deserialize_with = "ink_or_default")]
    pub color: SerializableColor,
    #[serde(default = "default_line_width")]
    pub line_width: f64,
}

impl Rectangle {
    /// Create a new rectangle; a negative size is normalized.
    pub fn new(origin: Point, width: f64, height: f64) -> Self {
        let mut rect = Self {
            id: ElementId::generate(),
            x: origin.x,
            y: origin.y,
            width,
            height,
            color: SerializableColor::ink(),
            line_width: default_line_width(),
        };
        rect.normalize();
        rect
    }

    /// Create a rectangle spanning two arbitrary corner points.
    pub fn from_corners(p1: Point, p2: Point) -> Self {
        let (origin, width, height) = normalize_corners(p1, p2);
        Self::new(origin, width, height)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Get the rectangle as a kurbo Rect.
    pub fn as_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// Re-span the rectangle between a fixed corner and a dragged point.
    pub fn span(&mut self, fixed: Point, point: Point) {
        let (origin, width, height) = normalize_corners(fixed, point);
        self.x = origin.x;
        self.y = origin.y;
        self.width = width;
        self.height = height;
    }

    /// Fold a negative width/height back into the origin.
    pub fn normalize(&mut self) {
        if self.width < 0.0 {
            self.x += self.width;
            self.width = -self.width;
        }
        if self.height < 0.0 {
            self.y += self.height;
            self.height = -self.height;
        }
    }
}

impl ElementTrait for Rectangle {
    fn id(&self) -> &ElementId {
        &self.id
    }

    fn bounds(&self) -> Rect {
        self.as_rect()
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        // Border and interior both count
        let r = self.as_rect();
        point.x >= r.x0 - tolerance
            && point.x <= r.x1 + tolerance
            && point.y >= r.y0 - tolerance
            && point.y <= r.y1 + tolerance
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
    fn test_rectangle_creation() {
        let rect = Rectangle::new(Point::new(10.0, 20.0), 100.0, 50.0);
        assert!((rect.x - 10.0).abs() < f64::EPSILON);
        assert!((rect.y - 20.0).abs() < f64::EPSILON);
        assert!((rect.width - 100.0).abs() < f64::EPSILON);
        assert!((rect.height - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rectangle_from_corners() {
        let rect = Rectangle::from_corners(Point::new(100.0, 100.0), Point::new(50.0, 50.0));
        assert_eq!(rect.origin(), Point::new(50.0, 50.0));
        assert!((rect.width - 50.0).abs() < f64::EPSILON);
        assert!((rect.height - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_negative_size_normalized() {
        let rect = Rectangle::new(Point::new(100.0, 100.0), -30.0, -40.0);
        assert_eq!(rect.origin(), Point::new(70.0, 60.0));
        assert!((rect.width - 30.0).abs() < f64::EPSILON);
        assert!((rect.height - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_test() {
        let rect = Rectangle::new(Point::new(0.0, 0.0), 100.0, 100.0);
        assert!(rect.hit_test(Point::new(50.0, 50.0), 0.0));
        assert!(!rect.hit_test(Point::new(150.0, 50.0), 0.0));
        assert!(rect.hit_test(Point::new(105.0, 50.0), 10.0));
        assert!(!rect.hit_test(Point::new(50.0, -10.5), 10.0));
    }

    #[test]
    fn test_span_any_direction() {
        let mut rect = Rectangle::new(Point::new(0.0, 0.0), 10.0, 10.0);
        rect.span(Point::new(20.0, 20.0), Point::new(5.0, 30.0));
        assert_eq!(rect.origin(), Point::new(5.0, 20.0));
        assert!((rect.width - 15.0).abs() < f64::EPSILON);
        assert!((rect.height - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bounds() {
        let rect = Rectangle::new(Point::new(10.0, 20.0), 100.0, 50.0);
        assert_eq!(rect.bounds(), Rect::new(10.0, 20.0, 110.0, 70.0));
    }
}
