//! Line element.

use super::rectangle::default_line_width;
use super::{ElementId, ElementTrait, SerializableColor, ink_or_default};
use crate::geometry::{distance, point_to_segment_dist};
use kurbo::{Line as KurboLine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// A straight line segment between two canvas points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    #[serde(default = "ElementId::generate")]
    pub(crate) id: ElementId,
    #[serde(default)]
    pub x1: f64,
    #[serde(default)]
    pub y1: f64,
    #[serde(default)]
    pub x2: f64,
    #[serde(default)]
    pub y2: f64,
    #[serde(default = "SerializableColor::ink", deserialize_with = "ink_or_default")]
    pub color: SerializableColor,
    #[serde(default = "default_line_width")]
    pub line_width: f64,
}

impl Line {
    /// Create a new line.
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            id: ElementId::generate(),
            x1: start.x,
            y1: start.y,
            x2: end.x,
            y2: end.y,
            color: SerializableColor::ink(),
            line_width: default_line_width(),
        }
    }

    pub fn start(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    pub fn end(&self) -> Point {
        Point::new(self.x2, self.y2)
    }

    pub fn set_start(&mut self, point: Point) {
        self.x1 = point.x;
        self.y1 = point.y;
    }

    pub fn set_end(&mut self, point: Point) {
        self.x2 = point.x;
        self.y2 = point.y;
    }

    /// Get the length of the line.
    pub fn length(&self) -> f64 {
        distance(self.start(), self.end())
    }

    /// Get as a kurbo Line.
    pub fn as_kurbo(&self) -> KurboLine {
        KurboLine::new(self.start(), self.end())
    }
}

impl ElementTrait for Line {
    fn id(&self) -> &ElementId {
        &self.id
    }

    fn bounds(&self) -> Rect {
        Rect::from_points(self.start(), self.end())
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        point_to_segment_dist(point, self.start(), self.end()) < tolerance
    }

    fn translate(&mut self, delta: Vec2) {
        self.set_start(self.start() + delta);
        self.set_end(self.end() + delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_creation() {
        let line = Line::new(Point::new(0.0, 0.0), Point::new(100.0, 100.0));
        assert_eq!(line.start(), Point::new(0.0, 0.0));
        assert_eq!(line.end(), Point::new(100.0, 100.0));
        assert!((line.length() - 100.0 * 2.0_f64.sqrt()).abs() < 1e-10);
    }

    #[test]
    fn test_hit_test() {
        let line = Line::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        assert!(line.hit_test(Point::new(50.0, 0.0), 1.0));
        assert!(line.hit_test(Point::new(50.0, 9.9), 10.0));
        assert!(!line.hit_test(Point::new(50.0, 10.0), 10.0));
        assert!(!line.hit_test(Point::new(120.0, 0.0), 10.0));
    }

    #[test]
    fn test_translate_moves_both_endpoints() {
        let mut line = Line::new(Point::new(0.0, 0.0), Point::new(10.0, 5.0));
        line.translate(Vec2::new(3.0, -2.0));
        assert_eq!(line.start(), Point::new(3.0, -2.0));
        assert_eq!(line.end(), Point::new(13.0, 3.0));
    }

    #[test]
    fn test_bounds_any_direction() {
        let line = Line::new(Point::new(50.0, 10.0), Point::new(0.0, 40.0));
        assert_eq!(line.bounds(), Rect::new(0.0, 10.0, 50.0, 40.0));
    }
}
