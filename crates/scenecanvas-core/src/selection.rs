//! Selection handles, hit-testing and resize application.

use crate::elements::{Element, ElementId, Label, Rectangle};
use crate::geometry::rect_contains;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Drawn handle radius in screen pixels.
pub const HANDLE_RADIUS: f64 = 8.0;
/// Handle hit radius in screen pixels.
pub const HANDLE_HIT_RADIUS: f64 = 16.0;
/// Element body hit threshold in screen pixels.
pub const ELEMENT_HIT_THRESHOLD: f64 = 10.0;

/// Corner positions of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Corner {
    Nw,
    Ne,
    Sw,
    Se,
}

impl Corner {
    pub const ALL: [Corner; 4] = [Corner::Nw, Corner::Ne, Corner::Sw, Corner::Se];

    /// The diagonally opposite corner.
    pub fn opposite(self) -> Corner {
        match self {
            Corner::Nw => Corner::Se,
            Corner::Ne => Corner::Sw,
            Corner::Sw => Corner::Ne,
            Corner::Se => Corner::Nw,
        }
    }

    /// Position of this corner on a rectangle.
    pub fn of(self, rect: &Rectangle) -> Point {
        let r = rect.as_rect();
        match self {
            Corner::Nw => Point::new(r.x0, r.y0),
            Corner::Ne => Point::new(r.x1, r.y0),
            Corner::Sw => Point::new(r.x0, r.y1),
            Corner::Se => Point::new(r.x1, r.y1),
        }
    }
}

/// Type of selection handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleKind {
    /// Corner handle for rectangles.
    Corner(Corner),
    /// First endpoint of a line.
    Start,
    /// Second endpoint of a line.
    End,
}

/// A selection handle with its position and type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    /// Position in canvas coordinates.
    pub position: Point,
    /// Handle type.
    pub kind: HandleKind,
}

impl Handle {
    /// Create a new handle.
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    /// Check if a canvas point hits this handle.
    /// `radius` should already be divided by the viewport scale.
    pub fn hit_test(&self, point: Point, radius: f64) -> bool {
        let dx = point.x - self.position.x;
        let dy = point.y - self.position.y;
        dx * dx + dy * dy <= radius * radius
    }
}

/// Get the selection handles for an element.
///
/// Rectangles expose their four corners, lines their two endpoints and
/// labels nothing (they can only be moved).
pub fn get_handles(element: &Element) -> Vec<Handle> {
    match element {
        Element::Rect(rect) => Corner::ALL
            .iter()
            .map(|&corner| Handle::new(corner.of(rect), HandleKind::Corner(corner)))
            .collect(),
        Element::Line(line) => vec![
            Handle::new(line.start(), HandleKind::Start),
            Handle::new(line.end(), HandleKind::End),
        ],
        Element::Label(_) => Vec::new(),
    }
}

/// First handle of `element` within `radius` of `point`.
pub fn hit_test_handles(element: &Element, point: Point, radius: f64) -> Option<Handle> {
    get_handles(element)
        .into_iter()
        .find(|handle| handle.hit_test(point, radius))
}

/// The corner that stays put while `handle` is dragged, for rectangles.
pub fn fixed_corner(element: &Element, handle: HandleKind) -> Option<Point> {
    match (element, handle) {
        (Element::Rect(rect), HandleKind::Corner(corner)) => Some(corner.opposite().of(rect)),
        _ => None,
    }
}

/// Apply a handle drag to `element`.
///
/// Rectangles are re-spanned between `fixed` and `point` (so dragging past
/// the opposite corner flips cleanly); lines move the grabbed endpoint only.
pub fn apply_resize(element: &mut Element, handle: HandleKind, point: Point, fixed: Option<Point>) {
    match (element, handle) {
        (Element::Rect(rect), HandleKind::Corner(_)) => {
            if let Some(fixed) = fixed {
                rect.span(fixed, point);
            }
        }
        (Element::Line(line), HandleKind::Start) => line.set_start(point),
        (Element::Line(line), HandleKind::End) => line.set_end(point),
        _ => {}
    }
}

/// Last-rendered label boxes, keyed by element id.
///
/// Derived data: rebuilt on every render and never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HitBoxes {
    boxes: HashMap<ElementId, Rect>,
}

impl HitBoxes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &ElementId) -> Option<Rect> {
        self.boxes.get(id).copied()
    }

    pub fn insert(&mut self, id: ElementId, rect: Rect) {
        self.boxes.insert(id, rect);
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

/// Whether `point` hits the body of `element`.
///
/// Labels prefer their last-rendered box; everything else uses the element's
/// own geometry with `tolerance` canvas units of slack.
pub fn element_contains(element: &Element, point: Point, tolerance: f64, hit_boxes: &HitBoxes) -> bool {
    match element {
        Element::Label(label) => match hit_boxes.get(&label.id) {
            Some(rect) => rect_contains(rect, point),
            None => element.hit_test(point, tolerance),
        },
        _ => element.hit_test(point, tolerance),
    }
}

/// Topmost element whose body contains `point` (later elements win).
pub fn hit_test_element<'a>(
    elements: &'a [Element],
    point: Point,
    tolerance: f64,
    hit_boxes: &HitBoxes,
) -> Option<&'a Element> {
    elements
        .iter()
        .rev()
        .find(|element| element_contains(element, point, tolerance, hit_boxes))
}

/// Topmost label with a rendered box containing `point`.
pub fn hit_test_label<'a>(elements: &'a [Element], point: Point, hit_boxes: &HitBoxes) -> Option<&'a Label> {
    elements.iter().rev().filter_map(Element::as_label).find(|label| {
        hit_boxes
            .get(&label.id)
            .is_some_and(|rect| rect_contains(rect, point))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::Line;

    #[test]
    fn test_line_handles() {
        let line = Element::from(Line::new(Point::new(0.0, 0.0), Point::new(100.0, 100.0)));
        let handles = get_handles(&line);
        assert_eq!(handles.len(), 2);
        assert_eq!(handles[0].kind, HandleKind::Start);
        assert_eq!(handles[1].position, Point::new(100.0, 100.0));
    }

    #[test]
    fn test_rectangle_handles() {
        let rect = Element::from(Rectangle::new(Point::new(10.0, 20.0), 100.0, 50.0));
        let handles = get_handles(&rect);
        assert_eq!(handles.len(), 4);
        let se = handles
            .iter()
            .find(|h| h.kind == HandleKind::Corner(Corner::Se))
            .unwrap();
        assert_eq!(se.position, Point::new(110.0, 70.0));
    }

    #[test]
    fn test_label_has_no_handles() {
        let label = Element::from(Label::new(Point::ZERO, "Shelf"));
        assert!(get_handles(&label).is_empty());
        assert!(hit_test_handles(&label, Point::ZERO, 100.0).is_none());
    }

    #[test]
    fn test_handle_hit_test() {
        let handle = Handle::new(Point::new(50.0, 50.0), HandleKind::Start);
        assert!(handle.hit_test(Point::new(50.0, 50.0), 5.0));
        assert!(handle.hit_test(Point::new(53.0, 54.0), 5.0));
        assert!(!handle.hit_test(Point::new(60.0, 60.0), 5.0));
    }

    #[test]
    fn test_fixed_corner_is_opposite() {
        let rect = Element::from(Rectangle::new(Point::new(10.0, 10.0), 100.0, 50.0));
        assert_eq!(
            fixed_corner(&rect, HandleKind::Corner(Corner::Se)),
            Some(Point::new(10.0, 10.0))
        );
        assert_eq!(
            fixed_corner(&rect, HandleKind::Corner(Corner::Ne)),
            Some(Point::new(10.0, 60.0))
        );
    }

    #[test]
    fn test_resize_se_past_nw_flips() {
        let mut element = Element::from(Rectangle::new(Point::new(10.0, 10.0), 100.0, 50.0));
        let handle = HandleKind::Corner(Corner::Se);
        let fixed = fixed_corner(&element, handle);
        apply_resize(&mut element, handle, Point::new(0.0, 0.0), fixed);
        let Element::Rect(rect) = &element else {
            panic!("expected rect");
        };
        assert_eq!(rect.origin(), Point::new(0.0, 0.0));
        assert!((rect.width - 10.0).abs() < f64::EPSILON);
        assert!((rect.height - 10.0).abs() < f64::EPSILON);
        assert_eq!(Corner::Se.of(rect), Point::new(10.0, 10.0));
    }

    #[test]
    fn test_resize_line_endpoint() {
        let mut element = Element::from(Line::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0)));
        apply_resize(&mut element, HandleKind::Start, Point::new(-5.0, 5.0), None);
        let Element::Line(line) = &element else {
            panic!("expected line");
        };
        assert_eq!(line.start(), Point::new(-5.0, 5.0));
        assert_eq!(line.end(), Point::new(10.0, 0.0));
    }

    #[test]
    fn test_topmost_wins() {
        let a = Element::from(Rectangle::new(Point::new(0.0, 0.0), 100.0, 100.0));
        let b = Element::from(Rectangle::new(Point::new(50.0, 50.0), 100.0, 100.0));
        let b_id = b.id().clone();
        let a_id = a.id().clone();
        let elements = vec![a, b];
        let boxes = HitBoxes::new();

        let hit = hit_test_element(&elements, Point::new(75.0, 75.0), 0.0, &boxes).unwrap();
        assert_eq!(hit.id(), &b_id);
        let hit = hit_test_element(&elements, Point::new(25.0, 25.0), 0.0, &boxes).unwrap();
        assert_eq!(hit.id(), &a_id);
        assert!(hit_test_element(&elements, Point::new(300.0, 300.0), 10.0, &boxes).is_none());
    }

    #[test]
    fn test_label_prefers_rendered_box() {
        let label = Label::new(Point::new(0.0, 0.0), "ab");
        let id = label.id.clone();
        let elements = vec![Element::from(label)];
        let mut boxes = HitBoxes::new();

        // Far right of the approximate box: no hit
        assert!(hit_test_element(&elements, Point::new(200.0, 0.0), 0.0, &boxes).is_none());
        assert!(hit_test_label(&elements, Point::new(0.0, 0.0), &boxes).is_none());

        boxes.insert(id.clone(), Rect::new(-8.0, -20.0, 220.0, 10.0));
        assert!(hit_test_element(&elements, Point::new(200.0, 0.0), 0.0, &boxes).is_some());
        assert_eq!(
            hit_test_label(&elements, Point::new(200.0, 0.0), &boxes).map(|l| &l.id),
            Some(&id)
        );
    }
}
