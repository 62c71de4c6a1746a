//! Pure geometry helpers shared by hit-testing and gestures.

use kurbo::{Point, Rect, Vec2};

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    (b - a).hypot()
}

/// Midpoint of the segment a→b.
pub fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

/// Distance from a point to a line segment (a→b), clamped to the segment.
///
/// A degenerate segment (a == b) falls back to the point distance.
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = Vec2::new(b.x - a.x, b.y - a.y);
    let pv = Vec2::new(point.x - a.x, point.y - a.y);
    let len_sq = seg.hypot2();
    if len_sq == 0.0 {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * seg.x, a.y + t * seg.y);
    distance(point, proj)
}

/// Closed containment test (edges included on every side, unlike
/// `Rect::contains`).
pub fn rect_contains(rect: Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

/// Normalize two arbitrary corner points into `(origin, width, height)`
/// with non-negative extent.
pub fn normalize_corners(p1: Point, p2: Point) -> (Point, f64, f64) {
    (
        Point::new(p1.x.min(p2.x), p1.y.min(p2.y)),
        (p2.x - p1.x).abs(),
        (p2.y - p1.y).abs(),
    )
}
