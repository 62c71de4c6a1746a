//! Touch input events delivered by the host.

use kurbo::Point;
use std::time::Duration;

// Use web_time for WASM compatibility
#[cfg(target_arch = "wasm32")]
pub use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
pub use std::time::Instant;

/// One pointer event in screen coordinates.
///
/// `touches` lists every contact still on the surface; `changed` lists the
/// contacts that triggered this event (for an end event, the lifted ones).
#[derive(Debug, Clone, PartialEq)]
pub struct TouchEvent {
    pub touches: Vec<Point>,
    pub changed: Vec<Point>,
    pub timestamp: Instant,
}

impl TouchEvent {
    /// Event with the given active contacts, stamped now.
    pub fn new(touches: Vec<Point>) -> Self {
        Self::at(touches, Instant::now())
    }

    /// Event with the given active contacts and timestamp.
    pub fn at(touches: Vec<Point>, timestamp: Instant) -> Self {
        Self {
            touches,
            changed: Vec::new(),
            timestamp,
        }
    }

    /// Single-contact event.
    pub fn single(point: Point, timestamp: Instant) -> Self {
        Self::at(vec![point], timestamp)
    }

    /// End event for a lifted contact: no remaining touches, one changed.
    pub fn lifted(point: Point, timestamp: Instant) -> Self {
        Self {
            touches: Vec::new(),
            changed: vec![point],
            timestamp,
        }
    }

    /// Attach the changed contacts.
    pub fn with_changed(mut self, changed: Vec<Point>) -> Self {
        self.changed = changed;
        self
    }

    pub fn contact_count(&self) -> usize {
        self.touches.len()
    }

    /// The first active contact.
    pub fn primary(&self) -> Option<Point> {
        self.touches.first().copied()
    }

    /// The first two active contacts, when at least two are present.
    pub fn pair(&self) -> Option<(Point, Point)> {
        match self.touches.as_slice() {
            [a, b, ..] => Some((*a, *b)),
            _ => None,
        }
    }

    /// Position of the released contact, if the host supplied one.
    pub fn released(&self) -> Option<Point> {
        self.changed.first().copied()
    }

    /// Time elapsed since `earlier`, zero if the clock went backwards.
    pub fn since(&self, earlier: Instant) -> Duration {
        self.timestamp.saturating_duration_since(earlier)
    }
}
