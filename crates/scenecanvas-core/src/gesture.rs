//! Gesture interaction state.
//!
//! Exactly one interaction is active at a time. Each variant carries only the
//! scratch data its own transitions need, so leaving a state drops that data.

use crate::config::EditorConfig;
use crate::elements::ElementId;
use crate::geometry::distance;
use crate::input::Instant;
use crate::selection::HandleKind;
use crate::tools::ToolKind;
use kurbo::Point;
use std::time::Duration;

/// The active gesture.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Interaction {
    /// No contact is being tracked.
    #[default]
    Idle,
    /// Dragging out a new line or rectangle (canvas coordinates).
    Drawing {
        tool: ToolKind,
        start: Point,
        current: Point,
    },
    /// Pressed on an element body; not yet a move.
    PotentialMove {
        element: ElementId,
        /// Screen position of the press.
        origin: Point,
    },
    /// Dragging an element.
    Moving {
        element: ElementId,
        /// Last screen position applied.
        last: Point,
    },
    /// Dragging a handle of the selected element.
    Resizing {
        element: ElementId,
        handle: HandleKind,
        /// Opposite corner for rectangles (canvas coordinates).
        fixed: Option<Point>,
    },
    /// Dragging the canvas; a short release here is a tap.
    Panning {
        /// Screen position of the press.
        origin: Point,
        /// When the press happened.
        started: Instant,
        /// Last screen position applied.
        last: Point,
    },
    /// Two-finger zoom.
    Pinching {
        /// Distance between the contacts at the last sample.
        distance: f64,
        /// Midpoint of the contacts at the last sample (screen).
        center: Point,
    },
}

impl Interaction {
    pub fn name(&self) -> &'static str {
        match self {
            Interaction::Idle => "idle",
            Interaction::Drawing { .. } => "drawing",
            Interaction::PotentialMove { .. } => "potential_move",
            Interaction::Moving { .. } => "moving",
            Interaction::Resizing { .. } => "resizing",
            Interaction::Panning { .. } => "panning",
            Interaction::Pinching { .. } => "pinching",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Interaction::Idle)
    }

    pub fn is_pinching(&self) -> bool {
        matches!(self, Interaction::Pinching { .. })
    }

    /// Start a pan at a screen position.
    pub fn panning(at: Point, started: Instant) -> Self {
        Interaction::Panning {
            origin: at,
            started,
            last: at,
        }
    }

    /// In-progress draw, if any.
    pub fn preview(&self) -> Option<Preview> {
        match *self {
            Interaction::Drawing {
                tool,
                start,
                current,
            } => Some(Preview {
                tool,
                start,
                current,
            }),
            _ => None,
        }
    }
}

/// Shape being dragged out, in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preview {
    pub tool: ToolKind,
    pub start: Point,
    pub current: Point,
}

impl Preview {
    /// Whether the drag is long enough to commit.
    pub fn is_committable(&self, min_distance: f64) -> bool {
        distance(self.start, self.current) > min_distance
    }
}

/// Whether a release counts as a tap.
///
/// Each axis must stay strictly inside `tap_distance` and the press must be
/// strictly shorter than the tap duration.
pub fn is_tap(origin: Point, release: Point, elapsed: Duration, config: &EditorConfig) -> bool {
    (release.x - origin.x).abs() < config.tap_distance
        && (release.y - origin.y).abs() < config.tap_distance
        && elapsed < config.tap_duration()
}

/// Whether a press on an element has travelled far enough to become a move.
pub fn exceeds_move_threshold(origin: Point, current: Point, config: &EditorConfig) -> bool {
    distance(origin, current) > config.move_threshold
}
