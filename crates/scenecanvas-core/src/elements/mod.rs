//! Drawable element definitions for the scene canvas.

mod label;
mod line;
mod rectangle;

pub use label::{LABEL_PADDING, Label};
pub use line::Line;
pub use rectangle::Rectangle;

use kurbo::{Point, Rect, Vec2};
use peniko::Color;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

/// Serializable color, stored on the wire as a `#rrggbb` / `#rrggbbaa` hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Default stroke color for lines and rectangles (`#333333`).
    pub const fn ink() -> Self {
        Self::rgb(0x33, 0x33, 0x33)
    }

    /// Default label and selection color (`#07c160`).
    pub const fn accent() -> Self {
        Self::rgb(0x07, 0xc1, 0x60)
    }

    pub const fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    /// Same color with a different alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    /// Parse a `#rgb`, `#rrggbb` or `#rrggbbaa` string.
    pub fn from_hex(color: &str) -> Option<Self> {
        let hex = color.trim().strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let byte = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        match hex.len() {
            3 => {
                let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
                Some(Self::rgb(nibble(0)?, nibble(1)?, nibble(2)?))
            }
            6 => Some(Self::rgb(byte(0..2)?, byte(2..4)?, byte(4..6)?)),
            8 => Some(Self::new(byte(0..2)?, byte(2..4)?, byte(4..6)?, byte(6..8)?)),
            _ => None,
        }
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::new(rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

impl Serialize for SerializableColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for SerializableColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid color: {hex:?}")))
    }
}

/// Anything that is not a parseable hex string becomes `None`.
fn lenient_color<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<SerializableColor>, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_str().and_then(SerializableColor::from_hex))
}

pub(crate) fn ink_or_default<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<SerializableColor, D::Error> {
    Ok(lenient_color(deserializer)?.unwrap_or(SerializableColor::ink()))
}

pub(crate) fn accent_or_default<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<SerializableColor, D::Error> {
    Ok(lenient_color(deserializer)?.unwrap_or(SerializableColor::accent()))
}

/// Unique identifier for elements.
///
/// Generated identifiers are random UUIDs; imported documents may carry
/// arbitrary strings, which are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Generate a fresh, never-reused identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ElementId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Common trait for all elements.
pub trait ElementTrait {
    /// Get the unique identifier.
    fn id(&self) -> &ElementId;

    /// Get the geometric bounding box in canvas coordinates.
    fn bounds(&self) -> Rect;

    /// Check if a canvas point hits this element within `tolerance` canvas units.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool;

    /// Translate every coordinate field by a canvas-space delta.
    fn translate(&mut self, delta: Vec2);
}

/// Enum wrapper for all element types (the persisted record).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    Line(Line),
    Rect(Rectangle),
    Label(Label),
}

impl Element {
    pub fn id(&self) -> &ElementId {
        match self {
            Element::Line(e) => e.id(),
            Element::Rect(e) => e.id(),
            Element::Label(e) => e.id(),
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            Element::Line(e) => e.bounds(),
            Element::Rect(e) => e.bounds(),
            Element::Label(e) => e.bounds(),
        }
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        match self {
            Element::Line(e) => e.hit_test(point, tolerance),
            Element::Rect(e) => e.hit_test(point, tolerance),
            Element::Label(e) => e.hit_test(point, tolerance),
        }
    }

    pub fn translate(&mut self, delta: Vec2) {
        match self {
            Element::Line(e) => e.translate(delta),
            Element::Rect(e) => e.translate(delta),
            Element::Label(e) => e.translate(delta),
        }
    }

    /// Move by a screen-space delta at the given zoom factor.
    pub fn move_by_screen(&mut self, screen_delta: Vec2, scale: f64) {
        self.translate(screen_delta / scale);
    }

    /// Replace the identifier with a freshly generated one.
    pub fn regenerate_id(&mut self) {
        let new_id = ElementId::generate();
        match self {
            Element::Line(e) => e.id = new_id,
            Element::Rect(e) => e.id = new_id,
            Element::Label(e) => e.id = new_id,
        }
    }

    /// Human-readable kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Element::Line(_) => "line",
            Element::Rect(_) => "rect",
            Element::Label(_) => "label",
        }
    }

    pub fn as_label(&self) -> Option<&Label> {
        match self {
            Element::Label(label) => Some(label),
            _ => None,
        }
    }
}

impl From<Line> for Element {
    fn from(line: Line) -> Self {
        Element::Line(line)
    }
}

impl From<Rectangle> for Element {
    fn from(rect: Rectangle) -> Self {
        Element::Rect(rect)
    }
}

impl From<Label> for Element {
    fn from(label: Label) -> Self {
        Element::Label(label)
    }
}
