//! Versioned drawing document: the persisted form of a scene.

use crate::elements::{Element, ElementId};
use crate::viewport::Viewport;
use kurbo::Vec2;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;

/// Format version written by this crate.
pub const CURRENT_VERSION: u32 = 1;

/// Errors raised while reading or writing a document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Malformed document: {0}")]
    Malformed(String),
}

/// Persisted pan/zoom state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportSnapshot {
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale: f64,
}

impl Default for ViewportSnapshot {
    fn default() -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            scale: 1.0,
        }
    }
}

impl From<&Viewport> for ViewportSnapshot {
    fn from(viewport: &Viewport) -> Self {
        Self {
            offset_x: viewport.offset.x,
            offset_y: viewport.offset.y,
            scale: viewport.scale,
        }
    }
}

impl ViewportSnapshot {
    /// Apply onto a live viewport (the scale is clamped to its bounds).
    pub fn apply(&self, viewport: &mut Viewport) {
        viewport.set(Vec2::new(self.offset_x, self.offset_y), self.scale);
    }

    /// Read each field independently, defaulting whatever is missing.
    fn from_value(value: &Value) -> Self {
        let field = |key: &str, default: f64| {
            value
                .get(key)
                .and_then(Value::as_f64)
                .unwrap_or(default)
        };
        let defaults = Self::default();
        Self {
            offset_x: field("offsetX", defaults.offset_x),
            offset_y: field("offsetY", defaults.offset_y),
            scale: field("scale", defaults.scale),
        }
    }
}

/// A scene as saved and loaded: viewport plus ordered elements.
///
/// Render-time data (label hit boxes, selection) is never part of it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawingDocument {
    pub version: u32,
    pub viewport: ViewportSnapshot,
    pub elements: Vec<Element>,
}

impl Default for DrawingDocument {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            viewport: ViewportSnapshot::default(),
            elements: Vec::new(),
        }
    }
}

impl DrawingDocument {
    pub fn new(viewport: ViewportSnapshot, elements: Vec<Element>) -> Self {
        Self {
            version: CURRENT_VERSION,
            viewport,
            elements,
        }
    }

    /// Serialize the document to JSON.
    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize a document from JSON, tolerating partial content.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Build a document from a parsed JSON value.
    ///
    /// Missing fields default, elements that cannot be read are skipped,
    /// rectangles are normalized and duplicate identifiers are replaced.
    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        let mut map = match value {
            Value::Object(map) => map,
            other => {
                return Err(DocumentError::Malformed(format!(
                    "expected an object, found {}",
                    json_kind(&other)
                )));
            }
        };

        let version = match map.get("version").and_then(Value::as_u64) {
            Some(v) => u32::try_from(v).unwrap_or(u32::MAX),
            None => CURRENT_VERSION,
        };
        if version != CURRENT_VERSION {
            log::warn!("Reading document version {version} as version {CURRENT_VERSION}");
        }

        let viewport = map
            .get("viewport")
            .filter(|v| v.is_object())
            .map(ViewportSnapshot::from_value)
            .unwrap_or_default();

        let raw_elements = match map.remove("elements") {
            Some(Value::Array(items)) => items,
            Some(Value::Null) | None => Vec::new(),
            Some(other) => {
                log::warn!("Ignoring elements field of type {}", json_kind(&other));
                Vec::new()
            }
        };

        let elements = raw_elements
            .into_iter()
            .enumerate()
            .filter_map(|(index, raw)| match serde_json::from_value::<Element>(raw) {
                Ok(element) => Some(element),
                Err(e) => {
                    log::warn!("Skipping unreadable element #{index}: {e}");
                    None
                }
            })
            .collect();

        let mut document = Self {
            version: CURRENT_VERSION,
            viewport,
            elements,
        };
        document.sanitize();
        Ok(document)
    }

    /// Normalize rectangles and replace duplicate element identifiers.
    ///
    /// The first element carrying an identifier keeps it.
    pub fn sanitize(&mut self) {
        let mut seen: HashSet<ElementId> = HashSet::with_capacity(self.elements.len());
        for element in &mut self.elements {
            if let Element::Rect(rect) = element {
                rect.normalize();
            }
            if seen.contains(element.id()) {
                log::warn!("Duplicate element id {}, assigning a new one", element.id());
                element.regenerate_id();
            }
            seen.insert(element.id().clone());
        }
    }
}

impl<'de> Deserialize<'de> for DrawingDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(serde::de::Error::custom)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
