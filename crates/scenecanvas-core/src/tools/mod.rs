//! Creation tools and editor modes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Available creation tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    /// No tool armed: touches select, move and resize.
    #[default]
    None,
    Line,
    Rect,
    Label,
}

impl ToolKind {
    /// Whether this tool creates shapes by dragging.
    pub fn draws_shape(self) -> bool {
        matches!(self, ToolKind::Line | ToolKind::Rect)
    }

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::None => "none",
            ToolKind::Line => "line",
            ToolKind::Rect => "rect",
            ToolKind::Label => "label",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown tool or mode name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {name}")]
pub struct ParseNameError {
    kind: &'static str,
    name: String,
}

impl FromStr for ToolKind {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" | "" => Ok(ToolKind::None),
            "line" => Ok(ToolKind::Line),
            "rect" => Ok(ToolKind::Rect),
            "label" => Ok(ToolKind::Label),
            other => Err(ParseNameError {
                kind: "tool",
                name: other.to_string(),
            }),
        }
    }
}

/// Editor mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EditorMode {
    /// Read-only browsing: pan, zoom and tap labels.
    #[default]
    View,
    /// Drawing and manipulating elements.
    Edit,
}

impl EditorMode {
    pub fn name(self) -> &'static str {
        match self {
            EditorMode::View => "view",
            EditorMode::Edit => "edit",
        }
    }
}

impl fmt::Display for EditorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EditorMode {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(EditorMode::View),
            "edit" => Ok(EditorMode::Edit),
            other => Err(ParseNameError {
                kind: "mode",
                name: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draws_shape() {
        assert!(ToolKind::Line.draws_shape());
        assert!(ToolKind::Rect.draws_shape());
        assert!(!ToolKind::Label.draws_shape());
        assert!(!ToolKind::None.draws_shape());
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("rect".parse::<ToolKind>(), Ok(ToolKind::Rect));
        assert_eq!("edit".parse::<EditorMode>(), Ok(EditorMode::Edit));
        let err = "ellipse".parse::<ToolKind>().unwrap_err();
        assert_eq!(err.to_string(), "unknown tool: ellipse");
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&ToolKind::Label).unwrap(), "\"label\"");
        let mode: EditorMode = serde_json::from_str("\"view\"").unwrap();
        assert_eq!(mode, EditorMode::View);
    }
}
