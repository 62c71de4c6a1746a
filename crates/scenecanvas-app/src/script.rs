//! Recorded gesture scripts.
//!
//! A script is a JSON object with an optional surface size, the storage key
//! to save under and an ordered list of steps:
//!
//! ```json
//! {
//!   "width": 800, "height": 600, "key": "living-room",
//!   "steps": [
//!     { "step": "mode", "mode": "edit" },
//!     { "step": "tool", "tool": "rect" },
//!     { "step": "start", "at": 0,  "touches": [[100, 100]] },
//!     { "step": "move",  "at": 40, "touches": [[220, 180]] },
//!     { "step": "end",   "at": 60, "changed": [[220, 180]] }
//!   ]
//! }
//! ```

use kurbo::Point;
use scenecanvas_core::{EditorMode, ToolKind};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Errors loading a gesture script.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid script: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Step {index}: {message}")]
    InvalidStep { index: usize, message: String },
}

fn default_width() -> f64 {
    800.0
}

fn default_height() -> f64 {
    600.0
}

fn default_key() -> String {
    "replay".to_string()
}

/// A contact position as `[x, y]` in screen pixels.
pub type Contact = [f64; 2];

fn to_points(contacts: &[Contact]) -> Vec<Point> {
    contacts.iter().map(|[x, y]| Point::new(*x, *y)).collect()
}

/// One recorded host action.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "step", rename_all = "lowercase")]
pub enum Step {
    Start {
        /// Milliseconds since the script began.
        at: u64,
        touches: Vec<Contact>,
        #[serde(default)]
        changed: Vec<Contact>,
    },
    Move {
        at: u64,
        touches: Vec<Contact>,
        #[serde(default)]
        changed: Vec<Contact>,
    },
    End {
        at: u64,
        #[serde(default)]
        touches: Vec<Contact>,
        #[serde(default)]
        changed: Vec<Contact>,
    },
    Mode {
        mode: EditorMode,
    },
    Tool {
        tool: ToolKind,
    },
    Undo,
    Delete,
    /// Answer the most recent label request: confirm with `text`, or cancel.
    Label {
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        cancel: bool,
    },
}

impl Step {
    /// Clock reading of a pointer step.
    pub fn at(&self) -> Option<u64> {
        match self {
            Step::Start { at, .. } | Step::Move { at, .. } | Step::End { at, .. } => Some(*at),
            _ => None,
        }
    }

    /// Active and changed contacts of a pointer step.
    pub fn contacts(&self) -> Option<(Vec<Point>, Vec<Point>)> {
        match self {
            Step::Start {
                touches, changed, ..
            }
            | Step::Move {
                touches, changed, ..
            }
            | Step::End {
                touches, changed, ..
            } => Some((to_points(touches), to_points(changed))),
            _ => None,
        }
    }
}

/// A gesture script.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Script {
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,
    /// Storage key the resulting drawing is saved under.
    #[serde(default = "default_key")]
    pub key: String,
    pub steps: Vec<Step>,
}

impl Script {
    pub fn from_json(json: &str) -> Result<Self, ScriptError> {
        let script: Script = serde_json::from_str(json)?;
        script.validate()?;
        Ok(script)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let script = Self::from_json(&json)?;
        log::info!("Loaded {} steps from {}", script.steps.len(), path.display());
        Ok(script)
    }

    /// Check the clock never runs backwards and label answers are complete.
    fn validate(&self) -> Result<(), ScriptError> {
        let mut last = 0;
        for (index, step) in self.steps.iter().enumerate() {
            if let Some(at) = step.at() {
                if at < last {
                    return Err(ScriptError::InvalidStep {
                        index,
                        message: format!("clock went backwards ({} < {})", at, last),
                    });
                }
                last = at;
            }
            if let Step::Label { text: None, cancel: false } = step {
                return Err(ScriptError::InvalidStep {
                    index,
                    message: "label step needs `text` or `cancel`".to_string(),
                });
            }
        }
        Ok(())
    }
}
