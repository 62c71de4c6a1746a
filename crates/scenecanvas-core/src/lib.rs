//! Scene Canvas Core Library
//!
//! Platform-agnostic interaction engine for the scene canvas: a pan/zoom
//! viewport, line/rectangle/label elements, a touch gesture state machine,
//! a render pipeline over an abstract surface and versioned documents.

pub mod config;
pub mod document;
pub mod editor;
pub mod elements;
pub mod geometry;
pub mod gesture;
pub mod input;
pub mod render;
pub mod selection;
pub mod storage;
pub mod tools;
pub mod viewport;

pub use config::{ConfigError, EditorConfig};
pub use document::{CURRENT_VERSION, DocumentError, DrawingDocument, ViewportSnapshot};
pub use editor::{EditorEvent, PendingLabel, PendingLabelId, SceneEditor};
pub use elements::{Element, ElementId, Label, Line, Rectangle, SerializableColor};
pub use gesture::Interaction;
pub use input::TouchEvent;
pub use render::{DisplayList, DrawCommand, RenderContext, Surface, render_scene};
pub use selection::{Corner, Handle, HandleKind, HitBoxes};
pub use storage::{MemoryStorage, Storage, StorageError, StorageResult};
#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;
pub use tools::{EditorMode, ToolKind};
pub use viewport::{MAX_SCALE, MIN_SCALE, Viewport};
