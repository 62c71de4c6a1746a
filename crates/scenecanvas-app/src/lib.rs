//! Scene Canvas host shell.
//!
//! Stands in for the host page: replays recorded gesture scripts against a
//! scene editor, answers its label requests and persists the result.

pub mod replay;
pub mod script;

pub use replay::Replay;
pub use script::{Script, ScriptError, Step};
