//! Scene Canvas Render Library
//!
//! Drawing surfaces for the scene canvas. The core crate renders through its
//! `Surface` trait; this crate provides a Vello implementation that records
//! into a `vello::Scene` for GPU presentation.

mod renderer;

#[cfg(feature = "vello-renderer")]
mod vello_impl;

pub use renderer::{RenderResult, RendererError};

#[cfg(feature = "vello-renderer")]
pub use vello_impl::VelloSurface;
