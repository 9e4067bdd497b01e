//! Terminal UI module using ratatui.
//!
//! - `render`: frame rendering and per-screen layout
//! - `input`: keyboard event handling
//! - `styles`: color scheme and text styling

pub mod input;
pub mod render;
pub mod styles;
