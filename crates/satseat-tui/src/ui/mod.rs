//! Terminal UI module using ratatui.
//!
//! - `render`: frame layout, search form, status bar and overlays
//! - `results`: the date-grouped results table
//! - `input`: keyboard event handling
//! - `styles`: color scheme and text styling

pub mod input;
pub mod render;
pub mod results;
pub mod styles;
