//! Text outline of the panel tree, for terminals and snapshots.

mod core;
mod width;

pub use core::{OutlineRenderer, RendererSettings};
pub use width::display_width;
