//! Layout module orchestrator.
//!
//! The realised panel hierarchy lives in the private `core` module; the
//! builder turning a zone config into that hierarchy lives in `builder`.

mod builder;
mod core;

pub use builder::ZoneTreeBuilder;
pub use core::{Layer, PanelTree, Section, SectionStyle, SurfaceKind, WidgetSlot};
