//! Error module orchestrator.

mod types;

pub use types::{PanelError, Result};
