//! Auto-show/auto-hide state machine for the panel.

mod core;

pub use core::{DWELL_TIMER, SETTLE_TIMER, VisibilityMachine, VisibilityNotice, VisibilityState};
