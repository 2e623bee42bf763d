//! The widget capability set and the context widgets act through.

mod core;

pub(crate) use core::{BusOp, TimerOp, WidgetOutcome};
pub use core::{PanelView, PanelWidget, WidgetAddress, WidgetContext, WidgetId, WidgetInput};
