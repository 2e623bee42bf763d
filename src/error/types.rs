use thiserror::Error;

use crate::logging::LoggingError;
use crate::widget::WidgetId;

/// Unified result type for the overlay panel crate.
pub type Result<T> = std::result::Result<T, PanelError>;

/// Errors surfaced by the panel engine.
///
/// Most failures inside the engine are absorbed (a widget that cannot be placed
/// simply does not appear). These variants cover the boundaries that do report
/// back: configuration loading, explicit lookups and widget hooks.
#[derive(Debug, Error)]
pub enum PanelError {
    #[error("invalid panel configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error("ordering key `{0}` is not numeric")]
    InvalidOrderingKey(String),
    #[error("custom event `{0}` was never registered")]
    UnknownEvent(String),
    #[error("widget {0} not found")]
    WidgetNotFound(WidgetId),
    #[error("widget `{name}` failed: {reason}")]
    Widget { name: String, reason: String },
    #[error("logging error: {0}")]
    Logging(#[from] LoggingError),
    #[error("terminal error: {0}")]
    Terminal(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PanelError {
    pub fn widget(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Widget {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
