//! Stock widgets shipped with the panel.

mod label;
mod seek_bar;
mod time_indicator;

pub use label::LabelWidget;
pub use seek_bar::SeekBar;
pub use time_indicator::{DEFAULT_TIME, TimeIndicator, format_time};
