//! Panel configuration: zone layout, device profile, timings and per-widget
//! address overrides, loadable from the host's JSON option object.

mod core;

pub use core::{
    DEFAULT_POINTER_DWELL_MS, DEFAULT_SETTLE_MS, DEFAULT_TOUCH_DWELL_MS, DeviceProfile,
    FlowDirection, LayerConfig, PanelConfig, SectionConfig, TimingConfig, WidgetOverride,
    ZoneConfig,
};
