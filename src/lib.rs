//! Overlay control panel engine for a media player.
//!
//! A declarative zone layout is materialised into layers and sections,
//! widgets are placed into it by numeric ordering key, and a timer-driven
//! state machine shows and hides the panel around pointer and touch activity.
//! Widgets coordinate over a shared event bus without referencing each other.

pub mod bus;
pub mod config;
pub mod error;
pub mod layout;
pub mod logging;
pub mod metrics;
pub mod placement;
pub mod render;
pub mod runtime;
pub mod timer;
pub mod visibility;
pub mod widget;
pub mod widgets;

pub use bus::{
    BusEvent, ContainerId, ContainerRef, DragGate, DragPayload, DragTracker, EventBus, Payload,
    PlaybackId, SeekRequest, Source, Subscriber, TimeSample, Topic,
};
pub use config::{
    DeviceProfile, FlowDirection, LayerConfig, PanelConfig, SectionConfig, TimingConfig,
    WidgetOverride, ZoneConfig,
};
pub use error::{PanelError, Result};
pub use layout::{PanelTree, SurfaceKind, ZoneTreeBuilder};
pub use logging::{
    BufferSink, FileSink, LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError,
    LoggingResult,
};
pub use metrics::{MetricSnapshot, PanelMetrics};
pub use placement::{OrderingKey, PlacementOutcome};
pub use render::{OutlineRenderer, RendererSettings, display_width};
pub use runtime::driver::{DriverFlow, TerminalDriver};
pub use runtime::{ControlsInteraction, MEDIA_CONTROL, MediaControl, PlayerHost};
pub use timer::{TimerKey, TimerPurpose, TimerQueue};
pub use visibility::{VisibilityMachine, VisibilityNotice, VisibilityState};
pub use widget::{PanelView, PanelWidget, WidgetAddress, WidgetContext, WidgetId, WidgetInput};
pub use widgets::{LabelWidget, SeekBar, TimeIndicator};
