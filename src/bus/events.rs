use std::fmt;

use serde::Serialize;

use crate::widget::WidgetId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ContainerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PlaybackId(pub u64);

/// The host's active media session: a container and the playback inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerRef {
    pub container: ContainerId,
    pub playback: PlaybackId,
    pub live: bool,
    pub dvr_enabled: bool,
}

impl ContainerRef {
    pub fn new(container: u64, playback: u64) -> Self {
        Self {
            container: ContainerId(container),
            playback: PlaybackId(playback),
            live: false,
            dvr_enabled: false,
        }
    }

    pub fn live(mut self, dvr_enabled: bool) -> Self {
        self.live = true;
        self.dvr_enabled = dvr_enabled;
        self
    }
}

/// Object an event is emitted from. Subscriptions are scoped to a source so
/// that a stale container can be dropped wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Core,
    Container(ContainerId),
    Playback(PlaybackId),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Topic {
    ActiveContainerChanged,
    PointerMove,
    PointerLeave,
    Play,
    Pause,
    Stop,
    Ended,
    Destroyed,
    PlayIntent,
    TimeUpdate,
    Progress,
    PanelShown,
    PanelHidden,
    DragStart,
    DragStop,
    /// A widget asks the active container to jump to a position.
    Seek,
    /// Host- or widget-defined event; must be registered before publishing.
    Custom(String),
}

impl Topic {
    pub fn name(&self) -> &str {
        match self {
            Self::ActiveContainerChanged => "active_container_changed",
            Self::PointerMove => "pointer_move",
            Self::PointerLeave => "pointer_leave",
            Self::Play => "play",
            Self::Pause => "pause",
            Self::Stop => "stop",
            Self::Ended => "ended",
            Self::Destroyed => "destroyed",
            Self::PlayIntent => "play_intent",
            Self::TimeUpdate => "time_update",
            Self::Progress => "progress",
            Self::PanelShown => "panel_shown",
            Self::PanelHidden => "panel_hidden",
            Self::DragStart => "drag_start",
            Self::DragStop => "drag_stop",
            Self::Seek => "seek",
            Self::Custom(name) => name,
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Playback position or buffered amount, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSample {
    pub current: Option<f64>,
    pub total: Option<f64>,
}

impl TimeSample {
    pub fn new(current: f64, total: f64) -> Self {
        Self {
            current: Some(current),
            total: Some(total),
        }
    }
}

/// Broadcast by a widget while the user drags it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragPayload {
    pub origin: WidgetId,
    pub value: f64,
    pub max: f64,
}

/// Seek target as a percentage of the media duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeekRequest {
    pub origin: WidgetId,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    None,
    Container(Option<ContainerRef>),
    Time(TimeSample),
    Drag(DragPayload),
    Seek(SeekRequest),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BusEvent {
    pub source: Source,
    pub topic: Topic,
    pub payload: Payload,
}

impl BusEvent {
    pub fn new(source: Source, topic: Topic, payload: Payload) -> Self {
        Self {
            source,
            topic,
            payload,
        }
    }

    pub fn core(topic: Topic) -> Self {
        Self::new(Source::Core, topic, Payload::None)
    }

    pub fn drag_start(payload: DragPayload) -> Self {
        Self::new(Source::Core, Topic::DragStart, Payload::Drag(payload))
    }

    pub fn drag_stop(payload: DragPayload) -> Self {
        Self::new(Source::Core, Topic::DragStop, Payload::Drag(payload))
    }

    pub fn seek(request: SeekRequest) -> Self {
        Self::new(Source::Core, Topic::Seek, Payload::Seek(request))
    }

    pub fn time(&self) -> Option<TimeSample> {
        match self.payload {
            Payload::Time(sample) => Some(sample),
            _ => None,
        }
    }

    pub fn drag(&self) -> Option<DragPayload> {
        match self.payload {
            Payload::Drag(drag) => Some(drag),
            _ => None,
        }
    }

    pub fn seek_request(&self) -> Option<SeekRequest> {
        match self.payload {
            Payload::Seek(request) => Some(request),
            _ => None,
        }
    }

    pub fn container(&self) -> Option<ContainerRef> {
        match self.payload {
            Payload::Container(container) => container,
            _ => None,
        }
    }
}
