use crate::bus::{BusEvent, ContainerRef, DragGate, Source, TimeSample, Topic};
use crate::error::Result;
use crate::widget::{PanelWidget, WidgetAddress, WidgetContext};

pub const DEFAULT_TIME: &str = "00:00";

/// Readout shown instead of the clock when seeking is impossible.
const LIVE_READOUT: &str = "LIVE";

/// `mm:ss`, `hh:mm:ss` once an hour is reached, and a leading day count past
/// 24 hours. Negative or non-finite input reads as zero.
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let secs = total % 60;
    let minutes = (total / 60) % 60;
    let hours = (total / 3600) % 24;
    let days = total / 86_400;

    let mut out = String::new();
    if days > 0 {
        out.push_str(&format!("{days}:"));
        if hours < 1 {
            out.push_str("00:");
        }
    }
    if hours > 0 {
        out.push_str(&format!("{hours:02}:"));
    }
    out.push_str(&format!("{minutes:02}:{secs:02}"));
    out
}

/// Position and duration of the active media.
///
/// Starts following time updates only after the first play of each media,
/// and never for live media without DVR. While a drag session is open the
/// position mirrors the dragged value instead.
#[derive(Debug, Clone)]
pub struct TimeIndicator {
    position: String,
    duration: String,
    disabled: bool,
    gate: DragGate,
    container: Option<ContainerRef>,
}

impl Default for TimeIndicator {
    fn default() -> Self {
        Self {
            position: DEFAULT_TIME.to_string(),
            duration: DEFAULT_TIME.to_string(),
            disabled: false,
            gate: DragGate::default(),
            container: None,
        }
    }
}

impl TimeIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn readout(&self) -> String {
        if self.disabled {
            return LIVE_READOUT.to_string();
        }
        format!("{} / {}", self.position, self.duration)
    }

    fn refresh(&self, ctx: &mut WidgetContext<'_>) {
        ctx.set_content(self.readout());
    }

    fn set_initial_state(&mut self) {
        self.position = DEFAULT_TIME.to_string();
        self.duration = DEFAULT_TIME.to_string();
        self.disabled = false;
    }

    fn on_container_changed(&mut self, ctx: &mut WidgetContext<'_>, next: Option<ContainerRef>) {
        self.set_initial_state();
        self.refresh(ctx);

        if let Some(previous) = self.container.take() {
            ctx.stop_listening(Some(Source::Container(previous.container)));
            ctx.stop_listening(Some(Source::Playback(previous.playback)));
        }
        self.container = next;
        if let Some(container) = next {
            ctx.listen_to_once(Source::Playback(container.playback), Topic::Play);
        }
    }

    fn on_first_play(&mut self, ctx: &mut WidgetContext<'_>) {
        let Some(container) = self.container else {
            return;
        };
        if container.live && !container.dvr_enabled {
            self.disabled = true;
            self.refresh(ctx);
            return;
        }
        ctx.listen_to(Source::Container(container.container), Topic::TimeUpdate);
    }

    fn on_time_update(&mut self, ctx: &mut WidgetContext<'_>, sample: TimeSample) {
        let (Some(current), Some(total)) = (sample.current, sample.total) else {
            return;
        };
        if !self.gate.allows_passive() {
            return;
        }
        let position = format_time(current);
        let duration = format_time(total);
        if position != self.position || duration != self.duration {
            self.position = position;
            self.duration = duration;
            self.refresh(ctx);
        }
    }
}

impl PanelWidget for TimeIndicator {
    fn name(&self) -> &str {
        "time_indicator"
    }

    fn address(&self) -> WidgetAddress {
        WidgetAddress::new(1, 2).at(2)
    }

    fn bind(&mut self, ctx: &mut WidgetContext<'_>) -> Result<()> {
        for topic in [Topic::ActiveContainerChanged, Topic::DragStart, Topic::DragStop] {
            ctx.listen_to(Source::Core, topic);
        }
        Ok(())
    }

    fn render(&mut self, ctx: &mut WidgetContext<'_>) -> Result<()> {
        self.refresh(ctx);
        Ok(())
    }

    fn on_event(&mut self, ctx: &mut WidgetContext<'_>, event: &BusEvent) -> Result<()> {
        match event.topic {
            Topic::ActiveContainerChanged => self.on_container_changed(ctx, event.container()),
            Topic::Play => self.on_first_play(ctx),
            Topic::TimeUpdate => {
                if let Some(sample) = event.time() {
                    self.on_time_update(ctx, sample);
                }
            }
            Topic::DragStart => {
                self.gate.engage();
                if let Some(drag) = event.drag() {
                    let position = format_time(drag.value);
                    if position != self.position {
                        self.position = position;
                        self.refresh(ctx);
                    }
                }
            }
            Topic::DragStop => self.gate.release(),
            _ => {}
        }
        Ok(())
    }
}
