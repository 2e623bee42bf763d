use crate::bus::{BusEvent, ContainerRef, Source, TimeSample, Topic};
use crate::error::Result;
use crate::widget::{PanelWidget, WidgetAddress, WidgetContext, WidgetInput};

/// Playback position slider.
///
/// Dragging it opens a drag session on the bus; time updates from the
/// container are ignored until the user lets go. Letting go closes the
/// session and requests a seek to the released percentage.
#[derive(Debug, Clone)]
pub struct SeekBar {
    value: f64,
    max: f64,
    buffered: Option<f64>,
    dragging: bool,
    container: Option<ContainerRef>,
}

impl Default for SeekBar {
    fn default() -> Self {
        Self {
            value: 0.0,
            max: 100.0,
            buffered: None,
            dragging: false,
            container: None,
        }
    }
}

impl SeekBar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn readout(&self) -> String {
        let mut out = format!("{:.0}/{:.0}", self.value, self.max);
        if let Some(buffered) = self.buffered {
            out.push_str(&format!(" [{buffered:.0}% buffered]"));
        }
        out
    }

    fn refresh(&self, ctx: &mut WidgetContext<'_>) {
        ctx.set_content(self.readout());
    }

    fn on_container_changed(&mut self, ctx: &mut WidgetContext<'_>, next: Option<ContainerRef>) {
        if let Some(previous) = self.container.take() {
            ctx.stop_listening(Some(Source::Container(previous.container)));
        }
        self.container = next;
        if let Some(container) = next {
            let source = Source::Container(container.container);
            ctx.listen_to(source, Topic::TimeUpdate);
            ctx.listen_to(source, Topic::Progress);
        }
    }

    fn on_time_update(&mut self, ctx: &mut WidgetContext<'_>, sample: TimeSample) {
        if self.dragging {
            return;
        }
        let (Some(current), Some(total)) = (sample.current, sample.total) else {
            return;
        };
        let (position, duration) = (current.floor(), total.floor());
        if position != self.value || duration != self.max {
            self.value = position;
            self.max = duration;
            self.refresh(ctx);
        }
    }

    fn on_progress(&mut self, ctx: &mut WidgetContext<'_>, sample: TimeSample) {
        let (Some(current), Some(total)) = (sample.current, sample.total) else {
            return;
        };
        let duration = total.floor();
        if duration <= 0.0 {
            return;
        }
        self.buffered = Some((current.floor() / duration * 100.0).min(100.0));
        self.refresh(ctx);
    }
}

impl PanelWidget for SeekBar {
    fn name(&self) -> &str {
        "seek_bar"
    }

    fn address(&self) -> WidgetAddress {
        WidgetAddress::new(1, 2).at(1)
    }

    fn bind(&mut self, ctx: &mut WidgetContext<'_>) -> Result<()> {
        ctx.listen_to(Source::Core, Topic::ActiveContainerChanged);
        Ok(())
    }

    fn render(&mut self, ctx: &mut WidgetContext<'_>) -> Result<()> {
        self.refresh(ctx);
        Ok(())
    }

    fn on_event(&mut self, ctx: &mut WidgetContext<'_>, event: &BusEvent) -> Result<()> {
        match event.topic {
            Topic::ActiveContainerChanged => self.on_container_changed(ctx, event.container()),
            Topic::TimeUpdate => {
                if let Some(sample) = event.time() {
                    self.on_time_update(ctx, sample);
                }
            }
            Topic::Progress => {
                if let Some(sample) = event.time() {
                    self.on_progress(ctx, sample);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn on_input(&mut self, ctx: &mut WidgetContext<'_>, input: &WidgetInput) -> Result<()> {
        match *input {
            WidgetInput::Drag { value, max } => {
                self.dragging = true;
                self.value = value;
                self.max = max;
                ctx.drag_start(value, max);
                self.refresh(ctx);
            }
            WidgetInput::Release { value, max } => {
                self.dragging = false;
                self.value = value;
                self.max = max;
                ctx.drag_stop(value, max);
                if max > 0.0 {
                    ctx.seek(value / max * 100.0);
                }
                self.refresh(ctx);
            }
            WidgetInput::Activate => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LayerConfig, PanelConfig, ZoneConfig};
    use crate::runtime::PlayerHost;
    use crate::widget::WidgetId;

    fn host() -> (PlayerHost, WidgetId) {
        let mut host = PlayerHost::new(PanelConfig::new(ZoneConfig::layered(1).with_layer(
            LayerConfig {
                id: 1,
                section_count: Some(2),
                ..LayerConfig::default()
            },
        )));
        let id = host.attach(SeekBar::new());
        host.render();
        host.set_active_container(Some(ContainerRef::new(1, 1)));
        (host, id)
    }

    fn readout(host: &PlayerHost, id: WidgetId) -> &str {
        host.media_control().content_of(id).unwrap_or_default()
    }

    #[test]
    fn tracks_time_and_buffer() {
        let (mut host, id) = host();
        assert_eq!(readout(&host, id), "0/100");

        host.time_update(12.7, 60.2);
        assert_eq!(readout(&host, id), "12/60");

        host.progress(30.0, 60.0);
        assert_eq!(readout(&host, id), "12/60 [50% buffered]");
    }

    #[test]
    fn drag_opens_and_closes_a_session() {
        let (mut host, id) = host();
        host.widget_input(id, WidgetInput::Drag { value: 20.0, max: 60.0 })
            .unwrap();
        host.widget_input(id, WidgetInput::Drag { value: 25.0, max: 60.0 })
            .unwrap();
        assert_eq!(host.active_drag(), Some(id));
        assert_eq!(host.metrics().snapshot(host.now()).drag_sessions, 1);

        host.time_update(3.0, 60.0);
        assert_eq!(readout(&host, id), "25/60");

        host.widget_input(id, WidgetInput::Release { value: 25.0, max: 60.0 })
            .unwrap();
        assert_eq!(host.active_drag(), None);
        host.time_update(26.0, 60.0);
        assert_eq!(readout(&host, id), "26/60");
    }

    #[test]
    fn release_requests_one_seek() {
        let (mut host, id) = host();
        host.widget_input(id, WidgetInput::Drag { value: 15.0, max: 60.0 })
            .unwrap();
        assert_eq!(host.seek_count(), 0);

        host.widget_input(id, WidgetInput::Release { value: 15.0, max: 60.0 })
            .unwrap();
        assert_eq!(host.seek_count(), 1);
        let seek = host.last_seek().unwrap();
        assert_eq!(seek.origin, id);
        assert_eq!(seek.percentage, 25.0);
    }

    #[test]
    fn release_on_empty_range_does_not_seek() {
        let (mut host, id) = host();
        host.widget_input(id, WidgetInput::Release { value: 0.0, max: 0.0 })
            .unwrap();
        assert_eq!(host.seek_count(), 0);
        assert_eq!(host.last_seek(), None);
    }

    #[test]
    fn input_to_unknown_widget_is_an_error() {
        let (mut host, _) = host();
        let missing = WidgetId::new(99);
        assert!(host.widget_input(missing, WidgetInput::Activate).is_err());
    }
}
