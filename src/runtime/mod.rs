//! Player host: owns the bus, the virtual clock and the media control panel,
//! and runs every event to completion before taking the next one.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::json;

use crate::bus::{
    BusEvent, ContainerRef, DragObservation, DragTracker, EventBus, Payload, SeekRequest, Source,
    Subscriber, TimeSample, Topic,
};
use crate::config::PanelConfig;
use crate::error::{PanelError, Result};
use crate::logging::{LogLevel, TARGET_BUS, TARGET_HOST, TARGET_METRICS, emit, json_kv};
use crate::metrics::PanelMetrics;
use crate::render::OutlineRenderer;
use crate::widget::{PanelWidget, WidgetId, WidgetInput};

pub mod driver;
mod panel;

pub use panel::{ControlsInteraction, MEDIA_CONTROL, MediaControl};

use panel::HostCore;

/// Single-threaded host the panel and its widgets live in.
///
/// Inputs are queued as bus events and drained in FIFO order; anything a
/// handler publishes is appended and handled in the same drain. Timers fire
/// only from [`PlayerHost::advance`].
#[derive(Debug)]
pub struct PlayerHost {
    panel: MediaControl,
    core: HostCore,
    drag: DragTracker,
    last_seek: Option<SeekRequest>,
    next_widget: u64,
    deliveries: HashMap<(Subscriber, Topic), u64>,
}

impl PlayerHost {
    pub fn new(mut config: PanelConfig) -> Self {
        let logger = config.logger.take();
        let mut core = HostCore {
            logger,
            ..HostCore::default()
        };
        let mut panel = MediaControl::new(config);
        panel.bind(&mut core);
        emit(
            core.logger.as_ref(),
            LogLevel::Info,
            TARGET_HOST,
            "host_started",
            [
                json_kv("panel", json!(panel.name())),
                json_kv("device", json!(format!("{:?}", panel.config().device))),
            ],
        );
        Self {
            panel,
            core,
            drag: DragTracker::new(),
            last_seek: None,
            next_widget: 1,
            deliveries: HashMap::new(),
        }
    }

    /// Look a panel up by registration name.
    pub fn panel(&self, name: &str) -> Option<&MediaControl> {
        (self.panel.name() == name).then_some(&self.panel)
    }

    pub fn media_control(&self) -> &MediaControl {
        &self.panel
    }

    pub fn bus(&self) -> &EventBus {
        &self.core.bus
    }

    pub fn metrics(&self) -> &PanelMetrics {
        &self.core.metrics
    }

    pub fn now(&self) -> Duration {
        self.core.timers.now()
    }

    pub fn active_container(&self) -> Option<ContainerRef> {
        self.core.active
    }

    /// Drag session currently open on the bus, if any.
    pub fn active_drag(&self) -> Option<WidgetId> {
        self.drag.active().map(|session| session.origin)
    }

    /// Most recent seek a widget asked for.
    pub fn last_seek(&self) -> Option<SeekRequest> {
        self.last_seek
    }

    pub fn seek_count(&self) -> u64 {
        self.core.metrics.snapshot(self.now()).seeks
    }

    /// How many times `subscriber` has received `topic`.
    pub fn deliveries(&self, subscriber: Subscriber, topic: &Topic) -> u64 {
        self.deliveries
            .get(&(subscriber, topic.clone()))
            .copied()
            .unwrap_or(0)
    }

    pub fn attach<W>(&mut self, widget: W) -> WidgetId
    where
        W: PanelWidget + 'static,
    {
        self.attach_boxed(Box::new(widget))
    }

    pub fn attach_boxed(&mut self, widget: Box<dyn PanelWidget>) -> WidgetId {
        let id = WidgetId::new(self.next_widget);
        self.next_widget += 1;
        self.panel.attach(id, widget, &mut self.core);
        self.drain();
        id
    }

    /// Build the panel and place its widgets. Returns `false` if it was
    /// already rendered.
    pub fn render(&mut self) -> bool {
        self.panel.bind(&mut self.core);
        let rendered = self.panel.render(&mut self.core);
        self.drain();
        rendered
    }

    pub fn outline(&self) -> String {
        OutlineRenderer::new().render(&self.panel)
    }

    /// Widgets whose displayed text changed since the last call.
    pub fn take_dirty(&mut self) -> Vec<(WidgetId, String)> {
        self.panel.take_dirty()
    }

    pub fn register_custom_event(&mut self, name: impl Into<String>) -> Topic {
        self.core.bus.register_custom_event(name)
    }

    pub fn publish(&mut self, event: BusEvent) -> Result<()> {
        if !self.core.bus.is_registered(&event.topic) {
            return Err(PanelError::UnknownEvent(event.topic.name().to_string()));
        }
        self.core.queue.push_back(event);
        self.drain();
        Ok(())
    }

    pub fn set_active_container(&mut self, container: Option<ContainerRef>) {
        self.core.active = container;
        self.enqueue(BusEvent::new(
            Source::Core,
            Topic::ActiveContainerChanged,
            Payload::Container(container),
        ));
    }

    pub fn pointer_move(&mut self) {
        self.enqueue(BusEvent::core(Topic::PointerMove));
    }

    pub fn pointer_leave(&mut self) {
        self.enqueue(BusEvent::core(Topic::PointerLeave));
    }

    pub fn controls_interaction(&mut self, interaction: ControlsInteraction) -> bool {
        let applied = self.panel.controls_interaction(interaction, &mut self.core);
        self.drain();
        applied
    }

    pub fn pointer_enter_controls(&mut self) -> bool {
        self.controls_interaction(ControlsInteraction::PointerEnter)
    }

    pub fn pointer_leave_controls(&mut self) -> bool {
        self.controls_interaction(ControlsInteraction::PointerLeave)
    }

    pub fn touch_controls(&mut self) -> bool {
        self.controls_interaction(ControlsInteraction::TouchStart)
    }

    /// Emit an event from the active container. Ignored when none is active.
    pub fn container_event(&mut self, topic: Topic, payload: Payload) -> Result<()> {
        let Some(active) = self.core.active else {
            self.log(
                LogLevel::Debug,
                TARGET_HOST,
                "no_active_container",
                [json_kv("topic", json!(topic.name()))],
            );
            return Ok(());
        };
        self.publish(BusEvent::new(Source::Container(active.container), topic, payload))
    }

    /// Emit an event from the active playback. Ignored when none is active.
    pub fn playback_event(&mut self, topic: Topic, payload: Payload) -> Result<()> {
        let Some(active) = self.core.active else {
            self.log(
                LogLevel::Debug,
                TARGET_HOST,
                "no_active_container",
                [json_kv("topic", json!(topic.name()))],
            );
            return Ok(());
        };
        self.publish(BusEvent::new(Source::Playback(active.playback), topic, payload))
    }

    /// The user asked to play: intent first, then the playback and its
    /// container report playing.
    pub fn play(&mut self) {
        self.emit_media(Topic::PlayIntent, true);
        self.emit_media(Topic::Play, true);
        self.emit_media(Topic::Play, false);
    }

    pub fn pause(&mut self) {
        self.emit_media(Topic::Pause, false);
    }

    pub fn stop(&mut self) {
        self.emit_media(Topic::Stop, false);
    }

    pub fn ended(&mut self) {
        self.emit_media(Topic::Ended, false);
    }

    /// The active container was torn down by the host.
    pub fn container_destroyed(&mut self) {
        self.emit_media(Topic::Destroyed, false);
    }

    pub fn time_update(&mut self, current: f64, total: f64) {
        self.emit_time(Topic::TimeUpdate, TimeSample::new(current, total));
    }

    pub fn progress(&mut self, buffered: f64, total: f64) {
        self.emit_time(Topic::Progress, TimeSample::new(buffered, total));
    }

    fn emit_media(&mut self, topic: Topic, from_playback: bool) {
        let Some(active) = self.core.active else {
            return;
        };
        let source = if from_playback {
            Source::Playback(active.playback)
        } else {
            Source::Container(active.container)
        };
        self.enqueue(BusEvent::new(source, topic, Payload::None));
    }

    fn emit_time(&mut self, topic: Topic, sample: TimeSample) {
        let Some(active) = self.core.active else {
            return;
        };
        self.enqueue(BusEvent::new(
            Source::Container(active.container),
            topic,
            Payload::Time(sample),
        ));
    }

    pub fn widget_input(&mut self, widget: WidgetId, input: WidgetInput) -> Result<()> {
        let result = self.panel.widget_input(widget, &input, &mut self.core);
        self.drain();
        result
    }

    /// Move the virtual clock forward, firing due timers in deadline order.
    pub fn advance(&mut self, span: Duration) {
        let until = self.core.timers.now() + span;
        while let Some(key) = self.core.timers.pop_due(until) {
            self.panel.on_timer(key, &mut self.core);
            self.drain();
        }
        self.core.timers.settle_clock(until);
    }

    /// Log a metrics snapshot through the configured logger.
    pub fn emit_metrics(&self) {
        if let Some(logger) = self.core.logger.as_ref() {
            let snapshot = self.core.metrics.snapshot(self.core.timers.now());
            let _ = logger.log_event(snapshot.to_log_event(TARGET_METRICS));
        }
    }

    /// Tear the panel down: every subscription, timer and widget is dropped,
    /// along with the active container.
    pub fn destroy(&mut self) {
        self.panel.destroy(&mut self.core);
        self.core.queue.clear();
        self.core.active = None;
        self.drag.reset();
        self.last_seek = None;
    }

    fn enqueue(&mut self, event: BusEvent) {
        self.core.queue.push_back(event);
        self.drain();
    }

    fn drain(&mut self) {
        while let Some(event) = self.core.queue.pop_front() {
            self.observe_drag(&event);
            self.observe_seek(&event);
            let targets = match self.core.bus.route(&event) {
                Ok(targets) => targets,
                Err(err) => {
                    self.log(
                        LogLevel::Warn,
                        TARGET_BUS,
                        "event_dropped",
                        [json_kv("error", json!(err.to_string()))],
                    );
                    continue;
                }
            };
            self.core.metrics.record_event();
            self.log(
                LogLevel::Debug,
                TARGET_BUS,
                "event_routed",
                [
                    json_kv("topic", json!(event.topic.name())),
                    json_kv("targets", json!(targets.len())),
                ],
            );

            for target in targets {
                *self
                    .deliveries
                    .entry((target, event.topic.clone()))
                    .or_default() += 1;
                match target {
                    Subscriber::Panel => self.panel.handle_event(&event, &mut self.core),
                    Subscriber::Widget(id) => self.panel.deliver(id, &event, &mut self.core),
                }
            }
        }
    }

    fn observe_drag(&mut self, event: &BusEvent) {
        match self.drag.observe(event) {
            Some(DragObservation::Started(session)) => {
                self.core.metrics.record_drag_session();
                self.log(
                    LogLevel::Debug,
                    TARGET_BUS,
                    "drag_started",
                    [json_kv("origin", json!(session.origin.raw()))],
                );
            }
            Some(DragObservation::Overlapping { active, incoming }) => {
                self.core.metrics.record_overlapping_drag();
                self.log(
                    LogLevel::Warn,
                    TARGET_BUS,
                    "drag_overlap",
                    [
                        json_kv("active", json!(active.raw())),
                        json_kv("incoming", json!(incoming.raw())),
                    ],
                );
            }
            Some(DragObservation::Stray(origin)) => {
                self.log(
                    LogLevel::Debug,
                    TARGET_BUS,
                    "drag_stop_without_start",
                    [json_kv("origin", json!(origin.raw()))],
                );
            }
            _ => {}
        }
    }

    fn observe_seek(&mut self, event: &BusEvent) {
        let Some(request) = event.seek_request() else {
            return;
        };
        self.core.metrics.record_seek();
        self.last_seek = Some(request);
        self.log(
            LogLevel::Info,
            TARGET_BUS,
            "seek_requested",
            [
                json_kv("origin", json!(request.origin.raw())),
                json_kv("percentage", json!(request.percentage)),
            ],
        );
    }

    fn log<I>(&self, level: LogLevel, target: &str, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, serde_json::Value)>,
    {
        emit(self.core.logger.as_ref(), level, target, message, fields);
    }
}
