//! The media control panel: owns the zone tree, the visibility machine and
//! every attached widget.

use std::collections::{BTreeMap, VecDeque};

use serde_json::json;

use crate::bus::{BusEvent, ContainerRef, EventBus, Source, Subscriber, Topic};
use crate::config::{DeviceProfile, PanelConfig};
use crate::error::PanelError;
use crate::layout::{PanelTree, ZoneTreeBuilder};
use crate::logging::{
    LogLevel, Logger, TARGET_HOST, TARGET_PLACEMENT, TARGET_VISIBILITY, emit, json_kv,
};
use crate::metrics::PanelMetrics;
use crate::placement::{PlacementOutcome, place};
use crate::timer::{TimerKey, TimerPurpose, TimerQueue};
use crate::visibility::{VisibilityMachine, VisibilityNotice, VisibilityState};
use crate::widget::{
    BusOp, PanelView, PanelWidget, TimerOp, WidgetAddress, WidgetContext, WidgetId, WidgetInput,
    WidgetOutcome,
};

/// Name the panel is registered under on the host.
pub const MEDIA_CONTROL: &str = "media_control";

/// Shared services the host lends to the panel for the duration of a call.
#[derive(Debug, Default)]
pub(crate) struct HostCore {
    pub bus: EventBus,
    pub timers: TimerQueue,
    pub queue: VecDeque<BusEvent>,
    pub metrics: PanelMetrics,
    pub logger: Option<Logger>,
    pub active: Option<ContainerRef>,
}

impl HostCore {
    fn log<I>(&self, level: LogLevel, target: &str, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, serde_json::Value)>,
    {
        emit(self.logger.as_ref(), level, target, message, fields);
    }
}

/// Interaction with one of the panel's interactive children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlsInteraction {
    PointerEnter,
    PointerLeave,
    TouchStart,
}

impl ControlsInteraction {
    /// Interactions a device profile listens for on interactive children.
    pub fn for_device(device: DeviceProfile) -> &'static [ControlsInteraction] {
        match device {
            DeviceProfile::Pointer => &[Self::PointerEnter, Self::PointerLeave],
            DeviceProfile::Touch => &[Self::TouchStart],
        }
    }
}

struct WidgetEntry {
    widget: Box<dyn PanelWidget>,
    name: String,
    address: WidgetAddress,
    rendered: bool,
    pending_content: Option<String>,
}

pub struct MediaControl {
    name: String,
    config: PanelConfig,
    tree: PanelTree,
    visibility: VisibilityMachine,
    widgets: BTreeMap<WidgetId, WidgetEntry>,
    container: Option<ContainerRef>,
}

impl std::fmt::Debug for MediaControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaControl")
            .field("name", &self.name)
            .field("visibility", &self.visibility.state())
            .field("rendered", &self.tree.is_built())
            .field("widgets", &self.widgets.len())
            .field("container", &self.container)
            .finish()
    }
}

impl MediaControl {
    pub(crate) fn new(config: PanelConfig) -> Self {
        let visibility = VisibilityMachine::new(&config);
        Self {
            name: MEDIA_CONTROL.to_string(),
            config,
            tree: PanelTree::unbuilt(),
            visibility,
            widgets: BTreeMap::new(),
            container: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    pub fn tree(&self) -> &PanelTree {
        &self.tree
    }

    pub fn visibility(&self) -> VisibilityState {
        self.visibility.state()
    }

    pub fn is_visible(&self) -> bool {
        self.visibility.is_visible()
    }

    pub fn is_media_started(&self) -> bool {
        self.visibility.is_media_started()
    }

    pub fn is_rendered(&self) -> bool {
        self.tree.is_built()
    }

    pub fn container(&self) -> Option<ContainerRef> {
        self.container
    }

    pub fn widget_ids(&self) -> Vec<WidgetId> {
        self.widgets.keys().copied().collect()
    }

    pub fn widget_name(&self, id: WidgetId) -> Option<&str> {
        self.widgets.get(&id).map(|entry| entry.name.as_str())
    }

    /// Address a widget resolved to after configuration overrides.
    pub fn widget_address(&self, id: WidgetId) -> Option<&WidgetAddress> {
        self.widgets.get(&id).map(|entry| &entry.address)
    }

    pub fn content_of(&self, id: WidgetId) -> Option<&str> {
        self.tree.content_of(id)
    }

    pub(crate) fn take_dirty(&mut self) -> Vec<(WidgetId, String)> {
        self.tree.take_dirty()
    }

    /// Subscribe to the core events the panel always follows.
    pub(crate) fn bind(&mut self, core: &mut HostCore) {
        for topic in [Topic::ActiveContainerChanged, Topic::PointerMove, Topic::PointerLeave] {
            core.bus.stop_listening_to(Subscriber::Panel, Source::Core, &topic);
            core.bus.listen_to(Subscriber::Panel, Source::Core, topic);
        }
    }

    pub(crate) fn attach(
        &mut self,
        id: WidgetId,
        widget: Box<dyn PanelWidget>,
        core: &mut HostCore,
    ) {
        let name = widget.name().to_string();
        let address = widget
            .address()
            .with_override(self.config.widget_override(&name));
        core.log(
            LogLevel::Debug,
            TARGET_HOST,
            "widget_attached",
            [
                json_kv("widget", json!(id.raw())),
                json_kv("name", json!(name)),
                json_kv("layer", json!(address.layer)),
                json_kv("section", json!(address.section)),
            ],
        );
        self.widgets.insert(
            id,
            WidgetEntry {
                widget,
                name,
                address,
                rendered: false,
                pending_content: None,
            },
        );

        self.with_widget(id, core, |widget, ctx| widget.bind(ctx));
        if self.tree.is_built() {
            self.place_widget(id, core);
        }
    }

    /// Build the tree and place every attached widget. Subsequent calls are
    /// no-ops until the panel is destroyed.
    pub(crate) fn render(&mut self, core: &mut HostCore) -> bool {
        let built = ZoneTreeBuilder::new(&self.config.zones)
            .with_logger(core.logger.as_ref())
            .build_into(&mut self.tree);
        if !built {
            return false;
        }

        let ids: Vec<WidgetId> = self.widgets.keys().copied().collect();
        for id in ids {
            self.place_widget(id, core);
        }
        core.log(
            LogLevel::Info,
            TARGET_HOST,
            "panel_rendered",
            [
                json_kv("panel", json!(self.name)),
                json_kv("widgets", json!(self.widgets.len())),
            ],
        );
        true
    }

    fn place_widget(&mut self, id: WidgetId, core: &mut HostCore) -> PlacementOutcome {
        let Some(entry) = self.widgets.get(&id) else {
            return PlacementOutcome::AlreadyPlaced;
        };
        let outcome = place(&mut self.tree, id, &entry.name, &entry.address);
        let name = json!(entry.name);

        match &outcome {
            PlacementOutcome::Placed {
                layer,
                section,
                index,
            } => {
                core.metrics.record_placement();
                core.log(
                    LogLevel::Debug,
                    TARGET_PLACEMENT,
                    "widget_placed",
                    [
                        json_kv("name", name),
                        json_kv("layer", json!(layer)),
                        json_kv("section", json!(section)),
                        json_kv("index", json!(index)),
                    ],
                );
            }
            PlacementOutcome::InvalidOrderingKey {
                layer,
                section,
                index,
                key,
            } => {
                core.metrics.record_placement();
                core.metrics.record_invalid_key();
                core.log(
                    LogLevel::Warn,
                    TARGET_PLACEMENT,
                    "invalid_ordering_key",
                    [
                        json_kv("name", name),
                        json_kv("layer", json!(layer)),
                        json_kv("section", json!(section)),
                        json_kv("index", json!(index)),
                        json_kv("key", json!(key)),
                    ],
                );
            }
            PlacementOutcome::Unresolved { layer, section } => {
                core.metrics.record_unresolved();
                core.log(
                    LogLevel::Warn,
                    TARGET_PLACEMENT,
                    "address_unresolved",
                    [
                        json_kv("name", name),
                        json_kv("layer", json!(layer)),
                        json_kv("section", json!(section)),
                    ],
                );
            }
            PlacementOutcome::AlreadyPlaced => {}
        }

        if outcome.is_placed() {
            self.after_placement(id, core);
        }
        outcome
    }

    fn after_placement(&mut self, id: WidgetId, core: &mut HostCore) {
        let Some(entry) = self.widgets.get_mut(&id) else {
            return;
        };
        if let Some(content) = entry.pending_content.take() {
            self.tree.set_content(id, content);
        }
        if entry.rendered {
            return;
        }
        entry.rendered = true;
        self.with_widget(id, core, |widget, ctx| widget.render(ctx));
    }

    /// Handle an event routed to the panel itself.
    pub(crate) fn handle_event(&mut self, event: &BusEvent, core: &mut HostCore) {
        match (&event.source, &event.topic) {
            (Source::Core, Topic::ActiveContainerChanged) => {
                self.switch_container(event.container(), core);
            }
            (Source::Core, Topic::PointerMove) => {
                let notice = self.visibility.show(&mut core.timers);
                self.announce(notice, core);
            }
            (Source::Core, Topic::PointerLeave) => {
                let notice = self.visibility.hide();
                self.announce(notice, core);
            }
            (Source::Container(_), Topic::Stop | Topic::Ended) => {
                let notice = self.visibility.media_reset(&mut core.timers);
                self.announce(notice, core);
                self.arm_play_intent(core);
            }
            (Source::Container(id), Topic::Destroyed) => {
                if self.container.map(|current| current.container) == Some(*id) {
                    self.release_container(core);
                }
            }
            (Source::Playback(_), Topic::PlayIntent) => {
                let notice = self.visibility.media_started();
                self.announce(notice, core);
            }
            _ => {}
        }
    }

    fn switch_container(&mut self, next: Option<ContainerRef>, core: &mut HostCore) {
        self.release_container(core);
        self.container = next;
        let Some(container) = next else {
            return;
        };

        let source = Source::Container(container.container);
        for topic in [Topic::Stop, Topic::Ended, Topic::Destroyed] {
            core.bus.listen_to(Subscriber::Panel, source, topic);
        }
        self.arm_play_intent(core);
        core.log(
            LogLevel::Debug,
            TARGET_HOST,
            "container_bound",
            [
                json_kv("container", json!(container.container.0)),
                json_kv("playback", json!(container.playback.0)),
            ],
        );
    }

    fn release_container(&mut self, core: &mut HostCore) {
        if let Some(previous) = self.container.take() {
            core.bus
                .stop_listening(Subscriber::Panel, Some(Source::Container(previous.container)));
            core.bus
                .stop_listening(Subscriber::Panel, Some(Source::Playback(previous.playback)));
        }
    }

    fn arm_play_intent(&self, core: &mut HostCore) {
        if let Some(container) = self.container {
            core.bus.listen_to_once(
                Subscriber::Panel,
                Source::Playback(container.playback),
                Topic::PlayIntent,
            );
        }
    }

    /// Apply an interaction on an interactive child. Interactions outside the
    /// device profile's set are ignored.
    pub(crate) fn controls_interaction(
        &mut self,
        interaction: ControlsInteraction,
        core: &mut HostCore,
    ) -> bool {
        if !ControlsInteraction::for_device(self.visibility.device()).contains(&interaction) {
            return false;
        }
        let changed = match interaction {
            ControlsInteraction::PointerEnter => self.visibility.set_keep_visible(),
            ControlsInteraction::PointerLeave => {
                self.visibility.remove_keep_visible(&mut core.timers)
            }
            ControlsInteraction::TouchStart => self.visibility.touch_start(&mut core.timers),
        };
        if changed {
            core.log(
                LogLevel::Debug,
                TARGET_VISIBILITY,
                "keep_alive_changed",
                [json_kv(
                    "state",
                    json!(format!("{:?}", self.visibility.state())),
                )],
            );
        }
        changed
    }

    pub(crate) fn on_timer(&mut self, key: TimerKey, core: &mut HostCore) {
        match (key.owner, key.purpose) {
            (Subscriber::Panel, TimerPurpose::Settle) => {
                self.visibility.on_settle_elapsed(&mut core.timers);
            }
            (Subscriber::Panel, TimerPurpose::Dwell) => {
                let notice = self.visibility.on_dwell_elapsed();
                self.announce(notice, core);
            }
            (Subscriber::Widget(id), TimerPurpose::Widget(name)) => {
                self.with_widget(id, core, |widget, ctx| widget.on_timer(ctx, name));
            }
            _ => {}
        }
    }

    fn announce(&mut self, notice: Option<VisibilityNotice>, core: &mut HostCore) {
        let Some(notice) = notice else {
            return;
        };
        let topic = match notice {
            VisibilityNotice::Shown => {
                core.metrics.record_shown();
                Topic::PanelShown
            }
            VisibilityNotice::Hidden => {
                core.metrics.record_hidden();
                Topic::PanelHidden
            }
        };
        core.log(
            LogLevel::Info,
            TARGET_VISIBILITY,
            topic.name(),
            [json_kv("at_ms", json!(core.timers.now().as_millis() as u64))],
        );
        core.queue.push_back(BusEvent::core(topic));
    }

    pub(crate) fn deliver(&mut self, id: WidgetId, event: &BusEvent, core: &mut HostCore) {
        self.with_widget(id, core, |widget, ctx| widget.on_event(ctx, event));
    }

    pub(crate) fn widget_input(
        &mut self,
        id: WidgetId,
        input: &WidgetInput,
        core: &mut HostCore,
    ) -> crate::error::Result<()> {
        if !self.widgets.contains_key(&id) {
            return Err(PanelError::WidgetNotFound(id));
        }
        self.with_widget(id, core, |widget, ctx| widget.on_input(ctx, input));
        Ok(())
    }

    /// Run a widget hook and apply what it asked for. A failing hook is
    /// logged and counted; its queued requests are still applied.
    fn with_widget<F>(&mut self, id: WidgetId, core: &mut HostCore, hook: F)
    where
        F: FnOnce(&mut dyn PanelWidget, &mut WidgetContext<'_>) -> crate::error::Result<()>,
    {
        let (result, outcome, name) = {
            let Self {
                name,
                tree,
                visibility,
                widgets,
                ..
            } = self;
            let Some(entry) = widgets.get_mut(&id) else {
                return;
            };
            let view = PanelView {
                name: name.as_str(),
                visibility: visibility.state(),
                media_started: visibility.is_media_started(),
                tree: &*tree,
            };
            let mut ctx = WidgetContext::new(id, view, core.active, core.timers.now());
            let result = hook(entry.widget.as_mut(), &mut ctx);
            (result, ctx.into_outcome(), entry.name.clone())
        };

        if let Err(err) = result {
            core.metrics.record_widget_error();
            core.log(
                LogLevel::Warn,
                TARGET_HOST,
                "widget_error",
                [
                    json_kv("widget", json!(id.raw())),
                    json_kv("name", json!(name)),
                    json_kv("error", json!(err.to_string())),
                ],
            );
        }
        self.apply_outcome(id, outcome, core);
    }

    fn apply_outcome(&mut self, id: WidgetId, outcome: WidgetOutcome, core: &mut HostCore) {
        let subscriber = Subscriber::Widget(id);
        for op in outcome.bus {
            match op {
                BusOp::Listen {
                    source,
                    topic,
                    once: false,
                } => {
                    core.bus.listen_to(subscriber, source, topic);
                }
                BusOp::Listen {
                    source,
                    topic,
                    once: true,
                } => {
                    core.bus.listen_to_once(subscriber, source, topic);
                }
                BusOp::StopListening(source) => {
                    core.bus.stop_listening(subscriber, source);
                }
                BusOp::Publish(event) => core.queue.push_back(event),
            }
        }

        for op in outcome.timers {
            match op {
                TimerOp::Schedule(name, delay) => {
                    let key = TimerKey {
                        owner: subscriber,
                        purpose: TimerPurpose::Widget(name),
                    };
                    core.timers.schedule(key, delay);
                }
                TimerOp::Cancel(name) => {
                    core.timers.cancel(&TimerKey {
                        owner: subscriber,
                        purpose: TimerPurpose::Widget(name),
                    });
                }
            }
        }

        if let Some(content) = outcome.content {
            if self.tree.contains(id) {
                self.tree.set_content(id, content);
            } else if let Some(entry) = self.widgets.get_mut(&id) {
                entry.pending_content = Some(content);
            }
        }
    }

    /// Drop every subscription, timer and widget, and forget the tree and
    /// visibility state so the next render starts from scratch.
    pub(crate) fn destroy(&mut self, core: &mut HostCore) {
        self.visibility.teardown(&mut core.timers);
        self.visibility = VisibilityMachine::new(&self.config);
        core.bus.stop_listening(Subscriber::Panel, None);
        for id in self.widgets.keys() {
            core.bus.stop_listening(Subscriber::Widget(*id), None);
            core.timers.cancel_owner(Subscriber::Widget(*id));
        }
        let dropped = self.widgets.len();
        self.widgets.clear();
        self.container = None;
        self.tree = PanelTree::unbuilt();
        core.log(
            LogLevel::Info,
            TARGET_HOST,
            "panel_destroyed",
            [
                json_kv("panel", json!(self.name)),
                json_kv("widgets", json!(dropped)),
            ],
        );
    }
}
