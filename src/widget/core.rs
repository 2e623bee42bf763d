use std::fmt;
use std::time::Duration;

use crate::bus::{BusEvent, ContainerRef, DragPayload, SeekRequest, Source, Topic};
use crate::config::WidgetOverride;
use crate::error::Result;
use crate::layout::PanelTree;
use crate::placement::OrderingKey;
use crate::visibility::VisibilityState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(u64);

impl WidgetId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a widget wants to live: `(layer, section, position)` plus the
/// separator modifier.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetAddress {
    pub layer: u32,
    pub section: u32,
    /// `None` appends after every positioned sibling.
    pub position: Option<OrderingKey>,
    pub separator: bool,
}

impl Default for WidgetAddress {
    fn default() -> Self {
        Self {
            layer: 1,
            section: 1,
            position: None,
            separator: false,
        }
    }
}

impl WidgetAddress {
    pub fn new(layer: u32, section: u32) -> Self {
        Self {
            layer,
            section,
            ..Self::default()
        }
    }

    pub fn at(mut self, position: impl Into<OrderingKey>) -> Self {
        self.position = Some(position.into());
        self
    }

    pub fn separator(mut self, separator: bool) -> Self {
        self.separator = separator;
        self
    }

    /// Apply host configuration on top of the widget's own declaration.
    pub fn with_override(mut self, config: Option<&WidgetOverride>) -> Self {
        let Some(config) = config else {
            return self;
        };
        if let Some(layer) = config.layer {
            self.layer = layer;
        }
        if let Some(section) = config.section {
            self.section = section;
        }
        if let Some(position) = config.position.as_ref() {
            self.position = Some(OrderingKey::from_value(position));
        }
        if let Some(separator) = config.separator {
            self.separator = separator;
        }
        self
    }
}

/// Direct user interaction with a widget's own element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WidgetInput {
    /// The user moved the control to `value` (out of `max`) and has not let go.
    Drag { value: f64, max: f64 },
    /// The user let go at `value`.
    Release { value: f64, max: f64 },
    Activate,
}

/// Read-only view of the owning panel, built fresh for every hook call.
#[derive(Debug, Clone, Copy)]
pub struct PanelView<'a> {
    pub name: &'a str,
    pub visibility: VisibilityState,
    pub media_started: bool,
    pub tree: &'a PanelTree,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum BusOp {
    Listen { source: Source, topic: Topic, once: bool },
    StopListening(Option<Source>),
    Publish(BusEvent),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TimerOp {
    Schedule(&'static str, Duration),
    Cancel(&'static str),
}

#[derive(Debug, Default)]
pub(crate) struct WidgetOutcome {
    pub bus: Vec<BusOp>,
    pub timers: Vec<TimerOp>,
    pub content: Option<String>,
}

/// Handed to widget hooks. Requests are queued and applied by the panel once
/// the hook returns, in the order they were made.
pub struct WidgetContext<'a> {
    widget: WidgetId,
    panel: PanelView<'a>,
    active: Option<ContainerRef>,
    now: Duration,
    outcome: WidgetOutcome,
}

impl<'a> WidgetContext<'a> {
    pub(crate) fn new(
        widget: WidgetId,
        panel: PanelView<'a>,
        active: Option<ContainerRef>,
        now: Duration,
    ) -> Self {
        Self {
            widget,
            panel,
            active,
            now,
            outcome: WidgetOutcome::default(),
        }
    }

    pub fn widget_id(&self) -> WidgetId {
        self.widget
    }

    pub fn panel(&self) -> PanelView<'a> {
        self.panel
    }

    /// Active container and playback, if any.
    pub fn active(&self) -> Option<ContainerRef> {
        self.active
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Text currently shown in this widget's element.
    pub fn current_content(&self) -> Option<&'a str> {
        self.panel.tree.content_of(self.widget)
    }

    pub fn listen_to(&mut self, source: Source, topic: Topic) {
        self.outcome.bus.push(BusOp::Listen {
            source,
            topic,
            once: false,
        });
    }

    pub fn listen_to_once(&mut self, source: Source, topic: Topic) {
        self.outcome.bus.push(BusOp::Listen {
            source,
            topic,
            once: true,
        });
    }

    pub fn stop_listening(&mut self, source: Option<Source>) {
        self.outcome.bus.push(BusOp::StopListening(source));
    }

    pub fn publish(&mut self, event: BusEvent) {
        self.outcome.bus.push(BusOp::Publish(event));
    }

    pub fn drag_start(&mut self, value: f64, max: f64) {
        let payload = DragPayload {
            origin: self.widget,
            value,
            max,
        };
        self.publish(BusEvent::drag_start(payload));
    }

    pub fn drag_stop(&mut self, value: f64, max: f64) {
        let payload = DragPayload {
            origin: self.widget,
            value,
            max,
        };
        self.publish(BusEvent::drag_stop(payload));
    }

    /// Ask the host to move playback to `percentage` of the duration.
    pub fn seek(&mut self, percentage: f64) {
        self.publish(BusEvent::seek(SeekRequest {
            origin: self.widget,
            percentage,
        }));
    }

    /// Replace the text of this widget's element.
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.outcome.content = Some(content.into());
    }

    pub fn schedule(&mut self, name: &'static str, delay: Duration) {
        self.outcome.timers.push(TimerOp::Schedule(name, delay));
    }

    pub fn cancel_timer(&mut self, name: &'static str) {
        self.outcome.timers.push(TimerOp::Cancel(name));
    }

    pub(crate) fn into_outcome(self) -> WidgetOutcome {
        self.outcome
    }
}

/// A pluggable panel component.
///
/// Implementors declare an address and react to bus events; the panel owns
/// them, places their element and invokes `render` once after placement.
pub trait PanelWidget {
    fn name(&self) -> &str;

    fn address(&self) -> WidgetAddress {
        WidgetAddress::default()
    }

    /// Called when the widget is attached to the host.
    fn bind(&mut self, _ctx: &mut WidgetContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Called exactly once, right after the element is inserted.
    fn render(&mut self, _ctx: &mut WidgetContext<'_>) -> Result<()> {
        Ok(())
    }

    fn on_event(&mut self, _ctx: &mut WidgetContext<'_>, _event: &BusEvent) -> Result<()> {
        Ok(())
    }

    fn on_input(&mut self, _ctx: &mut WidgetContext<'_>, _input: &WidgetInput) -> Result<()> {
        Ok(())
    }

    fn on_timer(&mut self, _ctx: &mut WidgetContext<'_>, _name: &'static str) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_address_is_first_section_unordered() {
        let address = WidgetAddress::default();
        assert_eq!((address.layer, address.section), (1, 1));
        assert!(address.position.is_none());
        assert!(!address.separator);
    }

    #[test]
    fn override_replaces_only_given_fields() {
        let base = WidgetAddress::new(1, 2).at(2);
        let config = WidgetOverride {
            section: Some(3),
            position: Some(json!("7")),
            ..WidgetOverride::default()
        };
        let resolved = base.clone().with_override(Some(&config));
        assert_eq!(resolved.layer, 1);
        assert_eq!(resolved.section, 3);
        assert_eq!(resolved.position.and_then(|p| p.value()), Some(7.0));

        assert_eq!(base.clone().with_override(None), base);
    }

    #[test]
    fn context_queues_requests_in_order() {
        let tree = PanelTree::unbuilt();
        let view = PanelView {
            name: "media_control",
            visibility: VisibilityState::Visible,
            media_started: false,
            tree: &tree,
        };
        let mut ctx = WidgetContext::new(WidgetId::new(2), view, None, Duration::ZERO);
        ctx.stop_listening(None);
        ctx.listen_to(Source::Core, Topic::DragStart);
        ctx.drag_start(5.0, 10.0);
        ctx.set_content("x");
        ctx.schedule("flash", Duration::from_millis(40));
        ctx.cancel_timer("flash");

        let outcome = ctx.into_outcome();
        assert_eq!(outcome.bus.len(), 3);
        assert_eq!(outcome.bus[0], BusOp::StopListening(None));
        assert!(matches!(
            &outcome.bus[2],
            BusOp::Publish(event) if event.topic == Topic::DragStart
        ));
        assert_eq!(outcome.content.as_deref(), Some("x"));
        assert_eq!(
            outcome.timers,
            vec![
                TimerOp::Schedule("flash", Duration::from_millis(40)),
                TimerOp::Cancel("flash"),
            ]
        );
    }
}
