use std::collections::HashSet;

use crate::error::{PanelError, Result};
use crate::widget::WidgetId;

use super::events::{BusEvent, Source, Topic};

/// Identity of a bus listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Subscriber {
    Panel,
    Widget(WidgetId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Subscription {
    subscriber: Subscriber,
    source: Source,
    topic: Topic,
    once: bool,
}

impl Subscription {
    fn same_binding(&self, subscriber: Subscriber, source: Source, topic: &Topic) -> bool {
        self.subscriber == subscriber && self.source == source && &self.topic == topic
    }
}

/// Routing table for the shared event bus.
///
/// The bus does not call anyone: [`EventBus::route`] resolves which
/// subscribers an event reaches and the host dispatches to them. Subscribing
/// the same `(subscriber, source, topic)` twice keeps a single binding.
#[derive(Debug, Default)]
pub struct EventBus {
    subscriptions: Vec<Subscription>,
    custom: HashSet<String>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a custom event publishable.
    pub fn register_custom_event(&mut self, name: impl Into<String>) -> Topic {
        let name = name.into();
        self.custom.insert(name.clone());
        Topic::Custom(name)
    }

    pub fn is_registered(&self, topic: &Topic) -> bool {
        match topic {
            Topic::Custom(name) => self.custom.contains(name),
            _ => true,
        }
    }

    /// Returns `false` if the binding already existed.
    pub fn listen_to(&mut self, subscriber: Subscriber, source: Source, topic: Topic) -> bool {
        self.bind(subscriber, source, topic, false)
    }

    /// Binding removed after its first delivery.
    pub fn listen_to_once(&mut self, subscriber: Subscriber, source: Source, topic: Topic) -> bool {
        self.bind(subscriber, source, topic, true)
    }

    fn bind(&mut self, subscriber: Subscriber, source: Source, topic: Topic, once: bool) -> bool {
        if let Some(existing) = self
            .subscriptions
            .iter_mut()
            .find(|sub| sub.same_binding(subscriber, source, &topic))
        {
            existing.once = existing.once && once;
            return false;
        }
        self.subscriptions.push(Subscription {
            subscriber,
            source,
            topic,
            once,
        });
        true
    }

    /// Drop every binding of `subscriber`, or only those on `source`.
    /// Returns how many were removed.
    pub fn stop_listening(&mut self, subscriber: Subscriber, source: Option<Source>) -> usize {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|sub| {
            !(sub.subscriber == subscriber && source.map(|s| s == sub.source).unwrap_or(true))
        });
        before - self.subscriptions.len()
    }

    pub fn stop_listening_to(
        &mut self,
        subscriber: Subscriber,
        source: Source,
        topic: &Topic,
    ) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions
            .retain(|sub| !sub.same_binding(subscriber, source, topic));
        before != self.subscriptions.len()
    }

    /// Resolve the subscribers of `event`, in subscription order, consuming
    /// one-shot bindings.
    pub fn route(&mut self, event: &BusEvent) -> Result<Vec<Subscriber>> {
        if !self.is_registered(&event.topic) {
            return Err(PanelError::UnknownEvent(event.topic.name().to_string()));
        }

        let mut targets = Vec::new();
        self.subscriptions.retain(|sub| {
            if sub.source != event.source || sub.topic != event.topic {
                return true;
            }
            if !targets.contains(&sub.subscriber) {
                targets.push(sub.subscriber);
            }
            !sub.once
        });
        Ok(targets)
    }

    pub fn is_listening(&self, subscriber: Subscriber, source: Source, topic: &Topic) -> bool {
        self.subscriptions
            .iter()
            .any(|sub| sub.same_binding(subscriber, source, topic))
    }

    pub fn subscription_count(&self, subscriber: Subscriber) -> usize {
        self.subscriptions
            .iter()
            .filter(|sub| sub.subscriber == subscriber)
            .count()
    }

    /// Number of bindings any subscriber holds on `source`.
    pub fn source_bindings(&self, source: Source) -> usize {
        self.subscriptions
            .iter()
            .filter(|sub| sub.source == source)
            .count()
    }

    pub fn clear(&mut self) {
        self.subscriptions.clear();
    }
}
