//! Drag sessions broadcast over the bus.
//!
//! A widget announces `DragStart` when the user begins manipulating it and
//! `DragStop` when the user lets go. Siblings keep a [`DragGate`] to suspend
//! their passive updates in between. The convention assumes one session at a
//! time; [`DragTracker`] only observes and flags overlaps, it never blocks.

use crate::widget::WidgetId;

use super::events::{BusEvent, DragPayload, Topic};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub origin: WidgetId,
    pub last: DragPayload,
}

/// What the tracker made of a drag event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragObservation {
    Started(DragSession),
    /// A start from a different widget arrived while a session was open.
    Overlapping { active: WidgetId, incoming: WidgetId },
    /// Repeated start from the active origin (progress update).
    Continued(DragSession),
    Stopped(DragSession),
    /// A stop with no matching session.
    Stray(WidgetId),
}

#[derive(Debug, Default)]
pub struct DragTracker {
    active: Option<DragSession>,
}

impl DragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<DragSession> {
        self.active
    }

    /// Feed a bus event; non-drag events yield `None`.
    pub fn observe(&mut self, event: &BusEvent) -> Option<DragObservation> {
        let payload = event.drag()?;
        match event.topic {
            Topic::DragStart => Some(self.start(payload)),
            Topic::DragStop => Some(self.stop(payload)),
            _ => None,
        }
    }

    fn start(&mut self, payload: DragPayload) -> DragObservation {
        match self.active {
            Some(session) if session.origin != payload.origin => DragObservation::Overlapping {
                active: session.origin,
                incoming: payload.origin,
            },
            Some(_) => {
                let session = DragSession {
                    origin: payload.origin,
                    last: payload,
                };
                self.active = Some(session);
                DragObservation::Continued(session)
            }
            None => {
                let session = DragSession {
                    origin: payload.origin,
                    last: payload,
                };
                self.active = Some(session);
                DragObservation::Started(session)
            }
        }
    }

    fn stop(&mut self, payload: DragPayload) -> DragObservation {
        match self.active {
            Some(session) if session.origin == payload.origin => {
                self.active = None;
                DragObservation::Stopped(DragSession {
                    origin: session.origin,
                    last: payload,
                })
            }
            _ => DragObservation::Stray(payload.origin),
        }
    }

    pub fn reset(&mut self) {
        self.active = None;
    }
}

/// Subscriber-side flag: passive updates are suspended while engaged.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct DragGate {
    engaged: bool,
}

impl DragGate {
    pub fn engage(&mut self) {
        self.engaged = true;
    }

    pub fn release(&mut self) {
        self.engaged = false;
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    /// `true` when a passive update may be applied.
    pub fn allows_passive(&self) -> bool {
        !self.engaged
    }
}
