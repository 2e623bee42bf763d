//! Shared event bus: topics, payloads, subscription routing and the drag
//! session convention widgets use to coordinate without knowing each other.

mod core;
pub mod drag;
mod events;

pub use core::{EventBus, Subscriber};
pub use drag::{DragGate, DragObservation, DragSession, DragTracker};
pub use events::{
    BusEvent, ContainerId, ContainerRef, DragPayload, Payload, PlaybackId, SeekRequest, Source,
    TimeSample, Topic,
};
