use crate::logging::{LogEvent, LogFields, LogLevel};
use serde_json::json;
use std::time::Duration;

#[derive(Debug, Default, Clone)]
pub struct PanelMetrics {
    events: u64,
    placements: u64,
    unresolved: u64,
    invalid_keys: u64,
    shows: u64,
    hides: u64,
    drag_sessions: u64,
    overlapping_drags: u64,
    seeks: u64,
    widget_errors: u64,
}

impl PanelMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_event(&mut self) {
        self.events = self.events.saturating_add(1);
    }

    pub fn record_placement(&mut self) {
        self.placements = self.placements.saturating_add(1);
    }

    pub fn record_unresolved(&mut self) {
        self.unresolved = self.unresolved.saturating_add(1);
    }

    pub fn record_invalid_key(&mut self) {
        self.invalid_keys = self.invalid_keys.saturating_add(1);
    }

    pub fn record_shown(&mut self) {
        self.shows = self.shows.saturating_add(1);
    }

    pub fn record_hidden(&mut self) {
        self.hides = self.hides.saturating_add(1);
    }

    pub fn record_drag_session(&mut self) {
        self.drag_sessions = self.drag_sessions.saturating_add(1);
    }

    pub fn record_overlapping_drag(&mut self) {
        self.overlapping_drags = self.overlapping_drags.saturating_add(1);
    }

    pub fn record_seek(&mut self) {
        self.seeks = self.seeks.saturating_add(1);
    }

    pub fn record_widget_error(&mut self) {
        self.widget_errors = self.widget_errors.saturating_add(1);
    }

    pub fn snapshot(&self, uptime: Duration) -> MetricSnapshot {
        MetricSnapshot {
            uptime_ms: uptime.as_millis() as u64,
            events: self.events,
            placements: self.placements,
            unresolved: self.unresolved,
            invalid_keys: self.invalid_keys,
            shows: self.shows,
            hides: self.hides,
            drag_sessions: self.drag_sessions,
            overlapping_drags: self.overlapping_drags,
            seeks: self.seeks,
            widget_errors: self.widget_errors,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub uptime_ms: u64,
    pub events: u64,
    pub placements: u64,
    pub unresolved: u64,
    pub invalid_keys: u64,
    pub shows: u64,
    pub hides: u64,
    pub drag_sessions: u64,
    pub overlapping_drags: u64,
    pub seeks: u64,
    pub widget_errors: u64,
}

impl MetricSnapshot {
    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "panel_metrics", self.as_fields())
    }

    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("uptime_ms".to_string(), json!(self.uptime_ms));
        map.insert("events".to_string(), json!(self.events));
        map.insert("placements".to_string(), json!(self.placements));
        map.insert("unresolved".to_string(), json!(self.unresolved));
        map.insert("invalid_keys".to_string(), json!(self.invalid_keys));
        map.insert("shows".to_string(), json!(self.shows));
        map.insert("hides".to_string(), json!(self.hides));
        map.insert("drag_sessions".to_string(), json!(self.drag_sessions));
        map.insert("overlapping_drags".to_string(), json!(self.overlapping_drags));
        map.insert("seeks".to_string(), json!(self.seeks));
        map.insert("widget_errors".to_string(), json!(self.widget_errors));
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::TARGET_METRICS;

    #[test]
    fn snapshot_reflects_counters() {
        let mut metrics = PanelMetrics::new();
        metrics.record_event();
        metrics.record_event();
        metrics.record_placement();
        metrics.record_hidden();
        metrics.record_seek();

        let snapshot = metrics.snapshot(Duration::from_millis(1500));
        assert_eq!(snapshot.events, 2);
        assert_eq!(snapshot.placements, 1);
        assert_eq!(snapshot.hides, 1);
        assert_eq!(snapshot.seeks, 1);
        assert_eq!(snapshot.uptime_ms, 1500);

        let event = snapshot.to_log_event(TARGET_METRICS);
        assert_eq!(event.message, "panel_metrics");
        assert_eq!(event.field("events"), Some(&json!(2)));
        assert_eq!(event.field("seeks"), Some(&json!(1)));
    }
}
