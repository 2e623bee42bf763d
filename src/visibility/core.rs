use std::time::Duration;

use crate::config::{DeviceProfile, PanelConfig};
use crate::timer::{TimerKey, TimerPurpose, TimerQueue};

pub const SETTLE_TIMER: TimerKey = TimerKey::panel(TimerPurpose::Settle);
pub const DWELL_TIMER: TimerKey = TimerKey::panel(TimerPurpose::Dwell);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityState {
    Hidden,
    Visible,
    /// Visible, and the dwell timer may not hide it (pointer over or touch on
    /// an interactive child).
    VisibleKeptAlive,
}

/// Transition the host should broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityNotice {
    Shown,
    Hidden,
}

/// Show/hide state of the whole panel.
///
/// All timer work goes through the passed [`TimerQueue`] under the panel's
/// settle and dwell keys, so re-arming always replaces the pending instance.
#[derive(Debug, Clone)]
pub struct VisibilityMachine {
    state: VisibilityState,
    media_started: bool,
    suppress_until_start: bool,
    device: DeviceProfile,
    settle: Duration,
    dwell: Duration,
    held_by_touch: bool,
}

impl VisibilityMachine {
    pub fn new(config: &PanelConfig) -> Self {
        Self {
            state: if config.suppress_until_start {
                VisibilityState::Hidden
            } else {
                VisibilityState::Visible
            },
            media_started: false,
            suppress_until_start: config.suppress_until_start,
            device: config.device,
            settle: config.timings.settle(),
            dwell: config.dwell(),
            held_by_touch: false,
        }
    }

    pub fn state(&self) -> VisibilityState {
        self.state
    }

    pub fn is_visible(&self) -> bool {
        self.state != VisibilityState::Hidden
    }

    pub fn is_media_started(&self) -> bool {
        self.media_started
    }

    pub fn suppress_until_start(&self) -> bool {
        self.suppress_until_start
    }

    pub fn device(&self) -> DeviceProfile {
        self.device
    }

    pub fn dwell(&self) -> Duration {
        self.dwell
    }

    pub fn settle(&self) -> Duration {
        self.settle
    }

    /// Pointer or touch activity on the player.
    ///
    /// The settle timer restarts on every tick. The panel only appears once
    /// media has started. A keep-alive that came from a touch is released,
    /// since touch offers no leave event of its own.
    pub fn show(&mut self, timers: &mut TimerQueue) -> Option<VisibilityNotice> {
        timers.cancel(&DWELL_TIMER);
        timers.schedule(SETTLE_TIMER, self.settle);

        if self.held_by_touch && self.state == VisibilityState::VisibleKeptAlive {
            self.held_by_touch = false;
            self.state = VisibilityState::Visible;
        }

        if !self.media_started || self.state != VisibilityState::Hidden {
            return None;
        }
        self.state = VisibilityState::Visible;
        Some(VisibilityNotice::Shown)
    }

    /// Settle elapsed: arm the hide delay.
    pub fn on_settle_elapsed(&mut self, timers: &mut TimerQueue) {
        self.arm_dwell(timers);
    }

    pub fn on_dwell_elapsed(&mut self) -> Option<VisibilityNotice> {
        self.hide()
    }

    fn arm_dwell(&self, timers: &mut TimerQueue) {
        timers.schedule(DWELL_TIMER, self.dwell);
    }

    /// Pointer entered an interactive child.
    pub fn set_keep_visible(&mut self) -> bool {
        if self.state == VisibilityState::Hidden {
            return false;
        }
        self.state = VisibilityState::VisibleKeptAlive;
        true
    }

    /// Pointer left an interactive child: hide again after a full dwell.
    pub fn remove_keep_visible(&mut self, timers: &mut TimerQueue) -> bool {
        if self.state == VisibilityState::Hidden {
            return false;
        }
        self.state = VisibilityState::Visible;
        self.held_by_touch = false;
        self.arm_dwell(timers);
        true
    }

    /// Touch on an interactive child: cancel the pending hide and hold.
    pub fn touch_start(&mut self, timers: &mut TimerQueue) -> bool {
        timers.cancel(&DWELL_TIMER);
        let held = self.set_keep_visible();
        if held {
            self.held_by_touch = true;
        }
        held
    }

    pub fn hide(&mut self) -> Option<VisibilityNotice> {
        if !self.media_started || self.state != VisibilityState::Visible {
            return None;
        }
        self.state = VisibilityState::Hidden;
        Some(VisibilityNotice::Hidden)
    }

    /// First play of the current media.
    ///
    /// Unless the panel is suppressed until start, it is hidden right away
    /// (bypassing the visible check) so it does not linger over the first
    /// frame.
    pub fn media_started(&mut self) -> Option<VisibilityNotice> {
        self.media_started = true;
        if self.suppress_until_start {
            return None;
        }
        if self.state == VisibilityState::Hidden {
            self.state = VisibilityState::Visible;
        }
        self.hide()
    }

    /// Media stopped or ended: show or hide per configuration, then wait for
    /// the next first play.
    pub fn media_reset(&mut self, timers: &mut TimerQueue) -> Option<VisibilityNotice> {
        let notice = if self.suppress_until_start {
            self.hide()
        } else {
            self.show(timers)
        };
        self.media_started = false;
        notice
    }

    pub fn teardown(&mut self, timers: &mut TimerQueue) {
        timers.cancel(&SETTLE_TIMER);
        timers.cancel(&DWELL_TIMER);
        self.held_by_touch = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    /// Fire every panel timer due within `span`, returning the notices.
    fn run(
        machine: &mut VisibilityMachine,
        timers: &mut TimerQueue,
        span: Duration,
    ) -> Vec<VisibilityNotice> {
        let until = timers.now() + span;
        let mut notices = Vec::new();
        while let Some(key) = timers.pop_due(until) {
            match key.purpose {
                TimerPurpose::Settle => machine.on_settle_elapsed(timers),
                TimerPurpose::Dwell => notices.extend(machine.on_dwell_elapsed()),
                TimerPurpose::Widget(_) => {}
            }
        }
        timers.settle_clock(until);
        notices
    }

    fn started(config: PanelConfig) -> (VisibilityMachine, TimerQueue) {
        let mut machine = VisibilityMachine::new(&config);
        machine.media_started();
        (machine, TimerQueue::new())
    }

    #[test]
    fn initial_state_follows_suppression() {
        let visible = VisibilityMachine::new(&PanelConfig::default());
        assert_eq!(visible.state(), VisibilityState::Visible);

        let hidden = VisibilityMachine::new(&PanelConfig::default().suppress_until_start(true));
        assert_eq!(hidden.state(), VisibilityState::Hidden);
    }

    #[test]
    fn activity_before_start_changes_nothing() {
        let config = PanelConfig::default().suppress_until_start(true);
        let mut machine = VisibilityMachine::new(&config);
        let mut timers = TimerQueue::new();
        assert_eq!(machine.show(&mut timers), None);
        assert_eq!(run(&mut machine, &mut timers, ms(10_000)), vec![]);
        assert_eq!(machine.state(), VisibilityState::Hidden);
    }

    #[test]
    fn media_start_hides_unless_suppressed() {
        let mut machine = VisibilityMachine::new(&PanelConfig::default());
        assert_eq!(machine.media_started(), Some(VisibilityNotice::Hidden));
        assert_eq!(machine.state(), VisibilityState::Hidden);

        let suppressed_config = PanelConfig::default().suppress_until_start(true);
        let mut suppressed = VisibilityMachine::new(&suppressed_config);
        assert_eq!(suppressed.media_started(), None);
        assert!(suppressed.is_media_started());
        assert_eq!(suppressed.state(), VisibilityState::Hidden);
    }

    #[test]
    fn full_cycle_after_suppressed_start() {
        let (mut machine, mut timers) = started(PanelConfig::default().suppress_until_start(true));
        assert_eq!(machine.show(&mut timers), Some(VisibilityNotice::Shown));
        assert_eq!(machine.state(), VisibilityState::Visible);

        assert!(run(&mut machine, &mut timers, ms(2299)).is_empty());
        assert_eq!(run(&mut machine, &mut timers, ms(1)), vec![VisibilityNotice::Hidden]);
        assert_eq!(machine.state(), VisibilityState::Hidden);
    }

    #[test]
    fn continuous_activity_keeps_panel_up() {
        let (mut machine, mut timers) = started(PanelConfig::default());
        machine.show(&mut timers);
        for _ in 0..20 {
            assert!(run(&mut machine, &mut timers, ms(250)).is_empty());
            assert_eq!(machine.show(&mut timers), None);
        }
        assert!(machine.is_visible());
    }

    #[test]
    fn settle_rearm_does_not_double_fire() {
        let (mut machine, mut timers) = started(PanelConfig::default());
        machine.show(&mut timers);
        run(&mut machine, &mut timers, ms(300));
        machine.show(&mut timers);
        machine.show(&mut timers);
        assert_eq!(timers.len(), 1);
        assert!(timers.is_pending(&SETTLE_TIMER));
    }

    #[test]
    fn keep_visible_blocks_dwell_hide() {
        let (mut machine, mut timers) = started(PanelConfig::default());
        machine.show(&mut timers);
        assert!(machine.set_keep_visible());

        assert!(run(&mut machine, &mut timers, ms(5000)).is_empty());
        assert_eq!(machine.state(), VisibilityState::VisibleKeptAlive);

        assert!(machine.remove_keep_visible(&mut timers));
        assert!(run(&mut machine, &mut timers, ms(1999)).is_empty());
        assert_eq!(run(&mut machine, &mut timers, ms(1)), vec![VisibilityNotice::Hidden]);
    }

    #[test]
    fn keep_visible_ignored_while_hidden() {
        let (mut machine, mut timers) = started(PanelConfig::default());
        assert!(!machine.set_keep_visible());
        assert!(!machine.remove_keep_visible(&mut timers));
        assert!(timers.is_empty());
    }

    #[test]
    fn touch_hold_persists_until_next_activity() {
        let config = PanelConfig::default().with_device(DeviceProfile::Touch);
        let (mut machine, mut timers) = started(config);
        machine.show(&mut timers);
        run(&mut machine, &mut timers, ms(300));
        assert!(timers.is_pending(&DWELL_TIMER));

        assert!(machine.touch_start(&mut timers));
        assert!(!timers.is_pending(&DWELL_TIMER));
        assert!(run(&mut machine, &mut timers, ms(60_000)).is_empty());
        assert_eq!(machine.state(), VisibilityState::VisibleKeptAlive);

        machine.show(&mut timers);
        assert_eq!(machine.state(), VisibilityState::Visible);
        assert_eq!(run(&mut machine, &mut timers, ms(3300)), vec![VisibilityNotice::Hidden]);
    }

    #[test]
    fn pointer_hold_survives_activity_ticks() {
        let (mut machine, mut timers) = started(PanelConfig::default());
        machine.show(&mut timers);
        machine.set_keep_visible();
        machine.show(&mut timers);
        assert_eq!(machine.state(), VisibilityState::VisibleKeptAlive);
    }

    #[test]
    fn touch_dwell_outlasts_pointer_dwell() {
        fn time_to_hide(device: DeviceProfile) -> Duration {
            let (mut machine, mut timers) = started(PanelConfig::default().with_device(device));
            machine.show(&mut timers);
            let start = timers.now();
            while machine.is_visible() {
                run(&mut machine, &mut timers, ms(50));
            }
            timers.now() - start
        }

        let pointer = time_to_hide(DeviceProfile::Pointer);
        let touch = time_to_hide(DeviceProfile::Touch);
        assert_eq!(pointer, ms(2300));
        assert_eq!(touch, ms(3300));
        assert!(touch >= pointer);
    }

    #[test]
    fn media_reset_shows_or_hides() {
        let (mut machine, mut timers) = started(PanelConfig::default());
        assert_eq!(machine.media_reset(&mut timers), Some(VisibilityNotice::Shown));
        assert!(!machine.is_media_started());

        let (mut suppressed, mut timers) =
            started(PanelConfig::default().suppress_until_start(true));
        suppressed.show(&mut timers);
        assert_eq!(suppressed.media_reset(&mut timers), Some(VisibilityNotice::Hidden));
        assert!(!suppressed.is_media_started());
    }

    #[test]
    fn teardown_cancels_panel_timers() {
        let (mut machine, mut timers) = started(PanelConfig::default());
        machine.show(&mut timers);
        machine.teardown(&mut timers);
        assert!(timers.is_empty());
    }
}
