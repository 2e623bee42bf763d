use std::io::{self, Write};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{
    self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
    Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};

use crate::config::DeviceProfile;
use crate::error::{PanelError, Result};
use crate::runtime::PlayerHost;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverFlow {
    Continue,
    Exit,
}

/// Runs a [`PlayerHost`] against a real terminal.
///
/// Mouse motion counts as pointer activity on the player, losing terminal
/// focus as the pointer leaving it. Wall-clock time drives the host's timers.
pub struct TerminalDriver {
    host: PlayerHost,
    tick: Duration,
}

impl TerminalDriver {
    pub fn new(host: PlayerHost) -> Self {
        Self {
            host,
            tick: Duration::from_millis(50),
        }
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn host(&self) -> &PlayerHost {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut PlayerHost {
        &mut self.host
    }

    /// Run until the user quits, handing the host back afterwards.
    pub fn run(mut self) -> Result<PlayerHost> {
        let mut stdout = io::stdout();
        self.enter(&mut stdout)?;
        let result = self.run_inner(&mut stdout);
        self.exit(&mut stdout);
        result.map(|_| self.host)
    }

    fn run_inner(&mut self, stdout: &mut impl Write) -> Result<()> {
        self.host.render();
        self.draw(stdout)?;

        let mut last = Instant::now();
        let mut shown = self.host.media_control().is_visible();
        loop {
            if event::poll(self.tick)? {
                if self.handle_event(event::read()?) == DriverFlow::Exit {
                    return Ok(());
                }
            }

            let now = Instant::now();
            self.host.advance(now.duration_since(last));
            last = now;

            let visible = self.host.media_control().is_visible();
            if !self.host.take_dirty().is_empty() || visible != shown {
                shown = visible;
                self.draw(stdout)?;
            }
        }
    }

    /// Translate one terminal event into host input.
    pub fn handle_event(&mut self, event: CrosstermEvent) -> DriverFlow {
        match event {
            CrosstermEvent::Key(key) => self.handle_key(key),
            CrosstermEvent::Mouse(mouse) => {
                self.handle_mouse(mouse);
                DriverFlow::Continue
            }
            CrosstermEvent::FocusLost => {
                self.host.pointer_leave();
                DriverFlow::Continue
            }
            CrosstermEvent::FocusGained => {
                self.host.pointer_move();
                DriverFlow::Continue
            }
            _ => DriverFlow::Continue,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> DriverFlow {
        if key.kind == KeyEventKind::Release {
            return DriverFlow::Continue;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return DriverFlow::Exit,
            KeyCode::Char(' ') => self.host.play(),
            KeyCode::Char('p') => self.host.pause(),
            KeyCode::Char('s') => self.host.stop(),
            _ => self.host.pointer_move(),
        }
        DriverFlow::Continue
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => self.host.pointer_move(),
            MouseEventKind::Down(_) => {
                self.host.pointer_move();
                if self.host.media_control().config().device == DeviceProfile::Touch {
                    self.host.touch_controls();
                }
            }
            _ => {}
        }
    }

    fn draw(&self, stdout: &mut impl Write) -> Result<()> {
        execute!(stdout, MoveTo(0, 0), Clear(ClearType::All))?;
        if self.host.media_control().is_visible() {
            for (row, line) in self.host.outline().lines().enumerate() {
                execute!(stdout, MoveTo(0, row as u16))?;
                write!(stdout, "{line}")?;
            }
        }
        stdout.flush()?;
        Ok(())
    }

    fn enter(&self, stdout: &mut impl Write) -> Result<()> {
        terminal::enable_raw_mode().map_err(|err| PanelError::Terminal(err.to_string()))?;
        execute!(
            stdout,
            EnterAlternateScreen,
            EnableMouseCapture,
            EnableFocusChange,
            Hide,
            Clear(ClearType::All)
        )?;
        Ok(())
    }

    fn exit(&self, stdout: &mut impl Write) {
        execute!(
            stdout,
            DisableFocusChange,
            DisableMouseCapture,
            Show,
            LeaveAlternateScreen
        )
        .ok();
        terminal::disable_raw_mode().ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::ContainerRef;
    use crate::config::{PanelConfig, ZoneConfig};
    use crate::visibility::VisibilityState;
    use crossterm::event::{KeyModifiers, MouseButton};

    fn mouse(kind: MouseEventKind) -> CrosstermEvent {
        CrosstermEvent::Mouse(MouseEvent {
            kind,
            column: 3,
            row: 4,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn started_driver(config: PanelConfig) -> TerminalDriver {
        let mut host = PlayerHost::new(config);
        host.render();
        host.set_active_container(Some(ContainerRef::new(1, 1)));
        host.play();
        TerminalDriver::new(host)
    }

    #[test]
    fn mouse_motion_shows_and_focus_loss_hides() {
        let mut driver = started_driver(PanelConfig::new(ZoneConfig::default()));
        assert_eq!(
            driver.host().media_control().visibility(),
            VisibilityState::Hidden
        );

        driver.handle_event(mouse(MouseEventKind::Moved));
        assert_eq!(
            driver.host().media_control().visibility(),
            VisibilityState::Visible
        );

        driver.handle_event(CrosstermEvent::FocusLost);
        assert_eq!(
            driver.host().media_control().visibility(),
            VisibilityState::Hidden
        );
    }

    #[test]
    fn press_on_touch_device_holds_panel() {
        let config =
            PanelConfig::new(ZoneConfig::default()).with_device(DeviceProfile::Touch);
        let mut driver = started_driver(config);
        driver.handle_event(mouse(MouseEventKind::Down(MouseButton::Left)));
        assert_eq!(
            driver.host().media_control().visibility(),
            VisibilityState::VisibleKeptAlive
        );
    }

    #[test]
    fn quit_keys_exit() {
        let mut driver = started_driver(PanelConfig::default());
        let key = CrosstermEvent::Key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE));
        assert_eq!(driver.handle_event(key), DriverFlow::Continue);
        let quit = CrosstermEvent::Key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE));
        assert_eq!(driver.handle_event(quit), DriverFlow::Exit);
        let esc = CrosstermEvent::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert_eq!(driver.handle_event(esc), DriverFlow::Exit);
    }
}
