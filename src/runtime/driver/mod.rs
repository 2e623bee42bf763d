//! Drivers that feed real input into a [`PlayerHost`](super::PlayerHost).

mod terminal;

pub use terminal::{DriverFlow, TerminalDriver};
