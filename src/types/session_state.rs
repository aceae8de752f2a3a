//! Driver session lifecycle state machine

use crate::source::DeviceEvent;

/// Lifecycle of the connection to the tracking driver.
///
/// `Closed -> Open` happens when the driver connection is established;
/// everything after that is driven by polled events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No driver connection established.
    Closed,
    /// Driver connection open, no tracking-capable connection event yet.
    Open,
    /// Tracking events may arrive.
    Streaming,
    /// The driver reported the connection lost. Terminal: the whole
    /// pipeline shuts down.
    Lost,
}

impl SessionState {
    /// Next state after observing a driver event.
    ///
    /// `DeviceLost` deliberately leaves the state untouched: tracking may
    /// resume when the device returns.
    pub fn on_event(self, event: &DeviceEvent) -> SessionState {
        match (self, event) {
            (_, DeviceEvent::ConnectionLost) => SessionState::Lost,
            (SessionState::Open, DeviceEvent::Connected) => SessionState::Streaming,
            (state, _) => state,
        }
    }

    /// Terminal states end the session for the rest of the process lifetime.
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Lost)
    }
}
