use std::fmt;

/// Connectivity as seen by the publishing pipeline.
///
/// ```text
/// Disconnected --connect ok--> Connected --disconnect event--> Disconnected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectivityState {
    #[default]
    Disconnected,
    Connected,
}

impl fmt::Display for ConnectivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectivityState::Disconnected => write!(f, "disconnected"),
            ConnectivityState::Connected => write!(f, "connected"),
        }
    }
}
