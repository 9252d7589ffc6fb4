//! Domain primitive types used across the contmon workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a container, as encoded on the event stream.
///
/// The numeric codes match the daemon's wire encoding; they are stable
/// across daemon versions and must not be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerState {
    /// Container is not running.
    Stopped,
    /// Container is being started.
    Starting,
    /// Container is actively running.
    Running,
    /// Container is being stopped.
    Stopping,
    /// Container startup was aborted.
    Aborting,
    /// Container is being frozen.
    Freezing,
    /// Container is frozen.
    Frozen,
    /// Container has been thawed after a freeze.
    Thawed,
}

impl ContainerState {
    /// Maps a numeric state code from the event stream to its state.
    ///
    /// Returns `None` for codes this build does not know about; callers
    /// decide how to render those.
    #[must_use]
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Stopped),
            1 => Some(Self::Starting),
            2 => Some(Self::Running),
            3 => Some(Self::Stopping),
            4 => Some(Self::Aborting),
            5 => Some(Self::Freezing),
            6 => Some(Self::Frozen),
            7 => Some(Self::Thawed),
            _ => None,
        }
    }

    /// Returns the uppercase display label for this state.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Stopped => "STOPPED",
            Self::Starting => "STARTING",
            Self::Running => "RUNNING",
            Self::Stopping => "STOPPING",
            Self::Aborting => "ABORTING",
            Self::Freezing => "FREEZING",
            Self::Frozen => "FROZEN",
            Self::Thawed => "THAWED",
        }
    }
}

impl fmt::Display for ContainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_code_maps_known_states() {
        assert_eq!(ContainerState::from_code(0), Some(ContainerState::Stopped));
        assert_eq!(ContainerState::from_code(2), Some(ContainerState::Running));
        assert_eq!(ContainerState::from_code(7), Some(ContainerState::Thawed));
    }

    #[test]
    fn from_code_rejects_unknown_codes() {
        assert_eq!(ContainerState::from_code(-1), None);
        assert_eq!(ContainerState::from_code(8), None);
        assert_eq!(ContainerState::from_code(1000), None);
    }

    #[test]
    fn labels_are_uppercase() {
        assert_eq!(ContainerState::Running.label(), "RUNNING");
        assert_eq!(ContainerState::Stopped.to_string(), "STOPPED");
    }
}
