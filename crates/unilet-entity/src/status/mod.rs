//! User presence status entities.

pub mod model;

pub use model::{StatusChange, UserStatus};

use serde::{Deserialize, Serialize};

/// Self-reported availability state for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "presence_state", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PresenceState {
    /// User is connected and available.
    Online,
    /// User is away from their device.
    Away,
    /// User does not want to be disturbed.
    Busy,
    /// User is not connected.
    Offline,
}

impl PresenceState {
    /// Return the state as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Away => "away",
            Self::Busy => "busy",
            Self::Offline => "offline",
        }
    }
}

impl std::fmt::Display for PresenceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PresenceState {
    type Err = unilet_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "online" => Ok(Self::Online),
            "away" => Ok(Self::Away),
            "busy" => Ok(Self::Busy),
            "offline" => Ok(Self::Offline),
            _ => Err(unilet_core::AppError::validation(format!(
                "Invalid presence state: '{s}'. Expected one of: online, away, busy, offline"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_round_trips_as_str() {
        for state in [
            PresenceState::Online,
            PresenceState::Away,
            PresenceState::Busy,
            PresenceState::Offline,
        ] {
            assert_eq!(PresenceState::from_str(state.as_str()).unwrap(), state);
        }
    }

    #[test]
    fn test_rejects_unknown_state() {
        assert!(PresenceState::from_str("invisible").is_err());
    }
}
