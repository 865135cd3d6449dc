//! Room configuration and lifecycle state.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Settings shared by every room a registry creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Maximum players allowed in the room, creator included.
    pub max_players: usize,

    /// Points every player starts with. A player whose points drop to
    /// zero or below is eliminated.
    pub starting_points: i32,

    /// Faces on the damage die. Rolls are uniform in `1..=die_sides`.
    pub die_sides: u32,

    /// Capacity of the room actor's command channel.
    pub channel_size: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            max_players: 6,
            starting_points: 20,
            die_sides: 6,
            channel_size: 64,
        }
    }
}

// ---------------------------------------------------------------------------
// RoomState
// ---------------------------------------------------------------------------

/// The lifecycle state of a room.
///
/// Transitions are strictly ordered, no skipping states:
///
/// ```text
/// Lobby → InProgress → Ended
/// ```
///
/// - **Lobby**: room exists and accepts joins. Nobody holds cards yet.
/// - **InProgress**: the creator started the game. Joins are refused and
///   the turn rotation is live.
/// - **Ended**: the creator ended the game or a single player is left
///   standing. Every game command is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomState {
    Lobby,
    InProgress,
    Ended,
}

impl RoomState {
    /// Returns `true` if the room is accepting new players.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Lobby)
    }

    /// Returns `true` once the game has been started, even if it has
    /// since ended.
    pub fn is_started(&self) -> bool {
        !matches!(self, Self::Lobby)
    }

    /// Returns `true` while game commands are accepted.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::InProgress)
    }

    /// The state that follows this one, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Lobby => Some(Self::InProgress),
            Self::InProgress => Some(Self::Ended),
            Self::Ended => None,
        }
    }

    /// Returns `true` if transitioning to `target` is valid.
    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target)
    }
}

impl std::fmt::Display for RoomState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lobby => write!(f, "Lobby"),
            Self::InProgress => write!(f, "InProgress"),
            Self::Ended => write!(f, "Ended"),
        }
    }
}
