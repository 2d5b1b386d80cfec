// SPDX-License-Identifier: MIT OR Apache-2.0

//! Commands a presentation layer can send to the game state

use crate::{PlayerKey, PlayerUpdate};
use serde::{Deserialize, Serialize};

/// Messages sent from a front-end to the game state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Start a new game
    StartGame,
    /// Stop the running game
    StopGame,
    /// Start when stopped, stop when running
    ToggleGame,
    /// Restore every player to starting ammo and health
    ResetGame,
    /// Move a player into an empty slot
    MovePlayer { from: PlayerKey, to: PlayerKey },
    /// Drop a player into a slot, pushing occupants down
    InsertPlayer { from: PlayerKey, to: PlayerKey },
    /// Remove a player from the roster
    DeletePlayer { key: PlayerKey },
    /// Add a player to a team, or to the smallest team when `None`
    AddPlayer { team: Option<u8> },
    /// Apply reported stats to a player
    UpdatePlayer { key: PlayerKey, update: PlayerUpdate },
    /// Change the number of teams
    SetTargetTeamCount { count: u8 },
    /// Change the length of the next game, in seconds
    SetGameTime { seconds: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_json() {
        let cmd = Command::MovePlayer {
            from: PlayerKey::new(1, 2),
            to: PlayerKey::new(2, 1),
        };
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("MovePlayer"));
        assert_eq!(serde_json::from_str::<Command>(&json).unwrap(), cmd);
    }
}
