// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serializable view of the game state for front-ends

use crate::{Player, PlayerKey};
use serde::{Deserialize, Serialize};

/// Everything a front-end needs to draw the game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Whether a game is running
    pub running: bool,
    /// Number of team columns
    pub team_count: u8,
    /// Number of player rows
    pub largest_team: u8,
    /// Team count chosen by the operator
    pub target_team_count: u8,
    /// Configured length of a game
    pub game_time_secs: u32,
    /// Seconds left on the clock, zero once it has run out
    pub time_remaining_secs: u64,
    /// Players ordered by team, then slot
    pub players: Vec<Player>,
}

impl GameSnapshot {
    /// The player at a table cell, if any
    pub fn cell(&self, team: u8, slot: u8) -> Option<&Player> {
        let key = PlayerKey::new(team, slot);
        self.players
            .binary_search_by_key(&key, Player::key)
            .ok()
            .map(|idx| &self.players[idx])
    }

    /// Column header for a team
    pub fn team_header(team: u8) -> String {
        format!("Team {}", team)
    }

    /// Serialize to a single line of JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
