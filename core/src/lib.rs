// SPDX-License-Identifier: MIT OR Apache-2.0

//! BraidsTag Core - Game State Engine
//!
//! This crate provides the game control logic behind a BraidsTag server:
//! - Team/player roster management (sparse, 1-based slots)
//! - Game lifecycle: start, stop, reset and the game clock
//! - Player update event stream for presentation layers
//! - Configuration and serializable snapshots of the game state

#![deny(unsafe_code)]
#![deny(clippy::all)]

pub mod clock;
pub mod command;
pub mod config;
pub mod events;
pub mod roster;
pub mod snapshot;
pub mod state;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Smallest number of teams a game can be configured for
pub const MIN_TEAM_COUNT: u8 = 1;
/// Largest number of teams a game can be configured for
pub const MAX_TEAM_COUNT: u8 = 8;
/// Shortest game, in seconds
pub const MIN_GAME_TIME: u32 = 60;
/// Longest game, in seconds
pub const MAX_GAME_TIME: u32 = 30 * 60;

/// Roster coordinate of a player: team and slot within the team, both 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerKey {
    /// Team number (column)
    pub team: u8,
    /// Slot within the team (row)
    pub slot: u8,
}

impl PlayerKey {
    /// Create a new key
    pub fn new(team: u8, slot: u8) -> Self {
        Self { team, slot }
    }

    /// Both components are 1-based, so zero is never a valid coordinate
    pub fn is_valid(&self) -> bool {
        self.team > 0 && self.slot > 0
    }
}

impl fmt::Display for PlayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.team, self.slot)
    }
}

/// A player in the roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Team the player is currently in
    pub team_id: u8,
    /// Slot the player currently occupies
    pub player_id: u8,
    /// Remaining ammunition
    pub ammo: u32,
    /// Current health
    pub health: u32,
    /// Health at full strength
    pub max_health: u32,
}

impl Player {
    /// Create a player at full health
    pub fn new(key: PlayerKey, ammo: u32, max_health: u32) -> Self {
        Self {
            team_id: key.team,
            player_id: key.slot,
            ammo,
            health: max_health,
            max_health,
        }
    }

    /// The roster key this player is stored under
    pub fn key(&self) -> PlayerKey {
        PlayerKey::new(self.team_id, self.player_id)
    }

    pub(crate) fn relocate(&mut self, key: PlayerKey) {
        self.team_id = key.team;
        self.player_id = key.slot;
    }

    /// Health as a fraction of max health in `0.0..=1.0`
    pub fn health_fraction(&self) -> f32 {
        if self.max_health == 0 {
            return 0.0;
        }
        (self.health.min(self.max_health) as f32) / (self.max_health as f32)
    }

    /// Whether the player still has health left
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }
}

/// A reported change to a player's stats; `None` fields are left unchanged
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerUpdate {
    /// New ammo count
    pub ammo: Option<u32>,
    /// New health, clamped to the player's max health
    pub health: Option<u32>,
}

impl PlayerUpdate {
    /// True when the update would change nothing
    pub fn is_empty(&self) -> bool {
        self.ammo.is_none() && self.health.is_none()
    }
}

/// Errors returned by game state commands.
///
/// A command that fails leaves the state untouched and emits no events.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    /// A team or slot of zero was given
    #[error("Invalid player key {0}: teams and slots are 1-based")]
    InvalidKey(PlayerKey),

    /// The team is beyond the current team count
    #[error("Team {team} is out of range (1..={team_count})")]
    TeamOutOfRange {
        /// Requested team
        team: u8,
        /// Current team count
        team_count: u8,
    },

    /// The slot is beyond the end of the roster
    #[error("Slot {slot} is out of range (1..={max_slot})")]
    SlotOutOfRange {
        /// Requested slot
        slot: u8,
        /// Largest slot currently addressable
        max_slot: u8,
    },

    /// No player at the given key
    #[error("No player at {0}")]
    NoSuchPlayer(PlayerKey),

    /// A player already occupies the target key
    #[error("Slot {0} is already occupied")]
    SlotOccupied(PlayerKey),

    /// A team has no free slot left
    #[error("Team {0} is full")]
    TeamFull(u8),

    /// Target team count outside the supported range
    #[error("Team count {0} must be between {} and {}", MIN_TEAM_COUNT, MAX_TEAM_COUNT)]
    InvalidTeamCount(u8),

    /// Game time outside the supported range
    #[error("Game time {0}s must be between {}s and {}s", MIN_GAME_TIME, MAX_GAME_TIME)]
    InvalidGameTime(u32),

    /// The command is not allowed while a game is running
    #[error("A game is already in progress")]
    GameInProgress,

    /// The command needs a running game
    #[error("No game is in progress")]
    NoGameInProgress,
}

pub use clock::{format_clock, Clock, ManualClock, SystemClock};
pub use command::Command;
pub use config::GameConfig;
pub use events::{EventBus, GameEvent, GameObserver, ObserverId};
pub use roster::Roster;
pub use snapshot::GameSnapshot;
pub use state::GameState;
