// SPDX-License-Identifier: MIT OR Apache-2.0

//! The game state engine: roster, game clock and event emission

use crate::clock::{Clock, SystemClock};
use crate::events::{EventBus, GameEvent, GameObserver, ObserverId};
use crate::{
    Command, GameConfig, GameError, GameSnapshot, Player, PlayerKey, PlayerUpdate, Roster,
    MAX_GAME_TIME, MAX_TEAM_COUNT, MIN_GAME_TIME, MIN_TEAM_COUNT,
};
use chrono::{DateTime, Utc};
use crossbeam_channel::Receiver;
use std::time::Duration;

/// Owns the roster and game clock and notifies subscribers of changes.
///
/// Every player key lies within `[1, team_count] x [1, largest_team]`;
/// both dimensions are recomputed after each roster change. At most one
/// game runs at a time.
#[derive(Debug)]
pub struct GameState {
    roster: Roster,
    team_count: u8,
    largest_team: u8,
    target_team_count: u8,
    game_time: u32,
    game_end_time: Option<DateTime<Utc>>,
    running: bool,
    starting_ammo: u32,
    max_health: u32,
    clock: Box<dyn Clock>,
    events: EventBus,
}

impl Default for GameState {
    fn default() -> Self {
        Self::build(&GameConfig::default(), Box::new(SystemClock))
    }
}

impl GameState {
    /// Create an empty game state using the wall clock
    pub fn new(config: &GameConfig) -> Result<Self, GameError> {
        Self::with_clock(config, SystemClock)
    }

    /// Create an empty game state driven by the given clock
    pub fn with_clock<C>(config: &GameConfig, clock: C) -> Result<Self, GameError>
    where
        C: Clock + 'static,
    {
        config.validate()?;
        Ok(Self::build(config, Box::new(clock)))
    }

    fn build(config: &GameConfig, clock: Box<dyn Clock>) -> Self {
        Self {
            roster: Roster::new(),
            team_count: config.target_team_count,
            largest_team: 0,
            target_team_count: config.target_team_count,
            game_time: config.game_time_secs,
            game_end_time: None,
            running: false,
            starting_ammo: config.starting_ammo,
            max_health: config.max_health,
            clock,
            events: EventBus::new(),
        }
    }

    // ---- subscriptions ----

    /// Register an observer called synchronously for every event
    pub fn subscribe<O>(&mut self, observer: O) -> ObserverId
    where
        O: GameObserver + 'static,
    {
        self.events.subscribe(observer)
    }

    /// Remove an observer
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Get a receiver for game events
    pub fn channel(&mut self) -> Receiver<GameEvent> {
        self.events.channel()
    }

    // ---- game lifecycle ----

    /// Start a new game. Fails if one is already running.
    pub fn start_game(&mut self) -> Result<(), GameError> {
        if self.running {
            tracing::warn!("Start requested while a game is running");
            return Err(GameError::GameInProgress);
        }

        let ends_at = self.clock.now() + chrono::Duration::seconds(i64::from(self.game_time));
        self.game_end_time = Some(ends_at);
        self.running = true;

        tracing::info!(
            %ends_at,
            game_time = self.game_time,
            players = self.roster.len(),
            "Game started"
        );
        self.events.publish(GameEvent::GameStarted { ends_at });
        Ok(())
    }

    /// Stop the running game
    pub fn stop_game(&mut self) -> Result<(), GameError> {
        if !self.running {
            return Err(GameError::NoGameInProgress);
        }
        self.end_game();
        Ok(())
    }

    /// Start when stopped, stop when running
    pub fn toggle_game(&mut self) -> Result<(), GameError> {
        if self.running {
            self.stop_game()
        } else {
            self.start_game()
        }
    }

    /// Stop the game if its clock has run out. Returns true if it did.
    pub fn expire_if_elapsed(&mut self) -> bool {
        match self.game_end_time {
            Some(end) if self.running && self.clock.now() >= end => {
                tracing::info!("Game time elapsed");
                self.end_game();
                true
            }
            _ => false,
        }
    }

    fn end_game(&mut self) {
        let now = self.clock.now();
        // Pin the end time to the past so time queries read zero
        self.game_end_time = Some(match self.game_end_time {
            Some(end) if end < now => end,
            _ => now,
        });
        self.running = false;

        tracing::info!("Game stopped");
        self.events.publish(GameEvent::GameStopped);
    }

    /// Restore every player to starting ammo and full health.
    ///
    /// Not allowed while a game is running.
    pub fn reset_game(&mut self) -> Result<(), GameError> {
        if self.running {
            tracing::warn!("Reset requested while a game is running");
            return Err(GameError::GameInProgress);
        }

        let starting_ammo = self.starting_ammo;
        let mut touched = Vec::with_capacity(self.roster.len());
        for player in self.roster.iter_mut() {
            player.ammo = starting_ammo;
            player.health = player.max_health;
            touched.push(player.key());
        }
        self.game_end_time = None;

        tracing::info!(players = touched.len(), "Game reset");
        for key in touched {
            self.events.publish(GameEvent::player_updated(key));
        }
        Ok(())
    }

    /// Whether a game is running
    pub fn is_game_started(&self) -> bool {
        self.running
    }

    /// Time left on the game clock; zero once the end time has passed
    pub fn time_remaining(&self) -> Duration {
        match self.game_end_time {
            Some(end) => (end - self.clock.now()).to_std().unwrap_or(Duration::ZERO),
            None => Duration::ZERO,
        }
    }

    // ---- roster ----

    /// Move a player into an empty slot.
    ///
    /// The target team must exist and the target slot may be at most one
    /// past the current largest team. Moving a player onto itself is a no-op.
    pub fn move_player(&mut self, from: PlayerKey, to: PlayerKey) -> Result<(), GameError> {
        self.check_move(from, to)?;
        if from == to {
            return Ok(());
        }
        if self.roster.contains(to) {
            return Err(GameError::SlotOccupied(to));
        }

        self.roster.relocate(from, to);
        self.refresh_dimensions();

        tracing::debug!(%from, %to, "Player moved");
        self.events.publish(GameEvent::player_updated(from));
        self.events.publish(GameEvent::player_updated(to));
        Ok(())
    }

    /// Drop a player into a slot, pushing the players at and below it down
    /// to the first gap in the target team.
    pub fn insert_player(&mut self, from: PlayerKey, to: PlayerKey) -> Result<(), GameError> {
        self.check_move(from, to)?;
        if from == to {
            return Ok(());
        }

        let player = self
            .roster
            .remove(from)
            .ok_or(GameError::NoSuchPlayer(from))?;

        let blank = match self.roster.shift_down(to.team, to.slot) {
            Some(blank) => blank,
            None => {
                let restored = self.roster.place(from, player).is_ok();
                debug_assert!(restored, "lifted player {} should return to its slot", from);
                return Err(GameError::TeamFull(to.team));
            }
        };

        let placed = self.roster.place(to, player).is_ok();
        debug_assert!(placed, "insert target {} should be empty after shift", to);
        self.refresh_dimensions();

        let shifted = to.slot..=blank;
        let mut touched = Vec::with_capacity(usize::from(blank - to.slot) + 2);
        if from.team != to.team || !shifted.contains(&from.slot) {
            touched.push(from);
        }
        touched.extend(shifted.map(|slot| PlayerKey::new(to.team, slot)));

        tracing::debug!(%from, %to, shifted = blank - to.slot, "Player inserted");
        for key in touched {
            self.events.publish(GameEvent::player_updated(key));
        }
        Ok(())
    }

    /// Remove a player from the roster
    pub fn delete_player(&mut self, key: PlayerKey) -> Result<Player, GameError> {
        Self::check_key(key)?;
        let player = self.roster.remove(key).ok_or(GameError::NoSuchPlayer(key))?;
        self.refresh_dimensions();

        tracing::debug!(%key, "Player deleted");
        self.events.publish(GameEvent::player_updated(key));
        Ok(player)
    }

    /// Add a player with starting ammo and full health.
    ///
    /// With a team, the player takes that team's lowest free slot. Without,
    /// the team with the fewest players is chosen, lowest number first.
    pub fn add_player(&mut self, team: Option<u8>) -> Result<PlayerKey, GameError> {
        let team = match team {
            Some(team) => {
                self.check_team(team)?;
                team
            }
            None => self.smallest_team(),
        };

        let slot = self
            .roster
            .first_free_slot(team)
            .ok_or(GameError::TeamFull(team))?;
        let key = PlayerKey::new(team, slot);

        let player = Player::new(key, self.starting_ammo, self.max_health);
        if self.roster.place(key, player).is_err() {
            return Err(GameError::SlotOccupied(key));
        }
        self.refresh_dimensions();

        tracing::info!(%key, "Player added");
        self.events.publish(GameEvent::player_added(key));
        Ok(key)
    }

    /// Apply reported ammo and health to a player
    pub fn update_player(&mut self, key: PlayerKey, update: PlayerUpdate) -> Result<(), GameError> {
        Self::check_key(key)?;
        let player = self
            .roster
            .get_mut(key)
            .ok_or(GameError::NoSuchPlayer(key))?;

        if update.is_empty() {
            return Ok(());
        }
        if let Some(ammo) = update.ammo {
            player.ammo = ammo;
        }
        if let Some(health) = update.health {
            player.health = health.min(player.max_health);
        }

        tracing::debug!(%key, ammo = player.ammo, health = player.health, "Player updated");
        self.events.publish(GameEvent::player_updated(key));
        Ok(())
    }

    // ---- settings ----

    /// Set the number of teams. The team count never drops below the
    /// highest team that still has players.
    pub fn set_target_team_count(&mut self, count: u8) -> Result<(), GameError> {
        if !(MIN_TEAM_COUNT..=MAX_TEAM_COUNT).contains(&count) {
            return Err(GameError::InvalidTeamCount(count));
        }
        self.target_team_count = count;
        self.refresh_dimensions();
        tracing::debug!(count, team_count = self.team_count, "Target team count set");
        Ok(())
    }

    /// Set the length of the next game, in seconds
    pub fn set_game_time(&mut self, seconds: u32) -> Result<(), GameError> {
        if !(MIN_GAME_TIME..=MAX_GAME_TIME).contains(&seconds) {
            return Err(GameError::InvalidGameTime(seconds));
        }
        self.game_time = seconds;
        tracing::debug!(seconds, "Game time set");
        Ok(())
    }

    /// Dispatch a command to the matching operation
    pub fn apply(&mut self, command: Command) -> Result<(), GameError> {
        match command {
            Command::StartGame => self.start_game(),
            Command::StopGame => self.stop_game(),
            Command::ToggleGame => self.toggle_game(),
            Command::ResetGame => self.reset_game(),
            Command::MovePlayer { from, to } => self.move_player(from, to),
            Command::InsertPlayer { from, to } => self.insert_player(from, to),
            Command::DeletePlayer { key } => self.delete_player(key).map(|_| ()),
            Command::AddPlayer { team } => self.add_player(team).map(|_| ()),
            Command::UpdatePlayer { key, update } => self.update_player(key, update),
            Command::SetTargetTeamCount { count } => self.set_target_team_count(count),
            Command::SetGameTime { seconds } => self.set_game_time(seconds),
        }
    }

    // ---- queries ----

    /// Get the player at the specified key
    pub fn player(&self, key: PlayerKey) -> Option<&Player> {
        self.roster.get(key)
    }

    /// The roster
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Number of team columns
    pub fn team_count(&self) -> u8 {
        self.team_count
    }

    /// Highest occupied slot in any team
    pub fn largest_team(&self) -> u8 {
        self.largest_team
    }

    /// Team count chosen by the operator
    pub fn target_team_count(&self) -> u8 {
        self.target_team_count
    }

    /// Length of a game, in seconds
    pub fn game_time(&self) -> u32 {
        self.game_time
    }

    /// When the current or last game ends or ended
    pub fn game_end_time(&self) -> Option<DateTime<Utc>> {
        self.game_end_time
    }

    /// Serializable view of the whole state
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            running: self.running,
            team_count: self.team_count,
            largest_team: self.largest_team,
            target_team_count: self.target_team_count,
            game_time_secs: self.game_time,
            time_remaining_secs: self.time_remaining().as_secs(),
            players: self.roster.iter().cloned().collect(),
        }
    }

    // ---- helpers ----

    fn check_key(key: PlayerKey) -> Result<(), GameError> {
        if key.is_valid() {
            Ok(())
        } else {
            Err(GameError::InvalidKey(key))
        }
    }

    fn check_team(&self, team: u8) -> Result<(), GameError> {
        if team == 0 || team > self.team_count {
            return Err(GameError::TeamOutOfRange {
                team,
                team_count: self.team_count,
            });
        }
        Ok(())
    }

    fn check_move(&self, from: PlayerKey, to: PlayerKey) -> Result<(), GameError> {
        Self::check_key(from)?;
        Self::check_key(to)?;
        if !self.roster.contains(from) {
            return Err(GameError::NoSuchPlayer(from));
        }
        self.check_team(to.team)?;

        let max_slot = self.largest_team.saturating_add(1);
        if to.slot > max_slot {
            return Err(GameError::SlotOutOfRange {
                slot: to.slot,
                max_slot,
            });
        }
        Ok(())
    }

    fn smallest_team(&self) -> u8 {
        (1..=self.team_count)
            .min_by_key(|&team| self.roster.team_size(team))
            .unwrap_or(1)
    }

    fn refresh_dimensions(&mut self) {
        self.team_count = self.target_team_count.max(self.roster.highest_team());
        self.largest_team = self.roster.highest_slot();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ManualClock;

    fn state() -> (GameState, ManualClock) {
        let clock = ManualClock::default();
        let state = GameState::with_clock(&GameConfig::default(), clock.clone()).unwrap();
        (state, clock)
    }

    #[test]
    fn test_new_state_is_empty() {
        let (state, _) = state();
        assert!(!state.is_game_started());
        assert_eq!(state.team_count(), 2);
        assert_eq!(state.largest_team(), 0);
        assert_eq!(state.time_remaining(), Duration::ZERO);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = GameConfig {
            target_team_count: 0,
            ..GameConfig::default()
        };
        assert!(matches!(
            GameState::new(&config),
            Err(GameError::InvalidTeamCount(0))
        ));
    }

    #[test]
    fn test_smallest_team_prefers_lowest_id() {
        let (mut state, _) = state();
        assert_eq!(state.add_player(None).unwrap(), PlayerKey::new(1, 1));
        assert_eq!(state.add_player(None).unwrap(), PlayerKey::new(2, 1));
        assert_eq!(state.add_player(None).unwrap(), PlayerKey::new(1, 2));
    }

    #[test]
    fn test_add_fills_gaps() {
        let (mut state, _) = state();
        for _ in 0..3 {
            state.add_player(Some(1)).unwrap();
        }
        state.delete_player(PlayerKey::new(1, 2)).unwrap();
        assert_eq!(state.add_player(Some(1)).unwrap(), PlayerKey::new(1, 2));
    }

    #[test]
    fn test_update_clamps_health() {
        let (mut state, _) = state();
        let key = state.add_player(Some(1)).unwrap();
        state
            .update_player(
                key,
                PlayerUpdate {
                    ammo: Some(7),
                    health: Some(500),
                },
            )
            .unwrap();
        let player = state.player(key).unwrap();
        assert_eq!(player.ammo, 7);
        assert_eq!(player.health, 100);
    }

    #[test]
    fn test_team_count_keeps_occupied_teams() {
        let (mut state, _) = state();
        state.set_target_team_count(4).unwrap();
        state.add_player(Some(4)).unwrap();
        state.set_target_team_count(2).unwrap();
        assert_eq!(state.target_team_count(), 2);
        assert_eq!(state.team_count(), 4);

        state.delete_player(PlayerKey::new(4, 1)).unwrap();
        assert_eq!(state.team_count(), 2);
    }

    #[test]
    fn test_stop_pins_end_time() {
        let (mut state, clock) = state();
        state.start_game().unwrap();
        clock.advance(Duration::from_secs(30));
        state.stop_game().unwrap();

        assert_eq!(state.game_end_time(), Some(clock.now()));
        assert_eq!(state.time_remaining(), Duration::ZERO);
    }
}
