// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sparse team roster keyed by 1-based (team, slot) coordinates

use crate::{Player, PlayerKey};
use std::collections::BTreeMap;

/// The players in a game, stored sparsely by their roster key.
///
/// Gaps are allowed: a team may have players in slots 1 and 3 with slot 2
/// empty. Every stored player's own key matches the key it is stored under.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    players: BTreeMap<PlayerKey, Player>,
}

impl Roster {
    /// Create an empty roster
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the player at the specified key
    pub fn get(&self, key: PlayerKey) -> Option<&Player> {
        self.players.get(&key)
    }

    /// Get a mutable reference to the player at the specified key
    pub fn get_mut(&mut self, key: PlayerKey) -> Option<&mut Player> {
        self.players.get_mut(&key)
    }

    /// Whether a player occupies the key
    pub fn contains(&self, key: PlayerKey) -> bool {
        self.players.contains_key(&key)
    }

    /// Place a player at the key, rewriting its own coordinates.
    ///
    /// Returns the player back if the key is occupied or invalid.
    pub fn place(&mut self, key: PlayerKey, mut player: Player) -> Result<(), Player> {
        if !key.is_valid() || self.contains(key) {
            return Err(player);
        }
        player.relocate(key);
        self.players.insert(key, player);
        Ok(())
    }

    /// Remove the player at the specified key
    pub fn remove(&mut self, key: PlayerKey) -> Option<Player> {
        self.players.remove(&key)
    }

    /// Move a player into an empty key. Returns false and changes nothing
    /// if the source is empty or the target is occupied.
    pub fn relocate(&mut self, from: PlayerKey, to: PlayerKey) -> bool {
        if from == to {
            return self.contains(from);
        }
        if !to.is_valid() || self.contains(to) {
            return false;
        }
        match self.players.remove(&from) {
            Some(mut player) => {
                player.relocate(to);
                self.players.insert(to, player);
                true
            }
            None => false,
        }
    }

    /// Lowest empty slot of a team at or after `slot`
    pub fn first_blank_from(&self, team: u8, slot: u8) -> Option<u8> {
        (slot.max(1)..=u8::MAX).find(|&s| !self.contains(PlayerKey::new(team, s)))
    }

    /// Lowest empty slot of a team
    pub fn first_free_slot(&self, team: u8) -> Option<u8> {
        self.first_blank_from(team, 1)
    }

    /// Push every player from `slot` down to the first blank one slot lower,
    /// leaving `slot` empty.
    ///
    /// Returns the blank slot that absorbed the shift, or `None` if the team
    /// has no blank left below `slot`.
    pub fn shift_down(&mut self, team: u8, slot: u8) -> Option<u8> {
        let blank = self.first_blank_from(team, slot)?;
        for s in (slot..blank).rev() {
            let moved = self.relocate(PlayerKey::new(team, s), PlayerKey::new(team, s + 1));
            debug_assert!(moved, "slot {} of team {} should be occupied", s, team);
        }
        Some(blank)
    }

    /// Number of players in a team
    pub fn team_size(&self, team: u8) -> usize {
        self.team(team).count()
    }

    /// Players of one team in slot order
    pub fn team(&self, team: u8) -> impl Iterator<Item = &Player> + '_ {
        self.players
            .range(PlayerKey::new(team, 0)..=PlayerKey::new(team, u8::MAX))
            .map(|(_, player)| player)
    }

    /// Highest team number with at least one player, 0 if empty
    pub fn highest_team(&self) -> u8 {
        self.players.keys().next_back().map(|k| k.team).unwrap_or(0)
    }

    /// Highest occupied slot across all teams, 0 if empty
    pub fn highest_slot(&self) -> u8 {
        self.players.keys().map(|k| k.slot).max().unwrap_or(0)
    }

    /// All players ordered by team, then slot
    pub fn iter(&self) -> impl Iterator<Item = &Player> + '_ {
        self.players.values()
    }

    /// Mutable access to all players
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Player> + '_ {
        self.players.values_mut()
    }

    /// Number of players in the roster
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Whether the roster has no players
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(team: u8, slot: u8) -> Player {
        Player::new(PlayerKey::new(team, slot), 10, 100)
    }

    fn roster_with(keys: &[(u8, u8)]) -> Roster {
        let mut roster = Roster::new();
        for &(team, slot) in keys {
            roster.place(PlayerKey::new(team, slot), player(team, slot)).unwrap();
        }
        roster
    }

    #[test]
    fn test_place_rejects_occupied_and_zero() {
        let mut roster = roster_with(&[(1, 1)]);
        assert!(roster.place(PlayerKey::new(1, 1), player(1, 1)).is_err());
        assert!(roster.place(PlayerKey::new(0, 1), player(1, 1)).is_err());
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_place_rewrites_player_key() {
        let mut roster = Roster::new();
        roster.place(PlayerKey::new(2, 4), player(1, 1)).unwrap();
        let stored = roster.get(PlayerKey::new(2, 4)).unwrap();
        assert_eq!(stored.key(), PlayerKey::new(2, 4));
    }

    #[test]
    fn test_relocate() {
        let mut roster = roster_with(&[(1, 1), (1, 2)]);
        assert!(!roster.relocate(PlayerKey::new(1, 1), PlayerKey::new(1, 2)));
        assert!(!roster.relocate(PlayerKey::new(3, 3), PlayerKey::new(2, 1)));
        assert!(roster.relocate(PlayerKey::new(1, 1), PlayerKey::new(2, 1)));
        assert!(!roster.contains(PlayerKey::new(1, 1)));
        assert_eq!(roster.get(PlayerKey::new(2, 1)).unwrap().team_id, 2);
    }

    #[test]
    fn test_first_blank() {
        let roster = roster_with(&[(1, 1), (1, 2), (1, 4)]);
        assert_eq!(roster.first_free_slot(1), Some(3));
        assert_eq!(roster.first_blank_from(1, 4), Some(5));
        assert_eq!(roster.first_free_slot(2), Some(1));
    }

    #[test]
    fn test_shift_down_stops_at_first_gap() {
        let mut roster = roster_with(&[(1, 1), (1, 2), (1, 4)]);
        assert_eq!(roster.shift_down(1, 1), Some(3));

        assert!(!roster.contains(PlayerKey::new(1, 1)));
        assert!(roster.contains(PlayerKey::new(1, 2)));
        assert!(roster.contains(PlayerKey::new(1, 3)));
        assert!(roster.contains(PlayerKey::new(1, 4)));
        for p in roster.team(1) {
            assert_eq!(p.team_id, 1);
        }
        assert_eq!(roster.len(), 3);
    }

    #[test]
    fn test_shift_down_on_blank_is_noop() {
        let mut roster = roster_with(&[(1, 1)]);
        assert_eq!(roster.shift_down(1, 2), Some(2));
        assert_eq!(roster, roster_with(&[(1, 1)]));
    }

    #[test]
    fn test_dimensions() {
        let roster = roster_with(&[(1, 2), (3, 1), (2, 5)]);
        assert_eq!(roster.highest_team(), 3);
        assert_eq!(roster.highest_slot(), 5);
        assert_eq!(roster.team_size(2), 1);
        assert_eq!(roster.team_size(4), 0);

        let empty = Roster::new();
        assert_eq!(empty.highest_team(), 0);
        assert_eq!(empty.highest_slot(), 0);
    }
}
