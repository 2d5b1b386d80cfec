// SPDX-License-Identifier: MIT OR Apache-2.0

//! Change notifications for presentation layers
//!
//! Observers are called synchronously, in registration order, after the
//! state change an event describes. Channel subscribers receive owned
//! copies afterwards and may live on another thread.

use crate::PlayerKey;
use chrono::{DateTime, Utc};
use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Events emitted by the game state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A game session began
    GameStarted {
        /// When the game clock runs out
        ends_at: DateTime<Utc>,
    },
    /// The running game ended, by command or because time ran out
    GameStopped,
    /// The roster entry at this key changed, was vacated or was filled
    PlayerUpdated {
        /// Team of the changed entry
        team: u8,
        /// Slot of the changed entry
        slot: u8,
    },
    /// A player joined the roster
    PlayerAdded {
        /// Team the player joined
        team: u8,
        /// Slot the player was given
        slot: u8,
    },
}

impl GameEvent {
    pub(crate) fn player_updated(key: PlayerKey) -> Self {
        GameEvent::PlayerUpdated {
            team: key.team,
            slot: key.slot,
        }
    }

    pub(crate) fn player_added(key: PlayerKey) -> Self {
        GameEvent::PlayerAdded {
            team: key.team,
            slot: key.slot,
        }
    }

    /// The roster key this event refers to, if any
    pub fn player_key(&self) -> Option<PlayerKey> {
        match *self {
            GameEvent::PlayerUpdated { team, slot } | GameEvent::PlayerAdded { team, slot } => {
                Some(PlayerKey::new(team, slot))
            }
            _ => None,
        }
    }
}

/// Receives game events
pub trait GameObserver {
    /// Called once per event
    fn on_event(&mut self, event: &GameEvent);
}

impl<F> GameObserver for F
where
    F: FnMut(&GameEvent),
{
    fn on_event(&mut self, event: &GameEvent) {
        self(event)
    }
}

/// Handle for removing a registered observer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Dispatches events to observers and channel subscribers
#[derive(Default)]
pub struct EventBus {
    observers: Vec<(ObserverId, Box<dyn GameObserver>)>,
    channels: Vec<Sender<GameEvent>>,
    next_id: u64,
}

impl EventBus {
    /// Create a bus with no subscribers
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer
    pub fn subscribe<O>(&mut self, observer: O) -> ObserverId
    where
        O: GameObserver + 'static,
    {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(oid, _)| *oid != id);
        self.observers.len() != before
    }

    /// Get a receiver for all future events
    pub fn channel(&mut self) -> Receiver<GameEvent> {
        let (tx, rx) = unbounded();
        self.channels.push(tx);
        rx
    }

    /// Deliver an event to every subscriber
    pub fn publish(&mut self, event: GameEvent) {
        tracing::trace!(?event, "Publishing game event");

        for (_, observer) in self.observers.iter_mut() {
            observer.on_event(&event);
        }

        // Receivers that were dropped are pruned here
        self.channels.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("observers", &self.observers.len())
            .field("channels", &self.channels.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_observers_called_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();

        let first = log.clone();
        bus.subscribe(move |e: &GameEvent| first.borrow_mut().push(("first", e.clone())));
        let second = log.clone();
        bus.subscribe(move |e: &GameEvent| second.borrow_mut().push(("second", e.clone())));

        bus.publish(GameEvent::GameStopped);

        let log = log.borrow();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].0, "first");
        assert_eq!(log[1].0, "second");
    }

    #[test]
    fn test_unsubscribe() {
        let count = Rc::new(RefCell::new(0));
        let mut bus = EventBus::new();
        let counter = count.clone();
        let id = bus.subscribe(move |_: &GameEvent| *counter.borrow_mut() += 1);

        bus.publish(GameEvent::GameStopped);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(GameEvent::GameStopped);

        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_dropped_channels_are_pruned() {
        let mut bus = EventBus::new();
        let kept = bus.channel();
        let dropped = bus.channel();
        drop(dropped);
        assert_eq!(bus.channels.len(), 2);

        bus.publish(GameEvent::PlayerAdded { team: 1, slot: 1 });

        assert_eq!(bus.channels.len(), 1);
        assert_eq!(
            kept.try_recv().unwrap(),
            GameEvent::PlayerAdded { team: 1, slot: 1 }
        );
    }

    #[test]
    fn test_player_key() {
        let event = GameEvent::player_updated(PlayerKey::new(2, 3));
        assert_eq!(event.player_key(), Some(PlayerKey::new(2, 3)));
        assert_eq!(GameEvent::GameStopped.player_key(), None);
    }
}
