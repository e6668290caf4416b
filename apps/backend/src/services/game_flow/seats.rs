//! Room membership: players, spectators, and mid-round departures.

use tracing::info;

use super::{GameFlow, TurnSignal};
use crate::domain::state::{Phase, PlayerId};
use crate::errors::GameError;
use crate::events::GameEvent;

impl GameFlow {
    /// Add a player to the room. Idempotent for existing members; a player
    /// joining mid-round spectates until the next betting window.
    pub fn join(&mut self, player: PlayerId) -> Result<(), GameError> {
        if self.players.contains(&player) {
            return Ok(());
        }
        if self.players.len() >= self.config.max_players {
            return Err(GameError::capacity(format!(
                "room {} already seats {} players",
                self.room_id, self.config.max_players
            )));
        }
        self.spectators.retain(|p| *p != player);
        self.players.push(player);
        self.events.emit(GameEvent::PlayerJoined {
            room_id: self.room_id.clone(),
            player,
        });
        info!(room_id = %self.room_id, player = %player, "Player joined room");
        Ok(())
    }

    /// Add a spectator; spectators cannot bet and have no capacity limit.
    pub fn join_spectator(&mut self, player: PlayerId) {
        if !self.spectators.contains(&player) && !self.players.contains(&player) {
            self.spectators.push(player);
        }
    }

    /// Remove a member from the room entirely. If they were seated in an
    /// unfinished round their hand is auto-stood, exactly like a decision
    /// timeout.
    pub fn leave_room(&mut self, player: PlayerId) -> Result<Option<TurnSignal>, GameError> {
        let was_member = self.players.contains(&player) || self.spectators.contains(&player);
        self.players.retain(|p| *p != player);
        self.spectators.retain(|p| *p != player);
        if was_member {
            self.events.emit(GameEvent::PlayerLeft {
                room_id: self.room_id.clone(),
                player,
            });
            info!(room_id = %self.room_id, player = %player, "Player left room");
        }
        self.mark_left(player)
    }

    /// Demote a player to spectator for the current round; they stay in the
    /// room and can rejoin the next betting window.
    pub fn leave_round(&mut self, player: PlayerId) -> Result<Option<TurnSignal>, GameError> {
        if let Some(pos) = self.players.iter().position(|p| *p == player) {
            self.players.remove(pos);
            self.spectators.push(player);
        }
        self.mark_left(player)
    }

    /// Flag a departed player's seat; if they were the active player their
    /// hand stands immediately.
    fn mark_left(&mut self, player: PlayerId) -> Result<Option<TurnSignal>, GameError> {
        let Some(session) = self.session.as_mut() else {
            return Ok(None);
        };
        let Some(idx) = session.seat_index(player) else {
            return Ok(None);
        };
        session.seats[idx].has_left = true;

        let acts_now = session.phase == Phase::PlayerTurns
            && session.active_seat == idx
            && !session.seats[idx].turn_resolved();
        if acts_now {
            info!(
                room_id = %self.room_id,
                player = %player,
                "Active player left, defaulting to stand"
            );
            return self.apply_stand(player).map(Some);
        }
        Ok(None)
    }
}
