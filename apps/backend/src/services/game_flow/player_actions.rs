//! Turn sequencing and player moves: hit, stand, double down, timeouts.

use tracing::{debug, info};

use super::{GameFlow, TurnSignal};
use crate::domain::state::{Move, Phase, PlayerId};
use crate::errors::{GameError, ValidationKind};
use crate::events::GameEvent;

impl GameFlow {
    /// Apply a move for the active player.
    ///
    /// Rejected without state change when the submitter is not the active
    /// player, and rejected as stale when the quoted decision epoch has
    /// already passed - the guard that turns rapid duplicate submissions
    /// into exactly one drawn card.
    pub async fn submit_move(
        &mut self,
        player: PlayerId,
        action: Move,
        epoch: u64,
    ) -> Result<TurnSignal, GameError> {
        {
            let session = self.session.as_ref().ok_or_else(|| {
                GameError::validation(ValidationKind::PhaseMismatch, "no round in progress")
            })?;
            if session.phase != Phase::PlayerTurns {
                return Err(GameError::validation(
                    ValidationKind::PhaseMismatch,
                    "players are not acting right now",
                ));
            }
            let active = session
                .active()
                .ok_or_else(|| GameError::invariant("active seat index out of range"))?;
            if active.player != player {
                return Err(GameError::validation(
                    ValidationKind::OutOfTurn,
                    format!("it is {}'s turn", active.player),
                ));
            }
            if epoch != session.epoch {
                return Err(GameError::stale(format!(
                    "decision epoch {epoch} has passed (current {})",
                    session.epoch
                )));
            }
        }

        debug!(
            room_id = %self.room_id,
            player = %player,
            action = ?action,
            epoch,
            "Processing move"
        );
        match action {
            Move::Hit => self.apply_hit(player),
            Move::Stand => self.apply_stand(player),
            Move::DoubleDown => self.apply_double_down(player).await,
        }
    }

    /// Handle a decision-deadline firing. A timer armed for an earlier
    /// epoch is stale and ignored, so the default stand is applied at most
    /// once per decision.
    pub fn turn_timeout(&mut self, epoch: u64) -> Option<Result<TurnSignal, GameError>> {
        let session = self.session.as_ref()?;
        if session.phase != Phase::PlayerTurns || session.epoch != epoch {
            debug!(room_id = %self.room_id, epoch, "Stale turn timer ignored");
            return None;
        }
        let player = session.active()?.player;
        info!(
            room_id = %self.room_id,
            player = %player,
            "Decision deadline expired, defaulting to stand"
        );
        Some(self.apply_stand(player))
    }

    fn apply_hit(&mut self, player: PlayerId) -> Result<TurnSignal, GameError> {
        let room_id = self.room_id.clone();
        let session = self.require_session()?;
        let card = session.draw()?;
        let idx = session.active_seat;
        session.seats[idx].hand.push(card);
        let total = session.seats[idx].hand.total();

        if total > 21 {
            session.seats[idx].busted = true;
            self.events.emit(GameEvent::PlayerBusted {
                room_id,
                player,
                total,
            });
            return self.advance();
        }
        if total == 21 {
            // 21 cannot improve; the turn resolves without further input.
            session.seats[idx].stood = true;
            self.events.emit(GameEvent::PlayerReached21 { room_id, player });
            return self.advance();
        }

        let epoch = session.bump_epoch();
        self.events.emit(GameEvent::PlayerHit {
            room_id,
            player,
            card,
            total,
            epoch,
        });
        Ok(TurnSignal::Turn { player, epoch })
    }

    pub(super) fn apply_stand(&mut self, player: PlayerId) -> Result<TurnSignal, GameError> {
        let room_id = self.room_id.clone();
        let session = self.require_session()?;
        let idx = session.active_seat;
        session.seats[idx].stood = true;
        self.events.emit(GameEvent::PlayerStand { room_id, player });
        self.advance()
    }

    /// Double the stake (second debit through the account collaborator),
    /// draw exactly one card, and resolve the turn regardless of result.
    async fn apply_double_down(&mut self, player: PlayerId) -> Result<TurnSignal, GameError> {
        let additional = {
            let session = self.require_session()?;
            session
                .active()
                .ok_or_else(|| GameError::invariant("active seat index out of range"))?
                .bet
        };
        // Rejected here (insufficient funds) means no state was touched.
        self.accounts.debit(player, additional).await?;

        let room_id = self.room_id.clone();
        let session = self.require_session()?;
        let idx = session.active_seat;
        session.seats[idx].bet += additional;
        session.seats[idx].doubled_down = true;

        let card = session.draw()?;
        session.seats[idx].hand.push(card);
        let total = session.seats[idx].hand.total();
        let busted = total > 21;
        if busted {
            session.seats[idx].busted = true;
        } else {
            session.seats[idx].stood = true;
        }

        self.events.emit(GameEvent::PlayerDoubleDown {
            room_id: room_id.clone(),
            player,
            card,
            total,
        });
        if busted {
            self.events.emit(GameEvent::PlayerBusted {
                room_id,
                player,
                total,
            });
        }
        self.advance()
    }

    /// Move past the resolved active seat to the next decision.
    fn advance(&mut self) -> Result<TurnSignal, GameError> {
        {
            let session = self.require_session()?;
            session.active_seat += 1;
        }
        self.next_turn()
    }

    /// Walk forward from the active seat to the next seat that needs a
    /// decision, auto-standing departed players, until a turn opens or
    /// control passes to the dealer.
    pub(super) fn next_turn(&mut self) -> Result<TurnSignal, GameError> {
        loop {
            let room_id = self.room_id.clone();
            let session = self.require_session()?;
            if session.active_seat >= session.seats.len() {
                session.phase = Phase::DealerTurn;
                return Ok(TurnSignal::DealerTurn);
            }

            let idx = session.active_seat;
            let (player, resolved, left) = {
                let seat = &session.seats[idx];
                (seat.player, seat.turn_resolved(), seat.has_left)
            };

            if resolved {
                session.active_seat += 1;
                continue;
            }
            if left {
                session.seats[idx].stood = true;
                session.active_seat += 1;
                self.events.emit(GameEvent::PlayerStand { room_id, player });
                continue;
            }

            let epoch = session.bump_epoch();
            debug!(
                room_id = %room_id,
                player = %player,
                epoch,
                "Turn opened"
            );
            self.events.emit(GameEvent::PlayerTurn {
                room_id,
                player,
                epoch,
            });
            return Ok(TurnSignal::Turn { player, epoch });
        }
    }
}
