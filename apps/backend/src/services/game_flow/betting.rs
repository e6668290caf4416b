//! Betting window: collect debited bets until the fixed deadline.

use time::OffsetDateTime;
use tracing::{debug, info};

use super::{BetSignal, GameFlow, WindowOutcome};
use crate::domain::state::{GameSession, Phase, PlayerId, Seat};
use crate::errors::{GameError, ValidationKind};
use crate::events::GameEvent;

impl GameFlow {
    /// Accept a bet. The first accepted bet of a round creates the session
    /// (idempotently) and opens the betting window; later bets join the same
    /// window without re-arming its deadline.
    ///
    /// The amount is checked and debited through the account collaborator
    /// before any state changes, so a rejected bet leaves no trace.
    pub async fn place_bet(&mut self, player: PlayerId, amount: u64) -> Result<BetSignal, GameError> {
        if !self.players.contains(&player) {
            return Err(GameError::validation(
                ValidationKind::NotSeated,
                format!("player {player} is not seated in room {}", self.room_id),
            ));
        }
        if amount == 0 {
            return Err(GameError::validation(
                ValidationKind::BadAmount,
                "bet must be a positive amount",
            ));
        }
        if let Some(session) = self.session.as_ref() {
            if !matches!(session.phase, Phase::Idle | Phase::Betting) {
                return Err(GameError::validation(
                    ValidationKind::PhaseMismatch,
                    "round already in progress",
                ));
            }
        }

        self.accounts.debit(player, amount).await?;

        if self.session.is_none() {
            let deck = self.shuffler.next_deck();
            self.session = Some(GameSession::new(self.room_id.clone(), deck));
        }
        let session = self.require_session()?;

        let opened = session.phase == Phase::Idle;
        if opened {
            session.phase = Phase::Betting;
            session.bump_epoch();
        }

        let seat_idx = match session.seat_index(player) {
            Some(idx) => idx,
            None => {
                session.seats.push(Seat::new(player));
                session.seats.len() - 1
            }
        };
        session.seats[seat_idx].bet += amount;
        let total_bet = session.seats[seat_idx].bet;
        let epoch = session.epoch;

        debug!(
            room_id = %self.room_id,
            player = %player,
            amount,
            total_bet,
            "Bet accepted"
        );
        self.events.emit(GameEvent::PlayerBet {
            room_id: self.room_id.clone(),
            player,
            amount,
            total_bet,
        });

        if opened {
            let deadline = OffsetDateTime::now_utc() + self.config.betting_window;
            info!(
                room_id = %self.room_id,
                window_secs = self.config.betting_window.as_secs(),
                "Betting window opened"
            );
            self.events.emit(GameEvent::BettingWindowOpened {
                room_id: self.room_id.clone(),
                deadline,
            });
            return Ok(BetSignal::WindowOpened { deadline, epoch });
        }

        if self.all_players_bet() {
            info!(room_id = %self.room_id, "All players bet, closing window early");
            return Ok(BetSignal::AllBetsIn);
        }
        Ok(BetSignal::Accepted)
    }

    /// Handle the betting-window deadline. Fires at most once per window;
    /// firings for an already-closed window are stale.
    pub fn window_expired(&mut self, epoch: u64) -> WindowOutcome {
        let Some(session) = self.session.as_mut() else {
            return WindowOutcome::Stale;
        };
        if session.phase != Phase::Betting || session.epoch != epoch {
            debug!(room_id = %self.room_id, epoch, "Stale betting-window timer ignored");
            return WindowOutcome::Stale;
        }
        if session.seats.iter().any(|s| s.bet > 0) {
            WindowOutcome::Deal
        } else {
            session.phase = Phase::Idle;
            session.bump_epoch();
            info!(room_id = %self.room_id, "Betting window closed with no bets");
            WindowOutcome::NoBets
        }
    }

    fn all_players_bet(&self) -> bool {
        let Some(session) = self.session.as_ref() else {
            return false;
        };
        self.players.iter().all(|p| {
            session
                .seats
                .iter()
                .any(|s| s.player == *p && s.bet > 0)
        })
    }
}
