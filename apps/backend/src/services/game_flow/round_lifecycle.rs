//! Dealing, round reset, and the abort/refund path.

use tracing::{error, info};

use super::{GameFlow, TurnSignal};
use crate::domain::state::{Phase, PlayerId};
use crate::errors::GameError;
use crate::events::GameEvent;

impl GameFlow {
    /// Close the betting window and deal the round: two cards per bettor in
    /// seat order, then upcard and hole card to the dealer.
    ///
    /// Seat order is fixed here - room join order restricted to bettors -
    /// and never changes again this round.
    pub fn deal(&mut self) -> Result<TurnSignal, GameError> {
        let room_id = self.room_id.clone();
        let join_order = self.players.clone();
        let session = self.require_session()?;
        if session.phase != Phase::Betting {
            return Err(GameError::invariant("dealing outside the betting phase"));
        }

        // Players without a bet sit this round out (they stay in the room).
        session.seats.retain(|s| s.bet > 0);
        if session.seats.is_empty() {
            return Err(GameError::invariant("dealing with no bets placed"));
        }
        session.seats.sort_by_key(|s| {
            join_order
                .iter()
                .position(|p| *p == s.player)
                .unwrap_or(usize::MAX)
        });

        for idx in 0..session.seats.len() {
            for _ in 0..2 {
                let card = session.draw()?;
                session.seats[idx].hand.push(card);
            }
            let seat = &mut session.seats[idx];
            if seat.hand.total() == 21 {
                // Settled as blackjack at settlement time, not here.
                seat.blackjack = true;
                seat.stood = true;
            }
        }

        let upcard = session.draw()?;
        let hole = session.draw()?;
        session.dealer.hand.push(upcard);
        session.dealer.hand.push(hole);
        session.dealer.hole_card = Some(hole);

        session.phase = Phase::PlayerTurns;
        session.active_seat = 0;
        let seated: Vec<PlayerId> = session.seats.iter().map(|s| s.player).collect();

        info!(
            room_id = %room_id,
            seats = seated.len(),
            "Round started"
        );
        self.events.emit(GameEvent::RoundStarted {
            room_id,
            seats: seated,
            dealer_upcard: upcard,
        });

        self.next_turn()
    }

    /// Reset after settlement or abort: clear hands, bets and flags, install
    /// a freshly shuffled deck, and return to awaiting bets. Seats whose
    /// players are no longer room members are dropped; membership itself
    /// persists across rounds.
    pub(super) fn reset_round(&mut self) {
        let members = self.players.clone();
        let fresh_deck = self.shuffler.next_deck();
        if let Some(session) = self.session.as_mut() {
            session.seats.retain(|s| members.contains(&s.player));
            for seat in &mut session.seats {
                seat.reset();
            }
            session.dealer.reset();
            session.deck = fresh_deck;
            session.phase = Phase::Idle;
            session.active_seat = 0;
            session.bump_epoch();
        }
    }

    /// Abort the round after an invariant violation: every debited stake is
    /// owed back to its player. Returns the refund list for the supervisor
    /// to apply through the account collaborator.
    pub fn abort_round(&mut self, reason: &str) -> Vec<(PlayerId, u64)> {
        error!(room_id = %self.room_id, reason, "Aborting round");

        let refunds: Vec<(PlayerId, u64)> = self
            .session
            .as_ref()
            .map(|session| {
                session
                    .seats
                    .iter()
                    .filter(|s| s.bet > 0)
                    .map(|s| (s.player, s.bet))
                    .collect()
            })
            .unwrap_or_default();

        self.events.emit(GameEvent::RoundAborted {
            room_id: self.room_id.clone(),
            reason: reason.to_string(),
        });
        self.reset_round();
        refunds
    }
}
