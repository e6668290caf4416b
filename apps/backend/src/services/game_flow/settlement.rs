//! Settlement: classify every seat once, emit the round summary, reset.

use tracing::info;

use super::GameFlow;
use crate::domain::settlement::{classify, Outcome, SeatOutcome};
use crate::domain::state::Phase;
use crate::errors::GameError;
use crate::events::GameEvent;
use crate::services::payouts::{PayoutJob, PayoutKind};

impl GameFlow {
    /// Classify each seat against the finished dealer hand, in seat order,
    /// touching every seat exactly once. Emits `RoundConcluded` with all
    /// outcomes, resets the session for the next round, and returns the
    /// monetary legs for the payout runner.
    ///
    /// Game state is final once this returns; payout failures affect only
    /// the reconciliation ledger.
    pub fn settle(&mut self) -> Result<Vec<PayoutJob>, GameError> {
        let room_id = self.room_id.clone();
        let session = self.require_session()?;
        if session.phase != Phase::DealerTurn {
            return Err(GameError::invariant("settling before the dealer finished"));
        }

        let mut outcomes = Vec::with_capacity(session.seats.len());
        let mut jobs = Vec::new();
        for seat in &session.seats {
            let outcome = classify(seat, &session.dealer);
            let payout = outcome.credit(seat.bet);
            outcomes.push(SeatOutcome {
                player: seat.player,
                bet: seat.bet,
                outcome,
                payout,
            });

            let kind = match outcome {
                Outcome::Blackjack => Some(PayoutKind::Blackjack),
                Outcome::Win => Some(PayoutKind::Win),
                Outcome::Push => Some(PayoutKind::Push),
                Outcome::Loss | Outcome::Busted => None,
            };
            if let Some(kind) = kind {
                jobs.push(PayoutJob {
                    room_id: room_id.clone(),
                    player: seat.player,
                    kind,
                    bet: seat.bet,
                    credit: payout,
                });
            }
        }

        info!(
            room_id = %room_id,
            seats = outcomes.len(),
            payouts = jobs.len(),
            "Round concluded"
        );
        self.events.emit(GameEvent::RoundConcluded { room_id, outcomes });
        self.reset_round();
        Ok(jobs)
    }
}
