//! Dealer automaton: reveal the hole card, draw to 17, stand or bust.

use tracing::info;

use super::GameFlow;
use crate::domain::state::Phase;
use crate::errors::GameError;
use crate::events::GameEvent;

impl GameFlow {
    /// Play the dealer's hand to completion. Deterministic given deck
    /// order; takes no external input.
    pub fn run_dealer(&mut self) -> Result<(), GameError> {
        let room_id = self.room_id.clone();
        let session = self.require_session()?;
        if session.phase != Phase::DealerTurn {
            return Err(GameError::invariant("dealer acting outside the dealer phase"));
        }

        let hole = session
            .dealer
            .hole_card
            .ok_or_else(|| GameError::invariant("dealer has no hole card to reveal"))?;
        session.dealer.revealed = true;
        let mut total = session.dealer.hand.total();
        self.events.emit(GameEvent::DealerRevealed {
            room_id: room_id.clone(),
            card: hole,
            total,
        });

        while total < 17 {
            let session = self.require_session()?;
            let card = session.draw()?;
            session.dealer.hand.push(card);
            total = session.dealer.hand.total();
            self.events.emit(GameEvent::DealerHit {
                room_id: room_id.clone(),
                card,
                total,
            });

            if total > 21 {
                info!(room_id = %room_id, total, "Dealer busted");
                self.events.emit(GameEvent::DealerBust { room_id, total });
                return Ok(());
            }
        }

        info!(room_id = %room_id, total, "Dealer stands");
        self.events.emit(GameEvent::DealerStand { room_id, total });
        Ok(())
    }
}
