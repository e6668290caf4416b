//! Round outcome classification.
//!
//! Pure functions over a finished round: no payout calls, no balance
//! mutation. The monetary legs are derived from the classification by the
//! settlement service.

use serde::{Deserialize, Serialize};

use crate::domain::state::{DealerSeat, PlayerId, Seat};

/// Final outcome of one seat for one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Two-card 21 against a dealer without blackjack; pays 3:2.
    Blackjack,
    /// Beat the dealer (or the dealer busted); pays 1:1.
    Win,
    /// Tie; stake returned.
    Push,
    /// Lost to a higher dealer total; stake already debited.
    Loss,
    /// Busted during play; stake already debited.
    Busted,
}

impl Outcome {
    /// Local balance credit owed for `bet` under this outcome: the returned
    /// stake plus winnings. Integer chips; the 3:2 blackjack bonus rounds
    /// down on odd stakes.
    pub fn credit(self, bet: u64) -> u64 {
        match self {
            Outcome::Blackjack => bet + bet.saturating_mul(3) / 2,
            Outcome::Win => bet.saturating_mul(2),
            Outcome::Push => bet,
            Outcome::Loss | Outcome::Busted => 0,
        }
    }

    pub fn is_loss(self) -> bool {
        matches!(self, Outcome::Loss | Outcome::Busted)
    }
}

/// Classify one seat against the dealer.
///
/// Dealer blackjack against player blackjack is a push (standard rule). A
/// player blackjack beats a dealer 21 built from three or more cards.
pub fn classify(seat: &Seat, dealer: &DealerSeat) -> Outcome {
    if seat.busted {
        return Outcome::Busted;
    }
    if seat.blackjack {
        return if dealer.hand.is_blackjack() {
            Outcome::Push
        } else {
            Outcome::Blackjack
        };
    }

    let dealer_total = dealer.hand.total();
    if dealer_total > 21 {
        return Outcome::Win;
    }
    match seat.hand.total().cmp(&dealer_total) {
        std::cmp::Ordering::Greater => Outcome::Win,
        std::cmp::Ordering::Equal => Outcome::Push,
        std::cmp::Ordering::Less => Outcome::Loss,
    }
}

/// Per-seat settlement record carried by the round-concluded event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatOutcome {
    pub player: PlayerId,
    pub bet: u64,
    pub outcome: Outcome,
    /// Local credit owed (0 for losses).
    pub payout: u64,
}
