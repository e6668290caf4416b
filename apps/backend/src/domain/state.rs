//! Session state: phases, seats, the dealer, and the per-room aggregate.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::cards::Card;
use crate::domain::deck::{Deck, DECK_SIZE};
use crate::domain::hand::Hand;
use crate::errors::GameError;

/// Identity reference for a player; owned by the identity layer, opaque here.
pub type PlayerId = Uuid;

/// Short room identifier, in the `xxxxxxxx` form the room controller hands
/// out to clients (first segment of a v4 UUID).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomId(String);

impl RoomId {
    pub fn generate() -> Self {
        let uuid = Uuid::new_v4().to_string();
        let short = uuid.split('-').next().unwrap_or(&uuid).to_string();
        Self(short)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoomId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Round progression phases for one room.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No round in progress; the next accepted bet opens a betting window.
    Idle,
    /// Betting window open, collecting bets until the deadline.
    Betting,
    /// Players act in seat order.
    PlayerTurns,
    /// Dealer draws to 17; no external input.
    DealerTurn,
}

/// A player decision during their turn.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Move {
    Hit,
    Stand,
    DoubleDown,
}

/// One player's in-session state. Created on the player's first accepted bet
/// of a round; reset (not destroyed) at round end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seat {
    pub player: PlayerId,
    pub bet: u64,
    pub hand: Hand,
    pub blackjack: bool,
    pub busted: bool,
    pub doubled_down: bool,
    pub stood: bool,
    /// Player left or disconnected mid-round; auto-stood at their turn.
    pub has_left: bool,
}

impl Seat {
    pub fn new(player: PlayerId) -> Self {
        Self {
            player,
            bet: 0,
            hand: Hand::new(),
            blackjack: false,
            busted: false,
            doubled_down: false,
            stood: false,
            has_left: false,
        }
    }

    /// The seat no longer needs a decision this round.
    pub fn turn_resolved(&self) -> bool {
        self.stood || self.busted
    }

    /// Clear per-round state, keeping the seat for the next round.
    pub fn reset(&mut self) {
        self.bet = 0;
        self.hand.clear();
        self.blackjack = false;
        self.busted = false;
        self.doubled_down = false;
        self.stood = false;
        self.has_left = false;
    }
}

/// Dealer hand plus the hole card concealed until the dealer's turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DealerSeat {
    pub hand: Hand,
    /// The second dealt card; `Some` from the deal until round reset.
    pub hole_card: Option<Card>,
    pub revealed: bool,
}

impl DealerSeat {
    /// The card visible to players before the reveal.
    pub fn upcard(&self) -> Option<Card> {
        self.hand.cards().first().copied()
    }

    pub fn reset(&mut self) {
        self.hand.clear();
        self.hole_card = None;
        self.revealed = false;
    }
}

/// Aggregate root for one room's live round. Exactly one exists per room at
/// any instant; it is owned by that room's supervisor task and never shared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    pub room_id: RoomId,
    pub deck: Deck,
    /// Seat order is fixed at deal time and never re-sorted mid-round.
    pub seats: Vec<Seat>,
    pub dealer: DealerSeat,
    pub phase: Phase,
    /// Index of the seat expected to act; equals `seats.len()` once control
    /// has passed to the dealer.
    pub active_seat: usize,
    /// Monotonic decision counter. Bumped on window open, every turn start,
    /// and every accepted move; commands and timer firings quoting an older
    /// value are stale.
    pub epoch: u64,
}

impl GameSession {
    pub fn new(room_id: RoomId, deck: Deck) -> Self {
        Self {
            room_id,
            deck,
            seats: Vec::new(),
            dealer: DealerSeat::default(),
            phase: Phase::Idle,
            active_seat: 0,
            epoch: 0,
        }
    }

    pub fn seat_index(&self, player: PlayerId) -> Option<usize> {
        self.seats.iter().position(|s| s.player == player)
    }

    /// The seat currently expected to act, if any.
    pub fn active(&self) -> Option<&Seat> {
        self.seats.get(self.active_seat)
    }

    pub fn bump_epoch(&mut self) -> u64 {
        self.epoch += 1;
        self.epoch
    }

    /// Draw from the session's deck. Exhaustion is an invariant violation:
    /// the caller aborts the round and refunds all stakes.
    pub fn draw(&mut self) -> Result<Card, GameError> {
        self.deck
            .draw()
            .ok_or_else(|| GameError::invariant("drawing from an exhausted deck"))
    }

    /// Cards in the deck plus all dealt hands. Must equal 52 throughout an
    /// active round.
    pub fn card_count(&self) -> usize {
        self.deck.len()
            + self
                .seats
                .iter()
                .map(|s| s.hand.len())
                .sum::<usize>()
            + self.dealer.hand.len()
    }

    pub fn card_count_ok(&self) -> bool {
        self.card_count() == DECK_SIZE
    }
}
