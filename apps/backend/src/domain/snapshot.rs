//! Serializable room state: crash-recovery snapshots and public views.

use serde::{Deserialize, Serialize};

use crate::domain::cards::Card;
use crate::domain::state::{GameSession, Phase, PlayerId, RoomId, Seat};

/// Full room state for crash-recovery persistence, keyed by room id.
///
/// Written by the supervisor after settlement; never consulted mid-turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub room_id: RoomId,
    /// Room members in join order (seat order derives from this at deal).
    pub players: Vec<PlayerId>,
    pub spectators: Vec<PlayerId>,
    pub session: Option<GameSession>,
}

/// Public per-seat facts: no deck, no hole card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatView {
    pub player: PlayerId,
    pub bet: u64,
    pub cards: Vec<Card>,
    pub total: u8,
    pub blackjack: bool,
    pub busted: bool,
    pub doubled_down: bool,
    pub stood: bool,
}

impl SeatView {
    fn project(seat: &Seat) -> Self {
        Self {
            player: seat.player,
            bet: seat.bet,
            cards: seat.hand.cards().to_vec(),
            total: seat.hand.total(),
            blackjack: seat.blackjack,
            busted: seat.busted,
            doubled_down: seat.doubled_down,
            stood: seat.stood,
        }
    }
}

/// Observable room state for clients and tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomView {
    pub room_id: RoomId,
    pub players: Vec<PlayerId>,
    pub spectators: Vec<PlayerId>,
    pub phase: Phase,
    pub seats: Vec<SeatView>,
    pub dealer_upcard: Option<Card>,
    /// Dealer cards and total, populated only once the hole card is revealed.
    pub dealer_cards: Option<Vec<Card>>,
    pub dealer_total: Option<u8>,
    /// Seat index expected to act during player turns.
    pub active_seat: Option<usize>,
    pub epoch: u64,
    pub deck_len: usize,
}

impl RoomView {
    pub fn project(
        room_id: &RoomId,
        players: &[PlayerId],
        spectators: &[PlayerId],
        session: Option<&GameSession>,
    ) -> Self {
        let Some(session) = session else {
            return Self {
                room_id: room_id.clone(),
                players: players.to_vec(),
                spectators: spectators.to_vec(),
                phase: Phase::Idle,
                seats: Vec::new(),
                dealer_upcard: None,
                dealer_cards: None,
                dealer_total: None,
                active_seat: None,
                epoch: 0,
                deck_len: 0,
            };
        };

        let revealed = session.dealer.revealed;
        Self {
            room_id: room_id.clone(),
            players: players.to_vec(),
            spectators: spectators.to_vec(),
            phase: session.phase,
            seats: session.seats.iter().map(SeatView::project).collect(),
            dealer_upcard: session.dealer.upcard(),
            dealer_cards: revealed.then(|| session.dealer.hand.cards().to_vec()),
            dealer_total: revealed.then(|| session.dealer.hand.total()),
            active_seat: (session.phase == Phase::PlayerTurns).then_some(session.active_seat),
            epoch: session.epoch,
            deck_len: session.deck.len(),
        }
    }
}
