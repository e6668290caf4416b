//! Observable game events, broadcast per room.
//!
//! Events are a closed, transport-agnostic set: whatever delivers them to
//! clients (websockets, SSE, a test harness) subscribes to the room's
//! broadcast channel and serializes the tagged variants as it sees fit.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::broadcast;

use crate::domain::cards::Card;
use crate::domain::settlement::SeatOutcome;
use crate::domain::state::{PlayerId, RoomId};

/// Everything observable about a room's round lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    PlayerJoined {
        room_id: RoomId,
        player: PlayerId,
    },
    PlayerLeft {
        room_id: RoomId,
        player: PlayerId,
    },
    BettingWindowOpened {
        room_id: RoomId,
        deadline: OffsetDateTime,
    },
    PlayerBet {
        room_id: RoomId,
        player: PlayerId,
        amount: u64,
        total_bet: u64,
    },
    RoundStarted {
        room_id: RoomId,
        /// Seat order for the round, fixed until settlement.
        seats: Vec<PlayerId>,
        dealer_upcard: Card,
    },
    PlayerTurn {
        room_id: RoomId,
        player: PlayerId,
        /// Decision epoch the next move must quote.
        epoch: u64,
    },
    PlayerHit {
        room_id: RoomId,
        player: PlayerId,
        card: Card,
        total: u8,
        /// The turn stays open; the next move must quote this epoch.
        epoch: u64,
    },
    PlayerStand {
        room_id: RoomId,
        player: PlayerId,
    },
    PlayerDoubleDown {
        room_id: RoomId,
        player: PlayerId,
        card: Card,
        total: u8,
    },
    PlayerBusted {
        room_id: RoomId,
        player: PlayerId,
        total: u8,
    },
    PlayerReached21 {
        room_id: RoomId,
        player: PlayerId,
    },
    DealerRevealed {
        room_id: RoomId,
        card: Card,
        total: u8,
    },
    DealerHit {
        room_id: RoomId,
        card: Card,
        total: u8,
    },
    DealerBust {
        room_id: RoomId,
        total: u8,
    },
    DealerStand {
        room_id: RoomId,
        total: u8,
    },
    RoundConcluded {
        room_id: RoomId,
        outcomes: Vec<SeatOutcome>,
    },
    RoundAborted {
        room_id: RoomId,
        reason: String,
    },
}

/// Per-room fan-out channel for [`GameEvent`]s.
///
/// Emitting never blocks and never fails: a room with no subscribers simply
/// drops the event, and slow subscribers observe `Lagged` on their receiver
/// rather than applying backpressure to the supervisor.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: broadcast::Sender<GameEvent>,
}

impl EventSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: GameEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for EventSink {
    fn default() -> Self {
        // Enough depth that an entire round's events fit without lag.
        Self::new(256)
    }
}
