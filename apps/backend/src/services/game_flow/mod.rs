//! Session state machine - the single owner of one room's mutable state.
//!
//! `GameFlow` composes the betting window, turn sequencing, dealer automaton
//! and settlement over one `GameSession`. It performs no scheduling of its
//! own: methods return signals telling the supervisor which deadline to arm
//! or which stage to run next, so every transition stays serialized on the
//! room's command stream.

mod betting;
mod dealer;
mod player_actions;
mod round_lifecycle;
mod seats;
mod settlement;

use std::sync::Arc;

use time::OffsetDateTime;

use crate::config::EngineConfig;
use crate::domain::deck::Shuffler;
use crate::domain::snapshot::{RoomSnapshot, RoomView};
use crate::domain::state::{GameSession, PlayerId, RoomId};
use crate::errors::GameError;
use crate::events::EventSink;
use crate::services::accounts::Accounts;

/// What the supervisor must do after an accepted bet.
#[derive(Debug, Clone, PartialEq)]
pub enum BetSignal {
    /// First bet of the round: the window opened; arm its fixed deadline.
    WindowOpened {
        deadline: OffsetDateTime,
        epoch: u64,
    },
    /// Bet accepted into the already-open window; the deadline stands.
    Accepted,
    /// Every eligible player has bet; close the window early and deal.
    AllBetsIn,
}

/// What the supervisor must do after a turn transition.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnSignal {
    /// Arm the decision deadline for this player and epoch.
    Turn { player: PlayerId, epoch: u64 },
    /// All seats are resolved; run the dealer and settle.
    DealerTurn,
}

/// Outcome of a betting-window deadline firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowOutcome {
    /// At least one bet stands: deal the round.
    Deal,
    /// Nobody bet; the window closes with no round.
    NoBets,
    /// The window this timer belonged to is gone.
    Stale,
}

pub struct GameFlow {
    room_id: RoomId,
    config: EngineConfig,
    accounts: Arc<dyn Accounts>,
    events: EventSink,
    shuffler: Shuffler,
    /// Room members eligible to bet, in join order.
    players: Vec<PlayerId>,
    spectators: Vec<PlayerId>,
    session: Option<GameSession>,
}

impl GameFlow {
    pub fn new(
        room_id: RoomId,
        config: EngineConfig,
        accounts: Arc<dyn Accounts>,
        events: EventSink,
        shuffler: Shuffler,
    ) -> Self {
        Self {
            room_id,
            config,
            accounts,
            events,
            shuffler,
            players: Vec::new(),
            spectators: Vec::new(),
            session: None,
        }
    }

    /// Rebuild a room from a crash-recovery snapshot.
    pub fn restore(
        snapshot: RoomSnapshot,
        config: EngineConfig,
        accounts: Arc<dyn Accounts>,
        events: EventSink,
        shuffler: Shuffler,
    ) -> Self {
        Self {
            room_id: snapshot.room_id,
            config,
            accounts,
            events,
            shuffler,
            players: snapshot.players,
            spectators: snapshot.spectators,
            session: snapshot.session,
        }
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub fn events(&self) -> &EventSink {
        &self.events
    }

    pub fn view(&self) -> RoomView {
        RoomView::project(
            &self.room_id,
            &self.players,
            &self.spectators,
            self.session.as_ref(),
        )
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            room_id: self.room_id.clone(),
            players: self.players.clone(),
            spectators: self.spectators.clone(),
            session: self.session.clone(),
        }
    }

    pub(super) fn require_session(&mut self) -> Result<&mut GameSession, GameError> {
        self.session
            .as_mut()
            .ok_or_else(|| GameError::invariant("no session for an in-flight round"))
    }
}
