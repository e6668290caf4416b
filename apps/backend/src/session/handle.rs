//! Client-facing handle for one room's supervisor.

use tokio::sync::{broadcast, mpsc, oneshot};

use super::commands::{Reply, RoomCommand};
use crate::domain::snapshot::RoomView;
use crate::domain::state::{Move, PlayerId, RoomId};
use crate::errors::GameError;
use crate::events::{EventSink, GameEvent};

/// Cheap-to-clone sender side of one room. All methods enqueue onto the
/// room's serialized command stream and await the supervisor's reply; a
/// closed room answers every call with `RoomClosed`.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    tx: mpsc::UnboundedSender<RoomCommand>,
    events: EventSink,
}

impl RoomHandle {
    pub(crate) fn new(
        room_id: RoomId,
        tx: mpsc::UnboundedSender<RoomCommand>,
        events: EventSink,
    ) -> Self {
        Self {
            room_id,
            tx,
            events,
        }
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Subscribe to the room's observable events.
    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.events.subscribe()
    }

    pub async fn join(&self, player: PlayerId) -> Result<(), GameError> {
        self.request(|reply| RoomCommand::Join { player, reply }).await
    }

    pub async fn join_spectator(&self, player: PlayerId) -> Result<(), GameError> {
        self.request(|reply| RoomCommand::JoinSpectator { player, reply })
            .await
    }

    pub async fn leave_room(&self, player: PlayerId) -> Result<(), GameError> {
        self.request(|reply| RoomCommand::LeaveRoom { player, reply })
            .await
    }

    pub async fn place_bet(&self, player: PlayerId, amount: u64) -> Result<(), GameError> {
        self.request(|reply| RoomCommand::PlaceBet {
            player,
            amount,
            reply,
        })
        .await
    }

    pub async fn submit_move(
        &self,
        player: PlayerId,
        action: Move,
        epoch: u64,
    ) -> Result<(), GameError> {
        self.request(|reply| RoomCommand::SubmitMove {
            player,
            action,
            epoch,
            reply,
        })
        .await
    }

    pub async fn leave_round(&self, player: PlayerId) -> Result<(), GameError> {
        self.request(|reply| RoomCommand::LeaveRound { player, reply })
            .await
    }

    pub async fn view(&self) -> Result<RoomView, GameError> {
        self.request(|reply| RoomCommand::View { reply }).await
    }

    /// Stop the supervisor. Queued commands ahead of the close still run;
    /// everything after answers `RoomClosed`.
    pub fn close(&self) {
        let _ = self.tx.send(RoomCommand::Close);
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(Reply<T>) -> RoomCommand,
    ) -> Result<T, GameError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(build(reply))
            .map_err(|_| GameError::RoomClosed)?;
        rx.await.map_err(|_| GameError::RoomClosed)?
    }
}
