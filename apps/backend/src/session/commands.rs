//! Commands serialized onto a room's supervisor task.

use tokio::sync::oneshot;

use crate::domain::snapshot::RoomView;
use crate::domain::state::{Move, PlayerId};
use crate::errors::GameError;

pub(crate) type Reply<T> = oneshot::Sender<Result<T, GameError>>;

/// Everything that can mutate or observe one room, including timer
/// firings. Processing one command at a time is the room's serialization
/// boundary.
#[derive(Debug)]
pub(crate) enum RoomCommand {
    Join {
        player: PlayerId,
        reply: Reply<()>,
    },
    JoinSpectator {
        player: PlayerId,
        reply: Reply<()>,
    },
    LeaveRoom {
        player: PlayerId,
        reply: Reply<()>,
    },
    PlaceBet {
        player: PlayerId,
        amount: u64,
        reply: Reply<()>,
    },
    SubmitMove {
        player: PlayerId,
        action: Move,
        epoch: u64,
        reply: Reply<()>,
    },
    LeaveRound {
        player: PlayerId,
        reply: Reply<()>,
    },
    View {
        reply: Reply<RoomView>,
    },
    /// Betting-window deadline armed at `epoch` fired.
    WindowExpired { epoch: u64 },
    /// Decision deadline armed at `epoch` fired.
    TurnExpired { epoch: u64 },
    Close,
}
