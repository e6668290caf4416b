//! Cancellable per-room deadline timers.
//!
//! Each scope (betting window, active turn) holds at most one armed timer;
//! arming a new one cancels its predecessor, and everything is cancelled on
//! round reset and room closure. Firings are delivered as commands into the
//! room's serialized stream, stamped with the epoch they were armed for, so
//! a firing that loses the race against a real command is ignored as stale.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::commands::RoomCommand;

pub(crate) struct RoomTimers {
    tx: mpsc::UnboundedSender<RoomCommand>,
    betting: Option<CancellationToken>,
    turn: Option<CancellationToken>,
}

impl RoomTimers {
    pub fn new(tx: mpsc::UnboundedSender<RoomCommand>) -> Self {
        Self {
            tx,
            betting: None,
            turn: None,
        }
    }

    pub fn arm_betting(&mut self, delay: Duration, epoch: u64) {
        Self::arm(
            &mut self.betting,
            &self.tx,
            delay,
            RoomCommand::WindowExpired { epoch },
        );
    }

    pub fn arm_turn(&mut self, delay: Duration, epoch: u64) {
        Self::arm(
            &mut self.turn,
            &self.tx,
            delay,
            RoomCommand::TurnExpired { epoch },
        );
    }

    pub fn cancel_betting(&mut self) {
        if let Some(token) = self.betting.take() {
            token.cancel();
        }
    }

    pub fn cancel_turn(&mut self) {
        if let Some(token) = self.turn.take() {
            token.cancel();
        }
    }

    pub fn cancel_all(&mut self) {
        self.cancel_betting();
        self.cancel_turn();
    }

    fn arm(
        slot: &mut Option<CancellationToken>,
        tx: &mpsc::UnboundedSender<RoomCommand>,
        delay: Duration,
        command: RoomCommand,
    ) {
        if let Some(previous) = slot.take() {
            previous.cancel();
        }
        let token = CancellationToken::new();
        let guard = token.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = guard.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    let _ = tx.send(command);
                }
            }
        });
        *slot = Some(token);
    }
}

impl Drop for RoomTimers {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
