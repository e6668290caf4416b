//! Per-room session supervisor: the single owner of one room's state.
//!
//! One task per room receives every command - client calls and timer
//! firings alike - over one channel and applies them strictly one at a
//! time. Distinct rooms run fully in parallel. External collaborator work
//! that may be slow (payout calls) is pushed off this task; only the debits
//! that gate state transitions are awaited inline.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use super::commands::RoomCommand;
use super::handle::RoomHandle;
use super::timers::RoomTimers;
use crate::errors::GameError;
use crate::services::game_flow::{BetSignal, GameFlow, TurnSignal, WindowOutcome};
use crate::services::payouts::{run_payout_jobs, PendingReconciliation};
use crate::state::app_state::AppState;

pub(crate) struct RoomSupervisor {
    flow: GameFlow,
    timers: RoomTimers,
    state: Arc<AppState>,
    rx: mpsc::UnboundedReceiver<RoomCommand>,
}

impl RoomSupervisor {
    /// Spawn the supervisor task for `flow` and return its handle.
    pub(crate) fn spawn(flow: GameFlow, state: Arc<AppState>) -> RoomHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = RoomHandle::new(flow.room_id().clone(), tx.clone(), flow.events().clone());
        let supervisor = Self {
            timers: RoomTimers::new(tx),
            flow,
            state,
            rx,
        };
        tokio::spawn(supervisor.run());
        handle
    }

    async fn run(mut self) {
        info!(room_id = %self.flow.room_id(), "Room supervisor started");
        while let Some(command) = self.rx.recv().await {
            match command {
                RoomCommand::Join { player, reply } => {
                    let _ = reply.send(self.flow.join(player));
                }
                RoomCommand::JoinSpectator { player, reply } => {
                    self.flow.join_spectator(player);
                    let _ = reply.send(Ok(()));
                }
                RoomCommand::LeaveRoom { player, reply } => {
                    let result = match self.flow.leave_room(player) {
                        Ok(signal) => {
                            self.after_turn(signal).await;
                            Ok(())
                        }
                        Err(err) => Err(self.handle_flow_error(err).await),
                    };
                    let _ = reply.send(result);
                }
                RoomCommand::PlaceBet {
                    player,
                    amount,
                    reply,
                } => {
                    let result = match self.flow.place_bet(player, amount).await {
                        Ok(signal) => {
                            self.after_bet(signal).await;
                            Ok(())
                        }
                        Err(err) => Err(self.handle_flow_error(err).await),
                    };
                    let _ = reply.send(result);
                }
                RoomCommand::SubmitMove {
                    player,
                    action,
                    epoch,
                    reply,
                } => {
                    let result = match self.flow.submit_move(player, action, epoch).await {
                        Ok(signal) => {
                            self.after_turn(Some(signal)).await;
                            Ok(())
                        }
                        Err(err) => Err(self.handle_flow_error(err).await),
                    };
                    let _ = reply.send(result);
                }
                RoomCommand::LeaveRound { player, reply } => {
                    let result = match self.flow.leave_round(player) {
                        Ok(signal) => {
                            self.after_turn(signal).await;
                            Ok(())
                        }
                        Err(err) => Err(self.handle_flow_error(err).await),
                    };
                    let _ = reply.send(result);
                }
                RoomCommand::View { reply } => {
                    let _ = reply.send(Ok(self.flow.view()));
                }
                RoomCommand::WindowExpired { epoch } => {
                    match self.flow.window_expired(epoch) {
                        WindowOutcome::Deal => self.start_round().await,
                        WindowOutcome::NoBets | WindowOutcome::Stale => {}
                    }
                }
                RoomCommand::TurnExpired { epoch } => {
                    if let Some(result) = self.flow.turn_timeout(epoch) {
                        match result {
                            Ok(signal) => self.after_turn(Some(signal)).await,
                            Err(err) => {
                                self.handle_flow_error(err).await;
                            }
                        }
                    }
                }
                RoomCommand::Close => break,
            }
        }
        self.timers.cancel_all();
        info!(room_id = %self.flow.room_id(), "Room supervisor stopped");
    }

    async fn after_bet(&mut self, signal: BetSignal) {
        match signal {
            BetSignal::WindowOpened { epoch, .. } => {
                self.timers
                    .arm_betting(self.state.config.betting_window, epoch);
            }
            BetSignal::Accepted => {}
            BetSignal::AllBetsIn => {
                self.timers.cancel_betting();
                self.start_round().await;
            }
        }
    }

    async fn after_turn(&mut self, signal: Option<TurnSignal>) {
        match signal {
            Some(TurnSignal::Turn { epoch, .. }) => {
                self.timers.arm_turn(self.state.config.turn_timeout, epoch);
            }
            Some(TurnSignal::DealerTurn) => {
                self.timers.cancel_turn();
                self.finish_round().await;
            }
            None => {}
        }
    }

    async fn start_round(&mut self) {
        match self.flow.deal() {
            Ok(signal) => self.after_turn(Some(signal)).await,
            Err(err) => {
                self.handle_flow_error(err).await;
            }
        }
    }

    /// Dealer automaton plus settlement, then hand the monetary legs to a
    /// detached payout runner so slow collaborators never block this room.
    async fn finish_round(&mut self) {
        let settled = self.flow.run_dealer().and_then(|()| self.flow.settle());
        match settled {
            Ok(jobs) => {
                self.timers.cancel_all();
                if !jobs.is_empty() {
                    tokio::spawn(run_payout_jobs(
                        jobs,
                        self.state.payouts.clone(),
                        self.state.accounts.clone(),
                        self.state.reconciliation.clone(),
                        self.state.config.payout_timeout,
                    ));
                }
                self.save_snapshot().await;
            }
            Err(err) => {
                self.handle_flow_error(err).await;
            }
        }
    }

    /// Invariant violations abort the round; everything else just flows
    /// back to the caller.
    async fn handle_flow_error(&mut self, err: GameError) -> GameError {
        if matches!(err, GameError::Invariant(_)) {
            self.abort_round(&err.to_string()).await;
        }
        err
    }

    async fn abort_round(&mut self, reason: &str) {
        let refunds = self.flow.abort_round(reason);
        self.timers.cancel_all();
        for (player, amount) in refunds {
            if let Err(err) = self.state.accounts.credit(player, amount).await {
                self.state.reconciliation.record(PendingReconciliation {
                    room_id: self.flow.room_id().clone(),
                    player,
                    amount,
                    reason: format!("refund failed after aborted round: {err}"),
                });
            }
        }
        self.save_snapshot().await;
    }

    async fn save_snapshot(&self) {
        let snapshot = self.flow.snapshot();
        if let Err(err) = self.state.snapshots.save(&snapshot).await {
            warn!(
                room_id = %self.flow.room_id(),
                error = %err,
                "Failed to persist room snapshot"
            );
        }
    }
}
