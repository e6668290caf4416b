//! Payout collaborator contract, bounded-timeout invocation, and the
//! pending-reconciliation ledger for failed monetary legs.
//!
//! Settlement finalizes game state before any payout call is made. The
//! monetary legs then run off the supervisor task: a failed or timed-out
//! call never blocks or rolls back round progression; it lands in the
//! reconciliation ledger for an out-of-band process instead.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::domain::state::{PlayerId, RoomId};
use crate::errors::GameError;
use crate::services::accounts::Accounts;

/// Which payout entry point a monetary leg goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutKind {
    Win,
    Push,
    Blackjack,
}

/// External payout mechanism. Calls are asynchronous and unbounded; the
/// engine wraps every invocation with its configured timeout.
#[async_trait]
pub trait Payouts: Send + Sync {
    async fn payout_win(&self, player: PlayerId, amount: u64) -> Result<(), GameError>;
    async fn payout_push(&self, player: PlayerId, amount: u64) -> Result<(), GameError>;
    async fn payout_blackjack(&self, player: PlayerId, amount: u64) -> Result<(), GameError>;
}

/// One monetary leg produced by settlement.
#[derive(Debug, Clone, PartialEq)]
pub struct PayoutJob {
    pub room_id: RoomId,
    pub player: PlayerId,
    pub kind: PayoutKind,
    /// Stake passed to the payout collaborator.
    pub bet: u64,
    /// Local balance credit applied once the collaborator call succeeds.
    pub credit: u64,
}

/// A monetary leg that could not be completed and awaits operator
/// reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingReconciliation {
    pub room_id: RoomId,
    pub player: PlayerId,
    pub amount: u64,
    pub reason: String,
}

/// Failed monetary legs, surfaced to operators. Retries belong to a
/// separate reconciliation process, never to the game loop.
#[derive(Debug, Default)]
pub struct ReconciliationLog {
    entries: Mutex<Vec<PendingReconciliation>>,
}

impl ReconciliationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: PendingReconciliation) {
        error!(
            room_id = %entry.room_id,
            player = %entry.player,
            amount = entry.amount,
            reason = %entry.reason,
            "Monetary leg pending reconciliation"
        );
        self.entries.lock().push(entry);
    }

    pub fn pending(&self) -> Vec<PendingReconciliation> {
        self.entries.lock().clone()
    }

    /// Hand the backlog to a reconciliation worker, emptying the ledger.
    pub fn drain(&self) -> Vec<PendingReconciliation> {
        std::mem::take(&mut *self.entries.lock())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

/// Run all monetary legs of a concluded round concurrently.
///
/// Game state is already final; per-player balance serialization is the
/// account collaborator's contract (each call atomic).
pub async fn run_payout_jobs(
    jobs: Vec<PayoutJob>,
    payouts: Arc<dyn Payouts>,
    accounts: Arc<dyn Accounts>,
    reconciliation: Arc<ReconciliationLog>,
    call_timeout: Duration,
) {
    let legs = jobs.into_iter().map(|job| {
        settle_job(
            job,
            payouts.clone(),
            accounts.clone(),
            reconciliation.clone(),
            call_timeout,
        )
    });
    futures::future::join_all(legs).await;
}

async fn settle_job(
    job: PayoutJob,
    payouts: Arc<dyn Payouts>,
    accounts: Arc<dyn Accounts>,
    reconciliation: Arc<ReconciliationLog>,
    call_timeout: Duration,
) {
    let call = async {
        match job.kind {
            PayoutKind::Win => payouts.payout_win(job.player, job.bet).await,
            PayoutKind::Push => payouts.payout_push(job.player, job.bet).await,
            PayoutKind::Blackjack => payouts.payout_blackjack(job.player, job.bet).await,
        }
    };

    let outcome = match tokio::time::timeout(call_timeout, call).await {
        Ok(Ok(())) => accounts.credit(job.player, job.credit).await.map_err(|err| {
            format!("payout succeeded but balance credit failed: {err}")
        }),
        Ok(Err(err)) => Err(format!("payout call failed: {err}")),
        Err(_) => Err(format!(
            "payout call timed out after {}s",
            call_timeout.as_secs()
        )),
    };

    match outcome {
        Ok(()) => {
            debug!(
                room_id = %job.room_id,
                player = %job.player,
                kind = ?job.kind,
                credit = job.credit,
                "Monetary leg settled"
            );
        }
        Err(reason) => {
            reconciliation.record(PendingReconciliation {
                room_id: job.room_id,
                player: job.player,
                amount: job.credit,
                reason,
            });
        }
    }
}
