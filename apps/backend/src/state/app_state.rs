//! Shared resources handed to every room supervisor.

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::infra::snapshots::{InMemorySnapshotStore, SnapshotStore};
use crate::services::accounts::Accounts;
use crate::services::payouts::{Payouts, ReconciliationLog};

/// Engine-wide collaborators and configuration.
#[derive(Clone)]
pub struct AppState {
    pub config: EngineConfig,
    pub accounts: Arc<dyn Accounts>,
    pub payouts: Arc<dyn Payouts>,
    pub snapshots: Arc<dyn SnapshotStore>,
    pub reconciliation: Arc<ReconciliationLog>,
}

impl AppState {
    /// Wire up an engine with in-memory snapshot storage and a fresh
    /// reconciliation ledger.
    pub fn new(
        config: EngineConfig,
        accounts: Arc<dyn Accounts>,
        payouts: Arc<dyn Payouts>,
    ) -> Self {
        Self {
            config,
            accounts,
            payouts,
            snapshots: Arc::new(InMemorySnapshotStore::new()),
            reconciliation: Arc::new(ReconciliationLog::new()),
        }
    }

    pub fn with_snapshot_store(mut self, snapshots: Arc<dyn SnapshotStore>) -> Self {
        self.snapshots = snapshots;
        self
    }
}
