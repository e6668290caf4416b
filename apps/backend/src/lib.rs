#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod config;
pub mod domain;
pub mod errors;
pub mod events;
pub mod infra;
pub mod services;
pub mod session;
pub mod state;
pub mod telemetry;

// Re-exports for public API
pub use config::EngineConfig;
pub use domain::deck::{Deck, Shuffler};
pub use domain::settlement::Outcome;
pub use domain::snapshot::{RoomSnapshot, RoomView};
pub use domain::state::{Move, PlayerId, RoomId};
pub use errors::GameError;
pub use events::GameEvent;
pub use infra::snapshots::{InMemorySnapshotStore, SnapshotStore};
pub use services::accounts::{Accounts, InMemoryAccounts};
pub use services::payouts::{PayoutKind, Payouts, ReconciliationLog};
pub use session::{RoomHandle, RoomRegistry};
pub use state::app_state::AppState;

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    backend_test_support::logging::init();
}
