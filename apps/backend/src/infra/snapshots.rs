//! Crash-recovery snapshot storage.
//!
//! Snapshots are written after settlement and read only when restoring a
//! room after a restart - never mid-turn. The in-memory implementation
//! stands in for whatever document/KV store a deployment wires up.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::snapshot::RoomSnapshot;
use crate::domain::state::RoomId;
use crate::errors::GameError;

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn save(&self, snapshot: &RoomSnapshot) -> Result<(), GameError>;
    async fn load(&self, room_id: &RoomId) -> Result<Option<RoomSnapshot>, GameError>;
}

/// JSON-encoded snapshots in a concurrent map.
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    entries: DashMap<RoomId, String>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn save(&self, snapshot: &RoomSnapshot) -> Result<(), GameError> {
        let encoded = serde_json::to_string(snapshot)
            .map_err(|err| GameError::external(format!("snapshot encode failed: {err}")))?;
        self.entries.insert(snapshot.room_id.clone(), encoded);
        Ok(())
    }

    async fn load(&self, room_id: &RoomId) -> Result<Option<RoomSnapshot>, GameError> {
        let Some(encoded) = self.entries.get(room_id) else {
            return Ok(None);
        };
        serde_json::from_str(&encoded)
            .map(Some)
            .map_err(|err| GameError::external(format!("snapshot decode failed: {err}")))
    }
}
