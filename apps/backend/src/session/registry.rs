//! Room registry: creates rooms, hands out their handles, restores
//! snapshots after a crash.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::info;

use super::handle::RoomHandle;
use super::supervisor::RoomSupervisor;
use crate::domain::deck::Shuffler;
use crate::domain::state::RoomId;
use crate::errors::{GameError, NotFoundKind};
use crate::events::EventSink;
use crate::services::game_flow::GameFlow;
use crate::state::app_state::AppState;

/// Maps room ids to live supervisor handles. Rooms run independently; the
/// registry itself never touches game state.
pub struct RoomRegistry {
    state: Arc<AppState>,
    rooms: DashMap<RoomId, RoomHandle>,
}

impl RoomRegistry {
    pub fn new(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
            rooms: DashMap::new(),
        }
    }

    /// Create a room with OS-entropy shuffles.
    pub fn create_room(&self) -> RoomHandle {
        self.create_room_with(Shuffler::default())
    }

    /// Create a room with an explicit deck source (seeded replay, scripted
    /// test decks).
    pub fn create_room_with(&self, shuffler: Shuffler) -> RoomHandle {
        let room_id = RoomId::generate();
        let flow = GameFlow::new(
            room_id.clone(),
            self.state.config.clone(),
            self.state.accounts.clone(),
            EventSink::default(),
            shuffler,
        );
        let handle = RoomSupervisor::spawn(flow, self.state.clone());
        self.rooms.insert(room_id.clone(), handle.clone());
        info!(room_id = %room_id, "Room created");
        handle
    }

    /// Bring a room back from its crash-recovery snapshot. Snapshots are
    /// written after settlement, so a restored room is always between
    /// rounds and needs no timers re-armed.
    pub async fn restore_room(&self, room_id: &RoomId) -> Result<RoomHandle, GameError> {
        if let Some(existing) = self.rooms.get(room_id) {
            return Ok(existing.value().clone());
        }
        let snapshot = self.state.snapshots.load(room_id).await?.ok_or_else(|| {
            GameError::not_found(
                NotFoundKind::Room,
                format!("no snapshot for room {room_id}"),
            )
        })?;
        let flow = GameFlow::restore(
            snapshot,
            self.state.config.clone(),
            self.state.accounts.clone(),
            EventSink::default(),
            Shuffler::default(),
        );
        let handle = RoomSupervisor::spawn(flow, self.state.clone());
        self.rooms.insert(room_id.clone(), handle.clone());
        info!(room_id = %room_id, "Room restored from snapshot");
        Ok(handle)
    }

    pub fn get(&self, room_id: &RoomId) -> Result<RoomHandle, GameError> {
        self.rooms
            .get(room_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| {
                GameError::not_found(NotFoundKind::Room, format!("unknown room {room_id}"))
            })
    }

    /// Stop a room's supervisor and forget it. Cancels the room's timers.
    pub fn close_room(&self, room_id: &RoomId) {
        if let Some((_, handle)) = self.rooms.remove(room_id) {
            handle.close();
            info!(room_id = %room_id, "Room closed");
        }
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
