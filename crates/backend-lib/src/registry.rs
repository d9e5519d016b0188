// ============================
// naan-backend/src/registry.rs
// ============================
//! Room registry: the one place where "at most one room per id" holds.
use dashmap::{mapref::entry::Entry, DashMap};
use metrics::gauge;
use naan_common::RoomId;
use thiserror::Error;

use crate::metrics::ROOM_ACTIVE;
use crate::room::RoomHandle;

/// Registration refused because the id is already hosted
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("room already exists")]
pub struct RoomExists;

/// Registry of all active rooms
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: DashMap<RoomId, RoomHandle>,
}

impl RoomRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `room` unless its id is already taken. Check and insert happen
    /// under the same shard lock.
    pub fn register(&self, room: RoomHandle) -> Result<(), RoomExists> {
        match self.rooms.entry(room.id().to_string()) {
            Entry::Occupied(_) => return Err(RoomExists),
            Entry::Vacant(slot) => {
                slot.insert(room);
            },
        }
        // shard lock released; len() visits every shard
        gauge!(ROOM_ACTIVE).set(self.rooms.len() as f64);
        Ok(())
    }

    /// Get a handle for enqueueing, if the room is active
    pub fn lookup(&self, room_id: &str) -> Option<RoomHandle> {
        self.rooms.get(room_id).map(|entry| entry.value().clone())
    }

    /// Remove a room by id. Removing an unknown id is a no-op.
    pub fn remove(&self, room_id: &str) -> Option<RoomHandle> {
        let removed = self.rooms.remove(room_id).map(|(_, handle)| handle);
        if removed.is_some() {
            gauge!(ROOM_ACTIVE).set(self.rooms.len() as f64);
        }
        removed
    }

    /// Remove the entry for `room` only while it still belongs to the same
    /// connection, so an old connection never evicts its successor.
    pub fn release(&self, room: &RoomHandle) -> bool {
        let released = self
            .rooms
            .remove_if(room.id(), |_, current| {
                current.connection_id() == room.connection_id()
            })
            .is_some();
        if released {
            gauge!(ROOM_ACTIVE).set(self.rooms.len() as f64);
        }
        released
    }

    pub fn contains(&self, room_id: &str) -> bool {
        self.rooms.contains_key(room_id)
    }

    /// Number of active rooms
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Get all active room IDs
    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.iter().map(|entry| entry.key().clone()).collect()
    }
}
