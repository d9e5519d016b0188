// ============================
// naan-backend/src/room.rs
// ============================
//! Per-connection room state.
//!
//! A room is split in two halves. [`Room`] is owned by the connection task
//! and is the only consumer of the outbox. [`RoomHandle`] is cheap to clone,
//! lives in the registry and is what HTTP dispatchers enqueue through.
use std::time::Duration;

use naan_common::{Delivery, RoomId};
use tokio::sync::mpsc::{self, error::SendTimeoutError};
use uuid::Uuid;

use crate::dispatch::DispatchError;

/// Server-generated identity of one kiosk connection
pub type ConnectionId = Uuid;

/// Connection-side half: owns the receiving end of the outbox
#[derive(Debug)]
pub struct Room {
    connection_id: ConnectionId,
    outbox: mpsc::Receiver<Delivery>,
}

/// Sender-side half kept in the registry
#[derive(Debug, Clone)]
pub struct RoomHandle {
    id: RoomId,
    connection_id: ConnectionId,
    outbox: mpsc::Sender<Delivery>,
}

impl Room {
    /// Create a fresh room with an empty outbox of `capacity` slots
    pub fn open(id: impl Into<RoomId>, capacity: usize) -> (Room, RoomHandle) {
        let id = id.into();
        let connection_id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(capacity);

        let room = Room {
            connection_id,
            outbox: rx,
        };
        let handle = RoomHandle {
            id,
            connection_id,
            outbox: tx,
        };
        (room, handle)
    }

    #[cfg(test)]
    fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// Next pending delivery in enqueue order. Suspends while the outbox is
    /// empty and yields `None` once it is closed and drained.
    pub async fn next_delivery(&mut self) -> Option<Delivery> {
        self.outbox.recv().await
    }

    /// Refuse further enqueues. Deliveries still buffered are discarded.
    pub fn close(&mut self) -> usize {
        self.outbox.close();
        let mut dropped = 0;
        while self.outbox.try_recv().is_ok() {
            dropped += 1;
        }
        dropped
    }
}

impl RoomHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// Whether the owning connection has started tearing down
    pub fn is_closed(&self) -> bool {
        self.outbox.is_closed()
    }

    /// Place a delivery in the outbox, waiting at most `wait` for space.
    /// A closed outbox means the room is gone.
    pub async fn enqueue(&self, delivery: Delivery, wait: Duration) -> Result<(), DispatchError> {
        match self.outbox.send_timeout(delivery, wait).await {
            Ok(()) => Ok(()),
            Err(SendTimeoutError::Timeout(_)) => Err(DispatchError::Backpressure),
            Err(SendTimeoutError::Closed(_)) => Err(DispatchError::RoomNotFound),
        }
    }
}
