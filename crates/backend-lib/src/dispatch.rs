// ============================
// naan-backend/src/dispatch.rs
// ============================
//! Hand check-in events to the kiosk hosting a room.
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use naan_common::Delivery;
use thiserror::Error;

use crate::metrics::{DISPATCH_BACKPRESSURE, DISPATCH_NOT_FOUND, DISPATCH_SENT};
use crate::registry::RoomRegistry;

/// Why an event was not accepted for delivery
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    /// No kiosk is connected under that room id, or it is disconnecting
    #[error("room not found")]
    RoomNotFound,

    /// The room's outbox stayed full for the whole enqueue timeout
    #[error("room outbox is full")]
    Backpressure,
}

/// Entry point used by the HTTP layer. Only touches the registry and the
/// room's outbox, never the kiosk socket.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<RoomRegistry>,
    enqueue_timeout: Duration,
}

impl Dispatcher {
    pub fn new(registry: Arc<RoomRegistry>, enqueue_timeout: Duration) -> Self {
        Self {
            registry,
            enqueue_timeout,
        }
    }

    /// Accept `payload` for delivery to `room_id`. `Ok` means queued, not
    /// delivered.
    pub async fn dispatch(
        &self,
        room_id: &str,
        payload: impl Into<String>,
    ) -> Result<(), DispatchError> {
        let Some(room) = self.registry.lookup(room_id) else {
            counter!(DISPATCH_NOT_FOUND).increment(1);
            return Err(DispatchError::RoomNotFound);
        };

        let result = room
            .enqueue(Delivery::new(payload), self.enqueue_timeout)
            .await;

        match result {
            Ok(()) => counter!(DISPATCH_SENT).increment(1),
            Err(DispatchError::RoomNotFound) => counter!(DISPATCH_NOT_FOUND).increment(1),
            Err(DispatchError::Backpressure) => counter!(DISPATCH_BACKPRESSURE).increment(1),
        }
        tracing::debug!(room_id, ?result, "dispatch");

        result
    }

    #[cfg(test)]
    fn registry(&self) -> &Arc<RoomRegistry> {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::Room;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(Arc::new(RoomRegistry::new()), Duration::from_millis(50))
    }

    #[tokio::test]
    async fn test_unknown_room() {
        let dispatcher = dispatcher();
        assert_eq!(
            dispatcher.dispatch("nope", "u1").await,
            Err(DispatchError::RoomNotFound)
        );
    }

    #[tokio::test]
    async fn test_dispatch_reaches_outbox_in_order() {
        let dispatcher = dispatcher();
        let (mut room, handle) = Room::open("r1", 8);
        dispatcher.registry().register(handle).unwrap();

        dispatcher.dispatch("r1", "u1").await.unwrap();
        dispatcher.dispatch("r1", "u2").await.unwrap();

        assert_eq!(room.next_delivery().await, Some(Delivery::new("u1")));
        assert_eq!(room.next_delivery().await, Some(Delivery::new("u2")));
    }

    #[tokio::test]
    async fn test_backpressure_is_not_room_not_found() {
        let dispatcher = dispatcher();
        let (_room, handle) = Room::open("r1", 1);
        dispatcher.registry().register(handle).unwrap();

        dispatcher.dispatch("r1", "u1").await.unwrap();
        assert_eq!(
            dispatcher.dispatch("r1", "u2").await,
            Err(DispatchError::Backpressure)
        );
    }

    #[tokio::test]
    async fn test_no_delivery_after_teardown() {
        let dispatcher = dispatcher();
        let (mut room, handle) = Room::open("r1", 8);
        dispatcher.registry().register(handle.clone()).unwrap();

        dispatcher.registry().release(&handle);
        room.close();

        assert_eq!(
            dispatcher.dispatch("r1", "u1").await,
            Err(DispatchError::RoomNotFound)
        );
    }

    #[tokio::test]
    async fn test_closing_room_still_registered_fails_cleanly() {
        // teardown closed the outbox but has not released the entry yet
        let dispatcher = dispatcher();
        let (mut room, handle) = Room::open("r1", 8);
        dispatcher.registry().register(handle).unwrap();
        room.close();

        assert_eq!(
            dispatcher.dispatch("r1", "u1").await,
            Err(DispatchError::RoomNotFound)
        );
    }

    #[tokio::test]
    async fn test_rooms_are_isolated() {
        let dispatcher = dispatcher();
        let (room_a, handle_a) = Room::open("a", 8);
        let (mut room_b, handle_b) = Room::open("b", 8);
        dispatcher.registry().register(handle_a.clone()).unwrap();
        dispatcher.registry().register(handle_b).unwrap();

        // room a's connection dies
        drop(room_a);
        dispatcher.registry().release(&handle_a);

        dispatcher.dispatch("b", "u1").await.unwrap();
        assert_eq!(room_b.next_delivery().await, Some(Delivery::new("u1")));
    }
}
