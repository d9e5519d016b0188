// ==================
// crates/backend-lib/src/websocket.rs
// ==================
//! Kiosk Connection Lifecycle
//!
//! Every admitted kiosk connection goes through
//! registering → active → closing → closed:
//! - **Registering**: a fresh [`Room`] is inserted into the registry; an id
//!   that is already hosted gets an error frame and is closed, the existing
//!   room keeps serving.
//! - **Active**: two pumps share the connection task. The outbound pump
//!   drains the room's outbox into JSON text frames and pings the kiosk when
//!   idle; the inbound pump reads frames only to track liveness.
//! - **Closing**: entered as soon as either pump stops or the server shuts
//!   down. The room is released
//!   from the registry, its outbox is closed (pending deliveries are dropped)
//!   and the socket is closed once.
//!
//! Reads and writes run under deadlines, so a half-dead peer ends in
//! teardown instead of pinning the room.

use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use metrics::counter;
use naan_common::{ErrorFrame, RoomId};
use thiserror::Error;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::auth::Principal;
use crate::config::HubSettings;
use crate::error::AppError;
use crate::metrics::{ROOM_CLOSED, WS_REJECTED};
use crate::room::Room;
use crate::AppState;

/// Why a live kiosk connection stopped
#[derive(Error, Debug)]
pub enum TransportFailure {
    #[error("kiosk closed the connection")]
    RemoteClosed,

    #[error("read failed: {0}")]
    Read(axum::Error),

    #[error("no frame from kiosk within {0:?}")]
    ReadTimeout(Duration),

    #[error("write failed: {0}")]
    Write(axum::Error),

    #[error("write not completed within {0:?}")]
    WriteTimeout(Duration),

    #[error("could not encode delivery: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("outbox closed")]
    OutboxClosed,

    #[error("server shutting down")]
    Shutdown,
}

/// Drive an authenticated kiosk connection from registration to close
pub async fn run_kiosk(socket: WebSocket, state: AppState, room_id: RoomId, kiosk: Principal) {
    let hub = &state.settings.hub;
    let (mut room, handle) = Room::open(room_id.clone(), hub.outbox_capacity);

    if let Err(err) = state.rooms.register(handle.clone()) {
        tracing::warn!(
            room_id = %room_id,
            kiosk = %kiosk.subject_id,
            "room already exists, refusing connection"
        );
        counter!(WS_REJECTED).increment(1);
        reject(socket, &AppError::from(err), hub.write_timeout()).await;
        return;
    }

    tracing::info!(
        room_id = %room_id,
        connection_id = %handle.connection_id(),
        kiosk = %kiosk.subject_id,
        "room opened"
    );

    let (mut sink, mut stream) = socket.split();

    let reason = tokio::select! {
        reason = outbound_pump(&mut sink, &mut room, hub) => reason,
        reason = inbound_pump(&mut stream, &room_id, hub.read_timeout()) => reason,
        _ = state.shutdown.cancelled() => TransportFailure::Shutdown,
    };

    // Closing: unregister first so new dispatches see the room as absent
    state.rooms.release(&handle);
    let dropped = room.close();
    let _ = time::timeout(hub.write_timeout(), sink.close()).await;
    counter!(ROOM_CLOSED).increment(1);

    match reason {
        TransportFailure::RemoteClosed | TransportFailure::Shutdown => tracing::info!(
            reason = %reason,
            room_id = %room_id,
            connection_id = %handle.connection_id(),
            dropped,
            "room closed"
        ),
        failure => tracing::warn!(
            room_id = %room_id,
            connection_id = %handle.connection_id(),
            dropped,
            error = %failure,
            "room closed"
        ),
    }
}

/// Send an error frame to a refused connection, then close it
pub async fn reject(mut socket: WebSocket, err: &AppError, write_timeout: Duration) {
    let frame = ErrorFrame {
        error: err.frame_message(),
    };
    if let Ok(json) = serde_json::to_string(&frame) {
        let _ = time::timeout(write_timeout, socket.send(Message::Text(json.into()))).await;
    }
    let _ = time::timeout(write_timeout, socket.close()).await;
}

/// Write deliveries in outbox order; ping when idle. Returns on the first
/// failed or late write.
pub async fn outbound_pump<S>(sink: &mut S, room: &mut Room, hub: &HubSettings) -> TransportFailure
where
    S: Sink<Message, Error = axum::Error> + Unpin,
{
    let write_timeout = hub.write_timeout();
    let mut ping = time::interval_at(Instant::now() + hub.ping_interval(), hub.ping_interval());
    ping.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let message = tokio::select! {
            delivery = room.next_delivery() => match delivery {
                Some(delivery) => match serde_json::to_string(&delivery) {
                    Ok(json) => Message::Text(json.into()),
                    Err(e) => return e.into(),
                },
                None => return TransportFailure::OutboxClosed,
            },
            _ = ping.tick() => Message::Ping(Default::default()),
        };

        match time::timeout(write_timeout, sink.send(message)).await {
            Ok(Ok(())) => {},
            Ok(Err(e)) => return TransportFailure::Write(e),
            Err(_) => return TransportFailure::WriteTimeout(write_timeout),
        }
    }
}

/// Consume frames from the kiosk. Content is logged and discarded; any
/// frame, pongs included, proves the peer is alive.
pub async fn inbound_pump<S>(stream: &mut S, room_id: &str, read_timeout: Duration) -> TransportFailure
where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    loop {
        let message = match time::timeout(read_timeout, stream.next()).await {
            Err(_) => return TransportFailure::ReadTimeout(read_timeout),
            Ok(None) => return TransportFailure::RemoteClosed,
            Ok(Some(Err(e))) => return TransportFailure::Read(e),
            Ok(Some(Ok(message))) => message,
        };

        match message {
            Message::Text(text) => {
                tracing::debug!(room_id, frame = text.as_str(), "recv from host");
            },
            Message::Binary(bytes) => {
                tracing::debug!(room_id, len = bytes.len(), "recv binary from host");
            },
            Message::Close(frame) => {
                tracing::debug!(room_id, ?frame, "host sent close");
                return TransportFailure::RemoteClosed;
            },
            Message::Ping(_) | Message::Pong(_) => {},
        }
    }
}
