// ================
// common/src/lib.rs
// ================
//! Common types and structures
//! used for communication between the naan kiosk hub, check-in clients and
//! the kiosk display.
//! This module defines the HTTP bodies and WebSocket frames of the hub.

use serde::{Deserialize, Serialize};

/// Room identifier chosen by the kiosk when it opens its connection
pub type RoomId = String;

/// Body of `POST /check-in/{room_id}`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CheckInRequest {
    /// Identifier of the user checking in at the kiosk
    #[serde(rename = "UserID")]
    pub user_id: String,
}

/// Frame pushed to the kiosk for every accepted check-in
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// The dispatched payload, opaque to the hub
    pub id: String,
}

impl Delivery {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Frame sent to a kiosk connection right before it is refused and closed
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorFrame {
    /// Human readable reason
    pub error: String,
}

/// Response body of a successful check-in
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CheckInAck {
    pub status: String,
}

impl CheckInAck {
    /// The payload was accepted for delivery. It may still be lost if the
    /// kiosk disconnects before the frame is written.
    pub fn sent() -> Self {
        Self {
            status: "sent".to_string(),
        }
    }
}

/// Health report returned by `GET /health`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    pub status: String,
    pub active_rooms: usize,
}
