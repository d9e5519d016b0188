// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for metric keys
pub const WS_CONNECTION: &str = "ws.connection";
pub const WS_REJECTED: &str = "ws.rejected";
pub const ROOM_ACTIVE: &str = "room.active";
pub const ROOM_CLOSED: &str = "room.closed";
pub const DISPATCH_SENT: &str = "dispatch.sent";
pub const DISPATCH_NOT_FOUND: &str = "dispatch.not_found";
pub const DISPATCH_BACKPRESSURE: &str = "dispatch.backpressure";
