// ============================
// naan-backend/src/lib.rs
// ============================
//! Kiosk notification hub of the naan library server.
//!
//! A check-in kiosk holds one WebSocket per room id; short-lived HTTP
//! requests push check-in events into that room and the kiosk receives them
//! as JSON frames.

pub mod auth;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod registry;
pub mod room;
pub mod validation;
pub mod websocket;
pub mod ws_router;

use std::sync::Arc;

use tokio_util::{sync::CancellationToken, task::TaskTracker};

use crate::auth::{Authenticator, JwtAuth};
use crate::config::Settings;
use crate::dispatch::Dispatcher;
use crate::registry::RoomRegistry;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Active rooms
    pub rooms: Arc<RoomRegistry>,
    /// Check-in entry point
    pub dispatcher: Dispatcher,
    /// Credential verification
    pub auth: Arc<dyn Authenticator>,
    /// Settings
    pub settings: Arc<Settings>,
    /// Cancelled on server shutdown; live kiosk connections tear down
    pub shutdown: CancellationToken,
    /// Upgraded kiosk connection tasks, awaited on shutdown
    pub connections: TaskTracker,
}

impl AppState {
    /// Create a new application state verifying tokens with the configured
    /// HS256 secret
    pub fn new(settings: Settings) -> Self {
        let auth = Arc::new(JwtAuth::new(settings.jwt_secret.as_bytes()));
        Self::with_authenticator(settings, auth)
    }

    /// Create a new application state with a custom authenticator
    pub fn with_authenticator(settings: Settings, auth: Arc<dyn Authenticator>) -> Self {
        let rooms = Arc::new(RoomRegistry::new());
        let dispatcher = Dispatcher::new(rooms.clone(), settings.hub.enqueue_timeout());

        Self {
            rooms,
            dispatcher,
            auth,
            settings: Arc::new(settings),
            shutdown: CancellationToken::new(),
            connections: TaskTracker::new(),
        }
    }
}
