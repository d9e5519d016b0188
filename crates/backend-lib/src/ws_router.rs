// ============================
// naan-backend/src/ws_router.rs
// ============================
//! Route table and the kiosk WebSocket upgrade.
use axum::{
    extract::{ws::WebSocketUpgrade, Path, Query, State},
    response::Response,
    routing::{get, post},
    Router,
};
use metrics::counter;
use naan_common::RoomId;
use serde::Deserialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{AuthError, Principal, Role};
use crate::error::AppError;
use crate::handlers;
use crate::metrics::{WS_CONNECTION, WS_REJECTED};
use crate::validation::validate_room_id;
use crate::websocket;
use crate::AppState;

/// Build the hub's router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/ws/{room_id}", get(ws_handler))
        .route("/check-in/{room_id}", post(handlers::check_in))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Query string of a kiosk connection request
#[derive(Debug, Default, Deserialize)]
pub struct KioskQuery {
    pub token: Option<String>,
}

/// `GET /ws/{room_id}?token=...`
///
/// The upgrade always completes. A refused kiosk is told why over the
/// socket, as an error frame followed by close.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(room_id): Path<RoomId>,
    Query(query): Query<KioskQuery>,
    State(state): State<AppState>,
) -> Response {
    counter!(WS_CONNECTION).increment(1);
    let admission = admit(&state, &room_id, query.token.as_deref()).await;

    let connections = state.connections.clone();
    ws.on_upgrade(move |socket| {
        connections.track_future(async move {
            match admission {
                Ok(kiosk) => websocket::run_kiosk(socket, state, room_id, kiosk).await,
                Err(err) => {
                    tracing::warn!(room_id = %room_id, error = %err, "kiosk connection refused");
                    counter!(WS_REJECTED).increment(1);
                    websocket::reject(socket, &err, state.settings.hub.write_timeout()).await;
                },
            }
        })
    })
}

/// Check the room id and the kiosk's credential
pub async fn admit(
    state: &AppState,
    room_id: &str,
    token: Option<&str>,
) -> Result<Principal, AppError> {
    validate_room_id(room_id, state.settings.hub.max_room_id_len)?;
    let token = token.ok_or(AuthError::MissingCredential)?;
    let principal = state.auth.authenticate(token).await?;
    Ok(principal.require(&[Role::Kiosk])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::JwtAuth;
    use crate::config::Settings;
    use crate::room::Room;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use naan_common::Delivery;
    use serde_json::Value;
    use tower::ServiceExt;

    const SECRET: &str = "test-secret";

    fn state() -> AppState {
        AppState::new(Settings {
            jwt_secret: SECRET.to_string(),
            ..Settings::default()
        })
    }

    fn token(role: Role) -> String {
        JwtAuth::new(SECRET.as_bytes())
            .issue("tester", role, None)
            .unwrap()
    }

    fn check_in_request(room_id: &str, bearer: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(format!("/check-in/{room_id}"))
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(bearer) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {bearer}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_root() {
        let response = create_router(state())
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"naan running");
    }

    #[tokio::test]
    async fn test_health_counts_rooms() {
        let state = state();
        let (_room, handle) = Room::open("r1", 4);
        state.rooms.register(handle).unwrap();

        let response = create_router(state)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["active_rooms"], 1);
    }

    #[tokio::test]
    async fn test_check_in_delivers() {
        let state = state();
        let (mut room, handle) = Room::open("r1", 4);
        state.rooms.register(handle).unwrap();

        let response = create_router(state)
            .oneshot(check_in_request(
                "r1",
                Some(&token(Role::Normal)),
                r#"{"UserID":"u1"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "sent");
        assert_eq!(room.next_delivery().await, Some(Delivery::new("u1")));
    }

    #[tokio::test]
    async fn test_check_in_unknown_room() {
        let response = create_router(state())
            .oneshot(check_in_request(
                "nope",
                Some(&token(Role::Admin)),
                r#"{"UserID":"u1"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["error"]["code"], "ROOM_001");
    }

    #[tokio::test]
    async fn test_check_in_backpressure() {
        let state = state();
        let (_room, handle) = Room::open("r1", 1);
        state.rooms.register(handle).unwrap();
        state.dispatcher.dispatch("r1", "u0").await.unwrap();

        let response = create_router(state)
            .oneshot(check_in_request(
                "r1",
                Some(&token(Role::Admin)),
                r#"{"UserID":"u1"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_check_in_requires_bearer() {
        let response = create_router(state())
            .oneshot(check_in_request("r1", None, r#"{"UserID":"u1"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = create_router(state())
            .oneshot(check_in_request("r1", Some("garbage"), r#"{"UserID":"u1"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_check_in_refuses_kiosk_role() {
        let response = create_router(state())
            .oneshot(check_in_request(
                "r1",
                Some(&token(Role::Kiosk)),
                r#"{"UserID":"u1"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_check_in_malformed_body() {
        let state = state();
        let (_room, handle) = Room::open("r1", 4);
        state.rooms.register(handle).unwrap();

        let response = create_router(state)
            .oneshot(check_in_request("r1", Some(&token(Role::Normal)), "{not json"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "VAL_002");
    }

    #[tokio::test]
    async fn test_admit() {
        let state = state();

        let kiosk = admit(&state, "r1", Some(&token(Role::Kiosk))).await.unwrap();
        assert_eq!(kiosk.role, Role::Kiosk);

        let err = admit(&state, "r1", None).await.unwrap_err();
        assert_eq!(err.frame_message(), "Invalid kiosk token");

        let err = admit(&state, "r1", Some("garbage")).await.unwrap_err();
        assert_eq!(err.frame_message(), "Invalid kiosk token");

        let err = admit(&state, "r1", Some(&token(Role::Admin))).await.unwrap_err();
        assert_eq!(err.frame_message(), "Unauthorized kiosk");

        let err = admit(&state, "bad room", Some(&token(Role::Kiosk))).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
