// ============================
// crates/backend-lib/src/handlers/check_in.rs
// ============================
//! Check-in submission.
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use naan_common::{CheckInAck, CheckInRequest, RoomId};

use crate::auth::{AuthenticatedUser, Role};
use crate::error::AppError;
use crate::AppState;

/// `POST /check-in/{room_id}`
///
/// Queues the submitted user id for the kiosk hosting `room_id`. A `200`
/// means the event was accepted into the room's outbox, not that the kiosk
/// has rendered it.
pub async fn check_in(
    State(state): State<AppState>,
    Path(room_id): Path<RoomId>,
    AuthenticatedUser(principal): AuthenticatedUser,
    body: Result<Json<CheckInRequest>, JsonRejection>,
) -> Result<Json<CheckInAck>, AppError> {
    let principal = principal.require(&[Role::Admin, Role::Normal])?;
    let Json(request) = body.map_err(|e| AppError::InvalidInput(e.body_text()))?;

    tracing::info!(
        room_id = %room_id,
        submitted_by = %principal.subject_id,
        "check-in"
    );
    state.dispatcher.dispatch(&room_id, request.user_id).await?;

    Ok(Json(CheckInAck::sent()))
}
