// ============================
// crates/backend-lib/src/validation/mod.rs
// ============================
//! Input validation for room identifiers.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

// Same alphabet the kiosk uses when it generates a room id
static ROOM_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("room id pattern compiles"));

/// Possible validation errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid room ID: {0}")]
    InvalidRoomId(String),
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate a room ID
pub fn validate_room_id(room_id: &str, max_len: usize) -> ValidationResult<&str> {
    if room_id.is_empty() {
        return Err(ValidationError::InvalidRoomId(
            "Room ID must not be empty".to_string(),
        ));
    }

    if room_id.len() > max_len {
        return Err(ValidationError::InvalidRoomId(format!(
            "Room ID must be at most {max_len} characters"
        )));
    }

    if !ROOM_ID_REGEX.is_match(room_id) {
        return Err(ValidationError::InvalidRoomId(
            "Room ID may only contain letters, digits, '-' and '_'".to_string(),
        ));
    }

    Ok(room_id)
}
