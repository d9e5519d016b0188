use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Role tag carried in the `type` claim of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A check-in kiosk, the only role allowed to host a room
    Kiosk,
    /// Library staff
    Admin,
    /// A library member
    Normal,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Kiosk => "kiosk",
            Role::Admin => "admin",
            Role::Normal => "normal",
        };
        f.write_str(name)
    }
}

/// Identity resolved from a credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub subject_id: String,
    pub role: Role,
}

/// Why a credential was refused
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("missing credential")]
    MissingCredential,

    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    #[error("credential expired")]
    Expired,

    #[error("role {actual} is not allowed here")]
    WrongRole { actual: Role },
}

/// Credential verification consumed by the hub. Token issuance lives with
/// the surrounding library API.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, credential: &str) -> Result<Principal, AuthError>;
}

impl Principal {
    /// Accept the principal only if it carries one of `roles`
    pub fn require(self, roles: &[Role]) -> Result<Self, AuthError> {
        if roles.contains(&self.role) {
            Ok(self)
        } else {
            Err(AuthError::WrongRole { actual: self.role })
        }
    }
}
