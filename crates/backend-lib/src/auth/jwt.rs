//! HS256 token verification.
use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, get_current_timestamp, Algorithm, DecodingKey,
    EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use super::{AuthError, Authenticator, Principal, Role};

/// Claims of a library token: `{"id": .., "type": .., "exp": ..}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: kiosk name or user id
    pub id: String,
    #[serde(rename = "type")]
    pub role: Role,
    /// Expiry (unix seconds). Kiosk tokens are issued without one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
}

/// Authenticator backed by a shared HS256 secret
pub struct JwtAuth {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtAuth {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // `exp` is checked when present but not required
        validation.required_spec_claims.clear();

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Sign a token the way the library API does. Used by tests and tooling;
    /// the hub itself never hands out credentials.
    pub fn issue(
        &self,
        subject: &str,
        role: Role,
        ttl: Option<Duration>,
    ) -> Result<String, AuthError> {
        let claims = Claims {
            id: subject.to_string(),
            role,
            exp: ttl.map(|ttl| get_current_timestamp() + ttl.as_secs()),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::InvalidCredential(e.to_string()))
    }

    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidCredential(e.to_string()),
            })
    }
}

#[async_trait]
impl Authenticator for JwtAuth {
    async fn authenticate(&self, credential: &str) -> Result<Principal, AuthError> {
        if credential.is_empty() {
            return Err(AuthError::MissingCredential);
        }
        let claims = self.decode(credential)?;
        Ok(Principal {
            subject_id: claims.id,
            role: claims.role,
        })
    }
}
