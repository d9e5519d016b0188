//! `Authorization: Bearer` extractor for protected HTTP routes.
use axum::{extract::FromRequestParts, http::request::Parts};

use super::{AuthError, Principal};
use crate::error::AppError;
use crate::AppState;

/// Principal resolved from the request's bearer token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Principal);

/// Pull the token out of an `Authorization` header value
pub fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .ok_or(AuthError::MissingCredential)?;

        let principal = state.auth.authenticate(token).await?;
        Ok(AuthenticatedUser(principal))
    }
}
