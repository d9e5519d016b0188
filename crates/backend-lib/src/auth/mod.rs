// ============================
// naan-backend/src/auth/mod.rs
// ============================
//! Authentication module.

pub mod extract;
pub mod jwt;
mod service;

pub use extract::{bearer_token, AuthenticatedUser};
pub use jwt::{Claims, JwtAuth};
pub use service::{AuthError, Authenticator, Principal, Role};
