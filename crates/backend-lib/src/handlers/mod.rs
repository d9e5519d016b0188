// ============================
// crates/backend-lib/src/handlers/mod.rs
// ============================
//! HTTP handlers.

pub mod check_in;
pub mod health;

pub use check_in::check_in;
pub use health::{health, root};
