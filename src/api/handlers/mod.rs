//! API handlers.

pub mod auth;
pub mod confirm;
pub mod health;
pub mod profile;
pub mod stats;
