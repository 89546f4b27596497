//! Server-side models that are not part of the backend's data.

#[cfg(feature = "server")]
pub mod auth;
pub mod config;
