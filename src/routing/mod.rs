//! URL-derived UI state.

pub mod location;
pub mod modal;
