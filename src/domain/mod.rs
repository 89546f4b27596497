//! Domain values shared by the client, renderers and forms.

pub mod auth;
pub mod company;
pub mod context;
pub mod entity;
pub mod types;
