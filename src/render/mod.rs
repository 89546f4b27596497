//! Pure JSON → view model rendering for list and detail pages.

pub mod detail;
pub mod format;
pub mod list;
