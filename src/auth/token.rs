//! Relay token records, lifecycle statuses, and secret handling.

pub mod record;
pub mod secret;
pub mod status;
