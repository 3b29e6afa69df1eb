//! Auth-domain identifiers and relay token models.

pub mod id;
pub mod token;

pub use id::*;
pub use token::{record::*, secret::*, status::*};
