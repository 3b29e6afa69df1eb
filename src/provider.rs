//! Provider adaptation: per-request resolution of backend-specific parameters.
//!
//! `params` defines [`RequestParams`], the lookup seam over whatever carries a request's
//! parameters (query string, decoded map), and the precedence rule: a non-empty value supplied
//! by the request wins over the server-side default. `defaults` holds the server-side defaults
//! per provider context.

pub mod defaults;
pub mod params;

pub use defaults::*;
pub use params::*;
