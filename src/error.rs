//! Gate-level error types shared across validation, accounting, and management operations.

// self
use crate::{_prelude::*, auth::TokenStatus};

/// Gate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical gate error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),

	/// No credential was presented.
	#[error("No credential was provided.")]
	MissingCredential,
	/// The credential (or the owner-scoped token) does not exist.
	///
	/// Ownership mismatches surface as this variant so callers cannot discover another owner's
	/// tokens.
	#[error("The credential is invalid.")]
	NotFound,
	/// The token exists but its recorded status forbids use.
	#[error("The token is unusable: {status}.")]
	Unusable {
		/// Status recorded on the token at the time of the check.
		status: TokenStatus,
	},
	/// The token passed its expiry instant; the transition was recorded.
	#[error("The token has expired.")]
	Expired,
	/// The token has no remaining quota; the transition was recorded.
	#[error("The token quota is exhausted.")]
	QuotaExhausted,
	/// The caller supplied arguments the gate refuses to act on.
	#[error("Invalid request: {reason}.")]
	InvalidRequest {
		/// Gate-supplied reason string.
		reason: String,
	},
}
impl Error {
	/// Shorthand for [`Error::InvalidRequest`].
	pub fn invalid_request(reason: impl Into<String>) -> Self {
		Self::InvalidRequest { reason: reason.into() }
	}

	/// Returns `true` for errors produced by credential validation itself (as opposed to
	/// storage failures).
	pub fn is_rejection(&self) -> bool {
		matches!(
			self,
			Self::MissingCredential
				| Self::NotFound
				| Self::Unusable { .. }
				| Self::Expired
				| Self::QuotaExhausted
		)
	}
}
impl From<crate::auth::IdentifierError> for Error {
	fn from(e: crate::auth::IdentifierError) -> Self {
		Self::invalid_request(e.to_string())
	}
}
impl From<crate::auth::NewTokenError> for Error {
	fn from(e: crate::auth::NewTokenError) -> Self {
		Self::invalid_request(e.to_string())
	}
}

/// Configuration failures raised while loading gate or provider settings.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Settings document could not be parsed; `path` points at the offending field.
	#[error("Settings are malformed at `{path}`.")]
	Malformed {
		/// Dotted path of the field that failed to deserialize.
		path: String,
		/// Underlying JSON failure.
		#[source]
		source: serde_json::Error,
	},
	/// Settings parsed but violate a constraint.
	#[error("Setting `{field}` is invalid: {reason}.")]
	Invalid {
		/// Field name.
		field: &'static str,
		/// Human-readable reason.
		reason: String,
	},
}
impl ConfigError {
	/// Wraps a path-aware JSON failure inside [`ConfigError`].
	pub fn malformed(e: serde_path_to_error::Error<serde_json::Error>) -> Self {
		let path = e.path().to_string();

		Self::Malformed { path, source: e.into_inner() }
	}
}
