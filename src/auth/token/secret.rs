//! Secure token secret wrapper that redacts sensitive material.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};
// self
use crate::_prelude::*;

/// Redacted token secret wrapper keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Generates a random alphanumeric secret of `len` characters.
	pub fn generate(len: usize) -> Self {
		Self(rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Short, non-reversible fingerprint that is safe to log.
	pub fn fingerprint(&self) -> String {
		fingerprint(&self.0)
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Fingerprints a raw secret (first 12 characters of its URL-safe SHA-256 digest).
pub fn fingerprint(raw: &str) -> String {
	let mut hasher = Sha256::new();

	hasher.update(raw.as_bytes());

	let mut encoded = URL_SAFE_NO_PAD.encode(hasher.finalize());

	encoded.truncate(12);

	encoded
}

/// Removes a leading authentication scheme marker (e.g. `"Bearer "`) from a presented credential.
///
/// Only a single leading occurrence is stripped; an empty `scheme` leaves the input untouched.
pub fn strip_scheme<'a>(raw: &'a str, scheme: &str) -> &'a str {
	if scheme.is_empty() {
		return raw;
	}

	raw.strip_prefix(scheme).unwrap_or(raw)
}
