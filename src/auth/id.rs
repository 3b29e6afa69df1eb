//! Strongly typed identifiers enforced across the gate domain.

// std
use std::{borrow::Borrow, num::NonZeroU64, ops::Deref};
// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Creates a new identifier after validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let view = value.as_ref();

				validate_view($kind, view)?;

				Ok(Self(view.to_owned()))
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				validate_view($kind, &value)?;

				Ok(Self(value))
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
	};
}

macro_rules! def_numeric_id {
	($name:ident, $doc:literal, $kind:literal) => {
		#[doc = $doc]
		#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "u64", into = "u64")]
		pub struct $name(NonZeroU64);
		impl $name {
			/// Creates a new identifier; zero is reserved as "unset" and rejected.
			pub fn new(value: u64) -> Result<Self, IdentifierError> {
				NonZeroU64::new(value).map(Self).ok_or(IdentifierError::Zero { kind: $kind })
			}

			/// Returns the raw numeric value.
			pub const fn get(self) -> u64 {
				self.0.get()
			}
		}
		impl From<$name> for u64 {
			fn from(value: $name) -> Self {
				value.get()
			}
		}
		impl TryFrom<u64> for $name {
			type Error = IdentifierError;

			fn try_from(value: u64) -> Result<Self, Self::Error> {
				Self::new(value)
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				Display::fmt(&self.0, f)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				let value = s
					.parse::<u64>()
					.map_err(|_| IdentifierError::NotNumeric { kind: $kind })?;

				Self::new(value)
			}
		}
	};
}

const IDENTIFIER_MAX_LEN: usize = 128;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty or whitespace.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (token, owner, provider).
		kind: &'static str,
	},
	/// The identifier contains whitespace characters.
	#[error("{kind} identifier contains whitespace.")]
	ContainsWhitespace {
		/// Kind of identifier (token, owner, provider).
		kind: &'static str,
	},
	/// The identifier exceeded the allowed character count.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Kind of identifier (token, owner, provider).
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
	/// A numeric identifier was zero.
	#[error("{kind} identifier cannot be zero.")]
	Zero {
		/// Kind of identifier (token, owner, provider).
		kind: &'static str,
	},
	/// A numeric identifier could not be parsed.
	#[error("{kind} identifier must be a positive integer.")]
	NotNumeric {
		/// Kind of identifier (token, owner, provider).
		kind: &'static str,
	},
}

def_numeric_id! { TokenId, "Store-assigned identifier of a relay token.", "Token" }
def_numeric_id! { OwnerId, "Identifier of the principal that owns a relay token.", "Owner" }
def_id! { ProviderId, "Identifier for a downstream provider context.", "Provider" }

fn validate_view(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace { kind });
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}
