//! Token lifecycle status and its persisted numeric codes.

// self
use crate::_prelude::*;

/// Lifecycle status recorded on a relay token.
///
/// Automatic transitions only ever move a token away from [`TokenStatus::Enabled`]; bringing a
/// token back requires an explicit owner update. Serialized as its numeric [`code`](Self::code).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TokenStatus {
	/// Token may be used.
	#[default]
	Enabled,
	/// Token was disabled by its owner or an administrator.
	Disabled,
	/// Token passed its expiry instant.
	Expired,
	/// Token ran out of quota.
	Exhausted,
}
impl TokenStatus {
	/// Stable numeric code used by persisted layouts.
	pub const fn code(self) -> u8 {
		match self {
			Self::Enabled => 1,
			Self::Disabled => 2,
			Self::Expired => 3,
			Self::Exhausted => 4,
		}
	}

	/// Inverse of [`code`](Self::code).
	pub const fn from_code(code: u8) -> Option<Self> {
		match code {
			1 => Some(Self::Enabled),
			2 => Some(Self::Disabled),
			3 => Some(Self::Expired),
			4 => Some(Self::Exhausted),
			_ => None,
		}
	}

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Enabled => "enabled",
			Self::Disabled => "disabled",
			Self::Expired => "expired",
			Self::Exhausted => "exhausted",
		}
	}

	/// Returns `true` for [`TokenStatus::Enabled`].
	pub const fn is_enabled(self) -> bool {
		matches!(self, Self::Enabled)
	}
}
impl From<TokenStatus> for u8 {
	fn from(value: TokenStatus) -> Self {
		value.code()
	}
}
impl TryFrom<u8> for TokenStatus {
	type Error = UnknownStatusCode;

	fn try_from(value: u8) -> Result<Self, Self::Error> {
		Self::from_code(value).ok_or(UnknownStatusCode(value))
	}
}
impl Display for TokenStatus {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Raised when a persisted status code is outside `1..=4`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ThisError)]
#[error("Unknown token status code {0}.")]
pub struct UnknownStatusCode(
	/// Rejected code.
	pub u8,
);
