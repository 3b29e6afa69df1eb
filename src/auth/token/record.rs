//! Relay token records, expiry handling, and the issuance builder.

// self
use crate::{
	_prelude::*,
	auth::{
		OwnerId, TokenId,
		token::{secret::TokenSecret, status::TokenStatus},
	},
};

/// Expiry policy attached to a token.
///
/// Persisted as unix seconds, with `-1` reserved for [`Expiry::Never`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Expiry {
	/// The token never expires.
	#[default]
	Never,
	/// The token stops being usable once this instant has passed.
	At(OffsetDateTime),
}
impl Expiry {
	const NEVER_SENTINEL: i64 = -1;

	/// Returns `true` if the expiry instant lies strictly before `instant`.
	pub fn has_passed(&self, instant: OffsetDateTime) -> bool {
		match self {
			Self::Never => false,
			Self::At(at) => *at < instant,
		}
	}
}
impl From<Expiry> for i64 {
	fn from(value: Expiry) -> Self {
		match value {
			Expiry::Never => Expiry::NEVER_SENTINEL,
			Expiry::At(at) => at.unix_timestamp(),
		}
	}
}
impl TryFrom<i64> for Expiry {
	type Error = time::error::ComponentRange;

	fn try_from(value: i64) -> Result<Self, Self::Error> {
		if value == Self::NEVER_SENTINEL {
			return Ok(Self::Never);
		}

		OffsetDateTime::from_unix_timestamp(value).map(Self::At)
	}
}

/// Errors produced by [`NewTokenBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum NewTokenError {
	/// Display name exceeds the supported length.
	#[error("Token name exceeds {max} characters.")]
	NameTooLong {
		/// Maximum permitted character count.
		max: usize,
	},
	/// An explicitly supplied secret was empty.
	#[error("Token secret cannot be empty.")]
	EmptySecret,
	/// An explicitly supplied secret contains whitespace, which would break scheme stripping.
	#[error("Token secret contains whitespace.")]
	SecretContainsWhitespace,
}

/// Capability credential tracked by the gate.
#[derive(Clone, Serialize, Deserialize)]
pub struct Token {
	/// Store-assigned identifier.
	pub id: TokenId,
	/// Owning principal; every owner-facing mutation is scoped by it.
	pub owner: OwnerId,
	/// Bearer secret used for lookup; callers must avoid logging it.
	pub secret: TokenSecret,
	/// Current lifecycle status.
	pub status: TokenStatus,
	/// Non-unique, searchable label.
	pub name: String,
	/// Creation instant.
	#[serde(with = "time::serde::timestamp")]
	pub created_at: OffsetDateTime,
	/// Last successful validation, as recorded by the access recorder.
	#[serde(with = "time::serde::timestamp")]
	pub last_accessed_at: OffsetDateTime,
	/// Expiry policy.
	pub expiry: Expiry,
	/// Remaining balance; ignored when [`unlimited_quota`](Self::unlimited_quota) is set.
	pub remaining_quota: i64,
	/// Exempts the token from balance checks.
	pub unlimited_quota: bool,
}
impl Token {
	/// Maximum display-name length accepted on issuance and owner updates.
	pub const NAME_MAX_LEN: usize = 30;

	/// Returns a builder for a token owned by `owner`.
	pub fn builder(owner: OwnerId) -> NewTokenBuilder {
		NewTokenBuilder::new(owner)
	}

	/// Returns `true` if the token's expiry lies strictly before `instant`.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expiry.has_passed(instant)
	}

	/// Returns `true` if the balance check would reject the token.
	pub fn is_exhausted(&self) -> bool {
		!self.unlimited_quota && self.remaining_quota <= 0
	}
}
impl Debug for Token {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Token")
			.field("id", &self.id)
			.field("owner", &self.owner)
			.field("secret", &"<redacted>")
			.field("status", &self.status)
			.field("name", &self.name)
			.field("created_at", &self.created_at)
			.field("last_accessed_at", &self.last_accessed_at)
			.field("expiry", &self.expiry)
			.field("remaining_quota", &self.remaining_quota)
			.field("unlimited_quota", &self.unlimited_quota)
			.finish()
	}
}

/// Validated issuance request; the store assigns the identifier on insert.
#[derive(Clone, Debug)]
pub struct NewToken {
	/// Owning principal.
	pub owner: OwnerId,
	/// Bearer secret (generated unless supplied).
	pub secret: TokenSecret,
	/// Display name.
	pub name: String,
	/// Creation instant, also used as the initial access instant.
	pub created_at: OffsetDateTime,
	/// Expiry policy.
	pub expiry: Expiry,
	/// Initial balance.
	pub remaining_quota: i64,
	/// Exempts the token from balance checks.
	pub unlimited_quota: bool,
}
impl NewToken {
	/// Materializes the record under the store-assigned identifier.
	pub fn into_token(self, id: TokenId) -> Token {
		Token {
			id,
			owner: self.owner,
			secret: self.secret,
			status: TokenStatus::Enabled,
			name: self.name,
			created_at: self.created_at,
			last_accessed_at: self.created_at,
			expiry: self.expiry,
			remaining_quota: self.remaining_quota,
			unlimited_quota: self.unlimited_quota,
		}
	}
}

/// Builder for [`NewToken`].
#[derive(Clone, Debug)]
pub struct NewTokenBuilder {
	owner: OwnerId,
	secret: Option<TokenSecret>,
	secret_len: usize,
	name: String,
	created_at: Option<OffsetDateTime>,
	expiry: Expiry,
	remaining_quota: i64,
	unlimited_quota: bool,
}
impl NewTokenBuilder {
	const DEFAULT_SECRET_LEN: usize = 48;

	fn new(owner: OwnerId) -> Self {
		Self {
			owner,
			secret: None,
			secret_len: Self::DEFAULT_SECRET_LEN,
			name: String::new(),
			created_at: None,
			expiry: Expiry::Never,
			remaining_quota: 0,
			unlimited_quota: false,
		}
	}

	/// Sets the display name.
	pub fn name(mut self, name: impl Into<String>) -> Self {
		self.name = name.into();

		self
	}

	/// Uses an explicit secret instead of generating one.
	pub fn secret(mut self, secret: impl Into<String>) -> Self {
		self.secret = Some(TokenSecret::new(secret));

		self
	}

	/// Overrides the length of generated secrets.
	pub fn secret_len(mut self, len: usize) -> Self {
		self.secret_len = len;

		self
	}

	/// Sets the creation instant (defaults to the current clock).
	pub fn created_at(mut self, instant: OffsetDateTime) -> Self {
		self.created_at = Some(instant);

		self
	}

	/// Sets the expiry policy.
	pub fn expiry(mut self, expiry: Expiry) -> Self {
		self.expiry = expiry;

		self
	}

	/// Convenience helper for an absolute expiry instant.
	pub fn expires_at(self, instant: OffsetDateTime) -> Self {
		self.expiry(Expiry::At(instant))
	}

	/// Sets the initial balance.
	pub fn remaining_quota(mut self, quota: i64) -> Self {
		self.remaining_quota = quota;

		self
	}

	/// Exempts (or not) the token from balance checks.
	pub fn unlimited_quota(mut self, unlimited: bool) -> Self {
		self.unlimited_quota = unlimited;

		self
	}

	/// Consumes the builder and produces a [`NewToken`].
	pub fn build(self) -> Result<NewToken, NewTokenError> {
		validate_name(&self.name)?;

		let secret = match self.secret {
			Some(secret) => {
				if secret.expose().is_empty() {
					return Err(NewTokenError::EmptySecret);
				}
				if secret.expose().chars().any(char::is_whitespace) {
					return Err(NewTokenError::SecretContainsWhitespace);
				}

				secret
			},
			None => TokenSecret::generate(self.secret_len),
		};

		Ok(NewToken {
			owner: self.owner,
			secret,
			name: self.name,
			created_at: self.created_at.unwrap_or_else(OffsetDateTime::now_utc),
			expiry: self.expiry,
			remaining_quota: self.remaining_quota,
			unlimited_quota: self.unlimited_quota,
		})
	}
}

/// Validates a display name against [`Token::NAME_MAX_LEN`].
pub fn validate_name(name: &str) -> Result<(), NewTokenError> {
	if name.chars().count() > Token::NAME_MAX_LEN {
		return Err(NewTokenError::NameTooLong { max: Token::NAME_MAX_LEN });
	}

	Ok(())
}
