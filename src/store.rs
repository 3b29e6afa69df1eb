//! Storage contracts and built-in store implementations for relay tokens.
//!
//! The contract exposes two partial-update paths over the same record:
//!
//! - [`TokenStore::update_settings`] writes only the allow-listed owner settings whose patch value
//!   is present *and not the type default*. It can never zero a quota, clear the unlimited flag,
//!   or blank a name.
//! - [`TokenStore::write_observed`] writes every listed field verbatim, including default values.
//!   Validation-time status transitions and access touches must use it, or their writes may be
//!   silently dropped.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{Expiry, NewToken, OwnerId, Token, TokenId, TokenStatus},
};

/// Boxed future returned by [`TokenStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract implemented by relay token stores.
///
/// Every method is a single storage-level operation; implementations must make each one atomic
/// with respect to concurrent calls on the same record.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Inserts a new token and assigns its identifier.
	///
	/// Fails with [`StoreError::Conflict`] when the secret is already taken.
	fn insert(&self, draft: NewToken) -> StoreFuture<'_, Token>;

	/// Looks a token up by its exact secret.
	fn find_by_secret<'a>(&'a self, secret: &'a str) -> StoreFuture<'a, Option<Token>>;

	/// Looks a token up by identifier, only if it belongs to `owner`.
	fn find_by_id_and_owner(&self, id: TokenId, owner: OwnerId)
	-> StoreFuture<'_, Option<Token>>;

	/// Lists an owner's tokens ordered by identifier, newest first.
	fn list_by_owner(&self, owner: OwnerId, page: Page) -> StoreFuture<'_, Vec<Token>>;

	/// Searches an owner's tokens whose identifier equals `keyword` or whose name starts with it.
	fn search_by_owner<'a>(
		&'a self,
		owner: OwnerId,
		keyword: &'a str,
	) -> StoreFuture<'a, Vec<Token>>;

	/// Applies the non-default fields of `patch` to an owner's token.
	///
	/// See [`SettingsPatch::effective`] for which values are skipped. Returns the updated token,
	/// or `None` if no token matches both `id` and `owner`.
	fn update_settings<'a>(
		&'a self,
		id: TokenId,
		owner: OwnerId,
		patch: &'a SettingsPatch,
	) -> StoreFuture<'a, Option<Token>>;

	/// Writes every listed field of `write` verbatim, zero/default values included.
	///
	/// Returns `false` if the token no longer exists.
	fn write_observed<'a>(
		&'a self,
		id: TokenId,
		write: &'a ObservedWrite,
	) -> StoreFuture<'a, bool>;

	/// Atomically adds `delta` to the remaining quota and returns the new balance.
	///
	/// Returns `None` if the token does not exist. No floor is enforced.
	fn adjust_quota(&self, id: TokenId, delta: i64) -> StoreFuture<'_, Option<i64>>;

	/// Deletes an owner's token; returns `false` if no token matches both `id` and `owner`.
	fn delete(&self, id: TokenId, owner: OwnerId) -> StoreFuture<'_, bool>;
}

/// Error type produced by [`TokenStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
	/// A uniqueness constraint was violated.
	#[error("Conflict: {message}.")]
	Conflict {
		/// Human-readable error payload.
		message: String,
	},
}

/// Offset/limit window used by [`TokenStore::list_by_owner`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
	/// Number of records to skip.
	pub offset: usize,
	/// Maximum number of records to return.
	pub limit: usize,
}
impl Page {
	/// Creates a new page window.
	pub const fn new(offset: usize, limit: usize) -> Self {
		Self { offset, limit }
	}

	/// Applies the window to an already ordered iterator.
	pub fn slice<T>(&self, items: impl Iterator<Item = T>) -> Vec<T> {
		items.skip(self.offset).take(self.limit).collect()
	}
}

/// Owner-controlled settings for [`TokenStore::update_settings`].
///
/// Only these fields may ever be written through the settings path.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsPatch {
	/// New display name.
	pub name: Option<String>,
	/// New status.
	pub status: Option<TokenStatus>,
	/// New expiry policy.
	pub expiry: Option<Expiry>,
	/// New remaining balance.
	pub remaining_quota: Option<i64>,
	/// New unlimited flag.
	pub unlimited_quota: Option<bool>,
}
impl SettingsPatch {
	/// Builds a patch that carries every allow-listed field of `token`.
	pub fn from_token(token: &Token) -> Self {
		Self {
			name: Some(token.name.clone()),
			status: Some(token.status),
			expiry: Some(token.expiry),
			remaining_quota: Some(token.remaining_quota),
			unlimited_quota: Some(token.unlimited_quota),
		}
	}

	/// Drops every field whose value is the type default.
	///
	/// An empty name, a zero quota, and a `false` unlimited flag are discarded; status and expiry
	/// have no zero value and always survive. Every backend applies this before writing.
	pub fn effective(&self) -> Self {
		Self {
			name: self.name.clone().filter(|name| !name.is_empty()),
			status: self.status,
			expiry: self.expiry,
			remaining_quota: self.remaining_quota.filter(|quota| *quota != 0),
			unlimited_quota: self.unlimited_quota.filter(|unlimited| *unlimited),
		}
	}

	/// Returns `true` if no field would be written.
	pub fn is_empty(&self) -> bool {
		let effective = self.effective();

		effective.name.is_none()
			&& effective.status.is_none()
			&& effective.expiry.is_none()
			&& effective.remaining_quota.is_none()
			&& effective.unlimited_quota.is_none()
	}

	/// Applies the effective fields to `token` in place.
	pub fn apply_to(&self, token: &mut Token) {
		let effective = self.effective();

		if let Some(name) = effective.name {
			token.name = name;
		}
		if let Some(status) = effective.status {
			token.status = status;
		}
		if let Some(expiry) = effective.expiry {
			token.expiry = expiry;
		}
		if let Some(quota) = effective.remaining_quota {
			token.remaining_quota = quota;
		}
		if let Some(unlimited) = effective.unlimited_quota {
			token.unlimited_quota = unlimited;
		}
	}
}

/// Fields written verbatim by [`TokenStore::write_observed`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedWrite {
	/// Status to record, if any.
	pub status: Option<TokenStatus>,
	/// Access instant to record, if any.
	pub last_accessed_at: Option<OffsetDateTime>,
}
impl ObservedWrite {
	/// Records a lazily detected status transition.
	pub fn status(status: TokenStatus) -> Self {
		Self { status: Some(status), last_accessed_at: None }
	}

	/// Records an access instant.
	pub fn accessed_at(instant: OffsetDateTime) -> Self {
		Self { status: None, last_accessed_at: Some(instant) }
	}

	/// Applies every listed field to `token` in place.
	pub fn apply_to(&self, token: &mut Token) {
		if let Some(status) = self.status {
			token.status = status;
		}
		if let Some(instant) = self.last_accessed_at {
			token.last_accessed_at = instant;
		}
	}
}

/// Shared keyword predicate for [`TokenStore::search_by_owner`].
pub fn matches_keyword(token: &Token, keyword: &str) -> bool {
	let id_match = keyword.parse::<TokenId>().is_ok_and(|id| id == token.id);

	id_match || token.name.starts_with(keyword)
}
