//! Thread-safe in-memory [`TokenStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::{NewToken, OwnerId, Token, TokenId},
	store::{self, ObservedWrite, Page, SettingsPatch, StoreError, StoreFuture, TokenStore},
};

type StoreMap = Arc<RwLock<MemoryState>>;

/// Indexed snapshot shared by the in-memory and file-backed stores.
#[derive(Clone, Debug, Default)]
pub(crate) struct MemoryState {
	/// Highest identifier handed out so far.
	pub(crate) last_id: u64,
	/// Records keyed by identifier.
	pub(crate) tokens: BTreeMap<TokenId, Token>,
	/// Unique secret index.
	pub(crate) by_secret: HashMap<String, TokenId>,
}
impl MemoryState {
	pub(crate) fn from_tokens(last_id: u64, tokens: impl IntoIterator<Item = Token>) -> Self {
		let mut state = Self { last_id, ..Default::default() };

		for token in tokens {
			state.last_id = state.last_id.max(token.id.get());
			state.by_secret.insert(token.secret.expose().to_owned(), token.id);
			state.tokens.insert(token.id, token);
		}

		state
	}

	pub(crate) fn insert(&mut self, draft: NewToken) -> Result<Token, StoreError> {
		if self.by_secret.contains_key(draft.secret.expose()) {
			return Err(StoreError::Conflict {
				message: format!("secret {} is already issued", draft.secret.fingerprint()),
			});
		}

		let next = self.last_id.checked_add(1).ok_or_else(|| StoreError::Backend {
			message: "token identifier space exhausted".into(),
		})?;
		let id = TokenId::new(next)
			.map_err(|e| StoreError::Backend { message: e.to_string() })?;
		let token = draft.into_token(id);

		self.last_id = next;
		self.by_secret.insert(token.secret.expose().to_owned(), id);
		self.tokens.insert(id, token.clone());

		Ok(token)
	}

	pub(crate) fn find_by_secret(&self, secret: &str) -> Option<Token> {
		self.by_secret.get(secret).and_then(|id| self.tokens.get(id)).cloned()
	}

	pub(crate) fn find_by_id_and_owner(&self, id: TokenId, owner: OwnerId) -> Option<Token> {
		self.tokens.get(&id).filter(|token| token.owner == owner).cloned()
	}

	pub(crate) fn list_by_owner(&self, owner: OwnerId, page: Page) -> Vec<Token> {
		page.slice(self.tokens.values().rev().filter(|token| token.owner == owner).cloned())
	}

	pub(crate) fn search_by_owner(&self, owner: OwnerId, keyword: &str) -> Vec<Token> {
		self.tokens
			.values()
			.rev()
			.filter(|token| token.owner == owner && store::matches_keyword(token, keyword))
			.cloned()
			.collect()
	}

	pub(crate) fn update_settings(
		&mut self,
		id: TokenId,
		owner: OwnerId,
		patch: &SettingsPatch,
	) -> Option<Token> {
		let token = self.tokens.get_mut(&id).filter(|token| token.owner == owner)?;

		patch.apply_to(token);

		Some(token.clone())
	}

	pub(crate) fn write_observed(&mut self, id: TokenId, write: &ObservedWrite) -> bool {
		match self.tokens.get_mut(&id) {
			Some(token) => {
				write.apply_to(token);

				true
			},
			None => false,
		}
	}

	pub(crate) fn adjust_quota(&mut self, id: TokenId, delta: i64) -> Option<i64> {
		let token = self.tokens.get_mut(&id)?;

		token.remaining_quota = token.remaining_quota.saturating_add(delta);

		Some(token.remaining_quota)
	}

	pub(crate) fn delete(&mut self, id: TokenId, owner: OwnerId) -> bool {
		if self.find_by_id_and_owner(id, owner).is_none() {
			return false;
		}

		match self.tokens.remove(&id) {
			Some(token) => {
				self.by_secret.remove(token.secret.expose());

				true
			},
			None => false,
		}
	}
}

/// Thread-safe storage backend that keeps records in-process for tests and demos.
///
/// Each operation holds the write lock for its whole read-modify-write, which is what makes
/// [`TokenStore::adjust_quota`] atomic here.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	/// Number of stored tokens.
	pub fn len(&self) -> usize {
		self.0.read().tokens.len()
	}

	/// Returns `true` if no token is stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().tokens.is_empty()
	}

	/// Reads a token by identifier regardless of owner; intended for inspection in tests.
	pub fn snapshot(&self, id: TokenId) -> Option<Token> {
		self.0.read().tokens.get(&id).cloned()
	}
}
impl TokenStore for MemoryStore {
	fn insert(&self, draft: NewToken) -> StoreFuture<'_, Token> {
		let map = self.0.clone();

		Box::pin(async move { map.write().insert(draft) })
	}

	fn find_by_secret<'a>(&'a self, secret: &'a str) -> StoreFuture<'a, Option<Token>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.read().find_by_secret(secret)) })
	}

	fn find_by_id_and_owner(
		&self,
		id: TokenId,
		owner: OwnerId,
	) -> StoreFuture<'_, Option<Token>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.read().find_by_id_and_owner(id, owner)) })
	}

	fn list_by_owner(&self, owner: OwnerId, page: Page) -> StoreFuture<'_, Vec<Token>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.read().list_by_owner(owner, page)) })
	}

	fn search_by_owner<'a>(
		&'a self,
		owner: OwnerId,
		keyword: &'a str,
	) -> StoreFuture<'a, Vec<Token>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.read().search_by_owner(owner, keyword)) })
	}

	fn update_settings<'a>(
		&'a self,
		id: TokenId,
		owner: OwnerId,
		patch: &'a SettingsPatch,
	) -> StoreFuture<'a, Option<Token>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.write().update_settings(id, owner, patch)) })
	}

	fn write_observed<'a>(
		&'a self,
		id: TokenId,
		write: &'a ObservedWrite,
	) -> StoreFuture<'a, bool> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.write().write_observed(id, write)) })
	}

	fn adjust_quota(&self, id: TokenId, delta: i64) -> StoreFuture<'_, Option<i64>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.write().adjust_quota(id, delta)) })
	}

	fn delete(&self, id: TokenId, owner: OwnerId) -> StoreFuture<'_, bool> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.write().delete(id, owner)) })
	}
}
